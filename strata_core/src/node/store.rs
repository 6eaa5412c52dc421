// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage for render nodes with allocation, graph edges and lifecycle.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::child::{
    BlitMode, Child, ChildEntry, Mesh, Modal, Operation, PropertyValue, UniformValue,
};
use super::id::{DisplayableId, RenderId};
use crate::dirty;
use crate::error::Violation;
use crate::focus::{FocusRegion, MaskSource};
use crate::transform::Transform3d;

/// A render node: a compositing instruction with children, transforms and
/// blend, clip, shader and focus state.
///
/// Nodes are created and filled in by a single writer (the render callback
/// or a helper such as [`subsurface`](crate::context::RenderContext::subsurface))
/// and are treated as frozen once they have been returned from the cache.
#[derive(Clone, Debug)]
pub struct RenderNode {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) children: Vec<ChildEntry>,
    pub(crate) forward: Option<Transform3d>,
    pub(crate) reverse: Option<Transform3d>,
    pub(crate) alpha: f64,
    pub(crate) over: f64,
    pub(crate) operation: Operation,
    pub(crate) operation_complete: f64,
    pub(crate) operation_alpha: bool,
    pub(crate) operation_parameter: f64,
    pub(crate) x_clipping: bool,
    pub(crate) y_clipping: bool,
    pub(crate) modal: Modal,
    pub(crate) text_input: bool,
    pub(crate) mesh: Option<Mesh>,
    pub(crate) shaders: Vec<String>,
    pub(crate) uniforms: Vec<(String, UniformValue)>,
    pub(crate) properties: Vec<(String, PropertyValue)>,
    pub(crate) focuses: Vec<FocusRegion>,
    pub(crate) pass_focuses: Vec<RenderId>,
    pub(crate) render_of: Vec<DisplayableId>,
    pub(crate) depends_on: Vec<RenderId>,
    pub(crate) parents: Vec<RenderId>,
    pub(crate) mark: bool,
    pub(crate) cache_killed: bool,
    pub(crate) killed: bool,
}

impl RenderNode {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            children: Vec::new(),
            forward: None,
            reverse: None,
            alpha: 1.0,
            over: 1.0,
            operation: Operation::Draw,
            operation_complete: 0.0,
            operation_alpha: false,
            operation_parameter: 0.0,
            x_clipping: false,
            y_clipping: false,
            modal: Modal::None,
            text_input: false,
            mesh: None,
            shaders: Vec::new(),
            uniforms: Vec::new(),
            properties: Vec::new(),
            focuses: Vec::new(),
            pass_focuses: Vec::new(),
            render_of: Vec::new(),
            depends_on: Vec::new(),
            parents: Vec::new(),
            mark: false,
            cache_killed: false,
            killed: false,
        }
    }

    /// Nominal width. Not a clipping guarantee.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Nominal height. Not a clipping guarantee.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Nominal size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Children in draw order (first drawn first).
    #[must_use]
    pub fn children(&self) -> &[ChildEntry] {
        &self.children
    }

    /// Screen → child transform, if any.
    #[must_use]
    pub fn forward(&self) -> Option<&Transform3d> {
        self.forward.as_ref()
    }

    /// Child → screen transform, if any.
    #[must_use]
    pub fn reverse(&self) -> Option<&Transform3d> {
        self.reverse.as_ref()
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Over-blend factor.
    #[must_use]
    pub fn over(&self) -> f64 {
        self.over
    }

    /// Composite operation.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Progress of the composite operation.
    #[must_use]
    pub fn operation_complete(&self) -> f64 {
        self.operation_complete
    }

    /// Whether the composite operation keeps alpha.
    #[must_use]
    pub fn operation_alpha(&self) -> bool {
        self.operation_alpha
    }

    /// Operation-specific parameter (ramp length, pixel size).
    #[must_use]
    pub fn operation_parameter(&self) -> f64 {
        self.operation_parameter
    }

    /// `(x, y)` clip flags.
    #[must_use]
    pub fn clipping(&self) -> (bool, bool) {
        (self.x_clipping, self.y_clipping)
    }

    /// Modal behavior.
    #[must_use]
    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Whether this node hosts text input.
    #[must_use]
    pub fn text_input(&self) -> bool {
        self.text_input
    }

    /// Mesh payload, if the node is mesh-backed.
    #[must_use]
    pub fn mesh(&self) -> Option<Mesh> {
        self.mesh
    }

    /// Shader names, in the order they were added.
    #[must_use]
    pub fn shaders(&self) -> &[String] {
        &self.shaders
    }

    /// Shader uniforms.
    #[must_use]
    pub fn uniforms(&self) -> &[(String, UniformValue)] {
        &self.uniforms
    }

    /// Backend draw properties.
    #[must_use]
    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    /// Focus regions in child-local coordinates.
    #[must_use]
    pub fn focuses(&self) -> &[FocusRegion] {
        &self.focuses
    }

    /// Logical focus delegates.
    #[must_use]
    pub fn pass_focuses(&self) -> &[RenderId] {
        &self.pass_focuses
    }

    /// Displayables this node is the render of.
    #[must_use]
    pub fn render_of(&self) -> &[DisplayableId] {
        &self.render_of
    }

    /// Every node this node keeps alive.
    #[must_use]
    pub fn depends_on(&self) -> &[RenderId] {
        &self.depends_on
    }

    /// Every node that depends on this node.
    #[must_use]
    pub fn parents(&self) -> &[RenderId] {
        &self.parents
    }

    /// Whether the node has been evicted from the cache.
    #[must_use]
    pub fn is_cache_killed(&self) -> bool {
        self.cache_killed
    }

    fn copy_state_from(&mut self, other: &Self) {
        self.alpha = other.alpha;
        self.over = other.over;
        self.operation = other.operation;
        self.operation_complete = other.operation_complete;
        self.operation_alpha = other.operation_alpha;
        self.operation_parameter = other.operation_parameter;
        self.text_input = other.text_input;
        self.mesh = other.mesh;
        self.shaders.clone_from(&other.shaders);
        self.uniforms.clone_from(&other.uniforms);
        self.properties.clone_from(&other.properties);
    }
}

/// Slot storage for all render nodes.
///
/// Nodes are addressed by [`RenderId`] handles. Collected nodes are recycled
/// via a free list, and generation counters prevent stale handle access.
///
/// Dependency edges are mirrored into a [`DirtyTracker`] so that evicting a
/// node from the cache can eagerly reach every node that transitively depends
/// on it.
#[derive(Debug)]
pub struct RenderStore {
    pub(crate) nodes: Vec<RenderNode>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Invalidation graph --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<RenderId>,
}

impl Default for RenderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new, empty node of the given nominal size.
    ///
    /// The node has no children, no transforms, full opacity and no clipping.
    /// It is registered as a collection candidate immediately.
    pub fn create(&mut self, width: f64, height: f64) -> RenderId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.nodes[idx as usize] = RenderNode::new(width, height);
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.nodes.push(RenderNode::new(width, height));
            self.generation.push(0);
            idx
        };

        let id = RenderId {
            idx,
            generation: self.generation[idx as usize],
        };
        self.pending_added.push(id);
        id
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: RenderId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && !self.nodes[id.idx as usize].killed
    }

    /// Returns the number of allocated, not yet collected nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns the node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get(&self, id: RenderId) -> &RenderNode {
        self.validate(id);
        &self.nodes[id.idx as usize]
    }

    /// Returns the nominal size of a node.
    #[must_use]
    pub fn size(&self, id: RenderId) -> Size {
        self.get(id).size()
    }

    // -- Composition API --

    /// Draws `child` at whole-pixel `offset` inside `parent`.
    ///
    /// Blitting a render adds a dependency edge from `parent` to it.
    pub fn blit(
        &mut self,
        parent: RenderId,
        child: Child,
        offset: Point,
        focus: bool,
        main: bool,
    ) -> Result<(), Violation> {
        self.push_child(parent, child, offset, BlitMode::Pixel, focus, main)
    }

    /// Like [`blit`](Self::blit), but keeps fractional offsets.
    pub fn subpixel_blit(
        &mut self,
        parent: RenderId,
        child: Child,
        offset: Point,
        focus: bool,
        main: bool,
    ) -> Result<(), Violation> {
        self.push_child(parent, child, offset, BlitMode::Subpixel, focus, main)
    }

    /// Like [`blit`](Self::blit), with the offset in absolute units.
    pub fn absolute_blit(
        &mut self,
        parent: RenderId,
        child: Child,
        offset: Point,
        focus: bool,
        main: bool,
    ) -> Result<(), Violation> {
        self.push_child(parent, child, offset, BlitMode::Absolute, focus, main)
    }

    pub(crate) fn push_child(
        &mut self,
        parent: RenderId,
        child: Child,
        offset: Point,
        mode: BlitMode,
        focus: bool,
        main: bool,
    ) -> Result<(), Violation> {
        self.validate(parent);
        if let Child::Render(source) = child {
            self.add_dependency(parent, source)?;
        }
        self.nodes[parent.idx as usize].children.push(ChildEntry {
            child,
            offset,
            mode,
            focus,
            main,
        });
        Ok(())
    }

    /// Records that `node` must keep `other` alive, without drawing it.
    pub fn depends_on(&mut self, node: RenderId, other: RenderId) -> Result<(), Violation> {
        self.validate(node);
        self.add_dependency(node, other)
    }

    /// Adds a focus region. A render mask adds a dependency edge.
    pub fn add_focus(&mut self, node: RenderId, region: FocusRegion) -> Result<(), Violation> {
        self.validate(node);
        if let Some(MaskSource::Render(mask)) = region.mask.as_ref().map(|m| &m.source) {
            if *mask != node {
                self.add_dependency(node, *mask)?;
            }
        }
        self.nodes[node.idx as usize].focuses.push(region);
        Ok(())
    }

    /// Lets `delegate`'s focus regions count as if they belonged to `node`.
    pub fn pass_focus(&mut self, node: RenderId, delegate: RenderId) -> Result<(), Violation> {
        self.validate(node);
        self.add_dependency(node, delegate)?;
        self.nodes[node.idx as usize].pass_focuses.push(delegate);
        Ok(())
    }

    /// Adds a shader uniform. A render uniform adds a dependency edge.
    pub fn add_uniform(
        &mut self,
        node: RenderId,
        name: impl Into<String>,
        value: UniformValue,
    ) -> Result<(), Violation> {
        self.validate(node);
        if let UniformValue::Render(source) = value {
            self.add_dependency(node, source)?;
        }
        self.nodes[node.idx as usize]
            .uniforms
            .push((name.into(), value));
        Ok(())
    }

    /// Adds a shader to the node's pipeline.
    pub fn add_shader(&mut self, node: RenderId, name: impl Into<String>) {
        self.node_mut(node).shaders.push(name.into());
    }

    /// Adds a backend draw property.
    pub fn add_property(&mut self, node: RenderId, name: impl Into<String>, value: PropertyValue) {
        self.node_mut(node).properties.push((name.into(), value));
    }

    // -- Property setters --

    /// Sets the forward (screen → child) and reverse (child → screen)
    /// transforms.
    pub fn set_transforms(
        &mut self,
        node: RenderId,
        forward: Option<Transform3d>,
        reverse: Option<Transform3d>,
    ) {
        let n = self.node_mut(node);
        n.forward = forward;
        n.reverse = reverse;
    }

    /// Sets the independent x/y clip flags.
    pub fn set_clipping(&mut self, node: RenderId, x: bool, y: bool) {
        let n = self.node_mut(node);
        n.x_clipping = x;
        n.y_clipping = y;
    }

    /// Sets opacity, clamped to `[0, 1]`.
    pub fn set_alpha(&mut self, node: RenderId, alpha: f64) {
        self.node_mut(node).alpha = alpha.clamp(0.0, 1.0);
    }

    /// Sets the over-blend factor.
    pub fn set_over(&mut self, node: RenderId, over: f64) {
        self.node_mut(node).over = over;
    }

    /// Sets the composite operation and its parameters.
    pub fn set_operation(
        &mut self,
        node: RenderId,
        operation: Operation,
        complete: f64,
        keep_alpha: bool,
        parameter: f64,
    ) {
        let n = self.node_mut(node);
        n.operation = operation;
        n.operation_complete = complete;
        n.operation_alpha = keep_alpha;
        n.operation_parameter = parameter;
    }

    /// Sets the modal behavior.
    pub fn set_modal(&mut self, node: RenderId, modal: Modal) {
        self.node_mut(node).modal = modal;
    }

    /// Marks the node as hosting text input.
    pub fn set_text_input(&mut self, node: RenderId, text_input: bool) {
        self.node_mut(node).text_input = text_input;
    }

    /// Sets the mesh payload.
    pub fn set_mesh(&mut self, node: RenderId, mesh: Option<Mesh>) {
        self.node_mut(node).mesh = mesh;
    }

    /// Overrides the nominal size.
    pub fn set_size(&mut self, node: RenderId, size: Size) {
        let n = self.node_mut(node);
        n.width = size.width;
        n.height = size.height;
    }

    pub(crate) fn add_render_of(&mut self, node: RenderId, d: DisplayableId) {
        self.node_mut(node).render_of.push(d);
    }

    pub(crate) fn node_mut(&mut self, id: RenderId) -> &mut RenderNode {
        self.validate(id);
        &mut self.nodes[id.idx as usize]
    }

    /// Copies the compositing state that a crop must preserve from `src` to
    /// `dst`.
    pub(crate) fn copy_state(&mut self, src: RenderId, dst: RenderId) {
        self.validate(src);
        self.validate(dst);
        if let Ok([from, to]) = self
            .nodes
            .get_disjoint_mut([src.idx as usize, dst.idx as usize])
        {
            to.copy_state_from(from);
        }
    }

    // -- Lifecycle --

    /// Flags `id` and every node that transitively depends on it as
    /// cache-killed, returning the nodes that were newly flagged.
    ///
    /// Graph edges are left intact; destruction is the collector's job.
    pub(crate) fn propagate_cache_kill(&mut self, id: RenderId) -> Vec<RenderId> {
        self.validate(id);
        self.dirty.mark_with(id.idx, dirty::CACHE_KILL, &EagerPolicy);
        let affected: Vec<u32> = self
            .dirty
            .drain(dirty::CACHE_KILL)
            .affected()
            .deterministic()
            .run()
            .collect();

        let mut killed = Vec::new();
        for idx in affected {
            let node = &mut self.nodes[idx as usize];
            if node.killed || node.cache_killed {
                continue;
            }
            node.cache_killed = true;
            killed.push(RenderId {
                idx,
                generation: self.generation[idx as usize],
            });
        }
        killed
    }

    /// Destroys a node: clears every owned list, removes its edges from the
    /// surviving neighbors and frees the slot.
    pub(crate) fn kill(&mut self, id: RenderId) {
        self.validate(id);
        let idx = id.idx as usize;

        let depends_on = core::mem::take(&mut self.nodes[idx].depends_on);
        for dep in depends_on {
            if self.is_alive(dep) {
                self.nodes[dep.idx as usize].parents.retain(|p| *p != id);
            }
        }
        let parents = core::mem::take(&mut self.nodes[idx].parents);
        for parent in parents {
            if self.is_alive(parent) {
                self.nodes[parent.idx as usize]
                    .depends_on
                    .retain(|d| *d != id);
            }
        }

        let node = &mut self.nodes[idx];
        node.children.clear();
        node.focuses.clear();
        node.pass_focuses.clear();
        node.render_of.clear();
        node.uniforms.clear();
        node.mark = false;
        node.killed = true;

        self.dirty.remove_key(id.idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx] += 1;
        self.free_list.push(id.idx);
    }

    /// Takes the nodes created since the last call.
    pub(crate) fn take_added(&mut self) -> Vec<RenderId> {
        core::mem::take(&mut self.pending_added)
    }

    // -- Internal helpers --

    fn add_dependency(&mut self, node: RenderId, other: RenderId) -> Result<(), Violation> {
        if node == other {
            return Err(Violation::SelfDependency);
        }
        self.validate(other);
        if self.nodes[node.idx as usize].depends_on.contains(&other) {
            return Ok(());
        }
        if self
            .dirty
            .add_dependency(node.idx, other.idx, dirty::CACHE_KILL)
            .is_err()
        {
            return Err(Violation::DependencyCycle);
        }
        self.nodes[node.idx as usize].depends_on.push(other);
        self.nodes[other.idx as usize].parents.push(node);
        Ok(())
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: RenderId) {
        assert!(
            self.is_alive(id),
            "stale RenderId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;

    use kurbo::Rect;

    use super::*;
    use crate::focus::FocusMask;
    use crate::node::{DisplayableId, SurfaceId};

    fn region(rect: Rect) -> FocusRegion {
        FocusRegion::new(DisplayableId(1), None, Some(rect))
    }

    #[test]
    fn create_and_kill() {
        let mut store = RenderStore::new();
        let id = store.create(10.0, 20.0);
        assert!(store.is_alive(id));
        assert_eq!(store.size(id), Size::new(10.0, 20.0));
        store.kill(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = RenderStore::new();
        let id1 = store.create(1.0, 1.0);
        store.kill(id1);
        let id2 = store.create(1.0, 1.0);
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn blit_records_children_and_edges() {
        let mut store = RenderStore::new();
        let parent = store.create(100.0, 100.0);
        let child = store.create(20.0, 20.0);

        store
            .blit(parent, Child::Render(child), Point::new(10.0, 10.0), true, true)
            .unwrap();
        store
            .subpixel_blit(parent, Child::Surface(SurfaceId(3)), Point::new(0.5, 0.0), false, false)
            .unwrap();

        let node = store.get(parent);
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[0].child, Child::Render(child));
        assert_eq!(node.children()[1].mode, BlitMode::Subpixel);
        assert_eq!(node.depends_on(), &[child]);
        assert_eq!(store.get(child).parents(), &[parent]);
    }

    #[test]
    fn shared_child_has_multiple_parents() {
        let mut store = RenderStore::new();
        let a = store.create(10.0, 10.0);
        let b = store.create(10.0, 10.0);
        let shared = store.create(5.0, 5.0);
        store.blit(a, shared.into(), Point::ZERO, true, true).unwrap();
        store.blit(b, shared.into(), Point::ZERO, true, true).unwrap();
        // A second blit of the same child adds no duplicate edge.
        store.blit(a, shared.into(), Point::new(5.0, 0.0), true, true).unwrap();

        assert_eq!(store.get(shared).parents(), &[a, b]);
        assert_eq!(store.get(a).depends_on(), &[shared]);
        assert_eq!(store.get(a).children().len(), 2);
    }

    #[test]
    fn self_blit_is_contract_violation() {
        let mut store = RenderStore::new();
        let id = store.create(1.0, 1.0);
        assert_eq!(
            store.blit(id, id.into(), Point::ZERO, true, true),
            Err(Violation::SelfDependency)
        );
        assert_eq!(store.depends_on(id, id), Err(Violation::SelfDependency));
        assert!(store.get(id).children().is_empty());
    }

    #[test]
    fn dependency_cycle_is_contract_violation() {
        let mut store = RenderStore::new();
        let a = store.create(1.0, 1.0);
        let b = store.create(1.0, 1.0);
        store.depends_on(a, b).unwrap();
        assert_eq!(store.depends_on(b, a), Err(Violation::DependencyCycle));
        assert!(store.get(b).depends_on().is_empty());
    }

    #[test]
    fn render_mask_adds_dependency() {
        let mut store = RenderStore::new();
        let node = store.create(10.0, 10.0);
        let mask = store.create(10.0, 10.0);
        let r = region(Rect::new(0.0, 0.0, 10.0, 10.0)).with_mask(FocusMask {
            origin: Point::ZERO,
            source: MaskSource::Render(mask),
        });
        store.add_focus(node, r).unwrap();
        assert_eq!(store.get(node).depends_on(), &[mask]);

        let predicate = region(Rect::new(0.0, 0.0, 1.0, 1.0)).with_mask(FocusMask {
            origin: Point::ZERO,
            source: MaskSource::Predicate(Rc::new(|_| true)),
        });
        store.add_focus(node, predicate).unwrap();
        assert_eq!(store.get(node).focuses().len(), 2);
        assert_eq!(store.get(node).depends_on().len(), 1);
    }

    #[test]
    fn cache_kill_reaches_transitive_parents() {
        let mut store = RenderStore::new();
        let leaf = store.create(1.0, 1.0);
        let mid = store.create(1.0, 1.0);
        let top = store.create(1.0, 1.0);
        let unrelated = store.create(1.0, 1.0);
        store.blit(mid, leaf.into(), Point::ZERO, true, true).unwrap();
        store.blit(top, mid.into(), Point::ZERO, true, true).unwrap();

        let mut killed = store.propagate_cache_kill(leaf);
        killed.sort_by_key(|id| id.idx);
        assert_eq!(killed, vec![leaf, mid, top]);
        assert!(store.get(top).is_cache_killed());
        assert!(!store.get(unrelated).is_cache_killed());
        // Edges survive a cache kill.
        assert_eq!(store.get(top).children().len(), 1);

        // Already-killed nodes are not reported twice.
        assert!(store.propagate_cache_kill(mid).is_empty());
    }

    #[test]
    fn kill_detaches_from_surviving_neighbors() {
        let mut store = RenderStore::new();
        let parent = store.create(1.0, 1.0);
        let child = store.create(1.0, 1.0);
        store.blit(parent, child.into(), Point::ZERO, true, true).unwrap();

        store.kill(parent);
        assert!(store.get(child).parents().is_empty());
    }

    #[test]
    fn take_added_drains_creation_log() {
        let mut store = RenderStore::new();
        let a = store.create(1.0, 1.0);
        let b = store.create(1.0, 1.0);
        assert_eq!(store.take_added(), vec![a, b]);
        assert!(store.take_added().is_empty());
    }

    #[test]
    fn alpha_is_clamped() {
        let mut store = RenderStore::new();
        let id = store.create(1.0, 1.0);
        store.set_alpha(id, 1.5);
        assert_eq!(store.get(id).alpha(), 1.0);
    }

    #[test]
    fn copy_state_carries_compositing_but_not_structure() {
        let mut store = RenderStore::new();
        let src = store.create(10.0, 10.0);
        store.set_alpha(src, 0.25);
        store.add_shader(src, "blur");
        store.add_focus(src, region(Rect::new(0.0, 0.0, 5.0, 5.0))).unwrap();
        store
            .blit(src, SurfaceId(0).into(), Point::ZERO, false, true)
            .unwrap();

        let dst = store.create(4.0, 4.0);
        store.copy_state(src, dst);
        let node = store.get(dst);
        assert_eq!(node.alpha(), 0.25);
        assert_eq!(node.shaders(), ["blur"]);
        assert!(node.children().is_empty());
        assert!(node.focuses().is_empty());
        assert_eq!(node.size(), Size::new(4.0, 4.0));
    }

    #[test]
    #[should_panic(expected = "stale RenderId")]
    fn killed_handle_panics_on_get() {
        let mut store = RenderStore::new();
        let id = store.create(1.0, 1.0);
        store.kill(id);
        let _ = store.get(id);
    }

    #[test]
    #[should_panic(expected = "stale RenderId")]
    fn killed_handle_panics_on_blit() {
        let mut store = RenderStore::new();
        let parent = store.create(1.0, 1.0);
        let id = store.create(1.0, 1.0);
        store.kill(id);
        let _ = store.blit(parent, id.into(), Point::ZERO, true, true);
    }
}

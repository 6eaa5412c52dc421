// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types surfaced by the render core.
//!
//! Every variant signals a programmer error in a collaborator or in the
//! dependency graph; none of them is retried internally.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Rect, Size};

use crate::node::DisplayableId;

/// The rule a collaborator broke when a [`RenderError::ContractViolation`] is
/// raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation {
    /// A node tried to blit itself or depend on itself.
    SelfDependency,
    /// A dependency edge would have closed a cycle through other nodes.
    DependencyCycle,
    /// A displayable's render callback returned a handle that does not name
    /// a live render node.
    NotARender(DisplayableId),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfDependency => f.write_str("a render cannot depend on itself"),
            Self::DependencyCycle => f.write_str("render dependency would form a cycle"),
            Self::NotARender(d) => write!(f, "{d:?} didn't return a render"),
        }
    }
}

/// Errors from render, cache, subsurface and collection operations.
#[derive(Debug)]
pub enum RenderError {
    /// A collaborator broke the render contract. Fatal to the current
    /// request.
    ContractViolation(Violation),
    /// Cropping a child failed while building a subsurface.
    SubsurfaceFailure {
        /// Declared size of the child that failed.
        child_size: Size,
        /// Crop rectangle in the child's coordinates.
        crop: Rect,
        /// The underlying failure.
        source: Box<Self>,
    },
    /// A render was requested before the subsystem signalled readiness
    /// (developer builds only).
    PreconditionViolation(&'static str),
    /// Render nodes survived a full reset and collection (developer builds
    /// only).
    LeakDetected {
        /// Number of nodes still allocated.
        live: usize,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractViolation(v) => write!(f, "render contract violation: {v}"),
            Self::SubsurfaceFailure {
                child_size,
                crop,
                source,
            } => write!(
                f,
                "creating subsurface failed. child size = ({}, {}), crop = ({}, {}, {}, {}): {source}",
                child_size.width,
                child_size.height,
                crop.x0,
                crop.y0,
                crop.width(),
                crop.height()
            ),
            Self::PreconditionViolation(what) => write!(f, "precondition violated: {what}"),
            Self::LeakDetected { live } => write!(f, "{live} renders are alive at shutdown"),
        }
    }
}

impl core::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::SubsurfaceFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<Violation> for RenderError {
    fn from(v: Violation) -> Self {
        Self::ContractViolation(v)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;
    use core::error::Error as _;

    use super::*;

    #[test]
    fn subsurface_failure_reports_context_and_source() {
        let err = RenderError::SubsurfaceFailure {
            child_size: Size::new(20.0, 10.0),
            crop: Rect::new(1.0, 2.0, 4.0, 6.0),
            source: Box::new(RenderError::ContractViolation(Violation::SelfDependency)),
        };
        let msg = err.to_string();
        assert!(msg.contains("child size = (20, 10)"), "{msg}");
        assert!(msg.contains("crop = (1, 2, 3, 4)"), "{msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn violation_converts_into_contract_violation() {
        let err: RenderError = Violation::NotARender(DisplayableId(7)).into();
        assert_eq!(
            format!("{err}"),
            "render contract violation: DisplayableId(7) didn't return a render"
        );
    }
}

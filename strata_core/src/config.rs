// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render context configuration.

/// Configuration for a [`RenderContext`](crate::context::RenderContext).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Enables developer checks: precondition violations and the leak
    /// detector.
    pub developer: bool,
    /// Whether video-frame root sources keep renders alive across
    /// collections. Only platforms that hold the last decoded frame as a
    /// render need this.
    pub constrained_platform: bool,
    /// In developer mode, rendering before
    /// [`mark_ready`](crate::context::RenderContext::mark_ready) is a
    /// precondition violation.
    pub require_ready: bool,
}

impl RenderConfig {
    /// Configuration for shipping builds: every check is off.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            developer: false,
            constrained_platform: false,
            require_ready: false,
        }
    }

    /// Configuration for development: leak detection and readiness checks.
    #[must_use]
    pub const fn developer() -> Self {
        Self {
            developer: true,
            constrained_platform: false,
            require_ready: true,
        }
    }

    /// Sets [`developer`](Self::developer).
    #[must_use]
    pub const fn with_developer(mut self, developer: bool) -> Self {
        self.developer = developer;
        self
    }

    /// Sets [`constrained_platform`](Self::constrained_platform).
    #[must_use]
    pub const fn with_constrained_platform(mut self, constrained: bool) -> Self {
        self.constrained_platform = constrained;
        self
    }

    /// Sets [`require_ready`](Self::require_ready).
    #[must_use]
    pub const fn with_require_ready(mut self, require_ready: bool) -> Self {
        self.require_ready = require_ready;
        self
    }

    /// Whether a render before readiness must fail.
    pub(crate) const fn enforces_ready(&self) -> bool {
        self.developer && self.require_ready
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(!RenderConfig::production().enforces_ready());
        assert!(RenderConfig::developer().enforces_ready());
        assert_eq!(RenderConfig::default(), RenderConfig::production());
    }

    #[test]
    fn readiness_needs_developer_mode() {
        let cfg = RenderConfig::production().with_require_ready(true);
        assert!(!cfg.enforces_ready());
        assert!(cfg.with_developer(true).enforces_ready());
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect correlation propagation
//!
//! The platform creates a brand-new network object for a redirect target,
//! with no tab, frame or type context of its own. Copying the old object's
//! correlation slot keeps the original classification across the hop.

use crate::pipeline::channel::{NetworkChannel, Phase};

/// Carries correlation state from a redirected network object to its target.
#[derive(Debug, Default)]
pub struct RedirectPropagator;

impl RedirectPropagator {
    /// Create a propagator
    pub fn new() -> Self {
        Self
    }

    /// Copy correlation state from `old` to `new`.
    ///
    /// Only http(s) targets receive state. A missing payload degrades to
    /// "no propagation": the redirected request is then classified from
    /// scratch through the registry/resolver fallback path.
    pub fn propagate(&self, old: &dyn NetworkChannel, new: &mut dyn NetworkChannel) {
        if !matches!(new.url().scheme(), "http" | "https") {
            return;
        }

        let Some(mut state) = old.correlation() else {
            tracing::debug!(url = %new.url(), "redirect target has no correlation state to inherit");
            return;
        };

        // The new object starts its own lifecycle with the inherited details.
        state.phase = Phase::Classified;

        tracing::debug!(
            from = %old.url(),
            to = %new.url(),
            seq = state.seq,
            "propagating correlation across redirect"
        );
        new.attach_correlation(state);
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pipeline configuration

use crate::request::DEFAULT_REGISTRY_CAPACITY;

/// Interception pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Correlation registry capacity, fixed for the pipeline's lifetime.
    ///
    /// Sized to the number of requests that can plausibly sit between the
    /// classification event and the HTTP observation event; entries past it
    /// are evicted oldest-first.
    pub registry_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
        }
    }
}

impl PipelineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry capacity
    pub fn registry_capacity(mut self, capacity: usize) -> Self {
        self.registry_capacity = capacity;
        self
    }
}

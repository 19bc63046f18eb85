// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stage listener chains
//!
//! Ordered lists of filtering-policy callbacks, one per pipeline stage, with
//! per-listener fault isolation: a listener that fails or panics is logged
//! and treated as returning no decision.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::request::{CanonicalRequest, Decision, HeaderEntry};

/// Pipeline stage identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before the request leaves for the network; terminal decisions apply
    BeforeRequest,
    /// Before request headers are sent; header modifications apply
    BeforeSendHeaders,
    /// After response headers arrive; header modifications apply
    HeadersReceived,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BeforeRequest => "before-request",
            Stage::BeforeSendHeaders => "before-send-headers",
            Stage::HeadersReceived => "headers-received",
        };
        f.write_str(name)
    }
}

/// A filtering-policy callback subscribed to one pipeline stage.
///
/// Listeners must be short-running and non-blocking: the host platform cannot
/// be told to wait, so anything asynchronous has to be computed and cached
/// before the stage fires.
pub trait StageListener: Send + Sync {
    /// Listener name used in fault logs
    fn name(&self) -> &str {
        "listener"
    }

    /// Inspect a request and optionally return a decision for it
    fn on_request(&self, request: &CanonicalRequest) -> Result<Option<Decision>>;
}

/// Ordered listener chain for a single stage.
///
/// Listeners run in registration order. The list is snapshotted before each
/// invocation, so a listener registering further listeners cannot deadlock
/// the chain.
pub struct ListenerChain {
    stage: Stage,
    listeners: RwLock<Vec<Arc<dyn StageListener>>>,
}

impl ListenerChain {
    /// Create an empty chain for `stage`
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// The stage this chain serves
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Register a listener at the end of the chain
    pub fn add<L: StageListener + 'static>(&self, listener: L) {
        self.add_arc(Arc::new(listener));
    }

    /// Register a shared listener at the end of the chain
    pub fn add_arc(&self, listener: Arc<dyn StageListener>) {
        self.listeners.write().push(listener);
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Whether the chain has no listeners
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Invoke listeners in registration order, stopping at the first decision
    pub fn notify_first(&self, request: &CanonicalRequest) -> Option<Decision> {
        for listener in self.snapshot() {
            if let Some(decision) = self.invoke(&listener, request) {
                return Some(decision);
            }
        }
        None
    }

    /// Invoke every listener, collecting all decisions in chain order
    pub fn notify_all(&self, request: &CanonicalRequest) -> Vec<Decision> {
        let mut decisions = Vec::new();
        for listener in self.snapshot() {
            if let Some(decision) = self.invoke(&listener, request) {
                decisions.push(decision);
            }
        }
        decisions
    }

    fn snapshot(&self) -> Vec<Arc<dyn StageListener>> {
        self.listeners.read().clone()
    }

    /// Run one listener with fault isolation: an error or panic is logged and
    /// treated as "no decision" so the rest of the chain still runs.
    fn invoke(
        &self,
        listener: &Arc<dyn StageListener>,
        request: &CanonicalRequest,
    ) -> Option<Decision> {
        match panic::catch_unwind(AssertUnwindSafe(|| listener.on_request(request))) {
            Ok(Ok(decision)) => decision,
            Ok(Err(err)) => {
                tracing::warn!(
                    stage = %self.stage,
                    listener = listener.name(),
                    url = %request.url,
                    error = %err,
                    "listener failed"
                );
                None
            }
            Err(_) => {
                tracing::error!(
                    stage = %self.stage,
                    listener = listener.name(),
                    url = %request.url,
                    "listener panicked"
                );
                None
            }
        }
    }
}

/// Attaches fixed headers to requests for a configured first-party endpoint.
///
/// Used to authorize requests to a companion application's API: the endpoint
/// checks the injected headers, which page content cannot forge. Register on
/// the BeforeSendHeaders chain; requests to other origins pass through
/// untouched.
pub struct AuthHeaderInjector {
    base_url: String,
    headers: Vec<HeaderEntry>,
}

impl AuthHeaderInjector {
    /// Create an injector for requests whose URL starts with `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header to inject
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry::new(name, value));
        self
    }
}

impl StageListener for AuthHeaderInjector {
    fn name(&self) -> &str {
        "auth-header-injector"
    }

    fn on_request(&self, request: &CanonicalRequest) -> Result<Option<Decision>> {
        if self.headers.is_empty() || !request.url.as_str().starts_with(&self.base_url) {
            return Ok(None);
        }
        Ok(Some(Decision::modify_headers(self.headers.clone())))
    }
}

/// Logs every request it sees; never returns a decision.
#[derive(Debug, Default)]
pub struct RequestLogger {
    /// Only log requests whose URL contains this fragment
    pub url_filter: Option<String>,
}

impl StageListener for RequestLogger {
    fn name(&self) -> &str {
        "request-logger"
    }

    fn on_request(&self, request: &CanonicalRequest) -> Result<Option<Decision>> {
        if let Some(ref filter) = self.url_filter {
            if !request.url.as_str().contains(filter) {
                return Ok(None);
            }
        }

        tracing::info!(
            url = %request.url,
            request_type = %request.request_type,
            tab_id = request.tab_id,
            frame_id = request.frame_id,
            "request"
        );
        Ok(None)
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The interception pipeline
//!
//! Correlates raw platform network events into canonical requests and drives
//! the three decision stages. Every public entry point is a fault boundary:
//! nothing thrown inside the pipeline or its listeners reaches the host's
//! network stack — a failure means an unfiltered request, never a broken
//! navigation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use url::Url;

use crate::pipeline::channel::{
    ClassifyDetails, CorrelationState, NetworkChannel, Phase, TabResolver,
};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::listener::{ListenerChain, Stage};
use crate::pipeline::redirect::RedirectPropagator;
use crate::request::{
    CanonicalRequest, ContentTypeCode, Decision, RequestDetails, RequestRegistry, NO_FRAME_ID,
};

/// A platform event routed through a single dispatch point.
///
/// Adapters that receive one tagged event stream from their host can forward
/// it to [`InterceptionPipeline::handle`] instead of calling the per-event
/// entry points directly.
pub enum HostEvent<'a> {
    /// Content-classification observation
    Classify(ClassifyDetails),
    /// The request is about to hit the network; headers not yet sent
    HeadersPhase(&'a mut dyn NetworkChannel),
    /// Response headers have arrived
    ResponsePhase(&'a mut dyn NetworkChannel),
    /// The platform replaced `old` with `new` following a redirect
    Redirect {
        old: &'a dyn NetworkChannel,
        new: &'a mut dyn NetworkChannel,
    },
}

/// Orchestrates the three-stage listener chains per request.
///
/// One pipeline value owns the correlation registry and the chains; it is
/// constructed once and passed by reference into whichever adapter drives the
/// host's event loop. Distinct requests may be processed interleaved; the
/// registry lock and each channel's own slot are the only shared state.
pub struct InterceptionPipeline {
    registry: RequestRegistry,
    before_request: ListenerChain,
    before_send_headers: ListenerChain,
    headers_received: ListenerChain,
    redirects: RedirectPropagator,
    tab_resolver: Option<Arc<dyn TabResolver>>,
    seq: AtomicU64,
}

impl InterceptionPipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        tracing::info!(
            registry_capacity = config.registry_capacity,
            "initializing interception pipeline"
        );
        Self {
            registry: RequestRegistry::new(config.registry_capacity),
            before_request: ListenerChain::new(Stage::BeforeRequest),
            before_send_headers: ListenerChain::new(Stage::BeforeSendHeaders),
            headers_received: ListenerChain::new(Stage::HeadersReceived),
            redirects: RedirectPropagator::new(),
            tab_resolver: None,
            seq: AtomicU64::new(0),
        }
    }

    /// Set the tab/frame resolver used when correlation misses
    pub fn with_tab_resolver(mut self, resolver: Arc<dyn TabResolver>) -> Self {
        self.tab_resolver = Some(resolver);
        self
    }

    /// The BeforeRequest chain, for listener registration
    pub fn before_request(&self) -> &ListenerChain {
        &self.before_request
    }

    /// The BeforeSendHeaders chain, for listener registration
    pub fn before_send_headers(&self) -> &ListenerChain {
        &self.before_send_headers
    }

    /// The HeadersReceived chain, for listener registration
    pub fn headers_received(&self) -> &ListenerChain {
        &self.headers_received
    }

    /// The correlation registry, for diagnostics
    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    /// Dispatch a tagged host event to the matching entry point
    pub fn handle(&self, event: HostEvent<'_>) {
        match event {
            HostEvent::Classify(details) => self.on_classify(details),
            HostEvent::HeadersPhase(channel) => self.on_headers_phase(channel),
            HostEvent::ResponsePhase(channel) => self.on_response_phase(channel),
            HostEvent::Redirect { old, new } => self.on_redirect(old, new),
        }
    }

    /// Record a content-classification observation for later correlation.
    ///
    /// The classification event source fires before the HTTP layer sees the
    /// request and knows fields the HTTP layer never learns on its own.
    pub fn on_classify(&self, details: ClassifyDetails) {
        self.guard("classify", || {
            tracing::debug!(
                url = %details.url,
                code = details.content_type.raw(),
                tab_id = details.tab_id,
                "classification observed"
            );
            let url = details.url.clone();
            self.registry.put(url, details.into_details());
        });
    }

    /// Run the BeforeRequest and BeforeSendHeaders stages for a channel that
    /// is about to hit the network.
    pub fn on_headers_phase(&self, channel: &mut dyn NetworkChannel) {
        self.guard("headers-phase", || self.headers_phase_inner(channel));
    }

    /// Run the HeadersReceived stage once response headers are available.
    pub fn on_response_phase(&self, channel: &mut dyn NetworkChannel) {
        self.guard("response-phase", || self.response_phase_inner(channel));
    }

    /// Propagate correlation state across a platform redirect
    pub fn on_redirect(&self, old: &dyn NetworkChannel, new: &mut dyn NetworkChannel) {
        self.guard("redirect", || self.redirects.propagate(old, new));
    }

    fn headers_phase_inner(&self, channel: &mut dyn NetworkChannel) {
        let state = match channel.correlation() {
            Some(state) => match state.phase {
                // Terminated objects never advance; duplicate events for an
                // object that already went through this phase are dropped so
                // BeforeRequest runs exactly once per object.
                Phase::Terminated | Phase::HeadersSent | Phase::Done => {
                    tracing::debug!(url = %channel.url(), phase = ?state.phase, "ignoring duplicate headers-phase event");
                    return;
                }
                // Typically a redirect target carrying inherited details.
                Phase::Classified => state,
            },
            None => self.correlate(channel),
        };

        self.drive_request_stages(channel, state);
    }

    /// Build correlation state for a channel seen for the first time:
    /// registry hit, else synthesized defaults plus resolver lookup.
    fn correlate(&self, channel: &dyn NetworkChannel) -> CorrelationState {
        let hint = channel.content_type_hint().unwrap_or(ContentTypeCode::OTHER);

        let mut correlated = true;
        let mut details = match self.registry.pop(channel.url().as_str()) {
            Some(pending) => {
                let mut details = pending.details;
                // The channel's own load info wins over a stale record.
                if hint != ContentTypeCode::OTHER {
                    details.content_type = hint;
                }
                details
            }
            None => {
                correlated = false;
                let mut details = RequestDetails::synthesized();
                details.content_type = hint;
                if let Some((tab_id, frame_id)) = self.resolve_tab(channel) {
                    details.tab_id = tab_id;
                    details.frame_id = frame_id;
                }
                details
            }
        };

        // Document loads can outlive the tab hint recorded at classification
        // time (pre-rendered or re-parented tabs), so resolve again.
        if correlated && details.content_type == ContentTypeCode::DOCUMENT {
            if let Some((tab_id, _)) = self.resolve_tab(channel) {
                details.tab_id = tab_id;
            }
        }

        if !correlated {
            tracing::debug!(url = %channel.url(), "no pending record, synthesized request details");
        }

        CorrelationState {
            seq: self.next_seq(),
            details,
            phase: Phase::Classified,
        }
    }

    /// Run BeforeRequest and, unless terminated, BeforeSendHeaders.
    fn drive_request_stages(&self, channel: &mut dyn NetworkChannel, mut state: CorrelationState) {
        let request = CanonicalRequest::from_details(channel.url(), &state.details);

        if let Some(decision) = self.run_before_request(&request) {
            if self.apply_terminal(channel, &request, &decision) {
                state.phase = Phase::Terminated;
                channel.attach_correlation(state);
                return;
            }
        }

        self.run_before_send_headers(channel, &request);
        state.phase = Phase::HeadersSent;
        channel.attach_correlation(state);
    }

    fn response_phase_inner(&self, channel: &mut dyn NetworkChannel) {
        let existing = channel.correlation();

        if let Some(ref state) = existing {
            match state.phase {
                Phase::Terminated | Phase::Done => return,
                Phase::Classified | Phase::HeadersSent => {}
            }
        }

        let is_document = existing
            .as_ref()
            .map(|state| state.details.content_type == ContentTypeCode::DOCUMENT)
            .unwrap_or_else(|| channel.is_document_load());

        let mut state = match existing {
            Some(state) => state,
            None => {
                // Some navigations bypass the earlier events entirely; only
                // document loads are worth synthesizing this late.
                if !is_document {
                    return;
                }
                let mut details = RequestDetails::synthesized();
                details.content_type = ContentTypeCode::DOCUMENT;
                details.parent_frame_id = NO_FRAME_ID;
                CorrelationState {
                    seq: self.next_seq(),
                    details,
                    phase: Phase::Classified,
                }
            }
        };

        if is_document {
            if let Some((tab_id, _)) = self.resolve_tab(channel) {
                state.details.tab_id = tab_id;
            }
        }

        let request = CanonicalRequest::from_details(channel.url(), &state.details);

        // Late re-entry: a document that never went through the headers phase
        // still gets BeforeRequest, exactly once, before HeadersReceived.
        if is_document && state.phase == Phase::Classified {
            if let Some(decision) = self.run_before_request(&request) {
                if self.apply_terminal(channel, &request, &decision) {
                    state.phase = Phase::Terminated;
                    channel.attach_correlation(state);
                    return;
                }
            }
        }

        self.run_headers_received(channel, &request);
        state.phase = Phase::Done;
        channel.attach_correlation(state);
    }

    /// First stage: registration-order short-circuit over the BeforeRequest
    /// chain.
    fn run_before_request(&self, request: &CanonicalRequest) -> Option<Decision> {
        let decision = self.before_request.notify_first(request);
        if let Some(ref decision) = decision {
            tracing::debug!(
                url = %request.url,
                request_type = %request.request_type,
                cancel = decision.is_cancel(),
                redirect = decision.redirect_url().is_some(),
                "before-request decision"
            );
        }
        decision
    }

    /// Second stage: every listener runs; header modifications apply in chain
    /// order, so the last writer wins for a given name.
    fn run_before_send_headers(&self, channel: &mut dyn NetworkChannel, request: &CanonicalRequest) {
        let request = request.clone().with_request_headers(channel.request_headers());
        for decision in self.before_send_headers.notify_all(&request) {
            for header in decision.modified_headers() {
                channel.set_request_header(&header.name, &header.value);
            }
        }
    }

    /// Third stage: same merge rule as the second, applied to the response
    /// headers surfaced to the renderer.
    fn run_headers_received(&self, channel: &mut dyn NetworkChannel, request: &CanonicalRequest) {
        let request = request.clone().with_response_headers(channel.response_headers());
        for decision in self.headers_received.notify_all(&request) {
            for header in decision.modified_headers() {
                channel.set_response_header(&header.name, &header.value);
            }
        }
    }

    /// Apply a cancel/redirect outcome; returns true when the channel is
    /// finished and later stages must not run.
    fn apply_terminal(
        &self,
        channel: &mut dyn NetworkChannel,
        request: &CanonicalRequest,
        decision: &Decision,
    ) -> bool {
        if decision.is_cancel() {
            channel.abort();
            return true;
        }

        if let Some(target) = decision.redirect_url() {
            match Url::parse(target) {
                Ok(url) => {
                    channel.redirect(&url);
                    return true;
                }
                Err(err) => {
                    tracing::warn!(
                        url = %request.url,
                        redirect_target = target,
                        error = %err,
                        "unparseable redirect target, request continues unfiltered"
                    );
                }
            }
        }

        false
    }

    fn resolve_tab(&self, channel: &dyn NetworkChannel) -> Option<(i32, i32)> {
        self.tab_resolver.as_ref()?.resolve(channel)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Fault boundary: nothing may propagate into the host's network stack.
    fn guard<F: FnOnce()>(&self, entry: &'static str, f: F) {
        if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
            tracing::error!(entry, "pipeline entry point panicked; request left unfiltered");
        }
    }
}

impl Default for InterceptionPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

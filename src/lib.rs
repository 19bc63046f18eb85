// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Request Interception Pipeline
//!
//! A host-agnostic request interception and correlation core for
//! browser-grade network filtering. Browser-like hosts report the same
//! logical request through several independent event sources with different,
//! sometimes missing fields and no guaranteed ordering; mustekala reconciles
//! them into one canonical per-request lifecycle with three ordered decision
//! stages (BeforeRequest, BeforeSendHeaders, HeadersReceived).
//!
//! ## Features
//!
//! - Correlation registry: bounded URL-keyed FIFO cache pairing partial
//!   observations across event sources
//! - Total request classification: platform content-type codes with
//!   URL-extension fallback, never fails
//! - Three-stage listener chains: registration-order short-circuit for
//!   terminal decisions, last-writer-wins header merging
//! - Redirect propagation: correlation state follows a request onto its
//!   redirect target
//! - WebSocket normalization: http(s)-reported upgrades are handed to
//!   listeners as ws(s)
//! - Fault isolation: a misbehaving listener degrades to an unfiltered
//!   request, never a broken navigation
//!
//! ## Example
//!
//! ```rust
//! use mustekala::{
//!     CanonicalRequest, ClassifyDetails, ContentTypeCode, Decision,
//!     InterceptionPipeline, PipelineConfig, StageListener,
//! };
//!
//! struct AdBlocker;
//!
//! impl StageListener for AdBlocker {
//!     fn name(&self) -> &str {
//!         "ad-blocker"
//!     }
//!
//!     fn on_request(&self, request: &CanonicalRequest) -> mustekala::Result<Option<Decision>> {
//!         if request.url.host_str() == Some("ads.example.net") {
//!             return Ok(Some(Decision::cancel()));
//!         }
//!         Ok(None)
//!     }
//! }
//!
//! let pipeline = InterceptionPipeline::new(PipelineConfig::default());
//! pipeline.before_request().add(AdBlocker);
//!
//! // The host adapter feeds observations as its platform events fire:
//! pipeline.on_classify(
//!     ClassifyDetails::new("https://ads.example.net/banner.js", ContentTypeCode::SCRIPT).tab(7),
//! );
//! ```
//!
//! The host side implements [`NetworkChannel`] over the platform's network
//! object and, optionally, [`TabResolver`] for tab/frame fallback lookups,
//! then forwards platform events to the pipeline entry points (or to
//! [`InterceptionPipeline::handle`] as tagged [`HostEvent`]s).

pub mod error;
pub mod pipeline;
pub mod request;

// Re-exports for convenience

// Errors
pub use error::{Error, Result};

// Request model
pub use request::{
    classify, find_header, request_type_from_path, rewrite_websocket_scheme, set_header,
    CanonicalRequest, ContentTypeCode, Decision, HeaderEntry, PendingRequest, RequestDetails,
    RequestRegistry, RequestType, DEFAULT_REGISTRY_CAPACITY, MAIN_FRAME_ID, NO_FRAME_ID, NO_TAB_ID,
};

// Pipeline
pub use pipeline::{
    AuthHeaderInjector, ClassifyDetails, CorrelationState, HostEvent, InterceptionPipeline,
    ListenerChain, NetworkChannel, Phase, PipelineConfig, RedirectPropagator, RequestLogger, Stage,
    StageListener, TabResolver,
};

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

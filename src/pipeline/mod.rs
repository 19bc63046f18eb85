// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request interception pipeline
//!
//! Turns loosely-correlated platform network events into one canonical
//! per-request lifecycle with three ordered decision stages.

mod channel;
mod config;
mod interception;
mod listener;
mod redirect;

pub use channel::{ClassifyDetails, CorrelationState, NetworkChannel, Phase, TabResolver};
pub use config::PipelineConfig;
pub use interception::{HostEvent, InterceptionPipeline};
pub use listener::{AuthHeaderInjector, ListenerChain, RequestLogger, Stage, StageListener};
pub use redirect::RedirectPropagator;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test doubles for pipeline tests

    use url::Url;

    use super::channel::{CorrelationState, NetworkChannel, TabResolver};
    use crate::request::{set_header, ContentTypeCode, HeaderEntry};

    /// Route pipeline logs to the test output when `RUST_LOG` asks for them.
    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Scripted in-memory channel recording every platform instruction.
    pub(crate) struct TestChannel {
        pub url: Url,
        pub request_headers: Vec<HeaderEntry>,
        pub response_headers: Vec<HeaderEntry>,
        pub correlation: Option<CorrelationState>,
        pub aborted: bool,
        pub redirected_to: Option<Url>,
        pub content_type_hint: Option<ContentTypeCode>,
        pub document_load: bool,
    }

    impl TestChannel {
        pub fn new(url: &str) -> Self {
            Self {
                url: Url::parse(url).expect("test URL must parse"),
                request_headers: Vec::new(),
                response_headers: Vec::new(),
                correlation: None,
                aborted: false,
                redirected_to: None,
                content_type_hint: None,
                document_load: false,
            }
        }
    }

    impl NetworkChannel for TestChannel {
        fn url(&self) -> &Url {
            &self.url
        }

        fn abort(&mut self) {
            self.aborted = true;
        }

        fn redirect(&mut self, target: &Url) {
            self.redirected_to = Some(target.clone());
        }

        fn request_headers(&self) -> Vec<HeaderEntry> {
            self.request_headers.clone()
        }

        fn response_headers(&self) -> Vec<HeaderEntry> {
            self.response_headers.clone()
        }

        fn set_request_header(&mut self, name: &str, value: &str) {
            set_header(&mut self.request_headers, name, value);
        }

        fn set_response_header(&mut self, name: &str, value: &str) {
            set_header(&mut self.response_headers, name, value);
        }

        fn correlation(&self) -> Option<CorrelationState> {
            self.correlation.clone()
        }

        fn attach_correlation(&mut self, state: CorrelationState) {
            self.correlation = Some(state);
        }

        fn content_type_hint(&self) -> Option<ContentTypeCode> {
            self.content_type_hint
        }

        fn is_document_load(&self) -> bool {
            self.document_load
        }
    }

    /// Resolver returning one fixed tab/frame pair.
    pub(crate) struct StaticTabResolver {
        pub tab_id: i32,
        pub frame_id: i32,
    }

    impl TabResolver for StaticTabResolver {
        fn resolve(&self, _channel: &dyn NetworkChannel) -> Option<(i32, i32)> {
            Some((self.tab_id, self.frame_id))
        }
    }
}

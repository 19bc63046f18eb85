// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host platform integration traits
//!
//! The pipeline never talks to a browser API directly. The host's adapter
//! layer implements these traits over whatever network object and tab model
//! the platform exposes, and forwards platform events to the pipeline entry
//! points.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::request::{ContentTypeCode, HeaderEntry, RequestDetails, MAIN_FRAME_ID, NO_FRAME_ID, NO_TAB_ID};

/// Stage progression recorded in a channel's correlation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Correlated; BeforeRequest has not run yet
    Classified,
    /// BeforeRequest and BeforeSendHeaders completed
    HeadersSent,
    /// HeadersReceived completed
    Done,
    /// Canceled or redirected; no further stage runs for this object
    Terminated,
}

/// Correlation payload attached to a network object.
///
/// Plain owned data: the slot never holds a reference into the registry, so
/// there is no cycle between platform objects and pipeline state. The
/// sequence number exists for log correlation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationState {
    /// Monotonic per-pipeline sequence number
    pub seq: u64,
    /// Correlated request metadata
    pub details: RequestDetails,
    /// Stage progression for this network object
    pub phase: Phase,
}

/// A platform network object, as seen by the pipeline.
///
/// One value of this trait corresponds to one in-flight request on the host
/// side. Header mutators use set-by-name (replace) semantics. The correlation
/// slot is an opaque key/value slot owned by the object; the pipeline is its
/// only reader and writer.
pub trait NetworkChannel {
    /// Observed request URL
    fn url(&self) -> &Url;

    /// Abort the request
    fn abort(&mut self);

    /// Redirect the request to `target`
    fn redirect(&mut self, target: &Url);

    /// Outgoing request headers
    fn request_headers(&self) -> Vec<HeaderEntry>;

    /// Received response headers
    fn response_headers(&self) -> Vec<HeaderEntry>;

    /// Set (replace) an outgoing request header
    fn set_request_header(&mut self, name: &str, value: &str);

    /// Set (replace) a response header surfaced to the renderer
    fn set_response_header(&mut self, name: &str, value: &str);

    /// Read the correlation slot
    fn correlation(&self) -> Option<CorrelationState>;

    /// Attach (replace) the correlation slot
    fn attach_correlation(&mut self, state: CorrelationState);

    /// Content-type code carried by the channel's own load info, if the host
    /// knows it
    fn content_type_hint(&self) -> Option<ContentTypeCode> {
        None
    }

    /// Whether the channel is flagged as a top-level document load
    fn is_document_load(&self) -> bool {
        false
    }
}

/// Resolves the tab and frame a channel belongs to.
///
/// Used as a classification fallback when correlation misses; lots of
/// requests (OCSP checks, background fetches) legitimately resolve to none.
pub trait TabResolver: Send + Sync {
    /// Returns `(tab_id, frame_id)`, or None when the request is unrelated
    /// to any tab
    fn resolve(&self, channel: &dyn NetworkChannel) -> Option<(i32, i32)>;
}

/// Raw observation from the content-classification event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyDetails {
    /// Observed request URL
    pub url: String,
    /// Owning tab, or [`NO_TAB_ID`](crate::request::NO_TAB_ID)
    pub tab_id: i32,
    /// Frame the request belongs to
    pub frame_id: i32,
    /// Parent frame, or [`NO_FRAME_ID`](crate::request::NO_FRAME_ID)
    pub parent_frame_id: i32,
    /// Platform content-type code
    pub content_type: ContentTypeCode,
    /// Referrer URL, if observed
    pub referrer_url: Option<String>,
}

impl ClassifyDetails {
    /// Create an observation for `url` with the given content type
    pub fn new(url: impl Into<String>, content_type: ContentTypeCode) -> Self {
        Self {
            url: url.into(),
            tab_id: NO_TAB_ID,
            frame_id: MAIN_FRAME_ID,
            parent_frame_id: NO_FRAME_ID,
            content_type,
            referrer_url: None,
        }
    }

    /// Set the owning tab
    pub fn tab(mut self, tab_id: i32) -> Self {
        self.tab_id = tab_id;
        self
    }

    /// Set frame and parent frame ids
    pub fn frames(mut self, frame_id: i32, parent_frame_id: i32) -> Self {
        self.frame_id = frame_id;
        self.parent_frame_id = parent_frame_id;
        self
    }

    /// Set the referrer URL
    pub fn referrer(mut self, url: impl Into<String>) -> Self {
        self.referrer_url = Some(url.into());
        self
    }

    pub(crate) fn into_details(self) -> RequestDetails {
        RequestDetails {
            tab_id: self.tab_id,
            frame_id: self.frame_id,
            parent_frame_id: self.parent_frame_id,
            content_type: self.content_type,
            referrer_url: self.referrer_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_details_builder() {
        let details = ClassifyDetails::new("https://example.com/frame", ContentTypeCode::SUBDOCUMENT)
            .tab(3)
            .frames(2, 0)
            .referrer("https://example.com/");

        assert_eq!(details.tab_id, 3);
        assert_eq!(details.frame_id, 2);
        assert_eq!(details.parent_frame_id, 0);
        assert_eq!(details.referrer_url.as_deref(), Some("https://example.com/"));

        let converted = details.into_details();
        assert_eq!(converted.content_type, ContentTypeCode::SUBDOCUMENT);
        assert_eq!(converted.tab_id, 3);
    }
}

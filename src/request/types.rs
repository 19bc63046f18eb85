// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Canonical request model
//!
//! The host-agnostic representation of a network request handed to stage
//! listeners, plus the decision type listeners return.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::classify::{classify, rewrite_websocket_scheme, ContentTypeCode};
use crate::error::Result;

/// Frame id of the top-level document
pub const MAIN_FRAME_ID: i32 = 0;
/// Platform sentinel for "no parent frame"
pub const NO_FRAME_ID: i32 = -1;
/// Tab id used when a request cannot be related to any tab
pub const NO_TAB_ID: i32 = -1;

/// Canonical request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Top-level document navigation
    Document,
    /// Embedded frame document
    Subdocument,
    /// Script load
    Script,
    /// Image load
    Image,
    /// Stylesheet load
    Stylesheet,
    /// Plugin object
    Object,
    /// XMLHttpRequest / fetch
    XmlHttpRequest,
    /// Request issued by a plugin object
    ObjectSubrequest,
    /// Font load
    Font,
    /// Audio/video load
    Media,
    /// WebSocket connection
    WebSocket,
    /// Anything else
    Other,
}

impl RequestType {
    /// Whether this request creates a document frame
    pub fn is_frame(self) -> bool {
        matches!(self, RequestType::Document | RequestType::Subdocument)
    }

    /// Whether this is a top-level navigation
    pub fn is_document(self) -> bool {
        self == RequestType::Document
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestType::Document => "DOCUMENT",
            RequestType::Subdocument => "SUBDOCUMENT",
            RequestType::Script => "SCRIPT",
            RequestType::Image => "IMAGE",
            RequestType::Stylesheet => "STYLESHEET",
            RequestType::Object => "OBJECT",
            RequestType::XmlHttpRequest => "XMLHTTPREQUEST",
            RequestType::ObjectSubrequest => "OBJECT_SUBREQUEST",
            RequestType::Font => "FONT",
            RequestType::Media => "MEDIA",
            RequestType::WebSocket => "WEBSOCKET",
            RequestType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// Header name/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    /// Create a new header entry
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Find a header by name (case-insensitive)
pub fn find_header<'a>(headers: &'a [HeaderEntry], name: &str) -> Option<&'a HeaderEntry> {
    headers.iter().find(|h| h.name.eq_ignore_ascii_case(name))
}

/// Set a header value, replacing an existing entry with the same name
/// (case-insensitive) or appending a new one
pub fn set_header(headers: &mut Vec<HeaderEntry>, name: &str, value: &str) {
    match headers.iter_mut().find(|h| h.name.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.value = value.to_string(),
        None => headers.push(HeaderEntry::new(name, value)),
    }
}

/// Partial request metadata correlated across event sources.
///
/// This is the payload that travels through the registry and the channel's
/// correlation slot; a correlation hint, never an authoritative identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDetails {
    /// Owning tab, or [`NO_TAB_ID`]
    pub tab_id: i32,
    /// Frame the request belongs to
    pub frame_id: i32,
    /// Parent frame, or [`NO_FRAME_ID`]
    pub parent_frame_id: i32,
    /// Raw platform content-type code
    pub content_type: ContentTypeCode,
    /// Referrer URL, if observed
    pub referrer_url: Option<String>,
}

impl RequestDetails {
    /// Defaults used when no event source supplied anything usable
    pub fn synthesized() -> Self {
        Self {
            tab_id: NO_TAB_ID,
            frame_id: MAIN_FRAME_ID,
            parent_frame_id: NO_FRAME_ID,
            content_type: ContentTypeCode::OTHER,
            referrer_url: None,
        }
    }
}

/// The result a listener returns from a pipeline stage.
///
/// At most one of cancel/redirect can be set, enforced by construction.
/// Header modifications may accompany any stage, though terminal outcomes are
/// only honored during BeforeRequest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decision {
    cancel: bool,
    redirect_url: Option<String>,
    modified_headers: Vec<HeaderEntry>,
}

impl Decision {
    /// Cancel the request
    pub fn cancel() -> Self {
        Self {
            cancel: true,
            ..Default::default()
        }
    }

    /// Redirect the request to `url`
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            redirect_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Modify headers without affecting the request outcome
    pub fn modify_headers(headers: Vec<HeaderEntry>) -> Self {
        Self {
            modified_headers: headers,
            ..Default::default()
        }
    }

    /// Add one header modification
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.modified_headers.push(HeaderEntry::new(name, value));
        self
    }

    /// Whether the request should be canceled
    pub fn is_cancel(&self) -> bool {
        self.cancel
    }

    /// Redirect target, if any
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    /// Whether this decision ends the request (cancel or redirect)
    pub fn is_terminal(&self) -> bool {
        self.cancel || self.redirect_url.is_some()
    }

    /// Header modifications carried by this decision
    pub fn modified_headers(&self) -> &[HeaderEntry] {
        &self.modified_headers
    }
}

/// The pipeline's normalized, host-agnostic representation of a request.
///
/// Rebuilt fresh at each stage invocation from the channel URL and the
/// correlated [`RequestDetails`]; discarded once the stage's decision has
/// been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRequest {
    /// Request URL (ws/wss for WebSocket upgrades, see below)
    pub url: Url,
    /// Referrer URL, if known
    pub referrer_url: Option<String>,
    /// Owning tab, or [`NO_TAB_ID`]
    pub tab_id: i32,
    /// Resolved request type
    pub request_type: RequestType,
    /// Id of this frame (meaningful for document/subdocument requests)
    pub frame_id: i32,
    /// Id of the frame the request was issued from
    pub request_frame_id: i32,
    /// Outgoing request headers, populated for the BeforeSendHeaders stage
    pub request_headers: Option<Vec<HeaderEntry>>,
    /// Received response headers, populated for the HeadersReceived stage
    pub response_headers: Option<Vec<HeaderEntry>>,
}

impl CanonicalRequest {
    /// Build a canonical request from an observed URL and correlated details.
    ///
    /// Applies the frame relation rules (documents live in frame 0,
    /// subdocuments report their parent's frame as the requesting frame) and
    /// the WebSocket scheme rewrite.
    pub fn from_details(url: &Url, details: &RequestDetails) -> Self {
        let mut frame_id = MAIN_FRAME_ID;
        let mut request_frame_id = MAIN_FRAME_ID;

        match details.content_type {
            ContentTypeCode::DOCUMENT => {}
            ContentTypeCode::SUBDOCUMENT => {
                frame_id = details.frame_id;
                request_frame_id = details.parent_frame_id;
            }
            _ => {
                request_frame_id = details.frame_id;
            }
        }

        // Relate requests without a parent frame to the main frame.
        if request_frame_id == NO_FRAME_ID {
            request_frame_id = MAIN_FRAME_ID;
        }

        let url = if details.content_type == ContentTypeCode::WEBSOCKET {
            rewrite_websocket_scheme(url)
        } else {
            url.clone()
        };
        let request_type = classify(details.content_type, url.path());

        Self {
            url,
            referrer_url: details.referrer_url.clone(),
            tab_id: details.tab_id,
            request_type,
            frame_id,
            request_frame_id,
            request_headers: None,
            response_headers: None,
        }
    }

    /// Attach outgoing request headers
    pub fn with_request_headers(mut self, headers: Vec<HeaderEntry>) -> Self {
        self.request_headers = Some(headers);
        self
    }

    /// Attach received response headers
    pub fn with_response_headers(mut self, headers: Vec<HeaderEntry>) -> Self {
        self.response_headers = Some(headers);
        self
    }

    /// Whether the request uses an http(s) or ws(s) scheme
    pub fn is_http_or_ws(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https" | "ws" | "wss")
    }

    /// Export as JSON, for diagnostics
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(content_type: ContentTypeCode) -> RequestDetails {
        RequestDetails {
            tab_id: 5,
            frame_id: 3,
            parent_frame_id: 1,
            content_type,
            referrer_url: Some("https://example.com/".to_string()),
        }
    }

    #[test]
    fn test_decision_constructors() {
        let cancel = Decision::cancel();
        assert!(cancel.is_cancel());
        assert!(cancel.is_terminal());
        assert!(cancel.redirect_url().is_none());

        let redirect = Decision::redirect("https://mirror.example.com/a.js");
        assert!(!redirect.is_cancel());
        assert!(redirect.is_terminal());
        assert_eq!(redirect.redirect_url(), Some("https://mirror.example.com/a.js"));

        let headers = Decision::modify_headers(vec![]).with_header("X-Test", "1");
        assert!(!headers.is_terminal());
        assert_eq!(headers.modified_headers().len(), 1);
    }

    #[test]
    fn test_document_frame_relation() {
        let url = Url::parse("https://example.com/page").unwrap();
        let req = CanonicalRequest::from_details(&url, &details(ContentTypeCode::DOCUMENT));
        assert_eq!(req.request_type, RequestType::Document);
        assert_eq!(req.frame_id, MAIN_FRAME_ID);
        assert_eq!(req.request_frame_id, MAIN_FRAME_ID);
    }

    #[test]
    fn test_subdocument_frame_relation() {
        let url = Url::parse("https://example.com/frame").unwrap();
        let req = CanonicalRequest::from_details(&url, &details(ContentTypeCode::SUBDOCUMENT));
        assert_eq!(req.request_type, RequestType::Subdocument);
        assert_eq!(req.frame_id, 3);
        // The requesting frame is the parent, never the subdocument's own.
        assert_eq!(req.request_frame_id, 1);
    }

    #[test]
    fn test_orphan_frame_normalization() {
        let url = Url::parse("https://example.com/frame").unwrap();
        let mut d = details(ContentTypeCode::SUBDOCUMENT);
        d.parent_frame_id = NO_FRAME_ID;
        let req = CanonicalRequest::from_details(&url, &d);
        assert_eq!(req.request_frame_id, MAIN_FRAME_ID);
    }

    #[test]
    fn test_subresource_frame_relation() {
        let url = Url::parse("https://example.com/a.js").unwrap();
        let req = CanonicalRequest::from_details(&url, &details(ContentTypeCode::SCRIPT));
        assert_eq!(req.frame_id, MAIN_FRAME_ID);
        assert_eq!(req.request_frame_id, 3);
    }

    #[test]
    fn test_websocket_scheme_rewritten() {
        let url = Url::parse("https://chat.example.com/socket").unwrap();
        let req = CanonicalRequest::from_details(&url, &details(ContentTypeCode::WEBSOCKET));
        assert_eq!(req.url.scheme(), "wss");
        assert_eq!(req.request_type, RequestType::WebSocket);
        assert!(req.is_http_or_ws());
    }

    #[test]
    fn test_header_helpers() {
        let mut headers = vec![HeaderEntry::new("Referer", "https://example.com/")];
        set_header(&mut headers, "referer", "https://other.example.com/");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].value, "https://other.example.com/");

        set_header(&mut headers, "X-Test", "1");
        assert_eq!(headers.len(), 2);
        assert!(find_header(&headers, "x-test").is_some());
        assert!(find_header(&headers, "missing").is_none());
    }
}

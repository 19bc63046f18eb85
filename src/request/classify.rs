// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request classification
//!
//! Maps the host platform's numeric content-type codes to canonical request
//! types, falling back to the URL path extension for generic codes.

use serde::{Deserialize, Serialize};
use url::Url;

use super::types::RequestType;

/// Raw content-type code as reported by the host platform.
///
/// The named constants mirror the codes used by observer-based hosts.
/// Unknown codes are preserved as-is and resolved through the URL-path
/// fallback in [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentTypeCode(pub u32);

impl ContentTypeCode {
    pub const OTHER: ContentTypeCode = ContentTypeCode(1);
    pub const SCRIPT: ContentTypeCode = ContentTypeCode(2);
    pub const IMAGE: ContentTypeCode = ContentTypeCode(3);
    pub const STYLESHEET: ContentTypeCode = ContentTypeCode(4);
    pub const OBJECT: ContentTypeCode = ContentTypeCode(5);
    pub const DOCUMENT: ContentTypeCode = ContentTypeCode(6);
    pub const SUBDOCUMENT: ContentTypeCode = ContentTypeCode(7);
    pub const REFRESH: ContentTypeCode = ContentTypeCode(8);
    pub const XBL: ContentTypeCode = ContentTypeCode(9);
    pub const PING: ContentTypeCode = ContentTypeCode(10);
    pub const XMLHTTPREQUEST: ContentTypeCode = ContentTypeCode(11);
    pub const OBJECT_SUBREQUEST: ContentTypeCode = ContentTypeCode(12);
    pub const DTD: ContentTypeCode = ContentTypeCode(13);
    pub const FONT: ContentTypeCode = ContentTypeCode(14);
    pub const MEDIA: ContentTypeCode = ContentTypeCode(15);
    pub const WEBSOCKET: ContentTypeCode = ContentTypeCode(16);

    /// Raw code value
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Classify a request from its platform code and URL path.
///
/// Total over all inputs: known codes map directly, anything else goes
/// through the path-extension fallback and lands on
/// [`RequestType::Other`] at worst. Never panics.
pub fn classify(code: ContentTypeCode, url_path: &str) -> RequestType {
    match code {
        ContentTypeCode::DOCUMENT => RequestType::Document,
        ContentTypeCode::SUBDOCUMENT => RequestType::Subdocument,
        ContentTypeCode::SCRIPT => RequestType::Script,
        ContentTypeCode::IMAGE => RequestType::Image,
        ContentTypeCode::STYLESHEET => RequestType::Stylesheet,
        ContentTypeCode::OBJECT => RequestType::Object,
        ContentTypeCode::XMLHTTPREQUEST => RequestType::XmlHttpRequest,
        ContentTypeCode::OBJECT_SUBREQUEST => RequestType::ObjectSubrequest,
        ContentTypeCode::FONT => RequestType::Font,
        ContentTypeCode::MEDIA => RequestType::Media,
        ContentTypeCode::WEBSOCKET => RequestType::WebSocket,
        _ => request_type_from_path(url_path).unwrap_or(RequestType::Other),
    }
}

/// Parse a request type from a URL path extension.
///
/// Used when the platform only reports a generic content type.
pub fn request_type_from_path(path: &str) -> Option<RequestType> {
    // The platform sometimes hands us the full path-and-query.
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = name.rsplit_once('.')?;

    match ext.to_ascii_lowercase().as_str() {
        "js" => Some(RequestType::Script),
        "css" => Some(RequestType::Stylesheet),
        "jar" | "swf" => Some(RequestType::Object),
        "mp4" | "flv" | "avi" | "m3u" | "webm" | "mpeg" | "3gp" | "3gpp" | "3g2" | "3gpp2"
        | "ogg" | "mov" | "qt" => Some(RequestType::Media),
        "ttf" | "otf" | "woff" | "woff2" | "eot" => Some(RequestType::Font),
        "ico" | "png" | "gif" | "jpg" | "jpeg" | "webp" => Some(RequestType::Image),
        _ => None,
    }
}

/// Rewrite an http(s) URL reported for a WebSocket upgrade to ws(s).
///
/// Observer-based hosts report WebSocket upgrades at the HTTP layer, so the
/// scheme arrives as http/https. Listeners match against ws/wss rules, so the
/// scheme is normalized before the canonical request is built.
pub fn rewrite_websocket_scheme(url: &Url) -> Url {
    let target = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return url.clone(),
    };

    let mut rewritten = url.clone();
    if rewritten.set_scheme(target).is_ok() {
        return rewritten;
    }

    // set_scheme refuses some scheme transitions; rebuild textually.
    url.as_str()
        .strip_prefix("http")
        .map(|rest| format!("ws{}", rest))
        .and_then(|raw| Url::parse(&raw).ok())
        .unwrap_or_else(|| url.clone())
}

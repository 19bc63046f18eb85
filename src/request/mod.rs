// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Canonical request model, classification and correlation registry

mod classify;
mod registry;
mod types;

pub use classify::{classify, request_type_from_path, rewrite_websocket_scheme, ContentTypeCode};
pub use registry::{PendingRequest, RequestRegistry, DEFAULT_REGISTRY_CAPACITY};
pub use types::{
    find_header, set_header, CanonicalRequest, Decision, HeaderEntry, RequestDetails, RequestType,
    MAIN_FRAME_ID, NO_FRAME_ID, NO_TAB_ID,
};

//! Cached Response Payload
//!
//! The value type stored by the per-entity response caches: enough of an
//! HTTP response to replay it byte-identically on a cache hit.

use serde::{Deserialize, Serialize};

// == Cached Response ==
/// A captured successful response body plus the metadata needed to serve
/// it again exactly as the handler produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedResponse {
    /// HTTP status code of the original response (always 2xx)
    pub status: u16,
    /// Content-Type header of the original response, if any
    pub content_type: Option<String>,
    /// Exact response body bytes
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// Captures a response for storage.
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }
}

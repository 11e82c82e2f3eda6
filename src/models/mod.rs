// src/models/mod.rs
pub mod channel;
pub mod video;

use serde::Serialize;

/// A non-fatal upstream failure recorded on a partial result.
///
/// Best-effort stages (a search sub-query, a playlist page, a detail batch)
/// swallow their errors but leave one of these behind so callers can tell a
/// complete result from a degraded one without reading the logs.
#[derive(Debug, Clone, Serialize)]
pub struct PartialFault {
    pub stage: String,
    pub detail: String,
}

impl PartialFault {
    pub fn new(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            detail: detail.into(),
        }
    }
}

//! Display-ready summary value handed to the rendering client.
//!
//! The server never touches pixels; a renderer lays out `title`, `status`,
//! and `detail` however the target display demands.

/// The one fact a source considers worth showing right now.
///
/// `available` is false when the summary is a degraded default produced
/// after an upstream failure; the text fields are still valid render input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub title: String,
    pub status: String,
    pub detail: Vec<String>,
    pub available: bool,
}

impl Summary {
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            detail: Vec::new(),
            available: true,
        }
    }

    pub fn with_detail(mut self, detail: Vec<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Mark this summary as a degraded default after an upstream failure.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

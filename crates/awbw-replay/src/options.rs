//! Settings applied while opening a replay archive.

use crate::php::DEFAULT_MAX_DEPTH;

/// Limits applied while opening a replay.
///
/// Replays come from an external service; callers that process archives in
/// bulk should keep both limits set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Maximum array/object nesting accepted by the PHP decoder.
    pub max_depth: usize,
    /// Maximum decompressed size of one archive member, in bytes.
    pub max_member_size: Option<u64>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_member_size: None,
        }
    }
}

impl ReplayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_member_size(mut self, limit: u64) -> Self {
        self.max_member_size = Some(limit);
        self
    }
}

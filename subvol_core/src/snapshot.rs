//! Composite snapshot handles.
//!
//! A composite handle packs a version, the cluster-id length, the cluster id
//! (`rook-ceph`, or plain `rook` in older deployments), a hex pool id and the
//! snapshot UUID into one string:
//!
//! ```text
//! 0001-0009-rook-ceph-0000000000000001-17b95621-58e8-4676-bc6a-39e928f19d23
//! ```

use crate::uuid::UUID_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Cluster markers accepted in composite handles, tried in order.
pub const HANDLE_MARKERS: &[&str] = &["rook-ceph-", "rook-"];

static HANDLE_VARIANTS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    HANDLE_MARKERS
        .iter()
        .map(|marker| {
            let pattern = format!(
                "{}(?P<pool>[0-9a-fA-F]+)-(?P<uuid>{})$",
                regex::escape(marker),
                UUID_PATTERN
            );
            let re = Regex::new(&pattern).expect("valid composite handle pattern");
            (*marker, re)
        })
        .collect()
});

/// The parts of a composite handle this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeHandle {
    /// The marker that matched, e.g. `rook-ceph-`.
    pub marker: &'static str,
    /// Pool id segment as written in the handle.
    pub pool_id: String,
    /// Snapshot (or volume) UUID.
    pub uuid: String,
}

/// Parse a composite handle, trying each marker variant in order.
pub fn parse_composite_handle(handle: &str) -> Option<CompositeHandle> {
    HANDLE_VARIANTS.iter().find_map(|(marker, re)| {
        re.captures(handle).map(|caps| CompositeHandle {
            marker: *marker,
            pool_id: caps["pool"].to_string(),
            uuid: caps["uuid"].to_string(),
        })
    })
}

/// Extract the UUID from a composite snapshot handle.
///
/// Returns an empty string when no marker variant matches.
pub fn extract_snapshot_handle_id(handle: &str) -> String {
    match parse_composite_handle(handle) {
        Some(parsed) => {
            tracing::trace!(handle, marker = parsed.marker, "matched composite handle");
            parsed.uuid
        }
        None => {
            tracing::debug!(handle, "no composite handle marker matched");
            String::new()
        }
    }
}

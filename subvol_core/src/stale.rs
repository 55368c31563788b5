//! Stale subvolume detection.
//!
//! A CSI subvolume is stale once no persistent volume references it any more.
//! Callers collect the subvolume listing and the persistent-volume handles
//! from the cluster; this module only decides.

use crate::omap::derive_volume_omap_entry;
use crate::snapshot::extract_snapshot_handle_id;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Cluster-reported state of a subvolume deleted with its snapshots retained.
pub const SNAPSHOT_RETAINED: &str = "snapshot-retained";

/// One subvolume as reported by a subvolume listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubvolumeRecord {
    /// Filesystem the subvolume lives in.
    pub filesystem: String,
    /// Subvolume group.
    pub group: String,
    /// Subvolume name, e.g. `csi-vol-<uuid>`.
    pub name: String,
    /// State reported by the cluster (`complete`, `snapshot-retained`, ...).
    #[serde(default)]
    pub state: Option<String>,
    /// Number of snapshots of the subvolume.
    #[serde(default)]
    pub snapshots: usize,
}

/// Outcome of classifying a subvolume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubvolumeState {
    InUse,
    Stale,
    StaleWithSnapshot,
    SnapshotRetained,
}

impl SubvolumeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubvolumeState::InUse => "in-use",
            SubvolumeState::Stale => "stale",
            SubvolumeState::StaleWithSnapshot => "stale-with-snapshot",
            SubvolumeState::SnapshotRetained => "snapshot-retained",
        }
    }

    /// True for states where nothing references the subvolume.
    pub fn is_stale(&self) -> bool {
        !matches!(self, SubvolumeState::InUse)
    }
}

impl fmt::Display for SubvolumeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subvolumes still referenced by persistent volumes.
#[derive(Debug, Clone, Default)]
pub struct References {
    ids: HashSet<String>,
    names: HashSet<String>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the UUID of a composite volume handle.
    ///
    /// Returns false if the handle has no recognizable UUID; nothing is
    /// recorded in that case.
    pub fn insert_handle(&mut self, handle: &str) -> bool {
        let id = extract_snapshot_handle_id(handle);
        if id.is_empty() {
            tracing::debug!(handle, "ignoring volume handle without uuid");
            return false;
        }
        self.ids.insert(id);
        true
    }

    /// Record a subvolume name verbatim.
    pub fn insert_subvolume_name(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// True if `name` is referenced directly or through its UUID.
    pub fn contains(&self, name: &str) -> bool {
        if self.names.contains(name) {
            return true;
        }

        let entry = derive_volume_omap_entry(name);
        !entry.is_empty() && self.ids.contains(entry.id())
    }

    pub fn len(&self) -> usize {
        self.ids.len() + self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }
}

/// Classify one subvolume against the reference set.
pub fn classify(record: &SubvolumeRecord, refs: &References) -> SubvolumeState {
    if record.state.as_deref() == Some(SNAPSHOT_RETAINED) {
        return SubvolumeState::SnapshotRetained;
    }

    if refs.contains(&record.name) {
        SubvolumeState::InUse
    } else if record.snapshots > 0 {
        SubvolumeState::StaleWithSnapshot
    } else {
        SubvolumeState::Stale
    }
}

/// Classify every record, keeping input order.
pub fn classify_all<'a>(
    records: &'a [SubvolumeRecord],
    refs: &References,
) -> Vec<(&'a SubvolumeRecord, SubvolumeState)> {
    records
        .iter()
        .map(|record| (record, classify(record, refs)))
        .collect()
}

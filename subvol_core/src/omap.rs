//! Object-map entries derived from volume and snapshot handles.
//!
//! The CSI driver keeps one omap object per volume (`csi.volume.<uuid>`) and
//! per snapshot (`csi.snap.<uuid>`), plus a directory object per kind mapping
//! request names to those ids. Derivation is best-effort: a handle without a
//! UUID tail yields an empty [`OmapEntry`] so callers can fall back to a full
//! listing instead of handling an error.

use crate::uuid::UUID_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RADOS namespace holding the CephFS CSI metadata objects.
pub const RADOS_NAMESPACE: &str = "csi";

const VOLUME_VALUE_PREFIX: &str = "csi.volume.";
const SNAP_VALUE_PREFIX: &str = "csi.snap.";

static VOLUME_HANDLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?P<uuid>{})$", UUID_PATTERN)).expect("valid volume handle pattern")
});

static SNAP_HANDLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?P<uuid>{})$", UUID_PATTERN)).expect("valid snapshot handle pattern")
});

/// Which identifier space an omap entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OmapKind {
    /// Subvolumes and NFS exports.
    Volume,
    /// Subvolume snapshots.
    Snap,
}

impl OmapKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OmapKind::Volume => "volume",
            OmapKind::Snap => "snap",
        }
    }

    /// Prefix of per-id object names, e.g. `csi.volume.`.
    pub fn value_prefix(&self) -> &'static str {
        match self {
            OmapKind::Volume => VOLUME_VALUE_PREFIX,
            OmapKind::Snap => SNAP_VALUE_PREFIX,
        }
    }

    /// Directory object mapping request names to ids.
    pub fn directory_object(&self) -> &'static str {
        match self {
            OmapKind::Volume => "csi.volumes.default",
            OmapKind::Snap => "csi.snaps.default",
        }
    }

    /// Key inside the per-id object that stores the request name.
    pub fn name_key(&self) -> &'static str {
        match self {
            OmapKind::Volume => "csi.volname",
            OmapKind::Snap => "csi.snapname",
        }
    }
}

impl fmt::Display for OmapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An omap value together with the id it was built from.
///
/// Both strings are empty when the source handle had no UUID tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmapEntry {
    kind: OmapKind,
    value: String,
    id: String,
}

impl OmapEntry {
    fn empty(kind: OmapKind) -> Self {
        Self {
            kind,
            value: String::new(),
            id: String::new(),
        }
    }

    /// Identifier space of the entry.
    pub fn kind(&self) -> OmapKind {
        self.kind
    }

    /// The omap value, e.g. `csi.volume.<uuid>`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The UUID extracted from the handle.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True if nothing could be derived from the handle.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Split into `(value, id)`.
    pub fn into_parts(self) -> (String, String) {
        (self.value, self.id)
    }
}

/// Derive the volume omap entry for a subvolume or export handle.
///
/// `csi-vol-<uuid>`, `nfs-export-<uuid>` and unprefixed names are treated
/// alike; only a hyphenated UUID at the end of the handle counts.
pub fn derive_volume_omap_entry(handle: &str) -> OmapEntry {
    match VOLUME_HANDLE.captures(handle) {
        Some(caps) => {
            let id = &caps["uuid"];
            OmapEntry {
                kind: OmapKind::Volume,
                value: format!("{}{}", VOLUME_VALUE_PREFIX, id),
                id: id.to_string(),
            }
        }
        None => {
            tracing::debug!(handle, "volume handle has no uuid tail");
            OmapEntry::empty(OmapKind::Volume)
        }
    }
}

/// Derive the snapshot omap entry for a `csi-snap-<uuid>` handle.
pub fn derive_snap_omap_entry(handle: &str) -> OmapEntry {
    let Some(caps) = SNAP_HANDLE.captures(handle) else {
        tracing::debug!(handle, "snapshot handle has no uuid tail");
        return OmapEntry::empty(OmapKind::Snap);
    };

    let id = caps["uuid"].to_string();
    OmapEntry {
        kind: OmapKind::Snap,
        value: format!("{}{}", SNAP_VALUE_PREFIX, id),
        id,
    }
}

/// A single object-map mutation for a storage client to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OmapOp {
    /// Remove one key from an omap object.
    RemoveKey {
        namespace: &'static str,
        object: String,
        key: String,
    },
    /// Remove a whole object.
    RemoveObject {
        namespace: &'static str,
        object: String,
    },
}

impl fmt::Display for OmapOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OmapOp::RemoveKey {
                namespace,
                object,
                key,
            } => write!(f, "rmomapkey --namespace {} {} {}", namespace, object, key),
            OmapOp::RemoveObject { namespace, object } => {
                write!(f, "rm --namespace {} {}", namespace, object)
            }
        }
    }
}

/// Plan the omap cleanup for a stale volume or snapshot.
///
/// The directory key is removed first so the request name stops resolving
/// before its target object disappears. Without a request name (the caller
/// could not read `name_key` from the object) only the object is removed. An
/// empty entry yields an empty plan.
pub fn cleanup_plan(entry: &OmapEntry, request_name: Option<&str>) -> Vec<OmapOp> {
    if entry.is_empty() {
        return Vec::new();
    }

    let mut ops = Vec::with_capacity(2);

    if let Some(name) = request_name.filter(|n| !n.is_empty()) {
        ops.push(OmapOp::RemoveKey {
            namespace: RADOS_NAMESPACE,
            object: entry.kind.directory_object().to_string(),
            key: format!("{}{}", entry.kind.value_prefix(), name),
        });
    }

    ops.push(OmapOp::RemoveObject {
        namespace: RADOS_NAMESPACE,
        object: entry.value.clone(),
    });

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uuid::strategy;

    const ID: &str = "427774b4-340b-11ed-8d66-0242ac110005";

    #[test]
    fn test_volume_entry_table() {
        let cases = [
            (
                "csi-vol-427774b4-340b-11ed-8d66-0242ac110005",
                "csi.volume.427774b4-340b-11ed-8d66-0242ac110005",
                "427774b4-340b-11ed-8d66-0242ac110005",
            ),
            (
                "nfs-export-427774b4-340b-11ed-8d66-0242ac110005",
                "csi.volume.427774b4-340b-11ed-8d66-0242ac110005",
                "427774b4-340b-11ed-8d66-0242ac110005",
            ),
            ("", "", ""),
            ("csi-427774b4-340b-11ed-8d66-0242ac11000", "", ""),
            ("csi-427774b440b11ed8d660242ac11000", "", ""),
        ];

        for (handle, value, id) in cases {
            let entry = derive_volume_omap_entry(handle);
            assert_eq!(entry.value(), value, "value for {:?}", handle);
            assert_eq!(entry.id(), id, "id for {:?}", handle);
            assert_eq!(entry.kind(), OmapKind::Volume);
        }
    }

    #[test]
    fn test_snap_entry_table() {
        let cases = [
            (
                "csi-snap-427774b4-340b-11ed-8d66-0242ac110005",
                "csi.snap.427774b4-340b-11ed-8d66-0242ac110005",
                "427774b4-340b-11ed-8d66-0242ac110005",
            ),
            ("", "", ""),
            ("csi-427774b4-340b-11ed-8d66-0242ac11000", "", ""),
            ("csi-427774b440b11ed8d660242ac11000", "", ""),
        ];

        for (handle, value, id) in cases {
            let entry = derive_snap_omap_entry(handle);
            assert_eq!(entry.value(), value, "value for {:?}", handle);
            assert_eq!(entry.id(), id, "id for {:?}", handle);
            assert_eq!(entry.kind(), OmapKind::Snap);
        }
    }

    #[test]
    fn test_uuid_must_be_at_the_tail() {
        let handle = format!("csi-vol-{}-extra", ID);
        assert!(derive_volume_omap_entry(&handle).is_empty());
        assert!(derive_snap_omap_entry(&handle).is_empty());
    }

    #[test]
    fn test_uppercase_id_kept_verbatim() {
        let entry = derive_volume_omap_entry("csi-vol-427774B4-340B-11ED-8D66-0242AC110005");
        assert_eq!(entry.id(), "427774B4-340B-11ED-8D66-0242AC110005");
        assert_eq!(
            entry.value(),
            "csi.volume.427774B4-340B-11ED-8D66-0242AC110005"
        );
    }

    #[test]
    fn test_into_parts() {
        let (value, id) = derive_snap_omap_entry(&format!("csi-snap-{}", ID)).into_parts();
        assert_eq!(value, format!("csi.snap.{}", ID));
        assert_eq!(id, ID);

        let (value, id) = derive_snap_omap_entry("").into_parts();
        assert!(value.is_empty());
        assert!(id.is_empty());
    }

    #[test]
    fn test_kind_objects() {
        assert_eq!(OmapKind::Volume.directory_object(), "csi.volumes.default");
        assert_eq!(OmapKind::Snap.directory_object(), "csi.snaps.default");
        assert_eq!(OmapKind::Volume.name_key(), "csi.volname");
        assert_eq!(OmapKind::Snap.name_key(), "csi.snapname");
        assert_eq!(OmapKind::Snap.to_string(), "snap");
    }

    #[test]
    fn test_cleanup_plan_with_request_name() {
        let entry = derive_volume_omap_entry(&format!("csi-vol-{}", ID));
        let plan = cleanup_plan(&entry, Some("pvc-0a1b"));

        assert_eq!(
            plan,
            vec![
                OmapOp::RemoveKey {
                    namespace: "csi",
                    object: "csi.volumes.default".to_string(),
                    key: "csi.volume.pvc-0a1b".to_string(),
                },
                OmapOp::RemoveObject {
                    namespace: "csi",
                    object: format!("csi.volume.{}", ID),
                },
            ]
        );
    }

    #[test]
    fn test_cleanup_plan_snapshot_without_name() {
        let entry = derive_snap_omap_entry(&format!("csi-snap-{}", ID));

        for name in [None, Some("")] {
            let plan = cleanup_plan(&entry, name);
            assert_eq!(plan.len(), 1);
            assert_eq!(
                plan[0].to_string(),
                format!("rm --namespace csi csi.snap.{}", ID)
            );
        }
    }

    #[test]
    fn test_cleanup_plan_empty_entry() {
        let entry = derive_volume_omap_entry("not-a-handle");
        assert!(cleanup_plan(&entry, Some("pvc-1")).is_empty());
    }

    #[test]
    fn test_op_display_remove_key() {
        let op = OmapOp::RemoveKey {
            namespace: RADOS_NAMESPACE,
            object: "csi.snaps.default".to_string(),
            key: "csi.snap.snapshot-1".to_string(),
        };
        assert_eq!(
            op.to_string(),
            "rmomapkey --namespace csi csi.snaps.default csi.snap.snapshot-1"
        );
    }

    #[test]
    fn test_entry_serializes() {
        let entry = derive_volume_omap_entry(&format!("csi-vol-{}", ID));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "volume");
        assert_eq!(json["value"], format!("csi.volume.{}", ID));
        assert_eq!(json["id"], ID);
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn prop_any_prefix_then_uuid(prefix in ".{0,24}", u in strategy::uuid()) {
            let handle = format!("{}{}", prefix, u);

            let vol = derive_volume_omap_entry(&handle);
            prop_assert_eq!(vol.value(), format!("csi.volume.{}", u));
            prop_assert_eq!(vol.id(), u.as_str());

            let snap = derive_snap_omap_entry(&handle);
            prop_assert_eq!(snap.value(), format!("csi.snap.{}", u));
            prop_assert_eq!(snap.id(), u.as_str());
        }

        #[test]
        fn prop_concatenated_hex_is_empty(prefix in "(csi-|csi-vol-|)", hex in "[0-9a-f]{0,48}") {
            let handle = format!("{}{}", prefix, hex);
            prop_assert!(derive_volume_omap_entry(&handle).is_empty());
            prop_assert!(derive_volume_omap_entry(&handle).value().is_empty());
            prop_assert!(derive_snap_omap_entry(&handle).is_empty());
            prop_assert!(derive_snap_omap_entry(&handle).value().is_empty());
        }

        #[test]
        fn prop_volume_and_snap_differ_only_in_kind(u in strategy::uuid()) {
            let vol = derive_volume_omap_entry(&format!("csi-vol-{}", u));
            let snap = derive_snap_omap_entry(&format!("csi-snap-{}", u));

            prop_assert_eq!(vol.id(), snap.id());
            prop_assert_ne!(vol.value(), snap.value());
            prop_assert_eq!(
                vol.value().replacen("volume", "snap", 1),
                snap.value().to_string()
            );
        }

        #[test]
        fn prop_derivation_is_pure(handle in ".{0,64}") {
            prop_assert_eq!(derive_volume_omap_entry(&handle), derive_volume_omap_entry(&handle));
            prop_assert_eq!(derive_snap_omap_entry(&handle), derive_snap_omap_entry(&handle));
        }
    }
}

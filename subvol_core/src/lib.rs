//! # Subvol Core
//!
//! Naming conventions of CephFS CSI volumes.
//!
//! A CSI subvolume is known by three names at once: the handle handed out to
//! callers (`csi-vol-<uuid>`, or a composite `0001-0009-rook-ceph-...-<uuid>`),
//! the omap objects holding its metadata (`csi.volume.<uuid>`), and its
//! filesystem path (`/volumes/<group>/<name>/<uuid>`). This library translates
//! between them without touching the cluster.
//!
//! ## Features
//!
//! - Omap entries for volume and snapshot handles
//! - Name extraction from subvolume paths
//! - UUID extraction from composite snapshot handles
//! - Omap cleanup plans for stale volumes and snapshots
//! - Stale subvolume classification
//!
//! ## Example
//!
//! ```
//! use subvol_core::{derive_volume_omap_entry, extract_name_from_subvolume_path};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let entry = derive_volume_omap_entry("csi-vol-427774b4-340b-11ed-8d66-0242ac110005");
//! assert_eq!(entry.value(), "csi.volume.427774b4-340b-11ed-8d66-0242ac110005");
//! assert_eq!(entry.id(), "427774b4-340b-11ed-8d66-0242ac110005");
//!
//! let name = extract_name_from_subvolume_path("/volumes/_nogroup/csi-vol-1")?;
//! assert_eq!(name, "csi-vol-1");
//! # Ok(())
//! # }
//! ```

mod error;
mod omap;
mod path;
mod snapshot;
mod stale;
mod uuid;

pub use error::{Error, Result};
pub use omap::{
    OmapEntry, OmapKind, OmapOp, RADOS_NAMESPACE, cleanup_plan, derive_snap_omap_entry,
    derive_volume_omap_entry,
};
pub use path::{SubvolumePath, VOLUMES_ROOT, extract_name_from_subvolume_path};
pub use snapshot::{
    CompositeHandle, HANDLE_MARKERS, extract_snapshot_handle_id, parse_composite_handle,
};
pub use stale::{
    References, SNAPSHOT_RETAINED, SubvolumeRecord, SubvolumeState, classify, classify_all,
};
pub use uuid::{UUID_LEN, is_uuid_shaped};

//! Subvolume paths.
//!
//! CephFS reports subvolume paths as `/volumes/<group>/<name>/<uuid>`. The
//! meaningful name is the final segment: the instance UUID for CSI-managed
//! subvolumes, or the handle itself for flatter layouts.

use crate::error::{Error, Result};
use crate::uuid::is_uuid_shaped;
use serde::Serialize;
use std::fmt;

/// Root directory of all subvolumes in a CephFS filesystem.
pub const VOLUMES_ROOT: &str = "volumes";

/// Return the final segment of a subvolume path.
///
/// Fails only when the path has no `/` at all, which includes the empty
/// string. A trailing slash yields an empty name.
pub fn extract_name_from_subvolume_path(path: &str) -> Result<String> {
    match path.rsplit_once('/') {
        Some((_, name)) => Ok(name.to_string()),
        None => Err(Error::invalid_path(path)),
    }
}

/// A path in the `/volumes/<group>/<name>/<uuid>` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubvolumePath {
    /// Subvolume group, e.g. `csi` or `_nogroup`.
    pub group: String,
    /// Subvolume name, e.g. `csi-vol-<uuid>`.
    pub name: String,
    /// Instance directory UUID.
    pub instance: String,
}

impl SubvolumePath {
    /// Parse a full subvolume path.
    pub fn parse(path: &str) -> Result<Self> {
        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| Error::invalid_subvolume_path(path, "path is not absolute"))?;

        let segments: Vec<&str> = rest.split('/').collect();
        let [root, group, name, instance] = segments.as_slice() else {
            return Err(Error::invalid_subvolume_path(
                path,
                format!("expected 4 segments, got {}", segments.len()),
            ));
        };

        if *root != VOLUMES_ROOT {
            return Err(Error::invalid_subvolume_path(
                path,
                format!("expected /{} root", VOLUMES_ROOT),
            ));
        }

        if group.is_empty() || name.is_empty() {
            return Err(Error::invalid_subvolume_path(path, "empty path segment"));
        }

        if !is_uuid_shaped(instance) {
            return Err(Error::invalid_subvolume_path(
                path,
                format!("instance {:?} is not a uuid", instance),
            ));
        }

        Ok(Self {
            group: group.to_string(),
            name: name.to_string(),
            instance: instance.to_string(),
        })
    }
}

impl fmt::Display for SubvolumePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}/{}/{}/{}",
            VOLUMES_ROOT, self.group, self.name, self.instance
        )
    }
}

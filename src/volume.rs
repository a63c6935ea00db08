use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

use crate::platform::device_id;

/// Decides whether two paths live on the same volume.
pub trait VolumeProbe {
    fn same_volume(&self, a: &Path, b: &Path) -> bool;
}

/// Volume lookup backed by device ids, with the mounted disk list as fallback.
pub struct SystemVolumes {
    disks: Disks,
}

impl SystemVolumes {
    pub fn new() -> Self {
        SystemVolumes {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl VolumeProbe for SystemVolumes {
    fn same_volume(&self, a: &Path, b: &Path) -> bool {
        if let (Ok(Some(x)), Ok(Some(y))) = (device_id(a), device_id(b)) {
            return x == y;
        }
        let mounts: Vec<&Path> = self.disks.iter().map(|d| d.mount_point()).collect();
        match (mount_point(a, &mounts), mount_point(b, &mounts)) {
            (Some(x), Some(y)) => x == y,
            // Unknown volumes are never assumed equal.
            _ => false,
        }
    }
}

/// Longest mount point containing `path`.
pub fn mount_point(path: &Path, mounts: &[&Path]) -> Option<PathBuf> {
    let abs_path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path_str = abs_path.to_string_lossy();
    let normalized_path = if path_str.starts_with(r"\\?\") {
        &path_str[4..]
    } else {
        &path_str
    };
    let normalized_path = Path::new(normalized_path);

    mounts
        .iter()
        .filter(|mount| normalized_path.starts_with(mount))
        .max_by_key(|mount| mount.components().count())
        .map(|mount| mount.to_path_buf())
}

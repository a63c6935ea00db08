use anyhow::Result;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

pub fn device_id(path: &Path) -> Result<Option<u64>> {
    let metadata = std::fs::metadata(path)?;
    Ok(Some(metadata.dev()))
}

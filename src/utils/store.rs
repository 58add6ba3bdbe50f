use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::models::Snapshot;

// Loads the previously stored snapshot.
// A missing, empty or unreadable store counts as a first run and yields an
// empty snapshot, so every course on the page is reported as new.
pub fn load(path: &Path) -> Snapshot {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            if path.exists() {
                warn!("Failed to read previous snapshot {:?}: {}", path, e);
            } else {
                info!("No previous snapshot at {:?}", path);
            }
            return Snapshot::empty();
        }
    };

    if contents.trim().is_empty() {
        return Snapshot::empty();
    }

    match serde_json::from_str(&contents) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Previous snapshot {:?} is not valid, starting fresh: {}", path, e);
            Snapshot::empty()
        }
    }
}

pub fn to_json(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    snapshot
        .serialize(&mut serializer)
        .context("Failed to serialize snapshot")?;
    buf.push(b'\n');
    Ok(buf)
}

// Writes the snapshot next to `path` first and renames it into place, so
// the store is either the old snapshot or the new one.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = to_json(snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut file = fs::File::create(tmp_path).with_context(|| format!("Failed to create {:?}", tmp_path))?;
    file.write_all(&json)
        .and_then(|_| file.sync_all())
        .with_context(|| format!("Failed to write {:?}", tmp_path))?;
    drop(file);

    fs::rename(tmp_path, path).with_context(|| format!("Failed to replace snapshot {:?}", path))?;
    info!("Snapshot saved to {:?}", path);
    Ok(())
}

use crate::types::{InsarError, InsarResult};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extract a granule archive next to itself and delete the archive.
///
/// Entries overwrite existing files of the same name. Returns the directory
/// the entries were extracted into.
pub fn stage_archive<P: AsRef<Path>>(zip_path: P) -> InsarResult<PathBuf> {
    let zip_path = zip_path.as_ref();
    let root = match zip_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    extract_into(zip_path, &root)?;
    fs::remove_file(zip_path)?;
    log::debug!("Removed archive {}", zip_path.display());

    Ok(root)
}

/// Extract every entry of `zip_path` under `dest`
pub fn extract_into(zip_path: &Path, dest: &Path) -> InsarResult<usize> {
    log::info!("Extracting {} into {}", zip_path.display(), dest.display());

    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| InsarError::Archive(format!("Failed to open ZIP {}: {}", zip_path.display(), e)))?;

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                log::warn!("Skipping unsafe archive entry: {}", entry.name());
                continue;
            }
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    log::debug!("Extracted {} files from {}", extracted, zip_path.display());
    Ok(extracted)
}

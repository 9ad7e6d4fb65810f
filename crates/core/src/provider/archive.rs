//! Subtitle extraction from downloaded ZIP archives.
//!
//! The search API serves every download as a ZIP, usually containing a
//! single subtitle file but occasionally several (per-release variants,
//! nfo files). Extraction picks the largest member with a subtitle
//! extension and flattens it into the destination directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use super::ProviderError;

/// File extensions recognized as subtitle files.
const SUBTITLE_EXTENSIONS: &[&str] = &[".srt", ".ass", ".ssa", ".sub", ".vtt", ".sbv"];

fn is_subtitle_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    SUBTITLE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Extract the subtitle file from `archive_path` into `dest_dir`.
///
/// Returns the path of the extracted file. The archive itself is left in
/// place; callers own its cleanup.
pub fn extract_subtitle(archive_path: &Path, dest_dir: &Path) -> Result<PathBuf, ProviderError> {
    let file = File::open(archive_path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ProviderError::Archive(e.to_string()))?;

    // Pick the largest subtitle member; nfo/txt padding is ignored.
    let mut selected: Option<(usize, String, u64)> = None;
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| ProviderError::Archive(e.to_string()))?;
        if !is_subtitle_name(entry.name()) {
            continue;
        }
        let size = entry.size();
        match &selected {
            Some((_, _, best)) if *best >= size => {}
            _ => selected = Some((index, entry.name().to_string(), size)),
        }
    }

    let Some((index, name, size)) = selected else {
        return Err(ProviderError::Archive(format!(
            "no subtitle file in archive {}",
            archive_path.display()
        )));
    };

    debug!(member = %name, size, "Extracting subtitle from archive");

    // Flatten: the member may sit in a subdirectory inside the archive.
    let filename = Path::new(&name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ProviderError::Archive(format!("bad member name: {}", name)))?;
    let target = dest_dir.join(filename);

    let mut entry = archive
        .by_index(index)
        .map_err(|e| ProviderError::Archive(e.to_string()))?;
    let mut out = File::create(&target)?;
    io::copy(&mut entry, &mut out)?;

    Ok(target)
}

/// Remove a scratch file, logging rather than failing on error.
pub fn remove_scratch_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), "Failed to remove scratch file: {}", e);
    }
}

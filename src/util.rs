use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Replace `path` with `contents` so readers see either the old file or the
/// new one, never a partial write.
///
/// The temp file is created next to the target so the final rename stays on
/// one filesystem.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Relative path from the directory holding `from` to `to`, for links inside
/// generated documents. Falls back to `to` unchanged when the two do not share
/// a parent.
pub fn relative_link(from: &Path, to: &Path) -> String {
    let base = from.parent().unwrap_or(Path::new(""));
    let rel = to.strip_prefix(base).unwrap_or(to);
    let rendered = rel.to_string_lossy().replace('\\', "/");
    if rel.is_relative() && !rendered.starts_with(['/', '.']) {
        format!("./{rendered}")
    } else {
        rendered
    }
}

use std::path::{Path, PathBuf};

pub fn ensure_dirs(upload_folder: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)
}

/// Strips any path components from a client-supplied filename.
pub fn sanitize_filename(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

/// Artifact name derived from a submission's source label.
pub fn analysis_filename(source: &str) -> String {
    format!("{}.txt", source)
}

/// Writes an uploaded document into staging. Same-name uploads overwrite;
/// the last writer wins.
pub fn save_upload(upload_folder: &Path, filename: &str, data: &[u8]) -> std::io::Result<PathBuf> {
    let path = upload_folder.join(filename);
    std::fs::write(&path, data)?;
    Ok(path)
}

/// Persists an analysis result as a UTF-8 artifact in staging.
pub fn save_analysis(
    upload_folder: &Path,
    filename: &str,
    content: &str,
) -> std::io::Result<PathBuf> {
    let path = upload_folder.join(filename);
    std::fs::write(&path, content)?;
    Ok(path)
}

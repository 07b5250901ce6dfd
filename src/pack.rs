use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

#[derive(Debug, Error)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>, PackError> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        entries.push((name, entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Deflate every file of `out_dir` into `archive`, in sorted-name order.
/// Member timestamps and permissions are fixed so equal inputs give equal bytes.
pub fn pack(out_dir: &Path, archive: &Path) -> Result<Vec<String>, PackError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(File::create(archive)?);
    let mut members = Vec::new();
    for (name, path) in sorted_entries(out_dir)? {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&std::fs::read(&path)?)?;
        members.push(name);
    }
    zip.finish()?;
    Ok(members)
}

//! Archive extraction and hashing

use crate::Result;
use autospec_errors::DraftError;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive as TarArchive;
use tokio::task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Tar,
    TarGz,
    TarXz,
    TarBz2,
    Zip,
}

fn format_of(path: &Path) -> Option<Format> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(Format::TarGz)
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        Some(Format::TarXz)
    } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
        Some(Format::TarBz2)
    } else if name.ends_with(".tar") {
        Some(Format::Tar)
    } else if name.ends_with(".zip") {
        Some(Format::Zip)
    } else {
        None
    }
}

fn failed(message: String) -> autospec_errors::Error {
    DraftError::ExtractionFailed { message }.into()
}

/// Extract an archive into `dest_dir` and return the source root.
///
/// The source root is the single top-level directory of the archive when
/// there is exactly one, `dest_dir` otherwise.
pub async fn extract(archive_path: &Path, dest_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| failed(format!("Failed to create destination directory: {e}")))?;

    let format = format_of(archive_path).ok_or_else(|| DraftError::UnsupportedArchiveFormat {
        path: archive_path.display().to_string(),
    })?;

    match format {
        Format::Tar => unpack_tar(archive_path.to_path_buf(), dest_dir.to_path_buf()).await?,
        Format::TarGz => extract_tar_gz(archive_path.to_path_buf(), dest_dir.to_path_buf()).await?,
        Format::TarXz | Format::TarBz2 => {
            extract_compressed_tar(archive_path, dest_dir, format).await?;
        }
        Format::Zip => extract_zip(archive_path.to_path_buf(), dest_dir.to_path_buf()).await?,
    }

    source_root(dest_dir).await
}

async fn source_root(dest_dir: &Path) -> Result<PathBuf> {
    let mut entries = tokio::fs::read_dir(dest_dir)
        .await
        .map_err(|e| failed(format!("Failed to list {}: {e}", dest_dir.display())))?;

    let mut dirs = Vec::new();
    let mut others = 0usize;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| failed(format!("Failed to list {}: {e}", dest_dir.display())))?
    {
        if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            dirs.push(entry.path());
        } else {
            others += 1;
        }
    }

    Ok(match (dirs.len(), others) {
        (1, 0) => dirs.remove(0),
        _ => dest_dir.to_path_buf(),
    })
}

/// Extract a tar.gz archive
async fn extract_tar_gz(archive_path: PathBuf, dest_dir: PathBuf) -> Result<()> {
    task::spawn_blocking(move || {
        let tar_gz = File::open(&archive_path)
            .map_err(|e| failed(format!("Failed to open archive: {e}")))?;
        let mut archive = TarArchive::new(GzDecoder::new(tar_gz));
        archive
            .unpack(&dest_dir)
            .map_err(|e| failed(format!("Failed to extract tar.gz: {e}")))
    })
    .await
    .map_err(|e| failed(format!("Task join error: {e}")))?
}

/// Extract a plain tar archive
async fn unpack_tar(archive_path: PathBuf, dest_dir: PathBuf) -> Result<()> {
    task::spawn_blocking(move || {
        let tar = File::open(&archive_path)
            .map_err(|e| failed(format!("Failed to open archive: {e}")))?;
        TarArchive::new(tar)
            .unpack(&dest_dir)
            .map_err(|e| failed(format!("Failed to extract tar: {e}")))
    })
    .await
    .map_err(|e| failed(format!("Task join error: {e}")))?
}

/// Decompress xz or bzip2 into a scratch tar, then unpack it
async fn extract_compressed_tar(archive_path: &Path, dest_dir: &Path, format: Format) -> Result<()> {
    use async_compression::tokio::bufread::{BzDecoder, XzDecoder};
    use tokio::io::{AsyncWriteExt, BufReader};

    let temp_dir =
        tempfile::tempdir().map_err(|e| failed(format!("Failed to create temp directory: {e}")))?;
    let temp_path = temp_dir.path().join("archive.tar");

    {
        let input = tokio::fs::File::open(archive_path)
            .await
            .map_err(|e| failed(format!("Failed to open archive: {e}")))?;
        let mut output = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| failed(format!("Failed to create temp file: {e}")))?;
        let reader = BufReader::new(input);

        let copied = if format == Format::TarXz {
            tokio::io::copy(&mut XzDecoder::new(reader), &mut output).await
        } else {
            tokio::io::copy(&mut BzDecoder::new(reader), &mut output).await
        };
        copied.map_err(|e| failed(format!("Failed to decompress archive: {e}")))?;

        output
            .flush()
            .await
            .map_err(|e| failed(format!("Failed to flush temp file: {e}")))?;
    }

    let result = unpack_tar(temp_path, dest_dir.to_path_buf()).await;
    drop(temp_dir);
    result
}

/// Extract a zip archive
async fn extract_zip(archive_path: PathBuf, dest_dir: PathBuf) -> Result<()> {
    task::spawn_blocking(move || {
        let file = File::open(&archive_path)
            .map_err(|e| failed(format!("Failed to open archive: {e}")))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| failed(format!("Failed to read zip archive: {e}")))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| failed(format!("Failed to read zip entry: {e}")))?;

            let Some(outpath) = entry.enclosed_name().map(|p| dest_dir.join(p)) else {
                continue;
            };

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)
                    .map_err(|e| failed(format!("Failed to create directory: {e}")))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| failed(format!("Failed to create parent directory: {e}")))?;
            }
            let mut outfile = File::create(&outpath)
                .map_err(|e| failed(format!("Failed to create file: {e}")))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| failed(format!("Failed to extract file: {e}")))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
                }
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| failed(format!("Task join error: {e}")))?
}

/// Hex SHA-256 of a file
pub async fn sha256_file(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    task::spawn_blocking(move || {
        let mut file = File::open(&path)
            .map_err(|e| autospec_errors::Error::io_with_path(&e, &path))?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)
            .map_err(|e| autospec_errors::Error::io_with_path(&e, &path))?;
        Ok(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(|e| failed(format!("Task join error: {e}")))?
}

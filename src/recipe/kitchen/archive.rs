// src/recipe/kitchen/archive.rs

//! Archive utilities for the Kitchen

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::process::Command;
use tracing::debug;
use xz2::read::XzDecoder;

/// Source archive formats the kitchen can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarBz2,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a file name
    pub fn from_filename(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// File name of a download, taken from the last URL path segment
pub fn archive_filename(url: &str) -> Result<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::ParseError(format!("URL has no file name: {}", url))),
    }
}

/// Extract an archive into a destination directory
///
/// Supports: .tar.gz, .tgz, .tar.xz, .txz, .tar, .zip in-process and
/// .tar.bz2, .tbz2 through the system `tar`.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let filename = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let archive_error = |reason: String| Error::ArchiveError {
        archive: filename.to_string(),
        reason,
    };

    let format = ArchiveFormat::from_filename(filename)
        .ok_or_else(|| archive_error("unknown archive format".to_string()))?;

    fs::create_dir_all(dest)?;
    debug!("Extracting {} ({:?}) into {}", filename, format, dest.display());

    let file = File::open(archive)
        .map_err(|e| archive_error(format!("cannot open: {}", e)))?;

    let result = match format {
        ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(file), dest),
        ArchiveFormat::TarXz => unpack_tar(XzDecoder::new(file), dest),
        ArchiveFormat::Tar => unpack_tar(file, dest),
        ArchiveFormat::Zip => unpack_zip(file, dest),
        ArchiveFormat::TarBz2 => unpack_with_system_tar(archive, dest),
    };

    result.map_err(archive_error)
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> std::result::Result<(), String> {
    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|e| format!("corrupt tarball: {}", e))
}

fn unpack_zip(file: File, dest: &Path) -> std::result::Result<(), String> {
    let mut zip = zip::ZipArchive::new(file).map_err(|e| format!("corrupt zip: {}", e))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| format!("corrupt zip entry: {}", e))?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(format!("unsafe path in zip: {}", entry.name()));
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| e.to_string())?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| e.to_string())?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| format!("failed to extract {}: {}", entry.name(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

fn unpack_with_system_tar(archive: &Path, dest: &Path) -> std::result::Result<(), String> {
    let output = Command::new("tar")
        .arg("-xjf")
        .arg(archive)
        .arg("-C")
        .arg(dest)
        .output()
        .map_err(|e| format!("tar failed: {}", e))?;

    if !output.status.success() {
        return Err(format!(
            "tar exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ArchiveFormat::from_filename("a.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_filename("a.tar.xz"), Some(ArchiveFormat::TarXz));
        assert_eq!(ArchiveFormat::from_filename("a.tar.bz2"), Some(ArchiveFormat::TarBz2));
        assert_eq!(ArchiveFormat::from_filename("v3.0.1.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_filename("jom.exe"), None);
    }

    #[test]
    fn test_archive_filename_from_url() {
        assert_eq!(
            archive_filename("https://github.com/gabime/spdlog/archive/v0.16.3.zip").unwrap(),
            "v0.16.3.zip"
        );
        assert_eq!(
            archive_filename("https://example.com/libfoo-1.2.tar.gz?download=1").unwrap(),
            "libfoo-1.2.tar.gz"
        );
        assert!(archive_filename("https://example.com/").is_err());
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("libfoo-1.2.tar.gz");
        write_tar_gz(&archive, &[("libfoo-1.2/configure", "#!/bin/sh\n")]);

        let dest = temp.path().join("sources");
        extract_archive(&archive, &dest).unwrap();
        assert!(dest.join("libfoo-1.2/configure").is_file());
    }

    #[test]
    fn test_extract_archive_unknown_format() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("file.unknown");
        fs::write(&archive, "data").unwrap();
        let result = extract_archive(&archive, temp.path());
        assert!(matches!(result, Err(Error::ArchiveError { .. })));
    }

    #[test]
    fn test_corrupt_archive_is_archive_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.tar.gz");
        fs::write(&archive, "definitely not gzip").unwrap();
        let result = extract_archive(&archive, &temp.path().join("out"));
        assert!(matches!(result, Err(Error::ArchiveError { .. })));
    }
}

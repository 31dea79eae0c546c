//! Archive unpacking for downloaded tool distributions.
//!
//! Formats are recognized by file extension: tar.gz/tgz, tar.bz2 and zip,
//! the three shapes upstream vendors actually ship. Unpacking overwrites
//! existing files, so re-provisioning does not need to prepare the
//! destination.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, RigupError};

/// Unpack `archive` beneath `dest`, creating `dest` if needed.
pub fn unpack(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    tracing::info!("extracting {} to {}", archive.display(), dest.display());
    std::fs::create_dir_all(dest)?;

    let file = File::open(archive)?;
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        let decoder = flate2::read::GzDecoder::new(file);
        tar::Archive::new(decoder).unpack(dest)?;
    } else if name.ends_with(".tar.bz2") {
        let decoder = bzip2::read::BzDecoder::new(file);
        tar::Archive::new(decoder).unpack(dest)?;
    } else if name.ends_with(".zip") {
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| RigupError::Archive(format!("{}: {}", archive.display(), e)))?;
        zip.extract(dest)
            .map_err(|e| RigupError::Archive(format!("{}: {}", archive.display(), e)))?;
    } else {
        return Err(RigupError::Archive(format!(
            "unsupported archive format: {}",
            archive.display()
        )));
    }

    Ok(())
}

/// `unpack` on the blocking pool, for use from async provisioning steps.
pub async fn unpack_async(archive: PathBuf, dest: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || unpack(&archive, &dest)).await?
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn tar_with_file(rel_path: &str, content: &[u8]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, rel_path, content).unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_unpack_tar_gz() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("cmake-3.0.1-Linux-i386.tar.gz");

        let tar_bytes = tar_with_file("cmake-3.0.1-Linux-i386/bin/cmake", b"binary");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        std::fs::write(&archive_path, encoder.finish().unwrap()).unwrap();

        let dest = tmp.path().join("opt");
        unpack(&archive_path, &dest).unwrap();

        let extracted = dest.join("cmake-3.0.1-Linux-i386/bin/cmake");
        assert_eq!(std::fs::read(extracted).unwrap(), b"binary");
    }

    #[test]
    fn test_unpack_tar_bz2() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("f90cache-0.95.tar.bz2");

        let tar_bytes = tar_with_file("f90cache-0.95/configure", b"#!/bin/sh\n");
        let mut encoder =
            bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        std::fs::write(&archive_path, encoder.finish().unwrap()).unwrap();

        let dest = tmp.path().join("out");
        unpack(&archive_path, &dest).unwrap();

        assert!(dest.join("f90cache-0.95/configure").exists());
    }

    #[test]
    fn test_unpack_zip() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("cmake-win32-x86.zip");

        let file = File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(
                "cmake-win32-x86/bin/cmake.exe",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
        writer.write_all(b"mz").unwrap();
        writer.finish().unwrap();

        let dest = tmp.path().join("Program Files");
        unpack(&archive_path, &dest).unwrap();

        let extracted = dest.join("cmake-win32-x86/bin/cmake.exe");
        assert_eq!(std::fs::read(extracted).unwrap(), b"mz");
    }

    #[test]
    fn test_unpack_overwrites_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("tool.tar.gz");

        let tar_bytes = tar_with_file("tool/data.txt", b"new");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        std::fs::write(&archive_path, encoder.finish().unwrap()).unwrap();

        let dest = tmp.path().join("dest");
        std::fs::create_dir_all(dest.join("tool")).unwrap();
        std::fs::write(dest.join("tool/data.txt"), b"old").unwrap();

        unpack(&archive_path, &dest).unwrap();
        assert_eq!(std::fs::read(dest.join("tool/data.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("installer.7z");
        std::fs::write(&archive_path, b"7z").unwrap();

        let result = unpack(&archive_path, tmp.path());
        assert!(matches!(result, Err(RigupError::Archive(_))));
    }

    #[tokio::test]
    async fn test_unpack_async() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("tool.tgz");

        let tar_bytes = tar_with_file("tool/bin/tool", b"bin");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        std::fs::write(&archive_path, encoder.finish().unwrap()).unwrap();

        let dest = tmp.path().join("dest");
        unpack_async(archive_path, dest.clone()).await.unwrap();
        assert!(dest.join("tool/bin/tool").exists());
    }
}

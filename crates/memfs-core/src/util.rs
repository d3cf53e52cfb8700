//! Whole-file helpers built on the [`Filesystem`] contract

use std::io;

use crate::error::{FsError, FsResult};
use crate::fs::{File, Filesystem};
use crate::types::{FileMode, OpenFlags};

/// Writes `data` to `filename`, creating or truncating it.
pub fn write_file<F>(fs: &mut F, filename: &str, data: &[u8], perm: FileMode) -> FsResult<()>
where
    F: Filesystem + ?Sized,
{
    let mut file = fs.open_file(
        filename,
        OpenFlags::WRONLY | OpenFlags::CREATE | OpenFlags::TRUNC,
        perm,
    )?;

    let written = file.write(data)?;
    if written < data.len() {
        return Err(FsError::Io(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write to {filename}: {written} of {} bytes", data.len()),
        )));
    }
    file.close()
}

/// Reads the whole of `filename`.
pub fn read_file<F>(fs: &mut F, filename: &str) -> FsResult<Vec<u8>>
where
    F: Filesystem + ?Sized,
{
    let mut file = fs.open(filename)?;
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }
    file.close()?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryFs;

    #[test]
    fn test_write_then_read_file() {
        let mut fs = MemoryFs::new();
        write_file(&mut fs, "/docs/readme", b"contents", FileMode::new(0o644)).unwrap();
        assert_eq!(read_file(&mut fs, "/docs/readme").unwrap(), b"contents");

        // rewriting truncates
        write_file(&mut fs, "/docs/readme", b"new", FileMode::new(0o644)).unwrap();
        assert_eq!(read_file(&mut fs, "/docs/readme").unwrap(), b"new");
    }

    #[test]
    fn test_read_large_file() {
        let mut fs = MemoryFs::new();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        write_file(&mut fs, "/big", &data, FileMode::new(0o600)).unwrap();
        assert_eq!(read_file(&mut fs, "/big").unwrap(), data);
    }

    #[test]
    fn test_read_missing_file() {
        let mut fs = MemoryFs::new();
        let err = read_file(&mut fs, "/missing").unwrap_err();
        assert!(err.is_not_found());
    }
}

//! Atomic output files.
//!
//! Outputs are written to a temporary file next to the destination and only
//! renamed into place once the writer closure succeeds, so a failed run never
//! leaves a truncated result behind.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{PeptideError, Result};

/// A fully written temporary file waiting to be moved onto its destination.
pub struct StagedFile {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renames the temporary file onto its destination.
    pub fn persist(self) -> Result<()> {
        let path = self.path;
        self.tmp
            .persist(&path)
            .map_err(|e| PeptideError::io(&path, e.error))?;
        Ok(())
    }
}

/// Runs `write` against a temporary file in the destination directory.
/// Nothing is visible at `path` until the returned file is persisted; on
/// error or drop the temporary file is removed.
pub fn stage<F>(path: &Path, write: F) -> Result<StagedFile>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PeptideError::io(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".peptominer_")
        .tempfile_in(dir)
        .map_err(|e| PeptideError::io(dir, e))?;

    {
        let mut writer = BufWriter::new(&mut tmp);
        write(&mut writer)?;
        writer.flush().map_err(|e| PeptideError::io(path, e))?;
    }

    Ok(StagedFile {
        tmp,
        path: path.to_path_buf(),
    })
}

pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    stage(path, write)?.persist()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_atomic(&path, |w| {
            writeln!(w, "hello").map_err(|e| PeptideError::io("out.txt", e))
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_atomic_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let res = write_atomic(&path, |w| {
            writeln!(w, "partial").map_err(|e| PeptideError::io("out.txt", e))?;
            Err(PeptideError::format("input.tsv", Some(3), "bad row"))
        });
        assert!(res.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0, "temporary file must be removed");
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let staged = stage(&path, |w| {
            writeln!(w, "pending").map_err(|e| PeptideError::io("out.txt", e))
        })
        .unwrap();
        assert_eq!(staged.path(), path.as_path());
        assert!(!path.exists());
        drop(staged);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

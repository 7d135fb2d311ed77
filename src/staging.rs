//! Staging of in-memory input as a file the point reader can open.

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const STAGING_PREFIX: &str = "lidar-decode-";

/// Input bytes written out to a uniquely named file.
///
/// The file belongs to the decode call that created it and is removed when the
/// value is dropped.
#[derive(Debug)]
pub struct StagedInput {
    file: NamedTempFile,
}

impl StagedInput {
    /// Writes `bytes` verbatim to a fresh file inside `dir`.
    ///
    /// The name carries a random token so concurrent calls never collide.
    pub fn create(bytes: &[u8], dir: &Path) -> io::Result<StagedInput> {
        let mut file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".laz")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        log::debug!("staged {} bytes at {:?}", bytes.len(), file.path());
        Ok(StagedInput { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Removes the staged file. A file that is already gone is not an error.
    pub fn remove(self) -> io::Result<()> {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => {
                log::debug!("removed staged input {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_bytes_verbatim() {
        let dir = tempdir().unwrap();
        let staged = StagedInput::create(b"LASF\x01\x02", dir.path()).unwrap();
        assert_eq!(fs::read(staged.path()).unwrap(), b"LASF\x01\x02");
        assert!(staged.path().starts_with(dir.path()));
        let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("lidar-decode-") && name.ends_with(".laz"));
    }

    #[test]
    fn names_are_unique_per_call() {
        let dir = tempdir().unwrap();
        let a = StagedInput::create(b"a", dir.path()).unwrap();
        let b = StagedInput::create(b"b", dir.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn remove_deletes_the_file() {
        let dir = tempdir().unwrap();
        let staged = StagedInput::create(b"data", dir.path()).unwrap();
        let path = staged.path().to_path_buf();
        staged.remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_deletes_the_file() {
        let dir = tempdir().unwrap();
        let path = {
            let staged = StagedInput::create(b"data", dir.path()).unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn removing_a_missing_file_is_fine() {
        let dir = tempdir().unwrap();
        let staged = StagedInput::create(b"data", dir.path()).unwrap();
        fs::remove_file(staged.path()).unwrap();
        assert!(staged.remove().is_ok());
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(StagedInput::create(b"data", &missing).is_err());
    }
}

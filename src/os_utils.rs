//! Utilities pertaining to the filesystem
//!

use camino::Utf8Path;
use simple_error::{SimpleResult, bail};

/// Create a directory path if it does not exist already
///
/// If the directory already exists no operations are performed
///
/// * `label` - used to describe the directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) -> SimpleResult<()> {
    if !dir.is_dir() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            bail!("Can't create new {} directory at '{}': {}", label, dir, e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dir_all() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = Utf8Path::from_path(dir.path()).unwrap();

        let new_dir = dir_path.join("a").join("b");
        create_dir_all(&new_dir, "test").unwrap();
        assert!(new_dir.is_dir());

        // Existing directories are accepted
        create_dir_all(&new_dir, "test").unwrap();

        let filename = dir_path.join("file");
        std::fs::write(&filename, "").unwrap();
        assert!(create_dir_all(&filename.join("c"), "test").is_err());
    }
}

//! Filesystem utilities for code generation

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Render into memory, then write the file only if its content changed.
///
/// Returns whether the file was (re)written.
pub fn write_rendered<P, F>(path: P, render: F) -> io::Result<bool>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let path = path.as_ref();

    let mut buffer = Vec::new();
    render(&mut buffer)?;

    if let Ok(existing) = fs::read(path) {
        if existing == buffer {
            return Ok(false);
        }
    }

    write_file(path, buffer)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user/user.model.ts");

        write_file(&path, "export class UserModel {}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "export class UserModel {}");
    }

    #[test]
    fn test_write_rendered_skips_identical_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("post/post.dto.ts");

        let first = write_rendered(&path, |out| out.write_all(b"a")).unwrap();
        let second = write_rendered(&path, |out| out.write_all(b"a")).unwrap();
        let third = write_rendered(&path, |out| out.write_all(b"b")).unwrap();

        assert!(first);
        assert!(!second);
        assert!(third);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }
}

// Spellbook - platform/fs.rs
//
// Filesystem helpers for reading local exports.

use std::io;
use std::path::Path;

/// Size of the file at `path` in bytes.
pub fn file_size(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_lossy_replaces_invalid_utf8() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("spells.txt");
        std::fs::write(&path, b"Name: Fire\xffball\n").expect("write");

        let text = read_file_lossy(&path).unwrap();
        assert!(text.starts_with("Name: Fire"));
        assert!(text.contains('\u{FFFD}'));
        assert_eq!(file_size(&path).unwrap(), 16);
    }
}

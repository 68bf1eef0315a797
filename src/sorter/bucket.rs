//! Bucket key derivation
//!
//! A file's bucket is its last extension component, lowercased. Files
//! without an extension (including dotfiles such as `.bashrc`) land in
//! [`NO_EXT_BUCKET`].

use std::path::Path;

/// Bucket used for files that have no extension
pub const NO_EXT_BUCKET: &str = "no_ext";

/// Derive the bucket key for a file path
///
/// # Example
///
/// ```
/// use fanout::sorter::bucket_for;
///
/// assert_eq!(bucket_for("a.TXT"), "txt");
/// assert_eq!(bucket_for("archive.tar.gz"), "gz");
/// assert_eq!(bucket_for("c"), "no_ext");
/// ```
pub fn bucket_for(path: impl AsRef<Path>) -> String {
    match path.as_ref().extension() {
        Some(ext) if !ext.is_empty() => ext.to_string_lossy().to_lowercase(),
        _ => NO_EXT_BUCKET.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_extension() {
        assert_eq!(bucket_for("a.TXT"), "txt");
        assert_eq!(bucket_for("photo.JpEg"), "jpeg");
    }

    #[test]
    fn test_only_last_component() {
        assert_eq!(bucket_for("archive.tar.gz"), "gz");
        assert_eq!(bucket_for("/data/nested/report.final.DOCX"), "docx");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(bucket_for("c"), NO_EXT_BUCKET);
        assert_eq!(bucket_for("/src/nested/Makefile"), NO_EXT_BUCKET);
        assert_eq!(bucket_for("trailing."), NO_EXT_BUCKET);
        assert_eq!(bucket_for(".bashrc"), NO_EXT_BUCKET);
    }
}

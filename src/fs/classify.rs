//! Extension classification
//!
//! Maps a file path to the key of the destination folder it belongs in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Normalized file extension: lower-case, no leading dot.
///
/// The empty key stands for "no extension".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionKey(String);

impl ExtensionKey {
    /// Key for files without an extension
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the no-extension key
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExtensionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Classify a path by its final dot-separated suffix.
///
/// Leading dots of the base name never start an extension, so `.bashrc`
/// has none while `.config.toml` is `toml`. A trailing dot (`notes.`)
/// yields the empty key. Non UTF-8 names are converted lossily.
pub fn classify(path: &Path) -> ExtensionKey {
    let Some(name) = path.file_name() else {
        return ExtensionKey::none();
    };
    let name = name.to_string_lossy();
    let stem = name.trim_start_matches('.');

    match stem.rsplit_once('.') {
        Some((_, ext)) => ExtensionKey(ext.to_lowercase()),
        None => ExtensionKey::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(path: &str) -> String {
        classify(Path::new(path)).as_str().to_string()
    }

    #[test]
    fn test_basic_extensions() {
        assert_eq!(key("/src/a.TXT"), "txt");
        assert_eq!(key("sub/b.txt"), "txt");
        assert_eq!(key("photo.JpEg"), "jpeg");
        assert_eq!(key("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(key("/src/c"), "");
        assert_eq!(key("Makefile"), "");
        assert!(classify(Path::new("README")).is_empty());
    }

    #[test]
    fn test_dotfiles() {
        assert_eq!(key(".bashrc"), "");
        assert_eq!(key("..hidden"), "");
        assert_eq!(key(".config.toml"), "toml");
    }

    #[test]
    fn test_trailing_dot() {
        assert_eq!(key("notes."), "");
        assert_eq!(key("a..b"), "b");
    }

    #[test]
    fn test_dotted_directory_does_not_leak() {
        assert_eq!(key("/some.dir/file"), "");
        assert_eq!(key("v1.2/readme.MD"), "md");
    }

    #[test]
    fn test_root_and_empty() {
        assert!(classify(Path::new("/")).is_empty());
        assert!(classify(Path::new("")).is_empty());
    }

    proptest! {
        #[test]
        fn prop_case_insensitive(stem in "[a-zA-Z0-9_]{1,12}", ext in "[a-zA-Z0-9]{1,6}") {
            let lower = classify(Path::new(&format!("{}.{}", stem, ext.to_lowercase())));
            let upper = classify(Path::new(&format!("{}.{}", stem, ext.to_uppercase())));
            prop_assert_eq!(lower, upper);
        }

        #[test]
        fn prop_depth_independent(dirs in proptest::collection::vec("[a-z.]{1,6}", 0..5), ext in "[a-zA-Z]{1,5}") {
            let mut path = std::path::PathBuf::new();
            for dir in &dirs {
                path.push(dir);
            }
            path.push(format!("file.{}", ext));
            let key = classify(&path);
            prop_assert_eq!(key.as_str(), ext.to_lowercase());
        }

        #[test]
        fn prop_key_has_no_dot_or_uppercase(name in "[a-zA-Z.]{0,16}") {
            let k = classify(Path::new(&name));
            prop_assert!(!k.as_str().contains('.'));
            prop_assert_eq!(k.as_str().to_lowercase(), k.as_str());
        }
    }
}

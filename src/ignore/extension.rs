//! Static extension denylist

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions skipped before any rule file is consulted
pub static DEFAULT_IGNORED_EXTENSIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut set = HashSet::new();

    // Vector images are text but carry no typing signal
    set.insert("svg");

    // Raster images
    set.insert("png");
    set.insert("jpg");
    set.insert("jpeg");
    set.insert("gif");
    set.insert("bmp");
    set.insert("ico");
    set.insert("webp");
    set.insert("tiff");

    set
});

/// Extension denylist, seeded from [`DEFAULT_IGNORED_EXTENSIONS`]
///
/// Extensions are stored lower-case without the leading dot, so `".PNG"`,
/// `"png"` and `"Png"` all name the same entry.
#[derive(Debug, Clone)]
pub struct ExtensionDenylist {
    extensions: HashSet<String>,
}

impl ExtensionDenylist {
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Denylist with no entries at all
    pub fn empty() -> Self {
        Self {
            extensions: HashSet::new(),
        }
    }

    pub fn add_extension(&mut self, ext: &str) {
        let ext = normalize(ext);
        if !ext.is_empty() {
            self.extensions.insert(ext);
        }
    }

    pub fn remove_extension(&mut self, ext: &str) {
        self.extensions.remove(&normalize(ext));
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(&normalize(ext))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Whether the path's extension is denied
    pub fn is_denied(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy();
        if self.contains(&ext) {
            tracing::trace!("Ignoring file by extension: {} ({})", path.display(), ext);
            return true;
        }
        false
    }
}

impl Default for ExtensionDenylist {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_denylist() {
        let denylist = ExtensionDenylist::new();
        assert!(denylist.is_denied(Path::new("logo.svg")));
        assert!(denylist.is_denied(Path::new("assets/photo.JPG")));
        assert!(!denylist.is_denied(Path::new("main.rs")));
        assert!(!denylist.is_denied(Path::new("Makefile")));
        assert_eq!(denylist.len(), DEFAULT_IGNORED_EXTENSIONS.len());
    }

    #[test]
    fn test_add_and_remove_extension() {
        let mut denylist = ExtensionDenylist::new();
        denylist.add_extension(".lock");
        assert!(denylist.is_denied(Path::new("Cargo.lock")));

        denylist.remove_extension("SVG");
        assert!(!denylist.is_denied(Path::new("logo.svg")));

        denylist.add_extension(".");
        assert!(!denylist.contains(""));
    }

    #[test]
    fn test_empty_denylist() {
        let denylist = ExtensionDenylist::empty();
        assert!(denylist.is_empty());
        assert!(!denylist.is_denied(Path::new("logo.svg")));
    }
}

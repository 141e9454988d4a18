//! Finder tag access for filesystem entries.
//!
//! The OS facility stores a list of tag names per entry. xplor only ever
//! reads the first name and only ever writes a list of zero or one names,
//! so a write always replaces whatever was there before.
//!
//! Nothing is cached: every call goes straight to the entry's metadata.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::FinderTagStore;

use std::path::Path;

use crate::config::TagMode;

/// Whether the tag-name resource key can be used on this system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCapability {
    Supported,
    Unsupported,
}

/// Errors raised by a [`TagStore`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// The OS rejected the metadata call; `message` is its own diagnostic
    #[error("{message}")]
    Os { path: String, message: String },
    /// The tag API is not available on this system
    #[error("Finder tags are not supported on this system")]
    Unsupported,
    /// A path or tag name cannot be handed to the OS API (not UTF-8, interior NUL)
    #[error("Value cannot be passed to the tag API: {value:?}")]
    InvalidValue { value: String },
}

/// Backend holding the tag-name list of filesystem entries.
pub trait TagStore: Send + Sync {
    fn capability(&self) -> TagCapability;

    /// Full tag-name list of the entry at `path`, in OS order.
    fn read_tags(&self, path: &Path) -> Result<Vec<String>, TagError>;

    /// Replace the tag-name list of the entry at `path`.
    fn write_tags(&self, path: &Path, tags: &[String]) -> Result<(), TagError>;
}

/// Result of a tag lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLookup {
    Present(String),
    /// No tag, or the lookup failed
    Absent,
    /// The system has no tag API; nothing was read
    Unsupported,
}

impl TagLookup {
    /// Collapse to the two-state form used on the wire.
    pub fn into_option(self) -> Option<String> {
        match self {
            TagLookup::Present(tag) => Some(tag),
            TagLookup::Absent | TagLookup::Unsupported => None,
        }
    }
}

/// Outcome of a successful tag write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagWrite {
    Written,
    /// The system has no tag API; nothing was written
    Skipped,
}

/// Trim a requested tag. `None` means "clear all tags".
pub fn normalize_tag(tag: &str) -> Option<&str> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads and writes the single xplor tag of a path.
#[derive(Debug, Default)]
pub struct TagAccessor<S = FinderTagStore> {
    store: S,
    mode: TagMode,
}

impl<S: TagStore> TagAccessor<S> {
    pub fn new(store: S, mode: TagMode) -> Self {
        Self { store, mode }
    }

    /// Effective capability: the store's, unless configuration turned tags off.
    pub fn capability(&self) -> TagCapability {
        match self.mode {
            TagMode::Off => TagCapability::Unsupported,
            TagMode::Auto => self.store.capability(),
        }
    }

    /// First tag of the entry at `path`.
    ///
    /// Never fails: an OS error (missing entry, permission denied) is
    /// reported as [`TagLookup::Absent`].
    pub fn get_tag(&self, path: &Path) -> TagLookup {
        if self.capability() == TagCapability::Unsupported {
            tracing::debug!(path = %path.display(), "Tag API unavailable, skipping lookup");
            return TagLookup::Unsupported;
        }

        match self.store.read_tags(path) {
            Ok(tags) => match tags.into_iter().next() {
                Some(tag) => TagLookup::Present(tag),
                None => TagLookup::Absent,
            },
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Tag lookup failed");
                TagLookup::Absent
            }
        }
    }

    /// Replace the tags of the entry at `path` with the trimmed `tag`,
    /// or clear them when `tag` is blank.
    pub fn set_tag(&self, path: &Path, tag: &str) -> Result<TagWrite, TagError> {
        if self.capability() == TagCapability::Unsupported {
            tracing::debug!(path = %path.display(), "Tag API unavailable, skipping write");
            return Ok(TagWrite::Skipped);
        }

        let tags: Vec<String> = normalize_tag(tag)
            .map(|t| vec![t.to_string()])
            .unwrap_or_default();

        if let Err(e) = self.store.write_tags(path, &tags) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write Finder tag");
            return Err(e);
        }

        tracing::info!(
            path = %path.display(),
            tag = tags.first().map(String::as_str).unwrap_or(""),
            cleared = tags.is_empty(),
            "Finder tag updated"
        );
        Ok(TagWrite::Written)
    }
}

// Fallback for non-macOS platforms: there is no tag facility to talk to.
#[cfg(not(target_os = "macos"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct FinderTagStore;

#[cfg(not(target_os = "macos"))]
impl TagStore for FinderTagStore {
    fn capability(&self) -> TagCapability {
        TagCapability::Unsupported
    }

    fn read_tags(&self, _path: &Path) -> Result<Vec<String>, TagError> {
        Err(TagError::Unsupported)
    }

    fn write_tags(&self, _path: &Path, _tags: &[String]) -> Result<(), TagError> {
        Err(TagError::Unsupported)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryTagStore;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scratch_file(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "content").unwrap();
        path
    }

    fn accessor() -> TagAccessor<MemoryTagStore> {
        TagAccessor::new(MemoryTagStore::default(), TagMode::Auto)
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Red"), Some("Red"));
        assert_eq!(normalize_tag("  Work  "), Some("Work"));
        assert_eq!(normalize_tag("\tTodo\n"), Some("Todo"));
        assert_eq!(normalize_tag("Two Words"), Some("Two Words"));
        assert_eq!(normalize_tag(""), None);
        assert_eq!(normalize_tag(" \n\t "), None);
    }

    #[test]
    fn test_set_then_get_returns_tag() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "report.pdf");
        let tags = accessor();

        assert_eq!(tags.set_tag(&file, "Important"), Ok(TagWrite::Written));
        assert_eq!(tags.get_tag(&file), TagLookup::Present("Important".into()));
    }

    #[test]
    fn test_set_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "notes.txt");
        let tags = accessor();

        tags.set_tag(&file, "  Blue  ").unwrap();
        assert_eq!(tags.get_tag(&file), TagLookup::Present("Blue".into()));
    }

    #[test]
    fn test_blank_tag_clears() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "photo.jpg");
        let tags = accessor();

        tags.set_tag(&file, "Green").unwrap();
        tags.set_tag(&file, "").unwrap();
        assert_eq!(tags.get_tag(&file), TagLookup::Absent);

        tags.set_tag(&file, "Green").unwrap();
        tags.set_tag(&file, "   \n").unwrap();
        assert_eq!(tags.get_tag(&file), TagLookup::Absent);
        assert!(tags.store.tags_of(&file).is_empty());
    }

    #[test]
    fn test_set_replaces_existing_tags() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "draft.md");
        let tags = accessor();

        tags.set_tag(&file, "A").unwrap();
        tags.set_tag(&file, "B").unwrap();
        assert_eq!(tags.get_tag(&file), TagLookup::Present("B".into()));
        assert_eq!(tags.store.tags_of(&file), vec!["B".to_string()]);
    }

    #[test]
    fn test_set_collapses_multiple_tags_to_one() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "shared.key");
        let tags = accessor();
        tags.store.seed(&file, &["Red", "Work", "Home"]);

        tags.set_tag(&file, "Purple").unwrap();
        assert_eq!(tags.store.tags_of(&file), vec!["Purple".to_string()]);
    }

    #[test]
    fn test_get_returns_first_of_many() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "tagged.txt");
        let tags = accessor();
        tags.store.seed(&file, &["Orange", "Yellow"]);

        assert_eq!(tags.get_tag(&file), TagLookup::Present("Orange".into()));
    }

    #[test]
    fn test_untagged_entry_is_absent() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "plain.txt");

        assert_eq!(accessor().get_tag(&file), TagLookup::Absent);
        assert_eq!(accessor().get_tag(dir.path()), TagLookup::Absent);
    }

    #[test]
    fn test_directories_can_be_tagged() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("Projects");
        fs::create_dir(&folder).unwrap();
        let tags = accessor();

        tags.set_tag(&folder, "Active").unwrap();
        assert_eq!(tags.get_tag(&folder), TagLookup::Present("Active".into()));
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let tags = accessor();

        assert_eq!(tags.get_tag(&missing), TagLookup::Absent);
        match tags.set_tag(&missing, "Red") {
            Err(TagError::Os { path, message }) => {
                assert_eq!(path, missing.display().to_string());
                assert!(!message.is_empty());
            }
            other => panic!("expected OS failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_store_skips_everything() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "legacy.txt");
        let tags = TagAccessor::new(MemoryTagStore::unsupported(), TagMode::Auto);
        tags.store.seed(&file, &["Red"]);

        assert_eq!(tags.capability(), TagCapability::Unsupported);
        assert_eq!(tags.get_tag(&file), TagLookup::Unsupported);
        assert_eq!(tags.set_tag(&file, "Blue"), Ok(TagWrite::Skipped));
        assert_eq!(tags.store.tags_of(&file), vec!["Red".to_string()]);
    }

    #[test]
    fn test_mode_off_overrides_supported_store() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "off.txt");
        let tags = TagAccessor::new(MemoryTagStore::default(), TagMode::Off);

        assert_eq!(tags.capability(), TagCapability::Unsupported);
        assert_eq!(tags.set_tag(&file, "Blue"), Ok(TagWrite::Skipped));
        assert!(tags.store.tags_of(&file).is_empty());

        // Writes to a missing path are skipped too, not reported as failures
        let missing = dir.path().join("missing");
        assert_eq!(tags.set_tag(&missing, "Blue"), Ok(TagWrite::Skipped));
    }

    #[test]
    fn test_lookup_into_option() {
        assert_eq!(
            TagLookup::Present("Red".into()).into_option(),
            Some("Red".to_string())
        );
        assert_eq!(TagLookup::Absent.into_option(), None);
        assert_eq!(TagLookup::Unsupported.into_option(), None);
    }

    #[test]
    fn test_invalid_value_names_the_value() {
        let err = TagError::InvalidValue {
            value: "bad\0tag".into(),
        };
        assert_eq!(
            err.to_string(),
            "Value cannot be passed to the tag API: \"bad\\0tag\""
        );
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_finder_store_unsupported_off_macos() {
        let dir = TempDir::new().unwrap();
        let file = scratch_file(&dir, "linux.txt");
        let tags = TagAccessor::new(FinderTagStore, TagMode::Auto);

        assert_eq!(tags.capability(), TagCapability::Unsupported);
        assert_eq!(tags.get_tag(&file), TagLookup::Unsupported);
        assert_eq!(tags.set_tag(&file, "Red"), Ok(TagWrite::Skipped));
    }
}

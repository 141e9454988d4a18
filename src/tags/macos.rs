//! macOS Finder tag store.
//!
//! Goes through `NSURL` resource values with `NSURLTagNamesKey`, the same
//! path Finder uses, so tag colors and Spotlight indexing stay consistent.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

use objc2::encode::{Encode, Encoding};
use objc2::msg_send;
use objc2::rc::autoreleasepool;
use objc2::runtime::{AnyClass, AnyObject, Bool};
use once_cell::sync::OnceCell;

use super::{TagCapability, TagError, TagStore};

/// Resource key holding the tag-name list (value of `NSURLTagNamesKey`)
const TAG_NAMES_KEY: &str = "NSURLTagNamesKey";

/// Oldest macOS release the tag bridge is enabled on
const MIN_MACOS_MAJOR: isize = 13;

/// NSOperatingSystemVersion
#[repr(C)]
struct OperatingSystemVersion {
    major: isize,
    minor: isize,
    patch: isize,
}

unsafe impl Encode for OperatingSystemVersion {
    const ENCODING: Encoding = Encoding::Struct(
        "?",
        &[isize::ENCODING, isize::ENCODING, isize::ENCODING],
    );
}

/// Finder tags backed by `NSURL` resource values.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinderTagStore;

impl TagStore for FinderTagStore {
    fn capability(&self) -> TagCapability {
        static CAPABILITY: OnceCell<TagCapability> = OnceCell::new();
        *CAPABILITY.get_or_init(detect_capability)
    }

    fn read_tags(&self, path: &Path) -> Result<Vec<String>, TagError> {
        autoreleasepool(|_| unsafe {
            let url = file_url(path)?;
            let key = ns_string(TAG_NAMES_KEY)?;

            let mut value: *mut AnyObject = ptr::null_mut();
            let mut error: *mut AnyObject = ptr::null_mut();
            let ok: Bool = msg_send![
                url,
                getResourceValue: &mut value
                forKey: key
                error: &mut error
            ];
            if !ok.as_bool() {
                return Err(os_error(path, error));
            }

            // nil value: the entry has never been tagged
            if value.is_null() {
                return Ok(Vec::new());
            }

            let count: usize = msg_send![value, count];
            let mut tags = Vec::with_capacity(count);
            for index in 0..count {
                let item: *mut AnyObject = msg_send![value, objectAtIndex: index];
                if let Some(name) = rust_string(item) {
                    tags.push(name);
                }
            }
            Ok(tags)
        })
    }

    fn write_tags(&self, path: &Path, tags: &[String]) -> Result<(), TagError> {
        autoreleasepool(|_| unsafe {
            let url = file_url(path)?;
            let key = ns_string(TAG_NAMES_KEY)?;

            let array_class = AnyClass::get("NSMutableArray")
                .ok_or_else(|| class_missing(path, "NSMutableArray"))?;
            let array: *mut AnyObject = msg_send![array_class, arrayWithCapacity: tags.len()];
            if array.is_null() {
                return Err(TagError::Os {
                    path: path.display().to_string(),
                    message: "Failed to allocate tag list".into(),
                });
            }
            for tag in tags {
                let name = ns_string(tag)?;
                let _: () = msg_send![array, addObject: name];
            }

            let mut error: *mut AnyObject = ptr::null_mut();
            let ok: Bool = msg_send![
                url,
                setResourceValue: array
                forKey: key
                error: &mut error
            ];
            if !ok.as_bool() {
                return Err(os_error(path, error));
            }
            Ok(())
        })
    }
}

fn detect_capability() -> TagCapability {
    let supported = autoreleasepool(|_| unsafe {
        let Some(class) = AnyClass::get("NSProcessInfo") else {
            return false;
        };
        let info: *mut AnyObject = msg_send![class, processInfo];
        if info.is_null() {
            return false;
        }
        let minimum = OperatingSystemVersion {
            major: MIN_MACOS_MAJOR,
            minor: 0,
            patch: 0,
        };
        let ok: Bool = msg_send![info, isOperatingSystemAtLeastVersion: minimum];
        ok.as_bool()
    });

    let capability = if supported {
        TagCapability::Supported
    } else {
        TagCapability::Unsupported
    };
    tracing::debug!(?capability, min_major = MIN_MACOS_MAJOR, "Detected Finder tag support");
    capability
}

/// Autoreleased NSString copy of `value`.
unsafe fn ns_string(value: &str) -> Result<*mut AnyObject, TagError> {
    let c_value = CString::new(value).map_err(|_| TagError::InvalidValue {
        value: value.to_string(),
    })?;
    let class = AnyClass::get("NSString").ok_or_else(|| TagError::Os {
        path: value.to_string(),
        message: "NSString class not found - is Foundation loaded?".into(),
    })?;
    let ns_value: *mut AnyObject = msg_send![class, stringWithUTF8String: c_value.as_ptr()];
    if ns_value.is_null() {
        return Err(TagError::InvalidValue {
            value: value.to_string(),
        });
    }
    Ok(ns_value)
}

/// Autoreleased file NSURL for `path`.
unsafe fn file_url(path: &Path) -> Result<*mut AnyObject, TagError> {
    let path_str = path.to_str().ok_or_else(|| TagError::InvalidValue {
        value: path.display().to_string(),
    })?;
    let ns_path = ns_string(path_str)?;

    let class = AnyClass::get("NSURL").ok_or_else(|| class_missing(path, "NSURL"))?;
    let url: *mut AnyObject = msg_send![class, fileURLWithPath: ns_path];
    if url.is_null() {
        return Err(TagError::InvalidValue {
            value: path_str.to_string(),
        });
    }
    Ok(url)
}

unsafe fn rust_string(ns_value: *mut AnyObject) -> Option<String> {
    if ns_value.is_null() {
        return None;
    }
    let utf8: *const c_char = msg_send![ns_value, UTF8String];
    if utf8.is_null() {
        return None;
    }
    Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
}

/// Map an NSError out-parameter to a [`TagError`] carrying its localized description.
unsafe fn os_error(path: &Path, error: *mut AnyObject) -> TagError {
    let message = if error.is_null() {
        None
    } else {
        let desc: *mut AnyObject = msg_send![error, localizedDescription];
        rust_string(desc)
    };
    TagError::Os {
        path: path.display().to_string(),
        message: message.unwrap_or_else(|| "Resource value call failed with unknown error".into()),
    }
}

fn class_missing(path: &Path, class: &str) -> TagError {
    TagError::Os {
        path: path.display().to_string(),
        message: format!("{} class not found - is Foundation loaded?", class),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagMode;
    use crate::tags::{TagAccessor, TagLookup, TagWrite};
    use std::fs;

    fn supported(test: &str) -> bool {
        let supported = FinderTagStore.capability() == TagCapability::Supported;
        if !supported {
            eprintln!(
                "skipping {}: Finder tags need macOS {} or later",
                test, MIN_MACOS_MAJOR
            );
        }
        supported
    }

    #[test]
    fn test_finder_tag_round_trip() {
        if !supported("test_finder_tag_round_trip") {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("xplor_tag_test.txt");
        fs::write(&file, "test content").unwrap();
        let tags = TagAccessor::new(FinderTagStore, TagMode::Auto);

        assert_eq!(tags.get_tag(&file), TagLookup::Absent);
        assert_eq!(tags.set_tag(&file, " Red "), Ok(TagWrite::Written));
        assert_eq!(tags.get_tag(&file), TagLookup::Present("Red".into()));

        tags.set_tag(&file, "Blue").unwrap();
        assert_eq!(FinderTagStore.read_tags(&file).unwrap(), vec!["Blue".to_string()]);

        tags.set_tag(&file, "").unwrap();
        assert_eq!(tags.get_tag(&file), TagLookup::Absent);
    }

    #[test]
    fn test_finder_tag_missing_path() {
        if !supported("test_finder_tag_missing_path") {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.txt");
        let tags = TagAccessor::new(FinderTagStore, TagMode::Auto);

        assert_eq!(tags.get_tag(&missing), TagLookup::Absent);
        assert!(matches!(
            tags.set_tag(&missing, "Red"),
            Err(TagError::Os { .. })
        ));
    }

    #[test]
    fn test_tag_with_nul_is_invalid_value() {
        if !supported("test_tag_with_nul_is_invalid_value") {
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("nul.txt");
        fs::write(&file, "x").unwrap();

        let err = FinderTagStore
            .write_tags(&file, &["bad\0tag".to_string()])
            .unwrap_err();
        assert_eq!(
            err,
            TagError::InvalidValue {
                value: "bad\0tag".into()
            }
        );
    }
}

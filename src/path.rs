//! Slash separated paths on the device side.
//!
//! Device folders use `/` regardless of the host platform, so these helpers
//! work on plain strings instead of [`std::path::Path`].

/// Joins a folder and an entry name.
pub fn join(folder: &str, name: &str) -> String {
    if folder.ends_with('/') {
        format!("{folder}{name}")
    } else {
        format!("{folder}/{name}")
    }
}

/// Ensures a leading slash.
pub fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Like [`normalize`], but also drops trailing slashes so the result names a
/// folder the way the device API expects. The root stays `/`.
pub fn normalize_folder(path: &str) -> String {
    let path = normalize(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Splits a path into parent folder and entry name.
///
/// Returns `None` for the root and for trailing-slash paths, which can only
/// name folders.
pub fn split(path: &str) -> Option<(&str, &str)> {
    if path == "/" || path.ends_with('/') {
        return None;
    }

    let pos = path.rfind('/')?;
    let parent = if pos == 0 { "/" } else { &path[..pos] };
    Some((parent, &path[pos + 1..]))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", "DCIM", "/DCIM")]
    #[case("/DCIM", "100APPLE", "/DCIM/100APPLE")]
    #[case("/DCIM/", "100APPLE", "/DCIM/100APPLE")]
    fn joins_folder_and_name(#[case] folder: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(join(folder, name), expected);
    }

    #[rstest]
    #[case("DCIM", "/DCIM")]
    #[case("/DCIM", "/DCIM")]
    #[case("", "/")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("/DCIM/", "/DCIM")]
    #[case("/DCIM///", "/DCIM")]
    #[case("DCIM", "/DCIM")]
    #[case("/", "/")]
    #[case("", "/")]
    fn normalizes_folders(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_folder(input), expected);
    }

    #[rstest]
    #[case("/DCIM/IMG_0001.JPG", Some(("/DCIM", "IMG_0001.JPG")))]
    #[case("/DCIM", Some(("/", "DCIM")))]
    #[case("/DCIM/100APPLE/IMG_0001.JPG", Some(("/DCIM/100APPLE", "IMG_0001.JPG")))]
    #[case("/DCIM/", None)]
    #[case("/", None)]
    fn splits_parent_and_name(#[case] input: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(split(input), expected);
    }
}

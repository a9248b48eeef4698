//! Walks the folder hierarchy of a connected device.

use crate::device::DeviceFiles;
use crate::path;

use anyhow::Result;
use serde::Serialize;

/// Contents of one device folder, entries expanded to full paths.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FolderListing {
    pub path: String,
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

pub fn list_folder<D: DeviceFiles>(device: &D, folder: &str) -> Result<FolderListing> {
    let folders = device
        .folders_in(folder)?
        .into_iter()
        .map(|name| path::join(folder, &name))
        .collect();
    let files = device
        .files_in(folder)?
        .into_iter()
        .map(|name| path::join(folder, &name))
        .collect();

    Ok(FolderListing {
        path: folder.to_string(),
        folders,
        files,
    })
}

/// Depth-first listing of every folder under `folder`, parents before
/// children.
pub fn walk<D: DeviceFiles>(device: &D, folder: &str) -> Result<Vec<FolderListing>> {
    let mut listings = Vec::new();
    walk_into(device, folder, &mut listings)?;
    Ok(listings)
}

fn walk_into<D: DeviceFiles>(
    device: &D,
    folder: &str,
    listings: &mut Vec<FolderListing>,
) -> Result<()> {
    let listing = list_folder(device, folder)?;
    let subfolders = listing.folders.clone();
    listings.push(listing);

    for sub in &subfolders {
        walk_into(device, sub, listings)?;
    }
    Ok(())
}

/// Prints a folder: subfolders first, then files. With `recursive` set,
/// descends into each subfolder instead of printing its name.
pub fn print_tree<D: DeviceFiles>(device: &D, folder: &str, recursive: bool) -> Result<()> {
    let listing = list_folder(device, folder)?;

    for sub in &listing.folders {
        if recursive {
            print_tree(device, sub, true)?;
        } else {
            println!("{sub}");
        }
    }
    for file in &listing.files {
        println!("{file}");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    /// In-memory stand-in for a camera filesystem.
    #[derive(Default)]
    pub struct MockDevice {
        folders: HashMap<String, Vec<String>>,
        files: HashMap<String, Vec<String>>,
        pub fetched: RefCell<Vec<String>>,
        pub fail_on: Option<String>,
    }

    impl MockDevice {
        pub fn new() -> Self {
            Self::default().folder("/", &[], &[])
        }

        pub fn folder(mut self, path: &str, subfolders: &[&str], files: &[&str]) -> Self {
            self.folders.insert(
                path.to_string(),
                subfolders.iter().map(|s| s.to_string()).collect(),
            );
            self.files.insert(
                path.to_string(),
                files.iter().map(|s| s.to_string()).collect(),
            );
            self
        }
    }

    impl DeviceFiles for MockDevice {
        fn files_in(&self, folder: &str) -> Result<Vec<String>> {
            self.files
                .get(folder)
                .cloned()
                .ok_or_else(|| anyhow!("no folder {folder} on mock device"))
        }

        fn folders_in(&self, folder: &str) -> Result<Vec<String>> {
            self.folders
                .get(folder)
                .cloned()
                .ok_or_else(|| anyhow!("no folder {folder} on mock device"))
        }

        fn fetch(&self, folder: &str, name: &str, dest: &Path) -> Result<()> {
            let source = path::join(folder, name);
            if self.fail_on.as_deref() == Some(source.as_str()) {
                return Err(anyhow!("transfer of {source} broke"));
            }

            fs::write(dest, source.as_bytes())?;
            self.fetched.borrow_mut().push(source);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::mock::MockDevice;
    use super::*;

    fn two_level_device() -> MockDevice {
        MockDevice::new()
            .folder("/", &["DCIM"], &["info.txt"])
            .folder("/DCIM", &["100APPLE"], &[])
            .folder("/DCIM/100APPLE", &[], &["IMG_0001.JPG", "IMG_0002.JPG"])
    }

    #[test]
    fn lists_one_folder_with_full_paths() {
        let device = two_level_device();

        let listing = list_folder(&device, "/").unwrap();

        assert_eq!(listing.path, "/");
        assert_eq!(listing.folders, vec!["/DCIM"]);
        assert_eq!(listing.files, vec!["/info.txt"]);
    }

    #[test]
    fn walk_visits_parents_before_children() {
        let device = two_level_device();

        let listings = walk(&device, "/").unwrap();

        let paths: Vec<_> = listings.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/DCIM", "/DCIM/100APPLE"]);
        assert_eq!(
            listings[2].files,
            vec!["/DCIM/100APPLE/IMG_0001.JPG", "/DCIM/100APPLE/IMG_0002.JPG"]
        );
    }

    #[test]
    fn walk_fails_on_unknown_folder() {
        let device = two_level_device();

        assert!(walk(&device, "/no-such-folder").is_err());
    }

    #[test]
    fn listing_serializes_for_json_output() {
        let device = two_level_device();

        let listing = list_folder(&device, "/DCIM/100APPLE").unwrap();
        let json = serde_json::to_string(&listing).unwrap();

        assert!(json.contains("\"path\":\"/DCIM/100APPLE\""));
        assert!(json.contains("IMG_0002.JPG"));
    }
}

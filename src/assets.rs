//! Picture synchronisation between an ODT package and an output image folder.
//!
//! Pictures are matched by MD5 content hash, so converting the same document
//! twice reuses the files written the first time instead of duplicating them.

use crate::error::Result;
use crate::model::Picture;
use md5::{Digest, Md5};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Stem prefix of pictures written by [`synchronize_pictures`].
pub const PICTURE_PREFIX: &str = "picture_";

/// Extensions recognised in the output image folder.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

/// Maps a package picture path to the path used in the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureMap {
    paths: HashMap<String, String>,
}

impl PictureMap {
    /// Creates an empty map; every lookup resolves to the package path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the output path of a package picture.
    pub fn insert(&mut self, package_path: impl Into<String>, output_path: impl Into<String>) {
        self.paths.insert(package_path.into(), output_path.into());
    }

    /// Returns the output path for `package_path`, or the path itself when unmapped.
    pub fn resolve<'a>(&'a self, package_path: &'a str) -> &'a str {
        self.paths
            .get(package_path)
            .map(String::as_str)
            .unwrap_or(package_path)
    }

    /// Returns the number of mapped pictures.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if no picture is mapped.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Copies the document pictures into `output_dir/images_rel` and maps each
/// package path to its folder-relative output path.
///
/// A picture whose content already exists in the folder maps to that file.
/// Others are written as `picture_<N>.<ext>` using the lowest free N.
pub fn synchronize_pictures(
    pictures: &BTreeMap<String, Picture>,
    output_dir: &Path,
    images_rel: &str,
) -> Result<PictureMap> {
    let images_rel = normalize_folder(images_rel);
    let image_folder = output_dir.join(&images_rel);

    let mut known_hashes: HashMap<Vec<u8>, String> = HashMap::new();
    let mut taken_names: HashSet<String> = HashSet::new();

    if image_folder.is_dir() {
        let mut entries: Vec<String> = std::fs::read_dir(&image_folder)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        entries.sort();

        for name in entries {
            let Some((stem, ext)) = name.rsplit_once('.') else {
                continue;
            };
            if !IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
                continue;
            }

            let stem = stem.to_lowercase();
            if stem.starts_with(PICTURE_PREFIX) {
                taken_names.insert(stem);
            }

            let data = std::fs::read(image_folder.join(&name))?;
            known_hashes
                .entry(content_hash(&data))
                .or_insert_with(|| join_relative(&images_rel, &name));
        }
    }

    let mut map = PictureMap::new();
    let mut next_index = 0usize;

    for (path, picture) in pictures {
        let hash = content_hash(&picture.data);

        if let Some(existing) = known_hashes.get(&hash) {
            log::debug!("picture {} matches existing {}", path, existing);
            map.insert(path.clone(), existing.clone());
            continue;
        }

        while taken_names.contains(&format!("{}{}", PICTURE_PREFIX, next_index)) {
            next_index += 1;
        }
        let stem = format!("{}{}", PICTURE_PREFIX, next_index);
        let file_name = format!("{}{}", stem, picture.extension());
        taken_names.insert(stem);

        std::fs::create_dir_all(&image_folder)?;
        std::fs::write(image_folder.join(&file_name), &picture.data)?;

        let relative = join_relative(&images_rel, &file_name);
        log::debug!("picture {} written to {}", path, relative);

        known_hashes.insert(hash, relative.clone());
        map.insert(path.clone(), relative);
    }

    Ok(map)
}

fn content_hash(data: &[u8]) -> Vec<u8> {
    Md5::digest(data).to_vec()
}

fn normalize_folder(folder: &str) -> String {
    folder.replace('\\', "/").trim_end_matches('/').to_string()
}

fn join_relative(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pictures(entries: &[(&str, &[u8])]) -> BTreeMap<String, Picture> {
        entries
            .iter()
            .map(|(path, data)| (path.to_string(), Picture::new(*path, data.to_vec())))
            .collect()
    }

    #[test]
    fn test_resolve_falls_back_to_package_path() {
        let mut map = PictureMap::new();
        map.insert("Pictures/a.png", "images/picture_0.png");

        assert_eq!(map.resolve("Pictures/a.png"), "images/picture_0.png");
        assert_eq!(map.resolve("Pictures/b.png"), "Pictures/b.png");
    }

    #[test]
    fn test_new_pictures_written_with_free_names() {
        let dir = tempfile::tempdir().unwrap();
        let pics = pictures(&[("Pictures/a.png", &b"alpha"[..]), ("Pictures/b.jpg", &b"beta"[..])]);

        let map = synchronize_pictures(&pics, dir.path(), "images").unwrap();

        assert_eq!(map.resolve("Pictures/a.png"), "images/picture_0.png");
        assert_eq!(map.resolve("Pictures/b.jpg"), "images/picture_1.jpg");
        let written = std::fs::read(dir.path().join("images/picture_1.jpg")).unwrap();
        assert_eq!(written, b"beta");
    }

    #[test]
    fn test_existing_content_reused() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("images");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("logo.png"), b"alpha").unwrap();
        std::fs::write(folder.join("picture_0.png"), b"other").unwrap();

        let pics = pictures(&[("Pictures/a.png", &b"alpha"[..]), ("Pictures/b.png", &b"gamma"[..])]);
        let map = synchronize_pictures(&pics, dir.path(), "images/").unwrap();

        assert_eq!(map.resolve("Pictures/a.png"), "images/logo.png");
        // picture_0 is taken by an unrelated file
        assert_eq!(map.resolve("Pictures/b.png"), "images/picture_1.png");
    }

    #[test]
    fn test_duplicate_pictures_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let pics = pictures(&[("Pictures/a.png", &b"same"[..]), ("Pictures/b.png", &b"same"[..])]);

        let map = synchronize_pictures(&pics, dir.path(), "img").unwrap();

        assert_eq!(map.resolve("Pictures/a.png"), "img/picture_0.png");
        assert_eq!(map.resolve("Pictures/b.png"), "img/picture_0.png");
        assert!(!dir.path().join("img/picture_1.png").exists());
    }

    #[test]
    fn test_no_pictures_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let map = synchronize_pictures(&BTreeMap::new(), dir.path(), "images").unwrap();

        assert!(map.is_empty());
        assert!(!dir.path().join("images").exists());
    }

    #[test]
    fn test_backslash_folder_normalized() {
        assert_eq!(normalize_folder("assets\\img\\"), "assets/img");
        assert_eq!(join_relative("", "a.png"), "a.png");
    }
}

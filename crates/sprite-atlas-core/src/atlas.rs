use crate::collection::PlacementCollection;
use crate::compositing::blit_scaled;
use crate::element::Element;
use crate::error::{AtlasError, Result};
use image::RgbaImage;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version written to the first manifest line. Loads compare against it and
/// warn on mismatch but still proceed.
pub const FORMAT_VERSION: &str = "0.0.1";

/// Manifest file name inside a storage directory.
pub const MANIFEST_FILE: &str = "atlas.txt";

/// A named [`PlacementCollection`] plus its backing storage location.
///
/// A fresh atlas is unsaved (`storage_path` is `None`). The first successful
/// [`save_to_file`](Self::save_to_file) records the destination; from then on
/// the atlas stays saved and [`save`](Self::save) rewrites in place. A saved
/// storage directory always holds the [`MANIFEST_FILE`] and the image
/// subdirectory `<name>_img/`.
pub struct Atlas {
    name: String,
    storage_path: Option<PathBuf>,
    collection: PlacementCollection,
}

impl Atlas {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_collection(name, PlacementCollection::default())
    }

    pub fn with_collection(name: impl Into<String>, collection: PlacementCollection) -> Self {
        Self {
            name: name.into(),
            storage_path: None,
            collection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` until the first save.
    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    pub fn collection(&self) -> &PlacementCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut PlacementCollection {
        &mut self.collection
    }

    fn image_dir_name(&self) -> String {
        format!("{}_img", self.name)
    }

    /// Re-saves at the recorded storage location, overwriting. Errors with
    /// [`AtlasError::NoDestination`] when no location is known yet, which
    /// signals the interactive layer to prompt for one.
    pub fn save(&self) -> Result<()> {
        match &self.storage_path {
            Some(dir) => self.write_dir(dir),
            None => Err(AtlasError::NoDestination),
        }
    }

    /// Saves under `<parent>/<name>` and records the destination. When
    /// `allow_overwrite` is false, a colliding destination gets "(1)", "(2)",
    /// … appended until a free name is found; the original stays untouched.
    ///
    /// Members with duplicate names are all listed in the manifest, but their
    /// bitmap files collide: the later member's pixels win.
    pub fn save_to_file(&mut self, parent: &Path, allow_overwrite: bool) -> Result<PathBuf> {
        let mut dest = parent.join(&self.name);
        if !allow_overwrite {
            let mut n = 1usize;
            while dest.exists() {
                dest = parent.join(format!("{}({})", self.name, n));
                n += 1;
            }
        }
        self.write_dir(&dest)?;
        self.storage_path = Some(dest.clone());
        Ok(dest)
    }

    fn write_dir(&self, dir: &Path) -> Result<()> {
        let img_dir = dir.join(self.image_dir_name());
        fs::create_dir_all(&img_dir)?;

        let mut out = BufWriter::new(File::create(dir.join(MANIFEST_FILE))?);
        writeln!(out, "{FORMAT_VERSION}")?;
        writeln!(out, "{}", self.name)?;
        self.collection.serialize(&mut out)?;
        out.flush()?;

        for element in self.collection.iter() {
            let file = img_dir.join(format!("{}.png", element.name()));
            element.image().save(&file)?;
        }
        info!(
            "saved atlas {:?} ({} elements) to {}",
            self.name,
            self.collection.len(),
            dir.display()
        );
        Ok(())
    }

    /// Loads an atlas from a storage directory.
    ///
    /// Malformed element records are skipped; a missing or undecodable bitmap
    /// falls back to the placeholder. Only a missing/unreadable manifest is a
    /// hard error.
    pub fn load_from_file(dir: &Path) -> Result<Atlas> {
        let file = File::open(dir.join(MANIFEST_FILE))?;
        let mut lines = BufReader::new(file).lines();

        let version = lines.next().transpose()?.unwrap_or_default();
        if version.trim() != FORMAT_VERSION {
            warn!(
                "manifest version {:?} differs from {FORMAT_VERSION}; loading anyway",
                version.trim()
            );
        }
        let name = match lines.next().transpose()? {
            Some(line) if !line.trim().is_empty() => line.trim().to_string(),
            _ => {
                let fallback = dir
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("atlas")
                    .to_string();
                warn!("manifest has no name line; using {fallback:?}");
                fallback
            }
        };

        let img_dir = dir.join(format!("{name}_img"));
        let images = index_images(&img_dir);
        let mut collection = PlacementCollection::default();
        let mut body = Vec::new();
        for line in lines {
            body.push(line?);
        }
        collection.deserialize(body.iter().map(String::as_str), |element_name| {
            match images.get(element_name).and_then(|p| open_rgba(p)) {
                Some(image) => image,
                None => {
                    warn!("no usable image for {element_name:?}; substituting placeholder");
                    Element::placeholder_image()
                }
            }
        });
        debug!(
            "loaded atlas {:?} ({} elements) from {}",
            name,
            collection.len(),
            dir.display()
        );

        Ok(Atlas {
            name,
            storage_path: Some(dir.to_path_buf()),
            collection,
        })
    }

    /// Flattens the collection into one composite image sized to its minimal
    /// covering rectangle, trimmed to origin. Elements with scale ≠ 1 are
    /// resampled. With `create_map_file`, a sibling text file (same path,
    /// `.txt` extension) lists `<name>:<offsetX>:<offsetY>:<w>:<h>` per
    /// element.
    pub fn export_to_image(&self, path: &Path, create_map_file: bool) -> Result<()> {
        let bounds = self.collection.bounds();
        let (out_w, out_h) = (bounds.w.ceil() as u32, bounds.h.ceil() as u32);
        if out_w == 0 || out_h == 0 {
            return Err(AtlasError::Empty);
        }

        let mut canvas = RgbaImage::new(out_w, out_h);
        let mut map_lines = String::new();
        for element in self.collection.iter() {
            let size = element.scaled_size();
            let (w, h) = (size.x.round() as u32, size.y.round() as u32);
            let off_x = (element.position().x - bounds.x).round().max(0.0) as u32;
            let off_y = (element.position().y - bounds.y).round().max(0.0) as u32;
            blit_scaled(element.image(), &mut canvas, off_x, off_y, w, h);
            if create_map_file {
                map_lines.push_str(&format!(
                    "{}:{off_x}:{off_y}:{w}:{h}\n",
                    element.name()
                ));
            }
        }
        canvas.save(path)?;
        if create_map_file {
            fs::write(path.with_extension("txt"), map_lines)?;
        }
        info!(
            "exported {}x{} composite to {}",
            out_w,
            out_h,
            path.display()
        );
        Ok(())
    }
}

/// Indexes an image directory by file stem. Missing directory or unreadable
/// entries just yield an empty/partial index; element loads fall back to the
/// placeholder.
fn index_images(dir: &Path) -> HashMap<String, PathBuf> {
    let mut map = HashMap::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read image directory {}: {e}", dir.display());
            return map;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            map.entry(stem.to_string()).or_insert(path);
        }
    }
    map
}

fn open_rgba(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            warn!("failed to decode {}: {e}", path.display());
            None
        }
    }
}

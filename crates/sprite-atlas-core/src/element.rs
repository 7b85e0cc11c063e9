use crate::model::{RectF, Vec2};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::warn;

const PLACEHOLDER_SIZE: u32 = 64;
const PLACEHOLDER_TILE: u32 = 8;

/// One placed image within a collection: identity, owned pixel data,
/// position, scale, and the interactive selection/overlap flags.
///
/// The bounding box is `position` + native size × `scale`. Scales are clamped
/// non-negative on the way in, so the box is never negative-sized. Cloning an
/// element deep-copies its pixel data; elements are never shared between
/// collections.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    image: RgbaImage,
    position: Vec2,
    scale: Vec2,
    pub(crate) selected: bool,
    pub(crate) overlapped: bool,
}

impl Element {
    /// Wraps an already-decoded image. `':'` is reserved as the manifest
    /// field separator and is replaced with `'_'` in the name.
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into().replace(':', "_"),
            image,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            selected: false,
            overlapped: false,
        }
    }

    /// Loads the image at `path`. A missing or undecodable file falls back to
    /// the generated placeholder; construction never fails.
    pub fn from_path(name: impl Into<String>, path: &Path) -> Self {
        let image = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!(
                    "failed to load {}: {e}; substituting placeholder",
                    path.display()
                );
                Self::placeholder_image()
            }
        };
        Self::new(name, image)
    }

    /// The stand-in for missing image resources: a magenta/black
    /// checkerboard, generated so no asset file is required.
    pub fn placeholder_image() -> RgbaImage {
        let magenta = Rgba([255, 0, 255, 255]);
        let black = Rgba([0, 0, 0, 255]);
        RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
            if (x / PLACEHOLDER_TILE + y / PLACEHOLDER_TILE) % 2 == 0 {
                magenta
            } else {
                black
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Unscaled pixel size of the source image.
    pub fn native_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_overlapped(&self) -> bool {
        self.overlapped
    }

    /// Native size × scale.
    pub fn scaled_size(&self) -> Vec2 {
        let (w, h) = self.native_size();
        Vec2::new(w as f32 * self.scale.x, h as f32 * self.scale.y)
    }

    /// Axis-aligned bounding box at the current position and scale.
    pub fn bounding_box(&self) -> RectF {
        let size = self.scaled_size();
        RectF::new(self.position.x, self.position.y, size.x, size.y)
    }

    /// True if `point` falls inside the bounding box.
    pub fn contains(&self, point: Vec2) -> bool {
        self.bounding_box().contains_point(point)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = Vec2::new(scale.x.max(0.0), scale.y.max(0.0));
    }

    /// Composes `factor` multiplicatively into the current scale.
    pub fn apply_scale(&mut self, factor: Vec2) {
        self.set_scale(self.scale * factor);
    }
}

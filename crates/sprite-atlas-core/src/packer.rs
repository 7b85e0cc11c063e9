use crate::binpack::{self, PackRect, Placement};
use crate::collection::PlacementCollection;
use crate::error::{AtlasError, Result};
use crate::model::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Configuration for a packing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerSettings {
    /// Maximum atlas width/height in pixels.
    pub max_size: (u32, u32),
    /// Horizontal/vertical spacing folded into each element's footprint.
    pub margin: (u32, u32),
    /// Allow the routine to reserve 90°-rotated footprints. Flipped results
    /// are not applied to element orientation yet (see
    /// [`AtlasPacker::apply_changes`]), so this defaults to off.
    pub allow_rotation: bool,
}

impl Default for PackerSettings {
    fn default() -> Self {
        Self {
            max_size: (1024, 1024),
            margin: (2, 2),
            allow_rotation: false,
        }
    }
}

impl PackerSettings {
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.max_size;
        if w == 0 || h == 0 {
            return Err(AtlasError::InvalidConfig(format!(
                "max_size must be non-zero, got {w}x{h}"
            )));
        }
        if self.margin.0 >= w || self.margin.1 >= h {
            return Err(AtlasError::InvalidConfig(format!(
                "margin ({}, {}) leaves no usable space in {w}x{h}",
                self.margin.0, self.margin.1
            )));
        }
        Ok(())
    }
}

/// Summary of a successful packing run.
#[derive(Debug, Clone, Copy)]
pub struct PackReport {
    /// Number of rectangles placed.
    pub placed: usize,
    /// Extent of the packed layout (max right/bottom edge over placements).
    pub width: u32,
    pub height: u32,
    /// Footprint area over extent area, 0.0 to 1.0. Higher is tighter.
    pub occupancy: f64,
}

impl PackReport {
    pub fn summary(&self) -> String {
        format!(
            "Placed: {}, Extent: {}x{} px, Occupancy: {:.2}%",
            self.placed,
            self.width,
            self.height,
            self.occupancy * 100.0,
        )
    }
}

/// Adapts a [`PlacementCollection`]'s element bounds into the bin-packing
/// routine and applies the result back.
///
/// Results are staged inside the packer until
/// [`apply_changes`](Self::apply_changes) is called, so a failed
/// [`pack`](Self::pack) leaves the collection's positions exactly as they
/// were.
pub struct AtlasPacker {
    settings: PackerSettings,
    rects: Vec<PackRect>,
    placements: Vec<Placement>,
}

impl AtlasPacker {
    pub fn new(settings: PackerSettings) -> Self {
        Self {
            settings,
            rects: Vec::new(),
            placements: Vec::new(),
        }
    }

    pub fn settings(&self) -> &PackerSettings {
        &self.settings
    }

    /// Builds one packing rectangle per element: scaled bounding box rounded
    /// up to whole pixels, plus the configured margin. Ids are the element's
    /// index in the collection, used for write-back.
    pub fn load_rects(&mut self, collection: &PlacementCollection) {
        self.rects.clear();
        self.placements.clear();
        for (id, element) in collection.iter().enumerate() {
            let size = element.scaled_size();
            self.rects.push(PackRect {
                id,
                w: size.x.ceil() as u32 + self.settings.margin.0,
                h: size.y.ceil() as u32 + self.settings.margin.1,
            });
        }
    }

    /// Runs the routine over the loaded rectangles. Accepts single-bin
    /// results only; everything else errors and leaves no staged placements,
    /// so the caller may retry with a larger `max_size`.
    #[instrument(skip_all)]
    pub fn pack(&mut self) -> Result<PackReport> {
        self.settings.validate()?;
        self.placements.clear();
        let (max_w, max_h) = self.settings.max_size;
        let mut bins = binpack::pack_rects(
            &self.rects,
            max_w,
            max_h,
            self.settings.allow_rotation,
        )?;
        if bins.len() != 1 {
            return Err(AtlasError::MultiBin(bins.len()));
        }
        let bin = bins.swap_remove(0);

        let mut width = 0u32;
        let mut height = 0u32;
        let mut used = 0u64;
        for p in &bin.placements {
            let r = self.rects[p.id];
            let (w, h) = if p.flipped { (r.h, r.w) } else { (r.w, r.h) };
            width = width.max(p.x + w);
            height = height.max(p.y + h);
            used += (w as u64) * (h as u64);
        }
        let extent = (width as u64) * (height as u64);
        let report = PackReport {
            placed: bin.placements.len(),
            width,
            height,
            occupancy: if extent > 0 {
                used as f64 / extent as f64
            } else {
                0.0
            },
        };
        info!("{}", report.summary());
        self.placements = bin.placements;
        Ok(report)
    }

    /// Writes each staged placement's position back onto its element. The
    /// `flipped` flag is not consumed: elements keep their orientation, and
    /// rotated footprints merely reserved a rotated slot.
    pub fn apply_changes(&self, collection: &mut PlacementCollection) {
        for p in &self.placements {
            collection.place_element(p.id, Vec2::new(p.x as f32, p.y as f32));
        }
    }
}

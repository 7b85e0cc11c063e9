//! Core library for arranging and packing images into a texture atlas.
//!
//! - Model: [`Element`]s grouped in a [`PlacementCollection`] with a shared
//!   base anchor/scale, selection, and on-demand overlap detection
//! - Packing: [`AtlasPacker`] feeds element bounds to the rectangle
//!   bin-packing routine in [`binpack`] and writes positions back
//! - Persistence: [`Atlas`] saves/loads the line-oriented manifest plus one
//!   bitmap per element, and exports a flattened composite image
//!
//! Quick example:
//! ```ignore
//! use sprite_atlas_core::prelude::*;
//! use std::path::Path;
//! # fn main() -> sprite_atlas_core::Result<()> {
//! let mut collection = PlacementCollection::default();
//! collection.add_image("hero", Path::new("hero.png"), false);
//! collection.add_image("tile", Path::new("tile.png"), false);
//!
//! let mut packer = AtlasPacker::new(PackerSettings::default());
//! packer.load_rects(&collection);
//! packer.pack()?;
//! packer.apply_changes(&mut collection);
//!
//! let mut atlas = Atlas::with_collection("demo", collection);
//! atlas.save_to_file(Path::new("out"), true)?;
//! # Ok(()) }
//! ```

pub mod atlas;
pub mod binpack;
pub mod collection;
pub mod compositing;
pub mod element;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod recent;

pub use atlas::*;
pub use collection::*;
pub use element::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use recent::*;

/// Convenience prelude for common types and functions.
pub mod prelude {
    pub use crate::atlas::{Atlas, FORMAT_VERSION, MANIFEST_FILE};
    pub use crate::binpack::{Bin, PackRect, Placement, pack_rects};
    pub use crate::collection::{ElementRecord, PlacementCollection};
    pub use crate::element::Element;
    pub use crate::error::{AtlasError, Result};
    pub use crate::export::layout_json;
    pub use crate::model::{RectF, Vec2};
    pub use crate::packer::{AtlasPacker, PackReport, PackerSettings};
    pub use crate::recent::RecentFiles;
}

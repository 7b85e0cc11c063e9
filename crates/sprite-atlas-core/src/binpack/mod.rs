//! Rectangle bin-packing routine.
//!
//! The contract is deliberately narrow: rectangles go in with their final
//! footprint (any spacing margin already folded into `w`/`h`; input `x`/`y`
//! are irrelevant), placements come out grouped into bins that never exceed
//! the given maximum size. The routine may open additional bins when a single
//! one cannot hold everything; callers that only accept single-bin layouts
//! check the bin count themselves.

mod skyline;

use crate::error::{AtlasError, Result};
use skyline::SkylinePacker;

/// One rectangle to place. `id` is echoed back on the placement so callers
/// can map results to their own records.
#[derive(Debug, Clone, Copy)]
pub struct PackRect {
    pub id: usize,
    pub w: u32,
    pub h: u32,
}

/// A placement produced by the routine. `flipped` means the footprint was
/// rotated 90° (width and height swapped) when it was reserved.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub flipped: bool,
}

/// One bin of non-overlapping placements within `max_width`×`max_height`.
#[derive(Debug, Clone, Default)]
pub struct Bin {
    pub placements: Vec<Placement>,
}

/// Packs `rects` into as few bins as possible using a bottom-left skyline.
///
/// Errors with [`AtlasError::Empty`] for an empty input and
/// [`AtlasError::OutOfSpace`] when some rectangle can never fit a bin at all
/// (in which case no result is returned; nothing is partially placed).
pub fn pack_rects(
    rects: &[PackRect],
    max_width: u32,
    max_height: u32,
    allow_rotation: bool,
) -> Result<Vec<Bin>> {
    if rects.is_empty() {
        return Err(AtlasError::Empty);
    }
    let mut remaining: Vec<PackRect> = rects.to_vec();
    let mut bins: Vec<Bin> = Vec::new();
    while !remaining.is_empty() {
        let mut packer = SkylinePacker::new(max_width, max_height, allow_rotation);
        let mut bin = Bin::default();
        loop {
            let mut placed_any = false;
            let mut i = 0;
            while i < remaining.len() {
                match packer.pack(remaining[i]) {
                    Some(placement) => {
                        bin.placements.push(placement);
                        remaining.remove(i);
                        placed_any = true;
                    }
                    None => i += 1,
                }
            }
            if !placed_any {
                break;
            }
        }
        if bin.placements.is_empty() {
            // A fresh bin accepted nothing: some rectangle exceeds the bin.
            return Err(AtlasError::OutOfSpace);
        }
        bins.push(bin);
    }
    Ok(bins)
}

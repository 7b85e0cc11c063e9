use crate::element::Element;
use crate::model::{RectF, Vec2};
use image::RgbaImage;
use std::io::{self, Write};
use std::path::Path;
use std::slice;
use tracing::warn;

/// Diagonal step between consecutively added elements, giving freshly
/// imported batches a readable cascading layout.
const CASCADE_STEP: Vec2 = Vec2 { x: 20.0, y: 20.0 };

/// Ordered set of [`Element`]s sharing a base anchor and base scale.
///
/// Order is z-order: later elements draw on top and win point hit-tests.
/// Moving the anchor translates every member by the same delta; the base
/// scale is the default applied to newly added members.
pub struct PlacementCollection {
    elements: Vec<Element>,
    position: Vec2,
    scale: Vec2,
    any_selected: bool,
}

/// One parsed manifest element line: name, absolute position, and scale
/// relative to the base scale recorded at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    pub name: String,
    pub position: Vec2,
    pub scale: Vec2,
}

impl ElementRecord {
    /// Parses `<name>:<posX>:<posY>:<scaleX>:<scaleY>`. Returns `None` for
    /// anything malformed; callers skip such lines rather than abort.
    pub fn parse(line: &str) -> Option<ElementRecord> {
        let mut parts = line.split(':');
        let name = parts.next()?.trim();
        if name.is_empty() {
            return None;
        }
        let px: f32 = parts.next()?.trim().parse().ok()?;
        let py: f32 = parts.next()?.trim().parse().ok()?;
        let sx: f32 = parts.next()?.trim().parse().ok()?;
        let sy: f32 = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(ElementRecord {
            name: name.to_string(),
            position: Vec2::new(px, py),
            scale: Vec2::new(sx, sy),
        })
    }
}

impl Default for PlacementCollection {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ONE)
    }
}

impl PlacementCollection {
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Self {
            elements: Vec::new(),
            position,
            scale,
            any_selected: false,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Base anchor.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Base scale.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// True iff at least one member is selected.
    pub fn any_selected(&self) -> bool {
        self.any_selected
    }

    /// Loads the image at `path` (placeholder on failure) and appends it,
    /// with default placement per [`add`](Self::add).
    pub fn add_image(&mut self, name: impl Into<String>, path: &Path, reset_placement: bool) {
        self.add(Element::from_path(name, path), reset_placement);
    }

    /// Appends `element` with the current base scale applied. Position is the
    /// base anchor when `reset_placement` is set or the collection is empty,
    /// otherwise the previous last element's position offset by the cascade
    /// step.
    pub fn add(&mut self, mut element: Element, reset_placement: bool) {
        element.set_scale(self.scale);
        let position = match self.elements.last() {
            Some(last) if !reset_placement => last.position() + CASCADE_STEP,
            _ => self.position,
        };
        element.set_position(position);
        self.elements.push(element);
    }

    /// Import path: appends a stored record with its recorded position and
    /// its relative scale resolved against the current base scale. Default
    /// placement is not reapplied.
    pub fn restore(&mut self, record: ElementRecord, image: RgbaImage) {
        let mut element = Element::new(record.name, image);
        element.set_position(record.position);
        element.set_scale(record.scale * self.scale);
        self.elements.push(element);
    }

    /// Absorbs every member of `other` in order, preserving placement.
    pub fn merge(&mut self, other: PlacementCollection) {
        self.elements.extend(other.elements);
        self.refresh_any_selected();
    }

    /// Deletes all members satisfying `predicate`, compacting the sequence.
    pub fn remove_where(&mut self, predicate: impl Fn(&Element) -> bool) {
        self.elements.retain(|e| !predicate(e));
        self.refresh_any_selected();
    }

    /// Hit-tests `point` from topmost (last-drawn) to bottommost. On a hit
    /// the member is selected, clearing all others unless `multi_select`, and
    /// `true` is returned. A miss leaves selection untouched; the caller
    /// typically starts a marquee.
    pub fn select_at(&mut self, point: Vec2, multi_select: bool) -> bool {
        let hit = self.elements.iter().rposition(|e| e.contains(point));
        let Some(hit) = hit else {
            return false;
        };
        if !multi_select {
            for e in &mut self.elements {
                e.selected = false;
            }
        }
        self.elements[hit].selected = true;
        self.any_selected = true;
        true
    }

    /// Marquee selection: selects every member whose bounding box intersects
    /// `rect` and clears the rest.
    pub fn select_rect(&mut self, rect: &RectF) {
        let mut any = false;
        for e in &mut self.elements {
            e.selected = e.bounding_box().intersects(rect);
            any |= e.selected;
        }
        self.any_selected = any;
    }

    pub fn clear_selection(&mut self) {
        for e in &mut self.elements {
            e.selected = false;
        }
        self.any_selected = false;
    }

    /// Composes `factor` multiplicatively into each targeted member's scale.
    /// When not selection-scoped the base scale is composed as well.
    pub fn apply_scale(&mut self, factor: Vec2, selected_only: bool) {
        for e in &mut self.elements {
            if !selected_only || e.selected {
                e.apply_scale(factor);
            }
        }
        if !selected_only {
            self.scale = self.scale * factor;
        }
    }

    /// Translates targeted members by `offset`. The base anchor is untouched.
    pub fn move_images(&mut self, offset: Vec2, selected_only: bool) {
        for e in &mut self.elements {
            if !selected_only || e.selected {
                e.translate(offset);
            }
        }
    }

    /// Moves the base anchor; every member translates by the same delta.
    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.position;
        self.position = position;
        for e in &mut self.elements {
            e.translate(delta);
        }
    }

    /// Sets the base scale. Each member keeps its ratio to the old base, so
    /// per-element overrides survive the change.
    pub fn set_scale(&mut self, scale: Vec2) {
        let old = self.scale;
        for e in &mut self.elements {
            let s = e.scale();
            let ratio = Vec2::new(
                if old.x != 0.0 { s.x / old.x } else { 1.0 },
                if old.y != 0.0 { s.y / old.y } else { 1.0 },
            );
            e.set_scale(ratio * scale);
        }
        self.scale = scale;
    }

    /// Clears all overlap flags, then marks both members of every pair whose
    /// bounding boxes intersect. All-pairs on purpose: overlap is an advisory
    /// flag recomputed on demand and member counts stay small.
    pub fn find_overlapped(&mut self) {
        let boxes: Vec<RectF> = self.elements.iter().map(|e| e.bounding_box()).collect();
        for e in &mut self.elements {
            e.overlapped = false;
        }
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                if boxes[i].intersects(&boxes[j]) {
                    self.elements[i].overlapped = true;
                    self.elements[j].overlapped = true;
                }
            }
        }
    }

    /// Minimal axis-aligned rectangle covering all members' bounding boxes.
    /// Empty collection yields the degenerate zero rectangle.
    pub fn bounds(&self) -> RectF {
        let mut iter = self.elements.iter().map(|e| e.bounding_box());
        match iter.next() {
            Some(first) => iter.fold(first, |acc, b| acc.union(&b)),
            None => RectF::ZERO,
        }
    }

    /// Writes one manifest line per member. Scales are stored relative to the
    /// current base scale so that reapplying the base on load reproduces the
    /// absolute scale.
    pub fn serialize<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for e in &self.elements {
            let s = e.scale();
            let rel = Vec2::new(
                if self.scale.x != 0.0 { s.x / self.scale.x } else { s.x },
                if self.scale.y != 0.0 { s.y / self.scale.y } else { s.y },
            );
            writeln!(
                out,
                "{}:{}:{}:{}:{}",
                e.name(),
                e.position().x,
                e.position().y,
                rel.x,
                rel.y
            )?;
        }
        Ok(())
    }

    /// Parses manifest element lines, skipping malformed ones, and restores
    /// each record through `load_image` (which supplies pixel data by name).
    pub fn deserialize<'a>(
        &mut self,
        lines: impl Iterator<Item = &'a str>,
        mut load_image: impl FnMut(&str) -> RgbaImage,
    ) {
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match ElementRecord::parse(line) {
                Some(record) => {
                    let image = load_image(&record.name);
                    self.restore(record, image);
                }
                None => warn!("skipping malformed manifest line: {line:?}"),
            }
        }
    }

    /// Moves a single member to an absolute position (packer write-back).
    pub(crate) fn place_element(&mut self, index: usize, position: Vec2) {
        if let Some(e) = self.elements.get_mut(index) {
            e.set_position(position);
        }
    }

    fn refresh_any_selected(&mut self) {
        self.any_selected = self.elements.iter().any(|e| e.selected);
    }
}

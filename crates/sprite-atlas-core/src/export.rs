use crate::atlas::{Atlas, FORMAT_VERSION};
use serde_json::{Value, json};

/// Serializes an atlas layout as a JSON object keyed by element name, with a
/// `meta` block describing the writer. Intended for tooling that wants the
/// layout without parsing the manifest text format. Duplicate element names
/// collapse onto one key (the later element wins), matching the bitmap
/// last-write-wins rule on save.
pub fn layout_json(atlas: &Atlas) -> Value {
    let mut elements = serde_json::Map::new();
    for e in atlas.collection().iter() {
        let size = e.scaled_size();
        let (nw, nh) = e.native_size();
        elements.insert(
            e.name().to_string(),
            json!({
                "position": {"x": e.position().x, "y": e.position().y},
                "scale": {"x": e.scale().x, "y": e.scale().y},
                "size": {"w": size.x, "h": size.y},
                "sourceSize": {"w": nw, "h": nh},
            }),
        );
    }
    json!({
        "elements": elements,
        "meta": {
            "app": "sprite-atlas",
            "version": env!("CARGO_PKG_VERSION"),
            "format": FORMAT_VERSION,
            "name": atlas.name(),
        }
    })
}

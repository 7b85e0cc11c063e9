use image::RgbaImage;
use sprite_atlas_core::collection::{ElementRecord, PlacementCollection};
use sprite_atlas_core::error::AtlasError;
use sprite_atlas_core::model::Vec2;
use sprite_atlas_core::packer::{AtlasPacker, PackerSettings};

fn place(c: &mut PlacementCollection, name: &str, w: u32, h: u32, x: f32, y: f32) {
    c.restore(
        ElementRecord {
            name: name.into(),
            position: Vec2::new(x, y),
            scale: Vec2::ONE,
        },
        RgbaImage::new(w, h),
    );
}

fn settings(max: u32, margin: u32) -> PackerSettings {
    PackerSettings {
        max_size: (max, max),
        margin: (margin, margin),
        allow_rotation: false,
    }
}

#[test]
fn successful_pack_places_everything_in_bounds() {
    let mut c = PlacementCollection::default();
    place(&mut c, "a", 100, 50, 500.0, 500.0);
    place(&mut c, "b", 100, 50, 510.0, 510.0);
    place(&mut c, "c", 40, 40, 520.0, 520.0);

    let mut packer = AtlasPacker::new(settings(1024, 2));
    packer.load_rects(&c);
    let report = packer.pack().expect("pack");
    assert_eq!(report.placed, 3);
    packer.apply_changes(&mut c);

    // Everything moved into [0, max) and margins keep the boxes disjoint.
    for e in c.iter() {
        let b = e.bounding_box();
        assert!(b.x >= 0.0 && b.y >= 0.0);
        assert!(b.x + b.w <= 1024.0 && b.y + b.h <= 1024.0);
    }
    c.find_overlapped();
    assert!(c.iter().all(|e| !e.is_overlapped()));
}

#[test]
fn margin_inflates_footprints() {
    // Two 100x100 images with margin 20 need 240 > 230 of width/height,
    // so a single 230x230 bin cannot hold both.
    let mut c = PlacementCollection::default();
    place(&mut c, "a", 100, 100, 0.0, 0.0);
    place(&mut c, "b", 100, 100, 0.0, 0.0);

    let mut packer = AtlasPacker::new(settings(230, 20));
    packer.load_rects(&c);
    match packer.pack() {
        Err(AtlasError::MultiBin(2)) => {}
        other => panic!("expected MultiBin(2), got {other:?}"),
    }

    let mut packer = AtlasPacker::new(settings(250, 20));
    packer.load_rects(&c);
    packer.pack().expect("fits with the larger bin");
}

#[test]
fn scaled_bounds_feed_the_packer() {
    let mut c = PlacementCollection::new(Vec2::ZERO, Vec2::new(4.0, 4.0));
    c.add(
        sprite_atlas_core::element::Element::new("big", RgbaImage::new(100, 100)),
        false,
    );

    // 100px native at 4x scale exceeds a 256 bin even though the native
    // size would fit.
    let mut packer = AtlasPacker::new(settings(256, 0));
    packer.load_rects(&c);
    match packer.pack() {
        Err(AtlasError::OutOfSpace) => {}
        other => panic!("expected OutOfSpace, got {other:?}"),
    }
}

#[test]
fn failed_pack_leaves_positions_untouched() {
    let mut c = PlacementCollection::default();
    place(&mut c, "a", 300, 300, 11.0, 12.0);
    place(&mut c, "b", 300, 300, 13.0, 14.0);

    let mut packer = AtlasPacker::new(settings(320, 2));
    packer.load_rects(&c);
    assert!(packer.pack().is_err()); // two bins, rejected

    // apply_changes after a failure is a no-op: nothing was staged.
    packer.apply_changes(&mut c);
    assert_eq!(c.get(0).unwrap().position(), Vec2::new(11.0, 12.0));
    assert_eq!(c.get(1).unwrap().position(), Vec2::new(13.0, 14.0));
}

#[test]
fn empty_collection_is_an_error() {
    let c = PlacementCollection::default();
    let mut packer = AtlasPacker::new(settings(256, 2));
    packer.load_rects(&c);
    match packer.pack() {
        Err(AtlasError::Empty) => {}
        other => panic!("expected Empty, got {other:?}"),
    }
}

#[test]
fn settings_validation_rejects_degenerate_configs() {
    let zero = PackerSettings {
        max_size: (0, 256),
        ..PackerSettings::default()
    };
    assert!(matches!(
        zero.validate(),
        Err(AtlasError::InvalidConfig(_))
    ));

    let margin = PackerSettings {
        max_size: (64, 64),
        margin: (64, 0),
        ..PackerSettings::default()
    };
    assert!(matches!(
        margin.validate(),
        Err(AtlasError::InvalidConfig(_))
    ));

    assert!(PackerSettings::default().validate().is_ok());
}

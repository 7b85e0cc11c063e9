use image::{Rgba, RgbaImage};
use sprite_atlas_core::atlas::{Atlas, FORMAT_VERSION, MANIFEST_FILE};
use sprite_atlas_core::collection::{ElementRecord, PlacementCollection};
use sprite_atlas_core::error::AtlasError;
use sprite_atlas_core::model::Vec2;
use std::fs;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(rgba))
}

fn place(c: &mut PlacementCollection, name: &str, image: RgbaImage, x: f32, y: f32) {
    c.restore(
        ElementRecord {
            name: name.into(),
            position: Vec2::new(x, y),
            scale: Vec2::ONE,
        },
        image,
    );
}

fn sample_atlas(name: &str) -> Atlas {
    let mut c = PlacementCollection::default();
    place(&mut c, "red", solid(4, 4, [255, 0, 0, 255]), 0.0, 0.0);
    place(&mut c, "blue", solid(4, 4, [0, 0, 255, 255]), 10.0, 3.0);
    Atlas::with_collection(name, c)
}

#[test]
fn save_without_destination_fails() {
    let atlas = Atlas::new("fresh");
    assert!(atlas.storage_path().is_none());
    match atlas.save() {
        Err(AtlasError::NoDestination) => {}
        other => panic!("expected NoDestination, got {other:?}"),
    }
}

#[test]
fn save_creates_manifest_and_image_dir() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut atlas = sample_atlas("demo");

    let dest = atlas.save_to_file(tmp.path(), false).expect("save");
    assert_eq!(dest, tmp.path().join("demo"));
    assert_eq!(atlas.storage_path(), Some(dest.as_path()));
    assert!(dest.join(MANIFEST_FILE).is_file());
    assert!(dest.join("demo_img").join("red.png").is_file());
    assert!(dest.join("demo_img").join("blue.png").is_file());

    let manifest = fs::read_to_string(dest.join(MANIFEST_FILE)).expect("read");
    let mut lines = manifest.lines();
    assert_eq!(lines.next(), Some(FORMAT_VERSION));
    assert_eq!(lines.next(), Some("demo"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn save_as_without_overwrite_suffixes_a_counter() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut first = sample_atlas("demo");
    let mut second = sample_atlas("demo");

    let a = first.save_to_file(tmp.path(), false).expect("save");
    let before = fs::metadata(a.join(MANIFEST_FILE)).expect("meta").len();
    let b = second.save_to_file(tmp.path(), false).expect("save");

    assert_eq!(a, tmp.path().join("demo"));
    assert_eq!(b, tmp.path().join("demo(1)"));
    // original untouched
    assert_eq!(
        fs::metadata(a.join(MANIFEST_FILE)).expect("meta").len(),
        before
    );
}

#[test]
fn resave_overwrites_in_place() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut atlas = sample_atlas("demo");
    let dest = atlas.save_to_file(tmp.path(), false).expect("save");

    atlas
        .collection_mut()
        .move_images(Vec2::new(100.0, 0.0), false);
    atlas.save().expect("resave");

    let reloaded = Atlas::load_from_file(&dest).expect("load");
    assert_eq!(
        reloaded.collection().get(0).unwrap().position(),
        Vec2::new(100.0, 0.0)
    );
}

#[test]
fn load_roundtrip_preserves_layout() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut atlas = sample_atlas("demo");
    let dest = atlas.save_to_file(tmp.path(), false).expect("save");

    let loaded = Atlas::load_from_file(&dest).expect("load");
    assert_eq!(loaded.name(), "demo");
    assert_eq!(loaded.storage_path(), Some(dest.as_path()));
    assert_eq!(loaded.collection().len(), 2);

    let red = loaded.collection().get(0).unwrap();
    assert_eq!(red.name(), "red");
    assert_eq!(red.position(), Vec2::ZERO);
    assert_eq!(red.native_size(), (4, 4));
    assert_eq!(red.image().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    let blue = loaded.collection().get(1).unwrap();
    assert_eq!(blue.position(), Vec2::new(10.0, 3.0));
}

#[test]
fn missing_bitmap_loads_as_placeholder() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut atlas = sample_atlas("demo");
    let dest = atlas.save_to_file(tmp.path(), false).expect("save");
    fs::remove_file(dest.join("demo_img").join("blue.png")).expect("remove");

    let loaded = Atlas::load_from_file(&dest).expect("load");
    assert_eq!(loaded.collection().len(), 2);
    let blue = loaded.collection().get(1).unwrap();
    assert_eq!(
        blue.native_size(),
        sprite_atlas_core::element::Element::placeholder_image().dimensions()
    );
    // placement survives even though the pixels did not
    assert_eq!(blue.position(), Vec2::new(10.0, 3.0));
}

#[test]
fn unknown_version_and_bad_lines_do_not_abort_the_load() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().join("odd");
    fs::create_dir_all(dir.join("odd_img")).expect("mkdir");
    solid(4, 4, [0, 255, 0, 255])
        .save(dir.join("odd_img").join("ok.png"))
        .expect("png");
    fs::write(
        dir.join(MANIFEST_FILE),
        "9.9.9\nodd\nok:1:2:1:1\ncompletely broken line\n",
    )
    .expect("manifest");

    let loaded = Atlas::load_from_file(&dir).expect("load");
    assert_eq!(loaded.name(), "odd");
    assert_eq!(loaded.collection().len(), 1);
    assert_eq!(
        loaded.collection().get(0).unwrap().position(),
        Vec2::new(1.0, 2.0)
    );
}

#[test]
fn missing_manifest_is_a_hard_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        Atlas::load_from_file(tmp.path()),
        Err(AtlasError::Io(_))
    ));
}

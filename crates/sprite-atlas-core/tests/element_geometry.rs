use image::RgbaImage;
use sprite_atlas_core::element::Element;
use sprite_atlas_core::model::Vec2;

fn element(w: u32, h: u32) -> Element {
    Element::new("e", RgbaImage::new(w, h))
}

#[test]
fn bounding_box_tracks_position_and_scale() {
    let mut e = element(100, 50);
    e.set_position(Vec2::new(7.0, -3.0));
    e.apply_scale(Vec2::new(2.0, 0.5));
    e.translate(Vec2::new(3.0, 3.0));
    e.apply_scale(Vec2::new(1.5, 1.5));

    let b = e.bounding_box();
    assert_eq!((b.x, b.y), (10.0, 0.0));
    assert!((b.w - 100.0 * 3.0).abs() < 1e-4);
    assert!((b.h - 50.0 * 0.75).abs() < 1e-4);
}

#[test]
fn apply_scale_composes_multiplicatively() {
    let mut e = element(10, 10);
    e.apply_scale(Vec2::new(2.0, 2.0));
    e.apply_scale(Vec2::new(0.5, 3.0));
    let s = e.scale();
    assert!((s.x - 1.0).abs() < 1e-6);
    assert!((s.y - 6.0).abs() < 1e-6);
}

#[test]
fn negative_scale_is_clamped() {
    let mut e = element(10, 10);
    e.set_scale(Vec2::new(-1.0, 2.0));
    assert_eq!(e.scale().x, 0.0);
    assert_eq!(e.scale().y, 2.0);
    assert_eq!(e.bounding_box().w, 0.0);
}

#[test]
fn hit_test_uses_scaled_box() {
    let mut e = element(10, 10);
    e.set_position(Vec2::new(100.0, 100.0));
    e.apply_scale(Vec2::new(2.0, 2.0));
    assert!(e.contains(Vec2::new(119.0, 119.0)));
    assert!(!e.contains(Vec2::new(121.0, 101.0)));
    assert!(!e.contains(Vec2::new(99.0, 99.0)));
}

#[test]
fn name_separator_is_sanitized() {
    let e = Element::new("a:b:c", RgbaImage::new(1, 1));
    assert_eq!(e.name(), "a_b_c");
}

#[test]
fn missing_file_falls_back_to_placeholder() {
    let e = Element::from_path("gone", std::path::Path::new("does/not/exist.png"));
    assert_eq!(e.native_size(), Element::placeholder_image().dimensions());
}

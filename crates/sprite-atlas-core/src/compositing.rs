use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Copies `src` into `canvas` with its top-left at `(dx, dy)`, resampling to
/// `w`×`h` first when that differs from the source size.
///
/// Pixels are written, not alpha-blended: later blits overwrite earlier ones,
/// matching collection draw order.
pub fn blit_scaled(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, w: u32, h: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let resized;
    let pixels: &RgbaImage = if src.dimensions() == (w, h) {
        src
    } else {
        resized = imageops::resize(src, w, h, FilterType::Triangle);
        &resized
    };
    let (cw, ch) = canvas.dimensions();
    for yy in 0..h {
        for xx in 0..w {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *pixels.get_pixel(xx, yy));
            }
        }
    }
}

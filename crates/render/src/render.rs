//! Nearest-neighbour resampling of source rasters onto a canvas

use painting::{Raster, Rgba, TRANSPARENT};
use rayon::prelude::*;
use tracing::debug;

use crate::view::ViewState;

/// Draw the part of `source` inside the view's window onto `target`.
///
/// Canvas pixels outside the viewport become transparent. Rows are
/// resampled in parallel.
pub fn render_layer(source: &Raster, target: &mut Raster, view: &ViewState) {
    let width = target.width as usize;
    if width == 0 || target.height == 0 {
        return;
    }

    let map = view.canvas_to_image_affine();
    let viewport = view.viewport();
    let window = view.window();
    let (src_w, src_h) = (source.width as usize, source.height as usize);
    let src = source.pixels();

    target
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, pixels)| {
            let cy = row as f64 + 0.5;
            let row_visible = cy >= viewport.y && cy < viewport.bottom();
            for (col, pixel) in pixels.iter_mut().enumerate() {
                let cx = col as f64 + 0.5;
                if !row_visible || cx < viewport.x || cx >= viewport.right() {
                    *pixel = TRANSPARENT;
                    continue;
                }
                let (ix, iy) = map.apply(cx, cy);
                *pixel = sample(src, src_w, src_h, ix, iy, window.right(), window.bottom());
            }
        });

    debug!(
        "render_layer: {}x{} from window ({:.0}, {:.0}) {:.0}x{:.0} zoom {:.3}",
        target.width,
        target.height,
        window.x,
        window.y,
        window.width,
        window.height,
        view.zoom()
    );
}

#[inline]
fn sample(src: &[Rgba], w: usize, h: usize, ix: f64, iy: f64, max_x: f64, max_y: f64) -> Rgba {
    if ix < 0.0 || iy < 0.0 || ix >= max_x || iy >= max_y {
        return TRANSPARENT;
    }
    let (x, y) = (ix as usize, iy as usize);
    if x >= w || y >= h {
        return TRANSPARENT;
    }
    src[y * w + x]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::{Point, Size};
    use scrim_config::ZoomConfig;

    /// 4x2 source with distinct colours per pixel
    fn source() -> Raster {
        let mut raster = Raster::new(4, 2);
        for y in 0..2 {
            for x in 0..4 {
                raster.set_pixel(x, y, [x as u8 * 10, y as u8 * 10, 0, 255]);
            }
        }
        raster
    }

    #[test]
    fn test_identity_render() {
        let src = source();
        let view = ViewState::new(Size::new(4.0, 2.0), Size::new(4.0, 2.0), 0.0, &ZoomConfig::default());
        let mut target = Raster::new(4, 2);
        render_layer(&src, &mut target, &view);
        assert_eq!(target, src);
    }

    #[test]
    fn test_quarter_turn_render() {
        let src = source();
        let view = ViewState::new(Size::new(2.0, 4.0), Size::new(4.0, 2.0), 90.0, &ZoomConfig::default());
        let mut target = Raster::new(2, 4);
        render_layer(&src, &mut target, &view);

        // Clockwise: the source's bottom-left lands top-left
        assert_eq!(target.get_pixel(0, 0), src.get_pixel(0, 1));
        assert_eq!(target.get_pixel(1, 0), src.get_pixel(0, 0));
        assert_eq!(target.get_pixel(0, 3), src.get_pixel(3, 1));
        for y in 0..4 {
            for x in 0..2 {
                let image = view.canvas_to_image(Point::new(x as f64 + 0.5, y as f64 + 0.5));
                assert_eq!(
                    target.get_pixel(x, y),
                    src.get_pixel(image.x as u32, image.y as u32)
                );
            }
        }
    }

    #[test]
    fn test_outside_viewport_is_transparent() {
        let src = source();
        // 4x2 image on a 4x4 canvas leaves the bottom half uncovered
        let view = ViewState::new(Size::new(4.0, 4.0), Size::new(4.0, 2.0), 0.0, &ZoomConfig::default());
        let mut target = Raster::new(4, 4);
        target.clear([1, 2, 3, 255]);
        render_layer(&src, &mut target, &view);
        assert_eq!(target.get_pixel(3, 1), src.get_pixel(3, 1));
        assert_eq!(target.get_pixel(0, 2), Some(TRANSPARENT));
        assert_eq!(target.get_pixel(3, 3), Some(TRANSPARENT));
    }

    #[test]
    fn test_downsampled_render() {
        let mut src = Raster::new(8, 8);
        src.fill_rect(0, 0, 4, 8, [255, 0, 0, 255]);
        let view = ViewState::new(Size::new(4.0, 4.0), Size::new(8.0, 8.0), 0.0, &ZoomConfig::default());
        assert_eq!(view.zoom(), 2.0);
        let mut target = Raster::new(4, 4);
        render_layer(&src, &mut target, &view);
        assert_eq!(target.get_pixel(1, 3), Some([255, 0, 0, 255]));
        assert_eq!(target.get_pixel(2, 0), Some(TRANSPARENT));
    }
}

//! Pixel-level drawing: grid, Bresenham lines and waveform projection

use biochart_core::Sample;
use image::{Rgba, RgbaImage};

/// Grid spacing in pixels, both axes
pub const GRID_SPACING: u32 = 50;

/// A line segment in pixel coordinates, both endpoints inside the track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

/// Mapping from sample coordinates to track pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub offset_x: f64,
    pub scale_x: f64,
    pub y_min: f64,
    pub y_scale: f64,
    pub width: u32,
    pub height: u32,
}

impl Projection {
    /// Pixel position of a sample, `None` when it does not land inside the track
    fn pixel(&self, sample: &Sample) -> Option<(i64, i64)> {
        let x = (sample.time - self.offset_x) * self.scale_x;
        let dy = (sample.value - self.y_min) * self.y_scale;
        if !x.is_finite() || !dy.is_finite() {
            return None;
        }

        let x = x as i64;
        let y = i64::from(self.height) - dy as i64;
        let inside = (0..i64::from(self.width)).contains(&x) && (0..i64::from(self.height)).contains(&y);
        inside.then_some((x, y))
    }
}

/// Fill the whole image with one colour
pub fn fill(img: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
}

/// Vertical and horizontal lines every [`GRID_SPACING`] pixels
pub fn draw_grid(img: &mut RgbaImage, color: Rgba<u8>) {
    let (width, height) = img.dimensions();

    for x in (0..width).step_by(GRID_SPACING as usize) {
        for y in 0..height {
            img.put_pixel(x, y, color);
        }
    }
    for y in (0..height).step_by(GRID_SPACING as usize) {
        for x in 0..width {
            img.put_pixel(x, y, color);
        }
    }
}

/// Integer Bresenham line, both endpoints plotted. Pixels outside the image
/// are skipped.
pub fn draw_line(img: &mut RgbaImage, segment: Segment, color: Rgba<u8>) {
    let Segment { mut x0, mut y0, x1, y1 } = segment;
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let (width, height) = img.dimensions();
    loop {
        if let (Ok(x), Ok(y)) = (u32::try_from(x0), u32::try_from(y0)) {
            if x < width && y < height {
                img.put_pixel(x, y, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Stride used to keep at most `2 * width` points, 1 when no decimation is needed
pub fn decimation_stride(len: usize, width: u32) -> usize {
    let budget = 2 * width as usize;
    if budget == 0 || len <= budget {
        return 1;
    }
    len.div_ceil(budget)
}

/// Segments joining consecutive (decimated) samples.
///
/// A segment is kept only when both endpoints fall inside the track; partly
/// visible segments are dropped.
pub fn project_segments(samples: &[Sample], projection: &Projection) -> Vec<Segment> {
    let stride = decimation_stride(samples.len(), projection.width);
    if stride > 1 {
        tracing::trace!(points = samples.len(), stride, "decimating waveform");
    }

    let points: Vec<Option<(i64, i64)>> = samples
        .iter()
        .step_by(stride)
        .map(|s| projection.pixel(s))
        .collect();

    points
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some((x0, y0)), Some((x1, y1))) => Some(Segment { x0, y0, x1, y1 }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn lit(img: &RgbaImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p == RED)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    fn projection(width: u32, height: u32) -> Projection {
        Projection {
            offset_x: 0.0,
            scale_x: 1.0,
            y_min: -1.0,
            y_scale: height as f64 / 2.0,
            width,
            height,
        }
    }

    #[test]
    fn test_line_plots_both_endpoints() {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        draw_line(&mut img, Segment { x0: 1, y0: 1, x1: 4, y1: 1 }, RED);
        assert_eq!(lit(&img), vec![(1, 1), (2, 1), (3, 1), (4, 1)]);

        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        draw_line(&mut img, Segment { x0: 3, y0: 3, x1: 3, y1: 3 }, RED);
        assert_eq!(lit(&img), vec![(3, 3)]);
    }

    #[test]
    fn test_line_diagonal_and_reverse() {
        let mut forward = RgbaImage::from_pixel(8, 8, WHITE);
        draw_line(&mut forward, Segment { x0: 0, y0: 0, x1: 5, y1: 5 }, RED);
        assert_eq!(lit(&forward).len(), 6);
        assert!(lit(&forward).iter().all(|(x, y)| x == y));

        let mut steep = RgbaImage::from_pixel(8, 8, WHITE);
        draw_line(&mut steep, Segment { x0: 2, y0: 7, x1: 1, y1: 0 }, RED);
        let pixels = lit(&steep);
        assert_eq!(pixels.len(), 8);
        assert!(pixels.contains(&(2, 7)) && pixels.contains(&(1, 0)));
    }

    #[test]
    fn test_grid_every_fifty_pixels() {
        let mut img = RgbaImage::from_pixel(120, 60, WHITE);
        draw_grid(&mut img, RED);

        assert_eq!(*img.get_pixel(0, 33), RED);
        assert_eq!(*img.get_pixel(50, 33), RED);
        assert_eq!(*img.get_pixel(100, 59), RED);
        assert_eq!(*img.get_pixel(77, 50), RED);
        assert_eq!(*img.get_pixel(77, 0), RED);
        assert_eq!(*img.get_pixel(49, 49), WHITE);
        assert_eq!(*img.get_pixel(119, 1), WHITE);
    }

    #[test]
    fn test_decimation_stride() {
        assert_eq!(decimation_stride(100, 50), 1);
        assert_eq!(decimation_stride(101, 50), 2);
        assert_eq!(decimation_stride(1_000_000, 800), 625);
        assert_eq!(decimation_stride(10, 0), 1);
    }

    #[test]
    fn test_segment_count_bounded() {
        for (len, width) in [(10usize, 4u32), (999, 100), (100_000, 640), (12_345, 1)] {
            let samples: Vec<Sample> = (0..len)
                .map(|i| Sample::new(i as f64 * width as f64 / len as f64, 0.0))
                .collect();
            let segments = project_segments(&samples, &projection(width, 100));
            assert!(segments.len() <= 2 * width as usize, "len {} width {}", len, width);
        }
    }

    #[test]
    fn test_offscreen_segments_dropped() {
        let samples = vec![
            Sample::new(-1.0, 0.0),
            Sample::new(1.0, 0.0),
            Sample::new(2.0, 0.5),
            Sample::new(3.0, 5.0),
        ];
        let segments = project_segments(&samples, &projection(10, 20));
        // y = 20 - trunc((v + 1) * 10)
        assert_eq!(segments, vec![Segment { x0: 1, y0: 10, x1: 2, y1: 5 }]);
    }

    #[test]
    fn test_value_at_y_min_is_outside() {
        // y_min maps to row == height, one past the last row
        let p = projection(10, 20);
        assert_eq!(p.pixel(&Sample::new(1.0, -1.0)), None);
        assert_eq!(p.pixel(&Sample::new(1.0, -0.8)), Some((1, 19)));
    }
}

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, info};
use region_core::scanline::{self, Span};
use region_core::{ClipRectHeap, ClipRegion, Point, Rect};

use crate::clip::ClipContext;
use crate::error::{Result, SurfaceError};

/// Software RGBA target with a clip context.
///
/// Drawing calls take logical coordinates (relative to the context's device
/// origin) and only touch pixels inside the context's effective region.
///
/// Typical flow:
/// - let mut surface = Surface::new(&heap, w, h)?;
/// - surface.clip_mut().set_device(window_rect)?;
/// - surface.fill_rect(..), surface.fill_circle(..) ...
/// - surface.save_png(path)?;
pub struct Surface {
    image: RgbaImage,
    clip: ClipContext,
}

impl Surface {
    /// Surface of `width` x `height` pixels, cleared to transparent black.
    pub fn new(heap: &ClipRectHeap, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        let bounds = Rect::new(0, 0, width as i32, height as i32);
        Ok(Self {
            image: RgbaImage::new(width, height),
            clip: ClipContext::new(heap, bounds)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whole surface in surface coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.image.width() as i32, self.image.height() as i32)
    }

    pub fn clip(&self) -> &ClipContext {
        &self.clip
    }

    pub fn clip_mut(&mut self) -> &mut ClipContext {
        &mut self.clip
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel at surface coordinates, `None` outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if x < 0 || y < 0 {
            return None;
        }
        self.image.get_pixel_checked(x as u32, y as u32).copied()
    }

    /// Fill the entire surface, ignoring the clip.
    pub fn clear(&mut self, color: Rgba<u8>) {
        for px in self.image.pixels_mut() {
            *px = color;
        }
    }

    /// Write `color` over a surface-space rect already limited to the clip.
    fn blit(image: &mut RgbaImage, bounds: Rect, rect: Rect, color: Rgba<u8>) {
        let Some(rect) = rect.intersection(&bounds) else {
            return;
        };
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    /// Fill a device-space rect through every effective clip rect.
    fn fill_device_rect(&mut self, target: Rect, color: Rgba<u8>) {
        let bounds = self.bounds();
        let effective = self.clip.effective_region();
        if !effective.intersects_rect(&target) {
            return;
        }
        for clip in effective.rects() {
            if clip.top >= target.bottom {
                break;
            }
            if let Some(part) = clip.intersection(&target) {
                Self::blit(&mut self.image, bounds, part, color);
            }
        }
    }

    /// Fill a logical rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let rect = rect.normalized();
        if rect.is_empty() {
            return;
        }
        let (ox, oy) = self.clip.origin();
        self.fill_device_rect(rect.offset(ox, oy), color);
    }

    /// Fill every pixel of a region given in logical coordinates.
    pub fn fill_region(&mut self, region: &ClipRegion, color: Rgba<u8>) -> Result<()> {
        let (ox, oy) = self.clip.origin();
        let mut target = ClipRegion::new(region.heap());
        target.copy_from(region)?;
        target.offset(ox, oy);
        target.intersect_with(self.clip.effective_region())?;
        debug!("fill_region: {} rects after clipping", target.len());

        let bounds = self.bounds();
        for r in target.rects() {
            Self::blit(&mut self.image, bounds, *r, color);
        }
        Ok(())
    }

    /// Fill scanline spans given in logical coordinates.
    pub fn fill_spans(&mut self, spans: &[Span], color: Rgba<u8>) {
        let (ox, oy) = self.clip.origin();
        for span in spans {
            self.fill_device_rect(span.to_rect().offset(ox, oy), color);
        }
    }

    /// Filled circle; a radius below 1 paints the centre pixel.
    pub fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Rgba<u8>) {
        if r < 1 {
            self.fill_spans(&[Span::new(y, x, x)], color);
            return;
        }
        self.fill_spans(&scanline::circle_spans(x, y, r), color);
    }

    /// Filled ellipse; either radius below 1 paints the centre pixel.
    pub fn fill_ellipse(&mut self, x: i32, y: i32, rx: i32, ry: i32, color: Rgba<u8>) {
        if rx < 1 || ry < 1 {
            self.fill_spans(&[Span::new(y, x, x)], color);
            return;
        }
        self.fill_spans(&scanline::ellipse_spans(x, y, rx, ry), color);
    }

    /// Filled polygon (even-odd rule); fewer than three vertices draws nothing.
    pub fn fill_polygon(&mut self, pts: &[Point], color: Rgba<u8>) {
        if pts.len() < 3 {
            return;
        }
        self.fill_spans(&scanline::polygon_spans(pts), color);
    }

    /// Encode the surface as PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.image.save_with_format(path, ImageFormat::Png)?;
        info!("wrote {}x{} surface to {}", self.width(), self.height(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn surface(w: u32, h: u32) -> Surface {
        let heap = ClipRectHeap::new(64).unwrap();
        Surface::new(&heap, w, h).unwrap()
    }

    fn painted(s: &Surface) -> usize {
        s.image().pixels().filter(|p| **p == RED).count()
    }

    #[test]
    fn rejects_zero_size() {
        let heap = ClipRectHeap::new(4).unwrap();
        assert!(matches!(
            Surface::new(&heap, 0, 10),
            Err(SurfaceError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn fill_rect_is_clamped_to_surface() {
        let mut s = surface(10, 10);
        s.fill_rect(Rect::new(-5, -5, 3, 3), RED);
        assert_eq!(painted(&s), 9);
        assert_eq!(s.pixel(2, 2), Some(RED));
        assert_eq!(s.pixel(3, 3), Some(CLEAR));
    }

    #[test]
    fn fill_respects_excluded_rect() {
        let mut s = surface(10, 10);
        s.clip_mut().exclude_clip_rect(Rect::new(2, 2, 8, 8)).unwrap();
        s.fill_rect(Rect::new(0, 0, 10, 10), RED);
        assert_eq!(painted(&s), 100 - 36);
        assert_eq!(s.pixel(5, 5), Some(CLEAR));
    }

    #[test]
    fn logical_coordinates_follow_device_origin() {
        let mut s = surface(20, 20);
        s.clip_mut().set_device(Rect::new(10, 10, 20, 20)).unwrap();
        s.fill_rect(Rect::new(0, 0, 2, 2), RED);
        assert_eq!(s.pixel(10, 10), Some(RED));
        assert_eq!(s.pixel(0, 0), Some(CLEAR));

        // drawing beyond the device is cut
        s.fill_rect(Rect::new(5, 5, 50, 50), RED);
        assert_eq!(painted(&s), 4 + 25);
    }

    #[test]
    fn fill_region_clips_to_effective_region() {
        let mut s = surface(10, 10);
        s.clip_mut().select_clip_rect(Some(Rect::new(0, 0, 5, 10))).unwrap();
        let mut rgn = ClipRegion::new(s.clip().effective_region().heap());
        rgn.set_rect(Rect::new(3, 0, 8, 2)).unwrap();
        s.fill_region(&rgn, RED).unwrap();
        assert_eq!(painted(&s), 4);
    }

    #[test]
    fn shapes_paint_expected_pixels() {
        let mut s = surface(40, 40);
        s.fill_circle(20, 20, 0, RED);
        assert_eq!(painted(&s), 1);

        s.fill_circle(20, 20, 5, RED);
        assert_eq!(s.pixel(20, 15), Some(RED));
        assert_eq!(s.pixel(15, 15), Some(CLEAR));

        s.fill_polygon(&[Point::new(0, 0), Point::new(5, 5)], RED);
        let square = [
            Point::new(0, 30),
            Point::new(10, 30),
            Point::new(10, 40),
            Point::new(0, 40),
        ];
        s.fill_polygon(&square, RED);
        assert_eq!(s.pixel(5, 35), Some(RED));

        s.fill_ellipse(30, 5, 6, 3, RED);
        assert_eq!(s.pixel(36, 5), Some(RED));
        assert_eq!(s.pixel(30, 9), Some(CLEAR));
    }
}

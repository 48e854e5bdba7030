use image::Rgba;
use region_core::Rect;

use crate::surface::Surface;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BorderWidths {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BorderWidths {
    pub const fn uniform(width: i32) -> Self {
        Self { top: width, right: width, bottom: width, left: width }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BorderStyle {
    pub widths: BorderWidths,
    pub color: Rgba<u8>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RectStyle {
    pub fill: Option<Rgba<u8>>,
    pub border: Option<BorderStyle>,
}

/// Draw a rectangle with optional fill and per-side border widths. Borders
/// are drawn inside `rect`, over the fill.
pub fn draw_rectangle(surface: &mut Surface, rect: Rect, style: &RectStyle) {
    let rect = rect.normalized();
    if let Some(fill) = style.fill {
        surface.fill_rect(rect, fill);
    }
    if let Some(border) = &style.border {
        let b = &border.widths;
        let c = border.color;
        if b.top > 0 {
            surface.fill_rect(Rect { bottom: rect.top + b.top, ..rect }, c);
        }
        if b.right > 0 {
            surface.fill_rect(Rect { left: rect.right - b.right, ..rect }, c);
        }
        if b.bottom > 0 {
            surface.fill_rect(Rect { top: rect.bottom - b.bottom, ..rect }, c);
        }
        if b.left > 0 {
            surface.fill_rect(Rect { right: rect.left + b.left, ..rect }, c);
        }
    }
}

/// Window decoration: a framed body with a caption bar of `caption_height`.
#[derive(Clone, Copy, Debug)]
pub struct WindowStyle {
    pub body: Rgba<u8>,
    pub caption: Rgba<u8>,
    pub frame: Rgba<u8>,
    pub caption_height: i32,
    pub frame_width: i32,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            body: Rgba([236, 236, 236, 255]),
            caption: Rgba([58, 110, 165, 255]),
            frame: Rgba([20, 20, 20, 255]),
            caption_height: 18,
            frame_width: 1,
        }
    }
}

/// Paint a window of `width` x `height` at the logical origin, returning the
/// client rectangle left for content.
pub fn draw_window(surface: &mut Surface, width: i32, height: i32, style: &WindowStyle) -> Rect {
    let outer = Rect::new(0, 0, width, height);
    draw_rectangle(
        surface,
        outer,
        &RectStyle {
            fill: Some(style.body),
            border: Some(BorderStyle {
                widths: BorderWidths::uniform(style.frame_width),
                color: style.frame,
            }),
        },
    );

    let inner = outer.inflate(-style.frame_width, -style.frame_width);
    let caption = Rect { bottom: inner.top + style.caption_height, ..inner };
    surface.fill_rect(caption, style.caption);

    Rect { top: caption.bottom, ..inner }
}

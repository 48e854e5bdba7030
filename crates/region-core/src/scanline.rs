//! Scanline generators for circles, ellipses and polygons.
//!
//! Each generator pushes horizontal [`Span`]s into a sink closure. The same
//! spans feed region construction (`ClipRegion::set_circle` and friends) and
//! direct pixel fills. Spans may be emitted in any row order and may repeat
//! a row; consumers must tolerate both.

use crate::rect::{Point, Rect};

/// One horizontal run on row `y`, with inclusive endpoints in either order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub y: i32,
    pub x1: i32,
    pub x2: i32,
}

impl Span {
    pub const fn new(y: i32, x1: i32, x2: i32) -> Self {
        Self { y, x1, x2 }
    }

    pub fn left(&self) -> i32 {
        self.x1.min(self.x2)
    }

    pub fn right(&self) -> i32 {
        self.x1.max(self.x2)
    }

    /// The one-row half-open rectangle covered by this span.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left(),
            self.y,
            self.right().saturating_add(1),
            self.y.saturating_add(1),
        )
    }
}

/// Span with coordinates saturated into `i32`.
fn span(y: i64, x1: i64, x2: i64) -> Span {
    let clamp = |v: i64| v.clamp(i32::MIN.into(), i32::MAX.into()) as i32;
    Span::new(clamp(y), clamp(x1), clamp(x2))
}

/// Midpoint circle of radius `r` centred at (`x`, `y`).
pub fn circle(x: i32, y: i32, r: i32, mut emit: impl FnMut(Span)) {
    let (x, y, r) = (i64::from(x), i64::from(y), i64::from(r));
    let mut cx = 0;
    let mut cy = r;
    let mut df = 1 - r;
    let mut d_e = 3;
    let mut d_se = -2 * r + 5;

    loop {
        emit(span(y + cy, x - cx, x + cx));
        if cy != 0 {
            emit(span(y - cy, x - cx, x + cx));
        }
        if cx != cy {
            emit(span(y + cx, x - cy, x + cy));
            if cx != 0 {
                emit(span(y - cx, x - cy, x + cy));
            }
        }

        if df < 0 {
            df += d_e;
            d_e += 2;
            d_se += 2;
        } else {
            df += d_se;
            d_e += 2;
            d_se += 4;
            cy -= 1;
        }
        cx += 1;

        if cx > cy {
            break;
        }
    }
}

/// Ellipse with radii `rx`, `ry` centred at (`x`, `y`), using an incremental
/// 26.6 fixed-point walk along the longer axis. Radii below 1 are clamped.
/// The walk runs in `i64`, so `rx * ry` may exceed `i32::MAX`.
pub fn ellipse(x: i32, y: i32, rx: i32, ry: i32, mut emit: impl FnMut(Span)) {
    const UNSET: i64 = i64::MAX;
    let (x, y) = (i64::from(x), i64::from(y));
    let rx = i64::from(rx.max(1));
    let ry = i64::from(ry.max(1));

    let (mut h, mut i, mut j, mut k) = (UNSET, UNSET, UNSET, UNSET);
    let mut ix: i64 = 0;

    if rx > ry {
        let mut iy = rx * 64;
        loop {
            let (oh, oi, oj, ok) = (h, i, j, k);
            h = (ix + 32) >> 6;
            i = (iy + 32) >> 6;
            j = (h * ry) / rx;
            k = (i * ry) / rx;

            if (h != oh || k != ok) && h < oi {
                emit(span(y + k, x - h, x + h));
                if k != 0 {
                    emit(span(y - k, x - h, x + h));
                }
            }
            if (i != oi || j != oj) && h < i {
                emit(span(y + j, x - i, x + i));
                if j != 0 {
                    emit(span(y - j, x - i, x + i));
                }
            }

            ix += iy / rx;
            iy -= ix / rx;
            if i <= h {
                break;
            }
        }
    } else {
        let mut iy = ry * 64;
        loop {
            let (oh, oi, oj, ok) = (h, i, j, k);
            h = (ix + 32) >> 6;
            i = (iy + 32) >> 6;
            j = (h * rx) / ry;
            k = (i * rx) / ry;

            if (j != oj || i != oi) && h < i {
                emit(span(y + i, x - j, x + j));
                if i != 0 {
                    emit(span(y - i, x - j, x + j));
                }
            }
            if (k != ok || h != oh) && h < oi {
                emit(span(y + h, x - k, x + k));
                if h != 0 {
                    emit(span(y - h, x - k, x + k));
                }
            }

            ix += iy / ry;
            iy -= ix / ry;
            if i <= h {
                break;
            }
        }
    }
}

/// True when every horizontal line crosses the outline at most twice.
///
/// Polygons with more than three vertices must be explicitly closed (first
/// vertex repeated last) to qualify.
pub fn is_monotone_vertical(pts: &[Point]) -> bool {
    let n = pts.len();
    if n < 4 {
        return true;
    }
    if pts[0] != pts[n - 1] {
        return false;
    }

    let mut prev_dir = (pts[n - 1].y - pts[0].y).signum();
    let mut i = 0;
    while prev_dir == 0 && i < n - 1 {
        prev_dir = (pts[i].y - pts[i + 1].y).signum();
        i += 1;
    }
    if i == n - 1 {
        // flat line
        return true;
    }

    let mut reversals = 0;
    while i + 1 < n {
        let dir = (pts[i].y - pts[i + 1].y).signum();
        if dir != 0 && dir != prev_dir {
            reversals += 1;
            if reversals > 2 {
                return false;
            }
            prev_dir = dir;
        }
        i += 1;
    }
    true
}

/// Fill spans for any polygon, picking the monotone generator when it applies.
pub fn polygon(pts: &[Point], emit: impl FnMut(Span)) {
    if is_monotone_vertical(pts) {
        monotone_polygon(pts, emit);
    } else {
        general_polygon(pts, emit);
    }
}

#[derive(Clone, Copy, Default)]
struct HLine {
    x1: i32,
    x2: i32,
}

/// Scan-convert the edge (x1, y1) -> (x2, y2), excluding the final row, into
/// consecutive entries of `lines` starting at `cursor`.
fn scan_edge(from: Point, to: Point, set_x1: bool, lines: &mut [HLine], cursor: &mut usize) {
    let delta_y = to.y - from.y;
    if delta_y <= 0 {
        return;
    }
    let inverse_slope = (to.x - from.x) as f64 / delta_y as f64;
    for y in from.y..to.y {
        let x = from.x + ((y - from.y) as f64 * inverse_slope).ceil() as i32;
        if let Some(line) = lines.get_mut(*cursor) {
            if set_x1 {
                line.x1 = x;
            } else {
                line.x2 = x;
            }
        }
        *cursor += 1;
    }
}

/// Generator for polygons monotone with respect to a vertical line. The
/// bottom scanline is not emitted.
pub fn monotone_polygon(pts: &[Point], mut emit: impl FnMut(Span)) {
    let n = pts.len();
    if n < 3 {
        return;
    }

    let (mut min_index, mut max_index) = (0, 0);
    let (mut min_y, mut max_y) = (pts[0].y, pts[0].y);
    for (idx, p) in pts.iter().enumerate().skip(1) {
        if p.y < min_y {
            min_y = p.y;
            min_index = idx;
        } else if p.y > max_y {
            max_y = p.y;
            max_index = idx;
        }
    }

    let rows = max_y - min_y;
    if rows <= 0 {
        return;
    }
    let mut lines = vec![HLine::default(); rows as usize];

    // One chain walks backward from the top vertex, the other forward.
    let mut cursor = 0;
    let (mut prev, mut cur) = (min_index, min_index);
    loop {
        cur = (cur + n - 1) % n;
        scan_edge(pts[prev], pts[cur], true, &mut lines, &mut cursor);
        prev = cur;
        if cur == max_index {
            break;
        }
    }

    cursor = 0;
    let (mut prev, mut cur) = (min_index, min_index);
    loop {
        cur = (cur + 1) % n;
        scan_edge(pts[prev], pts[cur], false, &mut lines, &mut cursor);
        prev = cur;
        if cur == max_index {
            break;
        }
    }

    for (row, line) in lines.iter().enumerate() {
        emit(Span::new(min_y + row as i32, line.x1, line.x2));
    }
}

const FIX_SHIFT: u32 = 18;
const FIX_ONE: i64 = 1 << FIX_SHIFT;

#[derive(Clone, Copy, Debug)]
struct Edge {
    top: i32,
    bottom: i32,
    x: i64,
    dx: i64,
    w: i64,
}

impl Edge {
    fn new(a: Point, b: Point) -> Self {
        let (p1, p2) = if b.y < a.y { (b, a) } else { (a, b) };
        let dx = (((p2.x - p1.x) as i64) << FIX_SHIFT) / (p2.y - p1.y) as i64;
        let mut x = ((p1.x as i64) << FIX_SHIFT) + (FIX_ONE >> 1) - 1;
        if dx < 0 {
            x += (dx + FIX_ONE).min(0);
        }
        Self {
            top: p1.y,
            bottom: p2.y - 1,
            x,
            dx,
            w: (dx.abs() - FIX_ONE).max(0),
        }
    }

    fn insert_key(&self) -> i64 {
        self.x + (self.w + self.dx) / 2
    }

    fn sort_key(&self) -> i64 {
        self.x + self.w / 2
    }
}

/// Active-edge-table generator for arbitrary (including self-intersecting)
/// polygons, filled with the even-odd rule.
pub fn general_polygon(pts: &[Point], mut emit: impl FnMut(Span)) {
    let n = pts.len();
    if n < 3 {
        return;
    }

    let mut inactive: Vec<Edge> = Vec::with_capacity(n);
    let mut prev = pts[n - 1];
    for &p in pts {
        if p.y != prev.y {
            let edge = Edge::new(p, prev);
            if edge.bottom >= edge.top {
                let pos = inactive.partition_point(|e| e.top < edge.top);
                inactive.insert(pos, edge);
            }
        }
        prev = p;
    }

    let (Some(top), Some(bottom)) = (
        inactive.iter().map(|e| e.top).min(),
        inactive.iter().map(|e| e.bottom).max(),
    ) else {
        return;
    };

    let mut inactive = inactive.into_iter().peekable();
    let mut active: Vec<Edge> = Vec::with_capacity(n);

    for row in top..=bottom {
        while let Some(edge) = inactive.next_if(|e| e.top == row) {
            let key = edge.insert_key();
            let pos = active.partition_point(|e| e.insert_key() < key);
            active.insert(pos, edge);
        }

        for pair in active.chunks_exact(2) {
            let x1 = (pair[0].x >> FIX_SHIFT) as i32;
            let x2 = ((pair[1].x + pair[1].w) >> FIX_SHIFT) as i32;
            emit(Span::new(row, x1, x2));
        }

        let mut idx = 0;
        while idx < active.len() {
            if row >= active[idx].bottom {
                active.remove(idx);
                continue;
            }
            active[idx].x += active[idx].dx;
            let mut j = idx;
            while j > 0 && active[j].sort_key() < active[j - 1].sort_key() {
                active.swap(j, j - 1);
                j -= 1;
            }
            idx += 1;
        }
    }
}

/// Collect the spans of a circle.
pub fn circle_spans(x: i32, y: i32, r: i32) -> Vec<Span> {
    let mut spans = Vec::new();
    circle(x, y, r, |s| spans.push(s));
    spans
}

/// Collect the spans of an ellipse.
pub fn ellipse_spans(x: i32, y: i32, rx: i32, ry: i32) -> Vec<Span> {
    let mut spans = Vec::new();
    ellipse(x, y, rx, ry, |s| spans.push(s));
    spans
}

/// Collect the spans of a polygon.
pub fn polygon_spans(pts: &[Point]) -> Vec<Span> {
    let mut spans = Vec::new();
    polygon(pts, |s| spans.push(s));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&p| Point::from(p)).collect()
    }

    #[test]
    fn circle_spans_stay_inside_radius() {
        let (cx, cy, r) = (20, 30, 7);
        let spans = circle_spans(cx, cy, r);
        assert!(!spans.is_empty());
        for s in &spans {
            assert!(s.y >= cy - r && s.y <= cy + r, "row {} out of range", s.y);
            assert!(s.left() >= cx - r && s.right() <= cx + r);
        }
        for y in cy - r..=cy + r {
            assert!(spans.iter().any(|s| s.y == y), "row {y} missing");
        }
        // the widest row passes through the centre
        assert!(spans.iter().any(|s| s.y == cy && s.left() == cx - r && s.right() == cx + r));
    }

    #[test]
    fn zero_radius_circle_is_a_point() {
        assert_eq!(circle_spans(3, 4, 0), vec![Span::new(4, 3, 3)]);
    }

    #[test]
    fn ellipse_spans_are_symmetric() {
        for (rx, ry) in [(12, 5), (4, 9), (6, 6)] {
            let spans = ellipse_spans(0, 0, rx, ry);
            assert!(!spans.is_empty());
            for s in &spans {
                assert!(s.y.abs() <= ry);
                assert!(s.left() >= -rx && s.right() <= rx);
                assert_eq!(s.left(), -s.right());
                assert!(spans.iter().any(|o| o.y == -s.y));
            }
            assert!(spans.iter().any(|s| s.y == 0 && s.right() == rx));
        }
    }

    #[test]
    fn wide_ellipse_walks_without_overflow() {
        // rx * ry is past i32::MAX
        let (rx, ry) = (60_000, 50_000);
        let spans = ellipse_spans(0, 0, rx, ry);
        for s in &spans {
            assert!(s.y.abs() <= ry);
            assert!(s.left() >= -rx && s.right() <= rx);
            assert_eq!(s.left(), -s.right());
        }
        assert!(spans.iter().any(|s| s.y == 0 && s.right() == rx));
        assert!(spans.iter().any(|s| s.y == ry));
        assert!(spans.iter().any(|s| s.y == -ry));
    }

    #[test]
    fn spans_saturate_at_the_coordinate_limit() {
        let edge = i32::MAX - 2;
        let spans = circle_spans(edge, edge, 5);
        assert!(spans.iter().any(|s| s.y == i32::MAX && s.right() == i32::MAX));
        assert!(spans.iter().all(|s| s.left() >= edge - 5));
        assert_eq!(Span::new(i32::MAX, 0, i32::MAX).to_rect().right, i32::MAX);
    }

    #[test]
    fn monotone_detection() {
        assert!(is_monotone_vertical(&pts(&[(0, 0), (5, 5), (0, 5)])));
        // open quadrilateral is not eligible
        assert!(!is_monotone_vertical(&pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])));
        assert!(is_monotone_vertical(&pts(&[(0, 0), (10, 0), (10, 10), (0, 10), (0, 0)])));
        // a zig-zag "W" reverses direction too often
        let w = pts(&[(0, 0), (2, 10), (4, 0), (6, 10), (8, 0), (8, 12), (0, 12), (0, 0)]);
        assert!(!is_monotone_vertical(&w));
    }

    #[test]
    fn monotone_triangle_rows() {
        let spans = polygon_spans(&pts(&[(0, 0), (10, 10), (0, 10)]));
        assert_eq!(spans.len(), 10);
        for (y, s) in spans.iter().enumerate() {
            assert_eq!(*s, Span::new(y as i32, 0, y as i32));
        }
    }

    #[test]
    fn general_square_includes_right_edge_column() {
        let spans = polygon_spans(&pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]));
        assert_eq!(spans.len(), 10);
        for (y, s) in spans.iter().enumerate() {
            assert_eq!(*s, Span::new(y as i32, 0, 10));
        }
    }

    #[test]
    fn general_polygon_with_notch_splits_rows() {
        // U shape: two prongs joined at the bottom.
        let u = pts(&[(0, 0), (4, 0), (4, 6), (8, 6), (8, 0), (12, 0), (12, 10), (0, 10)]);
        let spans = polygon_spans(&u);
        let top_rows: Vec<_> = spans.iter().filter(|s| s.y == 2).collect();
        assert_eq!(top_rows.len(), 2);
        let bottom_rows: Vec<_> = spans.iter().filter(|s| s.y == 8).collect();
        assert_eq!(bottom_rows.len(), 1);
    }

    #[test]
    fn degenerate_polygons_emit_nothing() {
        assert!(polygon_spans(&pts(&[(0, 0), (5, 5)])).is_empty());
        assert!(polygon_spans(&pts(&[(0, 3), (5, 3), (9, 3)])).is_empty());
    }

    #[test]
    fn span_rect_is_half_open() {
        assert_eq!(Span::new(5, 9, 2).to_rect(), Rect::new(2, 5, 10, 6));
    }
}

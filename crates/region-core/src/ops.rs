//! Band sweep over y-x-banded rectangle lists.
//!
//! Both operands are viewed as sets: the sweep divides the plane into
//! horizontal bands in which points belong to one operand only or to both.
//! Bands covered by a single operand are copied (clipped vertically) when the
//! operation keeps that operand; overlapping bands run the 1-D interval
//! operation for the current [`RegionOp`]. After each band is emitted it is
//! coalesced with the previous one when their x-extents match.

use crate::rect::Rect;

/// Boolean operation applied between two regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionOp {
    Union,
    Intersect,
    Subtract,
    Xor,
}

impl RegionOp {
    fn keeps_first_only(self) -> bool {
        matches!(self, RegionOp::Union | RegionOp::Subtract | RegionOp::Xor)
    }

    fn keeps_second_only(self) -> bool {
        matches!(self, RegionOp::Union | RegionOp::Xor)
    }
}

/// End index (exclusive) of the band starting at `start`.
fn band_end<R: AsRef<Rect>>(rects: &[R], start: usize) -> usize {
    let top = rects[start].as_ref().top;
    let mut end = start + 1;
    while end < rects.len() && rects[end].as_ref().top == top {
        end += 1;
    }
    end
}

/// Run `op` over two banded rect lists and return the banded result.
pub(crate) fn sweep<A, B>(a: &[A], b: &[B], op: RegionOp) -> Vec<Rect>
where
    A: AsRef<Rect>,
    B: AsRef<Rect>,
{
    let mut out: Vec<Rect> = Vec::with_capacity(a.len().max(b.len()) * 2);
    let (mut i1, mut i2) = (0usize, 0usize);

    // `ybot` is the bottom of the last processed band. In a non-overlapping
    // band it clips the top of the rectangles being copied.
    let mut ybot = match (a.first(), b.first()) {
        (Some(r1), Some(r2)) => r1.as_ref().top.min(r2.as_ref().top),
        _ => i32::MIN,
    };
    let mut prev_band = 0usize;

    while i1 < a.len() && i2 < b.len() {
        let r1 = *a[i1].as_ref();
        let r2 = *b[i2].as_ref();
        let e1 = band_end(a, i1);
        let e2 = band_end(b, i2);

        let ytop;
        if r1.top < r2.top {
            let top = r1.top.max(ybot);
            let bot = r1.bottom.min(r2.top);
            if top < bot && op.keeps_first_only() {
                let cur = out.len();
                copy_band(&mut out, &a[i1..e1], top, bot);
                prev_band = coalesce(&mut out, prev_band, cur);
            }
            ytop = r2.top;
        } else if r2.top < r1.top {
            let top = r2.top.max(ybot);
            let bot = r2.bottom.min(r1.top);
            if top < bot && op.keeps_second_only() {
                let cur = out.len();
                copy_band(&mut out, &b[i2..e2], top, bot);
                prev_band = coalesce(&mut out, prev_band, cur);
            }
            ytop = r1.top;
        } else {
            ytop = r1.top;
        }

        ybot = r1.bottom.min(r2.bottom);
        if ybot > ytop {
            let cur = out.len();
            let (s1, s2) = (&a[i1..e1], &b[i2..e2]);
            match op {
                RegionOp::Union => union_band(&mut out, s1, s2, ytop, ybot),
                RegionOp::Intersect => intersect_band(&mut out, s1, s2, ytop, ybot),
                RegionOp::Subtract => subtract_band(&mut out, s1, s2, ytop, ybot),
                RegionOp::Xor => xor_band(&mut out, s1, s2, ytop, ybot),
            }
            if out.len() != cur {
                prev_band = coalesce(&mut out, prev_band, cur);
            }
        }

        if r1.bottom == ybot {
            i1 = e1;
        }
        if r2.bottom == ybot {
            i2 = e2;
        }
    }

    // Whatever is left of one operand lies below the other entirely.
    let cur = out.len();
    if i1 < a.len() && op.keeps_first_only() {
        copy_rest(&mut out, &a[i1..], ybot);
    } else if i2 < b.len() && op.keeps_second_only() {
        copy_rest(&mut out, &b[i2..], ybot);
    }
    if out.len() != cur {
        coalesce(&mut out, prev_band, cur);
    }

    out
}

fn copy_band<R: AsRef<Rect>>(out: &mut Vec<Rect>, band: &[R], top: i32, bottom: i32) {
    out.extend(band.iter().map(|r| {
        let r = r.as_ref();
        Rect { left: r.left, top, right: r.right, bottom }
    }));
}

fn copy_rest<R: AsRef<Rect>>(out: &mut Vec<Rect>, rects: &[R], ybot: i32) {
    let mut start = 0;
    while start < rects.len() {
        let end = band_end(rects, start);
        let first = rects[start].as_ref();
        copy_band(out, &rects[start..end], first.top.max(ybot), first.bottom);
        start = end;
    }
}

/// Merge the band starting at `cur_start` into the band starting at
/// `prev_start` when they touch vertically and have identical x-extents.
///
/// Returns the start index of the last band in `out`, which becomes the
/// previous band for the next call.
pub(crate) fn coalesce(out: &mut Vec<Rect>, prev_start: usize, cur_start: usize) -> usize {
    let prev_len = cur_start - prev_start;
    let cur_top = out[cur_start].top;
    let mut cur_end = cur_start;
    while cur_end < out.len() && out[cur_end].top == cur_top {
        cur_end += 1;
    }
    let cur_len = cur_end - cur_start;

    // Several bands may have been appended at once; the next coalesce has to
    // start from the last of them.
    let mut new_start = cur_start;
    if cur_end < out.len() {
        new_start = out.len() - 1;
        while new_start > 0 && out[new_start - 1].top == out[out.len() - 1].top {
            new_start -= 1;
        }
    }

    if prev_len == 0 || prev_len != cur_len {
        return new_start;
    }
    if out[prev_start].bottom != cur_top {
        return new_start;
    }
    for k in 0..prev_len {
        let (p, c) = (out[prev_start + k], out[cur_start + k]);
        if p.left != c.left || p.right != c.right {
            return new_start;
        }
    }

    let new_bottom = out[cur_start].bottom;
    for r in &mut out[prev_start..cur_start] {
        r.bottom = new_bottom;
    }
    out.drain(cur_start..cur_end);

    if new_start == cur_start { prev_start } else { new_start - cur_len }
}

/// Append `[left, right)` to the current band, extending the last rect when
/// it touches or overlaps.
fn push_merged(out: &mut Vec<Rect>, left: i32, right: i32, top: i32, bottom: i32) {
    if let Some(last) = out.last_mut() {
        if last.top == top && last.bottom == bottom && last.right >= left {
            if last.right < right {
                last.right = right;
            }
            return;
        }
    }
    out.push(Rect { left, top, right, bottom });
}

fn union_band<A: AsRef<Rect>, B: AsRef<Rect>>(
    out: &mut Vec<Rect>,
    a: &[A],
    b: &[B],
    top: i32,
    bottom: i32,
) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (r1, r2) = (a[i].as_ref(), b[j].as_ref());
        if r1.left < r2.left {
            push_merged(out, r1.left, r1.right, top, bottom);
            i += 1;
        } else {
            push_merged(out, r2.left, r2.right, top, bottom);
            j += 1;
        }
    }
    for r in &a[i..] {
        let r = r.as_ref();
        push_merged(out, r.left, r.right, top, bottom);
    }
    for r in &b[j..] {
        let r = r.as_ref();
        push_merged(out, r.left, r.right, top, bottom);
    }
}

fn intersect_band<A: AsRef<Rect>, B: AsRef<Rect>>(
    out: &mut Vec<Rect>,
    a: &[A],
    b: &[B],
    top: i32,
    bottom: i32,
) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (r1, r2) = (a[i].as_ref(), b[j].as_ref());
        let left = r1.left.max(r2.left);
        let right = r1.right.min(r2.right);
        if left < right {
            out.push(Rect { left, top, right, bottom });
        }
        // Advance whichever ends first; the other may still overlap the next one.
        if r1.right < r2.right {
            i += 1;
        } else if r2.right < r1.right {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }
}

fn subtract_band<A: AsRef<Rect>, B: AsRef<Rect>>(
    out: &mut Vec<Rect>,
    minuend: &[A],
    subtrahend: &[B],
    top: i32,
    bottom: i32,
) {
    let (mut i, mut j) = (0, 0);
    let mut left = minuend[0].as_ref().left;

    while i < minuend.len() && j < subtrahend.len() {
        let m = minuend[i].as_ref();
        let s = subtrahend[j].as_ref();
        if s.right <= left {
            // Subtrahend lies entirely to the left.
            j += 1;
        } else if s.left <= left {
            // Subtrahend covers the left edge of the minuend.
            left = s.right;
            if left >= m.right {
                i += 1;
                if i < minuend.len() {
                    left = minuend[i].as_ref().left;
                }
            } else {
                j += 1;
            }
        } else if s.left < m.right {
            // Subtrahend splits the minuend; emit the uncovered left part.
            out.push(Rect { left, top, right: s.left, bottom });
            left = s.right;
            if left >= m.right {
                i += 1;
                if i < minuend.len() {
                    left = minuend[i].as_ref().left;
                }
            } else {
                j += 1;
            }
        } else {
            // Subtrahend lies to the right of this minuend.
            if m.right > left {
                out.push(Rect { left, top, right: m.right, bottom });
            }
            i += 1;
            if i < minuend.len() {
                left = minuend[i].as_ref().left;
            }
        }
    }

    while i < minuend.len() {
        let m = minuend[i].as_ref();
        out.push(Rect { left, top, right: m.right, bottom });
        i += 1;
        if i < minuend.len() {
            left = minuend[i].as_ref().left;
        }
    }
}

fn xor_band<A: AsRef<Rect>, B: AsRef<Rect>>(
    out: &mut Vec<Rect>,
    a: &[A],
    b: &[B],
    top: i32,
    bottom: i32,
) {
    // Coverage sweep over all edges; keep stretches covered exactly once.
    let mut edges: Vec<(i32, i32)> = Vec::with_capacity((a.len() + b.len()) * 2);
    for r in a.iter().map(AsRef::as_ref).chain(b.iter().map(AsRef::as_ref)) {
        edges.push((r.left, 1));
        edges.push((r.right, -1));
    }
    edges.sort_unstable();

    let mut depth = 0;
    let mut start = 0;
    let mut k = 0;
    while k < edges.len() {
        let x = edges[k].0;
        let before = depth;
        while k < edges.len() && edges[k].0 == x {
            depth += edges[k].1;
            k += 1;
        }
        match (before == 1, depth == 1) {
            (false, true) => start = x,
            (true, false) => push_merged(out, start, x, top, bottom),
            _ => {}
        }
    }
}

/// Accumulates scanline rows into a banded rect list.
///
/// Rows may arrive in any order; `finish` sorts them, merges touching runs
/// within each row and coalesces identical neighbouring rows into bands.
#[derive(Debug, Default)]
pub(crate) struct RowBuilder {
    rows: Vec<Rect>,
}

impl RowBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add the inclusive run `[x1, x2]` (in either order) on row `y`.
    pub(crate) fn push_span(&mut self, y: i32, x1: i32, x2: i32) {
        let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let row = Rect {
            left,
            top: y,
            right: right.saturating_add(1),
            bottom: y.saturating_add(1),
        };
        // row i32::MAX has no half-open extent
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Rect> {
        self.rows.sort_unstable_by_key(|r| (r.top, r.left));
        let mut out: Vec<Rect> = Vec::with_capacity(self.rows.len());
        let mut prev_band = 0usize;
        let mut i = 0;
        while i < self.rows.len() {
            let top = self.rows[i].top;
            let cur = out.len();
            while i < self.rows.len() && self.rows[i].top == top {
                let r = self.rows[i];
                push_merged(&mut out, r.left, r.right, r.top, r.bottom);
                i += 1;
            }
            prev_band = coalesce(&mut out, prev_band, cur);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(l: i32, t: i32, rt: i32, b: i32) -> Rect {
        Rect::new(l, t, rt, b)
    }

    #[test]
    fn union_of_overlapping_squares() {
        let out = sweep(&[r(0, 0, 10, 10)], &[r(5, 5, 15, 15)], RegionOp::Union);
        assert_eq!(out, vec![r(0, 0, 10, 5), r(0, 5, 15, 10), r(5, 10, 15, 15)]);
    }

    #[test]
    fn union_merges_touching_rects_in_band() {
        let out = sweep(&[r(0, 0, 5, 5)], &[r(5, 0, 10, 5)], RegionOp::Union);
        assert_eq!(out, vec![r(0, 0, 10, 5)]);
    }

    #[test]
    fn union_coalesces_stacked_bands() {
        let out = sweep(&[r(0, 0, 10, 5)], &[r(0, 5, 10, 12)], RegionOp::Union);
        assert_eq!(out, vec![r(0, 0, 10, 12)]);
    }

    #[test]
    fn intersect_of_overlapping_squares() {
        let out = sweep(&[r(0, 0, 10, 10)], &[r(5, 5, 15, 15)], RegionOp::Intersect);
        assert_eq!(out, vec![r(5, 5, 10, 10)]);
    }

    #[test]
    fn subtract_leaves_l_shape() {
        let out = sweep(&[r(0, 0, 10, 10)], &[r(5, 5, 15, 15)], RegionOp::Subtract);
        assert_eq!(out, vec![r(0, 0, 10, 5), r(0, 5, 5, 10)]);
    }

    #[test]
    fn subtract_hole_splits_band() {
        let out = sweep(&[r(0, 0, 10, 10)], &[r(3, 3, 6, 6)], RegionOp::Subtract);
        assert_eq!(
            out,
            vec![r(0, 0, 10, 3), r(0, 3, 3, 6), r(6, 3, 10, 6), r(0, 6, 10, 10)]
        );
    }

    #[test]
    fn xor_of_overlapping_squares() {
        let out = sweep(&[r(0, 0, 10, 10)], &[r(5, 5, 15, 15)], RegionOp::Xor);
        assert_eq!(
            out,
            vec![r(0, 0, 10, 5), r(0, 5, 5, 10), r(10, 5, 15, 10), r(5, 10, 15, 15)]
        );
    }

    #[test]
    fn xor_joins_touching_pieces() {
        let out = sweep(&[r(0, 0, 5, 5)], &[r(5, 0, 10, 5)], RegionOp::Xor);
        assert_eq!(out, vec![r(0, 0, 10, 5)]);
    }

    #[test]
    fn long_band_split_by_multiple_bands() {
        let a = [r(0, 0, 10, 10)];
        let b = [r(2, 2, 4, 4), r(6, 6, 8, 8)];
        let out = sweep(&a, &b, RegionOp::Subtract);
        let area: i64 = out.iter().map(Rect::area).sum();
        assert_eq!(area, 100 - 8);
        assert_eq!(out.first(), Some(&r(0, 0, 10, 2)));
        assert_eq!(out.last(), Some(&r(0, 8, 10, 10)));
    }

    #[test]
    fn remainder_bands_after_exhausted_operand() {
        let a = [r(0, 0, 4, 2), r(0, 10, 4, 12), r(0, 20, 4, 22)];
        let b = [r(0, 0, 4, 2)];
        let out = sweep(&a, &b, RegionOp::Union);
        assert_eq!(out, a.to_vec());
    }

    #[test]
    fn row_builder_merges_rows_into_bands() {
        let mut rows = RowBuilder::new();
        rows.push_span(2, 0, 9);
        rows.push_span(0, 9, 0);
        rows.push_span(1, 0, 4);
        rows.push_span(1, 5, 9);
        rows.push_span(3, 2, 3);
        let out = rows.finish();
        assert_eq!(out, vec![r(0, 0, 10, 3), r(2, 3, 4, 4)]);
    }
}

//! Banded clip regions.
//!
//! A [`ClipRegion`] is a set of pixels stored as y-x-banded rectangles: the
//! list is sorted by band (top, then bottom) and by `left` within a band,
//! rectangles in a band never touch or overlap, and vertically adjacent bands
//! with identical x-extents are merged. Every node lives in a block taken
//! from the region's [`BlockHeap`].
//!
//! Mutating operations compute their result into a scratch buffer and only
//! commit once every node has been allocated, so a failed operation leaves
//! the destination as it was.

use std::fmt;

use log::trace;

use crate::block_heap::{Block, BlockHeap};
use crate::error::Result;
use crate::ops::{self, RegionOp, RowBuilder};
use crate::rect::{Point, Rect};
use crate::scanline;

/// Heap type used for clip-rect nodes.
pub type ClipRectHeap = BlockHeap<Rect>;

/// Shape classification, derived from the node count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// No rectangles.
    Null,
    /// Exactly one rectangle.
    Simple,
    /// Two or more rectangles.
    Complex,
}

pub struct ClipRegion {
    bound: Rect,
    rects: Vec<Block<Rect>>,
    heap: ClipRectHeap,
}

/// What a two-operand operation resolves to before any allocation.
enum Outcome {
    First,
    Second,
    Empty,
    Rects(Vec<Rect>),
}

fn plan<A, B>(a: &[A], a_bound: Rect, b: &[B], b_bound: Rect, op: RegionOp) -> Outcome
where
    A: AsRef<Rect>,
    B: AsRef<Rect>,
{
    match op {
        RegionOp::Union => {
            if a.is_empty() {
                return Outcome::Second;
            }
            if b.is_empty() {
                return Outcome::First;
            }
            if a.len() == 1 && b_bound.is_covered_by(&a_bound) {
                return Outcome::First;
            }
            if b.len() == 1 && a_bound.is_covered_by(&b_bound) {
                return Outcome::Second;
            }
        }
        RegionOp::Intersect => {
            if a.is_empty() || b.is_empty() || !a_bound.intersects(&b_bound) {
                return Outcome::Empty;
            }
        }
        RegionOp::Subtract => {
            if a.is_empty() {
                return Outcome::Empty;
            }
            if b.is_empty() || !a_bound.intersects(&b_bound) {
                return Outcome::First;
            }
        }
        RegionOp::Xor => {
            if a.is_empty() {
                return Outcome::Second;
            }
            if b.is_empty() {
                return Outcome::First;
            }
        }
    }
    Outcome::Rects(ops::sweep(a, b, op))
}

fn bound_of<R: AsRef<Rect>>(rects: &[R]) -> Rect {
    let (Some(first), Some(last)) = (rects.first(), rects.last()) else {
        return Rect::EMPTY;
    };
    let mut bound = Rect {
        left: i32::MAX,
        top: first.as_ref().top,
        right: i32::MIN,
        bottom: last.as_ref().bottom,
    };
    for r in rects {
        let r = r.as_ref();
        bound.left = bound.left.min(r.left);
        bound.right = bound.right.max(r.right);
    }
    bound
}

impl ClipRegion {
    /// Empty region drawing its nodes from `heap`.
    pub fn new(heap: &ClipRectHeap) -> Self {
        Self { bound: Rect::EMPTY, rects: Vec::new(), heap: heap.clone() }
    }

    /// Empty region with a private heap of `block_count` blocks.
    pub fn create(block_count: usize) -> Result<Self> {
        let heap = ClipRectHeap::new(block_count)?;
        Ok(Self::new(&heap))
    }

    /// Deep copy backed by the same heap.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::new(&self.heap);
        copy.replace_rects(&self.rects)?;
        Ok(copy)
    }

    pub fn heap(&self) -> &ClipRectHeap {
        &self.heap
    }

    pub fn kind(&self) -> RegionKind {
        match self.rects.len() {
            0 => RegionKind::Null,
            1 => RegionKind::Simple,
            _ => RegionKind::Complex,
        }
    }

    /// Minimal rectangle enclosing the region, `Rect::EMPTY` when empty.
    pub fn bound(&self) -> Rect {
        self.bound
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Rectangles in band order.
    pub fn rects(&self) -> impl ExactSizeIterator<Item = &Rect> + '_ {
        self.rects.iter().map(|b| &**b)
    }

    /// Number of pixels in the region.
    pub fn area(&self) -> i64 {
        self.rects().map(Rect::area).sum()
    }

    /// Return every node to the heap.
    pub fn empty(&mut self) {
        self.rects.clear();
        self.bound = Rect::EMPTY;
    }

    /// Replace the contents with a copy of `src`, using this region's heap.
    pub fn copy_from(&mut self, src: &ClipRegion) -> Result<()> {
        self.replace_rects(&src.rects)
    }

    /// Make the region exactly `rect`; an empty rect empties the region.
    pub fn set_rect(&mut self, rect: Rect) -> Result<()> {
        if rect.is_empty() {
            self.empty();
            return Ok(());
        }
        self.replace_rects(&[rect])
    }

    /// Allocate nodes for `rects` and swap them in. Nothing changes on failure.
    fn replace_rects<R: AsRef<Rect>>(&mut self, rects: &[R]) -> Result<()> {
        let mut nodes: Vec<Block<Rect>> = Vec::new();
        nodes.try_reserve_exact(rects.len())?;
        for r in rects {
            nodes.push(self.heap.alloc(*r.as_ref())?);
        }
        self.bound = bound_of(&nodes);
        self.rects = nodes;
        Ok(())
    }

    fn apply_in_place<B: AsRef<Rect>>(
        &mut self,
        b: &[B],
        b_bound: Rect,
        op: RegionOp,
    ) -> Result<()> {
        match plan(&self.rects, self.bound, b, b_bound, op) {
            Outcome::First => {}
            Outcome::Second => self.replace_rects(b)?,
            Outcome::Empty => self.empty(),
            Outcome::Rects(rects) => self.replace_rects(&rects)?,
        }
        trace!("{:?} -> {:?}", op, self);
        Ok(())
    }

    /// Union with a single rectangle. Empty rectangles are ignored.
    pub fn add_rect(&mut self, rect: Rect) -> Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        self.apply_in_place(&[rect], rect, RegionOp::Union)
    }

    /// Intersect with a single rectangle. An empty rectangle empties the region.
    pub fn intersect_rect(&mut self, rect: Rect) -> Result<()> {
        if rect.is_empty() {
            self.empty();
            return Ok(());
        }
        self.apply_in_place(&[rect], rect, RegionOp::Intersect)
    }

    /// Remove a single rectangle. Empty or disjoint rectangles are ignored.
    pub fn subtract_rect(&mut self, rect: Rect) -> Result<()> {
        if rect.is_empty() || !rect.intersects(&self.bound) {
            return Ok(());
        }
        self.apply_in_place(&[rect], rect, RegionOp::Subtract)
    }

    pub fn union_with(&mut self, other: &ClipRegion) -> Result<()> {
        self.apply_in_place(&other.rects, other.bound, RegionOp::Union)
    }

    pub fn intersect_with(&mut self, other: &ClipRegion) -> Result<()> {
        self.apply_in_place(&other.rects, other.bound, RegionOp::Intersect)
    }

    pub fn subtract_with(&mut self, other: &ClipRegion) -> Result<()> {
        self.apply_in_place(&other.rects, other.bound, RegionOp::Subtract)
    }

    pub fn xor_with(&mut self, other: &ClipRegion) -> Result<()> {
        self.apply_in_place(&other.rects, other.bound, RegionOp::Xor)
    }

    /// Translate the region.
    pub fn offset(&mut self, dx: i32, dy: i32) {
        if self.rects.is_empty() {
            return;
        }
        for node in &mut self.rects {
            **node = node.offset(dx, dy);
        }
        self.bound = self.bound.offset(dx, dy);
    }

    /// Scroll the part of the region inside `client ∩ scroll` by (`dx`, `dy`),
    /// clipping the moved pixels to that rectangle. Pixels outside it stay
    /// where they are. Nothing happens when the two rectangles are disjoint.
    pub fn scroll_within(&mut self, client: Rect, scroll: Rect, dx: i32, dy: i32) -> Result<()> {
        let Some(area) = client.normalized().intersection(&scroll.normalized()) else {
            return Ok(());
        };
        if self.rects.is_empty() || !area.intersects(&self.bound) {
            return Ok(());
        }

        let outside = ops::sweep(&self.rects, &[area], RegionOp::Subtract);
        let moved: Vec<Rect> = ops::sweep(&self.rects, &[area], RegionOp::Intersect)
            .into_iter()
            .map(|r| r.offset(dx, dy))
            .collect();
        let inside = ops::sweep(&moved, &[area], RegionOp::Intersect);
        let result = ops::sweep(&outside, &inside, RegionOp::Union);

        self.replace_rects(&result)?;
        trace!("scroll_within {:?} by ({}, {}) -> {:?}", area, dx, dy, self);
        Ok(())
    }

    /// True when the pixel at (`x`, `y`) belongs to the region.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        if !self.bound.contains(x, y) {
            return false;
        }
        for r in self.rects() {
            if r.top > y {
                break;
            }
            if y < r.bottom && x >= r.left && x < r.right {
                return true;
            }
        }
        false
    }

    /// True when `rect` shares at least one pixel with the region.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if rect.is_empty() || !self.bound.intersects(rect) {
            return false;
        }
        for r in self.rects() {
            if r.top >= rect.bottom {
                break;
            }
            if r.intersects(rect) {
                return true;
            }
        }
        false
    }

    /// True when the two regions share at least one pixel.
    pub fn intersects_region(&self, other: &ClipRegion) -> bool {
        other.rects().any(|r| self.intersects_rect(r))
    }

    fn set_from_rows(&mut self, rows: RowBuilder) -> Result<()> {
        let rects = rows.finish();
        self.replace_rects(&rects)?;
        trace!("shape -> {:?}", self);
        Ok(())
    }

    /// Fill the region with a circle of radius `r` centred at (`x`, `y`).
    /// A radius below 1 yields the single centre pixel.
    pub fn set_circle(&mut self, x: i32, y: i32, r: i32) -> Result<()> {
        if r < 1 {
            return self.set_rect(Rect::new(x, y, x + 1, y + 1));
        }
        let mut rows = RowBuilder::new();
        scanline::circle(x, y, r, |s| rows.push_span(s.y, s.x1, s.x2));
        self.set_from_rows(rows)
    }

    /// Fill the region with an ellipse of radii `rx`, `ry` centred at (`x`, `y`).
    /// Either radius below 1 yields the single centre pixel.
    pub fn set_ellipse(&mut self, x: i32, y: i32, rx: i32, ry: i32) -> Result<()> {
        if rx < 1 || ry < 1 {
            return self.set_rect(Rect::new(x, y, x + 1, y + 1));
        }
        let mut rows = RowBuilder::new();
        scanline::ellipse(x, y, rx, ry, |s| rows.push_span(s.y, s.x1, s.x2));
        self.set_from_rows(rows)
    }

    /// Fill the region with a polygon. Fewer than three vertices yields an
    /// empty region.
    pub fn set_polygon(&mut self, pts: &[Point]) -> Result<()> {
        if pts.len() < 3 {
            self.empty();
            return Ok(());
        }
        let mut rows = RowBuilder::new();
        scanline::polygon(pts, |s| rows.push_span(s.y, s.x1, s.x2));
        self.set_from_rows(rows)
    }
}

fn combine_into(dst: &mut ClipRegion, a: &ClipRegion, b: &ClipRegion, op: RegionOp) -> Result<()> {
    match plan(&a.rects, a.bound, &b.rects, b.bound, op) {
        Outcome::First => dst.replace_rects(&a.rects)?,
        Outcome::Second => dst.replace_rects(&b.rects)?,
        Outcome::Empty => dst.empty(),
        Outcome::Rects(rects) => dst.replace_rects(&rects)?,
    }
    trace!("{:?} -> {:?}", op, dst);
    Ok(())
}

/// `dst = a op b`.
pub fn combine(dst: &mut ClipRegion, a: &ClipRegion, b: &ClipRegion, op: RegionOp) -> Result<()> {
    combine_into(dst, a, b, op)
}

/// `dst = a ∪ b`.
pub fn union(dst: &mut ClipRegion, a: &ClipRegion, b: &ClipRegion) -> Result<()> {
    combine_into(dst, a, b, RegionOp::Union)
}

/// `dst = a ∩ b`.
pub fn intersect(dst: &mut ClipRegion, a: &ClipRegion, b: &ClipRegion) -> Result<()> {
    combine_into(dst, a, b, RegionOp::Intersect)
}

/// `dst = a − b`.
pub fn subtract(dst: &mut ClipRegion, a: &ClipRegion, b: &ClipRegion) -> Result<()> {
    combine_into(dst, a, b, RegionOp::Subtract)
}

/// `dst = (a − b) ∪ (b − a)`.
pub fn xor(dst: &mut ClipRegion, a: &ClipRegion, b: &ClipRegion) -> Result<()> {
    combine_into(dst, a, b, RegionOp::Xor)
}

impl PartialEq for ClipRegion {
    fn eq(&self, other: &Self) -> bool {
        self.rects().eq(other.rects())
    }
}

impl Eq for ClipRegion {}

impl fmt::Debug for ClipRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipRegion")
            .field("kind", &self.kind())
            .field("bound", &self.bound)
            .field("rects", &self.rects().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(heap: &ClipRectHeap, rects: &[Rect]) -> ClipRegion {
        let mut rgn = ClipRegion::new(heap);
        for r in rects {
            rgn.add_rect(*r).unwrap();
        }
        rgn
    }

    fn list(rgn: &ClipRegion) -> Vec<Rect> {
        rgn.rects().copied().collect()
    }

    #[test]
    fn set_rect_classifies_kind() {
        let heap = ClipRectHeap::new(8).unwrap();
        let mut rgn = ClipRegion::new(&heap);
        assert_eq!(rgn.kind(), RegionKind::Null);
        assert_eq!(rgn.bound(), Rect::EMPTY);

        rgn.set_rect(Rect::new(1, 2, 5, 6)).unwrap();
        assert_eq!(rgn.kind(), RegionKind::Simple);
        assert_eq!(rgn.bound(), Rect::new(1, 2, 5, 6));
        assert_eq!(heap.used_blocks(), 1);

        rgn.set_rect(Rect::new(3, 3, 3, 9)).unwrap();
        assert_eq!(rgn.kind(), RegionKind::Null);
        assert_eq!(heap.used_blocks(), 0);
    }

    #[test]
    fn add_rect_builds_bands() {
        let heap = ClipRectHeap::new(16).unwrap();
        let rgn = region(&heap, &[Rect::new(0, 0, 10, 10), Rect::new(5, 5, 15, 15)]);
        assert_eq!(
            list(&rgn),
            vec![Rect::new(0, 0, 10, 5), Rect::new(0, 5, 15, 10), Rect::new(5, 10, 15, 15)]
        );
        assert_eq!(rgn.kind(), RegionKind::Complex);
        assert_eq!(rgn.bound(), Rect::new(0, 0, 15, 15));
        assert_eq!(rgn.area(), 175);
    }

    #[test]
    fn empty_rect_rules() {
        let heap = ClipRectHeap::new(8).unwrap();
        let mut rgn = region(&heap, &[Rect::new(0, 0, 4, 4)]);

        rgn.add_rect(Rect::new(9, 9, 9, 12)).unwrap();
        assert_eq!(list(&rgn), vec![Rect::new(0, 0, 4, 4)]);

        rgn.subtract_rect(Rect::new(2, 2, 1, 1)).unwrap();
        rgn.subtract_rect(Rect::new(10, 10, 20, 20)).unwrap();
        assert_eq!(list(&rgn), vec![Rect::new(0, 0, 4, 4)]);

        rgn.intersect_rect(Rect::EMPTY).unwrap();
        assert!(rgn.is_empty());
    }

    #[test]
    fn covered_union_keeps_covering_rect() {
        let heap = ClipRectHeap::new(8).unwrap();
        let mut rgn = region(&heap, &[Rect::new(2, 2, 4, 4), Rect::new(6, 6, 8, 8)]);
        rgn.add_rect(Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(list(&rgn), vec![Rect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn contains_point_respects_half_open_edges() {
        let heap = ClipRectHeap::new(8).unwrap();
        let rgn = region(&heap, &[Rect::new(0, 0, 10, 10), Rect::new(20, 0, 30, 10)]);
        assert!(rgn.contains_point(0, 0));
        assert!(rgn.contains_point(25, 9));
        assert!(!rgn.contains_point(10, 5));
        assert!(!rgn.contains_point(15, 5));
        assert!(!rgn.contains_point(5, 10));
    }

    #[test]
    fn intersects_rect_and_region() {
        let heap = ClipRectHeap::new(16).unwrap();
        let a = region(&heap, &[Rect::new(0, 0, 10, 10), Rect::new(20, 20, 30, 30)]);
        assert!(a.intersects_rect(&Rect::new(9, 9, 12, 12)));
        assert!(!a.intersects_rect(&Rect::new(10, 10, 20, 20)));
        assert!(!a.intersects_rect(&Rect::EMPTY));

        let b = region(&heap, &[Rect::new(12, 0, 18, 40)]);
        assert!(!a.intersects_region(&b));
        let c = region(&heap, &[Rect::new(25, 0, 26, 21)]);
        assert!(a.intersects_region(&c));
    }

    #[test]
    fn offset_moves_bound_and_nodes() {
        let heap = ClipRectHeap::new(8).unwrap();
        let mut rgn = region(&heap, &[Rect::new(0, 0, 2, 2), Rect::new(4, 4, 6, 6)]);
        rgn.offset(10, -1);
        assert_eq!(list(&rgn), vec![Rect::new(10, -1, 12, 1), Rect::new(14, 3, 16, 5)]);
        assert_eq!(rgn.bound(), Rect::new(10, -1, 16, 5));
    }

    #[test]
    fn scroll_within_clips_moved_part() {
        let heap = ClipRectHeap::new(16).unwrap();
        let mut rgn = region(&heap, &[Rect::new(0, 0, 20, 10)]);
        // scroll the left half up by 4
        rgn.scroll_within(Rect::new(0, 0, 100, 100), Rect::new(0, 0, 10, 10), 0, -4)
            .unwrap();
        assert_eq!(list(&rgn), vec![Rect::new(0, 0, 20, 6), Rect::new(10, 6, 20, 10)]);

        let before = list(&rgn);
        rgn.scroll_within(Rect::new(0, 0, 5, 5), Rect::new(50, 50, 60, 60), 3, 3)
            .unwrap();
        assert_eq!(list(&rgn), before);
    }

    #[test]
    fn binary_ops_leave_sources_alone() {
        let heap = ClipRectHeap::new(32).unwrap();
        let a = region(&heap, &[Rect::new(0, 0, 10, 10)]);
        let b = region(&heap, &[Rect::new(5, 0, 15, 10)]);
        let mut dst = ClipRegion::new(&heap);

        xor(&mut dst, &a, &b).unwrap();
        assert_eq!(list(&dst), vec![Rect::new(0, 0, 5, 10), Rect::new(10, 0, 15, 10)]);
        intersect(&mut dst, &a, &b).unwrap();
        assert_eq!(list(&dst), vec![Rect::new(5, 0, 10, 10)]);
        subtract(&mut dst, &b, &a).unwrap();
        assert_eq!(list(&dst), vec![Rect::new(10, 0, 15, 10)]);
        union(&mut dst, &a, &b).unwrap();
        assert_eq!(list(&dst), vec![Rect::new(0, 0, 15, 10)]);

        assert_eq!(list(&a), vec![Rect::new(0, 0, 10, 10)]);
        assert_eq!(list(&b), vec![Rect::new(5, 0, 15, 10)]);
    }

    #[test]
    fn shapes_have_expected_extent() {
        let heap = ClipRectHeap::new(64).unwrap();
        let mut rgn = ClipRegion::new(&heap);

        rgn.set_circle(50, 50, 10).unwrap();
        assert_eq!(rgn.bound(), Rect::new(40, 40, 61, 61));
        assert!(rgn.contains_point(50, 50));
        assert!(!rgn.contains_point(41, 41));

        rgn.set_circle(7, 8, 0).unwrap();
        assert_eq!(list(&rgn), vec![Rect::new(7, 8, 8, 9)]);

        rgn.set_ellipse(0, 0, 20, 5).unwrap();
        assert_eq!(rgn.bound(), Rect::new(-20, -5, 21, 6));

        rgn.set_polygon(&[Point::new(0, 0), Point::new(10, 10)]).unwrap();
        assert!(rgn.is_empty());
    }

    #[test]
    fn large_shapes_build_without_overflow() {
        let mut rgn = ClipRegion::create(64).unwrap();
        rgn.set_ellipse(0, 0, 60_000, 50_000).unwrap();
        assert_eq!(rgn.bound(), Rect::new(-60_000, -50_000, 60_001, 50_001));
        assert!(rgn.contains_point(59_999, 0));
        assert!(!rgn.contains_point(59_999, 49_000));

        let edge = i32::MAX - 2;
        rgn.set_circle(edge, 0, 5).unwrap();
        assert_eq!(rgn.bound(), Rect::new(edge - 5, -5, i32::MAX, 6));
    }
}

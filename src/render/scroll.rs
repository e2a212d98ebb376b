//! A single-child viewport that can be scrolled.

use super::{hit_test_children, ChildMode, RenderId, RenderObject, RenderTree};
use crate::measure::{MeasureLength, MeasureRequirement, MeasureSize};
use crate::rect::{Point, Rect, Size, Thickness};
use cgmath::{EuclideanSpace, Zero};
use core::any::Any;

/// Default distance of one wheel notch or one line.
pub const DEFAULT_LINE_LENGTH: f64 = 16.;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Horizontal,
    Vertical,
}

/// How [`ScrollView::apply_scroll`] interprets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    /// Scroll to the value.
    Absolute,
    /// Scroll by the value.
    Relative,
    /// Scroll by the value in lines.
    Line,
    /// Scroll by the value in viewport lengths.
    Page,
}

/// Shows a window into a child that may be larger than itself.
///
/// Along scrollable axes, the child is measured without bound and the view takes the available
/// length. The stored offset is clamped to `[0, extent - viewport]` whenever it is read, so it
/// stays valid when the child or the view changes size.
#[derive(Debug)]
pub struct ScrollView {
    horizontal: bool,
    vertical: bool,
    offset: Point,
    viewport: Size,
    extent: Size,
    line_length: f64,
}

impl Default for ScrollView {
    fn default() -> Self {
        ScrollView {
            horizontal: false,
            vertical: true,
            offset: Point::origin(),
            viewport: Size::zero(),
            extent: Size::zero(),
            line_length: DEFAULT_LINE_LENGTH,
        }
    }
}

fn clamp_scroll(offset: f64, viewport: f64, extent: f64) -> f64 {
    offset.min(extent - viewport).max(0.)
}

impl ScrollView {
    /// A vertically scrolling view.
    pub fn new() -> ScrollView {
        ScrollView::default()
    }

    pub fn set_scroll_enabled(&mut self, horizontal: bool, vertical: bool) {
        self.horizontal = horizontal;
        self.vertical = vertical;
    }

    pub fn set_line_length(&mut self, length: f64) {
        self.line_length = length;
    }

    /// The current (clamped) scroll offset.
    pub fn scroll_offset(&self) -> Point {
        Point::new(
            clamp_scroll(self.offset.x, self.viewport.x, self.extent.x),
            clamp_scroll(self.offset.y, self.viewport.y, self.extent.y),
        )
    }

    /// The visible part of the child, in the child’s coordinates.
    pub fn view_rect(&self) -> Rect {
        Rect::new(self.scroll_offset(), self.viewport)
    }

    /// The size of the child as of the last layout.
    pub fn extent(&self) -> Size {
        self.extent
    }

    /// Sets either or both components of the offset.
    pub fn scroll_to(&mut self, x: Option<f64>, y: Option<f64>) {
        if let Some(x) = x {
            self.offset.x = x;
        }
        if let Some(y) = y {
            self.offset.y = y;
        }
    }

    /// Moves the offset by a delta, starting from the clamped offset.
    pub fn scroll_by(&mut self, delta: Size) {
        let offset = self.scroll_offset();
        self.offset = offset + delta;
    }

    pub fn scroll_offset_in(&self, direction: ScrollDirection) -> f64 {
        let offset = self.scroll_offset();
        match direction {
            ScrollDirection::Horizontal => offset.x,
            ScrollDirection::Vertical => offset.y,
        }
    }

    pub fn apply_scroll(&mut self, direction: ScrollDirection, kind: ScrollKind, value: f64) {
        let current = self.scroll_offset_in(direction);
        let page = match direction {
            ScrollDirection::Horizontal => self.viewport.x,
            ScrollDirection::Vertical => self.viewport.y,
        };
        let target = match kind {
            ScrollKind::Absolute => value,
            ScrollKind::Relative => current + value,
            ScrollKind::Line => current + value * self.line_length,
            ScrollKind::Page => current + value * page,
        };
        match direction {
            ScrollDirection::Horizontal => self.scroll_to(Some(target), None),
            ScrollDirection::Vertical => self.scroll_to(None, Some(target)),
        }
    }

    /// Scrolls the least amount needed to bring `rect` (plus `margin`) into view.
    pub fn scroll_to_contain(&mut self, rect: Rect, margin: Thickness) {
        let rect = rect.expand(margin);
        let view = self.view_rect();

        let x = if rect.left() < view.left() {
            Some(rect.left())
        } else if rect.right() > view.right() {
            Some(rect.right() - view.size.x)
        } else {
            None
        };
        let y = if rect.top() < view.top() {
            Some(rect.top())
        } else if rect.bottom() > view.bottom() {
            Some(rect.bottom() - view.size.y)
        } else {
            None
        };
        self.scroll_to(x, y);
    }

    /// Whether the view can scroll towards the end (`delta > 0`) or start along a direction.
    pub fn can_scroll(&self, direction: ScrollDirection, delta: f64) -> bool {
        let offset = self.scroll_offset();
        let (enabled, offset, viewport, extent) = match direction {
            ScrollDirection::Horizontal => (self.horizontal, offset.x, self.viewport.x, self.extent.x),
            ScrollDirection::Vertical => (self.vertical, offset.y, self.viewport.y, self.extent.y),
        };
        if !enabled {
            false
        } else if delta > 0. {
            offset < extent - viewport
        } else if delta < 0. {
            offset > 0.
        } else {
            false
        }
    }

    /// Handles a wheel delta given in lines; returns true if anything scrolled.
    ///
    /// Prefers the vertical axis and falls back to the horizontal one.
    pub fn scroll_wheel(&mut self, delta: f64) -> bool {
        for direction in [ScrollDirection::Vertical, ScrollDirection::Horizontal] {
            if self.can_scroll(direction, delta) {
                self.apply_scroll(direction, ScrollKind::Line, delta);
                return true;
            }
        }
        false
    }
}

impl RenderObject for ScrollView {
    fn name(&self) -> &'static str {
        "ScrollView"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Single
    }

    fn measure_content(
        &mut self,
        tree: &mut RenderTree,
        id: RenderId,
        requirement: &MeasureRequirement,
        preferred: MeasureSize,
    ) -> Size {
        let child = match tree.children(id).first() {
            Some(child) => *child,
            None => {
                return Size::new(
                    preferred.width.length_or(requirement.min.width.length_or_zero()),
                    preferred.height.length_or(requirement.min.height.length_or_zero()),
                )
            }
        };

        let unbounded_if = |enabled: bool, length: MeasureLength| {
            if enabled {
                MeasureLength::Unspecified
            } else {
                length
            }
        };
        let child_requirement = MeasureRequirement::at_most(MeasureSize::new(
            unbounded_if(self.horizontal, requirement.max.width),
            unbounded_if(self.vertical, requirement.max.height),
        ));
        let child_size = tree.measure(child, &child_requirement, MeasureSize::unspecified());
        let coerced = requirement.coerce(child_size);

        let along = |enabled: bool, preferred: MeasureLength, max: MeasureLength, coerced: f64| {
            if enabled {
                preferred.or(max).length_or(coerced)
            } else {
                preferred.length_or(coerced)
            }
        };
        Size::new(
            along(self.horizontal, preferred.width, requirement.max.width, coerced.x),
            along(self.vertical, preferred.height, requirement.max.height, coerced.y),
        )
    }

    fn layout_content(&mut self, tree: &mut RenderTree, id: RenderId, content_rect: Rect) {
        self.viewport = content_rect.size;
        match tree.children(id).first().copied() {
            Some(child) => {
                self.extent = tree.size(child);
                let offset = self.scroll_offset();
                tree.layout(child, content_rect.origin - offset.to_vec());
            }
            None => self.extent = Size::zero(),
        }
    }

    fn clips_children(&self) -> bool {
        true
    }

    fn hit_test(&self, tree: &RenderTree, id: RenderId, point: Point) -> Option<RenderId> {
        // clipped content is not hit
        if tree.content_rect(id).contains(point) {
            if let Some(hit) = hit_test_children(tree, id, point) {
                return Some(hit);
            }
        }
        if tree.padding_rect(id).contains(point) {
            Some(id)
        } else {
            None
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

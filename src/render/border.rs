//! A box with optional border, background and foreground around at most one child.

use super::{ChildMode, RenderId, RenderObject, RenderTree};
use crate::backend::Painter;
use crate::color::Color;
use crate::measure::{MeasureRequirement, MeasureSize};
use crate::rect::{CornerRadius, Rect, Size, Thickness};
use core::any::Any;

/// A partial border style; `None` fields are left unchanged when applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderStyle {
    pub border_brush: Option<Color>,
    pub border_thickness: Option<Thickness>,
    pub border_radius: Option<CornerRadius>,
    pub background_brush: Option<Color>,
    pub foreground_brush: Option<Color>,
}

impl BorderStyle {
    /// Combines two styles; fields set in `other` win.
    pub fn merge(&self, other: &BorderStyle) -> BorderStyle {
        BorderStyle {
            border_brush: other.border_brush.or(self.border_brush),
            border_thickness: other.border_thickness.or(self.border_thickness),
            border_radius: other.border_radius.or(self.border_radius),
            background_brush: other.background_brush.or(self.background_brush),
            foreground_brush: other.foreground_brush.or(self.foreground_brush),
        }
    }
}

/// The border thickness counts as inner space: it is subtracted from the content like padding.
#[derive(Debug, Default)]
pub struct BorderObject {
    border_enabled: bool,
    border_brush: Option<Color>,
    border_thickness: Thickness,
    border_radius: CornerRadius,
    background_brush: Option<Color>,
    foreground_brush: Option<Color>,
}

impl BorderObject {
    pub fn new() -> BorderObject {
        BorderObject::default()
    }

    pub fn is_border_enabled(&self) -> bool {
        self.border_enabled
    }

    pub fn set_border_enabled(&mut self, enabled: bool) {
        self.border_enabled = enabled;
    }

    pub fn border_thickness(&self) -> Thickness {
        self.border_thickness
    }

    pub fn set_border_thickness(&mut self, thickness: Thickness) {
        self.border_thickness = thickness;
    }

    pub fn set_border_radius(&mut self, radius: CornerRadius) {
        self.border_radius = radius;
    }

    pub fn set_border_brush(&mut self, brush: Option<Color>) {
        self.border_brush = brush;
    }

    pub fn background_brush(&self) -> Option<Color> {
        self.background_brush
    }

    pub fn set_background_brush(&mut self, brush: Option<Color>) {
        self.background_brush = brush;
    }

    pub fn set_foreground_brush(&mut self, brush: Option<Color>) {
        self.foreground_brush = brush;
    }

    pub fn apply_style(&mut self, style: &BorderStyle) {
        if let Some(brush) = style.border_brush {
            self.border_brush = Some(brush);
        }
        if let Some(thickness) = style.border_thickness {
            self.border_thickness = thickness;
        }
        if let Some(radius) = style.border_radius {
            self.border_radius = radius;
        }
        if let Some(brush) = style.background_brush {
            self.background_brush = Some(brush);
        }
        if let Some(brush) = style.foreground_brush {
            self.foreground_brush = Some(brush);
        }
    }

    fn inner_rect(&self, tree: &RenderTree, id: RenderId) -> Rect {
        tree.padding_rect(id).shrink(self.inner_thickness())
    }
}

impl RenderObject for BorderObject {
    fn name(&self) -> &'static str {
        "Border"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Single
    }

    fn inner_thickness(&self) -> Thickness {
        if self.border_enabled {
            self.border_thickness
        } else {
            Thickness::default()
        }
    }

    fn measure_content(
        &mut self,
        tree: &mut RenderTree,
        id: RenderId,
        requirement: &MeasureRequirement,
        preferred: MeasureSize,
    ) -> Size {
        match tree.children(id).first().copied() {
            Some(child) => tree.measure(child, requirement, preferred),
            None => preferred.size_or_zero(),
        }
    }

    fn draw_content(&self, tree: &RenderTree, id: RenderId, painter: &mut dyn Painter) {
        if let Some(brush) = self.background_brush {
            painter.fill_rect(self.inner_rect(tree, id), self.border_radius, brush);
        }
        if self.border_enabled {
            match self.border_brush {
                Some(brush) => painter.stroke_border(
                    tree.padding_rect(id),
                    self.border_radius,
                    self.border_thickness,
                    brush,
                ),
                None => log::warn!(target: "perch::render", "border is enabled but has no brush"),
            }
        }
    }

    fn draw_overlay(&self, tree: &RenderTree, id: RenderId, painter: &mut dyn Painter) {
        if let Some(brush) = self.foreground_brush {
            painter.fill_rect(self.inner_rect(tree, id), self.border_radius, brush);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//! Overlapping layout: every child occupies the same content rect.

use super::{Alignment, ChildMode, RenderId, RenderObject, RenderTree};
use crate::measure::{MeasureRequirement, MeasureSize};
use crate::rect::{Point, Rect, Size};
use core::any::Any;
use std::collections::HashMap;

/// Per-child alignment overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackChildData {
    pub horizontal: Option<Alignment>,
    pub vertical: Option<Alignment>,
}

/// Stacks children on top of each other; later children are drawn (and hit) first.
///
/// The content size is the component-wise maximum of the children’s sizes.
#[derive(Debug, Default)]
pub struct StackLayout {
    horizontal_alignment: Alignment,
    vertical_alignment: Alignment,
    child_data: HashMap<RenderId, StackChildData>,
}

impl StackLayout {
    pub fn new() -> StackLayout {
        StackLayout::default()
    }

    pub fn set_default_alignment(&mut self, horizontal: Alignment, vertical: Alignment) {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
    }

    pub fn child_data(&self, child: RenderId) -> StackChildData {
        self.child_data.get(&child).copied().unwrap_or_default()
    }

    pub fn set_child_data(&mut self, child: RenderId, data: StackChildData) {
        self.child_data.insert(child, data);
    }

    fn alignment(&self, child: RenderId) -> (Alignment, Alignment) {
        let data = self.child_data(child);
        (
            data.horizontal.unwrap_or(self.horizontal_alignment),
            data.vertical.unwrap_or(self.vertical_alignment),
        )
    }
}

impl RenderObject for StackLayout {
    fn name(&self) -> &'static str {
        "StackLayout"
    }

    fn child_mode(&self) -> ChildMode {
        ChildMode::Multiple
    }

    fn measure_content(
        &mut self,
        tree: &mut RenderTree,
        id: RenderId,
        requirement: &MeasureRequirement,
        preferred: MeasureSize,
    ) -> Size {
        let children = tree.children(id).to_vec();
        let child_requirement = MeasureRequirement::at_most(requirement.max);

        let mut size = Size::new(0., 0.);
        for child in &children {
            let child_size = tree.measure(*child, &child_requirement, MeasureSize::unspecified());
            size.x = size.x.max(child_size.x);
            size.y = size.y.max(child_size.y);
        }

        let floor = preferred.size_or_zero();
        let min = requirement.min.size_or_zero();
        size.x = size.x.max(floor.x).max(min.x);
        size.y = size.y.max(floor.y).max(min.y);

        for child in &children {
            let (horizontal, vertical) = self.alignment(*child);
            let stretch_x = horizontal == Alignment::Stretch;
            let stretch_y = vertical == Alignment::Stretch;
            if stretch_x || stretch_y {
                let mut target = tree.size(*child);
                if stretch_x {
                    target.x = size.x;
                }
                if stretch_y {
                    target.y = size.y;
                }
                tree.measure(
                    *child,
                    &MeasureRequirement::exact(target),
                    MeasureSize::unspecified(),
                );
            }
        }

        size
    }

    fn layout_content(&mut self, tree: &mut RenderTree, id: RenderId, content_rect: Rect) {
        for child in tree.children(id).to_vec() {
            let size = tree.size(child);
            let (horizontal, vertical) = self.alignment(child);
            tree.layout(
                child,
                Point::new(
                    horizontal.anchor(content_rect.left(), content_rect.size.x, size.x),
                    vertical.anchor(content_rect.top(), content_rect.size.y, size.y),
                ),
            );
        }
    }

    fn child_removed(&mut self, child: RenderId) {
        self.child_data.remove(&child);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::BorderObject;
    use cgmath::EuclideanSpace;

    fn fixed(tree: &mut RenderTree, width: f64, height: f64) -> RenderId {
        let id = tree.insert(Box::new(BorderObject::new()));
        tree.set_preferred_size(id, Size::new(width, height).into());
        id
    }

    #[test]
    fn size_is_componentwise_max() {
        let mut tree = RenderTree::new();
        let root = tree.insert(Box::new(StackLayout::new()));
        let a = fixed(&mut tree, 30., 10.);
        let b = fixed(&mut tree, 10., 40.);
        tree.add_child(root, a, 0);
        tree.add_child(root, b, 1);

        let size = tree.measure(root, &MeasureRequirement::unbounded(), MeasureSize::unspecified());
        assert_eq!(size, Size::new(30., 40.));
    }

    #[test]
    fn alignment_and_stretch() {
        let mut tree = RenderTree::new();
        let root = tree.insert(Box::new(StackLayout::new()));
        let centered = fixed(&mut tree, 10., 10.);
        let stretched = fixed(&mut tree, 10., 10.);
        tree.add_child(root, centered, 0);
        tree.add_child(root, stretched, 1);
        tree.set_preferred_size(root, Size::new(50., 30.).into());
        tree.update_object::<StackLayout, _>(root, |stack| {
            stack.set_child_data(
                centered,
                StackChildData {
                    horizontal: Some(Alignment::Center),
                    vertical: Some(Alignment::End),
                },
            );
            stack.set_child_data(
                stretched,
                StackChildData {
                    horizontal: Some(Alignment::Stretch),
                    vertical: None,
                },
            );
        });

        let size = tree.measure(root, &MeasureRequirement::unbounded(), MeasureSize::unspecified());
        tree.layout(root, Point::origin());

        assert_eq!(size, Size::new(50., 30.));
        assert_eq!(tree.offset(centered), Point::new(20., 20.));
        assert_eq!(tree.size(stretched), Size::new(50., 10.));
        assert_eq!(tree.offset(stretched), Point::new(0., 0.));
    }

    #[test]
    fn children_are_bounded_by_max() {
        let mut tree = RenderTree::new();
        let root = tree.insert(Box::new(StackLayout::new()));
        let big = fixed(&mut tree, 500., 500.);
        tree.add_child(root, big, 0);

        let requirement = MeasureRequirement::at_most(Size::new(100., 80.).into());
        let size = tree.measure(root, &requirement, MeasureSize::unspecified());
        assert_eq!(size, Size::new(100., 80.));
        assert_eq!(tree.size(big), Size::new(100., 80.));
    }
}

//! Linear (flex) layout along one axis.

use super::{Alignment, Axis, ChildMode, RenderId, RenderObject, RenderTree};
use crate::measure::{MeasureLength, MeasureRequirement, MeasureSize};
use crate::rect::{Rect, Size};
use cgmath::EuclideanSpace;
use core::any::Any;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Horizontal,
    HorizontalReverse,
    Vertical,
    VerticalReverse,
}

impl FlexDirection {
    fn axis(self) -> Axis {
        match self {
            FlexDirection::Horizontal | FlexDirection::HorizontalReverse => Axis::Horizontal,
            FlexDirection::Vertical | FlexDirection::VerticalReverse => Axis::Vertical,
        }
    }

    fn is_reverse(self) -> bool {
        matches!(
            self,
            FlexDirection::HorizontalReverse | FlexDirection::VerticalReverse
        )
    }
}

/// Per-child flex parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexChildData {
    /// Share of the free main-axis length this child takes when the container grows.
    pub expand_factor: f64,
    /// Share of the excess main-axis length this child gives up when the container shrinks.
    pub shrink_factor: f64,
    /// Overrides the container’s item cross alignment.
    pub cross_alignment: Option<Alignment>,
}

impl Default for FlexChildData {
    fn default() -> Self {
        FlexChildData {
            expand_factor: 0.,
            shrink_factor: 1.,
            cross_alignment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adjust {
    None,
    Expand,
    Shrink,
}

/// Places children in a row or column.
///
/// Children are first measured at their natural main-axis length. If the total does not match
/// the target length (the preferred length, else the max/min bounds), the difference is
/// distributed by expand or shrink factors, re-measuring children until they settle.
#[derive(Debug)]
pub struct FlexLayout {
    direction: FlexDirection,
    item_cross_alignment: Alignment,
    child_data: HashMap<RenderId, FlexChildData>,
}

impl FlexLayout {
    pub fn new(direction: FlexDirection) -> FlexLayout {
        FlexLayout {
            direction,
            item_cross_alignment: Alignment::Center,
            child_data: HashMap::new(),
        }
    }

    pub fn direction(&self) -> FlexDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: FlexDirection) {
        self.direction = direction;
    }

    pub fn item_cross_alignment(&self) -> Alignment {
        self.item_cross_alignment
    }

    pub fn set_item_cross_alignment(&mut self, alignment: Alignment) {
        self.item_cross_alignment = alignment;
    }

    pub fn child_data(&self, child: RenderId) -> FlexChildData {
        self.child_data.get(&child).copied().unwrap_or_default()
    }

    pub fn set_child_data(&mut self, child: RenderId, data: FlexChildData) {
        self.child_data.insert(child, data);
    }

    fn cross_alignment(&self, child: RenderId) -> Alignment {
        self.child_data(child)
            .cross_alignment
            .unwrap_or(self.item_cross_alignment)
    }
}

fn total_main(tree: &RenderTree, children: &[RenderId], axis: Axis) -> f64 {
    children.iter().map(|child| axis.main(tree.size(*child))).sum()
}

impl RenderObject for FlexLayout {
    fn name(&self) -> &'static str {
        "FlexLayout"
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
        let axis = self.direction.axis();
        let children = tree.children(id).to_vec();

        let preferred_main = axis.main_m(preferred);
        let preferred_cross = axis.cross_m(preferred);
        let max_main = axis.main_m(requirement.max);
        let max_cross = axis.cross_m(requirement.max);
        let min_main = axis.main_m(requirement.min);
        let min_cross = axis.cross_m(requirement.min);

        // natural sizes
        let natural = MeasureRequirement::at_most(
            axis.measure_size(MeasureLength::Unspecified, max_cross),
        );
        for child in &children {
            tree.measure(*child, &natural, MeasureSize::unspecified());
        }
        let mut total = total_main(tree, &children, axis);

        let mut adjust = Adjust::None;
        let mut target = 0.;
        if let MeasureLength::Length(preferred_main) = preferred_main {
            target = preferred_main;
            if total > preferred_main {
                adjust = Adjust::Shrink;
            } else if total < preferred_main {
                adjust = Adjust::Expand;
            }
        } else {
            if let MeasureLength::Length(max_main) = max_main {
                if max_main < total {
                    adjust = Adjust::Shrink;
                    target = max_main;
                } else if max_main > total
                    && children
                        .iter()
                        .any(|child| self.child_data(*child).expand_factor > 0.)
                {
                    adjust = Adjust::Expand;
                    target = max_main;
                }
            }
            if adjust == Adjust::None {
                if let MeasureLength::Length(min_main) = min_main {
                    if min_main > total {
                        adjust = Adjust::Expand;
                        target = min_main;
                    }
                }
            }
        }

        match adjust {
            Adjust::Shrink => {
                let mut list: Vec<_> = children
                    .iter()
                    .copied()
                    .filter(|child| self.child_data(*child).shrink_factor > 0.)
                    .collect();

                while !list.is_empty() {
                    let excess = total - target;
                    let factor_sum: f64 =
                        list.iter().map(|c| self.child_data(*c).shrink_factor).sum();
                    if factor_sum == 0. {
                        break;
                    }

                    let mut settled = Vec::new();
                    for child in &list {
                        let share = self.child_data(*child).shrink_factor / factor_sum * excess;
                        let mut length = axis.main(tree.size(*child)) - share;
                        match axis.main_m(tree.min_size(*child)) {
                            MeasureLength::Length(min) if length < min => length = min,
                            _ => length = length.max(0.),
                        }

                        let main = MeasureLength::new(length);
                        tree.measure(
                            *child,
                            &MeasureRequirement::at_most(axis.measure_size(main, max_cross)),
                            axis.measure_size(main, MeasureLength::Unspecified),
                        );
                        if axis.main(tree.size(*child)) >= length {
                            settled.push(*child);
                        }
                    }

                    total = total_main(tree, &children, axis);
                    if total <= target || settled.is_empty() {
                        break;
                    }
                    list.retain(|child| !settled.contains(child));
                }
            }
            Adjust::Expand => {
                let mut list: Vec<_> = children
                    .iter()
                    .copied()
                    .filter(|child| self.child_data(*child).expand_factor > 0.)
                    .collect();

                while !list.is_empty() {
                    let free = target - total;
                    let factor_sum: f64 =
                        list.iter().map(|c| self.child_data(*c).expand_factor).sum();

                    let mut settled = Vec::new();
                    for child in &list {
                        let share = self.child_data(*child).expand_factor / factor_sum * free;
                        let mut length = axis.main(tree.size(*child)) + share;
                        if let MeasureLength::Length(max) = axis.main_m(tree.max_size(*child)) {
                            length = length.min(max);
                        }

                        let main = MeasureLength::new(length);
                        tree.measure(
                            *child,
                            &MeasureRequirement::new(
                                axis.measure_size(MeasureLength::Unspecified, max_cross),
                                axis.measure_size(main, MeasureLength::Unspecified),
                                MeasureSize::unspecified(),
                            ),
                            axis.measure_size(main, MeasureLength::Unspecified),
                        );
                        if axis.main(tree.size(*child)) <= length {
                            settled.push(*child);
                        }
                    }

                    total = total_main(tree, &children, axis);
                    if total >= target || settled.is_empty() {
                        break;
                    }
                    list.retain(|child| !settled.contains(child));
                }
            }
            Adjust::None => (),
        }

        let mut cross = children
            .iter()
            .map(|child| axis.cross(tree.size(*child)))
            .fold(0., f64::max);

        if max_main.is_specified() && total > max_main.length_or_max() {
            log::warn!(
                target: "perch::render",
                "{}: children’s main length {} exceeds max length {}",
                tree.debug_path(id),
                total,
                max_main
            );
            total = max_main.length_or_max();
        } else if min_main.is_specified() && total < min_main.length_or_zero() {
            total = min_main.length_or_zero();
        }

        cross = cross
            .max(preferred_cross.length_or_zero())
            .max(min_cross.length_or_zero())
            .min(max_cross.length_or_max());

        for child in &children {
            if self.cross_alignment(*child) == Alignment::Stretch {
                let size = tree.size(*child);
                let stretched = axis.size(axis.main(size), cross);
                tree.measure(
                    *child,
                    &MeasureRequirement::exact(stretched),
                    MeasureSize::unspecified(),
                );
            }
        }

        axis.size(total, cross)
    }

    fn layout_content(&mut self, tree: &mut RenderTree, id: RenderId, content_rect: Rect) {
        let axis = self.direction.axis();
        let reverse = self.direction.is_reverse();
        let origin = content_rect.origin.to_vec();
        let main_start = axis.main(origin);
        let main_end = main_start + axis.main(content_rect.size);
        let cross_start = axis.cross(origin);
        let cross_length = axis.cross(content_rect.size);

        let mut offset = 0.;
        for child in tree.children(id).to_vec() {
            let size = tree.size(child);
            let main = if reverse {
                main_end - offset - axis.main(size)
            } else {
                main_start + offset
            };
            let cross = self.cross_alignment(child).anchor(
                cross_start,
                cross_length,
                axis.cross(size),
            );
            tree.layout(child, axis.point(main, cross));
            offset += axis.main(size);
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
    use crate::rect::Point;
    use crate::render::BorderObject;

    fn fixed(tree: &mut RenderTree, width: f64, height: f64) -> RenderId {
        let id = tree.insert(Box::new(BorderObject::new()));
        tree.set_preferred_size(id, Size::new(width, height).into());
        id
    }

    fn flex(tree: &mut RenderTree, direction: FlexDirection, children: &[RenderId]) -> RenderId {
        let id = tree.insert(Box::new(FlexLayout::new(direction)));
        for (i, child) in children.iter().enumerate() {
            tree.add_child(id, *child, i);
        }
        id
    }

    fn run(tree: &mut RenderTree, root: RenderId, requirement: MeasureRequirement) -> Size {
        let size = tree.measure(root, &requirement, MeasureSize::unspecified());
        tree.layout(root, Point::origin());
        size
    }

    #[test]
    fn natural_row() {
        let mut tree = RenderTree::new();
        let a = fixed(&mut tree, 10., 5.);
        let b = fixed(&mut tree, 20., 15.);
        let root = flex(&mut tree, FlexDirection::Horizontal, &[a, b]);

        let size = run(&mut tree, root, MeasureRequirement::unbounded());
        assert_eq!(size, Size::new(30., 15.));
        assert_eq!(tree.offset(a), Point::new(0., 5.));
        assert_eq!(tree.offset(b), Point::new(10., 0.));
    }

    #[test]
    fn expand_distributes_by_factor() {
        let mut tree = RenderTree::new();
        let a = tree.insert(Box::new(BorderObject::new()));
        let b = tree.insert(Box::new(BorderObject::new()));
        let c = fixed(&mut tree, 10., 10.);
        let root = flex(&mut tree, FlexDirection::Horizontal, &[a, b, c]);
        tree.update_object::<FlexLayout, _>(root, |flex| {
            flex.set_child_data(a, FlexChildData { expand_factor: 1., ..Default::default() });
            flex.set_child_data(b, FlexChildData { expand_factor: 3., ..Default::default() });
        });

        let size = run(
            &mut tree,
            root,
            MeasureRequirement::at_most(Size::new(90., 10.).into()),
        );
        assert_eq!(size, Size::new(90., 10.));
        assert_eq!(tree.size(a).x, 20.);
        assert_eq!(tree.size(b).x, 60.);
        assert_eq!(tree.offset(c).x, 80.);
    }

    #[test]
    fn shrink_respects_child_min() {
        let mut tree = RenderTree::new();
        let a = fixed(&mut tree, 50., 10.);
        let b = fixed(&mut tree, 50., 10.);
        tree.set_min_size(a, MeasureSize::new(MeasureLength::new(45.), MeasureLength::Unspecified));
        let root = flex(&mut tree, FlexDirection::Horizontal, &[a, b]);

        let size = run(
            &mut tree,
            root,
            MeasureRequirement::at_most(Size::new(80., 10.).into()),
        );
        // a stops at its minimum; the remaining overflow is clamped away
        assert_eq!(size.x, 80.);
        assert_eq!(tree.size(a).x, 45.);
        assert_eq!(tree.size(b).x, 40.);
    }

    #[test]
    fn unshrinkable_overflow_is_clamped() {
        let mut tree = RenderTree::new();
        let a = fixed(&mut tree, 50., 20.);
        let b = fixed(&mut tree, 50., 20.);
        let root = flex(&mut tree, FlexDirection::Vertical, &[a, b]);
        for child in [a, b] {
            tree.update_object::<FlexLayout, _>(root, |flex| {
                flex.set_child_data(child, FlexChildData { shrink_factor: 0., ..Default::default() });
            });
        }

        let requirement = MeasureRequirement::at_most(Size::new(100., 30.).into());
        let size = run(&mut tree, root, requirement);
        assert!(requirement.satisfies(size));
        assert_eq!(size, Size::new(50., 30.));
    }

    #[test]
    fn stretch_fills_cross_axis() {
        let mut tree = RenderTree::new();
        let a = fixed(&mut tree, 10., 5.);
        let b = fixed(&mut tree, 10., 25.);
        let root = flex(&mut tree, FlexDirection::Horizontal, &[a, b]);
        tree.update_object::<FlexLayout, _>(root, |flex| {
            flex.set_item_cross_alignment(Alignment::Stretch)
        });

        run(&mut tree, root, MeasureRequirement::unbounded());
        assert_eq!(tree.size(a), Size::new(10., 25.));
        assert_eq!(tree.offset(a), Point::new(0., 0.));
    }

    #[test]
    fn reverse_places_from_end() {
        let mut tree = RenderTree::new();
        let a = fixed(&mut tree, 10., 10.);
        let b = fixed(&mut tree, 20., 10.);
        let root = flex(&mut tree, FlexDirection::HorizontalReverse, &[a, b]);

        run(&mut tree, root, MeasureRequirement::unbounded());
        assert_eq!(tree.offset(a).x, 20.);
        assert_eq!(tree.offset(b).x, 0.);
    }
}

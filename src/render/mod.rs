//! Render objects: the nodes that measure, lay out, paint and hit-test.
//!
//! Render objects live in a [`RenderTree`] arena and refer to each other by [`RenderId`]. The
//! parent link is a plain id; ownership of a render object belongs to the control that created
//! it, not to its parent render object.
//!
//! # Measure and layout
//! Measurement is top-down: a parent passes a [`MeasureRequirement`] and a preferred size to
//! each child and reads back the child’s size. A node narrows the requirement by its own
//! min/max, resolves its preferred size, subtracts margin and padding, and asks its
//! [`RenderObject`] for a content size. The result is padded back out and coerced into the
//! requirement, so a size never violates the last requirement it was measured with.
//!
//! Layout then places each child at an offset relative to its parent’s origin.

mod border;
mod flex;
mod scroll;
mod stack;
mod text;

pub use border::{BorderObject, BorderStyle};
pub use flex::{FlexChildData, FlexDirection, FlexLayout};
pub use scroll::{ScrollDirection, ScrollKind, ScrollView, DEFAULT_LINE_LENGTH};
pub use stack::{StackChildData, StackLayout};
pub use text::TextObject;

use crate::backend::Painter;
use crate::control::ControlId;
use crate::measure::{MeasureLength, MeasureRequirement, MeasureSize};
use crate::rect::{at_least_zero, Point, Rect, Size, Thickness};
use cgmath::{EuclideanSpace, Zero};
use core::any::Any;
use core::fmt;
use std::collections::HashMap;
use uuid::Uuid;

/// A unique identifier for a render object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderId(Uuid);

impl RenderId {
    pub(crate) fn new() -> RenderId {
        RenderId(Uuid::new_v4())
    }
}

/// How many children a node accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    None,
    Single,
    Multiple,
}

/// Placement of a child along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    /// Fill the available length; laid out like `Start`.
    Stretch,
}

impl Alignment {
    /// The start coordinate of content of `content_length` placed in `[start, start + length)`.
    pub fn anchor(self, start: f64, length: f64, content_length: f64) -> f64 {
        match self {
            Alignment::Start | Alignment::Stretch => start,
            Alignment::Center => start + (length - content_length) / 2.,
            Alignment::End => start + length - content_length,
        }
    }
}

/// Main/cross axis helpers shared by the container policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn main(self, size: Size) -> f64 {
        match self {
            Axis::Horizontal => size.x,
            Axis::Vertical => size.y,
        }
    }

    pub fn cross(self, size: Size) -> f64 {
        match self {
            Axis::Horizontal => size.y,
            Axis::Vertical => size.x,
        }
    }

    pub fn main_m(self, size: MeasureSize) -> MeasureLength {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    pub fn cross_m(self, size: MeasureSize) -> MeasureLength {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    pub fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    pub fn measure_size(self, main: MeasureLength, cross: MeasureLength) -> MeasureSize {
        match self {
            Axis::Horizontal => MeasureSize::new(main, cross),
            Axis::Vertical => MeasureSize::new(cross, main),
        }
    }

    pub fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }
}

/// The behavior of a render object.
///
/// Geometry (offset, size, margin, padding, size overrides) is stored by the tree; an
/// implementor only supplies the content policy.
pub trait RenderObject: Any + fmt::Debug {
    /// A short name used in diagnostics.
    fn name(&self) -> &'static str;

    fn child_mode(&self) -> ChildMode {
        ChildMode::None
    }

    /// Space inside the padding that is not content (e.g. a border).
    fn inner_thickness(&self) -> Thickness {
        Thickness::default()
    }

    /// Measures the content; `requirement` and `preferred` already exclude margin and padding.
    ///
    /// The returned size may violate the requirement; the caller clamps it.
    fn measure_content(
        &mut self,
        tree: &mut RenderTree,
        id: RenderId,
        requirement: &MeasureRequirement,
        preferred: MeasureSize,
    ) -> Size;

    /// Places children inside the content rect (in this object’s coordinates).
    fn layout_content(&mut self, tree: &mut RenderTree, id: RenderId, content_rect: Rect) {
        for child in tree.children(id).to_vec() {
            tree.layout(child, content_rect.origin);
        }
    }

    /// Paints this object below its children, in this object’s coordinates.
    fn draw_content(&self, tree: &RenderTree, id: RenderId, painter: &mut dyn Painter) {
        let _ = (tree, id, painter);
    }

    /// Paints this object above its children.
    fn draw_overlay(&self, tree: &RenderTree, id: RenderId, painter: &mut dyn Painter) {
        let _ = (tree, id, painter);
    }

    /// If true, children are clipped to the content rect.
    fn clips_children(&self) -> bool {
        false
    }

    /// Finds the topmost render object at `point` (in this object’s coordinates).
    fn hit_test(&self, tree: &RenderTree, id: RenderId, point: Point) -> Option<RenderId> {
        default_hit_test(tree, id, point)
    }

    /// Called after a child was removed, so per-child data can be dropped.
    fn child_removed(&mut self, child: RenderId) {
        let _ = child;
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Tests children front to back, then the node’s own padding rect.
pub fn default_hit_test(tree: &RenderTree, id: RenderId, point: Point) -> Option<RenderId> {
    if let Some(hit) = hit_test_children(tree, id, point) {
        return Some(hit);
    }
    if tree.padding_rect(id).contains(point) {
        Some(id)
    } else {
        None
    }
}

/// Tests children in reverse insertion order, translating the point into each child’s space.
pub fn hit_test_children(tree: &RenderTree, id: RenderId, point: Point) -> Option<RenderId> {
    tree.children(id)
        .iter()
        .rev()
        .find_map(|child| tree.hit_test(*child, point - tree.offset(*child).to_vec()))
}

/// A node in the render tree.
pub struct RenderNode {
    control: Option<ControlId>,
    parent: Option<RenderId>,
    children: Vec<RenderId>,
    offset: Point,
    size: Size,
    margin: Thickness,
    padding: Thickness,
    preferred_size: MeasureSize,
    /// Own min/max bounds; merged into every requirement this node is measured with.
    custom_requirement: MeasureRequirement,
    last_measure: Option<(MeasureRequirement, MeasureSize)>,
    layout_valid: bool,
    /// Taken out while the object is measuring or laying out.
    object: Option<Box<dyn RenderObject>>,
}

impl fmt::Debug for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RenderNode")
            .field("object", &self.object)
            .field("control", &self.control)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("offset", &self.offset)
            .field("size", &self.size)
            .finish()
    }
}

/// The render-object arena.
#[derive(Debug, Default)]
pub struct RenderTree {
    nodes: HashMap<RenderId, RenderNode>,
    relayout_requested: bool,
    repaint_requested: bool,
}

impl RenderTree {
    pub fn new() -> RenderTree {
        RenderTree::default()
    }

    /// Adds a detached render object.
    pub fn insert(&mut self, object: Box<dyn RenderObject>) -> RenderId {
        let id = RenderId::new();
        self.nodes.insert(
            id,
            RenderNode {
                control: None,
                parent: None,
                children: Vec::new(),
                offset: Point::origin(),
                size: Size::zero(),
                margin: Thickness::default(),
                padding: Thickness::default(),
                preferred_size: MeasureSize::unspecified(),
                custom_requirement: MeasureRequirement::unbounded(),
                last_measure: None,
                layout_valid: false,
                object: Some(object),
            },
        );
        id
    }

    /// Removes a render object, detaching it from its parent. Its children become parentless.
    pub fn remove(&mut self, id: RenderId) -> Option<Box<dyn RenderObject>> {
        if let Some(parent) = self.parent(id) {
            if let Some(index) = self.children(parent).iter().position(|c| *c == id) {
                self.remove_child(parent, index);
            }
        }
        let node = self.nodes.remove(&id)?;
        for child in &node.children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = None;
            }
        }
        self.repaint_requested = true;
        node.object
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts `child` into `parent`’s children at `index`.
    ///
    /// # Panics
    /// Panics if the child already has a parent, the parent does not accept (more) children, or
    /// the index is out of range.
    pub fn add_child(&mut self, parent: RenderId, child: RenderId, index: usize) {
        assert!(self.contains(child), "render object {:?} does not exist", child);
        assert!(
            self.parent(child).is_none(),
            "render object {} already has a parent",
            self.debug_path(child)
        );

        let node = self
            .nodes
            .get_mut(&parent)
            .unwrap_or_else(|| panic!("render object {:?} does not exist", parent));
        let mode = node.object.as_ref().map_or(ChildMode::None, |o| o.child_mode());
        match mode {
            ChildMode::None => panic!("render object {:?} does not accept children", node.object),
            ChildMode::Single => assert!(
                node.children.is_empty(),
                "render object {:?} accepts only one child",
                node.object
            ),
            ChildMode::Multiple => (),
        }
        assert!(
            index <= node.children.len(),
            "child index {} out of range (len {})",
            index,
            node.children.len()
        );

        node.children.insert(index, child);
        if let Some(child) = self.nodes.get_mut(&child) {
            child.parent = Some(parent);
        }
        self.invalidate_layout(parent);
    }

    /// Removes the child at `index` from `parent` and returns it.
    ///
    /// # Panics
    /// Panics if the index is out of range.
    pub fn remove_child(&mut self, parent: RenderId, index: usize) -> RenderId {
        let node = self
            .nodes
            .get_mut(&parent)
            .unwrap_or_else(|| panic!("render object {:?} does not exist", parent));
        assert!(
            index < node.children.len(),
            "child index {} out of range (len {})",
            index,
            node.children.len()
        );

        let child = node.children.remove(index);
        if let Some(object) = node.object.as_mut() {
            object.child_removed(child);
        }
        if let Some(child) = self.nodes.get_mut(&child) {
            child.parent = None;
        }
        self.invalidate_layout(parent);
        child
    }

    pub fn parent(&self, id: RenderId) -> Option<RenderId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: RenderId) -> &[RenderId] {
        self.nodes.get(&id).map_or(&[], |node| &node.children)
    }

    /// The control that owns this render object.
    pub fn control(&self, id: RenderId) -> Option<ControlId> {
        self.nodes.get(&id).and_then(|node| node.control)
    }

    pub(crate) fn set_control(&mut self, id: RenderId, control: Option<ControlId>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.control = control;
        }
    }

    /// The closest control owning this render object or one of its ancestors.
    pub fn owning_control(&self, id: RenderId) -> Option<ControlId> {
        let mut current = Some(id);
        while let Some(id) = current {
            if let Some(control) = self.control(id) {
                return Some(control);
            }
            current = self.parent(id);
        }
        None
    }

    pub fn object(&self, id: RenderId) -> Option<&dyn RenderObject> {
        self.nodes.get(&id).and_then(|node| node.object.as_deref())
    }

    /// Downcasts the behavior object.
    pub fn object_as<T: RenderObject>(&self, id: RenderId) -> Option<&T> {
        self.object(id)?.as_any().downcast_ref::<T>()
    }

    /// Downcasts the behavior object mutably. Does not invalidate anything.
    pub fn object_as_mut<T: RenderObject>(&mut self, id: RenderId) -> Option<&mut T> {
        self.nodes
            .get_mut(&id)?
            .object
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Runs `f` on the downcast behavior object and invalidates layout afterwards.
    pub fn update_object<T: RenderObject, R>(
        &mut self,
        id: RenderId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let result = f(self.object_as_mut::<T>(id)?);
        self.invalidate_layout(id);
        Some(result)
    }

    /// Offset relative to the parent’s origin.
    pub fn offset(&self, id: RenderId) -> Point {
        self.nodes.get(&id).map_or(Point::origin(), |node| node.offset)
    }

    /// Offset relative to the root’s origin.
    pub fn total_offset(&self, id: RenderId) -> Point {
        let mut result = Point::origin();
        let mut current = Some(id);
        while let Some(id) = current {
            result += self.offset(id).to_vec();
            current = self.parent(id);
        }
        result
    }

    /// The size computed by the last measure.
    pub fn size(&self, id: RenderId) -> Size {
        self.nodes.get(&id).map_or(Size::zero(), |node| node.size)
    }

    pub fn margin(&self, id: RenderId) -> Thickness {
        self.nodes.get(&id).map_or(Thickness::default(), |node| node.margin)
    }

    pub fn padding(&self, id: RenderId) -> Thickness {
        self.nodes.get(&id).map_or(Thickness::default(), |node| node.padding)
    }

    pub fn preferred_size(&self, id: RenderId) -> MeasureSize {
        self.nodes
            .get(&id)
            .map_or(MeasureSize::unspecified(), |node| node.preferred_size)
    }

    pub fn min_size(&self, id: RenderId) -> MeasureSize {
        self.nodes
            .get(&id)
            .map_or(MeasureSize::unspecified(), |node| node.custom_requirement.min)
    }

    pub fn max_size(&self, id: RenderId) -> MeasureSize {
        self.nodes
            .get(&id)
            .map_or(MeasureSize::unspecified(), |node| node.custom_requirement.max)
    }

    pub fn set_margin(&mut self, id: RenderId, margin: Thickness) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.margin = margin;
            self.invalidate_layout(id);
        }
    }

    pub fn set_padding(&mut self, id: RenderId, padding: Thickness) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.padding = padding;
            self.invalidate_layout(id);
        }
    }

    pub fn set_preferred_size(&mut self, id: RenderId, size: MeasureSize) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.preferred_size = size;
            self.invalidate_layout(id);
        }
    }

    /// Sets the own minimum size.
    ///
    /// # Panics
    /// Panics if it conflicts with the own maximum size.
    pub fn set_min_size(&mut self, id: RenderId, min: MeasureSize) {
        if let Some(node) = self.nodes.get_mut(&id) {
            let max = node.custom_requirement.max;
            node.custom_requirement = MeasureRequirement::new(max, min, MeasureSize::unspecified());
            self.invalidate_layout(id);
        }
    }

    /// Sets the own maximum size.
    ///
    /// # Panics
    /// Panics if it conflicts with the own minimum size.
    pub fn set_max_size(&mut self, id: RenderId, max: MeasureSize) {
        if let Some(node) = self.nodes.get_mut(&id) {
            let min = node.custom_requirement.min;
            node.custom_requirement = MeasureRequirement::new(max, min, MeasureSize::unspecified());
            self.invalidate_layout(id);
        }
    }

    /// The rect inside the margin, in this object’s coordinates.
    pub fn padding_rect(&self, id: RenderId) -> Rect {
        Rect::new(Point::origin(), self.size(id)).shrink(self.margin(id))
    }

    /// The rect inside margin, padding and inner thickness, in this object’s coordinates.
    pub fn content_rect(&self, id: RenderId) -> Rect {
        let inner = self
            .object(id)
            .map_or(Thickness::default(), |object| object.inner_thickness());
        Rect::new(Point::origin(), self.size(id))
            .shrink(self.margin(id) + self.padding(id) + inner)
    }

    fn space_thickness(&self, id: RenderId) -> Thickness {
        let inner = self
            .object(id)
            .map_or(Thickness::default(), |object| object.inner_thickness());
        self.margin(id) + self.padding(id) + inner
    }

    /// Marks this node and its ancestors as needing layout, and requests a relayout.
    pub fn invalidate_layout(&mut self, id: RenderId) {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.nodes.get_mut(&id) {
                Some(node) => {
                    node.layout_valid = false;
                    current = node.parent;
                }
                None => break,
            }
        }
        self.relayout_requested = true;
    }

    pub fn invalidate_paint(&mut self) {
        self.repaint_requested = true;
    }

    /// Whether something was invalidated since the last relayout request was taken.
    pub fn is_relayout_requested(&self) -> bool {
        self.relayout_requested
    }

    /// Returns and clears the pending relayout request.
    pub fn take_relayout_request(&mut self) -> bool {
        std::mem::replace(&mut self.relayout_requested, false)
    }

    /// Returns and clears the pending repaint request.
    pub fn take_repaint_request(&mut self) -> bool {
        std::mem::replace(&mut self.repaint_requested, false)
    }

    /// Measures a node.
    ///
    /// The result is stored as the node’s size and is guaranteed to satisfy `requirement`.
    pub fn measure(
        &mut self,
        id: RenderId,
        requirement: &MeasureRequirement,
        preferred: MeasureSize,
    ) -> Size {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => {
                log::warn!(target: "perch::render", "measuring missing render object {:?}", id);
                return Size::zero();
            }
        };

        if node.layout_valid && node.last_measure == Some((*requirement, preferred)) {
            return node.size;
        }

        // own bounds narrow the caller’s; own preferred size wins over the caller’s
        let merged = requirement.merge(&node.custom_requirement);
        let preferred_size = merged.coerce_measure(
            preferred
                .or(merged.suggest)
                .override_by(node.preferred_size),
        );

        let space = self.space_thickness(id).total_size();
        let content_requirement = merged.minus(space);
        let content_preferred = preferred_size.minus(space);

        log::trace!(
            target: "perch::render",
            "{} measure begins, requirement {}, preferred {}",
            self.debug_path(id),
            merged,
            preferred_size
        );

        let mut object = match self.nodes.get_mut(&id).and_then(|node| node.object.take()) {
            Some(object) => object,
            None => {
                log::warn!(
                    target: "perch::render",
                    "{:?} measured while already measuring; reusing last size",
                    id
                );
                return self.size(id);
            }
        };
        let content_size =
            object.measure_content(self, id, &content_requirement, content_preferred);

        let raw_size = at_least_zero(content_size) + space;
        let size = requirement.coerce(merged.coerce(raw_size));
        if size != raw_size {
            log::debug!(
                target: "perch::render",
                "{:?} content size {:?} clamped to {:?}",
                object,
                raw_size,
                size
            );
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.object = Some(object);
            node.size = size;
            node.last_measure = Some((*requirement, preferred));
        }

        log::trace!(target: "perch::render", "{} measure ends, size {:?}", self.debug_path(id), size);
        size
    }

    /// Places a node at `offset` (relative to its parent’s origin) and lays out its content.
    pub fn layout(&mut self, id: RenderId, offset: Point) {
        match self.nodes.get_mut(&id) {
            Some(node) => node.offset = offset,
            None => return,
        }

        let content_rect = self.content_rect(id);
        let object = self.nodes.get_mut(&id).and_then(|node| node.object.take());
        if let Some(mut object) = object {
            object.layout_content(self, id, content_rect);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.object = Some(object);
            }
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.layout_valid = true;
        }
    }

    /// Paints a node and its subtree; the painter’s origin is the parent’s origin.
    pub fn draw(&self, id: RenderId, painter: &mut dyn Painter) {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };
        let object = match node.object.as_deref() {
            Some(object) => object,
            None => return,
        };

        painter.push_state();
        painter.translate(node.offset.to_vec());
        object.draw_content(self, id, painter);

        let clip = object.clips_children();
        if clip {
            painter.push_clip(self.content_rect(id));
        }
        for child in &node.children {
            self.draw(*child, painter);
        }
        if clip {
            painter.pop_clip();
        }
        object.draw_overlay(self, id, painter);
        painter.pop_state();
    }

    /// Finds the topmost render object at `point`, given in this node’s coordinates.
    pub fn hit_test(&self, id: RenderId, point: Point) -> Option<RenderId> {
        self.object(id)?.hit_test(self, id, point)
    }

    /// A readable path from the root, for diagnostics: `Stack -> Flex -> Text`.
    pub fn debug_path(&self, id: RenderId) -> String {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            chain.push(self.object(id).map_or("?", |object| object.name()));
            current = self.parent(id);
        }
        chain.reverse();
        chain.join(" -> ")
    }
}

//! Constructors for the standard controls.
//!
//! Each constructor creates a detached control in the tree and returns its id; attach it with
//! [`ControlTree::add_child`].

use crate::backend::Cursor;
use crate::click::{self, ClickState};
use crate::color::Color;
use crate::context::Context;
use crate::control::{CheckState, ControlId, ResolvedStyle, StyleTarget};
use crate::events::WheelArgs;
use crate::host::Host;
use crate::rect::{CornerRadius, Thickness};
use crate::render::{
    BorderObject, BorderStyle, ChildMode, FlexChildData, FlexDirection, FlexLayout, RenderId,
    RenderTree, ScrollView, StackChildData, StackLayout, TextObject,
};
use crate::routed::{self, EventArgs};
use crate::tree::ControlTree;

pub fn flex_layout(tree: &mut ControlTree, direction: FlexDirection) -> ControlId {
    tree.create("FlexLayout", ChildMode::Multiple, Box::new(FlexLayout::new(direction)))
}

pub fn stack_layout(tree: &mut ControlTree) -> ControlId {
    tree.create("StackLayout", ChildMode::Multiple, Box::new(StackLayout::new()))
}

/// Sets how a child of a flex layout control grows, shrinks and aligns.
pub fn set_flex_child(tree: &mut ControlTree, child: ControlId, data: FlexChildData) {
    let (container, render_object) = match child_slot(tree, child) {
        Some(slot) => slot,
        None => return,
    };
    let updated = tree
        .render_mut()
        .update_object(container, |flex: &mut FlexLayout| {
            flex.set_child_data(render_object, data)
        });
    if updated.is_none() {
        log::warn!(target: "perch::controls", "{:?} is not in a flex layout", child);
    }
}

/// Sets how a child of a stack layout control aligns.
pub fn set_stack_child(tree: &mut ControlTree, child: ControlId, data: StackChildData) {
    let (container, render_object) = match child_slot(tree, child) {
        Some(slot) => slot,
        None => return,
    };
    let updated = tree
        .render_mut()
        .update_object(container, |stack: &mut StackLayout| {
            stack.set_child_data(render_object, data)
        });
    if updated.is_none() {
        log::warn!(target: "perch::controls", "{:?} is not in a stack layout", child);
    }
}

fn child_slot(tree: &ControlTree, child: ControlId) -> Option<(RenderId, RenderId)> {
    let parent = tree.parent(child)?;
    let container = tree.node(parent)?.container();
    Some((container, tree.render_object(child)?))
}

/// Writes the border part of resolved styles into a [`BorderObject`].
///
/// Optionally carries one style per click state, applied as the state changes.
#[derive(Debug, Clone, Default)]
pub struct BorderStyleTarget {
    pub normal: Option<ResolvedStyle>,
    pub hover: Option<ResolvedStyle>,
    pub pressed: Option<ResolvedStyle>,
}

impl StyleTarget for BorderStyleTarget {
    fn apply_style(&mut self, tree: &mut RenderTree, render_object: RenderId, style: &ResolvedStyle) {
        if let Some(border) = tree.object_as_mut::<BorderObject>(render_object) {
            border.apply_style(&style.border);
            if style.border.border_thickness.is_some() {
                border.set_border_enabled(true);
            }
        }
    }

    fn style_for_click_state(&self, state: ClickState) -> Option<ResolvedStyle> {
        match state {
            ClickState::None => self.normal.clone(),
            ClickState::Hover | ClickState::PressInactive => self.hover.clone(),
            ClickState::Press => self.pressed.clone(),
        }
    }
}

/// Writes the text brush of resolved styles into a [`TextObject`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStyleTarget;

impl StyleTarget for TextStyleTarget {
    fn apply_style(&mut self, tree: &mut RenderTree, render_object: RenderId, style: &ResolvedStyle) {
        if let (Some(brush), Some(text)) = (
            style.text_brush,
            tree.object_as_mut::<TextObject>(render_object),
        ) {
            text.set_brush(brush);
        }
    }
}

/// A box with border, background and foreground around at most one child.
pub fn border(tree: &mut ControlTree) -> ControlId {
    let id = tree.create("Border", ChildMode::Single, Box::new(BorderObject::new()));
    tree.set_style_target(id, Box::new(BorderStyleTarget::default()));
    id
}

/// A vertically scrolling viewport around at most one child.
///
/// Wheel events that bubble up to the view scroll it, unless a descendant handled them first.
pub fn scroll_view(tree: &mut ControlTree, context: &Context) -> ControlId {
    let mut view = ScrollView::new();
    view.set_line_length(context.config().scroll_line_length);
    let id = tree.create("ScrollView", ChildMode::Single, Box::new(view));

    if let Some(events) = tree.events_mut(id) {
        events
            .mouse_wheel
            .bubble
            .add_handler(|host, args: &mut EventArgs<WheelArgs>| on_wheel(host, args));
    }
    id
}

fn on_wheel(host: &mut Host, args: &mut EventArgs<WheelArgs>) {
    let render_object = match host.tree().render_object(args.sender) {
        Some(render_object) => render_object,
        None => return,
    };
    let render = host.tree_mut().render_mut();
    let scrolled = render
        .object_as_mut::<ScrollView>(render_object)
        .map_or(false, |view| view.scroll_wheel(args.data.delta));
    if scrolled {
        render.invalidate_layout(render_object);
        render.invalidate_paint();
        args.handled = true;
    }
}

/// Scrolls a scroll view control, then relayouts.
pub fn scroll_to(tree: &mut ControlTree, id: ControlId, x: Option<f64>, y: Option<f64>) {
    if let Some(render_object) = tree.render_object(id) {
        let render = tree.render_mut();
        render.update_object(render_object, |view: &mut ScrollView| view.scroll_to(x, y));
        render.invalidate_paint();
    }
}

/// A leaf showing a piece of text.
pub fn text_block(tree: &mut ControlTree, context: &Context, text: &str) -> ControlId {
    let layout = context.text_factory().create_text_layout(text);
    let id = tree.create(
        "TextBlock",
        ChildMode::None,
        Box::new(TextObject::new(layout, Color::BLACK)),
    );
    tree.set_style_target(id, Box::new(TextStyleTarget));
    id
}

pub fn set_text(tree: &mut ControlTree, id: ControlId, text: &str) {
    if let Some(render_object) = tree.render_object(id) {
        let render = tree.render_mut();
        render.update_object(render_object, |object: &mut TextObject| object.set_text(text));
        render.invalidate_paint();
    }
}

fn button_styles() -> BorderStyleTarget {
    let state = |background: Color| ResolvedStyle {
        border: BorderStyle {
            background_brush: Some(background),
            ..BorderStyle::default()
        },
        ..ResolvedStyle::default()
    };
    BorderStyleTarget {
        normal: Some(state(Color::rgba(0.9, 0.9, 0.9, 1.))),
        hover: Some(state(Color::rgba(0.85, 0.85, 0.85, 1.))),
        pressed: Some(state(Color::rgba(0.7, 0.7, 0.7, 1.))),
    }
}

/// A clickable border around at most one child.
///
/// Listen to [`ControlEvents::click`](crate::control::ControlEvents::click) to react.
pub fn button(tree: &mut ControlTree) -> ControlId {
    let mut object = BorderObject::new();
    object.set_border_enabled(true);
    object.set_border_thickness(Thickness::uniform(1.));
    object.set_border_radius(CornerRadius::uniform(3.));
    object.set_border_brush(Some(Color::rgba(0.6, 0.6, 0.6, 1.)));

    let id = tree.create("Button", ChildMode::Single, Box::new(object));
    if let Some(render_object) = tree.render_object(id) {
        tree.render_mut()
            .set_padding(render_object, Thickness::new(6., 2., 6., 2.));
    }
    tree.set_cursor(id, Some(Cursor::Hand));
    click::install(tree, id);

    let styles = button_styles();
    let normal = styles.normal.clone();
    tree.set_style_target(id, Box::new(styles));
    if let Some(normal) = normal {
        tree.apply_style(id, &normal);
    }
    id
}

/// A button that flips a checked state on every click.
///
/// Raises [`ControlEvents::checked_changed`](crate::control::ControlEvents::checked_changed)
/// with the new value.
pub fn toggle(tree: &mut ControlTree) -> ControlId {
    let id = button(tree);
    if let Some(node) = tree.node_mut(id) {
        node.kind = "Toggle";
        node.capabilities.check = Some(CheckState::default());
        node.events.click.direct.add_handler(|host, args| {
            let checked = host.tree().check(args.sender).map_or(false, |c| c.checked);
            set_checked(host, args.sender, !checked);
        });
    }
    id
}

pub fn is_checked(tree: &ControlTree, id: ControlId) -> bool {
    tree.check(id).map_or(false, |check| check.checked)
}

/// Sets the checked state of a checkable control, raising `checked_changed` if it changed.
pub fn set_checked(host: &mut Host, id: ControlId, checked: bool) {
    match host.tree_mut().check_mut(id) {
        Some(check) if check.checked != checked => check.checked = checked,
        _ => return,
    }
    log::trace!(target: "perch::controls", "{:?} checked: {}", id, checked);
    let parent = host.tree().parent(id);
    routed::dispatch(host, id, |events| &events.checked_changed, parent, checked);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{FixedTextFactory, HeadlessFactory};
    use crate::measure::{MeasureRequirement, MeasureSize};
    use crate::rect::{Point, Size};
    use crate::timer::ManualTimers;
    use std::sync::Arc;

    fn context() -> Context {
        Context::new(
            Arc::new(HeadlessFactory::new(Size::new(100., 100.))),
            Arc::new(FixedTextFactory::new(10., 12.)),
            Arc::new(ManualTimers::new()),
        )
    }

    #[test]
    fn button_is_clickable_with_hand_cursor() {
        let mut tree = ControlTree::new();
        let button = button(&mut tree);
        let node = tree.node(button).unwrap();
        assert!(node.is_clickable());
        assert!(!node.is_checkable());
        assert_eq!(tree.cursor(button), Some(Cursor::Hand));

        let render_object = tree.render_object(button).unwrap();
        let border = tree.render().object_as::<BorderObject>(render_object).unwrap();
        assert!(border.is_border_enabled());
        assert_eq!(border.background_brush(), Some(Color::rgba(0.9, 0.9, 0.9, 1.)));
    }

    #[test]
    fn toggle_is_checkable() {
        let mut tree = ControlTree::new();
        let toggle = toggle(&mut tree);
        assert!(tree.node(toggle).unwrap().is_checkable());
        assert_eq!(tree.node(toggle).unwrap().kind(), "Toggle");
        assert!(!is_checked(&tree, toggle));
    }

    #[test]
    fn flex_child_data_reaches_layout() {
        let mut tree = ControlTree::new();
        let row = flex_layout(&mut tree, FlexDirection::Horizontal);
        let a = border(&mut tree);
        let b = border(&mut tree);
        tree.add_child(row, a, 0);
        tree.add_child(row, b, 1);
        set_flex_child(
            &mut tree,
            b,
            FlexChildData {
                expand_factor: 1.,
                ..FlexChildData::default()
            },
        );

        let row_render = tree.render_object(row).unwrap();
        let b_render = tree.render_object(b).unwrap();
        let render = tree.render_mut();
        render.measure(
            row_render,
            &MeasureRequirement::exact(Size::new(50., 10.)),
            MeasureSize::unspecified(),
        );
        render.layout(row_render, Point::new(0., 0.));
        assert_eq!(render.size(b_render).x, 50.);
    }

    #[test]
    fn text_block_measures_through_text_factory() {
        let context = context();
        let mut tree = ControlTree::new();
        let text = text_block(&mut tree, &context, "abc");
        let render_object = tree.render_object(text).unwrap();
        let size = tree.render_mut().measure(
            render_object,
            &MeasureRequirement::unbounded(),
            MeasureSize::unspecified(),
        );
        assert_eq!(size, Size::new(30., 12.));

        set_text(&mut tree, text, "abcd");
        let size = tree.render_mut().measure(
            render_object,
            &MeasureRequirement::unbounded(),
            MeasureSize::unspecified(),
        );
        assert_eq!(size, Size::new(40., 12.));
    }

    #[test]
    fn text_style_sets_brush() {
        let context = context();
        let mut tree = ControlTree::new();
        let text = text_block(&mut tree, &context, "abc");
        tree.apply_style(
            text,
            &ResolvedStyle {
                text_brush: Some(Color::WHITE),
                ..ResolvedStyle::default()
            },
        );
        let render_object = tree.render_object(text).unwrap();
        let object = tree.render().object_as::<TextObject>(render_object).unwrap();
        assert_eq!(object.brush(), Color::WHITE);
    }
}

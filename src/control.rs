//! Controls: the logical nodes input and focus are routed through.
//!
//! A control owns one primary render object (and possibly more), a set of routed events, and
//! optional capabilities. Capabilities are plain objects the control holds; behavior is chosen
//! by checking which ones are present.

use crate::backend::Cursor;
use crate::click::{ClickArgs, ClickDetector, ClickState};
use crate::color::Color;
use crate::events::{FocusArgs, KeyArgs, MouseArgs, MouseButtonArgs, WheelArgs};
use crate::measure::MeasureSize;
use crate::rect::Thickness;
use crate::render::{BorderStyle, ChildMode, RenderId, RenderTree};
use crate::routed::RoutedEvent;
use core::fmt;
use uuid::Uuid;

/// A unique identifier for a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(Uuid);

impl ControlId {
    pub(crate) fn new() -> ControlId {
        ControlId(Uuid::new_v4())
    }
}

/// Routed events every control has.
#[derive(Debug, Default)]
pub struct ControlEvents {
    pub mouse_enter: RoutedEvent<MouseArgs>,
    pub mouse_leave: RoutedEvent<MouseArgs>,
    pub mouse_move: RoutedEvent<MouseArgs>,
    pub mouse_down: RoutedEvent<MouseButtonArgs>,
    pub mouse_up: RoutedEvent<MouseButtonArgs>,
    pub mouse_wheel: RoutedEvent<WheelArgs>,
    pub key_down: RoutedEvent<KeyArgs>,
    pub key_up: RoutedEvent<KeyArgs>,
    pub gain_focus: RoutedEvent<FocusArgs>,
    pub lose_focus: RoutedEvent<FocusArgs>,

    /// Raised on a clickable control only; does not travel to ancestors.
    pub click: RoutedEvent<ClickArgs>,
    /// Raised on a clickable control only.
    pub click_state_changed: RoutedEvent<ClickState>,
    /// Raised on a checkable control only; carries the new value.
    pub checked_changed: RoutedEvent<bool>,
}

/// A checked/unchecked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckState {
    pub checked: bool,
}

/// Style values resolved by an external style system.
///
/// `None` fields leave the current value unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedStyle {
    pub border: BorderStyle,
    pub text_brush: Option<Color>,
    pub cursor: Option<Cursor>,
    pub margin: Option<Thickness>,
    pub padding: Option<Thickness>,
    pub preferred_size: Option<MeasureSize>,
}

/// Writes resolved styles into a control’s render objects.
pub trait StyleTarget: fmt::Debug {
    fn apply_style(&mut self, tree: &mut RenderTree, render_object: RenderId, style: &ResolvedStyle);

    /// The style to apply when the control’s click state changes, if any.
    fn style_for_click_state(&self, state: ClickState) -> Option<ResolvedStyle> {
        let _ = state;
        None
    }
}

/// Optional behaviors a control may have.
#[derive(Debug, Default)]
pub struct Capabilities {
    pub click: Option<ClickDetector>,
    pub check: Option<CheckState>,
    pub style: Option<Box<dyn StyleTarget>>,
}

/// A node in the control tree.
#[derive(Debug)]
pub struct ControlNode {
    pub(crate) kind: &'static str,
    pub(crate) child_mode: ChildMode,
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Vec<ControlId>,
    /// The render object that represents this control in its parent’s container.
    pub(crate) render_object: RenderId,
    /// The render object child controls’ render objects are inserted into.
    pub(crate) container: RenderId,
    /// Further render objects owned by this control; deleted with it.
    pub(crate) owned_render_objects: Vec<RenderId>,
    pub(crate) cursor: Option<Cursor>,
    pub(crate) events: ControlEvents,
    pub(crate) capabilities: Capabilities,
}

impl ControlNode {
    /// A short name for diagnostics, e.g. `"Button"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn child_mode(&self) -> ChildMode {
        self.child_mode
    }

    pub fn render_object(&self) -> RenderId {
        self.render_object
    }

    pub fn container(&self) -> RenderId {
        self.container
    }

    pub fn events(&self) -> &ControlEvents {
        &self.events
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_clickable(&self) -> bool {
        self.capabilities.click.is_some()
    }

    pub fn is_checkable(&self) -> bool {
        self.capabilities.check.is_some()
    }
}

//! Click detection: press, capture, release over the same control.

use crate::control::ControlId;
use crate::events::{MouseArgs, MouseButton, MouseButtonArgs};
use crate::host::Host;
use crate::rect::Point;
use crate::routed::{self, EventArgs};
use crate::tree::ControlTree;
use cgmath::EuclideanSpace;

/// Where the pointer is relative to a clickable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickState {
    #[default]
    None,
    /// Hovering, not pressed.
    Hover,
    /// Pressed and hovering.
    Press,
    /// Pressed, but the pointer has left the control.
    PressInactive,
}

/// A completed click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickArgs {
    pub down_point: Point,
    pub up_point: Point,
    pub button: MouseButton,
}

/// Click state for one control.
#[derive(Debug, Clone)]
pub struct ClickDetector {
    enabled: bool,
    trigger_buttons: Vec<MouseButton>,
    state: ClickState,
    button: Option<MouseButton>,
    down_point: Point,
}

impl Default for ClickDetector {
    fn default() -> Self {
        ClickDetector {
            enabled: true,
            trigger_buttons: vec![MouseButton::Left],
            state: ClickState::None,
            button: None,
            down_point: Point::origin(),
        }
    }
}

impl ClickDetector {
    pub fn new() -> ClickDetector {
        ClickDetector::default()
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.state, ClickState::Press | ClickState::PressInactive)
    }

    pub fn set_trigger_buttons(&mut self, buttons: &[MouseButton]) {
        self.trigger_buttons = buttons.to_vec();
    }

    fn triggers(&self, button: MouseButton) -> bool {
        self.enabled && self.trigger_buttons.contains(&button)
    }
}

/// Makes a control clickable.
///
/// Installs direct handlers on the control’s mouse events; clicks are raised through
/// [`ControlEvents::click`](crate::control::ControlEvents::click).
pub fn install(tree: &mut ControlTree, id: ControlId) {
    let events = match tree.node_mut(id) {
        Some(node) => {
            node.capabilities.click = Some(ClickDetector::new());
            &mut node.events
        }
        None => return,
    };

    events
        .mouse_enter
        .direct
        .add_handler(|host, args: &mut EventArgs<MouseArgs>| on_enter(host, args.sender));
    events
        .mouse_leave
        .direct
        .add_handler(|host, args: &mut EventArgs<MouseArgs>| on_leave(host, args.sender));
    events
        .mouse_down
        .direct
        .add_handler(|host, args: &mut EventArgs<MouseButtonArgs>| {
            on_down(host, args.sender, args.data)
        });
    events
        .mouse_up
        .direct
        .add_handler(|host, args: &mut EventArgs<MouseButtonArgs>| {
            on_up(host, args.sender, args.data)
        });
}

fn on_enter(host: &mut Host, id: ControlId) {
    let next = match host.tree().click(id) {
        Some(detector) if detector.enabled => match detector.state {
            ClickState::PressInactive => ClickState::Press,
            ClickState::Press => return,
            _ => ClickState::Hover,
        },
        _ => return,
    };
    set_state(host, id, next);
}

fn on_leave(host: &mut Host, id: ControlId) {
    let next = match host.tree().click(id) {
        Some(detector) if detector.enabled => match detector.state {
            ClickState::Press => ClickState::PressInactive,
            ClickState::PressInactive => return,
            _ => ClickState::None,
        },
        _ => return,
    };
    set_state(host, id, next);
}

fn on_down(host: &mut Host, id: ControlId, args: MouseButtonArgs) {
    match host.tree().click(id) {
        Some(detector) if detector.triggers(args.button) && detector.state == ClickState::Hover => {}
        _ => return,
    }

    if !host.capture_mouse_for(Some(id)) {
        log::debug!(target: "perch::click", "failed to capture mouse for {:?}", id);
        return;
    }
    if let Some(detector) = host.tree_mut().click_mut(id) {
        detector.down_point = args.point;
        detector.button = Some(args.button);
    }
    set_state(host, id, ClickState::Press);
}

fn on_up(host: &mut Host, id: ControlId, args: MouseButtonArgs) {
    let (state, down_point) = match host.tree().click(id) {
        Some(detector) if detector.triggers(args.button) && detector.button == Some(args.button) => {
            (detector.state, detector.down_point)
        }
        _ => return,
    };

    match state {
        ClickState::Press => {
            set_state(host, id, ClickState::Hover);
            let parent = host.tree().parent(id);
            routed::dispatch(
                host,
                id,
                |events| &events.click,
                parent,
                ClickArgs {
                    down_point,
                    up_point: args.point,
                    button: args.button,
                },
            );
            release(host, id);
        }
        ClickState::PressInactive => {
            set_state(host, id, ClickState::None);
            release(host, id);
        }
        _ => (),
    }
}

fn release(host: &mut Host, id: ControlId) {
    if let Some(detector) = host.tree_mut().click_mut(id) {
        detector.button = None;
    }
    if host.captured_control() == Some(id) {
        host.capture_mouse_for(None);
    }
}

fn set_state(host: &mut Host, id: ControlId, state: ClickState) {
    match host.tree_mut().click_mut(id) {
        Some(detector) if detector.state != state => detector.state = state,
        _ => return,
    }
    log::trace!(target: "perch::click", "{:?} click state is now {:?}", id, state);

    let style = host
        .tree()
        .node(id)
        .and_then(|node| node.capabilities().style.as_ref())
        .and_then(|target| target.style_for_click_state(state));
    if let Some(style) = style {
        host.tree_mut().apply_style(id, &style);
    }

    let parent = host.tree().parent(id);
    routed::dispatch(host, id, |events| &events.click_state_changed, parent, state);
}

/// Enables or disables click detection, cancelling any press in progress.
pub fn set_enabled(host: &mut Host, id: ControlId, enabled: bool) {
    match host.tree_mut().click_mut(id) {
        Some(detector) if detector.enabled != enabled => detector.enabled = enabled,
        _ => return,
    }

    if enabled {
        let state = if host.is_mouse_over(id) {
            ClickState::Hover
        } else {
            ClickState::None
        };
        set_state(host, id, state);
    } else {
        let pressed = host.tree().click(id).map_or(false, |d| d.is_pressed());
        set_state(host, id, ClickState::None);
        if pressed {
            release(host, id);
        }
    }
}

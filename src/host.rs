//! Connects a control tree to one native window.

use crate::backend::{Cursor, NativeWindow, PlatformError};
use crate::color::Color;
use crate::context::Context;
use crate::control::ControlId;
use crate::events::{FocusArgs, KeyArgs, MouseArgs, NativeEvent};
use crate::measure::{MeasureRequirement, MeasureSize};
use crate::rect::{Point, Size};
use crate::routed::{self, EventSelector};
use crate::timer::TimerHandle;
use crate::tree::ControlTree;
use cgmath::{EuclideanSpace, Zero};
use core::fmt;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::collections::HashMap;
use std::time::Duration;

/// Errors that may occur when creating or painting a host.
#[derive(Debug)]
pub enum HostError {
    /// The native layer failed.
    Platform(PlatformError),
    /// The root control does not exist or has a parent.
    InvalidRoot(ControlId),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostError::Platform(err) => write!(f, "{}", err),
            HostError::InvalidRoot(id) => write!(f, "{:?} cannot be a host root", id),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Platform(err) => Some(err),
            HostError::InvalidRoot(_) => None,
        }
    }
}

impl From<PlatformError> for HostError {
    fn from(err: PlatformError) -> Self {
        HostError::Platform(err)
    }
}

type Callback = Box<dyn FnOnce(&mut Host) + Send>;
type TimerCallback = Box<dyn FnMut(&mut Host) + Send>;

enum Task {
    Relayout,
    Repaint,
    Callback(Callback),
    Timer(u64),
}

struct HostTimer {
    handle: TimerHandle,
    repeat: bool,
    callback: TimerCallback,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostStats {
    pub relayouts: u64,
    pub repaints: u64,
}

/// Connects a control tree to a native window.
///
/// The host owns the tree and is the only place that touches the native window. It keeps track
/// of which control is focused, hovered and capturing the mouse, and turns invalidations into
/// at most one relayout and one repaint per [`Host::poll`].
pub struct Host {
    context: Context,
    tree: ControlTree,
    root: ControlId,
    window: Box<dyn NativeWindow>,

    event_sender: Sender<NativeEvent>,
    event_recv: Receiver<NativeEvent>,
    task_sender: Sender<Task>,
    task_recv: Receiver<Task>,
    timers: HashMap<u64, HostTimer>,
    next_timer: u64,
    after_layout: Vec<Callback>,

    focus: ControlId,
    mouse_hover: Option<ControlId>,
    mouse_captured: Option<ControlId>,
    override_cursor: Option<Cursor>,
    cursor: Option<Cursor>,

    relayout_scheduled: bool,
    repaint_scheduled: bool,
    destroyed: bool,
    stats: HostStats,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Host")
            .field("root", &self.root)
            .field("focus", &self.focus)
            .field("mouse_hover", &self.mouse_hover)
            .field("mouse_captured", &self.mouse_captured)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Host {
    /// Creates a new host with a new native window.
    ///
    /// The tree is not laid out until the first [`Host::poll`].
    pub fn new(context: Context, mut tree: ControlTree, root: ControlId) -> Result<Host, HostError> {
        if !tree.contains(root) || tree.parent(root).is_some() {
            return Err(HostError::InvalidRoot(root));
        }
        let window = context.window_factory().create_window()?;
        tree.take_detached();

        let (event_sender, event_recv) = channel::unbounded();
        let (task_sender, task_recv) = channel::unbounded();

        let mut host = Host {
            context,
            tree,
            root,
            window,
            event_sender,
            event_recv,
            task_sender,
            task_recv,
            timers: HashMap::new(),
            next_timer: 0,
            after_layout: Vec::new(),
            focus: root,
            mouse_hover: None,
            mouse_captured: None,
            override_cursor: None,
            cursor: None,
            relayout_scheduled: false,
            repaint_scheduled: false,
            destroyed: false,
            stats: HostStats::default(),
        };
        host.schedule_relayout();
        host.update_cursor();
        Ok(host)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    /// Mutable access to the tree. Structural changes are reconciled with the host’s state the
    /// next time the host handles an event or task.
    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    pub fn root(&self) -> ControlId {
        self.root
    }

    pub fn window(&self) -> &dyn NativeWindow {
        &*self.window
    }

    pub fn window_mut(&mut self) -> &mut dyn NativeWindow {
        &mut *self.window
    }

    pub fn stats(&self) -> HostStats {
        self.stats
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Returns a sender the native layer posts events into.
    pub fn event_sender(&self) -> Sender<NativeEvent> {
        self.event_sender.clone()
    }

    /// Handles all queued native events, then runs the queued tasks once.
    pub fn poll(&mut self) {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => self.handle_native_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => panic!("event receiver has been disconnected"),
            }
        }
        self.sync();

        // tasks posted while running these wait for the next poll
        let tasks: Vec<_> = self.task_recv.try_iter().collect();
        for task in tasks {
            self.run_task(task);
            self.sync();
        }

        if self.relayout_scheduled {
            self.run_relayout();
        }
        if self.repaint_scheduled {
            self.run_repaint();
        }
        self.timers.retain(|_, timer| !timer.handle.is_cancelled());
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Relayout => {
                if self.relayout_scheduled {
                    self.run_relayout();
                }
            }
            Task::Repaint => {
                if self.repaint_scheduled {
                    self.run_repaint();
                }
            }
            Task::Callback(callback) => callback(self),
            Task::Timer(id) => self.fire_timer(id),
        }
    }

    fn run_relayout(&mut self) {
        self.relayout_scheduled = false;
        self.relayout();
    }

    fn run_repaint(&mut self) {
        self.repaint_scheduled = false;
        if let Err(err) = self.repaint() {
            log::warn!(target: "perch::host", "repaint failed: {}", err);
        }
    }

    /// Handles one native event synchronously.
    pub fn handle_native_event(&mut self, event: NativeEvent) {
        if self.destroyed {
            log::debug!(target: "perch::host", "ignoring {:?} after destroy", event);
            return;
        }
        self.sync();

        match event {
            NativeEvent::MouseEnter => (),
            NativeEvent::MouseLeave => self.on_mouse_leave_window(),
            NativeEvent::MouseMove(point) => self.on_mouse_move(point),
            NativeEvent::MouseDown(args) => {
                self.dispatch_pointer(args.point, |events| &events.mouse_down, args)
            }
            NativeEvent::MouseUp(args) => {
                self.dispatch_pointer(args.point, |events| &events.mouse_up, args)
            }
            NativeEvent::MouseWheel(args) => {
                self.dispatch_pointer(args.point, |events| &events.mouse_wheel, args)
            }
            NativeEvent::KeyDown(args) => self.dispatch_key(|events| &events.key_down, args),
            NativeEvent::KeyUp(args) => self.dispatch_key(|events| &events.key_up, args),
            NativeEvent::Focus(gained) => self.on_window_focus(gained),
            NativeEvent::Resize(size) => {
                log::trace!(target: "perch::host", "resized to {:?}", size);
                self.schedule_relayout();
            }
            NativeEvent::Paint => self.run_repaint(),
            NativeEvent::CaptureLost => self.on_capture_lost(),
            NativeEvent::Destroy => self.on_destroy(),
        }

        self.sync();
    }

    /// Reconciles host state with changes made to the tree.
    fn sync(&mut self) {
        if self.reconcile() {
            self.notify_focus_moved();
        }

        if self.tree.render_mut().take_relayout_request() {
            self.schedule_relayout();
        }
        if self.tree.render_mut().take_repaint_request() {
            self.schedule_repaint();
        }
        self.update_cursor();
    }

    /// Moves focus, hover and capture out of subtrees that were detached or deleted since the
    /// last call. Returns true if focus moved.
    fn reconcile(&mut self) -> bool {
        let focus = self.resolve(self.focus).unwrap_or(self.root);
        let hover = self.mouse_hover.and_then(|id| self.resolve(id));
        let captured = self.captured_control();
        self.tree.take_detached();

        if self.mouse_captured.is_some() && captured.is_none() {
            log::debug!(target: "perch::host", "captured control was detached; releasing");
            self.window.release_mouse();
        }
        self.mouse_captured = captured;
        self.mouse_hover = hover;

        let moved = focus != self.focus;
        self.focus = focus;
        moved
    }

    /// Follows a stored id through the pending detach records.
    ///
    /// A control inside a detached subtree resolves to the subtree's old parent if that is still
    /// attached, and to nothing otherwise.
    fn resolve(&self, id: ControlId) -> Option<ControlId> {
        let mut current = id;
        for detached in self.tree.pending_detached() {
            if detached.subtree.contains(&current) {
                if !self.is_attached(detached.old_parent) {
                    return None;
                }
                current = detached.old_parent;
            }
        }
        if self.is_attached(current) {
            Some(current)
        } else {
            None
        }
    }

    /// Tells a control that inherited focus from a detached descendant.
    fn notify_focus_moved(&mut self) {
        let focus = self.focus;
        log::trace!(target: "perch::host", "focus fell back to {:?}", focus);
        let parent = self.tree.parent(focus);
        let args = FocusArgs { is_window: false };
        routed::dispatch(self, focus, |events| &events.gain_focus, parent, args);
    }

    fn is_attached(&self, id: ControlId) -> bool {
        self.tree.has_ancestor(id, self.root)
    }

    /// The focused control; the root if nothing else is focused.
    pub fn focus_control(&self) -> ControlId {
        self.resolve(self.focus).unwrap_or(self.root)
    }

    pub fn hover_control(&self) -> Option<ControlId> {
        self.mouse_hover.and_then(|id| self.resolve(id))
    }

    /// The control holding the mouse capture; a capture held inside a detached subtree is gone.
    pub fn captured_control(&self) -> Option<ControlId> {
        self.mouse_captured
            .filter(|id| self.resolve(*id) == Some(*id))
    }

    /// Returns true if the pointer is over the control or one of its descendants.
    pub fn is_mouse_over(&self, id: ControlId) -> bool {
        self.hover_control()
            .map_or(false, |hover| self.tree.has_ancestor(hover, id))
    }

    /// Moves focus, dispatching lose-focus and gain-focus events up to the common ancestor.
    ///
    /// `None` (or a control that is not in this host) focuses the root.
    pub fn set_focus_control(&mut self, control: Option<ControlId>) {
        let control = match control {
            Some(id) if self.is_attached(id) => id,
            Some(id) => {
                log::warn!(target: "perch::host", "{:?} is not attached; focusing the root", id);
                self.root
            }
            None => self.root,
        };
        let fell_back = self.reconcile();
        if control == self.focus {
            if fell_back {
                self.notify_focus_moved();
            }
            return;
        }

        let old = self.focus;
        self.focus = control;
        let lca = self.tree.lowest_common_ancestor(old, control);
        log::trace!(target: "perch::host", "focus {:?} -> {:?}", old, control);

        let args = FocusArgs { is_window: false };
        routed::dispatch(self, old, |events| &events.lose_focus, lca, args);
        routed::dispatch(self, control, |events| &events.gain_focus, lca, args);
        self.sync();
    }

    fn on_window_focus(&mut self, gained: bool) {
        let args = FocusArgs { is_window: true };
        let focus = self.focus;
        if gained {
            routed::dispatch(self, focus, |events| &events.gain_focus, None, args);
        } else {
            routed::dispatch(self, focus, |events| &events.lose_focus, None, args);
        }
    }

    fn dispatch_key(&mut self, selector: EventSelector<KeyArgs>, args: KeyArgs) {
        let focus = self.focus;
        routed::dispatch(self, focus, selector, None, args);
    }

    /// Dispatches leave from `old` and enter to `new`, both stopping before their common
    /// ancestor.
    fn dispatch_hover_change(&mut self, old: Option<ControlId>, new: Option<ControlId>, point: Point) {
        if old == new {
            return;
        }
        let lca = match (old, new) {
            (Some(old), Some(new)) => self.tree.lowest_common_ancestor(old, new),
            _ => None,
        };
        let args = MouseArgs { point };
        if let Some(old) = old {
            routed::dispatch(self, old, |events| &events.mouse_leave, lca, args);
        }
        if let Some(new) = new {
            routed::dispatch(self, new, |events| &events.mouse_enter, lca, args);
        }
    }

    /// The part of a hover target’s ancestry shared with the captured control.
    fn capture_relative(&self, hover: Option<ControlId>, captured: ControlId) -> Option<ControlId> {
        hover.and_then(|hover| self.tree.lowest_common_ancestor(hover, captured))
    }

    fn on_mouse_move(&mut self, point: Point) {
        let old = self.mouse_hover;
        let new = self.tree.hit_test(self.root, point);
        self.mouse_hover = new;

        let args = MouseArgs { point };
        match self.mouse_captured {
            Some(captured) => {
                // only the captured control’s ancestry sees enter/leave while captured
                let old = self.capture_relative(old, captured);
                let new = self.capture_relative(new, captured);
                self.dispatch_hover_change(old, new, point);
                routed::dispatch(self, captured, |events| &events.mouse_move, None, args);
            }
            None => {
                self.dispatch_hover_change(old, new, point);
                if let Some(new) = new {
                    routed::dispatch(self, new, |events| &events.mouse_move, None, args);
                }
            }
        }
        self.update_cursor();
    }

    fn on_mouse_leave_window(&mut self) {
        if let Some(hover) = self.mouse_hover.take() {
            let point = self.window.mouse_position();
            routed::dispatch(self, hover, |events| &events.mouse_leave, None, MouseArgs { point });
        }
        self.update_cursor();
    }

    fn dispatch_pointer<T: Clone>(&mut self, point: Point, selector: EventSelector<T>, args: T) {
        let target = match self.mouse_captured {
            Some(captured) => Some(captured),
            None => self.tree.hit_test(self.root, point),
        };
        if let Some(target) = target {
            routed::dispatch(self, target, selector, None, args);
        }
    }

    /// Starts or stops routing all pointer input to one control.
    ///
    /// `None` releases any capture and always succeeds. Capturing fails if another control holds
    /// the capture, or if the native layer refuses; capturing again for the holder is a no-op.
    pub fn capture_mouse_for(&mut self, control: Option<ControlId>) -> bool {
        self.reconcile();
        let point = self.window.mouse_position();
        match control {
            None => {
                if let Some(captured) = self.mouse_captured.take() {
                    self.window.release_mouse();
                    let effective = self.capture_relative(self.mouse_hover, captured);
                    let hover = self.mouse_hover;
                    self.dispatch_hover_change(effective, hover, point);
                }
                self.update_cursor();
                true
            }
            Some(control) => {
                if self.mouse_captured == Some(control) {
                    return true;
                }
                if let Some(captured) = self.mouse_captured {
                    log::debug!(
                        target: "perch::host",
                        "{:?} cannot capture the mouse; {:?} holds it",
                        control,
                        captured
                    );
                    return false;
                }
                if !self.is_attached(control) {
                    log::warn!(target: "perch::host", "{:?} is not attached; not capturing", control);
                    return false;
                }
                if !self.window.capture_mouse() {
                    log::warn!(target: "perch::host", "native window refused mouse capture");
                    return false;
                }

                self.mouse_captured = Some(control);
                let hover = self.mouse_hover;
                let effective = self.capture_relative(hover, control);
                self.dispatch_hover_change(hover, effective, point);
                self.update_cursor();
                true
            }
        }
    }

    fn on_capture_lost(&mut self) {
        if let Some(captured) = self.mouse_captured.take() {
            log::debug!(target: "perch::host", "capture of {:?} lost", captured);
            let point = self.window.mouse_position();
            let effective = self.capture_relative(self.mouse_hover, captured);
            let hover = self.mouse_hover;
            self.dispatch_hover_change(effective, hover, point);
        }
        self.update_cursor();
    }

    fn on_destroy(&mut self) {
        self.destroyed = true;
        for (_, timer) in self.timers.drain() {
            timer.handle.cancel();
        }
    }

    /// Sets a cursor that wins over every control’s cursor.
    pub fn set_override_cursor(&mut self, cursor: Option<Cursor>) {
        self.override_cursor = cursor;
        self.update_cursor();
    }

    /// The cursor that should currently be shown.
    pub fn effective_cursor(&self) -> Cursor {
        self.override_cursor
            .or_else(|| self.captured_control().and_then(|id| self.tree.find_cursor(id)))
            .or_else(|| self.hover_control().and_then(|id| self.tree.find_cursor(id)))
            .unwrap_or(self.context.config().default_cursor)
    }

    fn update_cursor(&mut self) {
        let cursor = self.effective_cursor();
        if self.cursor != Some(cursor) {
            self.cursor = Some(cursor);
            self.window.set_cursor(cursor);
        }
    }

    /// Requests a relayout; many requests before the next poll result in one relayout.
    pub fn schedule_relayout(&mut self) {
        if !self.relayout_scheduled {
            self.relayout_scheduled = true;
            self.post_task(Task::Relayout);
        }
    }

    /// Requests a repaint; many requests before the next poll result in one repaint.
    pub fn schedule_repaint(&mut self) {
        if !self.repaint_scheduled {
            self.repaint_scheduled = true;
            self.window.request_repaint();
            self.post_task(Task::Repaint);
        }
    }

    /// Whether a relayout is pending.
    pub fn is_layout_dirty(&self) -> bool {
        self.relayout_scheduled || self.tree.render().is_relayout_requested()
    }

    /// Runs `action` now if the layout is up to date, or right after the next relayout otherwise.
    pub fn run_after_layout_stable<F: 'static + FnOnce(&mut Host) + Send>(&mut self, action: F) {
        if self.is_layout_dirty() {
            self.after_layout.push(Box::new(action));
        } else {
            action(self);
        }
    }

    /// Runs a callback on the next poll.
    pub fn post<F: 'static + FnOnce(&mut Host) + Send>(&mut self, callback: F) {
        self.post_task(Task::Callback(Box::new(callback)));
    }

    fn post_task(&self, task: Task) {
        // the host holds a receiver, so this cannot fail
        let _ = self.task_sender.send(task);
    }

    /// Schedules a callback after `delay`, repeating if `repeat` is set.
    ///
    /// The callback runs during [`Host::poll`] after the timer service fires. Cancelling the
    /// returned handle (any number of times) stops it.
    pub fn set_timer<F>(&mut self, delay: Duration, repeat: bool, callback: F) -> TimerHandle
    where
        F: 'static + FnMut(&mut Host) + Send,
    {
        self.next_timer += 1;
        let key = self.next_timer;
        let sender = self.task_sender.clone();
        let handle = self.context.timers().schedule(
            delay,
            repeat,
            Box::new(move || {
                let _ = sender.send(Task::Timer(key));
            }),
        );

        self.timers.insert(
            key,
            HostTimer {
                handle: handle.clone(),
                repeat,
                callback: Box::new(callback),
            },
        );
        handle
    }

    fn fire_timer(&mut self, id: u64) {
        let mut timer = match self.timers.remove(&id) {
            Some(timer) => timer,
            None => return,
        };
        if timer.handle.is_cancelled() {
            return;
        }
        (timer.callback)(self);
        if timer.repeat && !timer.handle.is_cancelled() {
            self.timers.insert(id, timer);
        }
    }

    /// Measures and lays out the tree against the client size right now.
    pub fn relayout(&mut self) {
        let client = self.window.client_size();
        let bounded = client != Size::zero();
        let max = if bounded {
            MeasureSize::from(client)
        } else {
            MeasureSize::unspecified()
        };
        let min = if bounded && self.context.config().prefer_fill_window {
            max
        } else {
            MeasureSize::unspecified()
        };
        self.layout_root(MeasureRequirement::new(max, min, MeasureSize::unspecified()));
    }

    /// Resizes the window to the root’s natural size, then lays out.
    pub fn relayout_to_fit_content(&mut self) {
        let size = self.layout_root(MeasureRequirement::unbounded());
        self.window.set_client_size(size);
    }

    fn layout_root(&mut self, requirement: MeasureRequirement) -> Size {
        let render_root = match self.tree.render_object(self.root) {
            Some(id) => id,
            None => return Size::zero(),
        };
        let render = self.tree.render_mut();
        let size = render.measure(render_root, &requirement, MeasureSize::unspecified());
        render.layout(render_root, Point::origin());
        render.take_relayout_request();
        self.relayout_scheduled = false;

        self.stats.relayouts += 1;
        log::debug!(target: "perch::host", "relayout done, root size {:?}", size);
        self.schedule_repaint();

        // actions queued from here on see a clean layout and run at once
        for action in std::mem::take(&mut self.after_layout) {
            action(self);
        }
        size
    }

    /// Paints the tree right now.
    pub fn repaint(&mut self) -> Result<(), HostError> {
        let render_root = match self.tree.render_object(self.root) {
            Some(id) => id,
            None => return Ok(()),
        };
        let mut painter = self.window.begin_paint()?;
        painter.clear(Color::WHITE);
        self.tree.render().draw(render_root, &mut *painter);
        painter.end()?;
        drop(painter);

        self.stats.repaints += 1;
        Ok(())
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.handle.cancel();
        }
        if self.mouse_captured.is_some() {
            self.window.release_mouse();
        }
    }
}

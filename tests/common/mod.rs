#![allow(dead_code)]

use parking_lot::Mutex;
use perch::controls;
use perch::headless::{FixedTextFactory, HeadlessFactory};
use perch::rect::Size;
use perch::render::FlexDirection;
use perch::timer::ManualTimers;
use perch::{Context, ControlId, ControlTree, Host, MeasureSize};
use std::sync::Arc;

pub struct Fixture {
    pub host: Host,
    pub factory: HeadlessFactory,
    pub timers: Arc<ManualTimers>,
}

pub fn context(factory: &HeadlessFactory, timers: &Arc<ManualTimers>) -> Context {
    Context::new(
        Arc::new(factory.clone()),
        Arc::new(FixedTextFactory::new(10., 12.)),
        timers.clone(),
    )
}

/// Builds a 100x100 host around a tree made by `build`, which returns the root.
pub fn fixture(build: impl FnOnce(&mut ControlTree, &Context) -> ControlId) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();

    let factory = HeadlessFactory::new(Size::new(100., 100.));
    let timers = Arc::new(ManualTimers::new());
    let context = context(&factory, &timers);
    let mut tree = ControlTree::new();
    let root = build(&mut tree, &context);
    let mut host = Host::new(context, tree, root).unwrap();
    host.poll();

    Fixture {
        host,
        factory,
        timers,
    }
}

/// A row, vertically centering its children.
pub fn row(tree: &mut ControlTree) -> ControlId {
    controls::flex_layout(tree, FlexDirection::Horizontal)
}

/// A border with a fixed preferred size.
pub fn sized(tree: &mut ControlTree, width: f64, height: f64) -> ControlId {
    let id = controls::border(tree);
    set_size(tree, id, width, height);
    id
}

pub fn set_size(tree: &mut ControlTree, id: ControlId, width: f64, height: f64) {
    let render_object = tree.render_object(id).unwrap();
    tree.render_mut()
        .set_preferred_size(render_object, MeasureSize::from(Size::new(width, height)));
}

pub fn append(tree: &mut ControlTree, parent: ControlId, child: ControlId) {
    let index = tree.children(parent).len();
    tree.add_child(parent, child, index);
}

/// A shared log of what handlers saw.
#[derive(Clone)]
pub struct Log<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> Log<T> {
    pub fn new() -> Self {
        Log(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn push(&self, item: T) {
        self.0.lock().push(item);
    }

    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

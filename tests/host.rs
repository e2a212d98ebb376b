mod common;

use common::{append, context, fixture, row, set_size, sized, Log};
use perch::backend::PlatformError;
use perch::headless::{HeadlessFactory, PaintOp};
use perch::rect::Size;
use perch::timer::ManualTimers;
use perch::{controls, ControlTree, Host, HostConfig, HostError, NativeEvent};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn first_poll_lays_out_and_paints_once() {
    let mut ids = None;
    let fixture = fixture(|tree, _| {
        let root = row(tree);
        let a = sized(tree, 20., 20.);
        append(tree, root, a);
        ids = Some((root, a));
        root
    });
    let (root, a) = ids.unwrap();
    let host = &fixture.host;

    assert_eq!(host.stats().relayouts, 1);
    assert_eq!(host.stats().repaints, 1);
    let root_render = host.tree().render_object(root).unwrap();
    assert_eq!(host.tree().render().size(root_render), Size::new(100., 100.));
    let a_render = host.tree().render_object(a).unwrap();
    assert_eq!(host.tree().render().offset(a_render).y, 40.);

    assert_eq!(fixture.factory.frame_count(), 1);
    let frame = fixture.factory.last_frame().unwrap();
    assert_eq!(frame[0], PaintOp::Clear(perch::color::Color::WHITE));
}

#[test]
fn invalidations_coalesce_into_one_relayout() {
    let mut ids = None;
    let mut fixture = fixture(|tree, _| {
        let root = row(tree);
        let a = sized(tree, 20., 20.);
        let b = sized(tree, 20., 20.);
        append(tree, root, a);
        append(tree, root, b);
        ids = Some((a, b));
        root
    });
    let (a, b) = ids.unwrap();
    let host = &mut fixture.host;

    set_size(host.tree_mut(), a, 30., 20.);
    set_size(host.tree_mut(), b, 30., 20.);
    host.schedule_relayout();
    host.schedule_relayout();
    host.poll();
    assert_eq!(host.stats().relayouts, 2);
    assert_eq!(host.stats().repaints, 2);

    let b_render = host.tree().render_object(b).unwrap();
    assert_eq!(host.tree().render().offset(b_render).x, 30.);

    // nothing changed
    host.poll();
    assert_eq!(host.stats().relayouts, 2);
    assert_eq!(host.stats().repaints, 2);
}

#[test]
fn resize_events_coalesce() {
    let mut fixture = fixture(|tree, _| row(tree));
    let sender = fixture.host.event_sender();
    fixture.factory.set_client_size(Size::new(60., 40.));
    sender.send(NativeEvent::Resize(Size::new(50., 40.))).unwrap();
    sender.send(NativeEvent::Resize(Size::new(60., 40.))).unwrap();
    fixture.host.poll();

    let host = &fixture.host;
    assert_eq!(host.stats().relayouts, 2);
    let root_render = host.tree().render_object(host.root()).unwrap();
    assert_eq!(host.tree().render().size(root_render), Size::new(60., 40.));
}

#[test]
fn posted_callbacks_run_on_next_poll() {
    let mut fixture = fixture(|tree, _| row(tree));
    let log = Log::new();
    let l = log.clone();
    fixture.host.post(move |host| {
        l.push(1);
        let l = l.clone();
        host.post(move |_| l.push(2));
    });
    assert_eq!(log.len(), 0);

    fixture.host.poll();
    assert_eq!(log.take(), vec![1]);
    fixture.host.poll();
    assert_eq!(log.take(), vec![2]);
}

#[test]
fn after_layout_action_runs_at_once_when_layout_is_clean() {
    let mut fixture = fixture(|tree, _| row(tree));
    let host = &mut fixture.host;
    assert!(!host.is_layout_dirty());

    let log = Log::new();
    let l = log.clone();
    host.run_after_layout_stable(move |host| l.push(host.stats().relayouts));
    assert_eq!(log.take(), vec![1]);
}

#[test]
fn after_layout_action_waits_for_pending_relayout() {
    let mut ids = None;
    let mut fixture = fixture(|tree, _| {
        let root = row(tree);
        let a = sized(tree, 20., 20.);
        append(tree, root, a);
        ids = Some(a);
        root
    });
    let a = ids.unwrap();
    let host = &mut fixture.host;

    set_size(host.tree_mut(), a, 30., 20.);
    assert!(host.is_layout_dirty());
    let log = Log::new();
    let l = log.clone();
    host.run_after_layout_stable(move |host| {
        let render_object = host.tree().render_object(a).unwrap();
        l.push((host.stats().relayouts, host.tree().render().size(render_object)));
    });
    assert_eq!(log.len(), 0);

    host.poll();
    assert_eq!(log.take(), vec![(2, Size::new(30., 20.))]);
    assert!(!host.is_layout_dirty());
}

#[test]
fn timers_fire_through_poll_until_cancelled() {
    let mut fixture = fixture(|tree, _| row(tree));
    let ticks = Log::new();
    let t = ticks.clone();
    let handle = fixture
        .host
        .set_timer(Duration::from_millis(10), true, move |_| t.push(()));
    let once = Log::new();
    let o = once.clone();
    fixture
        .host
        .set_timer(Duration::from_millis(15), false, move |_| o.push(()));

    fixture.timers.advance(Duration::from_millis(25));
    assert_eq!(ticks.len(), 0);
    fixture.host.poll();
    assert_eq!(ticks.len(), 2);
    assert_eq!(once.len(), 1);

    handle.cancel();
    handle.cancel();
    fixture.timers.advance(Duration::from_millis(50));
    fixture.host.poll();
    assert_eq!(ticks.len(), 2);
    assert_eq!(once.len(), 1);
    assert_eq!(fixture.timers.pending(), 0);
}

#[test]
fn timer_cancelled_after_firing_does_not_run() {
    let mut fixture = fixture(|tree, _| row(tree));
    let ticks = Log::new();
    let t = ticks.clone();
    let handle = fixture
        .host
        .set_timer(Duration::from_millis(10), false, move |_| t.push(()));

    fixture.timers.advance(Duration::from_millis(10));
    handle.cancel();
    fixture.host.poll();
    assert_eq!(ticks.len(), 0);
}

#[test]
fn paint_failure_propagates() {
    let mut fixture = fixture(|tree, _| row(tree));
    fixture
        .factory
        .fail_paint(Some(PlatformError::new(7, "device lost")));

    match fixture.host.repaint() {
        Err(HostError::Platform(err)) => assert_eq!(err.code, 7),
        other => panic!("unexpected result {:?}", other),
    }

    fixture.factory.fail_paint(None);
    fixture
        .factory
        .fail_present(Some(PlatformError::new(8, "present failed")));
    match fixture.host.repaint() {
        Err(HostError::Platform(err)) => assert_eq!(err.code, 8),
        other => panic!("unexpected result {:?}", other),
    }

    fixture.factory.fail_present(None);
    assert!(fixture.host.repaint().is_ok());
}

#[test]
fn window_creation_failure_propagates() {
    let factory = HeadlessFactory::new(Size::new(100., 100.));
    factory.fail_create(Some(PlatformError::new(3, "no display")));
    let timers = Arc::new(ManualTimers::new());
    let mut tree = ControlTree::new();
    let root = controls::stack_layout(&mut tree);

    match Host::new(context(&factory, &timers), tree, root) {
        Err(HostError::Platform(err)) => assert_eq!(err.code, 3),
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}

#[test]
fn root_must_not_have_a_parent() {
    let factory = HeadlessFactory::new(Size::new(100., 100.));
    let timers = Arc::new(ManualTimers::new());
    let mut tree = ControlTree::new();
    let root = controls::stack_layout(&mut tree);
    let child = controls::stack_layout(&mut tree);
    append(&mut tree, root, child);

    match Host::new(context(&factory, &timers), tree, child) {
        Err(HostError::InvalidRoot(id)) => assert_eq!(id, child),
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
    assert_eq!(factory.windows_created(), 0);
}

#[test]
fn fit_content_resizes_window() {
    let mut fixture = fixture(|tree, _| {
        let root = row(tree);
        let a = sized(tree, 20., 10.);
        let b = sized(tree, 30., 15.);
        append(tree, root, a);
        append(tree, root, b);
        root
    });
    fixture.host.relayout_to_fit_content();
    assert_eq!(fixture.factory.client_size(), Size::new(50., 15.));
}

#[test]
fn fit_window_off_keeps_natural_size() {
    let factory = HeadlessFactory::new(Size::new(100., 100.));
    let timers = Arc::new(ManualTimers::new());
    let mut tree = ControlTree::new();
    let root = row(&mut tree);
    let a = sized(&mut tree, 20., 10.);
    append(&mut tree, root, a);

    let context = context(&factory, &timers).with_config(HostConfig {
        prefer_fill_window: false,
        ..HostConfig::default()
    });
    let mut host = Host::new(context, tree, root).unwrap();
    host.poll();
    let root_render = host.tree().render_object(root).unwrap();
    assert_eq!(host.tree().render().size(root_render), Size::new(20., 10.));
}

#[test]
fn destroyed_host_ignores_events() {
    let mut fixture = fixture(|tree, _| row(tree));
    let sender = fixture.host.event_sender();
    sender.send(NativeEvent::Destroy).unwrap();
    sender.send(NativeEvent::Resize(Size::new(10., 10.))).unwrap();
    fixture.host.poll();
    assert!(fixture.host.is_destroyed());
    assert_eq!(fixture.host.stats().relayouts, 1);
}

#[test]
fn text_is_painted_with_its_brush() {
    let fixture = fixture(|tree, context| {
        let root = row(tree);
        let text = controls::text_block(tree, context, "hi");
        append(tree, root, text);
        root
    });
    let frame = fixture.factory.last_frame().unwrap();
    assert!(frame.iter().any(|op| matches!(
        op,
        PaintOp::DrawText { text, .. } if text == "hi"
    )));
}

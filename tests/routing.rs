mod common;

use common::{append, fixture, Log};
use perch::events::{FocusArgs, KeyArgs, KeyCode, KeyModifiers};
use perch::routed::{self, EventArgs};
use perch::{controls, ControlId, Host, NativeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tunnel,
    Bubble,
    Direct,
}

struct Chain {
    root: ControlId,
    mid: ControlId,
    leaf: ControlId,
}

fn chain() -> (common::Fixture, Chain) {
    let mut ids = None;
    let fixture = fixture(|tree, _| {
        let root = controls::stack_layout(tree);
        let mid = controls::stack_layout(tree);
        let leaf = controls::border(tree);
        append(tree, root, mid);
        append(tree, mid, leaf);
        ids = Some(Chain { root, mid, leaf });
        root
    });
    (fixture, ids.unwrap())
}

fn record_key_down(host: &mut Host, ids: &[ControlId], log: &Log<(Phase, ControlId)>) {
    for &id in ids {
        let events = host.tree_mut().events_mut(id).unwrap();
        let l = log.clone();
        events
            .key_down
            .tunnel
            .add_handler(move |_, args: &mut EventArgs<KeyArgs>| l.push((Phase::Tunnel, args.sender)));
        let l = log.clone();
        events
            .key_down
            .bubble
            .add_handler(move |_, args: &mut EventArgs<KeyArgs>| l.push((Phase::Bubble, args.sender)));
        let l = log.clone();
        events
            .key_down
            .direct
            .add_handler(move |_, args: &mut EventArgs<KeyArgs>| l.push((Phase::Direct, args.sender)));
    }
}

fn key_down() -> NativeEvent {
    NativeEvent::KeyDown(KeyArgs {
        code: KeyCode::A,
        modifiers: KeyModifiers::default(),
    })
}

#[test]
fn tunnel_then_bubble_then_direct() {
    let (mut fixture, Chain { root, mid, leaf }) = chain();
    let host = &mut fixture.host;
    let log = Log::new();
    record_key_down(host, &[root, mid, leaf], &log);

    host.set_focus_control(Some(leaf));
    host.handle_native_event(key_down());

    assert_eq!(
        log.take(),
        vec![
            (Phase::Tunnel, root),
            (Phase::Tunnel, mid),
            (Phase::Tunnel, leaf),
            (Phase::Bubble, leaf),
            (Phase::Bubble, mid),
            (Phase::Bubble, root),
            (Phase::Direct, leaf),
            (Phase::Direct, mid),
            (Phase::Direct, root),
        ]
    );
}

#[test]
fn handled_tunnel_skips_rest_but_not_direct() {
    let (mut fixture, Chain { root, mid, leaf }) = chain();
    let host = &mut fixture.host;
    let log = Log::new();
    host.tree_mut()
        .events_mut(mid)
        .unwrap()
        .key_down
        .tunnel
        .add_handler(|_, args: &mut EventArgs<KeyArgs>| args.handled = true);
    record_key_down(host, &[root, mid, leaf], &log);

    let handled = routed::dispatch(
        host,
        leaf,
        |events| &events.key_down,
        None,
        KeyArgs {
            code: KeyCode::A,
            modifiers: KeyModifiers::default(),
        },
    );

    assert!(handled);
    // the mid handler that marks the event runs before the recording one
    assert_eq!(
        log.take(),
        vec![
            (Phase::Tunnel, root),
            (Phase::Direct, leaf),
            (Phase::Direct, mid),
            (Phase::Direct, root),
        ]
    );
}

#[test]
fn last_receiver_is_excluded() {
    let (mut fixture, Chain { root, mid, leaf }) = chain();
    let host = &mut fixture.host;
    let log = Log::new();
    record_key_down(host, &[root, mid, leaf], &log);

    let args = KeyArgs {
        code: KeyCode::A,
        modifiers: KeyModifiers::default(),
    };
    routed::dispatch(host, leaf, |events| &events.key_down, Some(mid), args);
    assert!(log.take().iter().all(|(_, id)| *id == leaf));

    routed::dispatch(host, leaf, |events| &events.key_down, Some(leaf), args);
    assert!(log.take().is_empty());
}

#[test]
fn deleting_controls_mid_dispatch_skips_them() {
    let (mut fixture, Chain { root, mid, leaf }) = chain();
    let host = &mut fixture.host;
    let log = Log::new();
    host.tree_mut()
        .events_mut(leaf)
        .unwrap()
        .key_down
        .bubble
        .add_handler(move |host, _: &mut EventArgs<KeyArgs>| host.tree_mut().delete(mid));
    record_key_down(host, &[root, mid, leaf], &log);

    host.set_focus_control(Some(leaf));
    host.handle_native_event(key_down());

    assert_eq!(
        log.take(),
        vec![
            (Phase::Tunnel, root),
            (Phase::Tunnel, mid),
            (Phase::Tunnel, leaf),
            // handlers already snapshotted for the leaf still run
            (Phase::Bubble, leaf),
            (Phase::Bubble, root),
            (Phase::Direct, root),
        ]
    );
    assert!(!host.tree().contains(leaf));
    // focus was inside the deleted subtree and moves to its old parent
    assert_eq!(host.focus_control(), root);
}

#[test]
fn reentrant_handler_is_skipped() {
    let (mut fixture, Chain { root, leaf, .. }) = chain();
    let host = &mut fixture.host;
    let calls = Log::new();
    let c = calls.clone();
    host.tree_mut()
        .events_mut(root)
        .unwrap()
        .key_down
        .direct
        .add_handler(move |host, args: &mut EventArgs<KeyArgs>| {
            c.push(args.original_sender);
            let data = args.data;
            routed::dispatch(host, root, |events| &events.key_down, None, data);
        });

    let args = KeyArgs {
        code: KeyCode::A,
        modifiers: KeyModifiers::default(),
    };
    routed::dispatch(host, leaf, |events| &events.key_down, None, args);
    assert_eq!(calls.take(), vec![leaf]);
}

#[test]
fn focus_moves_between_siblings_via_common_ancestor() {
    let mut ids = None;
    let mut fixture = fixture(|tree, _| {
        let root = controls::stack_layout(tree);
        let p = controls::stack_layout(tree);
        let a = controls::border(tree);
        let b = controls::border(tree);
        append(tree, root, p);
        append(tree, p, a);
        append(tree, p, b);
        ids = Some((root, p, a, b));
        root
    });
    let (root, p, a, b) = ids.unwrap();
    let host = &mut fixture.host;
    assert_eq!(host.focus_control(), root);

    let log = Log::new();
    for id in [root, p, a, b] {
        let events = host.tree_mut().events_mut(id).unwrap();
        let l = log.clone();
        events
            .gain_focus
            .direct
            .add_handler(move |_, args: &mut EventArgs<FocusArgs>| {
                l.push(("gain", args.sender, args.data.is_window))
            });
        let l = log.clone();
        events
            .lose_focus
            .direct
            .add_handler(move |_, args: &mut EventArgs<FocusArgs>| {
                l.push(("lose", args.sender, args.data.is_window))
            });
    }

    host.set_focus_control(Some(a));
    assert_eq!(log.take(), vec![("gain", a, false), ("gain", p, false)]);

    host.set_focus_control(Some(b));
    assert_eq!(log.take(), vec![("lose", a, false), ("gain", b, false)]);

    host.set_focus_control(Some(b));
    assert!(log.take().is_empty());

    host.handle_native_event(NativeEvent::Focus(false));
    assert_eq!(
        log.take(),
        vec![("lose", b, true), ("lose", p, true), ("lose", root, true)]
    );

    host.set_focus_control(None);
    assert_eq!(host.focus_control(), root);
    assert_eq!(log.take(), vec![("lose", b, false), ("lose", p, false)]);
}

fn record_gain_focus(host: &mut Host, ids: &[ControlId], log: &Log<(ControlId, bool)>) {
    for &id in ids {
        let l = log.clone();
        host.tree_mut()
            .events_mut(id)
            .unwrap()
            .gain_focus
            .direct
            .add_handler(move |_, args: &mut EventArgs<FocusArgs>| {
                l.push((args.sender, args.data.is_window))
            });
    }
}

#[test]
fn focus_change_after_deleting_focused_control_in_handler() {
    let mut ids = None;
    let mut fixture = fixture(|tree, _| {
        let root = controls::stack_layout(tree);
        let p = controls::stack_layout(tree);
        let a = controls::border(tree);
        let b = controls::border(tree);
        append(tree, root, p);
        append(tree, p, a);
        append(tree, p, b);
        ids = Some((root, p, a, b));
        root
    });
    let (root, p, a, b) = ids.unwrap();
    let host = &mut fixture.host;
    host.set_focus_control(Some(a));

    let gains = Log::new();
    record_gain_focus(host, &[root, p, a, b], &gains);
    let seen = Log::new();
    let s = seen.clone();
    host.tree_mut()
        .events_mut(a)
        .unwrap()
        .key_down
        .direct
        .add_handler(move |host, _: &mut EventArgs<KeyArgs>| {
            host.tree_mut().delete(a);
            s.push(host.focus_control());
            host.set_focus_control(Some(b));
            s.push(host.focus_control());
        });

    host.handle_native_event(key_down());

    // focus left the deleted control for its parent, so only b is new
    assert_eq!(seen.take(), vec![p, b]);
    assert_eq!(gains.take(), vec![(b, false)]);
    assert_eq!(host.focus_control(), b);
}

#[test]
fn focus_falling_back_to_parent_raises_gain_focus() {
    let (mut fixture, Chain { root, mid, leaf }) = chain();
    let host = &mut fixture.host;
    host.set_focus_control(Some(leaf));

    let gains = Log::new();
    record_gain_focus(host, &[root, mid, leaf], &gains);
    host.tree_mut().delete(mid);
    host.poll();

    assert_eq!(host.focus_control(), root);
    assert_eq!(gains.take(), vec![(root, false)]);
}

#[test]
fn deleting_a_control_queued_for_direct_phase_skips_it() {
    let mut ids = None;
    let mut fixture = fixture(|tree, _| {
        let root = controls::stack_layout(tree);
        let mid = controls::stack_layout(tree);
        let leaf = controls::border(tree);
        let other = controls::border(tree);
        append(tree, root, mid);
        append(tree, mid, leaf);
        append(tree, root, other);
        ids = Some((root, mid, leaf, other));
        root
    });
    let (root, mid, leaf, other) = ids.unwrap();
    let host = &mut fixture.host;
    let log = Log::new();
    host.tree_mut()
        .events_mut(leaf)
        .unwrap()
        .key_down
        .direct
        .add_handler(move |host, _: &mut EventArgs<KeyArgs>| {
            host.tree_mut().delete(other);
            host.tree_mut().delete(mid);
        });
    record_key_down(host, &[root, mid, leaf, other], &log);

    let args = KeyArgs {
        code: KeyCode::A,
        modifiers: KeyModifiers::default(),
    };
    routed::dispatch(host, leaf, |events| &events.key_down, None, args);

    assert_eq!(
        log.take(),
        vec![
            (Phase::Tunnel, root),
            (Phase::Tunnel, mid),
            (Phase::Tunnel, leaf),
            (Phase::Bubble, leaf),
            (Phase::Bubble, mid),
            (Phase::Bubble, root),
            (Phase::Direct, leaf),
            (Phase::Direct, root),
        ]
    );
    assert!(!host.tree().contains(other));
    assert_eq!(host.tree().children(root), &[] as &[ControlId]);
}

//! End-to-end focus navigation scenarios.

use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use termstage::input::Direction;
use termstage::widget::{
    ChildId, EventResult, FocusStatus, NavState, Navigator, Panel, Widget, WidgetCore, WidgetExt,
};
use termstage::{Error, Event, Key};

struct Button {
    core: WidgetCore,
    presses: Arc<AtomicUsize>,
}

impl Button {
    fn new(x: i32, y: i32) -> Self {
        Self {
            core: WidgetCore::new(x, y, 4, 1),
            presses: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn on_event(&mut self, event: &Event) -> EventResult {
        if event.is(Key::Char('p')) {
            self.presses.fetch_add(1, Ordering::SeqCst);
            EventResult::Handled
        } else {
            EventResult::NotHandled
        }
    }
}

fn status(nav: &Navigator, id: ChildId) -> FocusStatus {
    nav.child(id).unwrap().core().status()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn down_moves_hover_and_stops_at_the_edge() {
    let mut nav = Navigator::new();
    let a = nav.add(Button::new(0, 0));
    let b = nav.add(Button::new(0, 1));
    nav.add_connection(a, b, "D").unwrap();
    nav.select(a).unwrap();
    assert_eq!(status(&nav, a), FocusStatus::Hovered);

    assert_eq!(nav.handle_event(&Event::key(Key::Down)), EventResult::Handled);
    assert_eq!(status(&nav, a), FocusStatus::Outlined);
    assert_eq!(status(&nav, b), FocusStatus::Hovered);

    nav.handle_event(&Event::key(Key::Down));
    assert_eq!(nav.current(), Some(b));
    assert_eq!(status(&nav, a), FocusStatus::Outlined);
    assert_eq!(status(&nav, b), FocusStatus::Hovered);
}

#[test]
fn activate_then_back_on_a_leaf() {
    let mut nav = Navigator::new();
    let w = nav.add(Button::new(0, 0));
    nav.select(w).unwrap();

    assert_eq!(nav.handle_event(&Event::key(Key::Return)), EventResult::Handled);
    assert_eq!(nav.state(), NavState::Delegating);
    assert_eq!(status(&nav, w), FocusStatus::Selected);

    assert_eq!(nav.handle_event(&Event::key(Key::Escape)), EventResult::Handled);
    assert_eq!(nav.state(), NavState::Selecting);
    assert_eq!(status(&nav, w), FocusStatus::Hovered);
}

#[test]
fn leaf_returns_exit_on_back() {
    let mut w = Button::new(0, 0);
    w.enter();
    assert_eq!(w.core().status(), FocusStatus::Selected);
    assert_eq!(w.handle_event(&Event::key(Key::Escape)), EventResult::Exit);
    w.exit();
    assert_eq!(w.core().status(), FocusStatus::Hovered);
}

#[test]
fn delegated_events_reach_the_child() {
    let mut nav = Navigator::new();
    let button = Button::new(0, 0);
    let presses = Arc::clone(&button.presses);
    let id = nav.add(button);
    nav.select(id).unwrap();

    // Not delegating yet: swallowed.
    nav.handle_event(&Event::char('p'));
    assert_eq!(presses.load(Ordering::SeqCst), 0);

    nav.handle_event(&Event::char(' '));
    assert_eq!(nav.handle_event(&Event::char('p')), EventResult::Handled);
    assert_eq!(nav.handle_event(&Event::char('q')), EventResult::NotHandled);
    assert_eq!(presses.load(Ordering::SeqCst), 1);
}

#[test]
fn nested_panels_unwind_one_level_per_back() {
    let mut inner = Panel::new(0, 0, 8, 2);
    let x = inner.navigator().add(Button::new(0, 0));
    let y = inner.navigator().add(Button::new(0, 1));
    inner.navigator().connect(x, y, Direction::Down).unwrap();
    inner.navigator().set_current(x).unwrap();

    let mut outer = Navigator::new();
    let group = outer.add(inner);
    outer.select(group).unwrap();

    outer.handle_event(&Event::key(Key::Return));
    assert_eq!(status(&outer, group), FocusStatus::Selected);
    let inner_nav = outer.child(group).unwrap().core().navigator().unwrap();
    assert_eq!(status(inner_nav, x), FocusStatus::Hovered);

    outer.handle_event(&Event::key(Key::Down));
    let inner_nav = outer.child(group).unwrap().core().navigator().unwrap();
    assert_eq!(inner_nav.current(), Some(y));

    // Inner navigator exits, outer takes focus back.
    assert_eq!(outer.handle_event(&Event::key(Key::Escape)), EventResult::Handled);
    assert_eq!(outer.state(), NavState::Selecting);
    assert_eq!(status(&outer, group), FocusStatus::Hovered);
    let inner_nav = outer.child(group).unwrap().core().navigator().unwrap();
    assert_eq!(status(inner_nav, y), FocusStatus::Outlined);

    assert_eq!(outer.handle_event(&Event::key(Key::Escape)), EventResult::Exit);
}

// ============================================================================
// Graph properties
// ============================================================================

#[test]
fn connections_are_mirrored() {
    let mut nav = Navigator::new();
    let ids: Vec<_> = (0..4).map(|i| nav.add(Button::new(0, i))).collect();
    for pair in ids.windows(2) {
        nav.add_connection(pair[0], pair[1], "D").unwrap();
    }
    nav.add_connection(ids[3], ids[0], "R").unwrap();

    for &id in &ids {
        for dir in Direction::ALL {
            if let Some(other) = nav.neighbor(id, dir) {
                assert_eq!(nav.neighbor(other, dir.opposite()), Some(id));
            }
        }
    }
}

#[test]
fn invalid_direction_is_an_error() {
    let mut nav = Navigator::new();
    let a = nav.add(Button::new(0, 0));
    let b = nav.add(Button::new(0, 1));
    for symbol in ["", "up", "d", "UD", "Z"] {
        let err = nav.add_connection(a, b, symbol).unwrap_err();
        assert!(matches!(err, Error::InvalidDirection(_)), "{symbol:?}");
    }
    assert_eq!(nav.neighbor(a, Direction::Down), None);
}

#[test]
fn hotkey_wins_over_edge() {
    let mut nav = Navigator::new();
    let a = nav.add(Button::new(0, 0));
    let b = nav.add(Button::new(0, 1));
    let c = nav.add(Button::new(0, 2));
    nav.connect(a, b, Direction::Right).unwrap();
    nav.add_hotkey(Key::Char('f'), c).unwrap();
    nav.select(a).unwrap();

    // 'f' is also the secondary "right" binding.
    nav.handle_event(&Event::char('f'));
    assert_eq!(nav.current(), Some(c));
    assert_eq!(status(&nav, b), FocusStatus::Outlined);
    assert_eq!(status(&nav, c), FocusStatus::Hovered);
}

// ============================================================================
// Focus completeness
// ============================================================================

fn key_strategy() -> impl Strategy<Value = Key> {
    prop::sample::select(vec![
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Return,
        Key::Space,
        Key::Escape,
        Key::Tab,
        Key::Char('1'),
        Key::Char('x'),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn at_most_the_current_child_is_focused(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let mut nav = Navigator::new();
        let ids: Vec<_> = (0..4).map(|i| nav.add(Button::new(0, i))).collect();
        nav.connect(ids[0], ids[1], Direction::Down).unwrap();
        nav.connect(ids[1], ids[2], Direction::Right).unwrap();
        nav.connect(ids[2], ids[3], Direction::Up).unwrap();
        nav.add_hotkey(Key::Char('1'), ids[3]).unwrap();
        nav.select(ids[0]).unwrap();

        for key in keys {
            let result = nav.handle_event(&Event::key(key));
            let current = nav.current().unwrap();

            for &id in &ids {
                if id != current {
                    prop_assert_eq!(status(&nav, id), FocusStatus::Outlined);
                }
            }
            let expected = match (nav.state(), result) {
                (NavState::Delegating, _) => FocusStatus::Selected,
                (NavState::Selecting, EventResult::Exit) => FocusStatus::Outlined,
                (NavState::Selecting, _) => FocusStatus::Hovered,
            };
            prop_assert_eq!(status(&nav, current), expected);

            // After leaving with back, re-hover the way a parent would.
            if result == EventResult::Exit {
                nav.hover_current();
            }
        }
    }
}

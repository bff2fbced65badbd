use insta::assert_snapshot;
use smithay::utils::Point;

use super::*;
use crate::handlers::SurfaceCommit;
use crate::input::constraint::{ConstraintKind, PointerConstraint};
use crate::input::cursor::CursorMode;
use crate::input::{BTN_LEFT, BTN_RIGHT};
use crate::protocols::{ButtonState, WireEvent};
use crate::utils::rect_from_coords;
use crate::view::{TileDirection, ViewState};

fn suggested(f: &mut Fixture) -> Option<(ViewState, TileDirection)> {
    f.compositor()
        .seat
        .cursor
        .suggestion()
        .map(|s| (s.state, s.tile_direction))
}

fn configure_sizes(f: &Fixture, window: crate::backend::headless::Window) -> String {
    f.headless
        .configures(window)
        .iter()
        .map(|size| format!("{}x{}", size.w, size.h))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Presses meta and the left button over the center of a 640x480 window.
fn start_meta_drag(f: &mut Fixture) {
    f.pointer_to(640., 360.);
    f.meta(true);
    f.button(BTN_LEFT, ButtonState::Pressed);
}

#[test]
fn meta_drag_moves_view() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    start_meta_drag(&mut f);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Move);

    f.pointer_to(700., 400.);
    assert_eq!(f.view_box(window), rect_from_coords(380, 160, 640, 480));
    assert_eq!(suggested(&mut f), None);

    f.button(BTN_LEFT, ButtonState::Released);
    f.meta(false);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Passthrough);
    assert_eq!(f.view(window).state(), ViewState::Floating);
    assert_eq!(f.view_box(window), rect_from_coords(380, 160, 640, 480));
}

#[test]
fn drag_to_top_edge_maximizes() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    start_meta_drag(&mut f);
    f.pointer_to(640., 10.);
    assert_eq!(
        suggested(&mut f),
        Some((ViewState::Maximized, TileDirection::Left))
    );
    assert_eq!(f.view(window).blings().len(), 1);

    // Nothing changes until the button is released.
    assert_eq!(f.view(window).state(), ViewState::Floating);

    f.button(BTN_LEFT, ButtonState::Released);
    assert_eq!(suggested(&mut f), None);
    assert!(f.view(window).blings().is_empty());
    assert!(f.view(window).is_maximized());
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
    assert_snapshot!(configure_sizes(&f, window), @"0x0 0x0 1280x720");
}

#[test]
fn drag_to_side_edges_tiles() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    start_meta_drag(&mut f);
    f.pointer_to(1275., 360.);
    assert_eq!(
        suggested(&mut f),
        Some((ViewState::Tiled, TileDirection::Right))
    );
    f.button(BTN_LEFT, ButtonState::Released);
    assert_eq!(f.view_box(window), rect_from_coords(640, 0, 640, 720));

    start_meta_drag(&mut f);
    f.pointer_to(5., 360.);
    assert_eq!(
        suggested(&mut f),
        Some((ViewState::Tiled, TileDirection::Left))
    );
    f.button(BTN_LEFT, ButtonState::Released);
    assert_eq!(f.view(window).tile_direction(), TileDirection::Left);
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 640, 720));
}

#[test]
fn leaving_edge_drops_suggestion() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    start_meta_drag(&mut f);
    f.pointer_to(640., 10.);
    assert!(suggested(&mut f).is_some());

    f.pointer_to(640., 300.);
    assert_eq!(suggested(&mut f), None);
    assert!(f.view(window).blings().is_empty());

    f.button(BTN_LEFT, ButtonState::Released);
    assert_eq!(f.view(window).state(), ViewState::Floating);
    assert_eq!(f.view_box(window), rect_from_coords(320, 60, 640, 480));
}

#[test]
fn dragging_maximized_view_restores_it() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));
    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();

    start_meta_drag(&mut f);
    f.pointer_to(640., 400.);
    assert_eq!(f.view(window).state(), ViewState::Floating);
    assert_eq!(f.view_box(window), rect_from_coords(320, 160, 640, 480));

    f.button(BTN_LEFT, ButtonState::Released);
    assert_snapshot!(configure_sizes(&f, window), @"0x0 0x0 1280x720 640x480");
}

#[test]
fn press_without_meta_only_focuses() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let bottom = f.add_window((640, 480));
    let _top = f.add_window((200, 100));

    // Over the bottom window only.
    f.pointer_to(400., 150.);
    f.button(BTN_LEFT, ButtonState::Pressed);
    assert_eq!(f.compositor().seat.focused_view(), Some(bottom.view));
    assert_eq!(f.compositor().stack.first(), Some(&bottom.view));
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Passthrough);
    f.button(BTN_LEFT, ButtonState::Released);
}

#[test]
fn meta_right_drag_resizes() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    // Bottom right quarter of the window.
    f.pointer_to(900., 500.);
    f.meta(true);
    f.button(BTN_RIGHT, ButtonState::Pressed);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Resize);

    f.pointer_to(1000., 550.);
    f.button(BTN_RIGHT, ButtonState::Released);
    f.meta(false);

    assert_eq!(f.view_box(window), rect_from_coords(320, 120, 740, 530));
}

#[test]
fn touch_drag_to_top_edge_maximizes() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.touch_down(0, 640., 360.);
    assert_eq!(f.compositor().seat.touch_id, Some(0));

    // A client-side titlebar asks for a move.
    f.compositor().xdg_request_move(window.view);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Move);

    f.touch_motion(0, 640., 10.);
    assert_eq!(
        suggested(&mut f),
        Some((ViewState::Maximized, TileDirection::Left))
    );

    f.touch_up(0);
    assert_eq!(f.compositor().seat.touch_id, None);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Passthrough);
    assert!(f.view(window).is_maximized());
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
}

#[test]
fn second_finger_doesnt_drive_cursor() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let _window = f.add_window((640, 480));

    f.touch_down(0, 640., 360.);
    f.touch_down(1, 700., 400.);
    assert_eq!(f.compositor().seat.touch_id, Some(0));
    assert_eq!(f.compositor().seat.cursor.touch_points().len(), 2);

    f.touch_up(0);
    assert_eq!(f.compositor().seat.touch_id, None);
    assert_eq!(f.compositor().seat.cursor.touch_points().len(), 1);
    f.touch_up(1);
    assert!(f.compositor().seat.cursor.touch_points().is_empty());
}

#[test]
fn view_destroyed_mid_move_ends_grab() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    start_meta_drag(&mut f);
    f.pointer_to(640., 10.);
    assert!(suggested(&mut f).is_some());

    f.headless.close_window(window);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Passthrough);
    assert_eq!(suggested(&mut f), None);
    assert_eq!(f.compositor().seat.focused_view(), None);

    f.pointer_to(700., 400.);
    f.button(BTN_LEFT, ButtonState::Released);
    f.meta(false);
    assert_eq!(f.compositor().seat.cursor.mode(), CursorMode::Passthrough);
}

fn constraint_activations(f: &Fixture, surface: crate::surface::SurfaceId) -> usize {
    f.headless
        .events()
        .iter()
        .filter(|e| matches!(e, WireEvent::ConstraintActivated { surface: s } if *s == surface))
        .count()
}

#[test]
fn confined_pointer_warps_into_region() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    // The window sits at (320, 120); this is (10, 10) inside it.
    f.pointer_to(330., 130.);
    assert_eq!(f.compositor().seat.pointer_focus(), Some(window.surface));

    let region = vec![rect_from_coords(100, 100, 200, 100)];
    f.compositor().add_pointer_constraint(PointerConstraint::new(
        window.surface,
        ConstraintKind::Confined,
        Some(region),
    ));
    f.dispatch();

    assert_eq!(constraint_activations(&f, window.surface), 1);
    assert_eq!(
        f.compositor().seat.cursor.active_constraint(),
        Some(window.surface)
    );
    // Center of the first rectangle.
    assert_eq!(f.compositor().seat.cursor.position(), Point::from((520., 270.)));

    // Stops at the right edge of the region.
    f.pointer_move(500., 0.);
    let pos = f.compositor().seat.cursor.position();
    assert!(619. < pos.x && pos.x < 620., "{pos:?}");
    assert_eq!(pos.y, 270.);

    // Motion along the edge still works.
    f.pointer_move(0., -20.);
    let pos = f.compositor().seat.cursor.position();
    assert!(619. < pos.x && pos.x < 620., "{pos:?}");
    assert_eq!(pos.y, 250.);
}

#[test]
fn locked_pointer_doesnt_move() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.pointer_to(400., 300.);
    f.compositor().add_pointer_constraint(PointerConstraint::new(
        window.surface,
        ConstraintKind::Locked,
        None,
    ));
    f.dispatch();
    assert_eq!(constraint_activations(&f, window.surface), 1);
    f.headless.clear_events();

    f.pointer_move(50., 50.);
    f.pointer_to(900., 600.);
    assert_eq!(f.compositor().seat.cursor.position(), Point::from((400., 300.)));

    // The client still gets relative motion.
    assert!(f.headless.events().iter().any(|e| matches!(
        e,
        WireEvent::RelativeMotion { surface, .. } if *surface == window.surface
    )));

    f.compositor().remove_pointer_constraint(window.surface);
    f.dispatch();
    assert!(f.headless.events().iter().any(|e| matches!(
        e,
        WireEvent::ConstraintDeactivated { surface } if *surface == window.surface
    )));
    f.pointer_move(50., 50.);
    assert_eq!(f.compositor().seat.cursor.position(), Point::from((450., 350.)));
}

#[test]
fn constraint_is_rechecked_on_commit() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.pointer_to(520., 270.);
    let region = vec![rect_from_coords(100, 100, 200, 100)];
    f.compositor().add_pointer_constraint(PointerConstraint::new(
        window.surface,
        ConstraintKind::Confined,
        Some(region),
    ));
    f.dispatch();
    // Already inside the region, no warp.
    assert_eq!(f.compositor().seat.cursor.position(), Point::from((520., 270.)));

    // The region now starts to the right of the cursor.
    f.compositor().view_move(window.view, 450., 120.);
    f.compositor()
        .surface_commit(window.surface, SurfaceCommit::default());
    f.dispatch();

    assert_eq!(constraint_activations(&f, window.surface), 2);
    assert_eq!(f.compositor().seat.cursor.position(), Point::from((650., 270.)));
    assert_eq!(
        f.compositor().seat.cursor.active_constraint(),
        Some(window.surface)
    );
}

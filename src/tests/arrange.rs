use smithay::utils::Size;

use super::*;
use crate::handlers::{BufferAssignment, SurfaceCommit};
use crate::output::Direction;
use crate::protocols::{ToplevelStates, WireEvent};
use crate::surface::ClientId;
use crate::utils::rect_from_coords;
use crate::view::{TileDirection, ViewError, ViewState};

#[test]
fn maximize_and_restore() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    assert_eq!(f.view(window).state(), ViewState::Maximized);
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
    assert_eq!(f.view(window).saved(), rect_from_coords(320, 120, 640, 480));
    assert_eq!(
        f.headless.configures(window).last(),
        Some(&Size::from((1280, 720)))
    );

    f.compositor().restore_view(window.view);
    f.dispatch();
    assert_eq!(f.view(window).state(), ViewState::Floating);
    assert_eq!(f.view_box(window), rect_from_coords(320, 120, 640, 480));
}

#[test]
fn tile_to_either_half() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.compositor()
        .tile_view(window.view, TileDirection::Left, None)
        .unwrap();
    f.dispatch();
    assert!(f.view(window).is_tiled());
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 640, 720));

    f.compositor()
        .tile_view(window.view, TileDirection::Right, None)
        .unwrap();
    f.dispatch();
    assert_eq!(f.view(window).tile_direction(), TileDirection::Right);
    assert_eq!(f.view_box(window), rect_from_coords(640, 0, 640, 720));

    // Saved while floating, not while tiled.
    f.compositor().restore_view(window.view);
    f.dispatch();
    assert_eq!(f.view_box(window), rect_from_coords(320, 120, 640, 480));
}

#[test]
fn fullscreen_covers_output() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.compositor()
        .set_view_fullscreen(window.view, true, None)
        .unwrap();
    f.dispatch();
    assert!(f.view(window).is_fullscreen());
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
    let fullscreen = f.compositor().outputs.get(output).unwrap().fullscreen_view();
    assert_eq!(fullscreen, Some(window.view));

    f.compositor()
        .set_view_fullscreen(window.view, false, None)
        .unwrap();
    f.dispatch();
    assert!(!f.view(window).is_fullscreen());
    assert_eq!(f.view_box(window), rect_from_coords(320, 120, 640, 480));
    let fullscreen = f.compositor().outputs.get(output).unwrap().fullscreen_view();
    assert_eq!(fullscreen, None);
}

#[test]
fn unfullscreen_goes_back_to_maximized() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    f.compositor()
        .set_view_fullscreen(window.view, true, None)
        .unwrap();
    f.dispatch();

    // Fullscreen views can't be maximized or tiled.
    f.compositor()
        .tile_view(window.view, TileDirection::Left, None)
        .unwrap();
    f.dispatch();
    assert_eq!(f.view(window).state(), ViewState::Maximized);

    f.compositor()
        .set_view_fullscreen(window.view, false, None)
        .unwrap();
    f.dispatch();
    assert!(f.view(window).is_maximized());
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
}

#[test]
fn maximizing_twice_is_a_noop() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    let configures = f.headless.configures(window).len();
    f.compositor().outputs.get_mut(output).unwrap().take_damage();

    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    assert_eq!(f.headless.configures(window).len(), configures);
    assert!(!f.compositor().outputs.get(output).unwrap().has_damage());
}

#[test]
fn arranging_without_output_changes_nothing() {
    let mut f = Fixture::new();
    let window = f.add_window((640, 480));
    let before = f.view_box(window);

    let comp = f.compositor();
    assert_eq!(
        comp.maximize_view(window.view, None),
        Err(ViewError::NoOutput)
    );
    assert_eq!(
        comp.tile_view(window.view, TileDirection::Left, None),
        Err(ViewError::NoOutput)
    );
    assert_eq!(
        comp.set_view_fullscreen(window.view, true, None),
        Err(ViewError::NoOutput)
    );
    f.dispatch();

    let view = f.view(window);
    assert!(view.is_floating());
    assert!(!view.is_fullscreen());
    assert_eq!(view.get_box(), before);
    let states = f.last_states(window);
    assert!(!states.intersects(ToplevelStates::MAXIMIZED | ToplevelStates::FULLSCREEN));
    assert!(!states.intersects(ToplevelStates::TILED));
}

#[test]
fn fullscreen_slot_evicts_previous_view() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let first = f.add_window((640, 480));
    f.compositor()
        .set_view_fullscreen(first.view, true, None)
        .unwrap();
    f.dispatch();
    assert!(f.last_states(first).contains(ToplevelStates::FULLSCREEN));

    // Toplevels may ask for fullscreen before they are mapped.
    let comp = f.compositor();
    let surface = comp.new_surface(ClientId::next());
    let second = comp.new_xdg_toplevel(surface, false);
    comp.set_view_fullscreen(second, true, None).unwrap();
    f.dispatch();

    let out = f.compositor().outputs.get(output).unwrap();
    assert_eq!(out.fullscreen_view(), Some(second));
    assert!(!f.view(first).is_fullscreen());
    assert!(!f.last_states(first).contains(ToplevelStates::FULLSCREEN));
    assert_eq!(f.view_box(first), rect_from_coords(320, 120, 640, 480));

    // Nothing left to undo.
    f.compositor()
        .set_view_fullscreen(first.view, false, None)
        .unwrap();
    f.dispatch();
    assert_eq!(f.view_box(first), rect_from_coords(320, 120, 640, 480));
}

#[test]
fn removing_fullscreen_output_unfullscreens() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let right = f.add_output(2, (1280, 720));
    let window = f.add_window((640, 480));
    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    f.compositor()
        .set_view_fullscreen(window.view, true, Some(right))
        .unwrap();
    f.dispatch();
    assert_eq!(f.view_box(window), rect_from_coords(1280, 0, 1280, 720));

    f.compositor().remove_output(right);
    f.dispatch();
    assert!(!f.view(window).is_fullscreen());
    assert!(!f.last_states(window).contains(ToplevelStates::FULLSCREEN));
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
}

#[test]
fn removing_other_output_doesnt_reenter() {
    let mut f = Fixture::new();
    let left = f.add_output(1, (1280, 720));
    let right = f.add_output(2, (1280, 720));
    let window = f.add_window((640, 480));

    let enters = |f: &Fixture| {
        f.headless
            .events()
            .iter()
            .filter(|event| {
                matches!(event, WireEvent::SurfaceEnter { surface, .. } if *surface == window.surface)
            })
            .count()
    };
    assert_eq!(enters(&f), 1);
    assert_eq!(f.view(window).outputs(), &[left]);

    f.headless.clear_events();
    f.compositor().remove_output(right);
    f.dispatch();
    assert_eq!(enters(&f), 0);
    assert_eq!(f.view(window).outputs(), &[left]);

    // Straddling both outputs enters the second one only.
    let right = f.add_output(2, (1280, 720));
    f.compositor().view_move(window.view, 1000., 120.);
    f.dispatch();
    assert_eq!(enters(&f), 1);
    assert_eq!(f.view(window).outputs(), &[left, right]);

    // Unmapping forgets the outputs so that the next map enters again.
    f.compositor().surface_commit(
        window.surface,
        SurfaceCommit {
            buffer: BufferAssignment::Removed,
            ..SurfaceCommit::default()
        },
    );
    assert!(f.view(window).outputs().is_empty());
}

#[test]
fn unfocused_view_cant_fullscreen() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let first = f.add_window((640, 480));
    let _second = f.add_window((640, 480));

    f.compositor().set_view_fullscreen(first.view, true, None).unwrap();
    f.dispatch();
    assert!(!f.view(first).is_fullscreen());
}

#[test]
fn move_to_next_output() {
    let mut f = Fixture::new();
    let left = f.add_output(1, (1280, 720));
    let right = f.add_output(2, (1920, 1080));
    let window = f.add_window((640, 480));
    assert_eq!(f.compositor().view_output(window.view), Some(left));

    let moved = f
        .compositor()
        .view_move_to_next_output(window.view, Direction::Right);
    f.dispatch();
    assert!(moved);
    assert_eq!(f.compositor().view_output(window.view), Some(right));
    assert_eq!(f.view_box(window), rect_from_coords(1920, 300, 640, 480));

    // Nothing further right.
    let moved = f
        .compositor()
        .view_move_to_next_output(window.view, Direction::Right);
    assert!(!moved);
}

#[test]
fn maximized_view_follows_to_next_output() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    f.add_output(2, (1920, 1080));
    let window = f.add_window((640, 480));

    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    f.compositor()
        .view_move_to_next_output(window.view, Direction::Right);
    f.dispatch();
    assert_eq!(f.view_box(window), rect_from_coords(1280, 0, 1920, 1080));
}

#[test]
fn parent_cycles_are_refused() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let a = f.add_window((640, 480));
    let b = f.add_window((320, 240));
    let c = f.add_window((160, 120));

    let comp = f.compositor();
    assert_eq!(comp.set_view_parent(b.view, Some(a.view)), Ok(()));
    assert_eq!(comp.set_view_parent(c.view, Some(b.view)), Ok(()));
    assert_eq!(
        comp.set_view_parent(a.view, Some(c.view)),
        Err(ViewError::ParentCycle)
    );
    assert_eq!(
        comp.set_view_parent(a.view, Some(a.view)),
        Err(ViewError::ParentCycle)
    );
    assert_eq!(comp.views.get(a.view).unwrap().parent(), None);
    assert_eq!(comp.views.get(a.view).unwrap().children(), &[b.view]);
}

#[test]
fn raising_parent_raises_children_above_it() {
    let mut f = Fixture::new();
    f.add_output(1, (1280, 720));
    let parent = f.add_window((640, 480));
    let child = f.add_window((320, 240));
    let other = f.add_window((320, 240));
    f.compositor()
        .set_view_parent(child.view, Some(parent.view))
        .unwrap();

    f.compositor().seat_set_focus_view(Some(parent.view));
    assert_eq!(
        f.compositor().stack,
        vec![child.view, parent.view, other.view]
    );
}

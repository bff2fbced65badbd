use pretty_assertions::assert_eq;

use super::*;
use crate::handlers::{BufferAssignment, SurfaceCommit};
use crate::input::BTN_LEFT;
use crate::ipc::Geometry;
use crate::layer::draggable::{DragMode, DragState, DraggableLayer};
use crate::layer::{Anchor, Layer, LayerState};
use crate::protocols::{ButtonState, Delivery, WireEvent};
use crate::surface::{ClientId, SurfaceId};
use crate::utils::rect_from_coords;

#[test]
fn top_bar_reserves_space() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let bar = f.add_top_bar(output, 32);

    let layer = f.compositor().layers.get(bar).unwrap();
    assert!(layer.is_mapped());
    assert_eq!(layer.geometry(), rect_from_coords(0, 0, 1280, 32));

    let out = f.compositor().outputs.get(output).unwrap();
    assert_eq!(out.usable_area(), rect_from_coords(0, 32, 1280, 688));
}

#[test]
fn new_window_centers_in_usable_area() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    f.add_top_bar(output, 32);
    let window = f.add_window((640, 480));

    assert_eq!(f.view_box(window), rect_from_coords(320, 136, 640, 480));
}

#[test]
fn maximized_window_follows_usable_area() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));
    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));

    let bar = f.add_top_bar(output, 32);
    assert_eq!(f.view_box(window), rect_from_coords(0, 32, 1280, 688));

    f.compositor().layer_surface_destroy(bar);
    f.dispatch();
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));
}

#[test]
fn second_output_is_unaffected() {
    let mut f = Fixture::new();
    let first = f.add_output(1, (1280, 720));
    let second = f.add_output(2, (1280, 720));
    f.add_top_bar(first, 32);

    let out = f.compositor().outputs.get(second).unwrap();
    assert_eq!(out.usable_area(), rect_from_coords(0, 0, 1280, 720));
    assert_eq!(
        out.usable_area_in_layout(),
        rect_from_coords(1280, 0, 1280, 720)
    );
}

#[test]
fn layer_surface_without_output_is_closed() {
    let mut f = Fixture::new();
    let layer = f.headless.add_layer(
        None,
        Layer::Top,
        "bar",
        LayerState::default(),
        (100, 100),
    );
    assert_eq!(layer, None);
    assert!(f.compositor().layers.is_empty());
}

#[test]
fn keyboard_interactive_overlay_takes_focus() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let window = f.add_window((640, 480));

    let state = LayerState {
        anchor: Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT,
        keyboard_interactive: true,
        ..LayerState::default()
    };
    let lockscreen = f
        .headless
        .add_layer(Some(output), Layer::Overlay, "lockscreen", state, (0, 0))
        .unwrap();

    let layer = f.compositor().layers.get(lockscreen).unwrap();
    assert_eq!(layer.geometry(), rect_from_coords(0, 0, 1280, 720));
    assert_eq!(f.compositor().seat.focused_layer(), Some(lockscreen));
    let surface = f.compositor().layers.get(lockscreen).unwrap().surface();
    assert_eq!(f.compositor().seat.keyboard_focus(), Some(surface));

    f.compositor().layer_surface_destroy(lockscreen);
    f.dispatch();
    assert_eq!(f.compositor().seat.focused_layer(), None);
    assert_eq!(f.compositor().seat.keyboard_focus(), Some(window.surface));
}

#[test]
fn snapshot_reports_layers_and_views() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    f.add_top_bar(output, 32);
    let window = f.add_window((640, 480));
    f.compositor().maximize_view(window.view, None).unwrap();
    f.dispatch();

    let snapshot = f.compositor().snapshot();
    assert_eq!(snapshot.outputs.len(), 1);
    assert_eq!(snapshot.outputs[0].name, "headless-1");
    assert_eq!(
        snapshot.outputs[0].usable_area,
        Geometry {
            x: 0,
            y: 32,
            width: 1280,
            height: 688,
        }
    );
    assert_eq!(snapshot.layers.len(), 1);
    assert_eq!(snapshot.layers[0].namespace, "bar");
    assert_eq!(snapshot.focused_view, Some(0));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["views"][0]["state"], "Maximized");
    assert_eq!(json["views"][0]["app_id"], "org.example.App");
    assert_eq!(json["views"][0]["outputs"][0], "headless-1");
}

#[test]
fn mapping_layer_damages_its_arranged_area() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    f.compositor().outputs.get_mut(output).unwrap().take_damage();

    let comp = f.compositor();
    let surface = comp.new_surface(ClientId::next());
    let osd = comp
        .new_layer_surface(surface, Some(output), Layer::Overlay, "osd")
        .unwrap();
    comp.layer_set_state(
        osd,
        LayerState {
            anchor: Anchor::BOTTOM,
            desired_size: (200, 100).into(),
            ..LayerState::default()
        },
    );
    // The first buffer comes without damage.
    comp.surface_commit(
        surface,
        SurfaceCommit {
            buffer: BufferAssignment::NewBuffer((200, 100).into()),
            ..SurfaceCommit::default()
        },
    );

    assert_eq!(
        comp.layers.get(osd).unwrap().geometry(),
        rect_from_coords(540, 620, 200, 100)
    );
    let damage = comp.outputs.get_mut(output).unwrap().take_damage();
    assert!(!damage.whole);
    assert_eq!(damage.regions, vec![rect_from_coords(540, 620, 200, 100)]);
}

fn pointer_enter_delivery(f: &Fixture, surface: SurfaceId) -> Option<Delivery> {
    f.headless.events().iter().find_map(|e| match *e {
        WireEvent::PointerEnter {
            surface: s,
            delivery,
            ..
        } if s == surface => Some(delivery),
        _ => None,
    })
}

fn touch_down_delivery(f: &Fixture, surface: SurfaceId) -> Option<Delivery> {
    f.headless.events().iter().find_map(|e| match *e {
        WireEvent::TouchDown {
            surface: s,
            delivery,
            ..
        } if s == surface => Some(delivery),
        _ => None,
    })
}

#[test]
fn layer_surfaces_bypass_client_grabs() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let bar = f.add_top_bar(output, 32);
    let bar_surface = f.compositor().layers.get(bar).unwrap().surface();
    let window = f.add_window((640, 480));

    // A popup menu is open.
    f.compositor().seat.set_pointer_grab(true);
    f.compositor().seat.set_touch_grab(true);
    f.headless.clear_events();

    f.pointer_to(640., 10.);
    f.pointer_to(640., 360.);
    assert_eq!(
        pointer_enter_delivery(&f, bar_surface),
        Some(Delivery::Direct)
    );
    assert_eq!(
        pointer_enter_delivery(&f, window.surface),
        Some(Delivery::Grab)
    );

    f.touch_down(0, 100., 16.);
    f.touch_up(0);
    f.touch_down(1, 640., 360.);
    f.touch_up(1);
    assert_eq!(touch_down_delivery(&f, bar_surface), Some(Delivery::Direct));
    assert_eq!(touch_down_delivery(&f, window.surface), Some(Delivery::Grab));

    // Without a grab everything goes through the regular path.
    f.compositor().seat.set_pointer_grab(false);
    f.headless.clear_events();
    f.pointer_to(640., 10.);
    assert_eq!(pointer_enter_delivery(&f, bar_surface), Some(Delivery::Grab));
}

fn delivered_buttons(f: &Fixture) -> usize {
    f.headless
        .events()
        .iter()
        .filter(|e| matches!(e, WireEvent::PointerButton { .. }))
        .count()
}

#[test]
fn press_at_top_edge_reveals_bar_over_fullscreen() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let bar = f.add_top_bar(output, 32);
    let window = f.add_window((640, 480));
    f.compositor()
        .set_view_fullscreen(window.view, true, None)
        .unwrap();
    f.dispatch();
    assert_eq!(f.view_box(window), rect_from_coords(0, 0, 1280, 720));

    // The fullscreen view covers the bar.
    let hit = f.compositor().surface_at((640., 10.).into()).unwrap();
    assert_eq!(hit.view, Some(window.view));

    f.pointer_to(640., 1.);
    f.headless.clear_events();
    f.button(BTN_LEFT, ButtonState::Pressed);
    f.button(BTN_LEFT, ButtonState::Released);

    assert!(f.compositor().outputs.get(output).unwrap().shell_revealed());
    assert_eq!(delivered_buttons(&f), 0);
    let hit = f.compositor().surface_at((640., 10.).into()).unwrap();
    assert_eq!(hit.layer, Some(bar));

    // Pressing anywhere else hides the bar again and reaches the client.
    f.pointer_to(640., 360.);
    f.button(BTN_LEFT, ButtonState::Pressed);
    assert!(!f.compositor().outputs.get(output).unwrap().shell_revealed());
    assert_eq!(delivered_buttons(&f), 1);
    f.button(BTN_LEFT, ButtonState::Released);
}

#[test]
fn press_at_top_edge_without_fullscreen_is_delivered() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let bar = f.add_top_bar(output, 32);
    let bar_surface = f.compositor().layers.get(bar).unwrap().surface();
    let _window = f.add_window((640, 480));

    f.pointer_to(640., 1.);
    f.headless.clear_events();
    f.button(BTN_LEFT, ButtonState::Pressed);

    // The bar is already there, nothing to reveal.
    assert!(!f.compositor().outputs.get(output).unwrap().shell_revealed());
    assert_eq!(delivered_buttons(&f), 1);
    assert!(f.headless.events().iter().any(|e| matches!(
        e,
        WireEvent::PointerButton { surface: Some(s), .. } if *s == bar_surface
    )));
}

/// A notification shade hanging 40 px into the top of the output.
fn add_shade(f: &mut Fixture, output: crate::output::OutputId) -> crate::layer::LayerId {
    let state = LayerState {
        anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
        desired_size: (0, 400).into(),
        ..LayerState::default()
    };
    let shade = f
        .headless
        .add_layer(Some(output), Layer::Top, "shade", state, (0, 400))
        .unwrap();
    let draggable = DraggableLayer::new(-360, 0, 40, 0.3, DragMode::Full);
    f.compositor().set_layer_draggable(shade, draggable);
    f.dispatch();
    shade
}

#[test]
fn rejected_shade_drag_stays_folded() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let shade = add_shade(&mut f, output);

    let layer = f.compositor().layers.get(shade).unwrap();
    assert_eq!(layer.state().margin.top, -360);
    assert_eq!(layer.geometry(), rect_from_coords(0, -360, 1280, 400));

    f.touch_down(0, 640., 20.);
    assert_eq!(f.compositor().seat.cursor.drag_layer(), Some(shade));
    let layer = f.compositor().layers.get(shade).unwrap();
    assert_eq!(layer.draggable().unwrap().state(), DragState::Pending);

    // Pushing a folded shade further up makes no sense.
    f.touch_motion(0, 640., 5.);
    assert_eq!(f.compositor().seat.cursor.drag_layer(), None);

    // The gesture is over; pulling down now does nothing.
    f.touch_motion(0, 640., 200.);
    f.touch_up(0);

    let layer = f.compositor().layers.get(shade).unwrap();
    assert_eq!(layer.draggable().unwrap().state(), DragState::Folded);
    assert_eq!(layer.state().margin.top, -360);
    assert_eq!(layer.geometry(), rect_from_coords(0, -360, 1280, 400));
    assert!(!f.headless.events().iter().any(|e| matches!(
        e,
        WireEvent::LayerDragged { .. } | WireEvent::LayerDragEnd { .. }
    )));
}

#[test]
fn shade_drag_past_threshold_unfolds() {
    let mut f = Fixture::new();
    let output = f.add_output(1, (1280, 720));
    let shade = add_shade(&mut f, output);
    let surface = f.compositor().layers.get(shade).unwrap().surface();

    f.touch_down(0, 640., 20.);
    f.touch_motion(0, 640., 220.);
    let layer = f.compositor().layers.get(shade).unwrap();
    assert_eq!(layer.state().margin.top, -160);
    f.touch_up(0);

    let layer = f.compositor().layers.get(shade).unwrap();
    assert_eq!(layer.draggable().unwrap().state(), DragState::Unfolded);
    assert_eq!(layer.state().margin.top, 0);
    assert!(f.headless.events().iter().any(|e| matches!(
        e,
        WireEvent::LayerDragEnd { surface: s, state: DragState::Unfolded } if *s == surface
    )));
}

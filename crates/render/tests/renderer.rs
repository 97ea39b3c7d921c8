use std::cell::RefCell;
use std::rc::Rc;

use glam::{UVec2, Vec3};
use scenekit_core::{
    Component, Disposable, HostEvent, HostEventKind, LayerPosition, Plane, RendererParameters,
    Resizeable, Updateable,
};
use scenekit_render::SimpleRenderer;
use scenekit_testkit::{
    shared_pair, two_wall_scene, DrawLog, Harness, RecordingOverlay, RecordingRenderer,
    RecordingSurface, SurfaceCall,
};

fn harness() -> Harness {
    let (scene, _, _) = two_wall_scene("registry");
    Harness::new(800, 600).with_scene(scene, 0.0)
}

fn record(
    log: &Rc<RefCell<Vec<&'static str>>>,
    entry: &'static str,
) -> impl Fn(&RecordingRenderer) + 'static {
    let log = Rc::clone(log);
    move |_: &RecordingRenderer| log.borrow_mut().push(entry)
}

#[test]
fn construction_attaches_layers_and_syncs_size() {
    let harness = harness();
    let log = DrawLog::new();
    let renderer = harness.renderer(&log, RendererParameters::default());

    let layers = harness.container.layers();
    let labels: Vec<_> = layers.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["canvas", "labels"]);
    assert_eq!(layers[1].style.position, LayerPosition::Absolute);
    assert_eq!(layers[1].style.top, 0.0);
    assert!(!layers[1].style.pointer_events);
    assert_eq!(harness.container.pointer_target().unwrap().label, "canvas");

    assert_eq!(renderer.get_size(), UVec2::new(800, 600));
    assert_eq!(renderer.overlay().size(), UVec2::new(800, 600));
    assert_eq!(renderer.get().pixel_ratio(), 1.0);
    assert!(renderer.get().local_clipping());
    assert_eq!(harness.events.listener_count(HostEventKind::Resize), 1);
    assert_eq!(renderer.name(), "SimpleRenderer");
    assert!(renderer.enabled());
}

#[test]
fn pixel_ratio_is_capped_by_parameters() {
    let harness = harness();
    harness.container.set_device_pixel_ratio(3.0);
    let log = DrawLog::new();
    let renderer = harness.renderer(&log, RendererParameters::default());

    assert_eq!(renderer.get().pixel_ratio(), 2.0);
    assert_eq!(renderer.overlay().pixel_ratio(), 2.0);
}

#[test]
fn update_draws_registry_scene_between_notifications() {
    let harness = harness();
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let order = Rc::new(RefCell::new(Vec::new()));
    renderer.on_before_update().add(record(&order, "before"));
    renderer.on_after_update().add(record(&order, "after"));
    {
        let order = Rc::clone(&order);
        let log = log.clone();
        renderer.on_after_update().add(move |_| {
            if log.render_count() == 1 {
                order.borrow_mut().push("drawn");
            }
        });
    }

    renderer.update(0.016).unwrap();

    assert_eq!(*order.borrow(), vec!["before", "after", "drawn"]);
    assert_eq!(log.rendered_scenes(), vec!["registry"]);
    assert_eq!(log.overlay_scenes(), vec!["registry"]);
}

#[test]
fn disabled_update_is_silent() {
    let harness = harness();
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let order = Rc::new(RefCell::new(Vec::new()));
    renderer.on_before_update().add(record(&order, "before"));
    renderer.on_after_update().add(record(&order, "after"));

    renderer.set_enabled(false);
    renderer.update(0.016).unwrap();

    assert!(order.borrow().is_empty());
    assert_eq!(log.render_count(), 0);
    assert!(log.overlay_scenes().is_empty());
}

#[test]
fn override_pair_wins_over_registry() {
    let harness = harness();
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let (scene, camera) = shared_pair("override", Vec3::new(1.0, 2.0, 3.0));
    renderer.set_override(scene, camera);
    renderer.update(0.0).unwrap();

    renderer.clear_override();
    renderer.update(0.0).unwrap();

    assert_eq!(log.rendered_scenes(), vec!["override", "registry"]);
    let cameras: Vec<_> = log
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            SurfaceCall::Render { camera, .. } => Some(camera),
            _ => None,
        })
        .collect();
    assert_eq!(cameras[0], [1.0, 2.0, 3.0]);
    assert_eq!(cameras[1], [0.0, 0.0, 0.0]);
}

#[test]
fn single_override_falls_back_to_registry() {
    let harness = harness();
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let (scene, camera) = shared_pair("override", Vec3::ZERO);
    renderer.set_override_scene(Some(scene));
    renderer.update(0.0).unwrap();

    renderer.set_override_scene(None);
    renderer.set_override_camera(Some(camera));
    renderer.update(0.0).unwrap();

    assert_eq!(log.rendered_scenes(), vec!["registry", "registry"]);
}

#[test]
fn missing_registry_camera_skips_draw_and_after_update() {
    let harness = harness();
    harness.components.set_camera(None);
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let order = Rc::new(RefCell::new(Vec::new()));
    renderer.on_before_update().add(record(&order, "before"));
    renderer.on_after_update().add(record(&order, "after"));

    renderer.update(0.0).unwrap();

    assert_eq!(*order.borrow(), vec!["before"]);
    assert_eq!(log.render_count(), 0);
}

#[test]
fn clipping_planes_reach_the_surface() {
    let harness = harness();
    harness
        .components
        .add_clipping_plane(Plane::new(Vec3::NEG_Z, -7.0));
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    renderer.update(0.0).unwrap();

    assert!(log.calls().contains(&SurfaceCall::Render {
        scene: "registry".into(),
        camera: [0.0, 0.0, 0.0],
        clipping_planes: 1,
    }));
}

#[test]
fn host_resize_tracks_container() {
    let harness = harness();
    let log = DrawLog::new();
    let renderer = harness.renderer(&log, RendererParameters::default());

    let sizes = Rc::new(RefCell::new(Vec::new()));
    {
        let sizes = Rc::clone(&sizes);
        renderer
            .on_resize()
            .add(move |renderer| sizes.borrow_mut().push(renderer.get_size()));
    }

    harness.resize(1024, 768);

    assert_eq!(renderer.get_size(), UVec2::new(1024, 768));
    assert_eq!(renderer.overlay().size(), UVec2::new(1024, 768));
    assert_eq!(*sizes.borrow(), vec![UVec2::new(1024, 768)]);
}

#[test]
fn resize_event_uses_container_size_not_payload() {
    let harness = harness();
    let log = DrawLog::new();
    let renderer = harness.renderer(&log, RendererParameters::default());

    harness.events.dispatch(&HostEvent::Resized {
        width: 1024,
        height: 768,
    });
    assert_eq!(renderer.get_size(), UVec2::new(800, 600));

    harness.container.set_client_size(1024, 768);
    harness.events.dispatch(&HostEvent::Resized {
        width: 1024,
        height: 768,
    });
    assert_eq!(renderer.get_size(), UVec2::new(1024, 768));
}

#[test]
fn explicit_resize_reads_container() {
    let harness = harness();
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    harness.container.set_client_size(300, 200);
    renderer.resize();
    assert_eq!(renderer.get_size(), UVec2::new(300, 200));
}

#[test]
fn surface_errors_propagate_unchanged() {
    let harness = harness();
    let log = DrawLog::new();
    let mut surface = RecordingSurface::new(log.clone());
    surface.fail_next_render("surface lost");
    let mut renderer = SimpleRenderer::new(
        Rc::clone(&harness.components),
        Rc::clone(&harness.container),
        surface,
        RecordingOverlay::new(log.clone()),
        RendererParameters::default(),
    );

    let order = Rc::new(RefCell::new(Vec::new()));
    renderer.on_after_update().add(record(&order, "after"));

    let err = renderer.update(0.0).unwrap_err();
    assert_eq!(err.to_string(), "surface lost");
    assert!(order.borrow().is_empty());
    assert!(log.overlay_scenes().is_empty());

    renderer.update(0.0).unwrap();
    assert_eq!(*order.borrow(), vec!["after"]);
}

#[test]
fn dispose_releases_everything_once() {
    let harness = harness();
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let resized = Rc::new(RefCell::new(Vec::new()));
    renderer.on_resize().add(record(&resized, "resize"));

    renderer.dispose();
    renderer.dispose();

    assert!(renderer.is_disposed());
    assert!(!renderer.enabled());
    assert!(harness.container.layers().is_empty());
    assert_eq!(harness.events.listener_count(HostEventKind::Resize), 0);
    assert!(renderer.get().is_disposed());
    assert!(renderer.overlay().is_disposed());
    assert!(renderer.on_resize().is_empty());
    assert!(renderer.on_before_update().is_empty());
    assert!(renderer.on_after_update().is_empty());

    let disposals = log
        .calls()
        .into_iter()
        .filter(|call| matches!(call, SurfaceCall::Dispose { .. }))
        .count();
    assert_eq!(disposals, 2);

    harness.resize(640, 480);
    assert!(resized.borrow().is_empty());
    assert_eq!(renderer.get_size(), UVec2::new(800, 600));

    renderer.update(0.0).unwrap();
    assert_eq!(log.render_count(), 0);
}

#[test]
fn renderer_does_not_keep_scene_alive() {
    let harness = Harness::new(100, 100);
    let log = DrawLog::new();
    let mut renderer = harness.renderer(&log, RendererParameters::default());

    let (scene, camera) = shared_pair("temporary", Vec3::ZERO);
    renderer.set_override(Rc::clone(&scene), camera);
    renderer.update(0.0).unwrap();
    renderer.clear_override();

    assert_eq!(Rc::strong_count(&scene), 1);
}

use nyanchu::config::{AudioConfig, RendererConfig};
use nyanchu::render::{create_renderer, HeadlessRenderer, RecordedDraw, RenderSurface};
use nyanchu::{
    AudioError, Engine, EngineConfig, EngineError, EngineState, Mesh, Renderer, RendererBackend,
    RendererError,
};

use std::time::Duration;

use glam::{Mat4, Vec3};

fn headless_config() -> EngineConfig {
    EngineConfig {
        renderer: RendererConfig {
            backend: RendererBackend::Headless,
            ..RendererConfig::default()
        },
        audio: AudioConfig {
            enabled: false,
            ..AudioConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn running_engine() -> Engine {
    let mut engine = Engine::new(headless_config());
    engine.init().unwrap();
    engine
}

#[test]
fn new_engine_is_idle() {
    let engine = Engine::new(headless_config());
    assert_eq!(engine.state(), EngineState::Uninitialized);
    assert!(!engine.is_running());
    assert!(engine.window().is_none());
    assert!(engine.resource_dir().is_none());
    assert_eq!(engine.delta_time(), 0.0);
}

#[test]
fn frame_calls_before_init_fail() {
    let mut engine = Engine::new(headless_config());
    assert!(matches!(engine.begin_frame(), Err(EngineError::NotInitialized)));
    assert!(matches!(engine.end_frame(), Err(EngineError::NotInitialized)));
    assert!(matches!(engine.renderer(), Err(EngineError::NotInitialized)));
    assert!(matches!(
        engine.play_bgm("bgm.ogg"),
        Err(EngineError::NotInitialized)
    ));
}

#[test]
fn shutdown_before_init_is_noop() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.shutdown();
    engine.shutdown();
    assert_eq!(engine.state(), EngineState::Uninitialized);
}

#[test]
fn poll_and_resize_before_init_are_ignored() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.poll_events();
    engine.resize(640, 480);
    assert!(!engine.is_running());
}

#[test]
fn headless_backend_drives_a_scripted_frame_loop() {
    let mut renderer = create_renderer(&headless_config().renderer);
    assert_eq!(renderer.backend(), RendererBackend::Headless);
    renderer
        .initialize(RenderSurface::Offscreen, 800, 600)
        .unwrap();

    for frame in 0..3 {
        renderer.begin_frame().unwrap();
        renderer.draw_cube(Mat4::from_rotation_y(frame as f32));
        renderer.end_frame().unwrap();
    }
    renderer.resize(1280, 720);
    assert_eq!(renderer.size(), (1280, 720));

    renderer.shutdown();
    renderer.shutdown();
}

#[test]
fn headless_records_custom_meshes() {
    let mut renderer = HeadlessRenderer::new();
    renderer
        .initialize(RenderSurface::Offscreen, 320, 240)
        .unwrap();

    let model = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
    renderer.begin_frame().unwrap();
    renderer.draw_mesh(&Mesh::triangle(), model);
    renderer.end_frame().unwrap();

    assert_eq!(
        renderer.last_frame(),
        &[RecordedDraw::Mesh {
            index_count: 3,
            model
        }]
    );
}

#[test]
fn headless_init_needs_no_window() {
    let engine = running_engine();
    assert_eq!(engine.state(), EngineState::Running);
    assert!(engine.is_running());
    assert!(engine.window().is_none());
    assert!(engine.resource_dir().is_some());
}

#[test]
fn headless_renderer_starts_at_configured_size() {
    let mut config = headless_config();
    config.window.width = 320;
    config.window.height = 200;

    let mut engine = Engine::new(config);
    engine.init().unwrap();
    let renderer = engine.renderer().unwrap();
    assert_eq!(renderer.backend(), RendererBackend::Headless);
    assert_eq!(renderer.size(), (320, 200));
}

#[test]
fn second_init_is_rejected() {
    let mut engine = running_engine();
    assert!(matches!(engine.init(), Err(EngineError::AlreadyInitialized)));
    assert!(engine.is_running());
}

#[test]
fn shutdown_after_init_is_safe_to_repeat() {
    let mut engine = running_engine();
    engine.shutdown();
    assert_eq!(engine.state(), EngineState::ShutDown);
    assert!(!engine.is_running());

    engine.shutdown();
    assert_eq!(engine.state(), EngineState::ShutDown);
    assert!(matches!(engine.renderer(), Err(EngineError::NotInitialized)));
    assert!(matches!(engine.begin_frame(), Err(EngineError::NotInitialized)));
}

#[test]
fn init_after_shutdown_is_rejected() {
    let mut engine = running_engine();
    engine.shutdown();
    assert!(matches!(engine.init(), Err(EngineError::ShutDown)));
    assert_eq!(engine.state(), EngineState::ShutDown);
}

#[test]
fn resize_reaches_renderer_unchanged() {
    let mut engine = running_engine();
    engine.resize(1280, 720);
    assert_eq!(engine.renderer().unwrap().size(), (1280, 720));

    engine.resize(0, 0);
    assert_eq!(engine.renderer().unwrap().size(), (0, 0));
}

#[test]
fn close_request_stops_the_loop() {
    let mut engine = running_engine();
    let mut frames = 0;
    while engine.is_running() {
        engine.poll_events();
        engine.begin_frame().unwrap();
        engine.renderer().unwrap().draw_triangle();
        engine.end_frame().unwrap();

        frames += 1;
        if frames == 3 {
            engine.request_close();
        }
    }

    assert_eq!(frames, 3);
    assert_eq!(engine.state(), EngineState::Running);
    engine.poll_events();
    assert!(!engine.is_running());
    engine.shutdown();
    assert_eq!(engine.state(), EngineState::ShutDown);
}

#[test]
fn frame_protocol_errors_surface_through_engine() {
    let mut engine = running_engine();
    assert!(matches!(
        engine.end_frame(),
        Err(EngineError::Renderer(RendererError::NoActiveFrame))
    ));
    engine.begin_frame().unwrap();
    assert!(matches!(
        engine.begin_frame(),
        Err(EngineError::Renderer(RendererError::FrameInProgress))
    ));
    engine.end_frame().unwrap();
}

#[test]
fn delta_time_tracks_frame_starts() {
    let mut engine = running_engine();
    engine.begin_frame().unwrap();
    engine.end_frame().unwrap();
    assert_eq!(engine.delta_time(), 0.0);

    std::thread::sleep(Duration::from_millis(5));
    engine.begin_frame().unwrap();
    engine.end_frame().unwrap();
    assert!(engine.delta_time() >= 0.005);
}

#[test]
fn play_bgm_resolves_against_resource_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = headless_config();
    config.resource_dir = Some(dir.path().to_path_buf());

    let mut engine = Engine::new(config);
    engine.init().unwrap();
    assert_eq!(engine.resource_dir(), Some(dir.path()));

    match engine.play_bgm("bgm.ogg") {
        Err(EngineError::Audio(AudioError::Open { path, .. })) => {
            assert_eq!(path, dir.path().join("bgm.ogg"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn dropping_a_running_engine_shuts_it_down() {
    let mut engine = running_engine();
    engine.begin_frame().unwrap();
    drop(engine);
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Cross-component tests: producer thread → bridge → queue → surface →
//! pre-draw pull, driven the way a draw-graph traversal would drive it.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use scenelink::{
    FrameListener, GlApi, GlTextureId, ImageProducer, PresentationSurface, ProducerFactory, Rect,
    Result, SceneLinkError, ShaderProgram, SurfaceRegistry, UpdateQueue, gl_constants,
};

/// Shared state of the fake camera: the test plays the producer thread by
/// calling `decode_frame`, the surface pulls through `ImageProducer`.
#[derive(Default)]
struct CameraState {
    listener: Mutex<Option<Arc<dyn FrameListener>>>,
    decoded: AtomicU64,
    materialized: AtomicU64,
    updates: AtomicU64,
}

impl CameraState {
    /// Produce one frame and fire the registered listener, as the platform
    /// decoder does on its own thread.
    fn decode_frame(&self) {
        self.decoded.fetch_add(1, Ordering::SeqCst);
        let listener = self.listener.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.frame_available();
        }
    }
}

struct FakeCamera {
    state: Arc<CameraState>,
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl ImageProducer for FakeCamera {
    fn set_frame_listener(&mut self, listener: Arc<dyn FrameListener>) {
        *self.state.listener.lock().unwrap() = Some(listener);
    }

    fn update_image(&mut self) -> Result<()> {
        self.state.updates.fetch_add(1, Ordering::SeqCst);
        self.state
            .materialized
            .store(self.state.decoded.load(Ordering::SeqCst), Ordering::SeqCst);
        Ok(())
    }

    fn transform(&self, out: &mut [f32; 16]) -> Result<()> {
        // Distinct transform per materialized frame; stable while the frame
        // is unchanged.
        *out = [0.0; 16];
        out[0] = 1.0;
        out[5] = 1.0;
        out[10] = 1.0;
        out[15] = 1.0;
        out[3] = self.state.materialized.load(Ordering::SeqCst) as f32;
        Ok(())
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.events.lock().unwrap().push("producer released");
    }
}

struct FakeCameraFactory {
    state: Arc<CameraState>,
    events: Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
}

impl ProducerFactory for FakeCameraFactory {
    fn create(&self, _texture: GlTextureId) -> Result<Box<dyn ImageProducer>> {
        if self.fail {
            return Err(SceneLinkError::ProducerUnavailable("no camera".into()));
        }
        Ok(Box::new(FakeCamera {
            state: Arc::clone(&self.state),
            events: Arc::clone(&self.events),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum GlCall {
    Create(GlTextureId),
    Bind(u32, GlTextureId),
    Parameter(u32, u32, i32),
    Active(u32),
    Delete(GlTextureId),
}

/// Records every GL call; render-thread only, like the real thing.
struct RecordingGl {
    calls: RefCell<Vec<GlCall>>,
    next_texture: Cell<GlTextureId>,
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingGl {
    fn new(events: Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_texture: Cell::new(1),
            events,
        }
    }

    fn count(&self, matches: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| matches(c)).count()
    }
}

impl GlApi for RecordingGl {
    fn create_texture(&self) -> Result<GlTextureId> {
        let id = self.next_texture.get();
        self.next_texture.set(id + 1);
        self.calls.borrow_mut().push(GlCall::Create(id));
        Ok(id)
    }

    fn delete_texture(&self, texture: GlTextureId) {
        self.calls.borrow_mut().push(GlCall::Delete(texture));
        self.events.lock().unwrap().push("texture deleted");
    }

    fn bind_texture(&self, target: u32, texture: GlTextureId) {
        self.calls.borrow_mut().push(GlCall::Bind(target, texture));
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        self.calls
            .borrow_mut()
            .push(GlCall::Parameter(target, parameter, value));
    }

    fn active_texture(&self, unit: u32) {
        self.calls.borrow_mut().push(GlCall::Active(unit));
    }
}

#[derive(Default)]
struct RecordingProgram {
    mat4_uploads: Vec<(String, [f32; 16])>,
    i32_uploads: Vec<(String, i32)>,
}

impl ShaderProgram for RecordingProgram {
    fn set_uniform_mat4(&mut self, name: &str, column_major: &[f32; 16]) {
        self.mat4_uploads.push((name.into(), *column_major));
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.i32_uploads.push((name.into(), value));
    }
}

struct Harness {
    registry: Arc<SurfaceRegistry>,
    queue: UpdateQueue,
    camera: Arc<CameraState>,
    events: Arc<Mutex<Vec<&'static str>>>,
    gl: RecordingGl,
    surface: PresentationSurface,
    program: RecordingProgram,
}

impl Harness {
    fn new() -> Self {
        Self::with_failing_factory(false)
    }

    fn with_failing_factory(fail: bool) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let registry = Arc::new(SurfaceRegistry::new());
        let queue = UpdateQueue::new();
        let camera = Arc::new(CameraState::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let gl = RecordingGl::new(Arc::clone(&events));

        let mut surface = PresentationSurface::new(
            Arc::clone(&registry),
            Arc::new(queue.handle()),
            Box::new(FakeCameraFactory {
                state: Arc::clone(&camera),
                events: Arc::clone(&events),
                fail,
            }),
        );
        surface.set_bounds(Rect::new(0.0, 0.0, 1280.0, 720.0));

        Self {
            registry,
            queue,
            camera,
            events,
            gl,
            surface,
            program: RecordingProgram::default(),
        }
    }

    /// One render-thread cycle the way the framework runs it: drain queued
    /// updates, rebuild when the item is dirty, run the pre-draw hook for a
    /// dirty node, flush material uniforms. Returns whether a pull happened.
    fn render_cycle(&mut self) -> Result<bool> {
        let mut updated = false;
        for id in self.queue.drain_live(&self.registry) {
            if id == self.surface.id() {
                updated |= self.surface.on_async_update_requested();
            }
        }

        if !updated && self.surface.is_built() {
            return Ok(false);
        }

        let pulled = self.surface.build_or_reuse_node(&self.gl)?.is_dirty();
        if pulled {
            self.surface.preprocess(&self.gl)?;
            if let Some(node) = self.surface.node_mut() {
                node.material_mut().update_uniforms(&mut self.program);
                node.take_dirty();
            }
        }
        Ok(pulled)
    }
}

#[test]
fn coalescing_burst_pulls_once() {
    let mut h = Harness::new();
    h.render_cycle().unwrap(); // initial build

    let producer = {
        let camera = Arc::clone(&h.camera);
        std::thread::spawn(move || {
            for _ in 0..50 {
                camera.decode_frame();
            }
        })
    };
    producer.join().unwrap();

    assert!(h.render_cycle().unwrap());
    let pulls_after_burst = h.camera.updates.load(Ordering::SeqCst);
    // One pull for the initial build, exactly one more for the whole burst.
    assert_eq!(pulls_after_burst, 2);

    // Nothing new pending: the next cycle does not pull again.
    assert!(!h.render_cycle().unwrap());
    assert_eq!(h.camera.updates.load(Ordering::SeqCst), pulls_after_burst);
}

#[test]
fn freshness_always_latest_frame() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();

    for _ in 0..3 {
        h.camera.decode_frame();
    }
    h.render_cycle().unwrap();
    assert_eq!(h.camera.materialized.load(Ordering::SeqCst), 3);

    for _ in 0..2 {
        h.camera.decode_frame();
    }
    h.render_cycle().unwrap();
    assert_eq!(h.camera.materialized.load(Ordering::SeqCst), 5);
}

#[test]
fn every_notification_eventually_pulls() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();

    // Notification landing after a cycle is picked up by the next one, even
    // interleaved with idle cycles.
    h.camera.decode_frame();
    assert!(h.render_cycle().unwrap());
    assert!(!h.render_cycle().unwrap());
    h.camera.decode_frame();
    assert!(h.render_cycle().unwrap());
}

#[test]
fn transform_upload_skipped_when_unchanged() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();
    let uploads_after_build = h.program.mat4_uploads.len();
    assert_eq!(uploads_after_build, 1);

    // New frame, new transform: exactly one more upload.
    h.camera.decode_frame();
    h.render_cycle().unwrap();
    assert_eq!(h.program.mat4_uploads.len(), 2);

    // Notification without a decoded change in transform: the producer
    // re-materializes the same frame, the transform compares equal, and the
    // upload is skipped.
    h.camera.listener.lock().unwrap().as_ref().unwrap().frame_available();
    h.render_cycle().unwrap();
    assert_eq!(h.program.mat4_uploads.len(), 2);
}

#[test]
fn sampler_unit_resolved_once() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();

    assert_eq!(h.program.i32_uploads, vec![("frameTexture".to_string(), 0)]);
}

#[test]
fn texture_configured_once_on_build() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();

    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Create(_))), 1);
    // Sampling parameters: min, mag, wrap s, wrap t — set once, at build.
    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Parameter(..))), 4);
    assert!(h.gl.calls.borrow().contains(&GlCall::Parameter(
        gl_constants::TEXTURE_EXTERNAL_OES,
        gl_constants::TEXTURE_MIN_FILTER,
        gl_constants::NEAREST,
    )));
    assert!(h.gl.calls.borrow().contains(&GlCall::Parameter(
        gl_constants::TEXTURE_EXTERNAL_OES,
        gl_constants::TEXTURE_MAG_FILTER,
        gl_constants::LINEAR,
    )));
}

#[test]
fn rebind_happens_every_pull() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();

    // Three pulls, three activate+rebind pairs, regardless of transform
    // changes.
    assert_eq!(
        h.gl.count(|c| matches!(c, GlCall::Active(u) if *u == gl_constants::TEXTURE0)),
        3
    );
}

#[test]
fn lifecycle_texture_once_source_released_first() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();

    h.surface.destroy(&h.gl);

    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Create(_))), 1);
    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Delete(_))), 1);
    // The producer handle must be gone before the texture it references.
    assert_eq!(
        *h.events.lock().unwrap(),
        vec!["producer released", "texture deleted"]
    );

    // Second destroy: caller error, but no second GL delete can happen.
    h.surface.destroy(&h.gl);
    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Delete(_))), 1);
}

#[test]
fn teardown_of_unbuilt_surface_touches_no_gl() {
    let mut h = Harness::new();
    h.surface.destroy(&h.gl);
    assert!(h.gl.calls.borrow().is_empty());
}

#[test]
fn stale_notification_after_destroy_is_dropped() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();

    h.surface.destroy(&h.gl);

    // The producer-side listener may outlive the surface and keep firing.
    h.camera.listener.lock().unwrap().as_ref().unwrap().frame_available();
    assert!(h.queue.drain_live(&h.registry).is_empty());
}

#[test]
fn producer_unavailable_leaves_surface_unbuilt_and_leaks_nothing() {
    let mut h = Harness::with_failing_factory(true);

    let err = h.render_cycle().unwrap_err();
    assert!(matches!(err, SceneLinkError::ProducerUnavailable(_)));
    assert!(!h.surface.is_built());

    // The texture allocated before the producer failed must be released on
    // the failure path.
    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Create(_))), 1);
    assert_eq!(h.gl.count(|c| matches!(c, GlCall::Delete(_))), 1);
}

#[test]
fn frames_presented_counts_pulls() {
    let mut h = Harness::new();
    h.render_cycle().unwrap();
    h.camera.decode_frame();
    h.render_cycle().unwrap();

    assert_eq!(h.surface.frames_presented(), 2);
}

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use wavefield_assets::AlphaMask;
use wavefield_common::{SceneConfig, Viewport};
use wavefield_input::{Action, DragButton, PointerTracker};
use wavefield_kernel::{FieldSettings, ParticleField};
use wavefield_render_wgpu::{OrbitCamera, PointStyle, PointsRenderer};
use wavefield_tools::{FieldInspector, FrameStats};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "wavefield-desktop", about = "Animated particle wave")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the particle count
    #[arg(long)]
    count: Option<usize>,

    /// Fixed RNG seed for particle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Alpha mask image for the particle sprites
    #[arg(long)]
    texture: Option<PathBuf>,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(count) = self.count {
            config.particle_count = count;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(texture) = &self.texture {
            config.alpha_mask = texture.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Application state.
struct AppState {
    config: SceneConfig,
    field: ParticleField,
    camera: OrbitCamera,
    style: PointStyle,
    viewport: Viewport,
    pointer: PointerTracker,
    stats: FrameStats,
    show_inspector: bool,
    inspected: usize,
    last_frame: Instant,
}

impl AppState {
    fn new(config: SceneConfig) -> Self {
        let field = ParticleField::generate(&FieldSettings::from(&config));
        let viewport = Viewport::from_physical(
            config.window.width,
            config.window.height,
            1.0,
            config.max_pixel_ratio,
        );
        let mut camera = OrbitCamera::from_config(&config.camera);
        camera.aspect = viewport.aspect();

        Self {
            style: PointStyle::from(&config),
            config,
            field,
            camera,
            viewport,
            pointer: PointerTracker::new(),
            stats: FrameStats::new(),
            show_inspector: true,
            inspected: 0,
            last_frame: Instant::now(),
        }
    }

    /// Advance one frame: animate particles, then settle the camera.
    fn update(&mut self) {
        let now = Instant::now();
        self.stats.record(now - self.last_frame);
        self.last_frame = now;

        self.field.advance_at(now);
        self.camera.update();
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }

    /// Apply an action. Returns false when the app should exit.
    fn apply(&mut self, action: Action) -> bool {
        let height = self.viewport.logical_height as f32;
        match action {
            Action::Orbit(delta) => self.camera.rotate(delta.x, delta.y, height),
            Action::Pan(delta) => self.camera.pan(delta.x, delta.y, height),
            Action::Zoom(steps) => self.camera.zoom(steps),
            Action::ResetCamera => {
                self.camera.reset(&self.config.camera);
                tracing::info!("camera reset");
            }
            Action::ToggleInspector => self.show_inspector = !self.show_inspector,
            Action::Quit => return false,
            Action::Noop => {}
        }
        true
    }

    fn key_action(key: KeyCode) -> Action {
        match key {
            KeyCode::F1 => Action::ToggleInspector,
            KeyCode::KeyR => Action::ResetCamera,
            KeyCode::Escape => Action::Quit,
            _ => Action::Noop,
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_inspector {
            return;
        }

        let summary = FieldInspector::summary(&self.field);

        egui::SidePanel::left("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Wavefield");
                ui.separator();
                ui.label(format!("Frame: {}  t = {:.2}s", summary.frame, summary.elapsed_secs));
                ui.label(format!("FPS: {:.0}", self.stats.fps()));
                ui.label(format!("Particles: {}", summary.particle_count));
                ui.label(format!("y range: [{:.2}, {:.2}]", summary.y_min, summary.y_max));
                let eye = self.camera.position();
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                ui.separator();

                ui.heading("Points");
                let size_range = if self.style.size_attenuation {
                    0.01..=1.0
                } else {
                    1.0..=64.0
                };
                ui.add(egui::Slider::new(&mut self.style.size, size_range).text("size"));
                ui.checkbox(&mut self.style.size_attenuation, "Size attenuation");
                ui.separator();

                ui.heading("Camera");
                ui.checkbox(&mut self.camera.enable_damping, "Damping");
                ui.add_enabled(
                    self.camera.enable_damping,
                    egui::Slider::new(&mut self.camera.damping_factor, 0.01..=1.0).text("factor"),
                );
                if ui.button("Reset (R)").clicked() {
                    self.apply(Action::ResetCamera);
                }

                if summary.particle_count > 0 {
                    ui.separator();
                    ui.heading("Inspector");
                    ui.add(
                        egui::DragValue::new(&mut self.inspected)
                            .range(0..=summary.particle_count - 1)
                            .prefix("index: "),
                    );
                    if let Some(info) =
                        FieldInspector::inspect_particle(self.field.buffer(), self.inspected)
                    {
                        let [x, y, z] = info.position;
                        let [r, g, b] = info.color;
                        ui.label(format!("pos: ({x:.3}, {y:.3}, {z:.3})"));
                        ui.label(format!("rgb: ({r:.2}, {g:.2}, {b:.2})"));
                    }
                }

                ui.separator();
                ui.small("F1: Toggle Panel | LMB: Orbit | RMB: Pan | Wheel: Zoom | Esc: Quit");
            });
    }
}

/// Window plus everything that lives on the GPU.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: PointsRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, state: &mut AppState, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Wavefield")
            .with_inner_size(PhysicalSize::new(
                state.config.window.width,
                state.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("wavefield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let viewport = Viewport::from_physical(
            size.width,
            size.height,
            window.scale_factor(),
            state.config.max_pixel_ratio,
        );
        state.set_viewport(viewport);
        let (width, height) = viewport.render_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mask = AlphaMask::load_or_opaque(&state.config.alpha_mask);
        let renderer =
            PointsRenderer::new(&device, &queue, surface_format, &viewport, &mask, state.style);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, surface {}x{} (pixel ratio {:.2})",
            adapter.get_info().backend.to_str(),
            width,
            height,
            viewport.pixel_ratio
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Recompute viewport-derived state after the window changed size or scale.
    fn resize(&mut self, state: &mut AppState, new_size: PhysicalSize<u32>) {
        let viewport = Viewport::from_physical(
            new_size.width,
            new_size.height,
            self.window.scale_factor(),
            state.config.max_pixel_ratio,
        );
        let (width, height) = viewport.render_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, &viewport);
        state.set_viewport(viewport);
        tracing::debug!("resized to {width}x{height}");
    }

    fn redraw(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        state.update();

        let window = Arc::clone(&self.window);
        let drawn = continue_loop(window.as_ref(), || self.draw_frame(state, egui_ctx));
        if let Err(e) = drawn {
            match surface_recovery(&e) {
                SurfaceRecovery::Reconfigure => {
                    tracing::debug!("surface {e}, reconfiguring");
                    self.surface.configure(&self.device, &self.config);
                }
                SurfaceRecovery::SkipFrame => tracing::error!("surface error: {e}"),
            }
        }
    }

    fn draw_frame(
        &mut self,
        state: &mut AppState,
        egui_ctx: &EguiContext,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.style = state.style;
        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.camera,
            state.field.buffer(),
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: surface_pixels_per_point(
                full_output.pixels_per_point,
                self.config.width,
                self.window.inner_size().width,
            ),
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        Ok(())
    }
}

/// Anything that can be asked to deliver another frame.
trait FrameRequester {
    fn request_frame(&self);
}

impl FrameRequester for Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// Run one frame, then schedule the next whatever the frame's outcome.
/// The loop only stops when the window closes.
fn continue_loop<W, T>(window: &W, frame: impl FnOnce() -> T) -> T
where
    W: FrameRequester + ?Sized,
{
    let outcome = frame();
    window.request_frame();
    outcome
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    SkipFrame,
}

fn surface_recovery(err: &wgpu::SurfaceError) -> SurfaceRecovery {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        _ => SurfaceRecovery::SkipFrame,
    }
}

/// egui lays out in points scaled by its own pixels-per-point, which tracks
/// the window's physical size. The surface may be smaller when the pixel
/// ratio is capped, so points are rescaled to surface pixels.
fn surface_pixels_per_point(egui_pixels_per_point: f32, surface_width: u32, window_width: u32) -> f32 {
    egui_pixels_per_point * surface_width as f32 / window_width.max(1) as f32
}

struct GpuApp {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl GpuApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &mut self.state, &self.egui_ctx) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        let action = match event {
            WindowEvent::CloseRequested => Action::Quit,
            WindowEvent::Resized(new_size) => {
                gpu.resize(&mut self.state, new_size);
                Action::Noop
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => AppState::key_action(key),
            WindowEvent::MouseInput { button, state, .. } => {
                let drag = match button {
                    MouseButton::Left => Some(DragButton::Primary),
                    MouseButton::Right | MouseButton::Middle => Some(DragButton::Secondary),
                    _ => None,
                };
                if let Some(drag) = drag {
                    match state {
                        ElementState::Pressed => self.state.pointer.press(drag),
                        ElementState::Released => self.state.pointer.release(drag),
                    }
                }
                Action::Noop
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical: LogicalPosition<f32> = position.to_logical(gpu.window.scale_factor());
                self.state.pointer.moved(Vec2::new(logical.x, logical.y))
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.left();
                Action::Noop
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.state.pointer.wheel_lines(y),
                MouseScrollDelta::PixelDelta(p) => self.state.pointer.wheel_pixels(p.y as f32),
            },
            WindowEvent::RedrawRequested => {
                gpu.redraw(&mut self.state, &self.egui_ctx);
                Action::Noop
            }
            _ => Action::Noop,
        };

        if !self.state.apply(action) {
            tracing::info!("exiting");
            event_loop.exit();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.scene_config()?;
    tracing::info!(
        "wavefield-desktop starting with {} particles",
        config.particle_count
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SceneConfig {
        SceneConfig {
            particle_count: 16,
            seed: Some(1),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn update_advances_field_and_stats() {
        let mut state = AppState::new(small_config());
        state.update();
        state.update();
        assert_eq!(state.field.frame(), 2);
        assert_eq!(state.stats.frames(), 2);
        assert_eq!(state.field.buffer().position_generation(), 2);
    }

    #[test]
    fn viewport_sets_camera_aspect() {
        let mut state = AppState::new(small_config());
        state.set_viewport(Viewport::from_physical(1600, 800, 2.0, 2.0));
        assert!((state.camera.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn actions_drive_camera_and_ui() {
        let mut state = AppState::new(small_config());
        state.camera.enable_damping = false;
        assert!(state.apply(Action::Orbit(Vec2::new(50.0, 0.0))));
        state.camera.update();
        assert!(state.camera.azimuth != 0.0);

        assert!(state.apply(Action::ResetCamera));
        assert_eq!(state.camera.azimuth, 0.0);

        assert!(state.show_inspector);
        state.apply(Action::ToggleInspector);
        assert!(!state.show_inspector);

        assert!(!state.apply(Action::Quit));
    }

    #[test]
    fn key_bindings() {
        assert_eq!(AppState::key_action(KeyCode::F1), Action::ToggleInspector);
        assert_eq!(AppState::key_action(KeyCode::Escape), Action::Quit);
        assert_eq!(AppState::key_action(KeyCode::KeyQ), Action::Noop);
    }

    #[test]
    fn camera_input_leaves_particles_alone() {
        let mut state = AppState::new(small_config());
        let before = state.field.buffer().clone();
        state.apply(Action::Zoom(3.0));
        state.apply(Action::Pan(Vec2::new(10.0, 10.0)));
        assert_eq!(state.field.buffer(), &before);
    }

    struct CountingRequester(std::cell::Cell<u32>);

    impl FrameRequester for CountingRequester {
        fn request_frame(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn next_frame_scheduled_even_when_surface_fails() {
        let window = CountingRequester(std::cell::Cell::new(0));
        let outcomes = [
            Ok(()),
            Err(wgpu::SurfaceError::Outdated),
            Err(wgpu::SurfaceError::Lost),
            Err(wgpu::SurfaceError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory),
        ];
        for (i, outcome) in outcomes.into_iter().enumerate() {
            let returned = continue_loop(&window, || outcome.clone());
            assert_eq!(returned, outcome);
            assert_eq!(window.0.get(), i as u32 + 1);
        }
    }

    #[test]
    fn surface_errors_skip_the_frame() {
        use wgpu::SurfaceError;
        assert_eq!(surface_recovery(&SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(surface_recovery(&SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
        assert_eq!(surface_recovery(&SurfaceError::Timeout), SurfaceRecovery::SkipFrame);
    }

    #[test]
    fn egui_scale_follows_capped_surface() {
        // Scale factor 3 with the ratio capped at 2: 3000px window, 2000px surface.
        let vp = Viewport::from_physical(3000, 1500, 3.0, 2.0);
        let (surface_w, _) = vp.render_size();
        let ppp = surface_pixels_per_point(3.0, surface_w, 3000);
        assert!((ppp - 2.0).abs() < 1e-6);
        // egui's screen width in points lands exactly on the surface width.
        assert!((3000.0 / 3.0 * ppp - surface_w as f32).abs() < 1e-3);
    }

    #[test]
    fn egui_zoom_is_kept() {
        let vp = Viewport::from_physical(1280, 720, 1.0, 2.0);
        let (surface_w, _) = vp.render_size();
        let ppp = surface_pixels_per_point(1.5, surface_w, 1280);
        assert!((ppp - 1.5).abs() < 1e-6);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from(["wavefield-desktop", "--count", "5", "--seed", "9"]);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.particle_count, 5);
        assert_eq!(config.seed, Some(9));
    }
}

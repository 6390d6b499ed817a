use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::{ActionStates, EdgeLatch, PressedEdges};
use super::metrics::LoopStatsAccumulator;
use super::rendering::{RenderError, Renderer, Viewport};
use super::scene::SceneMachine;
use super::{InputAction, InputSnapshot, Scene, SceneCommand, SceneWorld, Vec2};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Logical frame size; the window starts at this size and is letterboxed
    /// when resized.
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub stats_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Pixel Village".to_string(),
            window_width: 960,
            window_height: 540,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            stats_log_interval: Duration::from_secs(1),
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] RenderError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` at a fixed tick rate until the window
/// closes or Escape is pressed. `world` arrives with its assets loaded.
pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>, world: SceneWorld) -> Result<(), AppError> {
    let logical = Viewport {
        width: config.window_width.max(1),
        height: config.window_height.max(1),
    };
    let mut scenes = SceneMachine::new(scene, world);
    scenes
        .world_mut()
        .camera_mut()
        .set_view_size(logical.width, logical.height);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                logical.width as f64,
                logical.height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, logical).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let stats_log_interval =
        normalize_non_zero_duration(config.stats_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let initial_size = window_for_loop.inner_size();
    let mut input_collector = InputCollector::new(initial_size.width, initial_size.height);

    scenes.load();
    info!(
        sprite_count = scenes.world().sprite_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        stats_log_interval_ms = stats_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        logical_width = logical.width,
        logical_height = logical.height,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut stats = LoopStatsAccumulator::new(stats_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let window_px = Vec2::new(position.x as f32, position.y as f32);
                        input_collector.set_cursor_position_px(renderer.window_to_logical(window_px));
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.set_cursor_position_px(None);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                        if state == ElementState::Pressed {
                            scenes.world_mut().sounds_mut().unlock();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_key(event.physical_key, event.state);
                        if event.state == ElementState::Pressed {
                            scenes.world_mut().sounds_mut().unlock();
                        }
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            let input_snapshot = input_collector.snapshot_for_tick();
                            let command = scenes.update(fixed_dt_seconds, &input_snapshot);
                            scenes.post_update();

                            if command == SceneCommand::HardReset {
                                scenes.hard_reset();
                                info!(
                                    sprite_count = scenes.world().sprite_count(),
                                    "scene_reset"
                                );
                            }
                            stats.record_tick();
                        }
                        accumulator = step_plan.remaining_accumulator;

                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        scenes.render();
                        if let Err(error) = renderer.render_world(scenes.world()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();
                        let next_title = scenes.debug_title();
                        if next_title != last_applied_title {
                            match &next_title {
                                Some(title) => window_for_loop.set_title(title),
                                None => window_for_loop.set_title(&config.window_title),
                            }
                            last_applied_title = next_title;
                        }
                        stats.record_frame(raw_frame_dt);

                        if let Some(snapshot) = stats.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                slowest_frame_ms = snapshot.slowest_frame_ms,
                                sprite_count = scenes.world().sprite_count(),
                                "loop_stats"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                renderer.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    attack: EdgeLatch,
    shoot: EdgeLatch,
    restart: EdgeLatch,
    toggle_music: EdgeLatch,
    pointer: EdgeLatch,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            KeyCode::KeyJ => self.attack.set_down(is_pressed),
            KeyCode::KeyK => self.shoot.set_down(is_pressed),
            KeyCode::KeyR => self.restart.set_down(is_pressed),
            KeyCode::KeyM => self.toggle_music.set_down(is_pressed),
            KeyCode::Escape => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.pointer.set_down(state == ElementState::Pressed);
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Cursor in logical frame pixels, `None` outside the frame.
    fn set_cursor_position_px(&mut self, position: Option<Vec2>) {
        self.cursor_position_px = position;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let pressed = PressedEdges {
            attack: self.attack.take(),
            shoot: self.shoot.take(),
            restart: self.restart.take(),
            toggle_music: self.toggle_music.take(),
            pointer: self.pointer.take(),
        };
        InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            pressed,
            self.cursor_position_px,
            self.window_width,
            self.window_height,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Released);
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(50), Duration::from_millis(16), 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_movement() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn key_release_clears_movement() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        release(&mut input, KeyCode::KeyD);
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn action_keys_are_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyJ);
        press(&mut input, KeyCode::KeyK);
        press(&mut input, KeyCode::KeyR);
        press(&mut input, KeyCode::KeyM);

        let first = input.snapshot_for_tick();
        assert!(first.attack_pressed());
        assert!(first.shoot_pressed());
        assert!(first.restart_pressed());
        assert!(first.toggle_music_pressed());

        let second = input.snapshot_for_tick();
        assert!(!second.attack_pressed());
        assert!(!second.shoot_pressed());
        assert!(!second.restart_pressed());
        assert!(!second.toggle_music_pressed());
    }

    #[test]
    fn held_attack_does_not_retrigger_until_released() {
        let mut input = InputCollector::default();

        press(&mut input, KeyCode::KeyJ);
        assert!(input.snapshot_for_tick().attack_pressed());
        press(&mut input, KeyCode::KeyJ);
        assert!(!input.snapshot_for_tick().attack_pressed());
        release(&mut input, KeyCode::KeyJ);
        press(&mut input, KeyCode::KeyJ);
        assert!(input.snapshot_for_tick().attack_pressed());
    }

    #[test]
    fn press_and_release_within_one_frame_still_fires() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyK);
        release(&mut input, KeyCode::KeyK);
        assert!(input.snapshot_for_tick().shoot_pressed());
    }

    #[test]
    fn left_click_is_edge_triggered_and_other_buttons_ignored() {
        let mut input = InputCollector::new(960, 540);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().pointer_pressed());

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        assert!(input.snapshot_for_tick().pointer_pressed());
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().pointer_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Escape);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn snapshot_carries_cursor_and_window_size() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(Some(Vec2::new(100.0, 200.0)));
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.window_size(), (1280, 720));
        assert_eq!(snapshot.cursor_position_px(), Some(Vec2::new(100.0, 200.0)));

        input.set_cursor_position_px(None);
        assert_eq!(input.snapshot_for_tick().cursor_position_px(), None);
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }

    #[test]
    fn render_cap_zero_is_off() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(format_render_cap(normalize_render_fps_cap(Some(0))), "off");
        assert_eq!(format_render_cap(Some(60)), "60");
    }
}

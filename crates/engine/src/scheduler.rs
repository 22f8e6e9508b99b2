//! Frame scheduler: the fixed-rate engine loop.
//!
//! Runs `PreStep -> user pre -> Step -> user post -> PostStep ->
//! TimingLog -> Sync` until a quit is observed, with strict phase
//! barriers over the entity registry. The sync phase spin-waits to the
//! frame deadline: CPU is traded for scheduling precision, which holds
//! frame pacing steady at terminal-game rates.

use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, trace};

use tui_arcade_audio::Mixer;
use tui_arcade_canvas::{compose_into, frame_buffer_for, FrameBuffer};
use tui_arcade_input::EventSource;
use tui_arcade_types::{CellColor, CollisionKind, Layer, DEFAULT_FRAME_RATE};

use crate::entity::{Entity, EntityId, EntityRegistry};
use crate::world::{Command, World};

/// Display collaborator boundary.
///
/// The engine composites into a [`FrameBuffer`] and hands it over once
/// per frame; the surface decides what actually needs redrawing.
pub trait Surface {
    /// Present one composited frame. Returns whether anything was flushed
    /// to the underlying display (false = frame had no changes).
    fn present(&mut self, frame: &FrameBuffer) -> Result<bool>;

    /// Force the next present to redraw every cell, discarding whatever
    /// the surface believes is on screen.
    fn invalidate(&mut self) {}
}

/// Application callbacks around the entity phases.
///
/// The owning application hands this to [`Engine::run`]; together with
/// [`World`] it replaces any need for global engine state.
pub trait Game {
    /// Runs once before the first frame.
    fn init(&mut self, world: &mut World) {
        let _ = world;
    }

    /// Runs every frame after PreStep, before entity `step`s.
    fn pre_step(&mut self, world: &mut World) {
        let _ = world;
    }

    /// Runs every frame after entity `step`s, before PostStep.
    fn post_step(&mut self, world: &mut World) {
        let _ = world;
    }
}

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Canvas width in cells.
    pub canvas_w: u16,
    /// Canvas height in cells.
    pub canvas_h: u16,
    /// Frame rate cap in frames per second.
    pub frame_rate: u32,
    /// Title for the hosting terminal window.
    pub title: String,
    /// Composite the debug layer and run the timing log.
    pub debug_mode: bool,
    /// Extend the debug overlay with delta/frame-time detail.
    pub debug_complex: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_w: 80,
            canvas_h: 24,
            frame_rate: DEFAULT_FRAME_RATE,
            title: "tui-arcade".to_string(),
            debug_mode: false,
            debug_complex: false,
        }
    }
}

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

/// The frame scheduler, generic over the display surface and the input
/// event source so it runs identically against a terminal or a test
/// harness.
pub struct Engine<S: Surface, E: EventSource> {
    world: World,
    entities: EntityRegistry,
    surface: S,
    events: E,
    composited: FrameBuffer,
    frame_budget: Duration,
    started: Instant,
    frame_check: u32,
    second_check: u64,
    state: RunState,
}

impl<S: Surface, E: EventSource> Engine<S, E> {
    pub fn new(config: EngineConfig, surface: S, events: E, audio: Option<Mixer>) -> Self {
        let frame_budget =
            Duration::from_nanos(1_000_000_000 / u64::from(config.frame_rate.max(1)));
        let mut world = World::new(config.canvas_w, config.canvas_h, audio, frame_budget);
        world.debug_mode = config.debug_mode;
        world.debug_complex = config.debug_complex;
        let composited = frame_buffer_for(&world.canvas);
        Self {
            world,
            entities: EntityRegistry::new(),
            surface,
            events,
            composited,
            frame_budget,
            started: Instant::now(),
            frame_check: 0,
            second_check: 1,
            state: RunState::Idle,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Pre-run setup access: register sounds, spawn initial entities.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Drive the frame loop until a quit is observed.
    ///
    /// A quit seen during PreStep finishes the frame through PostStep
    /// before the loop exits - no mid-frame abort. Shutdown drops all
    /// remaining entities with the engine.
    pub fn run(&mut self, game: &mut dyn Game) -> Result<()> {
        self.state = RunState::Running;
        self.started = Instant::now();
        // A stop requested during a previous run does not carry over.
        self.world.quit = false;
        game.init(&mut self.world);
        self.apply_commands();

        while !self.quitting() {
            self.frame(game)?;
        }

        self.state = RunState::Stopped;
        debug!(
            "engine stopped after {} frames",
            self.world.elapsed_frames
        );
        Ok(())
    }

    /// Run exactly one frame. Exposed for tests and external drivers that
    /// pace themselves.
    pub fn frame(&mut self, game: &mut dyn Game) -> Result<()> {
        let frame_start = Instant::now();

        // PreStep: entity begin hooks, audio loop feeding, input drain.
        self.apply_commands();
        self.entities
            .for_each(|entity| entity.begin_step(&mut self.world));
        self.apply_commands();
        if let Some(mixer) = self.world.audio.as_mut() {
            mixer.feed_loops();
        }
        self.events.drain(&mut self.world.input)?;
        if self.world.input.take_resized() {
            self.surface.invalidate();
        }

        game.pre_step(&mut self.world);
        self.apply_commands();

        // Step: entities draw, then the layers flatten.
        self.entities.for_each(|entity| entity.step(&mut self.world));
        self.apply_commands();
        compose_into(
            &self.world.canvas,
            self.world.debug_mode,
            &mut self.composited,
        );

        game.post_step(&mut self.world);
        self.apply_commands();

        // PostStep: present, then reset the single-frame-scoped planes.
        self.world.elapsed_frames += 1;
        let flushed = self.surface.present(&self.composited)?;
        if flushed {
            trace!("frame {}: surface flushed", self.world.elapsed_frames);
        }
        self.world.canvas.clear_layer(Layer::Entity);
        self.world.canvas.clear_layer(Layer::Debug);
        self.world.collision.clear(CollisionKind::Dynamic);
        self.entities
            .for_each(|entity| entity.end_step(&mut self.world));
        self.apply_commands();

        if self.quitting() {
            return Ok(());
        }

        // TimingLog
        if self.world.debug_mode {
            self.log_frame_timing();
        }

        // Sync: spin to the deadline, then record the true frame time.
        let deadline = frame_start + self.frame_budget;
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
        self.world.frame_time = frame_start.elapsed();
        Ok(())
    }

    fn quitting(&self) -> bool {
        self.world.quit || self.world.input.quit_requested()
    }

    fn apply_commands(&mut self) {
        for command in self.world.commands.drain(..) {
            match command {
                Command::Spawn(id, entity) => self.entities.insert(id, entity),
                Command::Despawn(id) => {
                    self.entities.remove(id);
                }
            }
        }
    }

    fn log_frame_timing(&mut self) {
        self.frame_check += 1;
        let seconds = self.started.elapsed().as_secs_f64();
        while seconds > self.second_check as f64 {
            self.world.fps = self.frame_check;
            self.frame_check = 0;
            self.second_check += 1;
        }

        let fps = self.world.fps;
        let overlay = CellColor::default();
        if self.world.debug_complex {
            let line = format!(
                "delta: {:.3}  elapsed: {:.1}s  frames: {}",
                self.world.delta_time(),
                seconds,
                self.world.elapsed_frames
            );
            self.world.draw_text(0, 0, Layer::Debug, &line, overlay);
            let line = format!(
                "frame: {:.2} ms  fps: {}",
                self.world.frame_time().as_secs_f64() * 1_000.0,
                fps
            );
            self.world.draw_text(0, 1, Layer::Debug, &line, overlay);
        } else {
            let line = format!("fps: {fps}");
            self.world.draw_text(0, 0, Layer::Debug, &line, overlay);
        }
        debug!(
            "frame={} fps={} lateness={:.3}",
            self.world.elapsed_frames,
            fps,
            self.world.delta_time()
        );
    }
}

//! The world: everything game code touches during a frame.
//!
//! One `World` is constructed by the engine and handed by mutable
//! reference to every entity hook and game callback - explicit dependency
//! injection, no ambient engine global. It owns the canvas, collision
//! field, input snapshot, sound bank and (optionally) the audio mixer,
//! all mutated exclusively from the frame-loop thread.
//!
//! Audio operations follow the engine's steady-state error policy: once
//! the mixer exists they are not expected to fail, so failures are logged
//! and swallowed rather than propagated into game logic.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::warn;

use tui_arcade_audio::{Mixer, Synth, SynthHandle};
use tui_arcade_audio::{Sample, SoundBank};
use tui_arcade_canvas::{CollisionField, LayerCanvas};
use tui_arcade_input::InputState;
use tui_arcade_types::{CellColor, ChannelState, CollisionKind, Layer};

use crate::entity::{Entity, EntityId};

/// Deferred entity mutation, applied by the scheduler between lifecycle
/// phases so hooks can spawn and despawn mid-iteration.
pub(crate) enum Command {
    Spawn(EntityId, Box<dyn Entity>),
    Despawn(EntityId),
}

/// Utility RNG for game logic (`World::rand_range`).
#[derive(Debug, Clone)]
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

/// Frame-loop context injected into entities and game callbacks.
pub struct World {
    pub(crate) canvas: LayerCanvas,
    pub(crate) collision: CollisionField,
    pub(crate) input: InputState,
    pub(crate) audio: Option<Mixer>,
    sounds: SoundBank,
    rng: Lcg,
    pub(crate) commands: Vec<Command>,
    next_entity_id: u64,
    pub(crate) quit: bool,
    pub(crate) elapsed_frames: u64,
    pub(crate) frame_time: Duration,
    pub(crate) frame_budget: Duration,
    pub(crate) fps: u32,
    /// Composite the debug layer and run the timing log.
    pub debug_mode: bool,
    /// Extend the debug overlay with delta/frame-time detail.
    pub debug_complex: bool,
}

impl World {
    pub(crate) fn new(
        canvas_w: u16,
        canvas_h: u16,
        audio: Option<Mixer>,
        frame_budget: Duration,
    ) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(1);
        Self {
            canvas: LayerCanvas::new(canvas_w, canvas_h),
            collision: CollisionField::new(canvas_w, canvas_h),
            input: InputState::new(),
            audio,
            sounds: SoundBank::new(),
            rng: Lcg::new(seed),
            commands: Vec::new(),
            next_entity_id: 0,
            quit: false,
            elapsed_frames: 0,
            frame_time: Duration::ZERO,
            frame_budget,
            fps: 0,
            debug_mode: false,
            debug_complex: false,
        }
    }

    /// World with no audio device, paced at 60 fps. Intended for tests
    /// and headless tools.
    pub fn headless(canvas_w: u16, canvas_h: u16) -> Self {
        Self::new(canvas_w, canvas_h, None, Duration::from_nanos(16_666_666))
    }

    // --- canvas -----------------------------------------------------------

    pub fn canvas_w(&self) -> u16 {
        self.canvas.width()
    }

    pub fn canvas_h(&self) -> u16 {
        self.canvas.height()
    }

    pub fn set_char(&mut self, x: i32, y: i32, layer: Layer, ch: char) {
        self.canvas.set_char(x, y, layer, ch);
    }

    pub fn set_color(&mut self, x: i32, y: i32, layer: Layer, color: CellColor) {
        self.canvas.set_color(x, y, layer, color);
    }

    pub fn get_char(&self, x: i32, y: i32, layer: Layer) -> Option<char> {
        self.canvas.get_char(x, y, layer)
    }

    pub fn get_color(&self, x: i32, y: i32, layer: Layer) -> Option<CellColor> {
        self.canvas.get_color(x, y, layer)
    }

    pub fn put(&mut self, x: i32, y: i32, layer: Layer, ch: char, color: CellColor) {
        self.canvas.put(x, y, layer, ch, color);
    }

    pub fn draw_text(&mut self, x: i32, y: i32, layer: Layer, text: &str, color: CellColor) {
        self.canvas.draw_text(x, y, layer, text, color);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        layer: Layer,
        color: CellColor,
        ch: char,
    ) {
        self.canvas.draw_line(x0, y0, x1, y1, layer, color, ch);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        layer: Layer,
        color: CellColor,
        ch: char,
    ) {
        self.canvas.draw_rect(x, y, w, h, layer, color, ch);
    }

    pub fn clear_layer(&mut self, layer: Layer) {
        self.canvas.clear_layer(layer);
    }

    // --- collision --------------------------------------------------------

    pub fn collision(&self, x: i32, y: i32, kind: CollisionKind) -> i32 {
        self.collision.get(x, y, kind)
    }

    pub fn set_collision(&mut self, x: i32, y: i32, kind: CollisionKind, value: i32) {
        self.collision.set(x, y, kind, value);
    }

    pub fn clear_collision(&mut self, kind: CollisionKind) {
        self.collision.clear(kind);
    }

    // --- entities ---------------------------------------------------------

    /// Queue an entity for registration. The id is live immediately; the
    /// entity joins the registry at the next phase boundary.
    pub fn spawn(&mut self, entity: impl Entity + 'static) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.commands.push(Command::Spawn(id, Box::new(entity)));
        id
    }

    /// Queue an entity for removal at the next phase boundary.
    pub fn despawn(&mut self, id: EntityId) {
        self.commands.push(Command::Despawn(id));
    }

    // --- input ------------------------------------------------------------

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Stop the frame loop after the current frame completes.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    // --- audio ------------------------------------------------------------

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn sounds(&self) -> &SoundBank {
        &self.sounds
    }

    /// Register a pre-decoded sample, returning its bank index.
    pub fn add_sound(&mut self, sample: Sample) -> usize {
        self.sounds.add(sample)
    }

    pub fn remove_sound(&mut self, index: usize) {
        self.sounds.remove(index);
    }

    /// Play a registered sample on a channel. Unknown indices and audio
    /// errors are logged, not surfaced.
    pub fn play_sound(&mut self, sound: usize, channel: usize, looping: bool) {
        let Some(mixer) = self.audio.as_mut() else {
            return;
        };
        let Some(sample) = self.sounds.get(sound) else {
            warn!("play_sound: no sample registered at index {sound}");
            return;
        };
        if let Err(err) = mixer.play_sample(sample, channel, looping) {
            warn!("play_sound: channel {channel}: {err:#}");
        }
    }

    /// Bind a synth to a channel, returning the live-parameter handle.
    /// `None` when running without audio or when binding fails.
    pub fn bind_synth(&mut self, synth: Synth, channel: usize) -> Option<SynthHandle> {
        let mixer = self.audio.as_mut()?;
        match mixer.bind_synth(synth, channel) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("bind_synth: channel {channel}: {err:#}");
                None
            }
        }
    }

    pub fn pause_channel(&mut self, channel: usize) {
        if let Some(mixer) = self.audio.as_mut() {
            mixer.pause(channel);
        }
    }

    pub fn resume_channel(&mut self, channel: usize) {
        if let Some(mixer) = self.audio.as_mut() {
            mixer.resume(channel);
        }
    }

    /// Stop a channel. For synth channels this blocks until the
    /// generation thread has exited.
    pub fn stop_channel(&mut self, channel: usize) {
        if let Some(mixer) = self.audio.as_mut() {
            if let Err(err) = mixer.stop(channel) {
                warn!("stop_channel: channel {channel}: {err:#}");
            }
        }
    }

    pub fn cancel_channel_loop(&mut self, channel: usize) {
        if let Some(mixer) = self.audio.as_mut() {
            mixer.cancel_loop(channel);
        }
    }

    pub fn channel_state(&self, channel: usize) -> ChannelState {
        match &self.audio {
            Some(mixer) => mixer.state(channel),
            None => ChannelState::Uninit,
        }
    }

    // --- timing & misc ----------------------------------------------------

    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    /// Normalized lateness of the last frame: 0 when the frame met its
    /// budget, positive when it overran (1.0 = a full budget late).
    pub fn delta_time(&self) -> f64 {
        let budget = self.frame_budget.as_secs_f64();
        if budget == 0.0 {
            return 0.0;
        }
        (self.frame_time.as_secs_f64() / budget - 1.0).max(0.0)
    }

    /// Duration of the last completed frame, including sync.
    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// Rolling one-second frame rate. Only updated while `debug_mode` is
    /// on (the timing-log phase is gated by it).
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Uniform random integer in `[min, max]`, both ends inclusive.
    pub fn rand_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as u32 + 1;
        min + (self.rng.next_u32() % span) as i32
    }
}

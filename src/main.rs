//! Demo runner (default binary).
//!
//! A bouncing glyph over a dotted backdrop, with a synth voice tracking
//! its position: height maps to pitch, horizontal position to stereo
//! pan. Keys 1-6 switch the waveform, `p`/`o` pause/resume the voice,
//! `q` or Ctrl+C quits. Runs silent when no audio device is available.
//!
//! Logging goes to stderr; redirect it (`2>demo.log`) to keep the
//! alternate screen clean while watching frame timing with
//! `RUST_LOG=debug`.

use anyhow::Result;
use log::warn;

use tui_arcade::audio::{Mixer, Synth, SynthHandle};
use tui_arcade::engine::{Engine, EngineConfig, Entity, Game, World};
use tui_arcade::input::{KeyCode, TerminalEvents};
use tui_arcade::term::TerminalSurface;
use tui_arcade::types::{CellColor, Layer, Rgb, Waveform, DEFAULT_AUDIO_CHANNELS};

struct Bouncer {
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    tone: Option<SynthHandle>,
}

impl Bouncer {
    fn new(tone: Option<SynthHandle>) -> Self {
        Self {
            x: 2.0,
            y: 2.0,
            dx: 0.6,
            dy: 0.35,
            tone,
        }
    }
}

impl Entity for Bouncer {
    fn step(&mut self, world: &mut World) {
        let w = f64::from(world.canvas_w());
        let h = f64::from(world.canvas_h());

        self.x += self.dx;
        self.y += self.dy;
        if self.x <= 1.0 || self.x >= w - 2.0 {
            self.dx = -self.dx;
            self.x = self.x.clamp(1.0, w - 2.0);
        }
        if self.y <= 1.0 || self.y >= h - 2.0 {
            self.dy = -self.dy;
            self.y = self.y.clamp(1.0, h - 2.0);
        }

        world.put(
            self.x as i32,
            self.y as i32,
            Layer::Entity,
            '@',
            CellColor::new(Rgb::new(255, 220, 0), Rgb::BLACK),
        );

        if let Some(tone) = &self.tone {
            tone.set_frequency(160.0 + (1.0 - self.y / h) as f32 * 440.0);
            tone.set_pan((self.x / w) as f32);
        }
    }
}

struct Demo {
    tone: Option<SynthHandle>,
}

impl Game for Demo {
    fn init(&mut self, world: &mut World) {
        let w = i32::from(world.canvas_w());
        let h = i32::from(world.canvas_h());
        let dim = CellColor::new(Rgb::new(80, 80, 80), Rgb::BLACK);

        for y in (2..h - 1).step_by(2) {
            for x in (2..w - 1).step_by(4) {
                world.put(x, y, Layer::Background, '.', dim);
            }
        }
        let frame = CellColor::new(Rgb::new(140, 140, 140), Rgb::BLACK);
        world.draw_line(0, 0, w - 1, 0, Layer::Background, frame, '#');
        world.draw_line(0, h - 1, w - 1, h - 1, Layer::Background, frame, '#');
        world.draw_line(0, 0, 0, h - 1, Layer::Background, frame, '#');
        world.draw_line(w - 1, 0, w - 1, h - 1, Layer::Background, frame, '#');

        world.draw_text(
            2,
            h - 1,
            Layer::Ui,
            " 1-6 waveform  p/o pause/resume  q quit ",
            CellColor::new(Rgb::WHITE, Rgb::new(40, 40, 40)),
        );

        self.tone = world.bind_synth(
            Synth {
                frequency: 220.0,
                volume: 0.4,
                waveform: Waveform::Triangle,
                ..Synth::default()
            },
            0,
        );
        world.spawn(Bouncer::new(self.tone.clone()));
    }

    fn pre_step(&mut self, world: &mut World) {
        if world.input().key_down(KeyCode::Char('q')) {
            world.quit();
        }
        if world.input().key_down(KeyCode::Char('p')) {
            world.pause_channel(0);
        }
        if world.input().key_down(KeyCode::Char('o')) {
            world.resume_channel(0);
        }
        if let Some(tone) = &self.tone {
            let waveforms = [
                ('1', Waveform::Sine),
                ('2', Waveform::Square),
                ('3', Waveform::Pulse),
                ('4', Waveform::Sawtooth),
                ('5', Waveform::Triangle),
                ('6', Waveform::Noise),
            ];
            for (key, waveform) in waveforms {
                if world.input().key_down(KeyCode::Char(key)) {
                    tone.set_waveform(waveform);
                }
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = EngineConfig {
        canvas_w: 80,
        canvas_h: 24,
        title: "tui-arcade demo".to_string(),
        debug_mode: true,
        ..EngineConfig::default()
    };

    let mixer = match Mixer::new(DEFAULT_AUDIO_CHANNELS) {
        Ok(mixer) => Some(mixer),
        Err(err) => {
            warn!("audio unavailable, running silent: {err:#}");
            None
        }
    };

    let mut surface = TerminalSurface::new();
    surface.enter(&config.title)?;

    let mut engine = Engine::new(config, surface, TerminalEvents::new(), mixer);
    let result = engine.run(&mut Demo { tone: None });

    // Always try to restore terminal state.
    let _ = engine.surface_mut().exit();
    result
}

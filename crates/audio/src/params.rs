//! Live synthesizer parameters shared between the frame loop and a
//! generation thread.
//!
//! Game logic writes individual fields at any time; the generation loop
//! reads a whole [`ParamSnapshot`] once per block. Fields are independent
//! relaxed atomics - there is deliberately no cross-field ordering
//! guarantee, only freedom from torn reads. A write lands at the next
//! block boundary at the latest.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use tui_arcade_types::Waveform;

/// Initial description of a synthesizer voice, handed to
/// [`Mixer::bind_synth`](crate::Mixer::bind_synth).
#[derive(Debug, Clone)]
pub struct Synth {
    /// Oscillator frequency in Hz. Frequencies at or above half the
    /// sample rate alias; no anti-aliasing is applied.
    pub frequency: f32,
    /// Final linear gain.
    pub volume: f32,
    pub waveform: Waveform,
    /// Stereo position in [0, 1]: 0 full left, 1 full right, 0.5 centered.
    pub pan: f32,
    /// When > 0, pan is modulated by a sine at this frequency.
    pub pan_freq: f32,
    /// Threshold for the pulse waveform, in [0, 1].
    pub pulse_width: f32,
    /// When > 0, pulse width is modulated by a sine at this frequency.
    pub pulse_width_freq: f32,
}

impl Default for Synth {
    fn default() -> Self {
        Self {
            frequency: 50.0,
            volume: 1.0,
            waveform: Waveform::Sine,
            pan: 0.5,
            pan_freq: 0.0,
            pulse_width: 0.5,
            pulse_width_freq: 0.0,
        }
    }
}

/// Atomic-per-field parameter bag. The only structure in the engine that
/// crosses threads.
#[derive(Debug)]
pub struct SynthParams {
    frequency: AtomicU32,
    volume: AtomicU32,
    waveform: AtomicU8,
    pan: AtomicU32,
    pan_freq: AtomicU32,
    pulse_width: AtomicU32,
    pulse_width_freq: AtomicU32,
}

fn atomic_f32(value: f32) -> AtomicU32 {
    AtomicU32::new(value.to_bits())
}

impl SynthParams {
    /// Build from an initial description, clamping `pan` and
    /// `pulse_width` into range once at bind time.
    pub fn new(synth: &Synth) -> Self {
        Self {
            frequency: atomic_f32(synth.frequency),
            volume: atomic_f32(synth.volume),
            waveform: AtomicU8::new(synth.waveform.as_u8()),
            pan: atomic_f32(synth.pan.clamp(0.0, 1.0)),
            pan_freq: atomic_f32(synth.pan_freq),
            pulse_width: atomic_f32(synth.pulse_width.clamp(0.0, 1.0)),
            pulse_width_freq: atomic_f32(synth.pulse_width_freq),
        }
    }

    pub fn set_frequency(&self, hz: f32) {
        self.frequency.store(hz.to_bits(), Ordering::Relaxed);
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.as_u8(), Ordering::Relaxed);
    }

    pub fn set_pan(&self, pan: f32) {
        self.pan.store(pan.to_bits(), Ordering::Relaxed);
    }

    pub fn set_pan_freq(&self, hz: f32) {
        self.pan_freq.store(hz.to_bits(), Ordering::Relaxed);
    }

    pub fn set_pulse_width(&self, width: f32) {
        self.pulse_width.store(width.to_bits(), Ordering::Relaxed);
    }

    pub fn set_pulse_width_freq(&self, hz: f32) {
        self.pulse_width_freq.store(hz.to_bits(), Ordering::Relaxed);
    }

    /// Copy every field. Called by the generation loop at each block
    /// boundary.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            frequency: f32::from_bits(self.frequency.load(Ordering::Relaxed)),
            volume: f32::from_bits(self.volume.load(Ordering::Relaxed)),
            waveform: Waveform::from_u8(self.waveform.load(Ordering::Relaxed)),
            pan: f32::from_bits(self.pan.load(Ordering::Relaxed)),
            pan_freq: f32::from_bits(self.pan_freq.load(Ordering::Relaxed)),
            pulse_width: f32::from_bits(self.pulse_width.load(Ordering::Relaxed)),
            pulse_width_freq: f32::from_bits(self.pulse_width_freq.load(Ordering::Relaxed)),
        }
    }
}

/// One block's worth of parameter values.
#[derive(Debug, Clone, Copy)]
pub struct ParamSnapshot {
    pub frequency: f32,
    pub volume: f32,
    pub waveform: Waveform,
    pub pan: f32,
    pub pan_freq: f32,
    pub pulse_width: f32,
    pub pulse_width_freq: f32,
}

impl ParamSnapshot {
    /// Clamp range-bound fields. Applied every block: the bind-time clamp
    /// does not protect against later out-of-range writes.
    pub fn clamped(mut self) -> Self {
        self.pan = self.pan.clamp(0.0, 1.0);
        self.pulse_width = self.pulse_width.clamp(0.0, 1.0);
        self
    }
}

/// Cloneable handle for mutating a bound synth from game logic.
#[derive(Debug, Clone)]
pub struct SynthHandle {
    params: Arc<SynthParams>,
}

impl SynthHandle {
    pub(crate) fn new(params: Arc<SynthParams>) -> Self {
        Self { params }
    }

    pub fn set_frequency(&self, hz: f32) {
        self.params.set_frequency(hz);
    }

    pub fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.params.set_waveform(waveform);
    }

    pub fn set_pan(&self, pan: f32) {
        self.params.set_pan(pan);
    }

    pub fn set_pan_freq(&self, hz: f32) {
        self.params.set_pan_freq(hz);
    }

    pub fn set_pulse_width(&self, width: f32) {
        self.params.set_pulse_width(width);
    }

    pub fn set_pulse_width_freq(&self, hz: f32) {
        self.params.set_pulse_width_freq(hz);
    }
}

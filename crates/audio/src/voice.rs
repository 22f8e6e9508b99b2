//! Waveform block generation.
//!
//! A [`Voice`] owns the oscillator state (phase accumulators and the
//! noise generator) for one synth binding. It is pure with respect to
//! I/O: the generation thread feeds it parameter snapshots and it fills
//! interleaved stereo blocks, which keeps every waveform property
//! testable without an audio device.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use tui_arcade_types::Waveform;

use crate::params::ParamSnapshot;

/// Small LCG used for the noise waveform; one generator per voice so a
/// block never touches the OS entropy pool.
#[derive(Debug, Clone)]
struct NoiseRng {
    state: u32,
}

impl NoiseRng {
    fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in [-1, 1].
    fn next_f32(&mut self) -> f32 {
        let bits = self.next_u32() >> 8; // 24 significant bits
        (bits as f32 / 8_388_607.5) - 1.0
    }
}

fn deterministic_sample(phase: f32, waveform: Waveform, pulse_width: f32) -> f32 {
    let turn = phase * TAU;
    match waveform {
        Waveform::Sine => turn.sin(),
        Waveform::Square => {
            if turn.sin() > 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Pulse => {
            if turn.sin() > pulse_width {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
        Waveform::Triangle => (turn + FRAC_PI_2).cos().acos() * (2.0 / PI) - 1.0,
        // Noise is drawn per channel by the caller.
        Waveform::Noise => 0.0,
    }
}

/// Oscillator state for one synth binding.
#[derive(Debug, Clone)]
pub struct Voice {
    sample_rate: f32,
    phase: f32,
    pan_phase: f32,
    pw_phase: f32,
    noise: NoiseRng,
}

impl Voice {
    /// The modulation phase accumulators start from the bound pan and
    /// pulse-width values so a freshly bound voice picks up where its
    /// parameters point.
    pub fn new(initial: &ParamSnapshot, sample_rate: u32, seed: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            phase: 0.0,
            pan_phase: initial.pan.clamp(0.0, 1.0),
            pw_phase: initial.pulse_width.clamp(0.0, 1.0),
            noise: NoiseRng::new(seed),
        }
    }

    /// Fill `out` with interleaved stereo samples for one block.
    ///
    /// `out.len()` must be even; each pair is one (left, right) frame.
    /// The phase advances by `frequency / sample_rate` once per frame and
    /// wraps to [0, 1) by a single subtraction, which assumes
    /// `frequency < sample_rate / 2` (anything higher aliases).
    pub fn fill(&mut self, params: &ParamSnapshot, out: &mut [f32]) {
        debug_assert!(out.len() % 2 == 0);
        let p = params.clamped();
        let mut pan = p.pan;
        let mut pulse_width = p.pulse_width;

        for frame in out.chunks_exact_mut(2) {
            let (left_sample, right_sample) = if p.waveform == Waveform::Noise {
                // Independent draw per output sample, per channel.
                (self.noise.next_f32(), self.noise.next_f32())
            } else {
                let s = deterministic_sample(self.phase, p.waveform, pulse_width);
                (s, s)
            };

            let left_gain = (pan - 1.0).abs();
            let right_gain = 1.0 - left_gain;
            frame[0] = left_sample * left_gain * p.volume;
            frame[1] = right_sample * right_gain * p.volume;

            self.phase += p.frequency / self.sample_rate;
            if self.phase > 1.0 {
                self.phase -= 1.0;
            }

            if p.pan_freq > 0.0 {
                self.pan_phase += p.pan_freq / self.sample_rate;
                pan = (self.pan_phase * TAU).sin() / 2.0 + 0.5;
                if self.pan_phase > 1.0 {
                    self.pan_phase -= 1.0;
                }
            }
            if p.pulse_width_freq > 0.0 {
                self.pw_phase += p.pulse_width_freq / self.sample_rate;
                pulse_width = (self.pw_phase * TAU).sin() / 2.0 * 0.99 + 0.5;
                if self.pw_phase > 1.0 {
                    self.pw_phase -= 1.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Synth, SynthParams};

    fn snapshot(synth: Synth) -> ParamSnapshot {
        SynthParams::new(&synth).snapshot()
    }

    fn block(snapshot: &ParamSnapshot, frames: usize) -> Vec<f32> {
        let mut voice = Voice::new(snapshot, 44_100, 7);
        let mut out = vec![0.0; frames * 2];
        voice.fill(snapshot, &mut out);
        out
    }

    #[test]
    fn centered_pan_gives_equal_channel_magnitudes_within_bounds() {
        let snap = snapshot(Synth {
            frequency: 440.0,
            ..Synth::default()
        });
        let out = block(&snap, 512);
        for frame in out.chunks_exact(2) {
            assert!(frame[0].abs() <= 1.0 && frame[1].abs() <= 1.0);
            assert!((frame[0].abs() - frame[1].abs()).abs() < 1e-6);
        }
    }

    #[test]
    fn full_left_pan_silences_right_channel() {
        let snap = snapshot(Synth {
            frequency: 440.0,
            pan: 0.0,
            ..Synth::default()
        });
        let out = block(&snap, 64);
        for frame in out.chunks_exact(2) {
            assert_eq!(frame[1], 0.0);
        }
        assert!(out.iter().step_by(2).any(|s| s.abs() > 0.1));
    }

    #[test]
    fn square_wave_is_binary_at_half_gain() {
        let snap = snapshot(Synth {
            frequency: 100.0,
            waveform: Waveform::Square,
            ..Synth::default()
        });
        // Centered pan halves each channel's gain.
        for s in block(&snap, 256) {
            assert!((s.abs() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn sawtooth_ramps_upward_within_one_period() {
        let snap = snapshot(Synth {
            frequency: 100.0,
            waveform: Waveform::Sawtooth,
            pan: 1.0, // full right: right channel carries the raw ramp
            ..Synth::default()
        });
        let out = block(&snap, 64);
        let right: Vec<f32> = out.iter().skip(1).step_by(2).copied().collect();
        for pair in right.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!((right[0] - -1.0).abs() < 1e-3);
    }

    #[test]
    fn noise_stays_in_range_and_varies() {
        let snap = snapshot(Synth {
            waveform: Waveform::Noise,
            volume: 1.0,
            pan: 0.0,
            ..Synth::default()
        });
        let out = block(&snap, 512);
        let left: Vec<f32> = out.iter().step_by(2).copied().collect();
        assert!(left.iter().all(|s| s.abs() <= 1.0));
        let first = left[0];
        assert!(left.iter().any(|s| (s - first).abs() > 1e-3));
    }

    #[test]
    fn volume_scales_linearly() {
        let loud = snapshot(Synth {
            frequency: 440.0,
            pan: 1.0,
            ..Synth::default()
        });
        let quiet = snapshot(Synth {
            frequency: 440.0,
            pan: 1.0,
            volume: 0.25,
            ..Synth::default()
        });
        let loud_out = block(&loud, 32);
        let quiet_out = block(&quiet, 32);
        for (l, q) in loud_out.iter().zip(quiet_out.iter()) {
            assert!((l * 0.25 - q).abs() < 1e-6);
        }
    }

    #[test]
    fn phase_stays_wrapped_over_many_blocks() {
        let snap = snapshot(Synth {
            frequency: 19_999.0, // just under Nyquist
            ..Synth::default()
        });
        let mut voice = Voice::new(&snap, 44_100, 1);
        let mut out = vec![0.0; 128];
        for _ in 0..100 {
            voice.fill(&snap, &mut out);
            assert!(voice.phase >= 0.0 && voice.phase < 1.0);
        }
    }

    #[test]
    fn pan_modulation_moves_energy_between_channels() {
        let snap = snapshot(Synth {
            frequency: 440.0,
            waveform: Waveform::Square,
            pan_freq: 200.0,
            ..Synth::default()
        });
        let mut voice = Voice::new(&snap, 44_100, 1);
        let mut out = vec![0.0; 44_100 / 5 * 2];
        voice.fill(&snap, &mut out);
        let left_peak = out.iter().step_by(2).fold(0.0f32, |m, s| m.max(s.abs()));
        let right_peak = out
            .iter()
            .skip(1)
            .step_by(2)
            .fold(0.0f32, |m, s| m.max(s.abs()));
        // Over a full modulation cycle both channels approach full gain.
        assert!(left_peak > 0.9);
        assert!(right_peak > 0.9);
    }
}

//! Audio module - channel mixer and procedural synthesis
//!
//! Playback is organized as a fixed array of channels over one output
//! device. A channel hosts either a pre-decoded sample buffer (with
//! watermark-based loop re-feeding) or a live synth binding whose
//! generation thread streams waveform blocks, decoupled from the frame
//! clock, until it is stopped.
//!
//! # Threading
//!
//! ```text
//! Frame loop                      Generation thread           Output
//!     |                                 |                       |
//! [SynthHandle::set_*]--(atomics)-->[snapshot at block start]   |
//!     |                            [fill block]---(sink)---->[device]
//! [Mixer::stop]------(state+join)-->[observe, exit]             |
//! ```
//!
//! The parameter bag is the only cross-thread structure; everything else
//! is owned by exactly one side. `stop` joins the generation thread
//! before its channel can be reused.
//!
//! # Latency
//!
//! The generator keeps at most one spare block queued behind the playing
//! one, so parameter changes land within roughly two block durations
//! (about 23 ms at the default block size).

pub mod mixer;
pub mod params;
pub mod sample;
pub mod voice;

pub use mixer::Mixer;
pub use params::{ParamSnapshot, Synth, SynthHandle, SynthParams};
pub use sample::{Sample, SoundBank};
pub use voice::Voice;

/// Synthesis sample rate. The output device may differ; the sink
/// resamples.
pub const SAMPLE_RATE: u32 = 44_100;

/// Frames (stereo pairs) generated per block.
pub const BLOCK_FRAMES: usize = 512;

//! Pre-decoded PCM samples and the index-addressed sound bank.
//!
//! Decoding and file I/O happen outside the engine; what arrives here is
//! interleaved `f32` PCM plus its format. Samples share their frames
//! behind an `Arc`, so playing the same sound on several channels costs
//! one allocation per queued buffer, not per sample.

use std::sync::Arc;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;

/// One pre-decoded sound: interleaved `f32` frames plus format.
#[derive(Debug, Clone)]
pub struct Sample {
    channels: u16,
    sample_rate: u32,
    frames: Arc<[f32]>,
}

impl Sample {
    pub fn new(channels: u16, sample_rate: u32, data: Vec<f32>) -> Self {
        Self {
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
            frames: data.into(),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total interleaved sample count (all channels).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration(&self) -> Duration {
        let per_channel = self.frames.len() / usize::from(self.channels);
        Duration::from_secs_f64(per_channel as f64 / f64::from(self.sample_rate))
    }

    pub(crate) fn to_source(&self) -> SamplesBuffer<f32> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.frames.to_vec())
    }
}

/// Index-addressed store of loaded samples.
///
/// Removal leaves a hole rather than shifting, so indices handed to game
/// logic stay valid for the samples that remain.
#[derive(Debug, Default)]
pub struct SoundBank {
    samples: Vec<Option<Sample>>,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sample, returning its index.
    pub fn add(&mut self, sample: Sample) -> usize {
        self.samples.push(Some(sample));
        self.samples.len() - 1
    }

    /// Drop the sample at `index`. The slot is not reused.
    pub fn remove(&mut self, index: usize) {
        if let Some(slot) = self.samples.get_mut(index) {
            *slot = None;
        }
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_accounts_for_channel_count() {
        let sample = Sample::new(2, 100, vec![0.0; 400]);
        assert_eq!(sample.duration(), Duration::from_secs(2));
    }

    #[test]
    fn bank_indices_survive_removal() {
        let mut bank = SoundBank::new();
        let a = bank.add(Sample::new(1, 44_100, vec![0.1]));
        let b = bank.add(Sample::new(1, 44_100, vec![0.2]));
        bank.remove(a);
        assert!(bank.get(a).is_none());
        let kept = bank.get(b).unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn removing_bogus_index_is_a_no_op() {
        let mut bank = SoundBank::new();
        bank.remove(5);
        assert!(bank.is_empty());
    }
}

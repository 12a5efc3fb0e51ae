//! Synthetic audio for driving the analyser

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pure sine tone
pub fn tone(freq_hz: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
    let step = std::f32::consts::TAU * freq_hz / sample_rate as f32;
    (0..len).map(|i| amplitude * (step * i as f32).sin()).collect()
}

/// Silence
pub fn silence(len: usize) -> Vec<f32> {
    vec![0.0; len]
}

/// Speech-like PCM generator: a voiced carrier with a couple of harmonics,
/// breath noise, and a syllable-rate amplitude envelope with pauses
#[derive(Debug, Clone)]
pub struct SyntheticVoice {
    sample_rate: u32,
    pitch_hz: f32,
    syllable_hz: f32,
    sample: u64,
    rng: StdRng,
}

impl SyntheticVoice {
    pub fn new(sample_rate: u32, seed: u64) -> Self {
        Self {
            sample_rate,
            pitch_hz: 140.0,
            syllable_hz: 4.0,
            sample: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_pitch(mut self, pitch_hz: f32) -> Self {
        self.pitch_hz = pitch_hz;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Next `len` samples, peak amplitude below 0.5
    pub fn next_chunk(&mut self, len: usize) -> Vec<f32> {
        let rate = self.sample_rate as f32;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            let t = self.sample as f32 / rate;
            self.sample += 1;

            let envelope = ((t * self.syllable_hz * std::f32::consts::TAU).sin()).max(0.0);
            let phase = t * self.pitch_hz * std::f32::consts::TAU;
            let voiced = phase.sin() * 0.6 + (phase * 2.0).sin() * 0.25 + (phase * 3.0).sin() * 0.1;
            let breath = (self.rng.gen::<f32>() - 0.5) * 0.1;

            out.push((voiced + breath) * envelope * 0.45);
        }
        out
    }
}

//! Spectrum analyser - byte frequency data from PCM
//!
//! Mirrors the analyser node browsers expose to web audio graphs: a window
//! over the most recent `fft_size` samples, Blackman window, magnitude
//! spectrum with per-read temporal smoothing, then decibels mapped linearly
//! from [min_db, max_db] onto 0..=255.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use visage_core::{VisageError, VisageResult};

use crate::{SpectrumRead, SpectrumSource};

/// Analyser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// Window length in samples; power of two in [32, 32768]
    pub fft_size: usize,
    /// Weight of the previous magnitude when smoothing (0 = none)
    pub smoothing: f32,
    /// Level mapped to byte 0
    pub min_db: f32,
    /// Level mapped to byte 255
    pub max_db: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl AnalyserConfig {
    pub fn validate(&self) -> VisageResult<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(VisageError::InvalidFftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(VisageError::invalid_config(
                "analyser.smoothing",
                "must be in [0, 1]",
            ));
        }
        if !(self.min_db < self.max_db) {
            return Err(VisageError::InvalidDecibelRange {
                min: self.min_db,
                max: self.max_db,
            });
        }
        Ok(())
    }
}

/// PCM to byte-spectrum analyser
pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Most recent `fft_size` samples, oldest first
    samples: VecDeque<f32>,
    /// Smoothed magnitude per bin
    smoothed: Vec<f32>,
    scratch: Vec<Complex32>,
    detached: bool,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> VisageResult<Self> {
        config.validate()?;
        let n = config.fft_size;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n);

        Ok(Self {
            fft,
            window: blackman_window(n),
            samples: std::iter::repeat(0.0).take(n).collect(),
            smoothed: vec![0.0; n / 2],
            scratch: vec![Complex32::new(0.0, 0.0); n],
            detached: false,
            config,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Number of frequency bins (half the FFT size)
    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Append PCM samples (mono, nominally in [-1, 1])
    pub fn push_samples(&mut self, pcm: &[f32]) {
        let n = self.config.fft_size;
        let pcm = if pcm.len() > n { &pcm[pcm.len() - n..] } else { pcm };
        for &s in pcm {
            if self.samples.len() == n {
                self.samples.pop_front();
            }
            self.samples.push_back(if s.is_finite() { s } else { 0.0 });
        }
    }

    /// Mark the audio input as gone
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Compute byte frequency data for the current window.
    /// Each call advances the temporal smoothing by one step.
    pub fn byte_frequency_data(&mut self, out: &mut Vec<u8>) {
        let n = self.config.fft_size;
        for (i, (slot, &s)) in self.scratch.iter_mut().zip(&self.samples).enumerate() {
            *slot = Complex32::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing;
        let scale = 255.0 / (self.config.max_db - self.config.min_db);
        out.clear();
        out.reserve(n / 2);
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.scratch[k].norm() / n as f32;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            let db = if *smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                f32::NEG_INFINITY
            };
            let byte = ((db - self.config.min_db) * scale).floor();
            out.push(if byte.is_nan() { 0 } else { byte.clamp(0.0, 255.0) as u8 });
        }
    }
}

impl SpectrumSource for SpectrumAnalyser {
    fn read_bins(&mut self, out: &mut Vec<u8>) -> SpectrumRead {
        if self.detached {
            return SpectrumRead::Detached;
        }
        self.byte_frequency_data(out);
        SpectrumRead::Ready
    }
}

impl fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("config", &self.config)
            .field("detached", &self.detached)
            .finish()
    }
}

/// Blackman window (alpha = 0.16)
fn blackman_window(n: usize) -> Vec<f32> {
    let two_pi = std::f32::consts::PI * 2.0;
    (0..n)
        .map(|i| {
            let phi = two_pi * i as f32 / n as f32;
            0.42 - 0.5 * phi.cos() + 0.08 * (2.0 * phi).cos()
        })
        .collect()
}

//! Frequency driver - mouth shapes from live audio energy
//!
//! Mean spectrum energy runs through a single-pole low-pass; the mouth opens
//! with the smoothed energy plus its rate of change, so consonant onsets
//! still read after smoothing. Funnel and pucker only engage at higher
//! energy.

use visage_core::{MOUTH_FUNNEL, MOUTH_OPEN, MOUTH_PUCKER};
use visage_rig::ChannelRegistry;

use crate::{SpectrumRead, SpectrumSource};

/// Upper bound of the energy-driven mouth opening
pub const MAX_MOUTH_OPEN: f32 = 0.9;

/// Outcome of one driver tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    /// Mouth channels were written
    Active,
    /// No driver is live
    Idle,
    /// Audio input is gone; nothing was written
    Detached,
}

/// Audio energy state of one analyser session
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioEnergy {
    pub smoothed: f32,
    pub prev: f32,
}

impl AudioEnergy {
    /// Fold in one frame's energy. Returns the absolute change.
    pub fn update(&mut self, energy: f32) -> f32 {
        self.smoothed = self.smoothed * 0.5 + energy * 0.5;
        let delta = (self.smoothed - self.prev).abs();
        self.prev = self.smoothed;
        delta
    }
}

/// Mean bin magnitude normalized to [0, 1]
pub fn mean_energy(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| b as u64).sum();
    sum as f32 / bins.len() as f32 / 255.0
}

/// Target mouth opening for a smoothed energy and its change
pub fn mouth_open_target(smoothed: f32, delta: f32) -> f32 {
    (smoothed * 4.0 + delta * 3.0).clamp(0.0, MAX_MOUTH_OPEN)
}

/// Energy-driven lip sync
#[derive(Debug, Clone, Default)]
pub struct FrequencyDriver {
    energy: AudioEnergy,
    bins: Vec<u8>,
}

impl FrequencyDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn energy(&self) -> AudioEnergy {
        self.energy
    }

    /// Forget the energy history (new analyser input)
    pub fn reset(&mut self) {
        self.energy = AudioEnergy::default();
    }

    /// Poll the source and drive the mouth
    pub fn tick<S: SpectrumSource + ?Sized>(
        &mut self,
        registry: &mut ChannelRegistry,
        source: &mut S,
    ) -> DriverStatus {
        let mut bins = std::mem::take(&mut self.bins);
        let status = match source.read_bins(&mut bins) {
            SpectrumRead::Ready => {
                self.apply_bins(registry, &bins);
                DriverStatus::Active
            }
            SpectrumRead::Detached => DriverStatus::Detached,
        };
        self.bins = bins;
        status
    }

    /// Drive the mouth from one frame of bins
    pub fn apply_bins(&mut self, registry: &mut ChannelRegistry, bins: &[u8]) {
        let delta = self.energy.update(mean_energy(bins));
        let smoothed = self.energy.smoothed;

        registry.ease_everywhere(MOUTH_OPEN, mouth_open_target(smoothed, delta), 0.5);

        let funnel = if smoothed > 0.3 { smoothed * 0.3 } else { 0.0 };
        registry.ease_everywhere(MOUTH_FUNNEL, funnel, 0.2);

        // below the threshold pucker keeps whatever it had
        if smoothed > 0.5 {
            registry.ease_everywhere(MOUTH_PUCKER, (smoothed - 0.5) * 0.4, 0.2);
        }
    }
}

/// Current value of a channel on the first mesh exposing it
#[cfg(test)]
pub(crate) fn first(registry: &ChannelRegistry, channel: &str) -> f32 {
    registry.values(channel).first().copied().unwrap_or(0.0)
}

#[cfg(test)]
pub(crate) fn mouth_rig() -> ChannelRegistry {
    use visage_rig::{MorphTargets, SceneGraph, SceneNode};
    ChannelRegistry::index(&SceneGraph::new(
        SceneNode::group("root")
            .with_child(SceneNode::mesh(
                "Head",
                MorphTargets::new([MOUTH_OPEN, MOUTH_FUNNEL, MOUTH_PUCKER]),
            ))
            .with_child(SceneNode::mesh("Teeth", MorphTargets::new([MOUTH_OPEN]))),
    ))
}

//! Lip-sync mode - which driver owns the mouth
//!
//! At most one driver is live. Swapping modes drops the old driver's state,
//! so every session starts fresh.

use std::fmt;

use rand::Rng;
use visage_core::MOUTH_CHANNELS;
use visage_rig::ChannelRegistry;

use crate::{DriverStatus, FrequencyDriver, ProceduralConfig, ProceduralDriver, SpectrumSource};

/// Force every lip-sync channel to exactly zero
pub fn close_mouth(registry: &mut ChannelRegistry) {
    for channel in MOUTH_CHANNELS {
        registry.set_everywhere(channel, 0.0);
    }
}

/// Mode tag without the driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LipSyncKind {
    Idle,
    FrequencyDriven,
    ProceduralSpeech,
}

/// Active lip-sync driver
#[derive(Default)]
pub enum LipSyncMode {
    /// Nobody writes the mouth
    #[default]
    Idle,
    /// Live audio energy
    FrequencyDriven {
        driver: FrequencyDriver,
        source: Box<dyn SpectrumSource + Send>,
    },
    /// Synthetic speech
    ProceduralSpeech(ProceduralDriver),
}

impl LipSyncMode {
    /// Frequency-driven mode with fresh energy state
    pub fn frequency(source: Box<dyn SpectrumSource + Send>) -> Self {
        LipSyncMode::FrequencyDriven {
            driver: FrequencyDriver::new(),
            source,
        }
    }

    /// Procedural mode with a fresh speech state
    pub fn procedural(config: ProceduralConfig) -> Self {
        LipSyncMode::ProceduralSpeech(ProceduralDriver::new(config))
    }

    pub fn kind(&self) -> LipSyncKind {
        match self {
            LipSyncMode::Idle => LipSyncKind::Idle,
            LipSyncMode::FrequencyDriven { .. } => LipSyncKind::FrequencyDriven,
            LipSyncMode::ProceduralSpeech(_) => LipSyncKind::ProceduralSpeech,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LipSyncMode::Idle)
    }

    pub fn is_frequency_driven(&self) -> bool {
        matches!(self, LipSyncMode::FrequencyDriven { .. })
    }

    pub fn is_procedural(&self) -> bool {
        matches!(self, LipSyncMode::ProceduralSpeech(_))
    }

    /// Run the live driver for one tick.
    ///
    /// A detached source ends the frequency session: the mouth closes and
    /// the mode falls back to `Idle`.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        registry: &mut ChannelRegistry,
        dt: f32,
        rng: &mut R,
    ) -> DriverStatus {
        let status = match self {
            LipSyncMode::Idle => DriverStatus::Idle,
            LipSyncMode::FrequencyDriven { driver, source } => driver.tick(registry, source.as_mut()),
            LipSyncMode::ProceduralSpeech(driver) => {
                driver.tick(registry, dt, rng);
                DriverStatus::Active
            }
        };

        if status == DriverStatus::Detached {
            tracing::debug!("spectrum source detached, lip sync idle");
            close_mouth(registry);
            *self = LipSyncMode::Idle;
        }
        status
    }

    /// End the current session and close the mouth. Stopping `Idle` writes
    /// nothing. Returns the kind that was stopped.
    pub fn stop(&mut self, registry: &mut ChannelRegistry) -> LipSyncKind {
        let kind = self.kind();
        match self {
            LipSyncMode::Idle => {}
            LipSyncMode::FrequencyDriven { .. } => close_mouth(registry),
            LipSyncMode::ProceduralSpeech(driver) => driver.finish(registry),
        }
        *self = LipSyncMode::Idle;
        kind
    }
}

impl fmt::Debug for LipSyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LipSyncMode::Idle => f.write_str("Idle"),
            LipSyncMode::FrequencyDriven { driver, .. } => f
                .debug_struct("FrequencyDriven")
                .field("energy", &driver.energy())
                .finish_non_exhaustive(),
            LipSyncMode::ProceduralSpeech(driver) => f
                .debug_tuple("ProceduralSpeech")
                .field(&driver.state())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{first, mouth_rig};
    use crate::{spectrum_channel, StaticSpectrum};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use visage_core::{FRAME_DT, MOUTH_CHANNELS, MOUTH_OPEN};

    #[test]
    fn test_idle_writes_nothing() {
        let mut registry = mouth_rig();
        registry.set_everywhere(MOUTH_OPEN, 0.3);
        let mut mode = LipSyncMode::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(mode.tick(&mut registry, FRAME_DT, &mut rng), DriverStatus::Idle);
        assert_eq!(first(&registry, MOUTH_OPEN), 0.3);
    }

    #[test]
    fn test_procedural_stop_zeroes() {
        let mut registry = mouth_rig();
        let mut mode = LipSyncMode::procedural(ProceduralConfig::default());
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..30 {
            assert_eq!(mode.tick(&mut registry, FRAME_DT, &mut rng), DriverStatus::Active);
        }
        assert!(first(&registry, MOUTH_OPEN) > 0.0);

        assert_eq!(mode.stop(&mut registry), LipSyncKind::ProceduralSpeech);
        assert!(mode.is_idle());
        for channel in MOUTH_CHANNELS {
            assert!(registry.values(channel).iter().all(|&v| v == 0.0));
        }
        // second stop is a no-op
        assert_eq!(mode.stop(&mut registry), LipSyncKind::Idle);
    }

    #[test]
    fn test_frequency_stop_closes_mouth() {
        let mut registry = mouth_rig();
        let mut mode = LipSyncMode::frequency(Box::new(StaticSpectrum::constant(32, 255)));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..10 {
            mode.tick(&mut registry, FRAME_DT, &mut rng);
        }
        assert!(first(&registry, MOUTH_OPEN) > 0.0);

        assert_eq!(mode.stop(&mut registry), LipSyncKind::FrequencyDriven);
        for channel in MOUTH_CHANNELS {
            assert!(registry.values(channel).iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_detach_falls_back_to_idle() {
        let mut registry = mouth_rig();
        let (feed, tap) = spectrum_channel();
        let mut mode = LipSyncMode::frequency(Box::new(tap));
        let mut rng = StdRng::seed_from_u64(1);

        feed.publish(&[128; 16]);
        assert_eq!(mode.tick(&mut registry, FRAME_DT, &mut rng), DriverStatus::Active);
        assert!(first(&registry, MOUTH_OPEN) > 0.0);
        drop(feed);
        assert_eq!(mode.tick(&mut registry, FRAME_DT, &mut rng), DriverStatus::Detached);
        assert_eq!(mode.kind(), LipSyncKind::Idle);
        assert_eq!(first(&registry, MOUTH_OPEN), 0.0);
        assert_eq!(mode.tick(&mut registry, FRAME_DT, &mut rng), DriverStatus::Idle);
    }

    #[test]
    fn test_debug_hides_source() {
        let mode = LipSyncMode::frequency(Box::new(StaticSpectrum::default()));
        let text = format!("{mode:?}");
        assert!(text.starts_with("FrequencyDriven"));
        assert!(mode.is_frequency_driven());
    }
}

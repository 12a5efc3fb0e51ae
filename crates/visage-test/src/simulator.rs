//! Avatar Simulator - deterministic runs of the frame compositor
//!
//! Simulates:
//! - A fixed-rate display refresh
//! - Speech start/end/error signals at scripted times
//! - Analyser attach/detach with constant spectra
//!
//! and records the watched channels every tick.

use std::time::Duration;

use visage_core::{VisageResult, MOUTH_OPEN};
use visage_rig::{ChannelRegistry, SceneGraph};
use visage_runtime::{AvatarConfig, CompositorStats, FrameCompositor, SpeechEvent};
use visage_voice::StaticSpectrum;

/// Something the page does at a given time
#[derive(Debug, Clone, PartialEq)]
pub enum CueAction {
    Speech(SpeechEvent),
    /// Attach an analyser reporting `count` bins at `level`
    AttachSpectrum { count: usize, level: u8 },
    DetachAnalyser,
}

#[derive(Debug, Clone, PartialEq)]
struct Cue {
    /// Seconds since start
    at: f32,
    action: CueAction,
}

/// Recorded values of one channel. Each sample is the largest weight among
/// the meshes exposing the channel; a rig without it records nothing.
#[derive(Debug, Clone)]
pub struct ChannelTrace {
    pub channel: &'static str,
    samples: Vec<(f32, f32)>,
}

impl ChannelTrace {
    fn new(channel: &'static str) -> Self {
        Self {
            channel,
            samples: Vec::new(),
        }
    }

    fn record(&mut self, t: f32, registry: &ChannelRegistry) {
        let value = registry
            .values(self.channel)
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max);
        if value.is_finite() {
            self.samples.push((t, value));
        }
    }

    /// `(time, weight)` pairs in tick order
    pub fn samples(&self) -> &[(f32, f32)] {
        &self.samples
    }

    /// Samples with `from <= t < to`
    pub fn window(&self, from: f32, to: f32) -> impl Iterator<Item = f32> + '_ {
        self.samples
            .iter()
            .filter(move |(t, _)| *t >= from && *t < to)
            .map(|(_, v)| *v)
    }

    pub fn max(&self) -> Option<f32> {
        self.samples.iter().map(|(_, v)| *v).reduce(f32::max)
    }

    pub fn min(&self) -> Option<f32> {
        self.samples.iter().map(|(_, v)| *v).reduce(f32::min)
    }

    /// First sample at or after `t`
    pub fn at_or_after(&self, t: f32) -> Option<f32> {
        self.samples.iter().find(|(s, _)| *s >= t).map(|(_, v)| *v)
    }

    pub fn last(&self) -> Option<f32> {
        self.samples.last().map(|(_, v)| *v)
    }

    /// Number of upward crossings of `level`
    pub fn crossings(&self, level: f32) -> usize {
        self.samples
            .windows(2)
            .filter(|w| w[0].1 <= level && w[1].1 > level)
            .count()
    }
}

/// Scripted compositor run
#[derive(Debug)]
pub struct AvatarSimulator {
    compositor: FrameCompositor,
    registry: ChannelRegistry,
    tick_interval: Duration,
    cues: Vec<Cue>,
    watched: Vec<&'static str>,
    elapsed: f32,
}

impl AvatarSimulator {
    pub fn new(graph: &SceneGraph, config: AvatarConfig, tick_interval: Duration) -> VisageResult<Self> {
        Ok(Self {
            compositor: FrameCompositor::new(config)?,
            registry: ChannelRegistry::index(graph),
            tick_interval,
            cues: Vec::new(),
            watched: vec![MOUTH_OPEN],
            elapsed: 0.0,
        })
    }

    /// Record `channel` in addition to the mouth
    pub fn watch(&mut self, channel: &'static str) -> &mut Self {
        if !self.watched.contains(&channel) {
            self.watched.push(channel);
        }
        self
    }

    /// Schedule an action `at` seconds after the start of the run
    pub fn cue(&mut self, at: f32, action: CueAction) -> &mut Self {
        self.cues.push(Cue { at, action });
        self.cues.sort_by(|a, b| a.at.total_cmp(&b.at));
        self
    }

    /// Run for a duration; cues fire before the first tick at or after
    /// their time
    pub fn run(&mut self, duration: Duration) -> SimulationResult {
        let dt = self.tick_interval.as_secs_f32();
        let ticks = (duration.as_micros() / self.tick_interval.as_micros().max(1)) as u64;
        let mut traces: Vec<ChannelTrace> =
            self.watched.iter().map(|&c| ChannelTrace::new(c)).collect();
        let mut peak_tick = Duration::ZERO;

        for _ in 0..ticks {
            self.fire_due_cues();
            let frame = self.compositor.tick(&mut self.registry, dt);
            self.elapsed = frame.elapsed;
            peak_tick = peak_tick.max(self.compositor.stats().last_tick_duration);
            for trace in &mut traces {
                trace.record(frame.elapsed, &self.registry);
            }
        }

        SimulationResult {
            total_ticks: ticks,
            traces,
            stats: self.compositor.stats().clone(),
            peak_tick,
        }
    }

    fn fire_due_cues(&mut self) {
        // the next tick lands at elapsed + dt; cues due by then fire first
        let horizon = self.elapsed + self.tick_interval.as_secs_f32() * 0.5;
        while self.cues.first().map_or(false, |c| c.at <= horizon) {
            let cue = self.cues.remove(0);
            self.apply(cue.action);
        }
    }

    fn apply(&mut self, action: CueAction) {
        match action {
            CueAction::Speech(event) => self.compositor.handle(&mut self.registry, event),
            CueAction::AttachSpectrum { count, level } => self
                .compositor
                .attach_analyser(&mut self.registry, Box::new(StaticSpectrum::constant(count, level))),
            CueAction::DetachAnalyser => {
                self.compositor.detach_analyser(&mut self.registry);
            }
        }
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Seconds simulated so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Result of one run
#[derive(Debug)]
pub struct SimulationResult {
    pub total_ticks: u64,
    pub traces: Vec<ChannelTrace>,
    pub stats: CompositorStats,
    /// Slowest compositor tick
    pub peak_tick: Duration,
}

impl SimulationResult {
    pub fn trace(&self, channel: &str) -> Option<&ChannelTrace> {
        self.traces.iter().find(|t| t.channel == channel)
    }
}

/// Predefined scenarios at 60 fps
pub mod scenarios {
    use super::*;
    use crate::rig;

    pub const FRAME: Duration = Duration::from_micros(16_667);

    fn simulator(graph: &SceneGraph, seed: u64) -> VisageResult<AvatarSimulator> {
        AvatarSimulator::new(graph, AvatarConfig::default().with_seed(seed), FRAME)
    }

    /// Nobody talks
    pub fn silent_face(seed: u64) -> VisageResult<AvatarSimulator> {
        simulator(&rig::full_face(), seed)
    }

    /// 3 s idle, 3 s of text-to-speech, then silence
    pub fn interview_turn(seed: u64) -> VisageResult<AvatarSimulator> {
        let mut sim = simulator(&rig::full_face(), seed)?;
        sim.cue(3.0, CueAction::Speech(SpeechEvent::Started))
            .cue(6.0, CueAction::Speech(SpeechEvent::Ended));
        Ok(sim)
    }

    /// Audio playback through an analyser at a constant level
    pub fn audio_playback(seed: u64, level: u8) -> VisageResult<AvatarSimulator> {
        let mut sim = simulator(&rig::full_face(), seed)?;
        sim.cue(0.5, CueAction::Speech(SpeechEvent::Started))
            .cue(0.5, CueAction::AttachSpectrum { count: 256, level })
            .cue(4.0, CueAction::DetachAnalyser)
            .cue(4.0, CueAction::Speech(SpeechEvent::Ended));
        Ok(sim)
    }
}

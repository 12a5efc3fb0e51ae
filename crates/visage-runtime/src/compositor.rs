//! Frame compositor - one tick of the whole face
//!
//! Per tick, in order:
//! 1. Advance the animation clock
//! 2. Idle motion on the root transform
//! 3. Expression cycle
//! 4. Blink
//! 5. The live lip-sync driver, if any
//!
//! Steps 3-5 write disjoint channel groups. Config validation keeps
//! mouth-opening expressions out of the speaking rotation.
//!
//! Hosts with separate render and lip-sync loops call `animate` and
//! `drive_lipsync` from each loop; single-loop hosts call `tick`.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use visage_core::{FrameTime, RootTransform, SessionId, VisageResult};
use visage_face::{BlinkController, Expression, ExpressionCycle, IdleMotion};
use visage_rig::ChannelRegistry;
use visage_time::AnimationClock;
use visage_voice::{DriverStatus, LipSyncKind, LipSyncMode, SpectrumSource};

use crate::{AvatarConfig, SessionSource, SpeechEvent, SpeechSession};

#[derive(Clone, Debug, Default)]
pub struct CompositorStats {
    pub ticks: u64,
    pub blinks: u64,
    pub expression_switches: u64,
    pub speech_sessions: u64,
    pub analyser_sessions: u64,
    /// Wall time of the last `animate` pass
    pub last_tick_duration: Duration,
}

/// Per-avatar animation state
#[derive(Debug)]
pub struct FrameCompositor {
    config: AvatarConfig,
    clock: AnimationClock,
    idle: IdleMotion,
    cycle: ExpressionCycle,
    blink: BlinkController,
    lipsync: LipSyncMode,
    root: RootTransform,
    rng: StdRng,
    speaking: bool,
    session: Option<SpeechSession>,
    last_session: SessionId,
    stats: CompositorStats,
}

impl FrameCompositor {
    pub fn new(config: AvatarConfig) -> VisageResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let idle = IdleMotion::new(config.idle.clone());

        Ok(Self {
            clock: AnimationClock::new(),
            root: idle.rest_pose(),
            idle,
            cycle: ExpressionCycle::new(config.expression.clone()),
            blink: BlinkController::new(config.blink.clone()),
            lipsync: LipSyncMode::Idle,
            rng,
            speaking: false,
            session: None,
            last_session: SessionId::ZERO,
            stats: CompositorStats::default(),
            config,
        })
    }

    /// Full tick: face systems, then lip sync
    pub fn tick(&mut self, registry: &mut ChannelRegistry, dt: f32) -> FrameTime {
        let frame = self.animate(registry, dt);
        self.drive_lipsync(registry, frame.delta);
        frame
    }

    /// Render-loop half of a tick: clock, idle motion, expression, blink
    pub fn animate(&mut self, registry: &mut ChannelRegistry, dt: f32) -> FrameTime {
        let start = Instant::now();
        let frame = self.clock.advance(dt);

        self.idle
            .update(&mut self.root, frame, self.speaking, &mut self.rng);

        if self
            .cycle
            .update(registry, frame.delta, self.speaking, &mut self.rng)
            .is_some()
        {
            self.stats.expression_switches += 1;
        }

        self.blink.update(registry, frame.delta, &mut self.rng);
        self.stats.blinks = self.blink.blinks();

        self.stats.ticks += 1;
        self.stats.last_tick_duration = start.elapsed();
        frame
    }

    /// Lip-sync-loop half of a tick.
    ///
    /// Losing the audio input closes the mouth. If speech is still going on,
    /// procedural speech takes over from the next tick.
    pub fn drive_lipsync(&mut self, registry: &mut ChannelRegistry, dt: f32) -> DriverStatus {
        let status = self.lipsync.tick(registry, dt, &mut self.rng);
        if status == DriverStatus::Detached {
            if let Some(session) = self.session.take() {
                info!(
                    session = %session.id,
                    duration = session.duration(self.clock.now().elapsed),
                    "audio input lost, lip sync session ended"
                );
            }
            self.resume_procedural();
        }
        status
    }

    /// Speaking flag from the host.
    ///
    /// Speech start without an analyser opens a procedural session. Speech end
    /// closes it and zeroes the mouth right away. An analyser session is
    /// unaffected; it ends on detach.
    pub fn set_speaking(&mut self, registry: &mut ChannelRegistry, speaking: bool) {
        if speaking == self.speaking {
            return;
        }
        self.speaking = speaking;
        debug!(speaking, "speaking changed");

        if speaking {
            self.stats.speech_sessions += 1;
            self.resume_procedural();
        } else if self.lipsync.is_procedural() {
            self.end_session(registry);
        }
    }

    pub fn handle(&mut self, registry: &mut ChannelRegistry, event: SpeechEvent) {
        if event == SpeechEvent::Failed {
            debug!("speech failed");
        }
        self.set_speaking(registry, event.speaking());
    }

    /// Drive the mouth from live audio. Replaces any running session, and the
    /// energy history starts from zero.
    pub fn attach_analyser(
        &mut self,
        registry: &mut ChannelRegistry,
        source: Box<dyn SpectrumSource + Send>,
    ) {
        if !self.lipsync.is_idle() {
            self.end_session(registry);
        }
        self.lipsync = LipSyncMode::frequency(source);
        self.stats.analyser_sessions += 1;
        self.begin_session(SessionSource::Analyser);
    }

    /// Stop the analyser session and close the mouth. Mid-speech, procedural
    /// speech takes over. Returns false if no analyser was attached.
    pub fn detach_analyser(&mut self, registry: &mut ChannelRegistry) -> bool {
        if !self.lipsync.is_frequency_driven() {
            return false;
        }
        self.end_session(registry);
        self.resume_procedural();
        true
    }

    /// End every session (avatar unmount)
    pub fn shutdown(&mut self, registry: &mut ChannelRegistry) {
        if !self.lipsync.is_idle() {
            self.end_session(registry);
        }
        self.speaking = false;
    }

    /// Open a procedural session if speaking and nothing drives the mouth
    fn resume_procedural(&mut self) {
        if self.speaking && self.lipsync.is_idle() {
            self.lipsync = LipSyncMode::procedural(self.config.procedural.clone());
            self.begin_session(SessionSource::Procedural);
        }
    }

    fn begin_session(&mut self, source: SessionSource) {
        let id = self.last_session.next();
        self.last_session = id;
        self.session = Some(SpeechSession {
            id,
            source,
            started_at: self.clock.now().elapsed,
        });
        info!(session = %id, ?source, "lip sync session started");
    }

    fn end_session(&mut self, registry: &mut ChannelRegistry) {
        let kind = self.lipsync.stop(registry);
        if let Some(session) = self.session.take() {
            info!(
                session = %session.id,
                ?kind,
                duration = session.duration(self.clock.now().elapsed),
                "lip sync session ended"
            );
        }
    }

    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    pub fn now(&self) -> FrameTime {
        self.clock.now()
    }

    pub fn root(&self) -> &RootTransform {
        &self.root
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn lipsync_kind(&self) -> LipSyncKind {
        self.lipsync.kind()
    }

    pub fn session(&self) -> Option<&SpeechSession> {
        self.session.as_ref()
    }

    pub fn expression(&self) -> Expression {
        self.cycle.current()
    }

    pub fn stats(&self) -> &CompositorStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visage_core::{ALL_CHANNELS, MOUTH_CHANNELS, MOUTH_OPEN};
    use visage_rig::{MorphTargets, SceneGraph, SceneNode};
    use visage_voice::{spectrum_channel, StaticSpectrum};

    const DT: f32 = 1.0 / 60.0;

    fn face() -> ChannelRegistry {
        ChannelRegistry::index(&SceneGraph::new(
            SceneNode::group("Avatar")
                .with_child(SceneNode::bone("Hips").with_child(SceneNode::bone("Neck")))
                .with_child(SceneNode::mesh("Wolf3D_Head", MorphTargets::new(ALL_CHANNELS)))
                .with_child(SceneNode::mesh(
                    "Wolf3D_Teeth",
                    MorphTargets::new([MOUTH_OPEN]),
                )),
        ))
    }

    fn compositor(seed: u64) -> FrameCompositor {
        FrameCompositor::new(AvatarConfig::default().with_seed(seed)).unwrap()
    }

    fn mouth_open(registry: &ChannelRegistry) -> Vec<f32> {
        registry.values(MOUTH_OPEN)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = AvatarConfig::default();
        config.idle.sway_interval = 0.0;
        assert!(FrameCompositor::new(config).is_err());
    }

    #[test]
    fn test_starts_at_rest() {
        let compositor = compositor(1);
        assert_eq!(compositor.root().position.y, -4.8);
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
        assert_eq!(compositor.now(), FrameTime::ZERO);
    }

    #[test]
    fn test_silent_face_leaves_mouth_alone() {
        let mut registry = face();
        let mut compositor = compositor(1);

        for _ in 0..180 {
            assert_eq!(compositor.tick(&mut registry, DT).delta, DT);
        }
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
        assert_eq!(compositor.stats().ticks, 180);
        assert!((compositor.now().elapsed - 3.0).abs() < 1e-3);
        assert!((compositor.root().position.y + 4.8).abs() <= 0.01 + 1e-6);
    }

    #[test]
    fn test_speech_start_opens_procedural_session() {
        let mut registry = face();
        let mut compositor = compositor(2);

        compositor.handle(&mut registry, SpeechEvent::Started);
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::ProceduralSpeech);
        let session = *compositor.session().unwrap();
        assert_eq!(session.source, SessionSource::Procedural);
        assert_eq!(session.id, SessionId::new(1));

        let mut peak: f32 = 0.0;
        for _ in 0..180 {
            compositor.tick(&mut registry, DT);
            for v in mouth_open(&registry) {
                assert!((0.0..=0.85).contains(&v));
                peak = peak.max(v);
            }
        }
        assert!(peak > 0.3);
        assert_eq!(compositor.stats().speech_sessions, 1);
    }

    #[test]
    fn test_speech_end_zeroes_mouth_immediately() {
        let mut registry = face();
        let mut compositor = compositor(3);

        compositor.set_speaking(&mut registry, true);
        for _ in 0..90 {
            compositor.tick(&mut registry, DT);
        }
        compositor.handle(&mut registry, SpeechEvent::Ended);

        for channel in MOUTH_CHANNELS {
            assert!(registry.values(channel).iter().all(|&v| v == 0.0));
        }
        compositor.tick(&mut registry, DT);
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
        assert!(compositor.session().is_none());
    }

    #[test]
    fn test_failed_speech_ends_session() {
        let mut registry = face();
        let mut compositor = compositor(3);

        compositor.handle(&mut registry, SpeechEvent::Started);
        compositor.tick(&mut registry, DT);
        compositor.handle(&mut registry, SpeechEvent::Failed);
        assert!(!compositor.is_speaking());
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
    }

    #[test]
    fn test_repeated_start_keeps_session() {
        let mut registry = face();
        let mut compositor = compositor(4);

        compositor.set_speaking(&mut registry, true);
        for _ in 0..30 {
            compositor.tick(&mut registry, DT);
        }
        let id = compositor.session().map(|s| s.id);
        compositor.set_speaking(&mut registry, true);
        assert_eq!(compositor.session().map(|s| s.id), id);
        assert_eq!(compositor.stats().speech_sessions, 1);
    }

    #[test]
    fn test_analyser_takes_over_from_procedural() {
        let mut registry = face();
        let mut compositor = compositor(5);

        compositor.set_speaking(&mut registry, true);
        for _ in 0..20 {
            compositor.tick(&mut registry, DT);
        }
        compositor.attach_analyser(&mut registry, Box::new(StaticSpectrum::constant(64, 0)));

        // procedural state is gone and the mouth was closed
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::FrequencyDriven);
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
        assert_eq!(compositor.session().map(|s| s.id), Some(SessionId::new(2)));

        for _ in 0..30 {
            compositor.tick(&mut registry, DT);
        }
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
        assert_eq!(compositor.stats().analyser_sessions, 1);
    }

    #[test]
    fn test_speech_end_keeps_analyser_session() {
        let mut registry = face();
        let mut compositor = compositor(5);

        compositor.attach_analyser(&mut registry, Box::new(StaticSpectrum::constant(64, 200)));
        compositor.set_speaking(&mut registry, true);
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::FrequencyDriven);
        compositor.tick(&mut registry, DT);
        compositor.set_speaking(&mut registry, false);
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::FrequencyDriven);

        assert!(compositor.detach_analyser(&mut registry));
        assert!(!compositor.detach_analyser(&mut registry));
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
    }

    #[test]
    fn test_audio_loss_mid_speech_falls_back_to_procedural() {
        let mut registry = face();
        let mut compositor = compositor(6);
        let (feed, tap) = spectrum_channel();

        compositor.set_speaking(&mut registry, true);
        compositor.attach_analyser(&mut registry, Box::new(tap));
        feed.publish(&[180; 128]);
        compositor.tick(&mut registry, DT);
        assert!(mouth_open(&registry)[0] > 0.0);

        drop(feed);
        assert_eq!(compositor.drive_lipsync(&mut registry, DT), DriverStatus::Detached);
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::ProceduralSpeech);
        let session = *compositor.session().unwrap();
        assert_eq!(session.source, SessionSource::Procedural);

        let mut seen = Vec::new();
        for _ in 0..60 {
            compositor.tick(&mut registry, DT);
            seen.push(mouth_open(&registry)[0]);
        }
        assert!(seen.iter().all(|v| (0.0..=0.85).contains(v)));
        assert!(seen.windows(2).any(|w| w[0] != w[1]));

        compositor.set_speaking(&mut registry, false);
        compositor.tick(&mut registry, DT);
        for channel in MOUTH_CHANNELS {
            assert!(registry.values(channel).iter().all(|&v| v == 0.0));
        }
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
    }

    #[test]
    fn test_detach_mid_speech_keeps_mouth_moving() {
        let mut registry = face();
        let mut compositor = compositor(6);

        compositor.set_speaking(&mut registry, true);
        compositor.attach_analyser(&mut registry, Box::new(StaticSpectrum::constant(64, 255)));
        for _ in 0..30 {
            compositor.tick(&mut registry, DT);
        }
        assert!((mouth_open(&registry)[0] - 0.9).abs() < 1e-3);

        assert!(compositor.detach_analyser(&mut registry));
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
        assert_eq!(compositor.lipsync_kind(), LipSyncKind::ProceduralSpeech);

        let mut distinct = Vec::new();
        for _ in 0..60 {
            compositor.tick(&mut registry, DT);
            let open = mouth_open(&registry)[0];
            assert!(open <= 0.85);
            if !distinct.contains(&open) {
                distinct.push(open);
            }
        }
        assert!(distinct.len() > 1);

        compositor.set_speaking(&mut registry, false);
        compositor.tick(&mut registry, DT);
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_audio_loss_while_silent_goes_idle() {
        let mut registry = face();
        let mut compositor = compositor(6);
        let (feed, tap) = spectrum_channel();

        compositor.attach_analyser(&mut registry, Box::new(tap));
        feed.publish(&[180; 128]);
        compositor.tick(&mut registry, DT);
        feed.close();
        compositor.tick(&mut registry, DT);

        assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
        assert!(compositor.session().is_none());
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_animate_records_tick_duration() {
        let mut registry = face();
        let mut compositor = compositor(2);

        assert_eq!(compositor.stats().last_tick_duration, Duration::ZERO);
        compositor.set_speaking(&mut registry, true);
        for _ in 0..20 {
            compositor.tick(&mut registry, DT);
        }
        assert!(compositor.stats().last_tick_duration > Duration::ZERO);
        assert_eq!(compositor.stats().ticks, 20);
    }

    #[test]
    fn test_expression_switches_while_speaking() {
        let mut registry = face();
        let mut compositor = compositor(7);

        compositor.set_speaking(&mut registry, true);
        for _ in 0..(5 * 60) {
            compositor.tick(&mut registry, DT);
        }
        assert_eq!(compositor.stats().expression_switches, 2);
        assert_ne!(compositor.expression(), Expression::Neutral);
    }

    #[test]
    fn test_shutdown_closes_mouth() {
        let mut registry = face();
        let mut compositor = compositor(8);

        compositor.set_speaking(&mut registry, true);
        for _ in 0..10 {
            compositor.tick(&mut registry, DT);
        }
        compositor.shutdown(&mut registry);
        assert!(!compositor.is_speaking());
        assert!(mouth_open(&registry).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_same_seed_same_animation() {
        let mut registry_a = face();
        let mut registry_b = face();
        let mut a = compositor(99);
        let mut b = compositor(99);

        for i in 0..240 {
            if i == 60 {
                a.set_speaking(&mut registry_a, true);
                b.set_speaking(&mut registry_b, true);
            }
            a.tick(&mut registry_a, DT);
            b.tick(&mut registry_b, DT);
        }
        assert_eq!(a.root(), b.root());
        for channel in ALL_CHANNELS {
            assert_eq!(registry_a.values(channel), registry_b.values(channel));
        }
    }

    #[test]
    fn test_bad_deltas_do_not_move_clock() {
        let mut registry = face();
        let mut compositor = compositor(1);

        compositor.tick(&mut registry, -1.0);
        compositor.tick(&mut registry, f32::NAN);
        assert_eq!(compositor.now().elapsed, 0.0);
        assert_eq!(compositor.stats().ticks, 2);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Speak(bool),
            Attach(u8),
            Detach,
            Ticks(u8),
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                any::<bool>().prop_map(Step::Speak),
                any::<u8>().prop_map(Step::Attach),
                Just(Step::Detach),
                (1u8..20).prop_map(Step::Ticks),
            ]
        }

        proptest! {
            #[test]
            fn mouth_closes_once_speech_and_audio_are_gone(
                seed in any::<u64>(),
                steps in prop::collection::vec(step(), 1..30),
            ) {
                let mut registry = face();
                let mut compositor = compositor(seed);

                for step in steps {
                    match step {
                        Step::Speak(on) => compositor.set_speaking(&mut registry, on),
                        Step::Attach(level) => compositor.attach_analyser(
                            &mut registry,
                            Box::new(StaticSpectrum::constant(64, level)),
                        ),
                        Step::Detach => {
                            compositor.detach_analyser(&mut registry);
                        }
                        Step::Ticks(n) => {
                            for _ in 0..n {
                                compositor.tick(&mut registry, DT);
                                for v in mouth_open(&registry) {
                                    prop_assert!((0.0..=0.9).contains(&v));
                                }
                            }
                        }
                    }
                }

                compositor.detach_analyser(&mut registry);
                compositor.set_speaking(&mut registry, false);
                compositor.tick(&mut registry, DT);

                prop_assert_eq!(compositor.lipsync_kind(), LipSyncKind::Idle);
                for channel in MOUTH_CHANNELS {
                    prop_assert!(registry.values(channel).iter().all(|&v| v == 0.0));
                }
            }
        }
    }
}

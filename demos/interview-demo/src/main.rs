//! VISAGE Interview Demo
//!
//! Plays one interview turn on a simulated 60 Hz display:
//! - Listening: idle sway and blinks
//! - Question read by text-to-speech: procedural lip sync
//! - Recorded answer played back: analyser-driven lip sync
//!
//! Usage: interview-demo [seed] [seconds] [config.json]

use std::error::Error;

use visage_core::{EYE_BLINK_LEFT, MOUTH_OPEN, MOUTH_SMILE};
use visage_runtime::{init_tracing, AvatarConfig, AvatarHost, LogFormat, SpeechEvent};
use visage_test::{rig, SyntheticVoice};
use visage_time::ManualScheduler;
use visage_voice::{spectrum_channel, SpectrumAnalyser};

const REFRESH_HZ: u32 = 60;
const SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Listening,
    Question,
    Answer,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("info", LogFormat::Pretty)?;

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);
    let seconds: f32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(9.0);
    let config = match args.next() {
        Some(path) => AvatarConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => AvatarConfig::default(),
    }
    .with_seed(seed);

    println!("=== VISAGE Interview Demo ===");
    println!("seed {seed}, {seconds:.1}s at {REFRESH_HZ} Hz\n");

    let mut analyser = SpectrumAnalyser::new(config.analyser.clone())?;
    let mut host = AvatarHost::mount(rig::full_face(), config, ManualScheduler::new())?;
    let mut voice = SyntheticVoice::new(SAMPLE_RATE, seed);

    let dt = 1.0 / REFRESH_HZ as f32;
    let samples_per_frame = (SAMPLE_RATE / REFRESH_HZ) as usize;
    let frames = (seconds * REFRESH_HZ as f32) as u32;
    let third = frames / 3;

    let mut phase = Phase::Listening;
    let mut feed = None;
    let mut bins = Vec::new();

    println!("  time  phase       mouthOpen  smile  blink");
    for frame in 0..frames {
        let next = match frame {
            f if f < third => Phase::Listening,
            f if f < 2 * third => Phase::Question,
            _ => Phase::Answer,
        };
        if next != phase {
            match next {
                Phase::Question => host.speech_event(SpeechEvent::Started),
                Phase::Answer => {
                    host.speech_event(SpeechEvent::Ended);
                    let (audio, tap) = spectrum_channel();
                    host.attach_analyser(Box::new(tap));
                    host.speech_event(SpeechEvent::Started);
                    feed = Some(audio);
                }
                Phase::Listening => {}
            }
            phase = next;
        }

        if let Some(feed) = &feed {
            analyser.push_samples(&voice.next_chunk(samples_per_frame));
            analyser.byte_frequency_data(&mut bins);
            feed.publish(&bins);
        }

        host.step(dt);

        if frame % (REFRESH_HZ / 4) == 0 {
            let registry = host.registry();
            let weight = |channel: &str| registry.values(channel).first().copied().unwrap_or(0.0);
            println!(
                "{:6.2}  {:<10}  {:<9}  {:.2}   {:.2}",
                frame as f32 * dt,
                format!("{phase:?}"),
                bar(weight(MOUTH_OPEN)),
                weight(MOUTH_SMILE),
                weight(EYE_BLINK_LEFT),
            );
        }
    }

    host.speech_event(SpeechEvent::Ended);
    drop(feed);
    host.step(dt);
    host.unmount();

    let stats = host.compositor().stats();
    println!("\nticks: {}", stats.ticks);
    println!("blinks: {}", stats.blinks);
    println!("expression switches: {}", stats.expression_switches);
    println!("speech sessions: {}", stats.speech_sessions);
    println!("analyser sessions: {}", stats.analyser_sessions);
    tracing::info!(frames, "demo finished");
    Ok(())
}

/// Nine-cell bar for a weight in [0, 1]
fn bar(weight: f32) -> String {
    let filled = (weight.clamp(0.0, 1.0) * 9.0).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(9 - filled))
}

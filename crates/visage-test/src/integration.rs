//! End-to-end harness - a mounted avatar fed by a live audio thread
//!
//! The audio side runs the PCM analyser on its own thread and publishes byte
//! spectra through a feed; the render side only ever sees the tap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use visage_core::VisageResult;
use visage_voice::{spectrum_channel, AnalyserConfig, SpectrumAnalyser, SpectrumFeed, SpectrumTap};

use crate::SyntheticVoice;

/// Audio thread publishing analyser frames of a synthetic voice
#[derive(Debug)]
pub struct AudioThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<SpectrumFeed>>,
}

impl AudioThread {
    /// Spawn the producer. Returns the thread and the tap to attach.
    ///
    /// Each iteration pushes one analyser window of fresh PCM and publishes
    /// the resulting bins, then sleeps for `period`.
    pub fn spawn(
        voice: SyntheticVoice,
        config: AnalyserConfig,
        period: Duration,
    ) -> VisageResult<(Self, SpectrumTap)> {
        let mut analyser = SpectrumAnalyser::new(config)?;
        let (feed, tap) = spectrum_channel();
        let stop = Arc::new(AtomicBool::new(false));

        let flag = stop.clone();
        let mut voice = voice;
        let handle = thread::spawn(move || {
            let mut bins = Vec::with_capacity(analyser.bin_count());
            while !flag.load(Ordering::Acquire) {
                analyser.push_samples(&voice.next_chunk(analyser.fft_size()));
                analyser.byte_frequency_data(&mut bins);
                feed.publish(&bins);
                thread::sleep(period);
            }
            feed
        });

        Ok((
            Self {
                stop,
                handle: Some(handle),
            },
            tap,
        ))
    }

    /// Stop producing. The feed is dropped, which detaches the tap.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if let Ok(feed) = handle.join() {
                feed.close();
            }
        }
    }
}

impl Drop for AudioThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

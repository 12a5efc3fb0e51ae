//! Spectrum sources - where the frequency driver reads audio energy from
//!
//! Bins are byte magnitudes (0-255). No sample rate or bin count is assumed.
//! A source that lost its audio input reports `Detached`; that is a normal
//! lifecycle event, not an error.

use std::sync::Arc;

use parking_lot::Mutex;

/// Result of polling a spectrum source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumRead {
    /// `out` holds the latest frame
    Ready,
    /// Audio input is gone; `out` is untouched
    Detached,
}

/// Pollable frequency-magnitude source
pub trait SpectrumSource {
    /// Copy the current bins into `out` (resizing it as needed)
    fn read_bins(&mut self, out: &mut Vec<u8>) -> SpectrumRead;
}

/// Fixed spectrum, handy for hosts replaying a level and for tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSpectrum {
    bins: Vec<u8>,
}

impl StaticSpectrum {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    /// `count` bins all at `level`
    pub fn constant(count: usize, level: u8) -> Self {
        Self::new(vec![level; count])
    }

    pub fn set(&mut self, bins: &[u8]) {
        self.bins.clear();
        self.bins.extend_from_slice(bins);
    }
}

impl SpectrumSource for StaticSpectrum {
    fn read_bins(&mut self, out: &mut Vec<u8>) -> SpectrumRead {
        out.clear();
        out.extend_from_slice(&self.bins);
        SpectrumRead::Ready
    }
}

#[derive(Debug, Default)]
struct Slot {
    frame: Vec<u8>,
    sequence: u64,
    closed: bool,
}

/// Create a connected feed (audio side) and tap (render side)
pub fn spectrum_channel() -> (SpectrumFeed, SpectrumTap) {
    let slot = Arc::new(Mutex::new(Slot::default()));
    (
        SpectrumFeed { slot: slot.clone() },
        SpectrumTap {
            slot,
            last_sequence: 0,
        },
    )
}

/// Producer half: the audio loop publishes its latest frame here.
/// Dropping the feed detaches every tap.
#[derive(Debug)]
pub struct SpectrumFeed {
    slot: Arc<Mutex<Slot>>,
}

impl SpectrumFeed {
    /// Replace the latest frame
    pub fn publish(&self, bins: &[u8]) {
        let mut slot = self.slot.lock();
        slot.frame.clear();
        slot.frame.extend_from_slice(bins);
        slot.sequence += 1;
    }

    /// Mark the audio input as gone
    pub fn close(&self) {
        self.slot.lock().closed = true;
    }
}

impl Drop for SpectrumFeed {
    fn drop(&mut self) {
        self.close();
    }
}

/// Consumer half: the render loop polls the latest frame.
/// Frames published between two polls are skipped; only the newest is seen.
#[derive(Debug)]
pub struct SpectrumTap {
    slot: Arc<Mutex<Slot>>,
    last_sequence: u64,
}

impl SpectrumTap {
    /// Has a frame arrived since the last read?
    pub fn has_new_frame(&self) -> bool {
        self.slot.lock().sequence != self.last_sequence
    }

    pub fn is_detached(&self) -> bool {
        self.slot.lock().closed
    }
}

impl SpectrumSource for SpectrumTap {
    fn read_bins(&mut self, out: &mut Vec<u8>) -> SpectrumRead {
        let slot = self.slot.lock();
        if slot.closed {
            return SpectrumRead::Detached;
        }
        out.clear();
        out.extend_from_slice(&slot.frame);
        self.last_sequence = slot.sequence;
        SpectrumRead::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_spectrum() {
        let mut source = StaticSpectrum::constant(4, 255);
        let mut out = Vec::new();

        assert_eq!(source.read_bins(&mut out), SpectrumRead::Ready);
        assert_eq!(out, vec![255; 4]);
    }

    #[test]
    fn test_tap_sees_latest_frame() {
        let (feed, mut tap) = spectrum_channel();
        let mut out = Vec::new();

        feed.publish(&[1, 2, 3]);
        feed.publish(&[9, 9]);
        assert!(tap.has_new_frame());
        assert_eq!(tap.read_bins(&mut out), SpectrumRead::Ready);
        assert_eq!(out, vec![9, 9]);
        assert!(!tap.has_new_frame());
    }

    #[test]
    fn test_tap_before_first_frame_is_empty() {
        let (_feed, mut tap) = spectrum_channel();
        let mut out = vec![7];

        assert_eq!(tap.read_bins(&mut out), SpectrumRead::Ready);
        assert!(out.is_empty());
    }

    #[test]
    fn test_close_detaches() {
        let (feed, mut tap) = spectrum_channel();
        let mut out = Vec::new();

        feed.publish(&[10]);
        feed.close();
        assert_eq!(tap.read_bins(&mut out), SpectrumRead::Detached);
        assert!(out.is_empty());
    }

    #[test]
    fn test_drop_feed_detaches() {
        let (feed, tap) = spectrum_channel();
        drop(feed);
        assert!(tap.is_detached());
    }

    #[test]
    fn test_feed_across_threads() {
        let (feed, mut tap) = spectrum_channel();
        let producer = std::thread::spawn(move || {
            for level in 0..=100u8 {
                feed.publish(&[level; 8]);
            }
            feed
        });
        let feed = producer.join().unwrap();

        let mut out = Vec::new();
        assert_eq!(tap.read_bins(&mut out), SpectrumRead::Ready);
        assert_eq!(out, vec![100; 8]);
        drop(feed);
    }
}

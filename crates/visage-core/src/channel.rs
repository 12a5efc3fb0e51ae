//! Blend channel names
//!
//! Names follow the ARKit-style morph target naming most avatar rigs ship
//! with. Rigs are heterogeneous: any of these may be missing on a mesh.

/// Jaw/lips opening, driven by lip sync
pub const MOUTH_OPEN: &str = "mouthOpen";
/// Lips funneled forward ("oo")
pub const MOUTH_FUNNEL: &str = "mouthFunnel";
/// Lips puckered ("w")
pub const MOUTH_PUCKER: &str = "mouthPucker";
pub const MOUTH_SMILE: &str = "mouthSmile";

pub const BROW_INNER_UP: &str = "browInnerUp";
pub const EYE_WIDE_LEFT: &str = "eyeWideLeft";
pub const EYE_WIDE_RIGHT: &str = "eyeWideRight";
pub const EYE_SQUINT_LEFT: &str = "eyeSquintLeft";
pub const EYE_SQUINT_RIGHT: &str = "eyeSquintRight";

/// Both eyes closed (single-channel rigs)
pub const EYES_CLOSED: &str = "eyesClosed";
pub const EYE_BLINK_LEFT: &str = "eyeBlinkLeft";
pub const EYE_BLINK_RIGHT: &str = "eyeBlinkRight";

/// Channels written by the lip-sync drivers
pub const MOUTH_CHANNELS: [&str; 3] = [MOUTH_OPEN, MOUTH_FUNNEL, MOUTH_PUCKER];

/// Channels written by the blink controller
pub const BLINK_CHANNELS: [&str; 3] = [EYES_CLOSED, EYE_BLINK_LEFT, EYE_BLINK_RIGHT];

/// Every channel some system writes
pub const ALL_CHANNELS: [&str; 12] = [
    MOUTH_OPEN,
    MOUTH_FUNNEL,
    MOUTH_PUCKER,
    MOUTH_SMILE,
    BROW_INNER_UP,
    EYE_WIDE_LEFT,
    EYE_WIDE_RIGHT,
    EYE_SQUINT_LEFT,
    EYE_SQUINT_RIGHT,
    EYES_CLOSED,
    EYE_BLINK_LEFT,
    EYE_BLINK_RIGHT,
];

/// Channel group a name belongs to, used to keep writers apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelGroup {
    Mouth,
    Blink,
    Expression,
}

impl ChannelGroup {
    pub fn of(name: &str) -> ChannelGroup {
        if MOUTH_CHANNELS.contains(&name) {
            ChannelGroup::Mouth
        } else if BLINK_CHANNELS.contains(&name) {
            ChannelGroup::Blink
        } else {
            ChannelGroup::Expression
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_groups_disjoint() {
        for name in MOUTH_CHANNELS {
            assert_eq!(ChannelGroup::of(name), ChannelGroup::Mouth);
            assert!(!BLINK_CHANNELS.contains(&name));
        }
        assert_eq!(ChannelGroup::of(EYE_BLINK_LEFT), ChannelGroup::Blink);
        assert_eq!(ChannelGroup::of(MOUTH_SMILE), ChannelGroup::Expression);
    }
}

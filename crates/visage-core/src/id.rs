//! Identity types for VISAGE
//!
//! Ids are handles into structures built once per rig. They are never
//! ownership: a `BoneId` says which bone is the head, it does not keep the
//! bone alive.

use std::fmt;

/// Mesh identity - position of a channel-bearing mesh in rig traversal order
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MeshId(pub u32);

impl MeshId {
    #[inline]
    pub fn new(id: u32) -> Self {
        MeshId(id)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mesh({})", self.0)
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bone identity - position of a bone in rig traversal order
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BoneId(pub u32);

impl BoneId {
    #[inline]
    pub fn new(id: u32) -> Self {
        BoneId(id)
    }
}

impl fmt::Debug for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bone({})", self.0)
    }
}

/// Speech session identity - one continuous speaking or playback episode
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const ZERO: SessionId = SessionId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        SessionId(id)
    }

    /// The session that follows this one
    #[inline]
    pub fn next(self) -> Self {
        SessionId(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

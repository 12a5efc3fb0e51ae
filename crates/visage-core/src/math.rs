//! Easing and transform math
//!
//! Every smoothed write in the engine is the same first-order low-pass:
//! `current += (target - current) * rate`, applied once per tick.

/// One exponential-interpolation step toward `target`
#[inline]
pub fn ease(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// 3D vector (scene units)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Linear interpolation
    pub fn lerp(&self, other: &Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Euler rotation in radians (x = pitch, y = yaw, z = roll)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Largest absolute component
    pub fn max_abs(&self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

/// Root transform of the avatar group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootTransform {
    pub position: Vec3,
    pub rotation: Euler,
}

impl RootTransform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Euler::identity(),
        }
    }
}

//! Minimal 4x4 transform.
//!
//! The framework does not implement geometry; this type exists so that
//! transformable user data can be carried along when a client transforms
//! the entity it is attached to (see `UserDataChain::transform_user_data`).

/// Row-major homogeneous 4x4 transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(pub [[f64; 4]; 4]);

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.0[0][3] = dx;
        m.0[1][3] = dy;
        m.0[2][3] = dz;
        m
    }

    /// Apply to a point (w = 1, no perspective divide).
    pub fn apply_point(&self, p: [f64; 3]) -> [f64; 3] {
        let m = &self.0;
        [
            m[0][0] * p[0] + m[0][1] * p[1] + m[0][2] * p[2] + m[0][3],
            m[1][0] * p[0] + m[1][1] * p[1] + m[1][2] * p[2] + m[1][3],
            m[2][0] * p[0] + m[2][1] * p[1] + m[2][2] * p[2] + m[2][3],
        ]
    }

    /// True for the exact identity matrix.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

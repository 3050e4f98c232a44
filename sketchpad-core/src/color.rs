use crate::util::{FiniteF32, FiniteF32Error};

/// A straight-alpha RGBA color, each channel finite.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, bytemuck::Zeroable, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct Color([FiniteF32; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([FiniteF32::ZERO; 4]);
    pub const WHITE: Self = Self([FiniteF32::ONE; 4]);
    pub const BLACK: Self = Self([
        FiniteF32::ZERO,
        FiniteF32::ZERO,
        FiniteF32::ZERO,
        FiniteF32::ONE,
    ]);
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Result<Self, FiniteF32Error> {
        Ok(Self([
            FiniteF32::new(r)?,
            FiniteF32::new(g)?,
            FiniteF32::new(b)?,
            FiniteF32::new(a)?,
        ]))
    }
    pub fn from_array([r, g, b, a]: [f32; 4]) -> Result<Self, FiniteF32Error> {
        Self::new(r, g, b, a)
    }
    /// An opaque color from RGB channels.
    pub fn opaque([r, g, b]: [f32; 3]) -> Result<Self, FiniteF32Error> {
        Self::new(r, g, b, 1.0)
    }
    /// Construct from compile-time channel values.
    ///
    /// Only used for literal tables, where every value is known to be finite.
    #[must_use]
    pub(crate) const fn from_const([r, g, b, a]: [f32; 4]) -> Self {
        Self([
            FiniteF32::from_const(r),
            FiniteF32::from_const(g),
            FiniteF32::from_const(b),
            FiniteF32::from_const(a),
        ])
    }
    /// The same color with alpha replaced. Non-finite alpha leaves the color unchanged.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        let mut channels = self.0;
        channels[3] = FiniteF32::new_or(alpha, channels[3]);
        Self(channels)
    }
    #[must_use]
    pub fn as_array(&self) -> [f32; 4] {
        [
            self.0[0].get(),
            self.0[1].get(),
            self.0[2].get(),
            self.0[3].get(),
        ]
    }
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.0[3].get()
    }
}
impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
// Safety: FiniteF32 is NoUninit, arrays have no uninit bytes of their own.
unsafe impl bytemuck::NoUninit for Color {}

#[cfg(test)]
mod test {
    use super::Color;
    #[test]
    fn rejects_nan_channel() {
        assert!(Color::new(0.0, f32::NAN, 0.0, 1.0).is_err());
        assert_eq!(
            Color::opaque([1.0, 0.5, 0.0]).unwrap().as_array(),
            [1.0, 0.5, 0.0, 1.0]
        );
    }
    #[test]
    fn with_alpha() {
        let faded = Color::WHITE.with_alpha(0.6);
        assert_eq!(faded.as_array(), [1.0, 1.0, 1.0, 0.6]);
        assert_eq!(faded.with_alpha(f32::INFINITY), faded);
    }
}

//! Types for measuring and styling rows.

use figures::units::{Lp, Px, UPx};
use figures::{Fraction, IntoUnsigned, ScreenScale, Zero};

/// A 1-dimensional measurement.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Dimension {
    /// Physical Pixels
    Px(Px),
    /// Logical Pixels
    Lp(Lp),
}

impl Dimension {
    /// A dimension of zero physical pixels.
    pub const ZERO: Self = Self::Px(Px::ZERO);

    /// Returns this dimension in physical pixels, using `scale` to convert
    /// logical pixels.
    #[must_use]
    pub fn into_px(self, scale: Fraction) -> Px {
        match self {
            Dimension::Px(px) => px,
            Dimension::Lp(lp) => lp.into_px(scale),
        }
    }

    /// Returns this dimension in unsigned physical pixels, using `scale` to
    /// convert logical pixels. Negative dimensions saturate to zero.
    #[must_use]
    pub fn into_upx(self, scale: Fraction) -> UPx {
        self.into_px(scale).max(Px::ZERO).into_unsigned()
    }

    /// Returns true if this dimension measures less than zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        match self {
            Dimension::Px(px) => px < Px::ZERO,
            Dimension::Lp(lp) => lp < Lp::ZERO,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Px> for Dimension {
    fn from(value: Px) -> Self {
        Self::Px(value)
    }
}

impl From<Lp> for Dimension {
    fn from(value: Lp) -> Self {
        Self::Lp(value)
    }
}

#[cfg(test)]
mod tests {
    use figures::units::{Lp, Px};
    use figures::{Fraction, Zero};

    use super::Dimension;

    #[test]
    fn px_passthrough() {
        let dimension = Dimension::from(Px::new(8));
        assert_eq!(dimension.into_px(Fraction::ONE), Px::new(8));
        assert!(!dimension.is_negative());
    }

    #[test]
    fn negative_saturates_unsigned() {
        let dimension = Dimension::from(Px::new(-4));
        assert!(dimension.is_negative());
        assert_eq!(dimension.into_upx(Fraction::ONE), figures::units::UPx::ZERO);
    }

    #[test]
    fn zero_is_default() {
        assert_eq!(Dimension::default(), Dimension::ZERO);
        assert_eq!(Dimension::ZERO.into_px(Fraction::ONE), Px::ZERO);
        let _ = Lp::points(1);
    }
}

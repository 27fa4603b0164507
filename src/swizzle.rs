//! Output Channel Swizzles

/// A four-channel output reordering applied before the final color write
/// when the target's channel order differs from the default RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzle(&'static str);

impl Swizzle {
    pub const RGBA: Self = Self("rgba");
    pub const BGRA: Self = Self("bgra");
    /// Alpha-only targets replicate alpha into every channel.
    pub const AAAA: Self = Self("aaaa");
    /// Red channel broadcast with opaque alpha ordering, for single-channel
    /// formats read back as red.
    pub const RRRR: Self = Self("rrrr");

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::RGBA
    }
}

impl Default for Swizzle {
    fn default() -> Self {
        Self::RGBA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_detection() {
        assert!(Swizzle::RGBA.is_identity());
        assert!(!Swizzle::BGRA.is_identity());
        assert_eq!(Swizzle::BGRA.as_str(), "bgra");
    }
}

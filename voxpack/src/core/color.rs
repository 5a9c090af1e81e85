//! Module `core::color`
//!
//! Defines [`Rgba`], a packed RGBA8888 color, and [`ColorPalette`], the bounded color table
//! that maps disk colors to the 8-bit palette indices used by the packed vertex format.
//!
//! # Examples
//!
//! ```rust
//! use voxpack::{ColorPalette, Rgba};
//!
//! let mut palette = ColorPalette::new();
//! let red = Rgba::new(255, 0, 0, 255);
//! let index = palette.color_palette_index(red);
//! assert_eq!(index, 1);
//! assert_eq!(palette.color(index), Some(red));
//! ```

use rustc_hash::FxHashMap;

/// A color packed as RGBA8888.
///
/// ## Bit Layout
/// ```ignore
///   31-24  23-16  15-8   7-0
/// +------+------+------+------+
/// |  r   |  g   |  b   |  a   |
/// +------+------+------+------+
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba(u32);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(0);

    #[must_use]
    #[inline(always)]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[must_use]
    #[inline(always)]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    #[inline(always)]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    #[must_use]
    #[inline(always)]
    pub const fn r(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    #[inline(always)]
    pub const fn g(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    #[inline(always)]
    pub const fn b(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    #[inline(always)]
    pub const fn a(&self) -> u8 {
        self.0 as u8
    }

    /// Parses `#RRGGBB`, `#RRGGBBAA` or a (possibly negative) decimal RGBA8888 value.
    pub fn parse(token: &str) -> Option<Self> {
        if let Some(hex) = token.strip_prefix('#') {
            let value = u32::from_str_radix(hex, 16).ok()?;
            return match hex.len() {
                6 => Some(Self((value << 8) | 0xFF)),
                8 => Some(Self(value)),
                _ => None,
            };
        }

        token
            .parse::<i64>()
            .ok()
            .filter(|value| *value >= i32::MIN as i64 && *value <= u32::MAX as i64)
            .map(|value| Self(value as u32))
    }
}

impl From<u32> for Rgba {
    #[inline]
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Rgba> for u32 {
    #[inline]
    fn from(color: Rgba) -> u32 {
        color.0
    }
}

impl std::fmt::Debug for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rgba(#{:08X})", self.0)
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Maximum number of colors a palette holds, including the reserved index 0.
///
/// The shader-side table has 256 slots; index 255 is never handed out.
pub const PALETTE_SIZE: usize = 255;

/// Bounded color table. Index 0 is reserved for "no color" and is also what every lookup
/// returns once the table is full.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<Rgba>,
    lookup: FxHashMap<Rgba, u8>,
    exhausted: bool,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorPalette {
    #[must_use]
    pub fn new() -> Self {
        let mut lookup = FxHashMap::default();
        lookup.insert(Rgba::TRANSPARENT, 0);

        Self {
            colors: vec![Rgba::TRANSPARENT],
            lookup,
            exhausted: false,
        }
    }

    /// Returns the palette index of `color`, registering it if it is new.
    pub fn color_palette_index(&mut self, color: Rgba) -> u8 {
        if let Some(index) = self.lookup.get(&color) {
            return *index;
        }

        if self.colors.len() >= PALETTE_SIZE {
            if !self.exhausted {
                log::warn!("Color palette exhausted, {color} and later colors map to index 0");
                self.exhausted = true;
            }
            return 0;
        }

        let index = self.colors.len() as u8;
        self.colors.push(color);
        self.lookup.insert(color, index);

        index
    }

    #[must_use]
    pub fn color(&self, index: u8) -> Option<Rgba> {
        self.colors.get(index as usize).copied()
    }

    /// Number of registered colors, including the reserved entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.len() <= 1
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let color = Rgba::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(color.raw(), 0x1234_5678);
        assert_eq!(color.r(), 0x12);
        assert_eq!(color.g(), 0x34);
        assert_eq!(color.b(), 0x56);
        assert_eq!(color.a(), 0x78);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Rgba::parse("#FF0000"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(Rgba::parse("#00FF0080"), Some(Rgba::new(0, 255, 0, 128)));
        assert_eq!(Rgba::parse("-1"), Some(Rgba::from_raw(u32::MAX)));
        assert_eq!(Rgba::parse("255"), Some(Rgba::from_raw(255)));
        assert_eq!(Rgba::parse("#FFF"), None);
        assert_eq!(Rgba::parse("red"), None);
        assert_eq!(Rgba::parse("4294967296"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Rgba::new(1, 2, 3, 4)), "#01020304");
    }

    #[test]
    fn test_palette_reuses_indices() {
        let mut palette = ColorPalette::new();
        let a = palette.color_palette_index(Rgba::new(1, 0, 0, 255));
        let b = palette.color_palette_index(Rgba::new(2, 0, 0, 255));
        assert_eq!((a, b), (1, 2));
        assert_eq!(palette.color_palette_index(Rgba::new(1, 0, 0, 255)), 1);
        assert_eq!(palette.len(), 3);
    }

    #[test]
    fn test_palette_transparent_is_zero() {
        let mut palette = ColorPalette::new();
        assert!(palette.is_empty());
        assert_eq!(palette.color_palette_index(Rgba::TRANSPARENT), 0);
    }

    #[test]
    fn test_palette_exhaustion_degrades_to_zero() {
        let mut palette = ColorPalette::new();
        for i in 1..PALETTE_SIZE as u32 {
            assert_eq!(palette.color_palette_index(Rgba::from_raw(i)) as u32, i);
        }
        assert!(!palette.is_exhausted());
        assert_eq!(palette.len(), 255);

        // the 255th distinct color no longer fits
        assert_eq!(palette.color_palette_index(Rgba::from_raw(255)), 0);
        assert!(palette.is_exhausted());
        assert_eq!(palette.len(), 255);
        assert_eq!(palette.color_palette_index(Rgba::from_raw(7)), 7);
    }
}

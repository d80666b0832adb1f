//! Cell coverage classification
//!
//! Every rasterizer labels each cell as fully inside a shape, fully outside
//! it, or straddling its boundary. Merge operations take a `CoverageMask`
//! to pick which labels actually affect the cell.

use bitflags::bitflags;

/// Relationship between a single cell and a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    Inside,
    /// Shape boundary may pass through some part of the cell
    Border,
    Outside,
}

bitflags! {
    /// Set of coverage classifications
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CoverageMask: u8 {
        const INSIDE = 1;
        const BORDER = 2;
        const OUTSIDE = 4;
    }
}

impl CoverageMask {
    /// Inside plus border: the conservative choice for hazards
    pub const TOUCHING: Self = Self::INSIDE.union(Self::BORDER);

    #[inline]
    pub fn matches(self, coverage: Coverage) -> bool {
        self.contains(coverage.into())
    }
}

impl From<Coverage> for CoverageMask {
    fn from(coverage: Coverage) -> Self {
        match coverage {
            Coverage::Inside => CoverageMask::INSIDE,
            Coverage::Border => CoverageMask::BORDER,
            Coverage::Outside => CoverageMask::OUTSIDE,
        }
    }
}

impl serde::Serialize for CoverageMask {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

impl<'de> serde::Deserialize<'de> for CoverageMask {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

/// One rasterizer output entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCoverage {
    pub x: i32,
    pub y: i32,
    pub coverage: Coverage,
}

impl CellCoverage {
    pub fn new(x: i32, y: i32, coverage: Coverage) -> Self {
        Self { x, y, coverage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_matches_single() {
        assert!(CoverageMask::INSIDE.matches(Coverage::Inside));
        assert!(!CoverageMask::INSIDE.matches(Coverage::Border));
        assert!(!CoverageMask::INSIDE.matches(Coverage::Outside));
    }

    #[test]
    fn test_touching_mask() {
        assert!(CoverageMask::TOUCHING.matches(Coverage::Inside));
        assert!(CoverageMask::TOUCHING.matches(Coverage::Border));
        assert!(!CoverageMask::TOUCHING.matches(Coverage::Outside));
    }

    #[test]
    fn test_empty_mask_matches_nothing() {
        let mask = CoverageMask::empty();
        for c in [Coverage::Inside, Coverage::Border, Coverage::Outside] {
            assert!(!mask.matches(c));
        }
    }

    #[test]
    fn test_mask_toml_roundtrip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            mask: CoverageMask,
        }

        let parsed: Wrapper = toml::from_str(r#"mask = "INSIDE | BORDER""#).unwrap();
        assert_eq!(parsed.mask, CoverageMask::TOUCHING);

        let text = toml::to_string(&Wrapper { mask: CoverageMask::OUTSIDE }).unwrap();
        assert!(text.contains("OUTSIDE"));
    }
}

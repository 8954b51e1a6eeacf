// SPDX-License-Identifier: Apache-2.0

//! Type domain registry
//!
//! Enumerates the legal (element type, group factor) combinations for one
//! capability configuration and derives the predicate granularity for each.
//! Both legality and granularity come from a single ratio formula over the
//! element width and the group factor; nothing in the crate restates it, so
//! the enumeration and the formula cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::constants::{ELEMENT_WIDTHS, ELEN_BITS, FLOAT_WIDTHS, GROUP_FACTORS, INT_KINDS};
use crate::types::{
    ElementKind, ElementType, ElementWidth, GroupFactor, MaskGranularity, Result, RvxError,
};

// =============================================================================
// CAPABILITY CONFIGURATION
// =============================================================================

/// Floating-point capability flags of a build.
///
/// Each flag toggles an entire element width in or out of the float kind.
/// Decided once per configuration, never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatCapabilities {
    pub has_fp16: bool,
    pub has_fp32: bool,
    pub has_fp64: bool,
}

impl FloatCapabilities {
    /// Capability set selected by this build's cargo features.
    #[inline]
    pub fn detect() -> Self {
        FloatCapabilities {
            has_fp16: cfg!(feature = "fp16"),
            has_fp32: cfg!(feature = "fp32"),
            has_fp64: cfg!(feature = "fp64"),
        }
    }

    #[inline]
    pub fn all() -> Self {
        FloatCapabilities {
            has_fp16: true,
            has_fp32: true,
            has_fp64: true,
        }
    }

    /// Integer-only configuration: no float element types exist at all.
    #[inline]
    pub fn integer_only() -> Self {
        FloatCapabilities {
            has_fp16: false,
            has_fp32: false,
            has_fp64: false,
        }
    }

    #[inline]
    fn admits_float(&self, width: ElementWidth) -> bool {
        match width {
            ElementWidth::W16 => self.has_fp16,
            ElementWidth::W32 => self.has_fp32,
            ElementWidth::W64 => self.has_fp64,
            ElementWidth::W8 => false,
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Read-only registry of legal type combinations for one configuration.
/// Constructed once, shared freely; holds no mutable state.
#[derive(Debug, Clone, Copy)]
pub struct TypeRegistry {
    caps: FloatCapabilities,
}

impl TypeRegistry {
    #[inline]
    pub fn new(caps: FloatCapabilities) -> Self {
        Self { caps }
    }

    #[inline]
    pub fn capabilities(&self) -> FloatCapabilities {
        self.caps
    }

    /// Whether the element type exists at all under this configuration.
    pub fn element_exists(&self, elem: ElementType) -> bool {
        match elem.kind {
            ElementKind::Signed | ElementKind::Unsigned => true,
            ElementKind::Float => self.caps.admits_float(elem.width),
        }
    }

    /// The one legality rule: the element width divided by the group factor
    /// may not exceed ELEN. Fractional factors below the width-dependent
    /// floor fail here; MF8 with 64-bit elements is the canonical exclusion.
    #[inline]
    fn ratio_legal(width: ElementWidth, group: GroupFactor) -> bool {
        width.bits() * group.denominator() <= ELEN_BITS * group.numerator()
    }

    pub fn is_legal(&self, elem: ElementType, group: GroupFactor) -> bool {
        self.element_exists(elem) && Self::ratio_legal(elem.width, group)
    }

    /// Every element type that exists under this configuration.
    pub fn element_types(&self) -> Vec<ElementType> {
        let mut out = Vec::new();
        for kind in INT_KINDS {
            for width in ELEMENT_WIDTHS {
                out.push(ElementType::new(kind, width));
            }
        }
        for width in FLOAT_WIDTHS {
            let elem = ElementType::float(width);
            if self.element_exists(elem) {
                out.push(elem);
            }
        }
        out
    }

    /// The full set of legal (element type, group factor) pairs.
    pub fn legal_combinations(&self) -> Vec<(ElementType, GroupFactor)> {
        let mut out = Vec::new();
        for elem in self.element_types() {
            for group in GROUP_FACTORS {
                if Self::ratio_legal(elem.width, group) {
                    out.push((elem, group));
                }
            }
        }
        out
    }

    /// Predicate granularity for a legal combination: register bits per
    /// predicate bit, `width / factor`. The same ratio that bounds legality
    /// produces the granularity, so every legal pair maps to exactly one
    /// value in [1, ELEN].
    pub fn mask_granularity_for(
        &self,
        elem: ElementType,
        group: GroupFactor,
    ) -> Result<MaskGranularity> {
        if !self.element_exists(elem) {
            return Err(RvxError::UnsupportedCombination(format!(
                "element type {} absent in this configuration",
                elem.suffix()
            )));
        }
        if !Self::ratio_legal(elem.width, group) {
            return Err(RvxError::UnsupportedCombination(format!(
                "group factor {} below the floor for {} elements",
                group.suffix(),
                elem.suffix()
            )));
        }
        Ok(MaskGranularity::new(
            elem.width.bits() * group.denominator() / group.numerator(),
        ))
    }

    /// Group factor forced onto a gather/scatter index operand: the data
    /// group factor scaled by the index/data width ratio. Fails when the
    /// scaled factor leaves the representable range or is itself illegal
    /// for the unsigned index element.
    pub fn index_group_for(
        &self,
        data_elem: ElementType,
        data_group: GroupFactor,
        index_width: ElementWidth,
    ) -> Result<GroupFactor> {
        if !self.is_legal(data_elem, data_group) {
            return Err(RvxError::UnsupportedCombination(format!(
                "no {} element type at group factor {}",
                data_elem.suffix(),
                data_group.suffix()
            )));
        }
        let num = data_group.numerator() * index_width.bits();
        let den = data_group.denominator() * data_elem.width.bits();
        let g = gcd(num, den);
        let group = GroupFactor::from_ratio(num / g, den / g).ok_or_else(|| {
            RvxError::NoSuchOperation(format!(
                "index width {} incompatible with {}{} data",
                index_width.bits(),
                data_elem.suffix(),
                data_group.suffix()
            ))
        })?;
        if !Self::ratio_legal(index_width, group) {
            return Err(RvxError::NoSuchOperation(format!(
                "index width {} incompatible with {}{} data",
                index_width.bits(),
                data_elem.suffix(),
                data_group.suffix()
            )));
        }
        Ok(group)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

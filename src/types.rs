// SPDX-License-Identifier: Apache-2.0

// types.rs for rvx
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::VLEN_BITS;

#[derive(Debug, Error)]
pub enum RvxError {
    /// The requested (element type, group factor) pair is outside the type
    /// domain registry; the operation name does not exist at that type.
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),
    /// A family-specific constraint (e.g. index/data width pairing) excludes
    /// an otherwise-legal combination.
    #[error("no such operation: {0}")]
    NoSuchOperation(String),
    /// The call shape or mask granularity matches no table row. Never
    /// resolved by guessing or coercion.
    #[error("ambiguous or unresolved overload: {0}")]
    AmbiguousOrUnresolvedOverload(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RvxError>;

// =============================================================================
// ELEMENT TYPE DOMAIN
// =============================================================================

/// Element signedness/kind of a vector lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Signed,
    Unsigned,
    Float,
}

/// Element width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementWidth {
    W8,
    W16,
    W32,
    W64,
}

impl ElementWidth {
    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            ElementWidth::W8 => 8,
            ElementWidth::W16 => 16,
            ElementWidth::W32 => 32,
            ElementWidth::W64 => 64,
        }
    }

    #[inline]
    pub fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }
}

/// A fully-determined element type: kind plus width.
///
/// Float exists only at widths 16/32/64 and each float width is additionally
/// gated by the build's capability flags; the registry is the authority on
/// which values exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementType {
    pub kind: ElementKind,
    pub width: ElementWidth,
}

impl ElementType {
    #[inline]
    pub fn new(kind: ElementKind, width: ElementWidth) -> Self {
        Self { kind, width }
    }

    #[inline]
    pub fn signed(width: ElementWidth) -> Self {
        Self::new(ElementKind::Signed, width)
    }

    #[inline]
    pub fn unsigned(width: ElementWidth) -> Self {
        Self::new(ElementKind::Unsigned, width)
    }

    #[inline]
    pub fn float(width: ElementWidth) -> Self {
        Self::new(ElementKind::Float, width)
    }

    /// Type suffix as it appears in primitive symbols: `i8`, `u16`, `f32`, ...
    pub fn suffix(&self) -> String {
        let k = match self.kind {
            ElementKind::Signed => "i",
            ElementKind::Unsigned => "u",
            ElementKind::Float => "f",
        };
        format!("{}{}", k, self.width.bits())
    }
}

/// Register grouping factor (LMUL): multiplier on the natural register
/// capacity, as a rational numerator/denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupFactor {
    MF8,
    MF4,
    MF2,
    M1,
    M2,
    M4,
    M8,
}

impl GroupFactor {
    #[inline]
    pub fn numerator(self) -> u32 {
        match self {
            GroupFactor::MF8 | GroupFactor::MF4 | GroupFactor::MF2 | GroupFactor::M1 => 1,
            GroupFactor::M2 => 2,
            GroupFactor::M4 => 4,
            GroupFactor::M8 => 8,
        }
    }

    #[inline]
    pub fn denominator(self) -> u32 {
        match self {
            GroupFactor::MF8 => 8,
            GroupFactor::MF4 => 4,
            GroupFactor::MF2 => 2,
            _ => 1,
        }
    }

    /// Reconstruct a factor from a reduced numerator/denominator pair.
    pub fn from_ratio(num: u32, den: u32) -> Option<Self> {
        match (num, den) {
            (1, 8) => Some(GroupFactor::MF8),
            (1, 4) => Some(GroupFactor::MF4),
            (1, 2) => Some(GroupFactor::MF2),
            (1, 1) => Some(GroupFactor::M1),
            (2, 1) => Some(GroupFactor::M2),
            (4, 1) => Some(GroupFactor::M4),
            (8, 1) => Some(GroupFactor::M8),
            _ => None,
        }
    }

    /// Group suffix as it appears in primitive symbols: `mf8` .. `m8`.
    pub fn suffix(self) -> &'static str {
        match self {
            GroupFactor::MF8 => "mf8",
            GroupFactor::MF4 => "mf4",
            GroupFactor::MF2 => "mf2",
            GroupFactor::M1 => "m1",
            GroupFactor::M2 => "m2",
            GroupFactor::M4 => "m4",
            GroupFactor::M8 => "m8",
        }
    }
}

/// Number of register bits one predicate bit covers.
///
/// For every legal (element type, group factor) pair exactly one granularity
/// is correct; the registry owns the derivation formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaskGranularity(u32);

impl MaskGranularity {
    #[inline]
    pub fn new(n: u32) -> Self {
        debug_assert!(n.is_power_of_two() && n <= 64);
        Self(n)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

// =============================================================================
// STATIC ARGUMENT TYPES (RESOLVER INPUT / TABLE SIGNATURES)
// =============================================================================

/// The static type of one call argument, as seen by the overload resolver
/// and recorded in each concrete operation's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgType {
    Vector(ElementType, GroupFactor),
    /// Index operand of a gather/scatter; its element type is an independent
    /// axis validated against the data operand through the registry.
    IndexVector(ElementType, GroupFactor),
    Mask(MaskGranularity),
    Scalar(ElementType),
    /// Read-only memory operand; the pointee type is part of the signature.
    PointerConst(ElementType),
    /// Writable memory operand.
    PointerMut(ElementType),
    Count,
}

// =============================================================================
// RUNTIME VALUE CONTAINERS (ADAPTER INPUT)
// =============================================================================

/// Lane count of a vector register group at the model's natural register
/// size. Legal combinations always yield at least two lanes.
#[inline]
pub fn lane_count(width: ElementWidth, group: GroupFactor) -> usize {
    ((VLEN_BITS * group.numerator()) / (group.denominator() * width.bits())) as usize
}

/// A vector register-group value: element type, group factor, and packed
/// little-endian lane storage.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorValue {
    elem: ElementType,
    group: GroupFactor,
    bytes: Vec<u8>,
}

impl VectorValue {
    /// All-zero value with the full lane capacity for the combination.
    pub fn zeroed(elem: ElementType, group: GroupFactor) -> Self {
        let n = lane_count(elem.width, group) * elem.width.bytes();
        Self {
            elem,
            group,
            bytes: vec![0u8; n],
        }
    }

    /// Build from integer lane values, truncated to the element width.
    /// Lanes beyond the provided slice stay zero.
    pub fn from_i64_lanes(elem: ElementType, group: GroupFactor, lanes: &[i64]) -> Self {
        let mut v = Self::zeroed(elem, group);
        let n = v.lanes();
        for (i, &x) in lanes.iter().enumerate().take(n) {
            v.set_lane_bits(i, x as u64);
        }
        v
    }

    /// Build from float lane values, rounded to the element width.
    pub fn from_f64_lanes(elem: ElementType, group: GroupFactor, lanes: &[f64]) -> Self {
        let mut v = Self::zeroed(elem, group);
        let n = v.lanes();
        for (i, &x) in lanes.iter().enumerate().take(n) {
            let raw = match elem.width {
                ElementWidth::W16 => crate::kernels::f32_to_f16_bits(x as f32) as u64,
                ElementWidth::W32 => (x as f32).to_bits() as u64,
                ElementWidth::W64 => x.to_bits(),
                ElementWidth::W8 => 0,
            };
            v.set_lane_bits(i, raw);
        }
        v
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.elem
    }

    #[inline]
    pub fn group_factor(&self) -> GroupFactor {
        self.group
    }

    #[inline]
    pub fn lanes(&self) -> usize {
        lane_count(self.elem.width, self.group)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Raw lane bits, zero-extended to 64.
    pub fn lane_bits(&self, i: usize) -> u64 {
        let w = self.elem.width.bytes();
        let mut raw = [0u8; 8];
        raw[..w].copy_from_slice(&self.bytes[i * w..(i + 1) * w]);
        u64::from_le_bytes(raw)
    }

    pub fn set_lane_bits(&mut self, i: usize, raw: u64) {
        let w = self.elem.width.bytes();
        self.bytes[i * w..(i + 1) * w].copy_from_slice(&raw.to_le_bytes()[..w]);
    }

    /// Lane value sign- or zero-extended to i64 according to the element kind.
    pub fn lane_as_i64(&self, i: usize) -> i64 {
        let raw = self.lane_bits(i);
        match (self.elem.kind, self.elem.width) {
            (ElementKind::Signed, ElementWidth::W8) => raw as u8 as i8 as i64,
            (ElementKind::Signed, ElementWidth::W16) => raw as u16 as i16 as i64,
            (ElementKind::Signed, ElementWidth::W32) => raw as u32 as i32 as i64,
            (ElementKind::Signed, ElementWidth::W64) => raw as i64,
            _ => raw as i64,
        }
    }

    /// Lane value widened to f64; meaningful for float elements only.
    pub fn lane_as_f64(&self, i: usize) -> f64 {
        let raw = self.lane_bits(i);
        match self.elem.width {
            ElementWidth::W16 => crate::kernels::f16_bits_to_f32(raw as u16) as f64,
            ElementWidth::W32 => f32::from_bits(raw as u32) as f64,
            ElementWidth::W64 => f64::from_bits(raw),
            ElementWidth::W8 => 0.0,
        }
    }
}

/// A predicate value: one bit per lane, plus the granularity the bits were
/// produced at. Lane capacity never exceeds 128 at the model register size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskValue {
    granularity: MaskGranularity,
    bits: u128,
}

impl MaskValue {
    #[inline]
    pub fn new(granularity: MaskGranularity, bits: u128) -> Self {
        Self { granularity, bits }
    }

    pub fn from_bools(granularity: MaskGranularity, lanes: &[bool]) -> Self {
        let mut bits = 0u128;
        for (i, &b) in lanes.iter().enumerate().take(128) {
            if b {
                bits |= 1 << i;
            }
        }
        Self { granularity, bits }
    }

    #[inline]
    pub fn granularity(&self) -> MaskGranularity {
        self.granularity
    }

    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        (self.bits >> i) & 1 == 1
    }
}

/// A scalar operand value, as wide as the adapter ever needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    I64(i64),
    U64(u64),
    F64(f64),
}

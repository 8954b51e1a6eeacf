// SPDX-License-Identifier: Apache-2.0

//! Operation family catalog
//!
//! One static entry per generic mnemonic: the ordered argument roles of the
//! unmasked call shape, the element-kind domain the family covers, whether it
//! produces a result, and whether its masked form carries a pass-through
//! vector. Declared once, immutable; every concrete operation in a family
//! must match this shape.

use serde::{Deserialize, Serialize};

use crate::types::ElementKind;

/// Generic operation mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    /// Elementwise integer add, `vadd`.
    Add,
    /// Elementwise floating add, `vfadd`.
    FloatAdd,
    /// Contiguous load, `vle`.
    UnitLoad,
    /// Contiguous store, `vse`.
    UnitStore,
    /// Constant-byte-stride load, `vlse`.
    StridedLoad,
    /// Constant-byte-stride store, `vsse`.
    StridedStore,
    /// Gather: per-lane byte offsets from an index vector, `vluxei`.
    IndexedLoad,
    /// Scatter: per-lane byte offsets from an index vector, `vsuxei`.
    IndexedStore,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 8] = [
        Mnemonic::Add,
        Mnemonic::FloatAdd,
        Mnemonic::UnitLoad,
        Mnemonic::UnitStore,
        Mnemonic::StridedLoad,
        Mnemonic::StridedStore,
        Mnemonic::IndexedLoad,
        Mnemonic::IndexedStore,
    ];

    /// Base symbol stem, before width/type suffixes.
    pub fn stem(self) -> &'static str {
        match self {
            Mnemonic::Add => "vadd",
            Mnemonic::FloatAdd => "vfadd",
            Mnemonic::UnitLoad => "vle",
            Mnemonic::UnitStore => "vse",
            Mnemonic::StridedLoad => "vlse",
            Mnemonic::StridedStore => "vsse",
            Mnemonic::IndexedLoad => "vluxei",
            Mnemonic::IndexedStore => "vsuxei",
        }
    }
}

/// Argument role within a family's unmasked call shape. The masked shape
/// prepends the predicate and pass-through operands; those are call-form,
/// not catalog roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Vector,
    IndexVector,
    Scalar,
    PointerConst,
    PointerMut,
    Count,
}

/// Element kinds a family is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementDomain {
    Int,
    Float,
    All,
}

impl ElementDomain {
    #[inline]
    pub fn admits(self, kind: ElementKind) -> bool {
        match self {
            ElementDomain::All => true,
            ElementDomain::Int => matches!(kind, ElementKind::Signed | ElementKind::Unsigned),
            ElementDomain::Float => matches!(kind, ElementKind::Float),
        }
    }
}

/// Immutable declaration of one operation family.
#[derive(Debug, Clone, Copy)]
pub struct FamilySpec {
    pub mnemonic: Mnemonic,
    pub roles: &'static [Role],
    pub domain: ElementDomain,
    pub has_result: bool,
    /// Whether the masked form carries a pass-through vector supplying
    /// values for inactive lanes. True for every family in this set; store
    /// families keep the operand for shape uniformity and ignore its lanes.
    pub masked_passthrough: bool,
}

static CATALOG: [FamilySpec; 8] = [
    FamilySpec {
        mnemonic: Mnemonic::Add,
        roles: &[Role::Vector, Role::Vector, Role::Count],
        domain: ElementDomain::Int,
        has_result: true,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::FloatAdd,
        roles: &[Role::Vector, Role::Vector, Role::Count],
        domain: ElementDomain::Float,
        has_result: true,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::UnitLoad,
        roles: &[Role::PointerConst, Role::Count],
        domain: ElementDomain::All,
        has_result: true,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::UnitStore,
        roles: &[Role::PointerMut, Role::Vector, Role::Count],
        domain: ElementDomain::All,
        has_result: false,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::StridedLoad,
        roles: &[Role::PointerConst, Role::Scalar, Role::Count],
        domain: ElementDomain::All,
        has_result: true,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::StridedStore,
        roles: &[Role::PointerMut, Role::Scalar, Role::Vector, Role::Count],
        domain: ElementDomain::All,
        has_result: false,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::IndexedLoad,
        roles: &[Role::PointerConst, Role::IndexVector, Role::Count],
        domain: ElementDomain::All,
        has_result: true,
        masked_passthrough: true,
    },
    FamilySpec {
        mnemonic: Mnemonic::IndexedStore,
        roles: &[Role::PointerMut, Role::IndexVector, Role::Vector, Role::Count],
        domain: ElementDomain::All,
        has_result: false,
        masked_passthrough: true,
    },
];

/// Look up the declaration of a family.
pub fn family(mnemonic: Mnemonic) -> &'static FamilySpec {
    // CATALOG is ordered by Mnemonic declaration order.
    &CATALOG[mnemonic as usize]
}

/// Ordered argument roles of the unmasked call shape.
#[inline]
pub fn roles(mnemonic: Mnemonic) -> &'static [Role] {
    family(mnemonic).roles
}

/// Unmasked arity. The masked shape adds the predicate and the pass-through
/// vector in front.
#[inline]
pub fn arity(mnemonic: Mnemonic) -> usize {
    family(mnemonic).roles.len()
}

/// Whether the family carries the independent index-width axis.
#[inline]
pub fn is_indexed(mnemonic: Mnemonic) -> bool {
    roles(mnemonic).contains(&Role::IndexVector)
}

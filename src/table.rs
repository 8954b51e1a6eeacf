// SPDX-License-Identifier: Apache-2.0

//! Concrete operation table
//!
//! The full cross product of operation family x legal type combination x
//! {masked, unmasked}, built once from the registry and the catalog. Each row
//! is a fully-typed operation with its argument signature and primitive
//! symbol. Rows are looked up, never altered; a legal combination that fails
//! to produce its rows is a construction-time panic, not a per-call error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, FamilySpec, Mnemonic, Role};
use crate::constants::ELEMENT_WIDTHS;
use crate::registry::{FloatCapabilities, TypeRegistry};
use crate::types::{ArgType, ElementType, ElementWidth, GroupFactor, Result, RvxError};

/// One fully-specialized operation: a single row of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteOp {
    pub mnemonic: Mnemonic,
    pub elem: ElementType,
    pub group: GroupFactor,
    pub masked: bool,
    /// Index operand binding for gather/scatter rows.
    pub index: Option<(ElementType, GroupFactor)>,
    /// Exact argument shape of this row, mask and pass-through included.
    pub signature: Vec<ArgType>,
    /// Symbol of the underlying hardware primitive, e.g. `vadd_vv_i8m1_m`.
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OpKey {
    mnemonic: Mnemonic,
    elem: ElementType,
    group: GroupFactor,
    masked: bool,
    index_width: Option<ElementWidth>,
}

/// Immutable table of every concrete operation for one configuration.
pub struct OperationTable {
    registry: TypeRegistry,
    ops: HashMap<OpKey, ConcreteOp>,
}

impl OperationTable {
    /// Build the table for a capability configuration.
    ///
    /// Panics if generation ever produces two rows for one key or a row
    /// count that disagrees with the registry; either means the generation
    /// logic itself is broken.
    pub fn build(caps: FloatCapabilities) -> Self {
        let registry = TypeRegistry::new(caps);
        let mut ops = HashMap::new();
        let mut expected = 0usize;

        for mnemonic in Mnemonic::ALL {
            let spec = catalog::family(mnemonic);
            for (elem, group) in registry.legal_combinations() {
                if !spec.domain.admits(elem.kind) {
                    continue;
                }
                if catalog::is_indexed(mnemonic) {
                    for iw in ELEMENT_WIDTHS {
                        let Ok(ig) = registry.index_group_for(elem, group, iw) else {
                            continue;
                        };
                        let index = Some((ElementType::unsigned(iw), ig));
                        for masked in [false, true] {
                            insert_row(&mut ops, &registry, spec, elem, group, masked, index);
                            expected += 1;
                        }
                    }
                } else {
                    for masked in [false, true] {
                        insert_row(&mut ops, &registry, spec, elem, group, masked, None);
                        expected += 1;
                    }
                }
            }
        }

        assert_eq!(
            ops.len(),
            expected,
            "operation table construction lost rows"
        );
        Self { registry, ops }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConcreteOp> {
        self.ops.values()
    }

    /// Select the unique row for a binding.
    ///
    /// A pair outside the registry fails `UnsupportedCombination`; a legal
    /// pair excluded by the family's own constraints (element-kind domain,
    /// index/data width pairing) fails `NoSuchOperation`.
    pub fn lookup(
        &self,
        mnemonic: Mnemonic,
        elem: ElementType,
        group: GroupFactor,
        masked: bool,
        index_width: Option<ElementWidth>,
    ) -> Result<&ConcreteOp> {
        if !self.registry.is_legal(elem, group) {
            return Err(RvxError::UnsupportedCombination(format!(
                "no {}{} combination in this configuration",
                elem.suffix(),
                group.suffix()
            )));
        }
        let key = OpKey {
            mnemonic,
            elem,
            group,
            masked,
            index_width,
        };
        self.ops.get(&key).ok_or_else(|| {
            RvxError::NoSuchOperation(format!(
                "{} has no {}entry for {}{}{}",
                mnemonic.stem(),
                if masked { "masked " } else { "" },
                elem.suffix(),
                group.suffix(),
                match index_width {
                    Some(w) => format!(" with {}-bit indexes", w.bits()),
                    None => String::new(),
                }
            ))
        })
    }
}

fn insert_row(
    ops: &mut HashMap<OpKey, ConcreteOp>,
    registry: &TypeRegistry,
    spec: &FamilySpec,
    elem: ElementType,
    group: GroupFactor,
    masked: bool,
    index: Option<(ElementType, GroupFactor)>,
) {
    let key = OpKey {
        mnemonic: spec.mnemonic,
        elem,
        group,
        masked,
        index_width: index.map(|(ie, _)| ie.width),
    };
    let row = ConcreteOp {
        mnemonic: spec.mnemonic,
        elem,
        group,
        masked,
        index,
        signature: signature(registry, spec, elem, group, masked, index),
        symbol: symbol(spec.mnemonic, elem, group, masked, index),
    };
    let prev = ops.insert(key, row);
    assert!(
        prev.is_none(),
        "duplicate operation table row for {} {}{}",
        spec.mnemonic.stem(),
        elem.suffix(),
        group.suffix()
    );
}

/// The exact argument shape of one row. The masked shape prepends the
/// predicate and, when the family declares it, the pass-through vector.
fn signature(
    registry: &TypeRegistry,
    spec: &FamilySpec,
    elem: ElementType,
    group: GroupFactor,
    masked: bool,
    index: Option<(ElementType, GroupFactor)>,
) -> Vec<ArgType> {
    let mut sig = Vec::with_capacity(spec.roles.len() + 2);
    if masked {
        // Legality was established by the caller; the formula cannot fail here.
        let granularity = registry
            .mask_granularity_for(elem, group)
            .expect("mask granularity for legal combination");
        sig.push(ArgType::Mask(granularity));
        if spec.masked_passthrough {
            sig.push(ArgType::Vector(elem, group));
        }
    }
    for role in spec.roles {
        sig.push(match role {
            Role::Vector => ArgType::Vector(elem, group),
            Role::IndexVector => {
                let (ie, ig) = index.expect("index binding for indexed family");
                ArgType::IndexVector(ie, ig)
            }
            // Byte strides are pointer-difference sized.
            Role::Scalar => ArgType::Scalar(ElementType::signed(ElementWidth::W64)),
            Role::PointerConst => ArgType::PointerConst(elem),
            Role::PointerMut => ArgType::PointerMut(elem),
            Role::Count => ArgType::Count,
        });
    }
    sig
}

/// Primitive symbol for one row, following the vendor intrinsic naming:
/// stem, operand-form tag, element/group type suffix, `_m` when masked.
fn symbol(
    mnemonic: Mnemonic,
    elem: ElementType,
    group: GroupFactor,
    masked: bool,
    index: Option<(ElementType, GroupFactor)>,
) -> String {
    let ty = format!("{}{}", elem.suffix(), group.suffix());
    let base = match mnemonic {
        Mnemonic::Add | Mnemonic::FloatAdd => format!("{}_vv_{}", mnemonic.stem(), ty),
        Mnemonic::UnitLoad | Mnemonic::UnitStore | Mnemonic::StridedLoad | Mnemonic::StridedStore => {
            format!("{}{}_v_{}", mnemonic.stem(), elem.width.bits(), ty)
        }
        Mnemonic::IndexedLoad | Mnemonic::IndexedStore => {
            let (ie, _) = index.expect("index binding for indexed family");
            format!("{}{}_v_{}", mnemonic.stem(), ie.width.bits(), ty)
        }
    };
    if masked {
        format!("{}_m", base)
    } else {
        base
    }
}

static DEFAULT_TABLE: Lazy<OperationTable> =
    Lazy::new(|| OperationTable::build(FloatCapabilities::detect()));

/// The process-wide table for this build's capability configuration.
/// Built once, then shared read-only across any number of callers.
#[inline]
pub fn default_table() -> &'static OperationTable {
    &DEFAULT_TABLE
}

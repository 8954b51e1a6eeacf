// SPDX-License-Identifier: Apache-2.0

//! # RVX dispatch framework
//!
//! This module contains the overload resolver and the public generic
//! mnemonic entry points. A caller invokes a mnemonic with concrete-typed
//! operands; the resolver consults the type registry and family catalog,
//! selects the unique concrete operation table row, and the adapter forwards
//! to the primitive. Resolution is a pure function of static types: no state,
//! no coercion, failures surfaced immediately.

use log::trace;

use crate::adapter::{self, Operand};
use crate::catalog::{self, Mnemonic, Role};
use crate::table::{default_table, ConcreteOp, OperationTable};
use crate::types::{
    ArgType, ElementKind, ElementType, ElementWidth, GroupFactor, MaskValue, Result, RvxError,
    ScalarValue, VectorValue,
};

// =============================================================================
// OVERLOAD RESOLVER
// =============================================================================

/// Resolve a generic mnemonic against the static types of its arguments.
///
/// `result_type` is the static type of the call's destination, when the host
/// knows it; load families cannot be resolved in the unmasked form without
/// it, since no argument carries the element binding.
///
/// Algorithm, in order: arity against the family's declared role count
/// (masked shape adds the predicate and pass-through in front); masked form
/// detected by a leading predicate type; one element type and group factor
/// extracted from every vector-typed argument, the index vector excepted;
/// predicate granularity checked against the registry; unique table row
/// returned.
pub fn resolve<'t>(
    table: &'t OperationTable,
    mnemonic: Mnemonic,
    args: &[ArgType],
    result_type: Option<(ElementType, GroupFactor)>,
) -> Result<&'t ConcreteOp> {
    let spec = catalog::family(mnemonic);
    let masked = matches!(args.first(), Some(ArgType::Mask(_)));
    let extra = if masked {
        1 + spec.masked_passthrough as usize
    } else {
        0
    };
    if args.len() != spec.roles.len() + extra {
        return Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
            "{} takes {} arguments in the {} form, got {}",
            mnemonic.stem(),
            spec.roles.len() + extra,
            if masked { "masked" } else { "unmasked" },
            args.len()
        )));
    }

    // Element type and group factor must agree across every data vector,
    // the pass-through included; the result type participates like any
    // other vector-typed binding.
    let mut binding: Option<(ElementType, GroupFactor)> = result_type;
    let mut unify = |e: ElementType, g: GroupFactor| -> Result<()> {
        match binding {
            None => {
                binding = Some((e, g));
                Ok(())
            }
            Some(b) if b == (e, g) => Ok(()),
            Some((be, bg)) => Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
                "vector operands disagree: {}{} vs {}{}",
                be.suffix(),
                bg.suffix(),
                e.suffix(),
                g.suffix()
            ))),
        }
    };

    let mut mask_granularity = None;
    let mut index = None;
    if masked {
        match args[0] {
            ArgType::Mask(g) => mask_granularity = Some(g),
            _ => unreachable!(),
        }
        if spec.masked_passthrough {
            match args[1] {
                ArgType::Vector(e, g) => unify(e, g)?,
                _ => {
                    return Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
                        "{} masked form requires a pass-through vector after the predicate",
                        mnemonic.stem()
                    )))
                }
            }
        }
    }

    let mut pointee = None;
    for (role, arg) in spec.roles.iter().zip(&args[extra..]) {
        match (role, arg) {
            (Role::Vector, ArgType::Vector(e, g)) => unify(*e, *g)?,
            (Role::IndexVector, ArgType::IndexVector(e, g)) => index = Some((*e, *g)),
            (Role::Scalar, ArgType::Scalar(_)) => {}
            (Role::PointerConst, ArgType::PointerConst(e)) => pointee = Some(*e),
            // Read-only memory casts from a writable static type.
            (Role::PointerConst, ArgType::PointerMut(e)) => pointee = Some(*e),
            (Role::PointerMut, ArgType::PointerMut(e)) => pointee = Some(*e),
            (Role::Count, ArgType::Count) => {}
            (role, arg) => {
                return Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
                    "{}: argument {:?} does not fit role {:?}",
                    mnemonic.stem(),
                    arg,
                    role
                )))
            }
        }
    }

    let (elem, group) = binding.ok_or_else(|| {
        RvxError::AmbiguousOrUnresolvedOverload(format!(
            "{}: no vector-typed argument or result to infer the element type from",
            mnemonic.stem()
        ))
    })?;

    if let Some(p) = pointee {
        if p != elem {
            return Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
                "{}: pointee type {} disagrees with element type {}",
                mnemonic.stem(),
                p.suffix(),
                elem.suffix()
            )));
        }
    }

    // Predicate granularity must match the registry's derivation exactly.
    if let Some(got) = mask_granularity {
        let want = table.registry().mask_granularity_for(elem, group)?;
        if got != want {
            return Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
                "{}: mask granularity {} does not match {} for {}{}",
                mnemonic.stem(),
                got.get(),
                want.get(),
                elem.suffix(),
                group.suffix()
            )));
        }
    }

    // The index operand is validated independently: the registry forces its
    // group factor from the data binding and the index width.
    let index_width = match index {
        Some((ie, ig)) => {
            let forced = table.registry().index_group_for(elem, group, ie.width)?;
            if ie.kind != ElementKind::Unsigned || ig != forced {
                return Err(RvxError::AmbiguousOrUnresolvedOverload(format!(
                    "{}: index operand {}{} does not match the required u{}{}",
                    mnemonic.stem(),
                    ie.suffix(),
                    ig.suffix(),
                    ie.width.bits(),
                    forced.suffix()
                )));
            }
            Some(ie.width)
        }
        None => None,
    };

    table.lookup(mnemonic, elem, group, masked, index_width)
}

// =============================================================================
// PUBLIC MNEMONIC ENTRY POINTS
// =============================================================================

/// Masked call form: predicate plus pass-through vector, as one unit.
///
/// The masked variant is a tagged form of the call, not a positional
/// reordering; store families carry the pass-through for shape uniformity
/// and never read its lanes.
#[derive(Clone, Copy)]
pub struct MaskedOp<'a> {
    pub mask: &'a MaskValue,
    pub passthrough: &'a VectorValue,
}

fn masked_prefix(masked: &Option<MaskedOp<'_>>, args: &mut Vec<ArgType>) {
    if let Some(m) = masked {
        args.push(ArgType::Mask(m.mask.granularity()));
        args.push(ArgType::Vector(
            m.passthrough.element_type(),
            m.passthrough.group_factor(),
        ));
    }
}

fn masked_operands<'a>(masked: &Option<MaskedOp<'a>>, ops: &mut Vec<Operand<'a>>) {
    if let Some(m) = masked {
        ops.push(Operand::Mask(m.mask));
        ops.push(Operand::Vector(m.passthrough));
    }
}

fn expect_result(op: &ConcreteOp, result: Option<VectorValue>) -> Result<VectorValue> {
    result.ok_or_else(|| RvxError::Internal(format!("{} produced no result", op.symbol)))
}

/// Elementwise integer add: `out[i] = a[i] + b[i]`, wrapping.
pub fn vadd(
    masked: Option<MaskedOp<'_>>,
    a: &VectorValue,
    b: &VectorValue,
    vl: usize,
) -> Result<VectorValue> {
    trace!(
        "VADD DISPATCH: elem={} group={} vl={} masked={}",
        a.element_type().suffix(),
        a.group_factor().suffix(),
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(5);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::Vector(a.element_type(), a.group_factor()));
    args.push(ArgType::Vector(b.element_type(), b.group_factor()));
    args.push(ArgType::Count);
    let op = resolve(default_table(), Mnemonic::Add, &args, None)?;

    let mut operands = Vec::with_capacity(5);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::Vector(a));
    operands.push(Operand::Vector(b));
    operands.push(Operand::Count(vl));
    let result = adapter::invoke(op, operands)?;
    expect_result(op, result)
}

/// Elementwise floating add.
pub fn vfadd(
    masked: Option<MaskedOp<'_>>,
    a: &VectorValue,
    b: &VectorValue,
    vl: usize,
) -> Result<VectorValue> {
    trace!(
        "VFADD DISPATCH: elem={} group={} vl={} masked={}",
        a.element_type().suffix(),
        a.group_factor().suffix(),
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(5);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::Vector(a.element_type(), a.group_factor()));
    args.push(ArgType::Vector(b.element_type(), b.group_factor()));
    args.push(ArgType::Count);
    let op = resolve(default_table(), Mnemonic::FloatAdd, &args, None)?;

    let mut operands = Vec::with_capacity(5);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::Vector(a));
    operands.push(Operand::Vector(b));
    operands.push(Operand::Count(vl));
    let result = adapter::invoke(op, operands)?;
    expect_result(op, result)
}

/// Contiguous load of `vl` elements into a fresh register group.
pub fn vle(
    masked: Option<MaskedOp<'_>>,
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    vl: usize,
) -> Result<VectorValue> {
    trace!(
        "VLE DISPATCH: elem={} group={} mem.len()={} vl={} masked={}",
        elem.suffix(),
        group.suffix(),
        mem.len(),
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(4);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::PointerConst(elem));
    args.push(ArgType::Count);
    let op = resolve(default_table(), Mnemonic::UnitLoad, &args, Some((elem, group)))?;

    let mut operands = Vec::with_capacity(4);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::MemConst(mem));
    operands.push(Operand::Count(vl));
    let result = adapter::invoke(op, operands)?;
    expect_result(op, result)
}

/// Contiguous store of `vl` elements.
pub fn vse(
    masked: Option<MaskedOp<'_>>,
    mem: &mut [u8],
    data: &VectorValue,
    vl: usize,
) -> Result<()> {
    trace!(
        "VSE DISPATCH: elem={} group={} mem.len()={} vl={} masked={}",
        data.element_type().suffix(),
        data.group_factor().suffix(),
        mem.len(),
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(5);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::PointerMut(data.element_type()));
    args.push(ArgType::Vector(data.element_type(), data.group_factor()));
    args.push(ArgType::Count);
    let op = resolve(default_table(), Mnemonic::UnitStore, &args, None)?;

    let mut operands = Vec::with_capacity(5);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::Mem(mem));
    operands.push(Operand::Vector(data));
    operands.push(Operand::Count(vl));
    adapter::invoke(op, operands)?;
    Ok(())
}

/// Load with a constant byte stride between consecutive elements.
pub fn vlse(
    masked: Option<MaskedOp<'_>>,
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    stride: i64,
    vl: usize,
) -> Result<VectorValue> {
    trace!(
        "VLSE DISPATCH: elem={} group={} stride={} vl={} masked={}",
        elem.suffix(),
        group.suffix(),
        stride,
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(5);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::PointerConst(elem));
    args.push(ArgType::Scalar(ElementType::signed(ElementWidth::W64)));
    args.push(ArgType::Count);
    let op = resolve(
        default_table(),
        Mnemonic::StridedLoad,
        &args,
        Some((elem, group)),
    )?;

    let mut operands = Vec::with_capacity(5);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::MemConst(mem));
    operands.push(Operand::Scalar(ScalarValue::I64(stride)));
    operands.push(Operand::Count(vl));
    let result = adapter::invoke(op, operands)?;
    expect_result(op, result)
}

/// Store with a constant byte stride between consecutive elements.
pub fn vsse(
    masked: Option<MaskedOp<'_>>,
    mem: &mut [u8],
    stride: i64,
    data: &VectorValue,
    vl: usize,
) -> Result<()> {
    trace!(
        "VSSE DISPATCH: elem={} group={} stride={} vl={} masked={}",
        data.element_type().suffix(),
        data.group_factor().suffix(),
        stride,
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(6);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::PointerMut(data.element_type()));
    args.push(ArgType::Scalar(ElementType::signed(ElementWidth::W64)));
    args.push(ArgType::Vector(data.element_type(), data.group_factor()));
    args.push(ArgType::Count);
    let op = resolve(default_table(), Mnemonic::StridedStore, &args, None)?;

    let mut operands = Vec::with_capacity(6);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::Mem(mem));
    operands.push(Operand::Scalar(ScalarValue::I64(stride)));
    operands.push(Operand::Vector(data));
    operands.push(Operand::Count(vl));
    adapter::invoke(op, operands)?;
    Ok(())
}

/// Gather: per-lane byte offsets come from the unsigned index vector.
pub fn vluxei(
    masked: Option<MaskedOp<'_>>,
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    index: &VectorValue,
    vl: usize,
) -> Result<VectorValue> {
    trace!(
        "VLUXEI DISPATCH: elem={} group={} index={}{} vl={} masked={}",
        elem.suffix(),
        group.suffix(),
        index.element_type().suffix(),
        index.group_factor().suffix(),
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(5);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::PointerConst(elem));
    args.push(ArgType::IndexVector(
        index.element_type(),
        index.group_factor(),
    ));
    args.push(ArgType::Count);
    let op = resolve(
        default_table(),
        Mnemonic::IndexedLoad,
        &args,
        Some((elem, group)),
    )?;

    let mut operands = Vec::with_capacity(5);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::MemConst(mem));
    operands.push(Operand::Vector(index));
    operands.push(Operand::Count(vl));
    let result = adapter::invoke(op, operands)?;
    expect_result(op, result)
}

/// Scatter: per-lane byte offsets come from the unsigned index vector.
pub fn vsuxei(
    masked: Option<MaskedOp<'_>>,
    mem: &mut [u8],
    index: &VectorValue,
    data: &VectorValue,
    vl: usize,
) -> Result<()> {
    trace!(
        "VSUXEI DISPATCH: elem={} group={} index={}{} vl={} masked={}",
        data.element_type().suffix(),
        data.group_factor().suffix(),
        index.element_type().suffix(),
        index.group_factor().suffix(),
        vl,
        masked.is_some()
    );
    let mut args = Vec::with_capacity(6);
    masked_prefix(&masked, &mut args);
    args.push(ArgType::PointerMut(data.element_type()));
    args.push(ArgType::IndexVector(
        index.element_type(),
        index.group_factor(),
    ));
    args.push(ArgType::Vector(data.element_type(), data.group_factor()));
    args.push(ArgType::Count);
    let op = resolve(default_table(), Mnemonic::IndexedStore, &args, None)?;

    let mut operands = Vec::with_capacity(6);
    masked_operands(&masked, &mut operands);
    operands.push(Operand::Mem(mem));
    operands.push(Operand::Vector(index));
    operands.push(Operand::Vector(data));
    operands.push(Operand::Count(vl));
    adapter::invoke(op, operands)?;
    Ok(())
}

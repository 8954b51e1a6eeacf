// SPDX-License-Identifier: Apache-2.0

//! Primitive invocation adapter
//!
//! Takes a resolved table row plus runtime operands, checks each operand
//! against the row's exact signature (element type, group factor, pointer
//! constness, scalar width, count), and forwards to the one matching
//! reference kernel. The adapter adds no side effects of its own; memory
//! reads and writes belong to the primitive.

use crate::catalog::Mnemonic;
use crate::kernels::{self, MaskedLanes};
use crate::table::ConcreteOp;
use crate::types::{ArgType, MaskValue, Result, RvxError, ScalarValue, VectorValue};

/// One runtime argument. A writable memory operand may stand in where the
/// signature asks for read-only memory; the reverse is rejected.
pub enum Operand<'a> {
    Vector(&'a VectorValue),
    Mask(&'a MaskValue),
    Scalar(ScalarValue),
    MemConst(&'a [u8]),
    Mem(&'a mut [u8]),
    Count(usize),
}

/// Collected, signature-checked operands ready for a kernel call.
struct CheckedArgs<'a> {
    mask: Option<&'a MaskValue>,
    passthrough: Option<&'a VectorValue>,
    vectors: Vec<&'a VectorValue>,
    index: Option<&'a VectorValue>,
    stride: Option<i64>,
    mem_const: Option<&'a [u8]>,
    mem_mut: Option<&'a mut [u8]>,
    vl: Option<usize>,
}

/// Invoke the primitive behind a resolved operation.
///
/// Returns the produced vector for load/compute rows, `None` for stores.
/// Operands must arrive in signature order; any shape disagreement with the
/// row is an `Internal` error since resolution already fixed the types.
pub fn invoke<'a>(op: &ConcreteOp, args: Vec<Operand<'a>>) -> Result<Option<VectorValue>> {
    if args.len() != op.signature.len() {
        return Err(RvxError::Internal(format!(
            "{} expects {} operands, got {}",
            op.symbol,
            op.signature.len(),
            args.len()
        )));
    }

    let mut c = CheckedArgs {
        mask: None,
        passthrough: None,
        vectors: Vec::new(),
        index: None,
        stride: None,
        mem_const: None,
        mem_mut: None,
        vl: None,
    };

    for (pos, (arg, want)) in args.into_iter().zip(op.signature.iter()).enumerate() {
        match (want, arg) {
            (ArgType::Mask(g), Operand::Mask(m)) => {
                if m.granularity() != *g {
                    return Err(mismatch(op, pos, "mask granularity"));
                }
                c.mask = Some(m);
            }
            (ArgType::Vector(e, g), Operand::Vector(v)) => {
                if v.element_type() != *e || v.group_factor() != *g {
                    return Err(mismatch(op, pos, "vector type"));
                }
                // The signature puts the pass-through vector right after the
                // mask; everything later is a data operand.
                if op.masked && c.passthrough.is_none() && c.vectors.is_empty() {
                    c.passthrough = Some(v);
                } else {
                    c.vectors.push(v);
                }
            }
            (ArgType::IndexVector(e, g), Operand::Vector(v)) => {
                if v.element_type() != *e || v.group_factor() != *g {
                    return Err(mismatch(op, pos, "index vector type"));
                }
                c.index = Some(v);
            }
            (ArgType::Scalar(_), Operand::Scalar(ScalarValue::I64(s))) => {
                c.stride = Some(s);
            }
            (ArgType::PointerConst(_), Operand::MemConst(m)) => {
                c.mem_const = Some(m);
            }
            // A writable operand casts down to read-only.
            (ArgType::PointerConst(_), Operand::Mem(m)) => {
                let m: &[u8] = m;
                c.mem_const = Some(m);
            }
            (ArgType::PointerMut(_), Operand::Mem(m)) => {
                c.mem_mut = Some(m);
            }
            (ArgType::Count, Operand::Count(n)) => {
                c.vl = Some(n);
            }
            _ => return Err(mismatch(op, pos, "operand kind")),
        }
    }

    forward(op, c)
}

fn forward(op: &ConcreteOp, c: CheckedArgs<'_>) -> Result<Option<VectorValue>> {
    let vl = c
        .vl
        .ok_or_else(|| RvxError::Internal(format!("{} missing element count", op.symbol)))?;
    let masked = match (c.mask, c.passthrough) {
        (Some(mask), Some(passthrough)) => Some(MaskedLanes { mask, passthrough }),
        _ => None,
    };

    match op.mnemonic {
        Mnemonic::Add => {
            let (a, b) = two_vectors(op, &c.vectors)?;
            kernels::add(a, b, vl, masked).map(Some)
        }
        Mnemonic::FloatAdd => {
            let (a, b) = two_vectors(op, &c.vectors)?;
            kernels::fadd(a, b, vl, masked).map(Some)
        }
        Mnemonic::UnitLoad => {
            let mem = need_mem_const(op, &c)?;
            kernels::unit_load(op.elem, op.group, mem, vl, masked).map(Some)
        }
        Mnemonic::UnitStore => {
            let data = one_vector(op, &c.vectors)?;
            let mem = need_mem_mut(op, c.mem_mut)?;
            kernels::unit_store(mem, data, vl, c.mask).map(|_| None)
        }
        Mnemonic::StridedLoad => {
            let mem = need_mem_const(op, &c)?;
            let stride = need_stride(op, c.stride)?;
            kernels::strided_load(op.elem, op.group, mem, stride, vl, masked).map(Some)
        }
        Mnemonic::StridedStore => {
            let data = one_vector(op, &c.vectors)?;
            let stride = need_stride(op, c.stride)?;
            let mem = need_mem_mut(op, c.mem_mut)?;
            kernels::strided_store(mem, stride, data, vl, c.mask).map(|_| None)
        }
        Mnemonic::IndexedLoad => {
            let mem = need_mem_const(op, &c)?;
            let index = need_index(op, c.index)?;
            kernels::indexed_load(op.elem, op.group, mem, index, vl, masked).map(Some)
        }
        Mnemonic::IndexedStore => {
            let data = one_vector(op, &c.vectors)?;
            let index = need_index(op, c.index)?;
            let mem = need_mem_mut(op, c.mem_mut)?;
            kernels::indexed_store(mem, index, data, vl, c.mask).map(|_| None)
        }
    }
}

fn mismatch(op: &ConcreteOp, pos: usize, what: &str) -> RvxError {
    RvxError::Internal(format!(
        "{} operand {} does not match the signature ({})",
        op.symbol, pos, what
    ))
}

fn two_vectors<'a>(
    op: &ConcreteOp,
    vectors: &[&'a VectorValue],
) -> Result<(&'a VectorValue, &'a VectorValue)> {
    match *vectors {
        [a, b] => Ok((a, b)),
        _ => Err(RvxError::Internal(format!(
            "{} expects two vector operands",
            op.symbol
        ))),
    }
}

fn one_vector<'a>(op: &ConcreteOp, vectors: &[&'a VectorValue]) -> Result<&'a VectorValue> {
    match *vectors {
        [v] => Ok(v),
        _ => Err(RvxError::Internal(format!(
            "{} expects one vector operand",
            op.symbol
        ))),
    }
}

fn need_mem_const<'a, 'b>(op: &ConcreteOp, c: &'b CheckedArgs<'a>) -> Result<&'b [u8]> {
    c.mem_const
        .or(c.mem_mut.as_deref())
        .ok_or_else(|| RvxError::Internal(format!("{} missing memory operand", op.symbol)))
}

fn need_mem_mut<'a>(op: &ConcreteOp, mem: Option<&'a mut [u8]>) -> Result<&'a mut [u8]> {
    mem.ok_or_else(|| RvxError::Internal(format!("{} missing writable memory operand", op.symbol)))
}

fn need_stride(op: &ConcreteOp, stride: Option<i64>) -> Result<i64> {
    stride.ok_or_else(|| RvxError::Internal(format!("{} missing stride operand", op.symbol)))
}

fn need_index<'a>(op: &ConcreteOp, index: Option<&'a VectorValue>) -> Result<&'a VectorValue> {
    index.ok_or_else(|| RvxError::Internal(format!("{} missing index operand", op.symbol)))
}

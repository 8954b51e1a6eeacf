// SPDX-License-Identifier: Apache-2.0

//! Scalar reference primitives
//!
//! One kernel per operation family, standing in for the hardware primitive
//! the adapter ultimately forwards to. All lane arithmetic and memory access
//! happen here and nowhere else. Memory operands are byte slices; an access
//! outside the slice is an `Internal` error of the software model, never a
//! silent wrap.
//!
//! Lane policy: active lanes are computed or written; inactive lanes take
//! the pass-through lane value (loads/compute) or leave memory untouched
//! (stores). Tail lanes past the element count keep pass-through values in
//! the masked form and zero in the unmasked form.

use crate::types::{
    ElementType, ElementWidth, GroupFactor, MaskValue, Result, RvxError, VectorValue,
};

/// Predicate plus pass-through pair for masked result-producing kernels.
#[derive(Clone, Copy)]
pub struct MaskedLanes<'a> {
    pub mask: &'a MaskValue,
    pub passthrough: &'a VectorValue,
}

// =============================================================================
// ELEMENTWISE ARITHMETIC
// =============================================================================

/// Elementwise integer add, wrapping at the element width.
pub fn add(
    a: &VectorValue,
    b: &VectorValue,
    vl: usize,
    masked: Option<MaskedLanes<'_>>,
) -> Result<VectorValue> {
    check_vl(a, vl)?;
    let mut out = result_base(a.element_type(), a.group_factor(), &masked);
    for i in 0..vl {
        if lane_active(&masked, i) {
            let sum = a.lane_bits(i).wrapping_add(b.lane_bits(i));
            out.set_lane_bits(i, truncate(sum, a.element_type().width));
        }
    }
    Ok(out)
}

/// Elementwise IEEE floating add.
pub fn fadd(
    a: &VectorValue,
    b: &VectorValue,
    vl: usize,
    masked: Option<MaskedLanes<'_>>,
) -> Result<VectorValue> {
    check_vl(a, vl)?;
    let width = a.element_type().width;
    let mut out = result_base(a.element_type(), a.group_factor(), &masked);
    for i in 0..vl {
        if lane_active(&masked, i) {
            let raw = match width {
                ElementWidth::W16 => {
                    let s = f16_bits_to_f32(a.lane_bits(i) as u16)
                        + f16_bits_to_f32(b.lane_bits(i) as u16);
                    f32_to_f16_bits(s) as u64
                }
                ElementWidth::W32 => {
                    let s = f32::from_bits(a.lane_bits(i) as u32)
                        + f32::from_bits(b.lane_bits(i) as u32);
                    s.to_bits() as u64
                }
                ElementWidth::W64 => {
                    let s = f64::from_bits(a.lane_bits(i)) + f64::from_bits(b.lane_bits(i));
                    s.to_bits()
                }
                ElementWidth::W8 => {
                    return Err(RvxError::Internal(
                        "8-bit float lanes do not exist".to_string(),
                    ))
                }
            };
            out.set_lane_bits(i, raw);
        }
    }
    Ok(out)
}

// =============================================================================
// MEMORY: CONTIGUOUS / STRIDED / INDEXED
// =============================================================================

pub fn unit_load(
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    vl: usize,
    masked: Option<MaskedLanes<'_>>,
) -> Result<VectorValue> {
    let ebytes = elem.width.bytes() as i128;
    load_with(elem, group, mem, vl, masked, |i| i as i128 * ebytes)
}

pub fn unit_store(
    mem: &mut [u8],
    data: &VectorValue,
    vl: usize,
    mask: Option<&MaskValue>,
) -> Result<()> {
    let ebytes = data.element_type().width.bytes() as i128;
    store_with(mem, data, vl, mask, |i| i as i128 * ebytes)
}

pub fn strided_load(
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    stride: i64,
    vl: usize,
    masked: Option<MaskedLanes<'_>>,
) -> Result<VectorValue> {
    // Offsets stay in i128 so a huge stride on a late lane cannot wrap past
    // the bounds check.
    load_with(elem, group, mem, vl, masked, |i| i as i128 * stride as i128)
}

pub fn strided_store(
    mem: &mut [u8],
    stride: i64,
    data: &VectorValue,
    vl: usize,
    mask: Option<&MaskValue>,
) -> Result<()> {
    store_with(mem, data, vl, mask, |i| i as i128 * stride as i128)
}

/// Gather: each active lane reads at the byte offset in the index lane.
pub fn indexed_load(
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    index: &VectorValue,
    vl: usize,
    masked: Option<MaskedLanes<'_>>,
) -> Result<VectorValue> {
    check_vl(index, vl)?;
    load_with(elem, group, mem, vl, masked, |i| index.lane_bits(i) as i128)
}

/// Scatter: each active lane writes at the byte offset in the index lane.
pub fn indexed_store(
    mem: &mut [u8],
    index: &VectorValue,
    data: &VectorValue,
    vl: usize,
    mask: Option<&MaskValue>,
) -> Result<()> {
    check_vl(index, vl)?;
    store_with(mem, data, vl, mask, |i| index.lane_bits(i) as i128)
}

fn load_with(
    elem: ElementType,
    group: GroupFactor,
    mem: &[u8],
    vl: usize,
    masked: Option<MaskedLanes<'_>>,
    offset: impl Fn(usize) -> i128,
) -> Result<VectorValue> {
    let mut out = result_base(elem, group, &masked);
    if vl > out.lanes() {
        return Err(vl_error(vl, out.lanes()));
    }
    for i in 0..vl {
        if lane_active(&masked, i) {
            let raw = read_mem(mem, offset(i), elem.width)?;
            out.set_lane_bits(i, raw);
        }
    }
    Ok(out)
}

fn store_with(
    mem: &mut [u8],
    data: &VectorValue,
    vl: usize,
    mask: Option<&MaskValue>,
    offset: impl Fn(usize) -> i128,
) -> Result<()> {
    check_vl(data, vl)?;
    let width = data.element_type().width;
    for i in 0..vl {
        let active = mask.map_or(true, |m| m.bit(i));
        if active {
            write_mem(mem, offset(i), width, data.lane_bits(i))?;
        }
    }
    Ok(())
}

// =============================================================================
// LANE AND MEMORY HELPERS
// =============================================================================

fn result_base(
    elem: ElementType,
    group: GroupFactor,
    masked: &Option<MaskedLanes<'_>>,
) -> VectorValue {
    match masked {
        Some(m) => m.passthrough.clone(),
        None => VectorValue::zeroed(elem, group),
    }
}

#[inline]
fn lane_active(masked: &Option<MaskedLanes<'_>>, i: usize) -> bool {
    masked.as_ref().map_or(true, |m| m.mask.bit(i))
}

#[inline]
fn truncate(raw: u64, width: ElementWidth) -> u64 {
    match width {
        ElementWidth::W64 => raw,
        _ => raw & ((1u64 << width.bits()) - 1),
    }
}

fn check_vl(v: &VectorValue, vl: usize) -> Result<()> {
    if vl > v.lanes() {
        return Err(vl_error(vl, v.lanes()));
    }
    Ok(())
}

fn vl_error(vl: usize, lanes: usize) -> RvxError {
    RvxError::Internal(format!(
        "element count {} exceeds the {} lanes of the register group",
        vl, lanes
    ))
}

fn read_mem(mem: &[u8], off: i128, width: ElementWidth) -> Result<u64> {
    let span = mem_span(mem.len(), off, width)?;
    let mut raw = [0u8; 8];
    raw[..width.bytes()].copy_from_slice(&mem[span]);
    Ok(u64::from_le_bytes(raw))
}

fn write_mem(mem: &mut [u8], off: i128, width: ElementWidth, raw: u64) -> Result<()> {
    let span = mem_span(mem.len(), off, width)?;
    mem[span].copy_from_slice(&raw.to_le_bytes()[..width.bytes()]);
    Ok(())
}

fn mem_span(len: usize, off: i128, width: ElementWidth) -> Result<std::ops::Range<usize>> {
    let end = off + width.bytes() as i128;
    if off < 0 || end > len as i128 {
        return Err(RvxError::Internal(format!(
            "memory access at byte offset {} ({} bytes) outside a {}-byte operand",
            off,
            width.bytes(),
            len
        )));
    }
    Ok(off as usize..end as usize)
}

// =============================================================================
// HALF-PRECISION BIT CONVERSIONS
// =============================================================================

/// Widen IEEE binary16 bits to f32. Handles subnormals, infinities and NaN.
pub fn f16_bits_to_f32(h: u16) -> f32 {
    let sign = ((h >> 15) & 1) as u32;
    let exp = ((h >> 10) & 0x1f) as u32;
    let frac = (h & 0x3ff) as u32;
    let bits = if exp == 0 {
        if frac == 0 {
            sign << 31
        } else {
            // Subnormal: renormalize into the f32 exponent range.
            let mut e: i32 = 127 - 15 + 1;
            let mut f = frac;
            while f & 0x400 == 0 {
                f <<= 1;
                e -= 1;
            }
            (sign << 31) | ((e as u32) << 23) | ((f & 0x3ff) << 13)
        }
    } else if exp == 0x1f {
        (sign << 31) | 0x7f80_0000 | (frac << 13)
    } else {
        (sign << 31) | ((exp + 127 - 15) << 23) | (frac << 13)
    };
    f32::from_bits(bits)
}

/// Narrow f32 to IEEE binary16 bits with round-to-nearest-even.
pub fn f32_to_f16_bits(x: f32) -> u16 {
    let bits = x.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32;
    let frac = bits & 0x7f_ffff;

    if exp == 0xff {
        // Infinity or NaN; keep NaN signaling as a quiet payload bit.
        let payload = if frac != 0 { 0x200 } else { 0 };
        return sign | 0x7c00 | payload;
    }
    let e = exp - 127 + 15;
    if e >= 0x1f {
        return sign | 0x7c00;
    }
    if e <= 0 {
        if e < -10 {
            return sign;
        }
        // Subnormal half: shift the implicit bit in, round to nearest even.
        let mant = frac | 0x80_0000;
        let shift = (1 - e) as u32 + 13;
        let half = mant >> shift;
        let rem = mant & ((1 << shift) - 1);
        let midpoint = 1u32 << (shift - 1);
        let round_up = rem > midpoint || (rem == midpoint && half & 1 == 1);
        return sign | (half + round_up as u32) as u16;
    }
    let half = (frac >> 13) as u16;
    let rem = frac & 0x1fff;
    let mut out = sign | ((e as u16) << 10) | half;
    // A carry out of the mantissa lands in the exponent, which is the
    // correctly rounded result.
    if rem > 0x1000 || (rem == 0x1000 && out & 1 == 1) {
        out += 1;
    }
    out
}

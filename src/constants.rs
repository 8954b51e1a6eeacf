// SPDX-License-Identifier: Apache-2.0

//! Common constants used across the dispatch layer
//!
//! This module centralizes the fixed dimensions of the type domain: register
//! sizes, element widths, group factors, and the predicate granularity values
//! derived from them.

use crate::types::{ElementKind, ElementWidth, GroupFactor};

// =============================================================================
// REGISTER MODEL
// =============================================================================

/// Widest element a single register may hold. The group-factor legality
/// floor and the mask granularity ceiling both fall out of this value.
pub const ELEN_BITS: u32 = 64;

/// Natural single-register size of the reference model. Only the value
/// containers and reference kernels depend on it; resolution never does.
pub const VLEN_BITS: u32 = 128;

// =============================================================================
// TYPE DOMAIN AXES
// =============================================================================

pub const ELEMENT_WIDTHS: [ElementWidth; 4] = [
    ElementWidth::W8,
    ElementWidth::W16,
    ElementWidth::W32,
    ElementWidth::W64,
];

/// Float widths that can exist at all; each is gated by a capability flag.
pub const FLOAT_WIDTHS: [ElementWidth; 3] =
    [ElementWidth::W16, ElementWidth::W32, ElementWidth::W64];

pub const INT_KINDS: [ElementKind; 2] = [ElementKind::Signed, ElementKind::Unsigned];

pub const GROUP_FACTORS: [GroupFactor; 7] = [
    GroupFactor::MF8,
    GroupFactor::MF4,
    GroupFactor::MF2,
    GroupFactor::M1,
    GroupFactor::M2,
    GroupFactor::M4,
    GroupFactor::M8,
];

// =============================================================================
// PREDICATE GRANULARITY
// =============================================================================

/// Every granularity a legal combination can map to: width / factor spans
/// [8/8, 64/1] = [1, 64] in powers of two.
pub const MASK_GRANULARITIES: [u32; 7] = [1, 2, 4, 8, 16, 32, 64];

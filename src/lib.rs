// SPDX-License-Identifier: Apache-2.0

//! RVX library
//!
//! A generic vector-operation dispatch layer for a RISC-V-style vector
//! instruction-set extension. A handful of mnemonic operation names (add,
//! contiguous/strided/indexed load and store, floating add) resolve, purely
//! from argument static types, to one of many hundreds of fully-specialized
//! concrete operations differing by element signedness, element width,
//! register grouping factor, masked-vs-unmasked form, and index-vector width.
//!
//! - **Type domain registry**: the legal element-type/group-factor pairs and
//!   their predicate granularities, from one ratio formula
//! - **Operation family catalog**: each mnemonic's arity and argument roles
//! - **Concrete operation table**: the full family x type x mask cross
//!   product, built once per capability configuration
//! - **Overload resolver**: deterministic selection of the unique table row
//! - **Invocation adapter**: exact-typed forwarding to the primitive
//!
//! The whole subsystem is a pure mapping over immutable tables; every table
//! may be shared across arbitrarily many concurrent resolutions without
//! locking.
//!
//! ## Capability configuration
//! Floating-point widths are whole rows of the type domain, toggled per
//! build: cargo features `fp16`/`fp32`/`fp64` pick the default table's
//! configuration, and any other [`registry::FloatCapabilities`] can be given
//! to [`table::OperationTable::build`] directly.
//!
//! ## Usage
//!
//! ```rust
//! use rvx::{vadd, ElementType, ElementWidth, GroupFactor, VectorValue};
//!
//! let e = ElementType::signed(ElementWidth::W8);
//! let a = VectorValue::from_i64_lanes(e, GroupFactor::M1, &[1, 2, 3, 4]);
//! let b = VectorValue::from_i64_lanes(e, GroupFactor::M1, &[10, 20, 30, 40]);
//! let sum = vadd(None, &a, &b, 4).unwrap();
//! assert_eq!(sum.lane_as_i64(3), 44);
//! ```

pub mod adapter;
pub mod catalog;
pub mod constants;
pub mod dispatch;
pub mod kernels;
pub mod registry;
pub mod table;
pub mod types;

pub use types::*;

pub use catalog::{arity, family, roles, ElementDomain, FamilySpec, Mnemonic, Role};
pub use dispatch::{resolve, vadd, vfadd, vle, vlse, vluxei, vse, vsse, vsuxei, MaskedOp};
pub use registry::{FloatCapabilities, TypeRegistry};
pub use table::{default_table, ConcreteOp, OperationTable};

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
#[path = "tests/adapter_tests.rs"]
mod adapter_tests;
#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod catalog_tests;
#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod dispatch_tests;
#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod registry_tests;
#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod table_tests;

// SPDX-License-Identifier: Apache-2.0

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use crate::test_utils::config_test_logger;

    use crate::adapter::{self, Operand};
    use crate::catalog::Mnemonic;
    use crate::dispatch::{vadd, vfadd, vle, vlse, vluxei, vse, vsse, vsuxei, MaskedOp};
    use crate::kernels;
    use crate::table::default_table;
    use crate::types::{
        ElementType, ElementWidth, GroupFactor, MaskValue, RvxError, VectorValue,
    };

    fn i8() -> ElementType {
        ElementType::signed(ElementWidth::W8)
    }

    fn u32t() -> ElementType {
        ElementType::unsigned(ElementWidth::W32)
    }

    fn mask_for(elem: ElementType, group: GroupFactor, lanes: &[bool]) -> MaskValue {
        let granularity = default_table()
            .registry()
            .mask_granularity_for(elem, group)
            .unwrap();
        MaskValue::from_bools(granularity, lanes)
    }

    // =========================================================================
    // ELEMENTWISE ADD
    // =========================================================================

    #[test]
    fn add_wraps_at_the_element_width() {
        let a = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[1, 127, -1, 100]);
        let b = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[2, 1, -1, 100]);
        let sum = vadd(None, &a, &b, 4).unwrap();
        assert_eq!(sum.lane_as_i64(0), 3);
        assert_eq!(sum.lane_as_i64(1), -128);
        assert_eq!(sum.lane_as_i64(2), -2);
        assert_eq!(sum.lane_as_i64(3), -56);
    }

    #[test]
    fn unmasked_tail_lanes_are_zero() {
        let a = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[5; 16]);
        let b = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[6; 16]);
        let sum = vadd(None, &a, &b, 3).unwrap();
        assert_eq!(sum.lane_as_i64(2), 11);
        for i in 3..sum.lanes() {
            assert_eq!(sum.lane_as_i64(i), 0, "tail lane {}", i);
        }
    }

    #[test]
    fn masked_add_takes_passthrough_on_inactive_and_tail_lanes() {
        let a = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[1, 2, 3, 4]);
        let b = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[10, 20, 30, 40]);
        let passthrough = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[-9; 16]);
        let mask = mask_for(i8(), GroupFactor::M1, &[true, false, true, false]);

        let sum = vadd(
            Some(MaskedOp {
                mask: &mask,
                passthrough: &passthrough,
            }),
            &a,
            &b,
            4,
        )
        .unwrap();
        assert_eq!(sum.lane_as_i64(0), 11);
        assert_eq!(sum.lane_as_i64(1), -9);
        assert_eq!(sum.lane_as_i64(2), 33);
        assert_eq!(sum.lane_as_i64(3), -9);
        for i in 4..sum.lanes() {
            assert_eq!(sum.lane_as_i64(i), -9, "tail lane {}", i);
        }
    }

    #[test]
    fn float_add() {
        let e = ElementType::float(ElementWidth::W32);
        let a = VectorValue::from_f64_lanes(e, GroupFactor::M1, &[1.5, -0.25, 1e20, 0.0]);
        let b = VectorValue::from_f64_lanes(e, GroupFactor::M1, &[2.25, 0.25, 1e20, -0.0]);
        let sum = vfadd(None, &a, &b, 4).unwrap();
        assert_eq!(sum.lane_as_f64(0), 3.75);
        assert_eq!(sum.lane_as_f64(1), 0.0);
        assert_eq!(sum.lane_as_f64(2), 2e20f32 as f64);
    }

    #[test]
    fn half_float_add_through_the_kernel() {
        // The reference kernel is capability-independent; f16 arithmetic is
        // exercised directly so the test does not depend on the fp16 feature.
        let e = ElementType::float(ElementWidth::W16);
        let a = VectorValue::from_f64_lanes(e, GroupFactor::M1, &[1.0, 0.5]);
        let b = VectorValue::from_f64_lanes(e, GroupFactor::M1, &[0.5, 0.25]);
        let sum = kernels::fadd(&a, &b, 2, None).unwrap();
        assert_eq!(sum.lane_as_f64(0), 1.5);
        assert_eq!(sum.lane_as_f64(1), 0.75);
    }

    // =========================================================================
    // CONTIGUOUS LOAD/STORE
    // =========================================================================

    #[test]
    fn unit_load_store_round_trip() {
        let mut mem = Vec::new();
        for x in [7u32, 8, 9, 10] {
            mem.extend_from_slice(&x.to_le_bytes());
        }
        let v = vle(None, u32t(), GroupFactor::M1, &mem, 4).unwrap();
        assert_eq!(v.lane_as_i64(0), 7);
        assert_eq!(v.lane_as_i64(3), 10);

        let mut out = vec![0u8; 16];
        vse(None, &mut out, &v, 4).unwrap();
        assert_eq!(out, mem);
    }

    #[test]
    fn masked_store_leaves_inactive_memory_untouched() {
        let data = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[1, 2, 3, 4]);
        let passthrough = VectorValue::zeroed(i8(), GroupFactor::M1);
        let mask = mask_for(i8(), GroupFactor::M1, &[true, false, false, true]);
        let mut mem = vec![0xAAu8; 4];
        vse(
            Some(MaskedOp {
                mask: &mask,
                passthrough: &passthrough,
            }),
            &mut mem,
            &data,
            4,
        )
        .unwrap();
        assert_eq!(mem, vec![1, 0xAA, 0xAA, 4]);
    }

    #[test]
    fn masked_load_takes_passthrough_on_inactive_lanes() {
        let mem = [1u8, 2, 3, 4];
        let passthrough = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[7; 16]);
        let mask = mask_for(i8(), GroupFactor::M1, &[false, true, false, true]);
        let v = vle(
            Some(MaskedOp {
                mask: &mask,
                passthrough: &passthrough,
            }),
            i8(),
            GroupFactor::M1,
            &mem,
            4,
        )
        .unwrap();
        assert_eq!(v.lane_as_i64(0), 7);
        assert_eq!(v.lane_as_i64(1), 2);
        assert_eq!(v.lane_as_i64(2), 7);
        assert_eq!(v.lane_as_i64(3), 4);
    }

    // =========================================================================
    // STRIDED LOAD/STORE
    // =========================================================================

    #[test]
    fn strided_load_skips_by_byte_stride() {
        let mut mem = Vec::new();
        for x in [10u32, 11, 12, 13, 14, 15] {
            mem.extend_from_slice(&x.to_le_bytes());
        }
        // Every other 32-bit element.
        let v = vlse(None, u32t(), GroupFactor::M1, &mem, 8, 3).unwrap();
        assert_eq!(v.lane_as_i64(0), 10);
        assert_eq!(v.lane_as_i64(1), 12);
        assert_eq!(v.lane_as_i64(2), 14);
    }

    #[test]
    fn strided_store_scatters_by_byte_stride() {
        let data = VectorValue::from_i64_lanes(u32t(), GroupFactor::M1, &[1, 2, 3]);
        let mut mem = vec![0u8; 24];
        vsse(None, &mut mem, 8, &data, 3).unwrap();
        assert_eq!(u32::from_le_bytes(mem[0..4].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(mem[8..12].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(mem[16..20].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(mem[4..8].try_into().unwrap()), 0);
    }

    #[test]
    fn out_of_bounds_access_is_an_internal_error() {
        let mem = [0u8; 8];
        let err = vlse(None, u32t(), GroupFactor::M1, &mem, 8, 2).unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));

        // Negative stride walks off the front of the operand.
        let err = vlse(None, u32t(), GroupFactor::M1, &mem, -4, 2).unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));
    }

    #[test]
    fn huge_stride_behind_a_masked_gap_is_an_internal_error() {
        // Lane 0 is in bounds and lane 1 is inactive, so lane 2 is the first
        // offset computed with the huge stride; it must fail the bounds check
        // rather than wrap.
        let mem = [0u8; 8];
        let passthrough = VectorValue::zeroed(u32t(), GroupFactor::M1);
        let mask = mask_for(u32t(), GroupFactor::M1, &[true, false, true]);
        let err = vlse(
            Some(MaskedOp {
                mask: &mask,
                passthrough: &passthrough,
            }),
            u32t(),
            GroupFactor::M1,
            &mem,
            i64::MAX,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));

        let data = VectorValue::zeroed(u32t(), GroupFactor::M1);
        let mut out = [0u8; 8];
        let err = vsse(
            Some(MaskedOp {
                mask: &mask,
                passthrough: &passthrough,
            }),
            &mut out,
            i64::MAX,
            &data,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));
    }

    // =========================================================================
    // GATHER / SCATTER
    // =========================================================================

    #[test]
    fn gather_uses_per_lane_byte_offsets() {
        let data = ElementType::signed(ElementWidth::W32);
        let mut mem = Vec::new();
        for x in [100i32, 101, 102, 103] {
            mem.extend_from_slice(&x.to_le_bytes());
        }
        let index = VectorValue::from_i64_lanes(
            ElementType::unsigned(ElementWidth::W8),
            GroupFactor::MF4,
            &[8, 0, 4, 12],
        );
        let v = vluxei(None, data, GroupFactor::M1, &mem, &index, 4).unwrap();
        assert_eq!(v.lane_as_i64(0), 102);
        assert_eq!(v.lane_as_i64(1), 100);
        assert_eq!(v.lane_as_i64(2), 101);
        assert_eq!(v.lane_as_i64(3), 103);
    }

    #[test]
    fn scatter_writes_per_lane_byte_offsets() {
        let data = VectorValue::from_i64_lanes(u32t(), GroupFactor::M1, &[5, 6]);
        let index = VectorValue::from_i64_lanes(
            ElementType::unsigned(ElementWidth::W8),
            GroupFactor::MF4,
            &[12, 0],
        );
        let mut mem = vec![0u8; 16];
        vsuxei(None, &mut mem, &index, &data, 2).unwrap();
        assert_eq!(u32::from_le_bytes(mem[12..16].try_into().unwrap()), 5);
        assert_eq!(u32::from_le_bytes(mem[0..4].try_into().unwrap()), 6);
    }

    #[test]
    fn gather_with_a_mismatched_index_grouping_fails_resolution() {
        let data = ElementType::signed(ElementWidth::W32);
        let mem = [0u8; 16];
        // m1-grouped 8-bit indexes: the registry forces mf4 here.
        let index = VectorValue::from_i64_lanes(
            ElementType::unsigned(ElementWidth::W8),
            GroupFactor::M1,
            &[0; 4],
        );
        let err = vluxei(None, data, GroupFactor::M1, &mem, &index, 4).unwrap_err();
        assert!(matches!(err, RvxError::AmbiguousOrUnresolvedOverload(_)));
    }

    // =========================================================================
    // ADAPTER SHAPE CHECKS
    // =========================================================================

    #[test]
    fn element_count_beyond_the_register_group_is_rejected() {
        let a = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[0; 16]);
        let b = VectorValue::from_i64_lanes(i8(), GroupFactor::M1, &[0; 16]);
        let err = vadd(None, &a, &b, 17).unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));
    }

    #[test]
    fn operand_count_must_match_the_signature() {
        let op = default_table()
            .lookup(Mnemonic::Add, i8(), GroupFactor::M1, false, None)
            .unwrap();
        let a = VectorValue::zeroed(i8(), GroupFactor::M1);
        let err = adapter::invoke(op, vec![Operand::Vector(&a), Operand::Count(1)]).unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));
    }

    #[test]
    fn operand_types_must_match_the_signature() {
        let op = default_table()
            .lookup(Mnemonic::Add, i8(), GroupFactor::M1, false, None)
            .unwrap();
        let a = VectorValue::zeroed(i8(), GroupFactor::M1);
        let wrong = VectorValue::zeroed(u32t(), GroupFactor::M1);
        let err = adapter::invoke(
            op,
            vec![
                Operand::Vector(&a),
                Operand::Vector(&wrong),
                Operand::Count(1),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, RvxError::Internal(_)));
    }

    // =========================================================================
    // HALF-PRECISION BIT CONVERSIONS
    // =========================================================================

    #[test]
    fn half_float_bit_conversions() {
        use crate::kernels::{f16_bits_to_f32, f32_to_f16_bits};

        assert_eq!(f32_to_f16_bits(1.0), 0x3c00);
        assert_eq!(f32_to_f16_bits(-2.0), 0xc000);
        assert_eq!(f16_bits_to_f32(0x3c00), 1.0);
        assert_eq!(f16_bits_to_f32(0x3555), 0.333251953125);

        // Largest finite half, then overflow to infinity.
        assert_eq!(f16_bits_to_f32(0x7bff), 65504.0);
        assert_eq!(f32_to_f16_bits(65504.0), 0x7bff);
        assert_eq!(f32_to_f16_bits(1e6), 0x7c00);
        assert!(f16_bits_to_f32(0x7c00).is_infinite());
        assert!(f16_bits_to_f32(0xfe00).is_nan());
        assert!(f16_bits_to_f32(f32_to_f16_bits(f32::NAN)).is_nan());

        // Smallest subnormal survives the round trip.
        assert_eq!(f16_bits_to_f32(0x0001), 2.0f32.powi(-24));
        assert_eq!(f32_to_f16_bits(2.0f32.powi(-24)), 0x0001);
        assert_eq!(f32_to_f16_bits(2.0f32.powi(-26)), 0x0000);

        for bits in [0x0000u16, 0x8000, 0x0001, 0x03ff, 0x0400, 0x3c01, 0x7bff] {
            assert_eq!(f32_to_f16_bits(f16_bits_to_f32(bits)), bits, "{:#06x}", bits);
        }
    }
}

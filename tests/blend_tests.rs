//! Blend Classification Tests
//!
//! Tests for:
//! - The exact 15-mode simple coefficient table
//! - Coverage blend-formula classification (dual-source outputs, equation
//!   selection, coeff-zero special cases)
//! - LCD formula spot checks
//! - modifies_dst classification

use pigment::blend::{
    get_blend_formula, get_lcd_blend_formula, simple_blend_info, BlendCoeff, BlendEquation,
    BlendMode, OutputType,
};

// ============================================================================
// Simple coefficient table
// ============================================================================

#[test]
fn simple_table_matches_porter_duff_exactly() {
    use BlendCoeff::{Da, Ida, Isa, Isc, One, Sa, Sc, Zero};
    let expected = [
        (BlendMode::Clear, Zero, Zero),
        (BlendMode::Src, One, Zero),
        (BlendMode::Dst, Zero, One),
        (BlendMode::SrcOver, One, Isa),
        (BlendMode::DstOver, Ida, One),
        (BlendMode::SrcIn, Da, Zero),
        (BlendMode::DstIn, Zero, Sa),
        (BlendMode::SrcOut, Ida, Zero),
        (BlendMode::DstOut, Zero, Isa),
        (BlendMode::SrcAtop, Da, Isa),
        (BlendMode::DstAtop, Ida, Sa),
        (BlendMode::Xor, Ida, Isa),
        (BlendMode::Plus, One, One),
        (BlendMode::Modulate, Zero, Sc),
        (BlendMode::Screen, One, Isc),
    ];
    for (mode, src, dst) in expected {
        let info = simple_blend_info(mode);
        assert_eq!(info.equation, BlendEquation::Add, "{}", mode.name());
        assert_eq!(info.src_coeff, src, "{}", mode.name());
        assert_eq!(info.dst_coeff, dst, "{}", mode.name());
    }
}

#[test]
fn only_dst_mode_leaves_destination_untouched() {
    for mode in BlendMode::ALL {
        let info = simple_blend_info(mode);
        assert_eq!(info.modifies_dst, !matches!(mode, BlendMode::Dst));
    }
}

// ============================================================================
// Coverage formulas
// ============================================================================

#[test]
fn coverage_formulas_with_simple_coeffs_modulate_primary() {
    // Modes whose coefficients never reference the source color can fold
    // coverage into the color directly, no secondary output needed.
    for mode in [
        BlendMode::DstOver,
        BlendMode::SrcOver,
        BlendMode::Plus,
        BlendMode::DstOut,
    ] {
        let f = get_blend_formula(false, true, mode);
        assert_eq!(f.primary_output, OutputType::Modulate, "{}", mode.name());
        assert!(!f.has_secondary_output(), "{}", mode.name());
    }
}

#[test]
fn coverage_src_and_src_out_need_dual_source_coverage() {
    // Zero dst coefficient: coverage rides the secondary output and the
    // hardware lerps with one-minus-secondary-alpha.
    for mode in [BlendMode::Src, BlendMode::SrcOut] {
        let f = get_blend_formula(false, true, mode);
        assert!(f.has_secondary_output(), "{}", mode.name());
        assert_eq!(f.secondary_output, OutputType::Coverage, "{}", mode.name());
        assert_eq!(f.dst_coeff, BlendCoeff::Is2a, "{}", mode.name());
    }
}

#[test]
fn coverage_src_in_carries_inverse_alpha_secondary() {
    let f = get_blend_formula(false, true, BlendMode::SrcIn);
    assert_eq!(f.secondary_output, OutputType::IsaModulate);
    assert_eq!(f.src_coeff, BlendCoeff::Da);
    assert_eq!(f.dst_coeff, BlendCoeff::Is2c);
}

#[test]
fn coverage_clear_uses_reverse_subtract() {
    // Clear with coverage: dst * (1 - coverage), expressed as a reverse
    // subtract of coverage-scaled dst.
    let f = get_blend_formula(false, true, BlendMode::Clear);
    assert_eq!(f.primary_output, OutputType::Coverage);
    assert_eq!(f.equation, BlendEquation::ReverseSubtract);
    assert_eq!(f.src_coeff, BlendCoeff::Dc);
    assert_eq!(f.dst_coeff, BlendCoeff::One);
}

#[test]
fn no_coverage_formula_collapses_to_simple_coeffs() {
    for mode in BlendMode::ALL {
        let f = get_blend_formula(false, false, mode);
        let simple = simple_blend_info(mode);
        assert_eq!(f.src_coeff, simple.src_coeff, "{}", mode.name());
        assert_eq!(f.dst_coeff, simple.dst_coeff, "{}", mode.name());
        assert!(!f.has_secondary_output(), "{}", mode.name());
    }
}

#[test]
fn opaque_src_over_drops_the_dst_term() {
    // An opaque source makes 1-srcAlpha zero, so src-over without coverage
    // degenerates to a plain replace.
    let f = get_blend_formula(true, false, BlendMode::SrcOver);
    assert_eq!(f.src_coeff, BlendCoeff::One);
    assert_eq!(f.dst_coeff, BlendCoeff::Zero);
    assert!(!f.has_secondary_output());
}

// ============================================================================
// LCD formulas
// ============================================================================

#[test]
fn lcd_src_over_uses_per_channel_secondary() {
    let f = get_lcd_blend_formula(BlendMode::SrcOver);
    assert_eq!(f.primary_output, OutputType::Modulate);
    assert_eq!(f.secondary_output, OutputType::SaModulate);
    assert_eq!(f.src_coeff, BlendCoeff::One);
    assert_eq!(f.dst_coeff, BlendCoeff::Is2c);
}

#[test]
fn lcd_src_uses_coverage_secondary() {
    let f = get_lcd_blend_formula(BlendMode::Src);
    assert_eq!(f.secondary_output, OutputType::Coverage);
    assert_eq!(f.dst_coeff, BlendCoeff::Is2c);
}

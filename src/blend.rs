//! Fixed-Function Blending
//!
//! Blend modes, hardware coefficients, and the blend-formula classification
//! used when per-fragment coverage has to be folded into the fixed-function
//! blend stage.
//!
//! The simple per-mode coefficient table ([`simple_blend_info`]) covers the
//! 15 Porter-Duff-style coeff modes. [`get_blend_formula`] and
//! [`get_lcd_blend_formula`] classify how coverage is expressed: which of
//! the six output types feeds the primary (and optional secondary,
//! dual-source) fragment output, and which hardware equation/coefficients
//! apply.

/// The 15 blend modes fully expressible as hardware blend coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlendMode {
    Clear,
    Src,
    Dst,
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcAtop,
    DstAtop,
    Xor,
    Plus,
    Modulate,
    Screen,
}

/// Number of coeff-expressible blend modes.
pub const COEFF_BLEND_MODE_COUNT: usize = 15;

impl BlendMode {
    pub const ALL: [Self; COEFF_BLEND_MODE_COUNT] = [
        Self::Clear,
        Self::Src,
        Self::Dst,
        Self::SrcOver,
        Self::DstOver,
        Self::SrcIn,
        Self::DstIn,
        Self::SrcOut,
        Self::DstOut,
        Self::SrcAtop,
        Self::DstAtop,
        Self::Xor,
        Self::Plus,
        Self::Modulate,
        Self::Screen,
    ];

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Src => "Src",
            Self::Dst => "Dst",
            Self::SrcOver => "SrcOver",
            Self::DstOver => "DstOver",
            Self::SrcIn => "SrcIn",
            Self::DstIn => "DstIn",
            Self::SrcOut => "SrcOut",
            Self::DstOut => "DstOut",
            Self::SrcAtop => "SrcAtop",
            Self::DstAtop => "DstAtop",
            Self::Xor => "Xor",
            Self::Plus => "Plus",
            Self::Modulate => "Modulate",
            Self::Screen => "Screen",
        }
    }

    /// Catalog name of this mode's fixed-function marker entry.
    #[must_use]
    pub const fn fixed_function_name(self) -> &'static str {
        match self {
            Self::Clear => "FixedFunctionClear",
            Self::Src => "FixedFunctionSrc",
            Self::Dst => "FixedFunctionDst",
            Self::SrcOver => "FixedFunctionSrcOver",
            Self::DstOver => "FixedFunctionDstOver",
            Self::SrcIn => "FixedFunctionSrcIn",
            Self::DstIn => "FixedFunctionDstIn",
            Self::SrcOut => "FixedFunctionSrcOut",
            Self::DstOut => "FixedFunctionDstOut",
            Self::SrcAtop => "FixedFunctionSrcAtop",
            Self::DstAtop => "FixedFunctionDstAtop",
            Self::Xor => "FixedFunctionXor",
            Self::Plus => "FixedFunctionPlus",
            Self::Modulate => "FixedFunctionModulate",
            Self::Screen => "FixedFunctionScreen",
        }
    }

    /// Name of this mode's blend function in the pre-compiled module.
    #[must_use]
    pub const fn blend_fn_name(self) -> &'static str {
        match self {
            Self::Clear => "px_blend_clear",
            Self::Src => "px_blend_src",
            Self::Dst => "px_blend_dst",
            Self::SrcOver => "px_blend_src_over",
            Self::DstOver => "px_blend_dst_over",
            Self::SrcIn => "px_blend_src_in",
            Self::DstIn => "px_blend_dst_in",
            Self::SrcOut => "px_blend_src_out",
            Self::DstOut => "px_blend_dst_out",
            Self::SrcAtop => "px_blend_src_atop",
            Self::DstAtop => "px_blend_dst_atop",
            Self::Xor => "px_blend_xor",
            Self::Plus => "px_blend_plus",
            Self::Modulate => "px_blend_modulate",
            Self::Screen => "px_blend_screen",
        }
    }
}

/// Hardware blend coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendCoeff {
    Zero,
    One,
    /// Source color.
    Sc,
    /// One minus source color.
    Isc,
    /// Destination color.
    Dc,
    /// One minus destination color.
    Idc,
    /// Source alpha.
    Sa,
    /// One minus source alpha.
    Isa,
    /// Destination alpha.
    Da,
    /// One minus destination alpha.
    Ida,
    /// Secondary-output color (dual-source blending).
    S2c,
    /// One minus secondary-output color.
    Is2c,
    /// Secondary-output alpha.
    S2a,
    /// One minus secondary-output alpha.
    Is2a,
}

/// Hardware blend equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
}

/// Whether a blend configuration can alter the destination at all.
#[must_use]
pub const fn blend_modifies_dst(
    equation: BlendEquation,
    src_coeff: BlendCoeff,
    dst_coeff: BlendCoeff,
) -> bool {
    !matches!(equation, BlendEquation::Add | BlendEquation::ReverseSubtract)
        || !matches!(src_coeff, BlendCoeff::Zero)
        || !matches!(dst_coeff, BlendCoeff::One)
}

/// A resolved fixed-function blend configuration, handed back to the caller
/// for the hardware blend stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendInfo {
    pub equation: BlendEquation,
    pub src_coeff: BlendCoeff,
    pub dst_coeff: BlendCoeff,
    pub modifies_dst: bool,
}

impl BlendInfo {
    #[must_use]
    pub const fn simple(src_coeff: BlendCoeff, dst_coeff: BlendCoeff) -> Self {
        Self {
            equation: BlendEquation::Add,
            src_coeff,
            dst_coeff,
            modifies_dst: blend_modifies_dst(BlendEquation::Add, src_coeff, dst_coeff),
        }
    }
}

impl Default for BlendInfo {
    /// Src-over, the assumed mode when a key carries no fixed-function
    /// blend block.
    fn default() -> Self {
        simple_blend_info(BlendMode::SrcOver)
    }
}

const SIMPLE_BLEND_TABLE: [BlendInfo; COEFF_BLEND_MODE_COUNT] = [
    /* clear */ BlendInfo::simple(BlendCoeff::Zero, BlendCoeff::Zero),
    /* src */ BlendInfo::simple(BlendCoeff::One, BlendCoeff::Zero),
    /* dst */ BlendInfo::simple(BlendCoeff::Zero, BlendCoeff::One),
    /* src-over */ BlendInfo::simple(BlendCoeff::One, BlendCoeff::Isa),
    /* dst-over */ BlendInfo::simple(BlendCoeff::Ida, BlendCoeff::One),
    /* src-in */ BlendInfo::simple(BlendCoeff::Da, BlendCoeff::Zero),
    /* dst-in */ BlendInfo::simple(BlendCoeff::Zero, BlendCoeff::Sa),
    /* src-out */ BlendInfo::simple(BlendCoeff::Ida, BlendCoeff::Zero),
    /* dst-out */ BlendInfo::simple(BlendCoeff::Zero, BlendCoeff::Isa),
    /* src-atop */ BlendInfo::simple(BlendCoeff::Da, BlendCoeff::Isa),
    /* dst-atop */ BlendInfo::simple(BlendCoeff::Ida, BlendCoeff::Sa),
    /* xor */ BlendInfo::simple(BlendCoeff::Ida, BlendCoeff::Isa),
    /* plus */ BlendInfo::simple(BlendCoeff::One, BlendCoeff::One),
    /* modulate */ BlendInfo::simple(BlendCoeff::Zero, BlendCoeff::Sc),
    /* screen */ BlendInfo::simple(BlendCoeff::One, BlendCoeff::Isc),
];

/// The straight Porter-Duff-style coefficient for a mode, with no coverage
/// in play.
#[must_use]
pub const fn simple_blend_info(mode: BlendMode) -> BlendInfo {
    SIMPLE_BLEND_TABLE[mode as usize]
}

/// How a blend formula's fragment output is computed from the shaded color
/// and the coverage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// `vec4f(0.0)`.
    None,
    /// Coverage alone.
    Coverage,
    /// Color times coverage.
    Modulate,
    /// Color's alpha times coverage.
    SaModulate,
    /// One minus color's alpha, times coverage.
    IsaModulate,
    /// One minus color, times coverage.
    IscModulate,
}

/// A classified coverage blend: primary/secondary output types plus the
/// hardware equation and coefficients that consume them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFormula {
    pub primary_output: OutputType,
    pub secondary_output: OutputType,
    pub equation: BlendEquation,
    pub src_coeff: BlendCoeff,
    pub dst_coeff: BlendCoeff,
}

impl BlendFormula {
    #[must_use]
    pub const fn has_secondary_output(&self) -> bool {
        !matches!(self.secondary_output, OutputType::None)
    }

    #[must_use]
    pub const fn modifies_dst(&self) -> bool {
        blend_modifies_dst(self.equation, self.src_coeff, self.dst_coeff)
    }

    #[must_use]
    pub const fn blend_info(&self) -> BlendInfo {
        BlendInfo {
            equation: self.equation,
            src_coeff: self.src_coeff,
            dst_coeff: self.dst_coeff,
            modifies_dst: self.modifies_dst(),
        }
    }
}

/// Standard formula: output is color times coverage, blended with the given
/// coefficients. A (Zero, One) pair collapses to a no-op that writes
/// nothing meaningful.
const fn coeff_formula(src_coeff: BlendCoeff, dst_coeff: BlendCoeff) -> BlendFormula {
    if matches!(src_coeff, BlendCoeff::Zero) && matches!(dst_coeff, BlendCoeff::One) {
        BlendFormula {
            primary_output: OutputType::None,
            secondary_output: OutputType::None,
            equation: BlendEquation::Add,
            src_coeff,
            dst_coeff,
        }
    } else {
        BlendFormula {
            primary_output: OutputType::Modulate,
            secondary_output: OutputType::None,
            equation: BlendEquation::Add,
            src_coeff,
            dst_coeff,
        }
    }
}

/// Like [`coeff_formula`] but the primary output is the color's alpha times
/// coverage, for use with secondary-color destination coefficients.
const fn sa_modulate_formula(src_coeff: BlendCoeff, dst_coeff: BlendCoeff) -> BlendFormula {
    BlendFormula {
        primary_output: OutputType::SaModulate,
        secondary_output: OutputType::None,
        equation: BlendEquation::Add,
        src_coeff,
        dst_coeff,
    }
}

/// General coverage formula:
///
/// `D' = f*(S*srcCoeff + D*dstCoeff) + (1-f)*D`
///     `= f*S*srcCoeff + D*(1 - f*(1 - dstCoeff))`
///
/// The secondary output carries `f*(1 - dstCoeff)` and the hardware dst
/// coefficient becomes one-minus-secondary-color.
const fn coverage_formula(
    one_minus_dst_coeff_output: OutputType,
    src_coeff: BlendCoeff,
) -> BlendFormula {
    BlendFormula {
        primary_output: OutputType::Modulate,
        secondary_output: one_minus_dst_coeff_output,
        equation: BlendEquation::Add,
        src_coeff,
        dst_coeff: BlendCoeff::Is2c,
    }
}

/// Coverage with a zero src coefficient:
///
/// `D' = f*D*dstCoeff + (1-f)*D  =  D - D*f*(1 - dstCoeff)`
///
/// expressed as a reverse-subtract of the primary output times the dst
/// color.
const fn coverage_src_coeff_zero_formula(
    one_minus_dst_coeff_output: OutputType,
) -> BlendFormula {
    BlendFormula {
        primary_output: one_minus_dst_coeff_output,
        secondary_output: OutputType::None,
        equation: BlendEquation::ReverseSubtract,
        src_coeff: BlendCoeff::Dc,
        dst_coeff: BlendCoeff::One,
    }
}

/// Coverage with a zero dst coefficient:
///
/// `D' = f*S*srcCoeff + (1-f)*D`
///
/// with coverage in the secondary output and one-minus-secondary-alpha as
/// the dst coefficient.
const fn coverage_dst_coeff_zero_formula(src_coeff: BlendCoeff) -> BlendFormula {
    BlendFormula {
        primary_output: OutputType::Modulate,
        secondary_output: OutputType::Coverage,
        equation: BlendEquation::Add,
        src_coeff,
        dst_coeff: BlendCoeff::Is2a,
    }
}

/// Indexed `[is_opaque][has_coverage][mode]`.
const BLEND_FORMULA_TABLE: [[[BlendFormula; COEFF_BLEND_MODE_COUNT]; 2]; 2] = [
    [
        // Input color unknown, no coverage.
        [
            /* clear */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Zero),
            /* src */ coeff_formula(BlendCoeff::One, BlendCoeff::Zero),
            /* dst */ coeff_formula(BlendCoeff::Zero, BlendCoeff::One),
            /* src-over */ coeff_formula(BlendCoeff::One, BlendCoeff::Isa),
            /* dst-over */ coeff_formula(BlendCoeff::Ida, BlendCoeff::One),
            /* src-in */ coeff_formula(BlendCoeff::Da, BlendCoeff::Zero),
            /* dst-in */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Sa),
            /* src-out */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Zero),
            /* dst-out */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Isa),
            /* src-atop */ coeff_formula(BlendCoeff::Da, BlendCoeff::Isa),
            /* dst-atop */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Sa),
            /* xor */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Isa),
            /* plus */ coeff_formula(BlendCoeff::One, BlendCoeff::One),
            /* modulate */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Sc),
            /* screen */ coeff_formula(BlendCoeff::One, BlendCoeff::Isc),
        ],
        // Input color unknown, has coverage.
        [
            /* clear */ coverage_src_coeff_zero_formula(OutputType::Coverage),
            /* src */ coverage_dst_coeff_zero_formula(BlendCoeff::One),
            /* dst */ coeff_formula(BlendCoeff::Zero, BlendCoeff::One),
            /* src-over */ coeff_formula(BlendCoeff::One, BlendCoeff::Isa),
            /* dst-over */ coeff_formula(BlendCoeff::Ida, BlendCoeff::One),
            /* src-in */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Da),
            /* dst-in */ coverage_src_coeff_zero_formula(OutputType::IsaModulate),
            /* src-out */ coverage_dst_coeff_zero_formula(BlendCoeff::Ida),
            /* dst-out */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Isa),
            /* src-atop */ coeff_formula(BlendCoeff::Da, BlendCoeff::Isa),
            /* dst-atop */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Ida),
            /* xor */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Isa),
            /* plus */ coeff_formula(BlendCoeff::One, BlendCoeff::One),
            /* modulate */ coverage_src_coeff_zero_formula(OutputType::IscModulate),
            /* screen */ coeff_formula(BlendCoeff::One, BlendCoeff::Isc),
        ],
    ],
    [
        // Input color opaque, no coverage.
        [
            /* clear */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Zero),
            /* src */ coeff_formula(BlendCoeff::One, BlendCoeff::Zero),
            /* dst */ coeff_formula(BlendCoeff::Zero, BlendCoeff::One),
            /* src-over */ coeff_formula(BlendCoeff::One, BlendCoeff::Zero),
            /* dst-over */ coeff_formula(BlendCoeff::Ida, BlendCoeff::One),
            /* src-in */ coeff_formula(BlendCoeff::Da, BlendCoeff::Zero),
            /* dst-in */ coeff_formula(BlendCoeff::Zero, BlendCoeff::One),
            /* src-out */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Zero),
            /* dst-out */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Zero),
            /* src-atop */ coeff_formula(BlendCoeff::Da, BlendCoeff::Zero),
            /* dst-atop */ coeff_formula(BlendCoeff::Ida, BlendCoeff::One),
            /* xor */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Zero),
            /* plus */ coeff_formula(BlendCoeff::One, BlendCoeff::One),
            /* modulate */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Sc),
            /* screen */ coeff_formula(BlendCoeff::One, BlendCoeff::Isc),
        ],
        // Input color opaque, has coverage.
        [
            /* clear */ coverage_src_coeff_zero_formula(OutputType::Coverage),
            /* src */ coverage_dst_coeff_zero_formula(BlendCoeff::One),
            /* dst */ coeff_formula(BlendCoeff::Zero, BlendCoeff::One),
            /* src-over */ coeff_formula(BlendCoeff::One, BlendCoeff::Isa),
            /* dst-over */ coeff_formula(BlendCoeff::Ida, BlendCoeff::One),
            /* src-in */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Da),
            /* dst-in */ coverage_src_coeff_zero_formula(OutputType::IsaModulate),
            /* src-out */ coverage_dst_coeff_zero_formula(BlendCoeff::Ida),
            /* dst-out */ coeff_formula(BlendCoeff::Zero, BlendCoeff::Isa),
            /* src-atop */ coeff_formula(BlendCoeff::Da, BlendCoeff::Isa),
            /* dst-atop */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Ida),
            /* xor */ coeff_formula(BlendCoeff::Ida, BlendCoeff::Isa),
            /* plus */ coeff_formula(BlendCoeff::One, BlendCoeff::One),
            /* modulate */ coverage_src_coeff_zero_formula(OutputType::IscModulate),
            /* screen */ coeff_formula(BlendCoeff::One, BlendCoeff::Isc),
        ],
    ],
];

/// Classify the coverage blend for `(is_opaque, has_coverage, mode)`.
#[must_use]
pub const fn get_blend_formula(
    is_opaque: bool,
    has_coverage: bool,
    mode: BlendMode,
) -> BlendFormula {
    BLEND_FORMULA_TABLE[is_opaque as usize][has_coverage as usize][mode as usize]
}

const LCD_BLEND_TABLE: [BlendFormula; COEFF_BLEND_MODE_COUNT] = [
    /* clear */ coverage_src_coeff_zero_formula(OutputType::Coverage),
    /* src */ coverage_formula(OutputType::Coverage, BlendCoeff::One),
    /* dst */ coeff_formula(BlendCoeff::Zero, BlendCoeff::One),
    /* src-over */ coverage_formula(OutputType::SaModulate, BlendCoeff::One),
    /* dst-over */ coeff_formula(BlendCoeff::Ida, BlendCoeff::One),
    /* src-in */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Da),
    /* dst-in */ coverage_src_coeff_zero_formula(OutputType::IsaModulate),
    /* src-out */ coverage_dst_coeff_zero_formula(BlendCoeff::Ida),
    /* dst-out */ sa_modulate_formula(BlendCoeff::Zero, BlendCoeff::Isc),
    /* src-atop */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Da),
    /* dst-atop */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Ida),
    /* xor */ coverage_formula(OutputType::IsaModulate, BlendCoeff::Ida),
    /* plus */ coeff_formula(BlendCoeff::One, BlendCoeff::One),
    /* modulate */ coverage_src_coeff_zero_formula(OutputType::IscModulate),
    /* screen */ coeff_formula(BlendCoeff::One, BlendCoeff::Isc),
];

/// Classify the per-channel (subpixel LCD) coverage blend for `mode`.
#[must_use]
pub const fn get_lcd_blend_formula(mode: BlendMode) -> BlendFormula {
    LCD_BLEND_TABLE[mode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn src_over_simple_info() {
        let info = simple_blend_info(BlendMode::SrcOver);
        assert_eq!(info.equation, BlendEquation::Add);
        assert_eq!(info.src_coeff, BlendCoeff::One);
        assert_eq!(info.dst_coeff, BlendCoeff::Isa);
        assert!(info.modifies_dst);
    }

    #[test]
    fn dst_mode_does_not_modify_dst() {
        assert!(!simple_blend_info(BlendMode::Dst).modifies_dst);
    }

    #[test]
    fn coverage_src_over_keeps_simple_coeffs() {
        let f = get_blend_formula(false, true, BlendMode::SrcOver);
        assert_eq!(f.primary_output, OutputType::Modulate);
        assert!(!f.has_secondary_output());
        assert_eq!(f.src_coeff, BlendCoeff::One);
        assert_eq!(f.dst_coeff, BlendCoeff::Isa);
    }

    #[test]
    fn coverage_src_uses_dual_source() {
        let f = get_blend_formula(false, true, BlendMode::Src);
        assert!(f.has_secondary_output());
        assert_eq!(f.secondary_output, OutputType::Coverage);
        assert_eq!(f.dst_coeff, BlendCoeff::Is2a);
    }

    #[test]
    fn lcd_src_over_modulates_by_source_alpha() {
        let f = get_lcd_blend_formula(BlendMode::SrcOver);
        assert_eq!(f.secondary_output, OutputType::SaModulate);
        assert_eq!(f.dst_coeff, BlendCoeff::Is2c);
    }
}

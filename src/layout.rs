//! Uniform Packing
//!
//! Byte size and alignment math for uniform members under the two layout
//! rules the capability surface can request. Used only for the byte totals
//! reported back to callers for buffer-size bookkeeping; the emitted WGSL
//! relies on the compiler applying the same rules.
//!
//! Half-precision types are realized as full `f32`, matching their emitted
//! WGSL declarations.

use crate::types::{ShaderType, Uniform};

/// Packing rule for a buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutRule {
    /// Uniform-buffer packing: vec3 aligns to 16, array strides round up
    /// to 16.
    Std140,
    /// Storage-buffer packing: natural alignment, tight array strides.
    Std430,
}

const fn base_align(ty: ShaderType, rule: LayoutRule) -> u32 {
    let rows = ty.rows();
    let vec_align = match rows {
        1 => 4,
        2 => 8,
        _ => 16,
    };
    if ty.columns() > 1 {
        // Matrices align like their column vectors, but std140 pads column
        // alignment up to 16.
        match rule {
            LayoutRule::Std140 => 16,
            LayoutRule::Std430 => vec_align,
        }
    } else {
        vec_align
    }
}

const fn base_size(ty: ShaderType, rule: LayoutRule) -> u32 {
    let cols = ty.columns();
    let rows = ty.rows();
    if cols > 1 {
        let col_stride = round_up(rows * 4, base_align(ty, rule));
        cols * col_stride
    } else {
        rows * 4
    }
}

const fn round_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) / alignment * alignment
}

/// Size in bytes of one uniform member (including array stride padding).
#[must_use]
pub const fn size_of(ty: ShaderType, count: u32, rule: LayoutRule) -> u32 {
    if count == 0 {
        base_size(ty, rule)
    } else {
        stride_of(ty, rule) * count
    }
}

/// Alignment in bytes of one uniform member.
#[must_use]
pub const fn align_of(ty: ShaderType, count: u32, rule: LayoutRule) -> u32 {
    let align = base_align(ty, rule);
    if count > 0 && matches!(rule, LayoutRule::Std140) {
        round_up(align, 16)
    } else {
        align
    }
}

const fn stride_of(ty: ShaderType, rule: LayoutRule) -> u32 {
    let elem = round_up(base_size(ty, rule), base_align(ty, rule));
    match rule {
        LayoutRule::Std140 => round_up(elem, 16),
        LayoutRule::Std430 => elem,
    }
}

/// Running offset calculator for a sequence of uniform members.
#[derive(Debug)]
pub struct UniformOffsetCalculator {
    rule: LayoutRule,
    offset: u32,
}

impl UniformOffsetCalculator {
    #[must_use]
    pub const fn new(rule: LayoutRule) -> Self {
        Self { rule, offset: 0 }
    }

    /// Reserves space for `uniform`, returning its aligned byte offset.
    pub fn advance(&mut self, uniform: &Uniform) -> u32 {
        let aligned = round_up(
            self.offset,
            align_of(uniform.ty, uniform.count, self.rule),
        );
        self.offset = aligned + size_of(uniform.ty, uniform.count, self.rule);
        aligned
    }

    /// Total bytes consumed so far, padded out to a 16-byte boundary the
    /// way buffer allocations are sized.
    #[must_use]
    pub const fn total(&self) -> u32 {
        round_up(self.offset, 16)
    }
}

//! Shading-Language Types
//!
//! Scalar / vector / matrix types usable as pipeline uniforms, plus the
//! [`Uniform`] and [`TextureAndSampler`] descriptors referenced by snippet
//! signatures. Half-precision variants are kept distinct so snippet
//! signatures mirror their storage intent, but they are realized as full
//! `f32` types in emitted WGSL (uniform uploads are full precision).

use std::borrow::Cow;

/// A shading-language value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Float,
    Float2,
    Float3,
    Float4,
    Float2x2,
    Float3x3,
    Float4x4,
    Int,
    Int2,
    Int3,
    Int4,
    Half,
    Half2,
    Half3,
    Half4,
    Half2x2,
    Half3x3,
    Half4x4,
}

impl ShaderType {
    /// The WGSL spelling of this type.
    #[must_use]
    pub const fn wgsl_name(self) -> &'static str {
        match self {
            Self::Float | Self::Half => "f32",
            Self::Float2 | Self::Half2 => "vec2f",
            Self::Float3 | Self::Half3 => "vec3f",
            Self::Float4 | Self::Half4 => "vec4f",
            Self::Float2x2 | Self::Half2x2 => "mat2x2f",
            Self::Float3x3 | Self::Half3x3 => "mat3x3f",
            Self::Float4x4 | Self::Half4x4 => "mat4x4f",
            Self::Int => "i32",
            Self::Int2 => "vec2i",
            Self::Int3 => "vec3i",
            Self::Int4 => "vec4i",
        }
    }

    /// Number of vector columns for matrix types, 1 otherwise.
    #[must_use]
    pub const fn columns(self) -> u32 {
        match self {
            Self::Float2x2 | Self::Half2x2 => 2,
            Self::Float3x3 | Self::Half3x3 => 3,
            Self::Float4x4 | Self::Half4x4 => 4,
            _ => 1,
        }
    }

    /// Number of scalar components per column (or per vector).
    #[must_use]
    pub const fn rows(self) -> u32 {
        match self {
            Self::Float | Self::Half | Self::Int => 1,
            Self::Float2 | Self::Half2 | Self::Int2 | Self::Float2x2 | Self::Half2x2 => 2,
            Self::Float3 | Self::Half3 | Self::Int3 | Self::Float3x3 | Self::Half3x3 => 3,
            Self::Float4 | Self::Half4 | Self::Int4 | Self::Float4x4 | Self::Half4x4 => 4,
        }
    }
}

/// One uniform in a snippet's signature.
///
/// `count == 0` means "not an array"; a non-zero count declares an array of
/// that many elements. The paint-color uniform is flagged so codegen can skip
/// name mangling for it (deduplication guarantees at most one logical
/// occurrence per program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniform {
    pub name: Cow<'static, str>,
    pub ty: ShaderType,
    pub count: u32,
    pub is_paint_color: bool,
}

impl Uniform {
    #[must_use]
    pub const fn new(name: &'static str, ty: ShaderType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            ty,
            count: 0,
            is_paint_color: false,
        }
    }

    #[must_use]
    pub const fn array(name: &'static str, ty: ShaderType, count: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            ty,
            count,
            is_paint_color: false,
        }
    }

    /// The single shared paint-color uniform.
    #[must_use]
    pub const fn paint_color() -> Self {
        Self {
            name: Cow::Borrowed("paintColor"),
            ty: ShaderType::Float4,
            count: 0,
            is_paint_color: true,
        }
    }

    #[must_use]
    pub fn owned(name: String, ty: ShaderType, count: u32) -> Self {
        Self {
            name: Cow::Owned(name),
            ty,
            count,
            is_paint_color: false,
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.count > 0
    }

    /// The WGSL type of the declared member, including any array wrapper.
    #[must_use]
    pub fn wgsl_type(&self) -> String {
        if self.is_array() {
            format!("array<{}, {}>", self.ty.wgsl_name(), self.count)
        } else {
            self.ty.wgsl_name().to_string()
        }
    }
}

/// One texture/sampler pair in a snippet's signature.
///
/// WGSL keeps textures and samplers as distinct objects, so one entry here
/// produces two module-scope declarations and two call-site arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAndSampler {
    pub name: &'static str,
}

impl TextureAndSampler {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

//! Runtime-Effect Adapter
//!
//! Externally authored, dynamically compiled mini-programs are registered
//! into the snippet catalog on demand. The effect itself stays opaque: the
//! dictionary only needs its uniform signature, child count and a content
//! hash for deduplication, plus a [`RuntimeEffect::translate`] entry point
//! that rewrites the effect's body through the narrow
//! [`PipelineCallbacks`] surface during preamble generation.
//!
//! Well-known effects carry a [`StableKey`], a fixed version-independent
//! id distinct from the hash-based cache key of ad-hoc effects.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::builtins::KNOWN_RUNTIME_EFFECT_START;
use crate::types::{ShaderType, Uniform};

/// Value types an effect uniform may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectUniformType {
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
}

/// One uniform declared by a runtime effect. `count == 0` means non-array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectUniform {
    pub name: String,
    pub ty: EffectUniformType,
    pub count: u32,
    pub half_precision: bool,
}

impl EffectUniform {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: EffectUniformType) -> Self {
        Self {
            name: name.into(),
            ty,
            count: 0,
            half_precision: false,
        }
    }

    /// The catalog type this uniform is realized as.
    #[must_use]
    pub fn shader_type(&self) -> ShaderType {
        if self.half_precision {
            match self.ty {
                EffectUniformType::Float => ShaderType::Half,
                EffectUniformType::Float2 => ShaderType::Half2,
                EffectUniformType::Float3 => ShaderType::Half3,
                EffectUniformType::Float4 => ShaderType::Half4,
                EffectUniformType::Float2x2 => ShaderType::Half2x2,
                EffectUniformType::Float3x3 => ShaderType::Half3x3,
                EffectUniformType::Float4x4 => ShaderType::Half4x4,
                // Integers cannot be half precision; keep the full type.
                EffectUniformType::Int => ShaderType::Int,
                EffectUniformType::Int2 => ShaderType::Int2,
                EffectUniformType::Int3 => ShaderType::Int3,
                EffectUniformType::Int4 => ShaderType::Int4,
            }
        } else {
            match self.ty {
                EffectUniformType::Float => ShaderType::Float,
                EffectUniformType::Float2 => ShaderType::Float2,
                EffectUniformType::Float3 => ShaderType::Float3,
                EffectUniformType::Float4 => ShaderType::Float4,
                EffectUniformType::Float2x2 => ShaderType::Float2x2,
                EffectUniformType::Float3x3 => ShaderType::Float3x3,
                EffectUniformType::Float4x4 => ShaderType::Float4x4,
                EffectUniformType::Int => ShaderType::Int,
                EffectUniformType::Int2 => ShaderType::Int2,
                EffectUniformType::Int3 => ShaderType::Int3,
                EffectUniformType::Int4 => ShaderType::Int4,
            }
        }
    }
}

/// Fixed identifiers for well-known built-in runtime effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StableKey {
    Blur = KNOWN_RUNTIME_EFFECT_START,
    Arithmetic,
    HighContrast,
    Lerp,
    Luma,
    Overdraw,
}

/// Number of stable keys currently defined.
pub const STABLE_KEY_COUNT: usize = 6;

impl StableKey {
    #[must_use]
    pub const fn snippet_id(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn index(self) -> usize {
        (self as i32 - KNOWN_RUNTIME_EFFECT_START) as usize
    }

    /// Name used in generated code and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blur => "KnownEffect_Blur",
            Self::Arithmetic => "KnownEffect_Arithmetic",
            Self::HighContrast => "KnownEffect_HighContrast",
            Self::Lerp => "KnownEffect_Lerp",
            Self::Luma => "KnownEffect_Luma",
            Self::Overdraw => "KnownEffect_Overdraw",
        }
    }
}

/// Callback surface offered to [`RuntimeEffect::translate`].
///
/// The effect's translator rewrites its program through these hooks: its
/// own uniforms are renamed into the program's mangled namespace, helper
/// declarations are registered verbatim, and child operations are sampled
/// by index. The two linear-sRGB bridges return the input expression
/// untouched unless the effect declared it uses color transforms.
pub trait PipelineCallbacks {
    /// Returns the access expression for one of the effect's own uniforms.
    fn declare_uniform(&mut self, name: &str) -> String;

    /// Registers a function. The effect's `main` is rewritten to the
    /// node's mangled entry point with the standard snippet signature.
    fn define_function(&mut self, decl: &str, body: &str, is_main: bool);

    /// Registers a forward declaration verbatim.
    fn declare_function(&mut self, decl: &str);

    /// Registers a struct definition verbatim.
    fn define_struct(&mut self, definition: &str);

    /// Registers a module-scope declaration verbatim.
    fn declare_global(&mut self, declaration: &str);

    /// Evaluates child `index` as a shader at `coords`.
    fn sample_shader(&mut self, index: usize, coords: &str) -> String;

    /// Evaluates child `index` as a color filter of `color`.
    fn sample_color_filter(&mut self, index: usize, color: &str) -> String;

    /// Evaluates child `index` as a blender of `src` and `dst`.
    fn sample_blender(&mut self, index: usize, src: &str, dst: &str) -> String;

    /// Maps `color` into the shared linear working space.
    fn to_linear_srgb(&mut self, color: &str) -> String;

    /// Maps `color` out of the shared linear working space.
    fn from_linear_srgb(&mut self, color: &str) -> String;

    /// The node-mangled form of `name`, for effect-declared helpers.
    fn mangled_name(&self, name: &str) -> String;
}

/// An externally compiled mini-program usable as a catalog entry.
pub trait RuntimeEffect: Send + Sync {
    fn uniforms(&self) -> &[EffectUniform];

    fn child_count(&self) -> usize {
        0
    }

    fn allows_shader(&self) -> bool {
        false
    }

    fn allows_blender(&self) -> bool {
        false
    }

    /// Whether the effect calls the linear-sRGB bridges; when false the
    /// ten shared color-space-transform uniforms are not appended.
    fn uses_color_transform(&self) -> bool {
        false
    }

    fn stable_key(&self) -> Option<StableKey> {
        None
    }

    /// Content hash of the effect's compiled program.
    fn content_hash(&self) -> u64;

    /// Serialized byte size of the effect's uniform block.
    fn uniform_size(&self) -> u32;

    /// Rewrites the effect's program through `callbacks`.
    fn translate(&self, callbacks: &mut dyn PipelineCallbacks);
}

/// Cache key for ad-hoc runtime effects.
///
/// Collision-tolerant by design: a hash collision merely risks an
/// oversized uniform allocation, never incorrect code, because the
/// uniform block size participates in the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeEffectKey {
    pub hash: u64,
    pub uniform_size: u32,
}

/// Per-recording map from snippet id to the live effect, consulted while
/// generating a runtime-effect preamble.
#[derive(Default)]
pub struct RuntimeEffectDictionary {
    effects: FxHashMap<i32, Arc<dyn RuntimeEffect>>,
}

impl RuntimeEffectDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, snippet_id: i32, effect: Arc<dyn RuntimeEffect>) {
        self.effects.insert(snippet_id, effect);
    }

    #[must_use]
    pub fn find(&self, snippet_id: i32) -> Option<&Arc<dyn RuntimeEffect>> {
        self.effects.get(&snippet_id)
    }
}

/// The ten uniforms backing the linear-sRGB bridges of a color-transforming
/// runtime effect: two five-uniform transform descriptions, "to" then
/// "from" (flags word, source transfer-function kind, gamut matrix,
/// destination transfer-function kind, coefficient matrix).
pub(crate) static RUNTIME_EFFECT_CS_TRANSFORM_UNIFORMS: [Uniform; 10] = [
    Uniform::new("flags_toLinear", ShaderType::Int),
    Uniform::new("srcKind_toLinear", ShaderType::Int),
    Uniform::new("gamutTransform_toLinear", ShaderType::Half3x3),
    Uniform::new("dstKind_toLinear", ShaderType::Int),
    Uniform::new("csXformCoeffs_toLinear", ShaderType::Half4x4),
    Uniform::new("flags_fromLinear", ShaderType::Int),
    Uniform::new("srcKind_fromLinear", ShaderType::Int),
    Uniform::new("gamutTransform_fromLinear", ShaderType::Half3x3),
    Uniform::new("dstKind_fromLinear", ShaderType::Int),
    Uniform::new("csXformCoeffs_fromLinear", ShaderType::Half4x4),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_key_ids_are_dense_from_known_start() {
        assert_eq!(StableKey::Blur.snippet_id(), KNOWN_RUNTIME_EFFECT_START);
        assert_eq!(StableKey::Blur.index(), 0);
        assert_eq!(StableKey::Overdraw.index(), STABLE_KEY_COUNT - 1);
    }

    #[test]
    fn half_precision_uniform_maps_to_half_type() {
        let mut u = EffectUniform::new("k", EffectUniformType::Float3x3);
        u.half_precision = true;
        assert_eq!(u.shader_type(), ShaderType::Half3x3);
    }
}

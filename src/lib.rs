//! Shader program dictionary and WGSL pipeline code generation.
//!
//! `pigment` turns serialized paint descriptions (trees of shading
//! operations) into stable program identities and, on demand, into complete
//! WGSL fragment stages. The [`ShaderCodeDictionary`] interns paint keys for
//! the life of the process; [`ShaderInfo`] assembles the code for one key
//! against a [`RenderStep`] and backend [`Caps`], reporting the uniform
//! layout, texture bindings and fixed-function blend state alongside it.

pub mod blend;
pub mod builtins;
pub mod caps;
pub mod codegen;
pub mod dictionary;
pub mod error;
pub mod key;
pub mod layout;
pub mod node;
pub mod render_step;
pub mod runtime_effect;
pub mod snippet;
pub mod swizzle;
pub mod types;

pub use blend::{BlendCoeff, BlendEquation, BlendFormula, BlendInfo, BlendMode, OutputType};
pub use builtins::BuiltinId;
pub use caps::{Caps, DstReadRequirement, ResourceBindingRequirements};
pub use codegen::{ShaderAssembly, ShaderInfo};
pub use dictionary::ShaderCodeDictionary;
pub use error::PigmentError;
pub use key::{KeyRecord, PaintId, PaintKey};
pub use layout::{LayoutRule, UniformOffsetCalculator};
pub use node::{NodeIndex, ShaderNode, ShaderNodes};
pub use render_step::{Coverage, RenderStep, Varying};
pub use runtime_effect::{
    EffectUniform, EffectUniformType, PipelineCallbacks, RuntimeEffect, RuntimeEffectDictionary,
    RuntimeEffectKey, StableKey,
};
pub use snippet::{ShaderSnippet, SnippetArgs, SnippetRequirements};
pub use swizzle::Swizzle;
pub use types::{ShaderType, TextureAndSampler, Uniform};

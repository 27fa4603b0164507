//! Shader Snippets
//!
//! A [`ShaderSnippet`] is the immutable catalog entry for one operation
//! kind: its uniform and sampler signature, structural requirement flags,
//! the name of its implementation in the pre-compiled WGSL module, how many
//! child operations it accepts, and the pair of code-generation strategies
//! (inline expression + top-level preamble) used to instantiate it.
//!
//! The strategy pair is a closed catalog: plain function pointers selected
//! once per operation kind, not open-ended dynamic dispatch.

use std::borrow::Cow;

use bitflags::bitflags;

use crate::codegen::ShaderInfo;
use crate::node::{NodeIndex, ShaderNodes};
use crate::types::{TextureAndSampler, Uniform};

bitflags! {
    /// Structural requirements a snippet imposes on program assembly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SnippetRequirements: u32 {
        /// Consumes the prior stage's output color.
        const PRIOR_STAGE_OUTPUT = 1 << 0;
        /// Consumes a blender destination color.
        const BLENDER_DST_COLOR = 1 << 1;
        /// Consumes local (paint-space) coordinates.
        const LOCAL_COORDS = 1 << 2;
        /// Reads the previously rendered surface color.
        const SURFACE_COLOR = 1 << 3;
        /// Reads the shared gradient color-stop buffer.
        const GRADIENT_BUFFER = 1 << 4;
    }
}

/// The textual arguments threaded through expression generation: the prior
/// stage's output color, the blender destination color, and the fragment's
/// local coordinates, each as a WGSL expression.
#[derive(Debug, Clone)]
pub struct SnippetArgs {
    pub prior_stage_output: String,
    pub blender_dst_color: String,
    pub frag_coord: String,
}

impl SnippetArgs {
    #[must_use]
    pub fn new(prior: impl Into<String>, dst: impl Into<String>, coord: impl Into<String>) -> Self {
        Self {
            prior_stage_output: prior.into(),
            blender_dst_color: dst.into(),
            frag_coord: coord.into(),
        }
    }
}

/// Produces a single inline WGSL expression evaluating a node.
pub type ExpressionGenerator =
    fn(&ShaderInfo<'_>, &ShaderNodes, NodeIndex, &SnippetArgs) -> String;

/// Produces zero or more top-level declarations the node's expression
/// depends on (helper functions, structs, globals).
pub type PreambleGenerator = fn(&ShaderInfo<'_>, &ShaderNodes, NodeIndex) -> String;

/// Catalog entry describing one operation kind.
#[derive(Debug, Clone)]
pub struct ShaderSnippet {
    /// Human-readable name used in generated-code comments and labels.
    pub name: &'static str,
    pub uniforms: Cow<'static, [Uniform]>,
    pub requirements: SnippetRequirements,
    pub samplers: &'static [TextureAndSampler],
    /// Name of this operation's implementation in the pre-compiled module.
    /// Empty for operations whose preamble synthesizes the body itself.
    pub static_fn: &'static str,
    pub expression: ExpressionGenerator,
    pub preamble: PreambleGenerator,
    pub num_children: u8,
}

impl ShaderSnippet {
    #[must_use]
    pub fn needs_prior_stage_output(&self) -> bool {
        self.requirements
            .contains(SnippetRequirements::PRIOR_STAGE_OUTPUT)
    }

    #[must_use]
    pub fn needs_blender_dst_color(&self) -> bool {
        self.requirements
            .contains(SnippetRequirements::BLENDER_DST_COLOR)
    }

    #[must_use]
    pub fn needs_local_coords(&self) -> bool {
        self.requirements
            .contains(SnippetRequirements::LOCAL_COORDS)
    }
}

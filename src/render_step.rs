//! Render Step Contract
//!
//! The consuming render stage describes its own fragment-side needs through
//! this trait: its uniforms and varyings, its coverage kind, whether it
//! emits a primitive color, and the WGSL fragments for its coverage and
//! color logic. The code generator composes these with the paint tree; it
//! never inspects the step's vertex stage.

use crate::caps::ResourceBindingRequirements;
use crate::types::{ShaderType, Uniform};

/// Coverage kinds a render step can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coverage {
    /// Fully opaque geometry; no coverage blending.
    #[default]
    None,
    /// Single-channel analytic coverage.
    Single,
    /// Per-channel subpixel (LCD) coverage.
    Lcd,
}

/// One interpolated per-fragment input the step's vertex stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varying {
    pub name: &'static str,
    pub ty: ShaderType,
}

impl Varying {
    #[must_use]
    pub const fn new(name: &'static str, ty: ShaderType) -> Self {
        Self { name, ty }
    }
}

/// Fragment-side contract of the consuming render stage.
///
/// The WGSL fragments returned by `fragment_coverage_wgsl` and
/// `fragment_color_wgsl` are spliced into the generated main function and
/// write `outputCoverage` / `primitiveColor` respectively. Step uniforms
/// are always addressable by bare name there; the generator emits local
/// aliases for whichever buffer layout is active.
pub trait RenderStep {
    fn name(&self) -> &str;

    fn uniforms(&self) -> &[Uniform] {
        &[]
    }

    fn varyings(&self) -> &[Varying] {
        &[]
    }

    fn coverage(&self) -> Coverage {
        Coverage::None
    }

    /// Whether draws using this step shade at all (as opposed to e.g.
    /// depth-only work).
    fn performs_shading(&self) -> bool {
        true
    }

    fn emits_primitive_color(&self) -> bool {
        false
    }

    fn has_textures(&self) -> bool {
        false
    }

    /// Emits the step's own texture/sampler declarations, advancing
    /// `next_binding` past the slots it consumes.
    fn textures_and_samplers_wgsl(
        &self,
        _reqs: &ResourceBindingRequirements,
        _next_binding: &mut u32,
    ) -> String {
        String::new()
    }

    /// WGSL statements computing `outputCoverage`.
    fn fragment_coverage_wgsl(&self) -> &str {
        ""
    }

    /// WGSL statements computing `primitiveColor`.
    fn fragment_color_wgsl(&self) -> &str {
        ""
    }
}

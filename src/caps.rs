//! Backend Capability Surface
//!
//! Configuration the code generator reads instead of hard-coding backend
//! conventions: buffer layout rules, texture/sampler binding style, the
//! available destination-read strategy, and the binding slot numbers
//! reserved by the consuming backend. Slot numbers are deliberately data,
//! not constants; backends that reserve vertex/instance buffer slots pass
//! a shifted gradient-buffer slot here.

use crate::layout::LayoutRule;

/// How (whether) the previously rendered destination color can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstReadRequirement {
    #[default]
    None,
    /// Destination copied to a texture, sampled with an offset/scale.
    TextureCopy,
    /// Destination sampled directly as a texture.
    TextureSample,
    /// Same-pass fetch of the resident fragment color.
    FramebufferFetch,
}

/// Binding-assignment configuration for generated declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBindingRequirements {
    pub uniform_buffer_layout: LayoutRule,
    pub storage_buffer_layout: LayoutRule,
    /// Whether textures and samplers consume separate binding indices or
    /// share one combined index per pair.
    pub separate_texture_sampler: bool,
    /// Binding slot of the render step's uniform/storage buffer.
    pub render_step_buffer_binding: u32,
    /// Binding slot of the paint uniform/storage buffer.
    pub paint_buffer_binding: u32,
    /// Binding slot of the shared gradient color-stop buffer. Backends that
    /// reserve slots for vertex/instance data pass a slot past those.
    pub gradient_buffer_binding: u32,
}

impl Default for ResourceBindingRequirements {
    fn default() -> Self {
        Self {
            uniform_buffer_layout: LayoutRule::Std140,
            storage_buffer_layout: LayoutRule::Std430,
            separate_texture_sampler: true,
            render_step_buffer_binding: 1,
            paint_buffer_binding: 2,
            gradient_buffer_binding: 3,
        }
    }
}

/// Capabilities of the consuming GPU backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub storage_buffer_support: bool,
    pub dst_read: DstReadRequirement,
    pub bindings: ResourceBindingRequirements,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            storage_buffer_support: true,
            dst_read: DstReadRequirement::None,
            bindings: ResourceBindingRequirements::default(),
        }
    }
}

impl Caps {
    /// A combined texture/sampler backend that reserves low binding slots
    /// for vertex and instance buffers.
    #[must_use]
    pub fn combined_sampler_backend() -> Self {
        Self {
            bindings: ResourceBindingRequirements {
                separate_texture_sampler: false,
                gradient_buffer_binding: 5,
                ..ResourceBindingRequirements::default()
            },
            ..Self::default()
        }
    }
}

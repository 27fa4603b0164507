//! Program Assembly Tests
//!
//! Structural checks on generated WGSL:
//! - uniform/sampler name mangling with one snippet kind at two positions
//! - uniform-block vs storage-buffer paint uniform access
//! - compose helper evaluates inner child before outer
//! - blend-shader child order (source, destination, blender) and prior
//!   color forwarding
//! - non-shading steps leave the paint tree unevaluated
//! - buffer-backed gradient codegen (fast paths, binary search, equal-offset
//!   guard)
//! - coverage / clip folding, fixed-function blend selection, dual-source
//!   outputs, write swizzle
//! - dst-read and runtime-effect assembly

use std::sync::Arc;

use pigment::blend::{BlendCoeff, BlendEquation};
use pigment::builtins::fixed_function_blend_id;
use pigment::runtime_effect::{EffectUniform, EffectUniformType, PipelineCallbacks};
use pigment::{
    BlendMode, BuiltinId, Caps, Coverage, KeyRecord, PaintKey, PigmentError, RenderStep,
    RuntimeEffect, RuntimeEffectDictionary, ShaderAssembly, ShaderCodeDictionary, ShaderInfo,
    ShaderType, Swizzle, Uniform, Varying,
};

struct FillStep {
    coverage: Coverage,
}

impl FillStep {
    fn flat() -> Self {
        Self {
            coverage: Coverage::None,
        }
    }

    fn covered() -> Self {
        Self {
            coverage: Coverage::Single,
        }
    }
}

impl RenderStep for FillStep {
    fn name(&self) -> &str {
        "FillStep"
    }

    fn uniforms(&self) -> &[Uniform] {
        static UNIFORMS: [Uniform; 1] = [Uniform::new("depthScale", ShaderType::Float)];
        &UNIFORMS
    }

    fn varyings(&self) -> &[Varying] {
        static VARYINGS: [Varying; 1] = [Varying::new("edgeDistance", ShaderType::Float)];
        &VARYINGS
    }

    fn coverage(&self) -> Coverage {
        self.coverage
    }

    fn fragment_coverage_wgsl(&self) -> &str {
        "    outputCoverage = vec4f(saturate(edgeDistance));\n"
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assemble(dict: &ShaderCodeDictionary, caps: &Caps, step: &dyn RenderStep, key: &PaintKey)
    -> ShaderAssembly
{
    init_logging();
    let id = dict.find_or_create(key);
    ShaderInfo::new(dict, None, caps, step, id, Swizzle::RGBA)
        .expect("paint id resolves")
        .assemble()
}

fn uniform_block_caps() -> Caps {
    Caps {
        storage_buffer_support: false,
        ..Caps::default()
    }
}

// ============================================================================
// Mangling and uniform access
// ============================================================================

#[test]
fn solid_color_uses_uniform_block_access() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    assert!(asm.wgsl.contains("struct PaintUniforms"));
    assert!(asm.wgsl.contains("color_0: vec4f,"));
    assert!(asm.wgsl.contains("px_solid_shader(paintUniforms.color_0)"));
    assert!(asm.wgsl.contains("var<uniform> paintUniforms"));
    assert_eq!(asm.paint_uniforms_size, 16);
}

#[test]
fn storage_buffer_access_is_indexed_per_draw() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
    let asm = assemble(&dict, &Caps::default(), &FillStep::flat(), &key);

    assert!(asm.wgsl.contains("var<storage, read> fsUniforms: array<PaintUniforms>"));
    assert!(asm.wgsl.contains("fsUniforms[shadingSsboIndex].color_0"));
    assert!(asm.wgsl.contains("shadingSsboIndex = u32(in.ssboIndicesVar.y);"));
}

#[test]
fn duplicate_snippet_kinds_mangle_by_key_index() {
    let dict = ShaderCodeDictionary::new();
    // Two solid-color leaves under one blend-shader node, plus a coeff
    // blender; the same uniform name lands at two key positions.
    let key = PaintKey::new(&[
        KeyRecord::new(BuiltinId::BlendShader.id(), 3),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::CoeffBlender.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    assert!(asm.wgsl.contains("color_1: vec4f,"));
    assert!(asm.wgsl.contains("color_2: vec4f,"));
    assert!(asm.wgsl.contains("coeffs_3: vec4f,"));
    assert!(asm.wgsl.contains("px_solid_shader(paintUniforms.color_1)"));
    assert!(asm.wgsl.contains("px_solid_shader(paintUniforms.color_2)"));
    // Nothing in the subtree needs local coordinates or a destination read.
    assert!(asm
        .wgsl
        .contains("let outColor_0 = BlendShader_0(vec2f(0.0), initialColor, vec4f(0.0));"));
}

#[test]
fn samplers_are_mangled_and_passed_in_pairs() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::Image.id())]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    assert!(asm.wgsl.contains("var image_0: texture_2d<f32>;"));
    assert!(asm.wgsl.contains("var image_0Sampler: sampler;"));
    assert!(asm.wgsl.contains("image_0, image_0Sampler)"));
    assert_eq!(asm.texture_count, 2);
}

#[test]
fn combined_sampler_backend_shares_binding_slots() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::Image.id())]);
    let asm = assemble(
        &dict,
        &Caps::combined_sampler_backend(),
        &FillStep::flat(),
        &key,
    );

    assert!(asm.wgsl.contains("@group(1) @binding(0) var image_0"));
    assert!(asm.wgsl.contains("@group(2) @binding(0) var image_0Sampler"));
    assert_eq!(asm.texture_count, 1);
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn compose_evaluates_inner_before_outer() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::new(BuiltinId::Compose.id(), 2),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::GaussianColorFilter.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    let inner = asm.wgsl.find("let innerColor =").expect("inner first");
    let outer = asm.wgsl.find("let outerColor =").expect("outer second");
    assert!(inner < outer);
    // The outer filter consumes the inner result.
    assert!(asm.wgsl.contains("px_gaussian_colorfilter(innerColor)"));
}

#[test]
fn local_matrix_rewrites_child_coordinates() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::new(BuiltinId::LocalMatrix.id(), 1),
        KeyRecord::leaf(BuiltinId::LinearGradient4.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    assert!(asm
        .wgsl
        .contains("let newCoords = (paintUniforms.localMatrix_0 * vec4f(coords, 0.0, 1.0)).xy;"));
    assert!(asm.wgsl.contains("px_linear_grad_4(newCoords"));
}

#[test]
fn blend_shader_binds_first_child_as_source() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::new(BuiltinId::BlendShader.id(), 3),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::LinearGradient4.id()),
        KeyRecord::leaf(BuiltinId::CoeffBlender.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    // Child order is source, destination, blender.
    assert!(asm
        .wgsl
        .contains("let srcColor = px_solid_shader(paintUniforms.color_1);"));
    assert!(asm.wgsl.contains("let dstColor2 = px_linear_grad_4(coords"));
    assert!(asm
        .wgsl
        .contains("px_coeff_blend(srcColor, dstColor2, paintUniforms.coeffs_3)"));
}

#[test]
fn blend_shader_children_see_the_prior_stage_output() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::new(BuiltinId::BlendShader.id(), 3),
        KeyRecord::leaf(BuiltinId::PriorOutput.id()),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::CoeffBlender.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    // The helper's real arguments flow into the shader children.
    assert!(asm.wgsl.contains("let srcColor = px_passthrough(priorColor);"));
}

// ============================================================================
// Buffer-backed gradients
// ============================================================================

#[test]
fn gradient_buffer_emits_binary_search_colorizer() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::LinearGradientBuffer.id())]);
    let asm = assemble(&dict, &Caps::default(), &FillStep::flat(), &key);

    assert!(asm.has_gradient_buffer);
    assert!(asm
        .wgsl
        .contains("@group(0) @binding(3) var<storage, read> gradientBuffer: array<f32>;"));
    // End-stop fast paths.
    assert!(asm.wgsl.contains("if (t <= gradientBuffer[u32(bufferOffset)])"));
    assert!(asm.wgsl.contains("return grad_buf_color(bufferOffset, 0);"));
    assert!(asm.wgsl.contains("return grad_buf_color(bufferOffset, lastStop);"));
    // Binary search over interior stops.
    assert!(asm.wgsl.contains("while (hi - lo > 1)"));
    assert!(asm.wgsl.contains("let mid = (lo + hi) / 2;"));
    // Hard-step guard for exactly equal offsets.
    assert!(asm.wgsl.contains("if (t1 > t0)"));
    assert!(asm.wgsl.contains("return grad_buf_color(bufferOffset, hi);"));
    // The expression routes through the external layout/tiling helpers.
    assert!(asm.wgsl.contains("colorize_grad_buf("));
    assert!(asm.wgsl.contains("px_tile_grad("));
    assert!(asm.wgsl.contains("px_linear_grad_layout("));
}

#[test]
fn gradient_colorizer_is_emitted_once_for_two_gradients() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::new(BuiltinId::BlendShader.id(), 3),
        KeyRecord::leaf(BuiltinId::LinearGradientBuffer.id()),
        KeyRecord::leaf(BuiltinId::RadialGradientBuffer.id()),
        KeyRecord::leaf(BuiltinId::CoeffBlender.id()),
    ]);
    let asm = assemble(&dict, &Caps::default(), &FillStep::flat(), &key);

    assert_eq!(asm.wgsl.matches("fn colorize_grad_buf(").count(), 1);
    assert!(asm.wgsl.contains("px_linear_grad_layout("));
    assert!(asm.wgsl.contains("px_radial_grad_layout("));
}

// ============================================================================
// Coverage, clip and blending
// ============================================================================

#[test]
fn opaque_draw_uses_simple_blend_table() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(fixed_function_blend_id(BlendMode::SrcOver)),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    assert_eq!(asm.blend_info.src_coeff, BlendCoeff::One);
    assert_eq!(asm.blend_info.dst_coeff, BlendCoeff::Isa);
    assert!(!asm.dual_source_blending);
    // The marker root must not shade; the solid color is the final output.
    assert!(asm.wgsl.contains("var finalColor = outColor_0;"));
    assert!(asm.wgsl.contains("out.color = finalColor;"));
}

#[test]
fn coverage_folds_into_the_primary_output() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(fixed_function_blend_id(BlendMode::SrcOver)),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::covered(), &key);

    assert!(asm.wgsl.contains("var outputCoverage = vec4f(1.0);"));
    assert!(asm.wgsl.contains("saturate(edgeDistance)"));
    assert!(asm.wgsl.contains("out.color = finalColor * outputCoverage;"));
    assert_eq!(asm.blend_info.src_coeff, BlendCoeff::One);
    assert_eq!(asm.blend_info.dst_coeff, BlendCoeff::Isa);
}

#[test]
fn coverage_src_mode_emits_dual_source_outputs() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(fixed_function_blend_id(BlendMode::Src)),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::covered(), &key);

    assert!(asm.dual_source_blending);
    assert!(asm.wgsl.starts_with("enable dual_source_blending;\n"));
    assert!(asm.wgsl.contains("@location(0) @blend_src(0) color: vec4f,"));
    assert!(asm.wgsl.contains("@location(0) @blend_src(1) colorSecondary: vec4f,"));
    assert!(asm.wgsl.contains("out.colorSecondary = outputCoverage;"));
    assert_eq!(asm.blend_info.dst_coeff, BlendCoeff::Is2a);
}

#[test]
fn clip_shader_scales_coverage_by_alpha() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::new(BuiltinId::ClipShader.id(), 1),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    // Clip alone forces a coverage variable even for a None-coverage step.
    assert!(asm.wgsl.contains("var outputCoverage = vec4f(1.0);"));
    assert!(asm
        .wgsl
        .contains("outputCoverage = outputCoverage * (ClipShader_1(in.position.xy"));
    // The synthesized helper hands the child's output to the module function.
    assert!(asm.wgsl.contains("return px_clip_shader(outColor_2);"));
    // The clip tree is not part of the paint color chain.
    assert!(asm.wgsl.contains("var finalColor = outColor_0;"));
}

#[test]
fn non_shading_steps_skip_paint_evaluation() {
    struct DepthOnlyStep;
    impl RenderStep for DepthOnlyStep {
        fn name(&self) -> &str {
            "DepthOnlyStep"
        }

        fn performs_shading(&self) -> bool {
            false
        }
    }

    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
    let asm = assemble(&dict, &uniform_block_caps(), &DepthOnlyStep, &key);

    assert!(!asm.wgsl.contains("px_solid_shader("));
    assert!(asm.wgsl.contains("var finalColor = initialColor;"));
}

#[test]
fn write_swizzle_is_applied_before_output() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[KeyRecord::leaf(BuiltinId::SolidColor.id())]);
    let id = dict.find_or_create(&key);
    let caps = uniform_block_caps();
    let step = FillStep::flat();
    let asm = ShaderInfo::new(&dict, None, &caps, &step, id, Swizzle::BGRA)
        .expect("paint id resolves")
        .assemble();

    assert!(asm.wgsl.contains("finalColor = finalColor.bgra;"));
}

// ============================================================================
// Destination reads
// ============================================================================

#[test]
fn dst_read_sample_blends_in_the_shader() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::leaf(BuiltinId::DstReadSample.id()),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::BlendModeBlender.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::flat(), &key);

    assert!(asm.wgsl.contains("var<private> surfaceColor: vec4f;"));
    assert!(asm.wgsl.contains("surfaceColor = DstReadSample_0(in.position.xy);"));
    assert!(asm.wgsl.contains("textureSampleLevel(dstCopy_0, dstCopy_0Sampler"));
    // The blender consumes the captured destination.
    assert!(asm.wgsl.contains("px_blend(outColor_1, surfaceColor"));
    // Shader-applied blending writes the result straight out.
    assert_eq!(asm.blend_info.src_coeff, BlendCoeff::One);
    assert_eq!(asm.blend_info.dst_coeff, BlendCoeff::Zero);
    assert_eq!(asm.blend_info.equation, BlendEquation::Add);
}

#[test]
fn dst_read_with_coverage_lerps_and_discards() {
    let dict = ShaderCodeDictionary::new();
    let key = PaintKey::new(&[
        KeyRecord::leaf(BuiltinId::DstReadSample.id()),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
        KeyRecord::leaf(BuiltinId::BlendModeBlender.id()),
    ]);
    let asm = assemble(&dict, &uniform_block_caps(), &FillStep::covered(), &key);

    assert!(asm.wgsl.contains("discard;"));
    assert!(asm
        .wgsl
        .contains("finalColor * outputCoverage + surfaceColor * (vec4f(1.0) - outputCoverage)"));
}

// ============================================================================
// Runtime effects
// ============================================================================

struct WarpEffect {
    uniforms: Vec<EffectUniform>,
}

impl WarpEffect {
    fn shared() -> Arc<dyn RuntimeEffect> {
        Arc::new(Self {
            uniforms: vec![EffectUniform::new("strength", EffectUniformType::Float)],
        })
    }
}

impl RuntimeEffect for WarpEffect {
    fn uniforms(&self) -> &[EffectUniform] {
        &self.uniforms
    }

    fn child_count(&self) -> usize {
        1
    }

    fn allows_shader(&self) -> bool {
        true
    }

    fn content_hash(&self) -> u64 {
        0xC0FF_EE00
    }

    fn uniform_size(&self) -> u32 {
        4
    }

    fn translate(&self, callbacks: &mut dyn PipelineCallbacks) {
        let strength = callbacks.declare_uniform("strength");
        let child = callbacks.sample_shader(0, "coords * strength_local");
        callbacks.define_function(
            "",
            &format!("    let strength_local = {strength};\n    return {child};"),
            true,
        );
    }
}

#[test]
fn runtime_effect_nodes_assemble_through_the_callback_surface() {
    let dict = ShaderCodeDictionary::new();
    let effect = WarpEffect::shared();
    let snippet_id = dict.find_or_create_runtime_effect_snippet(&effect);

    let mut effects = RuntimeEffectDictionary::new();
    effects.set(snippet_id, Arc::clone(&effect));

    let key = PaintKey::new(&[
        KeyRecord::new(snippet_id, 1),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
    ]);
    let id = dict.find_or_create(&key);
    let caps = uniform_block_caps();
    let step = FillStep::flat();
    let asm = ShaderInfo::new(&dict, Some(&effects), &caps, &step, id, Swizzle::RGBA)
        .expect("effect is registered")
        .assemble();

    assert!(asm.wgsl.contains("fn RuntimeEffect_0(coords: vec2f"));
    assert!(asm.wgsl.contains("let strength_local = paintUniforms.strength_0;"));
    assert!(asm.wgsl.contains("RuntimeEffect_0(in.localCoordsVar"));
}

#[test]
fn missing_runtime_effect_fails_assembly_up_front() {
    let dict = ShaderCodeDictionary::new();
    let effect = WarpEffect::shared();
    let snippet_id = dict.find_or_create_runtime_effect_snippet(&effect);

    let key = PaintKey::new(&[
        KeyRecord::new(snippet_id, 1),
        KeyRecord::leaf(BuiltinId::SolidColor.id()),
    ]);
    let id = dict.find_or_create(&key);
    let caps = uniform_block_caps();
    let step = FillStep::flat();
    let err = ShaderInfo::new(&dict, None, &caps, &step, id, Swizzle::RGBA)
        .err()
        .expect("unbound effect is rejected");
    assert_eq!(err, PigmentError::MissingRuntimeEffect(snippet_id));
}

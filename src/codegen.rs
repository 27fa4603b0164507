//! Program Assembly
//!
//! [`ShaderInfo`] turns one interned paint id plus a render step into a
//! complete WGSL fragment stage. Assembly is a single forward pass:
//! varyings, uniform blocks, the gradient stop buffer, texture/sampler
//! declarations, per-node preambles (depth first, labeled), then the main
//! function that chains the root expressions, folds in coverage and clip,
//! and selects the hardware blend state.
//!
//! Uniform and sampler names are mangled with the owning node's key index
//! (`color_3`), so the same operation kind can appear at several tree
//! positions without collision. The shared paint-color uniform is exempt.

use std::cell::Cell;
use std::fmt::Write as _;

use xxhash_rust::xxh3::xxh3_128;

use crate::blend::{
    get_blend_formula, get_lcd_blend_formula, simple_blend_info, BlendCoeff, BlendEquation,
    BlendInfo, BlendMode, OutputType,
};
use crate::builtins::{blend_mode_for_id, BuiltinId, KNOWN_RUNTIME_EFFECT_START};
use crate::caps::{Caps, DstReadRequirement};
use crate::dictionary::ShaderCodeDictionary;
use crate::error::PigmentError;
use crate::key::PaintId;
use crate::layout::UniformOffsetCalculator;
use crate::node::{NodeIndex, ShaderNodes};
use crate::render_step::{Coverage, RenderStep, Varying};
use crate::runtime_effect::{PipelineCallbacks, RuntimeEffect, RuntimeEffectDictionary};
use crate::snippet::{ShaderSnippet, SnippetArgs, SnippetRequirements};
use crate::swizzle::Swizzle;
use crate::types::{ShaderType, Uniform};

/// The finished fragment stage plus the bookkeeping its consumer needs to
/// bind resources and program the fixed-function blend unit.
#[derive(Debug, Clone)]
pub struct ShaderAssembly {
    pub wgsl: String,
    /// Human-readable pipeline label (step name + root operation names).
    pub label: String,
    /// Content hash of `wgsl`, usable as a pipeline cache key component.
    pub source_hash: u128,
    pub blend_info: BlendInfo,
    pub dual_source_blending: bool,
    /// Byte size of the render step's uniform block under its layout rule.
    pub step_uniforms_size: u32,
    /// Byte size of the paint uniform block under its layout rule.
    pub paint_uniforms_size: u32,
    /// Texture/sampler slots consumed, step textures included.
    pub texture_count: u32,
    pub has_gradient_buffer: bool,
}

/// Everything needed to generate one pipeline's fragment stage.
pub struct ShaderInfo<'a> {
    caps: &'a Caps,
    step: &'a dyn RenderStep,
    runtime_effects: Option<&'a RuntimeEffectDictionary>,
    nodes: ShaderNodes,
    requirements: SnippetRequirements,
    ff_blend_mode: Option<BlendMode>,
    clip_root: Option<NodeIndex>,
    write_swizzle: Swizzle,
    use_storage_buffers: bool,
    gradient_helper_emitted: Cell<bool>,
}

impl<'a> ShaderInfo<'a> {
    /// Resolves `id` against `dict` and prepares assembly.
    ///
    /// **Panics** if `id` is valid but was not produced by `dict`.
    pub fn new(
        dict: &ShaderCodeDictionary,
        runtime_effects: Option<&'a RuntimeEffectDictionary>,
        caps: &'a Caps,
        step: &'a dyn RenderStep,
        id: PaintId,
        write_swizzle: Swizzle,
    ) -> Result<Self, PigmentError> {
        if !id.is_valid() {
            return Err(PigmentError::InvalidPaintId(id.as_u32()));
        }
        let key = dict.get_entry(id);
        let nodes = ShaderNodes::from_key(dict, &key)?;

        let mut ff_blend_mode = None;
        let mut clip_root = None;
        for &root in nodes.roots() {
            let sid = nodes.node(root).snippet_id();
            if let Some(mode) = blend_mode_for_id(sid) {
                ff_blend_mode = Some(mode);
            } else if sid == BuiltinId::ClipShader.id() {
                clip_root = Some(root);
            }
        }

        // Runtime-effect nodes must have a live effect bound before any of
        // their generators run.
        for node in nodes.iter() {
            if node.snippet_id() >= KNOWN_RUNTIME_EFFECT_START
                && runtime_effects
                    .and_then(|d| d.find(node.snippet_id()))
                    .is_none()
            {
                return Err(PigmentError::MissingRuntimeEffect(node.snippet_id()));
            }
        }

        let requirements = nodes.aggregate_requirements();
        Ok(Self {
            caps,
            step,
            runtime_effects,
            nodes,
            requirements,
            ff_blend_mode,
            clip_root,
            write_swizzle,
            use_storage_buffers: caps.storage_buffer_support,
            gradient_helper_emitted: Cell::new(false),
        })
    }

    #[must_use]
    pub fn nodes(&self) -> &ShaderNodes {
        &self.nodes
    }

    #[must_use]
    pub fn caps(&self) -> &Caps {
        self.caps
    }

    #[must_use]
    pub fn needs_surface_color(&self) -> bool {
        self.requirements
            .contains(SnippetRequirements::SURFACE_COLOR)
            || matches!(self.caps.dst_read, DstReadRequirement::FramebufferFetch)
    }

    #[must_use]
    pub fn needs_local_coords(&self) -> bool {
        self.requirements.contains(SnippetRequirements::LOCAL_COORDS)
    }

    fn mangled_uniform(&self, key_index: usize, uniform: &Uniform) -> String {
        if uniform.is_paint_color {
            uniform.name.to_string()
        } else {
            format!("{}_{}", uniform.name, key_index)
        }
    }

    /// The WGSL access expression for one of `index`'s uniforms.
    #[must_use]
    pub fn uniform_access(
        &self,
        nodes: &ShaderNodes,
        index: NodeIndex,
        uniform: &Uniform,
    ) -> String {
        let member = self.mangled_uniform(nodes.node(index).key_index(), uniform);
        if self.use_storage_buffers {
            format!("fsUniforms[shadingSsboIndex].{member}")
        } else {
            format!("paintUniforms.{member}")
        }
    }

    /// Like [`ShaderInfo::uniform_access`], addressed by declared name.
    ///
    /// **Panics** if `index`'s snippet declares no uniform called `name`.
    #[must_use]
    pub fn uniform_access_by_name(
        &self,
        nodes: &ShaderNodes,
        index: NodeIndex,
        name: &str,
    ) -> String {
        let entry = nodes.node(index).entry();
        let uniform = entry
            .uniforms
            .iter()
            .find(|u| u.name == name)
            .unwrap_or_else(|| panic!("{} has no uniform {name}", entry.name));
        self.uniform_access(nodes, index, uniform)
    }

    /// Mangled texture and sampler variable names for one sampler slot.
    #[must_use]
    pub fn sampler_names(
        &self,
        nodes: &ShaderNodes,
        index: NodeIndex,
        base: &str,
    ) -> (String, String) {
        let ki = nodes.node(index).key_index();
        (format!("{base}_{ki}"), format!("{base}_{ki}Sampler"))
    }

    fn runtime_effect(&self, snippet_id: i32) -> Option<&dyn RuntimeEffect> {
        self.runtime_effects
            .and_then(|d| d.find(snippet_id))
            .map(std::convert::AsRef::as_ref)
    }

    // ─── Assembly ──────────────────────────────────────────────────────

    /// Generates the fragment stage.
    #[must_use]
    pub fn assemble(&self) -> ShaderAssembly {
        let coverage = self.step.coverage();
        let has_coverage = !matches!(coverage, Coverage::None) || self.clip_root.is_some();
        let surface_blend = self.needs_surface_color();

        // Blend state is settled up front so the output struct knows
        // whether a secondary (dual-source) slot exists.
        let (blend_info, formula) = if surface_blend {
            // The tree already folded the destination in; write the result.
            (
                BlendInfo {
                    equation: BlendEquation::Add,
                    src_coeff: BlendCoeff::One,
                    dst_coeff: BlendCoeff::Zero,
                    modifies_dst: true,
                },
                None,
            )
        } else {
            let mode = self.ff_blend_mode.unwrap_or(BlendMode::SrcOver);
            if has_coverage {
                let f = if matches!(coverage, Coverage::Lcd) {
                    get_lcd_blend_formula(mode)
                } else {
                    get_blend_formula(false, true, mode)
                };
                (f.blend_info(), Some(f))
            } else {
                (simple_blend_info(mode), None)
            }
        };
        let dual_source = formula.is_some_and(|f| f.has_secondary_output());

        let mut wgsl = String::new();
        if dual_source {
            // @blend_src attributes are rejected without the extension.
            wgsl.push_str("enable dual_source_blending;\n\n");
        }
        let varyings = self.collect_varyings();
        self.emit_fragment_io(&mut wgsl, &varyings, dual_source);
        let step_uniforms_size = self.emit_step_uniforms(&mut wgsl);
        let paint_uniforms_size = self.emit_paint_uniforms(&mut wgsl);
        let has_gradient_buffer = self.emit_gradient_buffer(&mut wgsl);
        let texture_count = self.emit_textures(&mut wgsl);
        self.emit_globals(&mut wgsl);
        self.emit_preambles(&mut wgsl);
        self.emit_main(&mut wgsl, coverage, formula, surface_blend);

        let label = self.label();
        let source_hash = xxh3_128(wgsl.as_bytes());
        log::debug!(
            "assembled `{label}`: {} nodes, {paint_uniforms_size}B paint uniforms, \
             {texture_count} textures",
            self.nodes.len()
        );
        log::trace!("generated WGSL for `{label}`:\n{wgsl}");

        ShaderAssembly {
            wgsl,
            label,
            source_hash,
            blend_info,
            dual_source_blending: dual_source,
            step_uniforms_size,
            paint_uniforms_size,
            texture_count,
            has_gradient_buffer,
        }
    }

    fn label(&self) -> String {
        let mut label = self.step.name().to_string();
        for &root in self.nodes.roots() {
            label.push_str(" + ");
            label.push_str(self.nodes.node(root).entry().name);
        }
        label
    }

    fn collect_varyings(&self) -> Vec<Varying> {
        let mut varyings: Vec<Varying> = self.step.varyings().to_vec();
        if self.needs_local_coords() && !varyings.iter().any(|v| v.name == "localCoordsVar") {
            varyings.push(Varying::new("localCoordsVar", ShaderType::Float2));
        }
        if self.use_storage_buffers {
            varyings.push(Varying::new("ssboIndicesVar", ShaderType::Int2));
        }
        varyings
    }

    fn emit_fragment_io(&self, out: &mut String, varyings: &[Varying], dual_source: bool) {
        out.push_str("struct FragmentIn {\n    @builtin(position) position: vec4f,\n");
        for (loc, v) in varyings.iter().enumerate() {
            // Integer varyings must be flat-interpolated.
            let interpolate = match v.ty {
                ShaderType::Int | ShaderType::Int2 | ShaderType::Int3 | ShaderType::Int4 => {
                    " @interpolate(flat)"
                }
                _ => "",
            };
            let _ = writeln!(
                out,
                "    @location({loc}){interpolate} {}: {},",
                v.name,
                v.ty.wgsl_name()
            );
        }
        out.push_str("}\n\n");

        if dual_source {
            out.push_str(
                "struct FragmentOut {\n    @location(0) @blend_src(0) color: vec4f,\n    \
                 @location(0) @blend_src(1) colorSecondary: vec4f,\n}\n\n",
            );
        } else {
            out.push_str("struct FragmentOut {\n    @location(0) color: vec4f,\n}\n\n");
        }
    }

    fn emit_step_uniforms(&self, out: &mut String) -> u32 {
        let uniforms = self.step.uniforms();
        if uniforms.is_empty() {
            return 0;
        }
        let bindings = &self.caps.bindings;
        let rule = if self.use_storage_buffers {
            bindings.storage_buffer_layout
        } else {
            bindings.uniform_buffer_layout
        };
        let mut calc = UniformOffsetCalculator::new(rule);
        out.push_str("struct StepUniforms {\n");
        for u in uniforms {
            calc.advance(u);
            let _ = writeln!(out, "    {}: {},", u.name, u.wgsl_type());
        }
        out.push_str("}\n");
        if self.use_storage_buffers {
            let _ = writeln!(
                out,
                "@group(0) @binding({}) var<storage, read> stepUniformsArr: array<StepUniforms>;\n",
                bindings.render_step_buffer_binding
            );
        } else {
            let _ = writeln!(
                out,
                "@group(0) @binding({}) var<uniform> stepUniforms: StepUniforms;\n",
                bindings.render_step_buffer_binding
            );
        }
        calc.total()
    }

    fn nodes_in_key_order(&self) -> Vec<NodeIndex> {
        let mut order: Vec<NodeIndex> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&i| self.nodes.node(i).key_index());
        order
    }

    fn emit_paint_uniforms(&self, out: &mut String) -> u32 {
        let bindings = &self.caps.bindings;
        let rule = if self.use_storage_buffers {
            bindings.storage_buffer_layout
        } else {
            bindings.uniform_buffer_layout
        };
        let mut calc = UniformOffsetCalculator::new(rule);
        let mut members = String::new();
        let mut have_paint_color = false;
        for index in self.nodes_in_key_order() {
            let node = self.nodes.node(index);
            for u in node.entry().uniforms.iter() {
                if u.is_paint_color {
                    // Shared across the whole program; declared once.
                    if have_paint_color {
                        continue;
                    }
                    have_paint_color = true;
                }
                calc.advance(u);
                let _ = writeln!(
                    members,
                    "    {}: {},",
                    self.mangled_uniform(node.key_index(), u),
                    u.wgsl_type()
                );
            }
        }
        if members.is_empty() {
            return 0;
        }
        let _ = writeln!(out, "struct PaintUniforms {{\n{members}}}");
        if self.use_storage_buffers {
            let _ = writeln!(
                out,
                "@group(0) @binding({}) var<storage, read> fsUniforms: array<PaintUniforms>;\n",
                bindings.paint_buffer_binding
            );
        } else {
            let _ = writeln!(
                out,
                "@group(0) @binding({}) var<uniform> paintUniforms: PaintUniforms;\n",
                bindings.paint_buffer_binding
            );
        }
        calc.total()
    }

    fn emit_gradient_buffer(&self, out: &mut String) -> bool {
        if !self
            .requirements
            .contains(SnippetRequirements::GRADIENT_BUFFER)
        {
            return false;
        }
        let _ = writeln!(
            out,
            "@group(0) @binding({}) var<storage, read> gradientBuffer: array<f32>;\n",
            self.caps.bindings.gradient_buffer_binding
        );
        true
    }

    fn emit_textures(&self, out: &mut String) -> u32 {
        let mut next_binding = 0u32;
        if self.step.has_textures() {
            out.push_str(
                &self
                    .step
                    .textures_and_samplers_wgsl(&self.caps.bindings, &mut next_binding),
            );
        }
        for index in self.nodes_in_key_order() {
            let node = self.nodes.node(index);
            for ts in node.entry().samplers {
                let (tex, samp) = self.sampler_names(&self.nodes, index, ts.name);
                if self.caps.bindings.separate_texture_sampler {
                    let _ = writeln!(
                        out,
                        "@group(1) @binding({next_binding}) var {tex}: texture_2d<f32>;"
                    );
                    let _ = writeln!(
                        out,
                        "@group(1) @binding({}) var {samp}: sampler;",
                        next_binding + 1
                    );
                    next_binding += 2;
                } else {
                    // Combined backends key both objects off one slot, the
                    // sampler in its own group.
                    let _ = writeln!(
                        out,
                        "@group(1) @binding({next_binding}) var {tex}: texture_2d<f32>;"
                    );
                    let _ = writeln!(
                        out,
                        "@group(2) @binding({next_binding}) var {samp}: sampler;"
                    );
                    next_binding += 1;
                }
            }
        }
        if next_binding > 0 {
            out.push('\n');
        }
        next_binding
    }

    fn emit_globals(&self, out: &mut String) {
        if self.use_storage_buffers {
            out.push_str("var<private> shadingSsboIndex: u32;\n");
        }
        if self.needs_surface_color() {
            out.push_str("var<private> surfaceColor: vec4f;\n");
        }
        if self.step.emits_primitive_color() {
            out.push_str("var<private> primitiveColor: vec4f;\n");
        }
        out.push('\n');
    }

    fn emit_preambles(&self, out: &mut String) {
        for &root in self.nodes.roots() {
            self.emit_preamble_tree(out, root, None);
        }
    }

    fn emit_preamble_tree(&self, out: &mut String, index: NodeIndex, parent: Option<usize>) {
        let node = self.nodes.node(index);
        match parent {
            Some(p) => {
                let _ = writeln!(out, "// [{}<-{p}] {}", node.key_index(), node.entry().name);
            }
            None => {
                let _ = writeln!(out, "// [{}] {}", node.key_index(), node.entry().name);
            }
        }
        let text = (node.entry().preamble)(self, &self.nodes, index);
        if !text.is_empty() {
            out.push_str(&text);
        }
        let key_index = node.key_index();
        for &child in node.children() {
            self.emit_preamble_tree(out, child, Some(key_index));
        }
    }

    fn emit_main(
        &self,
        out: &mut String,
        coverage: Coverage,
        formula: Option<crate::blend::BlendFormula>,
        surface_blend: bool,
    ) {
        out.push_str("@fragment\nfn main(in: FragmentIn) -> FragmentOut {\n");
        out.push_str("    var out: FragmentOut;\n");

        if self.use_storage_buffers {
            out.push_str("    shadingSsboIndex = u32(in.ssboIndicesVar.y);\n");
        }
        if !self.step.uniforms().is_empty() {
            // Step fragments address their uniforms by bare name.
            for u in self.step.uniforms() {
                if self.use_storage_buffers {
                    let _ = writeln!(
                        out,
                        "    let {} = stepUniformsArr[u32(in.ssboIndicesVar.x)].{};",
                        u.name, u.name
                    );
                } else {
                    let _ = writeln!(out, "    let {} = stepUniforms.{};", u.name, u.name);
                }
            }
        }
        if self.step.emits_primitive_color() {
            out.push_str(self.step.fragment_color_wgsl());
            out.push('\n');
        }

        // Paint tree evaluation, roots in key order. Clip and the
        // fixed-function blend marker are structural and do not shade.
        out.push_str("    let initialColor = vec4f(0.0);\n");
        let local_coords = if self.needs_local_coords() {
            "in.localCoordsVar"
        } else {
            "vec2f(0.0)"
        };
        // The destination argument only resolves when the program captured
        // the surface color; everything else gets a transparent stand-in.
        let dst_color = if self.needs_surface_color() {
            "surfaceColor"
        } else {
            "vec4f(0.0)"
        };
        let mut prior = "initialColor".to_string();
        // Non-shading steps (depth-only work) leave the paint unevaluated.
        let shaded_roots: &[NodeIndex] = if self.step.performs_shading() {
            self.nodes.roots()
        } else {
            &[]
        };
        for &root in shaded_roots {
            let node = self.nodes.node(root);
            let sid = node.snippet_id();
            if blend_mode_for_id(sid).is_some() || Some(root) == self.clip_root {
                continue;
            }
            if node
                .entry()
                .requirements
                .contains(SnippetRequirements::SURFACE_COLOR)
            {
                let args = SnippetArgs::new(prior.clone(), "surfaceColor", "in.position.xy");
                let expr = (node.entry().expression)(self, &self.nodes, root, &args);
                let _ = writeln!(out, "    surfaceColor = {expr};");
                continue;
            }
            let args = SnippetArgs::new(prior.clone(), dst_color, local_coords);
            let expr = (node.entry().expression)(self, &self.nodes, root, &args);
            let var = format!("outColor_{}", node.key_index());
            let _ = writeln!(out, "    let {var} = {expr};");
            prior = var;
        }
        let _ = writeln!(out, "    var finalColor = {prior};");
        if !self.write_swizzle.is_identity() {
            let _ = writeln!(out, "    finalColor = finalColor.{};", self.write_swizzle.as_str());
        }

        let has_coverage = !matches!(coverage, Coverage::None) || self.clip_root.is_some();
        if has_coverage {
            out.push_str("    var outputCoverage = vec4f(1.0);\n");
            if !matches!(coverage, Coverage::None) {
                out.push_str(self.step.fragment_coverage_wgsl());
                out.push('\n');
            }
            if let Some(clip) = self.clip_root {
                let node = self.nodes.node(clip);
                let args = SnippetArgs::new("initialColor", dst_color, "in.position.xy");
                let expr = (node.entry().expression)(self, &self.nodes, clip, &args);
                let _ = writeln!(out, "    outputCoverage = outputCoverage * ({expr}).a;");
            }
        }

        if surface_blend {
            if has_coverage {
                // Coverage is folded in manually; fragments the draw does
                // not touch keep the destination intact.
                out.push_str(
                    "    if (all(outputCoverage == vec4f(0.0))) {\n        discard;\n    }\n",
                );
                if matches!(coverage, Coverage::Lcd) {
                    out.push_str(
                        "    let lcdCoverage = vec4f(outputCoverage.rgb, outputCoverage.g);\n",
                    );
                    out.push_str(
                        "    out.color = finalColor * lcdCoverage + surfaceColor * (vec4f(1.0) - lcdCoverage);\n",
                    );
                } else {
                    out.push_str(
                        "    out.color = finalColor * outputCoverage + surfaceColor * (vec4f(1.0) - outputCoverage);\n",
                    );
                }
            } else {
                out.push_str("    out.color = finalColor;\n");
            }
        } else if let Some(formula) = formula {
            let _ = writeln!(
                out,
                "    out.color = {};",
                output_expr(formula.primary_output)
            );
            if formula.has_secondary_output() {
                let _ = writeln!(
                    out,
                    "    out.colorSecondary = {};",
                    output_expr(formula.secondary_output)
                );
            }
        } else {
            out.push_str("    out.color = finalColor;\n");
        }

        out.push_str("    return out;\n}\n");
    }
}

/// The fragment-output expression for one blend-formula output kind.
fn output_expr(output: OutputType) -> &'static str {
    match output {
        OutputType::None => "vec4f(0.0)",
        OutputType::Coverage => "outputCoverage",
        OutputType::Modulate => "finalColor * outputCoverage",
        OutputType::SaModulate => "finalColor.a * outputCoverage",
        OutputType::IsaModulate => "(1.0 - finalColor.a) * outputCoverage",
        OutputType::IscModulate => "(vec4f(1.0) - finalColor) * outputCoverage",
    }
}

fn helper_name(node_entry: &ShaderSnippet, key_index: usize) -> String {
    format!("{}_{key_index}", node_entry.name)
}

fn invoke_node(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
    args: &SnippetArgs,
) -> String {
    (nodes.node(index).entry().expression)(info, nodes, index, args)
}

// ─── Expression generators ─────────────────────────────────────────────────

/// Leaves call their pre-compiled implementation directly; nodes with
/// children call the helper their preamble synthesized.
pub(crate) fn generate_default_expression(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
    args: &SnippetArgs,
) -> String {
    let node = nodes.node(index);
    let entry = node.entry();
    if node.num_children() > 0 {
        return format!(
            "{}({}, {}, {})",
            helper_name(entry, node.key_index()),
            args.frag_coord,
            args.prior_stage_output,
            args.blender_dst_color
        );
    }
    let mut call_args: Vec<String> = Vec::new();
    if entry.needs_local_coords() {
        call_args.push(args.frag_coord.clone());
    }
    if entry.needs_prior_stage_output() {
        call_args.push(args.prior_stage_output.clone());
    }
    if entry.needs_blender_dst_color() {
        call_args.push(args.blender_dst_color.clone());
    }
    for u in entry.uniforms.iter() {
        call_args.push(info.uniform_access(nodes, index, u));
    }
    for ts in entry.samplers {
        let (tex, samp) = info.sampler_names(nodes, index, ts.name);
        call_args.push(tex);
        call_args.push(samp);
    }
    format!("{}({})", entry.static_fn, call_args.join(", "))
}

pub(crate) fn generate_primitive_color_expression(
    _info: &ShaderInfo<'_>,
    _nodes: &ShaderNodes,
    _index: NodeIndex,
    _args: &SnippetArgs,
) -> String {
    "primitiveColor".to_string()
}

pub(crate) fn generate_dst_read_sample_expression(
    _info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
    args: &SnippetArgs,
) -> String {
    let node = nodes.node(index);
    format!(
        "{}({})",
        helper_name(node.entry(), node.key_index()),
        args.frag_coord
    )
}

pub(crate) fn generate_dst_read_fetch_expression(
    _info: &ShaderInfo<'_>,
    _nodes: &ShaderNodes,
    _index: NodeIndex,
    _args: &SnippetArgs,
) -> String {
    "px_last_frag_color()".to_string()
}

pub(crate) fn generate_gradient_buffer_expression(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
    args: &SnippetArgs,
) -> String {
    let sid = nodes.node(index).snippet_id();
    let by_name = |name: &str| info.uniform_access_by_name(nodes, index, name);
    let layout = if sid == BuiltinId::LinearGradientBuffer.id() {
        format!(
            "px_linear_grad_layout({}, {}, {})",
            by_name("point0"),
            by_name("point1"),
            args.frag_coord
        )
    } else if sid == BuiltinId::RadialGradientBuffer.id() {
        format!(
            "px_radial_grad_layout({}, {}, {})",
            by_name("center"),
            by_name("radius"),
            args.frag_coord
        )
    } else if sid == BuiltinId::SweepGradientBuffer.id() {
        format!(
            "px_sweep_grad_layout({}, {}, {}, {})",
            by_name("center"),
            by_name("bias"),
            by_name("scale"),
            args.frag_coord
        )
    } else {
        format!(
            "px_conical_grad_layout({}, {}, {}, {}, {})",
            by_name("point0"),
            by_name("point1"),
            by_name("radius0"),
            by_name("radius1"),
            args.frag_coord
        )
    };
    format!(
        "colorize_grad_buf({}, {}, px_tile_grad({}, {layout}))",
        by_name("bufferOffset"),
        by_name("numStops"),
        by_name("tilemode")
    )
}

pub(crate) fn generate_runtime_effect_expression(
    _info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
    args: &SnippetArgs,
) -> String {
    let node = nodes.node(index);
    format!(
        "{}({}, {}, {})",
        helper_name(node.entry(), node.key_index()),
        args.frag_coord,
        args.prior_stage_output,
        args.blender_dst_color
    )
}

// ─── Preamble generators ───────────────────────────────────────────────────

/// Nodes with children get a helper that captures each child's output in a
/// local, then hands the standard arguments, uniforms, samplers and child
/// outputs to the snippet's pre-compiled implementation; leaves need no
/// preamble.
pub(crate) fn generate_default_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let entry = node.entry();
    if node.num_children() == 0 {
        return String::new();
    }
    let mut call_args: Vec<String> = Vec::new();
    if entry.needs_local_coords() {
        call_args.push("coords".to_string());
    }
    if entry.needs_prior_stage_output() {
        call_args.push("priorColor".to_string());
    }
    if entry.needs_blender_dst_color() {
        call_args.push("dstColor".to_string());
    }
    for u in entry.uniforms.iter() {
        call_args.push(info.uniform_access(nodes, index, u));
    }
    for ts in entry.samplers {
        let (tex, samp) = info.sampler_names(nodes, index, ts.name);
        call_args.push(tex);
        call_args.push(samp);
    }
    let mut body = String::new();
    for &child in node.children() {
        let args = SnippetArgs::new("priorColor", "dstColor", "coords");
        let expr = invoke_node(info, nodes, child, &args);
        let var = format!("outColor_{}", nodes.node(child).key_index());
        let _ = writeln!(body, "    let {var} = {expr};");
        call_args.push(var);
    }
    format!(
        "fn {}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n{body}    return {}({});\n}}\n",
        helper_name(entry, node.key_index()),
        entry.static_fn,
        call_args.join(", ")
    )
}

pub(crate) fn generate_local_matrix_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let matrix = info.uniform_access_by_name(nodes, index, "localMatrix");
    let args = SnippetArgs::new("priorColor", "dstColor", "newCoords");
    let child = invoke_node(info, nodes, node.children()[0], &args);
    format!(
        "fn {}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n    \
         let newCoords = ({matrix} * vec4f(coords, 0.0, 1.0)).xy;\n    \
         return {child};\n}}\n",
        helper_name(node.entry(), node.key_index())
    )
}

pub(crate) fn generate_coord_clamp_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let subset = info.uniform_access_by_name(nodes, index, "subset");
    let args = SnippetArgs::new("priorColor", "dstColor", "newCoords");
    let child = invoke_node(info, nodes, node.children()[0], &args);
    format!(
        "fn {}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n    \
         let newCoords = clamp(coords, {subset}.xy, {subset}.zw);\n    \
         return {child};\n}}\n",
        helper_name(node.entry(), node.key_index())
    )
}

/// Inner child first, outer child consumes its output.
pub(crate) fn generate_compose_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let inner = invoke_node(
        info,
        nodes,
        node.children()[0],
        &SnippetArgs::new("priorColor", "dstColor", "coords"),
    );
    let outer = invoke_node(
        info,
        nodes,
        node.children()[1],
        &SnippetArgs::new("innerColor", "dstColor", "coords"),
    );
    format!(
        "fn {}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n    \
         let innerColor = {inner};\n    \
         let outerColor = {outer};\n    \
         return outerColor;\n}}\n",
        helper_name(node.entry(), node.key_index())
    )
}

/// Children are source shader, destination shader, then the blender that
/// combines them. Both shader children see the helper's real arguments.
pub(crate) fn generate_blend_shader_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let src = invoke_node(
        info,
        nodes,
        node.children()[0],
        &SnippetArgs::new("priorColor", "dstColor", "coords"),
    );
    let dst = invoke_node(
        info,
        nodes,
        node.children()[1],
        &SnippetArgs::new("priorColor", "dstColor", "coords"),
    );
    let blended = invoke_node(
        info,
        nodes,
        node.children()[2],
        &SnippetArgs::new("srcColor", "dstColor2", "coords"),
    );
    format!(
        "fn {}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n    \
         let srcColor = {src};\n    \
         let dstColor2 = {dst};\n    \
         return {blended};\n}}\n",
        helper_name(node.entry(), node.key_index())
    )
}

pub(crate) fn generate_dst_read_sample_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let bounds = info.uniform_access_by_name(nodes, index, "dstCopyBounds");
    let (tex, samp) = info.sampler_names(nodes, index, "dstCopy");
    format!(
        "fn {}(fragCoord: vec2f) -> vec4f {{\n    \
         let bounds = {bounds};\n    \
         return textureSampleLevel({tex}, {samp}, (fragCoord - bounds.xy) * bounds.zw, 0.0);\n}}\n",
        helper_name(node.entry(), node.key_index())
    )
}

pub(crate) fn generate_dst_read_fetch_preamble(
    _info: &ShaderInfo<'_>,
    _nodes: &ShaderNodes,
    _index: NodeIndex,
) -> String {
    String::new()
}

/// Emits the shared stop-interpolation helper once per program. The stop
/// buffer is tightly packed `offset, r, g, b, a` records.
pub(crate) fn generate_gradient_buffer_preamble(
    info: &ShaderInfo<'_>,
    _nodes: &ShaderNodes,
    _index: NodeIndex,
) -> String {
    if info.gradient_helper_emitted.replace(true) {
        return String::new();
    }
    String::from(
        "fn grad_buf_color(bufferOffset: i32, i: i32) -> vec4f {\n\
         \x20   let base = u32(bufferOffset + i * 5 + 1);\n\
         \x20   return vec4f(gradientBuffer[base], gradientBuffer[base + 1u],\n\
         \x20                gradientBuffer[base + 2u], gradientBuffer[base + 3u]);\n\
         }\n\
         fn colorize_grad_buf(bufferOffset: i32, numStops: i32, t: f32) -> vec4f {\n\
         \x20   let lastStop = numStops - 1;\n\
         \x20   if (t <= gradientBuffer[u32(bufferOffset)]) {\n\
         \x20       return grad_buf_color(bufferOffset, 0);\n\
         \x20   }\n\
         \x20   if (t >= gradientBuffer[u32(bufferOffset + lastStop * 5)]) {\n\
         \x20       return grad_buf_color(bufferOffset, lastStop);\n\
         \x20   }\n\
         \x20   var lo = 0;\n\
         \x20   var hi = lastStop;\n\
         \x20   while (hi - lo > 1) {\n\
         \x20       let mid = (lo + hi) / 2;\n\
         \x20       if (t < gradientBuffer[u32(bufferOffset + mid * 5)]) {\n\
         \x20           hi = mid;\n\
         \x20       } else {\n\
         \x20           lo = mid;\n\
         \x20       }\n\
         \x20   }\n\
         \x20   let t0 = gradientBuffer[u32(bufferOffset + lo * 5)];\n\
         \x20   let t1 = gradientBuffer[u32(bufferOffset + hi * 5)];\n\
         \x20   if (t1 > t0) {\n\
         \x20       return mix(grad_buf_color(bufferOffset, lo),\n\
         \x20                  grad_buf_color(bufferOffset, hi), (t - t0) / (t1 - t0));\n\
         \x20   }\n\
         \x20   // Equal offsets form a hard step; the later stop wins.\n\
         \x20   return grad_buf_color(bufferOffset, hi);\n\
         }\n",
    )
}

// ─── Runtime-effect translation ────────────────────────────────────────────

struct RuntimeCallbacks<'a, 'b> {
    info: &'a ShaderInfo<'b>,
    nodes: &'a ShaderNodes,
    index: NodeIndex,
    uses_color_transform: bool,
    globals: String,
    functions: String,
    main_body: Option<String>,
}

impl RuntimeCallbacks<'_, '_> {
    fn cs_transform_call(&mut self, color: &str, suffix: &str) -> String {
        if !self.uses_color_transform {
            return color.to_string();
        }
        let by_name =
            |name: &str| self.info.uniform_access_by_name(self.nodes, self.index, name);
        format!(
            "px_color_space_transform({color}, {}, {}, {}, {}, {})",
            by_name(&format!("flags_{suffix}")),
            by_name(&format!("srcKind_{suffix}")),
            by_name(&format!("gamutTransform_{suffix}")),
            by_name(&format!("dstKind_{suffix}")),
            by_name(&format!("csXformCoeffs_{suffix}"))
        )
    }
}

impl PipelineCallbacks for RuntimeCallbacks<'_, '_> {
    fn declare_uniform(&mut self, name: &str) -> String {
        self.info.uniform_access_by_name(self.nodes, self.index, name)
    }

    fn define_function(&mut self, decl: &str, body: &str, is_main: bool) {
        if is_main {
            self.main_body = Some(body.to_string());
        } else {
            let _ = writeln!(self.functions, "{decl} {{\n{body}\n}}");
        }
    }

    fn declare_function(&mut self, decl: &str) {
        let _ = writeln!(self.globals, "{decl}");
    }

    fn define_struct(&mut self, definition: &str) {
        let _ = writeln!(self.globals, "{definition}");
    }

    fn declare_global(&mut self, declaration: &str) {
        let _ = writeln!(self.globals, "{declaration}");
    }

    fn sample_shader(&mut self, index: usize, coords: &str) -> String {
        let child = self.nodes.node(self.index).children()[index];
        let args = SnippetArgs::new("vec4f(0.0)", "vec4f(0.0)", coords);
        invoke_node(self.info, self.nodes, child, &args)
    }

    fn sample_color_filter(&mut self, index: usize, color: &str) -> String {
        let child = self.nodes.node(self.index).children()[index];
        let args = SnippetArgs::new(color, "vec4f(0.0)", "coords");
        invoke_node(self.info, self.nodes, child, &args)
    }

    fn sample_blender(&mut self, index: usize, src: &str, dst: &str) -> String {
        let child = self.nodes.node(self.index).children()[index];
        let args = SnippetArgs::new(src, dst, "coords");
        invoke_node(self.info, self.nodes, child, &args)
    }

    fn to_linear_srgb(&mut self, color: &str) -> String {
        self.cs_transform_call(color, "toLinear")
    }

    fn from_linear_srgb(&mut self, color: &str) -> String {
        self.cs_transform_call(color, "fromLinear")
    }

    fn mangled_name(&self, name: &str) -> String {
        format!("{name}_{}", self.nodes.node(self.index).key_index())
    }
}

pub(crate) fn generate_runtime_effect_preamble(
    info: &ShaderInfo<'_>,
    nodes: &ShaderNodes,
    index: NodeIndex,
) -> String {
    let node = nodes.node(index);
    let helper = helper_name(node.entry(), node.key_index());
    let Some(effect) = info.runtime_effect(node.snippet_id()) else {
        // Checked at construction; kept as a belt for direct preamble use.
        log::error!("no runtime effect bound for snippet id {}", node.snippet_id());
        return format!(
            "fn {helper}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n    \
             return vec4f(1.0, 0.0, 1.0, 1.0);\n}}\n"
        );
    };

    let mut callbacks = RuntimeCallbacks {
        info,
        nodes,
        index,
        uses_color_transform: effect.uses_color_transform(),
        globals: String::new(),
        functions: String::new(),
        main_body: None,
    };
    effect.translate(&mut callbacks);

    let mut out = callbacks.globals;
    out.push_str(&callbacks.functions);
    let body = callbacks.main_body.unwrap_or_else(|| {
        log::error!("runtime effect {} defined no main", node.entry().name);
        "    return vec4f(1.0, 0.0, 1.0, 1.0);".to_string()
    });
    let _ = writeln!(
        out,
        "fn {helper}(coords: vec2f, priorColor: vec4f, dstColor: vec4f) -> vec4f {{\n{body}\n}}"
    );
    out
}

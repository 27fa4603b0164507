//! Built-In Snippet Catalog
//!
//! The fixed portion of the snippet id space. Ids `0..43` are the ordinary
//! built-in operations, `43..58` are the fifteen fixed-function blend-mode
//! markers (structural placeholders that never emit code of their own),
//! `64..96` is reserved for well-known runtime effects addressed by
//! [`crate::runtime_effect::StableKey`], and user content starts at
//! [`USER_DEFINED_SNIPPET_START`].
//!
//! Every operation's executable body lives in the external pre-compiled
//! WGSL module under the `px_` prefix; the catalog only records signatures
//! and generation strategies.

use std::borrow::Cow;
use std::sync::Arc;

use crate::blend::BlendMode;
use crate::codegen::{
    generate_blend_shader_preamble, generate_compose_preamble, generate_coord_clamp_preamble,
    generate_default_expression, generate_default_preamble, generate_dst_read_fetch_expression,
    generate_dst_read_fetch_preamble, generate_dst_read_sample_expression,
    generate_dst_read_sample_preamble, generate_gradient_buffer_expression,
    generate_gradient_buffer_preamble, generate_local_matrix_preamble,
    generate_primitive_color_expression,
};
use crate::snippet::{ShaderSnippet, SnippetRequirements};
use crate::types::{ShaderType, TextureAndSampler, Uniform};

/// Ordinary built-in operations, in id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum BuiltinId {
    Error = 0,
    PriorOutput,
    SolidColor,
    RgbPaintColor,
    AlphaOnlyPaintColor,

    LinearGradient4,
    LinearGradient8,
    LinearGradientTexture,
    LinearGradientBuffer,
    RadialGradient4,
    RadialGradient8,
    RadialGradientTexture,
    RadialGradientBuffer,
    SweepGradient4,
    SweepGradient8,
    SweepGradientTexture,
    SweepGradientBuffer,
    ConicalGradient4,
    ConicalGradient8,
    ConicalGradientTexture,
    ConicalGradientBuffer,

    LocalMatrix,
    Image,
    CubicImage,
    HwImage,
    YuvImage,
    CubicYuvImage,
    HwYuvImage,
    CoordClamp,
    Dither,
    PerlinNoise,

    MatrixColorFilter,
    TableColorFilter,
    GaussianColorFilter,
    ColorSpaceXformColorFilter,

    BlendShader,
    CoeffBlender,
    BlendModeBlender,

    PrimitiveColor,
    DstReadSample,
    DstReadFetch,
    ClipShader,
    Compose,
}

/// Number of ordinary built-in operations.
pub const ORDINARY_BUILTIN_COUNT: i32 = 43;

/// First fixed-function blend-mode marker id.
pub const FIXED_FUNCTION_BLEND_START: i32 = ORDINARY_BUILTIN_COUNT;

/// Total number of built-in snippet ids (ordinary + blend markers).
pub const BUILTIN_SNIPPET_COUNT: i32 =
    FIXED_FUNCTION_BLEND_START + BlendMode::ALL.len() as i32;

/// First id addressable by a stable key. Ids between
/// [`BUILTIN_SNIPPET_COUNT`] and this value stay unassigned so the built-in
/// catalog can grow without renumbering the stable range.
pub const KNOWN_RUNTIME_EFFECT_START: i32 = 64;

/// One past the last stable-key id.
pub const KNOWN_RUNTIME_EFFECT_END: i32 = 96;

/// First id handed out to user-defined and hash-keyed runtime snippets.
pub const USER_DEFINED_SNIPPET_START: i32 = KNOWN_RUNTIME_EFFECT_END;

impl BuiltinId {
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }
}

/// Whether `id` falls in the fixed-function blend-mode marker range.
#[must_use]
pub const fn is_fixed_function_blend(id: i32) -> bool {
    id >= FIXED_FUNCTION_BLEND_START && id < BUILTIN_SNIPPET_COUNT
}

/// The snippet id marking `mode` as a fixed-function blend.
#[must_use]
pub const fn fixed_function_blend_id(mode: BlendMode) -> i32 {
    FIXED_FUNCTION_BLEND_START + mode as i32
}

/// The blend mode a fixed-function marker id stands for.
#[must_use]
pub fn blend_mode_for_id(id: i32) -> Option<BlendMode> {
    if is_fixed_function_blend(id) {
        BlendMode::from_index((id - FIXED_FUNCTION_BLEND_START) as usize)
    } else {
        None
    }
}

// ─── Uniform signatures ────────────────────────────────────────────────────

static SOLID_UNIFORMS: [Uniform; 1] = [Uniform::new("color", ShaderType::Float4)];

static PAINT_COLOR_UNIFORMS: [Uniform; 1] = [Uniform::paint_color()];

static LINEAR_GRAD_4_UNIFORMS: [Uniform; 5] = [
    Uniform::array("colors", ShaderType::Float4, 4),
    Uniform::new("offsets", ShaderType::Float4),
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("tilemode", ShaderType::Int),
];

static LINEAR_GRAD_8_UNIFORMS: [Uniform; 5] = [
    Uniform::array("colors", ShaderType::Float4, 8),
    Uniform::array("offsets", ShaderType::Float4, 2),
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("tilemode", ShaderType::Int),
];

static LINEAR_GRAD_TEX_UNIFORMS: [Uniform; 4] = [
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static LINEAR_GRAD_BUF_UNIFORMS: [Uniform; 5] = [
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("bufferOffset", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static RADIAL_GRAD_4_UNIFORMS: [Uniform; 5] = [
    Uniform::array("colors", ShaderType::Float4, 4),
    Uniform::new("offsets", ShaderType::Float4),
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("radius", ShaderType::Float),
    Uniform::new("tilemode", ShaderType::Int),
];

static RADIAL_GRAD_8_UNIFORMS: [Uniform; 5] = [
    Uniform::array("colors", ShaderType::Float4, 8),
    Uniform::array("offsets", ShaderType::Float4, 2),
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("radius", ShaderType::Float),
    Uniform::new("tilemode", ShaderType::Int),
];

static RADIAL_GRAD_TEX_UNIFORMS: [Uniform; 4] = [
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("radius", ShaderType::Float),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static RADIAL_GRAD_BUF_UNIFORMS: [Uniform; 5] = [
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("radius", ShaderType::Float),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("bufferOffset", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static SWEEP_GRAD_4_UNIFORMS: [Uniform; 6] = [
    Uniform::array("colors", ShaderType::Float4, 4),
    Uniform::new("offsets", ShaderType::Float4),
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("bias", ShaderType::Float),
    Uniform::new("scale", ShaderType::Float),
    Uniform::new("tilemode", ShaderType::Int),
];

static SWEEP_GRAD_8_UNIFORMS: [Uniform; 6] = [
    Uniform::array("colors", ShaderType::Float4, 8),
    Uniform::array("offsets", ShaderType::Float4, 2),
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("bias", ShaderType::Float),
    Uniform::new("scale", ShaderType::Float),
    Uniform::new("tilemode", ShaderType::Int),
];

static SWEEP_GRAD_TEX_UNIFORMS: [Uniform; 5] = [
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("bias", ShaderType::Float),
    Uniform::new("scale", ShaderType::Float),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static SWEEP_GRAD_BUF_UNIFORMS: [Uniform; 6] = [
    Uniform::new("center", ShaderType::Float2),
    Uniform::new("bias", ShaderType::Float),
    Uniform::new("scale", ShaderType::Float),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("bufferOffset", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static CONICAL_GRAD_4_UNIFORMS: [Uniform; 7] = [
    Uniform::array("colors", ShaderType::Float4, 4),
    Uniform::new("offsets", ShaderType::Float4),
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("radius0", ShaderType::Float),
    Uniform::new("radius1", ShaderType::Float),
    Uniform::new("tilemode", ShaderType::Int),
];

static CONICAL_GRAD_8_UNIFORMS: [Uniform; 7] = [
    Uniform::array("colors", ShaderType::Float4, 8),
    Uniform::array("offsets", ShaderType::Float4, 2),
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("radius0", ShaderType::Float),
    Uniform::new("radius1", ShaderType::Float),
    Uniform::new("tilemode", ShaderType::Int),
];

static CONICAL_GRAD_TEX_UNIFORMS: [Uniform; 6] = [
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("radius0", ShaderType::Float),
    Uniform::new("radius1", ShaderType::Float),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static CONICAL_GRAD_BUF_UNIFORMS: [Uniform; 7] = [
    Uniform::new("point0", ShaderType::Float2),
    Uniform::new("point1", ShaderType::Float2),
    Uniform::new("radius0", ShaderType::Float),
    Uniform::new("radius1", ShaderType::Float),
    Uniform::new("numStops", ShaderType::Int),
    Uniform::new("bufferOffset", ShaderType::Int),
    Uniform::new("tilemode", ShaderType::Int),
];

static LOCAL_MATRIX_UNIFORMS: [Uniform; 1] =
    [Uniform::new("localMatrix", ShaderType::Float4x4)];

static IMAGE_UNIFORMS: [Uniform; 5] = [
    Uniform::new("invImgSize", ShaderType::Float2),
    Uniform::new("subset", ShaderType::Float4),
    Uniform::new("tilemodeX", ShaderType::Int),
    Uniform::new("tilemodeY", ShaderType::Int),
    Uniform::new("filterMode", ShaderType::Int),
];

static CUBIC_IMAGE_UNIFORMS: [Uniform; 5] = [
    Uniform::new("invImgSize", ShaderType::Float2),
    Uniform::new("subset", ShaderType::Float4),
    Uniform::new("tilemodeX", ShaderType::Int),
    Uniform::new("tilemodeY", ShaderType::Int),
    Uniform::new("cubicCoeffs", ShaderType::Half4x4),
];

static HW_IMAGE_UNIFORMS: [Uniform; 1] = [Uniform::new("invImgSize", ShaderType::Float2)];

static YUV_IMAGE_UNIFORMS: [Uniform; 11] = [
    Uniform::new("invImgSizeY", ShaderType::Float2),
    Uniform::new("invImgSizeUV", ShaderType::Float2),
    Uniform::new("subset", ShaderType::Float4),
    Uniform::new("linearFilterUVInset", ShaderType::Float2),
    Uniform::new("tilemodeX", ShaderType::Int),
    Uniform::new("tilemodeY", ShaderType::Int),
    Uniform::new("filterMode", ShaderType::Int),
    Uniform::new("channelSelectY", ShaderType::Half4),
    Uniform::new("channelSelectU", ShaderType::Half4),
    Uniform::new("channelSelectV", ShaderType::Half4),
    Uniform::new("channelSelectA", ShaderType::Half4),
];

static CUBIC_YUV_IMAGE_UNIFORMS: [Uniform; 10] = [
    Uniform::new("invImgSizeY", ShaderType::Float2),
    Uniform::new("invImgSizeUV", ShaderType::Float2),
    Uniform::new("subset", ShaderType::Float4),
    Uniform::new("tilemodeX", ShaderType::Int),
    Uniform::new("tilemodeY", ShaderType::Int),
    Uniform::new("cubicCoeffs", ShaderType::Half4x4),
    Uniform::new("channelSelectY", ShaderType::Half4),
    Uniform::new("channelSelectU", ShaderType::Half4),
    Uniform::new("channelSelectV", ShaderType::Half4),
    Uniform::new("channelSelectA", ShaderType::Half4),
];

static HW_YUV_IMAGE_UNIFORMS: [Uniform; 6] = [
    Uniform::new("invImgSizeY", ShaderType::Float2),
    Uniform::new("invImgSizeUV", ShaderType::Float2),
    Uniform::new("channelSelectY", ShaderType::Half4),
    Uniform::new("channelSelectU", ShaderType::Half4),
    Uniform::new("channelSelectV", ShaderType::Half4),
    Uniform::new("channelSelectA", ShaderType::Half4),
];

static COORD_CLAMP_UNIFORMS: [Uniform; 1] = [Uniform::new("subset", ShaderType::Float4)];

static DITHER_UNIFORMS: [Uniform; 1] = [Uniform::new("range", ShaderType::Half)];

static PERLIN_NOISE_UNIFORMS: [Uniform; 5] = [
    Uniform::new("baseFrequency", ShaderType::Float2),
    Uniform::new("stitchData", ShaderType::Float2),
    Uniform::new("noiseType", ShaderType::Int),
    Uniform::new("numOctaves", ShaderType::Int),
    Uniform::new("stitching", ShaderType::Int),
];

static MATRIX_CF_UNIFORMS: [Uniform; 4] = [
    Uniform::new("matrix", ShaderType::Float4x4),
    Uniform::new("translate", ShaderType::Float4),
    Uniform::new("inHSLA", ShaderType::Int),
    Uniform::new("clampRGB", ShaderType::Int),
];

static CS_XFORM_CF_UNIFORMS: [Uniform; 5] = [
    Uniform::new("flags", ShaderType::Int),
    Uniform::new("srcKind", ShaderType::Int),
    Uniform::new("gamutTransform", ShaderType::Half3x3),
    Uniform::new("dstKind", ShaderType::Int),
    Uniform::new("csXformCoeffs", ShaderType::Half4x4),
];

static COEFF_BLENDER_UNIFORMS: [Uniform; 1] = [Uniform::new("coeffs", ShaderType::Half4)];

static BLEND_MODE_BLENDER_UNIFORMS: [Uniform; 1] =
    [Uniform::new("blendMode", ShaderType::Int)];

static DST_READ_SAMPLE_UNIFORMS: [Uniform; 1] =
    [Uniform::new("dstCopyBounds", ShaderType::Float4)];

static IMAGE_SAMPLERS: [TextureAndSampler; 1] = [TextureAndSampler::new("image")];
static GRADIENT_TEX_SAMPLERS: [TextureAndSampler; 1] = [TextureAndSampler::new("colorStops")];
static DITHER_SAMPLERS: [TextureAndSampler; 1] = [TextureAndSampler::new("ditherLUT")];
static PERLIN_SAMPLERS: [TextureAndSampler; 2] = [
    TextureAndSampler::new("permutations"),
    TextureAndSampler::new("noise"),
];
static TABLE_CF_SAMPLERS: [TextureAndSampler; 1] = [TextureAndSampler::new("table")];
static YUV_SAMPLERS: [TextureAndSampler; 4] = [
    TextureAndSampler::new("planeY"),
    TextureAndSampler::new("planeU"),
    TextureAndSampler::new("planeV"),
    TextureAndSampler::new("planeA"),
];
static DST_COPY_SAMPLERS: [TextureAndSampler; 1] = [TextureAndSampler::new("dstCopy")];

// ─── Table construction ────────────────────────────────────────────────────

fn snippet(
    name: &'static str,
    uniforms: &'static [Uniform],
    requirements: SnippetRequirements,
    samplers: &'static [TextureAndSampler],
    static_fn: &'static str,
    num_children: u8,
) -> Arc<ShaderSnippet> {
    Arc::new(ShaderSnippet {
        name,
        uniforms: Cow::Borrowed(uniforms),
        requirements,
        samplers,
        static_fn,
        expression: generate_default_expression,
        preamble: generate_default_preamble,
        num_children,
    })
}

/// Builds the fixed snippet table, indexed by built-in id.
pub(crate) fn make_builtin_table() -> Box<[Arc<ShaderSnippet>]> {
    use SnippetRequirements as Req;

    let leaf = |name: &'static str,
                uniforms: &'static [Uniform],
                samplers: &'static [TextureAndSampler],
                static_fn: &'static str| {
        snippet(name, uniforms, Req::LOCAL_COORDS, samplers, static_fn, 0)
    };
    let color_filter = |name: &'static str,
                        uniforms: &'static [Uniform],
                        samplers: &'static [TextureAndSampler],
                        static_fn: &'static str| {
        snippet(name, uniforms, Req::PRIOR_STAGE_OUTPUT, samplers, static_fn, 0)
    };
    let buffer_gradient = |name: &'static str,
                           uniforms: &'static [Uniform],
                           static_fn: &'static str| {
        Arc::new(ShaderSnippet {
            name,
            uniforms: Cow::Borrowed(uniforms),
            requirements: Req::LOCAL_COORDS | Req::GRADIENT_BUFFER,
            samplers: &[],
            static_fn,
            expression: generate_gradient_buffer_expression,
            preamble: generate_gradient_buffer_preamble,
            num_children: 0,
        })
    };

    let mut table: Vec<Arc<ShaderSnippet>> = vec![
        snippet("Error", &[], Req::empty(), &[], "px_error", 0),
        snippet(
            "Passthrough",
            &[],
            Req::PRIOR_STAGE_OUTPUT,
            &[],
            "px_passthrough",
            0,
        ),
        snippet("SolidColor", &SOLID_UNIFORMS, Req::empty(), &[], "px_solid_shader", 0),
        snippet(
            "RGBPaintColor",
            &PAINT_COLOR_UNIFORMS,
            Req::empty(),
            &[],
            "px_rgb_opaque",
            0,
        ),
        snippet(
            "AlphaOnlyPaintColor",
            &PAINT_COLOR_UNIFORMS,
            Req::empty(),
            &[],
            "px_alpha_only",
            0,
        ),
        leaf("LinearGradient4", &LINEAR_GRAD_4_UNIFORMS, &[], "px_linear_grad_4"),
        leaf("LinearGradient8", &LINEAR_GRAD_8_UNIFORMS, &[], "px_linear_grad_8"),
        leaf(
            "LinearGradientTexture",
            &LINEAR_GRAD_TEX_UNIFORMS,
            &GRADIENT_TEX_SAMPLERS,
            "px_linear_grad_tex",
        ),
        buffer_gradient("LinearGradientBuffer", &LINEAR_GRAD_BUF_UNIFORMS, "px_linear_grad_buf"),
        leaf("RadialGradient4", &RADIAL_GRAD_4_UNIFORMS, &[], "px_radial_grad_4"),
        leaf("RadialGradient8", &RADIAL_GRAD_8_UNIFORMS, &[], "px_radial_grad_8"),
        leaf(
            "RadialGradientTexture",
            &RADIAL_GRAD_TEX_UNIFORMS,
            &GRADIENT_TEX_SAMPLERS,
            "px_radial_grad_tex",
        ),
        buffer_gradient("RadialGradientBuffer", &RADIAL_GRAD_BUF_UNIFORMS, "px_radial_grad_buf"),
        leaf("SweepGradient4", &SWEEP_GRAD_4_UNIFORMS, &[], "px_sweep_grad_4"),
        leaf("SweepGradient8", &SWEEP_GRAD_8_UNIFORMS, &[], "px_sweep_grad_8"),
        leaf(
            "SweepGradientTexture",
            &SWEEP_GRAD_TEX_UNIFORMS,
            &GRADIENT_TEX_SAMPLERS,
            "px_sweep_grad_tex",
        ),
        buffer_gradient("SweepGradientBuffer", &SWEEP_GRAD_BUF_UNIFORMS, "px_sweep_grad_buf"),
        leaf("ConicalGradient4", &CONICAL_GRAD_4_UNIFORMS, &[], "px_conical_grad_4"),
        leaf("ConicalGradient8", &CONICAL_GRAD_8_UNIFORMS, &[], "px_conical_grad_8"),
        leaf(
            "ConicalGradientTexture",
            &CONICAL_GRAD_TEX_UNIFORMS,
            &GRADIENT_TEX_SAMPLERS,
            "px_conical_grad_tex",
        ),
        buffer_gradient(
            "ConicalGradientBuffer",
            &CONICAL_GRAD_BUF_UNIFORMS,
            "px_conical_grad_buf",
        ),
        Arc::new(ShaderSnippet {
            name: "LocalMatrixShader",
            uniforms: Cow::Borrowed(&LOCAL_MATRIX_UNIFORMS),
            requirements: Req::LOCAL_COORDS,
            samplers: &[],
            static_fn: "",
            expression: generate_default_expression,
            preamble: generate_local_matrix_preamble,
            num_children: 1,
        }),
        leaf("ImageShader", &IMAGE_UNIFORMS, &IMAGE_SAMPLERS, "px_image_shader"),
        leaf(
            "CubicImageShader",
            &CUBIC_IMAGE_UNIFORMS,
            &IMAGE_SAMPLERS,
            "px_cubic_image_shader",
        ),
        leaf("HWImageShader", &HW_IMAGE_UNIFORMS, &IMAGE_SAMPLERS, "px_hw_image_shader"),
        leaf("YUVImageShader", &YUV_IMAGE_UNIFORMS, &YUV_SAMPLERS, "px_yuv_image_shader"),
        leaf(
            "CubicYUVImageShader",
            &CUBIC_YUV_IMAGE_UNIFORMS,
            &YUV_SAMPLERS,
            "px_cubic_yuv_image_shader",
        ),
        leaf(
            "HWYUVImageShader",
            &HW_YUV_IMAGE_UNIFORMS,
            &YUV_SAMPLERS,
            "px_hw_yuv_image_shader",
        ),
        Arc::new(ShaderSnippet {
            name: "CoordClampShader",
            uniforms: Cow::Borrowed(&COORD_CLAMP_UNIFORMS),
            requirements: Req::LOCAL_COORDS,
            samplers: &[],
            static_fn: "",
            expression: generate_default_expression,
            preamble: generate_coord_clamp_preamble,
            num_children: 1,
        }),
        leaf("DitherShader", &DITHER_UNIFORMS, &DITHER_SAMPLERS, "px_dither_shader"),
        leaf(
            "PerlinNoiseShader",
            &PERLIN_NOISE_UNIFORMS,
            &PERLIN_SAMPLERS,
            "px_perlin_noise_shader",
        ),
        color_filter(
            "MatrixColorFilter",
            &MATRIX_CF_UNIFORMS,
            &[],
            "px_matrix_colorfilter",
        ),
        color_filter(
            "TableColorFilter",
            &[],
            &TABLE_CF_SAMPLERS,
            "px_table_colorfilter",
        ),
        color_filter("GaussianColorFilter", &[], &[], "px_gaussian_colorfilter"),
        color_filter(
            "ColorSpaceTransformColorFilter",
            &CS_XFORM_CF_UNIFORMS,
            &[],
            "px_color_space_transform",
        ),
        Arc::new(ShaderSnippet {
            name: "BlendShader",
            uniforms: Cow::Borrowed(&[]),
            requirements: Req::empty(),
            samplers: &[],
            static_fn: "",
            expression: generate_default_expression,
            preamble: generate_blend_shader_preamble,
            num_children: 3,
        }),
        snippet(
            "CoeffBlender",
            &COEFF_BLENDER_UNIFORMS,
            Req::PRIOR_STAGE_OUTPUT | Req::BLENDER_DST_COLOR,
            &[],
            "px_coeff_blend",
            0,
        ),
        snippet(
            "BlendModeBlender",
            &BLEND_MODE_BLENDER_UNIFORMS,
            Req::PRIOR_STAGE_OUTPUT | Req::BLENDER_DST_COLOR,
            &[],
            "px_blend",
            0,
        ),
        Arc::new(ShaderSnippet {
            name: "PrimitiveColor",
            uniforms: Cow::Borrowed(&[]),
            requirements: Req::empty(),
            samplers: &[],
            static_fn: "",
            expression: generate_primitive_color_expression,
            preamble: generate_default_preamble,
            num_children: 0,
        }),
        Arc::new(ShaderSnippet {
            name: "DstReadSample",
            uniforms: Cow::Borrowed(&DST_READ_SAMPLE_UNIFORMS),
            requirements: Req::SURFACE_COLOR,
            samplers: &DST_COPY_SAMPLERS,
            static_fn: "",
            expression: generate_dst_read_sample_expression,
            preamble: generate_dst_read_sample_preamble,
            num_children: 0,
        }),
        Arc::new(ShaderSnippet {
            name: "DstReadFetch",
            uniforms: Cow::Borrowed(&[]),
            requirements: Req::SURFACE_COLOR,
            samplers: &[],
            static_fn: "",
            expression: generate_dst_read_fetch_expression,
            preamble: generate_dst_read_fetch_preamble,
            num_children: 0,
        }),
        snippet("ClipShader", &[], Req::empty(), &[], "px_clip_shader", 1),
        Arc::new(ShaderSnippet {
            name: "Compose",
            uniforms: Cow::Borrowed(&[]),
            requirements: Req::empty(),
            samplers: &[],
            static_fn: "",
            expression: generate_default_expression,
            preamble: generate_compose_preamble,
            num_children: 2,
        }),
    ];
    debug_assert_eq!(table.len(), ORDINARY_BUILTIN_COUNT as usize);

    for mode in BlendMode::ALL {
        table.push(snippet(
            mode.fixed_function_name(),
            &[],
            SnippetRequirements::empty(),
            &[],
            "",
            0,
        ));
    }
    debug_assert_eq!(table.len(), BUILTIN_SNIPPET_COUNT as usize);

    table.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_ranges_do_not_overlap() {
        assert!(BUILTIN_SNIPPET_COUNT <= KNOWN_RUNTIME_EFFECT_START);
        assert!(KNOWN_RUNTIME_EFFECT_START < KNOWN_RUNTIME_EFFECT_END);
        assert_eq!(USER_DEFINED_SNIPPET_START, KNOWN_RUNTIME_EFFECT_END);
    }

    #[test]
    fn blend_marker_ids_round_trip() {
        for mode in BlendMode::ALL {
            let id = fixed_function_blend_id(mode);
            assert!(is_fixed_function_blend(id));
            assert_eq!(blend_mode_for_id(id), Some(mode));
        }
        assert!(!is_fixed_function_blend(BuiltinId::Compose.id()));
        assert_eq!(blend_mode_for_id(BuiltinId::SolidColor.id()), None);
    }

    #[test]
    fn table_is_indexed_by_id() {
        let table = make_builtin_table();
        assert_eq!(table.len(), BUILTIN_SNIPPET_COUNT as usize);
        assert_eq!(table[BuiltinId::SolidColor.id() as usize].name, "SolidColor");
        assert_eq!(table[BuiltinId::Compose.id() as usize].num_children, 2);
        assert_eq!(
            table[fixed_function_blend_id(crate::blend::BlendMode::SrcOver) as usize]
                .num_children,
            0
        );
    }
}

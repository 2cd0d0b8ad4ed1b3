/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The context state tracker: the single source of truth for every
//! queryable piece of WebGL context state. Get-queries are answered
//! from this record without a driver round-trip; the command
//! translator is the only mutator.

use bitflags::bitflags;
use euclid::default::{Point2D, Rect, Size2D};
use webgl_traits::constants as gl;
use webgl_traits::{BufferId, FramebufferId, ProgramId, RenderbufferId, TextureId, WebGLError,
                   WebGLResult};

bitflags! {
    /// The capabilities toggled by `enable`/`disable`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct CapFlags: u16 {
        const BLEND = 1 << 0;
        const CULL_FACE = 1 << 1;
        const DEPTH_TEST = 1 << 2;
        const DITHER = 1 << 3;
        const POLYGON_OFFSET_FILL = 1 << 4;
        const SAMPLE_ALPHA_TO_COVERAGE = 1 << 5;
        const SAMPLE_COVERAGE = 1 << 6;
        const SCISSOR_TEST = 1 << 7;
        const STENCIL_TEST = 1 << 8;
    }
}

impl CapFlags {
    pub fn from_gl_constant(cap: u32) -> WebGLResult<CapFlags> {
        Ok(match cap {
            gl::BLEND => CapFlags::BLEND,
            gl::CULL_FACE => CapFlags::CULL_FACE,
            gl::DEPTH_TEST => CapFlags::DEPTH_TEST,
            gl::DITHER => CapFlags::DITHER,
            gl::POLYGON_OFFSET_FILL => CapFlags::POLYGON_OFFSET_FILL,
            gl::SAMPLE_ALPHA_TO_COVERAGE => CapFlags::SAMPLE_ALPHA_TO_COVERAGE,
            gl::SAMPLE_COVERAGE => CapFlags::SAMPLE_COVERAGE,
            gl::SCISSOR_TEST => CapFlags::SCISSOR_TEST,
            gl::STENCIL_TEST => CapFlags::STENCIL_TEST,
            _ => return Err(WebGLError::InvalidEnum),
        })
    }
}

/// The texture bindings of one texture unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextureUnit {
    pub bound_2d: Option<TextureId>,
    pub bound_cube_map: Option<TextureId>,
}

/// Per-face stencil pipeline state.
#[derive(Clone, Copy, Debug)]
pub struct StencilSide {
    pub func: u32,
    pub reference: i32,
    pub value_mask: u32,
    pub write_mask: u32,
    pub fail_op: u32,
    pub depth_fail_op: u32,
    pub depth_pass_op: u32,
}

impl Default for StencilSide {
    fn default() -> StencilSide {
        StencilSide {
            func: gl::ALWAYS,
            reference: 0,
            value_mask: !0,
            write_mask: !0,
            fail_op: gl::KEEP,
            depth_fail_op: gl::KEEP,
            depth_pass_op: gl::KEEP,
        }
    }
}

/// The recorded layout of one vertex attribute, for `get_vertex_attrib`
/// queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct VertexAttrib {
    pub enabled: bool,
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: u32,
    pub buffer: Option<BufferId>,
}

/// All queryable context state. One instance per context; cloned
/// wholesale by `snapshot` and written back by `restore`.
#[derive(Clone, Debug)]
pub struct ContextState {
    // Binding points.
    pub array_buffer: Option<BufferId>,
    pub element_array_buffer: Option<BufferId>,
    pub framebuffer: Option<FramebufferId>,
    pub renderbuffer: Option<RenderbufferId>,
    pub current_program: Option<ProgramId>,
    pub texture_units: Vec<TextureUnit>,
    pub active_unit: u32,

    // Capabilities.
    pub capabilities: CapFlags,

    // Rasterizer and per-fragment state.
    pub viewport: Rect<i32>,
    pub scissor: Rect<i32>,
    pub clear_color: (f32, f32, f32, f32),
    pub clear_depth: f64,
    pub clear_stencil: i32,
    pub color_write_mask: [bool; 4],
    pub depth_write_mask: bool,
    pub depth_func: u32,
    pub depth_range: (f64, f64),
    pub stencil_front: StencilSide,
    pub stencil_back: StencilSide,
    pub blend_color: (f32, f32, f32, f32),
    pub blend_equation_rgb: u32,
    pub blend_equation_alpha: u32,
    pub blend_src_rgb: u32,
    pub blend_dst_rgb: u32,
    pub blend_src_alpha: u32,
    pub blend_dst_alpha: u32,
    pub cull_face_mode: u32,
    pub front_face: u32,
    pub line_width: f32,
    pub polygon_offset: (f32, f32),
    pub sample_coverage: (f32, bool),
    pub generate_mipmap_hint: u32,

    // Pixel storage.
    pub unpack_alignment: i32,
    pub pack_alignment: i32,
    pub unpack_flip_y: bool,
    pub unpack_premultiply_alpha: bool,
    pub unpack_colorspace_conversion: u32,

    // Vertex attribute layouts.
    pub vertex_attribs: Vec<VertexAttrib>,
}

impl ContextState {
    /// The spec-defined default state for a fresh context whose
    /// drawing buffer has the given size.
    pub fn new(size: Size2D<i32>, texture_units: u32, vertex_attribs: u32) -> ContextState {
        let full_buffer = Rect::new(Point2D::zero(), size);
        ContextState {
            array_buffer: None,
            element_array_buffer: None,
            framebuffer: None,
            renderbuffer: None,
            current_program: None,
            texture_units: vec![TextureUnit::default(); texture_units as usize],
            active_unit: 0,
            capabilities: CapFlags::DITHER,
            viewport: full_buffer,
            scissor: full_buffer,
            clear_color: (0., 0., 0., 0.),
            clear_depth: 1.,
            clear_stencil: 0,
            color_write_mask: [true, true, true, true],
            depth_write_mask: true,
            depth_func: gl::LESS,
            depth_range: (0., 1.),
            stencil_front: StencilSide::default(),
            stencil_back: StencilSide::default(),
            blend_color: (0., 0., 0., 0.),
            blend_equation_rgb: gl::FUNC_ADD,
            blend_equation_alpha: gl::FUNC_ADD,
            blend_src_rgb: gl::ONE,
            blend_dst_rgb: gl::ZERO,
            blend_src_alpha: gl::ONE,
            blend_dst_alpha: gl::ZERO,
            cull_face_mode: gl::BACK,
            front_face: gl::CCW,
            line_width: 1.,
            polygon_offset: (0., 0.),
            sample_coverage: (1., false),
            generate_mipmap_hint: gl::DONT_CARE,
            unpack_alignment: 4,
            pack_alignment: 4,
            unpack_flip_y: false,
            unpack_premultiply_alpha: false,
            unpack_colorspace_conversion: gl::BROWSER_DEFAULT_WEBGL,
            vertex_attribs: vec![VertexAttrib::default(); vertex_attribs as usize],
        }
    }

    pub fn active_unit(&self) -> &TextureUnit {
        &self.texture_units[self.active_unit as usize]
    }

    pub fn active_unit_mut(&mut self) -> &mut TextureUnit {
        &mut self.texture_units[self.active_unit as usize]
    }

    /// The texture bound to the given texture target on the active
    /// unit.
    pub fn bound_texture(&self, target: u32) -> Option<TextureId> {
        match target {
            gl::TEXTURE_2D => self.active_unit().bound_2d,
            gl::TEXTURE_CUBE_MAP => self.active_unit().bound_cube_map,
            _ => None,
        }
    }

    /// An owned copy of the full state record.
    pub fn snapshot(&self) -> ContextState {
        self.clone()
    }

    /// Replaces the full state record with a previously taken
    /// snapshot.
    pub fn restore(&mut self, snapshot: ContextState) {
        *self = snapshot;
    }
}

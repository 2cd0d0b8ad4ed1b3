/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The seam between the command translator and the GPU driver.
//!
//! Object names on this interface are raw driver-side `GLuint`s; the
//! handle table owns the mapping from caller-visible handles to these
//! names. The production implementation lives in `backend`; tests
//! substitute a recording mock.

use euclid::default::Size2D;

/// The WebGL1-scoped driver command surface.
///
/// Creation methods return the driver name, or 0 on failure, matching
/// the underlying `glGen*`/`glCreate*` contract. All other methods
/// assume validated arguments; validation belongs to the translator.
pub trait Driver {
    // Object creation and destruction.
    fn create_buffer(&self) -> u32;
    fn create_texture(&self) -> u32;
    fn create_framebuffer(&self) -> u32;
    fn create_renderbuffer(&self) -> u32;
    fn create_shader(&self, shader_type: u32) -> u32;
    fn create_program(&self) -> u32;
    fn delete_buffer(&self, buffer: u32);
    fn delete_texture(&self, texture: u32);
    fn delete_framebuffer(&self, framebuffer: u32);
    fn delete_renderbuffer(&self, renderbuffer: u32);
    fn delete_shader(&self, shader: u32);
    fn delete_program(&self, program: u32);

    // Binding. A name of 0 unbinds.
    fn bind_buffer(&self, target: u32, buffer: u32);
    fn bind_texture(&self, target: u32, texture: u32);
    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32);
    fn bind_framebuffer(&self, target: u32, framebuffer: u32);
    fn active_texture(&self, unit: u32);
    fn use_program(&self, program: u32);

    // Buffer data.
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    fn buffer_data_uninitialized(&self, target: u32, size: isize, usage: u32);
    fn buffer_sub_data(&self, target: u32, offset: isize, data: &[u8]);

    // Texture data.
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    );
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        pixels: &[u8],
    );
    #[allow(clippy::too_many_arguments)]
    fn copy_tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        border: i32,
    );
    #[allow(clippy::too_many_arguments)]
    fn copy_tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    );
    fn tex_parameter_i(&self, target: u32, pname: u32, value: i32);
    fn tex_parameter_f(&self, target: u32, pname: u32, value: f32);
    fn generate_mipmap(&self, target: u32);
    fn pixel_store_i(&self, pname: u32, value: i32);

    // Renderbuffers and framebuffers.
    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32);
    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, rb_target: u32, rb: u32);
    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        tex_target: u32,
        texture: u32,
        level: i32,
    );
    fn check_framebuffer_status(&self, target: u32) -> u32;

    // Shaders and programs.
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn shader_precision_format(&self, shader_type: u32, precision_type: u32) -> (i32, i32, i32);
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn bind_attrib_location(&self, program: u32, index: u32, name: &str);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn validate_program(&self, program: u32);
    fn program_validate_status(&self, program: u32) -> bool;
    fn active_attrib_count(&self, program: u32) -> i32;
    fn active_uniform_count(&self, program: u32) -> i32;
    /// Returns (size, type, name) for the active attribute at `index`.
    fn active_attrib(&self, program: u32, index: u32) -> (i32, u32, String);
    /// Returns (size, type, name) for the active uniform at `index`.
    fn active_uniform(&self, program: u32, index: u32) -> (i32, u32, String);
    fn uniform_location(&self, program: u32, name: &str) -> i32;
    fn attrib_location(&self, program: u32, name: &str) -> i32;

    // Uniforms, applied to the current program.
    fn uniform_1f(&self, location: i32, x: f32);
    fn uniform_2f(&self, location: i32, x: f32, y: f32);
    fn uniform_3f(&self, location: i32, x: f32, y: f32, z: f32);
    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32);
    fn uniform_1i(&self, location: i32, x: i32);
    fn uniform_2i(&self, location: i32, x: i32, y: i32);
    fn uniform_3i(&self, location: i32, x: i32, y: i32, z: i32);
    fn uniform_4i(&self, location: i32, x: i32, y: i32, z: i32, w: i32);
    fn uniform_1fv(&self, location: i32, values: &[f32]);
    fn uniform_2fv(&self, location: i32, values: &[f32]);
    fn uniform_3fv(&self, location: i32, values: &[f32]);
    fn uniform_4fv(&self, location: i32, values: &[f32]);
    fn uniform_1iv(&self, location: i32, values: &[i32]);
    fn uniform_2iv(&self, location: i32, values: &[i32]);
    fn uniform_3iv(&self, location: i32, values: &[i32]);
    fn uniform_4iv(&self, location: i32, values: &[i32]);
    fn uniform_matrix_2fv(&self, location: i32, values: &[f32]);
    fn uniform_matrix_3fv(&self, location: i32, values: &[f32]);
    fn uniform_matrix_4fv(&self, location: i32, values: &[f32]);

    // Vertex attributes.
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: u32,
    );
    fn vertex_attrib_4f(&self, index: u32, x: f32, y: f32, z: f32, w: f32);
    fn current_vertex_attrib(&self, index: u32) -> [f32; 4];

    // Drawing and clearing.
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: u32);
    fn clear(&self, mask: u32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&self, value: f64);
    fn clear_stencil(&self, value: i32);

    // Pipeline state.
    fn enable(&self, cap: u32);
    fn disable(&self, cap: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn blend_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn blend_equation(&self, mode: u32);
    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32);
    fn blend_func(&self, src: u32, dst: u32);
    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool);
    fn depth_mask(&self, flag: bool);
    fn stencil_mask(&self, mask: u32);
    fn stencil_mask_separate(&self, face: u32, mask: u32);
    fn depth_func(&self, func: u32);
    fn depth_range(&self, near: f64, far: f64);
    fn front_face(&self, mode: u32);
    fn cull_face(&self, mode: u32);
    fn line_width(&self, width: f32);
    fn polygon_offset(&self, factor: f32, units: f32);
    fn sample_coverage(&self, value: f32, invert: bool);
    fn hint(&self, target: u32, mode: u32);
    fn stencil_func(&self, func: u32, reference: i32, mask: u32);
    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32);
    fn stencil_op(&self, fail: u32, zfail: u32, zpass: u32);
    fn stencil_op_separate(&self, face: u32, fail: u32, zfail: u32, zpass: u32);

    // Pixel reads and synchronization.
    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        pixel_type: u32,
    ) -> Vec<u8>;
    fn flush(&self);
    fn finish(&self);

    // Queries.
    fn get_error(&self) -> u32;
    fn get_integer_v(&self, pname: u32, result: &mut [i32]);
    fn get_float_v(&self, pname: u32, result: &mut [f32]);
    fn get_string(&self, pname: u32) -> String;
    fn renderbuffer_parameter_iv(&self, target: u32, pname: u32) -> i32;
    fn tex_parameter_iv(&self, target: u32, pname: u32) -> i32;

    // Drawing surface management.
    fn drawing_buffer_size(&self) -> Size2D<i32>;
    fn default_framebuffer(&self) -> u32;
    fn resize_surface(&mut self, size: Size2D<u32>) -> Result<(), String>;

    // Teardown, in reverse-acquisition order: the surface goes first,
    // then the context. Both must tolerate being called exactly once.
    fn destroy_surface(&mut self);
    fn destroy_context(&mut self);
}

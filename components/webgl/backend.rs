/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The production driver backend: a headless drawing surface created
//! through `surfman`, with GL dispatch through `sparkle` so the same
//! code drives both desktop GL and GLES.

use std::ptr;
use std::rc::Rc;

use euclid::default::Size2D;
use log::debug;
use sparkle::gl;
use sparkle::gl::Gl;
use surfman::{
    Connection, Context, ContextAttributeFlags, ContextAttributes, Device, GLApi, GLVersion,
    SurfaceAccess, SurfaceType,
};
use webgl_traits::GLContextAttributes;

use crate::context::WebGLContext;
use crate::driver::Driver;

/// A driver context bound to an offscreen surfman surface.
pub struct HeadlessDriver {
    device: Device,
    context: Context,
    gl: Rc<Gl>,
    surface_destroyed: bool,
    context_destroyed: bool,
}

impl HeadlessDriver {
    /// Creates the device, context and initial drawing surface, and
    /// makes the context current.
    pub fn new(size: Size2D<u32>, attributes: &GLContextAttributes) -> Result<HeadlessDriver, String> {
        let connection =
            Connection::new().map_err(|err| format!("Failed to open connection: {:?}", err))?;
        // A performance-caveat-sensitive caller refuses software
        // rasterizers.
        let adapter = if attributes.fail_if_major_performance_caveat {
            connection
                .create_hardware_adapter()
                .map_err(|err| format!("Failed to find a hardware adapter: {:?}", err))?
        } else {
            connection
                .create_adapter()
                .map_err(|err| format!("Failed to create adapter: {:?}", err))?
        };
        let mut device = connection
            .create_device(&adapter)
            .map_err(|err| format!("Failed to open device: {:?}", err))?;

        let mut flags = ContextAttributeFlags::empty();
        flags.set(ContextAttributeFlags::ALPHA, attributes.alpha);
        flags.set(ContextAttributeFlags::DEPTH, attributes.depth);
        flags.set(ContextAttributeFlags::STENCIL, attributes.stencil);
        let context_attributes = ContextAttributes {
            version: GLVersion { major: 2, minor: 0 },
            flags,
        };
        let context_descriptor = device
            .create_context_descriptor(&context_attributes)
            .map_err(|err| format!("Failed to create context descriptor: {:?}", err))?;

        let mut context = device
            .create_context(&context_descriptor, None)
            .map_err(|err| format!("Failed to create the GL context: {:?}", err))?;
        let surface_type = SurfaceType::Generic {
            size: size.to_i32(),
        };
        let surface = device
            .create_surface(&context, SurfaceAccess::GPUOnly, surface_type)
            .map_err(|err| format!("Failed to create the initial surface: {:?}", err))?;
        device
            .bind_surface_to_context(&mut context, surface)
            .map_err(|err| format!("Failed to bind initial surface: {:?}", err))?;
        device
            .make_context_current(&context)
            .map_err(|err| format!("Failed to make new context current: {:?}", err))?;

        let gl = match connection.gl_api() {
            GLApi::GL => Gl::gl_fns(gl::ffi_gl::Gl::load_with(|symbol_name| {
                device.get_proc_address(&context, symbol_name)
            })),
            GLApi::GLES => Gl::gles_fns(gl::ffi_gles::Gles2::load_with(|symbol_name| {
                device.get_proc_address(&context, symbol_name)
            })),
        };

        debug!(
            "created headless GL context ({}x{}, {:?})",
            size.width,
            size.height,
            connection.gl_api()
        );

        Ok(HeadlessDriver {
            device,
            context,
            gl,
            surface_destroyed: false,
            context_destroyed: false,
        })
    }
}

impl WebGLContext<HeadlessDriver> {
    /// Creates a context bound to a fresh headless drawing surface of
    /// the given size.
    pub fn new(
        size: Size2D<u32>,
        attributes: &GLContextAttributes,
    ) -> Result<WebGLContext<HeadlessDriver>, String> {
        let driver = HeadlessDriver::new(size, attributes)?;
        Ok(WebGLContext::with_driver(driver, *attributes))
    }
}

impl Driver for HeadlessDriver {
    fn create_buffer(&self) -> u32 {
        self.gl.gen_buffers(1)[0]
    }

    fn create_texture(&self) -> u32 {
        self.gl.gen_textures(1)[0]
    }

    fn create_framebuffer(&self) -> u32 {
        self.gl.gen_framebuffers(1)[0]
    }

    fn create_renderbuffer(&self) -> u32 {
        self.gl.gen_renderbuffers(1)[0]
    }

    fn create_shader(&self, shader_type: u32) -> u32 {
        self.gl.create_shader(shader_type)
    }

    fn create_program(&self) -> u32 {
        self.gl.create_program()
    }

    fn delete_buffer(&self, buffer: u32) {
        self.gl.delete_buffers(&[buffer]);
    }

    fn delete_texture(&self, texture: u32) {
        self.gl.delete_textures(&[texture]);
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.gl.delete_framebuffers(&[framebuffer]);
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.gl.delete_renderbuffers(&[renderbuffer]);
    }

    fn delete_shader(&self, shader: u32) {
        self.gl.delete_shader(shader);
    }

    fn delete_program(&self, program: u32) {
        self.gl.delete_program(program);
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        self.gl.bind_buffer(target, buffer);
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.gl.bind_texture(target, texture);
    }

    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32) {
        self.gl.bind_renderbuffer(target, renderbuffer);
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        self.gl.bind_framebuffer(target, framebuffer);
    }

    fn active_texture(&self, unit: u32) {
        self.gl.active_texture(unit);
    }

    fn use_program(&self, program: u32) {
        self.gl.use_program(program);
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        gl::buffer_data(&self.gl, target, data, usage);
    }

    fn buffer_data_uninitialized(&self, target: u32, size: isize, usage: u32) {
        unsafe {
            self.gl
                .buffer_data(target, size, ptr::null(), usage);
        }
    }

    fn buffer_sub_data(&self, target: u32, offset: isize, data: &[u8]) {
        gl::buffer_sub_data(&self.gl, target, offset, data);
    }

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
    ) {
        self.gl.tex_image_2d(
            target,
            level,
            internal_format,
            width,
            height,
            0,
            format,
            data_type,
            gl::TexImageSource::Pixels(pixels),
        );
    }

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
    ) {
        self.gl.tex_sub_image_2d(
            target, level, xoffset, yoffset, width, height, format, data_type, pixels,
        );
    }

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
    ) {
        self.gl
            .copy_tex_image_2d(target, level, internal_format, x, y, width, height, border);
    }

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
    ) {
        self.gl
            .copy_tex_sub_image_2d(target, level, xoffset, yoffset, x, y, width, height);
    }

    fn tex_parameter_i(&self, target: u32, pname: u32, value: i32) {
        self.gl.tex_parameter_i(target, pname, value);
    }

    fn tex_parameter_f(&self, target: u32, pname: u32, value: f32) {
        self.gl.tex_parameter_f(target, pname, value);
    }

    fn generate_mipmap(&self, target: u32) {
        self.gl.generate_mipmap(target);
    }

    fn pixel_store_i(&self, pname: u32, value: i32) {
        self.gl.pixel_store_i(pname, value);
    }

    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32) {
        self.gl
            .renderbuffer_storage(target, internal_format, width, height);
    }

    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, rb_target: u32, rb: u32) {
        self.gl
            .framebuffer_renderbuffer(target, attachment, rb_target, rb);
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        tex_target: u32,
        texture: u32,
        level: i32,
    ) {
        self.gl
            .framebuffer_texture_2d(target, attachment, tex_target, texture, level);
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        self.gl.check_framebuffer_status(target)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.gl.shader_source(shader, &[source.as_bytes()]);
    }

    fn compile_shader(&self, shader: u32) {
        self.gl.compile_shader(shader);
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let mut compiled = [0];
        unsafe {
            self.gl.get_shader_iv(shader, gl::COMPILE_STATUS, &mut compiled);
        }
        compiled[0] != 0
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.gl.get_shader_info_log(shader)
    }

    fn shader_precision_format(&self, shader_type: u32, precision_type: u32) -> (i32, i32, i32) {
        self.gl
            .get_shader_precision_format(shader_type, precision_type)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.gl.attach_shader(program, shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.gl.detach_shader(program, shader);
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        self.gl.bind_attrib_location(program, index, name);
    }

    fn link_program(&self, program: u32) {
        self.gl.link_program(program);
    }

    fn program_link_status(&self, program: u32) -> bool {
        let mut linked = [0];
        unsafe {
            self.gl.get_program_iv(program, gl::LINK_STATUS, &mut linked);
        }
        linked[0] != 0
    }

    fn program_info_log(&self, program: u32) -> String {
        self.gl.get_program_info_log(program)
    }

    fn validate_program(&self, program: u32) {
        self.gl.validate_program(program);
    }

    fn program_validate_status(&self, program: u32) -> bool {
        let mut status = [0];
        unsafe {
            self.gl
                .get_program_iv(program, gl::VALIDATE_STATUS, &mut status);
        }
        status[0] != 0
    }

    fn active_attrib_count(&self, program: u32) -> i32 {
        let mut count = [0];
        unsafe {
            self.gl
                .get_program_iv(program, gl::ACTIVE_ATTRIBUTES, &mut count);
        }
        count[0]
    }

    fn active_uniform_count(&self, program: u32) -> i32 {
        let mut count = [0];
        unsafe {
            self.gl
                .get_program_iv(program, gl::ACTIVE_UNIFORMS, &mut count);
        }
        count[0]
    }

    fn active_attrib(&self, program: u32, index: u32) -> (i32, u32, String) {
        self.gl.get_active_attrib(program, index)
    }

    fn active_uniform(&self, program: u32, index: u32) -> (i32, u32, String) {
        self.gl.get_active_uniform(program, index)
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        self.gl.get_uniform_location(program, name)
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        self.gl.get_attrib_location(program, name)
    }

    fn uniform_1f(&self, location: i32, x: f32) {
        self.gl.uniform_1f(location, x);
    }

    fn uniform_2f(&self, location: i32, x: f32, y: f32) {
        self.gl.uniform_2f(location, x, y);
    }

    fn uniform_3f(&self, location: i32, x: f32, y: f32, z: f32) {
        self.gl.uniform_3f(location, x, y, z);
    }

    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        self.gl.uniform_4f(location, x, y, z, w);
    }

    fn uniform_1i(&self, location: i32, x: i32) {
        self.gl.uniform_1i(location, x);
    }

    fn uniform_2i(&self, location: i32, x: i32, y: i32) {
        self.gl.uniform_2i(location, x, y);
    }

    fn uniform_3i(&self, location: i32, x: i32, y: i32, z: i32) {
        self.gl.uniform_3i(location, x, y, z);
    }

    fn uniform_4i(&self, location: i32, x: i32, y: i32, z: i32, w: i32) {
        self.gl.uniform_4i(location, x, y, z, w);
    }

    fn uniform_1fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_1fv(location, values);
    }

    fn uniform_2fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_2fv(location, values);
    }

    fn uniform_3fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_3fv(location, values);
    }

    fn uniform_4fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_4fv(location, values);
    }

    fn uniform_1iv(&self, location: i32, values: &[i32]) {
        self.gl.uniform_1iv(location, values);
    }

    fn uniform_2iv(&self, location: i32, values: &[i32]) {
        self.gl.uniform_2iv(location, values);
    }

    fn uniform_3iv(&self, location: i32, values: &[i32]) {
        self.gl.uniform_3iv(location, values);
    }

    fn uniform_4iv(&self, location: i32, values: &[i32]) {
        self.gl.uniform_4iv(location, values);
    }

    fn uniform_matrix_2fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_matrix_2fv(location, false, values);
    }

    fn uniform_matrix_3fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_matrix_3fv(location, false, values);
    }

    fn uniform_matrix_4fv(&self, location: i32, values: &[f32]) {
        self.gl.uniform_matrix_4fv(location, false, values);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.gl.enable_vertex_attrib_array(index);
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.gl.disable_vertex_attrib_array(index);
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: u32,
    ) {
        self.gl
            .vertex_attrib_pointer(index, size, data_type, normalized, stride, offset);
    }

    fn vertex_attrib_4f(&self, index: u32, x: f32, y: f32, z: f32, w: f32) {
        self.gl.vertex_attrib_4f(index, x, y, z, w);
    }

    fn current_vertex_attrib(&self, index: u32) -> [f32; 4] {
        let mut value = [0.; 4];
        unsafe {
            self.gl
                .get_vertex_attrib_fv(index, gl::CURRENT_VERTEX_ATTRIB, &mut value);
        }
        value
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.gl.draw_arrays(mode, first, count);
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: u32) {
        self.gl.draw_elements(mode, count, element_type, offset);
    }

    fn clear(&self, mask: u32) {
        self.gl.clear(mask);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear_depth(&self, value: f64) {
        self.gl.clear_depth(value);
    }

    fn clear_stencil(&self, value: i32) {
        self.gl.clear_stencil(value);
    }

    fn enable(&self, cap: u32) {
        self.gl.enable(cap);
    }

    fn disable(&self, cap: u32) {
        self.gl.disable(cap);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.scissor(x, y, width, height);
    }

    fn blend_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.blend_color(r, g, b, a);
    }

    fn blend_equation(&self, mode: u32) {
        self.gl.blend_equation(mode);
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        self.gl.blend_equation_separate(mode_rgb, mode_alpha);
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.gl.blend_func(src, dst);
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.gl
            .blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        self.gl.color_mask(r, g, b, a);
    }

    fn depth_mask(&self, flag: bool) {
        self.gl.depth_mask(flag);
    }

    fn stencil_mask(&self, mask: u32) {
        self.gl.stencil_mask(mask);
    }

    fn stencil_mask_separate(&self, face: u32, mask: u32) {
        self.gl.stencil_mask_separate(face, mask);
    }

    fn depth_func(&self, func: u32) {
        self.gl.depth_func(func);
    }

    fn depth_range(&self, near: f64, far: f64) {
        self.gl.depth_range(near, far);
    }

    fn front_face(&self, mode: u32) {
        self.gl.front_face(mode);
    }

    fn cull_face(&self, mode: u32) {
        self.gl.cull_face(mode);
    }

    fn line_width(&self, width: f32) {
        self.gl.line_width(width);
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        self.gl.polygon_offset(factor, units);
    }

    fn sample_coverage(&self, value: f32, invert: bool) {
        self.gl.sample_coverage(value, invert);
    }

    fn hint(&self, target: u32, mode: u32) {
        self.gl.hint(target, mode);
    }

    fn stencil_func(&self, func: u32, reference: i32, mask: u32) {
        self.gl.stencil_func(func, reference, mask);
    }

    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32) {
        self.gl.stencil_func_separate(face, func, reference, mask);
    }

    fn stencil_op(&self, fail: u32, zfail: u32, zpass: u32) {
        self.gl.stencil_op(fail, zfail, zpass);
    }

    fn stencil_op_separate(&self, face: u32, fail: u32, zfail: u32, zpass: u32) {
        self.gl.stencil_op_separate(face, fail, zfail, zpass);
    }

    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        pixel_type: u32,
    ) -> Vec<u8> {
        self.gl.read_pixels(x, y, width, height, format, pixel_type)
    }

    fn flush(&self) {
        self.gl.flush();
    }

    fn finish(&self) {
        self.gl.finish();
    }

    fn get_error(&self) -> u32 {
        self.gl.get_error()
    }

    fn get_integer_v(&self, pname: u32, result: &mut [i32]) {
        unsafe {
            self.gl.get_integer_v(pname, result);
        }
    }

    fn get_float_v(&self, pname: u32, result: &mut [f32]) {
        unsafe {
            self.gl.get_float_v(pname, result);
        }
    }

    fn get_string(&self, pname: u32) -> String {
        self.gl.get_string(pname)
    }

    fn renderbuffer_parameter_iv(&self, target: u32, pname: u32) -> i32 {
        self.gl.get_renderbuffer_parameter_iv(target, pname)
    }

    fn tex_parameter_iv(&self, target: u32, pname: u32) -> i32 {
        self.gl.get_tex_parameter_iv(target, pname)
    }

    fn drawing_buffer_size(&self) -> Size2D<i32> {
        self.device
            .context_surface_info(&self.context)
            .ok()
            .flatten()
            .map_or(Size2D::zero(), |info| info.size)
    }

    fn default_framebuffer(&self) -> u32 {
        self.device
            .context_surface_info(&self.context)
            .ok()
            .flatten()
            .map_or(0, |info| info.framebuffer_object)
    }

    fn resize_surface(&mut self, size: Size2D<u32>) -> Result<(), String> {
        let surface_type = SurfaceType::Generic {
            size: size.to_i32(),
        };
        let new_surface = self
            .device
            .create_surface(&self.context, SurfaceAccess::GPUOnly, surface_type)
            .map_err(|err| format!("Failed to create resized surface: {:?}", err))?;
        let old_surface = self
            .device
            .unbind_surface_from_context(&mut self.context)
            .map_err(|err| format!("Failed to unbind old surface: {:?}", err))?;
        self.device
            .bind_surface_to_context(&mut self.context, new_surface)
            .map_err(|err| format!("Failed to bind resized surface: {:?}", err))?;
        if let Some(mut old_surface) = old_surface {
            let _ = self.device.destroy_surface(&mut self.context, &mut old_surface);
        }
        self.device
            .make_context_current(&self.context)
            .map_err(|err| format!("Failed to make resized context current: {:?}", err))
    }

    fn destroy_surface(&mut self) {
        if self.surface_destroyed {
            return;
        }
        self.surface_destroyed = true;
        let _ = self.device.make_context_current(&self.context);
        if let Ok(Some(mut surface)) = self.device.unbind_surface_from_context(&mut self.context) {
            let _ = self.device.destroy_surface(&mut self.context, &mut surface);
        }
    }

    fn destroy_context(&mut self) {
        if self.context_destroyed {
            return;
        }
        self.context_destroyed = true;
        let _ = self.device.destroy_context(&mut self.context);
    }
}

impl Drop for HeadlessDriver {
    fn drop(&mut self) {
        self.destroy_surface();
        self.destroy_context();
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A recording mock driver. Every call is appended to a shared log so
//! tests can assert on driver traffic (or its absence) and on teardown
//! ordering.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use euclid::default::Size2D;
use webgl::{Driver, WebGLContext};
use webgl_traits::constants as gl;
use webgl_traits::GLContextAttributes;

/// A shared handle on the mock's call log.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> CallLog {
        CallLog::default()
    }

    fn push(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// Removes and returns everything logged so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// The number of logged calls whose name matches `name`.
    pub fn count(&self, name: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.split(' ').next() == Some(name))
            .count()
    }

    /// The log position of the first call matching `name`, if any.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.calls
            .borrow()
            .iter()
            .position(|call| call.split(' ').next() == Some(name))
    }
}

pub struct MockDriver {
    log: CallLog,
    next_name: Cell<u32>,
    size: Cell<Size2D<i32>>,
    pub compile_ok: Cell<bool>,
    pub link_ok: Cell<bool>,
}

impl MockDriver {
    pub fn new(log: CallLog) -> MockDriver {
        MockDriver {
            log,
            next_name: Cell::new(1),
            size: Cell::new(Size2D::new(256, 256)),
            compile_ok: Cell::new(true),
            link_ok: Cell::new(true),
        }
    }

    fn fresh_name(&self) -> u32 {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        name
    }

    fn log0(&self, name: &str) {
        self.log.push(name.to_owned());
    }

    fn log1<T: std::fmt::Debug>(&self, name: &str, arg: T) {
        self.log.push(format!("{} {:?}", name, arg));
    }
}

/// A context over a fresh mock driver, plus the log that records its
/// driver traffic. The log is drained of context-creation calls.
pub fn test_context() -> (WebGLContext<MockDriver>, CallLog) {
    let log = CallLog::new();
    let driver = MockDriver::new(log.clone());
    let context = WebGLContext::with_driver(driver, GLContextAttributes::default());
    log.take();
    (context, log)
}

impl Driver for MockDriver {
    fn create_buffer(&self) -> u32 {
        let name = self.fresh_name();
        self.log1("create_buffer", name);
        name
    }

    fn create_texture(&self) -> u32 {
        let name = self.fresh_name();
        self.log1("create_texture", name);
        name
    }

    fn create_framebuffer(&self) -> u32 {
        let name = self.fresh_name();
        self.log1("create_framebuffer", name);
        name
    }

    fn create_renderbuffer(&self) -> u32 {
        let name = self.fresh_name();
        self.log1("create_renderbuffer", name);
        name
    }

    fn create_shader(&self, shader_type: u32) -> u32 {
        let name = self.fresh_name();
        self.log.push(format!("create_shader {} {}", shader_type, name));
        name
    }

    fn create_program(&self) -> u32 {
        let name = self.fresh_name();
        self.log1("create_program", name);
        name
    }

    fn delete_buffer(&self, buffer: u32) {
        self.log1("delete_buffer", buffer);
    }

    fn delete_texture(&self, texture: u32) {
        self.log1("delete_texture", texture);
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.log1("delete_framebuffer", framebuffer);
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.log1("delete_renderbuffer", renderbuffer);
    }

    fn delete_shader(&self, shader: u32) {
        self.log1("delete_shader", shader);
    }

    fn delete_program(&self, program: u32) {
        self.log1("delete_program", program);
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        self.log.push(format!("bind_buffer {} {}", target, buffer));
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.log.push(format!("bind_texture {} {}", target, texture));
    }

    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32) {
        self.log
            .push(format!("bind_renderbuffer {} {}", target, renderbuffer));
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        self.log
            .push(format!("bind_framebuffer {} {}", target, framebuffer));
    }

    fn active_texture(&self, unit: u32) {
        self.log1("active_texture", unit);
    }

    fn use_program(&self, program: u32) {
        self.log1("use_program", program);
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.log
            .push(format!("buffer_data {} {} {}", target, data.len(), usage));
    }

    fn buffer_data_uninitialized(&self, target: u32, size: isize, usage: u32) {
        self.log.push(format!(
            "buffer_data_uninitialized {} {} {}",
            target, size, usage
        ));
    }

    fn buffer_sub_data(&self, target: u32, offset: isize, data: &[u8]) {
        self.log.push(format!(
            "buffer_sub_data {} {} {}",
            target,
            offset,
            data.len()
        ));
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        _internal_format: i32,
        width: i32,
        height: i32,
        _format: u32,
        _data_type: u32,
        _pixels: Option<&[u8]>,
    ) {
        self.log.push(format!(
            "tex_image_2d {} {} {}x{}",
            target, level, width, height
        ));
    }

    fn tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        width: i32,
        height: i32,
        _format: u32,
        _data_type: u32,
        _pixels: &[u8],
    ) {
        self.log.push(format!(
            "tex_sub_image_2d {} {} {},{} {}x{}",
            target, level, xoffset, yoffset, width, height
        ));
    }

    fn copy_tex_image_2d(
        &self,
        target: u32,
        level: i32,
        _internal_format: u32,
        _x: i32,
        _y: i32,
        width: i32,
        height: i32,
        _border: i32,
    ) {
        self.log.push(format!(
            "copy_tex_image_2d {} {} {}x{}",
            target, level, width, height
        ));
    }

    fn copy_tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        _xoffset: i32,
        _yoffset: i32,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
    ) {
        self.log.push(format!("copy_tex_sub_image_2d {} {}", target, level));
    }

    fn tex_parameter_i(&self, target: u32, pname: u32, value: i32) {
        self.log
            .push(format!("tex_parameter_i {} {} {}", target, pname, value));
    }

    fn tex_parameter_f(&self, target: u32, pname: u32, value: f32) {
        self.log
            .push(format!("tex_parameter_f {} {} {}", target, pname, value));
    }

    fn generate_mipmap(&self, target: u32) {
        self.log1("generate_mipmap", target);
    }

    fn pixel_store_i(&self, pname: u32, value: i32) {
        self.log.push(format!("pixel_store_i {} {}", pname, value));
    }

    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32) {
        self.log.push(format!(
            "renderbuffer_storage {} {} {}x{}",
            target, internal_format, width, height
        ));
    }

    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, rb_target: u32, rb: u32) {
        self.log.push(format!(
            "framebuffer_renderbuffer {} {} {} {}",
            target, attachment, rb_target, rb
        ));
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        tex_target: u32,
        texture: u32,
        level: i32,
    ) {
        self.log.push(format!(
            "framebuffer_texture_2d {} {} {} {} {}",
            target, attachment, tex_target, texture, level
        ));
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        self.log1("check_framebuffer_status", target);
        gl::FRAMEBUFFER_COMPLETE
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.log
            .push(format!("shader_source {} {}", shader, source.len()));
    }

    fn compile_shader(&self, shader: u32) {
        self.log1("compile_shader", shader);
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.log1("shader_compile_status", shader);
        self.compile_ok.get()
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.log1("shader_info_log", shader);
        if self.compile_ok.get() {
            String::new()
        } else {
            "mock compile error".to_owned()
        }
    }

    fn shader_precision_format(&self, _shader_type: u32, precision_type: u32) -> (i32, i32, i32) {
        self.log1("shader_precision_format", precision_type);
        match precision_type {
            gl::LOW_INT | gl::MEDIUM_INT | gl::HIGH_INT => (31, 30, 0),
            _ => (127, 127, 23),
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.log.push(format!("attach_shader {} {}", program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.log.push(format!("detach_shader {} {}", program, shader));
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        self.log
            .push(format!("bind_attrib_location {} {} {}", program, index, name));
    }

    fn link_program(&self, program: u32) {
        self.log1("link_program", program);
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.log1("program_link_status", program);
        self.link_ok.get()
    }

    fn program_info_log(&self, program: u32) -> String {
        self.log1("program_info_log", program);
        String::new()
    }

    fn validate_program(&self, program: u32) {
        self.log1("validate_program", program);
    }

    fn program_validate_status(&self, program: u32) -> bool {
        self.log1("program_validate_status", program);
        true
    }

    fn active_attrib_count(&self, program: u32) -> i32 {
        self.log1("active_attrib_count", program);
        0
    }

    fn active_uniform_count(&self, program: u32) -> i32 {
        self.log1("active_uniform_count", program);
        0
    }

    fn active_attrib(&self, _program: u32, _index: u32) -> (i32, u32, String) {
        (0, 0, String::new())
    }

    fn active_uniform(&self, _program: u32, _index: u32) -> (i32, u32, String) {
        (0, 0, String::new())
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        self.log
            .push(format!("uniform_location {} {}", program, name));
        0
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        self.log
            .push(format!("attrib_location {} {}", program, name));
        0
    }

    fn uniform_1f(&self, location: i32, _x: f32) {
        self.log1("uniform_1f", location);
    }

    fn uniform_2f(&self, location: i32, _x: f32, _y: f32) {
        self.log1("uniform_2f", location);
    }

    fn uniform_3f(&self, location: i32, _x: f32, _y: f32, _z: f32) {
        self.log1("uniform_3f", location);
    }

    fn uniform_4f(&self, location: i32, _x: f32, _y: f32, _z: f32, _w: f32) {
        self.log1("uniform_4f", location);
    }

    fn uniform_1i(&self, location: i32, _x: i32) {
        self.log1("uniform_1i", location);
    }

    fn uniform_2i(&self, location: i32, _x: i32, _y: i32) {
        self.log1("uniform_2i", location);
    }

    fn uniform_3i(&self, location: i32, _x: i32, _y: i32, _z: i32) {
        self.log1("uniform_3i", location);
    }

    fn uniform_4i(&self, location: i32, _x: i32, _y: i32, _z: i32, _w: i32) {
        self.log1("uniform_4i", location);
    }

    fn uniform_1fv(&self, location: i32, values: &[f32]) {
        self.log.push(format!("uniform_1fv {} {}", location, values.len()));
    }

    fn uniform_2fv(&self, location: i32, values: &[f32]) {
        self.log.push(format!("uniform_2fv {} {}", location, values.len()));
    }

    fn uniform_3fv(&self, location: i32, values: &[f32]) {
        self.log.push(format!("uniform_3fv {} {}", location, values.len()));
    }

    fn uniform_4fv(&self, location: i32, values: &[f32]) {
        self.log.push(format!("uniform_4fv {} {}", location, values.len()));
    }

    fn uniform_1iv(&self, location: i32, values: &[i32]) {
        self.log.push(format!("uniform_1iv {} {}", location, values.len()));
    }

    fn uniform_2iv(&self, location: i32, values: &[i32]) {
        self.log.push(format!("uniform_2iv {} {}", location, values.len()));
    }

    fn uniform_3iv(&self, location: i32, values: &[i32]) {
        self.log.push(format!("uniform_3iv {} {}", location, values.len()));
    }

    fn uniform_4iv(&self, location: i32, values: &[i32]) {
        self.log.push(format!("uniform_4iv {} {}", location, values.len()));
    }

    fn uniform_matrix_2fv(&self, location: i32, values: &[f32]) {
        self.log
            .push(format!("uniform_matrix_2fv {} {}", location, values.len()));
    }

    fn uniform_matrix_3fv(&self, location: i32, values: &[f32]) {
        self.log
            .push(format!("uniform_matrix_3fv {} {}", location, values.len()));
    }

    fn uniform_matrix_4fv(&self, location: i32, values: &[f32]) {
        self.log
            .push(format!("uniform_matrix_4fv {} {}", location, values.len()));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.log1("enable_vertex_attrib_array", index);
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.log1("disable_vertex_attrib_array", index);
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: u32,
    ) {
        self.log.push(format!(
            "vertex_attrib_pointer {} {} {} {}",
            index, size, stride, offset
        ));
    }

    fn vertex_attrib_4f(&self, index: u32, _x: f32, _y: f32, _z: f32, _w: f32) {
        self.log1("vertex_attrib_4f", index);
    }

    fn current_vertex_attrib(&self, index: u32) -> [f32; 4] {
        self.log1("current_vertex_attrib", index);
        [0.; 4]
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.log
            .push(format!("draw_arrays {} {} {}", mode, first, count));
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: u32) {
        self.log.push(format!(
            "draw_elements {} {} {} {}",
            mode, count, element_type, offset
        ));
    }

    fn clear(&self, mask: u32) {
        self.log1("clear", mask);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.log.push(format!("clear_color {} {} {} {}", r, g, b, a));
    }

    fn clear_depth(&self, value: f64) {
        self.log1("clear_depth", value);
    }

    fn clear_stencil(&self, value: i32) {
        self.log1("clear_stencil", value);
    }

    fn enable(&self, cap: u32) {
        self.log1("enable", cap);
    }

    fn disable(&self, cap: u32) {
        self.log1("disable", cap);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.log
            .push(format!("viewport {} {} {} {}", x, y, width, height));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.log
            .push(format!("scissor {} {} {} {}", x, y, width, height));
    }

    fn blend_color(&self, _r: f32, _g: f32, _b: f32, _a: f32) {
        self.log0("blend_color");
    }

    fn blend_equation(&self, mode: u32) {
        self.log1("blend_equation", mode);
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        self.log
            .push(format!("blend_equation_separate {} {}", mode_rgb, mode_alpha));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.log.push(format!("blend_func {} {}", src, dst));
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.log.push(format!(
            "blend_func_separate {} {} {} {}",
            src_rgb, dst_rgb, src_alpha, dst_alpha
        ));
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        self.log
            .push(format!("color_mask {} {} {} {}", r, g, b, a));
    }

    fn depth_mask(&self, flag: bool) {
        self.log1("depth_mask", flag);
    }

    fn stencil_mask(&self, mask: u32) {
        self.log1("stencil_mask", mask);
    }

    fn stencil_mask_separate(&self, face: u32, mask: u32) {
        self.log
            .push(format!("stencil_mask_separate {} {}", face, mask));
    }

    fn depth_func(&self, func: u32) {
        self.log1("depth_func", func);
    }

    fn depth_range(&self, near: f64, far: f64) {
        self.log.push(format!("depth_range {} {}", near, far));
    }

    fn front_face(&self, mode: u32) {
        self.log1("front_face", mode);
    }

    fn cull_face(&self, mode: u32) {
        self.log1("cull_face", mode);
    }

    fn line_width(&self, width: f32) {
        self.log1("line_width", width);
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        self.log.push(format!("polygon_offset {} {}", factor, units));
    }

    fn sample_coverage(&self, value: f32, invert: bool) {
        self.log.push(format!("sample_coverage {} {}", value, invert));
    }

    fn hint(&self, target: u32, mode: u32) {
        self.log.push(format!("hint {} {}", target, mode));
    }

    fn stencil_func(&self, func: u32, reference: i32, mask: u32) {
        self.log
            .push(format!("stencil_func {} {} {}", func, reference, mask));
    }

    fn stencil_func_separate(&self, face: u32, func: u32, reference: i32, mask: u32) {
        self.log.push(format!(
            "stencil_func_separate {} {} {} {}",
            face, func, reference, mask
        ));
    }

    fn stencil_op(&self, fail: u32, zfail: u32, zpass: u32) {
        self.log
            .push(format!("stencil_op {} {} {}", fail, zfail, zpass));
    }

    fn stencil_op_separate(&self, face: u32, fail: u32, zfail: u32, zpass: u32) {
        self.log.push(format!(
            "stencil_op_separate {} {} {} {}",
            face, fail, zfail, zpass
        ));
    }

    fn read_pixels(
        &self,
        _x: i32,
        _y: i32,
        width: i32,
        height: i32,
        _format: u32,
        _pixel_type: u32,
    ) -> Vec<u8> {
        self.log.push(format!("read_pixels {}x{}", width, height));
        vec![0; (width.max(0) * height.max(0) * 4) as usize]
    }

    fn flush(&self) {
        self.log0("flush");
    }

    fn finish(&self) {
        self.log0("finish");
    }

    fn get_error(&self) -> u32 {
        gl::NO_ERROR
    }

    fn get_integer_v(&self, pname: u32, result: &mut [i32]) {
        let value = match pname {
            gl::MAX_VERTEX_ATTRIBS => 16,
            gl::MAX_TEXTURE_SIZE | gl::MAX_CUBE_MAP_TEXTURE_SIZE | gl::MAX_RENDERBUFFER_SIZE => {
                2048
            },
            gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS | gl::MAX_TEXTURE_IMAGE_UNITS => 8,
            gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS => 4,
            gl::MAX_VERTEX_UNIFORM_VECTORS => 128,
            gl::MAX_FRAGMENT_UNIFORM_VECTORS => 16,
            gl::MAX_VARYING_VECTORS => 8,
            gl::MAX_VIEWPORT_DIMS => 4096,
            gl::RED_BITS | gl::GREEN_BITS | gl::BLUE_BITS | gl::ALPHA_BITS => 8,
            gl::DEPTH_BITS => 24,
            gl::STENCIL_BITS => 8,
            gl::SUBPIXEL_BITS => 4,
            _ => 0,
        };
        for slot in result.iter_mut() {
            *slot = value;
        }
    }

    fn get_float_v(&self, _pname: u32, result: &mut [f32]) {
        for slot in result.iter_mut() {
            *slot = 1.;
        }
    }

    fn get_string(&self, pname: u32) -> String {
        match pname {
            gl::VERSION => "Mock GL 2.0".to_owned(),
            gl::SHADING_LANGUAGE_VERSION => "Mock GLSL ES 1.00".to_owned(),
            _ => "mock".to_owned(),
        }
    }

    fn renderbuffer_parameter_iv(&self, _target: u32, _pname: u32) -> i32 {
        8
    }

    fn tex_parameter_iv(&self, _target: u32, pname: u32) -> i32 {
        match pname {
            gl::TEXTURE_MAG_FILTER => gl::LINEAR as i32,
            gl::TEXTURE_MIN_FILTER => gl::NEAREST_MIPMAP_LINEAR as i32,
            _ => gl::REPEAT as i32,
        }
    }

    fn drawing_buffer_size(&self) -> Size2D<i32> {
        self.size.get()
    }

    fn default_framebuffer(&self) -> u32 {
        0
    }

    fn resize_surface(&mut self, size: Size2D<u32>) -> Result<(), String> {
        self.size.set(size.to_i32());
        self.log
            .push(format!("resize_surface {}x{}", size.width, size.height));
        Ok(())
    }

    fn destroy_surface(&mut self) {
        self.log0("destroy_surface");
    }

    fn destroy_context(&mut self) {
        self.log0("destroy_context");
    }
}

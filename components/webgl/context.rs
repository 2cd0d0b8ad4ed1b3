/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The WebGL rendering context: command translation, error recording
//! and the context lifecycle.
//!
//! Every entry point follows the same shape: validate the arguments in
//! spec precedence order, mutate the tracked state and resolve handles,
//! dispatch to the driver, and record any failure on the context's
//! error set. Errors are polled with `get_error`, never thrown, and a
//! rejected call leaves the context untouched.

use euclid::default::{Point2D, Rect, Size2D};
use log::{debug, trace};
use webgl_traits::constants as gl;
use webgl_traits::{
    ActiveAttribInfo, ActiveUniformInfo, BufferId, FramebufferId, GLContextAttributes, GLLimits,
    Parameter, ParameterBool, ParameterBool4, ParameterFloat, ParameterFloat2, ParameterFloat4,
    ParameterInt, ParameterInt2, ParameterInt4, ProgramId, ProgramLinkInfo, RenderbufferId,
    ShaderId, TexParameter, TexParameterInt, TextureId, WebGLError, WebGLResult,
};

use crate::driver::Driver;
use crate::framebuffer::{FramebufferAttachment, FramebufferInfo};
use crate::limits::GLLimitsDetect;
use crate::program::{ProgramInfo, ShaderInfo};
use crate::resources::{BufferInfo, DriverObject, RenderbufferInfo, Resources};
use crate::state::{CapFlags, ContextState, VertexAttrib};
use crate::texture::{self, TexImageTarget, TextureInfo};

macro_rules! handle_potential_webgl_error {
    ($context:expr, $call:expr, $return_on_error:expr) => {
        match $call {
            Ok(ret) => ret,
            Err(error) => {
                $context.webgl_error(error.into());
                $return_on_error
            },
        }
    };
    ($context:expr, $call:expr) => {
        handle_potential_webgl_error!($context, $call, ())
    };
}

/// The lifecycle phase of a context. `Ready` is the only phase that
/// accepts commands; entering `ShuttingDown` is a one-way transition
/// and `Destroyed` is terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextPhase {
    Ready,
    ShuttingDown,
    Destroyed,
}

/// A WebGL1 rendering context bound to a headless drawing surface.
///
/// One logical thread of control drives a context; all mutation goes
/// through `&mut self` and there is no internal locking.
pub struct WebGLContext<D: Driver> {
    driver: D,
    state: ContextState,
    resources: Resources,
    limits: GLLimits,
    attributes: GLContextAttributes,
    phase: ContextPhase,
    size: Size2D<i32>,
    /// Outstanding error codes, deduplicated, oldest first.
    errors: Vec<WebGLError>,
}

impl<D: Driver> WebGLContext<D> {
    /// Wraps an already-created driver context. The driver is assumed
    /// current and freshly created; the drawing buffer is cleared to
    /// the WebGL initial state.
    pub fn with_driver(driver: D, attributes: GLContextAttributes) -> WebGLContext<D> {
        let limits = GLLimits::detect(&driver);
        let size = driver.drawing_buffer_size();
        let state = ContextState::new(
            size,
            limits.max_combined_texture_image_units,
            limits.max_vertex_attribs,
        );

        driver.bind_framebuffer(gl::FRAMEBUFFER, driver.default_framebuffer());
        driver.viewport(0, 0, size.width, size.height);
        driver.scissor(0, 0, size.width, size.height);
        driver.clear_color(0., 0., 0., !attributes.alpha as u32 as f32);
        driver.clear_depth(1.);
        driver.clear_stencil(0);
        driver.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT);
        driver.clear_color(0., 0., 0., 0.);

        debug!("created WebGL context ({}x{})", size.width, size.height);

        WebGLContext {
            driver,
            state,
            resources: Resources::new(),
            limits,
            attributes,
            phase: ContextPhase::Ready,
            size,
            errors: Vec::new(),
        }
    }

    // Lifecycle

    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    pub fn is_context_lost(&self) -> bool {
        self.phase != ContextPhase::Ready
    }

    /// Tears the context down: every live driver object is destroyed
    /// (pending-delete objects included), then the drawing surface,
    /// then the driver context, in reverse-acquisition order.
    /// Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if self.phase != ContextPhase::Ready {
            return;
        }
        self.phase = ContextPhase::ShuttingDown;
        debug!(
            "context shutdown, destroying {} live objects",
            self.resources.live_objects()
        );
        self.resources.destroy_all(&self.driver);
        self.driver.destroy_surface();
        self.driver.destroy_context();
        self.phase = ContextPhase::Destroyed;
    }

    /// Recreates the drawing surface at a new size. The rest of the
    /// context state is untouched.
    pub fn resize(&mut self, size: Size2D<u32>) -> Result<(), String> {
        if self.phase != ContextPhase::Ready {
            return Err("context is lost".to_owned());
        }
        self.driver.resize_surface(size)?;
        self.size = self.driver.drawing_buffer_size();
        debug!("resized drawing buffer to {}x{}", self.size.width, self.size.height);
        Ok(())
    }

    fn ensure_ready(&mut self) -> bool {
        if self.phase == ContextPhase::Ready {
            true
        } else {
            self.webgl_error(WebGLError::ContextLost);
            false
        }
    }

    // Error recording and polling

    fn webgl_error(&mut self, error: WebGLError) {
        trace!("recording WebGL error: {:?}", error);
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    /// Poll-then-clear error query. Recorded errors are returned before
    /// the driver's own error state is consulted, matching the order
    /// the context observed them.
    pub fn get_error(&mut self) -> u32 {
        if !self.errors.is_empty() {
            return self.errors.remove(0).as_gl_constant();
        }
        if self.phase != ContextPhase::Ready {
            return gl::CONTEXT_LOST_WEBGL;
        }
        self.driver.get_error()
    }

    // Context queries

    pub fn get_context_attributes(&self) -> GLContextAttributes {
        self.attributes
    }

    pub fn limits(&self) -> &GLLimits {
        &self.limits
    }

    pub fn drawing_buffer_width(&self) -> i32 {
        self.size.width
    }

    pub fn drawing_buffer_height(&self) -> i32 {
        self.size.height
    }

    /// An owned copy of the tracked context state, for later
    /// `restore_state`.
    pub fn save_state(&self) -> ContextState {
        self.state.snapshot()
    }

    /// Restores a previously saved state record and replays it to the
    /// driver so the tracked and driver-side state agree again.
    ///
    /// Bindings captured in the snapshot that have since been
    /// destroyed are dropped; reference counts are rebalanced so the
    /// restored bindings keep their objects alive exactly like
    /// explicitly re-issued binds would.
    pub fn restore_state(&mut self, snapshot: ContextState) {
        if !self.ensure_ready() {
            return;
        }
        let mut snapshot = snapshot;
        sanitize_restored_bindings(&mut snapshot, &self.resources);
        let new_bound = bound_objects(&snapshot);
        let old = std::mem::replace(&mut self.state, snapshot);
        let old_bound = bound_objects(&old);

        // Retain first, so objects bound in both states never
        // transiently lose their last reference.
        for &id in &new_bound.buffers {
            self.resources.retain_buffer(id);
        }
        for &id in &new_bound.textures {
            self.resources.retain_texture(id);
        }
        if let Some(id) = new_bound.framebuffer {
            self.resources.retain_framebuffer(id);
        }
        if let Some(id) = new_bound.renderbuffer {
            self.resources.retain_renderbuffer(id);
        }
        if let Some(id) = new_bound.program {
            self.resources.retain_program(id);
        }
        for &id in &old_bound.buffers {
            self.resources.unref_buffer(&self.driver, id);
        }
        for &id in &old_bound.textures {
            self.resources.unref_texture(&self.driver, id);
        }
        if let Some(id) = old_bound.renderbuffer {
            self.resources.unref_renderbuffer(&self.driver, id);
        }
        if let Some(id) = old_bound.framebuffer {
            let destroyed = self.resources.unref_framebuffer(&self.driver, id);
            self.release_framebuffer_attachments(destroyed);
        }
        if let Some(id) = old_bound.program {
            let destroyed = self.resources.unref_program(&self.driver, id);
            self.release_program_shaders(destroyed);
        }

        self.replay_state();
    }

    /// Replays the tracked pipeline state and bindings to the driver.
    fn replay_state(&mut self) {
        let state = &self.state;
        let driver = &self.driver;

        for cap in [
            (CapFlags::BLEND, gl::BLEND),
            (CapFlags::CULL_FACE, gl::CULL_FACE),
            (CapFlags::DEPTH_TEST, gl::DEPTH_TEST),
            (CapFlags::DITHER, gl::DITHER),
            (CapFlags::POLYGON_OFFSET_FILL, gl::POLYGON_OFFSET_FILL),
            (
                CapFlags::SAMPLE_ALPHA_TO_COVERAGE,
                gl::SAMPLE_ALPHA_TO_COVERAGE,
            ),
            (CapFlags::SAMPLE_COVERAGE, gl::SAMPLE_COVERAGE),
            (CapFlags::SCISSOR_TEST, gl::SCISSOR_TEST),
            (CapFlags::STENCIL_TEST, gl::STENCIL_TEST),
        ] {
            if state.capabilities.contains(cap.0) {
                driver.enable(cap.1);
            } else {
                driver.disable(cap.1);
            }
        }

        driver.viewport(
            state.viewport.origin.x,
            state.viewport.origin.y,
            state.viewport.size.width,
            state.viewport.size.height,
        );
        driver.scissor(
            state.scissor.origin.x,
            state.scissor.origin.y,
            state.scissor.size.width,
            state.scissor.size.height,
        );
        let (r, g, b, a) = state.clear_color;
        driver.clear_color(r, g, b, a);
        driver.clear_depth(state.clear_depth);
        driver.clear_stencil(state.clear_stencil);
        let [cr, cg, cb, ca] = state.color_write_mask;
        driver.color_mask(cr, cg, cb, ca);
        driver.depth_mask(state.depth_write_mask);
        driver.depth_func(state.depth_func);
        driver.depth_range(state.depth_range.0, state.depth_range.1);
        driver.stencil_func_separate(
            gl::FRONT,
            state.stencil_front.func,
            state.stencil_front.reference,
            state.stencil_front.value_mask,
        );
        driver.stencil_func_separate(
            gl::BACK,
            state.stencil_back.func,
            state.stencil_back.reference,
            state.stencil_back.value_mask,
        );
        driver.stencil_mask_separate(gl::FRONT, state.stencil_front.write_mask);
        driver.stencil_mask_separate(gl::BACK, state.stencil_back.write_mask);
        driver.stencil_op_separate(
            gl::FRONT,
            state.stencil_front.fail_op,
            state.stencil_front.depth_fail_op,
            state.stencil_front.depth_pass_op,
        );
        driver.stencil_op_separate(
            gl::BACK,
            state.stencil_back.fail_op,
            state.stencil_back.depth_fail_op,
            state.stencil_back.depth_pass_op,
        );
        let (br, bg, bb, ba) = state.blend_color;
        driver.blend_color(br, bg, bb, ba);
        driver.blend_equation_separate(state.blend_equation_rgb, state.blend_equation_alpha);
        driver.blend_func_separate(
            state.blend_src_rgb,
            state.blend_dst_rgb,
            state.blend_src_alpha,
            state.blend_dst_alpha,
        );
        driver.cull_face(state.cull_face_mode);
        driver.front_face(state.front_face);
        driver.line_width(state.line_width);
        driver.polygon_offset(state.polygon_offset.0, state.polygon_offset.1);
        driver.sample_coverage(state.sample_coverage.0, state.sample_coverage.1);
        driver.hint(gl::GENERATE_MIPMAP_HINT, state.generate_mipmap_hint);
        driver.pixel_store_i(gl::UNPACK_ALIGNMENT, state.unpack_alignment);
        driver.pixel_store_i(gl::PACK_ALIGNMENT, state.pack_alignment);

        let buffer_name = |id: Option<BufferId>| -> u32 {
            id.and_then(|id| self.resources.buffers.resolve(id).ok())
                .map_or(0, |entry| entry.gl_name())
        };
        driver.bind_buffer(gl::ARRAY_BUFFER, buffer_name(state.array_buffer));
        driver.bind_buffer(
            gl::ELEMENT_ARRAY_BUFFER,
            buffer_name(state.element_array_buffer),
        );
        let framebuffer = state
            .framebuffer
            .and_then(|id| self.resources.framebuffers.resolve(id).ok())
            .map_or_else(|| driver.default_framebuffer(), |entry| entry.gl_name());
        driver.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);
        let renderbuffer = state
            .renderbuffer
            .and_then(|id| self.resources.renderbuffers.resolve(id).ok())
            .map_or(0, |entry| entry.gl_name());
        driver.bind_renderbuffer(gl::RENDERBUFFER, renderbuffer);
        let program = state
            .current_program
            .and_then(|id| self.resources.programs.resolve(id).ok())
            .map_or(0, |entry| entry.gl_name());
        driver.use_program(program);
        for (index, unit) in state.texture_units.iter().enumerate() {
            driver.active_texture(gl::TEXTURE0 + index as u32);
            let texture = |id: Option<TextureId>| -> u32 {
                id.and_then(|id| self.resources.textures.resolve(id).ok())
                    .map_or(0, |entry| entry.gl_name())
            };
            driver.bind_texture(gl::TEXTURE_2D, texture(unit.bound_2d));
            driver.bind_texture(gl::TEXTURE_CUBE_MAP, texture(unit.bound_cube_map));
        }
        driver.active_texture(gl::TEXTURE0 + state.active_unit);
    }

    // Capabilities

    pub fn enable(&mut self, cap: u32) {
        if !self.ensure_ready() {
            return;
        }
        let flag = handle_potential_webgl_error!(self, CapFlags::from_gl_constant(cap), return);
        self.state.capabilities.insert(flag);
        self.driver.enable(cap);
    }

    pub fn disable(&mut self, cap: u32) {
        if !self.ensure_ready() {
            return;
        }
        let flag = handle_potential_webgl_error!(self, CapFlags::from_gl_constant(cap), return);
        self.state.capabilities.remove(flag);
        self.driver.disable(cap);
    }

    pub fn is_enabled(&mut self, cap: u32) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        let flag = handle_potential_webgl_error!(self, CapFlags::from_gl_constant(cap), return false);
        self.state.capabilities.contains(flag)
    }

    // Viewport, scissor and clear state

    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if !self.ensure_ready() {
            return;
        }
        if width < 0 || height < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.state.viewport = Rect::new(Point2D::new(x, y), Size2D::new(width, height));
        self.driver.viewport(x, y, width, height);
    }

    pub fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if !self.ensure_ready() {
            return;
        }
        if width < 0 || height < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.state.scissor = Rect::new(Point2D::new(x, y), Size2D::new(width, height));
        self.driver.scissor(x, y, width, height);
    }

    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        if !self.ensure_ready() {
            return;
        }
        self.state.clear_color = (r, g, b, a);
        self.driver.clear_color(r, g, b, a);
    }

    pub fn clear_depth(&mut self, depth: f32) {
        if !self.ensure_ready() {
            return;
        }
        let value = depth.clamp(0., 1.) as f64;
        self.state.clear_depth = value;
        self.driver.clear_depth(value);
    }

    pub fn clear_stencil(&mut self, stencil: i32) {
        if !self.ensure_ready() {
            return;
        }
        self.state.clear_stencil = stencil;
        self.driver.clear_stencil(stencil);
    }

    pub fn clear(&mut self, mask: u32) {
        if !self.ensure_ready() {
            return;
        }
        if mask & !(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT) != 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        handle_potential_webgl_error!(self, self.validate_framebuffer(), return);
        self.driver.clear(mask);
    }

    // Pipeline state

    pub fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        if !self.ensure_ready() {
            return;
        }
        self.state.color_write_mask = [r, g, b, a];
        self.driver.color_mask(r, g, b, a);
    }

    pub fn depth_mask(&mut self, flag: bool) {
        if !self.ensure_ready() {
            return;
        }
        self.state.depth_write_mask = flag;
        self.driver.depth_mask(flag);
    }

    pub fn depth_func(&mut self, func: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_comparison_func(func) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.state.depth_func = func;
        self.driver.depth_func(func);
    }

    pub fn depth_range(&mut self, near: f32, far: f32) {
        if !self.ensure_ready() {
            return;
        }
        let near = near.clamp(0., 1.) as f64;
        let far = far.clamp(0., 1.) as f64;
        if near > far {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        self.state.depth_range = (near, far);
        self.driver.depth_range(near, far);
    }

    pub fn front_face(&mut self, mode: u32) {
        if !self.ensure_ready() {
            return;
        }
        if mode != gl::CW && mode != gl::CCW {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.state.front_face = mode;
        self.driver.front_face(mode);
    }

    pub fn cull_face(&mut self, mode: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_face(mode) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.state.cull_face_mode = mode;
        self.driver.cull_face(mode);
    }

    pub fn line_width(&mut self, width: f32) {
        if !self.ensure_ready() {
            return;
        }
        if !(width > 0.) {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.state.line_width = width;
        self.driver.line_width(width);
    }

    pub fn polygon_offset(&mut self, factor: f32, units: f32) {
        if !self.ensure_ready() {
            return;
        }
        self.state.polygon_offset = (factor, units);
        self.driver.polygon_offset(factor, units);
    }

    pub fn sample_coverage(&mut self, value: f32, invert: bool) {
        if !self.ensure_ready() {
            return;
        }
        self.state.sample_coverage = (value, invert);
        self.driver.sample_coverage(value, invert);
    }

    pub fn hint(&mut self, target: u32, mode: u32) {
        if !self.ensure_ready() {
            return;
        }
        if target != gl::GENERATE_MIPMAP_HINT {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        match mode {
            gl::FASTEST | gl::NICEST | gl::DONT_CARE => {},
            _ => return self.webgl_error(WebGLError::InvalidEnum),
        }
        self.state.generate_mipmap_hint = mode;
        self.driver.hint(target, mode);
    }

    // Blending

    pub fn blend_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        if !self.ensure_ready() {
            return;
        }
        self.state.blend_color = (r, g, b, a);
        self.driver.blend_color(r, g, b, a);
    }

    pub fn blend_equation(&mut self, mode: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_blend_equation(mode) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.state.blend_equation_rgb = mode;
        self.state.blend_equation_alpha = mode;
        self.driver.blend_equation(mode);
    }

    pub fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_blend_equation(mode_rgb) || !is_blend_equation(mode_alpha) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.state.blend_equation_rgb = mode_rgb;
        self.state.blend_equation_alpha = mode_alpha;
        self.driver.blend_equation_separate(mode_rgb, mode_alpha);
    }

    pub fn blend_func(&mut self, src: u32, dst: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_blend_src_factor(src) || !is_blend_dst_factor(dst) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if has_invalid_blend_constants(src, dst) || has_invalid_blend_constants(dst, src) {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        self.state.blend_src_rgb = src;
        self.state.blend_src_alpha = src;
        self.state.blend_dst_rgb = dst;
        self.state.blend_dst_alpha = dst;
        self.driver.blend_func(src, dst);
    }

    pub fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_blend_src_factor(src_rgb) ||
            !is_blend_dst_factor(dst_rgb) ||
            !is_blend_src_factor(src_alpha) ||
            !is_blend_dst_factor(dst_alpha)
        {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if has_invalid_blend_constants(src_rgb, dst_rgb) ||
            has_invalid_blend_constants(dst_rgb, src_rgb)
        {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        self.state.blend_src_rgb = src_rgb;
        self.state.blend_dst_rgb = dst_rgb;
        self.state.blend_src_alpha = src_alpha;
        self.state.blend_dst_alpha = dst_alpha;
        self.driver
            .blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    // Stencil state

    pub fn stencil_func(&mut self, func: u32, reference: i32, mask: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_comparison_func(func) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        for side in [&mut self.state.stencil_front, &mut self.state.stencil_back] {
            side.func = func;
            side.reference = reference;
            side.value_mask = mask;
        }
        self.driver.stencil_func(func, reference, mask);
    }

    pub fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_face(face) || !is_comparison_func(func) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if face == gl::FRONT || face == gl::FRONT_AND_BACK {
            let side = &mut self.state.stencil_front;
            side.func = func;
            side.reference = reference;
            side.value_mask = mask;
        }
        if face == gl::BACK || face == gl::FRONT_AND_BACK {
            let side = &mut self.state.stencil_back;
            side.func = func;
            side.reference = reference;
            side.value_mask = mask;
        }
        self.driver.stencil_func_separate(face, func, reference, mask);
    }

    pub fn stencil_mask(&mut self, mask: u32) {
        if !self.ensure_ready() {
            return;
        }
        self.state.stencil_front.write_mask = mask;
        self.state.stencil_back.write_mask = mask;
        self.driver.stencil_mask(mask);
    }

    pub fn stencil_mask_separate(&mut self, face: u32, mask: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_face(face) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if face == gl::FRONT || face == gl::FRONT_AND_BACK {
            self.state.stencil_front.write_mask = mask;
        }
        if face == gl::BACK || face == gl::FRONT_AND_BACK {
            self.state.stencil_back.write_mask = mask;
        }
        self.driver.stencil_mask_separate(face, mask);
    }

    pub fn stencil_op(&mut self, fail: u32, zfail: u32, zpass: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_stencil_op(fail) || !is_stencil_op(zfail) || !is_stencil_op(zpass) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        for side in [&mut self.state.stencil_front, &mut self.state.stencil_back] {
            side.fail_op = fail;
            side.depth_fail_op = zfail;
            side.depth_pass_op = zpass;
        }
        self.driver.stencil_op(fail, zfail, zpass);
    }

    pub fn stencil_op_separate(&mut self, face: u32, fail: u32, zfail: u32, zpass: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_face(face) || !is_stencil_op(fail) || !is_stencil_op(zfail) || !is_stencil_op(zpass)
        {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if face == gl::FRONT || face == gl::FRONT_AND_BACK {
            let side = &mut self.state.stencil_front;
            side.fail_op = fail;
            side.depth_fail_op = zfail;
            side.depth_pass_op = zpass;
        }
        if face == gl::BACK || face == gl::FRONT_AND_BACK {
            let side = &mut self.state.stencil_back;
            side.fail_op = fail;
            side.depth_fail_op = zfail;
            side.depth_pass_op = zpass;
        }
        self.driver.stencil_op_separate(face, fail, zfail, zpass);
    }

    // Pixel storage

    pub fn pixel_storei(&mut self, pname: u32, value: i32) {
        if !self.ensure_ready() {
            return;
        }
        match pname {
            gl::UNPACK_FLIP_Y_WEBGL => self.state.unpack_flip_y = value != 0,
            gl::UNPACK_PREMULTIPLY_ALPHA_WEBGL => {
                self.state.unpack_premultiply_alpha = value != 0
            },
            gl::UNPACK_COLORSPACE_CONVERSION_WEBGL => match value as u32 {
                gl::BROWSER_DEFAULT_WEBGL | gl::NONE => {
                    self.state.unpack_colorspace_conversion = value as u32
                },
                _ => return self.webgl_error(WebGLError::InvalidValue),
            },
            gl::UNPACK_ALIGNMENT => {
                if !matches!(value, 1 | 2 | 4 | 8) {
                    return self.webgl_error(WebGLError::InvalidValue);
                }
                self.state.unpack_alignment = value;
                self.driver.pixel_store_i(pname, value);
            },
            gl::PACK_ALIGNMENT => {
                if !matches!(value, 1 | 2 | 4 | 8) {
                    return self.webgl_error(WebGLError::InvalidValue);
                }
                self.state.pack_alignment = value;
                self.driver.pixel_store_i(pname, value);
            },
            _ => self.webgl_error(WebGLError::InvalidEnum),
        }
    }

    // Buffer objects
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.5

    pub fn create_buffer(&mut self) -> Option<BufferId> {
        if !self.ensure_ready() {
            return None;
        }
        let name = self.driver.create_buffer();
        if name == 0 {
            return None;
        }
        let entry = DriverObject::new(name, BufferInfo::default());
        match self.resources.buffers.allocate(entry) {
            Some(id) => Some(id),
            None => {
                self.driver.delete_buffer(name);
                self.webgl_error(WebGLError::OutOfMemory);
                None
            },
        }
    }

    pub fn bind_buffer(&mut self, target: u32, buffer: Option<BufferId>) {
        if !self.ensure_ready() {
            return;
        }
        if !is_buffer_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let name = match buffer {
            Some(id) => {
                let entry =
                    handle_potential_webgl_error!(self, self.resources.buffers.resolve_mut(id), return);
                if entry.is_deleted() {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                // A buffer is locked to the first target it is bound
                // to; index buffers cannot be rebound as vertex
                // buffers.
                match entry.info().target() {
                    Some(previous) if previous != target => {
                        return self.webgl_error(WebGLError::InvalidOperation);
                    },
                    _ => entry.info_mut().set_target(target),
                }
                self.resources.retain_buffer(id);
                entry_name(&self.resources.buffers, id)
            },
            None => 0,
        };
        let slot = match target {
            gl::ARRAY_BUFFER => &mut self.state.array_buffer,
            _ => &mut self.state.element_array_buffer,
        };
        let previous = std::mem::replace(slot, buffer);
        if let Some(previous) = previous {
            self.resources.unref_buffer(&self.driver, previous);
        }
        self.driver.bind_buffer(target, name);
    }

    pub fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_buffer_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if !is_buffer_usage(usage) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let bound = match self.bound_buffer(target) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        if let Ok(entry) = self.resources.buffers.resolve_mut(bound) {
            entry.info_mut().record_data(data.len(), usage);
        }
        self.driver.buffer_data(target, data, usage);
    }

    /// `bufferData` with a size and no data: the buffer contents are
    /// uninitialized driver-side.
    pub fn buffer_data_size(&mut self, target: u32, size: isize, usage: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_buffer_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if !is_buffer_usage(usage) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if size < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        let bound = match self.bound_buffer(target) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        if let Ok(entry) = self.resources.buffers.resolve_mut(bound) {
            entry.info_mut().record_data(size as usize, usage);
        }
        self.driver.buffer_data_uninitialized(target, size, usage);
    }

    pub fn buffer_sub_data(&mut self, target: u32, offset: isize, data: &[u8]) {
        if !self.ensure_ready() {
            return;
        }
        if !is_buffer_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if offset < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        let bound = match self.bound_buffer(target) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        let size = self
            .resources
            .buffers
            .resolve(bound)
            .map_or(0, |entry| entry.info().size());
        if offset as usize + data.len() > size {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.driver.buffer_sub_data(target, offset, data);
    }

    /// Marks the buffer deleted. A buffer still held by a binding
    /// point stays alive (and usable through that binding) until it is
    /// unbound, and is destroyed at that point.
    pub fn delete_buffer(&mut self, buffer: Option<BufferId>) {
        if !self.ensure_ready() {
            return;
        }
        if let Some(id) = buffer {
            self.resources.mark_buffer_deleted(&self.driver, id);
        }
    }

    pub fn is_buffer(&mut self, buffer: Option<BufferId>) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        buffer.map_or(false, |id| {
            self.resources
                .buffers
                .resolve(id)
                .map_or(false, |entry| {
                    !entry.is_deleted() && entry.info().target().is_some()
                })
        })
    }

    pub fn get_buffer_parameter(&mut self, target: u32, pname: u32) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        if !is_buffer_target(target) {
            self.webgl_error(WebGLError::InvalidEnum);
            return 0;
        }
        let bound = match self.bound_buffer(target) {
            Some(id) => id,
            None => {
                self.webgl_error(WebGLError::InvalidOperation);
                return 0;
            },
        };
        let entry = match self.resources.buffers.resolve(bound) {
            Ok(entry) => entry,
            Err(_) => return 0,
        };
        match pname {
            gl::BUFFER_SIZE => entry.info().size() as i32,
            gl::BUFFER_USAGE => entry.info().usage() as i32,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                0
            },
        }
    }

    fn bound_buffer(&self, target: u32) -> Option<BufferId> {
        match target {
            gl::ARRAY_BUFFER => self.state.array_buffer,
            gl::ELEMENT_ARRAY_BUFFER => self.state.element_array_buffer,
            _ => None,
        }
    }

    // Texture objects
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.8

    pub fn create_texture(&mut self) -> Option<TextureId> {
        if !self.ensure_ready() {
            return None;
        }
        let name = self.driver.create_texture();
        if name == 0 {
            return None;
        }
        let entry = DriverObject::new(name, TextureInfo::default());
        match self.resources.textures.allocate(entry) {
            Some(id) => Some(id),
            None => {
                self.driver.delete_texture(name);
                self.webgl_error(WebGLError::OutOfMemory);
                None
            },
        }
    }

    pub fn active_texture(&mut self, texture: u32) {
        if !self.ensure_ready() {
            return;
        }
        let unit = texture.wrapping_sub(gl::TEXTURE0);
        if unit >= self.limits.max_combined_texture_image_units {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.state.active_unit = unit;
        self.driver.active_texture(texture);
    }

    pub fn bind_texture(&mut self, target: u32, texture: Option<TextureId>) {
        if !self.ensure_ready() {
            return;
        }
        if !is_texture_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let name = match texture {
            Some(id) => {
                let entry =
                    handle_potential_webgl_error!(self, self.resources.textures.resolve_mut(id), return);
                if entry.is_deleted() {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                handle_potential_webgl_error!(self, entry.info_mut().set_target(target), return);
                self.resources.retain_texture(id);
                entry_name(&self.resources.textures, id)
            },
            None => 0,
        };
        let unit = self.state.active_unit_mut();
        let slot = match target {
            gl::TEXTURE_2D => &mut unit.bound_2d,
            _ => &mut unit.bound_cube_map,
        };
        let previous = std::mem::replace(slot, texture);
        if let Some(previous) = previous {
            self.resources.unref_texture(&self.driver, previous);
        }
        self.driver.bind_texture(target, name);
    }

    /// Marks the texture deleted. Texture unit bindings and
    /// framebuffer attachments keep it alive until they release it.
    pub fn delete_texture(&mut self, texture: Option<TextureId>) {
        if !self.ensure_ready() {
            return;
        }
        if let Some(id) = texture {
            self.resources.mark_texture_deleted(&self.driver, id);
        }
    }

    pub fn is_texture(&mut self, texture: Option<TextureId>) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        texture.map_or(false, |id| {
            self.resources
                .textures
                .resolve(id)
                .map_or(false, |entry| {
                    !entry.is_deleted() && entry.info().target().is_some()
                })
        })
    }

    pub fn tex_parameteri(&mut self, target: u32, pname: u32, value: i32) {
        self.tex_parameter(target, pname, value)
    }

    pub fn tex_parameterf(&mut self, target: u32, pname: u32, value: f32) {
        // WebGL1 has no float-valued texture parameters; values are
        // converted and validated as integers.
        self.tex_parameter(target, pname, value as i32)
    }

    fn tex_parameter(&mut self, target: u32, pname: u32, value: i32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_texture_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if self.state.bound_texture(target).is_none() {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        let valid_value = match pname {
            gl::TEXTURE_MIN_FILTER => matches!(
                value as u32,
                gl::NEAREST |
                    gl::LINEAR |
                    gl::NEAREST_MIPMAP_NEAREST |
                    gl::LINEAR_MIPMAP_NEAREST |
                    gl::NEAREST_MIPMAP_LINEAR |
                    gl::LINEAR_MIPMAP_LINEAR
            ),
            gl::TEXTURE_MAG_FILTER => matches!(value as u32, gl::NEAREST | gl::LINEAR),
            gl::TEXTURE_WRAP_S | gl::TEXTURE_WRAP_T => matches!(
                value as u32,
                gl::CLAMP_TO_EDGE | gl::MIRRORED_REPEAT | gl::REPEAT
            ),
            _ => return self.webgl_error(WebGLError::InvalidEnum),
        };
        if !valid_value {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        self.driver.tex_parameter_i(target, pname, value);
    }

    pub fn get_tex_parameter(&mut self, target: u32, pname: u32) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        if !is_texture_target(target) {
            self.webgl_error(WebGLError::InvalidEnum);
            return 0;
        }
        if self.state.bound_texture(target).is_none() {
            self.webgl_error(WebGLError::InvalidOperation);
            return 0;
        }
        let param = handle_potential_webgl_error!(self, TexParameter::from_u32(pname), return 0);
        match param {
            TexParameter::Int(TexParameterInt::TextureWrapS) |
            TexParameter::Int(TexParameterInt::TextureWrapT) |
            TexParameter::Int(TexParameterInt::TextureMagFilter) |
            TexParameter::Int(TexParameterInt::TextureMinFilter) => {
                self.driver.tex_parameter_iv(target, pname)
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    ) {
        if !self.ensure_ready() {
            return;
        }
        let validated = handle_potential_webgl_error!(
            self,
            texture::validate_tex_image(
                &self.limits,
                target,
                level,
                internal_format,
                width,
                height,
                border,
                format,
                data_type,
            ),
            return
        );
        let texture_id = match self.state.bound_texture(validated.target.texture_target()) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };

        let expected = texture::expected_byte_length(
            validated.size,
            validated.format,
            validated.data_type,
            self.state.unpack_alignment as u32,
        );
        let prepared = match pixels {
            Some(data) => {
                if data.len() < expected {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                Some(texture::prepare_pixels(
                    validated.format,
                    validated.data_type,
                    validated.size,
                    self.state.unpack_alignment as u32,
                    self.state.unpack_flip_y,
                    self.state.unpack_premultiply_alpha,
                    data[..expected].to_vec(),
                ))
            },
            None => None,
        };

        self.driver
            .pixel_store_i(gl::UNPACK_ALIGNMENT, self.state.unpack_alignment);
        self.driver.tex_image_2d(
            validated.target.as_gl_constant(),
            validated.level as i32,
            validated.internal_format.as_gl_constant() as i32,
            validated.size.width as i32,
            validated.size.height as i32,
            validated.format.as_gl_constant(),
            validated.data_type.as_gl_constant(),
            prepared.as_deref(),
        );

        if let Ok(entry) = self.resources.textures.resolve_mut(texture_id) {
            entry.info_mut().set_image_info(
                validated.target,
                validated.level,
                validated.size.width,
                validated.size.height,
                validated.internal_format,
                Some(validated.data_type),
            );
        }
        self.refresh_framebuffers_referencing_texture(texture_id);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tex_sub_image_2d(
        &mut self,
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
        if !self.ensure_ready() {
            return;
        }
        let validated = handle_potential_webgl_error!(
            self,
            texture::validate_tex_image(
                &self.limits,
                target,
                level,
                format,
                width,
                height,
                0,
                format,
                data_type,
            ),
            return
        );
        let texture_id = match self.state.bound_texture(validated.target.texture_target()) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        if xoffset < 0 || yoffset < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }

        let image = match self
            .resources
            .textures
            .resolve(texture_id)
            .ok()
            .and_then(|entry| entry.info().image_info(validated.target, validated.level))
        {
            Some(image) => *image,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        if xoffset as u32 + validated.size.width > image.width() ||
            yoffset as u32 + validated.size.height > image.height()
        {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        // The update must match the type and format the image was
        // defined with.
        if image.internal_format() != validated.format ||
            image.data_type() != Some(validated.data_type)
        {
            return self.webgl_error(WebGLError::InvalidOperation);
        }

        let expected = texture::expected_byte_length(
            validated.size,
            validated.format,
            validated.data_type,
            self.state.unpack_alignment as u32,
        );
        if pixels.len() < expected {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        let prepared = texture::prepare_pixels(
            validated.format,
            validated.data_type,
            validated.size,
            self.state.unpack_alignment as u32,
            self.state.unpack_flip_y,
            self.state.unpack_premultiply_alpha,
            pixels[..expected].to_vec(),
        );

        self.driver
            .pixel_store_i(gl::UNPACK_ALIGNMENT, self.state.unpack_alignment);
        self.driver.tex_sub_image_2d(
            validated.target.as_gl_constant(),
            validated.level as i32,
            xoffset,
            yoffset,
            validated.size.width as i32,
            validated.size.height as i32,
            validated.format.as_gl_constant(),
            validated.data_type.as_gl_constant(),
            &prepared,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn copy_tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        border: i32,
    ) {
        if !self.ensure_ready() {
            return;
        }
        let validated = handle_potential_webgl_error!(
            self,
            texture::validate_tex_image(
                &self.limits,
                target,
                level,
                internal_format,
                width,
                height,
                border,
                internal_format,
                gl::UNSIGNED_BYTE,
            ),
            return
        );
        // Only color formats can be the destination of a copy.
        if validated.internal_format == webgl_traits::TexFormat::DepthComponent {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let texture_id = match self.state.bound_texture(validated.target.texture_target()) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        handle_potential_webgl_error!(self, self.validate_framebuffer(), return);

        self.driver.copy_tex_image_2d(
            validated.target.as_gl_constant(),
            validated.level as i32,
            validated.internal_format.as_gl_constant(),
            x,
            y,
            validated.size.width as i32,
            validated.size.height as i32,
            0,
        );

        if let Ok(entry) = self.resources.textures.resolve_mut(texture_id) {
            entry.info_mut().set_image_info(
                validated.target,
                validated.level,
                validated.size.width,
                validated.size.height,
                validated.internal_format,
                Some(webgl_traits::TexDataType::UnsignedByte),
            );
        }
        self.refresh_framebuffers_referencing_texture(texture_id);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn copy_tex_sub_image_2d(
        &mut self,
        target: u32,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) {
        if !self.ensure_ready() {
            return;
        }
        let target = match TexImageTarget::from_gl_constant(target) {
            Some(target) => target,
            None => return self.webgl_error(WebGLError::InvalidEnum),
        };
        if level < 0 || width < 0 || height < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        let texture_id = match self.state.bound_texture(target.texture_target()) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        let image = match self
            .resources
            .textures
            .resolve(texture_id)
            .ok()
            .and_then(|entry| entry.info().image_info(target, level as u32))
        {
            Some(image) => *image,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        if xoffset < 0 ||
            yoffset < 0 ||
            xoffset as u32 + width as u32 > image.width() ||
            yoffset as u32 + height as u32 > image.height()
        {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        handle_potential_webgl_error!(self, self.validate_framebuffer(), return);
        self.driver.copy_tex_sub_image_2d(
            target.as_gl_constant(),
            level,
            xoffset,
            yoffset,
            x,
            y,
            width,
            height,
        );
    }

    pub fn generate_mipmap(&mut self, target: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_texture_target(target) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let texture_id = match self.state.bound_texture(target) {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        let base = match target {
            gl::TEXTURE_2D => TexImageTarget::Texture2D,
            _ => TexImageTarget::CubeMapPositiveX,
        };
        let image = self
            .resources
            .textures
            .resolve(texture_id)
            .ok()
            .and_then(|entry| entry.info().image_info(base, 0).copied());
        let image = match image {
            Some(image) => image,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        // WebGL1 requires power-of-two dimensions for mipmap
        // generation.
        if !image.width().is_power_of_two() || !image.height().is_power_of_two() {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        self.driver.generate_mipmap(target);
    }

    // Renderbuffer objects
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.7

    pub fn create_renderbuffer(&mut self) -> Option<RenderbufferId> {
        if !self.ensure_ready() {
            return None;
        }
        let name = self.driver.create_renderbuffer();
        if name == 0 {
            return None;
        }
        let entry = DriverObject::new(name, RenderbufferInfo::default());
        match self.resources.renderbuffers.allocate(entry) {
            Some(id) => Some(id),
            None => {
                self.driver.delete_renderbuffer(name);
                self.webgl_error(WebGLError::OutOfMemory);
                None
            },
        }
    }

    pub fn bind_renderbuffer(&mut self, target: u32, renderbuffer: Option<RenderbufferId>) {
        if !self.ensure_ready() {
            return;
        }
        if target != gl::RENDERBUFFER {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let name = match renderbuffer {
            Some(id) => {
                let entry = handle_potential_webgl_error!(
                    self,
                    self.resources.renderbuffers.resolve_mut(id),
                    return
                );
                if entry.is_deleted() {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                entry.info_mut().mark_bound();
                self.resources.retain_renderbuffer(id);
                entry_name(&self.resources.renderbuffers, id)
            },
            None => 0,
        };
        let previous = std::mem::replace(&mut self.state.renderbuffer, renderbuffer);
        if let Some(previous) = previous {
            self.resources.unref_renderbuffer(&self.driver, previous);
        }
        self.driver.bind_renderbuffer(target, name);
    }

    pub fn renderbuffer_storage(&mut self, target: u32, internal_format: u32, width: i32, height: i32) {
        if !self.ensure_ready() {
            return;
        }
        if target != gl::RENDERBUFFER {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        match internal_format {
            gl::RGBA4 | gl::RGB5_A1 | gl::RGB565 | gl::DEPTH_COMPONENT16 | gl::STENCIL_INDEX8 |
            gl::DEPTH_STENCIL => {},
            _ => return self.webgl_error(WebGLError::InvalidEnum),
        }
        let max = self.limits.max_renderbuffer_size as i32;
        if width < 0 || height < 0 || width > max || height > max {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        let bound = match self.state.renderbuffer {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        if let Ok(entry) = self.resources.renderbuffers.resolve_mut(bound) {
            entry
                .info_mut()
                .record_storage(internal_format, width, height);
        }
        self.driver
            .renderbuffer_storage(target, internal_format, width, height);
        self.refresh_framebuffers_referencing_renderbuffer(bound);
    }

    /// Marks the renderbuffer deleted. The renderbuffer binding and
    /// framebuffer attachments keep it alive until they release it.
    pub fn delete_renderbuffer(&mut self, renderbuffer: Option<RenderbufferId>) {
        if !self.ensure_ready() {
            return;
        }
        if let Some(id) = renderbuffer {
            self.resources.mark_renderbuffer_deleted(&self.driver, id);
        }
    }

    pub fn is_renderbuffer(&mut self, renderbuffer: Option<RenderbufferId>) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        renderbuffer.map_or(false, |id| {
            self.resources
                .renderbuffers
                .resolve(id)
                .map_or(false, |entry| {
                    !entry.is_deleted() && entry.info().ever_bound()
                })
        })
    }

    pub fn get_renderbuffer_parameter(&mut self, target: u32, pname: u32) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        if target != gl::RENDERBUFFER {
            self.webgl_error(WebGLError::InvalidEnum);
            return 0;
        }
        let bound = match self.state.renderbuffer {
            Some(id) => id,
            None => {
                self.webgl_error(WebGLError::InvalidOperation);
                return 0;
            },
        };
        let entry = match self.resources.renderbuffers.resolve(bound) {
            Ok(entry) => entry,
            Err(_) => return 0,
        };
        match pname {
            gl::RENDERBUFFER_WIDTH => entry.info().size().map_or(0, |(w, _)| w),
            gl::RENDERBUFFER_HEIGHT => entry.info().size().map_or(0, |(_, h)| h),
            gl::RENDERBUFFER_INTERNAL_FORMAT => {
                entry.info().internal_format().unwrap_or(gl::RGBA4) as i32
            },
            gl::RENDERBUFFER_RED_SIZE |
            gl::RENDERBUFFER_GREEN_SIZE |
            gl::RENDERBUFFER_BLUE_SIZE |
            gl::RENDERBUFFER_ALPHA_SIZE |
            gl::RENDERBUFFER_DEPTH_SIZE |
            gl::RENDERBUFFER_STENCIL_SIZE => self.driver.renderbuffer_parameter_iv(target, pname),
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                0
            },
        }
    }

    // Framebuffer objects
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.6

    pub fn create_framebuffer(&mut self) -> Option<FramebufferId> {
        if !self.ensure_ready() {
            return None;
        }
        let name = self.driver.create_framebuffer();
        if name == 0 {
            return None;
        }
        let entry = DriverObject::new(name, FramebufferInfo::new());
        match self.resources.framebuffers.allocate(entry) {
            Some(id) => Some(id),
            None => {
                self.driver.delete_framebuffer(name);
                self.webgl_error(WebGLError::OutOfMemory);
                None
            },
        }
    }

    pub fn bind_framebuffer(&mut self, target: u32, framebuffer: Option<FramebufferId>) {
        if !self.ensure_ready() {
            return;
        }
        if target != gl::FRAMEBUFFER {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let name = match framebuffer {
            Some(id) => {
                let entry = handle_potential_webgl_error!(
                    self,
                    self.resources.framebuffers.resolve_mut(id),
                    return
                );
                if entry.is_deleted() {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                entry.info_mut().mark_bound();
                self.resources.retain_framebuffer(id);
                // The status may have changed while unbound if the
                // attachments were resized or deleted.
                self.update_framebuffer_status(id);
                entry_name(&self.resources.framebuffers, id)
            },
            None => self.driver.default_framebuffer(),
        };
        let previous = std::mem::replace(&mut self.state.framebuffer, framebuffer);
        if let Some(previous) = previous {
            let destroyed = self.resources.unref_framebuffer(&self.driver, previous);
            self.release_framebuffer_attachments(destroyed);
        }
        self.driver.bind_framebuffer(target, name);
    }

    /// Marks the framebuffer deleted. A bound framebuffer stays alive
    /// until unbound; destruction releases its attachment references.
    pub fn delete_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        if !self.ensure_ready() {
            return;
        }
        if let Some(id) = framebuffer {
            let destroyed = self.resources.mark_framebuffer_deleted(&self.driver, id);
            self.release_framebuffer_attachments(destroyed);
        }
    }

    pub fn is_framebuffer(&mut self, framebuffer: Option<FramebufferId>) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        framebuffer.map_or(false, |id| {
            self.resources
                .framebuffers
                .resolve(id)
                .map_or(false, |entry| {
                    !entry.is_deleted() && entry.info().ever_bound()
                })
        })
    }

    pub fn framebuffer_renderbuffer(
        &mut self,
        target: u32,
        attachment: u32,
        rb_target: u32,
        renderbuffer: Option<RenderbufferId>,
    ) {
        if !self.ensure_ready() {
            return;
        }
        if target != gl::FRAMEBUFFER || rb_target != gl::RENDERBUFFER {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if !is_attachment_point(attachment) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let fb_id = match self.state.framebuffer {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        let (name, new_attachment) = match renderbuffer {
            Some(id) => {
                let entry = handle_potential_webgl_error!(
                    self,
                    self.resources.renderbuffers.resolve(id),
                    return
                );
                if entry.is_deleted() || !entry.info().ever_bound() {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                (
                    entry.gl_name(),
                    Some(FramebufferAttachment::Renderbuffer(id)),
                )
            },
            None => (0, None),
        };
        if let Some(id) = renderbuffer {
            self.resources.retain_renderbuffer(id);
        }
        let previous = self.replace_attachment(fb_id, attachment, new_attachment);
        self.release_attachment(previous);

        // A DEPTH_STENCIL attachment addresses both driver attachment
        // points.
        let attach = |attachment| {
            self.driver
                .framebuffer_renderbuffer(target, attachment, rb_target, name)
        };
        if attachment == gl::DEPTH_STENCIL_ATTACHMENT {
            attach(gl::DEPTH_ATTACHMENT);
            attach(gl::STENCIL_ATTACHMENT);
        } else {
            attach(attachment);
        }

        self.update_framebuffer_status(fb_id);
    }

    pub fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        textarget: u32,
        texture: Option<TextureId>,
        level: i32,
    ) {
        if !self.ensure_ready() {
            return;
        }
        if target != gl::FRAMEBUFFER {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if !is_attachment_point(attachment) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let fb_id = match self.state.framebuffer {
            Some(id) => id,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        let (name, new_attachment) = match texture {
            Some(id) => {
                // GLES 2.0.25, page 113: level must be 0.
                if level != 0 {
                    return self.webgl_error(WebGLError::InvalidValue);
                }
                let image_target = match TexImageTarget::from_gl_constant(textarget) {
                    Some(image_target) => image_target,
                    None => return self.webgl_error(WebGLError::InvalidEnum),
                };
                let entry =
                    handle_potential_webgl_error!(self, self.resources.textures.resolve(id), return);
                if entry.is_deleted() {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                // The texture must have been bound to the matching
                // target.
                if entry.info().target() != Some(image_target.texture_target()) {
                    return self.webgl_error(WebGLError::InvalidOperation);
                }
                (
                    entry.gl_name(),
                    Some(FramebufferAttachment::Texture {
                        texture: id,
                        target: image_target,
                        level,
                    }),
                )
            },
            None => (0, None),
        };
        if let Some(id) = texture {
            self.resources.retain_texture(id);
        }
        let previous = self.replace_attachment(fb_id, attachment, new_attachment);
        self.release_attachment(previous);

        let attach = |attachment| {
            self.driver
                .framebuffer_texture_2d(target, attachment, textarget, name, level)
        };
        if attachment == gl::DEPTH_STENCIL_ATTACHMENT {
            attach(gl::DEPTH_ATTACHMENT);
            attach(gl::STENCIL_ATTACHMENT);
        } else {
            attach(attachment);
        }

        self.update_framebuffer_status(fb_id);
    }

    /// Evaluates framebuffer completeness from the tracked attachment
    /// records, without a driver round-trip.
    pub fn check_framebuffer_status(&mut self, target: u32) -> u32 {
        if !self.ensure_ready() {
            return 0;
        }
        if target != gl::FRAMEBUFFER {
            self.webgl_error(WebGLError::InvalidEnum);
            return 0;
        }
        match self.state.framebuffer {
            Some(id) => {
                self.update_framebuffer_status(id);
                self.resources
                    .framebuffers
                    .resolve(id)
                    .map_or(0, |entry| entry.info().status())
            },
            // The default framebuffer is always complete.
            None => gl::FRAMEBUFFER_COMPLETE,
        }
    }

    pub fn get_framebuffer_attachment_parameter(
        &mut self,
        target: u32,
        attachment: u32,
        pname: u32,
    ) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        if target != gl::FRAMEBUFFER || !is_attachment_point(attachment) {
            self.webgl_error(WebGLError::InvalidEnum);
            return 0;
        }
        let fb_id = match self.state.framebuffer {
            Some(id) => id,
            None => {
                self.webgl_error(WebGLError::InvalidOperation);
                return 0;
            },
        };
        let entry = match self.resources.framebuffers.resolve(fb_id) {
            Ok(entry) => entry,
            Err(_) => return 0,
        };
        let attached = entry.info().attachment(attachment);
        match pname {
            gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE => match attached {
                Some(FramebufferAttachment::Renderbuffer(_)) => gl::RENDERBUFFER as i32,
                Some(FramebufferAttachment::Texture { .. }) => gl::TEXTURE as i32,
                None => gl::NONE as i32,
            },
            gl::FRAMEBUFFER_ATTACHMENT_OBJECT_NAME => match attached {
                Some(FramebufferAttachment::Renderbuffer(id)) => id.get() as i32,
                Some(FramebufferAttachment::Texture { texture, .. }) => texture.get() as i32,
                None => 0,
            },
            gl::FRAMEBUFFER_ATTACHMENT_TEXTURE_LEVEL => match attached {
                Some(FramebufferAttachment::Texture { level, .. }) => *level,
                _ => {
                    self.webgl_error(WebGLError::InvalidEnum);
                    0
                },
            },
            gl::FRAMEBUFFER_ATTACHMENT_TEXTURE_CUBE_MAP_FACE => match attached {
                Some(FramebufferAttachment::Texture { target, .. }) if target.is_cubic() => {
                    target.as_gl_constant() as i32
                },
                Some(FramebufferAttachment::Texture { .. }) => 0,
                _ => {
                    self.webgl_error(WebGLError::InvalidEnum);
                    0
                },
            },
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                0
            },
        }
    }

    // Shader and program objects
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.9

    pub fn create_shader(&mut self, shader_type: u32) -> Option<ShaderId> {
        if !self.ensure_ready() {
            return None;
        }
        if shader_type != gl::VERTEX_SHADER && shader_type != gl::FRAGMENT_SHADER {
            self.webgl_error(WebGLError::InvalidEnum);
            return None;
        }
        let name = self.driver.create_shader(shader_type);
        if name == 0 {
            return None;
        }
        let entry = DriverObject::new(name, ShaderInfo::new(shader_type));
        match self.resources.shaders.allocate(entry) {
            Some(id) => Some(id),
            None => {
                self.driver.delete_shader(name);
                self.webgl_error(WebGLError::OutOfMemory);
                None
            },
        }
    }

    pub fn shader_source(&mut self, shader: ShaderId, source: &str) {
        if !self.ensure_ready() {
            return;
        }
        let entry = handle_potential_webgl_error!(self, self.resources.shaders.resolve_mut(shader), return);
        entry.info_mut().set_source(source.to_owned());
        let name = entry.gl_name();
        self.driver.shader_source(name, source);
    }

    pub fn compile_shader(&mut self, shader: ShaderId) {
        if !self.ensure_ready() {
            return;
        }
        let name = {
            let entry =
                handle_potential_webgl_error!(self, self.resources.shaders.resolve(shader), return);
            entry.gl_name()
        };
        self.driver.compile_shader(name);
        let compiled = self.driver.shader_compile_status(name);
        let log = self.driver.shader_info_log(name);
        if let Ok(entry) = self.resources.shaders.resolve_mut(shader) {
            entry.info_mut().record_compilation(compiled, log);
        }
    }

    pub fn delete_shader(&mut self, shader: Option<ShaderId>) {
        if !self.ensure_ready() {
            return;
        }
        let id = match shader {
            Some(id) if self.resources.shaders.contains(id) => id,
            _ => return,
        };
        // A shader attached to a program survives as pending-delete
        // until detached or the program is destroyed.
        self.resources.mark_shader_deleted(&self.driver, id);
    }

    pub fn is_shader(&mut self, shader: Option<ShaderId>) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        // Deleted shaders that remain attached to a program are still
        // shaders; fully destroyed ones no longer resolve.
        shader.map_or(false, |id| self.resources.shaders.contains(id))
    }

    pub fn get_shader_type(&mut self, shader: ShaderId) -> u32 {
        if !self.ensure_ready() {
            return 0;
        }
        handle_potential_webgl_error!(self, self.resources.shaders.resolve(shader), return 0)
            .info()
            .shader_type()
    }

    pub fn get_shader_compile_status(&mut self, shader: ShaderId) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        handle_potential_webgl_error!(self, self.resources.shaders.resolve(shader), return false)
            .info()
            .compile_status()
    }

    pub fn get_shader_delete_status(&mut self, shader: ShaderId) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        handle_potential_webgl_error!(self, self.resources.shaders.resolve(shader), return false)
            .is_deleted()
    }

    pub fn get_shader_info_log(&mut self, shader: ShaderId) -> String {
        if !self.ensure_ready() {
            return String::new();
        }
        handle_potential_webgl_error!(
            self,
            self.resources.shaders.resolve(shader),
            return String::new()
        )
        .info()
        .info_log()
        .to_owned()
    }

    pub fn get_shader_source(&mut self, shader: ShaderId) -> String {
        if !self.ensure_ready() {
            return String::new();
        }
        handle_potential_webgl_error!(
            self,
            self.resources.shaders.resolve(shader),
            return String::new()
        )
        .info()
        .source()
        .to_owned()
    }

    pub fn get_shader_precision_format(
        &mut self,
        shader_type: u32,
        precision_type: u32,
    ) -> (i32, i32, i32) {
        if !self.ensure_ready() {
            return (0, 0, 0);
        }
        if shader_type != gl::VERTEX_SHADER && shader_type != gl::FRAGMENT_SHADER {
            self.webgl_error(WebGLError::InvalidEnum);
            return (0, 0, 0);
        }
        match precision_type {
            gl::LOW_FLOAT |
            gl::MEDIUM_FLOAT |
            gl::HIGH_FLOAT |
            gl::LOW_INT |
            gl::MEDIUM_INT |
            gl::HIGH_INT => {},
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                return (0, 0, 0);
            },
        }
        self.driver
            .shader_precision_format(shader_type, precision_type)
    }

    pub fn create_program(&mut self) -> Option<ProgramId> {
        if !self.ensure_ready() {
            return None;
        }
        let name = self.driver.create_program();
        if name == 0 {
            return None;
        }
        let entry = DriverObject::new(name, ProgramInfo::new());
        match self.resources.programs.allocate(entry) {
            Some(id) => Some(id),
            None => {
                self.driver.delete_program(name);
                self.webgl_error(WebGLError::OutOfMemory);
                None
            },
        }
    }

    pub fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if !self.ensure_ready() {
            return;
        }
        let (shader_name, shader_type) = {
            let entry =
                handle_potential_webgl_error!(self, self.resources.shaders.resolve(shader), return);
            (entry.gl_name(), entry.info().shader_type())
        };
        let (attach_result, program_name) = {
            let entry = handle_potential_webgl_error!(
                self,
                self.resources.programs.resolve_mut(program),
                return
            );
            (entry.info_mut().attach(shader, shader_type), entry.gl_name())
        };
        handle_potential_webgl_error!(self, attach_result, return);
        self.resources.retain_shader(shader);
        self.driver.attach_shader(program_name, shader_name);
    }

    pub fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if !self.ensure_ready() {
            return;
        }
        let (shader_name, shader_type) = {
            let entry =
                handle_potential_webgl_error!(self, self.resources.shaders.resolve(shader), return);
            (entry.gl_name(), entry.info().shader_type())
        };
        let (detach_result, program_name) = {
            let entry = handle_potential_webgl_error!(
                self,
                self.resources.programs.resolve_mut(program),
                return
            );
            (entry.info_mut().detach(shader, shader_type), entry.gl_name())
        };
        handle_potential_webgl_error!(self, detach_result, return);
        self.driver.detach_shader(program_name, shader_name);
        self.resources.unref_shader(&self.driver, shader);
    }

    pub fn bind_attrib_location(&mut self, program: ProgramId, index: u32, name: &str) {
        if !self.ensure_ready() {
            return;
        }
        if index >= self.limits.max_vertex_attribs {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        if name.starts_with("gl_") {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        let program_name = {
            let entry =
                handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return);
            entry.gl_name()
        };
        self.driver.bind_attrib_location(program_name, index, name);
    }

    pub fn link_program(&mut self, program: ProgramId) {
        if !self.ensure_ready() {
            return;
        }
        let name = {
            let entry =
                handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return);
            entry.gl_name()
        };
        self.driver.link_program(name);
        let link_info = self.collect_link_info(name);
        let log = self.driver.program_info_log(name);
        if let Ok(entry) = self.resources.programs.resolve_mut(program) {
            entry.info_mut().record_link(link_info, log);
        }
    }

    /// Captures the post-link introspection data, mirroring the link
    /// bookkeeping the driver keeps.
    fn collect_link_info(&self, name: u32) -> ProgramLinkInfo {
        if !self.driver.program_link_status(name) {
            return ProgramLinkInfo::failed();
        }

        let num_attribs = self.driver.active_attrib_count(name);
        let active_attribs = (0..num_attribs as u32)
            .map(|i| {
                let (size, type_, attrib_name) = self.driver.active_attrib(name, i);
                let location = if attrib_name.starts_with("gl_") {
                    -1
                } else {
                    self.driver.attrib_location(name, &attrib_name)
                };
                ActiveAttribInfo {
                    name: attrib_name,
                    size,
                    type_,
                    location,
                }
            })
            .collect::<Vec<_>>()
            .into();

        let num_uniforms = self.driver.active_uniform_count(name);
        let active_uniforms = (0..num_uniforms as u32)
            .map(|i| {
                let (size, type_, mut uniform_name) = self.driver.active_uniform(name, i);
                let is_array = uniform_name.ends_with("[0]");
                if is_array {
                    let len = uniform_name.len();
                    uniform_name.truncate(len - 3);
                }
                ActiveUniformInfo {
                    base_name: uniform_name.into(),
                    size: if is_array { Some(size) } else { None },
                    type_,
                }
            })
            .collect::<Vec<_>>()
            .into();

        ProgramLinkInfo {
            linked: true,
            active_attribs,
            active_uniforms,
        }
    }

    pub fn use_program(&mut self, program: Option<ProgramId>) {
        if !self.ensure_ready() {
            return;
        }
        let name = match program {
            Some(id) => {
                let name = {
                    let entry = handle_potential_webgl_error!(
                        self,
                        self.resources.programs.resolve(id),
                        return
                    );
                    if entry.is_deleted() || !entry.info().link_status() {
                        return self.webgl_error(WebGLError::InvalidOperation);
                    }
                    entry.gl_name()
                };
                self.resources.retain_program(id);
                name
            },
            None => 0,
        };
        let previous = std::mem::replace(&mut self.state.current_program, program);
        self.driver.use_program(name);
        if let Some(previous) = previous {
            let destroyed = self.resources.unref_program(&self.driver, previous);
            self.release_program_shaders(destroyed);
        }
    }

    pub fn delete_program(&mut self, program: Option<ProgramId>) {
        if !self.ensure_ready() {
            return;
        }
        let id = match program {
            Some(id) if self.resources.programs.contains(id) => id,
            _ => return,
        };
        // The current program stays in use until replaced; deletion is
        // deferred through the pending-delete set.
        let destroyed = self.resources.mark_program_deleted(&self.driver, id);
        self.release_program_shaders(destroyed);
    }

    pub fn is_program(&mut self, program: Option<ProgramId>) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        program.map_or(false, |id| {
            self.resources
                .programs
                .resolve(id)
                .map_or(false, |entry| !entry.is_deleted())
        })
    }

    pub fn validate_program(&mut self, program: ProgramId) {
        if !self.ensure_ready() {
            return;
        }
        let name = {
            let entry =
                handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return);
            entry.gl_name()
        };
        self.driver.validate_program(name);
    }

    pub fn get_program_link_status(&mut self, program: ProgramId) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return false)
            .info()
            .link_status()
    }

    pub fn get_program_delete_status(&mut self, program: ProgramId) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return false)
            .is_deleted()
    }

    pub fn get_program_validate_status(&mut self, program: ProgramId) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        let name =
            handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return false)
                .gl_name();
        self.driver.program_validate_status(name)
    }

    pub fn get_program_attached_shaders(&mut self, program: ProgramId) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return 0)
            .info()
            .attached_count()
    }

    pub fn get_program_active_attributes(&mut self, program: ProgramId) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return 0)
            .info()
            .link_info()
            .map_or(0, |info| info.active_attribs.len() as i32)
    }

    pub fn get_program_active_uniforms(&mut self, program: ProgramId) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return 0)
            .info()
            .link_info()
            .map_or(0, |info| info.active_uniforms.len() as i32)
    }

    pub fn get_program_info_log(&mut self, program: ProgramId) -> String {
        if !self.ensure_ready() {
            return String::new();
        }
        handle_potential_webgl_error!(
            self,
            self.resources.programs.resolve(program),
            return String::new()
        )
        .info()
        .info_log()
        .to_owned()
    }

    pub fn get_active_attrib(
        &mut self,
        program: ProgramId,
        index: u32,
    ) -> Option<ActiveAttribInfo> {
        if !self.ensure_ready() {
            return None;
        }
        let entry =
            handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return None);
        let attribs = entry
            .info()
            .link_info()
            .map(|info| &info.active_attribs)
            .filter(|attribs| (index as usize) < attribs.len());
        match attribs {
            Some(attribs) => Some(attribs[index as usize].clone()),
            None => {
                self.webgl_error(WebGLError::InvalidValue);
                None
            },
        }
    }

    pub fn get_active_uniform(
        &mut self,
        program: ProgramId,
        index: u32,
    ) -> Option<ActiveUniformInfo> {
        if !self.ensure_ready() {
            return None;
        }
        let entry =
            handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return None);
        let uniforms = entry
            .info()
            .link_info()
            .map(|info| &info.active_uniforms)
            .filter(|uniforms| (index as usize) < uniforms.len());
        match uniforms {
            Some(uniforms) => Some(uniforms[index as usize].clone()),
            None => {
                self.webgl_error(WebGLError::InvalidValue);
                None
            },
        }
    }

    pub fn get_attrib_location(&mut self, program: ProgramId, name: &str) -> i32 {
        if !self.ensure_ready() {
            return -1;
        }
        let entry =
            handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return -1);
        if !entry.info().link_status() {
            self.webgl_error(WebGLError::InvalidOperation);
            return -1;
        }
        entry
            .info()
            .link_info()
            .and_then(|info| {
                info.active_attribs
                    .iter()
                    .find(|attrib| attrib.name == name)
                    .map(|attrib| attrib.location)
            })
            .unwrap_or(-1)
    }

    pub fn get_uniform_location(&mut self, program: ProgramId, name: &str) -> i32 {
        if !self.ensure_ready() {
            return -1;
        }
        let entry =
            handle_potential_webgl_error!(self, self.resources.programs.resolve(program), return -1);
        if !entry.info().link_status() {
            self.webgl_error(WebGLError::InvalidOperation);
            return -1;
        }
        let program_name = entry.gl_name();
        self.driver.uniform_location(program_name, name)
    }

    // Uniforms

    fn validate_uniform_call(&mut self) -> bool {
        if self.state.current_program.is_none() {
            self.webgl_error(WebGLError::InvalidOperation);
            return false;
        }
        true
    }

    pub fn uniform1f(&mut self, location: i32, x: f32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_1f(location, x);
    }

    pub fn uniform2f(&mut self, location: i32, x: f32, y: f32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_2f(location, x, y);
    }

    pub fn uniform3f(&mut self, location: i32, x: f32, y: f32, z: f32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_3f(location, x, y, z);
    }

    pub fn uniform4f(&mut self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_4f(location, x, y, z, w);
    }

    pub fn uniform1i(&mut self, location: i32, x: i32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_1i(location, x);
    }

    pub fn uniform2i(&mut self, location: i32, x: i32, y: i32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_2i(location, x, y);
    }

    pub fn uniform3i(&mut self, location: i32, x: i32, y: i32, z: i32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_3i(location, x, y, z);
    }

    pub fn uniform4i(&mut self, location: i32, x: i32, y: i32, z: i32, w: i32) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        self.driver.uniform_4i(location, x, y, z, w);
    }

    fn validate_uniform_vector(&mut self, len: usize, component_count: usize) -> bool {
        if len == 0 || len % component_count != 0 {
            self.webgl_error(WebGLError::InvalidValue);
            return false;
        }
        true
    }

    pub fn uniform1fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 1) {
            self.driver.uniform_1fv(location, values);
        }
    }

    pub fn uniform2fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 2) {
            self.driver.uniform_2fv(location, values);
        }
    }

    pub fn uniform3fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 3) {
            self.driver.uniform_3fv(location, values);
        }
    }

    pub fn uniform4fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 4) {
            self.driver.uniform_4fv(location, values);
        }
    }

    pub fn uniform1iv(&mut self, location: i32, values: &[i32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 1) {
            self.driver.uniform_1iv(location, values);
        }
    }

    pub fn uniform2iv(&mut self, location: i32, values: &[i32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 2) {
            self.driver.uniform_2iv(location, values);
        }
    }

    pub fn uniform3iv(&mut self, location: i32, values: &[i32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 3) {
            self.driver.uniform_3iv(location, values);
        }
    }

    pub fn uniform4iv(&mut self, location: i32, values: &[i32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 4) {
            self.driver.uniform_4iv(location, values);
        }
    }

    pub fn uniform_matrix2fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 4) {
            self.driver.uniform_matrix_2fv(location, values);
        }
    }

    pub fn uniform_matrix3fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 9) {
            self.driver.uniform_matrix_3fv(location, values);
        }
    }

    pub fn uniform_matrix4fv(&mut self, location: i32, values: &[f32]) {
        if !self.ensure_ready() || !self.validate_uniform_call() || location == -1 {
            return;
        }
        if self.validate_uniform_vector(values.len(), 16) {
            self.driver.uniform_matrix_4fv(location, values);
        }
    }

    // Vertex attributes

    pub fn enable_vertex_attrib_array(&mut self, index: u32) {
        if !self.ensure_ready() {
            return;
        }
        if index >= self.limits.max_vertex_attribs {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.state.vertex_attribs[index as usize].enabled = true;
        self.driver.enable_vertex_attrib_array(index);
    }

    pub fn disable_vertex_attrib_array(&mut self, index: u32) {
        if !self.ensure_ready() {
            return;
        }
        if index >= self.limits.max_vertex_attribs {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.state.vertex_attribs[index as usize].enabled = false;
        self.driver.disable_vertex_attrib_array(index);
    }

    pub fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: u32,
    ) {
        if !self.ensure_ready() {
            return;
        }
        match data_type {
            gl::BYTE | gl::UNSIGNED_BYTE | gl::SHORT | gl::UNSIGNED_SHORT | gl::FLOAT => {},
            _ => return self.webgl_error(WebGLError::InvalidEnum),
        }
        if index >= self.limits.max_vertex_attribs {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        if !(1..=4).contains(&size) || !(0..=255).contains(&stride) {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        // Stride and offset must be aligned to the element size.
        let element_size = match data_type {
            gl::BYTE | gl::UNSIGNED_BYTE => 1,
            gl::SHORT | gl::UNSIGNED_SHORT => 2,
            _ => 4,
        };
        if stride % element_size != 0 || offset % element_size as u32 != 0 {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        let buffer = match self.state.array_buffer {
            Some(buffer) => buffer,
            None => return self.webgl_error(WebGLError::InvalidOperation),
        };
        self.state.vertex_attribs[index as usize] = VertexAttrib {
            enabled: self.state.vertex_attribs[index as usize].enabled,
            size,
            data_type,
            normalized,
            stride,
            offset,
            buffer: Some(buffer),
        };
        self.driver
            .vertex_attrib_pointer(index, size, data_type, normalized, stride, offset);
    }

    pub fn vertex_attrib1f(&mut self, index: u32, x: f32) {
        self.vertex_attrib4f(index, x, 0., 0., 1.)
    }

    pub fn vertex_attrib2f(&mut self, index: u32, x: f32, y: f32) {
        self.vertex_attrib4f(index, x, y, 0., 1.)
    }

    pub fn vertex_attrib3f(&mut self, index: u32, x: f32, y: f32, z: f32) {
        self.vertex_attrib4f(index, x, y, z, 1.)
    }

    pub fn vertex_attrib4f(&mut self, index: u32, x: f32, y: f32, z: f32, w: f32) {
        if !self.ensure_ready() {
            return;
        }
        if index >= self.limits.max_vertex_attribs {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        self.driver.vertex_attrib_4f(index, x, y, z, w);
    }

    pub fn get_current_vertex_attrib(&mut self, index: u32) -> [f32; 4] {
        if !self.ensure_ready() {
            return [0.; 4];
        }
        if index >= self.limits.max_vertex_attribs {
            self.webgl_error(WebGLError::InvalidValue);
            return [0.; 4];
        }
        self.driver.current_vertex_attrib(index)
    }

    pub fn get_vertex_attrib(&mut self, index: u32, pname: u32) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        if index >= self.limits.max_vertex_attribs {
            self.webgl_error(WebGLError::InvalidValue);
            return 0;
        }
        let attrib = &self.state.vertex_attribs[index as usize];
        match pname {
            gl::VERTEX_ATTRIB_ARRAY_ENABLED => attrib.enabled as i32,
            gl::VERTEX_ATTRIB_ARRAY_SIZE => attrib.size,
            gl::VERTEX_ATTRIB_ARRAY_STRIDE => attrib.stride,
            gl::VERTEX_ATTRIB_ARRAY_TYPE => attrib.data_type as i32,
            gl::VERTEX_ATTRIB_ARRAY_NORMALIZED => attrib.normalized as i32,
            gl::VERTEX_ATTRIB_ARRAY_POINTER => attrib.offset as i32,
            gl::VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => {
                attrib.buffer.map_or(0, |id| id.get() as i32)
            },
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                0
            },
        }
    }

    // Drawing
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.11

    pub fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_primitive_mode(mode) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        if first < 0 || count < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        if !self.validate_current_program_for_draw() {
            return;
        }
        handle_potential_webgl_error!(self, self.validate_framebuffer(), return);
        if count == 0 {
            return;
        }
        self.driver.draw_arrays(mode, first, count);
    }

    pub fn draw_elements(&mut self, mode: u32, count: i32, element_type: u32, offset: u32) {
        if !self.ensure_ready() {
            return;
        }
        if !is_primitive_mode(mode) {
            return self.webgl_error(WebGLError::InvalidEnum);
        }
        let type_size = match element_type {
            gl::UNSIGNED_BYTE => 1,
            gl::UNSIGNED_SHORT => 2,
            _ => return self.webgl_error(WebGLError::InvalidEnum),
        };
        if count < 0 {
            return self.webgl_error(WebGLError::InvalidValue);
        }
        if offset % type_size != 0 {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        if self.state.element_array_buffer.is_none() {
            return self.webgl_error(WebGLError::InvalidOperation);
        }
        if !self.validate_current_program_for_draw() {
            return;
        }
        handle_potential_webgl_error!(self, self.validate_framebuffer(), return);
        if count == 0 {
            return;
        }
        self.driver.draw_elements(mode, count, element_type, offset);
    }

    fn validate_current_program_for_draw(&mut self) -> bool {
        let linked = self
            .state
            .current_program
            .and_then(|id| self.resources.programs.resolve(id).ok())
            .map_or(false, |entry| entry.info().link_status());
        if !linked {
            self.webgl_error(WebGLError::InvalidOperation);
        }
        linked
    }

    // Pixel reads and synchronization

    pub fn read_pixels(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        pixel_type: u32,
    ) -> Vec<u8> {
        if !self.ensure_ready() {
            return Vec::new();
        }
        let recognized_format = matches!(
            format,
            gl::ALPHA | gl::RGB | gl::RGBA
        );
        let recognized_type = matches!(
            pixel_type,
            gl::UNSIGNED_BYTE |
                gl::UNSIGNED_SHORT_4_4_4_4 |
                gl::UNSIGNED_SHORT_5_5_5_1 |
                gl::UNSIGNED_SHORT_5_6_5
        );
        if !recognized_format || !recognized_type {
            self.webgl_error(WebGLError::InvalidEnum);
            return Vec::new();
        }
        // Only the RGBA/UNSIGNED_BYTE combination is required to be
        // readable in WebGL1.
        if format != gl::RGBA || pixel_type != gl::UNSIGNED_BYTE {
            self.webgl_error(WebGLError::InvalidOperation);
            return Vec::new();
        }
        if width < 0 || height < 0 {
            self.webgl_error(WebGLError::InvalidValue);
            return Vec::new();
        }
        handle_potential_webgl_error!(self, self.validate_framebuffer(), return Vec::new());
        self.driver
            .read_pixels(x, y, width, height, format, pixel_type)
    }

    pub fn flush(&mut self) {
        if !self.ensure_ready() {
            return;
        }
        self.driver.flush();
    }

    pub fn finish(&mut self) {
        if !self.ensure_ready() {
            return;
        }
        self.driver.finish();
    }

    // Parameter queries
    // https://www.khronos.org/registry/webgl/specs/latest/1.0/#5.14.3

    /// Typed scalar query dispatch. Tracked state is answered locally;
    /// only hardware-derived values round-trip to the driver.
    pub fn get_parameter_int(&mut self, pname: u32) -> i32 {
        if !self.ensure_ready() {
            return 0;
        }
        // Limits are cached at creation time.
        match pname {
            gl::MAX_TEXTURE_SIZE => return self.limits.max_tex_size as i32,
            gl::MAX_CUBE_MAP_TEXTURE_SIZE => return self.limits.max_cube_map_tex_size as i32,
            gl::MAX_RENDERBUFFER_SIZE => return self.limits.max_renderbuffer_size as i32,
            gl::MAX_VERTEX_ATTRIBS => return self.limits.max_vertex_attribs as i32,
            gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS => {
                return self.limits.max_combined_texture_image_units as i32;
            },
            gl::MAX_TEXTURE_IMAGE_UNITS => return self.limits.max_texture_image_units as i32,
            gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS => {
                return self.limits.max_vertex_texture_image_units as i32;
            },
            gl::MAX_VERTEX_UNIFORM_VECTORS => {
                return self.limits.max_vertex_uniform_vectors as i32;
            },
            gl::MAX_FRAGMENT_UNIFORM_VECTORS => {
                return self.limits.max_fragment_uniform_vectors as i32;
            },
            gl::MAX_VARYING_VECTORS => return self.limits.max_varying_vectors as i32,
            _ => {},
        }
        let param = match Parameter::from_u32(pname) {
            Ok(Parameter::Int(param)) => param,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                return 0;
            },
        };
        match param {
            ParameterInt::ActiveTexture => (gl::TEXTURE0 + self.state.active_unit) as i32,
            ParameterInt::BlendDstAlpha => self.state.blend_dst_alpha as i32,
            ParameterInt::BlendDstRgb => self.state.blend_dst_rgb as i32,
            ParameterInt::BlendEquationAlpha => self.state.blend_equation_alpha as i32,
            ParameterInt::BlendEquationRgb => self.state.blend_equation_rgb as i32,
            ParameterInt::BlendSrcAlpha => self.state.blend_src_alpha as i32,
            ParameterInt::BlendSrcRgb => self.state.blend_src_rgb as i32,
            ParameterInt::CullFaceMode => self.state.cull_face_mode as i32,
            ParameterInt::DepthFunc => self.state.depth_func as i32,
            ParameterInt::FrontFace => self.state.front_face as i32,
            ParameterInt::GenerateMipmapHint => self.state.generate_mipmap_hint as i32,
            ParameterInt::PackAlignment => self.state.pack_alignment,
            ParameterInt::UnpackAlignment => self.state.unpack_alignment,
            ParameterInt::StencilBackFail => self.state.stencil_back.fail_op as i32,
            ParameterInt::StencilBackFunc => self.state.stencil_back.func as i32,
            ParameterInt::StencilBackPassDepthFail => {
                self.state.stencil_back.depth_fail_op as i32
            },
            ParameterInt::StencilBackPassDepthPass => {
                self.state.stencil_back.depth_pass_op as i32
            },
            ParameterInt::StencilBackRef => self.state.stencil_back.reference,
            ParameterInt::StencilBackValueMask => self.state.stencil_back.value_mask as i32,
            ParameterInt::StencilBackWritemask => self.state.stencil_back.write_mask as i32,
            ParameterInt::StencilClearValue => self.state.clear_stencil,
            ParameterInt::StencilFail => self.state.stencil_front.fail_op as i32,
            ParameterInt::StencilFunc => self.state.stencil_front.func as i32,
            ParameterInt::StencilPassDepthFail => self.state.stencil_front.depth_fail_op as i32,
            ParameterInt::StencilPassDepthPass => self.state.stencil_front.depth_pass_op as i32,
            ParameterInt::StencilRef => self.state.stencil_front.reference,
            ParameterInt::StencilValueMask => self.state.stencil_front.value_mask as i32,
            ParameterInt::StencilWritemask => self.state.stencil_front.write_mask as i32,
            // Bit depths and sampling are properties of the underlying
            // surface configuration.
            ParameterInt::AlphaBits |
            ParameterInt::RedBits |
            ParameterInt::GreenBits |
            ParameterInt::BlueBits |
            ParameterInt::DepthBits |
            ParameterInt::StencilBits |
            ParameterInt::SampleBuffers |
            ParameterInt::Samples |
            ParameterInt::SubpixelBits => {
                let mut value = [0];
                self.driver.get_integer_v(pname, &mut value);
                value[0]
            },
        }
    }

    pub fn get_parameter_bool(&mut self, pname: u32) -> bool {
        if !self.ensure_ready() {
            return false;
        }
        let param = match Parameter::from_u32(pname) {
            Ok(Parameter::Bool(param)) => param,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                return false;
            },
        };
        match param {
            ParameterBool::DepthWritemask => self.state.depth_write_mask,
            ParameterBool::SampleCoverageInvert => self.state.sample_coverage.1,
        }
    }

    pub fn get_parameter_bool4(&mut self, pname: u32) -> [bool; 4] {
        if !self.ensure_ready() {
            return [false; 4];
        }
        match Parameter::from_u32(pname) {
            Ok(Parameter::Bool4(ParameterBool4::ColorWritemask)) => self.state.color_write_mask,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                [false; 4]
            },
        }
    }

    pub fn get_parameter_int2(&mut self, pname: u32) -> [i32; 2] {
        if !self.ensure_ready() {
            return [0; 2];
        }
        match Parameter::from_u32(pname) {
            Ok(Parameter::Int2(ParameterInt2::MaxViewportDims)) => [
                self.limits.max_viewport_dims[0] as i32,
                self.limits.max_viewport_dims[1] as i32,
            ],
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                [0; 2]
            },
        }
    }

    pub fn get_parameter_int4(&mut self, pname: u32) -> [i32; 4] {
        if !self.ensure_ready() {
            return [0; 4];
        }
        match Parameter::from_u32(pname) {
            Ok(Parameter::Int4(ParameterInt4::Viewport)) => {
                let rect = self.state.viewport;
                [
                    rect.origin.x,
                    rect.origin.y,
                    rect.size.width,
                    rect.size.height,
                ]
            },
            Ok(Parameter::Int4(ParameterInt4::ScissorBox)) => {
                let rect = self.state.scissor;
                [
                    rect.origin.x,
                    rect.origin.y,
                    rect.size.width,
                    rect.size.height,
                ]
            },
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                [0; 4]
            },
        }
    }

    pub fn get_parameter_float(&mut self, pname: u32) -> f32 {
        if !self.ensure_ready() {
            return 0.;
        }
        let param = match Parameter::from_u32(pname) {
            Ok(Parameter::Float(param)) => param,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                return 0.;
            },
        };
        match param {
            ParameterFloat::DepthClearValue => self.state.clear_depth as f32,
            ParameterFloat::LineWidth => self.state.line_width,
            ParameterFloat::PolygonOffsetFactor => self.state.polygon_offset.0,
            ParameterFloat::PolygonOffsetUnits => self.state.polygon_offset.1,
            ParameterFloat::SampleCoverageValue => self.state.sample_coverage.0,
        }
    }

    pub fn get_parameter_float2(&mut self, pname: u32) -> [f32; 2] {
        if !self.ensure_ready() {
            return [0.; 2];
        }
        let param = match Parameter::from_u32(pname) {
            Ok(Parameter::Float2(param)) => param,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                return [0.; 2];
            },
        };
        match param {
            ParameterFloat2::DepthRange => {
                [self.state.depth_range.0 as f32, self.state.depth_range.1 as f32]
            },
            ParameterFloat2::AliasedPointSizeRange | ParameterFloat2::AliasedLineWidthRange => {
                let mut value = [0.; 2];
                self.driver.get_float_v(pname, &mut value);
                value
            },
        }
    }

    pub fn get_parameter_float4(&mut self, pname: u32) -> [f32; 4] {
        if !self.ensure_ready() {
            return [0.; 4];
        }
        let param = match Parameter::from_u32(pname) {
            Ok(Parameter::Float4(param)) => param,
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                return [0.; 4];
            },
        };
        match param {
            ParameterFloat4::BlendColor => {
                let (r, g, b, a) = self.state.blend_color;
                [r, g, b, a]
            },
            ParameterFloat4::ColorClearValue => {
                let (r, g, b, a) = self.state.clear_color;
                [r, g, b, a]
            },
        }
    }

    pub fn get_string(&mut self, pname: u32) -> String {
        if !self.ensure_ready() {
            return String::new();
        }
        match pname {
            gl::VENDOR | gl::RENDERER | gl::VERSION | gl::SHADING_LANGUAGE_VERSION => {
                self.driver.get_string(pname)
            },
            _ => {
                self.webgl_error(WebGLError::InvalidEnum);
                String::new()
            },
        }
    }

    // Binding queries, answered from the state tracker.

    pub fn bound_array_buffer(&self) -> Option<BufferId> {
        self.state.array_buffer
    }

    pub fn bound_element_array_buffer(&self) -> Option<BufferId> {
        self.state.element_array_buffer
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.state.framebuffer
    }

    pub fn bound_renderbuffer(&self) -> Option<RenderbufferId> {
        self.state.renderbuffer
    }

    pub fn bound_texture_2d(&self) -> Option<TextureId> {
        self.state.active_unit().bound_2d
    }

    pub fn bound_texture_cube_map(&self) -> Option<TextureId> {
        self.state.active_unit().bound_cube_map
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.current_program
    }

    // Internal helpers

    /// Fails with `InvalidFramebufferOperation` when the bound
    /// framebuffer is not complete. The default framebuffer is always
    /// complete.
    fn validate_framebuffer(&mut self) -> WebGLResult<()> {
        match self.state.framebuffer {
            Some(id) => {
                self.update_framebuffer_status(id);
                let complete = self
                    .resources
                    .framebuffers
                    .resolve(id)
                    .map_or(false, |entry| {
                        entry.info().status() == gl::FRAMEBUFFER_COMPLETE
                    });
                if complete {
                    Ok(())
                } else {
                    Err(WebGLError::InvalidFramebufferOperation)
                }
            },
            None => Ok(()),
        }
    }

    fn update_framebuffer_status(&mut self, id: FramebufferId) {
        let Resources {
            framebuffers,
            textures,
            renderbuffers,
            ..
        } = &mut self.resources;
        if let Ok(entry) = framebuffers.resolve_mut(id) {
            entry.info_mut().update_status(textures, renderbuffers);
        }
    }

    fn refresh_framebuffers_referencing_texture(&mut self, id: TextureId) {
        let Resources {
            framebuffers,
            textures,
            renderbuffers,
            ..
        } = &mut self.resources;
        for entry in framebuffers.iter_mut() {
            let info = entry.info_mut();
            if info.attachments().any(|(_, att)| att.texture() == Some(id)) {
                info.update_status(textures, renderbuffers);
            }
        }
    }

    fn refresh_framebuffers_referencing_renderbuffer(&mut self, id: RenderbufferId) {
        let Resources {
            framebuffers,
            textures,
            renderbuffers,
            ..
        } = &mut self.resources;
        for entry in framebuffers.iter_mut() {
            let info = entry.info_mut();
            if info
                .attachments()
                .any(|(_, att)| att.renderbuffer() == Some(id))
            {
                info.update_status(textures, renderbuffers);
            }
        }
    }

    /// Swaps the attachment stored at one attachment point, returning
    /// the previous occupant.
    fn replace_attachment(
        &mut self,
        fb_id: FramebufferId,
        attachment: u32,
        new_attachment: Option<FramebufferAttachment>,
    ) -> Option<FramebufferAttachment> {
        match self.resources.framebuffers.resolve_mut(fb_id) {
            Ok(entry) => entry
                .info_mut()
                .attachment_slot(attachment)
                .map(|slot| std::mem::replace(slot, new_attachment))
                .unwrap_or(None),
            Err(_) => None,
        }
    }

    fn release_attachment(&mut self, attachment: Option<FramebufferAttachment>) {
        match attachment {
            Some(FramebufferAttachment::Renderbuffer(id)) => {
                self.resources.unref_renderbuffer(&self.driver, id);
            },
            Some(FramebufferAttachment::Texture { texture, .. }) => {
                self.resources.unref_texture(&self.driver, texture);
            },
            None => {},
        }
    }

    /// Releases the attachment references held by a framebuffer that
    /// was just destroyed.
    fn release_framebuffer_attachments(&mut self, destroyed: Option<DriverObject<FramebufferInfo>>) {
        let entry = match destroyed {
            Some(entry) => entry,
            None => return,
        };
        let attachments: Vec<_> = entry
            .info()
            .attachments()
            .map(|(_, att)| *att)
            .collect();
        for attachment in attachments {
            self.release_attachment(Some(attachment));
        }
    }

    /// Releases the shader references held by a program that was just
    /// destroyed.
    fn release_program_shaders(&mut self, destroyed: Option<DriverObject<ProgramInfo>>) {
        let entry = match destroyed {
            Some(entry) => entry,
            None => return,
        };
        for shader in entry.info().attached_shaders() {
            self.resources.unref_shader(&self.driver, shader);
        }
    }

}

impl<D: Driver> Drop for WebGLContext<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Resolves a handle to its driver name, defaulting to 0. Only used
/// where the handle was just validated.
fn entry_name<I, T>(table: &crate::handles::HandleTable<I, DriverObject<T>>, id: I) -> u32
where
    I: crate::handles::ResourceId,
{
    table.resolve(id).map_or(0, |entry| entry.gl_name())
}

/// The set of objects a state record holds through its binding points.
struct BoundObjects {
    buffers: Vec<BufferId>,
    textures: Vec<TextureId>,
    framebuffer: Option<FramebufferId>,
    renderbuffer: Option<RenderbufferId>,
    program: Option<ProgramId>,
}

fn bound_objects(state: &ContextState) -> BoundObjects {
    let buffers = state
        .array_buffer
        .into_iter()
        .chain(state.element_array_buffer)
        .collect();
    let textures = state
        .texture_units
        .iter()
        .flat_map(|unit| unit.bound_2d.into_iter().chain(unit.bound_cube_map))
        .collect();
    BoundObjects {
        buffers,
        textures,
        framebuffer: state.framebuffer,
        renderbuffer: state.renderbuffer,
        program: state.current_program,
    }
}

/// Drops restored bindings whose objects were destroyed (or marked
/// deleted) after the snapshot was taken.
fn sanitize_restored_bindings(state: &mut ContextState, resources: &Resources) {
    fn live<I, T>(table: &crate::handles::HandleTable<I, DriverObject<T>>, id: I) -> bool
    where
        I: crate::handles::ResourceId,
    {
        table.resolve(id).map_or(false, |entry| !entry.is_deleted())
    }

    state.array_buffer = state
        .array_buffer
        .filter(|&id| live(&resources.buffers, id));
    state.element_array_buffer = state
        .element_array_buffer
        .filter(|&id| live(&resources.buffers, id));
    state.framebuffer = state
        .framebuffer
        .filter(|&id| live(&resources.framebuffers, id));
    state.renderbuffer = state
        .renderbuffer
        .filter(|&id| live(&resources.renderbuffers, id));
    state.current_program = state
        .current_program
        .filter(|&id| live(&resources.programs, id));
    for unit in &mut state.texture_units {
        unit.bound_2d = unit.bound_2d.filter(|&id| live(&resources.textures, id));
        unit.bound_cube_map = unit
            .bound_cube_map
            .filter(|&id| live(&resources.textures, id));
    }
}

fn is_buffer_target(target: u32) -> bool {
    matches!(target, gl::ARRAY_BUFFER | gl::ELEMENT_ARRAY_BUFFER)
}

fn is_buffer_usage(usage: u32) -> bool {
    matches!(usage, gl::STREAM_DRAW | gl::STATIC_DRAW | gl::DYNAMIC_DRAW)
}

fn is_texture_target(target: u32) -> bool {
    matches!(target, gl::TEXTURE_2D | gl::TEXTURE_CUBE_MAP)
}

fn is_attachment_point(attachment: u32) -> bool {
    matches!(
        attachment,
        gl::COLOR_ATTACHMENT0 |
            gl::DEPTH_ATTACHMENT |
            gl::STENCIL_ATTACHMENT |
            gl::DEPTH_STENCIL_ATTACHMENT
    )
}

fn is_comparison_func(func: u32) -> bool {
    matches!(
        func,
        gl::NEVER |
            gl::LESS |
            gl::EQUAL |
            gl::LEQUAL |
            gl::GREATER |
            gl::NOTEQUAL |
            gl::GEQUAL |
            gl::ALWAYS
    )
}

fn is_face(face: u32) -> bool {
    matches!(face, gl::FRONT | gl::BACK | gl::FRONT_AND_BACK)
}

fn is_stencil_op(op: u32) -> bool {
    matches!(
        op,
        gl::KEEP |
            gl::ZERO |
            gl::REPLACE |
            gl::INCR |
            gl::INCR_WRAP |
            gl::DECR |
            gl::DECR_WRAP |
            gl::INVERT
    )
}

fn is_primitive_mode(mode: u32) -> bool {
    matches!(
        mode,
        gl::POINTS |
            gl::LINES |
            gl::LINE_LOOP |
            gl::LINE_STRIP |
            gl::TRIANGLES |
            gl::TRIANGLE_STRIP |
            gl::TRIANGLE_FAN
    )
}

fn is_blend_equation(mode: u32) -> bool {
    matches!(
        mode,
        gl::FUNC_ADD | gl::FUNC_SUBTRACT | gl::FUNC_REVERSE_SUBTRACT
    )
}

fn is_blend_src_factor(factor: u32) -> bool {
    factor == gl::SRC_ALPHA_SATURATE || is_blend_dst_factor(factor)
}

fn is_blend_dst_factor(factor: u32) -> bool {
    matches!(
        factor,
        gl::ZERO |
            gl::ONE |
            gl::SRC_COLOR |
            gl::ONE_MINUS_SRC_COLOR |
            gl::DST_COLOR |
            gl::ONE_MINUS_DST_COLOR |
            gl::SRC_ALPHA |
            gl::ONE_MINUS_SRC_ALPHA |
            gl::DST_ALPHA |
            gl::ONE_MINUS_DST_ALPHA |
            gl::CONSTANT_COLOR |
            gl::ONE_MINUS_CONSTANT_COLOR |
            gl::CONSTANT_ALPHA |
            gl::ONE_MINUS_CONSTANT_ALPHA
    )
}

// From the WebGL 1.0 spec, 6.13: constant color and constant alpha
// cannot be used together as source and destination factors.
fn has_invalid_blend_constants(arg1: u32, arg2: u32) -> bool {
    match (arg1, arg2) {
        (gl::CONSTANT_COLOR, gl::CONSTANT_ALPHA) => true,
        (gl::ONE_MINUS_CONSTANT_COLOR, gl::ONE_MINUS_CONSTANT_ALPHA) => true,
        (gl::ONE_MINUS_CONSTANT_COLOR, gl::CONSTANT_ALPHA) => true,
        (gl::CONSTANT_COLOR, gl::ONE_MINUS_CONSTANT_ALPHA) => true,
        (_, _) => false,
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shader and program bookkeeping: sources, compile and link status,
//! info logs and the active attribute/uniform tables captured at link
//! time.

use webgl_traits::constants as gl;
use webgl_traits::{ProgramLinkInfo, ShaderId, WebGLError, WebGLResult};

/// Driver-object bookkeeping for a shader.
#[derive(Debug)]
pub struct ShaderInfo {
    shader_type: u32,
    source: String,
    compiled: bool,
    compile_attempted: bool,
    info_log: String,
}

impl ShaderInfo {
    pub fn new(shader_type: u32) -> ShaderInfo {
        ShaderInfo {
            shader_type,
            source: String::new(),
            compiled: false,
            compile_attempted: false,
            info_log: String::new(),
        }
    }

    pub fn shader_type(&self) -> u32 {
        self.shader_type
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: String) {
        self.source = source;
    }

    pub fn compile_status(&self) -> bool {
        self.compiled
    }

    pub fn record_compilation(&mut self, compiled: bool, info_log: String) {
        self.compiled = compiled;
        self.compile_attempted = true;
        self.info_log = info_log;
    }

    pub fn info_log(&self) -> &str {
        &self.info_log
    }
}

/// Driver-object bookkeeping for a program.
#[derive(Debug, Default)]
pub struct ProgramInfo {
    vertex_shader: Option<ShaderId>,
    fragment_shader: Option<ShaderId>,
    link_info: Option<ProgramLinkInfo>,
    info_log: String,
}

impl ProgramInfo {
    pub fn new() -> ProgramInfo {
        ProgramInfo::default()
    }

    fn slot(&mut self, shader_type: u32) -> WebGLResult<&mut Option<ShaderId>> {
        match shader_type {
            gl::VERTEX_SHADER => Ok(&mut self.vertex_shader),
            gl::FRAGMENT_SHADER => Ok(&mut self.fragment_shader),
            _ => Err(WebGLError::InvalidOperation),
        }
    }

    /// Records an attachment. At most one shader of each type may be
    /// attached; a second attachment of the same type fails.
    pub fn attach(&mut self, shader: ShaderId, shader_type: u32) -> WebGLResult<()> {
        let slot = self.slot(shader_type)?;
        if slot.is_some() {
            return Err(WebGLError::InvalidOperation);
        }
        *slot = Some(shader);
        Ok(())
    }

    /// Records a detachment. Fails if the shader is not attached.
    pub fn detach(&mut self, shader: ShaderId, shader_type: u32) -> WebGLResult<()> {
        let slot = self.slot(shader_type)?;
        if *slot != Some(shader) {
            return Err(WebGLError::InvalidOperation);
        }
        *slot = None;
        Ok(())
    }

    pub fn is_attached(&self, shader: ShaderId) -> bool {
        self.vertex_shader == Some(shader) || self.fragment_shader == Some(shader)
    }

    pub fn attached_shaders(&self) -> impl Iterator<Item = ShaderId> {
        self.vertex_shader
            .into_iter()
            .chain(self.fragment_shader)
    }

    pub fn attached_count(&self) -> i32 {
        self.vertex_shader.is_some() as i32 + self.fragment_shader.is_some() as i32
    }

    pub fn record_link(&mut self, link_info: ProgramLinkInfo, info_log: String) {
        self.link_info = Some(link_info);
        self.info_log = info_log;
    }

    pub fn link_info(&self) -> Option<&ProgramLinkInfo> {
        self.link_info.as_ref()
    }

    pub fn link_status(&self) -> bool {
        self.link_info.as_ref().map_or(false, |info| info.linked)
    }

    pub fn info_log(&self) -> &str {
        &self.info_log
    }
}

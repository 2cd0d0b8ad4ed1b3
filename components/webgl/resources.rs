/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The resource lifetime manager.
//!
//! Deletion is two-phase, per the GLES 2.0.25 object model: an object
//! marked deleted while still referenced (by a binding point, a
//! framebuffer attachment, or a program attachment) keeps its driver
//! resources until the last reference drops, and only then is the
//! driver object destroyed and the handle released. Destroying a
//! driver object while the driver can still address it is a
//! use-after-free below the reach of the host language, which is why
//! this module owns the only calls to the driver's `delete_*` family.

use log::trace;
use webgl_traits::{BufferId, FramebufferId, ProgramId, RenderbufferId, ShaderId, TextureId};

use crate::driver::Driver;
use crate::framebuffer::FramebufferInfo;
use crate::handles::HandleTable;
use crate::program::{ProgramInfo, ShaderInfo};
use crate::texture::TextureInfo;

/// Driver-object bookkeeping for a buffer.
#[derive(Debug, Default)]
pub struct BufferInfo {
    /// The target this buffer was first bound to. A buffer bound to
    /// ELEMENT_ARRAY_BUFFER may never be rebound to ARRAY_BUFFER and
    /// vice versa.
    target: Option<u32>,
    size: usize,
    usage: u32,
}

impl BufferInfo {
    pub fn target(&self) -> Option<u32> {
        self.target
    }

    pub fn set_target(&mut self, target: u32) {
        self.target = Some(target);
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn usage(&self) -> u32 {
        self.usage
    }

    pub fn record_data(&mut self, size: usize, usage: u32) {
        self.size = size;
        self.usage = usage;
    }
}

/// Driver-object bookkeeping for a renderbuffer.
#[derive(Debug, Default)]
pub struct RenderbufferInfo {
    ever_bound: bool,
    internal_format: Option<u32>,
    size: Option<(i32, i32)>,
}

impl RenderbufferInfo {
    pub fn ever_bound(&self) -> bool {
        self.ever_bound
    }

    pub fn mark_bound(&mut self) {
        self.ever_bound = true;
    }

    pub fn internal_format(&self) -> Option<u32> {
        self.internal_format
    }

    pub fn size(&self) -> Option<(i32, i32)> {
        self.size
    }

    pub fn record_storage(&mut self, internal_format: u32, width: i32, height: i32) {
        self.internal_format = Some(internal_format);
        self.size = Some((width, height));
    }
}

/// A live driver object: the driver-side name, the deletion flag, the
/// reference count kept by binding points and attachments, and the
/// class-specific record.
#[derive(Debug)]
pub struct DriverObject<T> {
    gl_name: u32,
    deleted: bool,
    refs: u32,
    info: T,
}

impl<T> DriverObject<T> {
    pub fn new(gl_name: u32, info: T) -> DriverObject<T> {
        DriverObject {
            gl_name,
            deleted: false,
            refs: 0,
            info,
        }
    }

    pub fn gl_name(&self) -> u32 {
        self.gl_name
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn info(&self) -> &T {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut T {
        &mut self.info
    }

    fn add_ref(&mut self) {
        self.refs += 1;
    }

    fn remove_ref(&mut self) -> u32 {
        debug_assert!(self.refs > 0, "unbalanced resource reference");
        self.refs = self.refs.saturating_sub(1);
        self.refs
    }
}

/// All live driver objects of one context, one handle table per object
/// class.
#[derive(Default)]
pub struct Resources {
    pub buffers: HandleTable<BufferId, DriverObject<BufferInfo>>,
    pub textures: HandleTable<TextureId, DriverObject<TextureInfo>>,
    pub renderbuffers: HandleTable<RenderbufferId, DriverObject<RenderbufferInfo>>,
    pub framebuffers: HandleTable<FramebufferId, DriverObject<FramebufferInfo>>,
    pub shaders: HandleTable<ShaderId, DriverObject<ShaderInfo>>,
    pub programs: HandleTable<ProgramId, DriverObject<ProgramInfo>>,
}

macro_rules! resource_class {
    ($table:ident, $id:ty, $info:ty, $mark:ident, $retain:ident, $unref:ident, $drv_delete:ident) => {
        /// Marks the object deleted. Destroys it immediately when
        /// nothing references it, otherwise defers destruction to the
        /// release of the last reference. Returns the destroyed entry
        /// so the caller can release any references it held in turn.
        pub fn $mark<D: Driver>(&mut self, driver: &D, id: $id) -> Option<DriverObject<$info>> {
            let entry = match self.$table.resolve_mut(id) {
                Ok(entry) => entry,
                Err(_) => return None,
            };
            if entry.deleted {
                return None;
            }
            entry.deleted = true;
            if entry.refs != 0 {
                return None;
            }
            let entry = self
                .$table
                .release(id)
                .expect("resolved entry must release");
            trace!("destroying {} {:?}", stringify!($id), id);
            driver.$drv_delete(entry.gl_name);
            Some(entry)
        }

        /// Records one more reference (binding point or attachment).
        pub fn $retain(&mut self, id: $id) {
            if let Ok(entry) = self.$table.resolve_mut(id) {
                entry.add_ref();
            }
        }

        /// Releases one reference, destroying a pending-delete object
        /// when this was the last one. Returns the destroyed entry, if
        /// any.
        pub fn $unref<D: Driver>(&mut self, driver: &D, id: $id) -> Option<DriverObject<$info>> {
            let destroy = match self.$table.resolve_mut(id) {
                Ok(entry) => entry.remove_ref() == 0 && entry.deleted,
                Err(_) => false,
            };
            if !destroy {
                return None;
            }
            let entry = self
                .$table
                .release(id)
                .expect("resolved entry must release");
            trace!("destroying pending-delete {} {:?}", stringify!($id), id);
            driver.$drv_delete(entry.gl_name);
            Some(entry)
        }
    };
}

impl Resources {
    pub fn new() -> Resources {
        Resources::default()
    }

    resource_class!(
        buffers,
        BufferId,
        BufferInfo,
        mark_buffer_deleted,
        retain_buffer,
        unref_buffer,
        delete_buffer
    );
    resource_class!(
        textures,
        TextureId,
        TextureInfo,
        mark_texture_deleted,
        retain_texture,
        unref_texture,
        delete_texture
    );
    resource_class!(
        renderbuffers,
        RenderbufferId,
        RenderbufferInfo,
        mark_renderbuffer_deleted,
        retain_renderbuffer,
        unref_renderbuffer,
        delete_renderbuffer
    );
    resource_class!(
        framebuffers,
        FramebufferId,
        FramebufferInfo,
        mark_framebuffer_deleted,
        retain_framebuffer,
        unref_framebuffer,
        delete_framebuffer
    );
    resource_class!(
        shaders,
        ShaderId,
        ShaderInfo,
        mark_shader_deleted,
        retain_shader,
        unref_shader,
        delete_shader
    );
    resource_class!(
        programs,
        ProgramId,
        ProgramInfo,
        mark_program_deleted,
        retain_program,
        unref_program,
        delete_program
    );

    /// Destroys every live driver object, pending-delete objects
    /// included. Used by context teardown, where binding points no
    /// longer matter.
    pub fn destroy_all<D: Driver>(&mut self, driver: &D) {
        for entry in self.framebuffers.drain_all() {
            driver.delete_framebuffer(entry.gl_name);
        }
        for entry in self.renderbuffers.drain_all() {
            driver.delete_renderbuffer(entry.gl_name);
        }
        for entry in self.textures.drain_all() {
            driver.delete_texture(entry.gl_name);
        }
        for entry in self.programs.drain_all() {
            driver.delete_program(entry.gl_name);
        }
        for entry in self.shaders.drain_all() {
            driver.delete_shader(entry.gl_name);
        }
        for entry in self.buffers.drain_all() {
            driver.delete_buffer(entry.gl_name);
        }
    }

    /// The number of live driver objects across all classes.
    pub fn live_objects(&self) -> usize {
        self.buffers.len() +
            self.textures.len() +
            self.renderbuffers.len() +
            self.framebuffers.len() +
            self.shaders.len() +
            self.programs.len()
    }
}

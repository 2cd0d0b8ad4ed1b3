/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Framebuffer bookkeeping: the attachment set and the completeness
//! decision tree.

use webgl_traits::constants as gl;
use webgl_traits::{RenderbufferId, TextureId};

use crate::handles::HandleTable;
use crate::resources::{DriverObject, RenderbufferInfo};
use crate::texture::{TexImageTarget, TextureInfo};

/// One attachment point of a framebuffer.
#[derive(Clone, Copy, Debug)]
pub enum FramebufferAttachment {
    Renderbuffer(RenderbufferId),
    Texture {
        texture: TextureId,
        target: TexImageTarget,
        level: i32,
    },
}

impl FramebufferAttachment {
    pub fn renderbuffer(&self) -> Option<RenderbufferId> {
        match *self {
            FramebufferAttachment::Renderbuffer(id) => Some(id),
            FramebufferAttachment::Texture { .. } => None,
        }
    }

    pub fn texture(&self) -> Option<TextureId> {
        match *self {
            FramebufferAttachment::Renderbuffer(_) => None,
            FramebufferAttachment::Texture { texture, .. } => Some(texture),
        }
    }
}

/// Driver-object bookkeeping for a framebuffer.
#[derive(Debug)]
pub struct FramebufferInfo {
    ever_bound: bool,
    status: u32,
    size: Option<(i32, i32)>,
    color: Option<FramebufferAttachment>,
    depth: Option<FramebufferAttachment>,
    stencil: Option<FramebufferAttachment>,
    depthstencil: Option<FramebufferAttachment>,
}

impl Default for FramebufferInfo {
    fn default() -> FramebufferInfo {
        FramebufferInfo {
            ever_bound: false,
            status: gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
            size: None,
            color: None,
            depth: None,
            stencil: None,
            depthstencil: None,
        }
    }
}

impl FramebufferInfo {
    pub fn new() -> FramebufferInfo {
        FramebufferInfo::default()
    }

    pub fn ever_bound(&self) -> bool {
        self.ever_bound
    }

    pub fn mark_bound(&mut self) {
        self.ever_bound = true;
    }

    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn size(&self) -> Option<(i32, i32)> {
        self.size
    }

    pub fn attachment_slot(
        &mut self,
        attachment: u32,
    ) -> Option<&mut Option<FramebufferAttachment>> {
        match attachment {
            gl::COLOR_ATTACHMENT0 => Some(&mut self.color),
            gl::DEPTH_ATTACHMENT => Some(&mut self.depth),
            gl::STENCIL_ATTACHMENT => Some(&mut self.stencil),
            gl::DEPTH_STENCIL_ATTACHMENT => Some(&mut self.depthstencil),
            _ => None,
        }
    }

    pub fn attachment(&self, attachment: u32) -> Option<&FramebufferAttachment> {
        match attachment {
            gl::COLOR_ATTACHMENT0 => self.color.as_ref(),
            gl::DEPTH_ATTACHMENT => self.depth.as_ref(),
            gl::STENCIL_ATTACHMENT => self.stencil.as_ref(),
            gl::DEPTH_STENCIL_ATTACHMENT => self.depthstencil.as_ref(),
            _ => None,
        }
    }

    pub fn attachments(&self) -> impl Iterator<Item = (u32, &FramebufferAttachment)> {
        [
            (gl::COLOR_ATTACHMENT0, self.color.as_ref()),
            (gl::DEPTH_ATTACHMENT, self.depth.as_ref()),
            (gl::STENCIL_ATTACHMENT, self.stencil.as_ref()),
            (gl::DEPTH_STENCIL_ATTACHMENT, self.depthstencil.as_ref()),
        ]
        .into_iter()
        .filter_map(|(point, att)| att.map(|att| (point, att)))
    }

    /// Re-evaluates the completeness status. This replicates the
    /// decision tree of WebGL 1.0 §6.6 ("Framebuffer Object
    /// Attachments") over the locally tracked attachment set.
    pub fn update_status(
        &mut self,
        textures: &HandleTable<TextureId, DriverObject<TextureInfo>>,
        renderbuffers: &HandleTable<RenderbufferId, DriverObject<RenderbufferInfo>>,
    ) {
        let has_c = self.color.is_some();
        let has_z = self.depth.is_some();
        let has_s = self.stencil.is_some();
        let has_zs = self.depthstencil.is_some();
        let attachments = [&self.color, &self.depth, &self.stencil, &self.depthstencil];
        let attachment_constraints = [
            &[
                gl::RGBA4,
                gl::RGB5_A1,
                gl::RGB565,
                gl::RGBA,
                gl::RGB,
            ][..],
            &[gl::DEPTH_COMPONENT16][..],
            &[gl::STENCIL_INDEX8][..],
            &[gl::DEPTH_STENCIL][..],
        ];

        // From the WebGL spec, 6.6 ("Framebuffer Object Attachments"):
        //
        //    "In the WebGL API, it is an error to concurrently attach
        //     renderbuffers to the following combinations of
        //     attachment points:
        //
        //     DEPTH_ATTACHMENT + DEPTH_STENCIL_ATTACHMENT
        //     STENCIL_ATTACHMENT + DEPTH_STENCIL_ATTACHMENT
        //     DEPTH_ATTACHMENT + STENCIL_ATTACHMENT
        //
        //     If any of the constraints above are violated, then:
        //
        //     checkFramebufferStatus must return FRAMEBUFFER_UNSUPPORTED."
        if (has_zs && (has_z || has_s)) || (has_z && has_s) {
            self.status = gl::FRAMEBUFFER_UNSUPPORTED;
            return;
        }

        let mut fb_size = None;
        for (attachment, constraints) in attachments.iter().zip(&attachment_constraints) {
            let (format, size) = match **attachment {
                Some(FramebufferAttachment::Renderbuffer(id)) => match renderbuffers.resolve(id) {
                    Ok(rb) => (rb.info().internal_format(), rb.info().size()),
                    Err(_) => {
                        self.status = gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT;
                        return;
                    },
                },
                Some(FramebufferAttachment::Texture {
                    texture,
                    target,
                    level,
                }) => {
                    let info = textures
                        .resolve(texture)
                        .ok()
                        .and_then(|tex| tex.info().image_info(target, level as u32));
                    match info {
                        Some(info) => (
                            Some(info.internal_format().as_gl_constant()),
                            Some((info.width() as i32, info.height() as i32)),
                        ),
                        None => {
                            self.status = gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT;
                            return;
                        },
                    }
                },
                None => (None, None),
            };

            // Every sized attachment must agree on the dimensions.
            if size.is_some() {
                if fb_size.is_some() && size != fb_size {
                    self.status = gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS;
                    return;
                } else {
                    fb_size = size;
                }
            }

            if let Some(format) = format {
                if constraints.iter().all(|c| *c != format) {
                    self.status = gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT;
                    return;
                }
            }
        }
        self.size = fb_size;

        if has_c || has_z || has_zs || has_s {
            if self.size.map_or(false, |(w, h)| w != 0 && h != 0) {
                self.status = gl::FRAMEBUFFER_COMPLETE;
            } else {
                self.status = gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT;
            }
        } else {
            self.status = gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT;
        }
    }
}

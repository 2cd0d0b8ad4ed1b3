/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A headless WebGL1 rendering context backed by a native OpenGL or
//! OpenGL ES driver.
//!
//! The crate is organized around five cooperating pieces:
//!
//! - [`handles`]: the per-class handle table mapping opaque caller
//!   handles to driver objects, with monotonic, never-reused handles.
//! - [`state`]: the context state tracker, the single source of truth
//!   for every queryable piece of WebGL context state.
//! - [`context`]: the command translator; each entry point validates,
//!   updates tracked state, dispatches to the driver and records
//!   errors for the poll-based error query.
//! - [`resources`]: the resource lifetime manager, implementing the
//!   two-phase deletion protocol that keeps bound or attached objects
//!   alive until their last reference drops.
//! - [`driver`] and [`backend`]: the driver seam and its production
//!   implementation over a `surfman` headless surface.

#![deny(unsafe_code)]

#[allow(unsafe_code)]
pub mod backend;
mod context;
mod driver;
mod framebuffer;
mod handles;
mod limits;
mod program;
mod resources;
mod state;
mod texture;

pub use crate::backend::HeadlessDriver;
pub use crate::context::{ContextPhase, WebGLContext};
pub use crate::driver::Driver;
pub use crate::framebuffer::{FramebufferAttachment, FramebufferInfo};
pub use crate::handles::{HandleTable, InvalidHandle, ResourceId};
pub use crate::limits::GLLimitsDetect;
pub use crate::program::{ProgramInfo, ShaderInfo};
pub use crate::resources::{BufferInfo, DriverObject, RenderbufferInfo, Resources};
pub use crate::state::{CapFlags, ContextState, StencilSide, TextureUnit, VertexAttrib};
pub use crate::texture::{ImageInfo, TexImageTarget, TextureInfo};

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Framebuffer completeness, evaluated from tracked attachments
//! without driver round trips.

use webgl_traits::constants as gl;

use crate::mock::test_context;

#[test]
fn empty_framebuffer_reports_missing_attachment() {
    let (mut context, log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    log.take();

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
    );
    // The decision tree runs locally.
    assert_eq!(log.count("check_framebuffer_status"), 0);
}

#[test]
fn color_renderbuffer_attachment_completes_framebuffer() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let renderbuffer = context.create_renderbuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    context.bind_renderbuffer(gl::RENDERBUFFER, Some(renderbuffer));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::RGBA4, 32, 32);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::RENDERBUFFER,
        Some(renderbuffer),
    );

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_COMPLETE
    );
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn zero_sized_attachment_is_incomplete() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let renderbuffer = context.create_renderbuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    context.bind_renderbuffer(gl::RENDERBUFFER, Some(renderbuffer));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::RGBA4, 0, 0);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::RENDERBUFFER,
        Some(renderbuffer),
    );

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT
    );
}

#[test]
fn mismatched_attachment_dimensions_are_detected() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let color = context.create_renderbuffer().unwrap();
    let depth = context.create_renderbuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));

    context.bind_renderbuffer(gl::RENDERBUFFER, Some(color));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::RGBA4, 32, 32);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::RENDERBUFFER,
        Some(color),
    );

    context.bind_renderbuffer(gl::RENDERBUFFER, Some(depth));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::DEPTH_COMPONENT16, 16, 16);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::DEPTH_ATTACHMENT,
        gl::RENDERBUFFER,
        Some(depth),
    );

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS
    );
}

#[test]
fn conflicting_depth_and_depth_stencil_attachments_are_unsupported() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let depth = context.create_renderbuffer().unwrap();
    let depth_stencil = context.create_renderbuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));

    context.bind_renderbuffer(gl::RENDERBUFFER, Some(depth));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::DEPTH_COMPONENT16, 32, 32);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::DEPTH_ATTACHMENT,
        gl::RENDERBUFFER,
        Some(depth),
    );

    context.bind_renderbuffer(gl::RENDERBUFFER, Some(depth_stencil));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::DEPTH_STENCIL, 32, 32);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::DEPTH_STENCIL_ATTACHMENT,
        gl::RENDERBUFFER,
        Some(depth_stencil),
    );

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_UNSUPPORTED
    );
}

#[test]
fn texture_attachment_completes_framebuffer() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let texture = context.create_texture().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    context.bind_texture(gl::TEXTURE_2D, Some(texture));
    context.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGBA,
        64,
        64,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        None,
    );
    context.framebuffer_texture_2d(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::TEXTURE_2D,
        Some(texture),
        0,
    );

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_COMPLETE
    );
}

#[test]
fn texture_attachment_without_image_is_incomplete() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let texture = context.create_texture().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    context.bind_texture(gl::TEXTURE_2D, Some(texture));
    context.framebuffer_texture_2d(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::TEXTURE_2D,
        Some(texture),
        0,
    );

    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT
    );
}

#[test]
fn default_framebuffer_is_always_complete() {
    let (mut context, _log) = test_context();
    assert_eq!(
        context.check_framebuffer_status(gl::FRAMEBUFFER),
        gl::FRAMEBUFFER_COMPLETE
    );
}

#[test]
fn drawing_to_incomplete_framebuffer_is_rejected() {
    let (mut context, log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    log.take();

    context.clear(gl::COLOR_BUFFER_BIT);
    assert_eq!(context.get_error(), gl::INVALID_FRAMEBUFFER_OPERATION);
    assert_eq!(log.count("clear"), 0);
}

#[test]
fn attachment_parameters_are_answered_locally() {
    let (mut context, _log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let renderbuffer = context.create_renderbuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    context.bind_renderbuffer(gl::RENDERBUFFER, Some(renderbuffer));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::RGBA4, 8, 8);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::RENDERBUFFER,
        Some(renderbuffer),
    );

    assert_eq!(
        context.get_framebuffer_attachment_parameter(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
        ),
        gl::RENDERBUFFER as i32
    );
    assert_eq!(
        context.get_framebuffer_attachment_parameter(
            gl::FRAMEBUFFER,
            gl::DEPTH_ATTACHMENT,
            gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
        ),
        gl::NONE as i32
    );
}

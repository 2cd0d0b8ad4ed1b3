/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Two-phase deletion: objects marked deleted while referenced by a
//! binding point or attachment survive until the last reference drops.

use webgl_traits::constants as gl;

use crate::mock::test_context;

#[test]
fn bound_texture_survives_deletion_until_unbound() {
    let (mut context, log) = test_context();
    let texture = context.create_texture().unwrap();
    context.bind_texture(gl::TEXTURE_2D, Some(texture));
    log.take();

    context.delete_texture(Some(texture));
    assert_eq!(log.count("delete_texture"), 0, "destroyed while bound");

    context.bind_texture(gl::TEXTURE_2D, None);
    assert_eq!(log.count("delete_texture"), 1, "not destroyed on unbind");
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn unbinding_by_rebinding_destroys_pending_object() {
    let (mut context, log) = test_context();
    let first = context.create_buffer().unwrap();
    let second = context.create_buffer().unwrap();
    context.bind_buffer(gl::ARRAY_BUFFER, Some(first));
    context.delete_buffer(Some(first));
    log.take();

    context.bind_buffer(gl::ARRAY_BUFFER, Some(second));
    assert_eq!(log.count("delete_buffer"), 1);
}

#[test]
fn deleting_an_unbound_object_destroys_it_immediately() {
    let (mut context, log) = test_context();
    let buffer = context.create_buffer().unwrap();
    log.take();
    context.delete_buffer(Some(buffer));
    assert_eq!(log.count("delete_buffer"), 1);
}

#[test]
fn double_delete_destroys_only_once() {
    let (mut context, log) = test_context();
    let buffer = context.create_buffer().unwrap();
    log.take();
    context.delete_buffer(Some(buffer));
    context.delete_buffer(Some(buffer));
    assert_eq!(log.count("delete_buffer"), 1);
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn framebuffer_attachment_keeps_renderbuffer_alive() {
    let (mut context, log) = test_context();
    let framebuffer = context.create_framebuffer().unwrap();
    let renderbuffer = context.create_renderbuffer().unwrap();
    context.bind_framebuffer(gl::FRAMEBUFFER, Some(framebuffer));
    context.bind_renderbuffer(gl::RENDERBUFFER, Some(renderbuffer));
    context.renderbuffer_storage(gl::RENDERBUFFER, gl::RGBA4, 64, 64);
    context.framebuffer_renderbuffer(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::RENDERBUFFER,
        Some(renderbuffer),
    );
    // Drop the renderbuffer binding; the attachment still references
    // it.
    context.bind_renderbuffer(gl::RENDERBUFFER, None);
    log.take();

    context.delete_renderbuffer(Some(renderbuffer));
    assert_eq!(log.count("delete_renderbuffer"), 0, "destroyed while attached");

    // Unbinding and deleting the framebuffer releases the attachment,
    // destroying the pending renderbuffer too.
    context.bind_framebuffer(gl::FRAMEBUFFER, None);
    context.delete_framebuffer(Some(framebuffer));
    assert_eq!(log.count("delete_framebuffer"), 1);
    assert_eq!(log.count("delete_renderbuffer"), 1);
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn attached_shader_survives_deletion_until_program_destroyed() {
    let (mut context, log) = test_context();
    let program = context.create_program().unwrap();
    let shader = context.create_shader(gl::VERTEX_SHADER).unwrap();
    context.attach_shader(program, shader);
    log.take();

    context.delete_shader(Some(shader));
    assert_eq!(log.count("delete_shader"), 0, "destroyed while attached");
    assert!(context.is_shader(Some(shader)));

    context.delete_program(Some(program));
    assert_eq!(log.count("delete_program"), 1);
    assert_eq!(log.count("delete_shader"), 1);
    assert!(!context.is_shader(Some(shader)));
}

#[test]
fn detaching_destroys_pending_shader() {
    let (mut context, log) = test_context();
    let program = context.create_program().unwrap();
    let shader = context.create_shader(gl::FRAGMENT_SHADER).unwrap();
    context.attach_shader(program, shader);
    context.delete_shader(Some(shader));
    log.take();

    context.detach_shader(program, shader);
    assert_eq!(log.count("delete_shader"), 1);
}

#[test]
fn current_program_survives_deletion_until_replaced() {
    let (mut context, log) = test_context();
    let program = context.create_program().unwrap();
    let vertex = context.create_shader(gl::VERTEX_SHADER).unwrap();
    let fragment = context.create_shader(gl::FRAGMENT_SHADER).unwrap();
    context.attach_shader(program, vertex);
    context.attach_shader(program, fragment);
    context.link_program(program);
    context.use_program(Some(program));
    log.take();

    context.delete_program(Some(program));
    assert_eq!(log.count("delete_program"), 0, "destroyed while in use");

    context.use_program(None);
    assert_eq!(log.count("delete_program"), 1);
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

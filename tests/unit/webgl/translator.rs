/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Command translation: validation precedence, the poll-then-clear
//! error model, and the atomic-or-nothing failure contract.

use webgl_traits::constants as gl;

use crate::mock::test_context;

#[test]
fn enum_errors_take_precedence_over_operation_errors() {
    let (mut context, _log) = test_context();
    let buffer = context.create_buffer().unwrap();
    context.delete_buffer(Some(buffer));
    // Both the target and the handle are invalid; the enum check runs
    // first.
    context.bind_buffer(gl::TEXTURE_2D, Some(buffer));
    assert_eq!(context.get_error(), gl::INVALID_ENUM);
}

#[test]
fn error_query_polls_then_clears() {
    let (mut context, _log) = test_context();
    context.enable(12345);
    context.line_width(-1.);

    assert_eq!(context.get_error(), gl::INVALID_ENUM);
    assert_eq!(context.get_error(), gl::INVALID_VALUE);
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn duplicate_errors_are_recorded_once() {
    let (mut context, _log) = test_context();
    context.enable(12345);
    context.disable(54321);
    assert_eq!(context.get_error(), gl::INVALID_ENUM);
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn rejected_calls_have_no_side_effects() {
    let (mut context, log) = test_context();
    log.take();
    context.buffer_data(gl::ARRAY_BUFFER, &[0, 1, 2, 3], gl::STATIC_DRAW);
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.count("buffer_data"), 0);

    // The context stays usable after a rejected call.
    let buffer = context.create_buffer().unwrap();
    context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer));
    context.buffer_data(gl::ARRAY_BUFFER, &[0, 1, 2, 3], gl::STATIC_DRAW);
    assert_eq!(context.get_error(), gl::NO_ERROR);
    assert_eq!(log.count("buffer_data"), 1);
}

#[test]
fn buffer_target_is_locked_on_first_bind() {
    let (mut context, _log) = test_context();
    let buffer = context.create_buffer().unwrap();
    context.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(buffer));
    context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer));
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert!(context.bound_array_buffer().is_none());
}

#[test]
fn buffer_sub_data_is_bounds_checked() {
    let (mut context, log) = test_context();
    let buffer = context.create_buffer().unwrap();
    context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer));
    context.buffer_data(gl::ARRAY_BUFFER, &[0; 16], gl::STATIC_DRAW);
    log.take();

    context.buffer_sub_data(gl::ARRAY_BUFFER, 12, &[0; 8]);
    assert_eq!(context.get_error(), gl::INVALID_VALUE);
    assert_eq!(log.count("buffer_sub_data"), 0);

    context.buffer_sub_data(gl::ARRAY_BUFFER, 8, &[0; 8]);
    assert_eq!(context.get_error(), gl::NO_ERROR);
    assert_eq!(log.count("buffer_sub_data"), 1);
}

#[test]
fn tex_image_requires_a_bound_texture() {
    let (mut context, log) = test_context();
    log.take();
    context.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGBA,
        4,
        4,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        None,
    );
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.count("tex_image_2d"), 0);
}

#[test]
fn tex_image_validates_sizes_and_data_length() {
    let (mut context, log) = test_context();
    let texture = context.create_texture().unwrap();
    context.bind_texture(gl::TEXTURE_2D, Some(texture));
    log.take();

    context.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGBA,
        -1,
        4,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        None,
    );
    assert_eq!(context.get_error(), gl::INVALID_VALUE);

    // A 4x4 RGBA image needs 64 bytes; a short buffer is rejected
    // before dispatch.
    context.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGBA,
        4,
        4,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        Some(&[0; 32]),
    );
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.count("tex_image_2d"), 0);

    context.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGBA,
        4,
        4,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        Some(&[0; 64]),
    );
    assert_eq!(context.get_error(), gl::NO_ERROR);
    assert_eq!(log.count("tex_image_2d"), 1);
}

#[test]
fn packed_types_constrain_the_format() {
    let (mut context, _log) = test_context();
    let texture = context.create_texture().unwrap();
    context.bind_texture(gl::TEXTURE_2D, Some(texture));

    context.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGB,
        2,
        2,
        0,
        gl::RGB,
        gl::UNSIGNED_SHORT_4_4_4_4,
        None,
    );
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
}

#[test]
fn cube_faces_must_be_square() {
    let (mut context, _log) = test_context();
    let texture = context.create_texture().unwrap();
    context.bind_texture(gl::TEXTURE_CUBE_MAP, Some(texture));
    context.tex_image_2d(
        gl::TEXTURE_CUBE_MAP_POSITIVE_X,
        0,
        gl::RGBA,
        4,
        8,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        None,
    );
    assert_eq!(context.get_error(), gl::INVALID_VALUE);
}

#[test]
fn texture_target_is_locked_on_first_bind() {
    let (mut context, _log) = test_context();
    let texture = context.create_texture().unwrap();
    context.bind_texture(gl::TEXTURE_2D, Some(texture));
    context.bind_texture(gl::TEXTURE_2D, None);
    context.bind_texture(gl::TEXTURE_CUBE_MAP, Some(texture));
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
}

#[test]
fn draw_calls_require_a_linked_program() {
    let (mut context, log) = test_context();
    log.take();
    context.draw_arrays(gl::TRIANGLES, 0, 3);
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.count("draw_arrays"), 0);
}

#[test]
fn draw_elements_requires_an_index_buffer_and_aligned_offset() {
    let (mut context, log) = test_context();
    let program = context.create_program().unwrap();
    let vertex = context.create_shader(gl::VERTEX_SHADER).unwrap();
    let fragment = context.create_shader(gl::FRAGMENT_SHADER).unwrap();
    context.attach_shader(program, vertex);
    context.attach_shader(program, fragment);
    context.link_program(program);
    context.use_program(Some(program));

    context.draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, 0);
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);

    let buffer = context.create_buffer().unwrap();
    context.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(buffer));
    context.buffer_data(gl::ELEMENT_ARRAY_BUFFER, &[0; 12], gl::STATIC_DRAW);

    context.draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, 1);
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);

    log.take();
    context.draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, 2);
    assert_eq!(context.get_error(), gl::NO_ERROR);
    assert_eq!(log.count("draw_elements"), 1);
}

#[test]
fn use_program_requires_successful_link() {
    let (mut context, log) = test_context();
    let program = context.create_program().unwrap();
    log.take();
    context.use_program(Some(program));
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.count("use_program"), 0);
    assert!(context.current_program().is_none());
}

#[test]
fn shader_compilation_records_status_and_log() {
    let (mut context, _log) = test_context();
    let shader = context.create_shader(gl::VERTEX_SHADER).unwrap();
    context.shader_source(shader, "void main() {}");
    context.compile_shader(shader);
    assert!(context.get_shader_compile_status(shader));
    assert_eq!(context.get_shader_info_log(shader), "");
    assert_eq!(context.get_shader_source(shader), "void main() {}");
}

#[test]
fn failed_compilation_is_tracked_without_a_driver_round_trip_on_query() {
    let log = crate::mock::CallLog::new();
    let driver = crate::mock::MockDriver::new(log.clone());
    driver.compile_ok.set(false);
    let mut context =
        webgl::WebGLContext::with_driver(driver, webgl_traits::GLContextAttributes::default());
    let shader = context.create_shader(gl::FRAGMENT_SHADER).unwrap();
    context.shader_source(shader, "nonsense");
    context.compile_shader(shader);
    log.take();

    assert!(!context.get_shader_compile_status(shader));
    assert_eq!(context.get_shader_info_log(shader), "mock compile error");
    assert_eq!(log.len(), 0, "status queries must be answered locally");
}

#[test]
fn uniform_calls_require_a_current_program() {
    let (mut context, log) = test_context();
    log.take();
    context.uniform1f(0, 1.);
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.len(), 0);
}

#[test]
fn uniform_vector_lengths_are_validated() {
    let (mut context, log) = test_context();
    let program = context.create_program().unwrap();
    let vertex = context.create_shader(gl::VERTEX_SHADER).unwrap();
    let fragment = context.create_shader(gl::FRAGMENT_SHADER).unwrap();
    context.attach_shader(program, vertex);
    context.attach_shader(program, fragment);
    context.link_program(program);
    context.use_program(Some(program));
    log.take();

    context.uniform_matrix4fv(0, &[0.; 15]);
    assert_eq!(context.get_error(), gl::INVALID_VALUE);
    assert_eq!(log.count("uniform_matrix_4fv"), 0);

    context.uniform_matrix4fv(0, &[0.; 16]);
    assert_eq!(context.get_error(), gl::NO_ERROR);
    assert_eq!(log.count("uniform_matrix_4fv"), 1);
}

#[test]
fn vertex_attrib_pointer_requires_an_array_buffer() {
    let (mut context, _log) = test_context();
    context.vertex_attrib_pointer(0, 3, gl::FLOAT, false, 0, 0);
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);

    let buffer = context.create_buffer().unwrap();
    context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer));
    context.vertex_attrib_pointer(0, 3, gl::FLOAT, false, 0, 0);
    assert_eq!(context.get_error(), gl::NO_ERROR);
    assert_eq!(
        context.get_vertex_attrib(0, gl::VERTEX_ATTRIB_ARRAY_SIZE),
        3
    );
    assert_eq!(
        context.get_vertex_attrib(0, gl::VERTEX_ATTRIB_ARRAY_BUFFER_BINDING),
        buffer.get() as i32
    );
}

#[test]
fn read_pixels_validates_format_combinations() {
    let (mut context, log) = test_context();
    log.take();
    let pixels = context.read_pixels(0, 0, 2, 2, gl::RGB, gl::UNSIGNED_BYTE);
    assert!(pixels.is_empty());
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert_eq!(log.count("read_pixels"), 0);

    let pixels = context.read_pixels(0, 0, 2, 2, gl::RGBA, gl::UNSIGNED_BYTE);
    assert_eq!(pixels.len(), 16);
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

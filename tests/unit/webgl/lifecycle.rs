/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Context lifecycle: teardown ordering, idempotence, and the
//! ContextLost short circuit.

use webgl::ContextPhase;
use webgl_traits::constants as gl;

use crate::mock::test_context;

#[test]
fn shutdown_destroys_objects_then_surface_then_context() {
    let (mut context, log) = test_context();
    let _buffer = context.create_buffer().unwrap();
    let _texture = context.create_texture().unwrap();
    log.take();

    context.shutdown();
    assert_eq!(context.phase(), ContextPhase::Destroyed);

    assert_eq!(log.count("delete_buffer"), 1);
    assert_eq!(log.count("delete_texture"), 1);
    let surface = log.position("destroy_surface").expect("surface not destroyed");
    let driver_context = log.position("destroy_context").expect("context not destroyed");
    let last_object_delete = log
        .position("delete_buffer")
        .unwrap()
        .max(log.position("delete_texture").unwrap());
    assert!(last_object_delete < surface, "objects must go before the surface");
    assert!(surface < driver_context, "surface must go before the context");
}

#[test]
fn shutdown_is_idempotent() {
    let (mut context, log) = test_context();
    context.shutdown();
    log.take();

    context.shutdown();
    assert_eq!(log.len(), 0, "second shutdown touched the driver");
    assert_eq!(context.phase(), ContextPhase::Destroyed);
}

#[test]
fn shutdown_forces_destruction_of_pending_delete_objects() {
    let (mut context, log) = test_context();
    let texture = context.create_texture().unwrap();
    context.bind_texture(gl::TEXTURE_2D, Some(texture));
    context.delete_texture(Some(texture));
    log.take();

    context.shutdown();
    assert_eq!(log.count("delete_texture"), 1);
}

#[test]
fn calls_after_shutdown_record_context_lost_without_driver_traffic() {
    let (mut context, log) = test_context();
    context.shutdown();
    log.take();

    context.clear_color(1., 0., 0., 1.);
    context.viewport(0, 0, 8, 8);
    assert!(context.create_buffer().is_none());
    context.draw_arrays(gl::TRIANGLES, 0, 3);

    assert_eq!(log.len(), 0, "lost context reached the driver");
    assert_eq!(context.get_error(), gl::CONTEXT_LOST_WEBGL);
    assert!(context.is_context_lost());
}

#[test]
fn error_query_reports_context_lost_after_shutdown() {
    let (mut context, _log) = test_context();
    context.shutdown();
    // Even with no recorded errors, a lost context reports
    // CONTEXT_LOST_WEBGL rather than consulting the driver.
    assert_eq!(context.get_error(), gl::CONTEXT_LOST_WEBGL);
}

#[test]
fn resize_recreates_the_surface() {
    let (mut context, log) = test_context();
    assert_eq!(context.drawing_buffer_width(), 256);
    context
        .resize(euclid::default::Size2D::new(64, 32))
        .expect("resize failed");
    assert_eq!(log.count("resize_surface"), 1);
    assert_eq!(context.drawing_buffer_width(), 64);
    assert_eq!(context.drawing_buffer_height(), 32);
}

#[test]
fn resize_fails_on_a_lost_context() {
    let (mut context, _log) = test_context();
    context.shutdown();
    assert!(context.resize(euclid::default::Size2D::new(8, 8)).is_err());
}

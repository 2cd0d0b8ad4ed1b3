/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashSet;

use webgl_traits::constants as gl;

use crate::mock::test_context;

#[test]
fn handles_are_never_reused() {
    let (mut context, _log) = test_context();
    let mut issued = HashSet::new();
    let mut live = Vec::new();

    // A fixed-seed linear congruential sequence drives a randomized
    // create/delete/rebind interleaving.
    let mut rng: u32 = 0x1234_5678;
    let mut next = || {
        rng = rng.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        rng
    };

    for _ in 0..500 {
        match next() % 4 {
            0 | 1 => {
                let id = context.create_buffer().expect("buffer creation failed");
                assert!(issued.insert(id), "handle {:?} was reused", id);
                live.push(id);
            },
            2 if !live.is_empty() => {
                let index = next() as usize % live.len();
                let id = live.swap_remove(index);
                context.bind_buffer(gl::ARRAY_BUFFER, Some(id));
                context.delete_buffer(Some(id));
                context.bind_buffer(gl::ARRAY_BUFFER, None);
            },
            _ if !live.is_empty() => {
                let index = next() as usize % live.len();
                context.delete_buffer(Some(live.swap_remove(index)));
            },
            _ => {},
        }
    }
    assert_eq!(context.get_error(), gl::NO_ERROR);
}

#[test]
fn released_handles_do_not_resolve() {
    let (mut context, _log) = test_context();
    let buffer = context.create_buffer().unwrap();
    context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer));
    context.bind_buffer(gl::ARRAY_BUFFER, None);
    context.delete_buffer(Some(buffer));

    assert!(!context.is_buffer(Some(buffer)));

    // Resolving the stale handle maps the internal failure to
    // INVALID_OPERATION rather than crashing.
    context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer));
    assert_eq!(context.get_error(), gl::INVALID_OPERATION);
    assert!(context.bound_array_buffer().is_none());
}

#[test]
fn handles_are_unique_across_classes_over_time() {
    let (mut context, _log) = test_context();
    let mut texture_ids = HashSet::new();
    for _ in 0..16 {
        let texture = context.create_texture().unwrap();
        assert!(texture_ids.insert(texture));
        context.delete_texture(Some(texture));
    }
}

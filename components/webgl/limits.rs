/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Detection of implementation limits, queried once at context
//! creation and answered from the cached copy thereafter.

use webgl_traits::constants as gl;
use webgl_traits::GLLimits;

use crate::driver::Driver;

pub trait GLLimitsDetect: Sized {
    fn detect<D: Driver>(driver: &D) -> Self;
}

fn get_integer<D: Driver>(driver: &D, pname: u32) -> u32 {
    let mut value = [0];
    driver.get_integer_v(pname, &mut value);
    value[0].max(0) as u32
}

impl GLLimitsDetect for GLLimits {
    fn detect<D: Driver>(driver: &D) -> GLLimits {
        // Values below the GLES 2.0 guaranteed minimums mean the query
        // failed; report the minimum rather than a zero limit.
        let max_vertex_attribs = get_integer(driver, gl::MAX_VERTEX_ATTRIBS).max(8);
        let max_tex_size = get_integer(driver, gl::MAX_TEXTURE_SIZE).max(64);
        let max_cube_map_tex_size = get_integer(driver, gl::MAX_CUBE_MAP_TEXTURE_SIZE).max(16);
        let max_combined_texture_image_units =
            get_integer(driver, gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS).max(8);
        let max_fragment_uniform_vectors =
            get_integer(driver, gl::MAX_FRAGMENT_UNIFORM_VECTORS).max(16);
        let max_renderbuffer_size = get_integer(driver, gl::MAX_RENDERBUFFER_SIZE).max(1);
        let max_texture_image_units = get_integer(driver, gl::MAX_TEXTURE_IMAGE_UNITS).max(8);
        let max_varying_vectors = get_integer(driver, gl::MAX_VARYING_VECTORS).max(8);
        let max_vertex_texture_image_units =
            get_integer(driver, gl::MAX_VERTEX_TEXTURE_IMAGE_UNITS);
        let max_vertex_uniform_vectors =
            get_integer(driver, gl::MAX_VERTEX_UNIFORM_VECTORS).max(128);

        let mut max_viewport_dims = [0; 2];
        driver.get_integer_v(gl::MAX_VIEWPORT_DIMS, &mut max_viewport_dims);
        let max_viewport_dims = [
            max_viewport_dims[0].max(1) as u32,
            max_viewport_dims[1].max(1) as u32,
        ];

        GLLimits {
            max_vertex_attribs,
            max_tex_size,
            max_cube_map_tex_size,
            max_combined_texture_image_units,
            max_fragment_uniform_vectors,
            max_renderbuffer_size,
            max_texture_image_units,
            max_varying_vectors,
            max_vertex_texture_image_units,
            max_vertex_uniform_vectors,
            max_viewport_dims,
        }
    }
}

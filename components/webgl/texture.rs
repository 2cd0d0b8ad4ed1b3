/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Texture bookkeeping: per-face/per-level image records, tex-image
//! argument validation and pixel unpacking.

use byteorder::{ByteOrder, NativeEndian};
use euclid::default::Size2D;
use fnv::FnvHashMap;
use half::f16;
use webgl_traits::constants as gl;
use webgl_traits::{GLLimits, TexDataType, TexFormat, WebGLError, WebGLResult};

/// The image target of a `tex_image_2d` family call: the 2D target or
/// one of the six cube map faces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TexImageTarget {
    Texture2D,
    CubeMapPositiveX,
    CubeMapNegativeX,
    CubeMapPositiveY,
    CubeMapNegativeY,
    CubeMapPositiveZ,
    CubeMapNegativeZ,
}

impl TexImageTarget {
    pub fn from_gl_constant(constant: u32) -> Option<TexImageTarget> {
        Some(match constant {
            gl::TEXTURE_2D => TexImageTarget::Texture2D,
            gl::TEXTURE_CUBE_MAP_POSITIVE_X => TexImageTarget::CubeMapPositiveX,
            gl::TEXTURE_CUBE_MAP_NEGATIVE_X => TexImageTarget::CubeMapNegativeX,
            gl::TEXTURE_CUBE_MAP_POSITIVE_Y => TexImageTarget::CubeMapPositiveY,
            gl::TEXTURE_CUBE_MAP_NEGATIVE_Y => TexImageTarget::CubeMapNegativeY,
            gl::TEXTURE_CUBE_MAP_POSITIVE_Z => TexImageTarget::CubeMapPositiveZ,
            gl::TEXTURE_CUBE_MAP_NEGATIVE_Z => TexImageTarget::CubeMapNegativeZ,
            _ => return None,
        })
    }

    pub fn as_gl_constant(self) -> u32 {
        match self {
            TexImageTarget::Texture2D => gl::TEXTURE_2D,
            TexImageTarget::CubeMapPositiveX => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
            TexImageTarget::CubeMapNegativeX => gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
            TexImageTarget::CubeMapPositiveY => gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
            TexImageTarget::CubeMapNegativeY => gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            TexImageTarget::CubeMapPositiveZ => gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
            TexImageTarget::CubeMapNegativeZ => gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        }
    }

    pub fn is_cubic(self) -> bool {
        !matches!(self, TexImageTarget::Texture2D)
    }

    /// The binding target that must hold a texture for this image
    /// target.
    pub fn texture_target(self) -> u32 {
        if self.is_cubic() {
            gl::TEXTURE_CUBE_MAP
        } else {
            gl::TEXTURE_2D
        }
    }

    fn face_index(self) -> u8 {
        match self {
            TexImageTarget::Texture2D => 0,
            TexImageTarget::CubeMapPositiveX => 0,
            TexImageTarget::CubeMapNegativeX => 1,
            TexImageTarget::CubeMapPositiveY => 2,
            TexImageTarget::CubeMapNegativeY => 3,
            TexImageTarget::CubeMapPositiveZ => 4,
            TexImageTarget::CubeMapNegativeZ => 5,
        }
    }
}

/// What is known about one level of one face of a texture.
#[derive(Clone, Copy, Debug)]
pub struct ImageInfo {
    width: u32,
    height: u32,
    internal_format: TexFormat,
    data_type: Option<TexDataType>,
}

impl ImageInfo {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn internal_format(&self) -> TexFormat {
        self.internal_format
    }

    pub fn data_type(&self) -> Option<TexDataType> {
        self.data_type
    }
}

/// Driver-object bookkeeping for a texture.
#[derive(Debug, Default)]
pub struct TextureInfo {
    /// The texture target this texture was first bound to. Rebinding
    /// to a different target is an invalid operation.
    target: Option<u32>,
    images: FnvHashMap<(u8, u32), ImageInfo>,
}

impl TextureInfo {
    pub fn target(&self) -> Option<u32> {
        self.target
    }

    /// Locks the texture to `target` on first bind. Fails if the
    /// texture was previously bound to a different target.
    pub fn set_target(&mut self, target: u32) -> WebGLResult<()> {
        match self.target {
            Some(previous) if previous != target => Err(WebGLError::InvalidOperation),
            _ => {
                self.target = Some(target);
                Ok(())
            },
        }
    }

    pub fn set_image_info(
        &mut self,
        target: TexImageTarget,
        level: u32,
        width: u32,
        height: u32,
        internal_format: TexFormat,
        data_type: Option<TexDataType>,
    ) {
        self.images.insert(
            (target.face_index(), level),
            ImageInfo {
                width,
                height,
                internal_format,
                data_type,
            },
        );
    }

    pub fn image_info(&self, target: TexImageTarget, level: u32) -> Option<&ImageInfo> {
        self.images.get(&(target.face_index(), level))
    }
}

/// The validated result of a tex-image call.
pub struct TexImageValidationResult {
    pub target: TexImageTarget,
    pub level: u32,
    pub internal_format: TexFormat,
    pub format: TexFormat,
    pub data_type: TexDataType,
    pub size: Size2D<u32>,
}

fn log2(n: u32) -> u32 {
    31 - n.leading_zeros()
}

/// Validates the common arguments of `tex_image_2d` and
/// `tex_sub_image_2d` per the GLES 2.0.25 manual pages, in
/// spec-mandated precedence order (enum checks before value checks
/// before operation checks).
#[allow(clippy::too_many_arguments)]
pub fn validate_tex_image(
    limits: &GLLimits,
    target: u32,
    level: i32,
    internal_format: u32,
    width: i32,
    height: i32,
    border: i32,
    format: u32,
    data_type: u32,
) -> WebGLResult<TexImageValidationResult> {
    let target = TexImageTarget::from_gl_constant(target).ok_or(WebGLError::InvalidEnum)?;

    let internal_format =
        TexFormat::from_gl_constant(internal_format).ok_or(WebGLError::InvalidEnum)?;
    let format = TexFormat::from_gl_constant(format).ok_or(WebGLError::InvalidEnum)?;
    let data_type = TexDataType::from_gl_constant(data_type).ok_or(WebGLError::InvalidEnum)?;

    // GLES 2.0.25, page 113: cube map faces must be square.
    if target.is_cubic() && width != height {
        return Err(WebGLError::InvalidValue);
    }

    if level < 0 || width < 0 || height < 0 {
        return Err(WebGLError::InvalidValue);
    }

    let level = level as u32;
    let width = width as u32;
    let height = height as u32;

    let max_size = if target.is_cubic() {
        limits.max_cube_map_tex_size
    } else {
        limits.max_tex_size
    };

    let max_size_for_level = max_size.checked_shr(level).unwrap_or(0);
    if width > max_size_for_level || height > max_size_for_level {
        return Err(WebGLError::InvalidValue);
    }

    if level > 0 && (!width.is_power_of_two() || !height.is_power_of_two()) {
        return Err(WebGLError::InvalidValue);
    }

    if level > log2(max_size) {
        return Err(WebGLError::InvalidValue);
    }

    if border != 0 {
        return Err(WebGLError::InvalidValue);
    }

    // In WebGL1 the internal format and format must be identical.
    if format != internal_format {
        return Err(WebGLError::InvalidOperation);
    }

    // Packed types constrain the format they can carry.
    match data_type {
        TexDataType::UnsignedShort4444 | TexDataType::UnsignedShort5551
            if format != TexFormat::RGBA =>
        {
            return Err(WebGLError::InvalidOperation);
        },
        TexDataType::UnsignedShort565 if format != TexFormat::RGB => {
            return Err(WebGLError::InvalidOperation);
        },
        _ => {},
    }

    Ok(TexImageValidationResult {
        target,
        level,
        internal_format,
        format,
        data_type,
        size: Size2D::new(width, height),
    })
}

/// The tight (alignment 1) size in bytes of one row of pixels.
pub fn unpacked_row_bytes(width: u32, format: TexFormat, data_type: TexDataType) -> usize {
    let components = format.components();
    let elements_per_pixel = components / data_type.components_per_element();
    width as usize * data_type.element_size() as usize * elements_per_pixel as usize
}

/// The byte length a client-supplied pixel buffer must have for the
/// given image dimensions, honoring the unpack alignment for every row
/// but the last.
pub fn expected_byte_length(
    size: Size2D<u32>,
    format: TexFormat,
    data_type: TexDataType,
    unpack_alignment: u32,
) -> usize {
    if size.width == 0 || size.height == 0 {
        return 0;
    }
    let row = unpacked_row_bytes(size.width, format, data_type);
    let alignment = unpack_alignment as usize;
    let stride = (row + alignment - 1) & !(alignment - 1);
    stride * (size.height as usize - 1) + row
}

/// Applies the WebGL pixel storage settings to client data before it
/// is handed to the driver: optional Y-axis flip and optional alpha
/// premultiplication. Returns data tightly packed per
/// `unpack_alignment`.
pub fn prepare_pixels(
    format: TexFormat,
    data_type: TexDataType,
    size: Size2D<u32>,
    unpack_alignment: u32,
    flip_y: bool,
    premultiply_alpha: bool,
    mut data: Vec<u8>,
) -> Vec<u8> {
    if flip_y {
        data = flip_pixels_y(size, unpack_alignment, format, data_type, &data);
    }
    if premultiply_alpha {
        premultiply_inplace(format, data_type, &mut data);
    }
    data
}

fn flip_pixels_y(
    size: Size2D<u32>,
    unpack_alignment: u32,
    format: TexFormat,
    data_type: TexDataType,
    pixels: &[u8],
) -> Vec<u8> {
    let row = unpacked_row_bytes(size.width, format, data_type);
    let alignment = unpack_alignment as usize;
    let stride = (row + alignment - 1) & !(alignment - 1);

    let mut flipped = Vec::with_capacity(pixels.len());
    for rev in (0..size.height as usize).rev() {
        let src = &pixels[rev * stride..rev * stride + row];
        flipped.extend_from_slice(src);
        // Pad interior rows back out to the unpack stride.
        if rev != 0 {
            flipped.extend(std::iter::repeat(0).take(stride - row));
        }
    }
    flipped
}

fn multiply_u8_color(a: u8, b: u8) -> u8 {
    (a as u32 * b as u32 / 255) as u8
}

fn premultiply_inplace(format: TexFormat, data_type: TexDataType, pixels: &mut [u8]) {
    match (format, data_type) {
        (TexFormat::RGBA, TexDataType::UnsignedByte) => {
            for rgba in pixels.chunks_mut(4) {
                rgba[0] = multiply_u8_color(rgba[0], rgba[3]);
                rgba[1] = multiply_u8_color(rgba[1], rgba[3]);
                rgba[2] = multiply_u8_color(rgba[2], rgba[3]);
            }
        },
        (TexFormat::LuminanceAlpha, TexDataType::UnsignedByte) => {
            for la in pixels.chunks_mut(2) {
                la[0] = multiply_u8_color(la[0], la[1]);
            }
        },
        (TexFormat::RGBA, TexDataType::UnsignedShort5551) => {
            for rgba in pixels.chunks_mut(2) {
                let pix = NativeEndian::read_u16(rgba);
                if pix & (1 << 15) != 0 {
                    NativeEndian::write_u16(rgba, pix);
                } else {
                    NativeEndian::write_u16(rgba, 0);
                }
            }
        },
        (TexFormat::RGBA, TexDataType::UnsignedShort4444) => {
            for rgba in pixels.chunks_mut(2) {
                let pix = NativeEndian::read_u16(rgba);
                let extend_to_8_bits = |val| (val | (val << 4)) as u8;
                let r = extend_to_8_bits(pix >> 12 & 0x0f);
                let g = extend_to_8_bits(pix >> 8 & 0x0f);
                let b = extend_to_8_bits(pix >> 4 & 0x0f);
                let a = extend_to_8_bits(pix & 0x0f);
                NativeEndian::write_u16(
                    rgba,
                    ((multiply_u8_color(r, a) & 0xf0) as u16) << 8 |
                        ((multiply_u8_color(g, a) & 0xf0) as u16) << 4 |
                        (multiply_u8_color(b, a) & 0xf0) as u16 |
                        (a & 0x0f) as u16,
                );
            }
        },
        (TexFormat::RGBA, TexDataType::Float) => {
            for rgba in pixels.chunks_mut(16) {
                let a = NativeEndian::read_f32(&rgba[12..16]);
                for component in rgba.chunks_mut(4).take(3) {
                    let value = NativeEndian::read_f32(component);
                    NativeEndian::write_f32(component, value * a);
                }
            }
        },
        (TexFormat::RGBA, TexDataType::HalfFloat) => {
            for rgba in pixels.chunks_mut(8) {
                let a = f16::from_bits(NativeEndian::read_u16(&rgba[6..8])).to_f32();
                for component in rgba.chunks_mut(2).take(3) {
                    let value = f16::from_bits(NativeEndian::read_u16(component)).to_f32();
                    NativeEndian::write_u16(component, f16::from_f32(value * a).to_bits());
                }
            }
        },
        // Formats without alpha are unaffected.
        _ => {},
    }
}

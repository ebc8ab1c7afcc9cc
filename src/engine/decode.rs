use crate::foundation::error::{CanopyError, CanopyResult};

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub(crate) struct DecodedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Vec<u8>,
}

/// Decode an encoded image (any format enabled in `image`) into premultiplied RGBA8.
pub(crate) fn decode_image(bytes: &[u8]) -> CanopyResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(CanopyError::resource("cannot decode empty image data"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CanopyError::resource(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul,
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/decode.rs"]
mod tests;

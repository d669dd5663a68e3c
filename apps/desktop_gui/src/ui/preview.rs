//! GPU textures built from the workflow's preview handles.

use std::collections::HashMap;

use client_core::{PreviewHandle, PreviewId};
use eframe::egui;
use egui::TextureHandle;

pub const PREVIEW_MAX_HEIGHT: f32 = 200.0;

pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

enum PreviewTexture {
    Ready(TextureHandle),
    DecodeFailed,
}

/// One texture per live preview handle. Entries are removed when the
/// workflow releases the handle, which frees the texture.
#[derive(Default)]
pub struct PreviewTextures {
    textures: HashMap<PreviewId, PreviewTexture>,
}

impl PreviewTextures {
    /// Returns the texture for `handle`, decoding it on first use.
    pub fn texture_for(&mut self, ctx: &egui::Context, handle: &PreviewHandle) -> Option<&TextureHandle> {
        let entry = self.textures.entry(handle.id()).or_insert_with(|| {
            match decode_preview_image(handle.bytes()) {
                Ok(image) => {
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [image.width, image.height],
                        &image.rgba,
                    );
                    PreviewTexture::Ready(ctx.load_texture(
                        format!("selected-preview:{}", handle.id().0),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ))
                }
                Err(err) => {
                    tracing::warn!(preview = handle.id().0, "failed to decode preview: {err}");
                    PreviewTexture::DecodeFailed
                }
            }
        });
        match entry {
            PreviewTexture::Ready(texture) => Some(texture),
            PreviewTexture::DecodeFailed => None,
        }
    }

    pub fn release(&mut self, id: PreviewId) {
        self.textures.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }
}

pub fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = dynamic.thumbnail(1024, 1024).to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(PreviewImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}

//! wgpu helpers for presenting a negotiated surface.
//!
//! The host compositor samples the session's shared buffer as an ordinary
//! texture; this module sizes one to the current descriptor and handles the
//! row-alignment dance for CPU uploads.

use media_engine::{SurfaceDescriptor, SurfaceFormat};

const BYTES_PER_TEXEL: usize = 4;

/// GPU texture sized to a negotiated surface descriptor.
pub struct PresentTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl PresentTexture {
    /// Create a texture matching `descriptor`, or `None` while the engine
    /// has not produced a frame yet.
    pub fn from_descriptor(
        device: &wgpu::Device,
        descriptor: &SurfaceDescriptor,
    ) -> Option<Self> {
        if descriptor.is_empty() || descriptor.width == 0 || descriptor.height == 0 {
            return None;
        }
        let format = match descriptor.format {
            SurfaceFormat::Bgra8 => wgpu::TextureFormat::Bgra8Unorm,
            SurfaceFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("playback_session_surface"),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Some(Self {
            texture,
            view,
            width: descriptor.width,
            height: descriptor.height,
        })
    }

    /// Upload one frame of tightly packed 4-byte texels, padding rows to the
    /// copy alignment when the width requires it.
    pub fn upload(&self, queue: &wgpu::Queue, pixels: &[u8]) {
        let bytes_per_row = self.width as usize * BYTES_PER_TEXEL;
        debug_assert_eq!(pixels.len(), bytes_per_row * self.height as usize);
        let padded_bpr = padded_bytes_per_row(self.width);
        let copy = wgpu::ImageCopyTexture {
            texture: &self.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        };
        let extent = wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        };
        if padded_bpr == bytes_per_row {
            queue.write_texture(
                copy,
                pixels,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row as u32),
                    rows_per_image: Some(self.height),
                },
                extent,
            );
            return;
        }
        let mut padded = vec![0u8; padded_bpr * self.height as usize];
        for row in 0..self.height as usize {
            let src = row * bytes_per_row;
            let dst = row * padded_bpr;
            padded[dst..dst + bytes_per_row].copy_from_slice(&pixels[src..src + bytes_per_row]);
        }
        queue.write_texture(
            copy,
            &padded,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr as u32),
                rows_per_image: Some(self.height),
            },
            extent,
        );
    }
}

/// Row stride satisfying `COPY_BYTES_PER_ROW_ALIGNMENT` for a given width.
pub fn padded_bytes_per_row(width: u32) -> usize {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    let bytes_per_row = width as usize * BYTES_PER_TEXEL;
    (bytes_per_row + align - 1) / align * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_widths_keep_their_natural_stride() {
        // 256 texels * 4 bytes = 1024, already a multiple of 256.
        assert_eq!(padded_bytes_per_row(256), 1024);
        assert_eq!(padded_bytes_per_row(64), 256);
    }

    #[test]
    fn odd_widths_round_up_to_the_alignment() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1920), 7680);
    }
}

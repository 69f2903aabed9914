use std::sync::Arc;

use image::RgbaImage;

use crate::renderer::DisplayImage;

/// GPU-backed display image: a sampled texture plus a CPU staging buffer.
///
/// The staging image always mirrors the most recently published frame;
/// `set_data` refreshes it and uploads it to the texture in one go.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    staging: RgbaImage,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl Texture {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        width: u32,
        height: u32,
    ) -> Self {
        let (texture, view) = create_texture(&device, width, height);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            staging: RgbaImage::new(width, height),
            device,
            queue,
        }
    }
}

fn create_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("display image"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

impl DisplayImage for Texture {
    fn width(&self) -> u32 {
        self.staging.width()
    }

    fn height(&self) -> u32 {
        self.staging.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (texture, view) = create_texture(&self.device, width, height);
        self.texture = texture;
        self.view = view;
        self.staging = RgbaImage::new(width, height);
    }

    fn set_data(&mut self, pixels: &[u32]) {
        self.staging.copy_from_slice(bytemuck::cast_slice(pixels));
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.staging,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.staging.width()),
                rows_per_image: Some(self.staging.height()),
            },
            wgpu::Extent3d {
                width: self.staging.width(),
                height: self.staging.height(),
                depth_or_array_layers: 1,
            },
        );
    }
}

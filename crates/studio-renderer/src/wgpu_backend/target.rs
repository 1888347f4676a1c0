//! Offscreen render target

/// Color, MSAA and depth textures for one viewport
///
/// The color texture is sampled by the UI and copied out for captures, so it
/// is always single-sampled. With MSAA enabled the pass renders into a
/// multisampled texture and resolves into it.
pub struct RenderTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    depth_view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,
    generation: u64,
}

impl RenderTarget {
    /// Allocate textures; zero sizes are clamped to one pixel
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (color, color_view) = create_color_texture(device, format, width, height);
        Self {
            msaa_view: create_msaa_view(device, format, sample_count, width, height),
            depth_view: create_depth_view(device, sample_count, width, height),
            color,
            color_view,
            format,
            sample_count,
            width,
            height,
            generation: 0,
        }
    }

    /// Reallocate for a new size; returns whether anything changed
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return false;
        }
        *self = Self {
            generation: self.generation + 1,
            ..Self::new(device, self.format, self.sample_count, width, height)
        };
        true
    }

    /// Resolved color texture
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color
    }

    /// View of the resolved color texture
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    /// Color attachment for a pass that clears to `clear`
    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&self.color_view)),
            None => (&self.color_view, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        }
    }

    /// Depth attachment cleared to the far plane
    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    /// Color format
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// MSAA sample count
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bumped on every reallocation so texture views held elsewhere can be
    /// refreshed
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn create_color_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Viewport Color Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn create_msaa_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Viewport MSAA Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

fn create_depth_view(
    device: &wgpu::Device,
    sample_count: u32,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Viewport Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: crate::constants::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

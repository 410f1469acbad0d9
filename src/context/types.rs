//! Common types shared between the unit graph and the rendering context.

use bitflags::bitflags;

/// Texture target type.
///
/// Only 2D and cubemap textures have an allocation and attachment strategy.
/// `Volume` can enter the graph through externally supplied textures and is
/// reported as unsupported wherever it is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    D2,
    Cubemap,
    Volume,
}

impl TextureType {
    /// Number of array layers backing a texture of this type.
    pub fn layer_count(&self) -> u32 {
        match self {
            TextureType::D2 => 1,
            TextureType::Cubemap => 6,
            TextureType::Volume => 1,
        }
    }
}

impl std::fmt::Display for TextureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureType::D2 => write!(f, "2d"),
            TextureType::Cubemap => write!(f, "cubemap"),
            TextureType::Volume => write!(f, "volume"),
        }
    }
}

/// One face of a cubemap texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CubemapFace {
    #[default]
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubemapFace {
    pub const ALL: [CubemapFace; 6] = [
        CubemapFace::PositiveX,
        CubemapFace::NegativeX,
        CubemapFace::PositiveY,
        CubemapFace::NegativeY,
        CubemapFace::PositiveZ,
        CubemapFace::NegativeZ,
    ];

    /// Array layer index of this face.
    pub fn layer(&self) -> u32 {
        *self as u32
    }
}

/// Internal texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    Rg32Float,
    R32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl InternalFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            InternalFormat::Depth32Float | InternalFormat::Depth24PlusStencil8
        )
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            InternalFormat::Rgba8Unorm
            | InternalFormat::Rgba8UnormSrgb
            | InternalFormat::Bgra8Unorm
            | InternalFormat::Bgra8UnormSrgb
            | InternalFormat::R32Float
            | InternalFormat::Depth32Float
            | InternalFormat::Depth24PlusStencil8 => 4,
            InternalFormat::Rgba16Float | InternalFormat::Rg32Float => 8,
            InternalFormat::Rgba32Float => 16,
        }
    }

    /// Derive the source (upload) format from the internal format.
    ///
    /// Fixed inference table: all 4-channel internal formats map to `Rgba`,
    /// regardless of bit depth, and depth formats map to their depth variant.
    pub fn source_format(&self) -> SourceFormat {
        match self {
            InternalFormat::Rgba8Unorm
            | InternalFormat::Rgba8UnormSrgb
            | InternalFormat::Bgra8Unorm
            | InternalFormat::Bgra8UnormSrgb
            | InternalFormat::Rgba16Float
            | InternalFormat::Rgba32Float => SourceFormat::Rgba,
            InternalFormat::Rg32Float => SourceFormat::Rg,
            InternalFormat::R32Float => SourceFormat::R,
            InternalFormat::Depth32Float => SourceFormat::Depth,
            InternalFormat::Depth24PlusStencil8 => SourceFormat::DepthStencil,
        }
    }
}

/// Source pixel layout inferred from an [`InternalFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Rgba,
    Rg,
    R,
    Depth,
    DepthStencil,
}

impl SourceFormat {
    /// Number of channels in this layout.
    pub fn channel_count(&self) -> u32 {
        match self {
            SourceFormat::Rgba => 4,
            SourceFormat::Rg => 2,
            SourceFormat::R | SourceFormat::Depth => 1,
            SourceFormat::DepthStencil => 2,
        }
    }
}

/// Filter mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Address mode for texture coordinates outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

bitflags! {
    /// Texture usage flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextureUsage: u32 {
        const COPY_SRC = 1 << 0;
        const COPY_DST = 1 << 1;
        const TEXTURE_BINDING = 1 << 2;
        const RENDER_ATTACHMENT = 1 << 3;
    }
}

/// Texture descriptor.
#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub ty: TextureType,
    pub width: u32,
    pub height: u32,
    pub internal_format: InternalFormat,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub wrap_u: AddressMode,
    pub wrap_v: AddressMode,
    pub border_color: [f32; 4],
    /// Whether the driver may resize non-power-of-two textures.
    pub resize_npot: bool,
    pub usage: TextureUsage,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            ty: TextureType::D2,
            width: 1,
            height: 1,
            internal_format: InternalFormat::Rgba8Unorm,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            wrap_u: AddressMode::ClampToEdge,
            wrap_v: AddressMode::ClampToEdge,
            border_color: [0.0; 4],
            resize_npot: true,
            usage: TextureUsage::TEXTURE_BINDING.union(TextureUsage::COPY_DST),
        }
    }
}

impl TextureDescriptor {
    /// Descriptor for a render-target-capable texture.
    pub fn render_target(
        ty: TextureType,
        width: u32,
        height: u32,
        internal_format: InternalFormat,
    ) -> Self {
        Self {
            ty,
            width,
            height,
            internal_format,
            usage: TextureUsage::TEXTURE_BINDING.union(TextureUsage::RENDER_ATTACHMENT),
            resize_npot: false,
            ..Default::default()
        }
    }

    /// Total payload size in bytes for a zero-filled allocation.
    pub fn payload_len(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.internal_format.bytes_per_pixel() as usize
            * self.ty.layer_count() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(InternalFormat::Rgba16Float, SourceFormat::Rgba)]
    #[case(InternalFormat::Rgba8Unorm, SourceFormat::Rgba)]
    #[case(InternalFormat::Bgra8UnormSrgb, SourceFormat::Rgba)]
    #[case(InternalFormat::Rg32Float, SourceFormat::Rg)]
    #[case(InternalFormat::R32Float, SourceFormat::R)]
    #[case(InternalFormat::Depth32Float, SourceFormat::Depth)]
    fn source_format_inference(#[case] internal: InternalFormat, #[case] expected: SourceFormat) {
        assert_eq!(internal.source_format(), expected);
    }

    #[test]
    fn payload_len_accounts_for_cubemap_layers() {
        let d2 = TextureDescriptor::render_target(TextureType::D2, 4, 4, InternalFormat::Rgba8Unorm);
        let cube =
            TextureDescriptor::render_target(TextureType::Cubemap, 4, 4, InternalFormat::Rgba8Unorm);
        assert_eq!(d2.payload_len(), 4 * 4 * 4);
        assert_eq!(cube.payload_len(), 4 * 4 * 4 * 6);
    }

    #[test]
    fn render_target_defaults() {
        let desc =
            TextureDescriptor::render_target(TextureType::D2, 640, 480, InternalFormat::Rgba16Float);
        assert_eq!(desc.wrap_u, AddressMode::ClampToEdge);
        assert_eq!(desc.wrap_v, AddressMode::ClampToEdge);
        assert_eq!(desc.border_color, [0.0; 4]);
        assert!(desc.usage.contains(TextureUsage::RENDER_ATTACHMENT));
    }
}

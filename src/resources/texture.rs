//! Shared texture resource.
//!
//! Textures are created by a [`RenderContext`](crate::context::RenderContext)
//! and reference-counted: the unit that allocated one and every downstream
//! unit that binds it as an input hold the same `Arc`. Identity is the
//! context-assigned [`TextureId`]; a resize or format change mutates the
//! texture in place and preserves identity, so dependents holding a reference
//! keep pointing at the correct resource.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::types::{
    AddressMode, FilterMode, InternalFormat, SourceFormat, TextureDescriptor, TextureType,
};

/// Unique identity of a texture within its owning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

/// Shared handle to a texture.
pub type TextureRef = Arc<Texture>;

struct TextureState {
    width: u32,
    height: u32,
    internal_format: InternalFormat,
    source_format: SourceFormat,
    min_filter: FilterMode,
    mag_filter: FilterMode,
    wrap_u: AddressMode,
    wrap_v: AddressMode,
    border_color: [f32; 4],
    resize_npot: bool,
    /// Host-visible backing payload, zero-filled on every (re)specification.
    payload: Vec<u8>,
}

impl TextureState {
    fn respecify_payload(&mut self, layers: u32) {
        let len = self.width as usize
            * self.height as usize
            * self.internal_format.bytes_per_pixel() as usize
            * layers as usize;
        self.payload = vec![0; len];
    }
}

/// A GPU texture resource with interior-mutable metadata.
pub struct Texture {
    id: TextureId,
    ty: TextureType,
    label: Option<String>,
    state: Mutex<TextureState>,
}

impl Texture {
    /// Create a texture from a descriptor. Called by context implementations.
    pub fn new(id: u64, desc: TextureDescriptor) -> Self {
        let mut state = TextureState {
            width: desc.width,
            height: desc.height,
            internal_format: desc.internal_format,
            source_format: desc.internal_format.source_format(),
            min_filter: desc.min_filter,
            mag_filter: desc.mag_filter,
            wrap_u: desc.wrap_u,
            wrap_v: desc.wrap_v,
            border_color: desc.border_color,
            resize_npot: desc.resize_npot,
            payload: Vec::new(),
        };
        state.respecify_payload(desc.ty.layer_count());
        Self {
            id: TextureId(id),
            ty: desc.ty,
            label: desc.label,
            state: Mutex::new(state),
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn ty(&self) -> TextureType {
        self.ty
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Native size (width, height).
    pub fn size(&self) -> (u32, u32) {
        let state = self.state.lock();
        (state.width, state.height)
    }

    pub fn width(&self) -> u32 {
        self.state.lock().width
    }

    pub fn height(&self) -> u32 {
        self.state.lock().height
    }

    /// Resize in place. Identity is preserved; the payload is re-zeroed at
    /// the new size.
    pub fn set_size(&self, width: u32, height: u32) {
        let mut state = self.state.lock();
        if state.width == width && state.height == height {
            return;
        }
        state.width = width;
        state.height = height;
        state.respecify_payload(self.ty.layer_count());
    }

    pub fn internal_format(&self) -> InternalFormat {
        self.state.lock().internal_format
    }

    pub fn source_format(&self) -> SourceFormat {
        self.state.lock().source_format
    }

    /// Change the internal format in place; the source format is re-derived.
    /// Size and identity are unchanged.
    pub fn set_internal_format(&self, format: InternalFormat) {
        let mut state = self.state.lock();
        if state.internal_format == format {
            return;
        }
        state.internal_format = format;
        state.source_format = format.source_format();
        state.respecify_payload(self.ty.layer_count());
    }

    pub fn min_filter(&self) -> FilterMode {
        self.state.lock().min_filter
    }

    pub fn mag_filter(&self) -> FilterMode {
        self.state.lock().mag_filter
    }

    pub fn set_filters(&self, min: FilterMode, mag: FilterMode) {
        let mut state = self.state.lock();
        state.min_filter = min;
        state.mag_filter = mag;
    }

    pub fn wrap_modes(&self) -> (AddressMode, AddressMode) {
        let state = self.state.lock();
        (state.wrap_u, state.wrap_v)
    }

    pub fn border_color(&self) -> [f32; 4] {
        self.state.lock().border_color
    }

    pub fn resize_npot(&self) -> bool {
        self.state.lock().resize_npot
    }

    /// Length of the host-visible payload in bytes.
    pub fn payload_len(&self) -> usize {
        self.state.lock().payload.len()
    }

    /// Whether every payload byte is zero.
    pub fn payload_is_zeroed(&self) -> bool {
        self.state.lock().payload.iter().all(|&b| b == 0)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture {}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("ty", &self.ty)
            .field("size", &(state.width, state.height))
            .field("internal_format", &state.internal_format)
            .field("label", &self.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(desc: TextureDescriptor) -> Texture {
        Texture::new(7, desc)
    }

    #[test]
    fn resize_preserves_identity_and_rezeroes() {
        let tex = make(TextureDescriptor::render_target(
            TextureType::D2,
            640,
            480,
            InternalFormat::Rgba8Unorm,
        ));
        let id = tex.id();
        tex.set_size(1280, 720);
        assert_eq!(tex.id(), id);
        assert_eq!(tex.size(), (1280, 720));
        assert_eq!(tex.payload_len(), 1280 * 720 * 4);
        assert!(tex.payload_is_zeroed());
    }

    #[test]
    fn format_change_rederives_source_format_without_resizing() {
        let tex = make(TextureDescriptor::render_target(
            TextureType::D2,
            800,
            600,
            InternalFormat::Rgba16Float,
        ));
        assert_eq!(tex.source_format(), SourceFormat::Rgba);
        tex.set_internal_format(InternalFormat::R32Float);
        assert_eq!(tex.internal_format(), InternalFormat::R32Float);
        assert_eq!(tex.source_format(), SourceFormat::R);
        assert_eq!(tex.size(), (800, 600));
    }

    #[test]
    fn cubemap_payload_covers_all_faces() {
        let tex = make(TextureDescriptor::render_target(
            TextureType::Cubemap,
            16,
            16,
            InternalFormat::Rgba8Unorm,
        ));
        assert_eq!(tex.payload_len(), 16 * 16 * 4 * 6);
    }
}

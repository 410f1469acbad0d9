//! Headless software rendering context.
//!
//! Backs the unit graph with CPU-side allocations only. Used by the test
//! suite and as the reference implementation of [`RenderContext`].

use std::sync::Arc;

use crate::context::traits::{ContextError, ContextResult, RenderContext};
use crate::context::types::{TextureDescriptor, TextureType};
use crate::resources::texture::{Texture, TextureRef};

/// A context that services allocations from host memory.
pub struct HeadlessContext {
    next_texture_id: u64,
    textures_created: u64,
    current: bool,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self {
            next_texture_id: 1,
            textures_created: 0,
            current: true,
        }
    }

    /// Mark the context as current or not.
    pub fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    /// Number of textures allocated through this context so far.
    pub fn textures_created(&self) -> u64 {
        self.textures_created
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for HeadlessContext {
    fn is_current(&self) -> bool {
        self.current
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> ContextResult<TextureRef> {
        if !self.current {
            return Err(ContextError::NotCurrent);
        }
        if desc.ty == TextureType::Volume {
            return Err(ContextError::UnsupportedTextureType(desc.ty));
        }

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures_created += 1;

        let texture = Texture::new(id, desc.clone());
        log::debug!(
            "headless: created texture #{} ({}x{}, {:?}, {})",
            id,
            desc.width,
            desc.height,
            desc.internal_format,
            desc.ty
        );
        Ok(Arc::new(texture))
    }
}

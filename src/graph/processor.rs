//! Graph root node.
//!
//! The processor owns the active viewport and the named attachments of the
//! render target it post-processes (e.g. the depth buffer). Units read this
//! state; they never mutate the processor's target.

use std::collections::HashMap;

use crate::resources::texture::TextureRef;
use crate::unit::Viewport;

/// A named component of the processor's render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferComponent {
    Depth,
    Stencil,
    Color(u32),
}

impl std::fmt::Display for BufferComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferComponent::Depth => write!(f, "depth buffer"),
            BufferComponent::Stencil => write!(f, "stencil buffer"),
            BufferComponent::Color(n) => write!(f, "color buffer {n}"),
        }
    }
}

/// The root of a post-processing graph.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    viewport: Option<Viewport>,
    attachments: HashMap<BufferComponent, TextureRef>,
}

impl Processor {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            attachments: HashMap::new(),
        }
    }

    /// Active viewport of the processed target.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Expose a named attachment of the processed render target.
    pub fn set_attachment(&mut self, component: BufferComponent, texture: TextureRef) {
        self.attachments.insert(component, texture);
    }

    pub fn remove_attachment(&mut self, component: BufferComponent) -> Option<TextureRef> {
        self.attachments.remove(&component)
    }

    /// Look up a named attachment.
    pub fn attachment(&self, component: BufferComponent) -> Option<&TextureRef> {
        self.attachments.get(&component)
    }

    pub(crate) fn attachments_map(&self) -> &HashMap<BufferComponent, TextureRef> {
        &self.attachments
    }
}

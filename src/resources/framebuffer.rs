//! Off-screen framebuffer object.
//!
//! A framebuffer aggregates the color attachment points a unit renders into.
//! Rebuilding the attachment set is a full replace: attachment points absent
//! from the new set are dropped, which keeps reattachment idempotent.

use crate::context::types::CubemapFace;
use crate::resources::texture::TextureRef;

/// A single color attachment point.
#[derive(Debug, Clone)]
pub struct Attachment {
    texture: TextureRef,
    /// Face selector, present only for cubemap targets.
    face: Option<CubemapFace>,
}

impl Attachment {
    /// Attach a 2D texture directly.
    pub fn texture_2d(texture: TextureRef) -> Self {
        Self {
            texture,
            face: None,
        }
    }

    /// Attach one face of a cubemap texture.
    pub fn cubemap_face(texture: TextureRef, face: CubemapFace) -> Self {
        Self {
            texture,
            face: Some(face),
        }
    }

    pub fn texture(&self) -> &TextureRef {
        &self.texture
    }

    pub fn face(&self) -> Option<CubemapFace> {
        self.face
    }
}

/// An ordered set of color attachment points.
///
/// Index *i* corresponds to color attachment *i*. Slots that could not be
/// attached (unsupported type, bypassed output) are left empty.
#[derive(Debug, Clone, Default)]
pub struct Framebuffer {
    color_attachments: Vec<Option<Attachment>>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole attachment set.
    pub fn replace_attachments(&mut self, attachments: Vec<Option<Attachment>>) {
        self.color_attachments = attachments;
    }

    /// Drop all attachments.
    pub fn clear(&mut self) {
        self.color_attachments.clear();
    }

    /// Attachment bound at color attachment point `index`, if any.
    pub fn attachment(&self, index: usize) -> Option<&Attachment> {
        self.color_attachments.get(index).and_then(Option::as_ref)
    }

    /// All attachment points in order, including unbound ones.
    pub fn color_attachments(&self) -> &[Option<Attachment>] {
        &self.color_attachments
    }

    /// Number of bound attachment points.
    pub fn attachment_count(&self) -> usize {
        self.color_attachments
            .iter()
            .filter(|a| a.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.attachment_count() == 0
    }
}

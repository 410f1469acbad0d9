//! Shared GPU resource types.

pub mod framebuffer;
pub mod texture;

pub use framebuffer::{Attachment, Framebuffer};
pub use texture::{Texture, TextureId, TextureRef};

//! Rendering context abstraction.
//!
//! The unit graph issues texture creation calls against a [`RenderContext`].
//! The context must be current (bound) for any lifecycle phase to be valid;
//! there is no other threading contract.

use thiserror::Error;

use crate::context::types::{TextureDescriptor, TextureType};
use crate::resources::texture::TextureRef;

/// Context error type.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("texture type {0} has no allocation strategy")]
    UnsupportedTextureType(TextureType),
    #[error("rendering context is not current")]
    NotCurrent,
    #[error("failed to create texture: {0}")]
    TextureCreationFailed(String),
}

pub type ContextResult<T> = Result<T, ContextError>;

/// A rendering context the graph allocates its resources against.
///
/// All calls are synchronous; the single-threaded cooperative model of the
/// graph means implementations need no internal locking.
pub trait RenderContext {
    /// Whether this context is the currently bound one.
    fn is_current(&self) -> bool;

    /// Allocate a render-target-capable texture.
    ///
    /// The returned texture is filled with a deterministic all-zero payload
    /// so sampling it before the first render pass is well-defined.
    fn create_texture(&mut self, desc: &TextureDescriptor) -> ContextResult<TextureRef>;
}

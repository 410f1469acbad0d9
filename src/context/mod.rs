//! Rendering context abstraction and shared resource types.

pub mod headless;
pub mod traits;
pub mod types;

pub use headless::HeadlessContext;
pub use traits::{ContextError, ContextResult, RenderContext};
pub use types::*;

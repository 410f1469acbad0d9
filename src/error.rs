//! Diagnostic taxonomy for unit lifecycle failures.
//!
//! Lifecycle failures are contained to the affected unit and slot: they are
//! recorded in the unit's [`Diagnostics`] sink, mirrored to the `log` facade,
//! and never propagated upward to abort graph traversal.

use thiserror::Error;

use crate::context::types::TextureType;

/// A condition a unit encountered during its lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// The unit requires a specific ancestor type but is not positioned
    /// under one. The unit's inputs remain empty.
    #[error("unit '{unit}' is not a direct child of a {wanted}")]
    MissingAncestor { unit: String, wanted: &'static str },

    /// An externally sourced attachment is absent. The dependent output is
    /// left unset.
    #[error("unit '{unit}': {what} attachment is absent")]
    MissingAttachment { unit: String, what: String },

    /// A new texture was requested before any valid viewport was known.
    /// The allocation is skipped; existing resources are untouched.
    #[error("unit '{unit}' cannot size output slot {slot}: viewport is invalid")]
    InvalidViewport { unit: String, slot: usize },

    /// A texture type with no allocation or attachment strategy was
    /// requested or encountered. The slot is skipped.
    #[error("unit '{unit}' output slot {slot}: texture type {ty} is not supported")]
    UnsupportedTextureType {
        unit: String,
        slot: usize,
        ty: TextureType,
    },
}

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: UnitError,
}

/// Per-unit diagnostic sink.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a degradable condition.
    pub fn warn(&mut self, error: UnitError) {
        log::warn!("{error}");
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            error,
        });
    }

    /// Record a fatal-per-slot condition.
    pub fn fatal(&mut self, error: UnitError) {
        log::error!("{error}");
        self.entries.push(Diagnostic {
            severity: Severity::Fatal,
            error,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

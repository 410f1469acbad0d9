//! Fixed-capacity texture slot table.
//!
//! Units map small dense integer indices (render-target / MRT slots) to
//! texture handles, for both inputs and outputs. A slot can be *declared*
//! without holding a texture yet; declared-but-empty output slots are what
//! the texture factory materializes.

use crate::resources::texture::TextureRef;

/// Maximum number of slots per table (MRT limit).
pub const MAX_SLOTS: usize = 8;

/// Table from slot index to texture handle.
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    slots: Vec<Option<TextureRef>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared slots (populated or not).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declare `slot`, extending the table with empty slots as needed.
    pub fn declare(&mut self, slot: usize) {
        assert!(slot < MAX_SLOTS, "slot index {slot} exceeds MAX_SLOTS");
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
    }

    /// Texture bound at `slot`, if the slot is declared and populated.
    pub fn get(&self, slot: usize) -> Option<&TextureRef> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Bind (or clear) `slot`, declaring it if necessary.
    pub fn set(&mut self, slot: usize, texture: Option<TextureRef>) {
        self.declare(slot);
        self.slots[slot] = texture;
    }

    /// Bind the next undeclared slot and return its index.
    pub fn push(&mut self, texture: TextureRef) -> usize {
        let slot = self.slots.len();
        self.set(slot, Some(texture));
        slot
    }

    /// Drop all slots, declared or not.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Iterate all declared slots in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&TextureRef>)> {
        self.slots.iter().enumerate().map(|(i, t)| (i, t.as_ref()))
    }

    /// Iterate populated slots in order.
    pub fn populated(&self) -> impl Iterator<Item = (usize, &TextureRef)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (i, t)))
    }

    /// Number of populated slots.
    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|t| t.is_some()).count()
    }
}

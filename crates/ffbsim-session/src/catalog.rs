//! Ordered effect catalog with a wrapping selection cursor
//!
//! The catalog only tracks bookkeeping. Stopping an effect before the
//! cursor moves is the session's job, see
//! [`DeviceSession::select_next`](crate::DeviceSession::select_next).

use ffbsim_errors::CatalogError;
use ffbsim_ffb::EffectDefinition;

use crate::device::EffectHandle;

/// One definition and, once registered, its handle
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub definition: EffectDefinition,
    pub handle: Option<EffectHandle>,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_resident(&self) -> bool {
        self.handle.is_some()
    }
}

/// Insertion-ordered effects, a cursor, and the single playing slot
///
/// At most one entry is playing at any time; [`EffectCatalog::mark_playing`]
/// replaces the previous one.
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::{EffectDefinition, EffectKind};
/// use ffbsim_session::EffectCatalog;
///
/// let mut catalog = EffectCatalog::new();
/// catalog.add(EffectDefinition::new("Left", EffectKind::constant(-0.8)))?;
/// catalog.add(EffectDefinition::new("Right", EffectKind::constant(0.8)))?;
///
/// catalog.retreat();
/// assert_eq!(catalog.current()?.name, "Right");
/// catalog.advance();
/// assert_eq!(catalog.current()?.name, "Left");
/// # Ok::<(), ffbsim_errors::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EffectCatalog {
    entries: Vec<CatalogEntry>,
    cursor: usize,
    playing: Option<usize>,
}

impl EffectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a definition that is not resident yet.
    pub fn add(&mut self, definition: EffectDefinition) -> Result<usize, CatalogError> {
        self.insert(definition, None)
    }

    /// Appends a definition already registered under `handle`.
    pub fn add_resident(
        &mut self,
        definition: EffectDefinition,
        handle: EffectHandle,
    ) -> Result<usize, CatalogError> {
        self.insert(definition, Some(handle))
    }

    fn insert(
        &mut self,
        definition: EffectDefinition,
        handle: Option<EffectHandle>,
    ) -> Result<usize, CatalogError> {
        if self.position(&definition.name).is_some() {
            return Err(CatalogError::DuplicateName(definition.name));
        }
        self.entries.push(CatalogEntry { definition, handle });
        Ok(self.entries.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }

    pub fn position_of_handle(&self, handle: EffectHandle) -> Option<usize> {
        self.entries.iter().position(|e| e.handle == Some(handle))
    }

    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Binds a handle to an existing entry.
    pub fn set_handle(&mut self, index: usize, handle: EffectHandle) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.handle = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Cursor position; `None` when empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn current_entry(&self) -> Result<&CatalogEntry, CatalogError> {
        self.entries.get(self.cursor).ok_or(CatalogError::EmptyCatalog)
    }

    pub fn current(&self) -> Result<&EffectDefinition, CatalogError> {
        self.current_entry().map(|e| &e.definition)
    }

    /// Moves the cursor forward, wrapping to the start. No-op when empty.
    pub fn advance(&mut self) {
        let len = self.entries.len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    /// Moves the cursor backward, wrapping to the end. No-op when empty.
    pub fn retreat(&mut self) {
        let len = self.entries.len();
        if len > 0 {
            self.cursor = (self.cursor + len - 1) % len;
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn resident_handles(&self) -> Vec<EffectHandle> {
        self.entries.iter().filter_map(|e| e.handle).collect()
    }

    pub fn playing(&self) -> Option<usize> {
        self.playing
    }

    pub fn playing_entry(&self) -> Option<&CatalogEntry> {
        self.playing.and_then(|i| self.entries.get(i))
    }

    pub fn is_playing(&self, index: usize) -> bool {
        self.playing == Some(index)
    }

    /// Marks `index` as the only playing entry.
    pub fn mark_playing(&mut self, index: usize) {
        if index < self.entries.len() {
            self.playing = Some(index);
        }
    }

    /// Clears the playing slot if it holds `index`.
    pub fn mark_stopped(&mut self, index: usize) {
        if self.playing == Some(index) {
            self.playing = None;
        }
    }

    pub fn clear_playing(&mut self) {
        self.playing = None;
    }

    /// Detaches every handle, leaving all entries non-resident.
    pub fn take_handles(&mut self) -> Vec<EffectHandle> {
        self.playing = None;
        self.entries.iter_mut().filter_map(|e| e.handle.take()).collect()
    }
}

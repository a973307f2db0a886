//! Portable source value store for `no_std` environments.
//!
//! Holds raw values of named sources (manual values, switches, values
//! mirrored from external entities) so host tasks or interrupts can update
//! them while the engine reads them. Built on `critical-section` and
//! `heapless::LinearMap`.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{LinearMap, String};
use thiserror::Error;

use crate::resolver::{RAW_VALUE_CAPACITY, RawValue, SourceLookup};

/// Maximum length of a source id
pub const SOURCE_ID_CAPACITY: usize = 32;

const UNAVAILABLE_STATE: &str = "unavailable";

/// Source id as stored in a [`SourceStore`]
pub type SourceId = String<SOURCE_ID_CAPACITY>;

/// Error returned when a value cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No room for another source
    #[error("source store is full")]
    Full,
    /// Source id or value exceeds its capacity
    #[error("source id or value is too long")]
    TooLong,
}

/// A bounded, thread-safe map of source values.
///
/// The store uses critical sections for synchronization, making it suitable
/// for embedded environments. At most `SIZE` sources are kept.
pub struct SourceStore<const SIZE: usize> {
    inner: Mutex<RefCell<LinearMap<SourceId, RawValue, SIZE>>>,
}

impl<const SIZE: usize> SourceStore<SIZE> {
    /// Create a new empty store.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(LinearMap::new())),
        }
    }

    /// Set the raw value of a source, creating it if needed.
    pub fn set(&self, source: &str, raw: &str) -> Result<(), StoreError> {
        let id = to_bounded::<SOURCE_ID_CAPACITY>(source)?;
        let value = to_bounded::<RAW_VALUE_CAPACITY>(raw)?;
        critical_section::with(|cs| {
            let mut sources = self.inner.borrow(cs).borrow_mut();
            sources
                .insert(id, value)
                .map(|_| ())
                .map_err(|_| StoreError::Full)
        })
    }

    /// Put an existing source into the `unavailable` state.
    ///
    /// Returns `false` if the source does not exist.
    pub fn mark_unavailable(&self, source: &str) -> bool {
        critical_section::with(|cs| {
            let mut sources = self.inner.borrow(cs).borrow_mut();
            let Some(value) = find_mut(&mut sources, source) else {
                return false;
            };
            value.clear();
            // Fits, the sentinel is shorter than the capacity
            let _ = value.push_str(UNAVAILABLE_STATE);
            true
        })
    }

    /// Remove a source.
    ///
    /// Returns the last raw value if the source existed.
    pub fn remove(&self, source: &str) -> Option<RawValue> {
        let id = to_bounded::<SOURCE_ID_CAPACITY>(source).ok()?;
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().remove(&id))
    }

    /// Get the raw value of a source.
    pub fn get(&self, source: &str) -> Option<RawValue> {
        critical_section::with(|cs| {
            let sources = self.inner.borrow(cs).borrow();
            sources
                .iter()
                .find(|(id, _)| id.as_str() == source)
                .map(|(_, value)| value.clone())
        })
    }

    /// Number of stored sources.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for SourceStore<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> SourceLookup for SourceStore<SIZE> {
    fn source_value(&self, source: &str) -> Option<RawValue> {
        self.get(source)
    }
}

fn find_mut<'m, const SIZE: usize>(
    sources: &'m mut LinearMap<SourceId, RawValue, SIZE>,
    source: &str,
) -> Option<&'m mut RawValue> {
    sources
        .iter_mut()
        .find(|(id, _)| id.as_str() == source)
        .map(|(_, value)| value)
}

fn to_bounded<const N: usize>(s: &str) -> Result<String<N>, StoreError> {
    let mut bounded = String::new();
    bounded.push_str(s).map_err(|()| StoreError::TooLong)?;
    Ok(bounded)
}

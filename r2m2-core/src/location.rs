//! Location database
//!
//! Maps opaque [`LocKey`]s to absolute offsets and/or names. A database is
//! owned by one bridge call, or by one block assembly when labels span
//! lines, and is never shared.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque handle to a location
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocKey(u32);

impl LocKey {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc_{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Location {
    offset: Option<u64>,
    name: Option<String>,
}

/// Per-call symbol table
#[derive(Debug, Clone, Default)]
pub struct LocationDb {
    locations: Vec<Location>,
    by_offset: HashMap<u64, LocKey>,
    by_name: HashMap<String, LocKey>,
}

impl LocationDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of locations created so far
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    fn push(&mut self, location: Location) -> LocKey {
        let key = LocKey::new(self.locations.len() as u32);
        self.locations.push(location);
        key
    }

    /// Key for `offset`, creating it on first use
    pub fn get_or_create_offset_location(&mut self, offset: u64) -> LocKey {
        if let Some(&key) = self.by_offset.get(&offset) {
            return key;
        }
        let key = self.push(Location {
            offset: Some(offset),
            name: None,
        });
        self.by_offset.insert(offset, key);
        key
    }

    /// Key for `name`, creating an offset-less location on first use
    pub fn get_or_create_name_location(&mut self, name: &str) -> LocKey {
        if let Some(&key) = self.by_name.get(name) {
            return key;
        }
        let key = self.push(Location {
            offset: None,
            name: Some(name.to_string()),
        });
        self.by_name.insert(name.to_string(), key);
        key
    }

    /// Look up a named location without creating it
    pub fn name_location(&self, name: &str) -> Option<LocKey> {
        self.by_name.get(name).copied()
    }

    /// Attach an offset to a location.
    ///
    /// Setting the same offset twice is a no-op; moving a location fails.
    pub fn set_location_offset(&mut self, key: LocKey, offset: u64) -> Result<()> {
        let location = self
            .locations
            .get_mut(key.index() as usize)
            .ok_or(CoreError::UnknownLocation(key))?;

        match location.offset {
            Some(existing) if existing == offset => Ok(()),
            Some(existing) => Err(CoreError::LocationRedefined {
                key,
                existing,
                requested: offset,
            }),
            None => {
                location.offset = Some(offset);
                self.by_offset.entry(offset).or_insert(key);
                Ok(())
            }
        }
    }

    /// Offset of a location, if one is known
    pub fn location_offset(&self, key: LocKey) -> Option<u64> {
        self.locations
            .get(key.index() as usize)
            .and_then(|location| location.offset)
    }

    /// Name of a location, if it was created from one
    pub fn location_name(&self, key: LocKey) -> Option<&str> {
        self.locations
            .get(key.index() as usize)
            .and_then(|location| location.name.as_deref())
    }
}

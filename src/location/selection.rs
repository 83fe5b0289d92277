use super::Location;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{location} is not in the selected source")]
pub struct ForeignLocation {
    pub location: Location,
}

/// An ordered set of locations within one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSelection {
    locations: BTreeSet<Location>,
}

impl SourceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect locations that all point into one source.
    pub fn from_locations(
        locations: impl IntoIterator<Item = Location>,
    ) -> Result<Self, ForeignLocation> {
        let mut selection = Self::new();
        for location in locations {
            selection.insert(location)?;
        }
        Ok(selection)
    }

    /// Add a location. `Ok(false)` when it was already selected.
    pub fn insert(&mut self, location: Location) -> Result<bool, ForeignLocation> {
        if self
            .first()
            .is_some_and(|first| first.source != location.source)
        {
            return Err(ForeignLocation { location });
        }
        Ok(self.locations.insert(location))
    }

    pub fn first(&self) -> Option<&Location> {
        self.locations.first()
    }

    pub fn last(&self) -> Option<&Location> {
        self.locations.last()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// Collapse to `first().start .. last().end`.
    pub fn span(&self) -> Option<Location> {
        let first = self.first()?;
        let last = self.last()?;
        Some(first.through(last))
    }
}

impl IntoIterator for SourceSelection {
    type Item = Location;
    type IntoIter = std::collections::btree_set::IntoIter<Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.into_iter()
    }
}

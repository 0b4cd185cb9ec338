use serde::Serialize;

use crate::models::{ApplicationEntry, EntryId};

/// One icon in the launcher grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationTile {
    pub id: EntryId,
    pub name: String,
    pub icon: String,
}

/// What activating a tile asks the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub id: EntryId,
}

impl ApplicationTile {
    pub fn activate(&self) -> LaunchRequest {
        LaunchRequest { id: self.id.clone() }
    }
}

impl From<&ApplicationEntry> for ApplicationTile {
    fn from(entry: &ApplicationEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            icon: entry.icon.clone(),
        }
    }
}

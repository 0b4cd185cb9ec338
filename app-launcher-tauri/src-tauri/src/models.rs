use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ── Application entries ──────────────────────────────────────────

/// Identifies an entry in requests to the control server.
///
/// Servers that hand out ids are addressed by them. Servers that send bare
/// entries are addressed by list position, which shifts when an earlier entry
/// is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryId {
    Assigned(String),
    Position(usize),
}

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        EntryId::Assigned(id.into())
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, EntryId::Position(_))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Assigned(id) => f.write_str(id),
            EntryId::Position(index) => write!(f, "{}", index),
        }
    }
}

// Assigned ids travel as plain strings, positions as `{"position": n}` so the
// webview can hand either back unchanged.
impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntryId::Assigned(id) => serializer.serialize_str(id),
            EntryId::Position(index) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("position", index)?;
                map.end()
            }
        }
    }
}

// Servers hand out either numeric or string ids.
impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
            Position { position: usize },
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntryId::Assigned(s),
            RawId::Number(n) => EntryId::Assigned(n.to_string()),
            RawId::Position { position } => EntryId::Position(position),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationEntry {
    pub id: EntryId,
    pub name: String,
    pub path: String,
    pub parameter: String,
    pub icon: String,
}

impl ApplicationEntry {
    pub fn set_field(&mut self, field: EntryField, value: String) {
        match field {
            EntryField::Name => self.name = value,
            EntryField::Path => self.path = value,
            EntryField::Parameter => self.parameter = value,
            EntryField::Icon => self.icon = value,
        }
    }
}

/// An entry as the server sends it; `id` is absent on position-addressed servers.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationRecord {
    #[serde(default)]
    pub id: Option<EntryId>,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub icon: String,
}

impl ApplicationRecord {
    /// `position` is the record's index in the list it arrived in.
    pub fn into_entry(self, position: usize) -> ApplicationEntry {
        ApplicationEntry {
            id: self.id.unwrap_or(EntryId::Position(position)),
            name: self.name,
            path: self.path,
            parameter: self.parameter,
            icon: self.icon,
        }
    }
}

/// An entry that has not been stored yet; also the add-form buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub name: String,
    pub path: String,
    pub parameter: String,
    pub icon: String,
}

impl NewApplication {
    pub fn set_field(&mut self, field: EntryField, value: String) {
        match field {
            EntryField::Name => self.name = value,
            EntryField::Path => self.path = value,
            EntryField::Parameter => self.parameter = value,
            EntryField::Icon => self.icon = value,
        }
    }

    pub fn into_entry(self, id: EntryId) -> ApplicationEntry {
        ApplicationEntry {
            id,
            name: self.name,
            path: self.path,
            parameter: self.parameter,
            icon: self.icon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryField {
    Name,
    Path,
    Parameter,
    Icon,
}

// ── Host metrics ─────────────────────────────────────────────────

/// Point-in-time host snapshot reported by the control server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub cpus: Vec<serde_json::Value>,
    #[serde(default)]
    pub free_memory: u64,
    #[serde(default)]
    pub total_memory: u64,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub network_interfaces: serde_json::Value,
    #[serde(default)]
    pub current_date_time: String,
}

impl SystemMetrics {
    pub fn cpu_count(&self) -> usize {
        self.cpus.len()
    }

    /// Server timestamp, when it is RFC 3339.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.current_date_time)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

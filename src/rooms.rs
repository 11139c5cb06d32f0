//! Read-only room directory supplied by the room service.

#[cfg(test)]
#[path = "rooms_test.rs"]
mod rooms_test;

use serde::{Deserialize, Serialize};

/// A room as returned by the room directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "id_as_string")]
    pub room_id: Option<String>,
    pub room_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Room {
    /// Key identifying the room in the directory: its id, or its name when it has none.
    #[must_use]
    pub fn key(&self) -> &str {
        self.room_id.as_deref().unwrap_or(&self.room_name)
    }
}

/// The room service sends ids as numbers or strings.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Rooms sorted by name, looked up by id first and name second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomDirectory {
    rooms: Vec<Room>,
}

impl RoomDirectory {
    /// Build a directory. Later duplicates of an already-seen key are dropped.
    #[must_use]
    pub fn new(rooms: Vec<Room>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut rooms = rooms
            .into_iter()
            .filter(|r| seen.insert(r.key().to_owned()))
            .collect::<Vec<_>>();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        Self { rooms }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Room whose id or name equals `key`. Id matches win over name matches.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|r| r.room_id.as_deref() == Some(key))
            .or_else(|| self.rooms.iter().find(|r| r.room_name == key))
    }
}

use serde::{Deserialize, Serialize};

const AVATAR_HOST: &str = "https://robohash.org";

/// A single employee record.
///
/// Field names on the wire follow the fixture file: the avatar travels as
/// `emp_avatar`. The `id` is empty until the backend assigns one.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    pub unit: String,
    #[serde(rename = "emp_avatar", default)]
    pub avatar_url: String,
}

impl Employee {
    /// Build an unsaved employee with its avatar derived from the name.
    pub fn draft(full_name: impl Into<String>, unit: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            id: String::new(),
            avatar_url: avatar_url(&full_name),
            full_name,
            unit: unit.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Robohash avatar for a name: lower-cased, all whitespace stripped.
pub fn avatar_url(full_name: &str) -> String {
    let handle: String = full_name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{AVATAR_HOST}/{handle}.jpg?size=36x36&set=set1")
}

//! Common types used throughout the registration service

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Well-known storage key holding the serialized waitlist
pub const WAITLIST_KEY: &str = "waitlist";

/// A waitlist registration submitted by a prospective user
///
/// Only `name` is required. Any extra members in the submitted JSON are
/// carried along untouched so the record echoes back exactly as received.
///
/// `email` is `None` when the member was absent and `Some(None)` when it was
/// an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Create a registration with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            extra: Map::new(),
        }
    }

    /// Attach a contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(Some(email.into()));
        self
    }

    /// Contact email, if one was given
    pub fn email(&self) -> Option<&str> {
        self.email.as_ref().and_then(|e| e.as_deref())
    }
}

// Only called when the member is present, so `null` maps to `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// The ordered list of pending registrants, oldest first
pub type Waitlist = Vec<User>;

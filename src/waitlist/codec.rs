//! JSON encoding of the stored waitlist
//!
//! The whole waitlist is stored as one JSON array of user objects.

use crate::error::RegistrationError;
use crate::types::{User, Waitlist};

/// Encode the full waitlist as a JSON array
pub fn encode_waitlist(users: &[User]) -> Result<String, RegistrationError> {
    serde_json::to_string(users).map_err(|e| RegistrationError::Serialization {
        message: e.to_string(),
    })
}

/// Decode a stored waitlist value, preserving order
pub fn decode_waitlist(raw: &str) -> Result<Waitlist, serde_json::Error> {
    serde_json::from_str(raw)
}

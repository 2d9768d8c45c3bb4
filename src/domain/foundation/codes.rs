//! Human-shareable codes for joining rooms and clans.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Uppercase letters and digits minus the look-alikes `0 O 1 I L`.
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// A short code typed by people, e.g. `K7QX2M`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareCode(String);

impl ShareCode {
    /// Generates a random code of `len` characters (at most 16).
    pub fn generate(len: usize) -> Self {
        let bytes = Uuid::new_v4().into_bytes();
        let code = bytes
            .iter()
            .take(len.min(bytes.len()))
            .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    /// Normalizes user input (trim, uppercase) and checks length and alphabet.
    pub fn parse(input: &str, len: usize) -> Result<Self, ValidationError> {
        let code = input.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        if code.len() != len {
            return Err(ValidationError::invalid_format(
                "code",
                format!("must be {} characters", len),
            ));
        }
        if !code.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(ValidationError::invalid_format("code", "contains invalid characters"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

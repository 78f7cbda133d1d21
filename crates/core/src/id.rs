//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a part.
///
/// Stable and caller-visible: parts are addressed by this id on the wire, so
/// it is an opaque string rather than a UUID (callers may bring their own
/// codes, e.g. from a labelling scheme).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    /// Generate a new identifier of the form `SP-XXXXXX`.
    ///
    /// The suffix comes from the random tail of a UUIDv7. Prefer passing ids
    /// explicitly in tests for determinism.
    pub fn generate() -> Self {
        let hex = Uuid::now_v7().simple().to_string();
        let tail = &hex[hex.len() - 6..];
        Self(format!("SP-{}", tail.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<PartId> for String {
    fn from(value: PartId) -> Self {
        value.0
    }
}

impl FromStr for PartId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("PartId: empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

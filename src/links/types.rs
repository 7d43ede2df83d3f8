use serde::{Deserialize, Serialize};
use std::fmt;

/// Steam app id as it appears after `/app/` in a store URL.
///
/// Kept as the raw digit run rather than a number so that leading zeros and
/// very long ids survive unchanged into the catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogIdentifier(String);

impl CatalogIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CatalogIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogIdentifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

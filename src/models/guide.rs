//! Guide record matching the guides.json document shape.

use serde::{Deserialize, Serialize};

/// A how-to guide published on the guides page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guide {
    pub id: i64,
    pub title: String,
    /// URL-safe identifier, derived from the title by default but editable.
    /// Not guaranteed unique.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
}

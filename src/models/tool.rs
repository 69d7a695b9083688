//! Tool record matching the tools.json document shape.

use serde::{Deserialize, Serialize};

/// A downloadable tool listed in the catalog.
///
/// Every field except `id` defaults, so records written by older snapshots
/// or peer instances deserialize without access-time coalescing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub platform: Vec<String>,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub license: String,
    /// Display glyph shown on cards; empty means "use the fallback".
    pub icon: String,
    pub download: String,
    pub description: String,
    pub featured: bool,
}

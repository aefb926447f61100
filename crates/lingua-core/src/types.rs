//! # Module Types
//!
//! The root entity of the content tree and the tags that name its blocks.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Module Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Module      │   │   NewModule     │   │  ModuleFields   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (INTEGER)   │   │  title          │   │  every field    │       │
//! │  │  title/title_ru │   │  level          │   │  optional       │       │
//! │  │  level          │   │  ...            │   │  (PATCH body)   │       │
//! │  │  revision       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  ModuleLevel    │   │   BlockKind     │                             │
//! │  │  A1 … C2        │   │  Story, Grammar │                             │
//! │  └─────────────────┘   │  Quiz, ...      │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Module ids are storage-assigned integers and double as the routing key
//! (`/modules/{id}`). Callers never supply ids when creating anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::patch::Patch;

// =============================================================================
// Module Level
// =============================================================================

/// CEFR proficiency level of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModuleLevel {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl ModuleLevel {
    /// Returns the stored/wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModuleLevel::A1 => "A1",
            ModuleLevel::A2 => "A2",
            ModuleLevel::B1 => "B1",
            ModuleLevel::B2 => "B2",
            ModuleLevel::C1 => "C1",
            ModuleLevel::C2 => "C2",
        }
    }
}

impl std::fmt::Display for ModuleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Module
// =============================================================================

/// A module's own scalar row, as stored.
///
/// This is what a successful synchronization returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Module {
    /// Storage-assigned identifier.
    pub id: i64,

    pub title: String,
    pub title_ru: Option<String>,
    pub level: ModuleLevel,
    pub description: Option<String>,
    pub description_ru: Option<String>,

    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,

    /// Horizontal position on the course map.
    pub map_x: Option<f64>,
    /// Vertical position on the course map.
    pub map_y: Option<f64>,

    /// Incremented on every successful synchronization.
    /// Used for optimistic concurrency via `expectedRevision`.
    pub revision: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for the "new module" path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewModule {
    pub title: String,
    #[serde(default)]
    pub title_ru: Option<String>,
    #[serde(default)]
    pub level: ModuleLevel,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_ru: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub map_x: Option<f64>,
    #[serde(default)]
    pub map_y: Option<f64>,
}

impl NewModule {
    /// Creates a module input with only a title; everything else defaults.
    pub fn titled(title: impl Into<String>) -> Self {
        NewModule {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Module scalar fields as they appear at the top level of a document.
///
/// Absent fields are left unchanged by a synchronization; an explicit
/// `null` clears the column. `title` and `level` cannot be cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ModuleFields {
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<ModuleLevel>", optional = nullable)]
    pub level: Patch<ModuleLevel>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub description_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub image_url: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub video_url: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub audio_url: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<f64>", optional = nullable)]
    pub map_x: Patch<f64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<f64>", optional = nullable)]
    pub map_y: Patch<f64>,
}

impl ModuleFields {
    /// True when every scalar field is kept.
    pub fn is_empty(&self) -> bool {
        self == &ModuleFields::default()
    }
}

// =============================================================================
// Block Kind
// =============================================================================

/// Tag naming each block a document can carry.
///
/// Nine are singleton blocks (at most one per module); `Vocabulary` and
/// `Quiz` are flat lists owned directly by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Story,
    Vocabulary,
    Grammar,
    Pronunciation,
    Listening,
    Speaking,
    Reading,
    Writing,
    Cultural,
    Quiz,
    MissionChallenge,
}

impl BlockKind {
    /// All kinds, in the order the coordinator applies them.
    pub const ALL: [BlockKind; 11] = [
        BlockKind::Story,
        BlockKind::Vocabulary,
        BlockKind::Grammar,
        BlockKind::Pronunciation,
        BlockKind::Listening,
        BlockKind::Speaking,
        BlockKind::Reading,
        BlockKind::Writing,
        BlockKind::Cultural,
        BlockKind::Quiz,
        BlockKind::MissionChallenge,
    ];

    /// The document key for this block.
    pub const fn key(&self) -> &'static str {
        match self {
            BlockKind::Story => "story",
            BlockKind::Vocabulary => "vocabulary",
            BlockKind::Grammar => "grammar",
            BlockKind::Pronunciation => "pronunciation",
            BlockKind::Listening => "listening",
            BlockKind::Speaking => "speaking",
            BlockKind::Reading => "reading",
            BlockKind::Writing => "writing",
            BlockKind::Cultural => "cultural",
            BlockKind::Quiz => "quiz",
            BlockKind::MissionChallenge => "missionChallenge",
        }
    }

    /// Returns true for blocks stored as a single row per module.
    pub const fn is_singleton(&self) -> bool {
        !matches!(self, BlockKind::Vocabulary | BlockKind::Quiz)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_level_wire_format() {
        let json = serde_json::to_string(&ModuleLevel::B2).unwrap();
        assert_eq!(json, "\"B2\"");

        let level: ModuleLevel = serde_json::from_str("\"C1\"").unwrap();
        assert_eq!(level, ModuleLevel::C1);
        assert!(serde_json::from_str::<ModuleLevel>("\"D1\"").is_err());
    }

    #[test]
    fn test_module_fields_empty() {
        assert!(ModuleFields::default().is_empty());

        let fields = ModuleFields {
            map_x: Patch::Set(12.5),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_block_kind_singletons() {
        let singletons = BlockKind::ALL.iter().filter(|k| k.is_singleton()).count();
        assert_eq!(singletons, 9);
        assert_eq!(BlockKind::MissionChallenge.to_string(), "missionChallenge");
    }
}

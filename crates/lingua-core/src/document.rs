//! # Lesson Document
//!
//! Typed representation of the nested lesson document that is reconciled
//! against the relational schema.
//!
//! ## Document Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ModuleDocument (write)              ModuleView (read)                  │
//! │  ├── title, level, ... (scalars)     ├── id, revision, timestamps       │
//! │  ├── expectedRevision?               ├── title, level, ... (scalars)    │
//! │  └── ModuleContent                   └── ModuleContent                  │
//! │                                                                         │
//! │  ModuleContent                                                          │
//! │  ├── story ─────────── characters[]            (flat, module-owned)     │
//! │  ├── vocabulary[]                              (flat, module-owned)     │
//! │  ├── grammar ───────── rules[] examples[] exercises[] ── options[]      │
//! │  ├── pronunciation ─── minimalPairs[] exercises[]                       │
//! │  ├── listening ─────── questions[] ── options[]                         │
//! │  ├── speaking ──────── exercises[]                                      │
//! │  ├── reading ───────── questions[] ── options[]                         │
//! │  ├── writing ───────── exercises[]                                      │
//! │  ├── cultural                                   (scalar only)           │
//! │  ├── quiz[] ───────── options[]                 (flat, two-level)       │
//! │  └── missionChallenge ─ requirements[]                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Omitted vs. Emptied
//! Every block and every list directly under a block is an `Option`:
//! - `None` (key absent or `null`) → leave stored data untouched
//! - `Some(vec![])` → clear the stored list
//!
//! Scalars of a singleton block are a [`Patch`]: an absent key keeps the
//! stored value, an explicit `null` clears it.
//!
//! Grandchild lists (`options`) are plain `Vec`s: their parent rows are
//! always recreated, so there is nothing to leave untouched.
//!
//! ## Identifiers
//! Every type carries `id: Option<i64>`. It is filled in on reads and is
//! never deserialized, so a caller can never choose a storage id.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::patch::Patch;
use crate::types::{BlockKind, Module, ModuleFields};

// =============================================================================
// Shared List Items
// =============================================================================

/// Kind of a grammar exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    #[default]
    MultipleChoice,
    FillBlank,
    Translate,
    Reorder,
}

impl ExerciseType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::MultipleChoice => "multiple_choice",
            ExerciseType::FillBlank => "fill_blank",
            ExerciseType::Translate => "translate",
            ExerciseType::Reorder => "reorder",
        }
    }
}

/// One answer option. Used for grammar exercises, listening and reading
/// questions, and quiz questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AnswerOption {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub text: String,
    pub text_ru: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

/// A question with options, shared by the listening and reading blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ComprehensionQuestion {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub question: String,
    pub question_ru: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub options: Vec<AnswerOption>,
}

// =============================================================================
// Story
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct StoryBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub content: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub content_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub image_url: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub audio_url: Patch<String>,
    /// Stored as a flat list owned by the module, carried here on the wire.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub characters: Option<Vec<StoryCharacter>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoryCharacter {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub name: String,
    pub name_ru: Option<String>,
    pub description: Option<String>,
    pub description_ru: Option<String>,
    pub image_url: Option<String>,
}

// =============================================================================
// Vocabulary
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VocabularyItem {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub word: String,
    pub transcription: Option<String>,
    pub translation: Option<String>,
    pub translation_ru: Option<String>,
    pub example: Option<String>,
    pub example_translation: Option<String>,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
}

// =============================================================================
// Grammar
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct GrammarBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub explanation: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub explanation_ru: Patch<String>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub rules: Option<Vec<GrammarRule>>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub examples: Option<Vec<GrammarExample>>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub exercises: Option<Vec<GrammarExercise>>,
}

/// A grammar rule. Accepts either a bare string or `{ text, textRu }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GrammarRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub text: String,
    pub text_ru: Option<String>,
}

impl GrammarRule {
    pub fn new(text: impl Into<String>) -> Self {
        GrammarRule {
            id: None,
            text: text.into(),
            text_ru: None,
        }
    }
}

impl<'de> Deserialize<'de> for GrammarRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Full {
                text: String,
                #[serde(default, rename = "textRu")]
                text_ru: Option<String>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => GrammarRule::new(text),
            Repr::Full { text, text_ru } => GrammarRule {
                id: None,
                text,
                text_ru,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GrammarExample {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub sentence: String,
    pub translation: Option<String>,
    pub translation_ru: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GrammarExercise {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(default)]
    pub exercise_type: ExerciseType,
    pub question: String,
    pub question_ru: Option<String>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub options: Vec<AnswerOption>,
}

// =============================================================================
// Pronunciation
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct PronunciationBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub description_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub audio_url: Patch<String>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub minimal_pairs: Option<Vec<MinimalPair>>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub exercises: Option<Vec<PronunciationExercise>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MinimalPair {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub first_word: String,
    pub second_word: String,
    pub first_audio_url: Option<String>,
    pub second_audio_url: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PronunciationExercise {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub prompt: String,
    pub prompt_ru: Option<String>,
    pub audio_url: Option<String>,
    pub expected_transcription: Option<String>,
}

// =============================================================================
// Listening / Reading
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ListeningBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub transcript: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub transcript_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub audio_url: Patch<String>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub questions: Option<Vec<ComprehensionQuestion>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ReadingBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub text: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub text_ru: Patch<String>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub questions: Option<Vec<ComprehensionQuestion>>,
}

// =============================================================================
// Speaking / Writing
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SpeakingBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub instructions: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub instructions_ru: Patch<String>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub exercises: Option<Vec<SpeakingExercise>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SpeakingExercise {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub prompt: String,
    pub prompt_ru: Option<String>,
    pub sample_answer: Option<String>,
    pub time_limit_secs: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct WritingBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub instructions: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub instructions_ru: Patch<String>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub exercises: Option<Vec<WritingExercise>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WritingExercise {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub prompt: String,
    pub prompt_ru: Option<String>,
    pub min_words: Option<i64>,
    pub sample_answer: Option<String>,
}

// =============================================================================
// Cultural
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CulturalBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub content: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub content_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub image_url: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub video_url: Patch<String>,
}

// =============================================================================
// Quiz
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuizQuestion {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub question: String,
    pub question_ru: Option<String>,
    pub explanation: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub options: Vec<AnswerOption>,
}

// =============================================================================
// Mission Challenge
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct MissionChallengeBlock {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub title_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<String>", optional = nullable)]
    pub description_ru: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    #[ts(as = "Option<i64>", optional = nullable)]
    pub reward_xp: Patch<i64>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub requirements: Option<Vec<MissionRequirement>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MissionRequirement {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    pub description: String,
    pub description_ru: Option<String>,
}

// =============================================================================
// Emptiness
// =============================================================================
// A block whose every key is absent (`{}`) carries no data and must not
// create or touch a row. An explicit `null` scalar is data: it clears.

impl StoryBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.content.is_keep()
            && self.content_ru.is_keep()
            && self.image_url.is_keep()
            && self.audio_url.is_keep()
            && self.characters.is_none()
    }
}

impl GrammarBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.explanation.is_keep()
            && self.explanation_ru.is_keep()
            && self.rules.is_none()
            && self.examples.is_none()
            && self.exercises.is_none()
    }
}

impl PronunciationBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.description.is_keep()
            && self.description_ru.is_keep()
            && self.audio_url.is_keep()
            && self.minimal_pairs.is_none()
            && self.exercises.is_none()
    }
}

impl ListeningBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.transcript.is_keep()
            && self.transcript_ru.is_keep()
            && self.audio_url.is_keep()
            && self.questions.is_none()
    }
}

impl ReadingBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.text.is_keep()
            && self.text_ru.is_keep()
            && self.questions.is_none()
    }
}

impl SpeakingBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.instructions.is_keep()
            && self.instructions_ru.is_keep()
            && self.exercises.is_none()
    }
}

impl WritingBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.instructions.is_keep()
            && self.instructions_ru.is_keep()
            && self.exercises.is_none()
    }
}

impl CulturalBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.content.is_keep()
            && self.content_ru.is_keep()
            && self.image_url.is_keep()
            && self.video_url.is_keep()
    }
}

impl MissionChallengeBlock {
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.title_ru.is_keep()
            && self.description.is_keep()
            && self.description_ru.is_keep()
            && self.reward_xp.is_keep()
            && self.requirements.is_none()
    }
}

// =============================================================================
// Module Content / Document / View
// =============================================================================

/// All content blocks of a module, keyed by block name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ModuleContent {
    pub story: Option<StoryBlock>,
    pub vocabulary: Option<Vec<VocabularyItem>>,
    pub grammar: Option<GrammarBlock>,
    pub pronunciation: Option<PronunciationBlock>,
    pub listening: Option<ListeningBlock>,
    pub speaking: Option<SpeakingBlock>,
    pub reading: Option<ReadingBlock>,
    pub writing: Option<WritingBlock>,
    pub cultural: Option<CulturalBlock>,
    pub quiz: Option<Vec<QuizQuestion>>,
    pub mission_challenge: Option<MissionChallengeBlock>,
}

/// A synchronization request body: module scalars at the top level next to
/// the block keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ModuleDocument {
    #[serde(flatten)]
    pub module: ModuleFields,

    /// When present, the synchronization only proceeds if the stored
    /// module revision equals this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub expected_revision: Option<i64>,

    #[serde(flatten)]
    pub content: ModuleContent,
}

/// A fully assembled module as returned by reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ModuleView {
    #[serde(flatten)]
    pub module: Module,

    #[serde(flatten)]
    pub content: ModuleContent,
}

// =============================================================================
// Content Block (validated sum type)
// =============================================================================

/// One block of a validated document, tagged by kind.
///
/// The synchronization engine dispatches on this enum instead of probing
/// for key presence; empty blocks never become a `ContentBlock`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Story(StoryBlock),
    Vocabulary(Vec<VocabularyItem>),
    Grammar(GrammarBlock),
    Pronunciation(PronunciationBlock),
    Listening(ListeningBlock),
    Speaking(SpeakingBlock),
    Reading(ReadingBlock),
    Writing(WritingBlock),
    Cultural(CulturalBlock),
    Quiz(Vec<QuizQuestion>),
    MissionChallenge(MissionChallengeBlock),
}

impl ContentBlock {
    /// Returns the tag of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Story(_) => BlockKind::Story,
            ContentBlock::Vocabulary(_) => BlockKind::Vocabulary,
            ContentBlock::Grammar(_) => BlockKind::Grammar,
            ContentBlock::Pronunciation(_) => BlockKind::Pronunciation,
            ContentBlock::Listening(_) => BlockKind::Listening,
            ContentBlock::Speaking(_) => BlockKind::Speaking,
            ContentBlock::Reading(_) => BlockKind::Reading,
            ContentBlock::Writing(_) => BlockKind::Writing,
            ContentBlock::Cultural(_) => BlockKind::Cultural,
            ContentBlock::Quiz(_) => BlockKind::Quiz,
            ContentBlock::MissionChallenge(_) => BlockKind::MissionChallenge,
        }
    }
}

impl ModuleContent {
    /// Splits the content into tagged blocks, in `BlockKind::ALL` order,
    /// dropping absent and empty singleton blocks.
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();

        if let Some(story) = self.story.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Story(story));
        }
        if let Some(vocabulary) = self.vocabulary {
            blocks.push(ContentBlock::Vocabulary(vocabulary));
        }
        if let Some(grammar) = self.grammar.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Grammar(grammar));
        }
        if let Some(pronunciation) = self.pronunciation.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Pronunciation(pronunciation));
        }
        if let Some(listening) = self.listening.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Listening(listening));
        }
        if let Some(speaking) = self.speaking.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Speaking(speaking));
        }
        if let Some(reading) = self.reading.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Reading(reading));
        }
        if let Some(writing) = self.writing.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Writing(writing));
        }
        if let Some(cultural) = self.cultural.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::Cultural(cultural));
        }
        if let Some(quiz) = self.quiz {
            blocks.push(ContentBlock::Quiz(quiz));
        }
        if let Some(mission) = self.mission_challenge.filter(|b| !b.is_empty()) {
            blocks.push(ContentBlock::MissionChallenge(mission));
        }

        blocks
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rules_accept_strings_and_objects() {
        let grammar: GrammarBlock = serde_json::from_value(json!({
            "title": "Cases",
            "rules": ["rule A", { "text": "rule B", "textRu": "правило Б" }]
        }))
        .unwrap();

        let rules = grammar.rules.unwrap();
        assert_eq!(rules[0], GrammarRule::new("rule A"));
        assert_eq!(rules[1].text, "rule B");
        assert_eq!(rules[1].text_ru.as_deref(), Some("правило Б"));
    }

    #[test]
    fn test_ids_are_never_deserialized() {
        let item: VocabularyItem =
            serde_json::from_value(json!({ "id": 42, "word": "кот" })).unwrap();
        assert_eq!(item.id, None);

        let block: GrammarBlock = serde_json::from_value(json!({ "id": 7 })).unwrap();
        assert_eq!(block.id, None);
        assert!(block.is_empty());
    }

    #[test]
    fn test_omitted_and_emptied_lists_differ() {
        let omitted: GrammarBlock = serde_json::from_value(json!({ "title": "T" })).unwrap();
        assert!(omitted.rules.is_none());

        let emptied: GrammarBlock =
            serde_json::from_value(json!({ "title": "T", "rules": [] })).unwrap();
        assert_eq!(emptied.rules, Some(vec![]));

        let nulled: GrammarBlock =
            serde_json::from_value(json!({ "title": "T", "rules": null })).unwrap();
        assert!(nulled.rules.is_none());
    }

    #[test]
    fn test_null_scalar_clears_instead_of_keeping() {
        let cultural: CulturalBlock =
            serde_json::from_value(json!({ "videoUrl": null })).unwrap();
        assert_eq!(cultural.video_url, Patch::Clear);
        assert_eq!(cultural.title, Patch::Keep);
        assert!(!cultural.is_empty());

        let json = serde_json::to_value(&cultural).unwrap();
        assert_eq!(json, json!({ "videoUrl": null }));
    }

    #[test]
    fn test_document_flattens_module_fields() {
        let doc: ModuleDocument = serde_json::from_value(json!({
            "title": "Unit 1",
            "level": "A2",
            "mapX": 10,
            "expectedRevision": 3,
            "grammar": { "title": "Cases" },
            "quiz": []
        }))
        .unwrap();

        assert_eq!(doc.module.title.as_deref(), Some("Unit 1"));
        assert_eq!(doc.module.map_x, Patch::Set(10.0));
        assert_eq!(doc.module.description, Patch::Keep);
        assert_eq!(doc.expected_revision, Some(3));
        assert!(doc.content.grammar.is_some());
        assert_eq!(doc.content.quiz, Some(vec![]));
        assert!(doc.content.story.is_none());
    }

    #[test]
    fn test_into_blocks_drops_empty_singletons() {
        let content: ModuleContent = serde_json::from_value(json!({
            "story": {},
            "grammar": { "title": null },
            "cultural": { "title": "Maslenitsa" },
            "vocabulary": [],
            "missionChallenge": { "requirements": [] }
        }))
        .unwrap();

        // An explicit null title is a change; `{}` is not
        let kinds: Vec<BlockKind> = content.into_blocks().iter().map(|b| b.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Vocabulary,
                BlockKind::Grammar,
                BlockKind::Cultural,
                BlockKind::MissionChallenge
            ]
        );
    }

    #[test]
    fn test_missing_required_list_field_is_rejected() {
        let result: Result<ModuleContent, _> =
            serde_json::from_value(json!({ "vocabulary": [{ "translation": "cat" }] }));
        assert!(result.is_err());
    }
}

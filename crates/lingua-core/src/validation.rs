//! # Validation Module
//!
//! Turns caller input into a [`ValidatedDocument`] exactly once, before any
//! transaction opens.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── JSON well-formedness, field types                                 │
//! │  └── Required list-item fields (word, question, text, ...)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Blank strings, length limits, numeric ranges                      │
//! │  ├── List size limits                                                  │
//! │  └── Empty blocks dropped, the rest tagged as ContentBlock             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE(module_id) on every singleton block table                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lingua_core::validation::{parse_module_id, validate_document};
//!
//! let module_id = parse_module_id("42").unwrap();
//! let doc = validate_document(r#"{ "grammar": { "title": "Cases", "rules": ["rule A"] } }"#).unwrap();
//! assert_eq!(module_id, 42);
//! assert_eq!(doc.blocks().len(), 1);
//! ```

use serde_json::Value;

use crate::document::{
    AnswerOption, ComprehensionQuestion, ContentBlock, GrammarBlock, ListeningBlock,
    MissionChallengeBlock, ModuleDocument, PronunciationBlock, QuizQuestion, ReadingBlock,
    SpeakingBlock, StoryBlock, VocabularyItem, WritingBlock,
};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::patch::Patch;
use crate::types::{ModuleFields, NewModule};
use crate::{MAX_LIST_ITEMS, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Validated Document
// =============================================================================

/// A lesson document that passed validation.
///
/// The only way to obtain one is through [`validate_document`],
/// [`validate_value`] or [`ValidatedDocument::try_from_document`], so the
/// storage layer can trust its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    module: ModuleFields,
    expected_revision: Option<i64>,
    blocks: Vec<ContentBlock>,
}

impl ValidatedDocument {
    /// Validates an already-deserialized document.
    pub fn try_from_document(doc: ModuleDocument) -> ValidationResult<Self> {
        validate_module_fields(&doc.module)?;

        if let Some(revision) = doc.expected_revision {
            if revision < 0 {
                return Err(ValidationError::OutOfRange {
                    field: "expectedRevision".to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }

        let blocks = doc.content.into_blocks();
        for block in &blocks {
            validate_block(block)?;
        }

        Ok(ValidatedDocument {
            module: doc.module,
            expected_revision: doc.expected_revision,
            blocks,
        })
    }

    /// Module scalar fields to apply (absent fields are left unchanged).
    pub fn module(&self) -> &ModuleFields {
        &self.module
    }

    /// Revision the caller expects the module to be at, if any.
    pub fn expected_revision(&self) -> Option<i64> {
        self.expected_revision
    }

    /// Non-empty blocks, in application order.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Parses and validates a JSON document.
pub fn validate_document(json: &str) -> CoreResult<ValidatedDocument> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| CoreError::MalformedDocument(e.to_string()))?;
    validate_value(value)
}

/// Validates a JSON value that must be an object.
pub fn validate_value(value: Value) -> CoreResult<ValidatedDocument> {
    if !value.is_object() {
        return Err(CoreError::MalformedDocument(
            "document must be a JSON object".to_string(),
        ));
    }

    let doc: ModuleDocument =
        serde_json::from_value(value).map_err(|e| CoreError::MalformedDocument(e.to_string()))?;

    Ok(ValidatedDocument::try_from_document(doc)?)
}

/// Parses a module id routing key.
///
/// ## Rules
/// - Must be a base-10 integer
/// - Must be positive
///
/// ## Example
/// ```rust
/// use lingua_core::validation::parse_module_id;
///
/// assert_eq!(parse_module_id(" 17 ").unwrap(), 17);
/// assert!(parse_module_id("abc").is_err());
/// assert!(parse_module_id("0").is_err());
/// ```
pub fn parse_module_id(raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "moduleId".to_string(),
        });
    }

    let id: i64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "moduleId".to_string(),
        reason: "must be an integer".to_string(),
    })?;

    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "moduleId".to_string(),
        });
    }

    Ok(id)
}

/// Validates input for the "new module" path.
pub fn validate_new_module(module: &NewModule) -> ValidationResult<()> {
    validate_title("title", Some(module.title.as_str()), true)?;
    validate_optional_text("titleRu", module.title_ru.as_deref(), MAX_TITLE_LENGTH)?;
    validate_optional_text("description", module.description.as_deref(), MAX_TEXT_LENGTH)?;
    validate_optional_text(
        "descriptionRu",
        module.description_ru.as_deref(),
        MAX_TEXT_LENGTH,
    )?;
    validate_coordinate("mapX", module.map_x)?;
    validate_coordinate("mapY", module.map_y)?;
    Ok(())
}

// =============================================================================
// Module Fields
// =============================================================================

fn validate_module_fields(fields: &ModuleFields) -> ValidationResult<()> {
    // Both columns are NOT NULL: they can be changed, never cleared
    for (field, cleared) in [
        ("title", fields.title == Patch::Clear),
        ("level", fields.level == Patch::Clear),
    ] {
        if cleared {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
    }

    validate_title("title", fields.title.as_deref(), false)?;
    validate_optional_text("titleRu", fields.title_ru.as_deref(), MAX_TITLE_LENGTH)?;
    validate_optional_text("description", fields.description.as_deref(), MAX_TEXT_LENGTH)?;
    validate_optional_text(
        "descriptionRu",
        fields.description_ru.as_deref(),
        MAX_TEXT_LENGTH,
    )?;
    validate_coordinate("mapX", fields.map_x.value().copied())?;
    validate_coordinate("mapY", fields.map_y.value().copied())?;
    Ok(())
}

// =============================================================================
// Blocks
// =============================================================================

fn validate_block(block: &ContentBlock) -> ValidationResult<()> {
    match block {
        ContentBlock::Story(story) => validate_story(story),
        ContentBlock::Vocabulary(items) => validate_vocabulary(items),
        ContentBlock::Grammar(grammar) => validate_grammar(grammar),
        ContentBlock::Pronunciation(block) => validate_pronunciation(block),
        ContentBlock::Listening(block) => validate_listening(block),
        ContentBlock::Speaking(block) => validate_speaking(block),
        ContentBlock::Reading(block) => validate_reading(block),
        ContentBlock::Writing(block) => validate_writing(block),
        ContentBlock::Cultural(block) => {
            validate_optional_text("cultural.title", block.title.as_deref(), MAX_TITLE_LENGTH)
        }
        ContentBlock::Quiz(questions) => validate_quiz(questions),
        ContentBlock::MissionChallenge(block) => validate_mission(block),
    }
}

fn validate_story(story: &StoryBlock) -> ValidationResult<()> {
    validate_optional_text("story.title", story.title.as_deref(), MAX_TITLE_LENGTH)?;

    if let Some(characters) = &story.characters {
        validate_list_size("story.characters", characters.len())?;
        for (i, character) in characters.iter().enumerate() {
            validate_required(&format!("story.characters[{i}].name"), &character.name)?;
        }
    }
    Ok(())
}

fn validate_vocabulary(items: &[VocabularyItem]) -> ValidationResult<()> {
    validate_list_size("vocabulary", items.len())?;
    for (i, item) in items.iter().enumerate() {
        validate_required(&format!("vocabulary[{i}].word"), &item.word)?;
    }
    Ok(())
}

fn validate_grammar(grammar: &GrammarBlock) -> ValidationResult<()> {
    validate_optional_text("grammar.title", grammar.title.as_deref(), MAX_TITLE_LENGTH)?;

    if let Some(rules) = &grammar.rules {
        validate_list_size("grammar.rules", rules.len())?;
        for (i, rule) in rules.iter().enumerate() {
            validate_required(&format!("grammar.rules[{i}].text"), &rule.text)?;
        }
    }

    if let Some(examples) = &grammar.examples {
        validate_list_size("grammar.examples", examples.len())?;
        for (i, example) in examples.iter().enumerate() {
            validate_required(&format!("grammar.examples[{i}].sentence"), &example.sentence)?;
        }
    }

    if let Some(exercises) = &grammar.exercises {
        validate_list_size("grammar.exercises", exercises.len())?;
        for (i, exercise) in exercises.iter().enumerate() {
            let path = format!("grammar.exercises[{i}]");
            validate_required(&format!("{path}.question"), &exercise.question)?;
            validate_options(&path, &exercise.options)?;
        }
    }
    Ok(())
}

fn validate_pronunciation(block: &PronunciationBlock) -> ValidationResult<()> {
    validate_optional_text("pronunciation.title", block.title.as_deref(), MAX_TITLE_LENGTH)?;

    if let Some(pairs) = &block.minimal_pairs {
        validate_list_size("pronunciation.minimalPairs", pairs.len())?;
        for (i, pair) in pairs.iter().enumerate() {
            let path = format!("pronunciation.minimalPairs[{i}]");
            validate_required(&format!("{path}.firstWord"), &pair.first_word)?;
            validate_required(&format!("{path}.secondWord"), &pair.second_word)?;
        }
    }

    if let Some(exercises) = &block.exercises {
        validate_list_size("pronunciation.exercises", exercises.len())?;
        for (i, exercise) in exercises.iter().enumerate() {
            validate_required(
                &format!("pronunciation.exercises[{i}].prompt"),
                &exercise.prompt,
            )?;
        }
    }
    Ok(())
}

fn validate_listening(block: &ListeningBlock) -> ValidationResult<()> {
    validate_optional_text("listening.title", block.title.as_deref(), MAX_TITLE_LENGTH)?;
    if let Some(questions) = &block.questions {
        validate_questions("listening.questions", questions)?;
    }
    Ok(())
}

fn validate_reading(block: &ReadingBlock) -> ValidationResult<()> {
    validate_optional_text("reading.title", block.title.as_deref(), MAX_TITLE_LENGTH)?;
    if let Some(questions) = &block.questions {
        validate_questions("reading.questions", questions)?;
    }
    Ok(())
}

fn validate_speaking(block: &SpeakingBlock) -> ValidationResult<()> {
    validate_optional_text("speaking.title", block.title.as_deref(), MAX_TITLE_LENGTH)?;

    if let Some(exercises) = &block.exercises {
        validate_list_size("speaking.exercises", exercises.len())?;
        for (i, exercise) in exercises.iter().enumerate() {
            let path = format!("speaking.exercises[{i}]");
            validate_required(&format!("{path}.prompt"), &exercise.prompt)?;
            if let Some(limit) = exercise.time_limit_secs {
                if limit <= 0 {
                    return Err(ValidationError::MustBePositive {
                        field: format!("{path}.timeLimitSecs"),
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_writing(block: &WritingBlock) -> ValidationResult<()> {
    validate_optional_text("writing.title", block.title.as_deref(), MAX_TITLE_LENGTH)?;

    if let Some(exercises) = &block.exercises {
        validate_list_size("writing.exercises", exercises.len())?;
        for (i, exercise) in exercises.iter().enumerate() {
            let path = format!("writing.exercises[{i}]");
            validate_required(&format!("{path}.prompt"), &exercise.prompt)?;
            if let Some(min_words) = exercise.min_words {
                validate_non_negative(&format!("{path}.minWords"), min_words)?;
            }
        }
    }
    Ok(())
}

fn validate_quiz(questions: &[QuizQuestion]) -> ValidationResult<()> {
    validate_list_size("quiz", questions.len())?;
    for (i, question) in questions.iter().enumerate() {
        let path = format!("quiz[{i}]");
        validate_required(&format!("{path}.question"), &question.question)?;
        validate_options(&path, &question.options)?;
    }
    Ok(())
}

fn validate_mission(block: &MissionChallengeBlock) -> ValidationResult<()> {
    validate_optional_text(
        "missionChallenge.title",
        block.title.as_deref(),
        MAX_TITLE_LENGTH,
    )?;

    if let Some(&xp) = block.reward_xp.value() {
        validate_non_negative("missionChallenge.rewardXp", xp)?;
    }

    if let Some(requirements) = &block.requirements {
        validate_list_size("missionChallenge.requirements", requirements.len())?;
        for (i, requirement) in requirements.iter().enumerate() {
            validate_required(
                &format!("missionChallenge.requirements[{i}].description"),
                &requirement.description,
            )?;
        }
    }
    Ok(())
}

fn validate_questions(path: &str, questions: &[ComprehensionQuestion]) -> ValidationResult<()> {
    validate_list_size(path, questions.len())?;
    for (i, question) in questions.iter().enumerate() {
        let item = format!("{path}[{i}]");
        validate_required(&format!("{item}.question"), &question.question)?;
        validate_options(&item, &question.options)?;
    }
    Ok(())
}

fn validate_options(parent: &str, options: &[AnswerOption]) -> ValidationResult<()> {
    let path = format!("{parent}.options");
    validate_list_size(&path, options.len())?;
    for (i, option) in options.iter().enumerate() {
        validate_required(&format!("{path}[{i}].text"), &option.text)?;
    }
    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }
    Ok(())
}

fn validate_title(field: &str, value: Option<&str>, required: bool) -> ValidationResult<()> {
    match value {
        None if required => Err(ValidationError::Required {
            field: field.to_string(),
        }),
        None => Ok(()),
        Some(title) if title.trim().is_empty() => Err(ValidationError::Required {
            field: field.to_string(),
        }),
        Some(title) => validate_optional_text(field, Some(title), MAX_TITLE_LENGTH),
    }
}

fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    if let Some(text) = value {
        if text.chars().count() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(())
}

fn validate_coordinate(field: &str, value: Option<f64>) -> ValidationResult<()> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

fn validate_list_size(field: &str, len: usize) -> ValidationResult<()> {
    if len > MAX_LIST_ITEMS {
        return Err(ValidationError::TooMany {
            field: field.to_string(),
            max: MAX_LIST_ITEMS,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockKind;
    use serde_json::json;

    #[test]
    fn test_parse_module_id() {
        assert_eq!(parse_module_id("1").unwrap(), 1);
        assert_eq!(parse_module_id(" 250 ").unwrap(), 250);

        assert!(matches!(
            parse_module_id(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_module_id("12abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_module_id("-3"),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            validate_document("not json"),
            Err(CoreError::MalformedDocument(_))
        ));
        assert!(matches!(
            validate_document("[1, 2]"),
            Err(CoreError::MalformedDocument(_))
        ));
        assert!(matches!(
            validate_document(r#"{ "grammar": { "rules": "rule A" } }"#),
            Err(CoreError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_blank_required_fields_are_rejected() {
        let err = validate_value(json!({
            "quiz": [{ "question": "Q1", "options": [{ "text": "  " }] }]
        }))
        .unwrap_err();

        match err {
            CoreError::Validation(ValidationError::Required { field }) => {
                assert_eq!(field, "quiz[0].options[0].text");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_module_title_is_rejected() {
        assert!(validate_value(json!({ "title": "" })).is_err());
        assert!(validate_value(json!({ "title": "Unit 3" })).is_ok());
        assert!(validate_value(json!({})).is_ok());
    }

    #[test]
    fn test_clearing_not_null_module_fields_is_rejected() {
        for document in [json!({ "title": null }), json!({ "level": null })] {
            assert!(matches!(
                validate_value(document),
                Err(CoreError::Validation(ValidationError::Required { .. }))
            ));
        }

        let doc = validate_value(json!({ "descriptionRu": null, "mapX": null })).unwrap();
        assert_eq!(doc.module().description_ru, Patch::Clear);
        assert_eq!(doc.module().map_x, Patch::Clear);
        assert_eq!(doc.module().title, Patch::Keep);
    }

    #[test]
    fn test_negative_values_are_rejected() {
        assert!(validate_value(json!({ "missionChallenge": { "rewardXp": -5 } })).is_err());
        assert!(validate_value(json!({
            "writing": { "exercises": [{ "prompt": "Describe", "minWords": -1 }] }
        }))
        .is_err());
        assert!(validate_value(json!({ "expectedRevision": -1 })).is_err());
    }

    #[test]
    fn test_list_size_limit() {
        let items: Vec<_> = (0..=MAX_LIST_ITEMS)
            .map(|i| json!({ "word": format!("w{i}") }))
            .collect();
        let err = validate_value(json!({ "vocabulary": items })).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooMany { .. })
        ));
    }

    #[test]
    fn test_validated_document_exposes_blocks() {
        let doc = validate_value(json!({
            "title": "Unit 1",
            "expectedRevision": 2,
            "grammar": { "title": "Cases", "rules": ["rule A", "rule B"] },
            "story": {}
        }))
        .unwrap();

        assert_eq!(doc.module().title.as_deref(), Some("Unit 1"));
        assert_eq!(doc.expected_revision(), Some(2));
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.blocks()[0].kind(), BlockKind::Grammar);
    }

    #[test]
    fn test_validate_new_module() {
        assert!(validate_new_module(&NewModule::titled("Greetings")).is_ok());
        assert!(validate_new_module(&NewModule::titled("   ")).is_err());

        let mut module = NewModule::titled("Greetings");
        module.title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            validate_new_module(&module),
            Err(ValidationError::TooLong { .. })
        ));
    }
}

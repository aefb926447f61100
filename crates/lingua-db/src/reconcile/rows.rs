//! Column mappings from document types to table rows.

use lingua_core::{
    AnswerOption, ComprehensionQuestion, CulturalBlock, GrammarBlock, GrammarExample,
    GrammarExercise, GrammarRule, ListeningBlock, MinimalPair, MissionChallengeBlock,
    MissionRequirement, ModuleFields, PronunciationBlock, PronunciationExercise, QuizQuestion,
    ReadingBlock, SpeakingBlock, SpeakingExercise, StoryBlock, StoryCharacter, VocabularyItem,
    WritingBlock, WritingExercise,
};

use super::{Column, ContentRow, FieldValue, NestedRow};

/// Drops the columns a PATCH-style row keeps.
fn present<const N: usize>(columns: [(&'static str, Option<FieldValue>); N]) -> Vec<Column> {
    columns
        .into_iter()
        .filter_map(|(column, value)| value.map(|value| (column, value)))
        .collect()
}

// =============================================================================
// Module
// =============================================================================

impl ContentRow for ModuleFields {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            (
                "level",
                self.level
                    .map(|l| l.as_str().to_string())
                    .into_write()
                    .map(FieldValue::Text),
            ),
            ("description", FieldValue::patch_text(&self.description)),
            ("description_ru", FieldValue::patch_text(&self.description_ru)),
            ("image_url", FieldValue::patch_text(&self.image_url)),
            ("video_url", FieldValue::patch_text(&self.video_url)),
            ("audio_url", FieldValue::patch_text(&self.audio_url)),
            ("map_x", FieldValue::patch_real(&self.map_x)),
            ("map_y", FieldValue::patch_real(&self.map_y)),
        ])
    }
}

// =============================================================================
// Singleton Blocks
// =============================================================================

impl ContentRow for StoryBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("content", FieldValue::patch_text(&self.content)),
            ("content_ru", FieldValue::patch_text(&self.content_ru)),
            ("image_url", FieldValue::patch_text(&self.image_url)),
            ("audio_url", FieldValue::patch_text(&self.audio_url)),
        ])
    }
}

impl ContentRow for GrammarBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("explanation", FieldValue::patch_text(&self.explanation)),
            ("explanation_ru", FieldValue::patch_text(&self.explanation_ru)),
        ])
    }
}

impl ContentRow for PronunciationBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("description", FieldValue::patch_text(&self.description)),
            ("description_ru", FieldValue::patch_text(&self.description_ru)),
            ("audio_url", FieldValue::patch_text(&self.audio_url)),
        ])
    }
}

impl ContentRow for ListeningBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("transcript", FieldValue::patch_text(&self.transcript)),
            ("transcript_ru", FieldValue::patch_text(&self.transcript_ru)),
            ("audio_url", FieldValue::patch_text(&self.audio_url)),
        ])
    }
}

impl ContentRow for SpeakingBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("instructions", FieldValue::patch_text(&self.instructions)),
            ("instructions_ru", FieldValue::patch_text(&self.instructions_ru)),
        ])
    }
}

impl ContentRow for ReadingBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("text", FieldValue::patch_text(&self.text)),
            ("text_ru", FieldValue::patch_text(&self.text_ru)),
        ])
    }
}

impl ContentRow for WritingBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("instructions", FieldValue::patch_text(&self.instructions)),
            ("instructions_ru", FieldValue::patch_text(&self.instructions_ru)),
        ])
    }
}

impl ContentRow for CulturalBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("content", FieldValue::patch_text(&self.content)),
            ("content_ru", FieldValue::patch_text(&self.content_ru)),
            ("image_url", FieldValue::patch_text(&self.image_url)),
            ("video_url", FieldValue::patch_text(&self.video_url)),
        ])
    }
}

impl ContentRow for MissionChallengeBlock {
    fn columns(&self) -> Vec<Column> {
        present([
            ("title", FieldValue::patch_text(&self.title)),
            ("title_ru", FieldValue::patch_text(&self.title_ru)),
            ("description", FieldValue::patch_text(&self.description)),
            ("description_ru", FieldValue::patch_text(&self.description_ru)),
            ("reward_xp", FieldValue::patch_integer(&self.reward_xp)),
        ])
    }
}

// =============================================================================
// List Rows
// =============================================================================

impl ContentRow for StoryCharacter {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("name", FieldValue::required(&self.name)),
            ("name_ru", FieldValue::text(&self.name_ru)),
            ("description", FieldValue::text(&self.description)),
            ("description_ru", FieldValue::text(&self.description_ru)),
            ("image_url", FieldValue::text(&self.image_url)),
        ]
    }
}

impl ContentRow for VocabularyItem {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("word", FieldValue::required(&self.word)),
            ("transcription", FieldValue::text(&self.transcription)),
            ("translation", FieldValue::text(&self.translation)),
            ("translation_ru", FieldValue::text(&self.translation_ru)),
            ("example", FieldValue::text(&self.example)),
            ("example_translation", FieldValue::text(&self.example_translation)),
            ("audio_url", FieldValue::text(&self.audio_url)),
            ("image_url", FieldValue::text(&self.image_url)),
        ]
    }
}

impl ContentRow for GrammarRule {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("text", FieldValue::required(&self.text)),
            ("text_ru", FieldValue::text(&self.text_ru)),
        ]
    }
}

impl ContentRow for GrammarExample {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("sentence", FieldValue::required(&self.sentence)),
            ("translation", FieldValue::text(&self.translation)),
            ("translation_ru", FieldValue::text(&self.translation_ru)),
        ]
    }
}

impl ContentRow for MinimalPair {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("first_word", FieldValue::required(&self.first_word)),
            ("second_word", FieldValue::required(&self.second_word)),
            ("first_audio_url", FieldValue::text(&self.first_audio_url)),
            ("second_audio_url", FieldValue::text(&self.second_audio_url)),
            ("hint", FieldValue::text(&self.hint)),
        ]
    }
}

impl ContentRow for PronunciationExercise {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("prompt", FieldValue::required(&self.prompt)),
            ("prompt_ru", FieldValue::text(&self.prompt_ru)),
            ("audio_url", FieldValue::text(&self.audio_url)),
            (
                "expected_transcription",
                FieldValue::text(&self.expected_transcription),
            ),
        ]
    }
}

impl ContentRow for SpeakingExercise {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("prompt", FieldValue::required(&self.prompt)),
            ("prompt_ru", FieldValue::text(&self.prompt_ru)),
            ("sample_answer", FieldValue::text(&self.sample_answer)),
            ("time_limit_secs", FieldValue::Integer(self.time_limit_secs)),
        ]
    }
}

impl ContentRow for WritingExercise {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("prompt", FieldValue::required(&self.prompt)),
            ("prompt_ru", FieldValue::text(&self.prompt_ru)),
            ("min_words", FieldValue::Integer(self.min_words)),
            ("sample_answer", FieldValue::text(&self.sample_answer)),
        ]
    }
}

impl ContentRow for MissionRequirement {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("description", FieldValue::required(&self.description)),
            ("description_ru", FieldValue::text(&self.description_ru)),
        ]
    }
}

// =============================================================================
// Two-Level Rows
// =============================================================================

impl ContentRow for AnswerOption {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("text", FieldValue::required(&self.text)),
            ("text_ru", FieldValue::text(&self.text_ru)),
            ("is_correct", FieldValue::Flag(self.is_correct)),
        ]
    }
}

impl ContentRow for GrammarExercise {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("exercise_type", FieldValue::required(self.exercise_type.as_str())),
            ("question", FieldValue::required(&self.question)),
            ("question_ru", FieldValue::text(&self.question_ru)),
            ("correct_answer", FieldValue::text(&self.correct_answer)),
            ("explanation", FieldValue::text(&self.explanation)),
        ]
    }
}

impl NestedRow for GrammarExercise {
    type Child = AnswerOption;

    fn children(&self) -> &[AnswerOption] {
        &self.options
    }
}

impl ContentRow for ComprehensionQuestion {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("question", FieldValue::required(&self.question)),
            ("question_ru", FieldValue::text(&self.question_ru)),
        ]
    }
}

impl NestedRow for ComprehensionQuestion {
    type Child = AnswerOption;

    fn children(&self) -> &[AnswerOption] {
        &self.options
    }
}

impl ContentRow for QuizQuestion {
    fn columns(&self) -> Vec<Column> {
        vec![
            ("question", FieldValue::required(&self.question)),
            ("question_ru", FieldValue::text(&self.question_ru)),
            ("explanation", FieldValue::text(&self.explanation)),
        ]
    }
}

impl NestedRow for QuizQuestion {
    type Child = AnswerOption;

    fn children(&self) -> &[AnswerOption] {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::{ModuleLevel, Patch};

    #[test]
    fn test_module_fields_write_only_what_they_mention() {
        let fields = ModuleFields {
            level: Patch::Set(ModuleLevel::B1),
            description: Patch::Clear,
            ..Default::default()
        };

        assert_eq!(
            fields.columns(),
            vec![
                ("level", FieldValue::Text(Some("B1".to_string()))),
                ("description", FieldValue::Text(None)),
            ]
        );
        assert!(ModuleFields::default().columns().is_empty());
    }

    #[test]
    fn test_cleared_block_scalar_binds_null() {
        let cultural = CulturalBlock {
            title: Patch::Set("Maslenitsa".into()),
            video_url: Patch::Clear,
            ..Default::default()
        };

        let columns: Vec<&str> = cultural.columns().iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec!["title", "video_url"]);
    }

    #[test]
    fn test_list_rows_write_every_column() {
        let option = AnswerOption {
            text: "да".into(),
            ..Default::default()
        };
        let columns = option.columns();

        assert_eq!(columns.len(), 3);
        assert!(columns.contains(&("is_correct", FieldValue::Flag(false))));
    }
}

//! Clarity workbook field namespace and validation.
//!
//! The workbook is a fixed catalog of prompts, not a free-form document:
//! every savable field is declared here, with its section and value kind.
//! The API and repository layers validate against this catalog so an
//! unknown or malformed key can never reach storage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a text answer, in characters.
pub const MAX_TEXT_LEN: usize = 20_000;

/// Inclusive lower bound for rating answers.
pub const RATING_MIN: i32 = 1;

/// Inclusive upper bound for rating answers.
pub const RATING_MAX: i32 = 10;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Workbook sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Values,
    Strengths,
    Energy,
    Goals,
    Feedback,
    Reflection,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Values,
        Section::Strengths,
        Section::Energy,
        Section::Goals,
        Section::Feedback,
        Section::Reflection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Values => "values",
            Self::Strengths => "strengths",
            Self::Energy => "energy",
            Self::Goals => "goals",
            Self::Feedback => "feedback",
            Self::Reflection => "reflection",
        }
    }

    /// Display title for the section header.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Values => "Core Values",
            Self::Strengths => "Strengths",
            Self::Energy => "Energy Audit",
            Self::Goals => "90-Day Goals",
            Self::Feedback => "Feedback",
            Self::Reflection => "Weekly Reflection",
        }
    }

    /// The fields belonging to this section, in display order.
    pub fn fields(&self) -> &'static [FieldKey] {
        match self {
            Self::Values => &[FieldKey::CoreValues, FieldKey::ValuesReflection],
            Self::Strengths => &[FieldKey::TopStrengths, FieldKey::StrengthsStory],
            Self::Energy => &[
                FieldKey::Energizers,
                FieldKey::Drainers,
                FieldKey::EnergyRating,
            ],
            Self::Goals => &[
                FieldKey::NinetyDayGoal,
                FieldKey::SuccessMeasure,
                FieldKey::GoalConfidence,
            ],
            Self::Feedback => &[FieldKey::FeedbackReceived, FieldKey::FeedbackAction],
            Self::Reflection => &[FieldKey::WeeklyWin, FieldKey::WeeklyLesson],
        }
    }
}

// ---------------------------------------------------------------------------
// Field catalog
// ---------------------------------------------------------------------------

/// What kind of value a field stores. Everything is TEXT on the wire and in
/// storage; ratings are validated as bounded integers before they persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Rating,
}

/// Every savable workbook field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    CoreValues,
    ValuesReflection,
    TopStrengths,
    StrengthsStory,
    Energizers,
    Drainers,
    EnergyRating,
    NinetyDayGoal,
    SuccessMeasure,
    GoalConfidence,
    FeedbackReceived,
    FeedbackAction,
    WeeklyWin,
    WeeklyLesson,
}

impl FieldKey {
    pub const ALL: &'static [FieldKey] = &[
        FieldKey::CoreValues,
        FieldKey::ValuesReflection,
        FieldKey::TopStrengths,
        FieldKey::StrengthsStory,
        FieldKey::Energizers,
        FieldKey::Drainers,
        FieldKey::EnergyRating,
        FieldKey::NinetyDayGoal,
        FieldKey::SuccessMeasure,
        FieldKey::GoalConfidence,
        FieldKey::FeedbackReceived,
        FieldKey::FeedbackAction,
        FieldKey::WeeklyWin,
        FieldKey::WeeklyLesson,
    ];

    /// The wire and storage name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoreValues => "core_values",
            Self::ValuesReflection => "values_reflection",
            Self::TopStrengths => "top_strengths",
            Self::StrengthsStory => "strengths_story",
            Self::Energizers => "energizers",
            Self::Drainers => "drainers",
            Self::EnergyRating => "energy_rating",
            Self::NinetyDayGoal => "ninety_day_goal",
            Self::SuccessMeasure => "success_measure",
            Self::GoalConfidence => "goal_confidence",
            Self::FeedbackReceived => "feedback_received",
            Self::FeedbackAction => "feedback_action",
            Self::WeeklyWin => "weekly_win",
            Self::WeeklyLesson => "weekly_lesson",
        }
    }

    /// Parse a field key from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    pub fn section(&self) -> Section {
        match self {
            Self::CoreValues | Self::ValuesReflection => Section::Values,
            Self::TopStrengths | Self::StrengthsStory => Section::Strengths,
            Self::Energizers | Self::Drainers | Self::EnergyRating => Section::Energy,
            Self::NinetyDayGoal | Self::SuccessMeasure | Self::GoalConfidence => Section::Goals,
            Self::FeedbackReceived | Self::FeedbackAction => Section::Feedback,
            Self::WeeklyWin | Self::WeeklyLesson => Section::Reflection,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::EnergyRating | Self::GoalConfidence => FieldKind::Rating,
            _ => FieldKind::Text,
        }
    }

    /// Display label for the field prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CoreValues => "What are your three core values?",
            Self::ValuesReflection => "When did you last act against one of them?",
            Self::TopStrengths => "What are your top strengths?",
            Self::StrengthsStory => "Describe a moment a strength carried you",
            Self::Energizers => "Which activities give you energy?",
            Self::Drainers => "Which activities drain you?",
            Self::EnergyRating => "Rate your current energy (1-10)",
            Self::NinetyDayGoal => "What is your one 90-day goal?",
            Self::SuccessMeasure => "How will you measure success?",
            Self::GoalConfidence => "Rate your confidence in reaching it (1-10)",
            Self::FeedbackReceived => "What feedback have you received recently?",
            Self::FeedbackAction => "What will you do with it?",
            Self::WeeklyWin => "What was your win this week?",
            Self::WeeklyLesson => "What did you learn this week?",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Resolve a wire name into a field key, rejecting unknown names.
pub fn parse_field_key(s: &str) -> Result<FieldKey, CoreError> {
    FieldKey::parse(s).ok_or_else(|| {
        CoreError::Validation(format!("Unknown workbook field '{s}'"))
    })
}

/// Validate a value for a field. An empty value is always accepted; it
/// clears the field.
pub fn validate_value(key: FieldKey, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Ok(());
    }
    match key.kind() {
        FieldKind::Text => {
            let len = value.chars().count();
            if len > MAX_TEXT_LEN {
                return Err(CoreError::Validation(format!(
                    "Field '{}' exceeds {MAX_TEXT_LEN} characters (got {len})",
                    key.as_str()
                )));
            }
            Ok(())
        }
        FieldKind::Rating => {
            let rating: i32 = value.trim().parse().map_err(|_| {
                CoreError::Validation(format!(
                    "Field '{}' expects a whole number between {RATING_MIN} and {RATING_MAX}",
                    key.as_str()
                ))
            })?;
            if !(RATING_MIN..=RATING_MAX).contains(&rating) {
                return Err(CoreError::Validation(format!(
                    "Field '{}' must be between {RATING_MIN} and {RATING_MAX} (got {rating})",
                    key.as_str()
                )));
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Percentage of catalog fields that hold a non-empty answer, for the
/// manager dashboard. Duplicate keys count once.
pub fn completion_percent(answered: &[FieldKey]) -> f64 {
    let distinct: std::collections::HashSet<FieldKey> = answered.iter().copied().collect();
    distinct.len() as f64 / FieldKey::ALL.len() as f64 * 100.0
}

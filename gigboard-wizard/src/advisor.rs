//! Contextual listing advice
//!
//! Advice is an ordered rule table: for the current step, the first rule
//! whose predicate holds produces the hint. Every step ends with a
//! catch-all rule, so [`advise`] always returns a hint.
//!
//! Advice never mutates the draft. A hint may carry an action (a
//! [`FieldUpdate`]) that the caller applies through the wizard's normal
//! field-update path.

use serde::{Deserialize, Serialize};

use crate::models::{DraftRecord, FieldUpdate, WizardStep};

/// Titles shorter than this get a discoverability warning
pub const SHORT_TITLE_CHARS: usize = 10;

/// Budgets below this get a talent-supply warning
pub const LOW_BUDGET_THRESHOLD: f64 = 100.0;

const OPTIMIZED_MARKER: &str = "✨ ";
const OPTIMIZED_SUFFIX: &str = " (optimized)";

/// Hint severity, drives the styling of the advice panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintSeverity {
    Default,
    Info,
    Warning,
    Suggestion,
}

/// Advice shown next to the active step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub title: String,
    pub body: String,
    pub severity: HintSeverity,
    /// One-click mutation offered with the hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FieldUpdate>,
}

impl Hint {
    fn new(severity: HintSeverity, title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            severity,
            action: None,
        }
    }
}

struct AdviceRule {
    step: WizardStep,
    applies: fn(&DraftRecord) -> bool,
    hint: fn(&DraftRecord) -> Hint,
}

/// Priority order within a step is table order
const RULES: &[AdviceRule] = &[
    AdviceRule {
        step: WizardStep::Details,
        applies: title_too_short,
        hint: short_title_hint,
    },
    AdviceRule {
        step: WizardStep::Details,
        applies: location_missing,
        hint: location_hint,
    },
    AdviceRule {
        step: WizardStep::Details,
        applies: always,
        hint: keyword_tip,
    },
    AdviceRule {
        step: WizardStep::Requirements,
        applies: budget_low,
        hint: low_budget_hint,
    },
    AdviceRule {
        step: WizardStep::Requirements,
        applies: always,
        hint: technical_requirements_tip,
    },
    AdviceRule {
        step: WizardStep::Review,
        applies: always,
        hint: optimize_title_hint,
    },
];

/// Compute the hint for `step` given the current draft
pub fn advise(step: WizardStep, record: &DraftRecord) -> Hint {
    RULES
        .iter()
        .filter(|rule| rule.step == step)
        .find(|rule| (rule.applies)(record))
        .map(|rule| (rule.hint)(record))
        // Unreachable while every step has a catch-all rule
        .unwrap_or_else(|| keyword_tip(record))
}

/// Decorated form of `title`; already decorated titles are returned as-is
pub fn optimized_title(title: &str) -> String {
    let title = title.trim();
    if title.starts_with(OPTIMIZED_MARKER.trim_end()) && title.ends_with(OPTIMIZED_SUFFIX) {
        return title.to_string();
    }
    format!("{}{}{}", OPTIMIZED_MARKER, title, OPTIMIZED_SUFFIX)
}

fn always(_: &DraftRecord) -> bool {
    true
}

fn title_too_short(record: &DraftRecord) -> bool {
    let title = record.title.trim();
    !title.is_empty() && title.chars().count() < SHORT_TITLE_CHARS
}

fn location_missing(record: &DraftRecord) -> bool {
    !record.title.trim().is_empty() && record.location.trim().is_empty()
}

fn budget_low(record: &DraftRecord) -> bool {
    record
        .budget
        .map_or(false, |budget| budget < LOW_BUDGET_THRESHOLD)
}

fn short_title_hint(_: &DraftRecord) -> Hint {
    Hint::new(
        HintSeverity::Warning,
        "Title is too short",
        "Listings with short titles are hard to discover. Mention the genre, venue or occasion.",
    )
}

fn location_hint(_: &DraftRecord) -> Hint {
    Hint::new(
        HintSeverity::Info,
        "Add a location",
        "Artists filter by distance first. A venue or neighbourhood gets you local applicants.",
    )
}

fn keyword_tip(_: &DraftRecord) -> Hint {
    Hint::new(
        HintSeverity::Default,
        "Use searchable keywords",
        "Include the genre and event style in the title, e.g. \"Acoustic Jazz Trio for Wedding\".",
    )
}

fn low_budget_hint(_: &DraftRecord) -> Hint {
    Hint::new(
        HintSeverity::Warning,
        "Budget below market rate",
        "Budgets under 100 usually attract fewer applicants. Consider raising it or marking it negotiable.",
    )
}

fn technical_requirements_tip(_: &DraftRecord) -> Hint {
    Hint::new(
        HintSeverity::Default,
        "Spell out technical requirements",
        "Say whether a PA, backline or instruments are provided so artists can quote accurately.",
    )
}

fn optimize_title_hint(record: &DraftRecord) -> Hint {
    let optimized = optimized_title(&record.title);
    let action = (optimized != record.title.trim()).then(|| FieldUpdate::Title(optimized));
    Hint {
        action,
        ..Hint::new(
            HintSeverity::Suggestion,
            "Boost your listing",
            "Highlight the title so it stands out in the feed.",
        )
    }
}

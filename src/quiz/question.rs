//! Question records and the answer-label convention
//!
//! Options carry their label as a text prefix (`"B) Elastic demand"`) and the
//! record stores only the label (`"B"`). Correctness is a prefix comparison
//! against the option text, never an index lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading label followed by `)`, `.` or `:`
static LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z0-9]{1,3})\s*[).:]\s*(.*)$").expect("valid label regex")
});

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Short category label
    pub topic: String,

    /// The question text
    #[serde(rename = "question")]
    pub prompt: String,

    /// Answer choices, each starting with its label
    pub options: Vec<String>,

    /// Label of the correct option
    #[serde(rename = "answer")]
    pub correct_label: String,

    /// Rationale shown after answering
    #[serde(default)]
    pub explanation: String,
}

/// Why a record was excluded from the usable bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The record could not be decoded into a question
    Undecodable(String),
    /// `options` is empty
    NoOptions,
    /// `answer` is empty
    EmptyLabel,
    /// No option starts with the answer label
    NoMatchingOption,
    /// More than one option starts with the answer label
    AmbiguousLabel {
        /// How many options matched
        matches: usize,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Undecodable(msg) => write!(f, "not a valid question record: {}", msg),
            RejectReason::NoOptions => write!(f, "has no options"),
            RejectReason::EmptyLabel => write!(f, "has an empty answer label"),
            RejectReason::NoMatchingOption => write!(f, "no option starts with the answer label"),
            RejectReason::AmbiguousLabel { matches } => {
                write!(f, "{} options start with the answer label", matches)
            }
        }
    }
}

impl QuestionRecord {
    /// Check the answer-label invariant
    pub fn validate(&self) -> Result<(), RejectReason> {
        if self.options.is_empty() {
            return Err(RejectReason::NoOptions);
        }
        if self.correct_label.trim().is_empty() {
            return Err(RejectReason::EmptyLabel);
        }

        match self.options.iter().filter(|opt| self.is_correct(opt)).count() {
            1 => Ok(()),
            0 => Err(RejectReason::NoMatchingOption),
            matches => Err(RejectReason::AmbiguousLabel { matches }),
        }
    }

    /// Whether `option` carries the correct label
    pub fn is_correct(&self, option: &str) -> bool {
        let label = self.correct_label.trim();
        !label.is_empty() && option.trim_start().starts_with(label)
    }

    /// The option carrying the correct label
    pub fn correct_option(&self) -> Option<&str> {
        self.options.iter().find(|opt| self.is_correct(opt)).map(String::as_str)
    }

    /// Whether `option` is exactly one of this record's options
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|opt| opt == option)
    }

    /// Resolve a bare label such as `"b"` to its full option text
    pub fn option_by_label(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        self.options
            .iter()
            .find(|opt| split_label(opt).is_some_and(|(l, _)| l.eq_ignore_ascii_case(label)))
            .map(String::as_str)
    }

    /// Resolve user input to an option: exact text, then label, then bare text
    pub fn resolve_choice(&self, input: &str) -> Option<&str> {
        if let Some(opt) = self.options.iter().find(|opt| opt.as_str() == input) {
            return Some(opt);
        }
        if let Some(opt) = self.option_by_label(input) {
            return Some(opt);
        }

        let wanted = input.trim();
        self.options
            .iter()
            .find(|opt| {
                let text = split_label(opt).map_or(opt.as_str(), |(_, text)| text);
                !wanted.is_empty() && text.trim().eq_ignore_ascii_case(wanted)
            })
            .map(String::as_str)
    }
}

/// Split `"B) Elastic demand"` into `("B", "Elastic demand")`
///
/// Returns `None` for options without a recognizable label.
pub fn split_label(option: &str) -> Option<(&str, &str)> {
    let caps = LABEL_PATTERN.captures(option)?;
    let label = caps.get(1)?.as_str();
    let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((label, text))
}

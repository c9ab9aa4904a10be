//! Question bank loading
//!
//! Loading never fails hard. A missing or unparseable file gives an empty
//! bank, and individual records that break the answer-label invariant are
//! dropped and reported instead of aborting the whole load.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::question::{QuestionRecord, RejectReason};

/// A record that was excluded from the bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position of the record in the source array
    pub index: usize,
    /// Why it was excluded
    pub reason: RejectReason,
}

/// Read-only, ordered collection of valid questions
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    records: Vec<QuestionRecord>,
    rejected: Vec<RejectedRecord>,
}

impl QuestionBank {
    /// Load a bank from a JSON file, falling back to an empty bank
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Question bank {:?} not found, starting with no questions", path);
            return Self::default();
        }

        match read_entries(path) {
            Ok(entries) => {
                let bank = Self::from_values(entries);
                tracing::info!(
                    "Loaded {} questions from {:?} ({} rejected)",
                    bank.len(),
                    path,
                    bank.rejected.len()
                );
                bank
            }
            Err(e) => {
                tracing::warn!("Ignoring question bank {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    /// Build a bank from JSON text, falling back to an empty bank
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str::<Vec<Value>>(json) {
            Ok(entries) => Self::from_values(entries),
            Err(e) => {
                tracing::warn!("Question bank is not a JSON array: {}", e);
                Self::default()
            }
        }
    }

    /// Build a bank from already-decoded records
    pub fn from_records(records: impl IntoIterator<Item = QuestionRecord>) -> Self {
        let mut bank = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            bank.admit(index, record);
        }
        bank
    }

    fn from_values(entries: Vec<Value>) -> Self {
        let mut bank = Self::default();

        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<QuestionRecord>(entry) {
                Ok(record) => bank.admit(index, record),
                Err(e) => bank.reject(index, RejectReason::Undecodable(e.to_string())),
            }
        }

        bank
    }

    fn admit(&mut self, index: usize, record: QuestionRecord) {
        match record.validate() {
            Ok(()) => self.records.push(record),
            Err(reason) => self.reject(index, reason),
        }
    }

    fn reject(&mut self, index: usize, reason: RejectReason) {
        tracing::warn!("Skipping question #{}: {}", index, reason);
        self.rejected.push(RejectedRecord { index, reason });
    }

    /// All usable questions, in source order
    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    /// Records excluded during the load
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Number of usable questions
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there is nothing to draw from
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct topics in first-seen order
    pub fn topics(&self) -> Vec<&str> {
        self.count_by_topic().into_iter().map(|(topic, _)| topic).collect()
    }

    /// Questions whose topic is one of `topics` (case-insensitive)
    ///
    /// An empty filter selects every question. The result may be empty, in
    /// which case drawing from it reports an empty bank.
    pub fn in_topics<S: AsRef<str>>(&self, topics: &[S]) -> Vec<QuestionRecord> {
        if topics.is_empty() {
            return self.records.clone();
        }
        self.records
            .iter()
            .filter(|record| {
                topics.iter().any(|t| t.as_ref().trim().eq_ignore_ascii_case(record.topic.trim()))
            })
            .cloned()
            .collect()
    }

    /// Question count per topic, in first-seen order
    pub fn count_by_topic(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|(topic, _)| *topic == record.topic) {
                Some((_, count)) => *count += 1,
                None => counts.push((record.topic.as_str(), 1)),
            }
        }
        counts
    }
}

fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question bank from {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| "Question bank must be a JSON array")
}

//! Dashboard metrics derived from the question bank and a quiz session

use crate::quiz::{QuestionBank, QuizSession};

/// Topics below this accuracy (in percent) are flagged as weak
pub const WEAK_TOPIC_THRESHOLD: u32 = 70;

/// Accuracy for one practised topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAccuracy {
    pub topic: String,
    pub correct: u32,
    pub attempted: u32,
    pub percent: u32,
}

/// Snapshot of everything the dashboard shows
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    /// Valid questions in the bank
    pub total_questions: usize,
    /// Records dropped while loading the bank
    pub rejected_records: usize,
    /// Question count per topic, in bank order
    pub questions_per_topic: Vec<(String, usize)>,
    pub score: u32,
    pub attempts: u32,
    /// Rounded accuracy, 0 before any attempt
    pub accuracy_percent: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Accuracy per practised topic, alphabetical
    pub topic_accuracy: Vec<TopicAccuracy>,
    /// Practised topics under the threshold, weakest first
    pub weak_topics: Vec<TopicAccuracy>,
}

impl DashboardMetrics {
    /// Compute metrics for `session` against `bank`
    pub fn compute(bank: &QuestionBank, session: &QuizSession) -> Self {
        let questions_per_topic = bank
            .count_by_topic()
            .into_iter()
            .map(|(topic, count)| (topic.to_string(), count))
            .collect();

        let topic_accuracy: Vec<TopicAccuracy> = session
            .topic_stats
            .iter()
            .filter(|(_, tally)| tally.attempted > 0)
            .map(|(topic, tally)| TopicAccuracy {
                topic: topic.clone(),
                correct: tally.correct,
                attempted: tally.attempted,
                percent: tally.percent(),
            })
            .collect();

        let mut weak_topics: Vec<TopicAccuracy> = topic_accuracy
            .iter()
            .filter(|t| t.percent < WEAK_TOPIC_THRESHOLD)
            .cloned()
            .collect();
        // Stable sort keeps alphabetical order among ties
        weak_topics.sort_by_key(|t| t.percent);

        Self {
            total_questions: bank.len(),
            rejected_records: bank.rejected().len(),
            questions_per_topic,
            score: session.score,
            attempts: session.attempts,
            accuracy_percent: session.accuracy_percent(),
            streak: session.streak,
            best_streak: session.best_streak,
            topic_accuracy,
            weak_topics,
        }
    }

    /// Number of distinct topics in the bank
    pub fn topic_count(&self) -> usize {
        self.questions_per_topic.len()
    }

    /// Whether the bank has no usable questions
    pub fn has_no_data(&self) -> bool {
        self.total_questions == 0
    }
}

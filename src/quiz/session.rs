//! Quiz session state machine
//!
//! ```text
//! [no question] --draw--> [awaiting selection] --submit--> [revealed]
//!                              ^      |  select                 |
//!                              |      +--------+                |
//!                              +-------------draw---------------+
//! ```
//!
//! Score, attempts, streaks and per-topic tallies only ever change inside
//! [`QuizSession::submit_answer`], and only once per drawn question.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::error::QuizError;
use super::question::QuestionRecord;

/// Where the session is in the per-question cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Nothing drawn yet
    NoQuestion,
    /// A question is showing and has not been answered
    AwaitingSelection,
    /// The answer for the current question has been revealed
    Revealed,
}

/// Result of submitting an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// Whether the selected option carries the correct label
    pub is_correct: bool,
    /// Label of the correct option
    pub correct_label: String,
    /// Rationale from the question record
    pub explanation: String,
}

/// Correct/attempted counts for one topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTally {
    pub correct: u32,
    pub attempted: u32,
}

impl TopicTally {
    /// Accuracy as a percentage (0 when nothing attempted)
    pub fn percent(&self) -> u32 {
        percent(self.correct, self.attempted)
    }
}

/// One user's ongoing quiz interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    /// Question currently presented
    pub active_question: Option<QuestionRecord>,

    /// Option the user picked for the active question
    pub selected_option: Option<String>,

    /// Whether correctness has been computed for the active question
    pub revealed: bool,

    /// Cumulative correct answers
    pub score: u32,

    /// Cumulative answered questions
    pub attempts: u32,

    /// Current run of consecutive correct answers
    #[serde(default)]
    pub streak: u32,

    /// Longest run of consecutive correct answers
    #[serde(default)]
    pub best_streak: u32,

    /// Per-topic tallies (key is the question topic)
    #[serde(default)]
    pub topic_stats: BTreeMap<String, TopicTally>,

    /// Outcome for the active question once revealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<AnswerOutcome>,
}

impl QuizSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position in the state machine
    pub fn phase(&self) -> QuizPhase {
        match (&self.active_question, self.revealed) {
            (None, _) => QuizPhase::NoQuestion,
            (Some(_), false) => QuizPhase::AwaitingSelection,
            (Some(_), true) => QuizPhase::Revealed,
        }
    }

    /// Draw a random question from `bank`
    pub fn draw_question(&mut self, bank: &[QuestionRecord]) -> Result<&QuestionRecord, QuizError> {
        self.draw_question_with(bank, &mut rand::thread_rng())
    }

    /// Draw a random question using the given RNG
    ///
    /// Each draw is independent and with replacement, so the same question may
    /// come up twice in a row. An empty bank leaves the session untouched.
    pub fn draw_question_with<R: Rng + ?Sized>(
        &mut self,
        bank: &[QuestionRecord],
        rng: &mut R,
    ) -> Result<&QuestionRecord, QuizError> {
        let record = bank.choose(rng).ok_or(QuizError::EmptyBank)?;

        self.selected_option = None;
        self.revealed = false;
        self.last_outcome = None;
        Ok(self.active_question.insert(record.clone()))
    }

    /// Record the user's choice for the active question
    ///
    /// May be called repeatedly before submitting; the latest choice wins.
    pub fn select_option(&mut self, option_text: &str) -> Result<(), QuizError> {
        let question = self.active_question.as_ref().ok_or(QuizError::NoActiveQuestion)?;

        if !question.has_option(option_text) {
            return Err(QuizError::InvalidOption { option: option_text.to_string() });
        }
        if self.revealed {
            return Err(QuizError::AlreadyRevealed);
        }

        self.selected_option = Some(option_text.to_string());
        Ok(())
    }

    /// Reveal correctness for the current selection
    ///
    /// A second submit for the same question is rejected with
    /// [`QuizError::AlreadyRevealed`] and changes nothing.
    pub fn submit_answer(&mut self) -> Result<AnswerOutcome, QuizError> {
        let question = self.active_question.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        if self.revealed {
            return Err(QuizError::AlreadyRevealed);
        }
        let selected = self.selected_option.as_deref().ok_or(QuizError::NoSelection)?;

        let outcome = AnswerOutcome {
            is_correct: question.is_correct(selected),
            correct_label: question.correct_label.trim().to_string(),
            explanation: question.explanation.clone(),
        };

        let tally = self.topic_stats.entry(question.topic.clone()).or_default();
        tally.attempted += 1;
        self.attempts += 1;

        if outcome.is_correct {
            tally.correct += 1;
            self.score += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }

        self.revealed = true;
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Fraction of answered questions that were correct (0.0 before any attempt)
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 { 0.0 } else { f64::from(self.score) / f64::from(self.attempts) }
    }

    /// Accuracy rounded to a whole percentage
    pub fn accuracy_percent(&self) -> u32 {
        percent(self.score, self.attempts)
    }
}

fn percent(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        0
    } else {
        ((f64::from(correct) / f64::from(attempted)) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn demand_question() -> QuestionRecord {
        QuestionRecord {
            topic: "Markets".into(),
            prompt: "Demand slopes downward because...".into(),
            options: vec![
                "A) substitution effect only".into(),
                "B) income and substitution effects".into(),
                "C) supply shifts".into(),
                "D) none".into(),
            ],
            correct_label: "B".into(),
            explanation: "Both effects reduce quantity demanded as price rises.".into(),
        }
    }

    fn question(topic: &str, answer: &str) -> QuestionRecord {
        QuestionRecord {
            topic: topic.into(),
            prompt: format!("{} question", topic),
            options: vec!["A) first".into(), "B) second".into(), "C) third".into()],
            correct_label: answer.into(),
            explanation: String::new(),
        }
    }

    fn answer(session: &mut QuizSession, option: &str) -> AnswerOutcome {
        session.select_option(option).unwrap();
        session.submit_answer().unwrap()
    }

    #[test]
    fn new_session_has_no_question() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), QuizPhase::NoQuestion);
        assert_eq!(session.score, 0);
        assert_eq!(session.attempts, 0);
    }

    #[test]
    fn correct_answer_scenario() {
        let bank = vec![demand_question()];
        let mut session = QuizSession::new();

        let drawn = session.draw_question(&bank).unwrap().clone();
        assert_eq!(drawn, bank[0]);
        assert_eq!(session.phase(), QuizPhase::AwaitingSelection);

        let outcome = answer(&mut session, "B) income and substitution effects");
        assert_eq!(
            outcome,
            AnswerOutcome {
                is_correct: true,
                correct_label: "B".into(),
                explanation: "Both effects reduce quantity demanded as price rises.".into(),
            }
        );
        assert_eq!((session.score, session.attempts), (1, 1));
        assert_eq!(session.phase(), QuizPhase::Revealed);
    }

    #[test]
    fn wrong_answer_scenario() {
        let bank = vec![demand_question()];
        let mut session = QuizSession::new();
        session.draw_question(&bank).unwrap();

        let outcome = answer(&mut session, "A) substitution effect only");
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_label, "B");
        assert_eq!((session.score, session.attempts), (0, 1));
    }

    #[test]
    fn empty_bank_leaves_session_untouched() {
        let mut session = QuizSession::new();
        assert_eq!(session.draw_question(&[]), Err(QuizError::EmptyBank));
        assert!(session.active_question.is_none());

        session.draw_question(&[demand_question()]).unwrap();
        session.select_option("D) none").unwrap();
        let before = session.clone();

        assert_eq!(session.draw_question(&[]), Err(QuizError::EmptyBank));
        assert_eq!(session, before);
    }

    #[test]
    fn double_submit_counts_once() {
        let mut session = QuizSession::new();
        session.draw_question(&[demand_question()]).unwrap();
        answer(&mut session, "B) income and substitution effects");

        assert_eq!(session.submit_answer(), Err(QuizError::AlreadyRevealed));
        assert_eq!(session.submit_answer(), Err(QuizError::AlreadyRevealed));
        assert_eq!((session.score, session.attempts), (1, 1));
        assert_eq!(session.topic_stats["Markets"], TopicTally { correct: 1, attempted: 1 });
    }

    #[test]
    fn submit_requires_question_then_selection() {
        let mut session = QuizSession::new();
        assert_eq!(session.submit_answer(), Err(QuizError::NoActiveQuestion));

        session.draw_question(&[demand_question()]).unwrap();
        assert_eq!(session.submit_answer(), Err(QuizError::NoSelection));
        assert_eq!(session.attempts, 0);
    }

    #[test]
    fn select_requires_active_question() {
        let mut session = QuizSession::new();
        assert_eq!(session.select_option("A) substitution effect only"), Err(QuizError::NoActiveQuestion));
    }

    #[test]
    fn select_rejects_foreign_option() {
        let mut session = QuizSession::new();
        session.draw_question(&[demand_question()]).unwrap();

        let err = session.select_option("E) price controls").unwrap_err();
        assert_eq!(err, QuizError::InvalidOption { option: "E) price controls".into() });
        assert!(session.selected_option.is_none());
    }

    #[test]
    fn latest_selection_is_evaluated() {
        let mut session = QuizSession::new();
        session.draw_question(&[demand_question()]).unwrap();

        session.select_option("B) income and substitution effects").unwrap();
        session.select_option("C) supply shifts").unwrap();
        let outcome = session.submit_answer().unwrap();

        assert!(!outcome.is_correct);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn selection_locked_after_reveal() {
        let mut session = QuizSession::new();
        session.draw_question(&[demand_question()]).unwrap();
        answer(&mut session, "A) substitution effect only");

        assert_eq!(session.select_option("B) income and substitution effects"), Err(QuizError::AlreadyRevealed));
        assert_eq!(session.selected_option.as_deref(), Some("A) substitution effect only"));
    }

    #[test]
    fn next_draw_resets_question_state_but_keeps_counters() {
        let bank = vec![demand_question()];
        let mut session = QuizSession::new();
        session.draw_question(&bank).unwrap();
        answer(&mut session, "B) income and substitution effects");

        session.draw_question(&bank).unwrap();
        assert!(session.selected_option.is_none());
        assert!(!session.revealed);
        assert!(session.last_outcome.is_none());
        assert_eq!((session.score, session.attempts), (1, 1));
    }

    #[test]
    fn streaks_track_consecutive_correct_answers() {
        let bank = vec![question("Money", "A")];
        let mut session = QuizSession::new();

        for option in ["A) first", "A) first", "B) second", "A) first"] {
            session.draw_question(&bank).unwrap();
            answer(&mut session, option);
        }

        assert_eq!(session.streak, 1);
        assert_eq!(session.best_streak, 2);
        assert_eq!(session.accuracy_percent(), 75);
    }

    #[test]
    fn topic_stats_split_by_topic() {
        let mut session = QuizSession::new();

        session.draw_question(&[question("Money", "A")]).unwrap();
        answer(&mut session, "A) first");
        session.draw_question(&[question("Trade", "C")]).unwrap();
        answer(&mut session, "A) first");

        assert_eq!(session.topic_stats["Money"], TopicTally { correct: 1, attempted: 1 });
        assert_eq!(session.topic_stats["Trade"], TopicTally { correct: 0, attempted: 1 });
        assert_eq!(session.topic_stats["Trade"].percent(), 0);
    }

    #[test]
    fn accuracy_is_zero_before_any_attempt() {
        let session = QuizSession::new();
        assert_eq!(session.accuracy(), 0.0);
        assert_eq!(session.accuracy_percent(), 0);
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let bank: Vec<_> = ["A", "B", "C"].iter().map(|t| question(t, "A")).collect();
        let mut first = QuizSession::new();
        let mut second = QuizSession::new();

        let a = first.draw_question_with(&bank, &mut StdRng::seed_from_u64(7)).unwrap().clone();
        let b = second.draw_question_with(&bank, &mut StdRng::seed_from_u64(7)).unwrap().clone();
        assert_eq!(a, b);
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut session = QuizSession::new();
        session.draw_question(&[demand_question()]).unwrap();
        answer(&mut session, "B) income and substitution effects");

        let json = serde_json::to_string(&session).unwrap();
        let restored: QuizSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
        assert!(json.contains("\"question\""));
    }

    #[test]
    fn older_session_json_without_extras_deserializes() {
        let json = r#"{
            "active_question": null,
            "selected_option": null,
            "revealed": false,
            "score": 3,
            "attempts": 5
        }"#;
        let session: QuizSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.accuracy_percent(), 60);
        assert!(session.topic_stats.is_empty());
    }

    fn arb_bank() -> impl Strategy<Value = Vec<QuestionRecord>> {
        prop::collection::vec(("[a-z]{1,8}", 0usize..3), 1..12).prop_map(|specs| {
            specs
                .into_iter()
                .map(|(topic, idx)| question(&topic, ["A", "B", "C"][idx]))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn draw_always_yields_a_bank_member(bank in arb_bank(), seed in any::<u64>()) {
            let mut session = QuizSession::new();
            let drawn = session.draw_question_with(&bank, &mut StdRng::seed_from_u64(seed)).unwrap().clone();
            prop_assert!(bank.contains(&drawn));
        }

        #[test]
        fn labelled_option_is_the_only_correct_one(bank in arb_bank(), pick in 0usize..3) {
            let mut session = QuizSession::new();
            let drawn = session.draw_question(&bank).unwrap().clone();
            let option = drawn.options[pick].clone();

            session.select_option(&option).unwrap();
            let outcome = session.submit_answer().unwrap();
            prop_assert_eq!(outcome.is_correct, option.starts_with(&drawn.correct_label));
        }

        #[test]
        fn counters_move_once_per_question(picks in prop::collection::vec((0usize..3, 1usize..4), 1..20)) {
            let bank = vec![question("Money", "B")];
            let mut session = QuizSession::new();

            for (i, (pick, submits)) in picks.iter().enumerate() {
                session.draw_question(&bank).unwrap();
                session.select_option(&bank[0].options[*pick]).unwrap();
                for _ in 0..*submits {
                    let _ = session.submit_answer();
                }
                prop_assert_eq!(session.attempts as usize, i + 1);
            }
            prop_assert!(session.score <= session.attempts);
        }

        #[test]
        fn accuracy_stays_in_unit_range(picks in prop::collection::vec(0usize..3, 0..30)) {
            let bank = vec![question("Money", "C")];
            let mut session = QuizSession::new();

            for pick in picks {
                session.draw_question(&bank).unwrap();
                answer(&mut session, &bank[0].options[pick]);
            }
            let accuracy = session.accuracy();
            prop_assert!((0.0..=1.0).contains(&accuracy));
            prop_assert!(session.accuracy_percent() <= 100);
        }
    }
}

//! Interactive chat session state
//!
//! Tracks the conversation and decides when to show tips and encouragements.
//! Rendering and input handling live in the binary; everything here is plain
//! state so it can be driven from tests with a [`FixedRandom`].

use crate::documents::AssistantProfile;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use uuid::Uuid;

/// Tip shown after every this many answered questions
const TIP_INTERVAL: usize = 3;
/// Encouragement shown after every this many answered questions
const ENCOURAGEMENT_INTERVAL: usize = 5;

/// Source of indices for picking presentation messages
pub trait RandomSource {
    /// Index in `0..len`; `len` is never zero
    fn pick(&mut self, len: usize) -> usize;
}

/// Thread-local RNG backed source
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Replays a fixed sequence of indices (wrapped into range)
#[derive(Debug, Clone)]
pub struct FixedRandom {
    sequence: Vec<usize>,
    position: usize,
}

impl FixedRandom {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            position: 0,
        }
    }
}

impl RandomSource for FixedRandom {
    fn pick(&mut self, len: usize) -> usize {
        if self.sequence.is_empty() {
            return 0;
        }
        let value = self.sequence[self.position % self.sequence.len()];
        self.position += 1;
        value % len
    }
}

/// A line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Help,
    History,
    Stats,
    Info,
    /// Toggle relevance diagnostics after each answer
    Trace,
    Quit,
    Question(String),
    Empty,
}

impl SessionCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => SessionCommand::Empty,
            "help" => SessionCommand::Help,
            "history" => SessionCommand::History,
            "stats" => SessionCommand::Stats,
            "info" => SessionCommand::Info,
            "trace" => SessionCommand::Trace,
            "quit" | "exit" => SessionCommand::Quit,
            _ => SessionCommand::Question(trimmed.to_string()),
        }
    }
}

/// One answered question
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Message shown between answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    Tip(String),
    Encouragement(String),
}

/// Chat session
pub struct ChatSession<R: RandomSource = ThreadRandom> {
    id: Uuid,
    started_at: DateTime<Utc>,
    profile: AssistantProfile,
    history: Vec<Exchange>,
    trace: bool,
    random: R,
}

impl ChatSession<ThreadRandom> {
    pub fn new(profile: AssistantProfile) -> Self {
        Self::with_random(profile, ThreadRandom)
    }
}

impl<R: RandomSource> ChatSession<R> {
    pub fn with_random(profile: AssistantProfile, random: R) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            profile,
            history: Vec::new(),
            trace: false,
            random,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &AssistantProfile {
        &self.profile
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub fn question_count(&self) -> usize {
        self.history.len()
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace
    }

    /// Flip relevance tracing; returns the new state
    pub fn toggle_trace(&mut self) -> bool {
        self.trace = !self.trace;
        self.trace
    }

    /// Record an answered question and return the notices it triggers
    ///
    /// Failed queries are never recorded, so they do not advance the counters.
    pub fn record_answer(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        elapsed: Duration,
    ) -> Vec<SessionNotice> {
        self.history.push(Exchange {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
            elapsed,
        });

        let count = self.history.len();
        let mut notices = Vec::new();

        if count % TIP_INTERVAL == 0 {
            if let Some(tip) = self.pick_from(Messages::Tips) {
                notices.push(SessionNotice::Tip(tip));
            }
        }

        if count % ENCOURAGEMENT_INTERVAL == 0 {
            if let Some(message) = self.pick_from(Messages::Encouragements) {
                notices.push(SessionNotice::Encouragement(format!(
                    "{} questions so far! {}",
                    count, message
                )));
            }
        }

        notices
    }

    /// A piece of advice to show after a failed query, if the profile has any
    pub fn error_advice(&mut self) -> Option<String> {
        self.pick_from(Messages::ErrorAdvice)
    }

    fn pick_from(&mut self, messages: Messages) -> Option<String> {
        let pool = match messages {
            Messages::Tips => &self.profile.tips,
            Messages::Encouragements => &self.profile.encouragements,
            Messages::ErrorAdvice => &self.profile.error_advice,
        };
        if pool.is_empty() {
            return None;
        }
        let index = self.random.pick(pool.len()).min(pool.len() - 1);
        Some(pool[index].clone())
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// Mean response time of answered questions
    pub fn average_response_time(&self) -> Option<Duration> {
        if self.history.is_empty() {
            return None;
        }
        let total: Duration = self.history.iter().map(|e| e.elapsed).sum();
        Some(total / self.history.len() as u32)
    }

    pub fn help_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.profile.capability_description);
        if !self.profile.help_examples.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Example questions:");
            for example in &self.profile.help_examples {
                let _ = writeln!(out, "  - {}", example);
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Commands:");
        let _ = writeln!(out, "  help     Show this message");
        let _ = writeln!(out, "  history  Show the conversation so far");
        let _ = writeln!(out, "  stats    Show session statistics");
        let _ = writeln!(out, "  info     Show data source information");
        let _ = writeln!(out, "  trace    Toggle relevance analysis after each answer");
        let _ = write!(out, "  quit     End the session");
        out
    }

    pub fn history_text(&self) -> String {
        if self.history.is_empty() {
            return "No questions asked yet.".to_string();
        }

        let mut out = String::new();
        for (i, exchange) in self.history.iter().enumerate() {
            if i > 0 {
                let _ = writeln!(out);
            }
            let _ = writeln!(out, "{}. Q: {}", i + 1, exchange.question);
            let _ = write!(out, "   A: {}", exchange.answer);
        }
        out
    }

    pub fn stats_text(&self) -> String {
        let elapsed = self.elapsed();
        let mut out = format!(
            "Questions answered: {}\nSession duration: {}m {}s",
            self.question_count(),
            elapsed.num_minutes(),
            elapsed.num_seconds() % 60
        );
        if let Some(average) = self.average_response_time() {
            let _ = write!(
                out,
                "\nAverage response time: {:.1}s",
                average.as_secs_f64()
            );
        }
        out
    }
}

#[derive(Clone, Copy)]
enum Messages {
    Tips,
    Encouragements,
    ErrorAdvice,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AssistantProfile {
        AssistantProfile {
            tips: vec!["tip-a".to_string(), "tip-b".to_string()],
            encouragements: vec!["keep going".to_string()],
            error_advice: vec!["check your connection".to_string()],
            help_examples: vec!["Where are apples cheapest?".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(SessionCommand::parse("  HELP "), SessionCommand::Help);
        assert_eq!(SessionCommand::parse("exit"), SessionCommand::Quit);
        assert_eq!(SessionCommand::parse("quit"), SessionCommand::Quit);
        assert_eq!(SessionCommand::parse("Trace"), SessionCommand::Trace);
        assert_eq!(SessionCommand::parse("   "), SessionCommand::Empty);
        assert_eq!(
            SessionCommand::parse(" Where are apples? "),
            SessionCommand::Question("Where are apples?".to_string())
        );
    }

    #[test]
    fn test_tip_every_third_and_encouragement_every_fifth() {
        let mut session = ChatSession::with_random(profile(), FixedRandom::new(vec![1, 0]));
        let mut by_question = Vec::new();
        for i in 1..=6 {
            by_question.push(session.record_answer(
                format!("q{}", i),
                "a",
                Duration::from_millis(10),
            ));
        }

        assert!(by_question[0].is_empty());
        assert!(by_question[1].is_empty());
        assert_eq!(by_question[2], vec![SessionNotice::Tip("tip-b".to_string())]);
        assert!(by_question[3].is_empty());
        assert_eq!(
            by_question[4],
            vec![SessionNotice::Encouragement(
                "5 questions so far! keep going".to_string()
            )]
        );
        // second pick from the fixed sequence
        assert_eq!(by_question[5], vec![SessionNotice::Tip("tip-b".to_string())]);
    }

    #[test]
    fn test_empty_pools_produce_no_notices() {
        let mut session =
            ChatSession::with_random(AssistantProfile::default(), FixedRandom::new(vec![0]));
        for _ in 0..5 {
            session.record_answer("q", "a", Duration::ZERO);
        }
        assert_eq!(session.question_count(), 5);
        assert!(session.error_advice().is_none());
    }

    #[test]
    fn test_trace_toggle_and_history() {
        let mut session = ChatSession::with_random(profile(), FixedRandom::new(vec![0]));
        assert!(!session.trace_enabled());
        assert!(session.toggle_trace());
        assert!(!session.toggle_trace());

        assert_eq!(session.history_text(), "No questions asked yet.");
        session.record_answer("Where?", "Here.", Duration::from_secs(2));
        session.record_answer("When?", "Now.", Duration::from_secs(4));
        assert_eq!(
            session.history_text(),
            "1. Q: Where?\n   A: Here.\n2. Q: When?\n   A: Now."
        );
        assert_eq!(session.average_response_time(), Some(Duration::from_secs(3)));
        assert!(session.stats_text().contains("Questions answered: 2"));
        assert_eq!(
            session.error_advice(),
            Some("check your connection".to_string())
        );
    }

    #[test]
    fn test_help_lists_examples_and_commands() {
        let session = ChatSession::with_random(profile(), FixedRandom::new(vec![]));
        let help = session.help_text();
        assert!(help.contains("Where are apples cheapest?"));
        assert!(help.contains("trace"));
    }
}

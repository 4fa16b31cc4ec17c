use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::typing_policy::{self, Mark};

/// Minimum time between two words-per-minute refreshes.
pub const DEFAULT_STATS_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no practice session has been started")]
    NotStarted,
}

/// Result of one input change, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub marks: Vec<Mark>,
    pub accuracy: u32,
    pub wpm: u32,
    pub complete: bool,
}

/// One practice run over a snapshot of a note.
#[derive(Debug, Clone)]
pub struct Session {
    reference: String,
    reference_chars: Vec<char>,
    typed: String,
    started_at: Option<Instant>,
    last_stats_at: Option<Instant>,
    stats_interval: Duration,
    wpm: u32,
    accuracy: u32,
    completed: bool,
}

impl Session {
    pub fn new(reference: impl Into<String>, stats_interval: Duration) -> Self {
        let reference = reference.into();
        let reference_chars = reference.chars().collect();

        Self {
            reference,
            reference_chars,
            typed: String::new(),
            started_at: None,
            last_stats_at: None,
            stats_interval,
            wpm: 0,
            accuracy: 100,
            completed: false,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Reference length in characters.
    pub fn reference_len(&self) -> usize {
        self.reference_chars.len()
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    /// Latched once the reference has been reproduced exactly.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn stats_interval(&self) -> Duration {
        self.stats_interval
    }

    /// Recompute everything for the full current input, observed at `now`.
    pub fn update(&mut self, input: &str, now: Instant) -> Feedback {
        let typed: Vec<char> = input.chars().collect();

        if self.started_at.is_none() && !typed.is_empty() {
            debug!(reference_len = self.reference_len(), "typing started");
            self.started_at = Some(now);
            self.last_stats_at = Some(now);
        }

        let marks = typing_policy::classify(&self.reference_chars, &typed);
        let correct = typing_policy::correct_count(&self.reference_chars, &typed);

        if typed.is_empty() {
            self.accuracy = 100;
            self.wpm = 0;
        } else {
            self.accuracy = typing_policy::accuracy_percent(correct, typed.len());
            self.refresh_wpm(typed.len(), now);
        }

        let complete = typing_policy::is_complete(self.reference_len(), typed.len(), correct);
        if complete && !self.completed {
            info!(
                wpm = self.wpm,
                accuracy = self.accuracy,
                length = self.reference_len(),
                "practice session complete"
            );
            self.completed = true;
        }

        self.typed = input.to_owned();

        Feedback {
            marks,
            accuracy: self.accuracy,
            wpm: self.wpm,
            complete,
        }
    }

    // Damped: the previous value stays until the interval has passed.
    fn refresh_wpm(&mut self, typed_len: usize, now: Instant) {
        let (Some(started_at), Some(last_stats_at)) = (self.started_at, self.last_stats_at) else {
            return;
        };

        if now.saturating_duration_since(last_stats_at) <= self.stats_interval {
            return;
        }

        let elapsed_minutes = now.saturating_duration_since(started_at).as_secs_f64() / 60.0;
        if let Some(wpm) = typing_policy::words_per_minute(typed_len, elapsed_minutes) {
            self.wpm = wpm;
            self.last_stats_at = Some(now);
        }
    }
}

/// Owns the current practice session, if any.
#[derive(Debug)]
pub struct TypingEngine {
    session: Option<Session>,
    stats_interval: Duration,
}

impl Default for TypingEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_STATS_INTERVAL_MS))
    }
}

impl TypingEngine {
    pub fn new(stats_interval: Duration) -> Self {
        Self {
            session: None,
            stats_interval,
        }
    }

    pub fn set_stats_interval(&mut self, stats_interval: Duration) {
        self.stats_interval = stats_interval;
    }

    /// Begin a new session, discarding any previous one.
    pub fn start(&mut self, reference: impl Into<String>) -> &Session {
        self.session.insert(Session::new(reference, self.stats_interval))
    }

    pub fn on_input_changed(&mut self, input: &str) -> Result<Feedback, EngineError> {
        self.on_input_changed_at(input, Instant::now())
    }

    pub fn on_input_changed_at(
        &mut self,
        input: &str,
        now: Instant,
    ) -> Result<Feedback, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NotStarted)?;
        Ok(session.update(input, now))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// End the current session and hand it back to the caller.
    pub fn finish(&mut self) -> Option<Session> {
        self.session.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new("hello", ms(2000));

        assert_eq!(session.reference(), "hello");
        assert_eq!(session.reference_len(), 5);
        assert_eq!(session.typed(), "");
        assert_eq!(session.wpm(), 0);
        assert_eq!(session.accuracy(), 100);
        assert!(!session.has_started());
        assert!(!session.is_complete());
    }

    #[test]
    fn test_empty_input_does_not_start_timer() {
        let mut session = Session::new("cat", ms(2000));
        let feedback = session.update("", Instant::now());

        assert_eq!(feedback.accuracy, 100);
        assert_eq!(feedback.wpm, 0);
        assert!(!feedback.complete);
        assert_eq!(feedback.marks, vec![Mark::Current, Mark::Untyped, Mark::Untyped]);
        assert!(session.started_at().is_none());
    }

    #[test]
    fn test_timer_starts_on_first_keystroke_only() {
        let t0 = Instant::now();
        let mut session = Session::new("cat", ms(2000));

        session.update("c", t0);
        assert_eq!(session.started_at(), Some(t0));

        session.update("ca", t0 + ms(300));
        assert_eq!(session.started_at(), Some(t0));

        // clearing the input keeps the original start
        session.update("", t0 + ms(400));
        session.update("c", t0 + ms(500));
        assert_eq!(session.started_at(), Some(t0));
    }

    #[test]
    fn test_exact_match_completes() {
        let mut session = Session::new("cat", ms(2000));
        let feedback = session.update("cat", Instant::now());

        assert_eq!(feedback.marks, vec![Mark::Correct; 3]);
        assert_eq!(feedback.accuracy, 100);
        assert!(feedback.complete);
        assert!(session.is_complete());
    }

    #[test]
    fn test_full_length_with_error_is_not_complete() {
        let mut session = Session::new("cat", ms(2000));
        let feedback = session.update("cab", Instant::now());

        assert_eq!(
            feedback.marks,
            vec![Mark::Correct, Mark::Correct, Mark::Incorrect]
        );
        assert_eq!(feedback.accuracy, 67);
        assert!(!feedback.complete);
    }

    #[test]
    fn test_typing_past_reference_end() {
        let mut session = Session::new("hi", ms(2000));
        let feedback = session.update("hello", Instant::now());

        assert_eq!(feedback.marks.len(), 5);
        assert_eq!(feedback.marks[0], Mark::Correct);
        assert!(feedback.marks[1..].iter().all(|m| *m == Mark::Incorrect));
        assert_eq!(feedback.accuracy, 20);
        assert!(!feedback.complete);
    }

    #[test]
    fn test_short_input_never_completes() {
        let mut session = Session::new("hello", ms(2000));
        let now = Instant::now();

        for prefix in ["h", "he", "hel", "hell"] {
            let feedback = session.update(prefix, now);
            assert_eq!(feedback.accuracy, 100);
            assert!(!feedback.complete);
        }
    }

    #[test]
    fn test_completion_latches() {
        let mut session = Session::new("ab", ms(2000));
        let now = Instant::now();

        assert!(session.update("ab", now).complete);
        let feedback = session.update("a", now);
        assert!(!feedback.complete);
        assert!(session.is_complete());

        // completing again re-signals
        assert!(session.update("ab", now).complete);
    }

    #[test]
    fn test_more_mismatches_never_raise_accuracy() {
        let mut session = Session::new("abcdef", ms(2000));
        let now = Instant::now();

        let inputs = ["abcdef", "xbcdef", "xycdef", "xyzdef", "xyzwef"];
        let accuracies: Vec<u32> = inputs
            .iter()
            .map(|input| session.update(input, now).accuracy)
            .collect();

        assert!(accuracies.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(accuracies[0], 100);
    }

    #[test]
    fn test_wpm_is_damped_within_interval() {
        let t0 = Instant::now();
        let mut session = Session::new("abcdefghij", ms(2000));

        assert_eq!(session.update("a", t0).wpm, 0);
        assert_eq!(session.update("ab", t0 + ms(500)).wpm, 0);
        assert_eq!(session.update("abc", t0 + ms(1500)).wpm, 0);

        // 4 chars over 2.5s = 0.8 words / (2.5 / 60) min = 19.2
        assert_eq!(session.update("abcd", t0 + ms(2500)).wpm, 19);

        // next refresh is gated on the last one
        assert_eq!(session.update("abcde", t0 + ms(4000)).wpm, 19);
        // 6 chars over 5s = 1.2 words / (5 / 60) min = 14.4
        assert_eq!(session.update("abcdef", t0 + ms(5000)).wpm, 14);
    }

    #[test]
    fn test_wpm_interval_boundary_is_exclusive() {
        let t0 = Instant::now();
        let mut session = Session::new("abcdef", ms(1000));

        session.update("a", t0);
        assert_eq!(session.update("abcde", t0 + ms(1000)).wpm, 0);
        // 5 chars in 1.001s
        assert_eq!(session.update("abcde", t0 + ms(1001)).wpm, 60);
    }

    #[test]
    fn test_wpm_grows_with_length_at_same_elapsed_time() {
        let t0 = Instant::now();
        let at = t0 + ms(60_000);

        let mut short = Session::new("abcdefghijklmnop", Duration::ZERO);
        short.update("a", t0);
        let short_wpm = short.update("abcde", at).wpm;

        let mut long = Session::new("abcdefghijklmnop", Duration::ZERO);
        long.update("a", t0);
        let long_wpm = long.update("abcdefghij", at).wpm;

        assert_eq!(short_wpm, 1);
        assert_eq!(long_wpm, 2);
    }

    #[test]
    fn test_empty_input_resets_wpm() {
        let t0 = Instant::now();
        let mut session = Session::new("abcdefghij", Duration::ZERO);

        session.update("a", t0);
        assert!(session.update("abcdefghij", t0 + ms(6000)).wpm > 0);

        let feedback = session.update("", t0 + ms(7000));
        assert_eq!(feedback.wpm, 0);
        assert_eq!(feedback.accuracy, 100);
    }

    #[test]
    fn test_unicode_reference_counts_chars() {
        let mut session = Session::new("héllo", ms(2000));
        assert_eq!(session.reference_len(), 5);

        let feedback = session.update("hél", Instant::now());
        assert_eq!(feedback.marks.len(), 5);
        assert_eq!(feedback.marks[2], Mark::Correct);
        assert_eq!(feedback.marks[3], Mark::Current);
    }

    #[test]
    fn test_engine_requires_start() {
        let mut engine = TypingEngine::default();
        assert_matches!(engine.on_input_changed("a"), Err(EngineError::NotStarted));
    }

    #[test]
    fn test_engine_restart_discards_session() {
        let mut engine = TypingEngine::new(ms(2000));
        engine.start("first");
        engine.on_input_changed("fir").unwrap();
        assert!(engine.session().unwrap().has_started());

        let session = engine.start("second");
        assert_eq!(session.reference(), "second");
        assert!(!session.has_started());
        assert_eq!(session.typed(), "");
    }

    #[test]
    fn test_engine_finish_takes_session() {
        let mut engine = TypingEngine::new(ms(2000));
        engine.start("hi");
        let feedback = engine.on_input_changed("hi").unwrap();
        assert!(feedback.complete);

        let session = engine.finish().unwrap();
        assert!(session.is_complete());
        assert!(engine.session().is_none());
        assert_matches!(engine.on_input_changed("h"), Err(EngineError::NotStarted));
    }

    #[test]
    fn test_engine_uses_configured_interval() {
        let mut engine = TypingEngine::new(ms(2000));
        engine.set_stats_interval(ms(50));
        assert_eq!(engine.start("x").stats_interval(), ms(50));
    }
}

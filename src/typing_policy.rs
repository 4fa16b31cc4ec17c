//! Character comparison and the accuracy / words-per-minute formulas.
//!
//! Everything here is a pure function of the reference and the typed text so
//! the session can recompute it from scratch on every input change.

/// Characters counted as one word when estimating speed.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Classification of one position of the practice text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Correct,
    Incorrect,
    /// First position that has not been typed yet (the cursor).
    Current,
    Untyped,
}

/// Marks every index in `0..max(typed.len(), reference.len())`.
///
/// Anything typed past the end of the reference is incorrect.
pub fn classify(reference: &[char], typed: &[char]) -> Vec<Mark> {
    let len = typed.len().max(reference.len());

    (0..len)
        .map(|idx| match typed.get(idx) {
            Some(c) if reference.get(idx) == Some(c) => Mark::Correct,
            Some(_) => Mark::Incorrect,
            None if idx == typed.len() => Mark::Current,
            None => Mark::Untyped,
        })
        .collect()
}

/// Number of typed characters that match the reference at the same index.
pub fn correct_count(reference: &[char], typed: &[char]) -> usize {
    typed
        .iter()
        .zip(reference.iter())
        .filter(|(t, r)| t == r)
        .count()
}

/// Unclamped `round(100 * correct / typed)`; `None` when nothing was typed.
pub fn raw_accuracy(correct: usize, typed: usize) -> Option<i64> {
    if typed == 0 {
        return None;
    }

    Some((correct as f64 / typed as f64 * 100.0).round() as i64)
}

/// Accuracy in percent, clamped to `0..=100`. Empty input counts as 100.
pub fn accuracy_percent(correct: usize, typed: usize) -> u32 {
    raw_accuracy(correct, typed).map_or(100, |acc| acc.clamp(0, 100) as u32)
}

/// `round((typed / 5) / minutes)`, never negative. `None` when no time elapsed.
pub fn words_per_minute(typed: usize, elapsed_minutes: f64) -> Option<u32> {
    if elapsed_minutes <= 0.0 {
        return None;
    }

    let wpm = ((typed as f64 / CHARS_PER_WORD) / elapsed_minutes).round();
    Some(wpm.max(0.0) as u32)
}

/// Full-length, fully-correct input. Uses the same rounded accuracy the
/// display shows, so very long texts complete at a displayed 100%.
pub fn is_complete(reference_len: usize, typed_len: usize, correct: usize) -> bool {
    typed_len >= reference_len && raw_accuracy(correct, typed_len) == Some(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_classify_exact_match() {
        let marks = classify(&chars("cat"), &chars("cat"));
        assert_eq!(marks, vec![Mark::Correct; 3]);
    }

    #[test]
    fn test_classify_marks_cursor_once() {
        let marks = classify(&chars("hello"), &chars("he"));
        assert_eq!(
            marks,
            vec![
                Mark::Correct,
                Mark::Correct,
                Mark::Current,
                Mark::Untyped,
                Mark::Untyped
            ]
        );
    }

    #[test]
    fn test_classify_past_reference_end() {
        let marks = classify(&chars("hi"), &chars("hello"));
        assert_eq!(
            marks,
            vec![
                Mark::Correct,
                Mark::Incorrect,
                Mark::Incorrect,
                Mark::Incorrect,
                Mark::Incorrect
            ]
        );
    }

    #[test]
    fn test_classify_empty_input() {
        let marks = classify(&chars("ab"), &[]);
        assert_eq!(marks, vec![Mark::Current, Mark::Untyped]);
        assert!(classify(&[], &[]).is_empty());
    }

    #[test]
    fn test_correct_count_ignores_overflow() {
        assert_eq!(correct_count(&chars("hi"), &chars("hello")), 1);
        assert_eq!(correct_count(&chars("cat"), &chars("cab")), 2);
        assert_eq!(correct_count(&chars("cat"), &[]), 0);
    }

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(accuracy_percent(0, 0), 100);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 5), 20);
        assert_eq!(accuracy_percent(0, 4), 0);
        assert_eq!(accuracy_percent(4, 4), 100);
    }

    #[test]
    fn test_accuracy_rounds_half_away_from_zero() {
        // 1/8 = 12.5%
        assert_eq!(accuracy_percent(1, 8), 13);
    }

    #[test]
    fn test_words_per_minute() {
        // 50 chars in one minute = 10 words
        assert_eq!(words_per_minute(50, 1.0), Some(10));
        // 12 chars in 30s = 2.4 words / 0.5 min
        assert_eq!(words_per_minute(12, 0.5), Some(5));
        assert_eq!(words_per_minute(0, 1.0), Some(0));
        assert_eq!(words_per_minute(10, 0.0), None);
    }

    #[test]
    fn test_is_complete() {
        assert!(is_complete(3, 3, 3));
        assert!(!is_complete(3, 3, 2));
        assert!(!is_complete(3, 2, 2));
        assert!(!is_complete(0, 0, 0));
        assert!(!is_complete(0, 2, 0));
    }

    #[test]
    fn test_is_complete_follows_rounded_accuracy() {
        // 399/400 is 99.75% and displays as 100
        assert!(is_complete(400, 400, 399));
        assert!(!is_complete(100, 100, 99));
    }
}

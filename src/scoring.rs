use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Floor applied to the elapsed minutes so an instant finish never divides by zero (1ms)
pub const MIN_MINUTES: f64 = 1.0 / 60_000.0;

/// Outcome of one completed test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: f64,
    pub accuracy: f64,
    #[serde(rename = "time", alias = "elapsedSeconds")]
    pub elapsed_seconds: f64,
    #[serde(rename = "date")]
    pub recorded_at: DateTime<Utc>,
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Number of whitespace separated words in `typed`
pub fn count_words(typed: &str) -> usize {
    typed.split_whitespace().count()
}

/// Positions in `[0, len(target))` where `typed` carries the same char
pub fn count_correct_chars(target: &str, typed: &str) -> usize {
    target
        .chars()
        .zip(typed.chars())
        .filter(|(expected, actual)| expected == actual)
        .count()
}

pub fn compute_result(
    target: &str,
    typed: &str,
    elapsed_seconds: f64,
    recorded_at: DateTime<Utc>,
) -> TestResult {
    let words = count_words(typed) as f64;
    let minutes = (elapsed_seconds / 60.0).max(MIN_MINUTES);
    let wpm = words / minutes;

    let total_chars = target.chars().count();
    let accuracy = if total_chars > 0 {
        count_correct_chars(target, typed) as f64 / total_chars as f64 * 100.0
    } else {
        0.0
    };

    TestResult {
        wpm: round1(wpm),
        accuracy: round1(accuracy),
        elapsed_seconds: round1(elapsed_seconds),
        recorded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(1.04), 1.0);
        assert_eq!(round1(1.06), 1.1);
        assert_eq!(round1(59.96), 60.0);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \t "), 0);
        assert_eq!(count_words("abc"), 1);
        assert_eq!(count_words("  the quick\tbrown\n fox  "), 4);
    }

    #[test]
    fn test_count_correct_chars_stops_at_shorter() {
        assert_eq!(count_correct_chars("abc", "abc"), 3);
        assert_eq!(count_correct_chars("abc", "ab"), 2);
        assert_eq!(count_correct_chars("abc", "xbc"), 2);
        assert_eq!(count_correct_chars("abc", "abcdef"), 3);
        assert_eq!(count_correct_chars("", "abc"), 0);
    }

    #[test]
    fn test_one_word_over_a_minute() {
        let result = compute_result("abc", "abc", 60.0, at());

        assert_eq!(result.wpm, 1.0);
        assert_eq!(result.accuracy, 100.0);
        assert_eq!(result.elapsed_seconds, 60.0);
        assert_eq!(result.recorded_at, at());
    }

    #[test]
    fn test_partial_accuracy() {
        let result = compute_result("abcd", "abxd", 30.0, at());

        assert_eq!(result.accuracy, 75.0);
        assert_eq!(result.wpm, 2.0);
    }

    #[test]
    fn test_accuracy_rounds_to_one_decimal() {
        // 1 of 3 chars matches: 33.333...
        let result = compute_result("abc", "axx", 10.0, at());
        assert_eq!(result.accuracy, 33.3);
    }

    #[test]
    fn test_zero_elapsed_uses_floor() {
        let result = compute_result("hi", "hi", 0.0, at());

        assert_eq!(result.wpm, 60_000.0);
        assert_eq!(result.elapsed_seconds, 0.0);
    }

    #[test]
    fn test_empty_target_has_zero_accuracy() {
        let result = compute_result("", "", 5.0, at());

        assert_eq!(result.accuracy, 0.0);
        assert_eq!(result.wpm, 0.0);
    }

    #[test]
    fn test_elapsed_is_rounded() {
        let result = compute_result("a b", "a b", 12.345, at());
        assert_eq!(result.elapsed_seconds, 12.3);
    }

    #[test]
    fn test_deterministic() {
        let a = compute_result("the quick fox", "the quick fox", 7.25, at());
        let b = compute_result("the quick fox", "the quick fox", 7.25, at());
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounds_hold_for_varied_inputs() {
        let cases = [
            ("abc", "", 1.0),
            ("abc", "zzzzzz", 0.0),
            ("hello world", "hello world", 3.3),
            ("hello world", "   ", 100.0),
            ("ümlaut", "ümlaut", 2.0),
        ];
        for (target, typed, secs) in cases {
            let r = compute_result(target, typed, secs, at());
            assert!(r.wpm >= 0.0, "wpm for {typed:?}");
            assert!((0.0..=100.0).contains(&r.accuracy), "accuracy for {typed:?}");
        }
    }

    #[test]
    fn test_multibyte_chars_count_once() {
        let result = compute_result("héllo", "héllo", 60.0, at());
        assert_eq!(result.accuracy, 100.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let result = compute_result("abc", "abc", 60.0, at());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["wpm"], 1.0);
        assert_eq!(json["accuracy"], 100.0);
        assert_eq!(json["time"], 60.0);
        assert!(json["date"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_deserialize_elapsed_seconds_alias() {
        let json = r#"{"wpm":42.5,"accuracy":98.1,"elapsedSeconds":9.4,"date":"2024-05-01T12:00:00.000Z"}"#;
        let result: TestResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.elapsed_seconds, 9.4);
        assert_eq!(result.recorded_at, at());
    }
}

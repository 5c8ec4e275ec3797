//! Boundary-preference truncation of document text.
//!
//! Lengths are counted in characters (Unicode scalar values), never bytes,
//! so a cut can never split a code point.

/// Appended whenever content was shortened.
pub const TRUNCATION_NOTE: &str = "\n\n[Note: Document content was truncated due to length limits]";

/// Shorten `content` to at most `max_chars` characters plus [`TRUNCATION_NOTE`].
///
/// Content that already fits is returned unchanged. Otherwise the raw cut is
/// moved back to the last sentence end (`.`, kept) or, failing that, the last
/// line break (dropped), provided it lies strictly after character index
/// `max_chars - lookback`.
pub fn truncate_content(content: &str, max_chars: usize, lookback: usize) -> String {
    let Some((cut_byte, _)) = content.char_indices().nth(max_chars) else {
        return content.to_string();
    };
    let head = &content[..cut_byte];

    // The window may start before the text does when lookback > max_chars.
    let window_start = max_chars as i64 - lookback as i64;

    let mut last_period = None;
    let mut last_newline = None;
    for (index, ch) in head.chars().enumerate() {
        match ch {
            '.' => last_period = Some(index),
            '\n' => last_newline = Some(index),
            _ => {}
        }
    }

    let keep = match (last_period, last_newline) {
        (Some(p), _) if p as i64 > window_start => p + 1,
        (_, Some(n)) if n as i64 > window_start => n,
        _ => max_chars,
    };

    let mut truncated: String = head.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_NOTE);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> &str {
        text.strip_suffix(TRUNCATION_NOTE).unwrap()
    }

    #[test]
    fn short_content_unchanged() {
        assert_eq!(truncate_content("Hello.", 10, 5), "Hello.");
        assert_eq!(truncate_content("exactly10!", 10, 5), "exactly10!");
    }

    #[test]
    fn cuts_after_last_sentence_in_window() {
        let text = "First sentence. Second sentence. Third runs on and on";
        let out = truncate_content(text, 40, 20);
        assert_eq!(body(&out), "First sentence. Second sentence.");
        assert!(out.ends_with(TRUNCATION_NOTE));
    }

    #[test]
    fn period_before_window_is_ignored() {
        // Period at index 1, window starts at 20 - 5 = 15.
        let text = "A. bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
        let out = truncate_content(text, 20, 5);
        assert_eq!(body(&out).chars().count(), 20);
    }

    #[test]
    fn falls_back_to_line_break_before_it() {
        let text = "no sentence end here\nsecond line keeps going past the cap";
        let out = truncate_content(text, 30, 15);
        assert_eq!(body(&out), "no sentence end here");
    }

    #[test]
    fn period_preferred_over_later_newline() {
        let text = "Intro done. more words\nand then more past the limit";
        let out = truncate_content(text, 30, 25);
        assert_eq!(body(&out), "Intro done.");
    }

    #[test]
    fn raw_cut_without_boundary() {
        let text = "x".repeat(50);
        let out = truncate_content(&text, 20, 10);
        assert_eq!(body(&out), "x".repeat(20));
    }

    #[test]
    fn boundary_exactly_at_window_start_is_excluded() {
        // '.' at index 10 == 20 - 10, which is not strictly after the window start.
        let text = format!("{}.{}", "a".repeat(10), "b".repeat(30));
        let out = truncate_content(&text, 20, 10);
        assert_eq!(body(&out).chars().count(), 20);
    }

    #[test]
    fn lookback_larger_than_cap_searches_whole_prefix() {
        let text = format!("Hi.{}", "z".repeat(100));
        let out = truncate_content(&text, 50, 1_000);
        assert_eq!(body(&out), "Hi.");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(30);
        let out = truncate_content(&text, 10, 3);
        assert_eq!(body(&out), "é".repeat(10));
    }

    #[test]
    fn body_never_exceeds_cap() {
        let text = "Sentence one. ".repeat(5_000);
        for cap in [1, 13, 14, 999, 10_000] {
            let out = truncate_content(&text, cap, 1_000);
            assert!(body(&out).chars().count() <= cap, "cap {cap}");
        }
    }
}

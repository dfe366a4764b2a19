//! Markdown-safe truncation.
//!
//! Shortens raw markdown to a word budget before it is rendered, without
//! leaving an unpaired `**`, `*`, `` ` ``, `~~`, or a half-written link.
//!
//! Each round takes the first `n` words and checks delimiter balance. An
//! unbalanced candidate is first cut back to the last sentence end; if that
//! fails the budget shrinks geometrically. Once the budget drops below the
//! floor the full text is kept instead of emitting broken markdown.

use crate::config::{BUDGET_SHRINK_FACTOR, ELLIPSIS, SAFE_CUT_MIN_RATIO};
use crate::models::TruncationBudget;

/// Characters that end a sentence for the purpose of a safe cut.
///
/// Candidates are whitespace-collapsed, so a newline never reaches
/// [`safe_cut`].
const TERMINATORS: &[char] = &['.', '!', '?', '…'];

// =============================================================================
// Result
// =============================================================================

/// Outcome of [`truncate_markdown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Truncated {
    /// Text already fits the budget
    Unchanged,
    /// Balanced prefix, with the ellipsis already appended where required
    Cut { text: String, words: usize },
    /// No balanced prefix above the floor; keep the full text
    Fallback,
}

impl Truncated {
    /// Text to render for this outcome.
    pub fn into_text(self, original: &str) -> String {
        match self {
            Self::Cut { text, .. } => text,
            Self::Unchanged | Self::Fallback => original.to_string(),
        }
    }

    pub fn is_cut(&self) -> bool {
        matches!(self, Self::Cut { .. })
    }
}

// =============================================================================
// Delimiter Balance
// =============================================================================

/// Counts of paired markdown delimiters in a fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelimiterBalance {
    /// `**` delimiters
    pub bold: usize,
    /// Single `*` not part of `**`
    pub italic: usize,
    /// Backtick runs
    pub code: usize,
    /// `~~` delimiters
    pub strike: usize,
    pub open_brackets: usize,
    pub close_brackets: usize,
    /// `](` with no closing `)`
    pub dangling_targets: usize,
}

impl DelimiterBalance {
    /// Scan a markdown fragment.
    ///
    /// Backslash-escaped characters are skipped. Every other `*`, `~` and
    /// backtick run counts, including a lone `*` used as a bullet.
    pub fn of(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut balance = Self::default();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\\' => {
                    i += 2;
                    continue;
                }
                '*' | '~' | '`' => {
                    let run = run_length(&chars, i);
                    match c {
                        '`' => balance.code += 1,
                        '*' => {
                            balance.bold += run / 2;
                            balance.italic += run % 2;
                        }
                        _ => balance.strike += run / 2,
                    }
                    i += run;
                    continue;
                }
                '[' => balance.open_brackets += 1,
                ']' => {
                    balance.close_brackets += 1;
                    if chars.get(i + 1) == Some(&'(') && !chars[i + 2..].contains(&')') {
                        balance.dangling_targets += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        balance
    }

    pub fn is_balanced(&self) -> bool {
        self.bold % 2 == 0
            && self.italic % 2 == 0
            && self.code % 2 == 0
            && self.strike % 2 == 0
            && self.open_brackets == self.close_brackets
            && self.dangling_targets == 0
    }
}

fn run_length(chars: &[char], start: usize) -> usize {
    chars[start..].iter().take_while(|&&c| c == chars[start]).count()
}

// =============================================================================
// Truncator
// =============================================================================

/// Truncator states. `Accept` and `FallbackFull` are terminal.
enum State {
    /// Choose the next candidate from the first `limit` words
    Sizing { limit: usize },
    /// Check delimiter balance of a candidate; `after_cut` candidates end on
    /// a sentence terminator and take no ellipsis
    BalanceCheck {
        candidate: String,
        limit: usize,
        after_cut: bool,
    },
    /// Look for a sentence end to cut back to
    SafeCutSearch { candidate: String, limit: usize },
    Accept { text: String },
    FallbackFull,
}

/// Shorten markdown to at most `budget.words` words.
///
/// Whitespace runs in the result collapse to single spaces. Text that
/// already fits is returned untouched as [`Truncated::Unchanged`].
pub fn truncate_markdown(text: &str, budget: &TruncationBudget) -> Truncated {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= budget.words {
        return Truncated::Unchanged;
    }

    let floor = budget.floor.max(1);
    let mut state = State::Sizing {
        limit: budget.words,
    };

    loop {
        state = match state {
            State::Sizing { limit } if limit < floor => State::FallbackFull,
            State::Sizing { limit } => State::BalanceCheck {
                candidate: words[..limit].join(" "),
                limit,
                after_cut: false,
            },
            State::BalanceCheck {
                candidate,
                limit,
                after_cut,
            } => {
                if DelimiterBalance::of(&candidate).is_balanced() {
                    let text = if after_cut {
                        candidate
                    } else {
                        format!("{}{}", candidate.trim_end(), ELLIPSIS)
                    };
                    State::Accept { text }
                } else if after_cut {
                    tracing::debug!(limit, "cut candidate still unbalanced; shrinking budget");
                    State::Sizing {
                        limit: shrink(limit),
                    }
                } else {
                    State::SafeCutSearch { candidate, limit }
                }
            }
            State::SafeCutSearch { candidate, limit } => match safe_cut(&candidate) {
                Some(cut) => State::BalanceCheck {
                    candidate: cut,
                    limit,
                    after_cut: true,
                },
                None => {
                    tracing::debug!(limit, "no safe cut point; shrinking budget");
                    State::Sizing {
                        limit: shrink(limit),
                    }
                }
            },
            State::Accept { text } => {
                let words = text.split_whitespace().count();
                return Truncated::Cut { text, words };
            }
            State::FallbackFull => {
                tracing::warn!(
                    budget = budget.words,
                    floor,
                    "no balanced truncation above floor; keeping full text"
                );
                return Truncated::Fallback;
            }
        };
    }
}

/// Convenience wrapper returning the text to render.
pub fn truncate_preview(text: &str, budget: &TruncationBudget) -> String {
    truncate_markdown(text, budget).into_text(text)
}

fn shrink(limit: usize) -> usize {
    (limit as f64 * BUDGET_SHRINK_FACTOR).floor() as usize
}

/// Cut back to the last sentence end in the tail of `candidate`.
///
/// Only terminators at or after [`SAFE_CUT_MIN_RATIO`] of the candidate's
/// length (in code points) qualify. The cut keeps the terminator.
fn safe_cut(candidate: &str) -> Option<String> {
    let total = candidate.chars().count();
    let min_pos = (total as f64 * SAFE_CUT_MIN_RATIO).ceil() as usize;

    let (_, (byte, c)) = candidate
        .char_indices()
        .enumerate()
        .filter(|(pos, (_, c))| *pos >= min_pos && TERMINATORS.contains(c))
        .last()?;

    Some(candidate[..byte + c.len_utf8()].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(words: usize, floor: usize) -> TruncationBudget {
        TruncationBudget::new(words, floor).unwrap()
    }

    fn numbered(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|n| format!("w{}", n)).collect()
    }

    #[test]
    fn test_short_text_unchanged() {
        let text = "Hello   **world**\n\n- one\n- two";
        assert_eq!(truncate_markdown(text, &budget(50, 5)), Truncated::Unchanged);
        assert_eq!(truncate_preview(text, &budget(50, 5)), text);
    }

    #[test]
    fn test_empty_text_unchanged() {
        assert_eq!(truncate_markdown("", &budget(50, 5)), Truncated::Unchanged);
        assert_eq!(truncate_preview("", &budget(50, 5)), "");
    }

    #[test]
    fn test_balanced_cut_gets_ellipsis() {
        let text = numbered(1..=80).join(" ");
        let result = truncate_markdown(&text, &budget(50, 5));
        let expected = format!("{}...", numbered(1..=50).join(" "));
        assert_eq!(
            result,
            Truncated::Cut {
                text: expected,
                words: 50
            }
        );
    }

    #[test]
    fn test_whitespace_collapsed() {
        let text = "a\n\nb   c\td e f";
        assert_eq!(truncate_preview(text, &budget(3, 1)), "a b c...");
    }

    #[test]
    fn test_unbalanced_bold_at_budget_edge() {
        let mut words = numbered(1..=49);
        words.push("**bold".to_string());
        words.push("phrase**".to_string());
        words.extend(numbered(52..=80));
        let text = words.join(" ");
        assert_eq!(text.split_whitespace().count(), 80);

        let preview = truncate_preview(&text, &budget(50, 5));
        assert_eq!(preview.matches("**").count() % 2, 0);
        assert_eq!(preview, format!("{}...", numbered(1..=40).join(" ")));
    }

    #[test]
    fn test_safe_cut_at_sentence_end() {
        let mut words = numbered(1..=44);
        words.push("end.".to_string());
        words.extend(numbered(46..=47));
        words.push("**open".to_string());
        words.extend(numbered(49..=54));
        words.push("close**".to_string());
        words.extend(numbered(56..=60));
        let text = words.join(" ");

        let result = truncate_markdown(&text, &budget(50, 5));
        let Truncated::Cut { text: cut, words } = result else {
            panic!("expected a cut, got {:?}", result);
        };
        assert!(cut.ends_with("end."));
        assert!(!cut.ends_with(ELLIPSIS));
        assert_eq!(words, 45);
    }

    #[test]
    fn test_fallback_to_full_text() {
        let mut words = vec!["**never".to_string()];
        words.extend(numbered(2..=59));
        words.push("closed**".to_string());
        let text = words.join(" ");

        assert_eq!(truncate_markdown(&text, &budget(50, 5)), Truncated::Fallback);
        assert_eq!(truncate_preview(&text, &budget(50, 5)), text);
    }

    #[test]
    fn test_link_not_split() {
        let mut words = numbered(1..=48);
        words.push("[my".to_string());
        words.push("site](https://example.com/)".to_string());
        words.extend(numbered(51..=70));
        let text = words.join(" ");

        let preview = truncate_preview(&text, &budget(49, 5));
        let balance = DelimiterBalance::of(&preview);
        assert!(balance.is_balanced());
        assert!(!preview.contains("[my"));
    }

    #[test]
    fn test_balance_counts() {
        let balance = DelimiterBalance::of("**a** *b* `c` ~~d~~ [e](f)");
        assert_eq!(balance.bold, 2);
        assert_eq!(balance.italic, 2);
        assert_eq!(balance.code, 2);
        assert_eq!(balance.strike, 2);
        assert!(balance.is_balanced());
    }

    #[test]
    fn test_balance_triple_star() {
        assert!(DelimiterBalance::of("***both***").is_balanced());
        assert!(!DelimiterBalance::of("***both").is_balanced());
    }

    #[test]
    fn test_balance_unbalanced_kinds() {
        assert!(!DelimiterBalance::of("**open").is_balanced());
        assert!(!DelimiterBalance::of("*open").is_balanced());
        assert!(!DelimiterBalance::of("`open").is_balanced());
        assert!(!DelimiterBalance::of("~~open").is_balanced());
        assert!(!DelimiterBalance::of("[open").is_balanced());
        assert!(!DelimiterBalance::of("[label](https://x").is_balanced());
    }

    #[test]
    fn test_balance_brackets_without_target() {
        assert!(DelimiterBalance::of("see [1] and [2]").is_balanced());
    }

    #[test]
    fn test_balance_skips_escapes() {
        assert!(DelimiterBalance::of(r"2 \* 3 = 6").is_balanced());
        assert!(DelimiterBalance::of(r"\*\*not bold\*\* \~~ \`").is_balanced());
    }

    #[test]
    fn test_balance_counts_free_standing_runs() {
        assert!(!DelimiterBalance::of("a ** b").is_balanced());
        assert!(!DelimiterBalance::of("* one * two * three").is_balanced());
        assert!(!DelimiterBalance::of("x ~~ y").is_balanced());
    }

    #[test]
    fn test_lone_bold_marker_never_survives_cut() {
        let mut words = numbered(1..=30);
        words.push("**".to_string());
        words.extend(numbered(32..=80));
        let text = words.join(" ");

        let result = truncate_markdown(&text, &budget(50, 5));
        assert!(result.is_cut());
        let preview = result.into_text(&text);
        assert_eq!(preview.matches("**").count() % 2, 0);
        assert_eq!(preview, format!("{}...", numbered(1..=25).join(" ")));
    }

    #[test]
    fn test_safe_cut_requires_tail_position() {
        assert_eq!(safe_cut("Hi. this is a much longer tail"), None);
        assert_eq!(
            safe_cut("this is a long sentence. short"),
            Some("this is a long sentence.".to_string())
        );
        assert_eq!(
            safe_cut("a question nobody asked? maybe"),
            Some("a question nobody asked?".to_string())
        );
    }

    #[test]
    fn test_shrink_is_strictly_decreasing() {
        for limit in 1..200 {
            assert!(shrink(limit) < limit);
        }
    }
}

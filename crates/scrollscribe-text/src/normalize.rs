// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text normalizer: cleans one band's raw OCR output.

use tracing::trace;

use crate::rules::{NOISE_RULES, RuleAction, is_stripped_symbol};

/// Lines where more than this share of non-whitespace characters is
/// non-alphanumeric are treated as border/icon noise.
pub const MAX_SYMBOL_RATIO: f64 = 0.7;

/// Clean raw OCR text.
///
/// Removes emoji and decorative symbols, collapses whitespace, drops
/// UI-chrome artifacts and symbol-dominated lines, and squeezes blank-line
/// runs. Surviving lines keep their relative order. `normalize` is
/// idempotent and never increases the line count.
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|&c| !is_stripped_symbol(c)).collect();

    let mut kept: Vec<String> = Vec::new();
    for line in stripped.lines() {
        let collapsed = collapse_whitespace(line);
        if collapsed.is_empty() {
            push_blank(&mut kept);
            continue;
        }

        let Some(cleaned) = apply_noise_rules(collapsed) else {
            continue;
        };
        if is_symbol_noise(&cleaned) {
            trace!(line = %cleaned, "Dropping symbol-dominated line");
            continue;
        }
        kept.push(cleaned);
    }

    kept.join("\n").trim().to_string()
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Consecutive blank lines collapse to one.
fn push_blank(kept: &mut Vec<String>) {
    if kept.last().is_some_and(|l| !l.is_empty()) {
        kept.push(String::new());
    }
}

/// Run the artifact table over a non-empty line. `None` means drop it.
fn apply_noise_rules(mut line: String) -> Option<String> {
    for rule in NOISE_RULES.iter() {
        if !rule.pattern.is_match(&line) {
            continue;
        }
        match rule.action {
            RuleAction::DropLine => {
                trace!(rule = rule.name, line = %line, "Dropping artifact line");
                return None;
            }
            RuleAction::StripMatch => {
                line = rule.pattern.replace_all(&line, "").trim().to_string();
                if line.is_empty() {
                    return None;
                }
            }
        }
    }
    Some(line)
}

/// Symbol-dominated, or a lone non-alphanumeric character.
///
/// `char::is_alphanumeric` is Unicode-aware, so CJK, Cyrillic, accented
/// Latin and other scripts all count as content.
fn is_symbol_noise(line: &str) -> bool {
    let mut total = 0usize;
    let mut symbols = 0usize;
    for c in line.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if !c.is_alphanumeric() {
            symbols += 1;
        }
    }
    if total == 0 {
        return false;
    }
    if total == 1 && symbols == 1 {
        return true;
    }
    symbols as f64 / total as f64 > MAX_SYMBOL_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_emoji_and_collapses_spaces() {
        assert_eq!(
            normalize("Loved   it 😍😍  so\tmuch 🔥"),
            "Loved it so much"
        );
    }

    #[test]
    fn drops_symbol_dominated_lines() {
        let raw = "Great service\n|||--==|||\n* \nReally fast delivery";
        assert_eq!(normalize(raw), "Great service\nReally fast delivery");
    }

    #[test]
    fn keeps_punctuated_but_wordy_lines() {
        let raw = "Price: $12.99 (incl. tax)";
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn non_latin_scripts_are_content() {
        let raw = "とても良いホテルでした。\nОчень хорошо!\nÉtait très bien";
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn single_symbol_lines_are_dropped() {
        assert_eq!(normalize("first\n•\nsecond\n-\nthird"), "first\nsecond\nthird");
        // A single alphanumeric character is kept.
        assert_eq!(normalize("first\nA\nsecond"), "first\nA\nsecond");
    }

    #[test]
    fn ui_chrome_is_removed() {
        let raw = "Amazing room with a view\nSee more ›\nHelpful\nReport\nThe breakfast was fine >";
        assert_eq!(
            normalize(raw),
            "Amazing room with a view\nThe breakfast was fine"
        );
    }

    #[test]
    fn blank_runs_collapse_and_edges_trim() {
        let raw = "\n\n  first  \n\n\n\n second\n   \n\n";
        assert_eq!(normalize(raw), "first\n\nsecond");
    }

    #[test]
    fn removed_noise_does_not_leave_double_blanks() {
        let raw = "first\n\n😀\n\nsecond";
        assert_eq!(normalize(raw), "first\n\nsecond");
    }

    #[test]
    fn empty_and_noise_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("👍👍\n>>\n***"), "");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "(?s)[a-zA-Z0-9 \t\n.,!?>›»*#|😀🔥é日-]{0,200}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn line_count_never_increases(raw in "(?s)[a-zA-Z0-9 \t\n.,!?>›»*#|😀🔥é日-]{0,200}") {
            prop_assert!(normalize(&raw).lines().count() <= raw.lines().count());
        }
    }
}

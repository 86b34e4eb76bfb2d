// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Noise rule tables: the filtering policy applied to raw OCR lines.
//
// Both tables are plain data. `normalize` walks them in order; adding a
// rule never requires touching the normalizer itself.

use std::sync::LazyLock;

use regex::Regex;

/// An inclusive range of code points removed before line processing.
#[derive(Debug, Clone, Copy)]
pub struct SymbolRange {
    pub first: char,
    pub last: char,
    pub name: &'static str,
}

impl SymbolRange {
    pub fn contains(&self, c: char) -> bool {
        (self.first..=self.last).contains(&c)
    }
}

/// Emoji, pictograph, and decorative symbol blocks.
///
/// Guillemets and arrows used as "more" markers are deliberately absent;
/// the artifact rules handle those positionally.
pub const SYMBOL_RANGES: &[SymbolRange] = &[
    SymbolRange { first: '\u{200D}', last: '\u{200D}', name: "zero width joiner" },
    SymbolRange { first: '\u{20E3}', last: '\u{20E3}', name: "combining keycap" },
    SymbolRange { first: '\u{2190}', last: '\u{21FF}', name: "arrows" },
    SymbolRange { first: '\u{2300}', last: '\u{23FF}', name: "misc technical" },
    SymbolRange { first: '\u{25A0}', last: '\u{25FF}', name: "geometric shapes" },
    SymbolRange { first: '\u{2600}', last: '\u{26FF}', name: "misc symbols" },
    SymbolRange { first: '\u{2700}', last: '\u{27BF}', name: "dingbats" },
    SymbolRange { first: '\u{2B00}', last: '\u{2BFF}', name: "misc symbols and arrows" },
    SymbolRange { first: '\u{FE00}', last: '\u{FE0F}', name: "variation selectors" },
    SymbolRange { first: '\u{1F000}', last: '\u{1F2FF}', name: "game pieces and enclosed supplements" },
    SymbolRange { first: '\u{1F300}', last: '\u{1F5FF}', name: "misc symbols and pictographs" },
    SymbolRange { first: '\u{1F600}', last: '\u{1F64F}', name: "emoticons" },
    SymbolRange { first: '\u{1F680}', last: '\u{1F6FF}', name: "transport and map" },
    SymbolRange { first: '\u{1F700}', last: '\u{1F7FF}', name: "geometric shapes extended" },
    SymbolRange { first: '\u{1F900}', last: '\u{1F9FF}', name: "supplemental symbols and pictographs" },
    SymbolRange { first: '\u{1FA70}', last: '\u{1FAFF}', name: "symbols and pictographs extended-a" },
];

pub fn is_stripped_symbol(c: char) -> bool {
    SYMBOL_RANGES.iter().any(|range| range.contains(c))
}

/// What a matching noise rule does to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Remove the matched text and keep the rest of the line.
    StripMatch,
    /// Remove the whole line.
    DropLine,
}

#[derive(Debug)]
pub struct NoiseRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub action: RuleAction,
}

/// Artifact rules, applied in order to each trimmed line.
///
/// Order matters: marker-only lines are dropped before trailing markers are
/// stripped, and UI keywords are checked after stripping so "See more ›"
/// is caught.
pub static NOISE_RULES: LazyLock<Vec<NoiseRule>> = LazyLock::new(|| {
    vec![
        NoiseRule {
            name: "marker_only",
            pattern: Regex::new(r"^(?:\s*[>›»])+\s*$").unwrap(),
            action: RuleAction::DropLine,
        },
        NoiseRule {
            name: "trailing_marker",
            pattern: Regex::new(r"(?:\s*[>›»])+\s*$").unwrap(),
            action: RuleAction::StripMatch,
        },
        NoiseRule {
            name: "ui_keyword",
            pattern: Regex::new(
                r"(?i)^(?:see more|read more|show more|see less|show less|more|less|helpful|not helpful|report|report abuse|reply|replies|translate|see translation|like|share|follow)[.!:]?$",
            )
            .unwrap(),
            action: RuleAction::DropLine,
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static NoiseRule {
        NOISE_RULES.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn symbol_ranges_are_well_formed() {
        for range in SYMBOL_RANGES {
            assert!(range.first <= range.last, "{} is inverted", range.name);
        }
        for pair in SYMBOL_RANGES.windows(2) {
            assert!(
                pair[0].last < pair[1].first,
                "{} overlaps or is out of order with {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn emoji_are_stripped_but_text_is_not() {
        for c in ['😀', '🔥', '👍', '⭐', '❤', '✅', '\u{FE0F}', '🚀', '🥰'] {
            assert!(is_stripped_symbol(c), "{c:?} should be stripped");
        }
        for c in ['a', 'Z', '7', 'é', '日', 'ж', '.', '!', '›', '»', '>'] {
            assert!(!is_stripped_symbol(c), "{c:?} should be kept");
        }
    }

    #[test]
    fn marker_only_rule() {
        let r = rule("marker_only");
        assert_eq!(r.action, RuleAction::DropLine);
        assert!(r.pattern.is_match(">"));
        assert!(r.pattern.is_match("› »"));
        assert!(!r.pattern.is_match("next >"));
        assert!(!r.pattern.is_match(""));
    }

    #[test]
    fn trailing_marker_rule() {
        let r = rule("trailing_marker");
        assert_eq!(r.action, RuleAction::StripMatch);
        assert_eq!(r.pattern.replace("Great product >", ""), "Great product");
        assert_eq!(r.pattern.replace("Read reviews › »", ""), "Read reviews");
        assert_eq!(r.pattern.replace("5 > 3 is true", ""), "5 > 3 is true");
    }

    #[test]
    fn ui_keyword_rule() {
        let r = rule("ui_keyword");
        assert_eq!(r.action, RuleAction::DropLine);
        for line in ["See more", "READ MORE", "Helpful", "Report", "Reply", "Translate", "Like", "Share."] {
            assert!(r.pattern.is_match(line), "{line:?} should match");
        }
        for line in ["See more photos of the hotel", "I would like this again", "Helpful staff"] {
            assert!(!r.pattern.is_match(line), "{line:?} should not match");
        }
    }
}

//! Unicode folding and whitespace cleanup applied to every raw span
//! before classification.
//!
//! Extractors emit ligatures (`ﬁ`, `ﬂ`), accented glyphs, and stray
//! control characters that would defeat the substring matching the
//! ranking engine relies on. Folding happens in three passes: an explicit
//! map for letters NFKD cannot decompose, NFKD decomposition with
//! combining marks dropped, and a control-character strip.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// ASCII fallback for letters without an NFKD decomposition.
fn fold_special(c: char) -> Option<&'static str> {
    Some(match c {
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'ß' => "ss",
        'Ł' => "L",
        'ł' => "l",
        'Đ' => "D",
        'đ' => "d",
        'Ø' => "O",
        'ø' => "o",
        'Þ' => "Th",
        'þ' => "th",
        'Ŋ' => "N",
        'ŋ' => "n",
        _ => return None,
    })
}

/// Fold a raw span's text to plain ASCII-ish form.
///
/// Ligatures such as `ﬁ` decompose under NFKD; accents become combining
/// marks and are dropped. Control characters other than tab, newline, and
/// carriage return are removed.
pub fn fold_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(repl) = fold_special(c) {
            folded.push_str(repl);
        } else {
            folded.push(c);
        }
    }

    folded
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Collapse runs of spaces and tabs, trim each line, and drop blank lines.
pub fn collapse_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }
    lines.join("\n")
}

/// Full normalization: fold, then clean whitespace.
pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(&fold_text(text))
}

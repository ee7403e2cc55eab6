use std::collections::HashSet;

use super::normalizer::{clean_title_for_search, SEPARATOR_CHARS};

/// Hard cap on generated variants; bounds worst-case probe latency/cost.
pub const MAX_VARIANTS: usize = 15;

/// Words too generic to anchor a core-keyword query.
const CORE_STOPWORDS: [&str; 5] = ["the", "and", "for", "with", "from"];

/// Generate an ordered, deduplicated list of up to [`MAX_VARIANTS`] search
/// strings for one raw title, highest priority first.
///
/// The catalog only does keyword/substring search, so structurally diverse
/// probes (cleaned full title, separator-truncated, word-windowed, core
/// keywords) give it several angles on the same game. Variants of one
/// character or less are skipped.
pub fn generate_variants(raw_title: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let push = |candidate: &str, variants: &mut Vec<String>, seen: &mut HashSet<String>| {
        let candidate = candidate.trim();
        if candidate.chars().count() > 1 && seen.insert(candidate.to_string()) {
            variants.push(candidate.to_string());
        }
    };

    let cleaned = clean_title_for_search(raw_title);

    // 1. Cleaned full title, 2. the raw title itself when it differs.
    push(&cleaned, &mut variants, &mut seen);
    if raw_title.trim() != cleaned {
        push(raw_title, &mut variants, &mut seen);
    }

    // 3. Everything before the first separator.
    if let Some(pos) = cleaned.find(&SEPARATOR_CHARS[..]) {
        let head = cleaned[..pos].trim();
        if head != cleaned && head.chars().count() > 2 {
            push(head, &mut variants, &mut seen);
        }
    }

    // 4. Cleaned title with a trailing run of digits removed.
    let no_digits = cleaned
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end();
    if no_digits != cleaned && no_digits.chars().count() > 2 {
        push(no_digits, &mut variants, &mut seen);
    }

    // 5. Word windows.
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1 {
        push(&words[1..].join(" "), &mut variants, &mut seen);
        push(&words[..words.len() - 1].join(" "), &mut variants, &mut seen);

        if words.len() > 2 {
            push(&words[..2].join(" "), &mut variants, &mut seen);
            push(&words[words.len() - 2..].join(" "), &mut variants, &mut seen);
        }
    }

    // 6. Core keywords: longest informative words win.
    let mut keywords: Vec<&str> = words
        .iter()
        .filter(|w| w.chars().count() > 3 && !CORE_STOPWORDS.contains(&w.to_lowercase().as_str()))
        .copied()
        .collect();
    keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    keywords.truncate(3);
    if !keywords.is_empty() {
        push(&keywords.join(" "), &mut variants, &mut seen);
    }

    variants.truncate(MAX_VARIANTS);
    variants
}

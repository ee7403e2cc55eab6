use regex::Regex;
use std::sync::OnceLock;

/// Standalone words dropped by the comparison normalizer.
const ARTICLES: [&str; 3] = ["the", "a", "an"];
const EDITION_WORDS: [&str; 6] = [
    "edition",
    "deluxe",
    "goty",
    "complete",
    "ultimate",
    "remastered",
];

/// End-anchored suffixes stripped by the search cleaner, longest first so a
/// phrase wins over its own tail ("game of the year edition" before "goty").
const TRAILING_SUFFIXES: &[&str] = &[
    "game of the year edition",
    "game of the year",
    "collector's edition",
    "anniversary edition",
    "definitive edition",
    "enhanced edition",
    "complete edition",
    "ultimate edition",
    "standard edition",
    "digital deluxe edition",
    "deluxe edition",
    "special edition",
    "gold edition",
    "goty edition",
    "goty",
    "director's cut",
    "directors cut",
    "early access",
    "full game",
    "remastered",
    "remaster",
    "demo",
    "beta",
    "trial",
];

/// Characters treated as title separators (colon, hyphen, en dash, em dash).
pub(crate) const SEPARATOR_CHARS: [char; 4] = [':', '-', '\u{2013}', '\u{2014}'];

struct Normalizer {
    separators: Regex,
    trailing_bracket: Regex,
}

impl Normalizer {
    fn new() -> Self {
        Self {
            separators: Regex::new(r"[:\-\u{2013}\u{2014}]").expect("valid separator regex"),
            trailing_bracket: Regex::new(r"\s*(\([^)]*\)|\[[^\]]*\])\s*$")
                .expect("valid bracket regex"),
        }
    }
}

fn normalizer() -> &'static Normalizer {
    static NORMALIZER: OnceLock<Normalizer> = OnceLock::new();
    NORMALIZER.get_or_init(Normalizer::new)
}

/// Normalize a raw title into its canonical comparison form.
///
/// Lowercase, strip trademark glyphs, turn separators into spaces, collapse
/// whitespace, drop standalone articles and edition words, trim. Total on any
/// input; never stored, recomputed on demand.
pub fn normalize_title(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let no_glyphs = lowered.replace(['\u{2122}', '\u{00ae}', '\u{00a9}'], "");
    let spaced = normalizer().separators.replace_all(&no_glyphs, " ");

    spaced
        .split_whitespace()
        .filter(|w| !ARTICLES.contains(w) && !EDITION_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stricter cleaner applied before generating search variants.
///
/// On top of lowercasing and glyph removal it rewrites `&`/`+` into words,
/// removes trailing parenthetical/bracketed segments, and strips end-anchored
/// edition/platform/status suffixes until a fixpoint, trimming any separator
/// left dangling. Internal separators are preserved for the variant
/// generator. Idempotent: re-cleaning its own output is a no-op.
pub fn clean_title_for_search(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut s = lowered.replace(['\u{2122}', '\u{00ae}', '\u{00a9}'], "");
    s = s.replace('&', " and ");
    s = s.replace('+', " plus ");
    s = collapse_whitespace(&s);

    loop {
        let before = s.clone();

        s = normalizer().trailing_bracket.replace(&s, "").into_owned();
        s = s.trim_end_matches(|c: char| c.is_whitespace() || SEPARATOR_CHARS.contains(&c))
            .to_string();
        s = strip_trailing_suffix(&s);
        s = collapse_whitespace(&s);

        if s == before {
            break;
        }
    }

    s.trim().to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove one end-anchored suffix word/phrase, if present behind a word
/// boundary. Never empties the whole title.
fn strip_trailing_suffix(s: &str) -> String {
    for suffix in TRAILING_SUFFIXES {
        if s.len() > suffix.len() && s.ends_with(suffix) {
            let head = &s[..s.len() - suffix.len()];
            if head.ends_with(|c: char| !c.is_alphanumeric()) {
                return head.trim_end().to_string();
            }
        }
    }
    s.to_string()
}

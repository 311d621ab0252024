//! Organization name cleanup ahead of search.

use regex::Regex;
use std::sync::LazyLock;

/// Checked in order, each at most once. A name ending in two of these keeps
/// whichever one was checked first.
pub const ORGANIZATION_SUFFIXES: [&str; 8] = [
    " Inc",
    " LLC",
    " Corporation",
    " Corp",
    " Foundation",
    " Founda",
    " Trust",
    " Private",
];

const QUOTE_CHARS: &[char] = &['"', '\'', '\u{201C}', '\u{201D}'];

const APOSTROPHE_VARIANTS: &[char] = &['\u{2019}', '\u{2018}', '\u{02BC}', '\u{00B4}', '`'];

static DISALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{Alphabetic}\p{N}\s&'\-]")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// Clean a raw organization name into a search-friendly form.
///
/// Suffixes are matched against the trimmed input, before punctuation is
/// removed, so `"Acme Inc."` keeps its `Inc`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = trim_quotes(raw);
    if trimmed.is_empty() {
        return String::new();
    }

    let stripped = strip_suffixes(trimmed);
    let canonical: String = stripped
        .chars()
        .map(|c| if APOSTROPHE_VARIANTS.contains(&c) { '\'' } else { c })
        .collect();
    let cleaned = DISALLOWED_CHARS.replace_all(&canonical, "");
    let collapsed = WHITESPACE_RUN.replace_all(cleaned.trim(), " ");

    trim_quotes(&collapsed).to_string()
}

fn trim_quotes(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c))
}

fn strip_suffixes(name: &str) -> String {
    let mut current = name.to_string();
    for suffix in ORGANIZATION_SUFFIXES {
        if let Some(cut) = suffix_start(&current, suffix) {
            current.truncate(cut);
            current.truncate(current.trim_end().len());
        }
    }
    current
}

fn suffix_start(name: &str, suffix: &str) -> Option<usize> {
    let cut = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(cut) {
        return None;
    }
    name[cut..].eq_ignore_ascii_case(suffix).then_some(cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_common_suffixes_case_insensitively() {
        assert_eq!(normalize("Acme Inc"), "Acme");
        assert_eq!(normalize("ACME LLC"), "ACME");
        assert_eq!(normalize("Acme   Inc"), "Acme");
        assert_eq!(normalize("The Ford foundation"), "The Ford");
        assert_eq!(normalize("Hewlett Packard Founda"), "Hewlett Packard");
        assert_eq!(normalize("Tata Private"), "Tata");
    }

    #[test]
    fn trailing_punctuation_hides_the_suffix() {
        assert_eq!(normalize("Acme Trust!"), "Acme Trust");
        assert_eq!(normalize("Acme Inc."), "Acme Inc");
        assert_eq!(normalize("Acme, Inc."), "Acme Inc");
    }

    #[test]
    fn suffix_must_follow_a_space() {
        assert_eq!(normalize("Foundation"), "Foundation");
        assert_eq!(normalize("Zinc"), "Zinc");
    }

    #[test]
    fn stacked_suffixes_follow_list_order() {
        // " Foundation" is checked before " Trust", so only " Trust" goes.
        assert_eq!(normalize("Gates Foundation Trust"), "Gates Foundation");
        // " Inc" was already checked when " Corporation" goes, so it stays.
        assert_eq!(normalize("Acme Inc Corporation"), "Acme Inc");
        assert_eq!(normalize("Acme Corporation Trust"), "Acme Corporation");
        assert_eq!(normalize("Acme Trust Inc"), "Acme");
    }

    #[test]
    fn trims_whitespace_and_quotes() {
        assert_eq!(normalize("  \"Kresge\"  "), "Kresge");
        assert_eq!(normalize("'Kresge'"), "Kresge");
        assert_eq!(normalize("\u{201C}Kresge\u{201D}"), "Kresge");
    }

    #[test]
    fn canonicalizes_apostrophes_and_drops_symbols() {
        assert_eq!(normalize("Children\u{2019}s Fund"), "Children's Fund");
        assert_eq!(normalize("Children`s Fund"), "Children's Fund");
        assert_eq!(normalize("Arts & Culture (NYC)!"), "Arts & Culture NYC");
        assert_eq!(normalize("Smith-Jones #1 Fund"), "Smith-Jones 1 Fund");
        assert_eq!(normalize("Fondation Émile"), "Fondation Émile");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("Robert   Wood\tJohnson\n Fund"), "Robert Wood Johnson Fund");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("\"\""), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "Acme LLC",
            "  \"The Kresge Foundation\" ",
            "#'Quoted after symbol",
            "Children\u{2019}s Hospital Trust",
            "Arts & Culture (NYC)!",
            "a  -  b",
            "'' Inc",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }
}

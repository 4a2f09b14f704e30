use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref METRO: Regex = Regex::new(r"\b(PARIS|LYON|MARSEILLE)\b").unwrap();
}

/// Normalize a city/commune name so that the two source datasets agree
/// on spelling. Steps, in order: uppercase, collapse arrondissement-level
/// names to the parent commune, strip accents, hyphens to spaces, expand
/// the ST/STE abbreviations. Applying it twice gives the same result.
pub fn normalize_city(raw: &str) -> String {
    let mut name = raw.to_uppercase();
    // "PARIS 1ER ARRONDISSEMENT", "LYON-7E" etc. carry more granularity
    // than the communes reference; keep the bare commune name only.
    if let Some(caps) = METRO.captures(&name) {
        name = caps[1].to_string();
    }
    name = strip_diacritics(&name);
    name = name.replace('-', " ");
    name.split_whitespace()
        .map(|token| match token {
            "ST" | "STE" => "SAINT",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fold accented latin letters to their base letter, e.g. é -> e, ç -> c.
fn strip_diacritics(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

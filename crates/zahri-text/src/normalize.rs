use std::collections::BTreeSet;

/// Apostrophe glyphs seen in Uzbek Latin text. The ASCII form comes first.
pub const APOSTROPHE_VARIANTS: [char; 6] = ['\'', '’', 'ʼ', '‘', '′', '`'];

fn canonical_apostrophe(c: char) -> char {
    if APOSTROPHE_VARIANTS[1..].contains(&c) {
        '\''
    } else {
        c
    }
}

/// Replace every apostrophe-like glyph with the ASCII apostrophe.
pub fn normalize_apostrophes(text: &str) -> String {
    text.chars().map(canonical_apostrophe).collect()
}

/// Canonical form of a word for frequency counting.
///
/// Apostrophes are unified, the word is lowercased, anything that is not a
/// letter, digit or apostrophe is dropped, and leading/trailing apostrophes
/// are trimmed. Pure punctuation yields an empty string.
pub fn cleanse(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars().map(canonical_apostrophe) {
        for lower in c.to_lowercase() {
            if lower == '\'' || lower.is_alphanumeric() {
                out.push(lower);
            }
        }
    }
    out.trim_matches('\'').to_string()
}

/// Spellings of `query` covering every apostrophe glyph, for storage-side
/// substring filtering.
///
/// Every apostrophe position is expanded independently, so the set holds all
/// glyph combinations (the query itself and its ASCII form among them) and a
/// text mixing glyphs inside one word still matches one of the spellings.
pub fn query_variants(query: &str) -> BTreeSet<String> {
    let mut variants = BTreeSet::new();
    if query.is_empty() {
        return variants;
    }
    let mut partials = vec![String::with_capacity(query.len())];
    for c in query.chars() {
        if APOSTROPHE_VARIANTS.contains(&c) {
            partials = partials
                .into_iter()
                .flat_map(|prefix| {
                    APOSTROPHE_VARIANTS.into_iter().map(move |glyph| {
                        let mut next = prefix.clone();
                        next.push(glyph);
                        next
                    })
                })
                .collect();
        } else {
            for prefix in &mut partials {
                prefix.push(c);
            }
        }
    }
    variants.extend(partials);
    variants
}

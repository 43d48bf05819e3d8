// src/recommendations/keywords.rs
use std::collections::HashMap;

pub const MAX_KEYWORDS: usize = 5;
const MIN_KEYWORD_LEN: usize = 4;

/// Lower-cased words longer than three characters.
pub fn significant_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
}

/// Most frequent significant words across past position titles. Equal
/// counts keep first-seen order.
pub fn extract_keywords<'a, I>(positions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for position in positions {
        for word in significant_words(position) {
            let count = counts.entry(word.clone()).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }
    }

    // sort_by is stable
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(MAX_KEYWORDS);
    order
}

/// First role, else first keyword, else the fallback; the top keyword is
/// prepended when the query does not already mention it.
pub fn build_query(roles: &[String], keywords: &[String], fallback: &str) -> String {
    let base = roles
        .iter()
        .map(|role| role.trim())
        .find(|role| !role.is_empty())
        .or_else(|| keywords.first().map(String::as_str))
        .unwrap_or(fallback)
        .to_string();

    match keywords.first() {
        Some(top) if !base.to_lowercase().contains(top.as_str()) => format!("{} {}", top, base),
        _ => base,
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

/// Fold the Spanish accented letters used in article titles to ASCII.
pub fn fold_accents(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' | 'ü' | 'Ü' => 'u',
            'ñ' | 'Ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Build the default article slug: `YYYY/MM/DD/<slugified title>`.
///
/// Date parts are taken in UTC.
pub fn generate_slug(title: &str, date: DateTime<Utc>) -> String {
    let mut slugified = String::with_capacity(title.len());
    for c in fold_accents(title).to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slugified.push(c);
        } else if !slugified.ends_with('-') {
            slugified.push('-');
        }
    }
    let slugified = slugified.trim_matches('-');

    format!(
        "{:04}/{:02}/{:02}/{}",
        date.year(),
        date.month(),
        date.day(),
        slugified
    )
}

/// Normalize a tag for URLs and aggregation (kebab case).
///
/// Words are split on anything non-alphanumeric and on lower-to-upper case
/// transitions, so `"Sistema Solar"`, `"sistema-solar"` and `"SistemaSolar"`
/// all become `sistema-solar`.
pub fn tag_slug(tag: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in fold_accents(tag).chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}

/// GitHub-style heading slugger with per-document collision tracking.
///
/// The first `"Intro"` becomes `intro`, the second `intro-1`, and so on.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug `value`, suffixing it if an identical slug was already handed out.
    pub fn slug(&mut self, value: &str) -> String {
        let original = github_slug(value);
        let mut slug = original.clone();

        while self.occurrences.contains_key(&slug) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            slug = format!("{original}-{count}");
        }
        self.occurrences.insert(slug.clone(), 0);

        slug
    }

    pub fn reset(&mut self) {
        self.occurrences.clear();
    }
}

/// Lowercase, strip punctuation, turn each space into a hyphen.
fn github_slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

//! Case conversion and English inflection.

/// Words whose singular and plural forms are identical.
const UNCOUNTABLE: &[&str] = &[
    "data", "equipment", "fish", "information", "media", "metadata", "money", "news",
    "series", "sheep", "species", "staff",
];

/// Irregular (singular, plural) pairs.
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Singular words ending in `s` that must not lose it.
const SINGULAR_S_SUFFIXES: &[&str] = &["ss", "us", "is"];

/// Plural words ending in `uses` whose singular keeps the `e`.
const USE_WORDS: &[&str] = &["abuse", "cause", "clause", "excuse", "fuse", "house", "muse", "pause", "use"];

/// Converts a snake_case name to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    s.split(['_', '-'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Converts a PascalCase or camelCase name to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if c == '-' {
            result.push('_');
        } else {
            result.push(c);
        }
    }
    result
}

/// Converts a name to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Converts a snake_case name to kebab-case.
pub fn to_kebab_case(s: &str) -> String {
    to_snake_case(s).replace('_', "-")
}

/// Pluralizes the last word of a snake_case name.
pub fn pluralize(name: &str) -> String {
    map_last_word(name, pluralize_word)
}

/// Singularizes the last word of a snake_case name.
pub fn singularize(name: &str) -> String {
    map_last_word(name, singularize_word)
}

fn map_last_word(name: &str, f: fn(&str) -> String) -> String {
    match name.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, f(last)),
        None => f(name),
    }
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", stem);
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

fn singularize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ["ss", "x", "z", "ch", "sh"].iter().any(|suffix| stem.ends_with(suffix)) {
            return stem.to_string();
        }
        if stem.ends_with("us") && !USE_WORDS.contains(&&word[..word.len() - 1]) {
            return stem.to_string();
        }
    }
    if SINGULAR_S_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

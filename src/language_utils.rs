use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::TranslationError;

/// Language utilities for ISO language codes and translation directions
///
/// Model families tag languages differently ("lt", "lt_LT", "en_XX"), so all
/// matching goes through `base_code`, which keeps only the part before the
/// first separator.

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Strip region/script suffixes: "en_XX" -> "en", "lt-LT" -> "lt"
pub fn base_code(tag: &str) -> String {
    let trimmed = tag.trim();
    let base = trimmed
        .split(|c| c == '_' || c == '-')
        .next()
        .unwrap_or(trimmed);
    base.to_lowercase()
}

fn lookup(code: &str) -> Option<Language> {
    let code = base_code(code);
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == code)
                .map(|(_, t)| *t)
                .unwrap_or(code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate that a tag names a known ISO 639-1 or 639-2 language
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}

/// An ordered (source, target) language pair.
///
/// Tags are stored lower-cased exactly as given; comparisons between a
/// requested direction and a backend's declared direction use base codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Direction {
    source: String,
    target: String,
}

impl Direction {
    /// Create a direction from two language tags
    pub fn new(source: impl AsRef<str>, target: impl AsRef<str>) -> Self {
        Self {
            source: source.as_ref().trim().to_lowercase(),
            target: target.as_ref().trim().to_lowercase(),
        }
    }

    /// Source language tag
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Target language tag
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The language-swapped direction used for back-translation
    pub fn reverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }

    /// Same direction with region/script suffixes removed
    pub fn base(&self) -> Self {
        Self {
            source: base_code(&self.source),
            target: base_code(&self.target),
        }
    }

    /// Exact (source, target) match on base language codes
    pub fn matches(&self, other: &Direction) -> bool {
        base_code(&self.source) == base_code(&other.source)
            && base_code(&self.target) == base_code(&other.target)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

impl FromStr for Direction {
    type Err = TranslationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (source, target) = s
            .split_once('-')
            .ok_or_else(|| TranslationError::InvalidDirection(s.to_string()))?;

        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(TranslationError::InvalidDirection(s.to_string()));
        }

        Ok(Self::new(source, target))
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

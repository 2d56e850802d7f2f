//! Language Variants
//!
//! Normalizes caller-supplied language selectors onto a configured set.

use std::fmt;

use serde::Serialize;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Supported variants when none are configured.
pub const DEFAULT_LANGUAGES: [&str; 3] = ["uz", "ru", "en"];

/// Fallback variant when none is configured.
pub const DEFAULT_LANGUAGE: &str = "uz";

// == Lang ==
/// A language variant that is known to be a member of a `Languages` set.
///
/// Only `Languages::resolve` and `Languages::iter` hand these out, so any
/// `Lang` reaching key construction has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Lang(String);

impl Lang {
    /// Returns the variant as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Lang {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Languages ==
/// The supported language variants and the default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    supported: Vec<Lang>,
    default: Lang,
}

impl Languages {
    // == Constructor ==
    /// Creates a language set.
    ///
    /// Variants are lower-cased and de-duplicated, keeping first-seen order.
    ///
    /// # Errors
    /// `InvalidConfig` if the set is empty, contains an empty variant, or
    /// does not contain the default.
    pub fn new<I, S>(supported: I, default: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut langs: Vec<Lang> = Vec::new();
        for raw in supported {
            let lang = raw.as_ref().trim().to_lowercase();
            if lang.is_empty() {
                return Err(CacheError::InvalidConfig(
                    "language variants cannot be empty".to_string(),
                ));
            }
            if !langs.iter().any(|l| l.0 == lang) {
                langs.push(Lang(lang));
            }
        }

        if langs.is_empty() {
            return Err(CacheError::InvalidConfig(
                "at least one language variant is required".to_string(),
            ));
        }

        let default = default.trim().to_lowercase();
        let default = langs
            .iter()
            .find(|l| l.0 == default)
            .cloned()
            .ok_or_else(|| {
                CacheError::InvalidConfig(format!(
                    "default language '{}' is not among the supported variants",
                    default
                ))
            })?;

        Ok(Self {
            supported: langs,
            default,
        })
    }

    // == Resolve ==
    /// Normalizes `input` to a supported variant.
    ///
    /// Matching is case-insensitive. Absent or unrecognized input yields the
    /// default variant; this never fails.
    pub fn resolve(&self, input: Option<&str>) -> Lang {
        let Some(raw) = input else {
            return self.default.clone();
        };
        let lowered = raw.to_lowercase();
        self.supported
            .iter()
            .find(|l| l.0 == lowered)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Returns the default variant.
    pub fn default_lang(&self) -> &Lang {
        &self.default
    }

    /// Iterates over the supported variants in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &Lang> {
        self.supported.iter()
    }

    /// Returns true if `input` names a supported variant (case-insensitive).
    pub fn contains(&self, input: &str) -> bool {
        let lowered = input.to_lowercase();
        self.supported.iter().any(|l| l.0 == lowered)
    }

    /// Number of supported variants.
    pub fn len(&self) -> usize {
        self.supported.len()
    }

    /// Returns true if no variants are supported.
    pub fn is_empty(&self) -> bool {
        self.supported.is_empty()
    }
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            supported: DEFAULT_LANGUAGES
                .iter()
                .map(|l| Lang((*l).to_string()))
                .collect(),
            default: Lang(DEFAULT_LANGUAGE.to_string()),
        }
    }
}

use std::fmt;

use serde::Serialize;

use crate::error::{OcrError, Result};

/// Identifies one recognition model. Several language codes may share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelKey(&'static str);

impl ModelKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Traineddata name understood by the engine (e.g. `fra`, `chi_sim`).
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LanguageEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub model: &'static str,
}

const fn entry(code: &'static str, name: &'static str, model: &'static str) -> LanguageEntry {
    LanguageEntry { code, name, model }
}

const LANGUAGES: &[LanguageEntry] = &[
    entry("fr", "Français", "fra"),
    entry("en", "English", "eng"),
    entry("ch", "Chinese (Simplified)", "chi_sim"),
    entry("chinese_cht", "Chinese (Traditional)", "chi_tra"),
    entry("german", "Deutsch", "deu"),
    entry("de", "Deutsch", "deu"),
    entry("japan", "Japanese", "jpn"),
    entry("ja", "Japanese", "jpn"),
    entry("korean", "Korean", "kor"),
    entry("ko", "Korean", "kor"),
    entry("es", "Spanish", "spa"),
    entry("it", "Italian", "ita"),
    entry("pt", "Portuguese", "por"),
    entry("ru", "Russian", "rus"),
    entry("ar", "Arabic", "ara"),
    entry("latin", "Latin languages", "lat"),
];

/// A language code that passed registry lookup, paired with its model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage {
    pub code: String,
    pub model: ModelKey,
}

/// Static table of supported language codes.
///
/// Lookup is case-sensitive. A missing or empty code resolves to the
/// configured default; an unknown code is rejected unless
/// `fallback_to_default` is set, in which case it also resolves to the default.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    default: LanguageEntry,
    fallback_to_default: bool,
}

impl LanguageRegistry {
    /// Fails when the default code itself is not in the table.
    pub fn new(default_code: &str, fallback_to_default: bool) -> Result<Self> {
        let default = Self::lookup(default_code)
            .ok_or_else(|| OcrError::UnsupportedLanguage(default_code.to_string()))?;

        Ok(Self {
            default,
            fallback_to_default,
        })
    }

    fn lookup(code: &str) -> Option<LanguageEntry> {
        LANGUAGES.iter().find(|entry| entry.code == code).copied()
    }

    pub fn default_code(&self) -> &'static str {
        self.default.code
    }

    pub fn default_model(&self) -> ModelKey {
        ModelKey::new(self.default.model)
    }

    pub fn is_supported(&self, code: &str) -> bool {
        Self::lookup(code).is_some()
    }

    /// All supported codes with their display names, in table order.
    pub fn supported(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        LANGUAGES.iter().map(|entry| (entry.code, entry.name))
    }

    pub fn resolve(&self, code: Option<&str>) -> Result<ResolvedLanguage> {
        let code = code.map(str::trim).filter(|c| !c.is_empty());

        let entry = match code {
            None => self.default,
            Some(code) => match Self::lookup(code) {
                Some(entry) => entry,
                None if self.fallback_to_default => {
                    tracing::warn!(
                        requested = code,
                        default = self.default.code,
                        "Unsupported language, falling back to default"
                    );
                    self.default
                }
                None => return Err(OcrError::UnsupportedLanguage(code.to_string())),
            },
        };

        Ok(ResolvedLanguage {
            code: entry.code.to_string(),
            model: ModelKey::new(entry.model),
        })
    }
}

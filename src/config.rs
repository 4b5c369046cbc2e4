//! Extraction policy consumed by the normalizer and the link extractor.

use crate::syllabus::NormalizeOptions;

/// Default subtitle language.
pub const DEFAULT_SUBTITLE_LANGUAGE: &str = "en";

/// Per-run options that decide what is extracted and how slugs look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPolicy {
    /// Reverse top-level module order (the Resources module stays last).
    pub reverse_order: bool,
    /// Comma-separated subtitle languages, or `all`.
    pub subtitle_language: String,
    /// Preferred video resolution label such as `720p`; highest when unset.
    pub video_resolution: Option<String>,
    /// Extract quiz, exam, and immediate programming items.
    pub download_quizzes: bool,
    /// Extract the first notebook item of the run.
    pub download_notebooks: bool,
    /// Keep slugs close to the upstream text.
    pub unrestricted_filenames: bool,
    /// MathJax script URL injected into rendered HTML pages.
    pub mathjax_cdn_url: Option<String>,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            reverse_order: false,
            subtitle_language: DEFAULT_SUBTITLE_LANGUAGE.to_string(),
            video_resolution: None,
            download_quizzes: false,
            download_notebooks: false,
            unrestricted_filenames: false,
            mathjax_cdn_url: None,
        }
    }
}

impl ExtractionPolicy {
    /// Options for the syllabus normalizer derived from this policy.
    #[must_use]
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            reverse: self.reverse_order,
            unrestricted_filenames: self.unrestricted_filenames,
        }
    }

    /// Requested subtitle languages, or `None` when every language is wanted.
    ///
    /// Blank entries are ignored; an empty list falls back to the default language.
    #[must_use]
    pub fn subtitle_languages(&self) -> Option<Vec<String>> {
        let raw = self.subtitle_language.trim();
        if raw.eq_ignore_ascii_case("all") {
            return None;
        }
        let languages: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .collect();
        if languages.is_empty() {
            Some(vec![DEFAULT_SUBTITLE_LANGUAGE.to_string()])
        } else {
            Some(languages)
        }
    }
}

//! Item content-type tags driving extraction dispatch.

use std::fmt;

/// Content type declared by a syllabus item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentType {
    Lecture,
    Supplement,
    PhasedPeer,
    GradedProgramming,
    UngradedProgramming,
    Quiz,
    Exam,
    /// Immediate-instructions programming item.
    Programming,
    Notebook,
    /// Any tag outside the known vocabulary.
    Unsupported(String),
}

impl ContentType {
    /// Maps a raw tag. Unknown tags are kept verbatim in [`ContentType::Unsupported`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "lecture" => Self::Lecture,
            "supplement" => Self::Supplement,
            "phasedPeer" => Self::PhasedPeer,
            "gradedProgramming" => Self::GradedProgramming,
            "ungradedProgramming" => Self::UngradedProgramming,
            "quiz" => Self::Quiz,
            "exam" => Self::Exam,
            "programming" => Self::Programming,
            "notebook" => Self::Notebook,
            other => Self::Unsupported(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lecture => "lecture",
            Self::Supplement => "supplement",
            Self::PhasedPeer => "phasedPeer",
            Self::GradedProgramming => "gradedProgramming",
            Self::UngradedProgramming => "ungradedProgramming",
            Self::Quiz => "quiz",
            Self::Exam => "exam",
            Self::Programming => "programming",
            Self::Notebook => "notebook",
            Self::Unsupported(tag) => tag,
        }
    }

    /// True for the types gated behind the quiz policy flag.
    #[must_use]
    pub fn is_quiz_gated(&self) -> bool {
        matches!(self, Self::Quiz | Self::Exam | Self::Programming)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip() {
        for tag in [
            "lecture",
            "supplement",
            "phasedPeer",
            "gradedProgramming",
            "ungradedProgramming",
            "quiz",
            "exam",
            "programming",
            "notebook",
        ] {
            let parsed = ContentType::from_tag(tag);
            assert!(!matches!(parsed, ContentType::Unsupported(_)), "{tag}");
            assert_eq!(parsed.as_str(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let parsed = ContentType::from_tag("discussionPrompt");
        assert_eq!(parsed, ContentType::Unsupported("discussionPrompt".to_string()));
        assert_eq!(parsed.to_string(), "discussionPrompt");
    }

    #[test]
    fn test_quiz_gate_membership() {
        assert!(ContentType::Quiz.is_quiz_gated());
        assert!(ContentType::Programming.is_quiz_gated());
        assert!(!ContentType::GradedProgramming.is_quiz_gated());
        assert!(!ContentType::Notebook.is_quiz_gated());
    }
}

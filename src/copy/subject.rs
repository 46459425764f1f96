// src/copy/subject.rs
//! Subject-line classifier. Keyword heuristics, not ML: categories are
//! non-exclusive and the detection order is fixed, because downstream
//! narrative text picks the first tag as the dominant one.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectTag {
    Question,
    Personalized,
    Benefit,
    Pain,
    Curiosity,
    Direct,
}

impl SubjectTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Personalized => "personalized",
            Self::Benefit => "benefit",
            Self::Pain => "pain",
            Self::Curiosity => "curiosity",
            Self::Direct => "direct",
        }
    }
}

/// Template markers or the literal first-name/company tokens.
const PERSONALIZED_MARKERS: &[&str] = &["{{", "first_name", "company"];

/// Benefit/ROI vocabulary.
const BENEFIT_MARKERS: &[&str] = &[
    "free", "save", "boost", "grow", "increase", "roi", "%", "revenue", "profit", "cut cost",
];

/// Pain/frustration vocabulary.
const PAIN_MARKERS: &[&str] = &[
    "struggling",
    "problem",
    "tired of",
    "frustrat",
    "losing",
    "waste",
    "expensive",
    "overpaying",
    "pain",
];

/// Short filler words that tease without telling.
const CURIOSITY_MARKERS: &[&str] = &["this", "quick", "re:", "idea", "thought", "curious"];

/// Classify a subject line into one or more non-exclusive categories.
/// Detection order: question, personalized, benefit, pain, curiosity;
/// `direct` only when nothing else matched.
pub fn classify_subject(subject: &str) -> Vec<SubjectTag> {
    let lower = subject.to_lowercase();
    let mut tags = Vec::new();

    if lower.contains('?') {
        tags.push(SubjectTag::Question);
    }
    if contains_any(&lower, PERSONALIZED_MARKERS) {
        tags.push(SubjectTag::Personalized);
    }
    if contains_any(&lower, BENEFIT_MARKERS) {
        tags.push(SubjectTag::Benefit);
    }
    if contains_any(&lower, PAIN_MARKERS) {
        tags.push(SubjectTag::Pain);
    }
    if contains_any(&lower, CURIOSITY_MARKERS) {
        tags.push(SubjectTag::Curiosity);
    }
    if tags.is_empty() {
        tags.push(SubjectTag::Direct);
    }
    tags
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_unit_subject_is_question_and_benefit() {
        let tags = classify_subject("Want a free unit?");
        assert!(tags.contains(&SubjectTag::Question));
        assert!(tags.contains(&SubjectTag::Benefit));
        assert!(!tags.contains(&SubjectTag::Personalized));
    }

    #[test]
    fn question_tag_precedes_benefit_in_output() {
        let tags = classify_subject("Want a free unit?");
        assert_eq!(tags[0], SubjectTag::Question);
    }

    #[test]
    fn template_marker_reads_as_personalized() {
        let tags = classify_subject("{{first_name}}, quick one");
        assert!(tags.contains(&SubjectTag::Personalized));
        assert!(tags.contains(&SubjectTag::Curiosity));
    }

    #[test]
    fn pain_vocabulary() {
        let tags = classify_subject("Tired of high water bills");
        assert!(tags.contains(&SubjectTag::Pain));
    }

    #[test]
    fn unmatched_subject_defaults_to_direct() {
        assert_eq!(classify_subject("Water from Air"), vec![SubjectTag::Direct]);
    }

    #[test]
    fn direct_never_coexists_with_other_tags() {
        for s in ["Want a free unit?", "Water from Air", "re: our chat"] {
            let tags = classify_subject(s);
            if tags.contains(&SubjectTag::Direct) {
                assert_eq!(tags.len(), 1);
            }
        }
    }
}

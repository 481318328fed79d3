use thiserror::Error;

use crate::grade::GradeLevel;
use crate::utils::trim_line;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that summarizes learning targets into a clear lesson overview.";

pub const MISSING_INPUT_WARNING: &str = "Please select a grade level and provide learning targets.";

const CONTEXT_SECTION: &str = r#"##CONTEXT##
I am preparing a lesson plan and have a set of learning targets that outline what the lesson aims to cover. The targets are written for teachers, and I need a summary that encapsulates the essence of the lesson."#;

const INSTRUCTIONS: &str = r#"Convert these into a concise summary that:
- Clearly explains what the lesson is about
- Highlights the key concepts and skills addressed
- Is accessible to both teachers and students at the specified grade level
- Uses clear, non-technical language while retaining essential educational terminology"#;

const STYLE_SECTIONS: &str = r#"##STYLE##
Clear, concise, and engaging summary that captures the essence of the lesson

##TONE##
Informative, straightforward, and motivating

##AUDIENCE##
Teachers and students at the specified grade level

##FORMAT##
A brief, well-structured summary of the lesson's main focus, key concepts, and skills."#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Please select a grade level and provide learning targets.")]
    MissingTargets,
}

/// A validated form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRequest {
    grade: GradeLevel,
    learning_targets: String,
}

impl LessonRequest {
    pub fn new(grade: GradeLevel, learning_targets: &str) -> Result<Self, RequestError> {
        // Presence is the only check; the text is passed through as typed.
        if trim_line(learning_targets).is_none() {
            return Err(RequestError::MissingTargets);
        }

        Ok(Self {
            grade,
            learning_targets: learning_targets.to_string(),
        })
    }

    pub fn grade(&self) -> GradeLevel {
        self.grade
    }

    pub fn learning_targets(&self) -> &str {
        &self.learning_targets
    }

    pub fn user_prompt(&self) -> String {
        build_user_prompt(self.grade, &self.learning_targets)
    }
}

pub fn build_user_prompt(grade: GradeLevel, learning_targets: &str) -> String {
    format!(
        "{CONTEXT_SECTION}\n\n\
         ##OBJECTIVE##\n\
         Please provide:\n\
         Grade level: {grade}\n\
         Learning targets:\n\
         {learning_targets}\n\
         {INSTRUCTIONS}\n\n\
         {STYLE_SECTIONS}\n"
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn blank_targets_are_rejected() {
        assert_eq!(
            LessonRequest::new(GradeLevel::Grade3, "  \n\t "),
            Err(RequestError::MissingTargets)
        );
        assert_eq!(
            RequestError::MissingTargets.to_string(),
            "Please select a grade level and provide learning targets."
        );
    }

    #[test]
    fn targets_are_kept_verbatim() {
        let request =
            LessonRequest::new(GradeLevel::Algebra1, "  I can solve linear equations.\n").unwrap();
        assert_eq!(request.learning_targets(), "  I can solve linear equations.\n");
        assert_eq!(request.grade(), GradeLevel::Algebra1);
    }

    #[test]
    fn prompt_has_every_section_in_order() {
        let prompt = build_user_prompt(GradeLevel::Grade5, "I can add fractions.");
        let sections = [
            "##CONTEXT##",
            "##OBJECTIVE##",
            "##STYLE##",
            "##TONE##",
            "##AUDIENCE##",
            "##FORMAT##",
        ];

        let mut last = 0;
        for section in sections {
            let position = prompt
                .find(section)
                .unwrap_or_else(|| panic!("missing {section}"));
            assert!(position >= last, "{section} out of order");
            last = position;
        }
    }

    #[test]
    fn prompt_places_inputs_in_objective() {
        let prompt = build_user_prompt(GradeLevel::Geometry, "I can prove triangles congruent.");
        let objective = prompt.split("##STYLE##").next().unwrap();

        assert!(objective.contains("Grade level: Geometry\n"));
        assert!(objective.contains("Learning targets:\nI can prove triangles congruent.\n"));
        assert!(objective.contains("- Highlights the key concepts and skills addressed"));
    }

    proptest! {
        #[test]
        fn prompt_contains_inputs_verbatim(idx in 0usize..12, targets in "\\PC{1,200}") {
            let grade = GradeLevel::from_index(idx).unwrap();
            let prompt = build_user_prompt(grade, &targets);
            let expected_grade = format!("Grade level: {}", grade.label());
            prop_assert!(prompt.contains(&expected_grade));
            prop_assert!(prompt.contains(&targets));
            prop_assert!(prompt.starts_with("##CONTEXT##"));
        }

        #[test]
        fn only_blank_targets_fail(targets in "\\PC{0,40}") {
            let result = LessonRequest::new(GradeLevel::Grade1, &targets);
            prop_assert_eq!(result.is_err(), targets.trim().is_empty());
        }
    }
}

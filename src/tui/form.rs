use std::time::Instant;

use crate::grade::GradeLevel;
use crate::prompt::{LessonRequest, RequestError};

use super::editor::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grade,
    Targets,
    Summary,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Grade => Focus::Targets,
            Focus::Targets => Focus::Summary,
            Focus::Summary => Focus::Grade,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Grade => Focus::Summary,
            Focus::Targets => Focus::Grade,
            Focus::Summary => Focus::Targets,
        }
    }
}

/// What the status line and summary panel currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Idle,
    Pending { started: Instant },
    Summary(String),
    Warning(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FormState {
    grade: GradeLevel,
    pub focus: Focus,
    pub editor: Editor,
    outcome: Outcome,
    /// The last summary stays visible while a newer request fails or runs.
    summary: Option<String>,
    summary_scroll: u16,
    summary_max_scroll: u16,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(GradeLevel::default())
    }
}

impl FormState {
    pub fn new(grade: GradeLevel) -> Self {
        Self {
            grade,
            focus: Focus::Targets,
            editor: Editor::new(),
            outcome: Outcome::Idle,
            summary: None,
            summary_scroll: 0,
            summary_max_scroll: 0,
        }
    }

    pub fn grade(&self) -> GradeLevel {
        self.grade
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn summary_scroll(&self) -> u16 {
        self.summary_scroll
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.outcome, Outcome::Pending { .. })
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    pub fn select_next_grade(&mut self) {
        let next = (self.grade.index() + 1).min(GradeLevel::ALL.len() - 1);
        self.grade = GradeLevel::ALL[next];
    }

    pub fn select_previous_grade(&mut self) {
        self.grade = GradeLevel::ALL[self.grade.index().saturating_sub(1)];
    }

    pub fn select_first_grade(&mut self) {
        self.grade = GradeLevel::ALL[0];
    }

    pub fn select_last_grade(&mut self) {
        self.grade = GradeLevel::ALL[GradeLevel::ALL.len() - 1];
    }

    pub fn scroll_summary(&mut self, delta: i32) {
        let next = i32::from(self.summary_scroll) + delta;
        self.summary_scroll = next.clamp(0, i32::from(self.summary_max_scroll)) as u16;
    }

    /// Set by the view once it knows how many rows the summary takes at the current size.
    pub fn set_summary_max_scroll(&mut self, max: u16) {
        self.summary_max_scroll = max;
        self.summary_scroll = self.summary_scroll.min(max);
    }

    /// Validates the form and marks it pending. `None` while a request is already running.
    pub fn submit(&mut self, now: Instant) -> Option<Result<LessonRequest, RequestError>> {
        if self.is_pending() {
            return None;
        }

        let result = LessonRequest::new(self.grade, &self.editor.content());
        match &result {
            Ok(_) => self.outcome = Outcome::Pending { started: now },
            Err(err) => self.outcome = Outcome::Warning(err.to_string()),
        }
        Some(result)
    }

    pub fn finish(&mut self, result: Result<String, String>) {
        match result {
            Ok(summary) => {
                self.summary = Some(summary.clone());
                self.summary_scroll = 0;
                self.outcome = Outcome::Summary(summary);
            }
            Err(message) => {
                self.outcome = Outcome::Failed(format!("An error occurred: {message}"));
            }
        }
    }

    pub fn clear_targets(&mut self) {
        self.editor.clear();
        if !self.is_pending() {
            self.outcome = Outcome::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::MISSING_INPUT_WARNING;

    #[test]
    fn starts_on_targets_with_first_grade() {
        let state = FormState::default();
        assert_eq!(state.focus, Focus::Targets);
        assert_eq!(state.grade(), GradeLevel::Kindergarten);
        assert_eq!(state.outcome(), &Outcome::Idle);
    }

    #[test]
    fn grade_selection_stops_at_both_ends() {
        let mut state = FormState::default();
        state.select_previous_grade();
        assert_eq!(state.grade(), GradeLevel::Kindergarten);

        state.select_next_grade();
        assert_eq!(state.grade(), GradeLevel::Grade1);

        state.select_last_grade();
        state.select_next_grade();
        assert_eq!(state.grade(), GradeLevel::Algebra2);

        state.select_first_grade();
        assert_eq!(state.grade(), GradeLevel::Kindergarten);
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut state = FormState::default();
        state.focus_next();
        assert_eq!(state.focus, Focus::Summary);
        state.focus_next();
        assert_eq!(state.focus, Focus::Grade);
        state.focus_previous();
        assert_eq!(state.focus, Focus::Summary);
    }

    #[test]
    fn blank_submission_shows_warning() {
        let mut state = FormState::default();
        state.editor.insert_str("   ");

        let result = state.submit(Instant::now()).unwrap();
        assert_eq!(result, Err(RequestError::MissingTargets));
        assert_eq!(
            state.outcome(),
            &Outcome::Warning(MISSING_INPUT_WARNING.to_string())
        );
    }

    #[test]
    fn valid_submission_goes_pending_and_blocks_resubmit() {
        let mut state = FormState::new(GradeLevel::Grade6);
        state.editor.insert_str("I can find unit rates.");

        let request = state.submit(Instant::now()).unwrap().unwrap();
        assert_eq!(request.grade(), GradeLevel::Grade6);
        assert_eq!(request.learning_targets(), "I can find unit rates.");
        assert!(state.is_pending());

        assert!(state.submit(Instant::now()).is_none());
    }

    #[test]
    fn finish_records_summary_or_error() {
        let mut state = FormState::default();
        state.editor.insert_str("I can count.");
        state.submit(Instant::now());
        state.set_summary_max_scroll(10);
        state.scroll_summary(4);
        state.finish(Ok("Students count objects.".to_string()));

        assert_eq!(
            state.outcome(),
            &Outcome::Summary("Students count objects.".to_string())
        );
        assert_eq!(state.summary(), Some("Students count objects."));
        assert_eq!(state.summary_scroll(), 0);

        state.submit(Instant::now());
        state.finish(Err("rate limited: slow down".to_string()));
        assert_eq!(
            state.outcome(),
            &Outcome::Failed("An error occurred: rate limited: slow down".to_string())
        );
        assert_eq!(state.summary(), Some("Students count objects."));
    }

    #[test]
    fn summary_scroll_never_goes_negative() {
        let mut state = FormState::default();
        state.set_summary_max_scroll(20);
        state.scroll_summary(-3);
        assert_eq!(state.summary_scroll(), 0);
        state.scroll_summary(5);
        state.scroll_summary(-2);
        assert_eq!(state.summary_scroll(), 3);
    }

    #[test]
    fn summary_scroll_stops_at_last_row() {
        let mut state = FormState::default();
        state.set_summary_max_scroll(6);
        state.scroll_summary(10);
        assert_eq!(state.summary_scroll(), 6);

        state.set_summary_max_scroll(2);
        assert_eq!(state.summary_scroll(), 2);

        state.set_summary_max_scroll(0);
        state.scroll_summary(1);
        assert_eq!(state.summary_scroll(), 0);
    }

    #[test]
    fn clearing_targets_resets_warning() {
        let mut state = FormState::default();
        state.submit(Instant::now());
        state.clear_targets();
        assert_eq!(state.outcome(), &Outcome::Idle);
    }
}

//! Contract between the screens of a shell and the shell itself.
//!
//! Screens never call each other. They hand back a [`ShellRequest`] and the
//! shell dispatches it to its [`ShellActions`] implementation.

use crate::libsoru::{check_submission, QuestionStore, SubmissionError};
use log::{info, warn};

pub const NOTHING_TO_PRINT: &str = "No questions to print.";
pub const NOTHING_TO_PREVIEW: &str = "No questions to preview.";
pub const QUESTION_ADDED: &str = "Question added successfully.";
pub const QUESTION_NOT_ADDED: &str = "A database error occurred while adding the question.";

pub trait ShellActions {
    fn on_home_requested(&mut self);
    fn on_add_requested(&mut self);
    fn on_view_requested(&mut self);
    fn on_print_requested(&mut self);
    fn on_preview_requested(&mut self);
    fn on_exit_requested(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRequest {
    Home,
    AddQuestion,
    ViewQuestions,
    Print,
    Preview,
    Exit,
}

impl ShellRequest {
    pub fn dispatch<A: ShellActions + ?Sized>(self, actions: &mut A) {
        match self {
            ShellRequest::Home => actions.on_home_requested(),
            ShellRequest::AddQuestion => actions.on_add_requested(),
            ShellRequest::ViewQuestions => actions.on_view_requested(),
            ShellRequest::Print => actions.on_print_requested(),
            ShellRequest::Preview => actions.on_preview_requested(),
            ShellRequest::Exit => actions.on_exit_requested(),
        }
    }

    /// Menu key used by the terminal shell.
    pub fn key(self) -> &'static str {
        match self {
            ShellRequest::Home => "h",
            ShellRequest::AddQuestion => "1",
            ShellRequest::ViewQuestions => "2",
            ShellRequest::Print => "3",
            ShellRequest::Preview => "4",
            ShellRequest::Exit => "q",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShellRequest::Home => "Home",
            ShellRequest::AddQuestion => "New Question",
            ShellRequest::ViewQuestions => "Open Question List",
            ShellRequest::Print => "Print All Questions",
            ShellRequest::Preview => "Print Preview",
            ShellRequest::Exit => "Exit",
        }
    }

    pub const ALL: [ShellRequest; 6] = [
        ShellRequest::AddQuestion,
        ShellRequest::ViewQuestions,
        ShellRequest::Print,
        ShellRequest::Preview,
        ShellRequest::Home,
        ShellRequest::Exit,
    ];

    pub fn from_key(input: &str) -> Option<ShellRequest> {
        let input = input.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.key().eq_ignore_ascii_case(input))
    }
}

/// Result of submitting the add-question form.
#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    Saved,
    Rejected(SubmissionError),
    StoreFailed,
}

impl Submission {
    /// Whether the form should stay open for another attempt.
    pub fn keeps_form_open(&self) -> bool {
        !matches!(self, Submission::Saved)
    }
}

/// Trims the form fields, checks them and hands them to the store.
pub fn submit_question<S: AsRef<str>>(
    store: &QuestionStore,
    text: &str,
    options: &[S],
    correct_index: Option<usize>,
    category: &str,
) -> Submission {
    let text = text.trim();
    let options: Vec<&str> = options.iter().map(|o| o.as_ref().trim()).collect();
    if let Err(err) = check_submission(text, &options, correct_index) {
        warn!("[Shell] Rejected question: {}", err);
        return Submission::Rejected(err);
    }
    if store.add_question(text, &options, correct_index, Some(category.trim())) {
        info!("[Shell] Question saved");
        Submission::Saved
    } else {
        Submission::StoreFailed
    }
}

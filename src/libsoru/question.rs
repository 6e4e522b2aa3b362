use thiserror::Error;

/// Number of option slots every question carries (A to E).
pub const OPTION_COUNT: usize = 5;
/// Category stored when the author leaves the field empty.
pub const DEFAULT_CATEGORY: &str = "General";

/// A question as it lives in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: i64,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: Option<usize>,
    pub category: String,
}

/// A question that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: Option<usize>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("The question text cannot be empty.")]
    EmptyText,
    #[error("Please enter at least one answer option.")]
    NoOptions,
    #[error("Please mark the correct option.")]
    NoCorrectOption,
    #[error("The marked answer {0} cannot be empty.")]
    CorrectOptionEmpty(char),
}

/// Letter shown for the option slot at `index` (0 => 'A').
pub fn option_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Parses an option letter typed by the author. Case-insensitive.
pub fn letter_index(letter: &str) -> Option<usize> {
    let mut chars = letter.trim().chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !('A'..='E').contains(&c) {
        return None;
    }
    Some((c as u8 - b'A') as usize)
}

/// Pads `options` with empty strings up to [`OPTION_COUNT`].
/// Returns `None` if more than [`OPTION_COUNT`] options were given.
pub fn pad_options<S: AsRef<str>>(options: &[S]) -> Option<[String; OPTION_COUNT]> {
    if options.len() > OPTION_COUNT {
        return None;
    }
    let mut padded: [String; OPTION_COUNT] = Default::default();
    for (slot, option) in padded.iter_mut().zip(options) {
        *slot = option.as_ref().to_string();
    }
    Some(padded)
}

/// Blank or missing categories fall back to [`DEFAULT_CATEGORY`]. Anything
/// else is kept as given, surrounding whitespace included.
pub fn default_category(category: Option<&str>) -> String {
    match category {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Trims form input, then applies [`default_category`].
pub fn normalize_category(category: Option<&str>) -> String {
    default_category(category.map(str::trim))
}

/// Checks an add-question submission before it is sent to the store.
///
/// Rejects, in order: empty text, no filled option, no marked option, and a
/// marked option without text.
pub fn check_submission<S: AsRef<str>>(
    text: &str,
    options: &[S],
    correct_index: Option<usize>,
) -> Result<(), SubmissionError> {
    if text.trim().is_empty() {
        return Err(SubmissionError::EmptyText);
    }
    if options.iter().all(|o| o.as_ref().trim().is_empty()) {
        return Err(SubmissionError::NoOptions);
    }
    let idx = correct_index.ok_or(SubmissionError::NoCorrectOption)?;
    match options.get(idx) {
        Some(o) if !o.as_ref().trim().is_empty() => Ok(()),
        _ => Err(SubmissionError::CorrectOptionEmpty(option_letter(idx.min(25)))),
    }
}

impl NewQuestion {
    /// Builds a new question from raw form input: trims every field, pads the
    /// options and defaults the category. Validation is left to
    /// [`check_submission`].
    pub fn from_input<S: AsRef<str>>(
        text: &str,
        options: &[S],
        correct_index: Option<usize>,
        category: Option<&str>,
    ) -> Option<NewQuestion> {
        let trimmed: Vec<&str> = options.iter().map(|o| o.as_ref().trim()).collect();
        Some(NewQuestion {
            text: text.trim().to_string(),
            options: pad_options(&trimmed)?,
            correct_index,
            category: normalize_category(category),
        })
    }
}

impl QuestionRecord {
    /// Value of the "Answer" column in the question list.
    pub fn answer_label(&self) -> String {
        match self.correct_index {
            Some(i) if i < OPTION_COUNT => {
                if self.options[i].is_empty() {
                    format!("{} (empty)", option_letter(i))
                } else {
                    option_letter(i).to_string()
                }
            }
            _ => String::from("N/A"),
        }
    }

    pub fn has_default_category(&self) -> bool {
        self.category.is_empty() || self.category.eq_ignore_ascii_case(DEFAULT_CATEGORY)
    }
}

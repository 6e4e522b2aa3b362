pub mod db;
pub mod document;
pub mod question;

pub use db::{QuestionStore, StoreError, DB_NAME};
pub use document::{build_print_document, Block, Document, Page, QuestionSource};
pub use question::{
    check_submission, NewQuestion, QuestionRecord, SubmissionError, DEFAULT_CATEGORY,
    OPTION_COUNT,
};

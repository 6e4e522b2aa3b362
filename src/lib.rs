//! Mini Soru Bankası: author, store, list and print multiple-choice questions.
//!
//! [`libsoru`] is the core (question store and print document). The shells in
//! the main binary talk to it through [`shell::ShellActions`] and style their
//! output with a [`theme::Theme`].

pub mod libsoru;
pub mod print;
pub mod shell;
pub mod theme;

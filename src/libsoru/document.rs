//! Printable representation of the question bank.
//!
//! A [`Document`] is a flat list of [`Block`]s, one per printed line. It does
//! not know about colours or fonts: every piece of text carries a [`Tone`] and
//! a [`Weight`], and the printing or preview backend decides how those look.
//! The same document feeds the printer and the paginated preview.

use crate::libsoru::db::QuestionStore;
use crate::libsoru::question::{option_letter, QuestionRecord, OPTION_COUNT};
use log::debug;
use std::fmt;

pub const DOCUMENT_TITLE: &str = "Soru Bankası - Question List";
pub const NO_QUESTIONS_NOTICE: &str = "No questions available to print.";
pub const EMPTY_OPTION_TEXT: &str = "[EMPTY]";

/// Anything the document can be built from.
pub trait QuestionSource {
    fn get_all_questions(&self) -> Vec<QuestionRecord>;
}

impl QuestionSource for QuestionStore {
    fn get_all_questions(&self) -> Vec<QuestionRecord> {
        QuestionStore::get_all_questions(self)
    }
}

impl QuestionSource for [QuestionRecord] {
    fn get_all_questions(&self) -> Vec<QuestionRecord> {
        self.to_vec()
    }
}

impl QuestionSource for Vec<QuestionRecord> {
    fn get_all_questions(&self) -> Vec<QuestionRecord> {
        self.clone()
    }
}

/// Semantic colour role of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Title,
    Header,
    Body,
    Correct,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Normal,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    Title,
    Question,
    Option,
    Small,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
    pub weight: Weight,
    pub size: Size,
    pub italic: bool,
}

impl Span {
    fn new(text: impl Into<String>, tone: Tone, weight: Weight, size: Size) -> Span {
        Span {
            text: text.into(),
            tone,
            weight,
            size,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Notice(String),
    Heading {
        ordinal: usize,
        id: i64,
        text: String,
    },
    Option {
        letter: char,
        text: String,
        correct: bool,
    },
    Category(String),
    Separator,
}

impl Block {
    /// Styled runs making up this line, left to right.
    pub fn spans(&self) -> Vec<Span> {
        match self {
            Block::Title(title) => vec![Span::new(title, Tone::Title, Weight::Strong, Size::Title)],
            Block::Notice(text) => vec![Span::new(text, Tone::Body, Weight::Normal, Size::Option)],
            Block::Heading { ordinal, id, text } => vec![
                Span::new(
                    format!("Question {} (ID: {}): ", ordinal, id),
                    Tone::Header,
                    Weight::Strong,
                    Size::Question,
                ),
                Span::new(text, Tone::Body, Weight::Normal, Size::Question),
            ],
            Block::Option {
                letter,
                text,
                correct,
            } => {
                let prefix = if *correct { "  * " } else { "    " };
                let line = if text.is_empty() {
                    format!("{}{}) (empty) {}", prefix, letter, EMPTY_OPTION_TEXT)
                } else {
                    format!("{}{}) {}", prefix, letter, text)
                };
                if *correct {
                    vec![Span::new(line, Tone::Correct, Weight::Strong, Size::Option)]
                } else {
                    vec![Span::new(line, Tone::Body, Weight::Normal, Size::Option)]
                }
            }
            Block::Category(category) => vec![Span {
                italic: true,
                ..Span::new(
                    format!("    Category: {}", category),
                    Tone::Accent,
                    Weight::Normal,
                    Size::Small,
                )
            }],
            Block::Separator => Vec::new(),
        }
    }

    pub fn plain_text(&self) -> String {
        self.spans().into_iter().map(|s| s.text).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// One page of a paginated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,
    pub blocks: &'a [Block],
}

/// Reads every question from `source` and lays it out for printing.
pub fn build_print_document<Q: QuestionSource + ?Sized>(source: &Q) -> Document {
    let questions = source.get_all_questions();
    let document = Document::from_records(&questions);
    debug!(
        "[Print] Built document for {} questions ({} blocks)",
        questions.len(),
        document.blocks.len()
    );
    document
}

impl Document {
    pub fn from_records(questions: &[QuestionRecord]) -> Document {
        if questions.is_empty() {
            return Document {
                blocks: vec![Block::Notice(NO_QUESTIONS_NOTICE.to_string())],
            };
        }

        let mut blocks = vec![Block::Title(DOCUMENT_TITLE.to_string())];
        for (i, question) in questions.iter().enumerate() {
            if i > 0 {
                blocks.push(Block::Separator);
            }
            blocks.push(Block::Heading {
                ordinal: i + 1,
                id: question.id,
                text: question.text.clone(),
            });
            for j in 0..OPTION_COUNT {
                let text = &question.options[j];
                let correct = question.correct_index == Some(j);
                if !text.is_empty() || correct {
                    blocks.push(Block::Option {
                        letter: option_letter(j),
                        text: text.clone(),
                        correct,
                    });
                }
            }
            if !question.has_default_category() {
                blocks.push(Block::Category(question.category.clone()));
            }
        }
        Document { blocks }
    }

    pub fn is_empty_notice(&self) -> bool {
        matches!(self.blocks.as_slice(), [Block::Notice(_)])
    }

    pub fn question_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Heading { .. }))
            .count()
    }

    pub fn plain_text(&self) -> String {
        self.to_string()
    }

    /// Splits the document into pages of at most `lines_per_page` blocks.
    ///
    /// A question that would straddle a page boundary starts on a new page,
    /// unless it is longer than a whole page on its own.
    pub fn paginate(&self, lines_per_page: usize) -> Vec<Page<'_>> {
        let per_page = lines_per_page.max(1);
        let mut pages = Vec::new();
        let mut start = 0;

        while start < self.blocks.len() {
            if start > 0 && self.blocks[start] == Block::Separator {
                start += 1;
                continue;
            }
            let mut end = (start + per_page).min(self.blocks.len());
            if end < self.blocks.len() {
                if let Some(cut) = self.last_group_start(start, end, per_page) {
                    end = cut;
                }
            }
            pages.push(Page {
                number: pages.len() + 1,
                blocks: &self.blocks[start..end],
            });
            start = end;
        }
        pages
    }

    /// Start of the last question group in `start..end` if moving it to the
    /// next page keeps it whole and still leaves something on this page. The
    /// title never stays behind on its own.
    fn last_group_start(&self, start: usize, end: usize, per_page: usize) -> Option<usize> {
        // Blocks continuing past `end` belong to the last group on the page.
        if matches!(self.blocks[end], Block::Heading { .. } | Block::Separator) {
            return None;
        }
        let first = if start == 0 { 2 } else { start + 1 };
        let cut = (first..end)
            .rev()
            .find(|&i| matches!(self.blocks[i], Block::Heading { .. }))?;
        let group_end = self.blocks[cut..]
            .iter()
            .position(|b| *b == Block::Separator)
            .map_or(self.blocks.len(), |len| cut + len);
        (group_end - cut <= per_page).then_some(cut)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{}", block.plain_text())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, text: &str, options: [&str; 5], correct: Option<usize>, category: &str) -> QuestionRecord {
        QuestionRecord {
            id,
            text: text.into(),
            options: options.map(String::from),
            correct_index: correct,
            category: category.into(),
        }
    }

    #[test]
    fn empty_source_gives_single_notice() {
        let doc = build_print_document(&Vec::<QuestionRecord>::new());
        assert_eq!(doc.blocks, vec![Block::Notice(NO_QUESTIONS_NOTICE.into())]);
        assert!(doc.is_empty_notice());
        assert_eq!(doc.question_count(), 0);
    }

    #[test]
    fn heading_uses_ordinal_not_id() {
        let records = vec![
            record(7, "First?", ["a", "b", "", "", ""], Some(0), "General"),
            record(12, "Second?", ["c", "", "", "", ""], Some(0), "General"),
        ];
        let doc = build_print_document(&records);
        let text = doc.plain_text();
        assert!(text.contains("Question 1 (ID: 7): First?"));
        assert!(text.contains("Question 2 (ID: 12): Second?"));
        assert_eq!(doc.question_count(), 2);
    }

    #[test]
    fn empty_slots_are_skipped_and_correct_is_marked() {
        let doc = Document::from_records(&[record(1, "What is 2+2?", ["3", "4", "5", "", ""], Some(1), "Math")]);
        let options: Vec<&Block> = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Option { .. }))
            .collect();
        assert_eq!(options.len(), 3);
        assert_eq!(
            options[1],
            &Block::Option {
                letter: 'B',
                text: "4".into(),
                correct: true
            }
        );
        let spans = options[1].spans();
        assert_eq!(spans[0].tone, Tone::Correct);
        assert_eq!(spans[0].weight, Weight::Strong);
        assert_eq!(options[0].plain_text(), "    A) 3");
        assert_eq!(options[1].plain_text(), "  * B) 4");
    }

    #[test]
    fn correct_but_empty_slot_still_renders() {
        let doc = Document::from_records(&[record(3, "Pick C", ["a", "b", "", "", ""], Some(2), "General")]);
        let c = doc
            .blocks
            .iter()
            .find(|b| matches!(b, Block::Option { letter: 'C', .. }))
            .expect("option C rendered");
        assert_eq!(
            c,
            &Block::Option {
                letter: 'C',
                text: String::new(),
                correct: true
            }
        );
        assert_eq!(c.plain_text(), "  * C) (empty) [EMPTY]");
    }

    #[test]
    fn category_line_only_for_non_default() {
        let doc = Document::from_records(&[
            record(1, "a", ["x", "", "", "", ""], Some(0), "general"),
            record(2, "b", ["x", "", "", "", ""], Some(0), "History"),
        ]);
        let categories: Vec<&Block> = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Category(_)))
            .collect();
        assert_eq!(categories, vec![&Block::Category("History".into())]);
        assert!(doc.plain_text().contains("    Category: History"));
    }

    #[test]
    fn separators_sit_between_questions() {
        let doc = Document::from_records(&[
            record(1, "a", ["x", "", "", "", ""], Some(0), "General"),
            record(2, "b", ["x", "", "", "", ""], Some(0), "General"),
            record(3, "c", ["x", "", "", "", ""], Some(0), "General"),
        ]);
        let separators = doc.blocks.iter().filter(|b| **b == Block::Separator).count();
        assert_eq!(separators, 2);
        assert_ne!(doc.blocks.last(), Some(&Block::Separator));
        assert_eq!(doc.blocks[0], Block::Title(DOCUMENT_TITLE.into()));
    }

    #[test]
    fn pagination_keeps_every_block_once() {
        let records: Vec<QuestionRecord> = (1..=9)
            .map(|i| record(i, "q", ["a", "b", "c", "", ""], Some(1), "Math"))
            .collect();
        let doc = Document::from_records(&records);
        for per_page in [1, 3, 7, 10, 100] {
            let pages = doc.paginate(per_page);
            let rejoined: Vec<&Block> = pages
                .iter()
                .flat_map(|p| p.blocks.iter())
                .filter(|b| **b != Block::Separator)
                .collect();
            let expected: Vec<&Block> =
                doc.blocks.iter().filter(|b| **b != Block::Separator).collect();
            assert_eq!(rejoined, expected, "lines per page: {per_page}");
            assert!(pages.iter().all(|p| p.blocks.first() != Some(&Block::Separator)));
            assert!(pages.iter().all(|p| p.blocks.len() <= per_page));
            assert!(pages.iter().enumerate().all(|(i, p)| p.number == i + 1));
        }
    }

    #[test]
    fn pagination_moves_whole_question_to_next_page() {
        // title + heading + 3 options + category = 6, then separator + 5 per question
        let records: Vec<QuestionRecord> = (1..=2)
            .map(|i| record(i, "q", ["a", "b", "c", "", ""], Some(1), "Math"))
            .collect();
        let doc = Document::from_records(&records);
        let pages = doc.paginate(9);
        assert_eq!(pages.len(), 2);
        assert!(matches!(pages[1].blocks[0], Block::Heading { ordinal: 2, .. }));
    }

    #[test]
    fn title_stays_with_first_question() {
        // title + heading + five options = 7 blocks, one more than a page
        let records = [record(1, "q", ["a", "b", "c", "d", "e"], Some(0), "General")];
        let doc = Document::from_records(&records);
        let pages = doc.paginate(6);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].blocks.len(), 6);
        assert!(matches!(pages[0].blocks[1], Block::Heading { ordinal: 1, .. }));
    }

    #[test]
    fn no_page_starts_with_a_separator() {
        // title + 2 per question + separators between
        let records: Vec<QuestionRecord> = (1..=4)
            .map(|i| record(i, "q", ["a", "", "", "", ""], Some(0), "General"))
            .collect();
        let doc = Document::from_records(&records);
        let pages = doc.paginate(3);
        assert!(pages.len() > 1);
        for page in &pages[1..] {
            assert!(matches!(page.blocks[0], Block::Heading { .. }));
        }
    }

    #[test]
    fn empty_document_is_one_page() {
        let doc = Document::from_records(&[]);
        let pages = doc.paginate(40);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].blocks, doc.blocks.as_slice());
    }
}

use colored::{ColoredString, Colorize};
use comfy_table::{Attribute, Cell, Color, Table};
use log::debug;
use sorubankasi::libsoru::document::{build_print_document, Block, Document, Weight};
use sorubankasi::libsoru::question::{letter_index, option_letter, QuestionRecord, OPTION_COUNT};
use sorubankasi::libsoru::QuestionStore;
use sorubankasi::shell::{
    submit_question, ShellActions, ShellRequest, Submission, NOTHING_TO_PREVIEW,
    NOTHING_TO_PRINT, QUESTION_ADDED, QUESTION_NOT_ADDED,
};
use sorubankasi::theme::{Rgb, Theme};
use std::io::{self, BufRead, Write};

const TEXT_WIDTH: usize = 32;
const OPTION_WIDTH: usize = 10;
const LIST_HEADER: [&str; 8] = ["ID", "Question Text", "A", "B", "C", "D", "E", "Answer"];

fn paint(text: &str, colour: Rgb) -> ColoredString {
    text.truecolor(colour.0, colour.1, colour.2)
}

/// Prompts and reads one line from `input`. `None` once the input is closed.
fn read_line_from(input: &mut dyn BufRead, prompt: &str) -> Option<String> {
    print!("{} ", prompt.cyan());
    let _ = io::stdout().flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => {
            debug!("[CLI] Input closed");
            None
        }
        Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        Err(err) => {
            debug!("[CLI] Input failed: {:?}", err);
            None
        }
    }
}

/// Shortens `text` to `width` characters, marking the cut with '…'.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Cells of the question list, one row per question.
fn list_rows(questions: &[QuestionRecord]) -> Vec<Vec<String>> {
    questions
        .iter()
        .map(|q| {
            let mut row = vec![q.id.to_string(), fit(&q.text, TEXT_WIDTH)];
            row.extend(q.options.iter().map(|o| fit(o, OPTION_WIDTH)));
            row.push(q.answer_label());
            row
        })
        .collect()
}

fn list_table(questions: &[QuestionRecord], theme: &Theme) -> Table {
    let Rgb(r, g, b) = theme.navy_primary;
    let mut table = Table::new();
    table.set_header(LIST_HEADER.iter().map(|h| {
        Cell::new(h)
            .fg(Color::Rgb { r, g, b })
            .add_attribute(Attribute::Bold)
    }));
    for row in list_rows(questions) {
        table.add_row(row);
    }
    table
}

fn render_block(block: &Block, theme: &Theme) -> String {
    block
        .spans()
        .iter()
        .map(|span| {
            let mut text = paint(&span.text, theme.tone(span.tone));
            if span.weight == Weight::Strong {
                text = text.bold();
            }
            if span.italic {
                text = text.italic();
            }
            text.to_string()
        })
        .collect()
}

pub struct CliShell<'a> {
    store: &'a QuestionStore,
    theme: Theme,
    lines_per_page: usize,
    input: Box<dyn BufRead + 'a>,
    running: bool,
}

impl<'a> CliShell<'a> {
    pub fn new(
        store: &'a QuestionStore,
        theme: Theme,
        lines_per_page: usize,
        input: impl BufRead + 'a,
    ) -> Self {
        Self {
            store,
            theme,
            lines_per_page,
            input: Box::new(input),
            running: true,
        }
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let line = read_line_from(&mut self.input, prompt);
        if line.is_none() {
            self.running = false;
        }
        line
    }

    /// Asks for every field of a new question. `None` if the input closes
    /// half way.
    fn read_question(&mut self) -> Option<(String, Vec<String>, Option<usize>, String)> {
        let text = self.read_line("Question text:")?;
        let mut options = Vec::with_capacity(OPTION_COUNT);
        for idx in 0..OPTION_COUNT {
            options.push(self.read_line(&format!("Option {}:", option_letter(idx)))?);
        }
        let correct = self.read_line("Correct option (A-E):")?;
        let category = self.read_line("Category [General]:")?;
        Some((text, options, letter_index(&correct), category))
    }

    fn print_menu(&self) {
        let menu: Vec<String> = ShellRequest::ALL
            .iter()
            .map(|r| format!("{}. {}", r.key().bold(), r.label()))
            .collect();
        println!("{}", menu.join("   "));
    }

    fn printable_document(&self, empty_message: &str) -> Option<Document> {
        let document = build_print_document(self.store);
        if document.is_empty_notice() {
            println!("{}", empty_message.yellow());
            return None;
        }
        Some(document)
    }
}

pub fn cli_loop(store: &QuestionStore, theme: Theme, lines_per_page: usize) {
    let mut shell = CliShell::new(store, theme, lines_per_page, io::stdin().lock());
    shell.run();
}

impl CliShell<'_> {
    fn run(&mut self) {
        self.on_home_requested();
        while self.running {
            self.print_menu();
            let Some(choice) = self.read_line(">") else {
                break;
            };
            match ShellRequest::from_key(&choice) {
                Some(request) => {
                    debug!("[CLI] request: {:?}", request);
                    request.dispatch(self);
                }
                None => println!("{}", format!("Unknown choice {:?}.", choice).bright_red()),
            }
        }
        println!("{}", "Goodbye!".cyan());
    }
}

impl ShellActions for CliShell<'_> {
    fn on_home_requested(&mut self) {
        println!(
            "{}",
            paint("==========> Mini Soru Bankası <==========", self.theme.navy_accent).bold()
        );
        println!("{}", "Create your questions, organise them and get ready for exams.".italic());
    }

    fn on_add_requested(&mut self) {
        let Some((text, options, correct_index, category)) = self.read_question() else {
            return;
        };
        match submit_question(self.store, &text, &options, correct_index, &category) {
            Submission::Saved => println!("{}", QUESTION_ADDED.bright_green()),
            Submission::Rejected(err) => println!("{}", err.to_string().yellow()),
            Submission::StoreFailed => println!(
                "{} {}",
                QUESTION_NOT_ADDED.bright_red(),
                "Please try again.".bright_red()
            ),
        }
    }

    fn on_view_requested(&mut self) {
        let questions = self.store.get_all_questions();
        println!("\n{}", list_table(&questions, &self.theme));
        println!("{}", format!("{} questions", questions.len()).cyan());
    }

    fn on_print_requested(&mut self) {
        let Some(document) = self.printable_document(NOTHING_TO_PRINT) else {
            return;
        };
        for block in &document.blocks {
            println!("{}", render_block(block, &self.theme));
        }
    }

    fn on_preview_requested(&mut self) {
        let Some(document) = self.printable_document(NOTHING_TO_PREVIEW) else {
            return;
        };
        let pages = document.paginate(self.lines_per_page);
        for page in &pages {
            println!(
                "{}",
                format!("──────── Page {}/{} ────────", page.number, pages.len()).cyan()
            );
            for block in page.blocks {
                println!("{}", render_block(block, &self.theme));
            }
            if page.number < pages.len() {
                match self.read_line("Enter for next page, q to close:") {
                    Some(input) if input.trim().eq_ignore_ascii_case("q") => break,
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn on_exit_requested(&mut self) {
        self.running = false;
    }
}

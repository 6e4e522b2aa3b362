use crate::Error;
use eframe::egui;
use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use log::{debug, error, info};
use sorubankasi::libsoru::document::{build_print_document, Block, Document, Weight};
use sorubankasi::libsoru::question::{option_letter, QuestionRecord, DEFAULT_CATEGORY, OPTION_COUNT};
use sorubankasi::libsoru::QuestionStore;
use sorubankasi::print::{point_size, write_html};
use sorubankasi::shell::{
    submit_question, ShellActions, ShellRequest, Submission, NOTHING_TO_PREVIEW,
    NOTHING_TO_PRINT, QUESTION_ADDED, QUESTION_NOT_ADDED,
};
use sorubankasi::theme::{Rgb, Theme};
use std::path::PathBuf;

fn colour(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Welcome,
    QuestionList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageKind {
    Information,
    Warning,
    Critical,
}

#[derive(Debug, Clone)]
struct Message {
    kind: MessageKind,
    title: String,
    text: String,
}

/// Contents of the add-question window while it is open.
#[derive(Debug, Clone)]
struct QuestionDraft {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: Option<usize>,
    category: String,
}

impl Default for QuestionDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            options: Default::default(),
            correct_index: None,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

struct Preview {
    document: Document,
    page: usize,
}

pub struct GuiState<'a> {
    store: &'a QuestionStore,
    theme: Theme,
    lines_per_page: usize,
    print_to: PathBuf,

    screen: Screen,
    questions: Vec<QuestionRecord>,
    draft: Option<QuestionDraft>,
    preview: Option<Preview>,
    message: Option<Message>,
    exit_requested: bool,
}

impl<'a> GuiState<'a> {
    fn new(
        ctx: &eframe::CreationContext,
        store: &'a QuestionStore,
        theme: Theme,
        lines_per_page: usize,
        print_to: PathBuf,
    ) -> Self {
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = colour(theme.off_white);
        visuals.window_fill = colour(theme.white);
        visuals.selection.bg_fill = colour(theme.navy_accent);
        ctx.egui_ctx.set_visuals(visuals);

        Self::with_store(store, theme, lines_per_page, print_to)
    }

    fn with_store(
        store: &'a QuestionStore,
        theme: Theme,
        lines_per_page: usize,
        print_to: PathBuf,
    ) -> Self {
        Self {
            store,
            theme,
            lines_per_page,
            print_to,

            screen: Screen::Welcome,
            questions: Vec::new(),
            draft: None,
            preview: None,
            message: None,
            exit_requested: false,
        }
    }

    fn show_message(&mut self, kind: MessageKind, title: &str, text: impl Into<String>) {
        self.message = Some(Message {
            kind,
            title: title.to_string(),
            text: text.into(),
        });
    }

    fn load_questions(&mut self) {
        self.questions = self.store.get_all_questions();
        debug!("[GUI] Loaded {} questions", self.questions.len());
    }

    /// Document for print or preview, or `None` (with a message) when there
    /// is nothing to show.
    fn printable_document(&mut self, title: &str, empty_message: &str) -> Option<Document> {
        let document = build_print_document(self.store);
        if document.is_empty_notice() {
            self.show_message(MessageKind::Information, title, empty_message);
            return None;
        }
        Some(document)
    }

    fn accent_button(&self, ui: &mut Ui, label: &str, fill: Rgb) -> bool {
        let text = RichText::new(label)
            .size(18.0)
            .strong()
            .color(colour(self.theme.text_on_dark));
        ui.add_sized(
            [240.0, 55.0],
            egui::Button::new(text).fill(colour(fill)),
        )
        .clicked()
    }

    fn draw_menu(&self, ui: &mut Ui) -> Option<ShellRequest> {
        let mut request = None;
        egui::menu::bar(ui, |ui| {
            if ui.button(ShellRequest::Home.label()).clicked() {
                request = Some(ShellRequest::Home);
            }
            ui.menu_button("Print", |ui| {
                for r in [ShellRequest::Print, ShellRequest::Preview] {
                    if ui.button(r.label()).clicked() {
                        request = Some(r);
                        ui.close_menu();
                    }
                }
            });
            ui.menu_button("System", |ui| {
                if ui.button(ShellRequest::Exit.label()).clicked() {
                    request = Some(ShellRequest::Exit);
                    ui.close_menu();
                }
            });
        });
        request
    }

    fn draw_welcome(&self, ui: &mut Ui) -> Option<ShellRequest> {
        let mut request = None;
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.2);
            ui.label(
                RichText::new("Mini Soru Bankası")
                    .size(44.0)
                    .strong()
                    .color(colour(self.theme.navy_primary)),
            );
            ui.label(
                RichText::new("Create your questions, organise them and get ready for exams.")
                    .size(15.0)
                    .color(colour(self.theme.navy_accent)),
            );
            ui.add_space(35.0);
            ui.horizontal(|ui| {
                let width = 240.0 * 2.0 + 25.0;
                ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));
                if self.accent_button(ui, ShellRequest::AddQuestion.label(), self.theme.red_primary) {
                    request = Some(ShellRequest::AddQuestion);
                }
                ui.add_space(25.0);
                if self.accent_button(ui, ShellRequest::ViewQuestions.label(), self.theme.navy_primary) {
                    request = Some(ShellRequest::ViewQuestions);
                }
            });
        });
        request
    }

    fn draw_question_list(&mut self, ui: &mut Ui) {
        egui::TopBottomPanel::bottom("list_controls").show_inside(ui, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh List").clicked() {
                    self.load_questions();
                }
                ui.label(format!("{} questions", self.questions.len()));
            });
        });

        let header_colour = colour(self.theme.navy_primary);
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::auto())
            .column(Column::initial(320.0).at_least(200.0).clip(true))
            .columns(Column::initial(90.0).clip(true), OPTION_COUNT)
            .column(Column::remainder())
            .header(24.0, |mut header| {
                let titles = ["ID", "Question Text", "A", "B", "C", "D", "E", "Answer"];
                for title in titles {
                    header.col(|ui| {
                        ui.label(RichText::new(title).strong().color(header_colour));
                    });
                }
            })
            .body(|mut body| {
                for question in &self.questions {
                    body.row(22.0, |mut row| {
                        row.col(|ui| {
                            ui.label(question.id.to_string());
                        });
                        row.col(|ui| {
                            ui.label(&question.text);
                        });
                        for option in &question.options {
                            row.col(|ui| {
                                ui.label(option);
                            });
                        }
                        row.col(|ui| {
                            ui.label(question.answer_label());
                        });
                    });
                }
            });
    }

    fn draw_add_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut draft) = self.draft.take() else {
            return;
        };
        let mut open = true;
        let mut save = false;
        let label_colour = colour(self.theme.navy_primary);

        egui::Window::new("Add New Question")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .min_width(550.0)
            .show(ctx, |ui| {
                ui.label(RichText::new("QUESTION TEXT:").strong().color(label_colour));
                ui.add(
                    egui::TextEdit::multiline(&mut draft.text)
                        .hint_text("Write your question here in detail...")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(10.0);
                ui.label(
                    RichText::new("OPTIONS AND CORRECT ANSWER:")
                        .strong()
                        .color(label_colour),
                );
                for (idx, option) in draft.options.iter_mut().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!("{}:", option_letter(idx)));
                        ui.add(
                            egui::TextEdit::singleline(option)
                                .hint_text(format!("Option {}", option_letter(idx)))
                                .desired_width(360.0),
                        );
                        ui.radio_value(&mut draft.correct_index, Some(idx), "Correct");
                    });
                }
                ui.add_space(10.0);
                ui.label(RichText::new("CATEGORY (optional):").strong().color(label_colour));
                ui.add(
                    egui::TextEdit::singleline(&mut draft.category)
                        .hint_text("e.g. History, Mathematics..."),
                );
                ui.add_space(10.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = RichText::new("SAVE QUESTION")
                        .strong()
                        .color(colour(self.theme.text_on_dark));
                    if ui
                        .add(egui::Button::new(text).fill(colour(self.theme.red_primary)))
                        .clicked()
                    {
                        save = true;
                    }
                });
            });

        if save && self.save_draft(&draft) {
            return;
        }
        if open {
            self.draft = Some(draft);
        }
    }

    /// Returns `true` when the draft was stored and the dialog can close.
    fn save_draft(&mut self, draft: &QuestionDraft) -> bool {
        let outcome = submit_question(
            self.store,
            &draft.text,
            &draft.options,
            draft.correct_index,
            &draft.category,
        );
        match &outcome {
            Submission::Saved => {
                self.show_message(MessageKind::Information, "Success", QUESTION_ADDED);
                if self.screen == Screen::QuestionList {
                    self.load_questions();
                }
            }
            Submission::Rejected(err) => {
                self.show_message(MessageKind::Warning, "Missing Information", err.to_string())
            }
            Submission::StoreFailed => {
                self.show_message(MessageKind::Critical, "Error", QUESTION_NOT_ADDED)
            }
        }
        !outcome.keeps_form_open()
    }

    fn draw_block(&self, ui: &mut Ui, block: &Block) {
        if *block == Block::Separator {
            ui.add_space(12.0);
            return;
        }
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for span in block.spans() {
                let mut text = RichText::new(span.text)
                    .size(point_size(span.size) * 1.4)
                    .color(colour(self.theme.tone(span.tone)));
                if span.weight == Weight::Strong {
                    text = text.strong();
                }
                if span.italic {
                    text = text.italics();
                }
                ui.label(text);
            }
        });
    }

    fn draw_preview(&mut self, ctx: &egui::Context) {
        let Some(mut preview) = self.preview.take() else {
            return;
        };
        let mut open = true;
        let page_fill = colour(self.theme.white);
        let border = colour(self.theme.border);

        egui::Window::new("Print Preview")
            .open(&mut open)
            .default_size([620.0, 760.0])
            .show(ctx, |ui| {
                let pages = preview.document.paginate(self.lines_per_page);
                preview.page = preview.page.min(pages.len().saturating_sub(1));
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(preview.page > 0, egui::Button::new("◀ Previous"))
                        .clicked()
                    {
                        preview.page -= 1;
                    }
                    ui.label(format!("Page {} / {}", preview.page + 1, pages.len()));
                    if ui
                        .add_enabled(preview.page + 1 < pages.len(), egui::Button::new("Next ▶"))
                        .clicked()
                    {
                        preview.page += 1;
                    }
                });
                ui.separator();
                ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
                    egui::Frame::canvas(ui.style())
                        .fill(page_fill)
                        .stroke(egui::Stroke::new(1.0, border))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            if let Some(page) = pages.get(preview.page) {
                                for block in page.blocks {
                                    self.draw_block(ui, block);
                                }
                            }
                        });
                });
            });

        if open {
            self.preview = Some(preview);
        }
    }

    fn draw_message(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.message else {
            return;
        };
        let mut dismissed = false;
        let tint = match message.kind {
            MessageKind::Information => colour(self.theme.navy_primary),
            MessageKind::Warning => colour(self.theme.red_accent),
            MessageKind::Critical => colour(self.theme.red_primary),
        };
        egui::Window::new(&message.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(&message.text).color(tint));
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.message = None;
        }
    }
}

impl ShellActions for GuiState<'_> {
    fn on_home_requested(&mut self) {
        self.screen = Screen::Welcome;
    }

    fn on_add_requested(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(QuestionDraft::default());
        }
    }

    fn on_view_requested(&mut self) {
        self.screen = Screen::QuestionList;
        self.load_questions();
    }

    fn on_print_requested(&mut self) {
        let Some(document) = self.printable_document("Printing", NOTHING_TO_PRINT) else {
            return;
        };
        match write_html(&document, &self.theme, self.lines_per_page, &self.print_to) {
            Ok(()) => self.show_message(
                MessageKind::Information,
                "Printing",
                format!(
                    "Questions were written to {}. Open it in a browser to print.",
                    self.print_to.display()
                ),
            ),
            Err(err) => {
                error!("[Print] Cannot write {:?}: {}", self.print_to, err);
                self.show_message(
                    MessageKind::Critical,
                    "Printing",
                    format!("Cannot write {}: {}", self.print_to.display(), err),
                );
            }
        }
    }

    fn on_preview_requested(&mut self) {
        if let Some(document) = self.printable_document("Print Preview", NOTHING_TO_PREVIEW) {
            self.preview = Some(Preview { document, page: 0 });
        }
    }

    fn on_exit_requested(&mut self) {
        self.exit_requested = true;
    }
}

impl eframe::App for GuiState<'_> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut requests = Vec::new();

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            requests.extend(self.draw_menu(ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Welcome => requests.extend(self.draw_welcome(ui)),
            Screen::QuestionList => self.draw_question_list(ui),
        });

        self.draw_add_dialog(ctx);
        self.draw_preview(ctx);
        self.draw_message(ctx);

        for request in requests {
            debug!("[GUI] request: {:?}", request);
            request.dispatch(self);
        }
        if self.exit_requested {
            info!("[GUI] Closing");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

pub fn init_gui(
    store: &QuestionStore,
    theme: Theme,
    lines_per_page: usize,
    print_to: PathBuf,
) -> Result<(), Error> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Mini Soru Bankası",
        native_options,
        Box::new(|cc| {
            Ok(Box::new(GuiState::new(
                cc,
                store,
                theme,
                lines_per_page,
                print_to,
            )))
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sorubankasi::libsoru::DB_NAME;
    use tempfile::TempDir;

    fn store() -> (TempDir, QuestionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = QuestionStore::new(dir.path().join(DB_NAME));
        store.initialize().unwrap();
        (dir, store)
    }

    fn draft(text: &str, correct_index: Option<usize>) -> QuestionDraft {
        QuestionDraft {
            text: text.to_string(),
            options: ["3", "4", "", "", ""].map(String::from),
            correct_index,
            category: "Math".to_string(),
        }
    }

    fn message_kind(state: &GuiState) -> Option<MessageKind> {
        state.message.as_ref().map(|m| m.kind)
    }

    #[test]
    fn saved_draft_closes_dialog_and_refreshes_list() {
        let (dir, store) = store();
        let mut state = GuiState::with_store(&store, Theme::default(), 40, dir.path().join("out.html"));
        state.on_view_requested();
        assert!(state.questions.is_empty());

        assert!(state.save_draft(&draft("What is 2+2?", Some(1))));
        assert_eq!(message_kind(&state), Some(MessageKind::Information));
        assert_eq!(state.questions.len(), 1);
        assert_eq!(state.questions[0].category, "Math");
    }

    #[test]
    fn list_is_not_loaded_from_welcome_screen() {
        let (dir, store) = store();
        let mut state = GuiState::with_store(&store, Theme::default(), 40, dir.path().join("out.html"));

        assert!(state.save_draft(&draft("What is 2+2?", Some(1))));
        assert_eq!(state.screen, Screen::Welcome);
        assert!(state.questions.is_empty());
        assert_eq!(store.get_all_questions().len(), 1);
    }

    #[test]
    fn incomplete_draft_warns_and_stays_open() {
        let (dir, store) = store();
        let mut state = GuiState::with_store(&store, Theme::default(), 40, dir.path().join("out.html"));

        assert!(!state.save_draft(&draft("What is 2+2?", None)));
        assert_eq!(message_kind(&state), Some(MessageKind::Warning));
        assert!(store.get_all_questions().is_empty());
    }

    #[test]
    fn store_error_is_critical_and_stays_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuestionStore::new(dir.path().join("missing").join(DB_NAME));
        let mut state = GuiState::with_store(&store, Theme::default(), 40, dir.path().join("out.html"));

        assert!(!state.save_draft(&draft("What is 2+2?", Some(1))));
        assert_eq!(message_kind(&state), Some(MessageKind::Critical));
    }
}

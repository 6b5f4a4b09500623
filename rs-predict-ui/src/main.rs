use std::time::{Duration, Instant};

use eframe::{egui, Frame};
use egui::Context;

use reqwest::blocking::Client;
use reqwest::Result;
use serde::{Deserialize, Serialize};

/// Delay between the last keystroke and the prediction request.
const PREDICT_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long a notification replaces the status line.
const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Time window for the second click on "Clear dictionary".
const CLEAR_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Id of the main editor, used to check its focus and move its cursor.
const EDITOR_ID: &str = "editor";

/// Orders offered in the drop-down.
const ORDERS: [usize; 4] = [2, 3, 4, 5];

#[derive(Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SettingsBody {
    n: usize,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    n: usize,
    patterns: usize,
    vocab_size: usize,
}

/// REST context holding a reusable blocking HTTP client.
struct RESTContext {
    client: Client,
    base_url: String,
}

impl RESTContext {
    /// Creates a new REST context with a timeout.
    ///
    /// The API location is read from `PREDICT_API_URL`
    /// (default `http://127.0.0.1:5000`).
    fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::new(5, 0))
            .build()?;
        let base_url = std::env::var("PREDICT_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_owned())
            .trim_end_matches('/')
            .to_owned();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a POST request to `/api/predict`.
    fn predict(&self, text: &str) -> Result<Vec<String>> {
        let response: PredictResponse = self.client
            .post(self.url("/api/predict"))
            .json(&TextBody { text })
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.predictions)
    }

    /// Sends a POST request to `/api/train`.
    fn train(&self, text: &str) -> Result<()> {
        self.client
            .post(self.url("/api/train"))
            .json(&TextBody { text })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Sends a POST request to `/api/clear`.
    fn clear(&self) -> Result<()> {
        self.client
            .post(self.url("/api/clear"))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Sends a POST request to `/api/settings`.
    fn set_order(&self, n: usize) -> Result<()> {
        self.client
            .post(self.url("/api/settings"))
            .json(&SettingsBody { n })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Sends a GET request to `/api/status`.
    fn status(&self) -> Result<StatusResponse> {
        self.client
            .get(self.url("/api/status"))
            .send()?
            .error_for_status()?
            .json()
    }
}

/// Human name of an n-gram order.
fn order_name(n: usize) -> String {
    match n {
        2 => "Bigram".to_owned(),
        3 => "Trigram".to_owned(),
        n => format!("{n}-gram"),
    }
}

/// Returns the last sentence of `text` if it was just completed by a `.`.
fn last_sentence(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if !trimmed.ends_with('.') {
        return None;
    }
    trimmed
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Appends `word` to `text` with a single separating space and a trailing one.
fn append_word(text: &mut String, word: &str) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
    text.push_str(word);
    text.push(' ');
}

/// Consumes a Tab or Enter press, returns `true` if one was pressed.
///
/// Must run before the editor is drawn, so the key never reaches it.
fn take_accept_key(input: &mut egui::InputState) -> bool {
    let tab = input.consume_key(egui::Modifiers::NONE, egui::Key::Tab);
    let enter = input.consume_key(egui::Modifiers::NONE, egui::Key::Enter);
    tab || enter
}

/// Two-click confirmation: the first press arms, a second press within
/// `CLEAR_CONFIRM_WINDOW` confirms.
#[derive(Default)]
struct ClearConfirm {
    armed_at: Option<Instant>,
}

impl ClearConfirm {
    /// Registers a press at `now`, returns `true` when it confirms.
    fn press(&mut self, now: Instant) -> bool {
        match self.armed_at.take() {
            Some(armed_at) if now.duration_since(armed_at) <= CLEAR_CONFIRM_WINDOW => true,
            _ => {
                self.armed_at = Some(now);
                false
            }
        }
    }

    fn is_armed(&self, now: Instant) -> bool {
        self.armed_at
            .is_some_and(|armed_at| now.duration_since(armed_at) <= CLEAR_CONFIRM_WINDOW)
    }
}

fn word_count_label(text: &str) -> String {
    let count = text.split_whitespace().count();
    format!("{} word{}", count, if count == 1 { "" } else { "s" })
}

/// Puts the editor cursor after the last character of `text`.
fn move_cursor_to_end(ctx: &Context, text: &str) {
    let id = egui::Id::new(EDITOR_ID);
    if let Some(mut state) = egui::TextEdit::load_state(ctx, id) {
        let end = egui::text::CCursor::new(text.chars().count());
        state.cursor.set_char_range(Some(egui::text::CCursorRange::one(end)));
        state.store(ctx, id);
    }
}

/// Global UI state (MUST persist between frames in egui).
struct PredictUI {
    rest: RESTContext,

    text: String,
    suggestions: Vec<String>,
    predict_pending: Option<Instant>,

    corpus: String,
    order: usize,
    auto_learn: bool,

    status_line: String,
    toast: Option<(String, Instant)>,
    clear_confirm: ClearConfirm,
}

impl PredictUI {
    /// Initializes the UI and fetches the model status.
    fn new() -> Result<Self> {
        let mut ui = Self {
            rest: RESTContext::new()?,

            text: String::new(),
            suggestions: Vec::new(),
            predict_pending: None,

            corpus: String::new(),
            order: 2,
            auto_learn: false,

            status_line: String::new(),
            toast: None,
            clear_confirm: ClearConfirm::default(),
        };
        ui.refresh_status();
        Ok(ui)
    }

    fn notify(&mut self, message: String) {
        self.toast = Some((message, Instant::now()));
    }

    /// Performs the status request and updates the status line.
    fn refresh_status(&mut self) {
        match self.rest.status() {
            Ok(status) => {
                self.order = status.n;
                self.status_line = format!(
                    "Model: {} ({} patterns, {} words)",
                    order_name(status.n), status.patterns, status.vocab_size
                );
            }
            Err(e) => self.status_line = format!("Error: {e}"),
        }
    }

    /// Performs the prediction request for the current text.
    fn fetch_predictions(&mut self) {
        if self.text.trim().is_empty() {
            self.suggestions.clear();
            return;
        }
        match self.rest.predict(&self.text) {
            Ok(predictions) => self.suggestions = predictions,
            Err(e) => {
                log::warn!("Prediction failed: {e}");
                self.suggestions.clear();
            }
        }
    }

    /// Performs the train request.
    fn train(&mut self, text: &str) {
        match self.rest.train(text) {
            Ok(()) => {
                self.notify("Model trained successfully!".to_owned());
                self.refresh_status();
            }
            Err(e) => self.notify(format!("Error: {e}")),
        }
    }

    /// Performs the clear request.
    fn clear(&mut self) {
        match self.rest.clear() {
            Ok(()) => {
                self.text.clear();
                self.suggestions.clear();
                self.notify("Dictionary cleared.".to_owned());
                self.refresh_status();
            }
            Err(e) => self.notify(format!("Error: {e}")),
        }
    }

    /// Performs the settings request.
    fn set_order(&mut self, n: usize) {
        if let Err(e) = self.rest.set_order(n) {
            self.notify(format!("Error: {e}"));
        }
        self.refresh_status();
    }

    /// Appends a suggested word to the text and asks for the next one.
    fn insert_suggestion(&mut self, ctx: &Context, word: &str) {
        append_word(&mut self.text, word);
        move_cursor_to_end(ctx, &self.text);
        self.fetch_predictions();
    }

    fn on_text_changed(&mut self) {
        self.predict_pending = Some(Instant::now());
        if self.auto_learn {
            if let Some(sentence) = last_sentence(&self.text).map(str::to_owned) {
                self.train(&sentence);
            }
        }
    }
}

impl eframe::App for PredictUI {
    /// UI update loop (called every frame).
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        // Debounced prediction
        if let Some(since) = self.predict_pending {
            let elapsed = since.elapsed();
            if elapsed >= PREDICT_DEBOUNCE {
                self.predict_pending = None;
                self.fetch_predictions();
            } else {
                ctx.request_repaint_after(PREDICT_DEBOUNCE - elapsed);
            }
        }

        if let Some((_, since)) = &self.toast {
            if since.elapsed() >= TOAST_DURATION {
                self.toast = None;
            } else {
                ctx.request_repaint_after(TOAST_DURATION);
            }
        }

        // Tab / Enter in the editor accepts the first suggestion
        let editor_id = egui::Id::new(EDITOR_ID);
        if !self.suggestions.is_empty()
            && ctx.memory(|m| m.has_focus(editor_id))
            && ctx.input_mut(take_accept_key)
        {
            let word = self.suggestions[0].clone();
            self.insert_suggestion(ctx, &word);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            // Editor, focus is locked so Tab does not leave it
            let response = ui.add_sized(
                [ui.available_width(), 120.0],
                egui::TextEdit::multiline(&mut self.text)
                    .id(editor_id)
                    .lock_focus(true)
                    .hint_text("Start typing... (Tab or Enter accepts the first suggestion)"),
            );
            if response.changed() {
                self.on_text_changed();
            }
            ui.label(word_count_label(&self.text));

            // Suggestions
            let mut chosen = None;
            ui.horizontal_wrapped(|ui| {
                if self.suggestions.is_empty() {
                    ui.weak("Continue typing...");
                }
                for word in &self.suggestions {
                    if ui.button(word).clicked() {
                        chosen = Some(word.clone());
                    }
                }
            });
            if let Some(word) = chosen {
                self.insert_suggestion(ctx, &word);
            }

            ui.separator();

            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    // Order
                    ui.label("N-gram order");
                    let previous_order = self.order;
                    egui::ComboBox::from_id_salt("order")
                        .selected_text(order_name(self.order))
                        .show_ui(ui, |ui| {
                            for n in ORDERS {
                                ui.selectable_value(&mut self.order, n, order_name(n));
                            }
                        });
                    if self.order != previous_order {
                        let order = self.order;
                        self.set_order(order);
                    }
                    ui.end_row();

                    // Auto learn
                    ui.label("Learn finished sentences");
                    ui.checkbox(&mut self.auto_learn, "");
                    ui.end_row();
                });

            ui.separator();

            // Training corpus
            ui.label("Training text");
            ui.add_sized(
                [ui.available_width(), 80.0],
                egui::TextEdit::multiline(&mut self.corpus),
            );
            ui.horizontal(|ui| {
                if ui.button("Train").clicked() && !self.corpus.trim().is_empty() {
                    let corpus = std::mem::take(&mut self.corpus);
                    self.train(&corpus);
                }
                let now = Instant::now();
                let label = if self.clear_confirm.is_armed(now) {
                    "Click again to clear"
                } else {
                    "Clear dictionary"
                };
                if ui.button(label).clicked() && self.clear_confirm.press(now) {
                    self.clear();
                }
                if self.clear_confirm.is_armed(now) {
                    ui.ctx().request_repaint_after(CLEAR_CONFIRM_WINDOW);
                }
            });

            ui.separator();

            match &self.toast {
                Some((message, _)) => ui.colored_label(ui.visuals().hyperlink_color, message),
                None => ui.label(&self.status_line),
            };
        });
    }
}

/// Application entry point.
fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 480.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "rs-predict",
        options,
        Box::new(|_| Ok(Box::new(PredictUI::new()?))),
    )
}

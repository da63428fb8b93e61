use std::mem;

use anyhow::{anyhow, Result};
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::BookRepository;
use crate::loans::LoanLedger;
use crate::models::Book;
use crate::store::StoreAdapter;
use crate::views::{active_loan_rows, distinct_facet_values, filtered_books, BookFilter, Facet};

use super::forms::{BookField, BookForm, ConfirmBookDelete, LoanField, LoanForm};
use super::helpers::{build_book_cover_lines, centered_rect, format_date, surface_error};

/// Number of book cards shown in each row of the main grid. Four columns are
/// a sweet spot on most terminal sizes while keeping titles legible.
const GRID_COLUMNS: usize = 4;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// ASCII textures used to decorate book covers. We rotate through the list so
/// large catalogs feel less uniform without needing image support.
const COVER_ART: &[&[&str]] = &[
    &["/\\/\\/", "\\/\\/\\"],
    &["*+*+", "+*+*"],
    &["=--=", "--=="],
    &["<>><", "><<>"],
    &["..--", "--.."],
    &["oOo ", " OoO"],
    &["##  ", "  ##"],
    &["||--", "--||"],
    &["[]__", "__[]"],
    &["~~  ", "  ~~"],
    &["^v^v", "v^v^"],
    &["::''", "''::"],
];

/// High-level navigation states. Keeping this explicit makes it easy to
/// reason about which rendering path runs and what keyboard shortcuts should
/// do.
enum Screen {
    Books,
    Loans(LoanForm),
}

/// Fine-grained modes scoped to the books screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: String, form: BookForm },
    ConfirmDelete(ConfirmBookDelete),
    TitleSearch(SearchState),
}

/// State for the inline title search. Applied live while typing.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the store handle
/// and the two repositories; everything rendered is recomputed from them each
/// frame.
pub struct App {
    store: Box<dyn StoreAdapter>,
    books: BookRepository,
    loans: LoanLedger,
    filter: BookFilter,
    cursor: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Box<dyn StoreAdapter>, books: BookRepository, loans: LoanLedger) -> Self {
        Self {
            store,
            books,
            loans,
            filter: BookFilter::default(),
            cursor: 0,
            screen: Screen::Books,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::EditingBook { id, form } => self.handle_edit_book(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::TitleSearch(state) => self.handle_title_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Books => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Left => self.move_horizontal(-1),
                    KeyCode::Right => self.move_horizontal(1),
                    KeyCode::Up => self.move_vertical(-1),
                    KeyCode::Down => self.move_vertical(1),
                    KeyCode::Enter => self.toggle_select(),
                    KeyCode::Tab => {
                        self.clear_status();
                        self.screen = Screen::Loans(LoanForm::default());
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingBook(BookForm::default()));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(book) = self.books.selected() {
                            let id = book.id.clone();
                            let form = BookForm::from_book(book);
                            self.clear_status();
                            return Ok(Mode::EditingBook { id, form });
                        }
                        self.set_status("Select a book to edit first.", StatusKind::Error);
                    }
                    KeyCode::Char('-') => {
                        if let Some(book) = self.books.selected() {
                            let confirm = ConfirmBookDelete::from(book);
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(confirm));
                        }
                        self.set_status("Select a book to delete first.", StatusKind::Error);
                    }
                    KeyCode::Char('/') => {
                        let query = self.filter.title.clone().unwrap_or_default();
                        return Ok(Mode::TitleSearch(SearchState { query }));
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => self.cycle_facet(Facet::Publisher),
                    KeyCode::Char('g') | KeyCode::Char('G') => self.cycle_facet(Facet::Language),
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        self.filter = BookFilter::default();
                        self.clamp_cursor();
                        self.set_status("Filters cleared.", StatusKind::Info);
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => self.open_current_link(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Loans(_) => {
                self.handle_loans_key(code)?;
                Ok(Mode::Normal)
            }
        }
    }

    /// Key handling for the loans screen. The form is taken out of the
    /// screen for the duration of the call so intent handlers can borrow the
    /// repositories freely.
    fn handle_loans_key(&mut self, code: KeyCode) -> Result<()> {
        let Screen::Loans(mut form) = mem::replace(&mut self.screen, Screen::Books) else {
            return Ok(());
        };
        let mut keep_open = true;

        match code {
            KeyCode::Esc => {
                self.clear_status();
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Up => {
                if form.active == LoanField::Book {
                    let len = self.available_books().len();
                    form.move_book(-1, len);
                }
            }
            KeyCode::Down => {
                if form.active == LoanField::Book {
                    let len = self.available_books().len();
                    form.move_book(1, len);
                }
            }
            KeyCode::Enter => match self.submit_loan(&form) {
                Ok(title) => {
                    form.clear();
                    self.set_status(format!("Loan created for \"{title}\"."), StatusKind::Info);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            self.screen = Screen::Loans(form);
        }
        Ok(())
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_book(&mut self, code: KeyCode, id: String, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_book(&id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingBook { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_title_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.filter.title = None;
                self.clamp_cursor();
                self.set_status("Title search cleared.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                self.apply_title_query(&state.query);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_title_query(&state.query);
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                    self.apply_title_query(&state.query);
                }
            }
            _ => {}
        }
        Ok(Mode::TitleSearch(state))
    }

    /// Update the live title filter from the search box contents. A blank
    /// query removes the criterion entirely rather than matching nothing.
    fn apply_title_query(&mut self, query: &str) {
        let trimmed = query.trim();
        self.filter.title = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.clamp_cursor();
    }

    /// Advance a facet filter through its distinct values: unset walks to the
    /// first value, the last value wraps back to unset.
    fn cycle_facet(&mut self, facet: Facet) {
        let values = distinct_facet_values(self.books.books(), facet);
        let current = match facet {
            Facet::Publisher => self.filter.publisher.clone(),
            Facet::Language => self.filter.language.clone(),
        };
        let next = match current {
            None => values.first().cloned(),
            Some(value) => match values.iter().position(|candidate| *candidate == value) {
                Some(index) if index + 1 < values.len() => Some(values[index + 1].clone()),
                _ => None,
            },
        };

        let label = match facet {
            Facet::Publisher => "Publisher",
            Facet::Language => "Language",
        };
        let message = match &next {
            Some(value) => format!("{label} filter: {value}"),
            None => format!("{label} filter cleared."),
        };
        match facet {
            Facet::Publisher => self.filter.publisher = next,
            Facet::Language => self.filter.language = next,
        }
        self.clamp_cursor();
        self.set_status(message, StatusKind::Info);
    }

    fn toggle_select(&mut self) {
        let Some(id) = self.current_book().map(|book| book.id.clone()) else {
            self.set_status("No book under the cursor.", StatusKind::Error);
            return;
        };
        self.books.select(self.store.as_ref(), &id);
        match self.books.selected() {
            Some(book) => {
                let message = format!("Selected \"{}\".", book.title);
                self.set_status(message, StatusKind::Info);
            }
            None => self.set_status("Selection cleared.", StatusKind::Info),
        }
    }

    fn open_current_link(&mut self) {
        let Some(book) = self.current_book() else {
            self.set_status("No book under the cursor.", StatusKind::Error);
            return;
        };
        if book.url.trim().is_empty() {
            self.set_status("This book has no reference link.", StatusKind::Error);
            return;
        }
        let url = book.url.clone();
        if let Err(err) = open_link(&url) {
            self.set_status(format!("Could not open link: {err}"), StatusKind::Error);
        }
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let draft = form.parse_draft()?;
        let title = draft.title.clone();
        self.books.add(self.store.as_ref(), draft);
        self.set_status(format!("Added \"{title}\"."), StatusKind::Info);
        Ok(())
    }

    fn save_existing_book(&mut self, id: &str, form: &BookForm) -> Result<()> {
        let patch = form.parse_patch()?;
        let title = patch.title.clone();
        if !self.books.update(self.store.as_ref(), id, patch) {
            return Err(anyhow!("Only the selected book can be updated."));
        }
        self.set_status(format!("Updated \"{title}\"."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        if !self.books.remove(self.store.as_ref(), &confirm.id) {
            return Err(anyhow!("Only the selected book can be deleted."));
        }
        self.clamp_cursor();
        self.set_status(format!("Deleted \"{}\".", confirm.title), StatusKind::Info);
        Ok(())
    }

    fn submit_loan(&mut self, form: &LoanForm) -> Result<String> {
        let available = self.available_books();
        let (borrower, book_id, weeks) = form.parse_inputs(&available)?;
        let title = available
            .get(form.book_cursor)
            .map(|book| book.title.clone())
            .unwrap_or_default();

        // The ledger re-checks the same invariants and silently drops bad
        // intents; reaching None here would mean the form validation and the
        // ledger disagree.
        self.loans
            .create_loan(self.store.as_ref(), &borrower, &book_id, weeks)
            .ok_or_else(|| anyhow!("Loan request was rejected."))?;
        Ok(title)
    }

    /// Books not referenced by any loan, in catalog order.
    fn available_books(&self) -> Vec<&Book> {
        let ids = self.loans.available_book_ids(&self.books.ids());
        ids.iter().filter_map(|id| self.books.get(id)).collect()
    }

    fn visible_books(&self) -> Vec<&Book> {
        filtered_books(self.books.books(), &self.filter)
    }

    fn current_book(&self) -> Option<&Book> {
        self.visible_books().get(self.cursor).copied()
    }

    fn visible_count(&self) -> usize {
        self.visible_books().len()
    }

    fn row_count(&self) -> usize {
        let cols = GRID_COLUMNS.max(1);
        (self.visible_count() + cols - 1) / cols
    }

    fn move_horizontal(&mut self, offset: isize) {
        if self.visible_count() == 0 {
            return;
        }
        let new_index = self.cursor as isize + offset;
        if (0..self.visible_count() as isize).contains(&new_index) {
            self.cursor = new_index as usize;
        }
    }

    fn move_vertical(&mut self, offset: isize) {
        if self.visible_count() == 0 {
            return;
        }
        let cols = GRID_COLUMNS as isize;
        let new_index = self.cursor as isize + offset * cols;
        if (0..self.visible_count() as isize).contains(&new_index) {
            self.cursor = new_index as usize;
        }
    }

    /// Keep the cursor inside the filtered list after any change that can
    /// shrink it.
    fn clamp_cursor(&mut self) {
        let count = self.visible_count();
        if count == 0 {
            self.cursor = 0;
        } else if self.cursor >= count {
            self.cursor = count - 1;
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Books => self.draw_book_grid(frame, content_area),
            Screen::Loans(form) => self.draw_loan_screen(frame, content_area, form),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::EditingBook { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::TitleSearch(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_book_grid(&self, frame: &mut Frame, area: Rect) {
        let visible = self.visible_books();
        if visible.is_empty() {
            let message = if self.filter.is_empty() {
                "No books yet. Press '+' to add one."
            } else {
                "No books match the current filters."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(paragraph, area);
            return;
        }

        let rows = self.split_rows(area);
        for (row_idx, row_chunk) in rows.into_iter().enumerate() {
            let columns = self.split_columns(row_chunk);
            for (col_idx, column_chunk) in columns.into_iter().enumerate() {
                let book_index = row_idx * GRID_COLUMNS + col_idx;
                if let Some(book) = visible.get(book_index) {
                    let mut block = Block::default()
                        .borders(Borders::ALL)
                        .title(book.price.clone());
                    if book_index == self.cursor {
                        block = block.style(Style::default().fg(Color::Yellow));
                    }
                    let pattern = COVER_ART[book_index % COVER_ART.len()];
                    let inner_width = column_chunk.width.saturating_sub(2);
                    let inner_height = column_chunk.height.saturating_sub(2);
                    let lines = build_book_cover_lines(
                        book,
                        pattern,
                        inner_width,
                        inner_height,
                        book_index == self.cursor,
                        self.loans.is_on_loan(&book.id),
                    );
                    let card = Paragraph::new(lines)
                        .alignment(Alignment::Left)
                        .block(block);
                    frame.render_widget(card, column_chunk);
                }
            }
        }
    }

    fn draw_loan_screen(&self, frame: &mut Frame, area: Rect, form: &LoanForm) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(1)])
            .split(area);

        self.draw_loan_form(frame, chunks[0], form);
        self.draw_loan_list(frame, chunks[1]);
    }

    fn draw_loan_form(&self, frame: &mut Frame, area: Rect, form: &LoanForm) {
        let block = Block::default().title("Create New Loan").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let available = self.available_books();
        if available.is_empty() {
            let paragraph = Paragraph::new(
                "All books are on loan. There is nothing available to lend right now.",
            )
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
            return;
        }

        let field_style = |field: LoanField| {
            if form.active == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }
        };

        let borrower_display = if form.borrower.is_empty() {
            "<required>".to_string()
        } else {
            form.borrower.clone()
        };
        let book_display = available
            .get(form.book_cursor.min(available.len() - 1))
            .map(|book| book.display_title())
            .unwrap_or_default();
        let period_display = if form.period.is_empty() {
            "<1-4>".to_string()
        } else {
            form.period.clone()
        };

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Borrower: "),
                Span::styled(borrower_display, field_style(LoanField::Borrower)),
            ]),
            Line::from(vec![
                Span::raw("Book:     "),
                Span::styled(format!("< {book_display} >"), field_style(LoanField::Book)),
            ]),
            Line::from(vec![
                Span::raw("Weeks:    "),
                Span::styled(period_display, field_style(LoanField::Period)),
            ]),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to create - Tab to switch fields - Esc to go back",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active == LoanField::Borrower {
            let cursor_x = inner.x + "Borrower: ".len() as u16 + form.borrower.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        } else if form.active == LoanField::Period {
            let cursor_x = inner.x + "Weeks:    ".len() as u16 + form.period.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y + 2));
        }
    }

    fn draw_loan_list(&self, frame: &mut Frame, area: Rect) {
        let rows = active_loan_rows(self.loans.loans(), self.books.books());
        let block = Block::default().title("Active Loans").borders(Borders::ALL);

        if rows.is_empty() {
            let paragraph = Paragraph::new("No active loans.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        row.borrower_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(row.book_title.clone()),
                    Span::styled(
                        format!("  due {}", format_date(row.due_date)),
                        Style::default().fg(Color::Magenta),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from(self.filter_summary())
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    /// One-line description of the active filters, shown when no status
    /// message is pending.
    fn filter_summary(&self) -> String {
        if self.filter.is_empty() {
            return String::new();
        }
        let mut parts = Vec::new();
        if let Some(title) = &self.filter.title {
            parts.push(format!("title~\"{title}\""));
        }
        if let Some(publisher) = &self.filter.publisher {
            parts.push(format!("publisher={publisher}"));
        }
        if let Some(language) = &self.filter.language {
            parts.push(format!("language={language}"));
        }
        format!("Filters: {}", parts.join("  "))
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::TitleSearch(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Apply   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Clear"),
            ]),
            (Screen::Loans(_), _) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Up/Down]", key_style),
                Span::raw(" Pick Book   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Create Loan   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back to Books"),
            ]),
            _ => Line::from(vec![
                Span::styled("[Arrows]", key_style),
                Span::raw(" Move   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Select   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[/]", key_style),
                Span::raw(" Title   "),
                Span::styled("[p]", key_style),
                Span::raw(" Publisher   "),
                Span::styled("[g]", key_style),
                Span::raw(" Language   "),
                Span::styled("[c]", key_style),
                Span::raw(" Clear   "),
                Span::styled("[o]", key_style),
                Span::raw(" Open   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Loans   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = form.fields();
        let mut lines: Vec<Line<'static>> = fields
            .iter()
            .map(|field| form.build_line(field_name(*field), *field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save - Tab to switch fields - Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some(row) = fields.iter().position(|field| *field == form.active) {
            let prefix = format!("{}: ", field_name(form.active)).len() as u16;
            let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
            let cursor_y = inner.y + row as u16;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\"?", confirm.title)),
            Line::from("Loan records that reference it stay in the ledger"),
            Line::from("but disappear from the active-loan list."),
            Line::from(""),
            Line::from(Span::styled(
                "[y/Enter] Delete   [n/Esc] Cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Title Search");
        let paragraph = Paragraph::new(Span::raw(format!("Title: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Title: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn split_rows(&self, area: Rect) -> Vec<Rect> {
        let row_count = self.row_count().max(1) as u16;
        let percent = (100 / row_count).max(1);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Percentage(percent); row_count as usize])
            .split(area);
        chunks.iter().cloned().collect()
    }

    fn split_columns(&self, area: Rect) -> Vec<Rect> {
        let columns = GRID_COLUMNS.max(1) as u16;
        let percent = (100 / columns).max(1);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(percent); columns as usize])
            .split(area);
        chunks.iter().cloned().collect()
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// Display label for a book form field.
fn field_name(field: BookField) -> &'static str {
    match field {
        BookField::Title => "Title",
        BookField::Subtitle => "Subtitle",
        BookField::Author => "Author",
        BookField::Publisher => "Publisher",
        BookField::Language => "Language",
        BookField::Url => "Url",
    }
}

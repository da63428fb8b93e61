use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::loans::MAX_LOAN_WEEKS;
use crate::models::{Book, BookDraft, BookPatch};

/// Form state for book creation/editing. The same struct backs both flows;
/// edit mode hides the subtitle because an edit never rewrites it.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) author: String,
    pub(crate) publisher: String,
    pub(crate) language: String,
    pub(crate) url: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    /// True when the form edits an existing record rather than drafting a
    /// new one.
    pub(crate) editing: bool,
}

/// Enumerates the fields within the book form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Subtitle,
    Author,
    Publisher,
    Language,
    Url,
}

impl BookForm {
    /// Populate the form from an existing book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            subtitle: book.subtitle.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            language: book.language.clone(),
            url: book.url.clone(),
            active: BookField::Title,
            error: None,
            editing: true,
        }
    }

    /// The fields shown for the current flow, in display order.
    pub(crate) fn fields(&self) -> Vec<BookField> {
        let mut fields = vec![BookField::Title];
        if !self.editing {
            fields.push(BookField::Subtitle);
        }
        fields.extend([
            BookField::Author,
            BookField::Publisher,
            BookField::Language,
            BookField::Url,
        ]);
        fields
    }

    /// Cycle focus across the visible fields.
    pub(crate) fn toggle_field(&mut self) {
        let fields = self.fields();
        let position = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        self.active = fields[(position + 1) % fields.len()];
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Validate and normalize inputs into a draft for the repository. Only
    /// the title is required here; blank optional fields become sentinels in
    /// the repository's normalization, not ours.
    pub(crate) fn parse_draft(&self) -> Result<BookDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        Ok(BookDraft {
            title: title.to_string(),
            subtitle: self.subtitle.trim().to_string(),
            author: self.author.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            language: self.language.trim().to_string(),
            url: self.url.trim().to_string(),
        })
    }

    /// Validate inputs into a patch for the edit flow.
    pub(crate) fn parse_patch(&self) -> Result<BookPatch> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        Ok(BookPatch {
            title: title.to_string(),
            author: self.author.trim().to_string(),
            url: self.url.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            language: self.language.trim().to_string(),
        })
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = match field {
            BookField::Title => "<required>",
            _ => "<optional>",
        };
        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character length of the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Subtitle => &self.subtitle,
            BookField::Author => &self.author,
            BookField::Publisher => &self.publisher,
            BookField::Language => &self.language,
            BookField::Url => &self.url,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Subtitle => &mut self.subtitle,
            BookField::Author => &mut self.author,
            BookField::Publisher => &mut self.publisher,
            BookField::Language => &mut self.language,
            BookField::Url => &mut self.url,
        }
    }
}

/// State for confirming deletion of the selected book.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: String,
    pub(crate) title: String,
}

impl ConfirmBookDelete {
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
        }
    }
}

/// Inline form on the loan screen. The book is picked from the available
/// list by index rather than typed, so the form can never reference a book
/// that is already on loan.
#[derive(Clone)]
pub(crate) struct LoanForm {
    pub(crate) borrower: String,
    /// Cursor into the availability projection passed in at render/parse
    /// time. Clamped whenever that list shrinks.
    pub(crate) book_cursor: usize,
    pub(crate) period: String,
    pub(crate) active: LoanField,
    pub(crate) error: Option<String>,
}

impl Default for LoanForm {
    fn default() -> Self {
        Self {
            borrower: String::new(),
            book_cursor: 0,
            period: "1".to_string(),
            active: LoanField::Borrower,
            error: None,
        }
    }
}

/// Fields of the loan form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LoanField {
    #[default]
    Borrower,
    Book,
    Period,
}

impl LoanForm {
    /// Cycle focus across the three fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoanField::Borrower => LoanField::Book,
            LoanField::Book => LoanField::Period,
            LoanField::Period => LoanField::Borrower,
        };
    }

    /// Insert a character into the active field. The period only accepts a
    /// single digit, matching the 1..=4 week range.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            LoanField::Borrower => {
                if ch.is_control() {
                    return false;
                }
                self.borrower.push(ch);
                true
            }
            LoanField::Book => false,
            LoanField::Period => {
                if ch.is_ascii_digit() && self.period.is_empty() {
                    self.period.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoanField::Borrower => {
                self.borrower.pop();
            }
            LoanField::Book => {}
            LoanField::Period => {
                self.period.pop();
            }
        }
    }

    /// Move the book cursor within the availability list.
    pub(crate) fn move_book(&mut self, offset: isize, available_len: usize) {
        if available_len == 0 {
            self.book_cursor = 0;
            return;
        }
        let last = available_len as isize - 1;
        let next = (self.book_cursor as isize + offset).clamp(0, last);
        self.book_cursor = next as usize;
    }

    /// Validate the form against the current availability projection and
    /// return `(borrower, book_id, weeks)` ready for the ledger.
    pub(crate) fn parse_inputs(&self, available: &[&Book]) -> Result<(String, String, u32)> {
        let borrower = self.borrower.trim();
        if borrower.is_empty() {
            return Err(anyhow!("Borrower name is required."));
        }
        let book = available
            .get(self.book_cursor)
            .ok_or_else(|| anyhow!("No available book selected."))?;
        let weeks = self
            .period
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("Loan period is required."))?;
        if weeks == 0 || weeks > MAX_LOAN_WEEKS {
            return Err(anyhow!(
                "Loan period must be between 1 and {MAX_LOAN_WEEKS} weeks."
            ));
        }
        Ok((borrower.to_string(), book.id.clone(), weeks))
    }

    /// Reset the form after a successful submission.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

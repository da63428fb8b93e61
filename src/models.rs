//! Domain models shared between the repositories, the persisted JSON shapes,
//! and the TUI. The intent is that these types stay light-weight data holders
//! so other layers can focus on presentation and persistence logic. Keeping
//! the commentary here means later refactors can reconstruct the assumptions
//! even if other context is lost.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when a record arrives without an author.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
/// Sentinel used when a record arrives without a publisher.
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
/// Default language assumed for records that do not carry one.
pub const DEFAULT_LANGUAGE: &str = "English";
/// Display price stamped onto books created in-session.
pub const PLACEHOLDER_PRICE: &str = "$0.00";
/// Cover image stamped onto books created in-session.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/120x170?text=No+Image";

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A catalog entry. The serde shape doubles as the persisted form, so field
/// names here are load-bearing: they must keep matching what earlier sessions
/// wrote to the store. Most fields default so partial seed records parse.
pub struct Book {
    /// Stable unique identifier. Assigned once (seed data ships ISBN-style
    /// ids, in-session additions get a UUID) and never rewritten; edit and
    /// delete flows bubble this id back to the repository.
    pub id: String,
    /// Title displayed on cards and matched by the title filter.
    pub title: String,
    /// Optional subtitle shown under the title when present.
    #[serde(default)]
    pub subtitle: String,
    /// Author credit. Blank values are back-filled with [`UNKNOWN_AUTHOR`]
    /// during normalization, so downstream code may assume it is non-empty.
    #[serde(default)]
    pub author: String,
    /// Publisher facet. Back-filled with [`UNKNOWN_PUBLISHER`].
    #[serde(default)]
    pub publisher: String,
    /// Language facet. Back-filled with [`DEFAULT_LANGUAGE`].
    #[serde(default)]
    pub language: String,
    /// Reference link (kept as raw text so non-web references survive).
    #[serde(default)]
    pub url: String,
    /// Cover image URI.
    #[serde(default)]
    pub image: String,
    /// Display-formatted price string, e.g. `"$28.23"`. Never parsed.
    #[serde(default)]
    pub price: String,
    /// Whether this book is the current selection. At most one record carries
    /// `true`; the repository's `select` enforces that as part of the
    /// mutation itself.
    #[serde(default)]
    pub selected: bool,
}

impl Book {
    /// Compose a `Title - Subtitle` string that gracefully omits the hyphen
    /// when the subtitle is blank. List views rely on this ready-to-use
    /// formatting.
    pub fn display_title(&self) -> String {
        if self.subtitle.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.subtitle)
        }
    }
}

impl fmt::Display for Book {
    /// Write the book title to any formatter. Display is implemented so the
    /// type plays nicely with Ratatui widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// User-supplied fields for a new book, collected by the add form. The
/// repository fills in everything else (id, price, image, selection flag).
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub publisher: String,
    pub language: String,
    pub url: String,
}

/// The fields an edit may replace on an existing book. Deliberately narrower
/// than [`BookDraft`]: `id`, `price`, `image`, and the selection flag are
/// owned by the repository and never editable, and the subtitle is fixed at
/// creation time.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: String,
    pub author: String,
    pub url: String,
    pub publisher: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single loan of a book to a borrower. Loans are append-only: nothing in
/// the exposed surface mutates or removes one, and a book becomes available
/// again only if its loan record disappears by some out-of-band path.
pub struct Loan {
    /// Unique loan identifier.
    pub id: String,
    /// Free-text borrower name entered in the loan form.
    pub borrower_name: String,
    /// Foreign key into [`Book::id`]. The ledger stores only the id, never a
    /// copy of the book, so renames and deletes stay the repository's problem.
    pub book_id: String,
    /// Loan length in weeks, accepted only in 1..=4 at creation time.
    pub loan_period_weeks: u32,
    /// Instant the loan was created. Serialized as RFC 3339 text so it
    /// round-trips to the same instant across sessions.
    pub loan_date: DateTime<Utc>,
    /// `loan_date + loan_period_weeks * 7 days`, computed once at creation
    /// and never re-derived.
    pub due_date: DateTime<Utc>,
}

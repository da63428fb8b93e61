//! Pure projections over the two repositories. Nothing here owns state or
//! touches the store; every function is recomputed from the canonical
//! collections each time the UI needs to render.

use chrono::{DateTime, Utc};

use crate::models::{Book, Loan};

/// Ephemeral filter criteria for the book listing. Never persisted; an absent
/// criterion matches everything.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring matched against the title.
    pub title: Option<String>,
    /// Exact publisher match.
    pub publisher: Option<String>,
    /// Exact language match.
    pub language: Option<String>,
}

impl BookFilter {
    /// True when no criterion is set, i.e. the projection is the identity.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.publisher.is_none() && self.language.is_none()
    }

    fn matches(&self, book: &Book) -> bool {
        let title_ok = match &self.title {
            Some(needle) => book
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        };
        let publisher_ok = match &self.publisher {
            Some(publisher) => book.publisher == *publisher,
            None => true,
        };
        let language_ok = match &self.language {
            Some(language) => book.language == *language,
            None => true,
        };
        title_ok && publisher_ok && language_ok
    }
}

/// Categorical fields the filter bar builds distinct-value option lists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Publisher,
    Language,
}

impl Facet {
    fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            Facet::Publisher => &book.publisher,
            Facet::Language => &book.language,
        }
    }
}

/// One row of the active-loan listing, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRow {
    pub borrower_name: String,
    pub book_title: String,
    pub due_date: DateTime<Utc>,
}

/// Books passing every set criterion, in repository insertion order.
pub fn filtered_books<'a>(books: &'a [Book], filter: &BookFilter) -> Vec<&'a Book> {
    books.iter().filter(|book| filter.matches(book)).collect()
}

/// Unique, non-empty values of the given facet, lexicographically sorted.
/// Feeds the filter option cycling in the UI.
pub fn distinct_facet_values(books: &[Book], facet: Facet) -> Vec<String> {
    let mut values: Vec<String> = books
        .iter()
        .map(|book| facet.value(book))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Display rows for every loan whose book still exists. Loans referencing a
/// deleted book are dropped from this view only; the ledger keeps them.
pub fn active_loan_rows(loans: &[Loan], books: &[Book]) -> Vec<LoanRow> {
    loans
        .iter()
        .filter_map(|loan| {
            let book = books.iter().find(|book| book.id == loan.book_id)?;
            Some(LoanRow {
                borrower_name: loan.borrower_name.clone(),
                book_title: book.title.clone(),
                due_date: loan.due_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn book(id: &str, title: &str, publisher: &str, language: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: String::new(),
            author: "Author".to_string(),
            publisher: publisher.to_string(),
            language: language.to_string(),
            url: String::new(),
            image: String::new(),
            price: String::new(),
            selected: false,
        }
    }

    fn loan(id: &str, book_id: &str, borrower: &str) -> Loan {
        let t = Utc::now();
        Loan {
            id: id.to_string(),
            borrower_name: borrower.to_string(),
            book_id: book_id.to_string(),
            loan_period_weeks: 1,
            loan_date: t,
            due_date: t + Duration::weeks(1),
        }
    }

    #[test]
    fn title_filter_is_case_insensitive_substring() {
        let books = vec![
            book("b1", "Dune Messiah", "Ace", "English"),
            book("b2", "Foundation", "Gnome Press", "English"),
        ];
        let filter = BookFilter {
            title: Some("dune".to_string()),
            ..BookFilter::default()
        };

        let matched = filtered_books(&books, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "b1");
    }

    #[test]
    fn facet_filters_are_exact_and_combine() {
        let books = vec![
            book("b1", "A", "Ace", "English"),
            book("b2", "B", "Ace", "French"),
            book("b3", "C", "Tor", "English"),
        ];
        let filter = BookFilter {
            title: None,
            publisher: Some("Ace".to_string()),
            language: Some("English".to_string()),
        };

        let matched = filtered_books(&books, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "b1");
    }

    #[test]
    fn empty_filter_preserves_insertion_order() {
        let books = vec![
            book("b2", "Zebra", "Ace", "English"),
            book("b1", "Aardvark", "Ace", "English"),
        ];
        let matched = filtered_books(&books, &BookFilter::default());
        let ids: Vec<_> = matched.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b2", "b1"]);
    }

    #[test]
    fn facet_values_are_distinct_sorted_non_empty() {
        let books = vec![
            book("b1", "A", "Tor", "English"),
            book("b2", "B", "Ace", "English"),
            book("b3", "C", "Tor", ""),
            book("b4", "D", "", "French"),
        ];

        assert_eq!(
            distinct_facet_values(&books, Facet::Publisher),
            vec!["Ace".to_string(), "Tor".to_string()]
        );
        assert_eq!(
            distinct_facet_values(&books, Facet::Language),
            vec!["English".to_string(), "French".to_string()]
        );
    }

    #[test]
    fn orphaned_loans_are_dropped_from_display_only() {
        let books = vec![book("b1", "Dune", "Ace", "English")];
        let loans = vec![loan("l1", "b1", "Ann"), loan("l2", "deleted", "Ben")];

        let rows = active_loan_rows(&loans, &books);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].borrower_name, "Ann");
        assert_eq!(rows[0].book_title, "Dune");
        // The ledger itself still holds both records.
        assert_eq!(loans.len(), 2);
    }
}

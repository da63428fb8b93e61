//! The loan ledger: canonical owner of loan records. Loans are created and
//! persisted here and nowhere else; the ledger never looks inside a book, it
//! only tracks book ids by reference. There is no return/close operation, so
//! the ledger is append-only for the life of the store.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::Loan;
use crate::store::{StoreAdapter, LOANS_KEY};

/// Longest loan the form offers, in weeks. Requests outside 1..=weeks are
/// dropped as invalid intents.
pub const MAX_LOAN_WEEKS: u32 = 4;

/// Owns the ordered loan collection.
pub struct LoanLedger {
    loans: Vec<Loan>,
}

impl LoanLedger {
    /// Hydrate the ledger from the store. Unlike the catalog there is no seed
    /// dataset: absence or unreadability both yield an empty ledger. Stored
    /// timestamps come back as real instants, not text, because the serde
    /// shape of [`Loan`] parses RFC 3339 on the way in.
    pub fn load_initial(store: &dyn StoreAdapter) -> Self {
        let loans = match store.load(LOANS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Loan>>(&raw) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(error = %err, "stored loan ledger unreadable, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not read loan ledger, starting empty");
                Vec::new()
            }
        };
        Self { loans }
    }

    /// All loans in creation order.
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Record a new loan starting now. Returns the loan id, or `None` when
    /// the intent was invalid (blank borrower, blank book id, or a period
    /// outside 1..=[`MAX_LOAN_WEEKS`]) and therefore silently dropped.
    pub fn create_loan(
        &mut self,
        store: &dyn StoreAdapter,
        borrower_name: &str,
        book_id: &str,
        loan_period_weeks: u32,
    ) -> Option<String> {
        self.create_loan_at(store, borrower_name, book_id, loan_period_weeks, Utc::now())
    }

    /// Same as [`Self::create_loan`] but with an explicit creation instant so
    /// the due-date arithmetic is deterministic under test. The due date is
    /// computed exactly once here and never re-derived.
    pub fn create_loan_at(
        &mut self,
        store: &dyn StoreAdapter,
        borrower_name: &str,
        book_id: &str,
        loan_period_weeks: u32,
        loan_date: DateTime<Utc>,
    ) -> Option<String> {
        if borrower_name.trim().is_empty() || book_id.trim().is_empty() {
            return None;
        }
        if loan_period_weeks == 0 || loan_period_weeks > MAX_LOAN_WEEKS {
            return None;
        }

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            borrower_name: borrower_name.trim().to_string(),
            book_id: book_id.to_string(),
            loan_period_weeks,
            loan_date,
            due_date: loan_date + Duration::weeks(i64::from(loan_period_weeks)),
        };
        let id = loan.id.clone();
        self.loans.push(loan);
        self.persist(store);
        Some(id)
    }

    /// Whether any loan references the given book. Books with a loan on
    /// record are not offered for new loans.
    pub fn is_on_loan(&self, book_id: &str) -> bool {
        self.loans.iter().any(|loan| loan.book_id == book_id)
    }

    /// Set difference: every id in `all_book_ids` that no loan references,
    /// preserving the input order. Built on a hash set so the cost stays
    /// linear in books plus loans.
    pub fn available_book_ids(&self, all_book_ids: &[String]) -> Vec<String> {
        let loaned: HashSet<&str> = self.loans.iter().map(|loan| loan.book_id.as_str()).collect();
        all_book_ids
            .iter()
            .filter(|id| !loaned.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Serialize every loan (instants become RFC 3339 text) and hand the blob
    /// to the store. Failures are logged and swallowed, same contract as the
    /// catalog.
    pub fn persist(&self, store: &dyn StoreAdapter) {
        let payload = match serde_json::to_string(&self.loans) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "could not serialize loan ledger");
                return;
            }
        };
        if let Err(err) = store.save(LOANS_KEY, &payload) {
            warn!(error = %err, "could not persist loan ledger, keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn ledger() -> (MemoryStore, LoanLedger) {
        let store = MemoryStore::new();
        let ledger = LoanLedger::load_initial(&store);
        (store, ledger)
    }

    #[test]
    fn empty_store_yields_empty_ledger() {
        let (_store, ledger) = ledger();
        assert!(ledger.loans().is_empty());
    }

    #[test]
    fn unreadable_store_yields_empty_ledger() {
        let store = MemoryStore::new();
        store.save(LOANS_KEY, "{{{").expect("save");
        let ledger = LoanLedger::load_initial(&store);
        assert!(ledger.loans().is_empty());
    }

    #[test]
    fn due_date_is_exactly_weeks_after_loan_date() {
        let (store, mut ledger) = ledger();
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();

        let id = ledger
            .create_loan_at(&store, "Ann", "b1", 2, t)
            .expect("loan created");
        let loan = ledger.loans().iter().find(|l| l.id == id).expect("loan");
        assert_eq!(loan.loan_date, t);
        assert_eq!(loan.due_date, t + Duration::days(14));
    }

    #[test]
    fn invalid_intents_are_dropped() {
        let (store, mut ledger) = ledger();
        let t = Utc::now();

        assert!(ledger.create_loan_at(&store, "", "b1", 2, t).is_none());
        assert!(ledger.create_loan_at(&store, "  ", "b1", 2, t).is_none());
        assert!(ledger.create_loan_at(&store, "Ann", "", 2, t).is_none());
        assert!(ledger.create_loan_at(&store, "Ann", "b1", 0, t).is_none());
        assert!(ledger
            .create_loan_at(&store, "Ann", "b1", MAX_LOAN_WEEKS + 1, t)
            .is_none());
        assert!(ledger.loans().is_empty());
    }

    #[test]
    fn availability_excludes_loaned_ids() {
        let (store, mut ledger) = ledger();
        ledger.create_loan(&store, "Ann", "b2", 1).expect("loan");

        let all = vec!["b1".to_string(), "b2".to_string(), "b3".to_string()];
        let available = ledger.available_book_ids(&all);
        assert_eq!(available, vec!["b1".to_string(), "b3".to_string()]);
        assert!(ledger.is_on_loan("b2"));
        assert!(!ledger.is_on_loan("b1"));
    }

    #[test]
    fn persisted_ledger_round_trips_instants() {
        let store = MemoryStore::new();
        let mut ledger = LoanLedger::load_initial(&store);
        let t = Utc.with_ymd_and_hms(2026, 7, 4, 23, 59, 59).unwrap()
            + Duration::milliseconds(123);
        ledger
            .create_loan_at(&store, "Ann", "b1", 3, t)
            .expect("loan created");

        // A fresh ledger reading the same store must see identical instants,
        // not a truncated or shifted rendition of them.
        let reloaded = LoanLedger::load_initial(&store);
        assert_eq!(reloaded.loans().len(), 1);
        assert_eq!(reloaded.loans()[0].loan_date, t);
        assert_eq!(reloaded.loans()[0].due_date, t + Duration::days(21));
        assert_eq!(reloaded.loans()[0].borrower_name, "Ann");
    }
}

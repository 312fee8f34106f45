use std::sync::Arc;

use crate::data::aggregate::{
    PlatformCount, RatingPoint, to_platform_aggregate, to_rating_aggregate,
};
use crate::data::filter::{FilterSelection, filter};
use crate::data::model::GamesTable;

// ---------------------------------------------------------------------------
// One recompute cycle
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one selection.
///
/// Count and both charts are always derived together from `selection`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardUpdate {
    pub selection: FilterSelection,
    pub count: usize,
    pub rating_aggregate: Vec<RatingPoint>,
    pub platform_aggregate: Vec<PlatformCount>,
}

/// Filter the table and derive the count and both chart aggregates.
pub fn on_selection_changed(table: &GamesTable, selection: &FilterSelection) -> DashboardUpdate {
    let view = filter(table, selection);
    if view.is_empty() {
        log::debug!("No games match {selection:?}");
    }
    DashboardUpdate {
        selection: selection.clone(),
        count: view.len(),
        rating_aggregate: to_rating_aggregate(&view),
        platform_aggregate: to_platform_aggregate(&view),
    }
}

// ---------------------------------------------------------------------------
// Session – one user's selection and latest result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recomputing,
}

/// A selection handed out for recomputation.
///
/// Only the ticket with the newest generation may publish its result.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    selection: FilterSelection,
}

impl Ticket {
    /// Run the cycle for this ticket's selection. Safe to call off the UI thread.
    pub fn compute(&self, table: &GamesTable) -> DashboardUpdate {
        on_selection_changed(table, &self.selection)
    }
}

/// Per-session state: the shared table plus this session's own selection.
#[derive(Debug)]
pub struct Session {
    table: Arc<GamesTable>,
    selection: FilterSelection,
    generation: u64,
    phase: Phase,
    current: DashboardUpdate,
}

impl Session {
    /// Start a session on the full selection.
    pub fn new(table: Arc<GamesTable>) -> Self {
        let selection = FilterSelection::full(&table);
        let current = on_selection_changed(&table, &selection);
        Session {
            table,
            selection,
            generation: 0,
            phase: Phase::Idle,
            current,
        }
    }

    pub fn table(&self) -> &Arc<GamesTable> {
        &self.table
    }

    /// The most recently requested selection.
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The latest published update.
    pub fn current(&self) -> &DashboardUpdate {
        &self.current
    }

    /// Replace the selection and enter `Recomputing`. Any ticket issued
    /// earlier is superseded.
    pub fn begin(&mut self, selection: FilterSelection) -> Ticket {
        self.generation += 1;
        self.selection = selection.clone();
        self.phase = Phase::Recomputing;
        Ticket {
            generation: self.generation,
            selection,
        }
    }

    /// Publish a finished update. Returns `false` and drops the update when
    /// a newer ticket has been issued since.
    pub fn finish(&mut self, ticket: &Ticket, update: DashboardUpdate) -> bool {
        if ticket.generation != self.generation {
            log::warn!(
                "Discarding stale dashboard update (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        let years = match ticket.selection.years {
            Some(range) => range.to_string(),
            None => "all years".to_string(),
        };
        log::debug!(
            "Selection {} genres, {} ratings, {years} → {} games, {} platform rows",
            ticket.selection.genres.len(),
            ticket.selection.ratings.len(),
            update.count,
            update.platform_aggregate.len()
        );
        self.current = update;
        self.phase = Phase::Idle;
        true
    }

    /// Run a full cycle synchronously and return the published update.
    pub fn select(&mut self, selection: FilterSelection) -> &DashboardUpdate {
        let ticket = self.begin(selection);
        let update = ticket.compute(&self.table);
        self.finish(&ticket, update);
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::tests::{arb_selection, arb_table};
    use crate::data::model::YearRange;
    use crate::data::model::tests::{record, sample_table};

    fn genres(values: &[&str]) -> std::collections::BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn action_selection_counts_two_games() {
        let table = sample_table();
        let selection = FilterSelection {
            genres: genres(&["Action"]),
            years: Some(YearRange::new(2000, 2020)),
            ..FilterSelection::default()
        };
        let update = on_selection_changed(&table, &selection);
        assert_eq!(update.count, 2);
        assert_eq!(update.rating_aggregate.len(), 2);
        assert_eq!(update.selection, selection);
    }

    #[test]
    fn shared_platform_groups_per_year() {
        let table = GamesTable::from_records(vec![
            record("Action", "E", 2005, "PC"),
            record("Sports", "E", 2010, "PC"),
            record("Action", "M", 2015, "PC"),
        ]);
        let selection = FilterSelection {
            years: Some(YearRange::new(2006, 2020)),
            ..FilterSelection::default()
        };
        let update = on_selection_changed(&table, &selection);
        assert_eq!(update.count, 2);
        assert_eq!(
            update.platform_aggregate,
            vec![
                PlatformCount { year: 2010, platform: "PC".into(), count: 1 },
                PlatformCount { year: 2015, platform: "PC".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn absent_genre_gives_zero_count_and_empty_charts() {
        let table = sample_table();
        let selection = FilterSelection {
            genres: genres(&["Racing"]),
            ..FilterSelection::full(&table)
        };
        let update = on_selection_changed(&table, &selection);
        assert_eq!(update.count, 0);
        assert!(update.rating_aggregate.is_empty());
        assert!(update.platform_aggregate.is_empty());
    }

    #[test]
    fn new_session_starts_idle_on_full_selection() {
        let table = Arc::new(sample_table());
        let session = Session::new(table.clone());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.selection(), &FilterSelection::full(&table));
        assert_eq!(session.current().count, 3);
    }

    #[test]
    fn select_publishes_and_returns_to_idle() {
        let mut session = Session::new(Arc::new(sample_table()));
        let update = session.select(FilterSelection {
            genres: genres(&["Sports"]),
            ..FilterSelection::default()
        });
        assert_eq!(update.count, 1);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn superseded_ticket_is_discarded() {
        let table = Arc::new(sample_table());
        let mut session = Session::new(table.clone());

        let first = session.begin(FilterSelection {
            genres: genres(&["Action"]),
            ..FilterSelection::default()
        });
        let second = session.begin(FilterSelection {
            genres: genres(&["Sports"]),
            ..FilterSelection::default()
        });
        assert_eq!(session.phase(), Phase::Recomputing);

        // The newer ticket finishes first; the older result must not replace it.
        assert!(session.finish(&second, second.compute(&table)));
        assert!(!session.finish(&first, first.compute(&table)));
        assert_eq!(session.current().count, 1);
        assert_eq!(session.current().selection, second.selection);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn stale_ticket_does_not_end_recompute() {
        let table = Arc::new(sample_table());
        let mut session = Session::new(table.clone());
        let first = session.begin(FilterSelection::default());
        let _second = session.begin(FilterSelection::default());
        assert!(!session.finish(&first, first.compute(&table)));
        assert_eq!(session.phase(), Phase::Recomputing);
    }

    #[test]
    fn sessions_are_independent() {
        let table = Arc::new(sample_table());
        let mut alice = Session::new(table.clone());
        let bob = Session::new(table.clone());
        alice.select(FilterSelection {
            genres: genres(&["Sports"]),
            ..FilterSelection::default()
        });
        assert_eq!(alice.current().count, 1);
        assert_eq!(bob.current().count, 3);
        assert_eq!(Arc::strong_count(&table), 3);
    }

    proptest! {
        #[test]
        fn prop_cycle_is_idempotent(table in arb_table(), selection in arb_selection()) {
            let first = on_selection_changed(&table, &selection);
            let second = on_selection_changed(&table, &selection);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.count, first.rating_aggregate.len());
        }
    }
}

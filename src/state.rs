use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::dashboard::{DashboardUpdate, Phase, Session};
use crate::data::filter::FilterSelection;
use crate::data::loader::{LoadOptions, load_file};
use crate::data::model::{GamesTable, YearRange};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Colours fixed for the lifetime of a loaded table.
pub struct Palettes {
    pub genres: ColorMap,
    pub platforms: ColorMap,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dashboard session (None until a table is loaded).
    pub session: Option<Session>,

    pub palettes: Option<Palettes>,

    /// How files opened from the UI are loaded.
    pub load_options: LoadOptions,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(load_options: LoadOptions) -> Self {
        Self {
            session: None,
            palettes: None,
            load_options,
            status_message: None,
        }
    }

    /// Ingest a freshly loaded table and start a session on it.
    pub fn set_table(&mut self, table: GamesTable) {
        if table.is_empty() {
            log::warn!("No games left after loading; the dashboard will stay empty");
        }
        self.palettes = Some(Palettes {
            genres: ColorMap::new(table.available_genres()),
            platforms: ColorMap::new(table.available_platforms()),
        });
        self.session = Some(Session::new(Arc::new(table)));
        self.status_message = None;
    }

    /// Load a table from disk; a failure is kept as the status message.
    pub fn load(&mut self, path: &Path) {
        match load_file(path, &self.load_options) {
            Ok(table) => {
                log::info!("Loaded {} games from {}", table.len(), path.display());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn table(&self) -> Option<&Arc<GamesTable>> {
        self.session.as_ref().map(Session::table)
    }

    pub fn selection(&self) -> Option<&FilterSelection> {
        self.session.as_ref().map(Session::selection)
    }

    pub fn update(&self) -> Option<&DashboardUpdate> {
        self.session.as_ref().map(Session::current)
    }

    /// Whether the dashboard is waiting on a newer selection's results.
    pub fn is_recomputing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.phase() == Phase::Recomputing)
    }

    /// Replace the selection, recomputing only when it actually changed.
    pub fn apply_selection(&mut self, selection: FilterSelection) {
        if let Some(session) = &mut self.session {
            if session.selection() != &selection {
                session.select(selection);
            }
        }
    }

    /// Select or deselect a single genre.
    pub fn toggle_genre(&mut self, genre: &str) {
        self.edit_selection(|sel| {
            if !sel.genres.remove(genre) {
                sel.genres.insert(genre.to_string());
            }
        });
    }

    /// Select or deselect a single age rating.
    pub fn toggle_rating(&mut self, rating: &str) {
        self.edit_selection(|sel| {
            if !sel.ratings.remove(rating) {
                sel.ratings.insert(rating.to_string());
            }
        });
    }

    pub fn clear_genres(&mut self) {
        self.edit_selection(|sel| sel.genres.clear());
    }

    pub fn clear_ratings(&mut self) {
        self.edit_selection(|sel| sel.ratings.clear());
    }

    /// Set the year range; the ends are not allowed to cross.
    pub fn set_years(&mut self, min: i32, max: i32) {
        self.edit_selection(|sel| sel.years = Some(YearRange::new(min, max.max(min))));
    }

    /// Build the next selection from a copy of the current one.
    fn edit_selection(&mut self, edit: impl FnOnce(&mut FilterSelection)) {
        let Some(mut next) = self.selection().cloned() else {
            return;
        };
        edit(&mut next);
        self.apply_selection(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn loaded() -> AppState {
        let mut state = AppState::new(LoadOptions::default());
        state.set_table(sample_table());
        state
    }

    fn count(state: &AppState) -> usize {
        state.update().map(|u| u.count).unwrap_or_default()
    }

    #[test]
    fn nothing_to_show_before_loading() {
        let mut state = AppState::new(LoadOptions::default());
        state.toggle_genre("Action");
        assert!(state.update().is_none());
        assert!(state.selection().is_none());
    }

    #[test]
    fn toggling_genre_twice_restores_full_view() {
        let mut state = loaded();
        assert_eq!(count(&state), 3);
        state.toggle_genre("Action");
        assert_eq!(count(&state), 2);
        state.toggle_genre("Action");
        assert_eq!(count(&state), 3);
    }

    #[test]
    fn rating_and_year_edits_combine() {
        let mut state = loaded();
        state.toggle_rating("E");
        assert_eq!(count(&state), 2);
        state.set_years(2006, 2020);
        assert_eq!(count(&state), 1);
        state.clear_ratings();
        assert_eq!(count(&state), 2);
    }

    #[test]
    fn crossing_year_ends_collapse_to_single_year() {
        let mut state = loaded();
        state.set_years(2010, 2005);
        assert_eq!(
            state.selection().and_then(|s| s.years),
            Some(YearRange::new(2010, 2010))
        );
        assert_eq!(count(&state), 1);
    }

    #[test]
    fn update_always_matches_selection() {
        let mut state = loaded();
        state.toggle_genre("Sports");
        state.clear_genres();
        let update = state.update().cloned().expect("session");
        assert_eq!(Some(&update.selection), state.selection());
    }

    #[test]
    fn pending_ticket_shows_as_recomputing() {
        let mut state = loaded();
        assert!(!state.is_recomputing());
        let session = state.session.as_mut().expect("session");
        let ticket = session.begin(FilterSelection::default());
        assert!(state.is_recomputing());
        let session = state.session.as_mut().expect("session");
        let update = ticket.compute(session.table());
        session.finish(&ticket, update);
        assert!(!state.is_recomputing());
    }

    #[test]
    fn empty_table_still_starts_a_session() {
        let mut state = AppState::new(LoadOptions::default());
        state.set_table(GamesTable::default());
        assert_eq!(count(&state), 0);
        assert_eq!(state.selection().and_then(|s| s.years), None);
    }

    #[test]
    fn failed_load_sets_status_message() {
        let mut state = AppState::new(LoadOptions::default());
        state.load(Path::new("/nonexistent/games.csv"));
        assert!(state.session.is_none());
        assert!(state.status_message.is_some());
    }
}

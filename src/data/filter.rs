use std::collections::BTreeSet;

use super::model::{GamesTable, Record, YearRange};

// ---------------------------------------------------------------------------
// FilterSelection – what the user picked
// ---------------------------------------------------------------------------

/// The current genre set, rating set and year range.
///
/// An empty genre or rating set means "no constraint" on that dimension.
/// A year range always constrains; `None` stands for the full observed span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub genres: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
    pub years: Option<YearRange>,
}

impl FilterSelection {
    /// The initial selection: everything, over the table's observed years.
    pub fn full(table: &GamesTable) -> Self {
        FilterSelection {
            genres: BTreeSet::new(),
            ratings: BTreeSet::new(),
            years: table.observed_year_range(),
        }
    }

    /// Compile the selection into independent predicates, ANDed by [`filter`].
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut predicates = Vec::with_capacity(3);
        if !self.genres.is_empty() {
            predicates.push(Predicate::GenreIn(&self.genres));
        }
        if !self.ratings.is_empty() {
            predicates.push(Predicate::RatingIn(&self.ratings));
        }
        if let Some(years) = self.years {
            predicates.push(Predicate::YearWithin(years));
        }
        predicates
    }
}

// ---------------------------------------------------------------------------
// Predicate – one dimension of a selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    GenreIn(&'a BTreeSet<String>),
    RatingIn(&'a BTreeSet<String>),
    YearWithin(YearRange),
}

impl Predicate<'_> {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::GenreIn(genres) => genres.contains(&record.genre),
            Predicate::RatingIn(ratings) => ratings.contains(&record.rating),
            Predicate::YearWithin(range) => range.contains(record.year),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – records passing a selection
// ---------------------------------------------------------------------------

/// Indices into a [`GamesTable`] of the records that passed a selection.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a GamesTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of records that pass all active predicates.
///
/// Never fails: unknown genres or ratings and an inverted year range simply
/// produce an empty view.
pub fn filter<'a>(table: &'a GamesTable, selection: &FilterSelection) -> FilteredView<'a> {
    let predicates = selection.predicates();
    let indices = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| predicates.iter().all(|p| p.matches(rec)))
        .map(|(i, _)| i)
        .collect();
    FilteredView { table, indices }
}

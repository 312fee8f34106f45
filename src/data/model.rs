use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single untyped cell as read from the source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what CSV / JSON / Parquet hand back
/// before coercion into a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one game entry
// ---------------------------------------------------------------------------

/// One game (one row of the source table) after loading.
///
/// Every field is populated: rows with a missing value never make it past the
/// loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub platform: String,
    /// Year of release, at least the loader's cut-off year.
    pub year: i32,
    pub genre: String,
    pub publisher: String,
    /// 0–100 scale.
    pub critic_score: f64,
    /// 0–10 scale.
    pub user_score: f64,
    /// Age rating (E, T, M, ...).
    pub rating: String,
}

// ---------------------------------------------------------------------------
// YearRange – inclusive [min, max]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        YearRange { min, max }
    }

    /// Inclusive on both ends. A range with `min > max` contains nothing.
    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// GamesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable table every session reads from.
///
/// Built once by the loader and shared behind an `Arc`; nothing hands out
/// mutable access after construction.
#[derive(Debug, Clone, Default)]
pub struct GamesTable {
    records: Vec<Record>,
    genres: BTreeSet<String>,
    ratings: BTreeSet<String>,
    platforms: BTreeSet<String>,
    years: Vec<i32>,
}

impl GamesTable {
    /// Build the distinct-value indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut genres = BTreeSet::new();
        let mut ratings = BTreeSet::new();
        let mut platforms = BTreeSet::new();
        let mut years = BTreeSet::new();

        for rec in &records {
            genres.insert(rec.genre.clone());
            ratings.insert(rec.rating.clone());
            platforms.insert(rec.platform.clone());
            years.insert(rec.year);
        }

        GamesTable {
            records,
            genres,
            ratings,
            platforms,
            years: years.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted distinct genres, for populating the genre selector.
    pub fn available_genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    /// Sorted distinct age ratings, for populating the rating selector.
    pub fn available_ratings(&self) -> &BTreeSet<String> {
        &self.ratings
    }

    pub fn available_platforms(&self) -> &BTreeSet<String> {
        &self.platforms
    }

    /// Distinct release years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Smallest and largest release year, `None` for an empty table.
    pub fn observed_year_range(&self) -> Option<YearRange> {
        match (self.years.first(), self.years.last()) {
            (Some(&min), Some(&max)) => Some(YearRange::new(min, max)),
            _ => None,
        }
    }

    /// Position in [`years`](Self::years) of the observed year closest to
    /// `year`; ties go to the earlier year. `None` for an empty table.
    pub fn nearest_year_index(&self, year: i32) -> Option<usize> {
        let last = self.years.len().checked_sub(1)?;
        let above = self.years.partition_point(|&y| y < year).min(last);
        if above > 0 && year - self.years[above - 1] <= self.years[above] - year {
            Some(above - 1)
        } else {
            Some(above)
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(genre: &str, rating: &str, year: i32, platform: &str) -> Record {
        Record {
            name: format!("{genre} {year} {platform}"),
            platform: platform.to_string(),
            year,
            genre: genre.to_string(),
            publisher: "Acme".to_string(),
            critic_score: 70.0,
            user_score: 7.5,
            rating: rating.to_string(),
        }
    }

    /// The three-game table used throughout the core tests.
    pub(crate) fn sample_table() -> GamesTable {
        GamesTable::from_records(vec![
            record("Action", "E", 2005, "PS2"),
            record("Sports", "E", 2010, "PC"),
            record("Action", "M", 2015, "PC"),
        ])
    }

    #[test]
    fn indices_are_built_from_records() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.available_genres().iter().collect::<Vec<_>>(),
            vec!["Action", "Sports"]
        );
        assert_eq!(
            table.available_ratings().iter().collect::<Vec<_>>(),
            vec!["E", "M"]
        );
        assert_eq!(
            table.available_platforms().iter().collect::<Vec<_>>(),
            vec!["PC", "PS2"]
        );
        assert_eq!(table.observed_year_range(), Some(YearRange::new(2005, 2015)));
        assert_eq!(table.years(), &[2005, 2010, 2015]);
    }

    #[test]
    fn nearest_year_snaps_to_observed_years() {
        let table = sample_table();
        assert_eq!(table.nearest_year_index(2005), Some(0));
        assert_eq!(table.nearest_year_index(2007), Some(0));
        assert_eq!(table.nearest_year_index(2008), Some(1));
        assert_eq!(table.nearest_year_index(2013), Some(2));
        assert_eq!(table.nearest_year_index(1990), Some(0));
        assert_eq!(table.nearest_year_index(2030), Some(2));
        assert_eq!(GamesTable::default().nearest_year_index(2010), None);
    }

    #[test]
    fn empty_table_has_no_year_range() {
        let table = GamesTable::from_records(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.observed_year_range(), None);
        assert!(table.available_genres().is_empty());
    }

    #[test]
    fn year_range_displays_as_span() {
        assert_eq!(YearRange::new(2004, 2012).to_string(), "2004–2012");
    }

    #[test]
    fn inverted_year_range_contains_nothing() {
        let range = YearRange::new(2010, 2005);
        assert!(!range.contains(2005));
        assert!(!range.contains(2007));
        assert!(!range.contains(2010));
        assert!(YearRange::new(2008, 2008).contains(2008));
    }
}

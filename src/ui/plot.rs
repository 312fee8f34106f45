use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::data::aggregate::{PlatformCount, RatingPoint};
use crate::state::Palettes;

// ---------------------------------------------------------------------------
// Releases by year and platform (stacked area)
// ---------------------------------------------------------------------------

/// One platform's band in the stacked area chart, sampled at every year.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformBand {
    pub platform: String,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Stack the per-(year, platform) counts, platforms in name order.
///
/// Returns the shared year axis and one band per platform; a platform with no
/// releases in a year contributes zero height there.
pub fn stack_platform_counts(rows: &[PlatformCount]) -> (Vec<i32>, Vec<PlatformBand>) {
    let years: Vec<i32> = rows
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut by_platform: BTreeMap<&str, BTreeMap<i32, usize>> = BTreeMap::new();
    for row in rows {
        by_platform
            .entry(row.platform.as_str())
            .or_default()
            .insert(row.year, row.count);
    }

    let mut baseline = vec![0.0; years.len()];
    let bands = by_platform
        .into_iter()
        .map(|(platform, counts)| {
            let lower = baseline.clone();
            let upper: Vec<f64> = years
                .iter()
                .zip(&lower)
                .map(|(year, lo)| lo + counts.get(year).copied().unwrap_or(0) as f64)
                .collect();
            baseline.clone_from(&upper);
            PlatformBand {
                platform: platform.to_string(),
                lower,
                upper,
            }
        })
        .collect();

    (years, bands)
}

/// Render the stacked area of releases per year, one band per platform.
pub fn platform_area_chart(ui: &mut Ui, rows: &[PlatformCount], palettes: &Palettes) {
    let (years, bands) = stack_platform_counts(rows);
    let xs: Vec<f64> = years.iter().map(|&y| y as f64).collect();

    Plot::new("platform_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Count")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for band in &bands {
                let color = palettes.platforms.color_for(&band.platform);

                // egui_plot only fills convex polygons, so each band is drawn
                // as one trapezoid per pair of adjacent years.
                for i in 1..xs.len() {
                    if band.upper[i - 1] == band.lower[i - 1] && band.upper[i] == band.lower[i] {
                        continue;
                    }
                    let quad = vec![
                        [xs[i - 1], band.lower[i - 1]],
                        [xs[i], band.lower[i]],
                        [xs[i], band.upper[i]],
                        [xs[i - 1], band.upper[i - 1]],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .name(&band.platform)
                            .fill_color(color.gamma_multiply(0.5))
                            .stroke(Stroke::NONE),
                    );
                }

                let top: PlotPoints = xs.iter().zip(&band.upper).map(|(&x, &y)| [x, y]).collect();
                if xs.len() == 1 {
                    plot_ui.points(Points::new(top).name(&band.platform).color(color).radius(4.0));
                } else {
                    plot_ui.line(Line::new(top).name(&band.platform).color(color).width(1.5));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Scores by genre (scatter)
// ---------------------------------------------------------------------------

/// Render user score (x) against critic score (y), coloured by genre.
pub fn rating_scatter(ui: &mut Ui, points: &[RatingPoint], palettes: &Palettes) {
    let mut by_genre: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        by_genre
            .entry(p.genre.as_str())
            .or_default()
            .push([p.user_score, p.critic_score]);
    }

    Plot::new("rating_plot")
        .legend(Legend::default())
        .x_axis_label("User score")
        .y_axis_label("Critic score")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (genre, xy) in by_genre {
                let color: Color32 = palettes.genres.color_for(genre);
                plot_ui.points(
                    Points::new(PlotPoints::from(xy))
                        .name(genre)
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, platform: &str, count: usize) -> PlatformCount {
        PlatformCount {
            year,
            platform: platform.to_string(),
            count,
        }
    }

    #[test]
    fn bands_stack_in_platform_order() {
        let rows = vec![row(2010, "PC", 2), row(2010, "PS3", 1), row(2011, "PS3", 4)];
        let (years, bands) = stack_platform_counts(&rows);

        assert_eq!(years, vec![2010, 2011]);
        assert_eq!(
            bands,
            vec![
                PlatformBand {
                    platform: "PC".into(),
                    lower: vec![0.0, 0.0],
                    upper: vec![2.0, 0.0],
                },
                PlatformBand {
                    platform: "PS3".into(),
                    lower: vec![2.0, 0.0],
                    upper: vec![3.0, 4.0],
                },
            ]
        );
    }

    #[test]
    fn top_band_reaches_yearly_total() {
        let rows = vec![
            row(2001, "GBA", 3),
            row(2001, "PS2", 5),
            row(2002, "GBA", 1),
            row(2002, "XB", 2),
            row(2004, "PS2", 7),
        ];
        let (years, bands) = stack_platform_counts(&rows);
        let top = &bands.last().expect("at least one band").upper;
        for (i, year) in years.iter().enumerate() {
            let total: usize = rows.iter().filter(|r| r.year == *year).map(|r| r.count).sum();
            assert_eq!(top[i], total as f64);
        }
    }

    #[test]
    fn no_rows_no_bands() {
        let (years, bands) = stack_platform_counts(&[]);
        assert!(years.is_empty());
        assert!(bands.is_empty());
    }
}

use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::state::AppState;
use crate::ui::plot;

/// A change requested by a widget, applied once the frame's widgets are drawn.
#[derive(Debug, Clone)]
enum FilterAction {
    ToggleGenre(String),
    ToggleRating(String),
    ClearGenres,
    ClearRatings,
    SetYears(i32, i32),
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (Some(table), Some(selection)) = (state.table().cloned(), state.selection().cloned())
    else {
        ui.label("No dataset loaded.");
        return;
    };
    let genre_colors = state.palettes.as_ref().map(|p| &p.genres);

    let mut actions = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            // Sliders step through the years present in the table.
            let years = table.years();
            if let (Some(bounds), Some(last)) =
                (table.observed_year_range(), years.len().checked_sub(1))
            {
                ui.strong("Year of release");
                let current = selection.years.unwrap_or(bounds);
                let mut from = table.nearest_year_index(current.min).unwrap_or(0);
                let mut to = table.nearest_year_index(current.max).unwrap_or(last);
                let label = |i: f64, _: std::ops::RangeInclusive<usize>| {
                    years[(i as usize).min(last)].to_string()
                };
                let from_changed = ui
                    .add(
                        egui::Slider::new(&mut from, 0..=last)
                            .custom_formatter(label)
                            .text("from"),
                    )
                    .changed();
                let to_changed = ui
                    .add(
                        egui::Slider::new(&mut to, from..=last)
                            .custom_formatter(label)
                            .text("to"),
                    )
                    .changed();
                if from_changed || to_changed {
                    actions.push(FilterAction::SetYears(years[from], years[to.max(from)]));
                }
                ui.separator();
            }

            // ---- Genre / rating multi-selects ----
            let genre_action = category_filter(
                ui,
                "Genre",
                table.available_genres(),
                &selection.genres,
                genre_colors,
            );
            actions.extend(genre_action.map(|action| match action {
                CategoryAction::Toggle(v) => FilterAction::ToggleGenre(v),
                CategoryAction::Clear => FilterAction::ClearGenres,
            }));

            let rating_action = category_filter(
                ui,
                "Age rating",
                table.available_ratings(),
                &selection.ratings,
                None,
            );
            actions.extend(rating_action.map(|action| match action {
                CategoryAction::Toggle(v) => FilterAction::ToggleRating(v),
                CategoryAction::Clear => FilterAction::ClearRatings,
            }));
        });

    for action in actions {
        match action {
            FilterAction::ToggleGenre(g) => state.toggle_genre(&g),
            FilterAction::ToggleRating(r) => state.toggle_rating(&r),
            FilterAction::ClearGenres => state.clear_genres(),
            FilterAction::ClearRatings => state.clear_ratings(),
            FilterAction::SetYears(from, to) => state.set_years(from, to),
        }
    }
}

enum CategoryAction {
    Toggle(String),
    Clear,
}

/// Checkbox list for one categorical column. Nothing ticked means no filter.
fn category_filter(
    ui: &mut Ui,
    title: &str,
    values: &BTreeSet<String>,
    selected: &BTreeSet<String>,
    colors: Option<&ColorMap>,
) -> Option<CategoryAction> {
    let mut action = None;

    let header_text = if selected.is_empty() {
        format!("{title}  (all)")
    } else {
        format!("{title}  ({}/{})", selected.len(), values.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if ui
                .add_enabled(!selected.is_empty(), egui::Button::new("Clear").small())
                .clicked()
            {
                action = Some(CategoryAction::Clear);
            }

            for value in values {
                let mut text = RichText::new(value);
                if let Some(cm) = colors {
                    text = text.color(cm.color_for(value));
                }
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, text).changed() {
                    action = Some(CategoryAction::Toggle(value.clone()));
                }
            }
        });

    action
}

// ---------------------------------------------------------------------------
// Central panel – count and charts
// ---------------------------------------------------------------------------

/// Render the title, game count and the two charts.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("Games market");
    ui.label(
        "History of the games industry. Choose genres, age ratings and years of release.",
    );
    ui.separator();

    let (Some(update), Some(palettes)) = (state.update(), state.palettes.as_ref()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a games table to begin  (File → Open…)");
        });
        return;
    };

    ui.strong(format!("Games: {}", update.count));
    ui.add_space(4.0);

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Releases by year and platform");
        plot::platform_area_chart(&mut cols[0], &update.platform_aggregate, palettes);
        cols[1].strong("Scores by genre");
        plot::rating_scatter(&mut cols[1], &update.rating_aggregate, palettes);
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            // The table is immutable once loaded.
            if ui
                .add_enabled(state.session.is_none(), egui::Button::new("Open…"))
                .clicked()
            {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(update)) = (state.table(), state.update()) {
            ui.label(format!(
                "{} games loaded, {} shown",
                table.len(),
                update.count
            ));
        }

        if state.is_recomputing() {
            ui.spinner();
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open games table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

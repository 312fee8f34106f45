mod app;
mod color;
mod dashboard;
mod data;
mod state;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::Context;
use app::GamesMarketApp;
use clap::Parser;
use data::loader::{LoadOptions, MissingPolicy};
use data::model::GamesTable;
use eframe::egui;
use state::AppState;

#[derive(Parser)]
#[command(name = "games-market")]
#[command(about = "Explore video game releases and review scores by genre, rating and year")]
#[command(version)]
struct Cli {
    /// Games table to open (.csv, .json or .parquet)
    path: Option<PathBuf>,

    /// Drop games released before this year
    #[arg(long, default_value = "2000")]
    min_year: i32,

    /// Keep rows whose only missing values are in columns the dashboard does not use
    #[arg(long)]
    keep_partial_rows: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            min_year: self.min_year,
            missing_policy: if self.keep_partial_rows {
                MissingPolicy::RequiredColumns
            } else {
                MissingPolicy::AnyColumn
            },
        }
    }
}

/// A table given on the command line must load; there is nothing to show otherwise.
fn load_startup_table(path: &Path, options: &LoadOptions) -> anyhow::Result<GamesTable> {
    let table = data::loader::load_file(path, options)
        .inspect_err(|e| log::error!("Failed to load {}: {e:#}", path.display()))
        .with_context(|| format!("cannot start without a valid table: {}", path.display()))?;
    log::info!("Loaded {} games from {}", table.len(), path.display());
    Ok(table)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState::new(cli.load_options());
    if let Some(path) = &cli.path {
        let table = load_startup_table(path, &state.load_options)?;
        state.set_table(table);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Games market",
        options,
        Box::new(|_cc| Ok(Box::new(GamesMarketApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_load_failure_names_the_file() {
        let err = load_startup_table(Path::new("/nonexistent/games.csv"), &LoadOptions::default())
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("cannot start without a valid table"));
        assert!(message.contains("/nonexistent/games.csv"));
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

#[derive(Parser)]
#[command(about = "Write a synthetic games table for trying out the dashboard")]
struct Cli {
    /// Output file (.csv or .json)
    #[arg(default_value = "games.csv")]
    output: PathBuf,

    /// Number of games to generate
    #[arg(short, long, default_value = "2000")]
    count: usize,

    /// Seed for the generator
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// One row in the layout of the games sales dataset.
#[derive(Serialize)]
struct GameRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Platform")]
    platform: &'static str,
    #[serde(rename = "Year_of_Release")]
    year: Option<i32>,
    #[serde(rename = "Genre")]
    genre: &'static str,
    #[serde(rename = "Publisher")]
    publisher: &'static str,
    #[serde(rename = "NA_Sales")]
    na_sales: f64,
    #[serde(rename = "EU_Sales")]
    eu_sales: f64,
    #[serde(rename = "Critic_Score")]
    critic_score: Option<f64>,
    #[serde(rename = "User_Score")]
    user_score: String,
    #[serde(rename = "Rating")]
    rating: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }
}

const GENRES: [&str; 8] = [
    "Action", "Sports", "Shooter", "Racing", "Role-Playing", "Platform", "Puzzle", "Misc",
];
const RATINGS: [&str; 4] = ["E", "E10+", "T", "M"];
const PUBLISHERS: [&str; 5] = ["Nintendo", "Electronic Arts", "Activision", "Ubisoft", "Sega"];

/// Platforms with the years they were on sale.
const PLATFORMS: [(&str, i32, i32); 8] = [
    ("PS2", 1998, 2010),
    ("XB", 2001, 2008),
    ("GBA", 2001, 2007),
    ("DS", 2004, 2013),
    ("Wii", 2006, 2015),
    ("X360", 2005, 2016),
    ("PS3", 2006, 2016),
    ("PC", 1995, 2016),
];

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<GameRow> {
    (0..n)
        .map(|i| {
            let (platform, first, last) = rng.pick(&PLATFORMS);
            let year = first + rng.below((last - first + 1) as usize) as i32;
            let critic = 30.0 + (rng.next_f64() * 68.0).round();
            // User scores loosely track critic scores, one decimal place.
            let user = ((critic / 10.0 + rng.next_f64() * 2.0 - 1.0).clamp(0.5, 9.7) * 10.0)
                .round()
                / 10.0;

            // A share of rows carries the gaps the real dataset has.
            let roll = rng.next_f64();
            GameRow {
                name: format!("Game {i:05}"),
                platform,
                year: (roll > 0.02).then_some(year),
                genre: rng.pick(&GENRES),
                publisher: rng.pick(&PUBLISHERS),
                na_sales: (rng.next_f64() * 300.0).round() / 100.0,
                eu_sales: (rng.next_f64() * 200.0).round() / 100.0,
                critic_score: (roll > 0.10).then_some(critic),
                user_score: if roll < 0.15 {
                    "tbd".to_string()
                } else {
                    format!("{user}")
                },
                rating: if roll < 0.18 { "" } else { rng.pick(&RATINGS) },
            }
        })
        .collect()
}

fn write_rows(path: &Path, rows: &[GameRow]) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "csv" => {
            let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
            for row in rows {
                writer.serialize(row).context("writing CSV row")?;
            }
            writer.flush().context("flushing CSV")?;
        }
        "json" => {
            let file = std::fs::File::create(path).context("creating JSON")?;
            serde_json::to_writer_pretty(file, rows).context("writing JSON")?;
        }
        other => bail!("Unsupported output extension: .{other}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);
    let rows = generate(cli.count, &mut rng);

    write_rows(&cli.output, &rows)?;
    println!("Wrote {} games to {}", rows.len(), cli.output.display());
    Ok(())
}

//! Command-line front-end for the diet log.
//!
//! ```bash
//! diet-log --user alice init
//! diet-log --user alice foods 雞
//! diet-log --user alice add 雞胸肉 --grams 150 --meal 午餐
//! diet-log --user alice add-custom 麥當勞 大麥克 --ratio 0.5 --meal 晚餐
//! diet-log --user alice show --date 2024-05-01
//! diet-log --user alice delete 0
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use diet_log::{Config, DailyReport, Tracker};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diet-log", about = "Log foods per day and compare totals with daily targets")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory (overrides DIET_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Whose log to use (overrides DIET_USER)
    #[arg(long, short = 'u', global = true)]
    user: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty log for a new user
    Init,

    /// List catalog foods, optionally filtered by a substring
    Foods { query: Option<String> },

    /// List custom meal brands
    Brands,

    /// List the custom meals of a brand
    Meals { brand: String },

    /// Log a catalog food by weight
    Add {
        food: String,

        /// Grams eaten; anything that is not a whole number counts as 100
        #[arg(long, short = 'g')]
        grams: Option<String>,

        /// Meal slot
        #[arg(long, short = 'm', default_value = "早餐")]
        meal: String,

        /// Day (YYYY-MM-DD), today if omitted
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// Log a custom/branded meal, scaled by a serving ratio
    AddCustom {
        brand: String,

        meal_name: String,

        /// Portion of the reference serving
        #[arg(long, short = 'r', default_value = "1")]
        ratio: f64,

        /// Meal slot
        #[arg(long, short = 'm', default_value = "早餐")]
        meal: String,

        /// Day (YYYY-MM-DD), today if omitted
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// Delete the entry at a position shown by `show`
    Delete {
        index: usize,

        /// Day (YYYY-MM-DD), today if omitted
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// Show a day's entries and totals against the daily targets
    Show {
        /// Day (YYYY-MM-DD), today if omitted
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(user) = cli.user {
        config.user = Some(user);
    }

    let tracker = Tracker::open(&config.data_dir)
        .await
        .with_context(|| format!("loading catalogs from {}", config.data_dir.display()))?;

    match cli.command {
        Command::Init => {
            let user = require_user(&config)?;
            if tracker.store().create_log(user).await? {
                println!("已建立 {} 的紀錄", user);
            } else {
                println!("{} 的紀錄已存在", user);
            }
        }
        Command::Foods { query } => {
            for name in tracker.foods().search(query.as_deref().unwrap_or("")) {
                println!("{}", name);
            }
        }
        Command::Brands => {
            for brand in tracker.customs().brands() {
                println!("{}", brand);
            }
        }
        Command::Meals { brand } => {
            for meal in tracker.customs().meals(&brand) {
                println!("{}", meal);
            }
        }
        Command::Add {
            food,
            grams,
            meal,
            date,
        } => {
            let user = require_user(&config)?;
            let date = date.unwrap_or_else(today);
            let index = tracker
                .append_food(user, date, &meal, &food, grams.as_deref())
                .await?;
            print_added(&tracker, user, date, index).await?;
        }
        Command::AddCustom {
            brand,
            meal_name,
            ratio,
            meal,
            date,
        } => {
            let user = require_user(&config)?;
            let date = date.unwrap_or_else(today);
            let index = tracker
                .append_custom(user, date, &meal, &brand, &meal_name, Some(ratio))
                .await?;
            print_added(&tracker, user, date, index).await?;
        }
        Command::Delete { index, date } => {
            let user = require_user(&config)?;
            let date = date.unwrap_or_else(today);
            match tracker.delete_entry(user, date, index).await? {
                Some(entry) => println!("已刪除 {}", entry),
                None => println!("{} 沒有第 {} 筆紀錄", date, index),
            }
        }
        Command::Show { date } => {
            let user = require_user(&config)?;
            let date = date.unwrap_or_else(today);
            show_day(&tracker, &config, user, date).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn require_user(config: &Config) -> Result<&str> {
    config
        .user
        .as_deref()
        .ok_or_else(|| anyhow!("no user given: pass --user or set DIET_USER"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn print_added(tracker: &Tracker, user: &str, date: NaiveDate, index: usize) -> Result<()> {
    let entries = tracker.day_entries(user, date).await?;
    if let Some(entry) = entries.get(index) {
        println!("已新增 [{}] {}", index, entry);
    }
    Ok(())
}

async fn show_day(tracker: &Tracker, config: &Config, user: &str, date: NaiveDate) -> Result<()> {
    let entries = tracker.day_entries(user, date).await?;
    let totals = diet_log::compute_totals(&entries, tracker.foods());
    let report = DailyReport::new(totals, &config.targets);

    println!("📅 {}", date);
    if entries.is_empty() {
        println!("尚無紀錄");
    }
    for (i, entry) in entries.iter().enumerate() {
        println!("[{}] {}", i, entry);
    }
    println!();
    println!("{}", report);

    let suggestions = report.protein_suggestions();
    if report.protein.reached() {
        println!();
        println!("✅ 今天蛋白質攝取非常充足！");
    } else if !suggestions.is_empty() {
        println!();
        println!("👉 建議補充：");
        for s in suggestions {
            println!("• {} 約 {:.1} 份", s.food, s.portions);
        }
    }
    Ok(())
}

//! Personal diet log over flat JSON files.
//!
//! Foods come from a per-100 g catalog (`foods.json`) or a brand/meal catalog
//! of ready-made servings (`custom_meals.json`). Each user's entries live in
//! `logs/{user}.json`, keyed by day.
//!
//! - [`catalog`]: catalog types and [`load_catalogs`]
//! - [`models`]: [`Nutrition`], [`LogEntry`], [`DailyLog`]
//! - [`nutrition`]: [`compute_totals`] and the [`DailyReport`] against daily targets
//! - [`store`]: [`LogStore`], whole-file JSON persistence per user
//! - [`tracker`]: [`Tracker`], appending and deleting entries

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod nutrition;
pub mod store;
pub mod tracker;

pub use catalog::{load_catalogs, CustomMealCatalog, FoodCatalog};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{DailyLog, LogEntry, Nutrition};
pub use nutrition::{compute_totals, DailyReport, DailyTargets};
pub use store::LogStore;
pub use tracker::Tracker;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Calories and macros. Per 100 g in the food catalog, absolute everywhere else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    /// Calories (kcal)
    pub kcal: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbs (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
}

impl Nutrition {
    pub fn new(kcal: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            kcal,
            protein,
            carbs,
            fat,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.kcal.is_finite()
            && self.protein.is_finite()
            && self.carbs.is_finite()
            && self.fat.is_finite()
    }

    /// Multiply every nutrient by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            kcal: self.kcal * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

impl Add for Nutrition {
    type Output = Nutrition;

    fn add(self, rhs: Nutrition) -> Nutrition {
        Nutrition {
            kcal: self.kcal + rhs.kcal,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, rhs: Nutrition) {
        *self = *self + rhs;
    }
}

/// One food logged on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredEntry", into = "StoredEntry")]
pub enum LogEntry {
    /// A catalog food weighed in grams; nutrition is derived from the catalog.
    Grams {
        /// Meal slot (e.g. "午餐")
        meal: String,
        /// Food catalog key
        food: String,
        grams: f64,
    },
    /// A custom/branded meal with nutrition already scaled by the serving ratio.
    Serving {
        meal: String,
        brand: Option<String>,
        /// Label only, not a catalog key
        food: String,
        nutrition: Nutrition,
    },
}

impl LogEntry {
    pub fn food(&self) -> &str {
        match self {
            LogEntry::Grams { food, .. } | LogEntry::Serving { food, .. } => food,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Grams { meal, food, grams } => write!(f, "{} - {} ({}g)", meal, food, grams),
            LogEntry::Serving {
                meal,
                brand,
                food,
                nutrition,
            } => write!(
                f,
                "{} - {} {} ({:.0} kcal)",
                meal,
                brand.as_deref().unwrap_or(""),
                food,
                nutrition.kcal
            ),
        }
    }
}

/// The flat on-disk shape of a log entry: `{meal, food, grams}` or
/// `{meal, brand?, food, kcal, protein, carbs, fat}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(default)]
    meal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    #[serde(default)]
    food: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grams: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kcal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fat: Option<f64>,
}

impl From<StoredEntry> for LogEntry {
    fn from(stored: StoredEntry) -> Self {
        // A `grams` field wins even if nutrient fields are also present.
        match stored.grams {
            Some(grams) => LogEntry::Grams {
                meal: stored.meal,
                food: stored.food,
                grams: grams.as_f64().unwrap_or(0.0),
            },
            None => LogEntry::Serving {
                meal: stored.meal,
                brand: stored.brand,
                food: stored.food,
                nutrition: Nutrition {
                    kcal: stored.kcal.unwrap_or(0.0),
                    protein: stored.protein.unwrap_or(0.0),
                    carbs: stored.carbs.unwrap_or(0.0),
                    fat: stored.fat.unwrap_or(0.0),
                },
            },
        }
    }
}

impl From<LogEntry> for StoredEntry {
    fn from(entry: LogEntry) -> Self {
        match entry {
            LogEntry::Grams { meal, food, grams } => StoredEntry {
                meal,
                brand: None,
                food,
                grams: Some(grams_number(grams)),
                kcal: None,
                protein: None,
                carbs: None,
                fat: None,
            },
            LogEntry::Serving {
                meal,
                brand,
                food,
                nutrition,
            } => StoredEntry {
                meal,
                brand,
                food,
                grams: None,
                kcal: Some(nutrition.kcal),
                protein: Some(nutrition.protein),
                carbs: Some(nutrition.carbs),
                fat: Some(nutrition.fat),
            },
        }
    }
}

/// Whole gram counts are written as integers (`150`, not `150.0`).
fn grams_number(grams: f64) -> Number {
    // Beyond 2^53 an f64 no longer holds every integer exactly.
    if grams.fract() == 0.0 && grams >= 0.0 && grams <= 9_007_199_254_740_992.0 {
        Number::from(grams as u64)
    } else {
        Number::from_f64(grams).unwrap_or_else(|| Number::from(0u64))
    }
}

/// All entries of one user, keyed by day. Entry order within a day is the
/// display order and the index used for deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyLog {
    days: BTreeMap<NaiveDate, Vec<LogEntry>>,
}

impl DailyLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for `date`; empty if the day was never logged.
    pub fn day(&self, date: NaiveDate) -> &[LogEntry] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append an entry at the end of `date`, returning its index.
    pub fn push(&mut self, date: NaiveDate, entry: LogEntry) -> usize {
        let entries = self.days.entry(date).or_default();
        entries.push(entry);
        entries.len() - 1
    }

    /// Remove the entry at `index`. Out-of-range indices leave the log untouched.
    pub fn remove(&mut self, date: NaiveDate, index: usize) -> Option<LogEntry> {
        let entries = self.days.get_mut(&date)?;
        if index < entries.len() {
            Some(entries.remove(index))
        } else {
            None
        }
    }

    /// Logged days in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }
}

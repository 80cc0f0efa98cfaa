use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::catalog::{load_catalogs, CustomMealCatalog, FoodCatalog};
use crate::error::{Error, Result};
use crate::models::{LogEntry, Nutrition};
use crate::nutrition::compute_totals;
use crate::store::LogStore;

/// Grams used when the caller gives none or something that is not a whole number.
pub const DEFAULT_GRAMS: f64 = 100.0;

/// Logs foods against the catalogs for any user.
///
/// The user is passed to every call; the tracker holds no session.
#[derive(Clone)]
pub struct Tracker {
    store: LogStore,
    foods: FoodCatalog,
    customs: CustomMealCatalog,
}

impl Tracker {
    pub fn new(store: LogStore, foods: FoodCatalog, customs: CustomMealCatalog) -> Self {
        Self {
            store,
            foods,
            customs,
        }
    }

    /// Load the catalogs under `data_dir` and use `{data_dir}/logs` for logs.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let (foods, customs) = load_catalogs(data_dir).await?;
        Ok(Self::new(LogStore::new(data_dir), foods, customs))
    }

    pub fn foods(&self) -> &FoodCatalog {
        &self.foods
    }

    pub fn customs(&self) -> &CustomMealCatalog {
        &self.customs
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Log `food` from the food catalog, weighed in grams.
    ///
    /// `grams` is the raw user input. Missing, empty or non-numeric input
    /// silently becomes [`DEFAULT_GRAMS`]. Returns the entry's index within
    /// the day.
    pub async fn append_food(
        &self,
        user: &str,
        date: NaiveDate,
        meal: &str,
        food: &str,
        grams: Option<&str>,
    ) -> Result<usize> {
        let food = food.trim();
        if food.is_empty() || !self.foods.contains(food) {
            return Err(Error::FoodNotFound(food.to_string()));
        }

        let entry = LogEntry::Grams {
            meal: meal.to_string(),
            food: food.to_string(),
            grams: parse_grams(grams),
        };
        self.push(user, date, entry).await
    }

    /// Log a custom/branded meal scaled by `ratio` (1.0 when `None`).
    ///
    /// A negative or non-finite ratio, or one that overflows the scaled
    /// values, is rejected: JSON cannot hold the result.
    pub async fn append_custom(
        &self,
        user: &str,
        date: NaiveDate,
        meal: &str,
        brand: &str,
        meal_name: &str,
        ratio: Option<f64>,
    ) -> Result<usize> {
        let ratio = ratio.unwrap_or(1.0);
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(Error::InvalidRatio(ratio));
        }
        let nutrition = self.customs.lookup(brand, meal_name)?.scale(ratio);
        if !nutrition.is_finite() {
            return Err(Error::InvalidRatio(ratio));
        }

        let entry = LogEntry::Serving {
            meal: meal.to_string(),
            brand: Some(brand.to_string()),
            food: meal_name.to_string(),
            nutrition,
        };
        self.push(user, date, entry).await
    }

    /// Remove the entry at `index` on `date`.
    ///
    /// An out-of-range index removes nothing and is not an error; the log is
    /// rewritten either way. Indices above a removed entry shift down by one.
    pub async fn delete_entry(
        &self,
        user: &str,
        date: NaiveDate,
        index: usize,
    ) -> Result<Option<LogEntry>> {
        let removed = self
            .store
            .update(user, |log| Ok(log.remove(date, index)))
            .await?;
        if let Some(ref entry) = removed {
            info!(user, %date, index, food = entry.food(), "deleted entry");
        }
        Ok(removed)
    }

    /// Entries logged on `date`, in logging order.
    pub async fn day_entries(&self, user: &str, date: NaiveDate) -> Result<Vec<LogEntry>> {
        let log = self.store.load_log(user).await?;
        Ok(log.day(date).to_vec())
    }

    /// Nutrition totals for `date`. Zero for a day with no entries.
    pub async fn day_totals(&self, user: &str, date: NaiveDate) -> Result<Nutrition> {
        let log = self.store.load_log(user).await?;
        Ok(compute_totals(log.day(date), &self.foods))
    }

    async fn push(&self, user: &str, date: NaiveDate, entry: LogEntry) -> Result<usize> {
        let food = entry.food().to_string();
        let index = self
            .store
            .update(user, move |log| Ok(log.push(date, entry)))
            .await?;
        info!(user, %date, index, food = %food, "logged entry");
        Ok(index)
    }
}

/// Whole, non-negative gram counts are taken as is, in ASCII or full-width
/// digits and of any length; anything else is [`DEFAULT_GRAMS`].
pub fn parse_grams(raw: Option<&str>) -> f64 {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_GRAMS;
    };
    let digits: Option<String> = raw.chars().map(ascii_digit).collect();
    match digits {
        Some(digits) if !digits.is_empty() => digits
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite())
            .unwrap_or(DEFAULT_GRAMS),
        _ => DEFAULT_GRAMS,
    }
}

/// `'0'..='9'` and the full-width `'０'..='９'` an IME produces.
fn ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grams_fall_back_to_default() {
        assert_eq!(parse_grams(Some("150")), 150.0);
        assert_eq!(parse_grams(Some(" 80 ")), 80.0);
        assert_eq!(parse_grams(Some("0")), 0.0);
        assert_eq!(parse_grams(None), DEFAULT_GRAMS);
        assert_eq!(parse_grams(Some("")), DEFAULT_GRAMS);
        assert_eq!(parse_grams(Some("abc")), DEFAULT_GRAMS);
        assert_eq!(parse_grams(Some("12.5")), DEFAULT_GRAMS);
        assert_eq!(parse_grams(Some("-20")), DEFAULT_GRAMS);
        assert_eq!(parse_grams(Some("99999999999")), 99_999_999_999.0);
    }

    #[test]
    fn full_width_digits_are_numbers() {
        assert_eq!(parse_grams(Some("１５０")), 150.0);
        assert_eq!(parse_grams(Some("２0０")), 200.0);
        assert_eq!(parse_grams(Some("１５．５")), DEFAULT_GRAMS);
        assert_eq!(parse_grams(Some("一五〇")), DEFAULT_GRAMS);
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Nutrition;
use crate::store::read_json;

pub const FOOD_FILE: &str = "foods.json";
pub const CUSTOM_MEAL_FILE: &str = "custom_meals.json";

/// Food name to nutrition per 100 g.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodCatalog {
    foods: BTreeMap<String, Nutrition>,
}

impl FoodCatalog {
    pub fn get(&self, name: &str) -> Option<&Nutrition> {
        self.foods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.foods.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.foods.keys().map(String::as_str)
    }

    /// Food names containing `query`. An empty query matches everything.
    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a str> {
        let query = query.trim();
        self.names().filter(move |name| name.contains(query))
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl FromIterator<(String, Nutrition)> for FoodCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Nutrition)>>(iter: I) -> Self {
        Self {
            foods: iter.into_iter().collect(),
        }
    }
}

/// Brand (restaurant or category) to meal name to nutrition of one serving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomMealCatalog {
    brands: BTreeMap<String, BTreeMap<String, Nutrition>>,
}

impl CustomMealCatalog {
    /// Reference nutrition of `meal` from `brand`.
    pub fn lookup(&self, brand: &str, meal: &str) -> Result<&Nutrition> {
        let meals = self
            .brands
            .get(brand)
            .ok_or_else(|| Error::BrandNotFound(brand.to_string()))?;
        meals.get(meal).ok_or_else(|| Error::MealNotFound {
            brand: brand.to_string(),
            meal: meal.to_string(),
        })
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }

    /// Meal names offered by `brand`; empty for an unknown brand.
    pub fn meals(&self, brand: &str) -> Vec<&str> {
        self.brands
            .get(brand)
            .map(|meals| meals.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    pub fn insert(&mut self, brand: &str, meal: &str, nutrition: Nutrition) {
        self.brands
            .entry(brand.to_string())
            .or_default()
            .insert(meal.to_string(), nutrition);
    }
}

/// Load both catalogs from `data_dir`. Missing files give empty catalogs.
pub async fn load_catalogs(data_dir: &Path) -> Result<(FoodCatalog, CustomMealCatalog)> {
    let foods: FoodCatalog = read_json(&data_dir.join(FOOD_FILE)).await?;
    let customs: CustomMealCatalog = read_json(&data_dir.join(CUSTOM_MEAL_FILE)).await?;
    debug!(
        foods = foods.len(),
        brands = customs.brands().count(),
        "loaded catalogs"
    );
    Ok((foods, customs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foods() -> FoodCatalog {
        [
            ("雞胸肉", Nutrition::new(165.0, 31.0, 0.0, 3.6)),
            ("雞腿肉", Nutrition::new(209.0, 26.0, 0.0, 10.9)),
            ("白飯", Nutrition::new(130.0, 2.7, 28.0, 0.3)),
        ]
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect()
    }

    #[test]
    fn search_filters_by_substring() {
        let catalog = foods();
        let hits: Vec<_> = catalog.search("雞").collect();
        assert_eq!(hits, vec!["雞胸肉", "雞腿肉"]);
        assert_eq!(catalog.search("").count(), 3);
        assert_eq!(catalog.search("牛").count(), 0);
    }

    #[test]
    fn custom_lookup_distinguishes_brand_and_meal() {
        let mut customs = CustomMealCatalog::default();
        customs.insert("7-11", "御飯糰", Nutrition::new(200.0, 5.0, 40.0, 2.0));

        assert!(customs.lookup("7-11", "御飯糰").is_ok());
        assert!(matches!(
            customs.lookup("全家", "御飯糰"),
            Err(Error::BrandNotFound(_))
        ));
        assert!(matches!(
            customs.lookup("7-11", "大亨堡"),
            Err(Error::MealNotFound { .. })
        ));
        assert_eq!(customs.meals("7-11"), vec!["御飯糰"]);
        assert!(customs.meals("全家").is_empty());
    }
}

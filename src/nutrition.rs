use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::FoodCatalog;
use crate::models::{LogEntry, Nutrition};

pub const DAILY_KCAL_TARGET: f64 = 2650.0;
pub const DAILY_PROTEIN_TARGET: f64 = 130.0;
pub const DAILY_CARBS_TARGET: f64 = 350.0;
pub const DAILY_FAT_TARGET: f64 = 70.0;

/// Protein top-ups offered when the day is short on protein: label and
/// protein (g) per portion.
pub const PROTEIN_FOODS: &[(&str, f64)] = &[
    ("雞胸肉（100g）", 31.0),
    ("茶葉蛋（1 顆）", 13.0),
    ("無糖豆漿（1 瓶）", 10.0),
    ("牛奶（1 杯）", 8.0),
];

/// Suggestions needing more portions than this are not shown.
const MAX_SUGGESTED_PORTIONS: f64 = 3.0;

/// Sum the nutrition of a day's entries.
///
/// Gram entries are scaled from the catalog's per-100 g values. A gram entry
/// whose food is missing from the catalog contributes nothing and is not
/// reported. Serving entries are added as stored.
pub fn compute_totals(entries: &[LogEntry], catalog: &FoodCatalog) -> Nutrition {
    let mut total = Nutrition::default();

    for entry in entries {
        match entry {
            LogEntry::Grams { food, grams, .. } => {
                let Some(per_100g) = catalog.get(food) else {
                    continue;
                };
                total += per_100g.scale(grams / 100.0);
            }
            LogEntry::Serving { nutrition, .. } => total += *nutrition,
        }
    }

    total
}

/// Daily reference values. Used for display only, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub kcal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for DailyTargets {
    fn default() -> Self {
        Self {
            kcal: DAILY_KCAL_TARGET,
            protein: DAILY_PROTEIN_TARGET,
            carbs: DAILY_CARBS_TARGET,
            fat: DAILY_FAT_TARGET,
        }
    }
}

/// One nutrient measured against its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub actual: f64,
    pub target: f64,
}

impl Progress {
    /// Actual amount capped at the target, as a progress bar would show it.
    pub fn filled(&self) -> f64 {
        self.actual.min(self.target)
    }

    pub fn remaining(&self) -> f64 {
        (self.target - self.actual).max(0.0)
    }

    pub fn reached(&self) -> bool {
        self.actual >= self.target
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub food: &'static str,
    pub portions: f64,
}

/// Totals for one day compared against the daily targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub totals: Nutrition,
    pub kcal: Progress,
    pub protein: Progress,
    pub carbs: Progress,
    pub fat: Progress,
}

impl DailyReport {
    pub fn new(totals: Nutrition, targets: &DailyTargets) -> Self {
        Self {
            totals,
            kcal: Progress {
                actual: totals.kcal,
                target: targets.kcal,
            },
            protein: Progress {
                actual: totals.protein,
                target: targets.protein,
            },
            carbs: Progress {
                actual: totals.carbs,
                target: targets.carbs,
            },
            fat: Progress {
                actual: totals.fat,
                target: targets.fat,
            },
        }
    }

    /// Portions of each protein food that would close today's protein gap.
    /// Empty once the protein target is reached.
    pub fn protein_suggestions(&self) -> Vec<Suggestion> {
        if self.protein.reached() {
            return Vec::new();
        }
        let remaining = self.protein.remaining();
        PROTEIN_FOODS
            .iter()
            .map(|&(food, per_portion)| Suggestion {
                food,
                portions: remaining / per_portion,
            })
            .filter(|s| s.portions <= MAX_SUGGESTED_PORTIONS)
            .collect()
    }
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "熱量 {:.1} / {} kcal", self.kcal.actual, self.kcal.target)?;
        write!(f, "蛋白質 {:.1} / {} g", self.protein.actual, self.protein.target)?;
        if self.protein.reached() {
            writeln!(f, "（已達標）")?;
        } else {
            writeln!(f, "（尚缺 {:.1} g）", self.protein.remaining())?;
        }
        writeln!(f, "碳水 {:.1} / {} g", self.carbs.actual, self.carbs.target)?;
        write!(f, "脂肪 {:.1} / {} g", self.fat.actual, self.fat.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn catalog() -> FoodCatalog {
        [
            ("雞胸肉", Nutrition::new(165.0, 31.0, 0.0, 3.6)),
            ("測試食物", Nutrition::new(100.0, 20.0, 10.0, 4.0)),
            ("白飯", Nutrition::new(130.0, 2.7, 28.0, 0.3)),
        ]
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect()
    }

    fn grams(food: &str, grams: f64) -> LogEntry {
        LogEntry::Grams {
            meal: "午餐".to_string(),
            food: food.to_string(),
            grams,
        }
    }

    fn serving(n: Nutrition) -> LogEntry {
        LogEntry::Serving {
            meal: "晚餐".to_string(),
            brand: Some("自煮".to_string()),
            food: "便當".to_string(),
            nutrition: n,
        }
    }

    fn assert_close(a: Nutrition, b: Nutrition) {
        assert!((a.kcal - b.kcal).abs() < EPS, "kcal {} != {}", a.kcal, b.kcal);
        assert!((a.protein - b.protein).abs() < EPS, "protein {} != {}", a.protein, b.protein);
        assert!((a.carbs - b.carbs).abs() < EPS, "carbs {} != {}", a.carbs, b.carbs);
        assert!((a.fat - b.fat).abs() < EPS, "fat {} != {}", a.fat, b.fat);
    }

    #[test]
    fn empty_day_is_zero() {
        assert_eq!(compute_totals(&[], &catalog()), Nutrition::default());
    }

    #[test]
    fn grams_scale_per_100g_values() {
        let catalog = catalog();
        assert_eq!(
            compute_totals(&[grams("測試食物", 50.0)], &catalog),
            Nutrition::new(50.0, 10.0, 5.0, 2.0)
        );
        assert_eq!(
            compute_totals(&[grams("測試食物", 200.0)], &catalog),
            Nutrition::new(200.0, 40.0, 20.0, 8.0)
        );
    }

    #[test]
    fn unknown_food_contributes_nothing() {
        let totals = compute_totals(
            &[grams("不存在", 300.0), grams("測試食物", 100.0)],
            &catalog(),
        );
        assert_eq!(totals, Nutrition::new(100.0, 20.0, 10.0, 4.0));
    }

    #[test]
    fn serving_entries_add_verbatim() {
        let n = Nutrition::new(512.5, 30.0, 60.25, 12.0);
        assert_eq!(compute_totals(&[serving(n)], &FoodCatalog::default()), n);
        assert_eq!(compute_totals(&[serving(n)], &catalog()), n);
    }

    #[test]
    fn chicken_breast_150g() {
        let totals = compute_totals(&[grams("雞胸肉", 150.0)], &catalog());
        assert_close(totals, Nutrition::new(247.5, 46.5, 0.0, 5.4));
    }

    #[test]
    fn order_does_not_matter() {
        let catalog = catalog();
        let mut entries = vec![
            grams("雞胸肉", 133.0),
            serving(Nutrition::new(421.3, 17.1, 55.5, 9.9)),
            grams("白飯", 210.0),
            grams("不存在", 50.0),
            grams("測試食物", 37.5),
        ];
        let forward = compute_totals(&entries, &catalog);
        entries.reverse();
        assert_close(compute_totals(&entries, &catalog), forward);
        entries.rotate_left(2);
        assert_close(compute_totals(&entries, &catalog), forward);
    }

    #[test]
    fn report_caps_progress_and_floors_remaining() {
        let report = DailyReport::new(
            Nutrition::new(3000.0, 50.0, 100.0, 70.0),
            &DailyTargets::default(),
        );
        assert_eq!(report.kcal.filled(), DAILY_KCAL_TARGET);
        assert_eq!(report.kcal.remaining(), 0.0);
        assert!(report.kcal.reached());
        assert_eq!(report.protein.filled(), 50.0);
        assert_eq!(report.protein.remaining(), 80.0);
        assert!(!report.protein.reached());
        assert!(report.fat.reached());
    }

    #[test]
    fn report_renders_one_line_per_nutrient() {
        let short = DailyReport::new(
            Nutrition::new(1800.0, 100.0, 200.0, 50.0),
            &DailyTargets::default(),
        );
        assert_eq!(
            short.to_string(),
            "熱量 1800.0 / 2650 kcal\n\
             蛋白質 100.0 / 130 g（尚缺 30.0 g）\n\
             碳水 200.0 / 350 g\n\
             脂肪 50.0 / 70 g"
        );

        let done = DailyReport::new(
            Nutrition::new(2700.5, 140.0, 360.0, 80.0),
            &DailyTargets::default(),
        );
        assert_eq!(
            done.to_string(),
            "熱量 2700.5 / 2650 kcal\n\
             蛋白質 140.0 / 130 g（已達標）\n\
             碳水 360.0 / 350 g\n\
             脂肪 80.0 / 70 g"
        );
    }

    #[test]
    fn suggestions_limited_to_three_portions() {
        // 130 - 100 = 30 g short: 30/31, 30/13, 30/10 qualify; 30/8 = 3.75 does not.
        let report = DailyReport::new(
            Nutrition::new(1800.0, 100.0, 200.0, 50.0),
            &DailyTargets::default(),
        );
        let foods: Vec<_> = report.protein_suggestions().iter().map(|s| s.food).collect();
        assert_eq!(foods, vec!["雞胸肉（100g）", "茶葉蛋（1 顆）", "無糖豆漿（1 瓶）"]);

        let done = DailyReport::new(
            Nutrition::new(1800.0, 140.0, 200.0, 50.0),
            &DailyTargets::default(),
        );
        assert!(done.protein_suggestions().is_empty());
    }
}

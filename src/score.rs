//! Weighted NIRF category and total scores over an extraction record.

use crate::error::ExtractError;
use crate::record::ExtractionRecord;
use crate::schema::{Category, MetricSchema};
use crate::value::MetricValue;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Category weight table; must cover every category and sum to 100.
#[derive(Debug, Clone, Serialize)]
pub struct Weights {
    weights: BTreeMap<Category, Decimal>,
}

impl Default for Weights {
    /// The NIRF emphasis: teaching and research dominate, outcome and
    /// infrastructure follow, outreach categories share the rest.
    fn default() -> Self {
        let weights = [
            (Category::Faculty, 30),
            (Category::Research, 30),
            (Category::Placement, 20),
            (Category::Infrastructure, 10),
            (Category::Diversity, 5),
            (Category::Sports, 3),
            (Category::Accessibility, 2),
        ]
        .into_iter()
        .map(|(category, weight)| (category, Decimal::from(weight)))
        .collect();
        Self { weights }
    }
}

impl Weights {
    /// Validates a caller-supplied weight table.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::WeightsCoverage`] when a category has no
    /// weight and [`ExtractError::WeightsSum`] when the table does not sum
    /// to 100.
    pub fn new(weights: BTreeMap<Category, Decimal>) -> Result<Self, ExtractError> {
        for category in Category::ALL {
            if !weights.contains_key(&category) {
                return Err(ExtractError::WeightsCoverage { category });
            }
        }
        let total: Decimal = weights.values().copied().sum();
        if total != Decimal::ONE_HUNDRED {
            return Err(ExtractError::WeightsSum { total });
        }
        Ok(Self { weights })
    }

    /// Weight of one category; zero when absent.
    #[must_use]
    pub fn get(&self, category: Category) -> Decimal {
        self.weights.get(&category).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Relative weight (percent) of each metric inside its category.
const METRIC_WEIGHTS: &[(&str, u32)] = &[
    ("faculty_count", 30),
    ("phd_faculty_count", 50),
    ("student_count", 20),
    ("publications", 40),
    ("citations", 40),
    ("patents_granted", 20),
    ("median_salary", 50),
    ("placement_rate", 30),
    ("higher_studies_rate", 20),
    ("library_expenditure_physical", 40),
    ("library_expenditure_digital", 30),
    ("laboratory_expenditure", 30),
    ("female_student_percentage", 40),
    ("obc_percentage", 30),
    ("sc_percentage", 20),
    ("pwd_percentage", 10),
    ("sports_budget", 50),
    ("sports_awards", 30),
    ("playground_available", 20),
    ("ramps_available", 40),
    ("lifts_available", 30),
    ("accessible_toilets", 30),
];

/// Normalizer bringing a category's weighted sum onto a comparable scale.
fn category_divisor(category: Category) -> Decimal {
    let divisor = match category {
        Category::Faculty | Category::Research => 100,
        Category::Placement | Category::Infrastructure | Category::Sports => 10,
        Category::Diversity | Category::Accessibility => 1,
    };
    Decimal::from(divisor)
}

/// Per-category and total scores computed from one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    /// Score per category, rounded to two places.
    pub categories: BTreeMap<Category, Decimal>,
    /// Weight-blended total, rounded to two places.
    pub total: Decimal,
}

/// Computes the weighted score breakdown for a record.
///
/// Defaulted fields contribute their schema defaults; flags count as 100/0.
/// Metrics without a weight table entry do not contribute.
#[must_use]
pub fn score_record(
    schema: &MetricSchema,
    record: &ExtractionRecord,
    weights: &Weights,
) -> ScoreCard {
    let mut sums: BTreeMap<Category, Decimal> = Category::ALL
        .into_iter()
        .map(|category| (category, Decimal::ZERO))
        .collect();

    for (key, weight) in METRIC_WEIGHTS {
        let Some(spec) = schema.get(key) else { continue };
        let Some(extracted) = record.get(key) else { continue };
        let contribution =
            scoring_value(&extracted.value) * Decimal::from(*weight) / Decimal::ONE_HUNDRED;
        if let Some(sum) = sums.get_mut(&spec.category()) {
            *sum += contribution;
        }
    }

    let categories: BTreeMap<Category, Decimal> = sums
        .into_iter()
        .map(|(category, sum)| (category, (sum / category_divisor(category)).round_dp(2)))
        .collect();
    let total = (categories
        .iter()
        .map(|(category, score)| *score * weights.get(*category))
        .sum::<Decimal>()
        / Decimal::ONE_HUNDRED)
        .round_dp(2);

    ScoreCard { categories, total }
}

/// Magnitude a value contributes to scoring; flags map to 100/0.
fn scoring_value(value: &MetricValue) -> Decimal {
    match value {
        MetricValue::Flag(true) => Decimal::ONE_HUNDRED,
        MetricValue::Flag(false) => Decimal::ZERO,
        other => other.as_decimal(),
    }
}

//! Declarative metric schema: the table of extractable fields and its
//! compiled matching patterns.

use crate::error::ExtractError;
use crate::value::MetricValue;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// NIRF ranking category a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Teaching staff and student body metrics.
    Faculty,
    /// Publications, citations and research funding.
    Research,
    /// Placement and graduation outcomes.
    Placement,
    /// Library, laboratory and capital spend.
    Infrastructure,
    /// Gender, caste-category and regional diversity.
    Diversity,
    /// Sports facilities and achievements.
    Sports,
    /// Accessibility provisions for disabled students.
    Accessibility,
}

impl Category {
    /// Every category, in schema order.
    pub const ALL: [Self; 7] = [
        Self::Faculty,
        Self::Research,
        Self::Placement,
        Self::Infrastructure,
        Self::Diversity,
        Self::Sports,
        Self::Accessibility,
    ];
}

/// Expected value kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Whole count, e.g. faculty headcount.
    Integer,
    /// Percentage in the 0–100 range.
    Percentage,
    /// Monetary amount in the field's canonical unit.
    Currency,
    /// Presence flag.
    Boolean,
    /// Ordinal percentile ("85th percentile") in the 0–100 range.
    Percentile,
}

/// Canonical unit a currency field normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    /// Plain rupees.
    Rupees,
    /// Lakhs of rupees (1 lakh = 100 000).
    Lakhs,
    /// Crores of rupees (1 crore = 10 000 000).
    Crores,
}

impl CurrencyUnit {
    /// Rupees per one canonical unit.
    pub(crate) fn rupee_factor(self) -> Decimal {
        match self {
            Self::Rupees => Decimal::ONE,
            Self::Lakhs => Decimal::from(100_000_u32),
            Self::Crores => Decimal::from(10_000_000_u32),
        }
    }
}

/// Thousands-separator convention used when a numeric format is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberLocale {
    /// Comma groups digits, period is the decimal point (default).
    #[default]
    CommaGrouped,
    /// Period groups digits, comma is the decimal point.
    PeriodGrouped,
}

/// One entry of the declarative schema table.
///
/// The matching engine is parameterized entirely by these entries; adding a
/// metric means adding a row here, never touching the locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Unique field key, e.g. `faculty_count`.
    pub key: String,
    /// Ranking category.
    pub category: Category,
    /// Expected value kind.
    pub kind: ValueKind,
    /// Label synonyms searched for in page text.
    pub synonyms: Vec<String>,
    /// Optional custom regexes; capture group 1 is the value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    /// Canonical unit, required for currency fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_unit: Option<CurrencyUnit>,
    /// Separator convention; comma-grouped when unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<NumberLocale>,
    /// Default magnitude used when the field stays unmatched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Decimal>,
}

/// Numeric token: digits with optional separator-joined groups or fraction.
const NUM: &str = r"\d+(?:[,.\u{a0} ]\d+)*";
/// Currency symbol or abbreviation prefix.
const SYMBOL: &str = r"(?:₹|rs\.?|inr|\$)";
/// Recognized currency unit suffixes.
const UNIT: &str = r"(?:lakhs?|lacs?|crores?|cr|lpa|k|thousand|million|mn)\b";
/// Label-to-value connector tokens tolerated by the labeled strategy.
const CONNECTOR: &str =
    r"(?:\s*(?:[:\-–—=]|is|are|was|were|of|at|stands\s+at|stood\s+at)\s*|\s+)";
/// Qualifier words allowed between connector and value.
const FILLER: &str = r"(?:(?:about|around|approximately|nearly|over|currently|total|up\s+to)\s+)?";

/// Wraps an escaped synonym in word boundaries where its edges are word chars.
fn bounded(synonym: &str) -> String {
    let mut pattern = String::new();
    if synonym.chars().next().is_some_and(char::is_alphanumeric) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(synonym));
    if synonym.chars().last().is_some_and(char::is_alphanumeric) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Value pattern for the labeled strategy; bare numbers are acceptable here
/// because the adjacent label disambiguates them.
fn labeled_value_pattern(kind: ValueKind) -> Option<String> {
    match kind {
        ValueKind::Integer => Some(NUM.to_string()),
        ValueKind::Percentage => Some(format!(
            r"{NUM}\s*(?:%|percent\b|per\s+cent\b)|\d{{1,3}}(?:st|nd|rd|th)\s*percentile\b|{NUM}"
        )),
        ValueKind::Percentile => Some(r"\d{1,3}(?:st|nd|rd|th)?(?:\s*percentile\b)?".to_string()),
        ValueKind::Currency => Some(format!(
            r"{SYMBOL}\s*{NUM}\s*(?:{UNIT})?|{NUM}\s*{UNIT}|{NUM}"
        )),
        ValueKind::Boolean => None,
    }
}

/// Value-shaped token pattern for the proximity strategy; a marker (%, unit,
/// "percentile") is mandatory wherever a bare number would be ambiguous.
fn value_shape_pattern(kind: ValueKind) -> Option<String> {
    match kind {
        ValueKind::Integer => Some(NUM.to_string()),
        ValueKind::Percentage => Some(format!(
            r"{NUM}\s*(?:%|percent\b|per\s+cent\b)|\d{{1,3}}(?:st|nd|rd|th)\s*percentile\b"
        )),
        ValueKind::Percentile => Some(r"\d{1,3}(?:st|nd|rd|th)?\s*percentile\b".to_string()),
        ValueKind::Currency => Some(format!(r"{SYMBOL}\s*{NUM}\s*(?:{UNIT})?|{NUM}\s*{UNIT}")),
        ValueKind::Boolean => None,
    }
}

/// Schema entry compiled into its matching machinery.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    config: FieldConfig,
    labeled: Vec<Regex>,
    synonym_res: Vec<Regex>,
    value_shape: Option<Regex>,
}

impl FieldSpec {
    fn compile(config: FieldConfig) -> Result<Self, ExtractError> {
        let key = &config.key;
        if config.synonyms.is_empty() && config.patterns.is_empty() {
            return Err(ExtractError::EmptySynonyms { key: key.clone() });
        }
        if config.kind == ValueKind::Currency && config.currency_unit.is_none() {
            return Err(ExtractError::MissingCurrencyUnit { key: key.clone() });
        }

        let mut labeled = Vec::new();
        if let Some(value) = labeled_value_pattern(config.kind) {
            for synonym in &config.synonyms {
                let pattern = format!(
                    "(?i){}{CONNECTOR}{FILLER}({value})",
                    bounded(synonym)
                );
                labeled.push(Regex::new(&pattern).map_err(|source| ExtractError::Pattern {
                    key: key.clone(),
                    source,
                })?);
            }
        }
        for pattern in &config.patterns {
            let re = Regex::new(pattern).map_err(|source| ExtractError::Pattern {
                key: key.clone(),
                source,
            })?;
            if re.captures_len() < 2 {
                return Err(ExtractError::PatternCapture {
                    key: key.clone(),
                    pattern: pattern.clone(),
                });
            }
            labeled.push(re);
        }

        let mut synonym_res = Vec::new();
        for synonym in &config.synonyms {
            let pattern = format!("(?i){}", bounded(synonym));
            synonym_res.push(Regex::new(&pattern).map_err(|source| ExtractError::Pattern {
                key: key.clone(),
                source,
            })?);
        }

        let value_shape = match value_shape_pattern(config.kind) {
            Some(shape) => Some(Regex::new(&format!("(?i){shape}")).map_err(|source| {
                ExtractError::Pattern {
                    key: key.clone(),
                    source,
                }
            })?),
            None => None,
        };

        Ok(Self {
            config,
            labeled,
            synonym_res,
            value_shape,
        })
    }

    /// Unique field key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Ranking category.
    #[inline]
    pub const fn category(&self) -> Category {
        self.config.category
    }

    /// Expected value kind.
    #[inline]
    pub const fn kind(&self) -> ValueKind {
        self.config.kind
    }

    /// Canonical currency unit, present iff the kind is currency.
    #[inline]
    pub const fn currency_unit(&self) -> Option<CurrencyUnit> {
        self.config.currency_unit
    }

    /// Separator convention for this field.
    #[inline]
    pub fn locale(&self) -> NumberLocale {
        self.config.locale.unwrap_or_default()
    }

    /// Typed default used when no candidate survives.
    pub fn default_value(&self) -> MetricValue {
        let magnitude = self.config.default.unwrap_or(Decimal::ZERO);
        match self.config.kind {
            ValueKind::Integer => MetricValue::Count(magnitude.to_u64().unwrap_or(0)),
            ValueKind::Percentage => MetricValue::Percent(magnitude),
            ValueKind::Currency => MetricValue::Amount(magnitude),
            ValueKind::Percentile => MetricValue::Percentile(magnitude),
            ValueKind::Boolean => MetricValue::Flag(false),
        }
    }

    pub(crate) fn labeled(&self) -> &[Regex] {
        &self.labeled
    }

    pub(crate) fn synonym_res(&self) -> &[Regex] {
        &self.synonym_res
    }

    pub(crate) fn value_shape(&self) -> Option<&Regex> {
        self.value_shape.as_ref()
    }
}

/// Immutable, validated schema shared read-only by concurrent extractions.
#[derive(Debug, Clone)]
pub struct MetricSchema {
    fields: Vec<FieldSpec>,
}

impl MetricSchema {
    /// Validates and compiles a declarative field table.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ExtractError`] on an empty table, duplicate keys,
    /// fields without synonyms or patterns, invalid custom patterns, or a
    /// currency field without a canonical unit.
    pub fn from_fields(configs: Vec<FieldConfig>) -> Result<Self, ExtractError> {
        if configs.is_empty() {
            return Err(ExtractError::NoFields);
        }
        let mut seen = HashSet::new();
        for config in &configs {
            if !seen.insert(config.key.clone()) {
                return Err(ExtractError::DuplicateField {
                    key: config.key.clone(),
                });
            }
        }
        let fields = configs
            .into_iter()
            .map(FieldSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Loads the schema from its JSON table form.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] on undecodable JSON, plus every
    /// validation error of [`Self::from_fields`].
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let configs: Vec<FieldConfig> = serde_json::from_str(json)?;
        Self::from_fields(configs)
    }

    /// The built-in NIRF metric table.
    #[must_use]
    pub fn nirf() -> Self {
        Self::from_fields(nirf_fields()).expect("built-in schema is valid")
    }

    /// Compiled fields in schema order.
    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by key.
    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Number of schema fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema is empty; always false for validated schemas.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn entry(key: &str, category: Category, kind: ValueKind, synonyms: &[&str]) -> FieldConfig {
    FieldConfig {
        key: key.to_string(),
        category,
        kind,
        synonyms: synonyms.iter().map(ToString::to_string).collect(),
        patterns: Vec::new(),
        currency_unit: None,
        locale: None,
        default: None,
    }
}

fn money(key: &str, category: Category, unit: CurrencyUnit, synonyms: &[&str]) -> FieldConfig {
    FieldConfig {
        currency_unit: Some(unit),
        ..entry(key, category, ValueKind::Currency, synonyms)
    }
}

/// The default NIRF field table, distilled from institutional disclosure
/// pages: counts and ratios for faculty, research output, placement outcomes,
/// infrastructure spend, diversity shares and accessibility provisions.
#[allow(clippy::too_many_lines)]
fn nirf_fields() -> Vec<FieldConfig> {
    use Category::{
        Accessibility, Diversity, Faculty, Infrastructure, Placement, Research, Sports,
    };
    use CurrencyUnit::{Crores, Lakhs};
    use ValueKind::{Boolean, Integer, Percentage, Percentile};

    vec![
        // Faculty
        entry(
            "faculty_count",
            Faculty,
            Integer,
            &[
                "faculty count",
                "total faculty",
                "faculty members",
                "faculty strength",
                "teaching staff",
                "academic staff",
                "professors",
                "faculty",
            ],
        ),
        entry(
            "phd_faculty_count",
            Faculty,
            Integer,
            &[
                "faculty with phd",
                "phd faculty",
                "phd holders",
                "doctorate faculty",
                "doctoral faculty",
            ],
        ),
        entry(
            "phd_faculty_ratio",
            Faculty,
            Percentage,
            &["phd faculty ratio", "faculty with phd percentage", "phd percentage"],
        ),
        entry(
            "student_count",
            Faculty,
            Integer,
            &[
                "student count",
                "total students",
                "student strength",
                "students enrolled",
                "enrolled students",
                "enrollment",
                "enrolment",
            ],
        ),
        // Research
        entry(
            "publications",
            Research,
            Integer,
            &[
                "publications",
                "research papers",
                "papers published",
                "journal articles",
                "research publications",
            ],
        ),
        entry(
            "citations",
            Research,
            Integer,
            &["citations", "citation count", "times cited"],
        ),
        entry("h_index", Research, Integer, &["h-index", "h index"]),
        entry(
            "patents_filed",
            Research,
            Integer,
            &["patents filed", "patent applications"],
        ),
        entry(
            "patents_granted",
            Research,
            Integer,
            &["patents granted", "patents awarded", "granted patents", "patents"],
        ),
        money(
            "sponsored_research_funding",
            Research,
            Lakhs,
            &[
                "sponsored research funding",
                "sponsored projects funding",
                "research grants",
                "research funding",
            ],
        ),
        money(
            "consultancy_earnings",
            Research,
            Lakhs,
            &["consultancy earnings", "consultancy revenue", "consultancy income"],
        ),
        // Placement
        entry(
            "placement_rate",
            Placement,
            Percentage,
            &[
                "placement rate",
                "placement percentage",
                "students placed",
                "placement",
                "placed",
            ],
        ),
        money(
            "median_salary",
            Placement,
            Lakhs,
            &[
                "median salary",
                "median package",
                "median ctc",
                "average salary",
                "average package",
            ],
        ),
        entry(
            "higher_studies_rate",
            Placement,
            Percentage,
            &[
                "higher studies",
                "higher education",
                "pursuing higher studies",
                "opted for higher studies",
            ],
        ),
        entry(
            "graduation_rate",
            Placement,
            Percentage,
            &["graduation rate", "pass percentage", "pass rate"],
        ),
        entry(
            "placement_percentile",
            Placement,
            Percentile,
            &["placement percentile", "national percentile"],
        ),
        // Infrastructure
        money(
            "library_expenditure_physical",
            Infrastructure,
            Lakhs,
            &[
                "library expenditure (physical)",
                "physical library expenditure",
                "expenditure on books",
                "library expenditure",
            ],
        ),
        money(
            "library_expenditure_digital",
            Infrastructure,
            Lakhs,
            &[
                "library expenditure (digital)",
                "digital library expenditure",
                "e-resources expenditure",
                "expenditure on e-journals",
            ],
        ),
        money(
            "laboratory_expenditure",
            Infrastructure,
            Lakhs,
            &[
                "laboratory expenditure",
                "lab equipment expenditure",
                "expenditure on laboratories",
                "equipment expenditure",
            ],
        ),
        money(
            "infrastructure_budget",
            Infrastructure,
            Crores,
            &["infrastructure budget", "capital expenditure", "infrastructure spend"],
        ),
        entry(
            "classroom_count",
            Infrastructure,
            Integer,
            &["classrooms", "number of classrooms", "lecture halls"],
        ),
        entry(
            "laboratory_count",
            Infrastructure,
            Integer,
            &["laboratories", "number of laboratories", "number of labs"],
        ),
        // Diversity
        entry(
            "female_student_percentage",
            Diversity,
            Percentage,
            &[
                "female students",
                "women students",
                "girl students",
                "female enrollment",
                "female percentage",
            ],
        ),
        entry(
            "female_faculty_percentage",
            Diversity,
            Percentage,
            &["female faculty", "women faculty"],
        ),
        entry(
            "obc_percentage",
            Diversity,
            Percentage,
            &["obc students", "other backward classes", "obc"],
        ),
        entry(
            "sc_percentage",
            Diversity,
            Percentage,
            &["sc students", "scheduled caste"],
        ),
        entry(
            "st_percentage",
            Diversity,
            Percentage,
            &["st students", "scheduled tribe"],
        ),
        entry(
            "pwd_percentage",
            Diversity,
            Percentage,
            &[
                "pwd students",
                "divyangjan students",
                "differently abled students",
                "students with disabilities",
            ],
        ),
        entry(
            "other_state_percentage",
            Diversity,
            Percentage,
            &[
                "students from other states",
                "other state students",
                "outside state students",
            ],
        ),
        // Sports
        money(
            "sports_budget",
            Sports,
            Lakhs,
            &["sports budget", "sports expenditure", "expenditure on sports"],
        ),
        entry(
            "sports_awards",
            Sports,
            Integer,
            &["sports awards", "sports medals", "medals won"],
        ),
        entry(
            "playground_available",
            Sports,
            Boolean,
            &["playground", "sports ground", "athletic track"],
        ),
        entry(
            "gymnasium_available",
            Sports,
            Boolean,
            &["gymnasium", "gym", "fitness centre", "fitness center"],
        ),
        // Accessibility
        entry(
            "ramps_available",
            Accessibility,
            Boolean,
            &["ramps", "wheelchair ramps", "ramp access"],
        ),
        entry(
            "lifts_available",
            Accessibility,
            Boolean,
            &["lifts", "elevators", "elevator access"],
        ),
        entry(
            "accessible_toilets",
            Accessibility,
            Boolean,
            &["accessible toilets", "accessible washrooms", "disabled-friendly toilets"],
        ),
        entry(
            "wheelchair_availability",
            Accessibility,
            Boolean,
            &["wheelchairs", "wheelchair availability"],
        ),
        entry(
            "braille_resources",
            Accessibility,
            Boolean,
            &["braille", "braille books", "screen readers"],
        ),
    ]
}

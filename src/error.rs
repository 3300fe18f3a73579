//! Error taxonomy: fatal configuration errors and field-local parse failures.

use crate::schema::Category;

/// Fatal error raised while loading input or building a [`crate::MetricSchema`].
///
/// Per-page extraction never raises: data-quality problems surface as low
/// coverage on the record, not as errors.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    /// I/O error while reading a source page.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The declarative schema table is not decodable JSON.
    #[error("schema configuration is not valid JSON: {0}")]
    Config(#[from] serde_json::Error),
    /// The schema table contains no fields at all.
    #[error("schema configuration defines no fields")]
    NoFields,
    /// Two schema entries share the same field key.
    #[error("duplicate field key '{key}' in schema")]
    DuplicateField {
        /// The offending key.
        key: String,
    },
    /// A schema entry has neither synonyms nor custom patterns.
    #[error("field '{key}' has no synonyms and no patterns")]
    EmptySynonyms {
        /// The offending key.
        key: String,
    },
    /// A custom pattern in the schema failed to compile.
    #[error("invalid pattern for field '{key}': {source}")]
    Pattern {
        /// The offending key.
        key: String,
        /// Compilation failure reported by the regex engine.
        source: regex::Error,
    },
    /// A custom pattern has no capture group for the value.
    #[error("pattern '{pattern}' for field '{key}' captures nothing")]
    PatternCapture {
        /// The offending key.
        key: String,
        /// The pattern source text.
        pattern: String,
    },
    /// A currency field does not declare its canonical unit.
    #[error("currency field '{key}' must declare a canonical unit")]
    MissingCurrencyUnit {
        /// The offending key.
        key: String,
    },
    /// A weight table does not assign a weight to every category.
    #[error("weight table misses category {category:?}")]
    WeightsCoverage {
        /// The category without a weight.
        category: Category,
    },
    /// A weight table does not sum to 100.
    #[error("weights sum to {total}, expected 100")]
    WeightsSum {
        /// The actual sum.
        total: rust_decimal::Decimal,
    },
}

/// Field-local failure converting a candidate's raw text to a typed value.
///
/// Recovered inside the pipeline by discarding the candidate and trying the
/// next-best one; never propagated past the value parser.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The raw text is not a number of the expected shape.
    #[error("invalid number '{value}'")]
    Number {
        /// The unparsable raw text.
        value: String,
    },
    /// A percentage or percentile fell outside 0–100.
    #[error("value '{value}' out of the 0-100 range")]
    Range {
        /// The out-of-range raw text.
        value: String,
    },
    /// A currency amount carries an unrecognized unit suffix.
    #[error("unrecognized unit '{unit}' in '{value}'")]
    Unit {
        /// The full raw text.
        value: String,
        /// The suffix that was not recognized.
        unit: String,
    },
}

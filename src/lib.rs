#![warn(missing_docs)]
//! Extraction engine turning institutional ranking pages into typed,
//! confidence-scored NIRF metric records.
//!
//! The pipeline is a pure, synchronous computation over one fetched page:
//! raw HTML is normalized to plain text, each schema field is located by
//! ordered pattern strategies, matched spans are parsed into typed values,
//! a confidence tier is assigned, and the results are assembled into an
//! [`ExtractionRecord`] covering every schema field. Fetching, persistence
//! and rendering are collaborators outside this crate.

mod confidence;
mod error;
mod locate;
mod page;
mod record;
mod record_set;
mod schema;
mod score;
mod value;

pub use crate::confidence::Confidence;
pub use crate::error::{ExtractError, ParseError};
pub use crate::locate::{Candidate, Strategy};
pub use crate::page::{NormalizedText, RawPage};
pub use crate::record::{
    ExtractedValue, ExtractionBuilder, ExtractionRecord, SourceSpan, extract,
};
pub use crate::record_set::RecordSet;
pub use crate::schema::{
    Category, CurrencyUnit, FieldConfig, FieldSpec, MetricSchema, NumberLocale, ValueKind,
};
pub use crate::score::{ScoreCard, Weights, score_record};
pub use crate::value::MetricValue;

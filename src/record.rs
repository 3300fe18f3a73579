//! Record assembler: the extraction pipeline and its output record.

use crate::confidence::{self, Confidence};
use crate::locate;
use crate::page::{NormalizedText, RawPage};
use crate::schema::MetricSchema;
use crate::value::MetricValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Where an extracted value came from, for audit and review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    /// Start offset in the normalized text.
    pub start: usize,
    /// End offset in the normalized text, exclusive.
    pub end: usize,
    /// Approximate offset in the raw HTML, when recoverable.
    pub html_offset: Option<usize>,
    /// The matched raw text.
    pub matched: String,
}

/// Typed, confidence-scored result for one schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedValue {
    /// Typed value per the field's kind.
    pub value: MetricValue,
    /// Trust tier for downstream review.
    pub confidence: Confidence,
    /// Source span; absent for defaulted values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

/// Pipeline switches controlled by [`ExtractionBuilder`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExtractOptions {
    pub accumulate_strategies: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Final output of one extraction run: one value per schema field plus run
/// metadata. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRecord {
    /// URL the page was fetched from.
    pub source_url: String,
    /// When the extraction ran.
    pub extracted_at: DateTime<Utc>,
    /// One entry per schema field key; no field is ever omitted.
    pub fields: BTreeMap<String, ExtractedValue>,
    /// Fraction of fields extracted with non-`none` confidence.
    pub coverage_ratio: f64,
}

impl ExtractionRecord {
    /// Runs the full pipeline over one page with default options.
    #[inline]
    #[must_use]
    pub fn extract(schema: &MetricSchema, page: &RawPage) -> Self {
        ExtractionBuilder::new(schema, page).extract()
    }

    pub(crate) fn extract_with_options(
        schema: &MetricSchema,
        page: &RawPage,
        options: ExtractOptions,
    ) -> Self {
        let text = NormalizedText::from_page(page);
        debug!(url = %page.url, chars = text.text().len(), "normalized page");

        let mut fields = BTreeMap::new();
        let mut matched = 0_usize;
        for spec in schema.fields() {
            let candidates = locate::locate(&text, spec, options.accumulate_strategies);
            let extracted = confidence::select(spec, &candidates, &text);
            if extracted.confidence != Confidence::None {
                matched += 1;
            }
            fields.insert(spec.key().to_string(), extracted);
        }

        let coverage_ratio = matched as f64 / schema.len() as f64;
        debug!(url = %page.url, matched, total = schema.len(), "extraction complete");
        Self {
            source_url: page.url.clone(),
            extracted_at: options.timestamp.unwrap_or_else(Utc::now),
            fields,
            coverage_ratio,
        }
    }

    /// Looks up one field's result.
    pub fn get(&self, key: &str) -> Option<&ExtractedValue> {
        self.fields.get(key)
    }

    /// Keys that stayed at their schema default and need manual review.
    pub fn needs_review(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.confidence == Confidence::None)
            .map(|(k, _)| k.as_str())
    }

    /// Typed value of one field, defaults included.
    pub fn value(&self, key: &str) -> Option<&MetricValue> {
        self.fields.get(key).map(|v| &v.value)
    }
}

/// Extracts one page into a record; the spec-level entry point.
///
/// Never fails: data-quality problems surface as low coverage, and garbage
/// input produces an all-default record.
#[must_use]
pub fn extract(schema: &MetricSchema, raw_html: &str, source_url: &str) -> ExtractionRecord {
    let page = RawPage::new(source_url, raw_html);
    ExtractionRecord::extract(schema, &page)
}

/// Builder for an extraction run with non-default options.
pub struct ExtractionBuilder<'a> {
    schema: &'a MetricSchema,
    page: &'a RawPage,
    options: ExtractOptions,
}

impl<'a> ExtractionBuilder<'a> {
    /// Creates a builder over one page.
    ///
    /// # Example
    ///
    /// ```
    /// # use nirf_extract::{ExtractionBuilder, MetricSchema, RawPage};
    /// # let schema = MetricSchema::nirf();
    /// # let page = RawPage::new("https://example.ac.in", "<html></html>");
    /// let record = ExtractionBuilder::new(&schema, &page)
    ///     .accumulate_strategies(true)
    ///     .extract();
    /// assert_eq!(record.fields.len(), schema.len());
    /// ```
    #[inline]
    #[must_use]
    pub fn new(schema: &'a MetricSchema, page: &'a RawPage) -> Self {
        Self {
            schema,
            page,
            options: ExtractOptions::default(),
        }
    }

    /// Collects candidates from every strategy instead of stopping at the
    /// first one that matches, letting the scorer fall through tiers when a
    /// higher-tier candidate fails parsing.
    #[inline]
    #[must_use]
    pub const fn accumulate_strategies(mut self, enabled: bool) -> Self {
        self.options.accumulate_strategies = enabled;
        self
    }

    /// Pins the run timestamp, making repeated runs byte-identical.
    #[inline]
    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.options.timestamp = Some(timestamp);
        self
    }

    /// Runs the pipeline with the current options.
    #[inline]
    #[must_use]
    pub fn extract(self) -> ExtractionRecord {
        ExtractionRecord::extract_with_options(self.schema, self.page, self.options)
    }
}

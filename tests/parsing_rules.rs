use nirf_extract::{
    Category, Confidence, CurrencyUnit, ExtractError, ExtractionBuilder, ExtractionRecord,
    FieldConfig, MetricSchema, MetricValue, NumberLocale, RawPage, ValueKind, extract,
};
use rust_decimal::Decimal;

fn field(key: &str, kind: ValueKind, synonyms: &[&str]) -> FieldConfig {
    FieldConfig {
        key: key.to_string(),
        category: Category::Research,
        kind,
        synonyms: synonyms.iter().map(ToString::to_string).collect(),
        patterns: Vec::new(),
        currency_unit: None,
        locale: None,
        default: None,
    }
}

fn single(config: FieldConfig) -> MetricSchema {
    MetricSchema::from_fields(vec![config]).expect("valid schema")
}

fn run(schema: &MetricSchema, text: &str) -> ExtractionRecord {
    extract(schema, text, "https://example.ac.in/test")
}

#[test]
fn indian_grouping_parses_under_default_locale() {
    let schema = single(field("citations", ValueKind::Integer, &["total citations"]));
    let record = run(&schema, "Total Citations: 1,23,456");
    let value = record.get("citations").unwrap();
    assert_eq!(value.value, MetricValue::Count(123_456));
    assert_eq!(value.confidence, Confidence::High);
}

#[test]
fn period_grouping_needs_the_locale_hint() {
    let mut config = field("citations", ValueKind::Integer, &["citations"]);
    config.locale = Some(NumberLocale::PeriodGrouped);
    let record = run(&single(config), "Citations: 1.234");
    assert_eq!(record.value("citations"), Some(&MetricValue::Count(1_234)));

    // Under the default comma locale the period reads as a decimal point and
    // the non-integral candidate is discarded.
    let record = run(
        &single(field("citations", ValueKind::Integer, &["citations"])),
        "Citations: 1.234",
    );
    assert_eq!(
        record.get("citations").unwrap().confidence,
        Confidence::None
    );
}

#[test]
fn currency_normalizes_to_canonical_lakhs() {
    let mut config = field("median_salary", ValueKind::Currency, &["median salary"]);
    config.currency_unit = Some(CurrencyUnit::Lakhs);
    let schema = single(config);

    let cases = [
        ("Median Salary: Rs. 4,50,000", Decimal::new(45, 1)),
        ("Median Salary: 25 lakhs", Decimal::from(25)),
        ("Median Salary: ₹2 crore", Decimal::from(200)),
        ("Median Salary: 6.5 LPA", Decimal::new(65, 1)),
        // Bare amounts are taken as already canonical.
        ("Median Salary: 15", Decimal::from(15)),
    ];
    for (text, expected) in cases {
        let record = run(&schema, text);
        assert_eq!(
            record.value("median_salary"),
            Some(&MetricValue::Amount(expected)),
            "{text}"
        );
        assert_eq!(
            record.get("median_salary").unwrap().confidence,
            Confidence::High,
            "{text}"
        );
    }
}

#[test]
fn currency_fields_require_a_canonical_unit() {
    let err = MetricSchema::from_fields(vec![field(
        "median_salary",
        ValueKind::Currency,
        &["median salary"],
    )])
    .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::MissingCurrencyUnit { key } if key == "median_salary"
    ));
}

#[test]
fn percentages_validate_their_range() {
    let schema = single(field("pass_rate", ValueKind::Percentage, &["pass rate"]));
    let record = run(&schema, "Pass Rate: 180%");
    assert_eq!(record.get("pass_rate").unwrap().confidence, Confidence::None);

    let record = run(&schema, "Pass rate of 85 percent");
    assert_eq!(
        record.value("pass_rate"),
        Some(&MetricValue::Percent(Decimal::from(85)))
    );
    assert_eq!(record.get("pass_rate").unwrap().confidence, Confidence::High);
}

#[test]
fn ordinal_percentile_maps_to_its_number() {
    let schema = single(field(
        "national_percentile",
        ValueKind::Percentile,
        &["national percentile"],
    ));
    let record = run(&schema, "National Percentile: 85th percentile");
    assert_eq!(
        record.value("national_percentile"),
        Some(&MetricValue::Percentile(Decimal::from(85)))
    );
}

#[test]
fn filler_words_between_label_and_value() {
    let schema = single(field("pass_rate", ValueKind::Percentage, &["pass rate"]));
    let record = run(&schema, "Pass Rate: about 85%");
    assert_eq!(
        record.value("pass_rate"),
        Some(&MetricValue::Percent(Decimal::from(85)))
    );
    assert_eq!(record.get("pass_rate").unwrap().confidence, Confidence::High);
}

#[test]
fn same_strategy_tie_prefers_unambiguous_parse() {
    let schema = single(field("placement_rate", ValueKind::Percentage, &["placement rate"]));
    let record = run(
        &schema,
        "Placement rate of 85 was reported. Placement rate: 90%",
    );
    // The earlier candidate is a bare number; the %-marked one wins the tie.
    assert_eq!(
        record.value("placement_rate"),
        Some(&MetricValue::Percent(Decimal::from(90)))
    );
}

#[test]
fn failed_labeled_candidate_falls_through_when_accumulating() {
    let schema = single(field(
        "placement_rate",
        ValueKind::Percentage,
        &["placement rate", "placement"],
    ));
    let text = "Placement Rate: 250%. The campus recorded 85% placement overall.";
    let page = RawPage::new("https://example.ac.in/test", text);

    // First-match-wins locating stops at the labeled strategy, whose only
    // candidate fails range validation.
    let record = ExtractionBuilder::new(&schema, &page).extract();
    assert_eq!(
        record.get("placement_rate").unwrap().confidence,
        Confidence::None
    );

    let record = ExtractionBuilder::new(&schema, &page)
        .accumulate_strategies(true)
        .extract();
    let value = record.get("placement_rate").unwrap();
    assert_eq!(value.value, MetricValue::Percent(Decimal::from(85)));
    assert_eq!(value.confidence, Confidence::Medium);
}

#[test]
fn custom_patterns_act_as_labeled_matches() {
    let mut config = field("established_year", ValueKind::Integer, &["established"]);
    config.patterns = vec![r"(?i)established in (\d{4})".to_string()];
    let record = run(&single(config), "The college was established in 1965.");
    let value = record.get("established_year").unwrap();
    assert_eq!(value.value, MetricValue::Count(1_965));
    assert_eq!(value.confidence, Confidence::High);
}

#[test]
fn custom_pattern_must_capture() {
    let mut config = field("established_year", ValueKind::Integer, &["established"]);
    config.patterns = vec!["established".to_string()];
    let err = MetricSchema::from_fields(vec![config]).unwrap_err();
    assert!(matches!(err, ExtractError::PatternCapture { .. }));
}

#[test]
fn schema_rejects_duplicates_and_empties() {
    let err = MetricSchema::from_fields(vec![
        field("citations", ValueKind::Integer, &["citations"]),
        field("citations", ValueKind::Integer, &["times cited"]),
    ])
    .unwrap_err();
    assert!(matches!(err, ExtractError::DuplicateField { key } if key == "citations"));

    let err = MetricSchema::from_fields(vec![field("citations", ValueKind::Integer, &[])])
        .unwrap_err();
    assert!(matches!(err, ExtractError::EmptySynonyms { .. }));

    let err = MetricSchema::from_fields(Vec::new()).unwrap_err();
    assert!(matches!(err, ExtractError::NoFields));

    let err = MetricSchema::from_json("not json").unwrap_err();
    assert!(matches!(err, ExtractError::Config(_)));
}

#[test]
fn schema_loads_from_declarative_json() {
    let json = r#"[
        {
            "key": "faculty_count",
            "category": "faculty",
            "kind": "integer",
            "synonyms": ["faculty count", "faculty"]
        },
        {
            "key": "sports_budget",
            "category": "sports",
            "kind": "currency",
            "synonyms": ["sports budget"],
            "currency_unit": "lakhs"
        }
    ]"#;
    let schema = MetricSchema::from_json(json).expect("valid schema json");
    assert_eq!(schema.len(), 2);
    let record = run(&schema, "Faculty Count: 250\nSports Budget: ₹3 lakhs");
    assert_eq!(record.value("faculty_count"), Some(&MetricValue::Count(250)));
    assert_eq!(
        record.value("sports_budget"),
        Some(&MetricValue::Amount(Decimal::from(3)))
    );
}

#[test]
fn presence_flags_never_go_missing() {
    let schema = single(field("ramps_available", ValueKind::Boolean, &["ramps"]));
    let record = run(&schema, "Wheelchair ramps at every entrance.");
    let value = record.get("ramps_available").unwrap();
    assert_eq!(value.value, MetricValue::Flag(true));
    assert_eq!(value.confidence, Confidence::Low);

    let record = run(&schema, "A campus description with no access details.");
    let value = record.get("ramps_available").unwrap();
    assert_eq!(value.value, MetricValue::Flag(false));
    assert_eq!(value.confidence, Confidence::Low);
}

#[test]
fn binary_garbage_degrades_to_defaults() {
    let schema = single(field("citations", ValueKind::Integer, &["citations"]));
    let page = RawPage::from_bytes(
        "https://example.ac.in/garbage",
        &[0xff, 0xfe, 0x00, 0x9f, 0x92, 0x96],
    );
    let record = ExtractionRecord::extract(&schema, &page);
    assert_eq!(record.fields.len(), 1);
    assert_eq!(record.get("citations").unwrap().confidence, Confidence::None);
}

#[test]
fn weights_validate_coverage_and_sum() {
    use std::collections::BTreeMap;

    let mut sparse = BTreeMap::new();
    sparse.insert(Category::Faculty, Decimal::from(100));
    assert!(matches!(
        nirf_extract::Weights::new(sparse),
        Err(ExtractError::WeightsCoverage { .. })
    ));

    let mut wrong_sum = BTreeMap::new();
    for category in Category::ALL {
        wrong_sum.insert(category, Decimal::from(10));
    }
    assert!(matches!(
        nirf_extract::Weights::new(wrong_sum),
        Err(ExtractError::WeightsSum { .. })
    ));

    // 7 categories: 6 x 14 + 16 = 100.
    let mut valid = BTreeMap::new();
    for category in Category::ALL {
        let weight = if category == Category::Accessibility { 16 } else { 14 };
        valid.insert(category, Decimal::from(weight));
    }
    assert!(nirf_extract::Weights::new(valid).is_ok());
}

#[test]
fn normalizer_keeps_block_boundaries_and_decodes_entities() {
    use nirf_extract::NormalizedText;

    let page = RawPage::new(
        "https://example.ac.in/test",
        "<p>Faculty&nbsp;Count: 250</p><script>var x = 9;</script><p>Second&amp;Third</p>",
    );
    let text = NormalizedText::from_page(&page);
    assert_eq!(text.text(), "Faculty Count: 250\nSecond&Third");
}

//! Example CLI: extracts one saved institution page and prints the record.

use std::env;
use std::fs::File;

use nirf_extract::{
    Confidence, ExtractionBuilder, MetricSchema, RawPage, Weights, score_record,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut json = false;
    let mut positional = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            positional.push(arg);
        }
    }
    let Some(path) = positional.first() else {
        println!("Usage: nirf-extract <path-to-page.html> [source-url] [--json]");
        return Ok(());
    };
    let url = positional
        .get(1)
        .cloned()
        .unwrap_or_else(|| format!("file://{path}"));

    let page = RawPage::from_reader(url, File::open(path)?)?;
    let schema = MetricSchema::nirf();
    let record = ExtractionBuilder::new(&schema, &page)
        .accumulate_strategies(true)
        .extract();

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Source: {}", record.source_url);
    println!(
        "Coverage: {:.0}% of {} fields",
        record.coverage_ratio * 100.0,
        record.fields.len()
    );
    for (key, extracted) in &record.fields {
        if extracted.confidence != Confidence::None {
            println!(
                "  {key}: {} [{:?}]",
                extracted.value, extracted.confidence
            );
        }
    }
    let flagged: Vec<&str> = record.needs_review().collect();
    if !flagged.is_empty() {
        println!("Needs review ({}): {}", flagged.len(), flagged.join(", "));
    }

    let scores = score_record(&schema, &record, &Weights::default());
    println!("Category scores:");
    for (category, score) in &scores.categories {
        println!("  {category:?}: {score}");
    }
    println!("Total score: {}", scores.total);
    Ok(())
}

//! Summary statistics over a crawl result
//!
//! Used by the CLI to report how complete the extracted records are.

use crate::output::{CrawlResult, Value};

/// Per-field completeness counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatistics {
    /// Top-level field name
    pub name: String,
    /// Records where the field has a value
    pub filled: usize,
    /// Records where the field is null
    pub null: usize,
}

/// Aggregate statistics for a crawl result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub success: bool,
    pub total_records: usize,
    pub total_errors: usize,
    /// Top-level fields in first-seen order
    pub fields: Vec<FieldStatistics>,
}

/// Computes completeness statistics for every top-level field
pub fn collect_statistics(result: &CrawlResult) -> CrawlStatistics {
    let mut fields: Vec<FieldStatistics> = Vec::new();

    for record in &result.records {
        for (name, value) in record.iter() {
            let index = match fields.iter().position(|f| f.name == name) {
                Some(index) => index,
                None => {
                    fields.push(FieldStatistics {
                        name: name.to_string(),
                        filled: 0,
                        null: 0,
                    });
                    fields.len() - 1
                }
            };

            match value {
                Value::Null => fields[index].null += 1,
                _ => fields[index].filled += 1,
            }
        }
    }

    CrawlStatistics {
        success: result.success,
        total_records: result.records.len(),
        total_errors: result.errors.len(),
        fields,
    }
}

/// Prints a human-readable summary of a crawl result to stderr
pub fn print_summary(result: &CrawlResult) {
    let stats = collect_statistics(result);

    eprintln!("=== Crawl Summary ===\n");
    eprintln!("Status: {}", if stats.success { "success" } else { "failed" });
    eprintln!("Records: {}", stats.total_records);
    eprintln!("Errors: {}", stats.total_errors);

    if !stats.fields.is_empty() {
        eprintln!("\nFields:");
        for field in &stats.fields {
            let percentage = if stats.total_records > 0 {
                (field.filled as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            eprintln!(
                "  {}: {} filled, {} null ({:.1}%)",
                field.name, field.filled, field.null, percentage
            );
        }
    }

    if !result.errors.is_empty() {
        eprintln!("\nError Details:");
        for error in &result.errors {
            eprintln!("  - {}", error);
        }
    }
}

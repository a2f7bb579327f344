//! Output module for crawl results
//!
//! This module handles:
//! - The ordered record and value types produced by a crawl
//! - Writing results as JSON
//! - Summarizing record completeness

pub mod stats;
mod types;

pub use stats::{collect_statistics, print_summary, CrawlStatistics, FieldStatistics};
pub use types::{CrawlResult, OutputError, OutputResult, Record, Value};

use std::io::Write;

/// Writes a crawl result as JSON followed by a newline
///
/// # Arguments
///
/// * `result` - The crawl result to write
/// * `writer` - Destination (file, stdout, buffer)
/// * `pretty` - Indent the JSON for humans
pub fn write_json<W: Write>(result: &CrawlResult, mut writer: W, pretty: bool) -> OutputResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, result)?;
    } else {
        serde_json::to_writer(&mut writer, result)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

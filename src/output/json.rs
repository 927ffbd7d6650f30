//! JSON output of the consolidated report.

use crate::models::DropReport;
use std::error::Error;

/// Render the report as the pretty-printed one-element array document.
pub fn report_to_json(report: &DropReport) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&[report])
        .map_err(|e| format!("Error serializing report JSON: {e}"))?;
    Ok(json)
}

/// Write the report document to `output_file`.
pub fn write_report(output_file: &str, report: &DropReport) -> Result<(), Box<dyn Error>> {
    let json = report_to_json(report)?;
    std::fs::write(output_file, json)
        .map_err(|e| format!("Error writing output file {output_file}: {e}"))?;
    log::info!(
        "Wrote {} IPv4 and {} IPv6 ranges to {output_file}",
        report.v4.len(),
        report.v6.len()
    );
    Ok(())
}

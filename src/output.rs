use std::path::{Path, PathBuf};

use crate::conversion::ConversionOutput;

/// Write a conversion report into `dir`. Returns the file path.
pub fn write_report(dir: &Path, output: &ConversionOutput) -> crate::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let report_id = uuid::Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .unwrap_or("unknown")
        .to_string();
    let date = chrono::Utc::now().format("%Y-%m-%d");
    let path = dir.join(format!("{}-{}.json", report_id, date));

    let report = serde_json::json!({
        "summary": output.summary(),
        "conversions": output.conversions,
        "screenshots": output.screenshots,
        "nonAttributable": output.non_attributable,
    });

    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    tracing::info!("Wrote conversion report to {}", path.display());

    Ok(path)
}

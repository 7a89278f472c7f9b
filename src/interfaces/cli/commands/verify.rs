//! Verify command (read-only)

use colored::Colorize;

use crate::database::SchemaInspector;
use crate::errors::{AssetDbError, Result};
use crate::services::{VerificationReport, verify_schema};

pub async fn verify(inspector: &dyn SchemaInspector, json: bool) -> Result<()> {
    let report = verify_schema(inspector).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if report.is_ok() {
        Ok(())
    } else {
        let failed: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
        Err(AssetDbError::verification(format!(
            "{} check(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}

fn render_report(report: &VerificationReport) -> String {
    let mut out = format!("{}\n\n", "Schema verification".bold().green());
    for check in &report.checks {
        let mark = if check.passed {
            "✓".bold().green()
        } else {
            "✗".bold().red()
        };
        out.push_str(&format!(
            "  {} {:<36} {}\n",
            mark,
            check.name,
            check.detail.dimmed()
        ));
    }
    out
}

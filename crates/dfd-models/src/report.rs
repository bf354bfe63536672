//! Plain-text analysis report.

use std::fmt::{self, Write};

use crate::analysis::AnalysisResult;

/// Format a fraction as a rounded whole percentage, e.g. `0.874` -> `87%`.
pub fn format_percentage(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i64)
}

/// Render the downloadable text report for one analysis.
pub fn render_report(result: &AnalysisResult, filename: &str) -> String {
    let mut out = String::new();
    // fmt::Write into a String never fails
    write_report(&mut out, result, filename).ok();
    out
}

fn write_report(out: &mut impl Write, result: &AnalysisResult, filename: &str) -> fmt::Result {
    writeln!(out, "DEEPFAKE ANALYSIS REPORT")?;
    writeln!(out, "------------------------")?;
    writeln!(out, "File: {filename}")?;
    writeln!(
        out,
        "Processed: {}",
        result.processed_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        out,
        "Processing Time: {:.2} seconds",
        result.processing_time_seconds
    )?;
    writeln!(out)?;
    writeln!(out, "CONCLUSION")?;
    writeln!(out, "----------")?;
    writeln!(
        out,
        "This video {} a deepfake ({} confidence)",
        if result.is_manipulated { "IS" } else { "IS NOT" },
        format_percentage(result.confidence)
    )?;

    if !result.is_manipulated {
        return Ok(());
    }

    let abnormalities: Vec<String> = result
        .abnormalities
        .iter()
        .map(|a| {
            let markers: Vec<String> = a.timeframes_seconds.iter().map(|t| format!("{t}s")).collect();
            format!(
                "- {} ({} confidence)\n  Time markers: {}",
                a.description,
                format_percentage(a.confidence),
                markers.join(", ")
            )
        })
        .collect();
    writeln!(out)?;
    writeln!(out, "DETECTED ABNORMALITIES")?;
    writeln!(out, "----------------------")?;
    writeln!(out, "{}", abnormalities.join("\n\n"))?;

    let techniques: Vec<String> = result
        .techniques
        .iter()
        .map(|t| {
            format!(
                "- {} ({} probability)\n  {}",
                t.name,
                format_percentage(t.probability),
                t.description
            )
        })
        .collect();
    writeln!(out)?;
    writeln!(out, "MATHEMATICAL TECHNIQUES")?;
    writeln!(out, "----------------------")?;
    writeln!(out, "{}", techniques.join("\n\n"))
}

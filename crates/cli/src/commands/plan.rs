use super::CommandContext;
use crate::cli::OutputFormat;
use crate::notifier::ConsoleNotifier;
use gqlwatch_core::partition::PartitionReport;
use miette::IntoDiagnostic;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

/// Show what a save of `file` would regenerate, without generating
pub async fn execute(
    context: &CommandContext,
    file: &Path,
    output: OutputFormat,
) -> miette::Result<()> {
    let file = std::path::absolute(file).into_diagnostic()?;
    let service = context.service(Arc::new(ConsoleNotifier::new()));
    let qualifies = service.settings().should_generate_for(&file, &context.root)?;
    let report = service.plan(&file).await?;

    let rendered = match output {
        OutputFormat::Text => render_text(&file, qualifies, &report),
        OutputFormat::Json => render_json(&file, qualifies, &report).into_diagnostic()?,
    };
    println!("{rendered}");
    Ok(())
}

fn render_text(file: &Path, qualifies: bool, report: &PartitionReport) -> String {
    let mut out = String::new();
    if !qualifies {
        let _ = writeln!(
            out,
            "{} is not watched (extension or watch glob); a save would not trigger codegen",
            file.display()
        );
    }
    if report.single_artifact {
        let _ = write!(out, "single artifact: generation runs with {} as its only document", file.display());
        return out;
    }
    if report.selected.is_empty() {
        let _ = writeln!(out, "regenerate: (none)");
    }
    for artifact in &report.selected {
        let _ = writeln!(out, "regenerate: {artifact}");
    }
    for artifact in &report.skipped {
        let _ = writeln!(out, "skip: {artifact}");
    }
    out.trim_end().to_string()
}

fn render_json(
    file: &Path,
    qualifies: bool,
    report: &PartitionReport,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "file": file.to_string_lossy(),
        "qualifies": qualifies,
        "singleArtifact": report.single_artifact,
        "selected": report.selected,
        "skipped": report.skipped,
    }))
}

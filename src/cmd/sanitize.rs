use std::path::Path;

use anyhow::{bail, Context, Result};

use viasplit::AnnotationDocument;

pub fn cmd_sanitize(project: &Path, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if same_file(project, path) {
            bail!("refusing to overwrite input {}", project.display());
        }
    }

    let json = std::fs::read_to_string(project)
        .with_context(|| format!("failed to read {}", project.display()))?;

    let mut doc: AnnotationDocument = serde_json::from_str(&json)
        .with_context(|| format!("invalid VIA project in {}", project.display()))?;
    let report = doc.sanitize();

    if report.is_clean() {
        eprintln!("✅ No dangling references");
    } else {
        eprintln!(
            "🧹 Dropped {} metadata entries and {} attribute values",
            report.dropped_metadata.len(),
            report.dropped_values.len()
        );
        for id in &report.dropped_metadata {
            eprintln!("   - metadata {id}");
        }
        for (mid, aid) in &report.dropped_values {
            eprintln!("   - value {mid}.av.{aid}");
        }
    }

    let json = doc.to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("💾 Saved to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Whether `output` names the existing file `input`
fn same_file(input: &Path, output: &Path) -> bool {
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

use std::path::Path;

use anyhow::{bail, Result};

use viasplit::convert::{self, BatchManifest};
use viasplit::{ProjectStore, Settings};

use crate::OutputArgs;

pub async fn cmd_batch(settings: &Settings, manifest: &Path, output: &OutputArgs) -> Result<()> {
    let manifest = BatchManifest::load(manifest)?;
    eprintln!("📋 Running {} jobs", manifest.jobs.len());

    let mut assembler = super::assembler(settings, output);
    let store = super::store(settings, output)?;
    let out_dir = super::output_dir(settings, output);

    let summary = convert::run_batch(
        &manifest,
        &mut assembler,
        store.as_ref().map(|s| s as &dyn ProjectStore),
        &out_dir,
    )
    .await;

    for item in &summary.published {
        println!("{}", item.path.display());
    }

    let succeeded = manifest.jobs.len() - summary.failed.len();
    eprintln!("\n✅ {succeeded}/{} jobs succeeded", manifest.jobs.len());
    for (name, err) in &summary.failed {
        eprintln!("   ❌ {name}: {err:#}");
    }

    if !summary.failed.is_empty() {
        bail!("{} of {} jobs failed", summary.failed.len(), manifest.jobs.len());
    }
    Ok(())
}

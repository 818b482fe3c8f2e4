use std::path::PathBuf;

use anyhow::Result;

use viasplit::convert::{self, ConversionRequest};
use viasplit::{ProjectStore, Settings};

use crate::{OutputArgs, SplitArgs};

pub async fn cmd_convert(
    settings: &Settings,
    video: &str,
    captions: PathBuf,
    split: &SplitArgs,
    output: &OutputArgs,
) -> Result<()> {
    let request = ConversionRequest {
        video: video.to_string(),
        captions,
        reference: split.reference.clone(),
        split: split.size(),
    };

    eprintln!("🎬 Converting: {}", request.captions.display());
    eprintln!("   Video: {video}");
    if let Some(ref reference) = request.reference {
        eprintln!("   Reference: {}", reference.display());
    }

    let mut assembler = super::assembler(settings, output);
    let docs = convert::run(&request, &mut assembler)?;

    let store = super::store(settings, output)?;
    if let Some(ref store) = store {
        eprintln!("   Store: {}", store.endpoint());
    }

    let out_dir = super::output_dir(settings, output);
    let published = convert::publish(
        &docs,
        store.as_ref().map(|s| s as &dyn ProjectStore),
        &out_dir,
    )
    .await?;

    let shared = published.iter().filter(|p| p.pid.is_some()).count();
    eprintln!("\n✅ {} projects written to {}", published.len(), out_dir.display());
    if store.is_some() {
        eprintln!("   Shared: {shared}/{}", published.len());
    }

    for item in &published {
        println!("{}", item.path.display());
    }

    Ok(())
}

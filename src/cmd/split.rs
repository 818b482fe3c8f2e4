use std::path::Path;

use anyhow::Result;

use viasplit::convert;

use crate::{SplitArgs, SplitFormat};

pub fn cmd_split(captions: &Path, split: &SplitArgs, format: SplitFormat) -> Result<()> {
    let segmentation = convert::segment_files(captions, split.reference.as_deref(), split.size())?;

    match format {
        SplitFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&segmentation.windows)?);
        }
        SplitFormat::Table => {
            println!("{:>4}  {:>10}  {:>10}  {:>9}", "#", "start", "end", "captions");
            for (i, window) in segmentation.windows.iter().enumerate() {
                println!(
                    "{:>4}  {:>10.3}  {:>10.3}  {:>9}",
                    i + 1,
                    window.start,
                    window.end,
                    window.caption_count()
                );
            }
            eprintln!(
                "\n📊 {} captions in {} windows",
                segmentation.primary.len(),
                segmentation.windows.len()
            );
        }
    }

    Ok(())
}

pub mod batch;
pub mod convert;
pub mod sanitize;
pub mod split;

use std::path::PathBuf;

use anyhow::Result;

use viasplit::{Assembler, HttpStore, IdGenerator, RandomIds, SequentialIds, Settings};

use crate::OutputArgs;

/// Assembler configured from settings and the `--sequential-ids` flag
pub fn assembler(settings: &Settings, output: &OutputArgs) -> Assembler<Box<dyn IdGenerator>> {
    let ids: Box<dyn IdGenerator> = if output.sequential_ids {
        Box::new(SequentialIds::default())
    } else {
        Box::new(RandomIds::default())
    };
    Assembler::with_ids(settings.project_template(), ids)
}

/// Project store from `--upload-url`, falling back to `[store] url`
pub fn store(settings: &Settings, output: &OutputArgs) -> Result<Option<HttpStore>> {
    output
        .upload_url
        .as_deref()
        .or(settings.store.url.as_deref())
        .map(HttpStore::new)
        .transpose()
}

pub fn output_dir(settings: &Settings, output: &OutputArgs) -> PathBuf {
    output
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.output.dir.clone())
}

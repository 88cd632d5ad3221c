//! Reading and writing index files.

use std::path::Path;

use super::builder::IndexBuilder;
use super::codec;
use super::corpus::Corpus;
use super::SearchIndex;
use crate::error::{DsError, Result};

/// How [`load_or_rebuild`] obtained its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Rebuilt { reason: String },
}

/// Read and validate an index file, tokenizing with `builder`'s policy when
/// the file carries none.
pub fn read_index(path: &Path, builder: &IndexBuilder) -> Result<SearchIndex> {
    let text = std::fs::read_to_string(path)?;
    codec::decode(&text, builder.env_version(), builder.tokenizer())
}

/// Write through a temporary file and rename so readers never observe a
/// partially written index.
pub fn write_index(path: &Path, index: &SearchIndex, wrap_js: bool) -> Result<()> {
    let payload = if wrap_js {
        codec::encode_js(index)?
    } else {
        codec::encode(index)?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, payload)?;
    std::fs::rename(&tmp, path)?;

    tracing::debug!(path = %path.display(), wrap_js, "wrote search index");
    Ok(())
}

/// Load `path`, rebuilding from the corpus when the file is missing or was
/// written for another environment version. Other decode failures are
/// returned unchanged.
pub fn load_or_rebuild<F>(
    path: &Path,
    builder: &IndexBuilder,
    wrap_js: bool,
    load_corpus: F,
) -> Result<(SearchIndex, LoadOutcome)>
where
    F: FnOnce() -> Result<Corpus>,
{
    let reason = match read_index(path, builder) {
        Ok(index) => return Ok((index, LoadOutcome::Loaded)),
        Err(err) if err.requires_rebuild() => err.to_string(),
        Err(DsError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            format!("{} does not exist", path.display())
        }
        Err(err) => return Err(err),
    };

    tracing::warn!(path = %path.display(), %reason, "rebuilding search index");
    let index = builder.build(&load_corpus()?)?;
    write_index(path, &index, wrap_js)?;
    Ok((index, LoadOutcome::Rebuilt { reason }))
}

//! Python output: the rendered module at `<outpath>/index.py`.

use std::path::PathBuf;

use super::{write_file, Target};
use crate::error::ReleaseError;

pub(super) fn emit(target: &Target<'_>, source: &str) -> Result<Vec<PathBuf>, ReleaseError> {
    Ok(vec![write_file(target.outpath.join("index.py"), source)?])
}

//! Go output: one file per schema, `<snake_title>.go`, holding the package clause,
//! the raw schema as a string constant and the rendered types.

use std::path::PathBuf;

use super::{write_file, Target};
use crate::error::ReleaseError;
use crate::names::{
    is_go_keyword, leading_digit_safe, safe_ident, to_pascal_case, to_snake_case,
};

/// Escape text for use inside a double-quoted Go string literal.
pub(crate) fn escape_go_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub(super) fn emit(target: &Target<'_>, types: &str) -> Result<Vec<PathBuf>, ReleaseError> {
    let file_stem = leading_digit_safe(to_snake_case(target.title));
    let package = safe_ident(to_snake_case(target.title), is_go_keyword);
    let export = format!("Raw{}", to_pascal_case(target.title));
    let raw = escape_go_string(&target.schema.to_string());

    let go = format!(
        "package {}\n\nconst {} = \"{}\"\n\n{}",
        package, export, raw, types
    );

    Ok(vec![write_file(
        target.outpath.join(format!("{}.go", file_stem)),
        &go,
    )?])
}

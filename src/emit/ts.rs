//! TypeScript output.
//!
//! The single-file variant writes `<name>.ts` (the raw schema as a named and a
//! default export) next to `<name>.d.ts` (the rendered typings). The compile
//! variant writes `src/index.ts` and `src/schema.json`, compiles them into
//! `build/` and replaces `build/index.d.ts` with the rendered typings.

use std::path::PathBuf;

use super::{write_file, Target};
use crate::error::ReleaseError;
use crate::names::{is_ts_reserved, safe_ident, to_camel_case};
use crate::tsc::CompilerOptions;

pub(super) fn emit(target: &Target<'_>, typings: &str) -> Result<Vec<PathBuf>, ReleaseError> {
    let ident = safe_ident(to_camel_case(target.title), is_ts_reserved);
    let module = format!(
        "export const {ident} = {raw};\nexport default {ident};\n",
        ident = ident,
        raw = target.schema
    );

    let Some(compiler) = target.compiler else {
        let base = target.output_name;
        return Ok(vec![
            write_file(target.outpath.join(format!("{}.ts", base)), &module)?,
            write_file(target.outpath.join(format!("{}.d.ts", base)), typings)?,
        ]);
    };

    let src = target.outpath.join("src");
    let build = target.outpath.join("build");

    let mut written = vec![
        write_file(src.join("schema.json"), target.source)?,
        write_file(src.join("index.ts"), &module)?,
    ];

    compiler.compile(&CompilerOptions::release(&build), &written)?;

    written.push(write_file(build.join("index.d.ts"), typings)?);
    Ok(written)
}

//! Source-to-source migration from moment.js to dayjs.
//!
//! The crate parses a file, runs a fixed pipeline of rewrite passes over the
//! tree, injects the dayjs plugin and locale loader statements the rewritten
//! code needs, and prints the result. Failure at any stage leaves the file's
//! output unproduced; there are no partial rewrites.

mod ast;
mod error;
mod inject;
mod passes;
pub mod printer;
pub mod registry;
pub mod units;

pub use error::Error;
pub use printer::{Dialect, PrintOptions, QuoteStyle};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-run configuration, deserializable from a JSON config blob.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub dialect: Dialect,
    pub printer: PrintOptions,
}

impl Options {
    pub fn from_json(config: &str) -> serde_json::Result<Options> {
        serde_json::from_str(config)
    }
}

/// Rewrites one file's source text from moment to dayjs.
///
/// Returns the rewritten source, or an error when the input does not parse,
/// uses a capability dayjs lacks, or cannot be printed. The transformation is
/// idempotent: running it over its own output changes nothing.
pub fn transform(source: &str, options: &Options) -> Result<String, Error> {
    let (mut module, cm, comments) = printer::parse(source, options.dialect)?;
    let mut ctx = passes::RewriteContext::default();
    passes::run(&mut module, &mut ctx)?;
    debug!(plugins = ?ctx.plugins, locales = ?ctx.locales, "rewrite finished");
    inject::inject(&mut module, &ctx)?;
    printer::print(&mut module, &cm, &comments, &options.printer)
}

/// Parses and re-prints without rewriting anything.
///
/// Useful for producing baselines formatted by the same printer the transform
/// uses, so textual comparisons see rewrite differences only.
pub fn reprint(source: &str, options: &Options) -> Result<String, Error> {
    let (mut module, cm, comments) = printer::parse(source, options.dialect)?;
    printer::print(&mut module, &cm, &comments, &options.printer)
}

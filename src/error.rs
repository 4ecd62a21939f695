use thiserror::Error;

/// Failure modes of a single-file transformation.
///
/// Everything bubbles to the driver; no pass continues past an error with a
/// partially rewritten tree. A failed file produces no output.
#[derive(Debug, Error)]
pub enum Error {
    /// A capability marked unsupported in the registry matched somewhere in
    /// the file. The file is left untouched.
    #[error("unsupported dayjs capability '{capability}'")]
    UnsupportedCapability { capability: &'static str },

    /// The parser could not build a tree; no passes ran.
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// More than one dayjs anchor statement survived de-duplication. This is
    /// an internal invariant violation, not a recoverable condition.
    #[error("ambiguous dayjs {module_system} anchor: expected at most one statement")]
    AmbiguousAnchor { module_system: &'static str },

    /// The emitter failed to render the rewritten tree.
    #[error("failed to emit output: {0}")]
    Emit(String),
}

//! Ingestion error types.

use std::fmt;

use hotload_core::error::{AppError, ErrorKind};
use hotload_host::HostError;

/// Errors that abort the ingestion of a single module.
///
/// None of these are fatal to the process; the consumer logs them and moves
/// on to the next queued path.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// No embedded resource name ends with the manifest suffix.
    #[error("no embedded resource ending in '{suffix}'")]
    ManifestNotFound {
        /// Suffix that was searched for.
        suffix: &'static str,
    },

    /// The manifest resource is not valid JSON or has no usable id.
    #[error("manifest resource '{resource}' is malformed: {reason}")]
    ManifestParse {
        /// Resource name.
        resource: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No type in the module's namespace carries a valid plugin entry marker.
    #[error("no plugin entry type found in namespace '{namespace}'")]
    EntryTypeNotFound {
        /// Namespace derived from the manifest resource name.
        namespace: String,
    },

    /// The host's internal plugin list is missing or incompatible.
    #[error("host registration failed: {0}")]
    HostRegistration(String),

    /// An internal consistency check failed.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A lifecycle call failed inside the host.
    #[error(transparent)]
    Lifecycle(#[from] HostError),

    /// The module binary could not be parsed.
    #[error("malformed module: {0}")]
    MalformedModule(String),

    /// The module parsed but could not be compiled.
    #[error("failed to compile module: {0}")]
    Compile(#[source] wasmtime::Error),

    /// The module source could not be read.
    #[error("failed to read module: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Stable category of this error.
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            Self::ManifestNotFound { .. } => IngestErrorKind::ManifestNotFound,
            Self::ManifestParse { .. } => IngestErrorKind::ManifestParse,
            Self::EntryTypeNotFound { .. } => IngestErrorKind::EntryTypeNotFound,
            Self::HostRegistration(_) => IngestErrorKind::HostRegistration,
            Self::InvariantViolation(_) => IngestErrorKind::InvariantViolation,
            Self::Lifecycle(_) => IngestErrorKind::Lifecycle,
            Self::MalformedModule(_) => IngestErrorKind::MalformedModule,
            Self::Compile(_) => IngestErrorKind::Compile,
            Self::Io(_) => IngestErrorKind::Io,
        }
    }
}

impl From<wasmparser::BinaryReaderError> for IngestError {
    fn from(err: wasmparser::BinaryReaderError) -> Self {
        Self::MalformedModule(err.to_string())
    }
}

/// Error categories reported in tick outcomes and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestErrorKind {
    ManifestNotFound,
    ManifestParse,
    EntryTypeNotFound,
    HostRegistration,
    InvariantViolation,
    Lifecycle,
    MalformedModule,
    Compile,
    Io,
}

impl fmt::Display for IngestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManifestNotFound => "manifest_not_found",
            Self::ManifestParse => "manifest_parse",
            Self::EntryTypeNotFound => "entry_type_not_found",
            Self::HostRegistration => "host_registration",
            Self::InvariantViolation => "invariant_violation",
            Self::Lifecycle => "lifecycle",
            Self::MalformedModule => "malformed_module",
            Self::Compile => "compile",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        let kind = match err.kind() {
            IngestErrorKind::ManifestNotFound | IngestErrorKind::EntryTypeNotFound => {
                ErrorKind::NotFound
            }
            IngestErrorKind::ManifestParse | IngestErrorKind::MalformedModule => {
                ErrorKind::Validation
            }
            IngestErrorKind::HostRegistration | IngestErrorKind::Lifecycle => ErrorKind::Host,
            IngestErrorKind::InvariantViolation => ErrorKind::Internal,
            IngestErrorKind::Compile => ErrorKind::Plugin,
            IngestErrorKind::Io => ErrorKind::Io,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

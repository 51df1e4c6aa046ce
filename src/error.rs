//! Error types for session key reconstruction.
//!
//! Every failure the attack can end in is a variant of [`AttackError`]. The
//! variants follow the attack's own taxonomy rather than the collaborator that
//! raised them, so callers can tell a conclusive negative (the session is not
//! A5/1) from a capture that simply does not hold enough material.
//!
//! ## Error Categories
//!
//! - **Configuration**: invalid or missing attack parameters, raised before any
//!   pipeline run
//! - **NotFound**: Immediate Assignment or Cipher Mode Command absent from the
//!   capture
//! - **WrongCipher**: the session is ciphered with something other than A5/1
//! - **Inconclusive**: known plaintext could not be assembled for a phase or slot
//! - **Pipeline / Encoder / Oracle**: a collaborator reported a failure
//! - **File / Parse**: record files and configuration documents
//!
//! Exhausting every candidate without a key is not an error; it is reported as
//! [`AttackOutcome::Exhausted`](crate::AttackOutcome::Exhausted).
//!
//! ```rust
//! use a51_replay::AttackError;
//!
//! let error = AttackError::not_found("no Cipher Mode Command after frame 1000");
//! assert!(!error.is_conclusive());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{CipherAlgorithm, FrameNumber};

/// Result type alias for attack operations.
pub type Result<T, E = AttackError> = std::result::Result<T, E>;

/// Main error type for attack operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AttackError {
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Cipher Mode Command at frame {frame} does not assign A5/1 (found {found})")]
    WrongCipher { frame: FrameNumber, found: String },

    #[error("Inconclusive: {reason}")]
    Inconclusive { reason: String },

    #[error("Decoding pipeline failed: {reason}")]
    Pipeline {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Message encoder failed: {reason}")]
    Encoder {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Key oracle failed: {reason}")]
    Oracle {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Record file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Attack cancelled")]
    Cancelled,
}

/// Machine-readable classification of an [`AttackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Configuration,
    NotFound,
    WrongCipher,
    Inconclusive,
    Pipeline,
    Encoder,
    Oracle,
    File,
    Parse,
    Cancelled,
}

impl AttackError {
    /// Returns the machine-readable kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            AttackError::Configuration { .. } => FailureKind::Configuration,
            AttackError::NotFound { .. } => FailureKind::NotFound,
            AttackError::WrongCipher { .. } => FailureKind::WrongCipher,
            AttackError::Inconclusive { .. } => FailureKind::Inconclusive,
            AttackError::Pipeline { .. } => FailureKind::Pipeline,
            AttackError::Encoder { .. } => FailureKind::Encoder,
            AttackError::Oracle { .. } => FailureKind::Oracle,
            AttackError::File { .. } => FailureKind::File,
            AttackError::Parse { .. } => FailureKind::Parse,
            AttackError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Returns whether this error settles the question for the capture.
    ///
    /// A conclusive error means re-running against the same capture cannot
    /// produce a key.
    pub fn is_conclusive(&self) -> bool {
        matches!(self, AttackError::WrongCipher { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AttackError::Configuration { .. } => vec![
                "Provide exactly one of the Cipher Mode Command or Immediate Assignment frame",
                "Check the timeslot is in the range 0-7",
                "Check frame numbers are below the hyperframe period",
            ],
            AttackError::NotFound { .. } => vec![
                "Verify the frame number against the decoded control messages",
                "Check the timeslot and channel mode match the dedicated channel",
                "Provide the Cipher Mode Command frame directly if it is known",
            ],
            AttackError::WrongCipher { .. } => {
                vec!["The session is not ciphered with A5/1; this capture cannot be attacked"]
            }
            AttackError::Inconclusive { .. } => vec![
                "Capture a longer window before the Cipher Mode Command",
                "Check that System Information on SACCH was decoded",
                "Verify the message encoder produces four bursts per message",
            ],
            AttackError::Pipeline { .. } => vec![
                "Check the capture or record file is readable",
                "Verify the decoding pipeline configuration",
            ],
            AttackError::Encoder { .. } => vec![
                "Ensure gsmframecoder is installed and on the PATH",
                "Check the encoder program path in the configuration",
            ],
            AttackError::Oracle { .. } => vec![
                "Check the TMTO oracle is running and its tables are loaded",
                "Verify connectivity to the oracle",
            ],
            AttackError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            AttackError::Parse { .. } => vec![
                "Check the record file format",
                "Verify payload fields are hex and burst fields are bit strings",
            ],
            AttackError::Cancelled => vec!["Re-run the attack without cancelling"],
        }
    }

    /// Helper constructor for configuration errors.
    pub fn configuration(reason: impl Into<String>) -> Self {
        AttackError::Configuration { reason: reason.into() }
    }

    /// Helper constructor for missing records.
    pub fn not_found(what: impl Into<String>) -> Self {
        AttackError::NotFound { what: what.into() }
    }

    /// Helper constructor for a Cipher Mode Command that does not select A5/1.
    pub fn wrong_cipher(frame: FrameNumber, found: Option<CipherAlgorithm>) -> Self {
        let found = match found {
            Some(algorithm) => algorithm.to_string(),
            None => "no Cipher Mode Command".to_string(),
        };
        AttackError::WrongCipher { frame, found }
    }

    /// Helper constructor for inconclusive phases or slots.
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        AttackError::Inconclusive { reason: reason.into() }
    }

    /// Helper constructor for decoding pipeline errors.
    pub fn pipeline_failed(reason: impl Into<String>) -> Self {
        AttackError::Pipeline { reason: reason.into(), source: None }
    }

    /// Helper constructor for encoder errors.
    pub fn encoder_failed(reason: impl Into<String>) -> Self {
        AttackError::Encoder { reason: reason.into(), source: None }
    }

    /// Helper constructor for encoder errors with source.
    pub fn encoder_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AttackError::Encoder { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for oracle errors.
    pub fn oracle_failed(reason: impl Into<String>) -> Self {
        AttackError::Oracle { reason: reason.into(), source: None }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        AttackError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        AttackError::Parse { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for AttackError {
    fn from(err: std::io::Error) -> Self {
        AttackError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for AttackError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        AttackError::Parse { context: "YAML document".to_string(), details: err.to_string() }
    }
}

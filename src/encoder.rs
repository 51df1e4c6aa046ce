//! Message-to-burst encoding
//!
//! Known plaintext has to be compared against ciphertext bursts, so every
//! plaintext message is run through the same channel coding and interleaving
//! as the network applied: 23 bytes in, four 114-bit burst payloads out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::types::{BURSTS_PER_MESSAGE, BurstPayload};
use crate::{AttackError, Result};

/// Encodes a control channel message into its burst payloads.
#[async_trait::async_trait]
pub trait MessageEncoder: Send + Sync {
    /// Encode `message` into burst payloads.
    ///
    /// Returns up to [`BURSTS_PER_MESSAGE`] payloads in burst order. Fewer
    /// than four signals malformed output; callers must check the length
    /// before indexing.
    async fn encode(&self, message: &[u8]) -> Result<Vec<BurstPayload>>;
}

#[async_trait::async_trait]
impl<T: MessageEncoder + ?Sized> MessageEncoder for Arc<T> {
    async fn encode(&self, message: &[u8]) -> Result<Vec<BurstPayload>> {
        (**self).encode(message).await
    }
}

/// Encoder backed by the external `gsmframecoder` program.
#[derive(Debug, Clone)]
pub struct FrameCoder {
    program: PathBuf,
}

impl Default for FrameCoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCoder {
    /// Minimum output lines for a complete encoding: a header line, then a
    /// label line before each of the four bursts.
    pub const MIN_OUTPUT_LINES: usize = 9;

    /// Use `gsmframecoder` from the `PATH`.
    pub fn new() -> Self {
        Self { program: PathBuf::from("gsmframecoder") }
    }

    /// Use a specific encoder binary.
    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self { program: program.as_ref().to_path_buf() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Extract burst payloads from the encoder's standard output.
    ///
    /// Bursts are on lines 2, 4, 6 and 8. Short output yields no bursts and
    /// unparseable burst lines are dropped, so the result may hold fewer
    /// than four payloads.
    pub fn parse_output(stdout: &str) -> Vec<BurstPayload> {
        let lines: Vec<&str> = stdout.split('\n').collect();
        if lines.len() < Self::MIN_OUTPUT_LINES {
            warn!(
                "Encoder produced {} lines, expected at least {}",
                lines.len(),
                Self::MIN_OUTPUT_LINES
            );
            return Vec::new();
        }

        (0..BURSTS_PER_MESSAGE)
            .filter_map(|i| {
                let line = lines[(i + 1) * 2];
                match line.parse::<BurstPayload>() {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        warn!("Dropping encoder burst {}: {}", i, e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MessageEncoder for FrameCoder {
    async fn encode(&self, message: &[u8]) -> Result<Vec<BurstPayload>> {
        let hex_message = hex::encode_upper(message);
        debug!("Encoding {} with {}", hex_message, self.program.display());

        let output = Command::new(&self.program).arg(&hex_message).output().await.map_err(|e| {
            AttackError::encoder_failed_with_source(
                format!("could not run {}", self.program.display()),
                Box::new(e),
            )
        })?;

        if !output.status.success() {
            warn!("{} exited with {}", self.program.display(), output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Self::parse_output(&stdout))
    }
}

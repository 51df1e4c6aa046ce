//! Known-plaintext session key recovery for A5/1-ciphered GSM captures.
//!
//! a51-replay locates the Cipher Mode Command of a recorded GSM session,
//! predicts the plaintext of the first ciphered control messages, and submits
//! ciphertext/plaintext burst pairs to a time-memory-trade-off oracle until one
//! of them yields the session key Kc.
//!
//! # Features
//!
//! - **Anchor resolution**: start from the Cipher Mode Command frame, or from
//!   the Immediate Assignment that opened the dedicated channel
//! - **SDCCH attack**: LAPDm fill frames sent right after ciphering starts
//! - **SACCH attack**: System Information predicted from its broadcast
//!   rotation, with the session's timing advance patched in
//! - **Hyperframe aware**: frame arithmetic wraps at 2 715 648
//!
//! # Collaborators
//!
//! The attack is wired to three external capabilities, each behind a trait:
//! [`DecodingPipeline`] produces bursts and decoded messages, [`MessageEncoder`]
//! turns a 23-byte message into burst payloads, and [`KeyOracle`] runs the key
//! search. [`ReplayPipeline`] and [`FrameCoder`] are bundled implementations.
//!
//! ## Example (record file replay)
//!
//! ```rust,no_run
//! use a51_replay::{Attack, AttackConfig, AttackBurstSet, KeyOracle, SessionKey};
//!
//! struct RemoteOracle;
//!
//! #[async_trait::async_trait]
//! impl KeyOracle for RemoteOracle {
//!     async fn search(
//!         &self,
//!         _burst_set: &AttackBurstSet,
//!         _verbose: bool,
//!     ) -> a51_replay::Result<Option<SessionKey>> {
//!         Ok(None)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> a51_replay::Result<()> {
//!     let config = AttackConfig::from_cmc(5000, 1);
//!     let report = Attack::open("records.yaml", RemoteOracle, config)?.run().await;
//!
//!     match report.key() {
//!         Some(key) => println!("Key found: {}", key),
//!         None => println!("No key: {:?}", report.outcome),
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Configuration and frame planning
pub mod config;
pub mod window;

// Collaborators
pub mod encoder;
pub mod oracle;
pub mod pipeline;
pub mod pipelines;

// Attack phases
pub mod cmc;
pub mod context;
pub mod orchestrator;
pub mod sacch;
pub mod sdcch;

// Core exports
pub use error::*;
pub use types::*;

pub use config::{Anchor, AttackConfig};
pub use encoder::{FrameCoder, MessageEncoder};
pub use oracle::KeyOracle;
pub use orchestrator::{AttackOrchestrator, AttackOutcome, AttackPhase, AttackReport, AttackState};
pub use pipeline::{DecodeRequest, DecodedCapture, DecodingPipeline};
pub use pipelines::ReplayPipeline;

/// Unified entry point for attack runs.
pub struct Attack;

impl Attack {
    /// Attack a pre-extracted record file, encoding plaintext with `gsmframecoder`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record file does not exist or is not readable
    /// - The record file is not valid YAML
    ///
    /// Configuration errors are reported by the run itself, as a failed outcome.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use a51_replay::{Attack, AttackConfig, KeyOracle};
    /// # async fn example<O: KeyOracle>(oracle: O) -> a51_replay::Result<()> {
    /// let config = AttackConfig::from_immediate_assignment(1000, 0);
    /// let report = Attack::open("records.yaml", oracle, config)?.run().await;
    /// println!("{:?}", report.states);
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P, O>(
        path: P,
        oracle: O,
        config: AttackConfig,
    ) -> Result<AttackOrchestrator<ReplayPipeline, O, FrameCoder>>
    where
        P: AsRef<std::path::Path>,
        O: KeyOracle,
    {
        let pipeline = ReplayPipeline::open(path)?;
        Ok(AttackOrchestrator::new(pipeline, oracle, FrameCoder::new(), config))
    }
}

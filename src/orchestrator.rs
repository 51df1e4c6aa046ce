//! Attack state machine
//!
//! The orchestrator drives one attack run from the configured anchor frame to
//! a terminal outcome:
//!
//! ```text
//! ResolvingContext ──► LocatingCmc ──► ValidatingCipher ──► AttackingSdcch ──► AttackingSacch
//!        │                 │                 │                    │                  │
//!        └─────────────────┴────────┬────────┴────────────────────┴──────────────────┘
//!                                   ▼
//!                       Found | Exhausted | Failed
//! ```
//!
//! Candidates are submitted to the oracle one at a time. The cancellation
//! token is checked before each submission and at every state change; a
//! search already submitted always runs to completion.

use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cmc::{CipherModeCommand, CipherModeCommandLocator};
use crate::config::{Anchor, AttackConfig};
use crate::context::{ChannelContext, ChannelContextResolver};
use crate::encoder::MessageEncoder;
use crate::oracle::KeyOracle;
use crate::pipeline::{DecodeRequest, DecodedCapture, DecodingPipeline};
use crate::sacch::{SacchReconstructor, SacchReference, collect_si_types};
use crate::sdcch::SdcchBurstSetBuilder;
use crate::types::{AttackBurstSet, BurstIndex, FrameNumber, SessionKey};
use crate::window::FrameWindowPlanner;
use crate::{AttackError, FailureKind, Result};

/// States visited by an attack run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackState {
    ResolvingContext,
    LocatingCmc,
    ValidatingCipher,
    AttackingSdcch,
    AttackingSacch,
    Found,
    Exhausted,
    Failed,
}

impl AttackState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AttackState::Found | AttackState::Exhausted | AttackState::Failed)
    }
}

impl fmt::Display for AttackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttackState::ResolvingContext => "resolving channel context",
            AttackState::LocatingCmc => "locating Cipher Mode Command",
            AttackState::ValidatingCipher => "validating cipher",
            AttackState::AttackingSdcch => "attacking SDCCH",
            AttackState::AttackingSacch => "attacking SACCH",
            AttackState::Found => "key found",
            AttackState::Exhausted => "candidates exhausted",
            AttackState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Known-plaintext source a key was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackPhase {
    Sdcch,
    Sacch,
}

impl fmt::Display for AttackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackPhase::Sdcch => f.write_str("SDCCH"),
            AttackPhase::Sacch => f.write_str("SACCH"),
        }
    }
}

/// How an attack run ended.
#[derive(Debug)]
pub enum AttackOutcome {
    /// The oracle recovered the session key
    Found { key: SessionKey, phase: AttackPhase, target_frame: FrameNumber },
    /// Every candidate was searched without a key
    Exhausted { candidates: usize },
    Failed(AttackError),
}

impl AttackOutcome {
    /// Terminal state this outcome corresponds to.
    pub fn state(&self) -> AttackState {
        match self {
            AttackOutcome::Found { .. } => AttackState::Found,
            AttackOutcome::Exhausted { .. } => AttackState::Exhausted,
            AttackOutcome::Failed(_) => AttackState::Failed,
        }
    }

    pub fn key(&self) -> Option<SessionKey> {
        match self {
            AttackOutcome::Found { key, .. } => Some(*key),
            _ => None,
        }
    }

    /// Machine-readable failure reason, if the run failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AttackOutcome::Failed(error) => Some(error.kind()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AttackError> {
        match self {
            AttackOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Everything a run reports back.
#[derive(Debug)]
pub struct AttackReport {
    pub outcome: AttackOutcome,
    /// States in the order they were entered, ending with the terminal one
    pub states: Vec<AttackState>,
    pub oracle_calls: usize,
}

impl AttackReport {
    pub fn key(&self) -> Option<SessionKey> {
        self.outcome.key()
    }
}

/// Material shared by both attack phases once the cipher is validated.
struct Session {
    context: ChannelContext,
    cmc: CipherModeCommand,
    capture: DecodedCapture,
    ciphertext: BurstIndex,
}

enum Step {
    ResolvingContext,
    LocatingCmc { context: ChannelContext, assignment: FrameNumber },
    ValidatingCipher { context: ChannelContext, cmc_frame: FrameNumber },
    AttackingSdcch(Session),
    AttackingSacch(Session),
    Done(AttackOutcome),
}

impl Step {
    fn state(&self) -> AttackState {
        match self {
            Step::ResolvingContext => AttackState::ResolvingContext,
            Step::LocatingCmc { .. } => AttackState::LocatingCmc,
            Step::ValidatingCipher { .. } => AttackState::ValidatingCipher,
            Step::AttackingSdcch(_) => AttackState::AttackingSdcch,
            Step::AttackingSacch(_) => AttackState::AttackingSacch,
            Step::Done(outcome) => outcome.state(),
        }
    }
}

/// Drives an attack run over a decoding pipeline, a key oracle and a
/// message encoder.
pub struct AttackOrchestrator<P, O, E> {
    pipeline: P,
    oracle: O,
    encoder: E,
    config: AttackConfig,
    cancel: CancellationToken,
}

impl<P, O, E> AttackOrchestrator<P, O, E>
where
    P: DecodingPipeline,
    O: KeyOracle,
    E: MessageEncoder,
{
    pub fn new(pipeline: P, oracle: O, encoder: E, config: AttackConfig) -> Self {
        Self { pipeline, oracle, encoder, config, cancel: CancellationToken::new() }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run before its next oracle submission.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Run the attack to a terminal outcome.
    pub async fn run(&self) -> AttackReport {
        let mut states = Vec::new();
        let mut oracle_calls = 0usize;
        let mut step = Step::ResolvingContext;

        let outcome = loop {
            let state = step.state();
            states.push(state);
            info!(%state, "Attack state");

            step = match step {
                Step::Done(outcome) => break outcome,
                _ if self.cancel.is_cancelled() => {
                    info!("Attack cancelled");
                    Step::Done(AttackOutcome::Failed(AttackError::Cancelled))
                }
                step => match self.advance(step, &mut oracle_calls).await {
                    Ok(next) => next,
                    Err(error) => {
                        warn!(kind = ?error.kind(), "Attack failed: {}", error);
                        Step::Done(AttackOutcome::Failed(error))
                    }
                },
            };
        };

        match &outcome {
            AttackOutcome::Found { key, phase, target_frame } => {
                info!(%phase, "Key found: {} (target burst {})", key, target_frame)
            }
            AttackOutcome::Exhausted { candidates } => {
                info!("No key found after {} candidates", candidates)
            }
            AttackOutcome::Failed(_) => {}
        }

        AttackReport { outcome, states, oracle_calls }
    }

    async fn advance(&self, step: Step, oracle_calls: &mut usize) -> Result<Step> {
        let resolver = ChannelContextResolver::new(&self.pipeline);

        match step {
            Step::ResolvingContext => match self.config.validate()? {
                Anchor::CipherModeCommand(cmc_frame) => Ok(Step::ValidatingCipher {
                    context: ChannelContextResolver::<P>::from_config(&self.config),
                    cmc_frame,
                }),
                Anchor::ImmediateAssignment(assignment) => {
                    let context = resolver.resolve_assignment(&self.config, assignment).await?;
                    Ok(Step::LocatingCmc { context, assignment })
                }
            },

            Step::LocatingCmc { context, assignment } => {
                let cmc = resolver.locate_cmc(&context, assignment).await?;
                Ok(Step::ValidatingCipher { context, cmc_frame: cmc.frame_number })
            }

            Step::ValidatingCipher { context, cmc_frame } => {
                let session = self.validate_cipher(context, cmc_frame).await?;
                if self.config.attack_mode.attacks_sdcch() {
                    Ok(Step::AttackingSdcch(session))
                } else {
                    Ok(Step::AttackingSacch(session))
                }
            }

            Step::AttackingSdcch(session) => {
                match self.attack_sdcch(&session, oracle_calls).await {
                    Ok(Some(found)) => return Ok(Step::Done(found)),
                    Ok(None) => {}
                    Err(error @ (AttackError::Inconclusive { .. } | AttackError::Encoder { .. }))
                        if self.config.attack_mode.attacks_sacch() =>
                    {
                        warn!("SDCCH phase skipped: {}", error);
                    }
                    Err(error) => return Err(error),
                }

                if self.config.attack_mode.attacks_sacch() {
                    Ok(Step::AttackingSacch(session))
                } else {
                    Ok(Step::Done(AttackOutcome::Exhausted { candidates: *oracle_calls }))
                }
            }

            Step::AttackingSacch(session) => {
                let outcome = self
                    .attack_sacch(&session, oracle_calls)
                    .await?
                    .unwrap_or(AttackOutcome::Exhausted { candidates: *oracle_calls });
                Ok(Step::Done(outcome))
            }

            Step::Done(outcome) => Ok(Step::Done(outcome)),
        }
    }

    /// Decode the analysis window and accept the command only if it selects A5/1.
    async fn validate_cipher(
        &self,
        context: ChannelContext,
        cmc_frame: FrameNumber,
    ) -> Result<Session> {
        let request = context.request().with_frames(FrameWindowPlanner::analysis(cmc_frame));
        let mut capture = self.pipeline.decode(&request).await?;

        let cmc = CipherModeCommandLocator::new(&capture.messages)
            .validate(cmc_frame)
            .into_result(cmc_frame)?;
        info!(
            subchannel = cmc.subchannel,
            "A5/1 Cipher Mode Command at frame {}",
            cmc.frame_number
        );

        capture.bursts.retain(|burst| burst.subchannel.is_none_or(|s| s == cmc.subchannel));
        let ciphertext = capture.ciphertext_index();
        debug!("Analysis window holds {} bursts", ciphertext.len());

        Ok(Session { context: context.with_subchannel(cmc.subchannel), cmc, capture, ciphertext })
    }

    async fn attack_sdcch(
        &self,
        session: &Session,
        oracle_calls: &mut usize,
    ) -> Result<Option<AttackOutcome>> {
        let builder = SdcchBurstSetBuilder::encode(&self.encoder).await?;
        let sets = builder.build(session.cmc.frame_number, &session.ciphertext);
        if sets.is_empty() {
            return Err(AttackError::inconclusive(format!(
                "no ciphertext for the SDCCH messages after frame {}",
                session.cmc.frame_number
            )));
        }
        self.submit(AttackPhase::Sdcch, &sets, oracle_calls).await
    }

    async fn attack_sacch(
        &self,
        session: &Session,
        oracle_calls: &mut usize,
    ) -> Result<Option<AttackOutcome>> {
        let reference = SacchReference::find(&session.capture.messages, &session.cmc)?;

        let timeslot =
            DecodeRequest::timeslot(session.context.timeslot, session.context.channel_mode);
        let collected = collect_si_types(&self.pipeline.decode(&timeslot).await?.messages);
        debug!("Collected {} System Information types", collected.len());

        let reconstructor = SacchReconstructor::from_reference(reference, &collected);
        let slots = reconstructor.build(&self.encoder, &session.ciphertext).await?;

        let mut sets: Vec<AttackBurstSet> = Vec::new();
        let mut first_error = None;
        for candidates in slots {
            match candidates.burst_sets {
                Ok(slot_sets) => sets.extend(slot_sets),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        if sets.is_empty() {
            return Err(first_error.unwrap_or_else(|| {
                AttackError::inconclusive("no ciphertext for any predicted SACCH slot")
            }));
        }

        self.submit(AttackPhase::Sacch, &sets, oracle_calls).await
    }

    /// Submit candidates in order until one yields a key.
    async fn submit(
        &self,
        phase: AttackPhase,
        sets: &[AttackBurstSet],
        oracle_calls: &mut usize,
    ) -> Result<Option<AttackOutcome>> {
        let verbose = self.config.verbose;

        for (i, set) in sets.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Attack cancelled after {} oracle calls", oracle_calls);
                return Err(AttackError::Cancelled);
            }

            let target_frame = set.target_frame_number();
            if verbose && i % 4 == 0 {
                let last = target_frame.offset(4);
                info!("Using {} message bursts {} - {}", phase, target_frame, last);
            }

            *oracle_calls += 1;
            if let Some(key) = self.oracle.search(set, verbose).await? {
                return Ok(Some(AttackOutcome::Found { key, phase, target_frame }));
            }
            debug!(%phase, "No key for target burst {}", target_frame);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::ReplayPipeline;
    use crate::test_utils::{CaptureBuilder, ScriptedOracle, TEST_KEY, TableEncoder};
    use crate::types::{AttackMode, ChannelType, SiType};
    use std::ops::Range;
    use std::sync::Arc;

    /// Session on timeslot 1 subchannel 2 with an A5/1 command at 5000.
    fn session_capture(algorithm: &str) -> CaptureBuilder {
        session_with_bursts(algorithm, 4790..5320)
    }

    fn session_with_bursts(algorithm: &str, frames: Range<u32>) -> CaptureBuilder {
        CaptureBuilder::new(1, 2)
            .bursts(frames)
            .cipher_mode_command(5000, algorithm)
            .system_information(4698, SiType::Type6, 0x1c)
            .system_information(4800, SiType::Type5, 0x1c)
            .channel(1, 0)
            .system_information(100, SiType::Type5bis, 0x02)
            .system_information(202, SiType::Type5ter, 0x02)
    }

    fn orchestrator(
        capture: DecodedCapture,
        oracle: Arc<ScriptedOracle>,
        config: AttackConfig,
    ) -> AttackOrchestrator<ReplayPipeline, Arc<ScriptedOracle>, TableEncoder> {
        with_encoder(capture, oracle, TableEncoder::new(), config)
    }

    fn with_encoder(
        capture: DecodedCapture,
        oracle: Arc<ScriptedOracle>,
        encoder: TableEncoder,
        config: AttackConfig,
    ) -> AttackOrchestrator<ReplayPipeline, Arc<ScriptedOracle>, TableEncoder> {
        AttackOrchestrator::new(ReplayPipeline::from_capture(capture), oracle, encoder, config)
    }

    #[tokio::test]
    async fn finds_key_on_sdcch() {
        let oracle = Arc::new(ScriptedOracle::new().with_key_at(5103));
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_capture("A5/1").build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert_eq!(report.key(), Some(TEST_KEY));
        assert!(matches!(report.outcome, AttackOutcome::Found { phase: AttackPhase::Sdcch, .. }));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::Found
            ]
        );
        // 5051..5054 then 5102, 5103
        assert_eq!(report.oracle_calls, 6);
        assert_eq!(oracle.call_count(), 6);
    }

    #[tokio::test]
    async fn wrong_cipher_makes_no_oracle_calls() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_capture("A5/3").build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::WrongCipher));
        assert_eq!(report.oracle_calls, 0);
        assert_eq!(oracle.call_count(), 0);
        assert_eq!(report.states.last(), Some(&AttackState::Failed));
    }

    #[tokio::test]
    async fn falls_back_to_sacch() {
        let oracle = Arc::new(ScriptedOracle::new().with_key_at(5106));
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_capture("A5/1").build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert!(matches!(
            report.outcome,
            AttackOutcome::Found { phase: AttackPhase::Sacch, target_frame, .. }
                if target_frame == FrameNumber::new(5106)
        ));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::AttackingSacch,
                AttackState::Found
            ]
        );

        let calls = oracle.calls();
        assert_eq!(calls.len(), 20 + 9);
        let sacch: Vec<u32> = calls[20..].iter().map(|f| f.value()).collect();
        assert_eq!(sacch, vec![4902, 4903, 4904, 4905, 5004, 5005, 5006, 5007, 5106]);
    }

    #[tokio::test]
    async fn sdcch_only_exhausts() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1).with_attack_mode(AttackMode::Sdcch);
        let report = orchestrator(session_capture("A5/1").build(), oracle, config).run().await;

        assert!(matches!(report.outcome, AttackOutcome::Exhausted { candidates: 20 }));
        assert!(!report.states.contains(&AttackState::AttackingSacch));
    }

    #[tokio::test]
    async fn sacch_only_skips_sdcch() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1).with_attack_mode(AttackMode::Sacch);
        let capture = session_capture("A5/1").build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert!(matches!(report.outcome, AttackOutcome::Exhausted { candidates: 12 }));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::ValidatingCipher,
                AttackState::AttackingSacch,
                AttackState::Exhausted
            ]
        );
        assert_eq!(oracle.calls()[0], FrameNumber::new(4902));
    }

    #[tokio::test]
    async fn missing_assignment_fails_before_cmc_search() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_immediate_assignment(1000, 0);
        let report = orchestrator(session_capture("A5/1").build(), oracle, config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::NotFound));
        assert_eq!(report.states, vec![AttackState::ResolvingContext, AttackState::Failed]);
        assert_eq!(report.oracle_calls, 0);
    }

    #[tokio::test]
    async fn resolves_from_assignment() {
        let capture = session_capture("A5/1")
            .channel(0, 0)
            .immediate_assignment(1000, 1, 2, ChannelType::Sdcch4)
            .build();
        let oracle = Arc::new(ScriptedOracle::new().with_key_at(5051));
        let config = AttackConfig::from_immediate_assignment(1000, 0);
        let report = orchestrator(capture, oracle, config).run().await;

        assert_eq!(report.key(), Some(TEST_KEY));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::LocatingCmc,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::Found
            ]
        );
    }

    #[tokio::test]
    async fn cancellation_stops_submissions() {
        let cancel = CancellationToken::new();
        let oracle = Arc::new(ScriptedOracle::new().cancelling_after(3, cancel.clone()));
        let config = AttackConfig::from_cmc(5000, 1);
        let report = orchestrator(session_capture("A5/1").build(), oracle.clone(), config)
            .with_cancellation(cancel)
            .run()
            .await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Cancelled));
        assert_eq!(oracle.call_count(), 3);
        assert_eq!(report.oracle_calls, 3);
    }

    #[tokio::test]
    async fn missing_sacch_reference_fails_inconclusive() {
        let capture = CaptureBuilder::new(1, 2)
            .bursts(4790..5320)
            .cipher_mode_command(5000, "A5/1")
            .build();
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1);
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Inconclusive));
        assert_eq!(oracle.call_count(), 20);
    }

    #[tokio::test]
    async fn oracle_failure_is_not_retried() {
        let oracle = Arc::new(ScriptedOracle::failing());
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_capture("A5/1").build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Oracle));
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn invalid_config_fails_without_pipeline_run() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::default();
        let report = orchestrator(DecodedCapture::default(), oracle, config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Configuration));
        assert_eq!(report.states, vec![AttackState::ResolvingContext, AttackState::Failed]);
    }

    #[tokio::test]
    async fn sdcch_without_ciphertext_is_inconclusive() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1).with_attack_mode(AttackMode::Sdcch);
        let capture = session_with_bursts("A5/1", 4790..5000).build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Inconclusive));
        assert_eq!(report.states.last(), Some(&AttackState::Failed));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn sdcch_without_ciphertext_moves_on_to_sacch() {
        let oracle = Arc::new(ScriptedOracle::new().with_key_at(4903));
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_with_bursts("A5/1", 4790..5000).build();
        let report = orchestrator(capture, oracle.clone(), config).run().await;

        assert!(matches!(report.outcome, AttackOutcome::Found { phase: AttackPhase::Sacch, .. }));
        assert_eq!(oracle.calls(), vec![FrameNumber::new(4902), FrameNumber::new(4903)]);
    }

    #[tokio::test]
    async fn short_fill_encoding_skips_to_sacch() {
        let oracle = Arc::new(ScriptedOracle::new());
        let encoder = TableEncoder::new().with_short_output(|message| message[0] == 0x03);
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_capture("A5/1").build();
        let report = with_encoder(capture, oracle.clone(), encoder, config).run().await;

        assert!(matches!(report.outcome, AttackOutcome::Exhausted { candidates: 12 }));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::AttackingSacch,
                AttackState::Exhausted
            ]
        );
        assert_eq!(oracle.calls()[0], FrameNumber::new(4902));
    }

    #[tokio::test]
    async fn short_fill_encoding_fails_sdcch_only_run() {
        let oracle = Arc::new(ScriptedOracle::new());
        let encoder = TableEncoder::new().with_short_output(|message| message[0] == 0x03);
        let config = AttackConfig::from_cmc(5000, 1).with_attack_mode(AttackMode::Sdcch);
        let capture = session_capture("A5/1").build();
        let report = with_encoder(capture, oracle.clone(), encoder, config).run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Inconclusive));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::Failed
            ]
        );
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn encoder_failure_ends_run_after_both_phases() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1);
        let capture = session_capture("A5/1").build();
        let report = with_encoder(capture, oracle.clone(), TableEncoder::failing(), config)
            .run()
            .await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Encoder));
        assert_eq!(
            report.states,
            vec![
                AttackState::ResolvingContext,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::AttackingSacch,
                AttackState::Failed
            ]
        );
        assert_eq!(oracle.call_count(), 0);
    }

    struct UnavailablePipeline;

    #[async_trait::async_trait]
    impl DecodingPipeline for UnavailablePipeline {
        async fn decode(&self, _request: &DecodeRequest) -> Result<DecodedCapture> {
            Err(AttackError::pipeline_failed("capture device unavailable"))
        }
    }

    #[tokio::test]
    async fn pipeline_failure_ends_run() {
        let oracle = Arc::new(ScriptedOracle::new());
        let config = AttackConfig::from_cmc(5000, 1);
        let encoder = TableEncoder::new();
        let orchestrator =
            AttackOrchestrator::new(UnavailablePipeline, oracle.clone(), encoder, config);
        let report = orchestrator.run().await;

        assert_eq!(report.outcome.failure_kind(), Some(FailureKind::Pipeline));
        assert_eq!(report.states.last(), Some(&AttackState::Failed));
        assert_eq!(oracle.call_count(), 0);
    }
}

//! End-to-end attack runs over record files

use a51_replay::{
    Attack, AttackBurstSet, AttackConfig, AttackError, AttackMode, AttackOrchestrator,
    AttackOutcome, AttackPhase, AttackState, Burst, BurstPayload, ControlMessage, DecodedCapture,
    DecodedControlMessage, FailureKind, FrameNumber, KeyOracle, MessageEncoder, ReplayPipeline,
    SessionKey, SiType,
};
use anyhow::{Context, Result, ensure};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const KEY: SessionKey = SessionKey::new([0xAD, 0x6A, 0x3E, 0xC2, 0xB4, 0x42, 0xE4, 0x00]);

fn bits(seed: u32) -> BurstPayload {
    let mut state = seed.wrapping_mul(0x9E37_79B1) | 1;
    let bits: Vec<u8> = (0..114)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 1) as u8
        })
        .collect();
    BurstPayload::from_bits(bits).unwrap()
}

/// Oracle that recovers [`KEY`] from one target frame.
struct FrameOracle {
    key_at: u32,
    calls: AtomicUsize,
}

impl FrameOracle {
    fn new(key_at: u32) -> Arc<Self> {
        Arc::new(Self { key_at, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl KeyOracle for FrameOracle {
    async fn search(
        &self,
        burst_set: &AttackBurstSet,
        _verbose: bool,
    ) -> a51_replay::Result<Option<SessionKey>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((burst_set.target_frame_number().value() == self.key_at).then_some(KEY))
    }
}

/// Encoder deriving four payloads from the message bytes.
struct HashEncoder;

#[async_trait::async_trait]
impl MessageEncoder for HashEncoder {
    async fn encode(&self, message: &[u8]) -> a51_replay::Result<Vec<BurstPayload>> {
        let seed =
            message.iter().fold(17u32, |h, &b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
        Ok((0..4).map(|j| bits(seed.wrapping_add(j))).collect())
    }
}

fn si(frame: u32, subchannel: u8, si_type: SiType, timing_advance: u8) -> DecodedControlMessage {
    let mut payload = vec![0x05, timing_advance, 0x03, 0x03, 0x49, 0x06];
    payload.resize(23, 0x2B);
    DecodedControlMessage {
        frame_number: FrameNumber::new(frame),
        timeslot: 1,
        subchannel,
        message: ControlMessage::SystemInformation { si_type },
        payload,
    }
}

fn session_capture() -> DecodedCapture {
    let bursts = (4790..5320)
        .map(|frame| Burst {
            frame_number: FrameNumber::new(frame),
            timeslot: 1,
            subchannel: Some(2),
            payload: bits(frame),
        })
        .collect();

    let messages = vec![
        DecodedControlMessage {
            frame_number: FrameNumber::new(1000),
            timeslot: 0,
            subchannel: 0,
            message: ControlMessage::ImmediateAssignment {
                assigned_timeslot: 1,
                assigned_subchannel: 2,
                channel_type: a51_replay::ChannelType::Sdcch4,
            },
            payload: Vec::new(),
        },
        si(4800, 2, SiType::Type5, 0x1c),
        DecodedControlMessage {
            frame_number: FrameNumber::new(5000),
            timeslot: 1,
            subchannel: 2,
            message: ControlMessage::CipherModeCommand { algorithm: "A5/1".parse().unwrap() },
            payload: Vec::new(),
        },
        si(7000, 0, SiType::Type6, 0x00),
        si(7102, 0, SiType::Type5bis, 0x00),
    ];

    DecodedCapture { bursts, messages }
}

fn write_records(name: &str, capture: &DecodedCapture) -> Result<PathBuf> {
    let file = format!("a51-replay-{}-{}.yaml", name, std::process::id());
    let path = std::env::temp_dir().join(file);
    let yaml = serde_yaml_ng::to_string(capture).context("serialize records")?;
    std::fs::write(&path, yaml).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[tokio::test]
async fn record_file_attack_recovers_sdcch_key() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let path = write_records("sdcch", &session_capture())?;
    let pipeline = ReplayPipeline::open(&path)?;
    let oracle = FrameOracle::new(5154);
    let config = AttackConfig::from_cmc(5000, 1);
    let orchestrator = AttackOrchestrator::new(pipeline, oracle.clone(), HashEncoder, config);

    let report = orchestrator.run().await;
    std::fs::remove_file(&path)?;

    ensure!(report.key() == Some(KEY), "unexpected outcome {:?}", report.outcome);
    ensure!(matches!(report.outcome, AttackOutcome::Found { phase: AttackPhase::Sdcch, .. }));
    // The third message starts at 5153, so 5154 is the tenth candidate.
    ensure!(oracle.calls() == 10, "oracle called {} times", oracle.calls());
    Ok(())
}

#[tokio::test]
async fn assignment_anchor_falls_back_to_sacch() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let config = AttackConfig::from_yaml_str("ia_frame: 1000\ntimeslot: 0\nverbose: true\n")?;
    let oracle = FrameOracle::new(4903);
    let orchestrator = AttackOrchestrator::new(
        ReplayPipeline::from_capture(session_capture()),
        oracle.clone(),
        HashEncoder,
        config,
    );

    let report = orchestrator.run().await;
    ensure!(report.key() == Some(KEY), "unexpected outcome {:?}", report.outcome);
    ensure!(
        report.states
            == vec![
                AttackState::ResolvingContext,
                AttackState::LocatingCmc,
                AttackState::ValidatingCipher,
                AttackState::AttackingSdcch,
                AttackState::AttackingSacch,
                AttackState::Found,
            ],
        "unexpected states {:?}",
        report.states
    );
    // 20 SDCCH candidates, then 4902 and 4903 in the first SACCH slot.
    ensure!(report.oracle_calls == 22);
    Ok(())
}

#[tokio::test]
async fn hand_written_record_file_rejects_a53() -> Result<()> {
    let yaml = "\
messages:
  - frame_number: 5000
    timeslot: 1
    subchannel: 2
    type: cipher_mode_command
    algorithm: A5/3
";
    let oracle = FrameOracle::new(5051);
    let config = AttackConfig::from_cmc(5000, 1).with_attack_mode(AttackMode::Sdcch);
    let pipeline = ReplayPipeline::from_yaml_str(yaml)?;
    let orchestrator = AttackOrchestrator::new(pipeline, oracle.clone(), HashEncoder, config);

    let report = orchestrator.run().await;
    ensure!(report.outcome.failure_kind() == Some(FailureKind::WrongCipher));
    let error = report.outcome.error().context("failed outcome carries an error")?;
    ensure!(error.is_conclusive());
    ensure!(oracle.calls() == 0);
    Ok(())
}

#[test]
fn opening_missing_record_file_fails() {
    let config = AttackConfig::from_cmc(5000, 1);
    let result = Attack::open("/nonexistent/records.yaml", FrameOracle::new(0), config);
    assert!(matches!(result, Err(AttackError::File { .. })));
}

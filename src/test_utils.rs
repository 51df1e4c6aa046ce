//! Test utilities for building captures and scripted collaborators
//!
//! This module provides deterministic burst payloads, a builder for decoded
//! captures, and in-memory stand-ins for the encoder and key oracle that are
//! used by unit tests, integration tests and benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use std::ops::Range;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::encoder::MessageEncoder;
use crate::oracle::KeyOracle;
use crate::pipeline::DecodedCapture;
use crate::types::{
    AttackBurstSet, BURSTS_PER_MESSAGE, Burst, BurstPayload, ChannelType, CipherAlgorithm,
    ControlMessage, DecodedControlMessage, FrameNumber, PAYLOAD_BITS, SessionKey, SiType,
};
use crate::{AttackError, Result};

/// Session key used by scripted oracles in tests.
pub const TEST_KEY: SessionKey = SessionKey::new([0x1E, 0xF0, 0x0B, 0xAB, 0x3B, 0xAC, 0x7A, 0x00]);

/// Deterministic 114-bit payload. Different seeds give different payloads.
pub fn payload(seed: u32) -> BurstPayload {
    let mut state = seed.wrapping_mul(0x9E37_79B1) | 1;
    let bits: Vec<u8> = (0..PAYLOAD_BITS)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 1) as u8
        })
        .collect();
    BurstPayload::from_bits(bits).expect("payload has 114 bits")
}

/// 23-byte SACCH System Information payload with the given timing advance.
///
/// Byte 0 is the ordered MS power level, byte 1 the timing advance, and the
/// message type sits at byte 6.
pub fn si_payload(si_type: SiType, timing_advance: u8) -> Vec<u8> {
    let message_type = match si_type {
        SiType::Type5 => 0x1D,
        SiType::Type5bis => 0x05,
        SiType::Type5ter => 0x06,
        SiType::Type6 => 0x1E,
    };
    let mut bytes = vec![0x05, timing_advance, 0x03, 0x03, 0x49, 0x06, message_type];
    bytes.resize(23, 0x2B);
    bytes
}

/// Builds a [`DecodedCapture`] record by record.
#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    timeslot: u8,
    subchannel: u8,
    capture: DecodedCapture,
}

impl CaptureBuilder {
    /// Start a capture whose records land on `timeslot`/`subchannel`.
    pub fn new(timeslot: u8, subchannel: u8) -> Self {
        Self { timeslot, subchannel, capture: DecodedCapture::default() }
    }

    /// Switch the channel of the records added from here on.
    pub fn channel(mut self, timeslot: u8, subchannel: u8) -> Self {
        self.timeslot = timeslot;
        self.subchannel = subchannel;
        self
    }

    /// Add one burst per frame, with the payload seeded by the frame number.
    pub fn bursts(mut self, frames: Range<u32>) -> Self {
        for frame in frames {
            self.capture.bursts.push(Burst {
                frame_number: FrameNumber::new(frame),
                timeslot: self.timeslot,
                subchannel: Some(self.subchannel),
                payload: payload(frame),
            });
        }
        self
    }

    pub fn immediate_assignment(
        self,
        frame: u32,
        assigned_timeslot: u8,
        assigned_subchannel: u8,
        channel_type: ChannelType,
    ) -> Self {
        self.record(
            frame,
            ControlMessage::ImmediateAssignment {
                assigned_timeslot,
                assigned_subchannel,
                channel_type,
            },
            Vec::new(),
        )
    }

    /// Add a Cipher Mode Command, with the algorithm written as `A5/n`.
    pub fn cipher_mode_command(self, frame: u32, algorithm: &str) -> Self {
        let algorithm: CipherAlgorithm = algorithm.parse().expect("valid cipher algorithm");
        self.record(frame, ControlMessage::CipherModeCommand { algorithm }, Vec::new())
    }

    /// Add a SACCH System Information message built by [`si_payload`].
    pub fn system_information(self, frame: u32, si_type: SiType, timing_advance: u8) -> Self {
        self.record(
            frame,
            ControlMessage::SystemInformation { si_type },
            si_payload(si_type, timing_advance),
        )
    }

    pub fn message(mut self, message: DecodedControlMessage) -> Self {
        self.capture.messages.push(message);
        self
    }

    pub fn build(self) -> DecodedCapture {
        self.capture
    }

    fn record(self, frame: u32, message: ControlMessage, payload: Vec<u8>) -> Self {
        let record = DecodedControlMessage {
            frame_number: FrameNumber::new(frame),
            timeslot: self.timeslot,
            subchannel: self.subchannel,
            message,
            payload,
        };
        self.message(record)
    }
}

type MessagePredicate = Box<dyn Fn(&[u8]) -> bool + Send + Sync>;

/// Deterministic in-memory encoder.
///
/// Every message maps to four payloads seeded by a hash of its bytes. Calls
/// are recorded so tests can assert what was encoded.
#[derive(Default)]
pub struct TableEncoder {
    short: Option<MessagePredicate>,
    fail: bool,
    calls: Mutex<Vec<Vec<u8>>>,
}

impl TableEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return only three payloads for messages matching `predicate`.
    pub fn with_short_output<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&[u8]) -> bool + Send + Sync + 'static,
    {
        self.short = Some(Box::new(predicate));
        self
    }

    /// Fail every call with an encoder error.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// The payloads a well-formed encoding of `message` produces.
    pub fn bursts_for(message: &[u8]) -> Vec<BurstPayload> {
        let seed = message
            .iter()
            .fold(0x811C_9DC5u32, |hash, &byte| (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193));
        (0..BURSTS_PER_MESSAGE as u32).map(|j| payload(seed.wrapping_add(j))).collect()
    }

    /// Messages encoded so far, in call order.
    pub fn calls(&self) -> Vec<Vec<u8>> {
        self.calls.lock().expect("encoder call log").clone()
    }
}

#[async_trait::async_trait]
impl MessageEncoder for TableEncoder {
    async fn encode(&self, message: &[u8]) -> Result<Vec<BurstPayload>> {
        self.calls.lock().expect("encoder call log").push(message.to_vec());

        if self.fail {
            return Err(AttackError::encoder_failed("scripted failure"));
        }

        let mut bursts = Self::bursts_for(message);
        if self.short.as_ref().is_some_and(|short| short(message)) {
            bursts.truncate(BURSTS_PER_MESSAGE - 1);
        }
        Ok(bursts)
    }
}

/// Key oracle answering from a script.
///
/// Returns [`TEST_KEY`] for candidates targeting one configured frame and no
/// key otherwise. Every call is recorded by target frame.
#[derive(Default)]
pub struct ScriptedOracle {
    key_at: Option<FrameNumber>,
    cancel_after: Option<(usize, CancellationToken)>,
    fail: bool,
    calls: Mutex<Vec<FrameNumber>>,
}

impl ScriptedOracle {
    /// Oracle that never finds a key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find [`TEST_KEY`] for the candidate targeting `frame`.
    pub fn with_key_at(mut self, frame: u32) -> Self {
        self.key_at = Some(FrameNumber::new(frame));
        self
    }

    /// Cancel `token` once `calls` searches have completed.
    pub fn cancelling_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Fail every search with an oracle error.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Target frames searched so far, in call order.
    pub fn calls(&self) -> Vec<FrameNumber> {
        self.calls.lock().expect("oracle call log").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("oracle call log").len()
    }
}

#[async_trait::async_trait]
impl KeyOracle for ScriptedOracle {
    async fn search(
        &self,
        burst_set: &AttackBurstSet,
        _verbose: bool,
    ) -> Result<Option<SessionKey>> {
        let target = burst_set.target_frame_number();
        let call_count = {
            let mut calls = self.calls.lock().expect("oracle call log");
            calls.push(target);
            calls.len()
        };

        if self.fail {
            return Err(AttackError::oracle_failed("scripted failure"));
        }
        if let Some((after, token)) = &self.cancel_after {
            if call_count >= *after {
                token.cancel();
            }
        }

        Ok((self.key_at == Some(target)).then_some(TEST_KEY))
    }
}

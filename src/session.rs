use std::fmt;

use thiserror::Error;

use crate::proto::command::{Command, DeviceType, Gain};
use crate::proto::frame::{self, ACK, EncodeError, ProtocolError};
use crate::transport::{SerialTransport, Transport, TransportError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot reach synthesizer: {0}")]
    Communication(#[from] TransportError),
    #[error("synthesizer rejected command: {0}")]
    UnexpectedResponse(#[from] ProtocolError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] EncodeError),
}

/// One open link to a PLL-ADF synthesizer board.
///
/// The protocol is strict request/acknowledge with no multiplexing, so every
/// operation takes `&mut self` and completes its whole exchange before
/// returning; a second command cannot start while one is in flight. Callers
/// that share a session across threads wrap it in a `Mutex` held for the
/// duration of each call.
pub struct Synth<T = SerialTransport> {
    transport: T,
    device: DeviceType,
    ref_clk_hz: f64,
}

impl Synth<SerialTransport> {
    /// Connect to the board on `endpoint`.
    ///
    /// The board may still be emitting from a previous run and its reply to
    /// the first command is unpredictable, so opening sends one stop frame
    /// without waiting for an acknowledgement.
    pub fn open(endpoint: &str, device: DeviceType, ref_clk_hz: f64) -> Result<Self, SessionError> {
        let transport = SerialTransport::open(endpoint)?;
        let mut synth = Synth::with_transport(transport, device, ref_clk_hz);
        synth.exchange(&Command::Stop, false)?;
        Ok(synth)
    }
}

impl<T: Transport> Synth<T> {
    /// Drive the protocol over an already-open byte channel.
    pub fn with_transport(transport: T, device: DeviceType, ref_clk_hz: f64) -> Self {
        Synth {
            transport,
            device,
            ref_clk_hz,
        }
    }

    /// Emit a continuous tone at `frequency_hz`.
    ///
    /// The board's usable range is 35 MHz to 4.4 GHz; the frame only limits
    /// what fits its 24-bit kHz field, so callers validate the RF range.
    pub fn start_tone(&mut self, frequency_hz: f64, gain: Gain) -> Result<(), SessionError> {
        self.exchange(&Command::Tone { frequency_hz, gain }, true)
    }

    /// Sweep continuously from `start_hz` to `end_hz` in `step_hz` steps.
    pub fn start_sweep(
        &mut self,
        start_hz: f64,
        end_hz: f64,
        step_hz: f64,
        gain: Gain,
    ) -> Result<(), SessionError> {
        if step_hz <= 0.0 {
            return Err(EncodeError::Range {
                field: "step",
                value: step_hz,
            }
            .into());
        }
        self.exchange(
            &Command::Sweep {
                start_hz,
                end_hz,
                step_hz,
                gain,
            },
            true,
        )
    }

    /// Stop signal generation.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.exchange(&Command::Stop, true)
    }

    /// One atomic request/acknowledge exchange. With `await_ack` false the
    /// call succeeds as soon as the frame is written and nothing is read.
    fn exchange(&mut self, cmd: &Command, await_ack: bool) -> Result<(), SessionError> {
        let frame = frame::encode(self.device, self.ref_clk_hz, cmd)?;
        self.transport.send(&frame)?;
        if await_ack {
            let mut ack = [0u8; ACK.len()];
            self.transport.recv_exact(&mut ack)?;
            frame::decode_ack(&ack)?;
        }
        Ok(())
    }
}

impl<T> fmt::Display for Synth<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, ref_clk {:.3} MHz",
            self.device,
            self.ref_clk_hz / 1e6
        )
    }
}

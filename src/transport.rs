use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;

/// Serial settings fixed by the board's firmware: 115200 8N1.
pub const BAUD_RATE: u32 = 115_200;

/// Per-read deadline for acknowledgements.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("open {port}: {source}")]
    Connect {
        port: String,
        source: serialport::Error,
    },
    #[error("read timed out")]
    Timeout,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Byte-level duplex channel to the device. The session is generic over
/// this seam so the protocol can be exercised against an in-memory peer.
pub trait Transport {
    /// Write the whole buffer; short writes are retried internally.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read exactly `buf.len()` bytes, or fail with `Timeout` once the
    /// read deadline passes. Never returns a short read.
    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;
}

/// The serial link to the synthesizer board. The handle is released when
/// the transport is dropped.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path` with the fixed protocol settings.
    pub fn open(path: &str) -> Result<Self, TransportError> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|source| TransportError::Connect {
                port: path.to_string(),
                source,
            })?;
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        match self.port.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}

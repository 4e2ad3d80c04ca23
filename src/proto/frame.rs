use thiserror::Error;

use super::command::{Command, DeviceType};

/// Every host-to-device frame and the acknowledgement begin with this byte.
pub const START_SYMBOL: u8 = 0xAD;

/// Fixed acknowledgement the board returns after accepting a frame.
pub const ACK: [u8; 3] = [START_SYMBOL, 0x66, 0x13];

const OP_TONE: u8 = 0x01;
const OP_SWEEP: u8 = 0x02;
const OP_STOP: u8 = 0xFF;

/// Trailing byte of a sweep frame; arms the ramp generator.
const SWEEP_ENABLE: u8 = 0x01;

/// Upper bound of a 3-byte big-endian field.
const U24_MAX: f64 = 16_777_215.0;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EncodeError {
    #[error("{field} out of range: {value} does not fit in 3 bytes")]
    Range { field: &'static str, value: f64 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected acknowledgement: {0:02X?}")]
    UnexpectedAck(Vec<u8>),
}

fn checksum(msg: &[u8]) -> u8 {
    msg.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Round `value` and append it as a 3-byte big-endian integer. Values that
/// do not fit are an error, never truncated.
fn put_u24(msg: &mut Vec<u8>, field: &'static str, value: f64) -> Result<(), EncodeError> {
    let scaled = value.round();
    if !(0.0..=U24_MAX).contains(&scaled) {
        return Err(EncodeError::Range { field, value });
    }
    msg.extend_from_slice(&(scaled as u32).to_be_bytes()[1..]);
    Ok(())
}

/// Build the complete wire frame for `cmd`, checksum included.
///
/// Frequencies are scaled to the device's register units: the reference
/// clock in units of 100 Hz, tone and sweep bounds in kHz. The sweep step
/// register takes a raw count instead of a kHz value; the asymmetry with
/// start/end is how the hardware reads the field.
pub fn encode(device: DeviceType, ref_clk_hz: f64, cmd: &Command) -> Result<Vec<u8>, EncodeError> {
    let mut msg = vec![START_SYMBOL];
    match *cmd {
        // Stop addresses whatever is running: no device, gain or clock fields.
        Command::Stop => msg.push(OP_STOP),
        Command::Tone { frequency_hz, gain } => {
            msg.push(device.wire_id());
            msg.push(OP_TONE);
            msg.push(gain.nibble());
            put_u24(&mut msg, "ref_clk", ref_clk_hz / 100.0)?;
            put_u24(&mut msg, "frequency", frequency_hz / 1000.0)?;
        }
        Command::Sweep {
            start_hz,
            end_hz,
            step_hz,
            gain,
        } => {
            msg.push(device.wire_id());
            msg.push(OP_SWEEP);
            msg.push(gain.nibble());
            put_u24(&mut msg, "ref_clk", ref_clk_hz / 100.0)?;
            put_u24(&mut msg, "start", start_hz / 1000.0)?;
            put_u24(&mut msg, "end", end_hz / 1000.0)?;
            put_u24(&mut msg, "step", step_hz)?;
            msg.push(SWEEP_ENABLE);
        }
    }
    msg.push(checksum(&msg));
    Ok(msg)
}

/// Check a received acknowledgement against the fixed expected bytes.
pub fn decode_ack(bytes: &[u8]) -> Result<(), ProtocolError> {
    if bytes != ACK {
        return Err(ProtocolError::UnexpectedAck(bytes.to_vec()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::command::Gain;
    use super::*;

    fn tone(frequency_hz: f64, gain: Gain) -> Command {
        Command::Tone { frequency_hz, gain }
    }

    #[test]
    fn tone_frame_known_bytes() {
        let frame = encode(
            DeviceType::Adf4351,
            25_000_000.0,
            &tone(35_000_000.0, Gain::Level3),
        )
        .unwrap();
        // 25 MHz / 100 = 250000 = 0x03D090, 35 MHz / 1000 = 35000 = 0x0088B8
        assert_eq!(
            frame,
            vec![0xAD, 0x02, 0x01, 0x01, 0x03, 0xD0, 0x90, 0x00, 0x88, 0xB8, 0x54]
        );
    }

    #[test]
    fn last_byte_is_sum_of_prior_bytes() {
        let frames = [
            encode(
                DeviceType::Adf4350,
                10_000_000.0,
                &tone(4_400_000_000.0, Gain::Level0),
            )
            .unwrap(),
            encode(
                DeviceType::Adf4351,
                250_000_000.0,
                &Command::Sweep {
                    start_hz: 88_000_000.0,
                    end_hz: 108_000_000.0,
                    step_hz: 25_000.0,
                    gain: Gain::Level2,
                },
            )
            .unwrap(),
            encode(DeviceType::Adf4351, 25_000_000.0, &Command::Stop).unwrap(),
        ];
        for frame in frames {
            let (body, tail) = frame.split_at(frame.len() - 1);
            let sum = body.iter().fold(0u8, |s, b| s.wrapping_add(*b));
            assert_eq!(tail[0], sum);
        }
    }

    #[test]
    fn stop_frame_is_three_bytes() {
        let frame = encode(DeviceType::Adf4350, 25_000_000.0, &Command::Stop).unwrap();
        assert_eq!(frame, vec![0xAD, 0xFF, 0xAC]);
    }

    #[test]
    fn sweep_step_is_raw_not_khz() {
        let frame = encode(
            DeviceType::Adf4351,
            25_000_000.0,
            &Command::Sweep {
                start_hz: 100_000_000.0,
                end_hz: 200_000_000.0,
                step_hz: 5000.0,
                gain: Gain::Level3,
            },
        )
        .unwrap();
        // layout: start(1) dev(1) op(1) gain(1) ref(3) start(3) end(3) step(3) enable(1) sum(1)
        let step = &frame[13..16];
        assert_eq!(step, [0x00, 0x13, 0x88]); // 5000, not 5
        assert_eq!(frame[16], 0x01);
    }

    #[test]
    fn ref_clk_field_round_trips_at_100hz_quantization() {
        for ref_clk_hz in [10_000_000.0, 25_000_000.0, 100_000_050.0, 250_000_000.0] {
            let frame = encode(
                DeviceType::Adf4351,
                ref_clk_hz,
                &tone(35_000_000.0, Gain::Level3),
            )
            .unwrap();
            let field = u32::from_be_bytes([0, frame[4], frame[5], frame[6]]);
            assert_eq!(field as f64 * 100.0, (ref_clk_hz / 100.0).round() * 100.0);
        }
    }

    #[test]
    fn fields_round_to_nearest() {
        // 150 Hz of reference clock is over half a register unit: rounds up.
        let frame = encode(
            DeviceType::Adf4351,
            25_000_150.0,
            &tone(35_000_000.0, Gain::Level3),
        )
        .unwrap();
        let field = u32::from_be_bytes([0, frame[4], frame[5], frame[6]]);
        assert_eq!(field, 250_002);
    }

    #[test]
    fn oversized_field_is_a_range_error() {
        // ref_clk / 100 above 2^24 - 1
        let err = encode(
            DeviceType::Adf4351,
            1_700_000_000.0,
            &tone(35_000_000.0, Gain::Level3),
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::Range { field: "ref_clk", .. }));

        let err = encode(
            DeviceType::Adf4351,
            25_000_000.0,
            &tone(17_000_000_000_000.0, Gain::Level3),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Range {
                field: "frequency",
                ..
            }
        ));
    }

    #[test]
    fn negative_field_is_a_range_error() {
        let err = encode(
            DeviceType::Adf4351,
            25_000_000.0,
            &tone(-1000.0, Gain::Level3),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Range {
                field: "frequency",
                ..
            }
        ));
    }

    #[test]
    fn ack_accepts_only_the_exact_sequence() {
        assert!(decode_ack(&[0xAD, 0x66, 0x13]).is_ok());

        let rejects: &[&[u8]] = &[
            &[0xAD, 0x13, 0x66], // swapped
            &[0x66, 0x13, 0xAD], // rotated
            &[0xAD, 0x66],       // truncated
            &[0xAD, 0x66, 0x13, 0x00], // overlong
            &[0x00, 0x00, 0x00],
            &[],
        ];
        for &bytes in rejects {
            let err = decode_ack(bytes).unwrap_err();
            let ProtocolError::UnexpectedAck(got) = err;
            assert_eq!(got, bytes.to_vec());
        }
    }
}

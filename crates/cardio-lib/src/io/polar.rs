//! Decoders for the notifications a Polar chest strap sends over BLE.
//!
//! PMD ECG frame layout:
//!
//! | bytes | content |
//! |---|---|
//! | 0 | measurement type (`0x00` = ECG) |
//! | 1..9 | sensor timestamp, u64 LE, nanoseconds |
//! | 9 | frame type |
//! | 10.. | 73 samples, 24-bit LE two's complement (µV) |

use crate::error::{CardioError, Result};
use crate::signal::Sample;
use log::warn;

pub const PMD_MEASUREMENT_ECG: u8 = 0x00;
pub const PMD_HEADER_LEN: usize = 10;
pub const PMD_ECG_SAMPLES_PER_FRAME: usize = 73;
pub const PMD_ECG_SAMPLE_RATE_HZ: f64 = 130.0;
const BYTES_PER_SAMPLE: usize = 3;

/// Raw content of one PMD ECG notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmdEcgFrame {
    pub sensor_timestamp_ns: u64,
    pub frame_type: u8,
    pub samples: Vec<i32>,
}

pub fn parse_pmd_ecg_frame(frame: &[u8]) -> Result<PmdEcgFrame> {
    let expected = PMD_HEADER_LEN + PMD_ECG_SAMPLES_PER_FRAME * BYTES_PER_SAMPLE;
    if frame.len() < expected {
        return Err(CardioError::FrameTooShort {
            expected,
            actual: frame.len(),
        });
    }
    if frame[0] != PMD_MEASUREMENT_ECG {
        return Err(CardioError::UnexpectedMeasurement(frame[0]));
    }

    let mut ts = [0u8; 8];
    ts.copy_from_slice(&frame[1..9]);
    let samples = frame[PMD_HEADER_LEN..expected]
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|b| i24_le(b[0], b[1], b[2]))
        .collect();

    Ok(PmdEcgFrame {
        sensor_timestamp_ns: u64::from_le_bytes(ts),
        frame_type: frame[9],
        samples,
    })
}

/// Decode a PMD ECG notification into samples stamped from the host arrival
/// time, one nominal sample period apart.
pub fn decode_pmd_ecg(frame: &[u8], arrival_ms: i64) -> Result<Vec<Sample>> {
    let parsed = parse_pmd_ecg_frame(frame)?;
    let period_ms = 1000.0 / PMD_ECG_SAMPLE_RATE_HZ;
    Ok(parsed
        .samples
        .iter()
        .enumerate()
        .map(|(i, &raw)| {
            Sample::new(
                arrival_ms + (i as f64 * period_ms).round() as i64,
                raw as f64,
            )
        })
        .collect())
}

/// Decode a run of `(payload, arrival_ms)` notifications, skipping and
/// logging the ones that are not well-formed ECG frames.
pub fn decode_pmd_notifications<'a, I>(notifications: I) -> Vec<Sample>
where
    I: IntoIterator<Item = (&'a [u8], i64)>,
{
    let mut samples = Vec::new();
    for (frame, arrival_ms) in notifications {
        match decode_pmd_ecg(frame, arrival_ms) {
            Ok(decoded) => samples.extend(decoded),
            Err(err) => warn!("skipping PMD frame received at {arrival_ms}: {err}"),
        }
    }
    samples
}

fn i24_le(b0: u8, b1: u8, b2: u8) -> i32 {
    let raw = i32::from(b0) | (i32::from(b1) << 8) | (i32::from(b2) << 16);
    // sign-extend bit 23
    (raw << 8) >> 8
}

/// BLE Heart Rate Measurement: flag bit 0 selects a u16 value.
pub fn decode_heart_rate(payload: &[u8]) -> Result<u16> {
    let Some(&flags) = payload.first() else {
        return Err(CardioError::HeartRatePayload(0));
    };
    if flags & 0x01 != 0 {
        match payload.get(1..3) {
            Some(b) => Ok(u16::from_le_bytes([b[0], b[1]])),
            None => Err(CardioError::HeartRatePayload(payload.len())),
        }
    } else {
        payload
            .get(1)
            .map(|&b| u16::from(b))
            .ok_or(CardioError::HeartRatePayload(payload.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(samples: &[i32]) -> Vec<u8> {
        let mut frame = vec![0u8; PMD_HEADER_LEN];
        frame[1..9].copy_from_slice(&123_456_789u64.to_le_bytes());
        for i in 0..PMD_ECG_SAMPLES_PER_FRAME {
            let v = samples.get(i).copied().unwrap_or(0);
            let bytes = v.to_le_bytes();
            frame.extend_from_slice(&bytes[..3]);
        }
        frame
    }

    #[test]
    fn decodes_signed_24_bit_samples() {
        let frame = frame_with(&[1, -1, 8_388_607, -8_388_608, 250]);
        let parsed = parse_pmd_ecg_frame(&frame).expect("decode");
        assert_eq!(parsed.sensor_timestamp_ns, 123_456_789);
        assert_eq!(parsed.samples.len(), PMD_ECG_SAMPLES_PER_FRAME);
        assert_eq!(&parsed.samples[..5], &[1, -1, 8_388_607, -8_388_608, 250]);
    }

    #[test]
    fn stamps_samples_from_arrival_time() {
        let frame = frame_with(&[10, 20, 30]);
        let samples = decode_pmd_ecg(&frame, 5_000).expect("decode");
        assert_eq!(samples[0], Sample::new(5_000, 10.0));
        assert_eq!(samples[1].timestamp, 5_008);
        assert_eq!(samples[2].timestamp, 5_015);
        assert_eq!(samples[72].timestamp, 5_000 + (72.0f64 * 1000.0 / 130.0).round() as i64);
    }

    #[test]
    fn rejects_short_frames() {
        let err = parse_pmd_ecg_frame(&[0u8; 20]).unwrap_err();
        assert!(matches!(
            err,
            CardioError::FrameTooShort {
                expected: 229,
                actual: 20
            }
        ));
    }

    #[test]
    fn rejects_non_ecg_measurement() {
        let mut frame = frame_with(&[]);
        frame[0] = 0x02;
        assert!(matches!(
            parse_pmd_ecg_frame(&frame),
            Err(CardioError::UnexpectedMeasurement(0x02))
        ));
    }

    #[test]
    fn malformed_notifications_are_skipped() {
        let good = frame_with(&[42]);
        let mut other = frame_with(&[]);
        other[0] = 0x01;
        let truncated = &good[..100];
        let samples = decode_pmd_notifications([
            (truncated, 1_000),
            (good.as_slice(), 2_000),
            (other.as_slice(), 3_000),
        ]);
        assert_eq!(samples.len(), PMD_ECG_SAMPLES_PER_FRAME);
        assert_eq!(samples[0], Sample::new(2_000, 42.0));
    }

    #[test]
    fn heart_rate_formats() {
        assert_eq!(decode_heart_rate(&[0x00, 72]).unwrap(), 72);
        assert_eq!(decode_heart_rate(&[0x01, 0x2c, 0x01]).unwrap(), 300);
        assert!(decode_heart_rate(&[]).is_err());
        assert!(decode_heart_rate(&[0x01, 0x2c]).is_err());
    }
}

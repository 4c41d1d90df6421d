//! Conversion between 32-bit floats and pairs of 16-bit Modbus words.
//!
//! The SDM630 transmits every measurement as an IEEE-754 single-precision
//! float spread over two consecutive registers, big-endian, high word first.
//! E.g. `230.0` => bytes `43 66 00 00` => words `[0x4366, 0x0000]`.

/// Serialize a float into its two-word register representation.
pub const fn encode_f32(value: f32) -> [u16; 2] {
    let bytes = value.to_be_bytes();
    [
        u16::from_be_bytes([bytes[0], bytes[1]]),
        u16::from_be_bytes([bytes[2], bytes[3]]),
    ]
}

/// Reassemble a float from its two-word register representation.
pub const fn decode_f32(words: [u16; 2]) -> f32 {
    let high = words[0].to_be_bytes();
    let low = words[1].to_be_bytes();
    f32::from_be_bytes([high[0], high[1], low[0], low[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encodings() {
        // 230.0f32 = 0x43660000 big-endian.
        assert_eq!(encode_f32(230.0), [0x4366, 0x0000]);
        // -50.5f32 = 0xC24A0000.
        assert_eq!(encode_f32(-50.5), [0xC24A, 0x0000]);
        assert_eq!(encode_f32(0.0), [0x0000, 0x0000]);
        // Negative zero keeps its sign bit in the high word.
        assert_eq!(encode_f32(-0.0), [0x8000, 0x0000]);
    }

    #[test]
    fn round_trip_finite() {
        for v in [
            0.0f32, -0.0, 1.0, -1.0, 237.2, 50.0, -50.5, 0.98, 1e-38, 3.4e38, -3.4e38,
        ] {
            let decoded = decode_f32(encode_f32(v));
            // Bit-for-bit, not just numerically equal.
            assert_eq!(decoded.to_bits(), v.to_bits(), "value {v}");
        }
    }

    #[test]
    fn round_trip_non_finite() {
        // Non-finite patterns pass through untouched, no normalization.
        for v in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let decoded = decode_f32(encode_f32(v));
            assert_eq!(decoded.to_bits(), v.to_bits());
        }
        // A non-canonical NaN payload survives the trip too.
        let odd_nan = f32::from_bits(0x7FC0_1234);
        assert_eq!(decode_f32(encode_f32(odd_nan)).to_bits(), 0x7FC0_1234);
    }
}

// adcs_core/src/io/codec.rs

//! Raw double encoding used on the command channel: 8 bytes, big-endian
//! IEEE-754, no framing.

/// Memcached item flag marking a raw byte payload.
pub const RAW_DATA_FLAG: u32 = 0xE;

pub fn encode_f64(value: f64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes an 8-byte payload. Any other length is rejected.
pub fn decode_f64(bytes: &[u8]) -> Option<f64> {
    <[u8; 8]>::try_from(bytes).ok().map(f64::from_be_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_big_endian() {
        assert_eq!(encode_f64(1.0), [0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_f64(&[0xc0, 0, 0, 0, 0, 0, 0, 0]), Some(-2.0));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(decode_f64(&[0x3f, 0xf0, 0, 0]), None);
        assert_eq!(decode_f64(&[0; 9]), None);
    }

    #[test]
    fn nan_survives_the_wire() {
        let decoded = decode_f64(&encode_f64(f64::NAN)).unwrap();
        assert!(decoded.is_nan());
    }
}

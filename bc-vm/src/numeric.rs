//! Stack value conversions
//!
//! Integers are little-endian two's complement with trailing zero bytes
//! trimmed; zero is the empty string. Booleans are truthy when any byte
//! is non-zero.

use crate::error::{VmError, VmResult};

/// Interpret a stack item as a boolean
pub fn as_bool(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| b != 0)
}

/// Encode a boolean as a stack item
pub fn bool_bytes(b: bool) -> Vec<u8> {
    if b {
        vec![1]
    } else {
        Vec::new()
    }
}

/// Encode an integer as a stack item
pub fn int64_bytes(n: i64) -> Vec<u8> {
    let mut bytes = n.to_le_bytes().to_vec();
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    bytes
}

/// Decode a stack item as an integer
pub fn as_int64(bytes: &[u8]) -> VmResult<i64> {
    if bytes.len() > 8 {
        return Err(VmError::BadValue);
    }
    let mut padded = [0u8; 8];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(i64::from_le_bytes(padded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int64_encoding() {
        assert!(int64_bytes(0).is_empty());
        assert_eq!(int64_bytes(1), vec![1]);
        assert_eq!(int64_bytes(256), vec![0, 1]);
        assert_eq!(int64_bytes(-1), vec![0xff; 8]);
    }

    #[test]
    fn test_int64_decoding() {
        assert_eq!(as_int64(&[]).unwrap(), 0);
        assert_eq!(as_int64(&[0, 1]).unwrap(), 256);
        assert_eq!(as_int64(&[0xff; 8]).unwrap(), -1);
        assert_eq!(as_int64(&[1; 9]), Err(VmError::BadValue));
    }

    #[test]
    fn test_bool_conversion() {
        assert!(!as_bool(&[]));
        assert!(!as_bool(&[0, 0]));
        assert!(as_bool(&[0, 1]));
        assert_eq!(bool_bytes(true), vec![1]);
        assert!(bool_bytes(false).is_empty());
    }
}

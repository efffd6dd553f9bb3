//! Request wire format
//!
//! A request is the ASCII string `"<key>:<payload>"`. The payload may be
//! empty and is everything after the first `:`, so it may itself contain
//! colons.

use crate::error::{XaError, XaResult};
use std::fmt;

/// Separator between key and payload
pub const SEPARATOR: char = ':';

/// A decoded request: integer key and string payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestMessage {
    /// Record key
    pub key: i32,
    /// Payload, possibly empty
    pub payload: String,
}

impl RequestMessage {
    /// Create a new request
    pub fn new(key: i32, payload: impl Into<String>) -> Self {
        Self {
            key,
            payload: payload.into(),
        }
    }

    /// Encode as `"<key>:<payload>"`
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.key, SEPARATOR, self.payload)
    }

    /// Decode `"<key>:<payload>"`
    ///
    /// # Errors
    ///
    /// Returns `MalformedRequest` if there is no `:` or the prefix is not a
    /// valid `i32`.
    pub fn decode(message: &str) -> XaResult<Self> {
        let (prefix, payload) = message
            .split_once(SEPARATOR)
            .ok_or_else(|| XaError::malformed(message, "missing ':' separator"))?;

        let key = prefix.trim().parse::<i32>().map_err(|e| {
            XaError::malformed(message, format!("invalid key {:?}: {}", prefix, e))
        })?;

        Ok(Self {
            key,
            payload: payload.to_string(),
        })
    }

    /// Decode a wire buffer
    ///
    /// The buffer is NUL terminated: everything from the first NUL byte on
    /// is left over from earlier, longer requests and is ignored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRequest` for non UTF-8 input or any error
    /// [`RequestMessage::decode`] reports.
    pub fn decode_bytes(bytes: &[u8]) -> XaResult<Self> {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        let text = std::str::from_utf8(&bytes[..end]).map_err(|e| {
            XaError::malformed(String::from_utf8_lossy(bytes), format!("not UTF-8: {}", e))
        })?;
        Self::decode(text)
    }

    /// Encode into a wire buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode().into_bytes()
    }
}

impl fmt::Display for RequestMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, SEPARATOR, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_key_and_payload() {
        let msg = RequestMessage::decode("1000:AAAA").unwrap();
        assert_eq!(msg.key, 1000);
        assert_eq!(msg.payload, "AAAA");
    }

    #[test]
    fn test_decode_empty_payload() {
        let msg = RequestMessage::decode("1000:").unwrap();
        assert_eq!(msg, RequestMessage::new(1000, ""));
    }

    #[test]
    fn test_decode_splits_on_first_colon() {
        let msg = RequestMessage::decode("7:a:b").unwrap();
        assert_eq!(msg.key, 7);
        assert_eq!(msg.payload, "a:b");
    }

    #[test]
    fn test_decode_missing_separator() {
        let err = RequestMessage::decode("1000AAAA").unwrap_err();
        assert!(matches!(err, XaError::MalformedRequest { .. }));
    }

    #[test]
    fn test_decode_bad_key() {
        assert!(matches!(
            RequestMessage::decode("abc:AAAA"),
            Err(XaError::MalformedRequest { .. })
        ));
        assert!(matches!(
            RequestMessage::decode(":AAAA"),
            Err(XaError::MalformedRequest { .. })
        ));
        assert!(matches!(
            RequestMessage::decode("99999999999:x"),
            Err(XaError::MalformedRequest { .. })
        ));
    }

    #[test]
    fn test_decode_bytes_strips_nul_terminator() {
        let msg = RequestMessage::decode_bytes(b"0:ABCD\0\0").unwrap();
        assert_eq!(msg, RequestMessage::new(0, "ABCD"));
    }

    #[test]
    fn test_decode_bytes_stops_at_first_nul() {
        let msg = RequestMessage::decode_bytes(b"0:\0AAA\0").unwrap();
        assert_eq!(msg, RequestMessage::new(0, ""));

        // a short request copied over a longer one
        let mut buffer = b"1000:ABCD".to_vec();
        buffer[..3].copy_from_slice(b"0:\0");
        assert_eq!(
            RequestMessage::decode_bytes(&buffer).unwrap(),
            RequestMessage::new(0, "")
        );
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        assert!(matches!(
            RequestMessage::decode_bytes(&[b'1', b':', 0xFF]),
            Err(XaError::MalformedRequest { .. })
        ));
    }

    #[test]
    fn test_decode_bytes_empty_buffer_is_malformed() {
        assert!(RequestMessage::decode_bytes(b"").is_err());
        assert!(RequestMessage::decode_bytes(b"\0").is_err());
    }

    proptest! {
        #[test]
        fn decode_is_left_inverse_of_encode(key in any::<i32>(), payload in "[ -~]{0,10}") {
            let msg = RequestMessage::new(key, payload);
            prop_assert_eq!(RequestMessage::decode(&msg.encode()).unwrap(), msg.clone());
            prop_assert_eq!(RequestMessage::decode_bytes(&msg.to_bytes()).unwrap(), msg);
        }
    }
}

// Message codec - converts application payloads to/from message content

use crate::{Message, NearbyError, Payload, Result};

/// Maximum payload size accepted by the codec (100 KiB)
pub const MAX_PAYLOAD_BYTES: usize = 100 * 1024;

/// Converts an application payload to/from the opaque byte content carried
/// by a message envelope. Encoding and decoding round-trip byte-for-byte.
pub struct MessageCodec;

impl MessageCodec {
    /// Wrap an application payload into a message envelope
    pub fn encode(payload: &[u8]) -> Result<Message> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(NearbyError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }
        Ok(Message::new(payload.to_vec()))
    }

    /// Extract the application payload from a message envelope
    pub fn decode(message: &Message) -> Payload {
        message.content().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let payload = b"Hello World".to_vec();
        let message = MessageCodec::encode(&payload).unwrap();
        assert_eq!(MessageCodec::decode(&message), payload);
    }

    #[test]
    fn test_empty_payload_round_trip() {
        let message = MessageCodec::encode(&[]).unwrap();
        assert_eq!(MessageCodec::decode(&message), Vec::<u8>::new());
    }

    #[test]
    fn test_payload_at_limit_accepted() {
        let payload = vec![0xAB; MAX_PAYLOAD_BYTES];
        let message = MessageCodec::encode(&payload).unwrap();
        assert_eq!(MessageCodec::decode(&message).len(), MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD_BYTES + 1];
        let result = MessageCodec::encode(&payload);
        assert!(matches!(
            result,
            Err(NearbyError::PayloadTooLarge { size, max })
                if size == MAX_PAYLOAD_BYTES + 1 && max == MAX_PAYLOAD_BYTES
        ));
    }
}

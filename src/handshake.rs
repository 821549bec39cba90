//! Handshake helpers, component C7: challenge-key generation and the
//! Sec-WebSocket-Accept derivation shared by the client and server paths.

use base64::prelude::*;
use rand::RngCore;
use sha1::{Digest, Sha1};

const GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// 16 random bytes, base64-encoded — the `Sec-WebSocket-Key` challenge.
pub fn generate_challenge_key() -> String {
    let mut key = [0u8; 16];
    rand::rng().fill_bytes(&mut key);
    BASE64_STANDARD.encode(key)
}

/// Derives the `Sec-WebSocket-Accept` value from a challenge key per §4.7.
pub fn compute_accept_key(challenge: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(challenge.as_bytes());
    hasher.update(GUID.as_bytes());
    BASE64_STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_key_matches_rfc_example() {
        assert_eq!(
            compute_accept_key("vsj/Lv1PrpaM3phhuQaCwA=="),
            "hmjGuAvho4DNj8U4MED02EkkeCY="
        );
    }

    #[test]
    fn challenge_key_decodes_to_16_bytes() {
        let key = generate_challenge_key();
        assert_eq!(key.len(), 24);
        let decoded = BASE64_STANDARD.decode(&key).unwrap();
        assert_eq!(decoded.len(), 16);
    }

    #[test]
    fn challenge_keys_vary() {
        assert_ne!(generate_challenge_key(), generate_challenge_key());
    }
}

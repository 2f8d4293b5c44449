//! Random identifiers

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// Length of generated document ids
pub const ID_LENGTH: usize = 20;

/// Number of random ids concatenated into a scroll id
pub const SCROLL_ID_SEGMENTS: usize = 6;

/// Raw length of a point-in-time id before encoding
const PIT_ID_RAW_LENGTH: usize = 126;

/// Random alphanumeric id of `len` characters
pub fn random_id_of(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random document id
pub fn random_id() -> String {
    random_id_of(ID_LENGTH)
}

/// Base64 scroll id
pub fn random_scroll_id() -> String {
    let raw: String = (0..SCROLL_ID_SEGMENTS).map(|_| random_id()).collect();
    STANDARD.encode(raw)
}

/// Base64 point-in-time id, 168 characters long
pub fn random_pit_id() -> String {
    STANDARD.encode(random_id_of(PIT_ID_RAW_LENGTH))
}

/// Cluster identifier reported by `info`
pub fn cluster_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = random_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, random_id());
    }

    #[test]
    fn test_scroll_id_decodes_to_segments() {
        let decoded = STANDARD.decode(random_scroll_id()).unwrap();
        assert_eq!(decoded.len(), ID_LENGTH * SCROLL_ID_SEGMENTS);
    }

    #[test]
    fn test_pit_id_length() {
        assert_eq!(random_pit_id().len(), 168);
    }
}

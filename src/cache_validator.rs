use sha2::{Digest, Sha256};

/// Integrity wrapper for cached webhook payloads.
///
/// Firm-search results sit in an in-process cache between requests; each
/// entry stores a SHA-256 checksum next to the payload so a corrupted or
/// tampered entry is discarded and refetched instead of served.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CachedPayload {
    /// The cached JSON payload.
    pub payload: String,
    /// SHA-256 checksum of the payload (hex encoded).
    pub checksum: String,
}

impl CachedPayload {
    /// Wraps a payload with its computed checksum, ready for insertion.
    pub fn seal(payload: String) -> Self {
        let checksum = Self::compute_checksum(&payload);
        Self { payload, checksum }
    }

    fn compute_checksum(payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// True when the stored checksum matches the payload.
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.payload) == self.checksum
    }

    /// Serializes the entry for storage in the cache.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserializes a cache entry and returns the payload only if its
    /// checksum still holds. `None` means the entry must be refetched.
    pub fn unseal(serialized: &str) -> Option<String> {
        let entry: CachedPayload = serde_json::from_str(serialized).ok()?;
        if entry.is_valid() {
            Some(entry.payload)
        } else {
            tracing::warn!(
                "Cache validation failed: checksum mismatch (payload length {})",
                entry.payload.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_payload_validates() {
        let payload = r#"{"data":[{"output":{"firm_name":"Acme PM"}}]}"#.to_string();
        let entry = CachedPayload::seal(payload.clone());
        assert!(entry.is_valid());
        assert_eq!(entry.payload, payload);
    }

    #[test]
    fn seal_unseal_round_trip() {
        let payload = r#"{"data":[]}"#.to_string();
        let entry = CachedPayload::seal(payload.clone());
        assert_eq!(CachedPayload::unseal(&entry.serialize()), Some(payload));
    }

    #[test]
    fn tampered_payload_rejected() {
        let entry = CachedPayload::seal(r#"{"city":"Dallas"}"#.to_string());
        let tampered = entry.serialize().replace("Dallas", "Austin");
        assert_eq!(CachedPayload::unseal(&tampered), None);
    }

    #[test]
    fn checksum_is_deterministic() {
        let a = CachedPayload::seal("payload".to_string());
        let b = CachedPayload::seal("payload".to_string());
        assert_eq!(a.checksum, b.checksum);
    }
}

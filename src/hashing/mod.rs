use blake3::Hasher;

/// Full 32-byte key for a cached backend response.
///
/// The `|` separators keep `("ab", "c")` and `("a", "bc")` apart.
#[inline]
pub fn hash_query_key(backend_id: &str, normalized_query: &str, pattern_id: u64) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(backend_id.as_bytes());
    hasher.update(b"|");
    hasher.update(normalized_query.as_bytes());
    hasher.update(b"|");
    hasher.update(&pattern_id.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Stable identifier for a lexical pattern, the BLAKE3 digest truncated to 64 bits.
///
/// A rare collision only merges two cache namespaces. Use [`hash_query_key`]
/// when the full digest matters.
#[inline]
pub fn hash_pattern_id(language: &str, predicate_uri: &str, template: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(language.as_bytes());
    hasher.update(b"|");
    hasher.update(predicate_uri.as_bytes());
    hasher.update(b"|");
    hasher.update(template.as_bytes());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Hex rendering of a 32-byte key (snapshot files, logs).
#[inline]
pub fn key_to_hex(key: &[u8; 32]) -> String {
    blake3::Hash::from(*key).to_hex().to_string()
}

/// Parses a key produced by [`key_to_hex`].
#[inline]
pub fn key_from_hex(hex: &str) -> Option<[u8; 32]> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash_query_key_determinism() {
        let a = hash_query_key("elastic", "einstein was born in ulm", 42);
        let b = hash_query_key("elastic", "einstein was born in ulm", 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_query_key_component_sensitivity() {
        let keys = [
            hash_query_key("elastic", "einstein ulm", 1),
            hash_query_key("web", "einstein ulm", 1),
            hash_query_key("elastic", "einstein  ulm", 1),
            hash_query_key("elastic", "einstein ulm", 2),
        ];
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_hash_query_key_separator_prevents_ambiguity() {
        let a = hash_query_key("ab", "c", 0);
        let b = hash_query_key("a", "bc", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_pattern_id_fields() {
        let base = hash_pattern_id("en", "dbo:birthPlace", "?D? was born in ?R?");
        assert_eq!(base, hash_pattern_id("en", "dbo:birthPlace", "?D? was born in ?R?"));
        assert_ne!(base, hash_pattern_id("de", "dbo:birthPlace", "?D? was born in ?R?"));
        assert_ne!(base, hash_pattern_id("en", "dbo:deathPlace", "?D? was born in ?R?"));
    }

    #[test]
    fn test_hash_pattern_id_is_truncated_digest() {
        let digest = blake3::hash(b"en|dbo:birthPlace|?D? was born in ?R?");
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);

        assert_eq!(
            hash_pattern_id("en", "dbo:birthPlace", "?D? was born in ?R?"),
            u64::from_le_bytes(prefix)
        );
    }

    #[test]
    fn test_key_hex_roundtrip() {
        let key = hash_query_key("elastic", "q", 7);
        let hex = key_to_hex(&key);
        assert_eq!(hex.len(), 64);
        assert_eq!(key_from_hex(&hex), Some(key));
        assert_eq!(key_from_hex("not-hex"), None);
    }
}

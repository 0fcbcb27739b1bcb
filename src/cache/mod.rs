//! Search result cache.
//!
//! Keys are BLAKE3 digests of (backend id, normalized query, pattern id), so
//! equal keys always map to equivalent content. The cache sits in front of
//! every backend call the crawler makes and can be persisted across runs as a
//! JSON snapshot.

pub mod error;
pub mod result_cache;
pub mod snapshot;


pub use error::{CacheError, CacheResult};
pub use result_cache::{CacheKey, CacheStats, EmptyResultPolicy, ResultCache};

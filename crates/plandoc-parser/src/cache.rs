//! Parsed-document cache using moka
//!
//! Documents are keyed by the hash of their text, so re-reading an unchanged
//! file skips the parse. A cache is bound to one parser; documents parsed
//! with a different vocabulary never share entries.

use crate::parser::DocumentParser;
use moka::future::Cache;
use plandoc_artifact::{ContentHash, Document};
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Content-addressed cache of parsed documents
#[derive(Debug, Clone)]
pub struct DocumentCache {
    parser: DocumentParser,
    inner: Cache<ContentHash, Arc<Document>>,
}

impl DocumentCache {
    /// Create a cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(parser: DocumentParser, max_capacity: u64) -> Self {
        Self {
            parser,
            inner: Cache::new(max_capacity),
        }
    }

    /// Create a cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(parser: DocumentParser, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            parser,
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Parser used on a miss
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &DocumentParser {
        &self.parser
    }

    /// Parse `text`, reusing a cached document with the same hash
    pub async fn parse(&self, text: &str) -> Arc<Document> {
        let hash = ContentHash::of_text(text);
        self.inner
            .get_with(hash, async { Arc::new(self.parser.parse(text)) })
            .await
    }

    /// Cached document for a hash
    #[inline]
    pub async fn get(&self, hash: &ContentHash) -> Option<Arc<Document>> {
        self.inner.get(hash).await
    }

    /// Drop one entry
    #[inline]
    pub async fn invalidate(&self, hash: &ContentHash) {
        self.inner.invalidate(hash).await;
    }

    /// Cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

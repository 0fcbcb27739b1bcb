//! Evidence crawling.
//!
//! [`EvidenceCrawler`] dispatches every (query, backend) pair through the
//! result cache with bounded concurrency, then scans the returned documents
//! with [`PatternMatcher`] to build proofs. Crawling never fails: backend
//! errors and timeouts degrade to zero documents for that call.

pub mod crawler;
pub mod matcher;

#[cfg(test)]
mod crawler_tests;

pub use crawler::{CancellationFlag, CrawlConfig, EvidenceCrawler};
pub use matcher::{
    CompiledTemplate, LabelHints, PatternMatch, PatternMatcher, Token, split_sentences, tokenize,
};

//! Sharded inverted index over rolling hashes, for finding documents that share substrings and
//! reconstructing the shared fragments between them.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌──────────────┐   ┌───────────────┐
//! │ normalize   │──▶│   hash    │──▶│ posting_line │──▶│ sparse_table  │
//! │ (runes)     │   │ (rolling) │   │ (codec)      │   │ (storage)     │
//! └────────────┘   └───────────┘   └──────────────┘   └───────────────┘
//!                                          ▲                   ▲
//!                                          │                   │
//!                                     ┌────┴───────────────────┴────┐
//!                                     │           shard.rs          │
//!                                     │   (PostingShard, Stats)     │
//!                                     └──────────────┬──────────────┘
//!                                                     │
//!                                     ┌──────────────▼──────────────┐
//!                                     │          client.rs           │
//!                                     │  (fan-out across shards)     │
//!                                     └──────────────┬──────────────┘
//!                                                     │
//!                         ┌───────────────────────────┴───────────────────────────┐
//!                         ▼                                                       ▼
//!                 ┌───────────────┐                                     ┌──────────────────┐
//!                 │   search.rs    │                                     │  association.rs   │
//!                 │ (tally/score)  │────────────────────────────────────▶│ (fragments/theme) │
//!                 └───────────────┘                                     └──────────────────┘
//! ```
//!
//! `document.rs` sits underneath all of the above: it owns the per-document cache of normalized
//! text, hash vectors and bloom filters that `hash`, `association` and the shards all read from.

pub mod association;
pub mod bloom;
pub mod client;
pub mod config;
pub mod contracts;
pub mod document;
pub mod error;
pub mod hash;
pub mod normalize;
pub mod posting_line;
pub mod search;
pub mod shard;
pub mod sparse_table;

#[doc(hidden)]
pub mod testing;

pub use association::{build_association, Association, Fragment, Theme, ThemeId};
pub use client::Client;
pub use config::{partition, Config, PostingConfig};
pub use document::{Document, DocumentId, DoctypeRange};
pub use error::{Error, Result};
pub use search::{score, search, Match, ScoreFn, SearchResult, Tally};
pub use shard::{ListRow, PostingShard, Stats};

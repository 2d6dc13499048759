// src/ingest/providers/mod.rs
pub mod feed;
pub mod mediastack;
pub mod newsdata;

pub use feed::FeedAdapter;
pub use mediastack::MediastackAdapter;
pub use newsdata::NewsDataAdapter;

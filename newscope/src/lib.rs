// Library interface for newscope modules
// This allows tests and other binaries to import modules

pub mod db;
pub mod discovery;
pub mod dispatch;
pub mod enrichment;
pub mod error;
pub mod feed_resolver;
pub mod http;
pub mod ingestion;
pub mod models;
pub mod moderation;
pub mod recorder;
pub mod referral;
pub mod scheduler;

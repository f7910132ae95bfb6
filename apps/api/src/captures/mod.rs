pub mod bulk;
pub mod enrichment;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod store;
pub mod suggest;
pub mod tagging;

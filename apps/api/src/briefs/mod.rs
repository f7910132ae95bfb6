pub mod assembly;
pub mod export;
pub mod generate;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod render;
pub mod store;

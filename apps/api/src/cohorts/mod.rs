pub mod handlers;
pub mod models;
pub mod pillars;
pub mod report;
pub mod session;

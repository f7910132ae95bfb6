//! Secondary dashboard resources: sources, trending signals, hypothesis
//! validations and cultural moments. Plain CRUD, independent of the capture
//! and brief pipeline apart from optional project links.

pub mod handlers;
pub mod models;
pub mod store;

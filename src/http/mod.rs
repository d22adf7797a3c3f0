pub mod client;

pub use client::{ApiClient, REQUEST_ID_HEADER};

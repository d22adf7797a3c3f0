//! Library exports for jansetu, shared between the binary and tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod models;
pub mod navigation;
pub mod resources;
pub mod session;
pub mod storage;
pub mod utils;

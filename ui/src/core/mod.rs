//! Platform-facing plumbing shared by the browser build and native tests.

pub mod platform;
pub mod storage;

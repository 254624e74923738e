//! API layer - in-process transport

pub mod native;

//! Integration tests for tagpack
//!
//! These drive a real engine and real compressor end to end, so they only build
//! when the matching cargo feature is enabled.

pub mod common;
pub mod docker;
pub mod nerdctl;

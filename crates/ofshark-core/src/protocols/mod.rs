//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, type codes and name tables (source of truth)
//! - `reader`: bounds-checked byte access inside a window of the buffer
//! - record decoders: domain-level decoding driven by the variant registry
//! - `error`: explicit, actionable errors
//!
//! Decoders are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation.

pub(crate) mod common;
pub mod openflow;

//! PCAP/PCAPNG source implementation.
//!
//! A `PacketSource` backed by capture files. Handles file I/O, per-interface
//! link types and timestamp resolutions, and emits raw packet events for the
//! analysis pipeline.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;

//! OFShark core library: OpenFlow 1.3 decoding and offline capture analysis.
//!
//! The heart of the crate is `protocols::openflow`, a table-driven decoder
//! that turns one OpenFlow message into a tree of named fields. It reproduces
//! every byte of the wire format and keeps going on malformed or unknown
//! records, attaching anomalies to the node where they occur instead of
//! failing.
//!
//! Around it sits a small offline pipeline: packet sources read PCAP/PCAPNG
//! files, the analysis layer extracts OpenFlow control-channel TCP payloads,
//! splits them into messages, decodes them and aggregates a deterministic
//! JSON report. All I/O is isolated in `source`.
//!
//! Invariants:
//! - Every decoded node lies inside its parent and inside the input buffer.
//! - List iteration always advances by the declared record length.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```
//! use ofshark_core::decode;
//!
//! let echo = [0x04, 0x02, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x2a, 0xde, 0xad, 0xbe, 0xef];
//! let message = decode(&echo)?;
//! assert_eq!(message.kind(), "echo_request");
//! assert_eq!(message.header.xid, 42);
//! assert!(message.is_clean());
//! # Ok::<(), ofshark_core::OpenFlowError>(())
//! ```
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ofshark_core::{AnalysisConfig, analyze_pcap_file};
//!
//! let report = analyze_pcap_file(Path::new("capture.pcapng"), &AnalysisConfig::default())?;
//! println!("messages: {}", report.messages.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
pub mod source;

pub use analysis::{
    AnalysisConfig, AnalysisError, DEFAULT_OPENFLOW_PORTS, MessageSlice, analyze_pcap_file,
    analyze_source, split_messages,
};
pub use protocols::openflow::{
    Anomaly, AnomalyKind, DecodeNode, DecodedField, Decoder, DecoderConfig, FieldValue, Header,
    ListKind, Message, NodeItem, OpenFlowError, Registry, RegistryBuilder, ReservedSite, Scope,
    VariantEntry, decode, default_registry, encode,
};
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use ofshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, ofshark_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary (may be empty when unavailable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Decoded messages in capture order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageRecord>,
    /// Control-channel flow summaries in stable order.
    pub flows: Vec<FlowSummary>,
    /// Anomaly summaries sorted by severity and ID.
    pub anomalies: Vec<AnomalySummary>,
}

impl Report {
    /// Total anomaly occurrences across all summaries.
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies.iter().map(|summary| summary.count).sum()
    }
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name ("ofshark").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Capture-level counters (timestamps may be absent).
///
/// # Examples
/// ```
/// use ofshark_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     openflow_segments: 4,
///     messages_total: 6,
///     decode_errors: 0,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed in the capture.
    pub packets_total: u64,
    /// TCP segments with payload on an OpenFlow port.
    pub openflow_segments: u64,
    /// Messages decoded (with or without anomalies).
    pub messages_total: u64,
    /// Message slices rejected by the decoder.
    pub decode_errors: u64,
    /// RFC3339 timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// One message slice found in a captured segment.
///
/// Exactly one of `message` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// 1-based index of the packet in the capture.
    pub packet: u64,
    /// RFC3339 capture timestamp of the packet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    /// Source endpoint in `ip:port` form.
    pub src: String,
    /// Destination endpoint in `ip:port` form.
    pub dst: String,
    /// Offset of the message inside the TCP payload.
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Decoder error for slices that could not be decoded at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-direction summary of an OpenFlow control channel.
///
/// # Examples
/// ```
/// use ofshark_core::FlowSummary;
///
/// let flow = FlowSummary {
///     app_proto: "openflow".to_string(),
///     src: "10.0.0.1:40000".to_string(),
///     dst: "10.0.0.2:6653".to_string(),
///     segments: 3,
///     bytes: 96,
///     messages: 4,
///     anomalies: 0,
///     mps: None,
///     bps: None,
/// };
/// assert_eq!(flow.app_proto, "openflow");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSummary {
    /// Application protocol name ("openflow").
    pub app_proto: String,
    /// Source endpoint in `ip:port` form.
    pub src: String,
    /// Destination endpoint in `ip:port` form.
    pub dst: String,
    /// TCP segments carrying payload.
    pub segments: u64,
    /// TCP payload bytes.
    pub bytes: u64,
    /// Messages decoded.
    pub messages: u64,
    /// Anomalies and decode errors seen on this flow.
    pub anomalies: u64,
    /// Messages per second over the capture duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mps: Option<f64>,
    /// Payload bytes per second over the capture duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bps: Option<f64>,
}

/// Aggregated anomaly occurrences of one kind.
///
/// # Examples
/// ```
/// use ofshark_core::AnomalySummary;
///
/// let summary = AnomalySummary {
///     id: "OF-UNKNOWN-VARIANT".to_string(),
///     severity: "warning".to_string(),
///     message: "type tag without a registered decoder".to_string(),
///     count: 1,
///     examples: vec!["10.0.0.1:40000 -> 10.0.0.2:6653 @ 1970-01-01T00:00:00Z".to_string()],
/// };
/// assert_eq!(summary.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalySummary {
    /// Stable identifier (e.g., `OF-STRUCTURAL-OVERRUN`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    /// Human-readable description of the anomaly kind.
    pub message: String,
    /// Number of occurrences aggregated into this summary.
    pub count: u64,
    /// At most three example contexts, formatted as `src -> dst @ ts ...`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use ofshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.tool.name, "ofshark");
/// assert!(report.flows.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "ofshark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        messages: vec![],
        flows: vec![],
        anomalies: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("capture.pcapng", 1);
        report.capture_summary = Some(CaptureSummary {
            packets_total: 1,
            openflow_segments: 1,
            messages_total: 0,
            decode_errors: 1,
            time_start: None,
            time_end: None,
        });
        report.messages.push(MessageRecord {
            packet: 1,
            ts: None,
            src: "10.0.0.1:40000".to_string(),
            dst: "10.0.0.2:6653".to_string(),
            offset: 0,
            message: None,
            error: Some("too short".to_string()),
        });
        report.flows.push(FlowSummary {
            app_proto: "openflow".to_string(),
            src: "10.0.0.1:40000".to_string(),
            dst: "10.0.0.2:6653".to_string(),
            segments: 1,
            bytes: 3,
            messages: 0,
            anomalies: 1,
            mps: None,
            bps: None,
        });

        let value = serde_json::to_value(&report).expect("report json");
        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let record = &value["messages"][0];
        assert!(record.get("ts").is_none());
        assert!(record.get("message").is_none());
        assert_eq!(record["error"], "too short");

        let flow = &value["flows"][0];
        assert!(flow.get("mps").is_none());
        assert!(flow.get("bps").is_none());
    }

    #[test]
    fn empty_messages_are_omitted_and_count_sums() {
        let mut report = make_stub_report("capture.pcap", 0);
        report.anomalies.push(AnomalySummary {
            id: "OF-UNKNOWN-VARIANT".to_string(),
            severity: "warning".to_string(),
            message: "type tag without a registered decoder".to_string(),
            count: 2,
            examples: vec![],
        });
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("messages").is_none());
        assert!(value["anomalies"][0].get("examples").is_none());
        assert_eq!(report.anomaly_count(), 2);
    }
}

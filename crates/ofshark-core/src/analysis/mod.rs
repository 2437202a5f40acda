use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{info, trace};

use crate::protocols::openflow::{Decoder, DecoderConfig};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, MessageRecord, Report, make_stub_report};

mod anomalies;
mod flows;
mod stream;
pub(crate) mod tcp;

use anomalies::AnomalyTally;
use flows::{FlowKey, FlowStats, add_flow_stats, build_flow_summaries, format_endpoint};
use tcp::parse_tcp_segment;

pub use stream::{MessageSlice, split_messages};

/// Well-known OpenFlow controller ports (IANA 6653 and the legacy 6633).
pub const DEFAULT_OPENFLOW_PORTS: [u16; 2] = [6653, 6633];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Capture analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// TCP ports treated as OpenFlow control channels (either endpoint).
    pub ports: Vec<u16>,
    /// Limits handed to the message decoder.
    pub decoder: DecoderConfig,
    /// Keep every decoded message in the report, not only the summaries.
    pub include_messages: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_OPENFLOW_PORTS.to_vec(),
            decoder: DecoderConfig::default(),
            include_messages: true,
        }
    }
}

/// Analyse a PCAP/PCAPNG file.
///
/// # Errors
/// Returns `AnalysisError` when the file cannot be opened or read as a capture.
pub fn analyze_pcap_file(path: &Path, config: &AnalysisConfig) -> Result<Report, AnalysisError> {
    let source = PcapFileSource::open(path)?;
    analyze_source(path, source, config)
}

/// Analyse packets from any source; `path` is only used for report metadata.
pub fn analyze_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    config: &AnalysisConfig,
) -> Result<Report, AnalysisError> {
    info!(path = %path.display(), ports = ?config.ports, "analysing capture");
    let decoder = Decoder::with_config(config.decoder);
    let mut packets_total = 0u64;
    let mut openflow_segments = 0u64;
    let mut messages_total = 0u64;
    let mut decode_errors = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut flow_stats: HashMap<FlowKey, FlowStats> = HashMap::new();
    let mut tally = AnomalyTally::default();
    let mut records = Vec::new();

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        let segment = match parse_tcp_segment(linktype, &data) {
            Ok(Some(segment)) => segment,
            Ok(None) => continue,
            Err(err) => {
                trace!(packet = packets_total, %err, "frame skipped");
                continue;
            }
        };
        if segment.payload.is_empty() || !segment.touches_any(&config.ports) {
            continue;
        }
        openflow_segments += 1;

        let src = format_endpoint(segment.src_ip, segment.src_port);
        let dst = format_endpoint(segment.dst_ip, segment.dst_port);
        let ts_text = ts_to_rfc3339(ts);
        let context = || {
            format!(
                "{src} -> {dst} @ {}",
                ts_text.as_deref().unwrap_or("unknown time")
            )
        };
        let mut segment_messages = 0u64;
        let mut segment_anomalies = 0u64;

        for slice in split_messages(segment.payload) {
            let (message, error) = match decoder.decode(slice.bytes) {
                Ok(message) => {
                    messages_total += 1;
                    segment_messages += 1;
                    for anomaly in &message.anomalies {
                        segment_anomalies += 1;
                        tally.record(anomaly.kind, || {
                            format!("{} {}: {}", context(), message.kind(), anomaly.message)
                        });
                    }
                    (Some(message), None)
                }
                Err(err) => {
                    decode_errors += 1;
                    segment_anomalies += 1;
                    tally.record_decode_error(|| format!("{}: {err}", context()));
                    (None, Some(err.to_string()))
                }
            };
            if config.include_messages {
                records.push(MessageRecord {
                    packet: packets_total,
                    ts: ts_text.clone(),
                    src: src.clone(),
                    dst: dst.clone(),
                    offset: slice.offset,
                    message,
                    error,
                });
            }
        }
        add_flow_stats(
            &mut flow_stats,
            &segment,
            segment_messages,
            segment_anomalies,
        );
    }

    info!(
        packets_total,
        openflow_segments,
        messages_total,
        anomalies = tally.total(),
        "analysis complete"
    );

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        openflow_segments,
        messages_total,
        decode_errors,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    let duration_s = match (first_ts, last_ts) {
        (Some(start), Some(end)) if end > start => Some(end - start),
        _ => None,
    };

    report.flows = build_flow_summaries(flow_stats, duration_s);
    report.anomalies = tally.into_summaries();
    report.messages = records;
    Ok(report)
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{AnalysisConfig, ts_to_rfc3339, update_ts_bounds};

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(2.0), Some(9.5)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(2.0));
        assert_eq!(last, Some(9.5));
    }

    #[test]
    fn rfc3339_formatting() {
        assert_eq!(
            ts_to_rfc3339(Some(1.5)).as_deref(),
            Some("1970-01-01T00:00:01.5Z")
        );
        assert!(ts_to_rfc3339(None).is_none());
    }

    #[test]
    fn config_defaults_and_partial_json() {
        let config = AnalysisConfig::default();
        assert_eq!(config.ports, [6653, 6633]);
        assert!(config.include_messages);

        let parsed: AnalysisConfig = serde_json::from_str(r#"{"ports":[9999]}"#).unwrap();
        assert_eq!(parsed.ports, [9999]);
        assert_eq!(parsed.decoder.max_message_len, 65535);
    }
}

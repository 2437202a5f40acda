use std::collections::HashMap;
use std::net::IpAddr;

use crate::FlowSummary;

use super::tcp::TcpSegment;

/// Directional control-channel key (switch to controller and back are two flows).
#[derive(Debug, Hash, PartialEq, Eq)]
pub(crate) struct FlowKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl FlowKey {
    pub(crate) fn of(segment: &TcpSegment<'_>) -> Self {
        Self {
            src_ip: segment.src_ip,
            src_port: segment.src_port,
            dst_ip: segment.dst_ip,
            dst_port: segment.dst_port,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct FlowStats {
    pub segments: u64,
    pub bytes: u64,
    pub messages: u64,
    pub anomalies: u64,
}

pub(crate) fn add_flow_stats(
    stats: &mut HashMap<FlowKey, FlowStats>,
    segment: &TcpSegment<'_>,
    messages: u64,
    anomalies: u64,
) {
    let entry = stats.entry(FlowKey::of(segment)).or_default();
    entry.segments += 1;
    entry.bytes += segment.payload.len() as u64;
    entry.messages += messages;
    entry.anomalies += anomalies;
}

pub(crate) fn build_flow_summaries(
    stats: HashMap<FlowKey, FlowStats>,
    duration_s: Option<f64>,
) -> Vec<FlowSummary> {
    let mut flows: Vec<FlowSummary> = stats
        .into_iter()
        .map(|(key, stats)| {
            let (mps, bps) = duration_s
                .map(|d| (stats.messages as f64 / d, stats.bytes as f64 / d))
                .map(|(mps, bps)| (Some(mps), Some(bps)))
                .unwrap_or((None, None));

            FlowSummary {
                app_proto: "openflow".to_string(),
                src: format_endpoint(key.src_ip, key.src_port),
                dst: format_endpoint(key.dst_ip, key.dst_port),
                segments: stats.segments,
                bytes: stats.bytes,
                messages: stats.messages,
                anomalies: stats.anomalies,
                mps,
                bps,
            }
        })
        .collect();

    flows.sort_by(|a, b| a.src.cmp(&b.src).then_with(|| a.dst.cmp(&b.dst)));
    flows
}

pub(crate) fn format_endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(addr) => format!("{}:{}", addr, port),
        IpAddr::V6(addr) => format!("[{}]:{}", addr, port),
    }
}

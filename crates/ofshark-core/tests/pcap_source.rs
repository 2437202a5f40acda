mod common;

use std::fs;

use ofshark_core::{PacketSource, PcapFileSource, SourceError};
use pcap_parser::Linktype;
use tempfile::TempDir;

use common::{barrier_request, to_controller, write_legacy_pcap, write_pcapng, write_pcapng_with_tsresol};

fn read_all(source: &mut PcapFileSource) -> Vec<ofshark_core::PacketEvent> {
    let mut events = Vec::new();
    while let Some(event) = source.next_packet().unwrap() {
        events.push(event);
    }
    events
}

#[test]
fn pcapng_source_reads_packets_in_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("capture.pcapng");
    let frame = to_controller(&barrier_request(1));
    write_pcapng(&path, &[(1_000_000, frame.clone()), (2_500_000, frame.clone())]);

    let mut source = PcapFileSource::open(&path).unwrap();
    let events = read_all(&mut source);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].linktype, Linktype::ETHERNET);
    assert_eq!(events[0].data, frame);
    assert!((events[0].ts.unwrap() - 1.0).abs() < 1e-9);
    assert!((events[1].ts.unwrap() - 2.5).abs() < 1e-9);
}

#[test]
fn pcapng_source_honours_interface_resolution() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nanos.pcapng");
    let frame = to_controller(&barrier_request(7));
    write_pcapng_with_tsresol(&path, Some(9), &[(3_250_000_000, frame)]);

    let mut source = PcapFileSource::open(&path).unwrap();
    let events = read_all(&mut source);

    assert_eq!(events.len(), 1);
    assert!((events[0].ts.unwrap() - 3.25).abs() < 1e-9);
}

#[test]
fn legacy_pcap_microsecond_and_nanosecond() {
    let temp = TempDir::new().unwrap();
    let frame = to_controller(&barrier_request(2));

    let micro = temp.path().join("micro.pcap");
    write_legacy_pcap(&micro, false, &[(10, 250_000, frame.clone())]);
    let events = read_all(&mut PcapFileSource::open(&micro).unwrap());
    assert_eq!(events.len(), 1);
    assert!((events[0].ts.unwrap() - 10.25).abs() < 1e-9);

    let nano = temp.path().join("nano.pcap");
    write_legacy_pcap(&nano, true, &[(10, 250_000_000, frame.clone())]);
    let events = read_all(&mut PcapFileSource::open(&nano).unwrap());
    assert_eq!(events.len(), 1);
    assert!((events[0].ts.unwrap() - 10.25).abs() < 1e-9);
    assert_eq!(events[0].data, frame);
}

#[test]
fn pcap_source_rejects_truncated_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("truncated.pcapng");

    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();
    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };

    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn pcap_source_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = PcapFileSource::open(&temp.path().join("missing.pcap")).err();
    assert!(matches!(err, Some(SourceError::Io(_))));
}

use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapNGReader, traits::PcapReaderIterator,
};

use tracing::debug;

use crate::source::{PacketEvent, PacketSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    InterfaceInfo, interface_info, is_nanosecond_magic, is_pcapng_magic, legacy_ts_to_seconds,
    pcapng_ts_to_seconds, read_magic_and_rewind,
};

/// Packet source over a PCAP or PCAPNG file, chosen by the file magic.

pub struct PcapFileSource {
    inner: PcapReader,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
        nanosecond: bool,
    },
    Ng {
        reader: PcapNGReader<File>,
        interfaces: Vec<InterfaceInfo>,
    },
}

impl PcapFileSource {
    /// Open a capture file.
    ///
    /// # Errors
    /// Returns `SourceError` when the file cannot be opened or its header is invalid.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        let inner = create_reader(file).map_err(SourceError::from)?;
        Ok(Self { inner })
    }
}

impl PacketSource for PcapFileSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        next_packet(&mut self.inner).map_err(SourceError::from)
    }
}

fn create_reader(file: File) -> Result<PcapReader, PcapSourceError> {
    let mut file = file;
    let magic = read_magic_and_rewind(&mut file)?;

    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
            PcapSourceError::Pcap {
                context: "pcapng reader init",
                message: e.to_string(),
            }
        })?;
        Ok(PcapReader::Ng {
            reader,
            interfaces: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
            PcapSourceError::Pcap {
                context: "pcap reader init",
                message: e.to_string(),
            }
        })?;
        Ok(PcapReader::Legacy {
            reader,
            linktype: None,
            nanosecond: false,
        })
    }
}

fn next_packet(reader: &mut PcapReader) -> Result<Option<PacketEvent>, PcapSourceError> {
    loop {
        match reader {
            PcapReader::Legacy {
                reader,
                linktype,
                nanosecond,
            } => match reader.next() {
                Ok((offset, block)) => {
                    let event = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            *linktype = Some(header.network);
                            *nanosecond = is_nanosecond_magic(header.magic_number);
                            None
                        }
                        PcapBlockOwned::Legacy(packet) => {
                            let ts = legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec, *nanosecond);
                            let lt = linktype.unwrap_or(Linktype::ETHERNET);
                            Some(PacketEvent {
                                ts: Some(ts),
                                linktype: lt,
                                data: packet.data.to_vec(),
                            })
                        }
                        _ => None,
                    };
                    reader.consume(offset);
                    if event.is_some() {
                        return Ok(event);
                    }
                }
                Err(pcap_parser::PcapError::Eof) => return Ok(None),
                Err(pcap_parser::PcapError::Incomplete(_)) => {
                    reader.refill().map_err(|e| PcapSourceError::Pcap {
                        context: "pcap reader refill",
                        message: e.to_string(),
                    })?;
                }
                Err(e) => {
                    return Err(PcapSourceError::Pcap {
                        context: "pcap reader next",
                        message: e.to_string(),
                    });
                }
            },
            PcapReader::Ng { reader, interfaces } => match reader.next() {
                Ok((offset, block)) => {
                    let event = match block {
                        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                            interfaces.clear();
                            None
                        }
                        PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                            debug!(
                                interface = interfaces.len(),
                                linktype = intf.linktype.0,
                                tsresol = intf.if_tsresol,
                                "pcapng interface"
                            );
                            interfaces.push(InterfaceInfo {
                                linktype: intf.linktype,
                                tsresol: intf.if_tsresol,
                            });
                            None
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => {
                            let info = interface_info(interfaces, packet.if_id);
                            let ts = pcapng_ts_to_seconds(packet.ts_high, packet.ts_low, info.tsresol);
                            Some(PacketEvent {
                                ts: Some(ts),
                                linktype: info.linktype,
                                data: packet.data.to_vec(),
                            })
                        }
                        _ => None,
                    };
                    reader.consume(offset);
                    if event.is_some() {
                        return Ok(event);
                    }
                }
                Err(pcap_parser::PcapError::Eof) => return Ok(None),
                Err(pcap_parser::PcapError::Incomplete(_)) => {
                    reader.refill().map_err(|e| PcapSourceError::Pcap {
                        context: "pcapng reader refill",
                        message: e.to_string(),
                    })?;
                }
                Err(e) => {
                    return Err(PcapSourceError::Pcap {
                        context: "pcapng reader next",
                        message: e.to_string(),
                    });
                }
            },
        }
    }
}

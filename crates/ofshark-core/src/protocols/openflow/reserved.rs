//! Reserved sentinel values of identifier fields.
//!
//! Each field site that can carry a sentinel has one rule: the sub-range of
//! values set aside for sentinels and the names of the defined ones. Values
//! outside the sub-range are ordinary identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier field kinds whose value space reserves sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedSite {
    PortNo,
    GroupId,
    MeterId,
    TableId,
    QueueId,
    ControllerMaxLen,
    BufferId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentinelRange {
    /// Values strictly greater than the ordinary maximum.
    Above(u64),
    /// A single reserved value.
    Exactly(u64),
}

#[derive(Debug)]
struct ReservedRule {
    width: usize,
    range: SentinelRange,
    names: &'static [(u64, &'static str)],
}

static PORT_RULE: ReservedRule = ReservedRule {
    width: 4,
    range: SentinelRange::Above(0xffff_ff00),
    names: &[
        (0xffff_fff8, "IN_PORT"),
        (0xffff_fff9, "TABLE"),
        (0xffff_fffa, "NORMAL"),
        (0xffff_fffb, "FLOOD"),
        (0xffff_fffc, "ALL"),
        (0xffff_fffd, "CONTROLLER"),
        (0xffff_fffe, "LOCAL"),
        (0xffff_ffff, "ANY"),
    ],
};

static GROUP_RULE: ReservedRule = ReservedRule {
    width: 4,
    range: SentinelRange::Above(0xffff_ff00),
    names: &[(0xffff_fffc, "ALL"), (0xffff_ffff, "ANY")],
};

static METER_RULE: ReservedRule = ReservedRule {
    width: 4,
    range: SentinelRange::Above(0xffff_0000),
    names: &[
        (0xffff_fffd, "SLOWPATH"),
        (0xffff_fffe, "CONTROLLER"),
        (0xffff_ffff, "ALL"),
    ],
};

static TABLE_RULE: ReservedRule = ReservedRule {
    width: 1,
    range: SentinelRange::Above(0xfe),
    names: &[(0xff, "ALL")],
};

static QUEUE_RULE: ReservedRule = ReservedRule {
    width: 4,
    range: SentinelRange::Above(0xffff_fffe),
    names: &[(0xffff_ffff, "ALL")],
};

static CONTROLLER_MAX_LEN_RULE: ReservedRule = ReservedRule {
    width: 2,
    range: SentinelRange::Above(0xffe5),
    names: &[(0xffff, "NO_BUFFER")],
};

static BUFFER_ID_RULE: ReservedRule = ReservedRule {
    width: 4,
    range: SentinelRange::Exactly(0xffff_ffff),
    names: &[(0xffff_ffff, "NO_BUFFER")],
};

impl ReservedSite {
    fn rule(self) -> &'static ReservedRule {
        match self {
            ReservedSite::PortNo => &PORT_RULE,
            ReservedSite::GroupId => &GROUP_RULE,
            ReservedSite::MeterId => &METER_RULE,
            ReservedSite::TableId => &TABLE_RULE,
            ReservedSite::QueueId => &QUEUE_RULE,
            ReservedSite::ControllerMaxLen => &CONTROLLER_MAX_LEN_RULE,
            ReservedSite::BufferId => &BUFFER_ID_RULE,
        }
    }

    /// Wire width of the field in bytes.
    pub fn width(self) -> usize {
        self.rule().width
    }

    pub fn is_sentinel(self, value: u64) -> bool {
        match self.rule().range {
            SentinelRange::Above(max) => value > max,
            SentinelRange::Exactly(reserved) => value == reserved,
        }
    }

    pub fn interpret(self, value: u64) -> Rendering {
        if !self.is_sentinel(value) {
            return Rendering::Plain(value);
        }
        let name = self
            .rule()
            .names
            .iter()
            .find(|(code, _)| *code == value)
            .map(|(_, name)| *name);
        Rendering::Sentinel { value, name }
    }
}

/// Interpretation of an identifier value at a given site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    Plain(u64),
    Sentinel {
        value: u64,
        name: Option<&'static str>,
    },
}

impl Rendering {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Rendering::Sentinel { .. })
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendering::Plain(value) => write!(f, "{value}"),
            Rendering::Sentinel {
                name: Some(name), ..
            } => f.write_str(name),
            Rendering::Sentinel { value, name: None } => write!(f, "reserved({value:#x})"),
        }
    }
}

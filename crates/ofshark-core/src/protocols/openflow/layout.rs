//! OpenFlow 1.3 wire constants: header offsets, type codes, record sizes and
//! the name tables used for symbolic rendering.

/// `(value, name)` pairs used to render enumerations and flag bits.
pub type NameTable = &'static [(u64, &'static str)];

pub fn lookup_name(table: NameTable, value: u64) -> Option<&'static str> {
    table
        .iter()
        .find(|(code, _)| *code == value)
        .map(|(_, name)| *name)
}

/// Renders set bits of `value` as `A|B`; bits without a name are appended as
/// hex so no set bit is hidden.
pub fn render_flags(table: NameTable, value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut names = Vec::new();
    let mut unknown = value;
    for (bit, name) in table {
        if *bit != 0 && value & bit == *bit {
            names.push((*name).to_string());
            unknown &= !bit;
        }
    }
    if unknown != 0 {
        names.push(format!("{unknown:#x}"));
    }
    names.join("|")
}

pub const OFP_VERSION_1_3: u8 = 0x04;
/// Largest value the 16-bit header length can declare.
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;

pub const HEADER_LEN: usize = 8;
pub const VERSION_OFFSET: usize = 0;
pub const TYPE_OFFSET: usize = 1;
pub const LENGTH_OFFSET: usize = 2;
pub const XID_OFFSET: usize = 4;

pub const OFPT_HELLO: u8 = 0;
pub const OFPT_ERROR: u8 = 1;
pub const OFPT_ECHO_REQUEST: u8 = 2;
pub const OFPT_ECHO_REPLY: u8 = 3;
pub const OFPT_EXPERIMENTER: u8 = 4;
pub const OFPT_FEATURES_REQUEST: u8 = 5;
pub const OFPT_FEATURES_REPLY: u8 = 6;
pub const OFPT_GET_CONFIG_REQUEST: u8 = 7;
pub const OFPT_GET_CONFIG_REPLY: u8 = 8;
pub const OFPT_SET_CONFIG: u8 = 9;
pub const OFPT_PACKET_IN: u8 = 10;
pub const OFPT_FLOW_REMOVED: u8 = 11;
pub const OFPT_PORT_STATUS: u8 = 12;
pub const OFPT_PACKET_OUT: u8 = 13;
pub const OFPT_FLOW_MOD: u8 = 14;
pub const OFPT_GROUP_MOD: u8 = 15;
pub const OFPT_PORT_MOD: u8 = 16;
pub const OFPT_TABLE_MOD: u8 = 17;
pub const OFPT_MULTIPART_REQUEST: u8 = 18;
pub const OFPT_MULTIPART_REPLY: u8 = 19;
pub const OFPT_BARRIER_REQUEST: u8 = 20;
pub const OFPT_BARRIER_REPLY: u8 = 21;
pub const OFPT_QUEUE_GET_CONFIG_REQUEST: u8 = 22;
pub const OFPT_QUEUE_GET_CONFIG_REPLY: u8 = 23;
pub const OFPT_ROLE_REQUEST: u8 = 24;
pub const OFPT_ROLE_REPLY: u8 = 25;
pub const OFPT_GET_ASYNC_REQUEST: u8 = 26;
pub const OFPT_GET_ASYNC_REPLY: u8 = 27;
pub const OFPT_SET_ASYNC: u8 = 28;
pub const OFPT_METER_MOD: u8 = 29;

pub const MESSAGE_TYPE_NAMES: NameTable = &[
    (0, "OFPT_HELLO"),
    (1, "OFPT_ERROR"),
    (2, "OFPT_ECHO_REQUEST"),
    (3, "OFPT_ECHO_REPLY"),
    (4, "OFPT_EXPERIMENTER"),
    (5, "OFPT_FEATURES_REQUEST"),
    (6, "OFPT_FEATURES_REPLY"),
    (7, "OFPT_GET_CONFIG_REQUEST"),
    (8, "OFPT_GET_CONFIG_REPLY"),
    (9, "OFPT_SET_CONFIG"),
    (10, "OFPT_PACKET_IN"),
    (11, "OFPT_FLOW_REMOVED"),
    (12, "OFPT_PORT_STATUS"),
    (13, "OFPT_PACKET_OUT"),
    (14, "OFPT_FLOW_MOD"),
    (15, "OFPT_GROUP_MOD"),
    (16, "OFPT_PORT_MOD"),
    (17, "OFPT_TABLE_MOD"),
    (18, "OFPT_MULTIPART_REQUEST"),
    (19, "OFPT_MULTIPART_REPLY"),
    (20, "OFPT_BARRIER_REQUEST"),
    (21, "OFPT_BARRIER_REPLY"),
    (22, "OFPT_QUEUE_GET_CONFIG_REQUEST"),
    (23, "OFPT_QUEUE_GET_CONFIG_REPLY"),
    (24, "OFPT_ROLE_REQUEST"),
    (25, "OFPT_ROLE_REPLY"),
    (26, "OFPT_GET_ASYNC_REQUEST"),
    (27, "OFPT_GET_ASYNC_REPLY"),
    (28, "OFPT_SET_ASYNC"),
    (29, "OFPT_METER_MOD"),
];

// Hello elements.
pub const OFPHET_VERSIONBITMAP: u16 = 1;
pub const HELLO_ELEMENT_TYPE_NAMES: NameTable = &[(1, "OFPHET_VERSIONBITMAP")];
pub const VERSION_BITMAP_NAMES: NameTable = &[
    (1 << 1, "1.0"),
    (1 << 2, "1.1"),
    (1 << 3, "1.2"),
    (1 << 4, "1.3"),
    (1 << 5, "1.4"),
    (1 << 6, "1.5"),
];

// Errors.
pub const OFPET_EXPERIMENTER: u16 = 0xffff;
pub const ERROR_TYPE_NAMES: NameTable = &[
    (0, "OFPET_HELLO_FAILED"),
    (1, "OFPET_BAD_REQUEST"),
    (2, "OFPET_BAD_ACTION"),
    (3, "OFPET_BAD_INSTRUCTION"),
    (4, "OFPET_BAD_MATCH"),
    (5, "OFPET_FLOW_MOD_FAILED"),
    (6, "OFPET_GROUP_MOD_FAILED"),
    (7, "OFPET_PORT_MOD_FAILED"),
    (8, "OFPET_TABLE_MOD_FAILED"),
    (9, "OFPET_QUEUE_OP_FAILED"),
    (10, "OFPET_SWITCH_CONFIG_FAILED"),
    (11, "OFPET_ROLE_REQUEST_FAILED"),
    (12, "OFPET_METER_MOD_FAILED"),
    (13, "OFPET_TABLE_FEATURES_FAILED"),
    (0xffff, "OFPET_EXPERIMENTER"),
];

pub const CAPABILITY_NAMES: NameTable = &[
    (1 << 0, "FLOW_STATS"),
    (1 << 1, "TABLE_STATS"),
    (1 << 2, "PORT_STATS"),
    (1 << 3, "GROUP_STATS"),
    (1 << 5, "IP_REASM"),
    (1 << 6, "QUEUE_STATS"),
    (1 << 8, "PORT_BLOCKED"),
];

pub const CONFIG_FLAG_NAMES: NameTable = &[
    (0, "OFPC_FRAG_NORMAL"),
    (1, "OFPC_FRAG_DROP"),
    (2, "OFPC_FRAG_REASM"),
];

pub const PACKET_IN_REASON_NAMES: NameTable = &[
    (0, "OFPR_NO_MATCH"),
    (1, "OFPR_ACTION"),
    (2, "OFPR_INVALID_TTL"),
];

pub const FLOW_REMOVED_REASON_NAMES: NameTable = &[
    (0, "OFPRR_IDLE_TIMEOUT"),
    (1, "OFPRR_HARD_TIMEOUT"),
    (2, "OFPRR_DELETE"),
    (3, "OFPRR_GROUP_DELETE"),
];

pub const PORT_REASON_NAMES: NameTable = &[
    (0, "OFPPR_ADD"),
    (1, "OFPPR_DELETE"),
    (2, "OFPPR_MODIFY"),
];

pub const FLOW_MOD_COMMAND_NAMES: NameTable = &[
    (0, "OFPFC_ADD"),
    (1, "OFPFC_MODIFY"),
    (2, "OFPFC_MODIFY_STRICT"),
    (3, "OFPFC_DELETE"),
    (4, "OFPFC_DELETE_STRICT"),
];

pub const FLOW_MOD_FLAG_NAMES: NameTable = &[
    (1 << 0, "SEND_FLOW_REM"),
    (1 << 1, "CHECK_OVERLAP"),
    (1 << 2, "RESET_COUNTS"),
    (1 << 3, "NO_PKT_COUNTS"),
    (1 << 4, "NO_BYT_COUNTS"),
];

pub const GROUP_MOD_COMMAND_NAMES: NameTable = &[
    (0, "OFPGC_ADD"),
    (1, "OFPGC_MODIFY"),
    (2, "OFPGC_DELETE"),
];

pub const GROUP_TYPE_NAMES: NameTable = &[
    (0, "OFPGT_ALL"),
    (1, "OFPGT_SELECT"),
    (2, "OFPGT_INDIRECT"),
    (3, "OFPGT_FF"),
];

pub const PORT_CONFIG_NAMES: NameTable = &[
    (1 << 0, "PORT_DOWN"),
    (1 << 2, "NO_RECV"),
    (1 << 5, "NO_FWD"),
    (1 << 6, "NO_PACKET_IN"),
];

pub const PORT_STATE_NAMES: NameTable = &[
    (1 << 0, "LINK_DOWN"),
    (1 << 1, "BLOCKED"),
    (1 << 2, "LIVE"),
];

pub const PORT_FEATURE_NAMES: NameTable = &[
    (1 << 0, "10MB_HD"),
    (1 << 1, "10MB_FD"),
    (1 << 2, "100MB_HD"),
    (1 << 3, "100MB_FD"),
    (1 << 4, "1GB_HD"),
    (1 << 5, "1GB_FD"),
    (1 << 6, "10GB_FD"),
    (1 << 7, "40GB_FD"),
    (1 << 8, "100GB_FD"),
    (1 << 9, "1TB_FD"),
    (1 << 10, "OTHER"),
    (1 << 11, "COPPER"),
    (1 << 12, "FIBER"),
    (1 << 13, "AUTONEG"),
    (1 << 14, "PAUSE"),
    (1 << 15, "PAUSE_ASYM"),
];

pub const CONTROLLER_ROLE_NAMES: NameTable = &[
    (0, "OFPCR_ROLE_NOCHANGE"),
    (1, "OFPCR_ROLE_EQUAL"),
    (2, "OFPCR_ROLE_MASTER"),
    (3, "OFPCR_ROLE_SLAVE"),
];

pub const METER_MOD_COMMAND_NAMES: NameTable = &[
    (0, "OFPMC_ADD"),
    (1, "OFPMC_MODIFY"),
    (2, "OFPMC_DELETE"),
];

pub const METER_FLAG_NAMES: NameTable = &[
    (1 << 0, "KBPS"),
    (1 << 1, "PKTPS"),
    (1 << 2, "BURST"),
    (1 << 3, "STATS"),
];

// Match.
pub const OFPMT_STANDARD: u16 = 0;
pub const OFPMT_OXM: u16 = 1;
pub const MATCH_TYPE_NAMES: NameTable = &[(0, "OFPMT_STANDARD"), (1, "OFPMT_OXM")];
pub const MATCH_HEADER_LEN: usize = 4;

// OXM.
pub const OXM_HEADER_LEN: usize = 4;
pub const OXM_EXPERIMENTER_ID_LEN: usize = 4;
pub const OFPXMC_NXM_0: u16 = 0x0000;
pub const OFPXMC_NXM_1: u16 = 0x0001;
pub const OFPXMC_OPENFLOW_BASIC: u16 = 0x8000;
pub const OFPXMC_EXPERIMENTER: u16 = 0xffff;
pub const OXM_CLASS_NAMES: NameTable = &[
    (0x0000, "OFPXMC_NXM_0"),
    (0x0001, "OFPXMC_NXM_1"),
    (0x8000, "OFPXMC_OPENFLOW_BASIC"),
    (0xffff, "OFPXMC_EXPERIMENTER"),
];
/// VLAN_VID bit telling that a VLAN tag is present.
pub const OFPVID_PRESENT: u64 = 0x1000;

// Actions.
pub const OFPAT_OUTPUT: u16 = 0;
pub const OFPAT_COPY_TTL_OUT: u16 = 11;
pub const OFPAT_COPY_TTL_IN: u16 = 12;
pub const OFPAT_SET_MPLS_TTL: u16 = 15;
pub const OFPAT_DEC_MPLS_TTL: u16 = 16;
pub const OFPAT_PUSH_VLAN: u16 = 17;
pub const OFPAT_POP_VLAN: u16 = 18;
pub const OFPAT_PUSH_MPLS: u16 = 19;
pub const OFPAT_POP_MPLS: u16 = 20;
pub const OFPAT_SET_QUEUE: u16 = 21;
pub const OFPAT_GROUP: u16 = 22;
pub const OFPAT_SET_NW_TTL: u16 = 23;
pub const OFPAT_DEC_NW_TTL: u16 = 24;
pub const OFPAT_SET_FIELD: u16 = 25;
pub const OFPAT_PUSH_PBB: u16 = 26;
pub const OFPAT_POP_PBB: u16 = 27;
pub const OFPAT_EXPERIMENTER: u16 = 0xffff;
pub const ACTION_TYPE_NAMES: NameTable = &[
    (0, "OFPAT_OUTPUT"),
    (11, "OFPAT_COPY_TTL_OUT"),
    (12, "OFPAT_COPY_TTL_IN"),
    (15, "OFPAT_SET_MPLS_TTL"),
    (16, "OFPAT_DEC_MPLS_TTL"),
    (17, "OFPAT_PUSH_VLAN"),
    (18, "OFPAT_POP_VLAN"),
    (19, "OFPAT_PUSH_MPLS"),
    (20, "OFPAT_POP_MPLS"),
    (21, "OFPAT_SET_QUEUE"),
    (22, "OFPAT_GROUP"),
    (23, "OFPAT_SET_NW_TTL"),
    (24, "OFPAT_DEC_NW_TTL"),
    (25, "OFPAT_SET_FIELD"),
    (26, "OFPAT_PUSH_PBB"),
    (27, "OFPAT_POP_PBB"),
    (0xffff, "OFPAT_EXPERIMENTER"),
];
pub const ACTION_HEADER_LEN: usize = 4;
pub const ACTION_MIN_LEN: usize = 8;
pub const ACTION_OUTPUT_LEN: usize = 16;

// Instructions.
pub const OFPIT_GOTO_TABLE: u16 = 1;
pub const OFPIT_WRITE_METADATA: u16 = 2;
pub const OFPIT_WRITE_ACTIONS: u16 = 3;
pub const OFPIT_APPLY_ACTIONS: u16 = 4;
pub const OFPIT_CLEAR_ACTIONS: u16 = 5;
pub const OFPIT_METER: u16 = 6;
pub const OFPIT_EXPERIMENTER: u16 = 0xffff;
pub const INSTRUCTION_TYPE_NAMES: NameTable = &[
    (1, "OFPIT_GOTO_TABLE"),
    (2, "OFPIT_WRITE_METADATA"),
    (3, "OFPIT_WRITE_ACTIONS"),
    (4, "OFPIT_APPLY_ACTIONS"),
    (5, "OFPIT_CLEAR_ACTIONS"),
    (6, "OFPIT_METER"),
    (0xffff, "OFPIT_EXPERIMENTER"),
];
pub const INSTRUCTION_HEADER_LEN: usize = 4;
pub const INSTRUCTION_MIN_LEN: usize = 8;
pub const INSTRUCTION_WRITE_METADATA_LEN: usize = 24;

// Groups.
pub const BUCKET_MIN_LEN: usize = 16;
pub const BUCKET_COUNTER_LEN: usize = 16;
pub const GROUP_STATS_MIN_LEN: usize = 40;
pub const GROUP_DESC_MIN_LEN: usize = 8;

// Meters.
pub const OFPMBT_DROP: u16 = 1;
pub const OFPMBT_DSCP_REMARK: u16 = 2;
pub const OFPMBT_EXPERIMENTER: u16 = 0xffff;
pub const METER_BAND_TYPE_NAMES: NameTable = &[
    (1, "OFPMBT_DROP"),
    (2, "OFPMBT_DSCP_REMARK"),
    (0xffff, "OFPMBT_EXPERIMENTER"),
];
pub const METER_BAND_HEADER_LEN: usize = 4;
pub const METER_BAND_LEN: usize = 16;
pub const METER_BAND_STATS_LEN: usize = 16;
pub const METER_STATS_MIN_LEN: usize = 40;
pub const METER_CONFIG_MIN_LEN: usize = 8;

// Queues.
pub const OFPQT_MIN_RATE: u16 = 1;
pub const OFPQT_MAX_RATE: u16 = 2;
pub const OFPQT_EXPERIMENTER: u16 = 0xffff;
pub const QUEUE_PROPERTY_NAMES: NameTable = &[
    (1, "OFPQT_MIN_RATE"),
    (2, "OFPQT_MAX_RATE"),
    (0xffff, "OFPQT_EXPERIMENTER"),
];
pub const PACKET_QUEUE_HEADER_LEN: usize = 10;
pub const PACKET_QUEUE_MIN_LEN: usize = 16;
pub const QUEUE_PROPERTY_HEADER_LEN: usize = 4;
pub const QUEUE_PROPERTY_MIN_LEN: usize = 8;
pub const QUEUE_PROPERTY_RATE_LEN: usize = 16;
pub const QUEUE_STATS_LEN: usize = 40;

// Ports.
pub const PORT_LEN: usize = 64;
pub const PORT_STATS_LEN: usize = 112;
pub const PORT_NAME_LEN: usize = 16;

// Multipart.
pub const OFPMP_DESC: u16 = 0;
pub const OFPMP_FLOW: u16 = 1;
pub const OFPMP_AGGREGATE: u16 = 2;
pub const OFPMP_TABLE: u16 = 3;
pub const OFPMP_PORT_STATS: u16 = 4;
pub const OFPMP_QUEUE: u16 = 5;
pub const OFPMP_GROUP: u16 = 6;
pub const OFPMP_GROUP_DESC: u16 = 7;
pub const OFPMP_GROUP_FEATURES: u16 = 8;
pub const OFPMP_METER: u16 = 9;
pub const OFPMP_METER_CONFIG: u16 = 10;
pub const OFPMP_METER_FEATURES: u16 = 11;
pub const OFPMP_TABLE_FEATURES: u16 = 12;
pub const OFPMP_PORT_DESC: u16 = 13;
pub const OFPMP_EXPERIMENTER: u16 = 0xffff;
pub const MULTIPART_TYPE_NAMES: NameTable = &[
    (0, "OFPMP_DESC"),
    (1, "OFPMP_FLOW"),
    (2, "OFPMP_AGGREGATE"),
    (3, "OFPMP_TABLE"),
    (4, "OFPMP_PORT_STATS"),
    (5, "OFPMP_QUEUE"),
    (6, "OFPMP_GROUP"),
    (7, "OFPMP_GROUP_DESC"),
    (8, "OFPMP_GROUP_FEATURES"),
    (9, "OFPMP_METER"),
    (10, "OFPMP_METER_CONFIG"),
    (11, "OFPMP_METER_FEATURES"),
    (12, "OFPMP_TABLE_FEATURES"),
    (13, "OFPMP_PORT_DESC"),
    (0xffff, "OFPMP_EXPERIMENTER"),
];
pub const MULTIPART_REQUEST_FLAG_NAMES: NameTable = &[(1, "REQ_MORE")];
pub const MULTIPART_REPLY_FLAG_NAMES: NameTable = &[(1, "REPLY_MORE")];
pub const DESC_STR_LEN: usize = 256;
pub const SERIAL_NUM_LEN: usize = 32;
pub const FLOW_STATS_MIN_LEN: usize = 56;
pub const TABLE_STATS_LEN: usize = 24;

// Table features.
pub const OFP_MAX_TABLE_NAME_LEN: usize = 32;
pub const TABLE_FEATURES_MIN_LEN: usize = 64;
pub const TABLE_FEATURE_PROP_HEADER_LEN: usize = 4;
pub const OFPTFPT_INSTRUCTIONS: u16 = 0;
pub const OFPTFPT_INSTRUCTIONS_MISS: u16 = 1;
pub const OFPTFPT_NEXT_TABLES: u16 = 2;
pub const OFPTFPT_NEXT_TABLES_MISS: u16 = 3;
pub const OFPTFPT_WRITE_ACTIONS: u16 = 4;
pub const OFPTFPT_WRITE_ACTIONS_MISS: u16 = 5;
pub const OFPTFPT_APPLY_ACTIONS: u16 = 6;
pub const OFPTFPT_APPLY_ACTIONS_MISS: u16 = 7;
pub const OFPTFPT_MATCH: u16 = 8;
pub const OFPTFPT_WILDCARDS: u16 = 10;
pub const OFPTFPT_WRITE_SETFIELD: u16 = 12;
pub const OFPTFPT_WRITE_SETFIELD_MISS: u16 = 13;
pub const OFPTFPT_APPLY_SETFIELD: u16 = 14;
pub const OFPTFPT_APPLY_SETFIELD_MISS: u16 = 15;
pub const OFPTFPT_EXPERIMENTER: u16 = 0xfffe;
pub const OFPTFPT_EXPERIMENTER_MISS: u16 = 0xffff;
pub const TABLE_FEATURE_PROP_NAMES: NameTable = &[
    (0, "OFPTFPT_INSTRUCTIONS"),
    (1, "OFPTFPT_INSTRUCTIONS_MISS"),
    (2, "OFPTFPT_NEXT_TABLES"),
    (3, "OFPTFPT_NEXT_TABLES_MISS"),
    (4, "OFPTFPT_WRITE_ACTIONS"),
    (5, "OFPTFPT_WRITE_ACTIONS_MISS"),
    (6, "OFPTFPT_APPLY_ACTIONS"),
    (7, "OFPTFPT_APPLY_ACTIONS_MISS"),
    (8, "OFPTFPT_MATCH"),
    (10, "OFPTFPT_WILDCARDS"),
    (12, "OFPTFPT_WRITE_SETFIELD"),
    (13, "OFPTFPT_WRITE_SETFIELD_MISS"),
    (14, "OFPTFPT_APPLY_SETFIELD"),
    (15, "OFPTFPT_APPLY_SETFIELD_MISS"),
    (0xfffe, "OFPTFPT_EXPERIMENTER"),
    (0xffff, "OFPTFPT_EXPERIMENTER_MISS"),
];

use std::collections::HashMap;

use crate::AnomalySummary;
use crate::protocols::openflow::AnomalyKind;

const MAX_EXAMPLES: usize = 3;

pub(crate) const DECODE_ERROR_ID: &str = "OF-DECODE-ERROR";

/// Stable report identifier, severity and description for each anomaly kind.
fn describe(kind: AnomalyKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        AnomalyKind::StructuralOverrun => (
            "OF-STRUCTURAL-OVERRUN",
            "error",
            "declared length runs past the available bytes",
        ),
        AnomalyKind::InconsistentLength => (
            "OF-INCONSISTENT-LENGTH",
            "error",
            "declared length contradicts the record layout",
        ),
        AnomalyKind::UnknownVariant => (
            "OF-UNKNOWN-VARIANT",
            "warning",
            "type tag without a registered decoder",
        ),
        AnomalyKind::UndecodedResidue => (
            "OF-UNDECODED-RESIDUE",
            "warning",
            "record bytes left undecoded",
        ),
    }
}

fn severity_rank(severity: &str) -> u8 {
    match severity {
        "error" => 0,
        "warning" => 1,
        _ => 2,
    }
}

#[derive(Debug)]
struct TallyEntry {
    severity: &'static str,
    message: &'static str,
    count: u64,
    examples: Vec<String>,
}

/// Counts anomalies across a capture, keeping the first few contexts of each.
#[derive(Debug, Default)]
pub(crate) struct AnomalyTally {
    entries: HashMap<&'static str, TallyEntry>,
}

impl AnomalyTally {
    pub(crate) fn record(&mut self, kind: AnomalyKind, context: impl FnOnce() -> String) {
        let (id, severity, message) = describe(kind);
        self.push(id, severity, message, context);
    }

    pub(crate) fn record_decode_error(&mut self, context: impl FnOnce() -> String) {
        self.push(
            DECODE_ERROR_ID,
            "error",
            "message could not be decoded",
            context,
        );
    }

    pub(crate) fn total(&self) -> u64 {
        self.entries.values().map(|entry| entry.count).sum()
    }

    fn push(
        &mut self,
        id: &'static str,
        severity: &'static str,
        message: &'static str,
        context: impl FnOnce() -> String,
    ) {
        let entry = self.entries.entry(id).or_insert(TallyEntry {
            severity,
            message,
            count: 0,
            examples: Vec::new(),
        });
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(context());
        }
    }

    pub(crate) fn into_summaries(self) -> Vec<AnomalySummary> {
        let mut summaries: Vec<AnomalySummary> = self
            .entries
            .into_iter()
            .map(|(id, entry)| AnomalySummary {
                id: id.to_string(),
                severity: entry.severity.to_string(),
                message: entry.message.to_string(),
                count: entry.count,
                examples: entry.examples,
            })
            .collect();
        summaries.sort_by(|a, b| {
            severity_rank(&a.severity)
                .cmp(&severity_rank(&b.severity))
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }
}

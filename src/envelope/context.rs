use crate::x12::Segment;

/// Opening ISA segment of an interchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterchangeHeader {
    pub isa: Segment,
}

impl InterchangeHeader {
    /// ISA13
    pub fn control_number(&self) -> &str {
        self.isa.element(13).unwrap_or("")
    }

    /// ISA06, trailing padding removed
    pub fn sender_id(&self) -> &str {
        self.isa.element(6).unwrap_or("").trim()
    }

    /// ISA08, trailing padding removed
    pub fn receiver_id(&self) -> &str {
        self.isa.element(8).unwrap_or("").trim()
    }
}

/// Opening GS segment of a functional group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHeader {
    pub gs: Segment,
}

impl GroupHeader {
    /// GS01 (e.g. `HC` for 837, `HP` for 835)
    pub fn functional_id(&self) -> &str {
        self.gs.element(1).unwrap_or("")
    }

    /// GS06
    pub fn control_number(&self) -> &str {
        self.gs.element(6).unwrap_or("")
    }
}

/// A closed ST/SE pair with everything in between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSet {
    pub header: Segment,
    pub body: Vec<Segment>,
    pub trailer: Segment,
}

impl TransactionSet {
    /// ST01 (e.g. `835`, `837`)
    pub fn identifier(&self) -> &str {
        self.header.element(1).unwrap_or("")
    }

    /// ST02
    pub fn control_number(&self) -> &str {
        self.header.element(2).unwrap_or("")
    }

    /// Segment count as carried by SE01: body plus ST and SE
    pub fn segment_count(&self) -> usize {
        self.body.len() + 2
    }
}

/// A transaction set together with the envelopes it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTransaction {
    pub interchange: InterchangeHeader,
    pub group: GroupHeader,
    pub transaction: TransactionSet,
}

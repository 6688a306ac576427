use crate::envelope::TransactionSet;
use crate::x12::{self, Delimiters, Segment};

/// A self-contained interchange wrapping exactly one transaction set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitUnit {
    /// Number assigned to ISA13, GS06 and ST02 of this unit
    pub control_number: u64,
    /// Delimiters of the source file, reused on output
    pub delimiters: Delimiters,
    pub isa: Segment,
    pub gs: Segment,
    pub transaction: TransactionSet,
    pub ge: Segment,
    pub iea: Segment,
}

impl SplitUnit {
    /// ST01 of the wrapped transaction set
    pub fn transaction_id(&self) -> &str {
        self.transaction.identifier()
    }

    /// All segments in wire order, ISA through IEA
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        [&self.isa, &self.gs, &self.transaction.header]
            .into_iter()
            .chain(self.transaction.body.iter())
            .chain([&self.transaction.trailer, &self.ge, &self.iea])
    }

    pub fn segment_count(&self) -> usize {
        self.transaction.segment_count() + 4
    }

    /// Serialize with the source delimiters
    pub fn render(&self, line_breaks: bool) -> String {
        x12::render(self.segments(), &self.delimiters, line_breaks)
    }
}

//! ISA/GS/ST envelope state machine.
//!
//! The tracker is fed one segment at a time. It validates nesting, closing
//! control numbers and counts, and hands back every transaction set as soon as
//! its SE segment closes it.

mod context;
mod error;


pub use context::{CompletedTransaction, GroupHeader, InterchangeHeader, TransactionSet};
pub use error::EnvelopeError;

use crate::x12::Segment;
use log::warn;

struct OpenInterchange {
    header: InterchangeHeader,
    groups_closed: usize,
}

struct OpenGroup {
    header: GroupHeader,
    transactions_closed: usize,
}

struct OpenTransaction {
    header: Segment,
    body: Vec<Segment>,
}

/// Tracks the currently open interchange, group and transaction set
#[derive(Default)]
pub struct EnvelopeTracker {
    interchange: Option<OpenInterchange>,
    group: Option<OpenGroup>,
    transaction: Option<OpenTransaction>,
    position: usize,
    transactions_completed: usize,
}

impl EnvelopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transaction sets closed so far
    pub fn transactions_completed(&self) -> usize {
        self.transactions_completed
    }

    /// Consume one segment
    ///
    /// Returns the completed transaction set when `segment` is a valid SE.
    pub fn feed(
        &mut self,
        segment: Segment,
    ) -> Result<Option<CompletedTransaction>, EnvelopeError> {
        self.position += 1;

        if self.transaction.is_some() {
            return match segment.tag() {
                "SE" => self.close_transaction(segment).map(Some),
                "ISA" | "IEA" | "GS" | "GE" | "ST" => Err(self.unexpected(&segment)),
                _ => {
                    if let Some(open) = self.transaction.as_mut() {
                        open.body.push(segment);
                    }
                    Ok(None)
                }
            };
        }

        match segment.tag() {
            "ISA" if self.interchange.is_none() => self.open_interchange(segment)?,
            "GS" if self.interchange.is_some() && self.group.is_none() => {
                self.open_group(segment)?
            }
            "ST" if self.group.is_some() => self.open_transaction(segment)?,
            "GE" if self.group.is_some() => self.close_group(&segment)?,
            "IEA" if self.interchange.is_some() && self.group.is_none() => {
                self.close_interchange(&segment)?
            }
            _ => return Err(self.unexpected(&segment)),
        }
        Ok(None)
    }

    /// Signal end of input; fails if any envelope is still open
    pub fn finish(self) -> Result<(), EnvelopeError> {
        if let Some(open) = &self.transaction {
            return Err(EnvelopeError::Unterminated {
                level: "transaction set".to_string(),
                control_number: open.header.element(2).unwrap_or("").to_string(),
            });
        }
        if let Some(open) = &self.group {
            return Err(EnvelopeError::Unterminated {
                level: "functional group".to_string(),
                control_number: open.header.control_number().to_string(),
            });
        }
        if let Some(open) = &self.interchange {
            return Err(EnvelopeError::Unterminated {
                level: "interchange".to_string(),
                control_number: open.header.control_number().to_string(),
            });
        }
        Ok(())
    }

    fn open_interchange(&mut self, isa: Segment) -> Result<(), EnvelopeError> {
        self.require(&isa, 13)?;
        self.interchange = Some(OpenInterchange {
            header: InterchangeHeader { isa },
            groups_closed: 0,
        });
        Ok(())
    }

    fn open_group(&mut self, gs: Segment) -> Result<(), EnvelopeError> {
        self.require(&gs, 1)?;
        self.require(&gs, 6)?;
        self.group = Some(OpenGroup {
            header: GroupHeader { gs },
            transactions_closed: 0,
        });
        Ok(())
    }

    fn open_transaction(&mut self, st: Segment) -> Result<(), EnvelopeError> {
        self.require(&st, 1)?;
        self.require(&st, 2)?;
        self.transaction = Some(OpenTransaction {
            header: st,
            body: Vec::new(),
        });
        Ok(())
    }

    fn close_transaction(&mut self, se: Segment) -> Result<CompletedTransaction, EnvelopeError> {
        let actual = self.require(&se, 2)?.to_string();
        let (Some(interchange), Some(group), Some(open)) =
            (&self.interchange, &mut self.group, self.transaction.take())
        else {
            return Err(self.unexpected(&se));
        };

        let expected = open.header.element(2).unwrap_or("");
        if !control_numbers_match(expected, &actual) {
            return Err(EnvelopeError::ControlNumberMismatch {
                tag: "SE".to_string(),
                position: self.position,
                expected: expected.to_string(),
                actual,
            });
        }

        let transaction = TransactionSet {
            header: open.header,
            body: open.body,
            trailer: se,
        };
        if let Some(declared) = transaction.trailer.element(1) {
            if declared.trim().parse::<usize>().ok() != Some(transaction.segment_count()) {
                warn!(
                    "SE01 of transaction {} declares {} segments, found {}",
                    transaction.control_number(),
                    declared,
                    transaction.segment_count()
                );
            }
        }

        group.transactions_closed += 1;
        self.transactions_completed += 1;

        Ok(CompletedTransaction {
            interchange: interchange.header.clone(),
            group: group.header.clone(),
            transaction,
        })
    }

    fn close_group(&mut self, ge: &Segment) -> Result<(), EnvelopeError> {
        let count = self.require(ge, 1)?;
        let control = self.require(ge, 2)?;
        let Some(open) = &self.group else {
            return Err(self.unexpected(ge));
        };

        self.check_count(ge, open.transactions_closed, count)?;
        self.check_control(ge, open.header.control_number(), control)?;

        self.group = None;
        if let Some(interchange) = self.interchange.as_mut() {
            interchange.groups_closed += 1;
        }
        Ok(())
    }

    fn close_interchange(&mut self, iea: &Segment) -> Result<(), EnvelopeError> {
        let count = self.require(iea, 1)?;
        let control = self.require(iea, 2)?;
        let Some(open) = &self.interchange else {
            return Err(self.unexpected(iea));
        };

        self.check_count(iea, open.groups_closed, count)?;
        self.check_control(iea, open.header.control_number(), control)?;

        self.interchange = None;
        Ok(())
    }

    fn require<'s>(&self, segment: &'s Segment, index: usize) -> Result<&'s str, EnvelopeError> {
        match segment.element(index) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(EnvelopeError::MissingElement {
                tag: segment.tag().to_string(),
                index,
                position: self.position,
            }),
        }
    }

    fn check_count(
        &self,
        segment: &Segment,
        expected: usize,
        declared: &str,
    ) -> Result<(), EnvelopeError> {
        if declared.trim().parse::<usize>().ok() == Some(expected) {
            return Ok(());
        }
        Err(EnvelopeError::CountMismatch {
            tag: segment.tag().to_string(),
            position: self.position,
            expected,
            actual: declared.to_string(),
        })
    }

    fn check_control(
        &self,
        segment: &Segment,
        expected: &str,
        actual: &str,
    ) -> Result<(), EnvelopeError> {
        if control_numbers_match(expected, actual) {
            return Ok(());
        }
        Err(EnvelopeError::ControlNumberMismatch {
            tag: segment.tag().to_string(),
            position: self.position,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }

    fn unexpected(&self, segment: &Segment) -> EnvelopeError {
        let expected = if self.transaction.is_some() {
            "SE"
        } else if self.group.is_some() {
            "ST or GE"
        } else if self.interchange.is_some() {
            "GS or IEA"
        } else {
            "ISA"
        };
        EnvelopeError::UnexpectedSegment {
            tag: segment.tag().to_string(),
            position: self.position,
            expected: expected.to_string(),
        }
    }
}

/// Compare control numbers numerically when both are numeric (`0001` == `1`)
pub fn control_numbers_match(expected: &str, actual: &str) -> bool {
    let (expected, actual) = (expected.trim(), actual.trim());
    match (expected.parse::<u64>(), actual.parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => expected == actual,
    }
}

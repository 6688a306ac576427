//! Re-envelopes completed transaction sets into single-transaction interchanges.

mod control;
mod error;
mod unit;


pub use control::{ControlNumberSequence, MAX_CONTROL_NUMBER};
pub use error::SplitError;
pub use unit::SplitUnit;

use crate::envelope::{CompletedTransaction, TransactionSet};
use crate::x12::{Delimiters, Segment};

/// Build the split unit for one completed transaction set.
///
/// The parent ISA and GS are kept field for field (ids, qualifiers, dates,
/// version) except for their control numbers, which are replaced by a number
/// drawn from `sequence`. The trailers are regenerated:
/// - SE01 counts the body plus ST and SE, SE02 repeats ST02
/// - GE01 and IEA01 are both 1
/// - GE02 and IEA02 repeat GS06 and ISA13
pub fn split_transaction(
    completed: CompletedTransaction,
    delimiters: Delimiters,
    sequence: &mut ControlNumberSequence,
) -> Result<SplitUnit, SplitError> {
    let control_number = sequence.next_number()?;

    let interchange_control = format!("{:09}", control_number);
    let group_control = control_number.to_string();
    let transaction_control = format!("{:04}", control_number);

    let isa = completed
        .interchange
        .isa
        .with_element(13, interchange_control.as_str());
    let gs = completed.group.gs.with_element(6, group_control.as_str());

    let transaction = completed.transaction;
    let header = transaction
        .header
        .with_element(2, transaction_control.as_str());
    let body = transaction.body;
    let trailer = Segment::from_parts(
        "SE",
        [(body.len() + 2).to_string(), transaction_control],
    );

    Ok(SplitUnit {
        control_number,
        delimiters,
        isa,
        gs,
        transaction: TransactionSet {
            header,
            body,
            trailer,
        },
        ge: Segment::from_parts("GE", ["1".to_string(), group_control]),
        iea: Segment::from_parts("IEA", ["1".to_string(), interchange_control]),
    })
}

use crate::envelope::TransactionSet;
use serde::Serialize;
use std::fmt;

/// The provider a transaction set belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Client {
    pub id: String,
    pub name: String,
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Identify the client of a transaction set
///
/// - 835: payee from the first `N1*PE` (id N104, name N102)
/// - 837: billing provider from the first `NM1*85` when NM108 is `XX`
///   (id NM109, name NM103)
pub fn detect(transaction: &TransactionSet) -> Option<Client> {
    match transaction.identifier() {
        "835" => payee(transaction),
        "837" => billing_provider(transaction),
        _ => None,
    }
}

fn payee(transaction: &TransactionSet) -> Option<Client> {
    let n1 = transaction
        .body
        .iter()
        .find(|s| s.is("N1") && s.element(1) == Some("PE"))?;
    let id = n1.element(4).filter(|id| !id.trim().is_empty())?;
    Some(Client {
        id: id.trim().to_string(),
        name: n1.element(2).unwrap_or("").trim().to_string(),
    })
}

fn billing_provider(transaction: &TransactionSet) -> Option<Client> {
    let nm1 = transaction
        .body
        .iter()
        .find(|s| s.is("NM1") && s.element(1) == Some("85"))?;
    if nm1.element(8) != Some("XX") {
        return None;
    }
    let id = nm1.element(9).filter(|id| !id.trim().is_empty())?;
    Some(Client {
        id: id.trim().to_string(),
        name: nm1.element(3).unwrap_or("").trim().to_string(),
    })
}

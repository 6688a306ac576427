//! Builders for X12 fixtures shared by the unit tests.

/// ISA header with `*`, `:` and `~`, exactly 106 characters long
pub fn isa(control: u32) -> String {
    format!(
        "ISA*00*          *00*          *ZZ*SUBMITTER01    *ZZ*RECEIVER01     *240115*1030*^*00501*{:09}*0*P*:~",
        control
    )
}

/// One interchange holding one functional group of `kind` transactions
///
/// Each entry of `bodies` lists the segments between ST and SE.
pub fn interchange(control: u32, kind: &str, bodies: &[&[&str]]) -> String {
    let functional_id = if kind == "835" { "HP" } else { "HC" };
    let mut out = isa(control);
    out.push_str(&format!(
        "GS*{}*SUBMITTER01*RECEIVER01*20240115*1030*{}*X*005010X221A1~",
        functional_id, control
    ));
    for (i, body) in bodies.iter().enumerate() {
        let st_control = format!("{:04}", i + 1);
        out.push_str(&format!("ST*{}*{}~", kind, st_control));
        for segment in body.iter() {
            out.push_str(segment);
            out.push('~');
        }
        out.push_str(&format!("SE*{}*{}~", body.len() + 2, st_control));
    }
    out.push_str(&format!("GE*{}*{}~", bodies.len(), control));
    out.push_str(&format!("IEA*1*{:09}~", control));
    out
}

/// Three 835 remittances with distinct payees
pub fn three_remittances() -> String {
    interchange(
        101,
        "835",
        &[
            &["BPR*I*100*C*ACH", "N1*PR*PAYER ONE", "N1*PE*CLINIC A*XX*1111111111"],
            &["BPR*I*200*C*ACH", "N1*PR*PAYER ONE", "N1*PE*CLINIC B*XX*2222222222"],
            &["BPR*I*300*C*ACH", "N1*PR*PAYER ONE", "N1*PE*CLINIC A*XX*1111111111"],
        ],
    )
}

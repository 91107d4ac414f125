//! Document builders shared by integration tests

#![allow(dead_code)]

pub const NAMESPACE_PREFIX: &str = "urn:iso:std:iso:20022:tech:xsd:";

pub fn namespace(version_tag: &str) -> String {
    format!("{}pain.001.001.{}", NAMESPACE_PREFIX, &version_tag[1..])
}

/// One credit transfer
#[derive(Debug, Clone)]
pub struct Tx {
    pub end_to_end_id: String,
    pub amount: String,
    pub currency: String,
    pub creditor: String,
}

impl Tx {
    pub fn new(end_to_end_id: &str, amount: &str, currency: &str) -> Self {
        Self {
            end_to_end_id: end_to_end_id.to_string(),
            amount: amount.to_string(),
            currency: currency.to_string(),
            creditor: format!("Creditor {}", end_to_end_id),
        }
    }

    fn xml(&self, version_tag: &str) -> String {
        let agent = if version_tag == "003" { "BIC" } else { "BICFI" };
        format!(
            r#"
        <CdtTrfTxInf>
          <PmtId><InstrId>I-{id}</InstrId><EndToEndId>{id}</EndToEndId></PmtId>
          <Amt><InstdAmt Ccy="{ccy}">{amount}</InstdAmt></Amt>
          <CdtrAgt><FinInstnId><{agent}>BNPAFRPP</{agent}></FinInstnId></CdtrAgt>
          <Cdtr><Nm>{creditor}</Nm></Cdtr>
          <CdtrAcct><Id><IBAN>FR1420041010050500013M02606</IBAN></Id></CdtrAcct>
          <RmtInf><Ustrd>Invoice {id}</Ustrd></RmtInf>
        </CdtTrfTxInf>"#,
            id = self.end_to_end_id,
            ccy = self.currency,
            amount = self.amount,
            agent = agent,
            creditor = self.creditor,
        )
    }
}

/// One payment instruction
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: String,
    pub control_sum: Option<String>,
    pub transactions: Vec<Tx>,
}

impl Batch {
    pub fn new(id: &str, transactions: Vec<Tx>) -> Self {
        Self {
            id: id.to_string(),
            control_sum: None,
            transactions,
        }
    }

    pub fn with_control_sum(mut self, control_sum: &str) -> Self {
        self.control_sum = Some(control_sum.to_string());
        self
    }

    fn xml(&self, version_tag: &str) -> String {
        let execution_date = if version_tag == "003" {
            "<ReqdExctnDt>2024-01-16</ReqdExctnDt>".to_string()
        } else {
            "<ReqdExctnDt><Dt>2024-01-16</Dt></ReqdExctnDt>".to_string()
        };
        let agent = if version_tag == "003" { "BIC" } else { "BICFI" };
        let control_sum = self
            .control_sum
            .as_ref()
            .map(|sum| format!("<CtrlSum>{}</CtrlSum>", sum))
            .unwrap_or_default();
        let transactions: String = self.transactions.iter().map(|tx| tx.xml(version_tag)).collect();

        format!(
            r#"
      <PmtInf>
        <PmtInfId>{id}</PmtInfId>
        <PmtMtd>TRF</PmtMtd>
        <NbOfTxs>{count}</NbOfTxs>
        {control_sum}
        {execution_date}
        <Dbtr><Nm>ACME Corp</Nm></Dbtr>
        <DbtrAcct><Id><IBAN>DE89370400440532013000</IBAN></Id></DbtrAcct>
        <DbtrAgt><FinInstnId><{agent}>DEUTDEFF</{agent}></FinInstnId></DbtrAgt>
        <ChrgBr>SLEV</ChrgBr>{transactions}
      </PmtInf>"#,
            id = self.id,
            count = self.transactions.len(),
            control_sum = control_sum,
            execution_date = execution_date,
            agent = agent,
            transactions = transactions,
        )
    }
}

/// Whole document for a revision
pub fn document(version_tag: &str, message_id: &str, control_sum: Option<&str>, batches: &[Batch]) -> String {
    let count: usize = batches.iter().map(|batch| batch.transactions.len()).sum();
    let control_sum = control_sum
        .map(|sum| format!("<CtrlSum>{}</CtrlSum>", sum))
        .unwrap_or_default();
    let batches: String = batches.iter().map(|batch| batch.xml(version_tag)).collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="{ns}" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <CstmrCdtTrfInitn>
    <GrpHdr>
      <MsgId>{message_id}</MsgId>
      <CreDtTm>2024-01-15T10:30:00+01:00</CreDtTm>
      <NbOfTxs>{count}</NbOfTxs>
      {control_sum}
      <InitgPty><Nm>ACME Corp</Nm></InitgPty>
    </GrpHdr>{batches}
  </CstmrCdtTrfInitn>
</Document>"#,
        ns = namespace(version_tag),
        message_id = message_id,
        count = count,
        control_sum = control_sum,
        batches = batches,
    )
}

/// Header MSG-1 with one batch of 1000.00 and 500.00 EUR
pub fn msg1(version_tag: &str) -> String {
    document(
        version_tag,
        "MSG-1",
        Some("1500.00"),
        &[Batch::new(
            "PMT-1",
            vec![Tx::new("E2E-1", "1000.00", "EUR"), Tx::new("E2E-2", "500.00", "EUR")],
        )
        .with_control_sum("1500.00")],
    )
}

//! Streaming access to a pain.001 document
//!
//! [`MessageReader`] offers three ways through one document:
//!
//! - [`MessageReader::read_header`] decodes only the group header
//! - [`MessageReader::read_document`] decodes everything into memory
//! - [`MessageReader::entries`] and [`MessageReader::transactions`] yield one
//!   aggregate at a time, holding a single aggregate in memory
//!
//! Each call is one pass over the source. A second pass rewinds the source
//! when the reader was built with [`MessageReader::seekable`]; otherwise it
//! fails with [`Error::NotSeekable`].
//!
//! The root namespace is checked against the reader's schema before any
//! aggregate is decoded.

use crate::config::ParserConfig;
use crate::decode::{decode_group_header, decode_payment_instruction, decode_transaction, required};
use crate::metrics::DecoderMetrics;
use crate::reader::{malformed, Subregion, XmlCursor};
use crate::versions::Schema;
use crate::{Error, Result};
use iso_core::{CreditTransferTransaction, GroupHeader, Pain001Document, PaymentInstruction};
use std::fmt;
use std::io::{self, BufRead, Seek, SeekFrom};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const ROOT_ELEMENT: &str = "Document";
const GROUP_HEADER: &str = "GrpHdr";
const PAYMENT_INFORMATION: &str = "PmtInf";
const TRANSACTION: &str = "CdtTrfTxInf";

struct Rewind<R> {
    seek: fn(&mut R, u64) -> io::Result<()>,
    start: u64,
}

impl<R> Clone for Rewind<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Rewind<R> {}

fn seek_to<R: Seek>(source: &mut R, position: u64) -> io::Result<()> {
    source.seek(SeekFrom::Start(position)).map(|_| ())
}

/// Reader over one pain.001 document
pub struct MessageReader<R> {
    source: R,
    schema: Schema,
    config: ParserConfig,
    rewind: Option<Rewind<R>>,
    consumed: bool,
    header: Option<GroupHeader>,
    metrics: Option<Arc<DecoderMetrics>>,
}

impl<R> fmt::Debug for MessageReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageReader")
            .field("schema", &self.schema)
            .field("seekable", &self.rewind.is_some())
            .field("consumed", &self.consumed)
            .field("header_cached", &self.header.is_some())
            .finish_non_exhaustive()
    }
}

/// State shared by one pass
struct Pass<'a, R> {
    cursor: XmlCursor<&'a mut R>,
    message_depth: usize,
    header: &'a mut Option<GroupHeader>,
    cache_header: bool,
}

impl<R: BufRead> MessageReader<R> {
    /// Single-pass reader with default settings
    pub fn new(source: R, schema: Schema) -> Self {
        Self::with_config(source, schema, ParserConfig::default())
    }

    /// Single-pass reader
    pub fn with_config(source: R, schema: Schema, config: ParserConfig) -> Self {
        Self {
            source,
            schema,
            config,
            rewind: None,
            consumed: false,
            header: None,
            metrics: None,
        }
    }

    /// Record decode activity in the given collectors
    pub fn with_metrics(mut self, metrics: Arc<DecoderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Schema revision this reader expects
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Group header kept from an earlier pass
    pub fn cached_header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }

    /// Give back the source
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Decode the group header without visiting the payment instructions.
    ///
    /// Served from the cache, without touching the source, when a previous
    /// pass already saw the header.
    pub fn read_header(&mut self) -> Result<GroupHeader> {
        if self.config.cache_header {
            if let Some(header) = &self.header {
                debug!("group header served from cache");
                return Ok(header.clone());
            }
        }

        let result = self.begin().and_then(|mut pass| {
            let mut message = Subregion::resume(&mut pass.cursor, pass.message_depth);
            while let Some(child) = message.next_child()? {
                if child.local_name == GROUP_HEADER {
                    let header = decode_group_header(&mut message.subregion())?;
                    if pass.cache_header {
                        *pass.header = Some(header.clone());
                    }
                    return Ok(header);
                }
            }
            Err(Error::MissingField {
                aggregate: ROOT_ELEMENT,
                field: GROUP_HEADER,
            })
        });

        self.observe_failure(result)
    }

    /// Decode the whole document into memory
    pub fn read_document(&mut self) -> Result<Pain001Document> {
        let started = Instant::now();
        let validate = self.config.validate_control_sums;
        let id = self.schema.id().clone();

        let result = self.begin().and_then(|mut pass| {
            let mut message = Subregion::resume(&mut pass.cursor, pass.message_depth);
            let mut group_header = None;
            let mut payment_instructions = Vec::new();

            while let Some(child) = message.next_child()? {
                match child.local_name.as_str() {
                    GROUP_HEADER => group_header = Some(decode_group_header(&mut message.subregion())?),
                    PAYMENT_INFORMATION => {
                        payment_instructions.push(decode_payment_instruction(&mut message.subregion())?)
                    }
                    _ => {}
                }
            }

            let group_header = required(group_header, ROOT_ELEMENT, GROUP_HEADER)?;
            if pass.cache_header {
                *pass.header = Some(group_header.clone());
            }

            let document = Pain001Document {
                message: id,
                group_header,
                payment_instructions,
            };
            if validate {
                document.check_consistency()?;
            }
            Ok(document)
        });

        let result = self.observe_failure(result);
        if let Ok(document) = &result {
            let elapsed = started.elapsed();
            if let Some(metrics) = &self.metrics {
                metrics.record_document(elapsed);
            }
            info!(
                message_id = %document.group_header.message_id,
                payment_instructions = document.payment_instructions.len(),
                transactions = document.transaction_count(),
                elapsed_ms = elapsed.as_millis() as u64,
                "document decoded"
            );
        }
        result
    }

    /// Stream payment instructions one at a time
    pub fn entries(&mut self) -> Result<Entries<'_, R>> {
        let metrics = self.metrics.clone();
        let namespace = self.schema.namespace().to_string();
        let pass = observe_failure(&namespace, metrics.as_deref(), self.begin())?;
        Ok(Entries {
            pass,
            metrics,
            cancellation: None,
            finished: false,
        })
    }

    /// Stream transactions across all payment instructions, skipping the
    /// instruction-level fields
    pub fn transactions(&mut self) -> Result<Transactions<'_, R>> {
        let metrics = self.metrics.clone();
        let namespace = self.schema.namespace().to_string();
        let pass = observe_failure(&namespace, metrics.as_deref(), self.begin())?;
        Ok(Transactions {
            pass,
            batch_depth: None,
            metrics,
            cancellation: None,
            finished: false,
        })
    }

    fn observe_failure<T>(&self, result: Result<T>) -> Result<T> {
        observe_failure(self.schema.namespace(), self.metrics.as_deref(), result)
    }

    /// Rewind if needed, then read up to the message element
    fn begin(&mut self) -> Result<Pass<'_, R>> {
        if self.consumed {
            let rewind = self.rewind.ok_or(Error::NotSeekable)?;
            debug!(position = rewind.start, "rewinding source");
            (rewind.seek)(&mut self.source, rewind.start)?;
        }
        self.consumed = true;

        let Self {
            source,
            schema,
            config,
            header,
            ..
        } = self;

        let mut cursor = XmlCursor::with_config(source, config);
        let message_depth = open_message(&mut cursor, schema)?;
        Ok(Pass {
            cursor,
            message_depth,
            header,
            cache_header: config.cache_header,
        })
    }
}

impl<R: BufRead + Seek> MessageReader<R> {
    /// Reader that rewinds the source for each additional pass
    pub fn seekable(source: R, schema: Schema) -> Result<Self> {
        Self::seekable_with_config(source, schema, ParserConfig::default())
    }

    /// Rewinding reader with the given settings
    pub fn seekable_with_config(mut source: R, schema: Schema, config: ParserConfig) -> Result<Self> {
        let start = source.stream_position()?;
        let mut reader = Self::with_config(source, schema, config);
        reader.rewind = Some(Rewind {
            seek: seek_to::<R>,
            start,
        });
        Ok(reader)
    }
}

fn observe_failure<T>(namespace: &str, metrics: Option<&DecoderMetrics>, result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        warn!(namespace, error = %error, "decode failed");
        if let Some(metrics) = metrics {
            metrics.record_failure(error);
        }
    }
    result
}

/// Check the root element and step into the message element; returns its depth
fn open_message<R: BufRead>(cursor: &mut XmlCursor<R>, schema: &Schema) -> Result<usize> {
    let root = cursor
        .next_start()?
        .ok_or_else(|| malformed(cursor.position(), "document has no root element"))?;

    let found = root.namespace.clone().unwrap_or_default();
    if found != schema.namespace() {
        return Err(Error::NamespaceMismatch {
            expected: schema.namespace().to_string(),
            found,
        });
    }
    if root.local_name != ROOT_ELEMENT {
        return Err(Error::UnexpectedElement {
            expected: ROOT_ELEMENT.to_string(),
            found: root.local_name,
        });
    }

    let root_depth = cursor.depth();
    let mut document = Subregion::resume(cursor, root_depth);
    match document.next_child()? {
        Some(message) if message.local_name == schema.message_element() => {}
        Some(other) => {
            return Err(Error::UnexpectedElement {
                expected: schema.message_element().to_string(),
                found: other.local_name,
            })
        }
        None => {
            return Err(Error::MissingField {
                aggregate: ROOT_ELEMENT,
                field: schema.message_element(),
            })
        }
    }

    debug!(namespace = schema.namespace(), "message element opened");
    Ok(cursor.depth())
}

/// Lazy sequence of payment instructions
pub struct Entries<'a, R> {
    pass: Pass<'a, R>,
    metrics: Option<Arc<DecoderMetrics>>,
    cancellation: Option<CancellationToken>,
    finished: bool,
}

impl<'a, R> fmt::Debug for Entries<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entries")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'a, R: BufRead> Entries<'a, R> {
    /// Stop with [`Error::Cancelled`] once the token fires.
    ///
    /// The token is checked before each payment instruction; one that has
    /// started decoding always completes or fails on its own.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn advance(&mut self) -> Result<Option<PaymentInstruction>> {
        let pass = &mut self.pass;
        let mut message = Subregion::resume(&mut pass.cursor, pass.message_depth);
        while let Some(child) = message.next_child()? {
            match child.local_name.as_str() {
                GROUP_HEADER if pass.cache_header => {
                    *pass.header = Some(decode_group_header(&mut message.subregion())?);
                }
                PAYMENT_INFORMATION => {
                    return decode_payment_instruction(&mut message.subregion()).map(Some)
                }
                _ => {}
            }
        }
        Ok(None)
    }
}

impl<'a, R: BufRead> Iterator for Entries<'a, R> {
    type Item = Result<PaymentInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if is_cancelled(&self.cancellation) {
            self.finished = true;
            debug!("entry streaming cancelled");
            return Some(Err(Error::Cancelled));
        }

        let outcome = self.advance();
        step(outcome, &mut self.finished, self.metrics.as_deref())
    }
}

/// Lazy sequence of transactions across payment instructions
pub struct Transactions<'a, R> {
    pass: Pass<'a, R>,
    batch_depth: Option<usize>,
    metrics: Option<Arc<DecoderMetrics>>,
    cancellation: Option<CancellationToken>,
    finished: bool,
}

impl<'a, R> fmt::Debug for Transactions<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transactions")
            .field("in_batch", &self.batch_depth.is_some())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'a, R: BufRead> Transactions<'a, R> {
    /// Stop with [`Error::Cancelled`] once the token fires; checked before
    /// each transaction
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn advance(&mut self) -> Result<Option<CreditTransferTransaction>> {
        let pass = &mut self.pass;
        loop {
            if let Some(depth) = self.batch_depth {
                let mut batch = Subregion::resume(&mut pass.cursor, depth);
                while let Some(child) = batch.next_child()? {
                    if child.local_name == TRANSACTION {
                        return decode_transaction(&mut batch.subregion()).map(Some);
                    }
                }
                self.batch_depth = None;
            }

            let mut message = Subregion::resume(&mut pass.cursor, pass.message_depth);
            loop {
                match message.next_child()? {
                    Some(child) if child.local_name == PAYMENT_INFORMATION => {
                        self.batch_depth = Some(pass.message_depth + 1);
                        break;
                    }
                    Some(child) if child.local_name == GROUP_HEADER && pass.cache_header => {
                        *pass.header = Some(decode_group_header(&mut message.subregion())?);
                    }
                    Some(_) => {}
                    None => return Ok(None),
                }
            }
        }
    }
}

impl<'a, R: BufRead> Iterator for Transactions<'a, R> {
    type Item = Result<CreditTransferTransaction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if is_cancelled(&self.cancellation) {
            self.finished = true;
            debug!("transaction streaming cancelled");
            return Some(Err(Error::Cancelled));
        }

        let outcome = self.advance();
        step(outcome, &mut self.finished, self.metrics.as_deref())
    }
}

fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().map_or(false, CancellationToken::is_cancelled)
}

/// Turn one decode step into an iterator item; any error ends the sequence
fn step<T>(
    outcome: Result<Option<T>>,
    finished: &mut bool,
    metrics: Option<&DecoderMetrics>,
) -> Option<Result<T>> {
    match outcome {
        Ok(Some(item)) => {
            if let Some(metrics) = metrics {
                metrics.record_entry();
            }
            Some(Ok(item))
        }
        Ok(None) => {
            *finished = true;
            None
        }
        Err(error) => {
            *finished = true;
            warn!(error = %error, "streaming stopped");
            if let Some(metrics) = metrics {
                metrics.record_failure(&error);
            }
            Some(Err(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::VersionRegistry;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const NS: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.09";

    fn schema() -> Schema {
        VersionRegistry::pain001().resolve(NS).unwrap().clone()
    }

    fn transaction(id: &str, amount: &str) -> String {
        format!(
            r#"<CdtTrfTxInf><PmtId><EndToEndId>{}</EndToEndId></PmtId>
               <Amt><InstdAmt Ccy="EUR">{}</InstdAmt></Amt><Cdtr><Nm>C</Nm></Cdtr></CdtTrfTxInf>"#,
            id, amount
        )
    }

    fn batch(id: &str, transactions: &[String]) -> String {
        format!(
            r#"<PmtInf><PmtInfId>{}</PmtInfId><PmtMtd>TRF</PmtMtd>
               <ReqdExctnDt><Dt>2024-01-16</Dt></ReqdExctnDt>
               <Dbtr><Nm>ACME</Nm></Dbtr>
               <DbtrAcct><Id><IBAN>DE89370400440532013000</IBAN></Id></DbtrAcct>
               <DbtrAgt><FinInstnId><BICFI>DEUTDEFF</BICFI></FinInstnId></DbtrAgt>
               {}</PmtInf>"#,
            id,
            transactions.concat()
        )
    }

    fn document(namespace: &str, batches: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="{}"><CstmrCdtTrfInitn>
<GrpHdr><MsgId>MSG-1</MsgId><CreDtTm>2024-01-15T10:00:00</CreDtTm><NbOfTxs>3</NbOfTxs>
<CtrlSum>1750.00</CtrlSum><InitgPty><Nm>ACME</Nm></InitgPty></GrpHdr>
{}</CstmrCdtTrfInitn></Document>"#,
            namespace,
            batches.concat()
        )
    }

    fn sample() -> String {
        document(
            NS,
            &[
                batch("PMT-1", &[transaction("E2E-1", "1000.00"), transaction("E2E-2", "500.00")]),
                batch("PMT-2", &[transaction("E2E-3", "250.00")]),
            ],
        )
    }

    #[test]
    fn test_read_document() {
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let document = reader.read_document().unwrap();

        assert_eq!(document.group_header.message_id, "MSG-1");
        assert_eq!(document.payment_instructions.len(), 2);
        assert_eq!(document.transaction_count(), 3);
        assert_eq!(document.instructed_total(), dec!(1750.00));
        assert_eq!(document.message.version_tag(), "009");
    }

    #[test]
    fn test_entries_in_document_order() {
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let ids: Vec<String> = reader
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().payment_information_id)
            .collect();
        assert_eq!(ids, vec!["PMT-1", "PMT-2"]);
        assert_eq!(reader.cached_header().unwrap().message_id, "MSG-1");
    }

    #[test]
    fn test_transactions_skip_batch_wrapper() {
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let ids: Vec<String> = reader
            .transactions()
            .unwrap()
            .map(|tx| tx.unwrap().payment_id.end_to_end_id)
            .collect();
        assert_eq!(ids, vec!["E2E-1", "E2E-2", "E2E-3"]);
    }

    #[test]
    fn test_empty_batch_is_skipped_by_transactions() {
        let xml = document(NS, &[batch("EMPTY", &[]), batch("PMT", &[transaction("E2E-9", "1.00")])]);
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let count = reader.transactions().unwrap().filter(|tx| tx.is_ok()).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_header_only_stops_early() {
        // Truncated after the header: a full decode fails, the header read does not
        let xml = sample();
        let cut = xml.find("<PmtInf>").unwrap();
        let truncated = &xml[..cut];

        let mut reader = MessageReader::new(truncated.as_bytes(), schema());
        assert_eq!(reader.read_header().unwrap().message_id, "MSG-1");

        let mut reader = MessageReader::new(truncated.as_bytes(), schema());
        assert!(matches!(reader.read_document(), Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_second_pass_needs_seekable_source() {
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        reader.entries().unwrap().for_each(drop);
        assert!(matches!(reader.read_document(), Err(Error::NotSeekable)));
        assert!(matches!(reader.entries().map(|_| ()), Err(Error::NotSeekable)));
    }

    #[test]
    fn test_seekable_source_rewinds() {
        let mut reader = MessageReader::seekable(Cursor::new(sample().into_bytes()), schema()).unwrap();
        let streamed: Vec<PaymentInstruction> = reader.entries().unwrap().map(|e| e.unwrap()).collect();
        let document = reader.read_document().unwrap();
        assert_eq!(streamed, document.payment_instructions);
    }

    #[test]
    fn test_cached_header_served_without_source() {
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        reader.read_document().unwrap();
        // The source is spent; the header still comes back from the cache
        assert_eq!(reader.read_header().unwrap().message_id, "MSG-1");
    }

    #[test]
    fn test_header_cache_disabled() {
        let config = ParserConfig {
            cache_header: false,
            ..ParserConfig::default()
        };
        let xml = sample();
        let mut reader = MessageReader::with_config(xml.as_bytes(), schema(), config);
        reader.read_document().unwrap();
        assert!(reader.cached_header().is_none());
        assert!(matches!(reader.read_header(), Err(Error::NotSeekable)));
    }

    #[test]
    fn test_namespace_mismatch_before_any_entry() {
        let xml = document("urn:iso:std:iso:20022:tech:xsd:pain.001.001.03", &[batch("PMT", &[])]);
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        match reader.entries() {
            Err(Error::NamespaceMismatch { expected, found }) => {
                assert_eq!(expected, NS);
                assert!(found.ends_with("pain.001.001.03"));
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_wrong_message_element() {
        let xml = format!(r#"<Document xmlns="{}"><CstmrPmtStsRpt/></Document>"#, NS);
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        assert!(matches!(
            reader.read_document(),
            Err(Error::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn test_error_ends_stream() {
        let bad = batch("BAD", &[transaction("E2E-X", "12,50")]);
        let xml = document(NS, &[batch("OK", &[transaction("E2E-1", "1.00")]), bad, batch("AFTER", &[])]);
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let items: Vec<_> = reader.entries().unwrap().collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(Error::InvalidValue { field: "InstdAmt", .. })));
    }

    #[test]
    fn test_cancellation_between_entries() {
        let token = CancellationToken::new();
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let mut entries = reader.entries().unwrap().with_cancellation(token.clone());

        assert!(entries.next().unwrap().is_ok());
        token.cancel();
        assert!(matches!(entries.next(), Some(Err(Error::Cancelled))));
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_cancellation_between_transactions() {
        let token = CancellationToken::new();
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema());
        let mut transactions = reader.transactions().unwrap().with_cancellation(token.clone());

        let first = transactions.next().unwrap().unwrap();
        assert_eq!(first.payment_id.end_to_end_id, "E2E-1");
        token.cancel();
        assert!(matches!(transactions.next(), Some(Err(Error::Cancelled))));
        assert!(transactions.next().is_none());
    }

    #[test]
    fn test_control_sum_validation() {
        let config = ParserConfig {
            validate_control_sums: true,
            ..ParserConfig::default()
        };
        let xml = sample().replace("<CtrlSum>1750.00</CtrlSum>", "<CtrlSum>1.00</CtrlSum>");
        let mut reader = MessageReader::with_config(xml.as_bytes(), schema(), config);
        assert!(matches!(
            reader.read_document(),
            Err(Error::Core(iso_core::Error::Inconsistent { .. }))
        ));
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = Arc::new(DecoderMetrics::new().unwrap());
        let xml = sample();
        let mut reader = MessageReader::new(xml.as_bytes(), schema()).with_metrics(metrics.clone());
        assert_eq!(reader.transactions().unwrap().count(), 3);
        assert_eq!(metrics.entries_streamed.get(), 3);

        let _ = reader.read_document();
        assert_eq!(
            metrics.decode_failures.with_label_values(&["not_seekable"]).get(),
            1
        );
    }
}

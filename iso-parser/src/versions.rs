//! Supported schema revisions
//!
//! The version table is the one place that maps namespace URIs to version
//! tags and decoders. It is built once and only read afterwards. Every
//! revision shares the same decode engine; the [`Schema`] value is all that
//! differs between them.

use crate::config::ParserConfig;
use crate::registry::DocumentDecoder;
use crate::streaming::MessageReader;
use crate::{Error, Result};
use iso_core::{MessageIdentifier, Pain001Document};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io::{BufRead, Seek};
use tracing::debug;

/// Message element under `Document` for customer credit transfer initiation
pub const PAIN001_MESSAGE_ELEMENT: &str = "CstmrCdtTrfInitn";

/// pain.001 revisions decoded by this crate
const PAIN001_REVISIONS: &[&str] = &["pain.001.001.03", "pain.001.001.09", "pain.001.001.11"];

static PAIN001: Lazy<VersionRegistry> = Lazy::new(VersionRegistry::build_pain001);

fn pain001_schemas() -> Result<Vec<(Schema, DecoderConstructor)>> {
    PAIN001_REVISIONS
        .iter()
        .map(|dotted| {
            let id = MessageIdentifier::parse(dotted)?;
            Ok((
                Schema::new(id, PAIN001_MESSAGE_ELEMENT),
                Pain001Decoder::new as DecoderConstructor,
            ))
        })
        .collect()
}

/// Description of one schema revision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    id: MessageIdentifier,
    namespace: String,
    message_element: &'static str,
}

impl Schema {
    /// Schema for a message identifier and its message element name
    pub fn new(id: MessageIdentifier, message_element: &'static str) -> Self {
        let namespace = id.namespace();
        Self {
            id,
            namespace,
            message_element,
        }
    }

    /// Message identifier
    pub fn id(&self) -> &MessageIdentifier {
        &self.id
    }

    /// Namespace URI the root element must carry
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Zero-padded version tag such as `009`
    pub fn version_tag(&self) -> String {
        self.id.version_tag()
    }

    /// Local name of the message element under `Document`
    pub fn message_element(&self) -> &'static str {
        self.message_element
    }
}

/// Constructs the decoder for a schema revision
pub type DecoderConstructor = fn(Schema, ParserConfig) -> Pain001Decoder;

#[derive(Debug, Clone)]
struct VersionEntry {
    version_tag: String,
    schema: Schema,
    constructor: DecoderConstructor,
}

/// Namespace to version table
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    entries: Vec<VersionEntry>,
}

impl VersionRegistry {
    /// Build a table from schemas; namespaces and version tags must both be unique
    pub fn new(schemas: Vec<(Schema, DecoderConstructor)>) -> Result<Self> {
        let mut namespaces = HashSet::new();
        let mut tags = HashSet::new();
        let mut entries = Vec::with_capacity(schemas.len());

        for (schema, constructor) in schemas {
            let version_tag = schema.version_tag();
            if !namespaces.insert(schema.namespace().to_string()) || !tags.insert(version_tag.clone()) {
                return Err(Error::AlreadyRegistered(schema.id().clone()));
            }
            entries.push(VersionEntry {
                version_tag,
                schema,
                constructor,
            });
        }

        entries.sort_by(|a, b| a.schema.id().cmp(b.schema.id()));
        Ok(Self { entries })
    }

    /// Shared table of the built-in pain.001 revisions
    pub fn pain001() -> &'static VersionRegistry {
        &PAIN001
    }

    fn build_pain001() -> Self {
        pain001_schemas()
            .and_then(Self::new)
            .expect("built-in pain.001 revision table is valid")
    }

    /// Schema for a namespace URI
    pub fn resolve(&self, namespace: &str) -> Result<&Schema> {
        self.entries
            .iter()
            .find(|entry| entry.schema.namespace() == namespace)
            .map(|entry| &entry.schema)
            .ok_or_else(|| self.unsupported(namespace))
    }

    /// Schema for a version tag such as `009`
    pub fn by_version_tag(&self, version_tag: &str) -> Option<&Schema> {
        self.entries
            .iter()
            .find(|entry| entry.version_tag == version_tag)
            .map(|entry| &entry.schema)
    }

    /// Supported version tags, oldest first
    pub fn supported_versions(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.version_tag.clone()).collect()
    }

    /// All schemas, oldest first
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.entries.iter().map(|entry| &entry.schema)
    }

    /// Newest supported revision
    pub fn latest(&self) -> Option<&Schema> {
        self.entries.last().map(|entry| &entry.schema)
    }

    /// Decoder for the revision a namespace URI names
    pub fn decoder_for_namespace(&self, namespace: &str, config: &ParserConfig) -> Result<Pain001Decoder> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.schema.namespace() == namespace)
            .ok_or_else(|| self.unsupported(namespace))?;
        debug!(namespace, version = %entry.version_tag, "resolved decoder");
        Ok((entry.constructor)(entry.schema.clone(), config.clone()))
    }

    /// Decoder for exactly the requested version
    pub fn decoder_for(&self, id: &MessageIdentifier, config: &ParserConfig) -> Result<Pain001Decoder> {
        self.decoder_for_namespace(&id.namespace(), config)
    }

    fn unsupported(&self, namespace: &str) -> Error {
        Error::UnsupportedVersion {
            namespace: namespace.to_string(),
            supported: self.supported_versions(),
        }
    }
}

/// pain.001 decoder bound to one schema revision
#[derive(Debug, Clone)]
pub struct Pain001Decoder {
    schema: Schema,
    config: ParserConfig,
}

impl Pain001Decoder {
    /// Decoder for a schema with the given settings
    pub fn new(schema: Schema, config: ParserConfig) -> Self {
        Self { schema, config }
    }

    /// Settings used by readers this decoder opens
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Single-pass reader over a source
    pub fn reader<R: BufRead>(&self, source: R) -> MessageReader<R> {
        MessageReader::with_config(source, self.schema.clone(), self.config.clone())
    }

    /// Reader that can rewind the source for additional passes
    pub fn seekable_reader<R: BufRead + Seek>(&self, source: R) -> Result<MessageReader<R>> {
        MessageReader::seekable_with_config(source, self.schema.clone(), self.config.clone())
    }
}

impl DocumentDecoder<Pain001Document> for Pain001Decoder {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn decode(&self, source: &mut dyn BufRead) -> Result<Pain001Document> {
        self.reader(source).read_document()
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace(version: &str) -> String {
        format!("urn:iso:std:iso:20022:tech:xsd:pain.001.001.{}", version)
    }

    #[test]
    fn test_builtin_table() {
        let registry = VersionRegistry::pain001();
        assert_eq!(registry.supported_versions(), vec!["003", "009", "011"]);
        assert_eq!(registry.latest().unwrap().version_tag(), "011");
    }

    #[test]
    fn test_builtin_table_keeps_every_revision() {
        let schemas = pain001_schemas().unwrap();
        assert_eq!(schemas.len(), PAIN001_REVISIONS.len());

        let registry = VersionRegistry::new(schemas).unwrap();
        assert_eq!(registry.schemas().count(), PAIN001_REVISIONS.len());
        assert_eq!(VersionRegistry::pain001().schemas().count(), PAIN001_REVISIONS.len());
    }

    #[test]
    fn test_namespace_and_tag_are_bijective() {
        let registry = VersionRegistry::pain001();
        for schema in registry.schemas() {
            let by_tag = registry.by_version_tag(&schema.version_tag()).unwrap();
            assert_eq!(by_tag, schema);
            assert_eq!(registry.resolve(schema.namespace()).unwrap(), schema);
        }
    }

    #[test]
    fn test_resolve_each_version() {
        let registry = VersionRegistry::pain001();
        for (version, tag) in [("03", "003"), ("09", "009"), ("11", "011")] {
            let decoder = registry
                .decoder_for_namespace(&namespace(version), &ParserConfig::default())
                .unwrap();
            assert_eq!(decoder.schema().version_tag(), tag);
            assert_eq!(decoder.schema().message_element(), PAIN001_MESSAGE_ELEMENT);
        }
    }

    #[test]
    fn test_unsupported_namespace_lists_versions() {
        let err = VersionRegistry::pain001().resolve(&namespace("02")).unwrap_err();
        match err {
            Error::UnsupportedVersion { namespace: found, supported } => {
                assert!(found.ends_with("pain.001.001.02"));
                assert_eq!(supported, vec!["003", "009", "011"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decoder_for_exact_version() {
        let id = MessageIdentifier::parse("pain.001.001.09").unwrap();
        let decoder = VersionRegistry::pain001()
            .decoder_for(&id, &ParserConfig::default())
            .unwrap();
        assert_eq!(decoder.schema().id(), &id);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let id = MessageIdentifier::parse("pain.001.001.09").unwrap();
        let schema = Schema::new(id, PAIN001_MESSAGE_ELEMENT);
        let result = VersionRegistry::new(vec![
            (schema.clone(), Pain001Decoder::new as DecoderConstructor),
            (schema, Pain001Decoder::new as DecoderConstructor),
        ]);
        assert!(matches!(result, Err(Error::AlreadyRegistered(_))));
    }
}

//! Message type detection
//!
//! Detection reads only as far as the root element, takes its namespace and
//! maps it to a [`MessageIdentifier`]. The source is put back where it was
//! before returning, whether detection succeeded or not.

use crate::config::ParserConfig;
use crate::reader::{malformed, XmlCursor};
use crate::{Error, Result};
use iso_core::MessageIdentifier;
use std::io::{BufRead, Seek, SeekFrom};
use tracing::debug;

/// Steps of a single detection call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionState {
    /// Nothing read yet
    Unstarted,
    /// Reading toward the root element
    ScanningForRootElement,
    /// Root element read; namespace captured
    NamespaceFound(String),
    /// Namespace names an ISO 20022 message
    Resolved(MessageIdentifier),
    /// Namespace absent or not an ISO 20022 message namespace
    Unsupported(String),
}

/// Buffered source that can be repositioned
pub trait SeekableSource: BufRead + Seek {}

impl<T: BufRead + Seek + ?Sized> SeekableSource for T {}

/// Finds the message identifier of a document without decoding it
pub trait MessageDetector: Send + Sync {
    /// Identify the message; the source position is left unchanged
    fn detect(&self, source: &mut dyn SeekableSource) -> Result<MessageIdentifier>;
}

/// Detector that reads the root element's namespace
#[derive(Debug, Clone, Default)]
pub struct NamespaceDetector {
    config: ParserConfig,
}

impl NamespaceDetector {
    /// Detector with default cursor limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector with the given cursor limits
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Run detection and report the final state
    pub fn detect_state(&self, source: &mut dyn SeekableSource) -> Result<DetectionState> {
        let start = source.stream_position()?;
        let outcome = self.scan(source);
        source.seek(SeekFrom::Start(start))?;
        outcome
    }

    fn scan(&self, source: &mut dyn SeekableSource) -> Result<DetectionState> {
        let mut state = DetectionState::Unstarted;
        debug!(?state, "detection started");

        state = DetectionState::ScanningForRootElement;
        let mut cursor = XmlCursor::with_config(source, &self.config);
        let root = cursor
            .next_start()?
            .ok_or_else(|| malformed(cursor.position(), "document has no root element"))?;
        debug!(?state, root = %root.local_name, "root element read");

        let namespace = root.namespace.unwrap_or_default();
        state = DetectionState::NamespaceFound(namespace.clone());
        debug!(?state, "namespace captured");

        state = match MessageIdentifier::from_namespace(&namespace) {
            Ok(id) => DetectionState::Resolved(id),
            Err(_) => DetectionState::Unsupported(namespace),
        };
        debug!(?state, "detection finished");
        Ok(state)
    }
}

impl MessageDetector for NamespaceDetector {
    fn detect(&self, source: &mut dyn SeekableSource) -> Result<MessageIdentifier> {
        match self.detect_state(source)? {
            DetectionState::Resolved(id) => Ok(id),
            DetectionState::Unsupported(namespace) | DetectionState::NamespaceFound(namespace) => {
                Err(Error::UnsupportedVersion {
                    namespace,
                    supported: Vec::new(),
                })
            }
            DetectionState::Unstarted | DetectionState::ScanningForRootElement => Err(malformed(
                0,
                "detection stopped before the root element",
            )),
        }
    }
}

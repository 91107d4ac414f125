//! Streaming ISO 20022 decoder
//!
//! Decodes pain.001 customer credit transfer initiations into the typed
//! aggregates of `iso_core` with a forward-only cursor, so bulk files are
//! processed one payment instruction at a time.
//!
//! # Architecture
//!
//! - [`reader`]: namespace-aware XML cursor with bounded subregions
//! - [`decode`]: one decoder per aggregate, driven by a subregion
//! - [`versions`]: namespace to schema revision table
//! - [`detect`]: message type detection from the root namespace
//! - [`registry`]: parser registry and factory for typed decoders
//! - [`streaming`]: header-only, full and entry-by-entry reading
//!
//! # Example
//!
//! ```no_run
//! use iso_parser::{ParserFactory, DocumentDecoder};
//! use iso_core::Pain001Document;
//! use std::io::BufReader;
//!
//! # fn main() -> iso_parser::Result<()> {
//! let mut source = BufReader::new(std::fs::File::open("payments.xml")?);
//! let factory = ParserFactory::with_defaults();
//! let decoder = factory.create_detected::<Pain001Document>(&mut source)?;
//! let document = decoder.decode(&mut source)?;
//! println!("{} transactions", document.transaction_count());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod decode;
pub mod detect;
pub mod error;
pub mod metrics;
pub mod reader;
pub mod registry;
pub mod streaming;
pub mod versions;

// Re-exports
pub use config::ParserConfig;
pub use detect::{DetectionState, MessageDetector, NamespaceDetector, SeekableSource};
pub use error::{Error, Result};
pub use metrics::DecoderMetrics;
pub use reader::{StartElement, Subregion, XmlCursor, XmlEvent};
pub use registry::{DocumentDecoder, ParserFactory, ParserRegistration, ParserRegistry, ServiceLocator};
pub use streaming::{Entries, MessageReader, Transactions};
pub use versions::{Pain001Decoder, Schema, VersionRegistry, PAIN001_MESSAGE_ELEMENT};

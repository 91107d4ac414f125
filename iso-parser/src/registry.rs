//! Parser registry and factory
//!
//! The registry maps message identifiers to decoder constructors. It ships
//! with the pain.001 revisions and accepts further message families through
//! explicit `register` calls. Lookups are read-only and safe to share across
//! threads; registration changes need `&mut` access.

use crate::config::ParserConfig;
use crate::detect::{MessageDetector, NamespaceDetector, SeekableSource};
use crate::versions::{Pain001Decoder, Schema, VersionRegistry};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use iso_core::{MessageIdentifier, Pain001Document};
use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, info};

/// Decoder producing documents of type `D`
pub trait DocumentDecoder<D>: Send + Sync {
    /// Schema revision this decoder expects
    fn schema(&self) -> &Schema;

    /// Decode a whole document
    fn decode(&self, source: &mut dyn BufRead) -> Result<D>;

    /// Whether entries can be streamed instead of decoding the whole document
    fn supports_streaming(&self) -> bool {
        false
    }
}

/// Registration record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserRegistration {
    /// Message identifier
    pub id: MessageIdentifier,
    /// Name of the document type the decoder produces
    pub produced_type: &'static str,
    /// Whether the decoder supports entry streaming
    pub supports_streaming: bool,
    /// Registration time
    pub registered_at: DateTime<Utc>,
    type_id: TypeId,
}

type Constructor = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

#[derive(Clone)]
struct Entry {
    registration: ParserRegistration,
    constructor: Constructor,
}

/// Provides decoder instances in place of the registered constructors
pub trait ServiceLocator: Send + Sync {
    /// Instance for a registration, boxed as `Box<dyn DocumentDecoder<D>>`;
    /// `None` falls back to the registered constructor
    fn resolve(&self, registration: &ParserRegistration) -> Option<Box<dyn Any + Send>>;
}

/// Message identifier to decoder table
#[derive(Clone, Default)]
pub struct ParserRegistry {
    entries: BTreeMap<MessageIdentifier, Entry>,
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("registrations", &self.list())
            .finish()
    }
}

impl ParserRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in pain.001 revision
    pub fn with_defaults(config: &ParserConfig) -> Self {
        let mut registry = Self::new();
        for schema in VersionRegistry::pain001().schemas() {
            let schema = schema.clone();
            let config = config.clone();
            let id = schema.id().clone();
            registry.insert(id, true, move || -> Box<dyn DocumentDecoder<Pain001Document>> {
                Box::new(Pain001Decoder::new(schema.clone(), config.clone()))
            });
        }
        registry
    }

    /// Register a decoder; fails if the identifier is taken
    pub fn register<D, F>(
        &mut self,
        id: MessageIdentifier,
        supports_streaming: bool,
        constructor: F,
    ) -> Result<&ParserRegistration>
    where
        D: 'static,
        F: Fn() -> Box<dyn DocumentDecoder<D>> + Send + Sync + 'static,
    {
        if self.entries.contains_key(&id) {
            return Err(Error::AlreadyRegistered(id));
        }
        Ok(self.insert(id, supports_streaming, constructor))
    }

    /// Register a decoder, replacing any existing registration
    pub fn register_or_replace<D, F>(
        &mut self,
        id: MessageIdentifier,
        supports_streaming: bool,
        constructor: F,
    ) -> &ParserRegistration
    where
        D: 'static,
        F: Fn() -> Box<dyn DocumentDecoder<D>> + Send + Sync + 'static,
    {
        self.insert(id, supports_streaming, constructor)
    }

    fn insert<D, F>(
        &mut self,
        id: MessageIdentifier,
        supports_streaming: bool,
        constructor: F,
    ) -> &ParserRegistration
    where
        D: 'static,
        F: Fn() -> Box<dyn DocumentDecoder<D>> + Send + Sync + 'static,
    {
        let registration = ParserRegistration {
            id: id.clone(),
            produced_type: type_name::<D>(),
            supports_streaming,
            registered_at: Utc::now(),
            type_id: TypeId::of::<D>(),
        };
        debug!(id = %id, produced_type = registration.produced_type, "parser registered");

        let constructor: Constructor =
            Arc::new(move || Box::new(constructor()) as Box<dyn Any + Send>);
        let entry = Entry {
            registration,
            constructor,
        };
        if self.entries.insert(id.clone(), entry).is_some() {
            debug!(id = %id, "previous registration replaced");
        }
        &self.entries[&id].registration
    }

    /// Remove a registration
    pub fn unregister(&mut self, id: &MessageIdentifier) -> Result<ParserRegistration> {
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| Error::NotRegistered(id.clone()))?;
        debug!(id = %id, "parser unregistered");
        Ok(entry.registration)
    }

    /// Whether a decoder is registered for exactly this identifier
    pub fn is_registered(&self, id: &MessageIdentifier) -> bool {
        self.entries.contains_key(id)
    }

    /// Registration record for an identifier
    pub fn registration(&self, id: &MessageIdentifier) -> Option<&ParserRegistration> {
        self.entries.get(id).map(|entry| &entry.registration)
    }

    /// All registrations ordered by identifier
    pub fn list(&self) -> Vec<&ParserRegistration> {
        self.entries.values().map(|entry| &entry.registration).collect()
    }

    /// Registered revisions of one message, oldest first
    pub fn versions_for(&self, business_area: &str, message_number: &str) -> Vec<&MessageIdentifier> {
        self.entries
            .keys()
            .filter(|id| id.business_area() == business_area && id.message_number() == message_number)
            .collect()
    }

    /// Newest registered revision of one message
    pub fn latest(&self, business_area: &str, message_number: &str) -> Option<&ParserRegistration> {
        self.versions_for(business_area, message_number)
            .last()
            .and_then(|id| self.registration(id))
    }

    fn entry<D: 'static>(&self, id: &MessageIdentifier) -> Result<&Entry> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| Error::NotRegistered(id.clone()))?;
        if entry.registration.type_id != TypeId::of::<D>() {
            return Err(Error::TypeMismatch {
                expected: type_name::<D>(),
                actual: entry.registration.produced_type,
            });
        }
        Ok(entry)
    }

    /// Construct the decoder registered for an identifier
    pub fn create<D: 'static>(&self, id: &MessageIdentifier) -> Result<Box<dyn DocumentDecoder<D>>> {
        let entry = self.entry::<D>(id)?;
        downcast::<D>((entry.constructor)(), entry.registration.produced_type)
    }
}

fn downcast<D: 'static>(
    instance: Box<dyn Any + Send>,
    actual: &'static str,
) -> Result<Box<dyn DocumentDecoder<D>>> {
    instance
        .downcast::<Box<dyn DocumentDecoder<D>>>()
        .map(|decoder| *decoder)
        .map_err(|_| Error::TypeMismatch {
            expected: type_name::<D>(),
            actual,
        })
}

/// Creates decoders by identifier or by detecting the message type
pub struct ParserFactory {
    registry: ParserRegistry,
    detector: Box<dyn MessageDetector>,
    locator: Option<Arc<dyn ServiceLocator>>,
}

impl fmt::Debug for ParserFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserFactory")
            .field("registry", &self.registry)
            .field("service_locator", &self.locator.is_some())
            .finish_non_exhaustive()
    }
}

impl ParserFactory {
    /// Factory over the built-in registry with namespace detection
    pub fn with_defaults() -> Self {
        Self::with_config(&ParserConfig::default())
    }

    /// Factory over the built-in registry using the given settings
    pub fn with_config(config: &ParserConfig) -> Self {
        Self::new(
            ParserRegistry::with_defaults(config),
            NamespaceDetector::with_config(config.clone()),
        )
    }

    /// Factory over a custom registry and detector
    pub fn new(registry: ParserRegistry, detector: impl MessageDetector + 'static) -> Self {
        info!(registrations = registry.entries.len(), "parser factory ready");
        Self {
            registry,
            detector: Box::new(detector),
            locator: None,
        }
    }

    /// Build decoder instances through a service locator when it has one
    pub fn with_service_locator(mut self, locator: Arc<dyn ServiceLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Underlying registry
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Underlying registry for registration changes
    pub fn registry_mut(&mut self) -> &mut ParserRegistry {
        &mut self.registry
    }

    /// Decoder for an identifier, producing documents of type `D`
    pub fn create<D: 'static>(&self, id: &MessageIdentifier) -> Result<Box<dyn DocumentDecoder<D>>> {
        let entry = self.registry.entry::<D>(id)?;
        let located = self
            .locator
            .as_ref()
            .and_then(|locator| locator.resolve(&entry.registration));

        match located {
            Some(instance) => {
                debug!(id = %id, "decoder supplied by service locator");
                downcast::<D>(instance, "service locator instance")
            }
            None => downcast::<D>((entry.constructor)(), entry.registration.produced_type),
        }
    }

    /// Detect the message type of a source, then create its decoder.
    ///
    /// The source is left at the position it had on entry.
    pub fn create_detected<D: 'static>(
        &self,
        source: &mut dyn SeekableSource,
    ) -> Result<Box<dyn DocumentDecoder<D>>> {
        let id = self
            .detector
            .detect(source)
            .map_err(|e| self.with_supported(e, None))?;
        info!(id = %id, "message type detected");
        match self.create::<D>(&id) {
            Err(Error::NotRegistered(id)) => Err(self.with_supported(
                Error::UnsupportedVersion {
                    namespace: id.namespace(),
                    supported: Vec::new(),
                },
                Some(&id),
            )),
            other => other,
        }
    }

    /// Fill in the registered version tags, narrowed to the detected message when known
    fn with_supported(&self, error: Error, detected: Option<&MessageIdentifier>) -> Error {
        match error {
            Error::UnsupportedVersion { namespace, .. } => {
                let ids: Vec<&MessageIdentifier> = match detected {
                    Some(id) => self.registry.versions_for(id.business_area(), id.message_number()),
                    None => self.registry.list().into_iter().map(|r| &r.id).collect(),
                };
                let mut supported: Vec<String> = ids.iter().map(|id| id.version_tag()).collect();
                supported.sort();
                supported.dedup();
                Error::UnsupportedVersion { namespace, supported }
            }
            other => other,
        }
    }
}

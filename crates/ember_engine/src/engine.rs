//! The engine instance: configuration, contexts and engine-owned state.

use crate::error::EngineError;
use ember_bytecode::StubCache;
use ember_cache::{CompilationCache, ContextId};
use ember_codec::{ArtifactCodec, BincodeCodec, DecodeOptions, ReconstructionLimits};
use ember_common::{EngineFlags, FingerprintPolicy, Interner};
use ember_config::{validate_config, EngineConfig};
use ember_vm::{Globals, Interpreter};

/// A script engine.
///
/// Everything an artifact touches on its way from source to execution is
/// state of one `Engine`: the shared stub cache, the compilation cache and
/// the global bindings of each context. Engines are independent of each
/// other, so tests can create as many as they need.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) flags: EngineFlags,
    pub(crate) interner: Interner,
    pub(crate) stubs: StubCache,
    pub(crate) cache: CompilationCache,
    pub(crate) contexts: Vec<Globals>,
    pub(crate) current: ContextId,
    pub(crate) codec: Box<dyn ArtifactCodec>,
    pub(crate) interpreter: Interpreter,
}

impl Engine {
    /// Creates an engine with the default [`BincodeCodec`].
    ///
    /// The configuration is validated and then frozen. The engine starts
    /// with one context, which is entered.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_codec(config, Box::new(BincodeCodec))
    }

    /// Creates an engine that writes and reads payloads with `codec`.
    pub fn with_codec(
        config: EngineConfig,
        codec: Box<dyn ArtifactCodec>,
    ) -> Result<Self, EngineError> {
        validate_config(&config)?;
        let flags = config.flags();
        tracing::debug!(
            mode = %flags.language_mode,
            flags_hash = flags.hash(),
            policy = ?config.artifact.fingerprint_policy,
            "engine created"
        );
        Ok(Self {
            flags,
            interner: Interner::new(),
            stubs: StubCache::new(),
            cache: CompilationCache::new(config.cache.generations, config.cache.enabled),
            contexts: vec![Globals::new()],
            current: ContextId::from_raw(0),
            codec,
            interpreter: Interpreter::new(config.engine.max_call_depth),
            config,
        })
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The frozen engine flags.
    pub fn flags(&self) -> EngineFlags {
        self.flags
    }

    /// Creates a fresh context with no globals and returns its id.
    pub fn new_context(&mut self) -> ContextId {
        let id = ContextId::from_raw(self.contexts.len() as u32);
        self.contexts.push(Globals::new());
        id
    }

    /// Makes `context` the current context.
    pub fn enter(&mut self, context: ContextId) -> Result<(), EngineError> {
        if context.as_raw() as usize >= self.contexts.len() {
            return Err(EngineError::UnknownContext(context));
        }
        self.current = context;
        Ok(())
    }

    /// The current context.
    pub fn current_context(&self) -> ContextId {
        self.current
    }

    /// The globals of the current context.
    pub fn globals(&self) -> &Globals {
        &self.contexts[self.current.as_raw() as usize]
    }

    pub(crate) fn globals_mut(&mut self) -> &mut Globals {
        &mut self.contexts[self.current.as_raw() as usize]
    }

    /// The compilation cache.
    pub fn cache(&self) -> &CompilationCache {
        &self.cache
    }

    /// Mutable access to the compilation cache, e.g. to age it.
    pub fn cache_mut(&mut self) -> &mut CompilationCache {
        &mut self.cache
    }

    /// The shared code stub cache.
    pub fn stubs(&self) -> &StubCache {
        &self.stubs
    }

    pub(crate) fn decode_options(&self, policy: FingerprintPolicy) -> DecodeOptions {
        DecodeOptions {
            flags: self.flags,
            policy,
            limits: ReconstructionLimits {
                max_functions: u32::try_from(self.config.artifact.max_functions)
                    .unwrap_or(u32::MAX),
            },
        }
    }
}

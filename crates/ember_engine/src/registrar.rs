//! Registering functions in the compilation cache and consuming them.

use crate::engine::Engine;
use crate::error::EngineError;
use ember_bytecode::FunctionDescriptor;
use ember_cache::{CacheKey, ContextId};
use ember_codec::CachedData;
use ember_common::{Fingerprint, FingerprintPolicy, LanguageMode};

impl Engine {
    /// Inserts `function` into the compilation cache under `key`.
    ///
    /// `key` is taken as given and never derived from the function's real
    /// source; decoded artifacts are conventionally registered under the
    /// empty placeholder. Registering again replaces the entry.
    pub fn register(
        &mut self,
        key: &str,
        context: ContextId,
        language_mode: LanguageMode,
        function: FunctionDescriptor,
    ) {
        let cache_key = CacheKey::new(key, context, language_mode);
        let replaced = self.cache.put_script(cache_key, function);
        tracing::debug!(
            key,
            %context,
            mode = %language_mode,
            replaced = replaced.is_some(),
            "registered function"
        );
    }

    /// Returns the function for `source` in the current context and mode.
    ///
    /// A cache hit is returned without looking at `cached`. On a miss,
    /// `cached` is decoded against the fingerprint of `source` with the
    /// fingerprint check enforced; if its sanity check fails the data is
    /// marked rejected and [`EngineError::CacheRejected`] is returned.
    /// Without cached data the source is compiled. Either way the result is
    /// put into the cache.
    pub fn compile_with_cache(
        &mut self,
        source: &str,
        cached: Option<&CachedData>,
    ) -> Result<FunctionDescriptor, EngineError> {
        let key = CacheKey::new(source, self.current, self.flags.language_mode);
        if let Some(function) = self.cache.lookup_script(&key) {
            return Ok(function);
        }
        let function = match cached {
            Some(data) => {
                let options = self.decode_options(FingerprintPolicy::Enforced);
                let decoded = ember_codec::decode(
                    self.codec.as_ref(),
                    data,
                    Fingerprint::of_source(source),
                    &mut self.stubs,
                    &options,
                );
                match decoded {
                    Ok(function) => function,
                    Err(err) if err.is_integrity() => return Err(EngineError::CacheRejected),
                    Err(err) => return Err(EngineError::Load(err)),
                }
            }
            None => self.compile_function(source)?,
        };
        self.cache.put_script(key, function.clone());
        Ok(function)
    }
}

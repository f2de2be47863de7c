//! Compile, encode, decode, register and run artifacts end to end.

use ember_bytecode::StubCache;
use ember_cache::CacheKey;
use ember_codec::{
    resolve_attachments, ArtifactCodec, AttachedObject, AttachmentDescriptor, BincodeCodec,
    CodecError, ReconstructionLimits, SanityCheckFailure,
};
use ember_common::{EngineFlags, Fingerprint, FingerprintPolicy, LanguageMode};
use ember_engine::{Engine, EngineConfig, EngineError, Value};

const GREETING: &str = "function foo(){return 'Hello '} function bar(){return 'World: '} \
                        function baz(){let a=1;let b=2;let c=300;return a+b+c} foo()+bar()+baz()";

fn engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

fn engine_with(edit: impl FnOnce(&mut EngineConfig)) -> Engine {
    let mut config = EngineConfig::default();
    edit(&mut config);
    Engine::new(config).unwrap()
}

/// Runs `source` through the whole artifact path, decoding in a second
/// engine that never saw the source.
fn through_artifact(source: &str) -> Result<Value, EngineError> {
    let (fingerprint, artifact) = engine().compile(source)?;
    let bytes = engine().encode(fingerprint, &artifact);

    let mut consumer = engine();
    let function = consumer.decode(&bytes, fingerprint)?;
    let context = consumer.current_context();
    consumer.register("", context, LanguageMode::Sloppy, function);
    let function = consumer.compile_with_cache("", None)?;
    consumer.run(&function)
}

#[test]
fn greeting_scenario() {
    assert_eq!(
        through_artifact(GREETING).unwrap(),
        Value::from("Hello World: 303")
    );
}

#[test]
fn roundtrip_matches_fresh_execution() {
    let scripts = [
        GREETING,
        "1 + 2 * 3",
        "let s = ''; let i = 0; while (i < 5) { s = s + i; i = i + 1; } s",
        "function fact(n) { if (n <= 1) { return 1; } return n * fact(n - 1); } fact(10)",
        "var greet = function (who) { return 'hi ' + who; }; greet('there')",
        "const limit = 3; function under(x) { return x < limit; } under(2) && !under(4)",
        "typeof null === 'object'",
        "null == undefined",
        "",
    ];
    for source in scripts {
        let fresh = engine().eval(source).unwrap();
        let restored = through_artifact(source).unwrap();
        assert_eq!(fresh.to_string(), restored.to_string(), "script: {source}");
    }
}

#[test]
fn permissive_decode_ignores_fingerprint() {
    let mut producer = engine();
    let (fingerprint, artifact) = producer.compile(GREETING).unwrap();
    let bytes = producer.encode(fingerprint, &artifact);

    let mut consumer = engine();
    let function = consumer
        .decode(&bytes, Fingerprint::from_raw(0xdead_beef))
        .unwrap();
    let context = consumer.current_context();
    consumer.register("", context, LanguageMode::Sloppy, function);

    let real_key = CacheKey::new(GREETING, context, LanguageMode::Sloppy);
    assert!(consumer.cache_mut().lookup_script(&real_key).is_none());
    let placeholder = CacheKey::new("", context, LanguageMode::Sloppy);
    assert!(consumer.cache_mut().lookup_script(&placeholder).is_some());

    let function = consumer.compile_with_cache("", None).unwrap();
    assert_eq!(consumer.run(&function).unwrap(), Value::from("Hello World: 303"));
}

#[test]
fn enforced_policy_checks_fingerprint() {
    let mut producer = engine();
    let (fingerprint, artifact) = producer.compile(GREETING).unwrap();
    let bytes = producer.encode(fingerprint, &artifact);

    let mut consumer = engine_with(|c| c.artifact.fingerprint_policy = FingerprintPolicy::Enforced);
    let err = consumer
        .decode(&bytes, Fingerprint::of_source("something else"))
        .unwrap_err();
    assert!(matches!(
        err.codec_error(),
        Some(CodecError::Integrity(SanityCheckFailure::Source))
    ));
    assert!(consumer.decode(&bytes, fingerprint).is_ok());
}

#[test]
fn container_fingerprint_is_not_validated() {
    let mut producer = engine();
    let (_, artifact) = producer.compile(GREETING).unwrap();
    let bytes = producer.encode(Fingerprint::from_raw(1), &artifact);

    let mut consumer = engine_with(|c| c.artifact.fingerprint_policy = FingerprintPolicy::Enforced);
    assert!(consumer.decode(&bytes, Fingerprint::of_source(GREETING)).is_ok());
}

#[test]
fn flags_mismatch_is_integrity_error() {
    let mut strict = engine_with(|c| c.engine.language_mode = LanguageMode::Strict);
    let (fingerprint, artifact) = strict.compile(GREETING).unwrap();
    let bytes = strict.encode(fingerprint, &artifact);

    let err = engine().decode(&bytes, fingerprint).unwrap_err();
    assert!(matches!(
        err.codec_error(),
        Some(CodecError::Integrity(SanityCheckFailure::Flags))
    ));
}

#[test]
fn truncated_payload_is_integrity_error() {
    let mut producer = engine();
    let (fingerprint, artifact) = producer.compile(GREETING).unwrap();
    let bytes = producer.encode(fingerprint, &artifact);

    let mut consumer = engine();
    let err = consumer
        .decode(&bytes[..bytes.len() - 1], fingerprint)
        .unwrap_err();
    assert!(matches!(err, EngineError::Load(ref e) if e.is_integrity()));

    for len in 0..bytes.len() {
        assert!(
            consumer.decode(&bytes[..len], fingerprint).is_err(),
            "prefix of {len} bytes decoded"
        );
    }
}

#[test]
fn permuted_attachments_fail_reconstruction() {
    let mut producer = engine();
    let (_, artifact) = producer.compile(GREETING).unwrap();
    let stub_count = artifact
        .attachments
        .iter()
        .filter(|a| matches!(a, AttachmentDescriptor::CodeStub(_)))
        .count();
    assert!(stub_count >= 2);

    let codec = BincodeCodec;
    let flags = EngineFlags::default();
    let descriptors = codec.inspect(&artifact.payload, None, flags).unwrap();
    assert_eq!(descriptors, artifact.attachments);

    let mut stubs = StubCache::new();
    let attachments = resolve_attachments(&descriptors, &mut stubs).unwrap();
    let limits = ReconstructionLimits::default();
    assert!(codec
        .reconstruct(&artifact.payload, &attachments, &limits)
        .is_ok());

    let mut swapped: Vec<AttachedObject> = attachments.clone();
    swapped.swap(1, 2);
    let err = codec
        .reconstruct(&artifact.payload, &swapped, &limits)
        .unwrap_err();
    assert!(matches!(err, CodecError::Reconstruction { .. }));

    let mut rotated = attachments;
    rotated.rotate_left(1);
    assert!(codec.reconstruct(&artifact.payload, &rotated, &limits).is_err());
}

#[test]
fn reservation_limit_applies() {
    let mut producer = engine();
    let (fingerprint, artifact) = producer.compile(GREETING).unwrap();
    let bytes = producer.encode(fingerprint, &artifact);

    let mut consumer = engine_with(|c| c.artifact.max_functions = 2);
    let err = consumer.decode(&bytes, fingerprint).unwrap_err();
    assert!(matches!(
        err.codec_error(),
        Some(CodecError::Reconstruction { .. })
    ));
}

#[test]
fn registering_twice_is_idempotent() {
    let mut producer = engine();
    let (fingerprint, artifact) = producer.compile(GREETING).unwrap();
    let bytes = producer.encode(fingerprint, &artifact);

    let mut consumer = engine();
    let context = consumer.current_context();
    for _ in 0..2 {
        let function = consumer.decode(&bytes, fingerprint).unwrap();
        consumer.register("", context, LanguageMode::Sloppy, function);
    }
    assert_eq!(consumer.cache().len(), 1);
    let function = consumer.compile_with_cache("", None).unwrap();
    assert_eq!(consumer.run(&function).unwrap(), Value::from("Hello World: 303"));
    assert_eq!(consumer.run(&function).unwrap(), Value::from("Hello World: 303"));
}

#[test]
fn aged_out_registration_falls_back_to_compiling() {
    let mut consumer = engine_with(|c| c.cache.generations = 1);
    let function = engine().compile_function("'cached'").unwrap();
    let context = consumer.current_context();
    consumer.register("", context, LanguageMode::Sloppy, function);
    consumer.cache_mut().age();
    let function = consumer.compile_with_cache("", None).unwrap();
    assert_eq!(consumer.run(&function).unwrap(), Value::Undefined);
}

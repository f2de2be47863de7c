//! Shared runtime code stubs.
//!
//! Operators and calls are not open-coded in bytecode. Each one goes through a
//! [`CodeStub`], a small shared routine owned by the engine-wide [`StubCache`]
//! and referenced from compiled code by position in a script's stub table.
//! A stub is identified across processes by its [`StubKey`], which is what an
//! externalized artifact records in place of the stub itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const MAJOR_BITS: u32 = 8;
const MAJOR_MASK: u32 = (1 << MAJOR_BITS) - 1;

const MAJOR_BINARY: u32 = 1;
const MAJOR_UNARY: u32 = 2;
const MAJOR_CALL: u32 = 3;

/// Binary operators implemented by stubs. Logical `&&` and `||` compile to
/// jumps and have no stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryKind {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
}

impl BinaryKind {
    const ALL: [BinaryKind; 13] = [
        BinaryKind::Add,
        BinaryKind::Sub,
        BinaryKind::Mul,
        BinaryKind::Div,
        BinaryKind::Mod,
        BinaryKind::Lt,
        BinaryKind::Le,
        BinaryKind::Gt,
        BinaryKind::Ge,
        BinaryKind::Eq,
        BinaryKind::NotEq,
        BinaryKind::StrictEq,
        BinaryKind::StrictNotEq,
    ];

    fn index(self) -> u32 {
        // Position in ALL; never reorder, keys are persisted.
        BinaryKind::ALL
            .iter()
            .position(|k| *k == self)
            .map_or(0, |i| i as u32)
    }

    /// The operator's source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryKind::Add => "+",
            BinaryKind::Sub => "-",
            BinaryKind::Mul => "*",
            BinaryKind::Div => "/",
            BinaryKind::Mod => "%",
            BinaryKind::Lt => "<",
            BinaryKind::Le => "<=",
            BinaryKind::Gt => ">",
            BinaryKind::Ge => ">=",
            BinaryKind::Eq => "==",
            BinaryKind::NotEq => "!=",
            BinaryKind::StrictEq => "===",
            BinaryKind::StrictNotEq => "!==",
        }
    }
}

/// Unary operators implemented by stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryKind {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `typeof`
    Typeof,
}

impl UnaryKind {
    const ALL: [UnaryKind; 4] = [UnaryKind::Not, UnaryKind::Neg, UnaryKind::Plus, UnaryKind::Typeof];

    fn index(self) -> u32 {
        UnaryKind::ALL
            .iter()
            .position(|k| *k == self)
            .map_or(0, |i| i as u32)
    }

    /// The operator's source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryKind::Not => "!",
            UnaryKind::Neg => "-",
            UnaryKind::Plus => "+",
            UnaryKind::Typeof => "typeof",
        }
    }
}

/// A shared runtime routine invoked from bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeStub {
    /// Pops two operands and pushes the result of the operator.
    Binary(BinaryKind),
    /// Pops one operand and pushes the result of the operator.
    Unary(UnaryKind),
    /// Pops `argc` arguments and a callee, calls it, and pushes the result.
    Call {
        /// Number of arguments on the stack above the callee.
        argc: u16,
    },
}

impl CodeStub {
    /// Returns the stable key identifying this stub.
    pub fn key(&self) -> StubKey {
        let (major, minor) = match self {
            CodeStub::Binary(kind) => (MAJOR_BINARY, kind.index()),
            CodeStub::Unary(kind) => (MAJOR_UNARY, kind.index()),
            CodeStub::Call { argc } => (MAJOR_CALL, u32::from(*argc)),
        };
        StubKey((minor << MAJOR_BITS) | major)
    }

    /// Rebuilds a stub from its key. Returns `None` for keys no stub has.
    pub fn from_key(key: StubKey) -> Option<CodeStub> {
        let minor = key.minor();
        match key.major() {
            MAJOR_BINARY => BinaryKind::ALL
                .get(minor as usize)
                .map(|k| CodeStub::Binary(*k)),
            MAJOR_UNARY => UnaryKind::ALL
                .get(minor as usize)
                .map(|k| CodeStub::Unary(*k)),
            MAJOR_CALL => u16::try_from(minor)
                .ok()
                .map(|argc| CodeStub::Call { argc }),
            _ => None,
        }
    }
}

impl fmt::Display for CodeStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeStub::Binary(kind) => write!(f, "binary {}", kind.symbol()),
            CodeStub::Unary(kind) => write!(f, "unary {}", kind.symbol()),
            CodeStub::Call { argc } => write!(f, "call/{argc}"),
        }
    }
}

/// Stable identity of a [`CodeStub`]: the major kind in the low 8 bits and
/// the kind-specific minor value above them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StubKey(u32);

impl StubKey {
    /// Creates a key from its raw encoding.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw encoding.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    fn major(self) -> u32 {
        self.0 & MAJOR_MASK
    }

    fn minor(self) -> u32 {
        self.0 >> MAJOR_BITS
    }
}

impl fmt::Debug for StubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StubKey({}:{})", self.major(), self.minor())
    }
}

impl fmt::Display for StubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// The engine-wide table of code stubs.
///
/// Each stub exists once per cache; compiled code and reconstructed artifacts
/// hold `Arc`s to the same instances.
#[derive(Debug, Default)]
pub struct StubCache {
    stubs: HashMap<StubKey, Arc<CodeStub>>,
}

impl StubCache {
    /// Creates an empty stub cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared instance of `stub`, creating it on first use.
    pub fn get_or_create(&mut self, stub: CodeStub) -> Arc<CodeStub> {
        self.stubs
            .entry(stub.key())
            .or_insert_with(|| Arc::new(stub))
            .clone()
    }

    /// Looks up the stub for `key`, generating it if the key is valid.
    pub fn get_code(&mut self, key: StubKey) -> Option<Arc<CodeStub>> {
        if let Some(stub) = self.stubs.get(&key) {
            return Some(stub.clone());
        }
        let stub = CodeStub::from_key(key)?;
        Some(self.get_or_create(stub))
    }

    /// Returns the number of stubs generated so far.
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    /// Returns true if no stub has been generated.
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        let key = CodeStub::Call { argc: 2 }.key();
        assert_eq!(key.as_raw(), (2 << 8) | 3);
        assert_eq!(CodeStub::Binary(BinaryKind::Add).key().as_raw(), 1);
        assert_eq!(CodeStub::Unary(UnaryKind::Typeof).key().as_raw(), (3 << 8) | 2);
    }

    #[test]
    fn every_stub_rebuilds_from_its_key() {
        let mut stubs: Vec<CodeStub> = BinaryKind::ALL.iter().map(|k| CodeStub::Binary(*k)).collect();
        stubs.extend(UnaryKind::ALL.iter().map(|k| CodeStub::Unary(*k)));
        stubs.push(CodeStub::Call { argc: 0 });
        stubs.push(CodeStub::Call { argc: u16::MAX });
        for stub in stubs {
            assert_eq!(CodeStub::from_key(stub.key()), Some(stub));
        }
    }

    #[test]
    fn unknown_keys_rejected() {
        assert_eq!(CodeStub::from_key(StubKey::from_raw(0)), None);
        assert_eq!(CodeStub::from_key(StubKey::from_raw(0xff)), None);
        assert_eq!(CodeStub::from_key(StubKey::from_raw((13 << 8) | 1)), None);
        assert_eq!(CodeStub::from_key(StubKey::from_raw((4 << 8) | 2)), None);
        assert_eq!(CodeStub::from_key(StubKey::from_raw((0x1_0000 << 8) | 3)), None);
    }

    #[test]
    fn cache_shares_instances() {
        let mut cache = StubCache::new();
        let a = cache.get_or_create(CodeStub::Binary(BinaryKind::Mul));
        let b = cache.get_code(CodeStub::Binary(BinaryKind::Mul).key()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_generates_on_lookup() {
        let mut cache = StubCache::new();
        assert!(cache.is_empty());
        let stub = cache.get_code(CodeStub::Call { argc: 1 }.key()).unwrap();
        assert_eq!(*stub, CodeStub::Call { argc: 1 });
        assert!(cache.get_code(StubKey::from_raw(0)).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(CodeStub::Binary(BinaryKind::StrictEq).to_string(), "binary ===");
        assert_eq!(CodeStub::Call { argc: 3 }.to_string(), "call/3");
        assert_eq!(format!("{:?}", StubKey::from_raw(0x0203)), "StubKey(3:2)");
    }
}

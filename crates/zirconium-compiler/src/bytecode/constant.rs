//! Constant pool for compiled chunks.
//!
//! The constant pool stores literal values plus the names used by calls,
//! jumps and variable access.

use std::fmt;

use rustc_hash::FxHashMap;
use zirconium_parser::ast::format_number;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    String(String),
    Number(f64),
    Boolean(bool),
    Undefined,
}

impl Constant {
    /// The string payload, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::String(s) => write!(f, "{:?}", s),
            Constant::Number(n) => write!(f, "{}", format_number(*n)),
            Constant::Boolean(b) => write!(f, "{}", b),
            Constant::Undefined => write!(f, "undefined"),
        }
    }
}

/// Constant pool with deduplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    /// The actual constants.
    constants: Vec<Constant>,
    /// Deduplication index: maps constant to its index.
    index: FxHashMap<ConstantKey, u32>,
}

/// Key for constant deduplication (hashable version of Constant).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    String(String),
    Number(u64), // Bit pattern for hashing
    Boolean(bool),
    Undefined,
}

impl ConstantPool {
    /// Create a new empty constant pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from a decoded constant list, keeping its order.
    pub fn from_constants(constants: Vec<Constant>) -> Self {
        let mut index = FxHashMap::default();
        for (i, constant) in constants.iter().enumerate() {
            index.entry(Self::to_key(constant)).or_insert(i as u32);
        }
        Self { constants, index }
    }

    /// Add or get existing constant, returns index.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let key = Self::to_key(&constant);

        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        self.index.insert(key, idx);
        idx
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> u32 {
        self.add(Constant::String(value.into()))
    }

    pub fn add_number(&mut self, value: f64) -> u32 {
        self.add(Constant::Number(value))
    }

    /// Get constant by index.
    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// Get all constants (for serialization).
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Number of constants.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    fn to_key(constant: &Constant) -> ConstantKey {
        match constant {
            Constant::String(s) => ConstantKey::String(s.clone()),
            Constant::Number(n) => ConstantKey::Number(n.to_bits()),
            Constant::Boolean(b) => ConstantKey::Boolean(*b),
            Constant::Undefined => ConstantKey::Undefined,
        }
    }
}

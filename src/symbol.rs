//! A minimal symbol table: just enough for the constant folder's `sizeof` handling.
//!
//! The full type-checker this would eventually back is out of scope; this module is the stub the
//! folder needs to resolve `sizeof(Type)` without guessing, and the hook a future type-check pass
//! would register user-defined type names through.

use ahash::AHashMap;

/// The built-in type keywords, mirroring [`crate::token::Keyword`]'s type-keyword subset.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Type {
    Void,
    Char,
    StringT,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Struct,
    Union,
    Enum,
    Typedef,
}

/// What the folder needs to know about a type to fold `sizeof`: its size in bytes and whether it
/// is a pointer (pointers are always word-sized regardless of pointee).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TypeLayout {
    pub size: usize,
    pub is_pointer: bool,
}

impl TypeLayout {
    #[must_use]
    pub const fn value(size: usize) -> Self {
        Self { size, is_pointer: false }
    }

    #[must_use]
    pub const fn pointer() -> Self {
        Self { size: 8, is_pointer: true }
    }
}

/// Name -> layout table for user-defined `struct`/`union`/`enum`/`typedef` names. Populated
/// externally by a (not yet built) type-check pass; the folder only ever reads from it.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    named: AHashMap<Box<str>, TypeLayout>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type's layout (struct/union/enum/typedef). Last registration for a given
    /// name wins, matching a single-translation-unit, no-redefinition-checking front end.
    pub fn define(&mut self, name: impl Into<Box<str>>, layout: TypeLayout) {
        self.named.insert(name.into(), layout);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeLayout> {
        self.named.get(name)
    }

    /// `sizeof` for one of the built-in type keywords. Matches the host `sizeof` the reference
    /// implementation used for `int`/`double`/`char`/`char*` (a 64-bit target's `long`/`double`
    /// are 8 bytes; `short` is 2; `float`/`int` are 4; `char` is 1; `void` has no size and is
    /// rejected by the caller before reaching here).
    #[must_use]
    pub fn size_of_builtin(ty: Type) -> Option<usize> {
        Some(match ty {
            Type::Void => return None,
            Type::Char | Type::Signed | Type::Unsigned => 1,
            Type::Short => 2,
            Type::Int | Type::Float => 4,
            Type::Long | Type::Double => 8,
            Type::StringT => 8, // char* under the hood
            Type::Struct | Type::Union | Type::Enum | Type::Typedef => return None,
        })
    }
}

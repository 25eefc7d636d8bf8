//! Declarations as extracted from `.var` and `.typ` files.
//!
//! These objects are the output of the parser. Array bounds may still refer
//! to constants by name and constant values are the unevaluated expression
//! text; both are resolved by constant folding.

use crate::core::SourceSpan;

/// An array bound as written in the declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    Literal(i64),
    Symbol(String),
}

/// The bounds of a one-dimensional array as written, `[low..high]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundsDecl {
    pub low: Bound,
    pub high: Bound,
}

/// A global variable from a `VAR` or `VAR RETAIN` section.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub type_name: String,
    pub bounds: Option<BoundsDecl>,
    pub span: SourceSpan,
}

/// A constant from a `VAR CONSTANT` section.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantDecl {
    pub name: String,
    pub type_name: String,
    /// The initial value expression as written, without the trailing `;`.
    pub value: String,
    pub span: SourceSpan,
}

/// A member of a structure type.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberDecl {
    pub name: String,
    pub type_name: String,
    pub bounds: Option<BoundsDecl>,
    /// Text of the second trailing comment on the member's line, or empty.
    pub annotation: String,
    /// Name of the structure type that contains the member.
    pub parent_type: String,
    pub span: SourceSpan,
}

/// Every declaration extracted from a set of files.
#[derive(Clone, Debug, Default)]
pub struct DeclarationSet {
    pub variables: Vec<VariableDecl>,
    pub constants: Vec<ConstantDecl>,
    pub members: Vec<MemberDecl>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the declarations in other after the declarations in self.
    pub fn extend(&mut self, other: DeclarationSet) {
        self.variables.extend(other.variables);
        self.constants.extend(other.constants);
        self.members.extend(other.members);
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.constants.is_empty() && self.members.is_empty()
    }
}

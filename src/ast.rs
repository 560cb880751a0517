//! The AST model: a single uniform n-ary node shape used by every production the parser emits.

use crate::token::Token;
use std::fmt;

/// The closed set of AST node kinds. All of them share the same [`AstNode`] shape; interpretation
/// of the attached token list and child list is fixed per kind.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum AstKind {
    Program,
    GlobalVarDecl,
    FnDecl,
    FnDef,
    Enum,
    Struct,
    Union,
    ParamList,
    EnumList,
    MemberList,
    LabeledStmt,
    ExprStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    GotoStmt,
    CompoundStmt,
    LocalVarDecl,
    ForStmt,
    WhileStmt,
    DoStmt,
    IfStmt,
    SwitchStmt,
    SwitchBody,
    Literal,
    BinaryExpr,
    UnaryExpr,
    IdentifierExpr,
    ParenExpr,
    TypeCastExpr,
    AssignmentExpr,
    FnCall,
    FnCallArgList,

    // Folder-internal precedence-level nodes. The parser emits these directly; the validator
    // either collapses them into a `Literal` or returns a reduced node of the same kind.
    ConditionalExpr,
    LogicalOrExpr,
    LogicalAndExpr,
    BitwiseOrExpr,
    BitwiseXorExpr,
    BitwiseAndExpr,
    EqualityExpr,
    RelationalExpr,
    ShiftExpr,
    AdditiveExpr,
    MultiplicativeExpr,
    CastExpr,
    PostfixExpr,
    PrimaryExpr,
}

/// A single AST node: a kind tag, the ordered tokens the production consumed that are not
/// themselves child nodes (operators, keywords, delimiters), and the ordered list of children.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: AstKind,
    pub tokens: Vec<Token>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    #[must_use]
    pub fn new(kind: AstKind, tokens: Vec<Token>, children: Vec<AstNode>) -> Self {
        Self { kind, tokens, children }
    }

    #[must_use]
    pub fn leaf(kind: AstKind, tokens: Vec<Token>) -> Self {
        Self { kind, tokens, children: Vec::new() }
    }

    /// Render an indented tree view with an ASCII-art spine, for debugging/CLI `-l`/`-c` output.
    #[must_use]
    pub fn print_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, "", true);
        out
    }

    fn write_tree(&self, out: &mut String, prefix: &str, is_last: bool) {
        let connector = if prefix.is_empty() { "" } else if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&format!("{:?}", self.kind));
        if !self.tokens.is_empty() {
            let texts: Vec<&str> = self.tokens.iter().map(|t| &*t.text).collect();
            out.push_str(&format!(" [{}]", texts.join(", ")));
        }
        out.push('\n');

        let child_prefix = if prefix.is_empty() {
            String::new()
        } else if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        for (i, child) in self.children.iter().enumerate() {
            let last = i + 1 == self.children.len();
            child.write_tree(out, &child_prefix, last);
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Position, TokenKind};

    #[test]
    fn tree_printer_includes_kind_and_tokens() {
        let plus = Token::new(TokenKind::Plus, "+", Position::START, 1);
        let node = AstNode::new(AstKind::AdditiveExpr, vec![plus], vec![]);
        let rendered = node.print_tree();
        assert!(rendered.contains("AdditiveExpr"));
        assert!(rendered.contains('+'));
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let node = AstNode::leaf(AstKind::IdentifierExpr, vec![]);
        let mut copy = node.clone();
        copy.tokens.push(Token::new(TokenKind::Identifier, "y", Position::START, 1));
        assert!(node.tokens.is_empty());
        assert_eq!(copy.tokens.len(), 1);
    }
}

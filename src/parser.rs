//! Recursive-descent parser with Pratt-style precedence climbing for expressions.

use crate::ast::{AstKind, AstNode};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::token::{Keyword, Token, TokenKind};

/// Binary operator precedence, per the table in the operator-precedence climber. Higher binds
/// tighter. `0` means "not a binary operator".
fn binary_precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Dot | TokenKind::Arrow => 13,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 11,
        TokenKind::Plus | TokenKind::Minus => 10,
        TokenKind::Shl | TokenKind::Shr => 9,
        TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => 8,
        TokenKind::Eq | TokenKind::NotEq => 7,
        TokenKind::Amp => 6,
        TokenKind::Caret => 5,
        TokenKind::Pipe => 4,
        TokenKind::AndAnd => 3,
        TokenKind::OrOr => 2,
        _ => 0,
    }
}

fn binary_kind_for(kind: TokenKind) -> AstKind {
    match kind {
        TokenKind::OrOr => AstKind::LogicalOrExpr,
        TokenKind::AndAnd => AstKind::LogicalAndExpr,
        TokenKind::Pipe => AstKind::BitwiseOrExpr,
        TokenKind::Caret => AstKind::BitwiseXorExpr,
        TokenKind::Amp => AstKind::BitwiseAndExpr,
        TokenKind::Eq | TokenKind::NotEq => AstKind::EqualityExpr,
        TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => AstKind::RelationalExpr,
        TokenKind::Shl | TokenKind::Shr => AstKind::ShiftExpr,
        TokenKind::Plus | TokenKind::Minus => AstKind::AdditiveExpr,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => AstKind::MultiplicativeExpr,
        _ => AstKind::BinaryExpr,
    }
}

fn is_prefix_unary(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Plus | TokenKind::Minus | TokenKind::Not | TokenKind::Tilde | TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::Amp | TokenKind::Star)
}

fn is_postfix(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
}

/// Token-cursor parser. Trivia is stripped on construction so the parser and everything it
/// produces never has to special-case whitespace or comments.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let filtered: Vec<Token> = tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect();
        Self { tokens: filtered, pos: 0, diagnostics: Vec::new() }
    }

    fn peek(&self, ahead: usize) -> &Token {
        self.tokens.get(self.pos + ahead).unwrap_or_else(|| self.tokens.last().expect("token stream always ends in Eof"))
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn bump(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume a token of the expected kind, or synthesize an empty placeholder and record a
    /// diagnostic without advancing the cursor. This is the crate's replacement for the reference
    /// implementation's leaking/aliasing `matchToken`: no allocation beyond an empty boxed string,
    /// and the cursor position is left untouched on mismatch so later recovery can still progress.
    fn expect(&mut self, kind: TokenKind) -> Token {
        if self.check(kind) {
            return self.bump();
        }
        let pos = self.current().pos;
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::Parse,
            format!("expected {:?}, found {:?}", kind, self.current().kind),
            Some(self.current().clone()),
        ));
        Token::placeholder(kind, pos)
    }

    fn expect_progress(&self, before: usize, production: &str) {
        assert!(self.pos > before || self.at_end(), "no progress made in production `{production}`");
    }

    // ---- Program -----------------------------------------------------------------------------

    pub fn parse_program(&mut self) -> AstNode {
        let mut children = Vec::new();
        while !self.at_end() {
            let before = self.pos;
            children.push(self.parse_global_decl());
            self.expect_progress(before, "GlobalDecl");
        }
        AstNode::new(AstKind::Program, Vec::new(), children)
    }

    fn parse_global_decl(&mut self) -> AstNode {
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Enum) {
            return self.parse_enum_decl();
        }
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Struct) {
            return self.parse_aggregate_decl(AstKind::Struct);
        }
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Union) {
            return self.parse_aggregate_decl(AstKind::Union);
        }

        let mut tokens = Vec::new();
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Const) {
            tokens.push(self.bump());
        }
        tokens.push(self.expect_type());
        let name = self.expect(TokenKind::Identifier);

        if self.check(TokenKind::LParen) {
            tokens.push(self.bump()); // (
            let params = self.parse_param_list();
            tokens.push(self.expect(TokenKind::RParen));
            tokens.insert(1, name);
            if self.check(TokenKind::LBrace) {
                let body = self.parse_compound_stmt();
                return AstNode::new(AstKind::FnDef, tokens, vec![params, body]);
            }
            tokens.push(self.expect(TokenKind::Semicolon));
            return AstNode::new(AstKind::FnDecl, tokens, vec![params]);
        }

        tokens.insert(1, name);
        let mut children = Vec::new();
        if self.check(TokenKind::Assign) {
            tokens.push(self.bump());
            children.push(self.parse_expression(0));
        }
        tokens.push(self.expect(TokenKind::Semicolon));
        AstNode::new(AstKind::GlobalVarDecl, tokens, children)
    }

    /// `TypeOrIdent`: a built-in type keyword, or a user-defined `struct`/`union`/`enum`/`typedef`
    /// name, which at this stage is indistinguishable from a plain identifier (the symbol table
    /// that would resolve it belongs to the not-yet-built type-checker). Mirrors the reference
    /// grammar's "if KEYWORD ... else matchToken(IDENTIFIER)" shape used by global declarations,
    /// parameter lists, and struct/union member lists.
    fn expect_type(&mut self) -> Token {
        if self.check(TokenKind::Keyword) {
            let kw = self.current().keyword().unwrap();
            if kw.is_type_keyword() {
                return self.bump();
            }
        }
        if self.check(TokenKind::Identifier) {
            return self.bump();
        }
        self.expect(TokenKind::Keyword)
    }

    fn parse_param_list(&mut self) -> AstNode {
        let mut tokens = Vec::new();
        let mut children = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                tokens.push(self.expect_type());
                children.push(AstNode::leaf(AstKind::IdentifierExpr, vec![self.expect(TokenKind::Identifier)]));
                if self.check(TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        AstNode::new(AstKind::ParamList, tokens, children)
    }

    fn parse_enum_decl(&mut self) -> AstNode {
        let mut tokens = vec![self.bump()]; // enum
        if self.check(TokenKind::Identifier) {
            tokens.push(self.bump());
        }
        tokens.push(self.expect(TokenKind::LBrace));
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let mut member_tokens = vec![self.expect(TokenKind::Identifier)];
            let mut member_children = Vec::new();
            if self.check(TokenKind::Assign) {
                member_tokens.push(self.bump());
                member_children.push(self.parse_expression(0));
            }
            members.push(AstNode::new(AstKind::EnumList, member_tokens, member_children));
            if self.check(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        tokens.push(self.expect(TokenKind::RBrace));
        tokens.push(self.expect(TokenKind::Semicolon));
        AstNode::new(AstKind::Enum, tokens, members)
    }

    fn parse_aggregate_decl(&mut self, kind: AstKind) -> AstNode {
        let mut tokens = vec![self.bump()]; // struct/union
        if self.check(TokenKind::Identifier) {
            tokens.push(self.bump());
        }
        tokens.push(self.expect(TokenKind::LBrace));
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.pos;
            let mut member_tokens = vec![self.expect_type()];
            member_tokens.push(self.expect(TokenKind::Identifier));
            member_tokens.push(self.expect(TokenKind::Semicolon));
            members.push(AstNode::leaf(AstKind::MemberList, member_tokens));
            self.expect_progress(before, "StructMember");
        }
        tokens.push(self.expect(TokenKind::RBrace));
        tokens.push(self.expect(TokenKind::Semicolon));
        AstNode::new(kind, tokens, members)
    }

    // ---- Statements ---------------------------------------------------------------------------

    fn parse_statement(&mut self) -> AstNode {
        if self.check(TokenKind::LBrace) {
            return self.parse_compound_stmt();
        }
        if self.check(TokenKind::Identifier) && self.peek(1).kind == TokenKind::Colon {
            let name = self.bump();
            let colon = self.bump();
            let inner = self.parse_statement();
            return AstNode::new(AstKind::LabeledStmt, vec![name, colon], vec![inner]);
        }
        if self.check(TokenKind::Keyword) {
            match self.current().keyword().unwrap() {
                Keyword::Return => return self.parse_return_stmt(),
                Keyword::Break => {
                    let tokens = vec![self.bump(), self.expect(TokenKind::Semicolon)];
                    return AstNode::leaf(AstKind::BreakStmt, tokens);
                }
                Keyword::Continue => {
                    let tokens = vec![self.bump(), self.expect(TokenKind::Semicolon)];
                    return AstNode::leaf(AstKind::ContinueStmt, tokens);
                }
                Keyword::Goto => {
                    let tokens = vec![self.bump(), self.expect(TokenKind::Identifier), self.expect(TokenKind::Semicolon)];
                    return AstNode::leaf(AstKind::GotoStmt, tokens);
                }
                Keyword::If => return self.parse_if_stmt(),
                Keyword::While => return self.parse_while_stmt(),
                Keyword::Do => return self.parse_do_stmt(),
                Keyword::For => return self.parse_for_stmt(),
                Keyword::Switch => return self.parse_switch_stmt(),
                kw if is_decl_start(kw) => return self.parse_local_var_decl(),
                _ => {}
            }
        }
        self.parse_expr_stmt()
    }

    fn parse_return_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.bump()];
        let mut children = Vec::new();
        if !self.check(TokenKind::Semicolon) {
            children.push(self.parse_expression(0));
        }
        tokens.push(self.expect(TokenKind::Semicolon));
        AstNode::new(AstKind::ReturnStmt, tokens, children)
    }

    fn parse_compound_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.expect(TokenKind::LBrace)];
        let mut children = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.pos;
            children.push(self.parse_statement());
            self.expect_progress(before, "Statement");
        }
        tokens.push(self.expect(TokenKind::RBrace));
        AstNode::new(AstKind::CompoundStmt, tokens, children)
    }

    fn parse_local_var_decl(&mut self) -> AstNode {
        let mut tokens = Vec::new();
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Const) {
            tokens.push(self.bump());
        }
        tokens.push(self.expect_type());
        tokens.push(self.expect(TokenKind::Identifier));
        let mut children = Vec::new();
        if self.check(TokenKind::Assign) {
            tokens.push(self.bump());
            children.push(self.parse_expression(0));
        }
        tokens.push(self.expect(TokenKind::Semicolon));
        AstNode::new(AstKind::LocalVarDecl, tokens, children)
    }

    fn parse_expr_stmt(&mut self) -> AstNode {
        let mut children = Vec::new();
        if !self.check(TokenKind::Semicolon) {
            children.push(self.parse_expression(0));
        }
        let tokens = vec![self.expect(TokenKind::Semicolon)];
        AstNode::new(AstKind::ExprStmt, tokens, children)
    }

    fn parse_if_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.bump(), self.expect(TokenKind::LParen)];
        let cond = self.parse_expression(0);
        tokens.push(self.expect(TokenKind::RParen));
        let then_branch = self.parse_statement();
        let mut children = vec![cond, then_branch];
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Else) {
            tokens.push(self.bump());
            children.push(self.parse_statement());
        }
        AstNode::new(AstKind::IfStmt, tokens, children)
    }

    fn parse_while_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.bump(), self.expect(TokenKind::LParen)];
        let cond = self.parse_expression(0);
        tokens.push(self.expect(TokenKind::RParen));
        let body = self.parse_statement();
        AstNode::new(AstKind::WhileStmt, tokens, vec![cond, body])
    }

    fn parse_do_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.bump()];
        let body = self.parse_statement();
        tokens.push(self.expect(TokenKind::Keyword)); // while
        tokens.push(self.expect(TokenKind::LParen));
        let cond = self.parse_expression(0);
        tokens.push(self.expect(TokenKind::RParen));
        tokens.push(self.expect(TokenKind::Semicolon));
        AstNode::new(AstKind::DoStmt, tokens, vec![body, cond])
    }

    fn parse_for_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.bump(), self.expect(TokenKind::LParen)];
        let mut children = Vec::new();
        if self.check(TokenKind::Semicolon) {
            tokens.push(self.bump());
        } else if self.check(TokenKind::Keyword) && is_decl_start(self.current().keyword().unwrap()) {
            children.push(self.parse_local_var_decl());
        } else {
            children.push(self.parse_expr_stmt());
        }
        if !self.check(TokenKind::Semicolon) {
            children.push(self.parse_expression(0));
        }
        tokens.push(self.expect(TokenKind::Semicolon));
        if !self.check(TokenKind::RParen) {
            children.push(self.parse_expression(0));
        }
        tokens.push(self.expect(TokenKind::RParen));
        children.push(self.parse_statement());
        AstNode::new(AstKind::ForStmt, tokens, children)
    }

    fn parse_switch_stmt(&mut self) -> AstNode {
        let mut tokens = vec![self.bump(), self.expect(TokenKind::LParen)];
        let cond = self.parse_expression(0);
        tokens.push(self.expect(TokenKind::RParen));
        tokens.push(self.expect(TokenKind::LBrace));
        let mut cases = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.pos;
            let mut case_tokens = Vec::new();
            let mut case_children = Vec::new();
            if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Case) {
                case_tokens.push(self.bump());
                case_children.push(self.parse_expression(0));
            } else {
                case_tokens.push(self.expect(TokenKind::Keyword)); // default
            }
            case_tokens.push(self.expect(TokenKind::Colon));
            while !self.at_case_boundary() {
                case_children.push(self.parse_statement());
            }
            cases.push(AstNode::new(AstKind::SwitchBody, case_tokens, case_children));
            self.expect_progress(before, "SwitchCase");
        }
        tokens.push(self.expect(TokenKind::RBrace));
        AstNode::new(AstKind::SwitchStmt, tokens, {
            let mut children = vec![cond];
            children.extend(cases);
            children
        })
    }

    fn at_case_boundary(&self) -> bool {
        if self.at_end() || self.check(TokenKind::RBrace) {
            return true;
        }
        if self.check(TokenKind::Keyword) {
            matches!(self.current().keyword(), Some(Keyword::Case) | Some(Keyword::Default))
        } else {
            false
        }
    }

    // ---- Expressions (Pratt precedence climbing) ----------------------------------------------

    fn parse_expression(&mut self, min_precedence: u8) -> AstNode {
        // Two-token lookahead for assignment: `Identifier =` is recognized ahead of the climb.
        if min_precedence == 0 && self.check(TokenKind::Identifier) && self.peek(1).kind == TokenKind::Assign {
            let name = self.bump();
            let eq = self.bump();
            let value = self.parse_expression(0);
            let ident = AstNode::leaf(AstKind::IdentifierExpr, vec![name]);
            return AstNode::new(AstKind::AssignmentExpr, vec![eq], vec![ident, value]);
        }

        let mut left = self.parse_unary();
        loop {
            let prec = binary_precedence(self.current().kind);
            if prec == 0 || prec < min_precedence {
                break;
            }
            let op = self.bump();
            let right = self.parse_expression(prec + 1);
            left = AstNode::new(binary_kind_for(op.kind), vec![op], vec![left, right]);
        }

        if self.check(TokenKind::Question) {
            let q = self.bump();
            let then_branch = self.parse_expression(0);
            let colon = self.expect(TokenKind::Colon);
            let else_branch = self.parse_expression(0);
            left = AstNode::new(AstKind::ConditionalExpr, vec![q, colon], vec![left, then_branch, else_branch]);
        }
        left
    }

    fn parse_unary(&mut self) -> AstNode {
        if is_prefix_unary(self.current().kind) {
            let op = self.bump();
            let operand = self.parse_unary();
            return AstNode::new(AstKind::UnaryExpr, vec![op], vec![operand]);
        }
        if self.check(TokenKind::Keyword) && self.current().keyword() == Some(Keyword::Sizeof) {
            let kw = self.bump();
            let paren_type = self.check(TokenKind::LParen)
                && self.peek(1).kind == TokenKind::Keyword
                && self.peek(1).keyword().map(Keyword::is_type_keyword).unwrap_or(false)
                && self.peek(2).kind == TokenKind::RParen;
            if paren_type {
                let lp = self.bump();
                let ty = self.bump();
                let rp = self.bump();
                return AstNode::new(AstKind::UnaryExpr, vec![kw, lp, ty, rp], vec![]);
            }
            let operand = self.parse_unary();
            return AstNode::new(AstKind::UnaryExpr, vec![kw], vec![operand]);
        }
        self.parse_cast()
    }

    fn parse_cast(&mut self) -> AstNode {
        if self.check(TokenKind::LParen) {
            let is_cast = self.peek(1).kind == TokenKind::Keyword
                && self.peek(1).keyword().map(Keyword::is_type_keyword).unwrap_or(false)
                && self.peek(2).kind == TokenKind::RParen;
            if is_cast {
                let lp = self.bump();
                let ty = self.bump();
                let rp = self.bump();
                let operand = self.parse_cast();
                return AstNode::new(AstKind::TypeCastExpr, vec![lp, ty, rp], vec![operand]);
            }
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> AstNode {
        let mut node = self.parse_primary();
        loop {
            if is_postfix(self.current().kind) {
                let op = self.bump();
                node = AstNode::new(AstKind::PostfixExpr, vec![op], vec![node]);
                continue;
            }
            break;
        }
        node
    }

    fn parse_primary(&mut self) -> AstNode {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::IntegerLiteral | TokenKind::OctalLiteral | TokenKind::HexLiteral | TokenKind::FloatLiteral | TokenKind::CharLiteral | TokenKind::StringLiteral => {
                self.bump();
                AstNode::leaf(AstKind::Literal, vec![tok])
            }
            TokenKind::Identifier => {
                if self.peek(1).kind == TokenKind::LParen {
                    return self.parse_fn_call();
                }
                self.bump();
                AstNode::leaf(AstKind::IdentifierExpr, vec![tok])
            }
            TokenKind::LParen => {
                let lp = self.bump();
                let inner = self.parse_expression(0);
                let rp = self.expect(TokenKind::RParen);
                AstNode::new(AstKind::ParenExpr, vec![lp, rp], vec![inner])
            }
            _ => {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Parse,
                    format!("expected an expression, found {:?}", tok.kind),
                    Some(tok.clone()),
                ));
                self.bump();
                AstNode::leaf(AstKind::Literal, vec![Token::placeholder(TokenKind::IntegerLiteral, tok.pos)])
            }
        }
    }

    fn parse_fn_call(&mut self) -> AstNode {
        let name = self.bump();
        let lp = self.bump();
        let args = self.parse_arg_list();
        let rp = self.expect(TokenKind::RParen);
        AstNode::new(AstKind::FnCall, vec![name, lp, rp], vec![args])
    }

    fn parse_arg_list(&mut self) -> AstNode {
        let mut children = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                children.push(self.parse_expression(0));
                if self.check(TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        AstNode::new(AstKind::FnCallArgList, Vec::new(), children)
    }
}

fn is_decl_start(kw: Keyword) -> bool {
    kw.is_type_keyword() || matches!(kw, Keyword::Const)
}

/// Parse a filtered token stream into a `Program` AST, per the `parse(tokens) -> (ast,
/// diagnostics)` driver interface.
#[must_use]
pub fn parse(tokens: Vec<Token>) -> (AstNode, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_program();
    (ast, parser.diagnostics)
}

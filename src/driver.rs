//! The driver-to-core interface: a small trait the CLI (or any future host) implements to hand
//! source text to the pipeline, plus the free functions that are the pipeline's real public
//! contract (`lex`, `parse`, `validate`, re-exported from their owning modules).

use crate::ast::AstNode;
use crate::diagnostics::Diagnostic;
use tracing::{info_span, warn};

/// Supplies source text to the pipeline. Exists so a test can hand over a string literal and a
/// future multi-file CLI can hand over a file's contents without either caring how the other
/// works.
pub trait CompilerDriver {
    fn source(&self) -> &str;
}

impl CompilerDriver for str {
    fn source(&self) -> &str {
        self
    }
}

impl CompilerDriver for String {
    fn source(&self) -> &str {
        self.as_str()
    }
}

/// Run the full pipeline over one driver's source text: lex, parse, and (optionally) fold.
/// Returns the final AST plus every diagnostic collected across all three stages, in stage order.
pub fn run_pipeline(driver: &dyn CompilerDriver, optimize: bool) -> (AstNode, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let (tokens, lex_diags) = {
        let _span = info_span!("lex").entered();
        crate::lexer::lex(driver.source())
    };
    for d in &lex_diags {
        warn!(%d, "lex diagnostic");
    }
    diagnostics.extend(lex_diags);

    let (ast, parse_diags) = {
        let _span = info_span!("parse").entered();
        crate::parser::parse(tokens)
    };
    for d in &parse_diags {
        warn!(%d, "parse diagnostic");
    }
    diagnostics.extend(parse_diags);

    let (ast, validate_diags) = {
        let _span = info_span!("validate").entered();
        crate::validate::validate(ast, optimize)
    };
    for d in &validate_diags {
        warn!(%d, "validate diagnostic");
    }
    diagnostics.extend(validate_diags);

    (ast, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_runs_end_to_end() {
        let (ast, diags) = run_pipeline(&"int x = 1 + 2;".to_string(), false);
        assert!(diags.is_empty());
        assert_eq!(ast.kind, crate::ast::AstKind::Program);
    }
}

use cfront::{lex, parse, validate, AstKind, TokenValue};

fn fold_initializer(src: &str) -> (cfront::AstNode, Vec<cfront::Diagnostic>) {
    let (tokens, lex_diags) = lex(src);
    assert!(lex_diags.is_empty());
    let (ast, parse_diags) = parse(tokens);
    assert!(parse_diags.is_empty(), "{parse_diags:?}");
    let decl = ast.children.into_iter().next().expect("one global decl");
    let expr = decl.children.into_iter().next().expect("initializer expression");
    validate(expr, false)
}

fn int_value(node: &cfront::AstNode) -> i32 {
    match &node.tokens[0].value {
        TokenValue::Int(i) => *i,
        other => panic!("expected an integer literal, got {other:?}"),
    }
}

#[test]
fn numeric_kinds_combine_across_bases() {
    let (folded, diags) = fold_initializer("int x = 0x1F + 010 + 12;");
    assert!(diags.is_empty());
    assert_eq!(folded.kind, AstKind::Literal);
    assert_eq!(int_value(&folded), 51);
}

#[test]
fn short_circuit_preserves_side_effecting_operand() {
    let (folded, diags) = fold_initializer("int x = 0 && f();");
    assert!(diags.is_empty());
    assert_eq!(folded.kind, AstKind::LogicalAndExpr);
    // the non-constant call survives untouched
    assert_eq!(folded.children[1].kind, AstKind::FnCall);
}

#[test]
fn division_by_zero_is_reported_and_not_folded() {
    let (folded, diags) = fold_initializer("int x = 10 / (2 - 2);");
    assert!(diags.iter().any(|d| d.message == "Division by zero."));
    assert_ne!(folded.kind, AstKind::Literal);
}

#[test]
fn conditional_fold_drops_the_untaken_branch() {
    let (folded, diags) = fold_initializer("int x = 1 ? 2 + 3 : 4;");
    assert!(diags.is_empty());
    assert_eq!(folded.kind, AstKind::Literal);
    assert_eq!(int_value(&folded), 5);
}

#[test]
fn partial_fold_keeps_non_constant_tail_for_relational_chain() {
    // Relational/equality/shift only fold their *leading* constant run.
    let (folded, diags) = fold_initializer("int x = (1 < 2) + y;");
    assert!(diags.is_empty());
    // the inner (1 < 2) folds to 1, then `1 + y` stays additive since y is non-constant
    assert_eq!(folded.kind, AstKind::AdditiveExpr);
}

#[test]
fn idempotent_on_an_already_folded_tree() {
    let (once, _) = fold_initializer("int x = 1 + 2 + 3;");
    let (twice, diags) = validate(once.clone(), false);
    assert!(diags.is_empty());
    assert_eq!(int_value(&once), int_value(&twice));
}

#[test]
fn float_promotes_integer_accumulator() {
    let (folded, diags) = fold_initializer("int x = 1 + 2.5;");
    assert!(diags.is_empty());
    match &folded.tokens[0].value {
        TokenValue::Float(f) => assert!((*f - 3.5).abs() < f64::EPSILON),
        other => panic!("expected a float literal, got {other:?}"),
    }
}

#[test]
fn string_contributes_one_in_additive_context() {
    let (folded, diags) = fold_initializer("int x = \"a\" + 1;");
    assert!(diags.is_empty());
    assert_eq!(int_value(&folded), 2);
}

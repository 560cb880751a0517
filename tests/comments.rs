use cfront::{lex, parse, TokenKind};

#[test]
fn line_comment_runs_to_newline() {
    let (tokens, diags) = lex("int x; // trailing comment\nint y;");
    assert!(diags.is_empty());
    let comment = tokens.iter().find(|t| t.kind == TokenKind::LineComment).unwrap();
    assert_eq!(&*comment.text, "// trailing comment");
}

#[test]
fn line_comment_consumes_preceding_cr() {
    let (tokens, _) = lex("int x; // c\r\nint y;");
    let comment = tokens.iter().find(|t| t.kind == TokenKind::LineComment).unwrap();
    assert_eq!(&*comment.text, "// c\r");
}

#[test]
fn block_comment_spans_multiple_lines() {
    let (tokens, diags) = lex("/* line one\n line two */ int x;");
    assert!(diags.is_empty());
    let comment = tokens.iter().find(|t| t.kind == TokenKind::BlockComment).unwrap();
    assert!(comment.text.contains("line one"));
    assert!(comment.text.contains("line two"));
}

#[test]
fn unterminated_block_comment_reports_diagnostic() {
    let (_, diags) = lex("/* never closed");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "The multi-line comment was not closed!");
}

#[test]
fn comments_never_survive_into_the_ast() {
    let (tokens, _) = lex("int x = 1; // comment\n");
    let (ast, _) = parse(tokens);
    fn walk(n: &cfront::AstNode, found: &mut bool) {
        for t in &n.tokens {
            if t.kind.is_trivia() {
                *found = true;
            }
        }
        for c in &n.children {
            walk(c, found);
        }
    }
    let mut found = false;
    walk(&ast, &mut found);
    assert!(!found);
}

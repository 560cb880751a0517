use cfront::{lex, TokenKind, TokenValue};

#[test]
fn reconstructs_source_text_exactly() {
    let src = "int main ( ) { return 0 ; }\n";
    let (tokens, diags) = lex(src);
    assert!(diags.is_empty());
    let joined: String = tokens.iter().map(|t| &*t.text).collect();
    assert_eq!(joined, src);
}

#[test]
fn multi_char_operators_are_greedy() {
    let (tokens, _) = lex("a <<= b; a << b; a < b;");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).filter(|k| !k.is_trivia()).collect();
    assert!(kinds.contains(&TokenKind::ShlEq));
    assert!(kinds.contains(&TokenKind::Shl));
    assert!(kinds.contains(&TokenKind::Lt));
}

#[test]
fn identifiers_vs_keywords() {
    let (tokens, _) = lex("int integer_value sizeof_thing sizeof");
    let kinds_and_text: Vec<_> = tokens.iter().filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof).map(|t| (t.kind, &*t.text)).collect();
    assert_eq!(kinds_and_text[0], (TokenKind::Keyword, "int"));
    assert_eq!(kinds_and_text[1], (TokenKind::Identifier, "integer_value"));
    assert_eq!(kinds_and_text[2], (TokenKind::Identifier, "sizeof_thing"));
    assert_eq!(kinds_and_text[3], (TokenKind::Keyword, "sizeof"));
}

#[test]
fn char_literal_decodes_escape() {
    let (tokens, diags) = lex("'\\n'");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
    assert_eq!(tokens[0].value, TokenValue::Char(b'\n'));
}

#[test]
fn unterminated_char_literal_reports_diagnostic() {
    let (_, diags) = lex("'a");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "The character wasn't closed!");
}

#[test]
fn invalid_hex_digit_reports_diagnostic() {
    let (_, diags) = lex("0xAG");
    assert_eq!(diags[0].message, "Invalid character in a hexadecimal number");
}

#[test]
fn unknown_byte_reports_diagnostic() {
    let (tokens, diags) = lex("@");
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    assert_eq!(diags[0].message, "Unknown character found while lexing!");
}

#[test]
fn ends_in_a_single_eof_token() {
    let (tokens, _) = lex("x y z");
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
}

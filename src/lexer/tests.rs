//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords, builtins and identifiers
//! - Numeric, string and regex literals
//! - Operators and punctuation
//! - Comments and the hashbang line
//! - Fallback tokens for unmatched input
//! - Rule table construction

use super::{
    lexer::{check, tokenize, Lexer},
    options::LexerOptions,
    rules::{Directive, RuleDef, RuleTable},
    sophia::{self, SOPHIA_INFO},
    tokens::{Token, TokenKind},
};
use crate::MK_RULE;

fn pairs(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
    tokens
        .iter()
        .map(|token| (token.kind, token.value.as_str()))
        .collect()
}

/// Tokens without the whitespace between them.
fn significant(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source)
        .into_iter()
        .filter(|token| !token.is_insignificant())
        .map(|token| (token.kind, token.value))
        .collect()
}

fn kinds_of(source: &str) -> Vec<TokenKind> {
    significant(source).into_iter().map(|(kind, _)| kind).collect()
}

#[test]
fn test_tokenize_declaration_keywords() {
    let source = "let type record datatype function entrypoint contract namespace interface";
    let tokens = significant(source);

    assert_eq!(tokens.len(), 9);
    for (kind, _) in &tokens {
        assert_eq!(*kind, TokenKind::KeywordDeclaration);
    }
    assert_eq!(tokens[6].1, "contract");
}

#[test]
fn test_namespace_rule_is_shadowed() {
    let tokens = tokenize("contract Token =\n  namespace Util\ninterface Remote");
    assert!(tokens.iter().all(|token| token.kind != TokenKind::KeywordNamespace));
    assert_eq!(tokens[0].kind, TokenKind::KeywordDeclaration);
}

#[test]
fn test_tokenize_reserved_keywords() {
    assert_eq!(
        kinds_of("stateful payable public private"),
        vec![TokenKind::KeywordReserved; 4]
    );
}

#[test]
fn test_tokenize_control_keywords() {
    assert_eq!(
        kinds_of("if elif else switch include compiler"),
        vec![TokenKind::Keyword; 6]
    );
}

#[test]
fn test_tokenize_constants_and_literals() {
    assert_eq!(
        kinds_of("abort require state put true false"),
        vec![
            TokenKind::KeywordConstant,
            TokenKind::KeywordConstant,
            TokenKind::KeywordConstant,
            TokenKind::KeywordConstant,
            TokenKind::Literal,
            TokenKind::Literal,
        ]
    );
}

#[test]
fn test_tokenize_builtin_types() {
    assert_eq!(
        kinds_of("int bool address string char unit"),
        vec![TokenKind::NameBuiltin; 6]
    );
}

#[test]
fn test_keywords_need_a_word_boundary() {
    let tokens = significant("letter intx model stateful_x");

    assert_eq!(
        tokens,
        vec![
            (TokenKind::NameOther, "letter".to_string()),
            (TokenKind::NameOther, "intx".to_string()),
            (TokenKind::NameOther, "model".to_string()),
            (TokenKind::NameOther, "stateful_x".to_string()),
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = significant("foo _bar $baz café x1 \\u0041bc");

    assert_eq!(
        tokens,
        vec![
            (TokenKind::NameOther, "foo".to_string()),
            (TokenKind::NameOther, "_bar".to_string()),
            (TokenKind::NameOther, "$baz".to_string()),
            (TokenKind::NameOther, "café".to_string()),
            (TokenKind::NameOther, "x1".to_string()),
            (TokenKind::NameOther, "\\u0041bc".to_string()),
        ]
    );
}

#[test]
fn test_identifier_joiners_continue_a_name() {
    let tokens = significant("a\u{200d}b");
    assert_eq!(tokens, vec![(TokenKind::NameOther, "a\u{200d}b".to_string())]);
}

#[test]
fn test_tokenize_hex_number() {
    let tokens = tokenize("0xFFn");
    assert_eq!(pairs(&tokens), vec![(TokenKind::NumberHex, "0xFFn")]);
}

#[test]
fn test_tokenize_numbers() {
    assert_eq!(
        significant("0x1f 42 1.5"),
        vec![
            (TokenKind::NumberHex, "0x1f".to_string()),
            (TokenKind::NumberInteger, "42".to_string()),
            (TokenKind::NumberInteger, "1".to_string()),
            (TokenKind::Punctuation, ".".to_string()),
            (TokenKind::NumberInteger, "5".to_string()),
        ]
    );
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        significant("x += 1 == 2 && !y"),
        vec![
            (TokenKind::NameOther, "x".to_string()),
            (TokenKind::Operator, "+=".to_string()),
            (TokenKind::NumberInteger, "1".to_string()),
            (TokenKind::Operator, "==".to_string()),
            (TokenKind::NumberInteger, "2".to_string()),
            (TokenKind::Operator, "&&".to_string()),
            (TokenKind::Operator, "!".to_string()),
            (TokenKind::NameOther, "y".to_string()),
        ]
    );
}

#[test]
fn test_tokenize_word_operator() {
    assert_eq!(
        kinds_of("a mod b"),
        vec![
            TokenKind::NameOther,
            TokenKind::OperatorWord,
            TokenKind::NameOther
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        significant("(x) => [y, z];"),
        vec![
            (TokenKind::Punctuation, "(".to_string()),
            (TokenKind::NameOther, "x".to_string()),
            (TokenKind::Punctuation, ")".to_string()),
            (TokenKind::Punctuation, "=>".to_string()),
            (TokenKind::Punctuation, "[".to_string()),
            (TokenKind::NameOther, "y".to_string()),
            (TokenKind::Punctuation, ",".to_string()),
            (TokenKind::NameOther, "z".to_string()),
            (TokenKind::Punctuation, "]".to_string()),
            (TokenKind::Punctuation, ";".to_string()),
        ]
    );
}

#[test]
fn test_function_definition_scenario() {
    let tokens = tokenize("function foo() { }");

    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::KeywordDeclaration, "function"),
            (TokenKind::Text, " "),
            (TokenKind::NameOther, "foo"),
            (TokenKind::Punctuation, "("),
            (TokenKind::Punctuation, ")"),
            (TokenKind::Text, " "),
            (TokenKind::Punctuation, "{"),
            (TokenKind::Text, " "),
            (TokenKind::Punctuation, "}"),
        ]
    );
}

#[test]
fn test_tokenize_super_call() {
    assert_eq!(
        pairs(&tokenize("super(a, b)")),
        vec![(TokenKind::Keyword, "super"), (TokenKind::Text, "(a, b)")]
    );

    assert_eq!(
        pairs(&tokenize("super (x)")),
        vec![
            (TokenKind::Keyword, "super"),
            (TokenKind::Text, " "),
            (TokenKind::Text, "(x)")
        ]
    );
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize(r#""hello \"world\"" "a\\""#);

    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::StringDouble, r#""hello \"world\"""#),
            (TokenKind::Text, " "),
            (TokenKind::StringDouble, r#""a\\""#),
        ]
    );
}

#[test]
fn test_apostrophe_is_claimed_by_the_operator_rule() {
    let tokens = significant("'a'");
    assert_eq!(tokens[0], (TokenKind::Operator, "'".to_string()));
    assert!(tokens.iter().all(|(kind, _)| *kind != TokenKind::StringSingle));
}

#[test]
fn test_line_comment_scenario() {
    let tokens = tokenize("// hi\nlet x");

    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::CommentSingle, "// hi\n"),
            (TokenKind::KeywordDeclaration, "let"),
            (TokenKind::Text, " "),
            (TokenKind::NameOther, "x"),
        ]
    );
}

#[test]
fn test_block_comment_spans_lines() {
    let tokens = tokenize("/* a\n b */ x");

    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::CommentMultiline, "/* a\n b */"),
            (TokenKind::Text, " "),
            (TokenKind::NameOther, "x"),
        ]
    );
}

#[test]
fn test_html_comment_opener() {
    assert_eq!(
        significant("<!-- x"),
        vec![
            (TokenKind::Comment, "<!--".to_string()),
            (TokenKind::NameOther, "x".to_string()),
        ]
    );
}

#[test]
fn test_hashbang_only_at_buffer_start() {
    let tokens = tokenize("#!/usr/bin/env aesophia\nlet");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::CommentHashbang, "#!/usr/bin/env aesophia\n"),
            (TokenKind::KeywordDeclaration, "let"),
        ]
    );

    let tokens = tokenize("x\n#!/bin\n");
    assert!(tokens.iter().all(|token| token.kind != TokenKind::CommentHashbang));
    assert_eq!(tokens[2].kind, TokenKind::Error);
    assert_eq!(tokens[2].value, "#");
}

#[test]
fn test_slash_after_operand_is_division() {
    let tokens = tokenize("a / b");

    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::NameOther, "a"),
            (TokenKind::Text, " "),
            (TokenKind::Operator, "/"),
            (TokenKind::Text, " "),
            (TokenKind::NameOther, "b"),
        ]
    );
}

#[test]
fn test_slash_after_operator_starts_regex() {
    assert_eq!(
        significant("x = /ab+c/g;"),
        vec![
            (TokenKind::NameOther, "x".to_string()),
            (TokenKind::Operator, "=".to_string()),
            (TokenKind::StringRegex, "/ab+c/g".to_string()),
            (TokenKind::Punctuation, ";".to_string()),
        ]
    );
}

#[test]
fn test_regex_at_line_start() {
    let tokens = tokenize("/foo[/]/i\n");
    assert_eq!(
        pairs(&tokens),
        vec![(TokenKind::StringRegex, "/foo[/]/i"), (TokenKind::Text, "\n")]
    );
}

#[test]
fn test_bad_regex_recovers_at_newline() {
    let lexer = Lexer::sophia();
    let mut stream = lexer.tokens_unprocessed("x = /\ny");

    let tokens: Vec<Token> = stream.by_ref().take(6).collect();
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::NameOther, "x"),
            (TokenKind::Text, " "),
            (TokenKind::Operator, "="),
            (TokenKind::Text, " "),
            (TokenKind::Error, "/"),
            (TokenKind::Text, "\n"),
        ]
    );
    assert_eq!(stream.current_state(), sophia::ROOT);

    let rest: Vec<Token> = stream.collect();
    assert_eq!(pairs(&rest), vec![(TokenKind::NameOther, "y")]);
}

#[test]
fn test_line_continuation() {
    assert_eq!(
        pairs(&tokenize("a \\\nb")),
        vec![
            (TokenKind::NameOther, "a"),
            (TokenKind::Text, " "),
            (TokenKind::Operator, "\\"),
            (TokenKind::Text, "\n"),
            (TokenKind::NameOther, "b"),
        ]
    );

    let tokens = tokenize("a \\ b");
    assert_eq!(tokens[2].kind, TokenKind::Error);
    assert_eq!(tokens[2].value, "\\");
}

#[test]
fn test_unterminated_backtick_stalls_in_interp() {
    let tokens = tokenize("`abc");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::StringBacktick, "`"),
            (TokenKind::Error, "a"),
            (TokenKind::Error, "b"),
            (TokenKind::Error, "c"),
        ]
    );

    let lexer = Lexer::sophia();
    let mut stream = lexer.tokens_unprocessed("`abc");
    stream.next();
    assert_eq!(stream.current_state(), "interp");
}

#[test]
fn test_newline_resets_to_root() {
    let tokens = tokenize("`ab\nlet");
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::StringBacktick, "`"),
            (TokenKind::Error, "a"),
            (TokenKind::Error, "b"),
            (TokenKind::Whitespace, "\n"),
            (TokenKind::KeywordDeclaration, "let"),
        ]
    );
}

#[test]
fn test_unmatched_character_is_one_error_token() {
    let tokens = tokenize("é#");
    // `é` is an identifier, `#` matches nothing
    assert_eq!(
        pairs(&tokens),
        vec![(TokenKind::NameOther, "é"), (TokenKind::Error, "#")]
    );

    let tokens = tokenize("\u{1F600}");
    assert_eq!(pairs(&tokens), vec![(TokenKind::Error, "\u{1F600}")]);
}

#[test]
fn test_spans_index_the_source() {
    let source = "let x = 0xFF // done\n";
    for token in tokenize(source) {
        assert_eq!(
            &source[token.span.start as usize..token.span.end as usize],
            token.value
        );
    }
}

#[test]
fn test_tokens_cover_a_contract() {
    let source = "@compiler >= 6\ninclude \"List.aes\"\n\ncontract Counter =\n  record state = { value : int }\n\n  stateful entrypoint tick(n : int) =\n    require(n > 0, \"bad\")\n    put(state{ value = state.value + n })\n";
    let tokens = tokenize(source);

    let rebuilt: String = tokens.iter().map(|token| token.value.as_str()).collect();
    assert_eq!(rebuilt, source);
    assert!(tokens.iter().all(|token| token.kind != TokenKind::Error));
    assert_eq!(tokens, tokenize(source));
}

#[test]
fn test_lexer_tokens_apply_options() {
    let lexer = Lexer::sophia();
    let tokens: Vec<Token> = lexer.tokens("\r\nlet x").collect();

    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::KeywordDeclaration, "let"),
            (TokenKind::Text, " "),
            (TokenKind::NameOther, "x"),
            (TokenKind::Text, "\n"),
        ]
    );

    let tokens: Vec<Token> = lexer.tokens("").collect();
    assert_eq!(pairs(&tokens), vec![(TokenKind::Text, "\n")]);
}

#[test]
fn test_lexer_with_tabsize() {
    let lexer = Lexer::sophia().with_options(LexerOptions {
        tabsize: 2,
        ..LexerOptions::default()
    });
    let stream = lexer.tokens("\tx");

    assert_eq!(stream.text(), "  x\n");
}

#[test]
fn test_check_reports_first_unmatched_position() {
    assert!(check("let x = 1", None).is_ok());

    let error = check("let x = #", Some("main.aes".to_string())).unwrap_err();
    assert_eq!(error.get_error_name(), "UnmatchedInput");
    assert_eq!(error.get_position().0, 8);
    assert_eq!(error.get_position().1.as_str(), "main.aes");
}

#[test]
fn test_sophia_table_layout() {
    let table = sophia::table();
    let state = |name: &str| table.state(table.state_id(name).unwrap());

    assert_eq!(table.state(table.root()).name, "root");
    assert_eq!(state("root").rules.len(), 27);
    assert_eq!(state("slashstartsregex").rules.len(), 7);
    assert_eq!(state("badregex").rules.len(), 1);
    assert!(state("interp").rules.is_empty());
    assert_eq!(state("interp-inside").rules.len(), 28);
    assert_eq!(table.states().count(), 6);
}

#[test]
fn test_included_rules_are_shared() {
    let table = sophia::table();
    let root = table.state(table.state_id("root").unwrap());
    let comments = table.state(table.state_id("commentsandwhitespace").unwrap());

    assert_eq!(&root.rules[2..6], comments.rules.as_slice());
}

#[test]
fn test_build_rejects_unknown_state() {
    let definitions = vec![(
        "root",
        vec![MK_RULE!("a", TokenKind::Text, Directive::Push("missing"))],
    )];
    let error = RuleTable::build(&definitions, "root").unwrap_err();
    assert_eq!(error.get_error_name(), "UnknownState");

    let error = RuleTable::build(&[("root", vec![])], "start").unwrap_err();
    assert_eq!(error.get_error_name(), "UnknownState");
}

#[test]
fn test_build_rejects_include_cycle() {
    let definitions = vec![
        ("root", vec![RuleDef::Include("a")]),
        ("a", vec![RuleDef::Include("b")]),
        ("b", vec![RuleDef::Include("a")]),
    ];
    let error = RuleTable::build(&definitions, "root").unwrap_err();
    assert_eq!(error.get_error_name(), "IncludeCycle");
}

#[test]
fn test_build_rejects_invalid_pattern() {
    let definitions = vec![("root", vec![MK_RULE!("(", TokenKind::Text)])];
    let error = RuleTable::build(&definitions, "root").unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidPattern");
}

#[test]
fn test_build_rejects_duplicate_state() {
    let definitions = vec![("root", vec![]), ("root", vec![])];
    let error = RuleTable::build(&definitions, "root").unwrap_err();
    assert_eq!(error.get_error_name(), "DuplicateState");
}

#[test]
fn test_replace_top_keeps_the_base_state() {
    let definitions = vec![
        (
            "root",
            vec![
                MK_RULE!("a", TokenKind::Text, Directive::ReplaceTop("other")),
                MK_RULE!("b", TokenKind::Keyword),
            ],
        ),
        ("other", vec![MK_RULE!("b", TokenKind::Name, Directive::Pop)]),
    ];
    let table = RuleTable::build(&definitions, "root").unwrap();
    let lexer = Lexer::new(&table, LexerOptions::default());

    let tokens: Vec<Token> = lexer.tokens_unprocessed("abb").collect();
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::Text, "a"),
            (TokenKind::Name, "b"),
            (TokenKind::Keyword, "b"),
        ]
    );
}

#[test]
fn test_zero_width_loop_falls_back() {
    let definitions = vec![("root", vec![MK_RULE!("", TokenKind::Text)])];
    let table = RuleTable::build(&definitions, "root").unwrap();
    let lexer = Lexer::new(&table, LexerOptions::default());

    let tokens: Vec<Token> = lexer.tokens_unprocessed("ab").collect();
    assert_eq!(
        pairs(&tokens),
        vec![(TokenKind::Error, "a"), (TokenKind::Error, "b")]
    );
}

#[test]
fn test_token_kind_hierarchy() {
    assert_eq!(TokenKind::KeywordDeclaration.to_string(), "Keyword.Declaration");
    assert_eq!(TokenKind::Whitespace.as_str(), "Text.Whitespace");
    assert_eq!(TokenKind::StringRegex.parent(), Some(TokenKind::String));
    assert_eq!(TokenKind::Punctuation.parent(), None);

    assert!(TokenKind::NumberHex.is_subtype_of(TokenKind::Number));
    assert!(TokenKind::Keyword.is_subtype_of(TokenKind::Keyword));
    assert!(!TokenKind::Keyword.is_subtype_of(TokenKind::KeywordDeclaration));
    assert!(!TokenKind::OperatorWord.is_subtype_of(TokenKind::Keyword));
}

#[test]
fn test_token_raw_line() {
    let tokens = tokenize("let");
    assert_eq!(tokens[0].raw(), "Keyword.Declaration\t\"let\"");
}

#[test]
fn test_registration_metadata() {
    assert_eq!(SOPHIA_INFO.name, "Sophia");
    assert!(SOPHIA_INFO.matches_alias("sophia"));
    assert!(SOPHIA_INFO.matches_alias("AES"));
    assert!(!SOPHIA_INFO.matches_alias("solidity"));

    assert!(SOPHIA_INFO.matches_filename("contracts/Token.aes"));
    assert!(SOPHIA_INFO.matches_filename("Token.aci"));
    assert!(!SOPHIA_INFO.matches_filename("Token.aes.bak"));
    assert!(!SOPHIA_INFO.matches_filename("aes"));

    assert!(SOPHIA_INFO.matches_mimetype("text/x-sophia"));
    assert!(!SOPHIA_INFO.matches_mimetype("text/plain"));
}

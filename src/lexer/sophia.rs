//! The Sophia rule table and registration metadata.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    rules::{Directive, RuleDef, RuleTable, StateDef},
    tokens::TokenKind,
};
use crate::MK_RULE;

pub const ROOT: &str = "root";

const IDENT_START_CATEGORIES: &[&str] = &["Lu", "Ll", "Lt", "Lm", "Lo", "Nl"];
const IDENT_PART_CATEGORIES: &[&str] = &["Lu", "Ll", "Lt", "Lm", "Lo", "Nl", "Mn", "Mc", "Nd", "Pc"];

lazy_static! {
    /// `$`, `_`, a letter or letter number, or a `\uXXXX` escape.
    pub static ref IDENT_START: String = format!(
        r"(?:[$_{}]|\\u[a-fA-F0-9]{{4}})",
        combine(IDENT_START_CATEGORIES)
    );

    /// Start characters plus marks, digits, connectors, ZWNJ and ZWJ.
    pub static ref IDENT_PART: String = format!(
        r"(?:[$\u{{200c}}\u{{200d}}{}]|\\u[a-fA-F0-9]{{4}})",
        combine(IDENT_PART_CATEGORIES)
    );

    pub static ref IDENT: String = format!("{}(?:{})*", *IDENT_START, *IDENT_PART);

    static ref SOPHIA_TABLE: RuleTable =
        RuleTable::build(&definitions(), ROOT).expect("the Sophia rule table compiles");

    static ref FILENAME_PATTERNS: Vec<Regex> = SOPHIA_INFO
        .filenames
        .iter()
        .copied()
        .map(glob_to_regex)
        .collect();
}

/// Joins Unicode general categories into the body of a character class.
fn combine(categories: &[&str]) -> String {
    categories
        .iter()
        .map(|category| format!(r"\p{{{}}}", category))
        .collect()
}

/// The shared, compiled Sophia table.
pub fn table() -> &'static RuleTable {
    &SOPHIA_TABLE
}

/// State definitions in declaration order. Rule order within a state is
/// significant: the first match wins.
pub fn definitions() -> Vec<StateDef> {
    use Directive::{Pop, Push, ReplaceTop};

    let regex_context = Push("slashstartsregex");

    vec![
        (
            "commentsandwhitespace",
            vec![
                MK_RULE!(r"\s+", TokenKind::Text),
                MK_RULE!(r"<!--", TokenKind::Comment),
                MK_RULE!(r"//.*?\n", TokenKind::CommentSingle),
                MK_RULE!(r"/\*.*?\*/", TokenKind::CommentMultiline),
            ],
        ),
        (
            "slashstartsregex",
            vec![
                RuleDef::Include("commentsandwhitespace"),
                MK_RULE!(
                    r"/(\\.|[^\[/\\\n]|\[(\\.|[^\]\\\n])*\])+/([gimuysd]+\b|\B)",
                    TokenKind::StringRegex,
                    Pop
                ),
                MK_RULE!("", TokenKind::Text, ReplaceTop("badregex")).followed_by("/"),
                RuleDef::Default(Pop),
            ],
        ),
        ("badregex", vec![MK_RULE!(r"\n", TokenKind::Text, Pop)]),
        (
            ROOT,
            vec![
                MK_RULE!(r"\A#! ?/.*?\n", TokenKind::CommentHashbang),
                MK_RULE!("^", TokenKind::Text, regex_context).followed_by(r"\s|/|<!--"),
                RuleDef::Include("commentsandwhitespace"),
                // numbers
                MK_RULE!(r"0[xX][0-9a-fA-F]+n?", TokenKind::NumberHex),
                MK_RULE!(r"[0-9]+", TokenKind::NumberInteger),
                MK_RULE!(r"\.\.\.|=>", TokenKind::Punctuation),
                MK_RULE!(
                    r"\+\+|--|~|\?\?=?|\?|:|('|@|<<|>>>?|==?|!=?|(?:\*\*|\|\||&&|[-<>+*%&|^/]))=?",
                    TokenKind::Operator,
                    regex_context
                ),
                // line continuation
                MK_RULE!(r"\\", TokenKind::Operator, regex_context).followed_by(r"\n"),
                MK_RULE!(r"[{(\[;,]", TokenKind::Punctuation, regex_context),
                MK_RULE!(r"[})\].]", TokenKind::Punctuation),
                MK_RULE!(r"(mod)\b", TokenKind::OperatorWord, regex_context),
                MK_RULE!(r"\b(stateful|payable|public|private)\b", TokenKind::KeywordReserved),
                MK_RULE!(r"\b(true|false)\b", TokenKind::Literal),
                MK_RULE!(
                    r"\b(include|compiler|switch|if|elif|else)\b",
                    TokenKind::Keyword,
                    regex_context
                ),
                MK_RULE!(
                    r"(let|type|record|datatype|function|entrypoint|contract|namespace|interface)\b",
                    TokenKind::KeywordDeclaration,
                    regex_context
                ),
                // shadowed by the declaration keywords above
                MK_RULE!(
                    r"(contract|namespace|interface)\b",
                    TokenKind::KeywordNamespace,
                    regex_context
                ),
                MK_RULE!(r"(abort|require|state|put)\b", TokenKind::KeywordConstant),
                MK_RULE!(r"(int|bool|address|string|char|unit)\b", TokenKind::NameBuiltin),
                // super(argument, list)
                RuleDef::by_groups(
                    r"(super)(\s*)(\([\w,?.$\s]+\s*\))",
                    vec![TokenKind::Keyword, TokenKind::Text, TokenKind::Text],
                )
                .then(regex_context),
                // name() {...}
                MK_RULE!(r"[a-zA-Z_?.$][\w?.$]*", TokenKind::NameOther, regex_context)
                    .followed_by(r"\(\) \{"),
                MK_RULE!(IDENT.as_str(), TokenKind::NameOther),
                MK_RULE!(r#""(\\\\|\\[^\\]|[^"\\])*""#, TokenKind::StringDouble),
                MK_RULE!(r"'(\\\\|\\[^\\]|[^'\\])*'", TokenKind::StringSingle),
                MK_RULE!(r"`", TokenKind::StringBacktick, Push("interp")),
            ],
        ),
        // TODO: interpolation never closes; `interp` needs a `}`/backtick exit into `interp-inside`.
        ("interp", vec![]),
        (
            "interp-inside",
            vec![
                MK_RULE!(r"\}", TokenKind::StringInterpol, Pop),
                RuleDef::Include(ROOT),
            ],
        ),
    ]
}

/// What a host needs to offer this lexer by name, file name or MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub filenames: &'static [&'static str],
    pub mimetypes: &'static [&'static str],
}

pub const SOPHIA_INFO: LexerInfo = LexerInfo {
    name: "Sophia",
    aliases: &["sophia", "aes"],
    filenames: &["*.aes", "*.aci"],
    mimetypes: &[
        "application/sophia",
        "application/x-sophia",
        "text/x-sophia",
        "text/sophia",
    ],
};

impl LexerInfo {
    pub fn matches_alias(&self, alias: &str) -> bool {
        let alias = alias.to_lowercase();
        self.aliases.iter().any(|known| *known == alias)
    }

    pub fn matches_mimetype(&self, mimetype: &str) -> bool {
        self.mimetypes.iter().any(|known| *known == mimetype)
    }

    /// Matches the final path component against the filename globs.
    pub fn matches_filename(&self, path: impl AsRef<Path>) -> bool {
        let Some(name) = path.as_ref().file_name().and_then(|name| name.to_str()) else {
            return false;
        };

        if *self == SOPHIA_INFO {
            return FILENAME_PATTERNS.iter().any(|pattern| pattern.is_match(name));
        }

        self.filenames
            .iter()
            .any(|glob| glob_to_regex(glob).is_match(name))
    }
}

/// `*` and `?` wildcards; everything else literal.
fn glob_to_regex(glob: &str) -> Regex {
    let mut pattern = String::from("^");
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&ch.to_string())),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).expect("escaped glob is a valid regex")
}

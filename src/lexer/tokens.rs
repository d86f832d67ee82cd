use std::fmt::Display;

use serde::{Serialize, Serializer};

use crate::Span;

/// Token categories used for highlighting. Kinds form a hierarchy, rendered
/// as dotted paths (`Keyword.Declaration` is a `Keyword`).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Text,
    Whitespace,

    Error,

    Comment,
    CommentSingle,
    CommentMultiline,
    CommentHashbang,

    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordNamespace,
    KeywordReserved,

    Name,
    NameBuiltin,
    NameOther,

    Literal,

    Number,
    NumberHex,
    NumberInteger,

    Operator,
    OperatorWord,

    Punctuation,

    String,
    StringBacktick,
    StringDouble,
    StringInterpol,
    StringRegex,
    StringSingle,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Text => "Text",
            TokenKind::Whitespace => "Text.Whitespace",
            TokenKind::Error => "Error",
            TokenKind::Comment => "Comment",
            TokenKind::CommentSingle => "Comment.Single",
            TokenKind::CommentMultiline => "Comment.Multiline",
            TokenKind::CommentHashbang => "Comment.Hashbang",
            TokenKind::Keyword => "Keyword",
            TokenKind::KeywordConstant => "Keyword.Constant",
            TokenKind::KeywordDeclaration => "Keyword.Declaration",
            TokenKind::KeywordNamespace => "Keyword.Namespace",
            TokenKind::KeywordReserved => "Keyword.Reserved",
            TokenKind::Name => "Name",
            TokenKind::NameBuiltin => "Name.Builtin",
            TokenKind::NameOther => "Name.Other",
            TokenKind::Literal => "Literal",
            TokenKind::Number => "Number",
            TokenKind::NumberHex => "Number.Hex",
            TokenKind::NumberInteger => "Number.Integer",
            TokenKind::Operator => "Operator",
            TokenKind::OperatorWord => "Operator.Word",
            TokenKind::Punctuation => "Punctuation",
            TokenKind::String => "String",
            TokenKind::StringBacktick => "String.Backtick",
            TokenKind::StringDouble => "String.Double",
            TokenKind::StringInterpol => "String.Interpol",
            TokenKind::StringRegex => "String.Regex",
            TokenKind::StringSingle => "String.Single",
        }
    }

    pub fn parent(&self) -> Option<TokenKind> {
        match self {
            TokenKind::Whitespace => Some(TokenKind::Text),
            TokenKind::CommentSingle | TokenKind::CommentMultiline | TokenKind::CommentHashbang => {
                Some(TokenKind::Comment)
            }
            TokenKind::KeywordConstant
            | TokenKind::KeywordDeclaration
            | TokenKind::KeywordNamespace
            | TokenKind::KeywordReserved => Some(TokenKind::Keyword),
            TokenKind::NameBuiltin | TokenKind::NameOther => Some(TokenKind::Name),
            TokenKind::NumberHex | TokenKind::NumberInteger => Some(TokenKind::Number),
            TokenKind::OperatorWord => Some(TokenKind::Operator),
            TokenKind::StringBacktick
            | TokenKind::StringDouble
            | TokenKind::StringInterpol
            | TokenKind::StringRegex
            | TokenKind::StringSingle => Some(TokenKind::String),
            _ => None,
        }
    }

    /// True when `self` is `other` or one of its descendants.
    pub fn is_subtype_of(&self, other: TokenKind) -> bool {
        let mut current = Some(*self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }

        false
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    #[serde(flatten)]
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {:?}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Whitespace and zero-information text.
    pub fn is_insignificant(&self) -> bool {
        self.is_one_of_many(&[TokenKind::Text, TokenKind::Whitespace])
            && self.value.chars().all(char::is_whitespace)
    }

    /// One `Kind<TAB>"text"` line, as printed by the raw dump format.
    pub fn raw(&self) -> String {
        format!("{}\t{:?}", self.kind, self.value)
    }
}

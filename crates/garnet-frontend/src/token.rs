//! Token set for the surface language.

/// A lexed token. Newlines are significant (they terminate statements) and
/// are produced as tokens rather than skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based source line, kept for parse-error messages only.
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32) -> Self {
        Self { kind, line }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Lowercase-initial identifier.
    Ident(String),
    /// Uppercase-initial identifier (constant name).
    UpperIdent(String),
    /// `$`-prefixed global name, sigil stripped.
    GlobalVar(String),
    Int(i64),
    Float(f64),

    // Keywords.
    If,
    Elsif,
    Else,
    End,
    Unless,
    While,
    For,
    In,
    Do,
    Then,
    Break,
    Return,
    Def,
    True,
    False,

    // Operators.
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Assign,
    Question,
    Colon,

    // Punctuation.
    Comma,
    Dot,
    DotDot,
    Semi,
    Newline,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Pipe,

    Eof,
}

impl TokenKind {
    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) | Self::UpperIdent(name) => format!("'{name}'"),
            Self::GlobalVar(name) => format!("'${name}'"),
            Self::Int(v) => format!("'{v}'"),
            Self::Float(v) => format!("'{v}'"),
            Self::Newline => "end of line".into(),
            Self::Eof => "end of input".into(),
            other => format!("{other:?}").to_lowercase(),
        }
    }
}

//! Lexer: source text → tokens.

use crate::token::{Token, TokenKind};
use crate::ParseError;

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() && c != '\n') {
            self.bump();
        }
    }

    fn skip_line_comment(&mut self) {
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.bump();
        }
    }

    fn read_name(&mut self) -> String {
        let mut s = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            s.push(self.bump().unwrap());
        }
        s
    }

    fn read_number(&mut self) -> TokenKind {
        let mut s = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            s.push(self.bump().unwrap());
        }
        // A dot only belongs to the number when a digit follows; `10.times`
        // and `0..10` keep their integer part intact.
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            s.push(self.bump().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                s.push(self.bump().unwrap());
            }
            TokenKind::Float(s.parse().unwrap_or(0.0))
        } else {
            TokenKind::Int(s.parse().unwrap_or(0))
        }
    }

    /// Tokenizes the whole input. Runs of blank lines collapse to a single
    /// newline token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_spaces();
            let line = self.line;
            let c = match self.peek() {
                Some(c) => c,
                None => {
                    tokens.push(Token::new(TokenKind::Eof, line));
                    return Ok(tokens);
                }
            };

            if c == '#' {
                self.skip_line_comment();
                continue;
            }

            if c == '\n' {
                self.bump();
                if !matches!(
                    tokens.last().map(|t| &t.kind),
                    Some(TokenKind::Newline) | None
                ) {
                    tokens.push(Token::new(TokenKind::Newline, line));
                }
                continue;
            }

            if c.is_ascii_digit() {
                let kind = self.read_number();
                tokens.push(Token::new(kind, line));
                continue;
            }

            if c.is_ascii_alphabetic() || c == '_' {
                let name = self.read_name();
                let kind = match name.as_str() {
                    "if" => TokenKind::If,
                    "elsif" => TokenKind::Elsif,
                    "else" => TokenKind::Else,
                    "end" => TokenKind::End,
                    "unless" => TokenKind::Unless,
                    "while" => TokenKind::While,
                    "for" => TokenKind::For,
                    "in" => TokenKind::In,
                    "do" => TokenKind::Do,
                    "then" => TokenKind::Then,
                    "break" => TokenKind::Break,
                    "return" => TokenKind::Return,
                    "def" => TokenKind::Def,
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    _ if name.starts_with(|c: char| c.is_ascii_uppercase()) => {
                        TokenKind::UpperIdent(name)
                    }
                    _ => TokenKind::Ident(name),
                };
                tokens.push(Token::new(kind, line));
                continue;
            }

            if c == '$' {
                self.bump();
                let name = self.read_name();
                if name.is_empty() {
                    return Err(ParseError::new(line, "expected name after '$'"));
                }
                tokens.push(Token::new(TokenKind::GlobalVar(name), line));
                continue;
            }

            self.bump();
            let kind = match c {
                '+' => self.with_eq(TokenKind::PlusAssign, TokenKind::Plus),
                '-' => self.with_eq(TokenKind::MinusAssign, TokenKind::Minus),
                '*' => self.with_eq(TokenKind::StarAssign, TokenKind::Star),
                '/' => self.with_eq(TokenKind::SlashAssign, TokenKind::Slash),
                '%' => TokenKind::Percent,
                '=' => self.with_eq(TokenKind::EqEq, TokenKind::Assign),
                '!' => self.with_eq(TokenKind::NotEq, TokenKind::Bang),
                '<' => self.with_eq(TokenKind::LtEq, TokenKind::Lt),
                '>' => self.with_eq(TokenKind::GtEq, TokenKind::Gt),
                '&' => {
                    if self.peek() == Some('&') {
                        self.bump();
                        TokenKind::AndAnd
                    } else {
                        return Err(ParseError::new(line, "expected '&&'"));
                    }
                }
                '|' => {
                    if self.peek() == Some('|') {
                        self.bump();
                        TokenKind::OrOr
                    } else {
                        TokenKind::Pipe
                    }
                }
                '.' => {
                    if self.peek() == Some('.') {
                        self.bump();
                        TokenKind::DotDot
                    } else {
                        TokenKind::Dot
                    }
                }
                '?' => TokenKind::Question,
                ':' => TokenKind::Colon,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semi,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                other => {
                    return Err(ParseError::new(
                        line,
                        format!("unexpected character '{other}'"),
                    ));
                }
            };
            tokens.push(Token::new(kind, line));
        }
    }

    fn with_eq(&mut self, with: TokenKind, without: TokenKind) -> TokenKind {
        if self.peek() == Some('=') {
            self.bump();
            with
        } else {
            without
        }
    }
}

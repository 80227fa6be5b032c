//! Frontend for the Garnet surface language.
//!
//! Parses the Ruby-flavored shader DSL into the shared IR: an optional
//! `|a, b, c|` parameter preamble is stripped first, then the remaining
//! body is tokenized, parsed into a surface syntax tree, and lowered into
//! a [`garnet_ir::Node`] block by a visitor that tracks declared names.

pub mod ast;
mod lexer;
mod lower;
mod parser;
mod token;

use garnet_ir::Node;

/// A syntax error in the surface source.
#[derive(Clone, Debug, thiserror::Error)]
#[error("Parse error: line {line}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Splits a leading `|a, b, c|` parameter preamble off the source, if one
/// is present, and returns the parameter names plus the remaining body.
pub fn extract_params(source: &str) -> (Vec<String>, &str) {
    let trimmed = source.trim_start();
    if let Some(rest) = trimmed.strip_prefix('|') {
        if let Some(close) = rest.find('|') {
            let params = rest[..close]
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            return (params, &rest[close + 1..]);
        }
    }
    (Vec::new(), source)
}

/// Parses surface source into an IR block.
///
/// `params` are pre-declared parameter names (merged with any preamble the
/// source itself carries); `known` lists names that exist outside the
/// program, such as uniforms, so writes to them lower as assignments.
pub fn parse(source: &str, params: &[String], known: &[String]) -> Result<Node, ParseError> {
    let (preamble, body) = extract_params(source);
    let mut all_params = params.to_vec();
    all_params.extend(preamble);

    let tokens = lexer::Lexer::new(body).tokenize()?;
    let stmts = parser::Parser::new(tokens).parse_program()?;
    Ok(lower::lower_program(&stmts, &all_params, known))
}

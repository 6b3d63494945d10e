//! Generic YANG statement grammar.
//!
//! Every YANG construct is a statement: a keyword, an optional argument, and
//! either `;` or a `{ ... }` block of substatements. This reader stops there.
//! It knows nothing about what individual keywords mean.

use crate::error::{ErrorKind, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub keyword: String,
    pub argument: Option<String>,
    pub children: Vec<Statement>,
    /// Line (1-based) the keyword is on.
    pub line: usize,
}

impl Statement {
    pub fn arg(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// First direct substatement with the keyword.
    pub fn child(&self, keyword: &str) -> Option<&Statement> {
        self.children.iter().find(|child| child.keyword == keyword)
    }

    /// All direct substatements with the keyword, in source order.
    pub fn children_named<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Statement> {
        self.children.iter().filter(move |child| child.keyword == keyword)
    }
}

/// Parse YANG text into its top-level statements.
pub fn parse(source: &str) -> Result<Vec<Statement>> {
    let mut parser = Parser {
        lexer: Lexer::new(source),
        peeked: None,
    };
    parser.statements(None)
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Semicolon,
    Open,
    Close,
}

fn syntax(line: usize, reason: &'static str) -> ErrorKind {
    ErrorKind::Syntax { line, reason }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            },
            '\t' => self.column += 8 - self.column % 8,
            _ => self.column += 1,
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                },
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                },
                (Some('/'), Some('*')) => {
                    let line = self.line;
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            None => exn::bail!(syntax(line, "unterminated comment")),
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            },
                            Some(_) => {},
                        }
                    }
                },
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let token = match c {
            ';' | '{' | '}' => {
                self.bump();
                match c {
                    ';' => Token::Semicolon,
                    '{' => Token::Open,
                    _ => Token::Close,
                }
            },
            '"' => Token::Quoted(self.double_quoted()?),
            '\'' => Token::Quoted(self.single_quoted()?),
            _ => Token::Word(self.word()),
        };
        Ok(Some((token, line)))
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ';' | '{' | '}' | '"' | '\'') {
                break;
            }
            if c == '/' && matches!(self.peek_next(), Some('/' | '*')) {
                break;
            }
            word.push(c);
            self.bump();
        }
        word
    }

    fn single_quoted(&mut self) -> Result<String> {
        let line = self.line;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => exn::bail!(syntax(line, "unterminated string")),
                Some('\'') => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    /// Double-quoted strings drop trailing whitespace before each line break,
    /// and on continuation lines the indentation up to the column just after
    /// the opening quote.
    fn double_quoted(&mut self) -> Result<String> {
        let line = self.line;
        let indent = self.column + 1;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => exn::bail!(syntax(line, "unterminated string")),
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    },
                    None => exn::bail!(syntax(line, "unterminated string")),
                },
                Some('\n') => {
                    let trimmed = value.trim_end_matches([' ', '\t']).len();
                    value.truncate(trimmed);
                    value.push('\n');
                    while self.column < indent && matches!(self.peek(), Some(' ' | '\t')) {
                        self.bump();
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }
}

struct Parser {
    lexer: Lexer,
    peeked: Option<(Token, usize)>,
}

impl Parser {
    fn next(&mut self) -> Result<Option<(Token, usize)>> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.next_token(),
        }
    }

    /// Statements up to the `}` closing the block opened on line `open`, or
    /// up to the end of input at the top level.
    fn statements(&mut self, open: Option<usize>) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            match (self.next()?, open) {
                (None, None) => return Ok(statements),
                (None, Some(line)) => exn::bail!(syntax(line, "unclosed block")),
                (Some((Token::Close, _)), Some(_)) => return Ok(statements),
                (Some((Token::Close, line)), None) => exn::bail!(syntax(line, "unexpected '}'")),
                (Some((Token::Word(keyword), line)), _) => statements.push(self.statement(keyword, line)?),
                (Some((_, line)), _) => exn::bail!(syntax(line, "expected a keyword")),
            }
        }
    }

    fn statement(&mut self, keyword: String, line: usize) -> Result<Statement> {
        let argument = self.argument()?;
        let children = match self.next()? {
            Some((Token::Semicolon, _)) => Vec::new(),
            Some((Token::Open, _)) => self.statements(Some(line))?,
            Some((_, line)) => exn::bail!(syntax(line, "expected ';' or '{'")),
            None => exn::bail!(syntax(line, "unexpected end of input")),
        };
        Ok(Statement {
            keyword,
            argument,
            children,
            line,
        })
    }

    /// Optional argument; quoted parts joined with `+` are concatenated.
    fn argument(&mut self) -> Result<Option<String>> {
        match self.next()? {
            Some((Token::Word(word), _)) => Ok(Some(word)),
            Some((Token::Quoted(first), _)) => {
                let mut value = first;
                loop {
                    match self.next()? {
                        Some((Token::Word(plus), line)) if plus == "+" => match self.next()? {
                            Some((Token::Quoted(part), _)) => value.push_str(&part),
                            _ => exn::bail!(syntax(line, "expected a quoted string after '+'")),
                        },
                        other => {
                            self.peeked = other;
                            return Ok(Some(value));
                        },
                    }
                }
            },
            other => {
                self.peeked = other;
                Ok(None)
            },
        }
    }
}

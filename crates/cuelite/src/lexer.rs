//! Tokenizer
//!
//! Newlines are not tokens. Instead every token records whether a newline preceded it, which is
//! all the parser needs to accept newlines as declaration separators.
use crate::error::ParseError;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    String(String),
    Int(i64),
    Float(f64),
    /// `@key(body)` - the body is kept verbatim
    Attribute {
        key: String,
        body: String,
    },
    /// `_|_`
    Bottom,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Amp,
    Pipe,
    Star,
    Minus,
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier {name}"),
            Token::String(_) => f.write_str("string literal"),
            Token::Int(_) | Token::Float(_) => f.write_str("number"),
            Token::Attribute { key, .. } => write!(f, "attribute @{key}"),
            Token::Bottom => f.write_str("'_|_'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Colon => f.write_str("':'"),
            Token::Comma => f.write_str("','"),
            Token::Amp => f.write_str("'&'"),
            Token::Pipe => f.write_str("'|'"),
            Token::Star => f.write_str("'*'"),
            Token::Minus => f.write_str("'-'"),
            Token::Lt => f.write_str("'<'"),
            Token::Le => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::Ge => f.write_str("'>='"),
            Token::Ne => f.write_str("'!='"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
    pub newline_before: bool,
}

/// Split `source` into tokens. The result always ends with [Token::Eof].
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    }
    .run()
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '#' | '$')
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$')
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }

    fn run(mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        let mut newline_before = false;

        loop {
            match self.peek() {
                Some('\n') => {
                    self.bump();
                    newline_before = true;
                    continue;
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                    continue;
                }
                _ => {}
            }

            let (line, column) = (self.line, self.column);
            let token = match self.peek() {
                None => Token::Eof,
                Some(c) => self.token(c)?,
            };
            let done = token == Token::Eof;
            tokens.push(Spanned {
                token,
                line,
                column,
                newline_before,
            });

            if done {
                return Ok(tokens);
            }
            newline_before = false;
        }
    }

    fn token(&mut self, c: char) -> Result<Token, ParseError> {
        let punctuation = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '&' => Some(Token::Amp),
            '|' => Some(Token::Pipe),
            '*' => Some(Token::Star),
            '-' => Some(Token::Minus),
            _ => None,
        };
        if let Some(token) = punctuation {
            self.bump();
            return Ok(token);
        }

        match c {
            '<' | '>' | '!' => self.comparison(c),
            '"' => self.string().map(Token::String),
            '@' => self.attribute(),
            '_' if self.peek_at(1) == Some('|') && self.peek_at(2) == Some('_') => {
                self.pos += 3;
                self.column += 3;
                Ok(Token::Bottom)
            }
            c if c.is_ascii_digit() => self.number(),
            c if is_ident_start(c) => Ok(Token::Ident(self.ident())),
            other => Err(self.error(format!("unexpected character {other:?}"))),
        }
    }

    fn comparison(&mut self, c: char) -> Result<Token, ParseError> {
        self.bump();
        let with_eq = self.peek() == Some('=');
        if with_eq {
            self.bump();
        }

        match (c, with_eq) {
            ('<', false) => Ok(Token::Lt),
            ('<', true) => Ok(Token::Le),
            ('>', false) => Ok(Token::Gt),
            ('>', true) => Ok(Token::Ge),
            ('!', true) => Ok(Token::Ne),
            _ => Err(self.error("expected '=' after '!'")),
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some('"') => return Ok(value),
                Some('\\') => value.push(self.escape()?),
                Some(c) => value.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        match self.bump() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(format!("invalid unicode escape \\u{hex}")))
            }
            other => Err(self.error(format!("invalid escape sequence {other:?}"))),
        }
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        let mut is_float = false;

        self.digits(&mut text);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.bump();
            self.digits(&mut text);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            text.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.bump();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("malformed exponent"));
            }
            self.digits(&mut text);
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ParseError::new(line, column, format!("invalid number {text}")))
        } else {
            text.parse::<i64>().map(Token::Int).map_err(|_| {
                ParseError::new(line, column, format!("integer {text} out of range"))
            })
        }
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit() || *c == '_') {
            if c != '_' {
                text.push(c);
            }
            self.bump();
        }
    }

    fn ident(&mut self) -> String {
        let mut name = String::new();
        if let Some(c) = self.bump() {
            name.push(c);
        }
        if name == "_" && self.peek() == Some('#') {
            name.push('#');
            self.bump();
        }
        while let Some(c) = self.peek().filter(|c| is_ident_continue(*c)) {
            name.push(c);
            self.bump();
        }
        name
    }

    fn attribute(&mut self) -> Result<Token, ParseError> {
        self.bump();
        if !self.peek().is_some_and(is_ident_start) {
            return Err(self.error("expected attribute name after '@'"));
        }
        let key = self.ident();
        if self.peek() != Some('(') {
            return Err(self.error(format!("expected '(' after @{key}")));
        }
        self.bump();

        let mut body = String::new();
        let mut depth = 0usize;
        let mut quoted = false;
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error(format!("unterminated attribute @{key}")));
            };

            if quoted {
                body.push(c);
                match c {
                    '\\' => {
                        if let Some(escaped) = self.bump() {
                            body.push(escaped);
                        }
                    }
                    '"' => quoted = false,
                    _ => {}
                }
                continue;
            }

            match c {
                '"' => quoted = true,
                '(' => depth += 1,
                ')' if depth == 0 => return Ok(Token::Attribute { key, body }),
                ')' => depth -= 1,
                _ => {}
            }
            body.push(c);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("must tokenize")
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn field_with_attribute() {
        assert_eq!(
            tokens(r#"name: string @inject(env,name="X_NAME")"#),
            vec![
                Token::Ident("name".into()),
                Token::Colon,
                Token::Ident("string".into()),
                Token::Attribute {
                    key: "inject".into(),
                    body: r#"env,name="X_NAME""#.into(),
                },
                Token::Eof,
            ]
        );
    }

    #[test]
    fn attribute_body_keeps_parens_and_quoted_parens() {
        assert_eq!(
            tokens(r#"@doc(a(b), c=")")"#),
            vec![
                Token::Attribute {
                    key: "doc".into(),
                    body: r#"a(b), c=")""#.into(),
                },
                Token::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("17 1.0 1e3 1_000"),
            vec![
                Token::Int(17),
                Token::Float(1.0),
                Token::Float(1000.0),
                Token::Int(1000),
                Token::Eof
            ]
        );
    }

    #[test]
    fn hidden_definition_and_bottom() {
        assert_eq!(
            tokens("_a #B _#c _|_ _"),
            vec![
                Token::Ident("_a".into()),
                Token::Ident("#B".into()),
                Token::Ident("_#c".into()),
                Token::Bottom,
                Token::Ident("_".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn comments_and_newlines() {
        let spanned = tokenize("a: 1 // one\nb: 2").expect("must tokenize");
        let b = spanned
            .iter()
            .find(|s| s.token == Token::Ident("b".into()))
            .expect("b is tokenized");
        assert!(b.newline_before);
        assert_eq!((b.line, b.column), (2, 1));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\né""#),
            vec![Token::String("a\"b\né".into()), Token::Eof]
        );
    }

    #[test]
    fn errors() {
        assert!(tokenize("\"open").is_err());
        assert!(tokenize("@inject(env").is_err());
        assert!(tokenize("@ inject()").is_err());
        assert!(tokenize("a: !").is_err());
        assert!(tokenize("a: 99999999999999999999").is_err());
    }
}

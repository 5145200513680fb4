//! Syntax tree and recursive descent parser
//!
//! ```cue
//! // a file is the body of a struct
//! @inject(tfstate,stateURL="./terraform.tfstate")
//!
//! name:    string @inject(env,name=X_NAME)
//! replica: int & >=1 | *1
//! service: port: 8080
//! _hidden: "not exported"
//! #Def:    {a: string}
//! ```
//!
//! Identifiers other than the builtin types are references. Evaluating references is out of
//! scope for this crate, so they are rejected.
use crate::attribute::Attribute;
use crate::error::ParseError;
use crate::lexer::{tokenize, Spanned, Token};
use crate::value::{BoundOp, Kind, Label};

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Field {
        label: Label,
        value: Expr,
        attrs: Vec<Attribute>,
    },
    /// An attribute on its own line, attached to the enclosing struct
    Attribute(Attribute),
    /// An expression unified into the enclosing struct
    Embed(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Kind(Kind),
    Top,
    Bottom,
    Bound(BoundOp, Box<Expr>),
    Unify(Vec<Expr>),
    /// Alternatives and whether they are marked as default
    Disjunction(Vec<(Expr, bool)>),
    Struct(Vec<Decl>),
    List(Vec<Expr>),
}

pub fn parse_str(source: &str) -> Result<File, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let decls = parser.decls(&Token::Eof)?;
    Ok(File { decls })
}

struct Parser {
    /// never empty, always ends with [Token::Eof]
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].token
    }

    fn advance(&mut self) -> Spanned {
        let spanned = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        spanned
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let spanned = self.peek();
        ParseError::new(spanned.line, spanned.column, message)
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.peek().token == token {
            self.advance();
            return Ok(());
        }
        Err(self.error_here(format!("expected {token}, found {}", self.peek().token)))
    }

    /// Declarations up to (not including) `end`
    fn decls(&mut self, end: &Token) -> Result<Vec<Decl>, ParseError> {
        let mut decls = Vec::new();
        loop {
            while self.peek().token == Token::Comma {
                self.advance();
            }
            if &self.peek().token == end {
                return Ok(decls);
            }
            if self.peek().token == Token::Eof {
                return Err(self.error_here(format!("expected {end}, found end of input")));
            }

            decls.push(self.decl()?);

            let (next, newline_before) = {
                let spanned = self.peek();
                (spanned.token.clone(), spanned.newline_before)
            };
            match next {
                Token::Comma => {
                    self.advance();
                }
                _ if &next == end || newline_before => {}
                other => {
                    return Err(self.error_here(format!("expected ',' or newline, found {other}")))
                }
            }
        }
    }

    fn decl(&mut self) -> Result<Decl, ParseError> {
        if let Token::Attribute { key, body } = &self.peek().token {
            let attr = Attribute::new(key.clone(), body.clone());
            self.advance();
            return Ok(Decl::Attribute(attr));
        }

        if self.at_label() {
            return self.field();
        }

        Ok(Decl::Embed(self.expr()?))
    }

    fn at_label(&self) -> bool {
        matches!(self.peek().token, Token::Ident(_) | Token::String(_))
            && *self.peek_at(1) == Token::Colon
    }

    fn field(&mut self) -> Result<Decl, ParseError> {
        let label = self.label()?;
        self.expect(Token::Colon)?;

        // `a: b: c` is short for `a: { b: c }`
        if self.at_label() && !self.peek().newline_before {
            let inner = self.field()?;
            return Ok(Decl::Field {
                label,
                value: Expr::Struct(vec![inner]),
                attrs: vec![],
            });
        }

        let value = self.expr()?;
        let mut attrs = Vec::new();
        while let Token::Attribute { key, body } = &self.peek().token {
            if self.peek().newline_before {
                break;
            }
            attrs.push(Attribute::new(key.clone(), body.clone()));
            self.advance();
        }

        Ok(Decl::Field { label, value, attrs })
    }

    fn label(&mut self) -> Result<Label, ParseError> {
        let spanned = self.advance();
        match spanned.token {
            Token::Ident(name) if name == "_" => Err(ParseError::new(
                spanned.line,
                spanned.column,
                "'_' cannot be used as a label",
            )),
            Token::Ident(name) => Ok(Label::ident(name)),
            Token::String(name) => Ok(Label::regular(name)),
            other => Err(ParseError::new(
                spanned.line,
                spanned.column,
                format!("expected label, found {other}"),
            )),
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.alternative()?;
        if self.peek().token != Token::Pipe {
            return Ok(first.0);
        }

        let mut alternatives = vec![first];
        while self.peek().token == Token::Pipe {
            self.advance();
            alternatives.push(self.alternative()?);
        }
        Ok(Expr::Disjunction(alternatives))
    }

    fn alternative(&mut self) -> Result<(Expr, bool), ParseError> {
        let default = self.peek().token == Token::Star;
        if default {
            self.advance();
        }
        Ok((self.conjunction()?, default))
    }

    fn conjunction(&mut self) -> Result<Expr, ParseError> {
        let first = self.unary()?;
        if self.peek().token != Token::Amp {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.peek().token == Token::Amp {
            self.advance();
            operands.push(self.unary()?);
        }
        Ok(Expr::Unify(operands))
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let (line, column) = (self.peek().line, self.peek().column);

        let op = match self.peek().token {
            Token::Lt => Some(BoundOp::Lt),
            Token::Le => Some(BoundOp::Le),
            Token::Gt => Some(BoundOp::Gt),
            Token::Ge => Some(BoundOp::Ge),
            Token::Ne => Some(BoundOp::Ne),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let limit = self.unary()?;
            return match limit {
                Expr::Int(_) | Expr::Float(_) | Expr::String(_) => {
                    Ok(Expr::Bound(op, Box::new(limit)))
                }
                Expr::Null | Expr::Bool(_) if op == BoundOp::Ne => {
                    Ok(Expr::Bound(op, Box::new(limit)))
                }
                _ => Err(ParseError::new(
                    line,
                    column,
                    format!("bound {op} requires a literal operand"),
                )),
            };
        }

        if self.peek().token == Token::Minus {
            self.advance();
            return match self.unary()? {
                Expr::Int(int) => Ok(Expr::Int(-int)),
                Expr::Float(float) => Ok(Expr::Float(-float)),
                _ => Err(ParseError::new(line, column, "'-' requires a number")),
            };
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let spanned = self.advance();
        let expr = match spanned.token {
            Token::Int(int) => Expr::Int(int),
            Token::Float(float) => Expr::Float(float),
            Token::String(s) => Expr::String(s),
            Token::Bottom => Expr::Bottom,
            Token::Ident(name) => match name.as_str() {
                "null" => Expr::Null,
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                "_" => Expr::Top,
                "bool" => Expr::Kind(Kind::BOOL),
                "int" => Expr::Kind(Kind::INT),
                "float" => Expr::Kind(Kind::FLOAT),
                "number" => Expr::Kind(Kind::NUMBER),
                "string" => Expr::Kind(Kind::STRING),
                _ => {
                    return Err(ParseError::new(
                        spanned.line,
                        spanned.column,
                        format!("unsupported reference {name}"),
                    ))
                }
            },
            Token::LBrace => {
                let decls = self.decls(&Token::RBrace)?;
                self.expect(Token::RBrace)?;
                Expr::Struct(decls)
            }
            Token::LBracket => Expr::List(self.list()?),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                inner
            }
            other => {
                return Err(ParseError::new(
                    spanned.line,
                    spanned.column,
                    format!("unexpected {other}"),
                ))
            }
        };
        Ok(expr)
    }

    fn list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.peek().token == Token::RBracket {
                self.advance();
                return Ok(items);
            }

            items.push(self.expr()?);

            match self.peek().token {
                Token::Comma => {
                    self.advance();
                }
                Token::RBracket => {}
                _ => {
                    return Err(
                        self.error_here(format!("expected ',' or ']', found {}", self.peek().token))
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(label: &str, value: Expr, attrs: Vec<Attribute>) -> Decl {
        Decl::Field {
            label: Label::ident(label),
            value,
            attrs,
        }
    }

    #[test]
    fn field_with_attributes() {
        let file = parse_str("name: string @inject(env,name=X_NAME) @doc(x)").expect("valid");
        assert_eq!(
            file.decls,
            vec![field(
                "name",
                Expr::Kind(Kind::STRING),
                vec![
                    Attribute::new("inject".into(), "env,name=X_NAME".into()),
                    Attribute::new("doc".into(), "x".into()),
                ]
            )]
        );
    }

    #[test]
    fn declaration_attribute() {
        let file = parse_str("@inject(tfstate,stateURL=x)\nname: string").expect("valid");
        assert_eq!(
            file.decls,
            vec![
                Decl::Attribute(Attribute::new("inject".into(), "tfstate,stateURL=x".into())),
                field("name", Expr::Kind(Kind::STRING), vec![]),
            ]
        );
    }

    #[test]
    fn attribute_on_next_line_belongs_to_struct() {
        let file = parse_str("a: 1\n@doc(x)").expect("valid");
        assert!(matches!(file.decls[1], Decl::Attribute(_)));
    }

    #[test]
    fn shorthand_nesting() {
        let file = parse_str("a: b: 1").expect("valid");
        assert_eq!(
            file.decls,
            vec![field(
                "a",
                Expr::Struct(vec![field("b", Expr::Int(1), vec![])]),
                vec![]
            )]
        );
    }

    #[test]
    fn operators() {
        let file = parse_str(r#"a: *"x" | string & !="" | >=-1"#).expect("valid");
        let Decl::Field { value, .. } = &file.decls[0] else {
            panic!("expected field");
        };
        assert_eq!(
            value,
            &Expr::Disjunction(vec![
                (Expr::String("x".into()), true),
                (
                    Expr::Unify(vec![
                        Expr::Kind(Kind::STRING),
                        Expr::Bound(BoundOp::Ne, Box::new(Expr::String(String::new())))
                    ]),
                    false
                ),
                (Expr::Bound(BoundOp::Ge, Box::new(Expr::Int(-1))), false),
            ])
        );
    }

    #[test]
    fn separators() {
        assert!(parse_str("a: 1, b: 2").is_ok());
        assert!(parse_str("a: 1\nb: 2").is_ok());
        assert!(parse_str("a: {\n\tb: 1\n\tc: [1, 2,]\n}").is_ok());
        assert!(parse_str("a: 1 b: 2").is_err());
    }

    #[test]
    fn embedded_struct() {
        let file = parse_str("{\n\tname: string\n}").expect("valid");
        assert!(matches!(file.decls.as_slice(), [Decl::Embed(Expr::Struct(_))]));
    }

    #[test]
    fn errors() {
        let err = parse_str("a: foo").expect_err("references are not supported");
        assert_eq!(err, ParseError::new(1, 4, "unsupported reference foo"));
        assert!(parse_str("a: {").is_err());
        assert!(parse_str("a: [1 2]").is_err());
        assert!(parse_str("_: 1").is_err());
        assert!(parse_str("a: >=int").is_err());
    }
}

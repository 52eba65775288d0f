//! Parser for the compact type expression syntax used in component sources
//!
//! ```text
//! union    := '|'? postfix ('|' postfix)*
//! postfix  := primary ('[' ']')*
//! primary  := keyword | literal | identifier | 'Array' '<' union '>' | '(' union ')'
//! ```
//!
//! Expressions nest at most [`MAX_NESTING`] levels deep.

use strata_core::{DynamicOrigin, LiteralValue, PrimitiveKeyword, SourceTypeExpression};

use crate::error::ParserError;

/// Deepest list/union nesting and group nesting accepted in one expression
pub const MAX_NESTING: usize = 64;

/// Parsed expression with its nesting depth
type Nested = (SourceTypeExpression, usize);

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(f64),
    Pipe,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Lt,
    Gt,
}

/// Parse a single type expression
pub fn parse_type_expression(input: &str) -> Result<SourceTypeExpression, ParserError> {
    let tokens = tokenize(input)?;
    TypeParser {
        input,
        tokens,
        pos: 0,
        open_groups: 0,
    }
    .parse()
}

fn error(input: &str, position: usize, message: impl Into<String>) -> ParserError {
    ParserError::Parse {
        input: input.to_string(),
        position,
        message: message.into(),
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParserError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let single = match c {
            '|' => Some(Token::Pipe),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '<' => Some(Token::Lt),
            '>' => Some(Token::Gt),
            _ => None,
        };
        if let Some(token) = single {
            chars.next();
            tokens.push((offset, token));
            continue;
        }

        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut value = String::new();
            let mut terminated = false;
            while let Some((_, ch)) = chars.next() {
                match ch {
                    '\\' => match chars.next() {
                        Some((_, escaped)) => value.push(escaped),
                        None => break,
                    },
                    ch if ch == c => {
                        terminated = true;
                        break;
                    }
                    ch => value.push(ch),
                }
            }
            if !terminated {
                return Err(error(input, offset, "unterminated string literal"));
            }
            tokens.push((offset, Token::Str(value)));
        } else if c.is_ascii_digit() || c == '-' {
            let mut text = String::new();
            text.push(c);
            chars.next();
            while let Some(&(_, ch)) = chars.peek() {
                if ch.is_ascii_digit() || ch == '.' || ch == '_' {
                    if ch != '_' {
                        text.push(ch);
                    }
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = text
                .parse()
                .map_err(|_| error(input, offset, format!("invalid number literal '{}'", text)))?;
            tokens.push((offset, Token::Number(value)));
        } else if c.is_alphabetic() || c == '_' {
            let mut name = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push((offset, Token::Ident(name)));
        } else {
            return Err(error(input, offset, format!("unexpected character '{}'", c)));
        }
    }

    Ok(tokens)
}

struct TypeParser<'a> {
    input: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
    open_groups: usize,
}

impl TypeParser<'_> {
    fn parse(mut self) -> Result<SourceTypeExpression, ParserError> {
        let (expr, _) = self.union()?;
        if let Some((offset, token)) = self.tokens.get(self.pos) {
            return Err(error(
                self.input,
                *offset,
                format!("unexpected {:?} after type expression", token),
            ));
        }
        Ok(expr)
    }

    fn peek_is(&self, token: &Token) -> bool {
        matches!(self.tokens.get(self.pos), Some((_, t)) if t == token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_is(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len())
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), ParserError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(error(self.input, self.offset(), format!("expected {}", what)))
        }
    }

    fn check_nesting(&self, depth: usize, offset: usize) -> Result<(), ParserError> {
        if depth > MAX_NESTING {
            Err(error(
                self.input,
                offset,
                format!("type expression nests deeper than {} levels", MAX_NESTING),
            ))
        } else {
            Ok(())
        }
    }

    /// Parse a parenthesised or `Array<...>` group
    fn group(&mut self, offset: usize) -> Result<Nested, ParserError> {
        self.open_groups += 1;
        self.check_nesting(self.open_groups, offset)?;
        let inner = self.union();
        self.open_groups -= 1;
        inner
    }

    fn union(&mut self) -> Result<Nested, ParserError> {
        self.eat(&Token::Pipe);
        let start = self.offset();
        let (first, mut depth) = self.postfix()?;
        let mut members = vec![first];
        while self.eat(&Token::Pipe) {
            let (member, member_depth) = self.postfix()?;
            depth = depth.max(member_depth);
            members.push(member);
        }
        let expr = collapse_union(members);
        if matches!(expr, SourceTypeExpression::GeneralUnion(_)) {
            depth += 1;
            self.check_nesting(depth, start)?;
        }
        Ok((expr, depth))
    }

    fn postfix(&mut self) -> Result<Nested, ParserError> {
        let (mut expr, mut depth) = self.primary()?;
        loop {
            let offset = self.offset();
            if !self.eat(&Token::LBracket) {
                break;
            }
            self.expect(Token::RBracket, "']'")?;
            depth += 1;
            self.check_nesting(depth, offset)?;
            expr = SourceTypeExpression::ArrayOf(Box::new(expr));
        }
        Ok((expr, depth))
    }

    fn primary(&mut self) -> Result<Nested, ParserError> {
        match self.advance() {
            Some((offset, Token::Ident(name))) => {
                if name == "Array" && self.eat(&Token::Lt) {
                    let (inner, depth) = self.group(offset)?;
                    self.expect(Token::Gt, "'>'")?;
                    self.check_nesting(depth + 1, offset)?;
                    return Ok((SourceTypeExpression::ArrayOf(Box::new(inner)), depth + 1));
                }
                Ok((keyword(&name).unwrap_or(SourceTypeExpression::ComponentReference(name)), 0))
            }
            Some((_, Token::Str(value))) => Ok((
                SourceTypeExpression::LiteralUnion(vec![LiteralValue::String(value)]),
                0,
            )),
            Some((_, Token::Number(value))) => Ok((
                SourceTypeExpression::LiteralUnion(vec![LiteralValue::Number(value)]),
                0,
            )),
            Some((offset, Token::LParen)) => {
                let inner = self.group(offset)?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some((offset, token)) => Err(error(
                self.input,
                offset,
                format!("unexpected {:?}, expected a type", token),
            )),
            None => Err(error(
                self.input,
                self.input.len(),
                "unexpected end of type expression",
            )),
        }
    }
}

fn keyword(name: &str) -> Option<SourceTypeExpression> {
    let expr = match name {
        "number" | "Float" | "float" => SourceTypeExpression::PrimitiveKeyword(PrimitiveKeyword::Number),
        "Integer" | "Int" | "int" => SourceTypeExpression::BrandedIntegerMarker,
        "string" => SourceTypeExpression::PrimitiveKeyword(PrimitiveKeyword::String),
        "boolean" => SourceTypeExpression::PrimitiveKeyword(PrimitiveKeyword::Boolean),
        "true" => SourceTypeExpression::LiteralUnion(vec![LiteralValue::Boolean(true)]),
        "false" => SourceTypeExpression::LiteralUnion(vec![LiteralValue::Boolean(false)]),
        "any" => SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Explicit),
        "unknown" => SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Unresolved),
        _ => return None,
    };
    Some(expr)
}

/// Literal-only unions merge into one literal union
fn collapse_union(mut members: Vec<SourceTypeExpression>) -> SourceTypeExpression {
    if members.len() == 1 {
        return members.remove(0);
    }

    if members
        .iter()
        .all(|m| matches!(m, SourceTypeExpression::LiteralUnion(_)))
    {
        let values = members
            .into_iter()
            .flat_map(|m| match m {
                SourceTypeExpression::LiteralUnion(values) => values,
                _ => Vec::new(),
            })
            .collect();
        return SourceTypeExpression::LiteralUnion(values);
    }

    SourceTypeExpression::GeneralUnion(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> SourceTypeExpression {
        parse_type_expression(input).unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("Integer"), SourceTypeExpression::BrandedIntegerMarker);
        assert_eq!(parse("number"), SourceTypeExpression::number());
        assert_eq!(parse("Float"), SourceTypeExpression::number());
        assert_eq!(parse(" string "), SourceTypeExpression::string());
        assert_eq!(parse("boolean"), SourceTypeExpression::boolean());
        assert_eq!(
            parse("any"),
            SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Explicit)
        );
        assert_eq!(
            parse("unknown"),
            SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Unresolved)
        );
        assert_eq!(parse("ChildComponent"), SourceTypeExpression::reference("ChildComponent"));
    }

    #[test]
    fn test_literal_unions() {
        assert_eq!(
            parse("'foo' | \"bar\""),
            SourceTypeExpression::LiteralUnion(vec![
                LiteralValue::String("foo".to_string()),
                LiteralValue::String("bar".to_string()),
            ])
        );
        assert_eq!(
            parse("| 0 | -1.5"),
            SourceTypeExpression::LiteralUnion(vec![
                LiteralValue::Number(0.0),
                LiteralValue::Number(-1.5),
            ])
        );
        assert_eq!(
            parse("'it\\'s'"),
            SourceTypeExpression::LiteralUnion(vec![LiteralValue::String("it's".to_string())])
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            parse("string[][]"),
            SourceTypeExpression::list_of(SourceTypeExpression::string(), 2)
        );
        assert_eq!(
            parse("Array<number>"),
            SourceTypeExpression::list_of(SourceTypeExpression::number(), 1)
        );
        assert_eq!(
            parse("Array<number[]>"),
            SourceTypeExpression::list_of(SourceTypeExpression::number(), 2)
        );
        assert_eq!(
            parse("(number | number[])[]"),
            SourceTypeExpression::list_of(
                SourceTypeExpression::GeneralUnion(vec![
                    SourceTypeExpression::number(),
                    SourceTypeExpression::list_of(SourceTypeExpression::number(), 1),
                ]),
                1
            )
        );
    }

    #[test]
    fn test_general_union() {
        assert_eq!(
            parse("string | number"),
            SourceTypeExpression::GeneralUnion(vec![
                SourceTypeExpression::string(),
                SourceTypeExpression::number(),
            ])
        );
        assert_eq!(
            parse("'a' | 1"),
            SourceTypeExpression::LiteralUnion(vec![
                LiteralValue::String("a".to_string()),
                LiteralValue::Number(1.0),
            ])
        );
    }

    #[test]
    fn test_parse_errors() {
        for input in ["", "string[", "'open", "number | ", "Array<string", "(string", "string ]", "#"] {
            let err = parse_type_expression(input).unwrap_err();
            assert!(
                matches!(err, ParserError::Parse { .. }),
                "expected parse error for {:?}, got {:?}",
                input,
                err
            );
        }

        match parse_type_expression("string ]").unwrap_err() {
            ParserError::Parse { position, .. } => assert_eq!(position, 7),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deepest = format!("string{}", "[]".repeat(MAX_NESTING));
        assert_eq!(
            parse(&deepest),
            SourceTypeExpression::list_of(SourceTypeExpression::string(), MAX_NESTING)
        );

        let too_deep = [
            format!("string{}", "[]".repeat(MAX_NESTING + 1)),
            format!("{}string{}", "Array<".repeat(MAX_NESTING + 1), ">".repeat(MAX_NESTING + 1)),
            format!("{}string{}", "(".repeat(10_000), ")".repeat(10_000)),
        ];
        for input in &too_deep {
            assert!(matches!(
                parse_type_expression(input),
                Err(ParserError::Parse { .. })
            ));
        }
    }
}

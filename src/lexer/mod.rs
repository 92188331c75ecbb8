use logos::Logos;
use log::trace;
use crate::error::{PanicResult, syntax_error, SourceLocation};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // keywords
    #[token("im")]
    Im,
    #[token("mu")]
    Mu,
    #[token("f", priority = 3)]
    Func,
    #[token("c", priority = 3)]
    Class,
    #[token("con")]
    Con,
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("l", priority = 3)]
    Loop,
    #[token("in")]
    In,
    #[token("r", priority = 3)]
    #[token("return")]
    Return,
    #[token("b", priority = 3)]
    #[token("break")]
    Break,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLiteral(Option<i64>),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(Option<f64>),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    StringLiteral(String),

    // operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,

    // delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    DotDotDot,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,

    Eof,
}

impl Token {
    /// Whether the token can begin an expression.
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_)
                | Token::IntLiteral(_)
                | Token::FloatLiteral(_)
                | Token::StringLiteral(_)
                | Token::True
                | Token::False
                | Token::LParen
                | Token::LBracket
                | Token::Minus
                | Token::Bang
        )
    }
}

#[derive(Debug, Clone)]
pub struct TokenWithLocation {
    pub token: Token,
    pub loc: SourceLocation,
    /// Byte range of the token in the source.
    pub span: std::ops::Range<usize>,
    /// Whether a line break separates this token from the previous one.
    pub line_start: bool,
}

pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    line_starts: Vec<usize>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            inner: Token::lexer(source),
            line_starts,
        }
    }

    fn location(&self, offset: usize) -> SourceLocation {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = self.source[self.line_starts[line]..offset].chars().count() + 1;
        SourceLocation::new(line + 1, column)
    }

    pub fn tokenize(&mut self) -> PanicResult<Vec<TokenWithLocation>> {
        let mut tokens: Vec<TokenWithLocation> = Vec::new();
        let mut previous_line = 0;

        while let Some(token_result) = self.inner.next() {
            let span = self.inner.span();
            let loc = self.location(span.start);
            match token_result {
                Ok(Token::IntLiteral(None)) | Ok(Token::FloatLiteral(None)) => {
                    return Err(syntax_error(
                        loc,
                        format!("Number literal out of range: {}", &self.source[span]),
                    ));
                }
                Ok(token) => {
                    let line_start = loc.line != previous_line;
                    previous_line = loc.line;
                    tokens.push(TokenWithLocation { token, loc, span, line_start });
                }
                Err(_) => {
                    let error_char = &self.source[span.clone()];
                    return Err(syntax_error(loc, format!("Unexpected character: '{}'", error_char)));
                }
            }
        }

        let end = self.source.len();
        tokens.push(TokenWithLocation {
            token: Token::Eof,
            loc: self.location(end),
            span: end..end,
            line_start: true,
        });

        trace!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }
}

pub fn lex(source: &str) -> PanicResult<Vec<TokenWithLocation>> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_range_is_not_a_float() {
        assert_eq!(
            kinds("[1...5]"),
            vec![
                Token::LBracket,
                Token::IntLiteral(Some(1)),
                Token::DotDotDot,
                Token::IntLiteral(Some(5)),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("mu count: 1 # trailing comment"),
            vec![
                Token::Mu,
                Token::Identifier("count".to_string()),
                Token::Colon,
                Token::IntLiteral(Some(1)),
                Token::Eof,
            ]
        );
        assert_eq!(kinds("return r"), vec![Token::Return, Token::Return, Token::Eof]);
    }

    #[test]
    fn test_single_letter_keywords_beat_identifiers() {
        let ident = |name: &str| Token::Identifier(name.to_string());
        assert_eq!(
            kinds("f fx c cat l lx r b bx"),
            vec![
                Token::Func,
                ident("fx"),
                Token::Class,
                ident("cat"),
                Token::Loop,
                ident("lx"),
                Token::Return,
                Token::Break,
                ident("bx"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_locations_track_lines_and_columns() {
        let tokens = lex("im x: 1\n  p x").unwrap();
        assert_eq!(tokens[4].loc, SourceLocation::new(2, 3));
        assert!(tokens[4].line_start);
        assert!(!tokens[5].line_start);
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("p 1 $ 2").unwrap_err();
        assert_eq!(err.to_string(), "Line 1, col 5: Unexpected character: '$'");
    }
}

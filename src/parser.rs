use logos::Logos;

use crate::error::RokError;


#[derive(Debug, Clone, Copy, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Token<'a> {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    Str(&'a str),

    #[regex(r";[^\n]*", |lex| lex.slice())]
    Comment(&'a str),

    #[regex(r"[a-zA-Z0-9_+\-*/\\=<>!&%^?|]+", |lex| lex.slice())]
    Literal(&'a str),
}

impl<'a> Token<'a> {
    fn text(&self) -> &'a str {
        match *self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Str(text) | Self::Comment(text) | Self::Literal(text) => text,
        }
    }
}

/// Tag of a parse tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The root, holding every top-level expression.
    Program,
    Number,
    Boolean,
    Symbol,
    String,
    Comment,
    SExpression,
    QExpression,
    /// One of the delimiters `(`, `)`, `{` or `}`.
    Punctuation,
}

// The parse tree borrows its text from the source. Leaves carry their text,
// lists carry their children including delimiters and comments
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind,
    pub contents: &'a str,
    pub children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    fn leaf(kind: NodeKind, contents: &'a str) -> Self {
        Self { kind, contents, children: Vec::new() }
    }

    fn list(kind: NodeKind, children: Vec<Node<'a>>) -> Self {
        Self { kind, contents: "", children }
    }
}

type ParseResult<O> = Result<O, RokError>;


fn lexer<'a>(input: &'a str) -> ParseResult<Vec<Token<'a>>> {
    let mut tokens = vec![];
    let mut tokenizer = Token::lexer(input).spanned();

    while let Some((result, span)) = tokenizer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => return Err(RokError::InvalidToken { offset: span.start })
        }
    }

    Ok(tokens)
}

fn parse_token<'a, 'b: 'a>(token_recognizer: impl Fn(&'a Token<'b>) -> bool) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], &'a Token<'b>)> {
    move |tokens| {
        let Some(token) = tokens.first() else {
            return Err(RokError::SyntaxError("unexpected end of input".to_owned()))
        };

        if !token_recognizer(token) {
            return Err(RokError::SyntaxError(format!("unexpected '{}'", token.text())))
        }
        Ok((&tokens[1..], token))
    }
}

fn parse_surrounds<'a, 'b: 'a, O>(
    start_recognizer: impl Fn(&'a Token<'b>) -> bool,
    internal_parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>,
    end_recognizer: impl Fn(&'a Token<'b>) -> bool,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], (&'a Token<'b>, O, &'a Token<'b>))> {
    let start_parser = parse_token(start_recognizer);
    let end_parser = parse_token(end_recognizer);

    move |tokens| {
        let (tokens, start) = start_parser(tokens)?;
        let (tokens, internal) = internal_parser(tokens)?;
        let (tokens, end) = end_parser(tokens)?;

        Ok((tokens, (start, internal, end)))
    }
}

fn parse_list<'a, 'b: 'a, O>(
    parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Vec<O>)> {
    move |mut tokens| {
        let mut result = vec![];

        while let Ok((new_tokens, value)) = parser(tokens) {
            result.push(value);
            tokens = new_tokens
        }

        Ok((tokens, result))
    }
}

fn parse_either<'a, 'b: 'a, O>(
    a: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>,
    b: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)> {
    move |tokens| {
        if let Ok(a) = a(tokens) {
            return Ok(a)
        }
        b(tokens)
    }
}

fn is_number(literal: &str) -> bool {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_atom<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    let (tokens, token) = parse_token(|token| matches!(token, Token::Literal(_) | Token::Str(_) | Token::Comment(_)))(tokens)?;
    let node = match *token {
        Token::Literal(literal) if is_number(literal) => Node::leaf(NodeKind::Number, literal),
        Token::Literal(literal @ ("true" | "false")) => Node::leaf(NodeKind::Boolean, literal),
        Token::Literal(literal) => Node::leaf(NodeKind::Symbol, literal),
        Token::Str(text) => Node::leaf(NodeKind::String, text),
        Token::Comment(text) => Node::leaf(NodeKind::Comment, text),
        other => Node::leaf(NodeKind::Punctuation, other.text()),
    };
    Ok((tokens, node))
}

fn parse_delimited<'a, 'b: 'a>(
    kind: NodeKind,
    start_recognizer: impl Fn(&'a Token<'b>) -> bool,
    end_recognizer: impl Fn(&'a Token<'b>) -> bool,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    let parser = parse_surrounds(start_recognizer, parse_list(parse_expression), end_recognizer);

    move |tokens| {
        let (tokens, (start, internal, end)) = parser(tokens)?;

        let mut children = Vec::with_capacity(internal.len() + 2);
        children.push(Node::leaf(NodeKind::Punctuation, start.text()));
        children.extend(internal);
        children.push(Node::leaf(NodeKind::Punctuation, end.text()));

        Ok((tokens, Node::list(kind, children)))
    }
}

fn parse_sexpression<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    parse_delimited(
        NodeKind::SExpression,
        |token| matches!(token, Token::LeftParen),
        |token| matches!(token, Token::RightParen),
    )(tokens)
}

fn parse_qexpression<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    parse_delimited(
        NodeKind::QExpression,
        |token| matches!(token, Token::LeftBrace),
        |token| matches!(token, Token::RightBrace),
    )(tokens)
}

fn parse_expression<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    parse_either(
        parse_atom,
        parse_either(parse_sexpression, parse_qexpression),
    )(tokens)
}

/// Parses `input` into a [`NodeKind::Program`] node whose children are the
/// top-level expressions and comments.
pub fn parse(input: &str) -> ParseResult<Node<'_>> {
    let tokens = lexer(input)?;

    let (rest, children) = parse_list(parse_expression)(&tokens)?;
    match rest.first() {
        None => Ok(Node::list(NodeKind::Program, children)),
        Some(token @ (Token::LeftParen | Token::LeftBrace)) => Err(RokError::SyntaxError(format!("unclosed '{}'", token.text()))),
        Some(token) => Err(RokError::SyntaxError(format!("unexpected '{}'", token.text()))),
    }
}

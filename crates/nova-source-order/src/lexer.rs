use std::fmt;

/// Classification of a lexed token.
///
/// Whitespace is never emitted. Comments are emitted so callers can see them,
/// but carry no structure and are skipped by the declaration scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Punctuation,
    OpenBrace,
    CloseBrace,
    StringLiteral,
    CharLiteral,
    Comment,
    Other,
}

impl TokenKind {
    /// Tokens that never affect structure.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the lexed text.
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})@{}", self.kind, self.text, self.offset)
    }
}

/// Reserved words of the Java language, plus the literal words `true`,
/// `false` and `null`. Contextual keywords (`record`, `var`, `yield`,
/// `sealed`, `permits`, ...) are lexed as identifiers.
const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Lazily tokenizes Java source text.
///
/// The lexer never fails. If the input ends inside a string/char literal or a
/// block comment, the unterminated token is dropped, the sequence ends, and
/// [`Lexer::is_truncated`] reports `true`.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    truncated: bool,
}

/// Returns a fresh token sequence over `text`.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer::new(text)
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            truncated: false,
        }
    }

    /// Whether the sequence ended early inside an unterminated literal or comment.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Byte offset where lexing stopped (or will resume).
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.bump_char();
        }
    }

    fn truncate(&mut self) -> Option<Token<'a>> {
        self.truncated = true;
        self.pos = self.text.len();
        None
    }

    /// Consumes up to and including the first unescaped `close`. The opening
    /// delimiter has already been consumed.
    fn eat_quoted(&mut self, close: &str) -> bool {
        loop {
            if self.remaining().starts_with(close) {
                self.pos += close.len();
                return true;
            }
            match self.bump_char() {
                Some('\\') => {
                    self.bump_char();
                }
                Some(_) => {}
                None => return false,
            }
        }
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        if self.truncated {
            return None;
        }

        self.eat_while(char::is_whitespace);
        let start = self.pos;
        let rem = self.remaining();
        let c = self.peek_char()?;

        let kind = if rem.starts_with("//") {
            self.eat_while(|c| c != '\n');
            TokenKind::Comment
        } else if rem.starts_with("/*") {
            match rem[2..].find("*/") {
                Some(end) => self.pos += 2 + end + 2,
                None => return self.truncate(),
            }
            TokenKind::Comment
        } else if rem.starts_with("\"\"\"") {
            self.pos += 3;
            if !self.eat_quoted("\"\"\"") {
                return self.truncate();
            }
            TokenKind::StringLiteral
        } else if c == '"' || c == '\'' {
            self.bump_char();
            let close = if c == '"' { "\"" } else { "'" };
            if !self.eat_quoted(close) {
                return self.truncate();
            }
            if c == '"' {
                TokenKind::StringLiteral
            } else {
                TokenKind::CharLiteral
            }
        } else if c == '{' {
            self.bump_char();
            TokenKind::OpenBrace
        } else if c == '}' {
            self.bump_char();
            TokenKind::CloseBrace
        } else if is_ident_start(c) {
            self.eat_while(is_ident_part);
            if is_keyword(&self.text[start..self.pos]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else if c.is_ascii_digit() {
            self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            TokenKind::Other
        } else if c.is_ascii_punctuation() {
            self.bump_char();
            TokenKind::Punctuation
        } else {
            self.bump_char();
            TokenKind::Other
        };

        Some(Token {
            kind,
            text: &self.text[start..self.pos],
            offset: start,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

fn is_ident_part(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

use std::collections::BTreeMap;

use crate::lexer::{Token, TokenKind};

const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

/// Abstract method names per fully-qualified type, in source order.
///
/// Produced by [`extract_declaration_order`]. Every type whose body was
/// entered has an entry, even if it declares no abstract methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationOrder {
    types: BTreeMap<String, Vec<String>>,
    complete: bool,
}

impl DeclarationOrder {
    /// Method names declared directly in `qualified_name` (`pkg.Outer.Inner`).
    pub fn get(&self, qualified_name: &str) -> Option<&[String]> {
        self.types.get(qualified_name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.types
            .iter()
            .map(|(name, methods)| (name.as_str(), methods.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// `false` when braces did not balance: a `}` without a matching `{`, or
    /// type bodies still open at end of input. The mapping then only reflects
    /// what was seen before things went wrong.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.types
    }
}

/// Finds the abstract (body-less) methods declared in each type of a
/// compilation unit, in encounter order.
///
/// Type names are qualified starting from `root_package` (empty for the
/// default package). Methods of nested types are attributed to the nested
/// type only; constructors, `native` methods, and anything inside method
/// bodies, initializers or anonymous classes are ignored.
pub fn extract_declaration_order<'a>(
    tokens: impl IntoIterator<Item = Token<'a>>,
    root_package: &str,
) -> DeclarationOrder {
    let tokens: Vec<Token<'a>> = tokens
        .into_iter()
        .filter(|token| !token.kind.is_trivia())
        .collect();
    Scanner::new(&tokens, root_package).run()
}

#[derive(Debug)]
struct TypeScope {
    qualified_name: String,
    simple_name: String,
    /// Brace depth inside this type's body.
    body_depth: usize,
}

struct Scanner<'t, 'a> {
    tokens: &'t [Token<'a>],
    scopes: Vec<TypeScope>,
    depth: usize,
    /// Set after `class`/`interface`/`enum`/`record` until the type's name is seen.
    expect_type_name: bool,
    /// A declared type whose body `{` has not been reached yet.
    pending_type: Option<&'a str>,
    /// First token of the member declaration currently being read.
    member_start: usize,
    unbalanced: bool,
    types: BTreeMap<String, Vec<String>>,
}

impl<'t, 'a> Scanner<'t, 'a> {
    fn new(tokens: &'t [Token<'a>], root_package: &str) -> Self {
        Self {
            tokens,
            scopes: vec![TypeScope {
                qualified_name: root_package.to_string(),
                simple_name: String::new(),
                body_depth: 0,
            }],
            depth: 0,
            expect_type_name: false,
            pending_type: None,
            member_start: 0,
            unbalanced: false,
            types: BTreeMap::new(),
        }
    }

    fn run(mut self) -> DeclarationOrder {
        for idx in 0..self.tokens.len() {
            self.step(idx);
        }
        let complete = !self.unbalanced && self.scopes.len() == 1 && self.depth == 0;
        if !complete {
            tracing::trace!(
                target = "nova.source_order",
                open_scopes = self.scopes.len() - 1,
                depth = self.depth,
                unbalanced = self.unbalanced,
                "declaration scan ended with unbalanced braces"
            );
        }
        DeclarationOrder {
            types: self.types,
            complete,
        }
    }

    fn top(&self) -> &TypeScope {
        // The root scope is never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    /// Whether we're directly in a type body (or at file level), where type
    /// and member declarations can start.
    fn at_declaration_level(&self) -> bool {
        self.depth == self.top().body_depth
    }

    fn in_type_body(&self) -> bool {
        self.scopes.len() > 1 && self.at_declaration_level()
    }

    fn step(&mut self, idx: usize) {
        let token = self.tokens[idx];
        match token.kind {
            TokenKind::OpenBrace => {
                if let Some(simple_name) = self.pending_type.take() {
                    self.push_scope(simple_name);
                }
                self.depth += 1;
                self.expect_type_name = false;
                self.member_start = idx + 1;
            }
            TokenKind::CloseBrace => {
                if self.depth == 0 {
                    self.unbalanced = true;
                    return;
                }
                if self.scopes.len() > 1 && self.top().body_depth == self.depth {
                    self.scopes.pop();
                }
                self.depth -= 1;
                self.pending_type = None;
                self.expect_type_name = false;
                self.member_start = idx + 1;
            }
            TokenKind::Punctuation if token.text == ";" => {
                if self.at_declaration_level() {
                    self.pending_type = None;
                    self.expect_type_name = false;
                }
                self.member_start = idx + 1;
            }
            TokenKind::Keyword
                if matches!(token.text, "class" | "interface" | "enum")
                    && self.at_declaration_level()
                    && !self.prev_is_dot(idx) =>
            {
                self.expect_type_name = true;
            }
            TokenKind::Identifier => self.identifier(idx, token.text),
            _ => {}
        }
    }

    fn identifier(&mut self, idx: usize, text: &'a str) {
        if self.expect_type_name {
            self.expect_type_name = false;
            self.pending_type = Some(text);
            return;
        }
        if self.pending_type.is_some() || !self.at_declaration_level() {
            return;
        }
        if text == "record" && self.kind_at(idx + 1) == Some(TokenKind::Identifier) {
            self.expect_type_name = true;
            return;
        }
        if self.in_type_body() {
            if let Some(name) = self.abstract_method_at(idx) {
                let qualified = self.top().qualified_name.clone();
                self.types.entry(qualified).or_default().push(name.to_string());
            }
        }
    }

    fn push_scope(&mut self, simple_name: &str) {
        let parent = &self.top().qualified_name;
        let qualified_name = if parent.is_empty() {
            simple_name.to_string()
        } else {
            format!("{parent}.{simple_name}")
        };
        self.types.entry(qualified_name.clone()).or_default();
        self.scopes.push(TypeScope {
            qualified_name,
            simple_name: simple_name.to_string(),
            body_depth: self.depth + 1,
        });
    }

    /// Matches `<type> name ( ... ) [throws ...] ;` with `name` at `idx`, and
    /// annotation elements `<type> name() default <value>;`.
    fn abstract_method_at(&self, idx: usize) -> Option<&'a str> {
        let name = self.tokens[idx];
        if !self.tokens.get(idx + 1)?.is_punct("(") {
            return None;
        }
        if idx == 0 || idx <= self.member_start || !is_type_like(&self.tokens[idx - 1]) {
            return None;
        }

        let next = self.matching_paren(idx + 1)? + 1;
        let token = self.tokens.get(next)?;
        if token.is_keyword("throws") {
            self.declaration_end(next, false)?;
        } else if token.is_keyword("default") {
            // Element values may be array initializers: `default {"a", "b"}`.
            self.declaration_end(next, true)?;
        } else if !token.is_punct(";") {
            return None;
        }

        if name.text == self.top().simple_name {
            return None;
        }
        let mut parens = 0usize;
        for token in &self.tokens[self.member_start..idx] {
            if token.is_keyword("native") {
                return None;
            }
            if token.is_punct("(") {
                parens += 1;
            } else if token.is_punct(")") {
                parens = parens.saturating_sub(1);
            } else if parens == 0 && token.is_punct("=") {
                // Outside annotation arguments, `=` means a call in a field initializer.
                return None;
            }
        }
        Some(name.text)
    }

    /// Index of the `;` ending the declaration that continues at `from`.
    /// Braces end the search unless `nested_braces` allows balanced ones.
    fn declaration_end(&self, from: usize, nested_braces: bool) -> Option<usize> {
        let mut braces = 0usize;
        for (offset, token) in self.tokens[from..].iter().enumerate() {
            match token.kind {
                TokenKind::OpenBrace if nested_braces => braces += 1,
                TokenKind::CloseBrace if nested_braces && braces > 0 => braces -= 1,
                TokenKind::OpenBrace | TokenKind::CloseBrace => return None,
                TokenKind::Punctuation if braces == 0 && token.text == ";" => {
                    return Some(from + offset)
                }
                _ => {}
            }
        }
        None
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut parens = 0usize;
        for (offset, token) in self.tokens[open..].iter().enumerate() {
            if token.is_punct("(") {
                parens += 1;
            } else if token.is_punct(")") {
                parens -= 1;
                if parens == 0 {
                    return Some(open + offset);
                }
            }
        }
        None
    }

    fn kind_at(&self, idx: usize) -> Option<TokenKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    fn prev_is_dot(&self, idx: usize) -> bool {
        idx > 0 && self.tokens[idx - 1].is_punct(".")
    }
}

/// Tokens that can end a return type: `String`, `int`, `List<T>`, `int[]`.
fn is_type_like(token: &Token<'_>) -> bool {
    match token.kind {
        TokenKind::Identifier => true,
        TokenKind::Keyword => PRIMITIVE_TYPES.contains(&token.text),
        TokenKind::Punctuation => matches!(token.text, ">" | "]"),
        _ => false,
    }
}

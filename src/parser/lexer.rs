//! Lexers for component template markup using logos
//!
//! Markup is lexed in two passes: `MarkupToken` splits the template into
//! text, interpolations, comments and tags, then `TagToken` breaks a single
//! opening tag into its name and attributes.

use logos::Logos;

pub use super::ast::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum MarkupToken {
    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    #[regex(r"</[A-Za-z][A-Za-z0-9:._-]*[ \t\r\n]*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim_end().to_string()
    })]
    CloseTag(String),

    #[regex(r#"<[A-Za-z][A-Za-z0-9:._-]*([ \t\r\n]+[^ \t\r\n"'<>/=]+([ \t\r\n]*=[ \t\r\n]*("[^"]*"|'[^']*'|[^ \t\r\n"'<>=]+))?)*[ \t\r\n]*/?>"#)]
    OpenTag,

    #[regex(r"\{\{([^}]|\}[^}])*\}\}")]
    Interpolation,

    /// `{{` with no matching `}}`
    #[token("{{")]
    UnterminatedInterpolation,

    #[regex(r"[^<{]+")]
    Text,

    // A lone `<` or `{` that starts nothing
    #[token("<")]
    #[token("{")]
    Stray,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum TagToken {
    #[regex(r"<[A-Za-z][A-Za-z0-9:._-]*", |lex| lex.slice()[1..].to_string())]
    TagName(String),

    #[regex(r#"[^ \t\r\n"'<>/=]+"#, |lex| lex.slice().to_string())]
    Word(String),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Quoted(String),

    #[token("/>")]
    SelfClose,

    #[token(">")]
    End,
}

/// Lex template markup into tokens with spans
///
/// logos does not fall back to a shorter token once a longer pattern has
/// started to match, so an error token is split here: a leading `{{` becomes
/// `UnterminatedInterpolation`, any other leading character becomes `Stray`,
/// and lexing restarts right after it.
pub fn lex(input: &str) -> impl Iterator<Item = (MarkupToken, Span)> + '_ {
    let mut offset = 0;
    let mut lexer = MarkupToken::lexer(input);
    std::iter::from_fn(move || loop {
        let token = lexer.next()?;
        let span = lexer.span();
        let start = offset + span.start;
        match token {
            Ok(token) => return Some((token, start..offset + span.end)),
            Err(()) => {
                let slice = lexer.slice();
                let (token, len) = if slice.starts_with("{{") {
                    (MarkupToken::UnterminatedInterpolation, 2)
                } else {
                    match slice.chars().next() {
                        Some(c) => (MarkupToken::Stray, c.len_utf8()),
                        None => continue,
                    }
                };
                offset = start + len;
                lexer = MarkupToken::lexer(&input[offset..]);
                return Some((token, start..offset));
            }
        }
    })
}

/// Lex the inside of one opening tag; spans are shifted by `offset`
pub fn lex_tag(tag: &str, offset: usize) -> impl Iterator<Item = (TagToken, Span)> + '_ {
    TagToken::lexer(tag)
        .spanned()
        .filter_map(move |(tok, span)| {
            tok.ok()
                .map(|t| (t, span.start + offset..span.end + offset))
        })
}

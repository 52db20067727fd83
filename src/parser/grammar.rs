//! Parsers for opening tags and `v-for` clauses

use std::iter::Peekable;

use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{lex_tag, TagToken};

/// Parse the text of one opening tag starting at `offset` in the template
pub fn parse_element(tag: &str, offset: usize) -> Element {
    let mut tokens = lex_tag(tag, offset).peekable();
    let mut name = String::new();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    while let Some((token, span)) = tokens.next() {
        match token {
            TagToken::TagName(tag_name) => name = tag_name,
            TagToken::Word(attr_name) => {
                let value = attribute_value(&mut tokens);
                attributes.push(Attribute {
                    name: Spanned::new(attr_name, span),
                    value,
                });
            }
            TagToken::SelfClose => self_closing = true,
            TagToken::End | TagToken::Equals | TagToken::Quoted(_) => {}
        }
    }

    Element {
        name,
        attributes,
        self_closing,
        span: offset..offset + tag.len(),
    }
}

/// Consume `= value` after an attribute name, if present
fn attribute_value<I>(tokens: &mut Peekable<I>) -> Option<Spanned<String>>
where
    I: Iterator<Item = (TagToken, Span)>,
{
    if !matches!(tokens.peek(), Some((TagToken::Equals, _))) {
        return None;
    }
    tokens.next();

    match tokens.peek() {
        Some((TagToken::Quoted(_), _)) => match tokens.next() {
            // Point the span at the text between the quotes
            Some((TagToken::Quoted(value), span)) => {
                Some(Spanned::new(value, span.start + 1..span.end - 1))
            }
            _ => None,
        },
        Some((TagToken::Word(_), _)) => match tokens.next() {
            Some((TagToken::Word(value), span)) => Some(Spanned::new(value, span)),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a `v-for` clause such as `(Todo todo, index) in todos`
pub fn parse_loop_clause(input: &str) -> Result<LoopClause, Vec<crate::ParseError>> {
    loop_clause_parser()
        .parse(input)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn loop_clause_parser<'a>() -> impl Parser<'a, &'a str, LoopClause, extra::Err<Rich<'a, char>>>
{
    let ident = text::ident()
        .try_map(|s: &str, span| match s {
            "in" | "of" => Err(Rich::custom(span, "expected a loop variable")),
            _ => Ok(s.to_string()),
        });

    // `Type name`, `pkg.Type name` or just `name`
    let type_path = ident
        .clone()
        .separated_by(just('.'))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|parts| parts.join("."));

    let variable = type_path
        .then(text::whitespace().at_least(1).ignore_then(ident.clone()).or_not())
        .map(|(first, second)| match second {
            Some(name) => LoopVariable {
                type_name: Some(first),
                name,
            },
            None => LoopVariable {
                type_name: None,
                name: first,
            },
        });

    let variables = choice((
        variable
            .clone()
            .separated_by(just(',').padded())
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just('(').padded(), just(')').padded()),
        variable.map(|v| vec![v]),
    ));

    let collection = any()
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map_with(|text, e| {
            let span: SimpleSpan = e.span();
            let trimmed = text.trim_end().to_string();
            let end = span.start + trimmed.len();
            Spanned::new(trimmed, span.start..end)
        });

    variables
        .padded()
        .then_ignore(choice((text::keyword("in"), text::keyword("of"))))
        .then_ignore(text::whitespace())
        .then(collection)
        .map(|(variables, collection)| LoopClause {
            variables,
            collection,
        })
}

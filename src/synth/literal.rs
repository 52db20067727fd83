//! Text literals in generated source
//!
//! Target compilers put a hard ceiling on the size of a single string
//! constant, so template text longer than the chunk budget is emitted as a
//! series of appends.

use super::writer::SourceBuilder;

/// Characters allowed in one generated string constant
///
/// A constant is capped at 2^16 bytes of encoded data, and one character can
/// take four bytes, which leaves 2^14 - 1 characters.
pub const MAX_LITERAL_CHUNK: usize = 16383;

/// Escape text for use inside a double-quoted literal
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Split `text` into consecutive pieces of at most `budget` characters
///
/// Joining the pieces in order gives back `text`. No piece is empty, and empty
/// text produces no pieces at all.
pub fn split_literal(text: &str, budget: usize) -> Vec<&str> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(budget)
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// Write the body of an accessor returning `text`
pub fn write_text_return(out: &mut SourceBuilder, text: &str, budget: usize) {
    if text.chars().count() <= budget {
        out.line(format!("return \"{}\";", escape_literal(text)));
        return;
    }

    out.line("StringBuilder builder = new StringBuilder();");
    for chunk in split_literal(text, budget) {
        out.line(format!("builder.append(\"{}\");", escape_literal(chunk)));
    }
    out.line("return builder.toString();");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn test_chunks_reassemble_at_boundaries() {
        let budget = MAX_LITERAL_CHUNK;
        for len in [0, 1, budget - 1, budget, budget + 1, 3 * budget + 7] {
            let text = text_of(len);
            let chunks = split_literal(&text, budget);
            assert_eq!(chunks.concat(), text, "length {}", len);
            assert!(chunks.iter().all(|c| !c.is_empty()), "length {}", len);
            assert!(chunks.iter().all(|c| c.chars().count() <= budget));
            assert_eq!(chunks.len(), len.div_ceil(budget), "length {}", len);
        }
    }

    #[test]
    fn test_last_single_character_is_kept() {
        let chunks = split_literal("abcde", 2);
        assert_eq!(chunks, vec!["ab", "cd", "e"]);
    }

    #[test]
    fn test_chunks_split_on_character_boundaries() {
        let chunks = split_literal("héllo wörld", 3);
        assert_eq!(chunks, vec!["hél", "lo ", "wör", "ld"]);
    }

    #[test]
    fn test_zero_budget_still_terminates() {
        assert_eq!(split_literal("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(
            escape_literal("<a title=\"x\">\\\n\t\u{1}</a>"),
            "<a title=\\\"x\\\">\\\\\\n\\t\\u0001</a>"
        );
    }

    #[test]
    fn test_short_text_is_one_literal() {
        let mut out = SourceBuilder::new();
        write_text_return(&mut out, "<p>hi</p>", 16);
        assert_eq!(out.finish(), "return \"<p>hi</p>\";\n");
    }

    #[test]
    fn test_long_text_is_appended_in_chunks() {
        let mut out = SourceBuilder::new();
        write_text_return(&mut out, "abcdefg", 3);
        assert_eq!(
            out.finish(),
            "StringBuilder builder = new StringBuilder();\n\
             builder.append(\"abc\");\n\
             builder.append(\"def\");\n\
             builder.append(\"g\");\n\
             return builder.toString();\n"
        );
    }
}

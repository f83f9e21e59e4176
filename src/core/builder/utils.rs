//! Cursor and text helpers shared by the CST walk.

use std::collections::VecDeque;

use mitex_parser::syntax::{SyntaxElement, SyntaxKind};

/// One unit of input still waiting to be turned into nodes.
#[derive(Debug, Clone)]
pub(super) enum Pending {
    Element(SyntaxElement),
    /// Characters left over from a word whose first character was consumed
    /// as a script or command argument.
    Chars(String),
}

/// Input remaining in the sequence being built. Commands push their own
/// argument clauses to the front and then read arguments from it, so
/// arguments the parser left as siblings are found as well.
pub(super) type Cursor = VecDeque<Pending>;

pub(super) fn cursor_of<I>(elements: I) -> Cursor
where
    I: IntoIterator<Item = SyntaxElement>,
{
    elements.into_iter().map(Pending::Element).collect()
}

pub(super) fn push_front_all<I>(cursor: &mut Cursor, elements: I)
where
    I: IntoIterator<Item = SyntaxElement>,
{
    let elements: Vec<_> = elements.into_iter().collect();
    for elem in elements.into_iter().rev() {
        cursor.push_front(Pending::Element(elem));
    }
}

/// Whitespace and comments, which carry no meaning in math mode.
pub(super) fn is_trivia(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::TokenWhiteSpace
            | SyntaxKind::TokenLineBreak
            | SyntaxKind::TokenComment
            | SyntaxKind::ItemBlockComment
    )
}

pub(super) fn skip_trivia(cursor: &mut Cursor) {
    while let Some(Pending::Element(elem)) = cursor.front() {
        if !is_trivia(elem.kind()) {
            break;
        }
        cursor.pop_front();
    }
}

pub(super) fn children(elem: &SyntaxElement) -> Vec<SyntaxElement> {
    match elem {
        SyntaxElement::Node(n) => n.children_with_tokens().collect(),
        SyntaxElement::Token(_) => Vec::new(),
    }
}

pub(super) fn element_text(elem: &SyntaxElement) -> String {
    match elem {
        SyntaxElement::Node(n) => n.text().to_string(),
        SyntaxElement::Token(t) => t.text().to_string(),
    }
}

pub(super) fn joined_text(elements: &[SyntaxElement]) -> String {
    elements.iter().map(element_text).collect()
}

/// Split off the first character of a word.
pub(super) fn split_first_char(text: &str) -> Option<(&str, &str)> {
    let first = text.chars().next()?;
    Some(text.split_at(first.len_utf8()))
}

/// Name of an `ItemCmd`, including the leading backslash.
pub(super) fn command_name(elem: &SyntaxElement) -> Option<String> {
    use rowan::ast::AstNode;

    let SyntaxElement::Node(node) = elem else {
        return None;
    };
    mitex_parser::syntax::CmdItem::cast(node.clone())
        .and_then(|cmd| cmd.name_tok())
        .map(|tok| tok.text().to_string())
}

// =============================================================================
// Argument clauses
// =============================================================================

/// How the content of an argument clause is delimited.
pub(super) enum Clause {
    Braced(Vec<SyntaxElement>),
    Bracketed(Vec<SyntaxElement>),
    Bare,
}

/// Classify a `ClauseArgument` (or a bare `ItemCurly`/`ItemBracket`).
pub(super) fn clause_shape(elem: &SyntaxElement) -> Clause {
    match elem.kind() {
        SyntaxKind::ItemCurly => {
            return Clause::Braced(between(
                children(elem),
                SyntaxKind::TokenLBrace,
                SyntaxKind::TokenRBrace,
            ))
        }
        SyntaxKind::ItemBracket => {
            return Clause::Bracketed(between(
                children(elem),
                SyntaxKind::TokenLBracket,
                SyntaxKind::TokenRBracket,
            ))
        }
        _ => {}
    }

    let kids = children(elem);
    let significant: Vec<&SyntaxElement> =
        kids.iter().filter(|k| !is_trivia(k.kind())).collect();
    match significant.as_slice() {
        [only] if matches!(only.kind(), SyntaxKind::ItemCurly | SyntaxKind::ItemBracket) => {
            clause_shape(only)
        }
        [first, ..] if first.kind() == SyntaxKind::TokenLBrace => Clause::Braced(between(
            kids,
            SyntaxKind::TokenLBrace,
            SyntaxKind::TokenRBrace,
        )),
        [first, ..] if first.kind() == SyntaxKind::TokenLBracket => Clause::Bracketed(between(
            kids,
            SyntaxKind::TokenLBracket,
            SyntaxKind::TokenRBracket,
        )),
        _ => Clause::Bare,
    }
}

/// Elements strictly between the first `open` and the last `close` token.
fn between(kids: Vec<SyntaxElement>, open: SyntaxKind, close: SyntaxKind) -> Vec<SyntaxElement> {
    let start = kids
        .iter()
        .position(|k| k.kind() == open)
        .map_or(0, |i| i + 1);
    let end = kids
        .iter()
        .rposition(|k| k.kind() == close)
        .filter(|&i| i >= start)
        .unwrap_or(kids.len());
    kids[start..end].to_vec()
}

/// Raw text of the next argument, for arguments that are names rather than
/// math (colors, ids, `\text` content, column specs).
pub(super) fn next_raw_arg(cursor: &mut Cursor) -> Option<String> {
    while let Some(item) = cursor.pop_front() {
        let elem = match item {
            Pending::Chars(text) => return Some(first_char_of(&text, cursor)),
            Pending::Element(elem) => elem,
        };
        match elem.kind() {
            kind if is_trivia(kind) => continue,
            SyntaxKind::TokenWord => return Some(first_char_of(&element_text(&elem), cursor)),
            SyntaxKind::ClauseArgument | SyntaxKind::ItemCurly => match clause_shape(&elem) {
                Clause::Braced(inner) => return Some(joined_text(&inner)),
                Clause::Bracketed(_) | Clause::Bare => {
                    push_front_all(cursor, children(&elem));
                }
            },
            _ => return Some(element_text(&elem)),
        }
    }
    None
}

/// First character of `text`; the rest goes back to the front of `cursor`.
pub(super) fn first_char_of(text: &str, cursor: &mut Cursor) -> String {
    match split_first_char(text) {
        Some((first, rest)) => {
            if !rest.is_empty() {
                cursor.push_front(Pending::Chars(rest.to_string()));
            }
            first.to_string()
        }
        None => String::new(),
    }
}

// =============================================================================
// Delimiters
// =============================================================================

/// Extract the delimiter from text following `\left` or `\right`.
///
/// Handles single characters (`(`, `|`, `.`), letter-based commands
/// (`\langle`, `\lVert`) and control symbols (`\|`, `\{`).
pub(super) fn extract_delimiter_from_text(text: &str) -> &str {
    let Some(after_backslash) = text.strip_prefix('\\') else {
        return split_first_char(text).map_or("", |(first, _)| first);
    };

    match after_backslash.chars().next() {
        None => "\\",
        Some(c) if c.is_ascii_alphabetic() => {
            let end = after_backslash
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(after_backslash.len());
            &text[..end + 1]
        }
        Some(c) => &text[..1 + c.len_utf8()],
    }
}

/// Which side of a `\left ... \right` pair an element opens or closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum LrSide {
    Left(String),
    Right(String),
}

/// Recognize `\left<delim>` / `\right<delim>` markers. The delimiter is empty
/// when the parser left it as a separate sibling.
pub(super) fn lr_side(elem: &SyntaxElement) -> Option<LrSide> {
    if !matches!(elem.kind(), SyntaxKind::ClauseLR | SyntaxKind::ItemCmd) {
        return None;
    }
    let text = element_text(elem);
    let text = text.trim_start();
    let delimiter = |rest: &str| {
        if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            None
        } else {
            Some(extract_delimiter_from_text(rest.trim()).to_string())
        }
    };
    if let Some(rest) = text.strip_prefix("\\left") {
        delimiter(rest).map(LrSide::Left)
    } else if let Some(rest) = text.strip_prefix("\\right") {
        delimiter(rest).map(LrSide::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters_from_text() {
        assert_eq!(extract_delimiter_from_text("("), "(");
        assert_eq!(extract_delimiter_from_text("\\langle x"), "\\langle");
        assert_eq!(extract_delimiter_from_text("\\|"), "\\|");
        assert_eq!(extract_delimiter_from_text("\\{a"), "\\{");
        assert_eq!(extract_delimiter_from_text("."), ".");
        assert_eq!(extract_delimiter_from_text(""), "");
    }

    #[test]
    fn first_char_goes_back_to_cursor() {
        let mut cursor = Cursor::new();
        assert_eq!(first_char_of("ij", &mut cursor), "i");
        match cursor.front() {
            Some(Pending::Chars(rest)) => assert_eq!(rest, "j"),
            other => panic!("unexpected {:?}", other),
        }
    }
}

//! Sequence walk: tokens, groups, scripts and `\left ... \right`.

use augtex_ir::{MatrixType, NodeIndex, NodeKind};
use mitex_parser::syntax::{SyntaxElement, SyntaxKind};

use super::context::TreeBuilder;
use super::utils::{
    children, clause_shape, cursor_of, element_text, extract_delimiter_from_text, first_char_of,
    is_trivia, lr_side, push_front_all, skip_trivia, Clause, Cursor, LrSide, Pending,
};
use crate::utils::error::{ScriptSlot, TreeBuildError};

type Result<T> = std::result::Result<T, TreeBuildError>;

/// Nodes built so far in one list, plus the script node most recently
/// produced by an attachment (a second `_`/`^` merges into it).
#[derive(Debug, Default)]
pub(super) struct Sequence {
    pub(super) nodes: Vec<NodeIndex>,
    open_script: Option<NodeIndex>,
}

impl Sequence {
    pub(super) fn push(&mut self, node: NodeIndex) {
        self.nodes.push(node);
        self.open_script = None;
    }
}

/// An argument as read from the cursor: a braced list or a single node.
pub(super) enum Arg {
    Braced(Vec<NodeIndex>),
    Single(NodeIndex),
}

impl TreeBuilder {
    pub(super) fn build_sequence<I>(&mut self, elements: I) -> Result<Vec<NodeIndex>>
    where
        I: IntoIterator<Item = SyntaxElement>,
    {
        let mut cursor = cursor_of(elements);
        self.build_items(&mut cursor)
    }

    /// Build everything left in `cursor` into one list.
    pub(super) fn build_items(&mut self, cursor: &mut Cursor) -> Result<Vec<NodeIndex>> {
        let mut seq = Sequence::default();
        while let Some(item) = cursor.pop_front() {
            match item {
                Pending::Chars(text) => self.push_word(&mut seq, &text),
                Pending::Element(elem) => self.build_into(&mut seq, elem, cursor)?,
            }
        }
        Ok(seq.nodes)
    }

    fn push_word(&mut self, seq: &mut Sequence, text: &str) {
        for c in text.chars() {
            let node = self.symbol(c.to_string());
            seq.push(node);
        }
    }

    pub(super) fn build_into(
        &mut self,
        seq: &mut Sequence,
        elem: SyntaxElement,
        cursor: &mut Cursor,
    ) -> Result<()> {
        use SyntaxKind::*;

        match elem.kind() {
            TokenWhiteSpace | TokenLineBreak | TokenComment | ItemBlockComment => {}
            TokenLBrace | TokenRBrace | ClauseCommandName | ItemBegin | ItemEnd => {}

            // Transparent containers
            ScopeRoot | ItemText | ItemParen | ItemBracket | ItemAttachComponent | ItemLR => {
                push_front_all(cursor, children(&elem));
            }
            ClauseArgument => match clause_shape(&elem) {
                Clause::Braced(inner) => {
                    let body = self.build_sequence(inner)?;
                    let node = self.group(body);
                    seq.push(node);
                }
                Clause::Bracketed(_) | Clause::Bare => push_front_all(cursor, children(&elem)),
            },

            TokenWord => self.push_word(seq, &element_text(&elem)),
            TokenUnderscore => self.attach(seq, ScriptSlot::Subscript, cursor)?,
            TokenCaret => self.attach(seq, ScriptSlot::Superscript, cursor)?,

            ItemCurly => {
                let node = self.curly(&elem)?;
                seq.push(node);
            }
            ItemCmd => {
                let node = self.command(elem, cursor)?;
                seq.push(node);
            }
            TokenCommandSym => {
                let node = self.command_sym(&elem, cursor)?;
                seq.push(node);
            }
            ItemEnv => {
                let node = self.environment(&elem)?;
                seq.push(node);
            }
            ClauseLR => {
                let node = self.left_right(&elem, cursor)?;
                seq.push(node);
            }

            TokenTilde => {
                let node = self.space("~");
                seq.push(node);
            }
            TokenApostrophe | TokenComma | TokenSlash | TokenAsterisk | TokenAtSign
            | TokenSemicolon | TokenDitto | TokenLParen | TokenRParen | TokenLBracket
            | TokenRBracket => {
                let node = self.symbol(element_text(&elem));
                seq.push(node);
            }

            TokenError => return Err(TreeBuildError::Parse(element_text(&elem))),
            TokenAmpersand | ItemNewLine => {
                return Err(TreeBuildError::Unsupported(format!(
                    "'{}' outside of an environment",
                    element_text(&elem).trim()
                )))
            }
            TokenDollar | TokenHash | TokenBeginMath | TokenEndMath | ItemFormula
            | ItemTypstCode => {
                return Err(TreeBuildError::Unsupported(
                    element_text(&elem).trim().to_string(),
                ))
            }
        }
        Ok(())
    }

    /// A `{...}` group.
    pub(super) fn curly(&mut self, elem: &SyntaxElement) -> Result<NodeIndex> {
        let body = self.curly_body(elem)?;
        Ok(self.group(body))
    }

    fn curly_body(&mut self, elem: &SyntaxElement) -> Result<Vec<NodeIndex>> {
        let inner: Vec<SyntaxElement> = children(elem)
            .into_iter()
            .filter(|c| !matches!(c.kind(), SyntaxKind::TokenLBrace | SyntaxKind::TokenRBrace))
            .collect();
        self.build_sequence(inner)
    }

    // =========================================================================
    // Arguments
    // =========================================================================

    /// Read the next argument of a command or script.
    ///
    /// A braced argument yields its list; anything else yields the single
    /// node built from the next token, so `x_ij` subscripts only `i`.
    pub(super) fn next_arg_items(&mut self, cursor: &mut Cursor) -> Result<Option<Arg>> {
        while let Some(item) = cursor.pop_front() {
            let elem = match item {
                Pending::Chars(text) => {
                    let c = first_char_of(&text, cursor);
                    return Ok(Some(Arg::Single(self.symbol(c))));
                }
                Pending::Element(elem) => elem,
            };

            match elem.kind() {
                kind if is_trivia(kind) => continue,
                SyntaxKind::TokenWord => {
                    let c = first_char_of(&element_text(&elem), cursor);
                    return Ok(Some(Arg::Single(self.symbol(c))));
                }
                SyntaxKind::ItemCurly => return Ok(Some(Arg::Braced(self.curly_body(&elem)?))),
                SyntaxKind::ClauseArgument => match clause_shape(&elem) {
                    Clause::Braced(inner) => {
                        return Ok(Some(Arg::Braced(self.build_sequence(inner)?)))
                    }
                    Clause::Bracketed(_) | Clause::Bare => {
                        push_front_all(cursor, children(&elem));
                    }
                },
                SyntaxKind::ItemAttachComponent => push_front_all(cursor, children(&elem)),
                _ => {
                    let mut seq = Sequence::default();
                    self.build_into(&mut seq, elem, cursor)?;
                    match seq.nodes.len() {
                        0 => continue,
                        1 => return Ok(Some(Arg::Single(seq.nodes[0]))),
                        _ => return Ok(Some(Arg::Single(self.group(seq.nodes)))),
                    }
                }
            }
        }
        Ok(None)
    }

    pub(super) fn next_arg(&mut self, cursor: &mut Cursor) -> Result<Option<NodeIndex>> {
        Ok(match self.next_arg_items(cursor)? {
            Some(Arg::Braced(body)) => Some(self.group(body)),
            Some(Arg::Single(node)) => Some(node),
            None => None,
        })
    }

    /// Like [`TreeBuilder::next_arg`], but a braced argument keeps its list.
    pub(super) fn next_arg_list(&mut self, cursor: &mut Cursor) -> Result<Option<Vec<NodeIndex>>> {
        Ok(match self.next_arg_items(cursor)? {
            Some(Arg::Braced(body)) => Some(body),
            Some(Arg::Single(node)) => Some(vec![node]),
            None => None,
        })
    }

    pub(super) fn required_arg(&mut self, cursor: &mut Cursor, command: &str) -> Result<NodeIndex> {
        self.next_arg(cursor)?
            .ok_or_else(|| TreeBuildError::MissingArgument(command.to_string()))
    }

    /// Optional `[...]` argument, if one comes next.
    pub(super) fn optional_arg(&mut self, cursor: &mut Cursor) -> Result<Option<Vec<NodeIndex>>> {
        skip_trivia(cursor);
        let front = match cursor.front() {
            Some(Pending::Element(elem)) => elem.clone(),
            _ => return Ok(None),
        };

        match front.kind() {
            SyntaxKind::ClauseArgument | SyntaxKind::ItemBracket => match clause_shape(&front) {
                Clause::Bracketed(inner) => {
                    cursor.pop_front();
                    Ok(Some(self.build_sequence(inner)?))
                }
                Clause::Braced(_) | Clause::Bare => Ok(None),
            },
            SyntaxKind::TokenLBracket => {
                cursor.pop_front();
                let mut inner = Cursor::new();
                loop {
                    match cursor.pop_front() {
                        Some(Pending::Element(elem))
                            if elem.kind() == SyntaxKind::TokenRBracket =>
                        {
                            break
                        }
                        Some(item) => inner.push_back(item),
                        None => return Err(TreeBuildError::UnbalancedDelimiter("[".to_string())),
                    }
                }
                Ok(Some(self.build_items(&mut inner)?))
            }
            _ => Ok(None),
        }
    }

    // =========================================================================
    // Scripts
    // =========================================================================

    /// Attach a subscript or superscript to the last node of `seq`.
    fn attach(&mut self, seq: &mut Sequence, slot: ScriptSlot, cursor: &mut Cursor) -> Result<()> {
        let script = self
            .next_arg(cursor)?
            .ok_or_else(|| TreeBuildError::MissingArgument(slot.token().to_string()))?;

        if let Some(open) = seq.open_script.filter(|open| seq.nodes.last() == Some(open)) {
            if let NodeKind::Script { sub, sup, .. } = self.arena.kind_mut(open) {
                let target = match slot {
                    ScriptSlot::Subscript => sub,
                    ScriptSlot::Superscript => sup,
                };
                if target.is_some() {
                    return Err(TreeBuildError::DoubleScript(slot));
                }
                *target = Some(script);
                return Ok(());
            }
        }

        let base = match seq.nodes.pop() {
            Some(base) => base,
            None => self.arena.alloc(NodeKind::group(Vec::new())),
        };
        let (sub, sup) = match slot {
            ScriptSlot::Subscript => (Some(script), None),
            ScriptSlot::Superscript => (None, Some(script)),
        };
        let node = self.arena.alloc(NodeKind::Script { base, sub, sup });
        seq.nodes.push(node);
        seq.open_script = Some(node);
        Ok(())
    }

    // =========================================================================
    // \left ... \right
    // =========================================================================

    /// Build a delimited group from a `\left` marker, consuming the cursor up
    /// to the matching `\right`.
    pub(super) fn left_right(
        &mut self,
        elem: &SyntaxElement,
        cursor: &mut Cursor,
    ) -> Result<NodeIndex> {
        let left = match lr_side(elem) {
            Some(LrSide::Left(delim)) => delim,
            Some(LrSide::Right(_)) => {
                return Err(TreeBuildError::UnbalancedDelimiter("\\right".to_string()))
            }
            None => {
                // A clause that is neither side (e.g. a bare `\middle`) is kept verbatim
                return Ok(self.symbol(element_text(elem).trim().to_string()));
            }
        };
        let left = self.delimiter_or_next(left, cursor, "\\left")?;

        let mut body = Cursor::new();
        let mut depth = 0usize;
        let mut right = None;
        while let Some(item) = cursor.pop_front() {
            if let Pending::Element(elem) = &item {
                match lr_side(elem) {
                    Some(LrSide::Left(_)) => depth += 1,
                    Some(LrSide::Right(delim)) if depth == 0 => {
                        right = Some(self.delimiter_or_next(delim, cursor, "\\right")?);
                        break;
                    }
                    Some(LrSide::Right(_)) => depth -= 1,
                    None => {}
                }
            }
            body.push_back(item);
        }
        let right =
            right.ok_or_else(|| TreeBuildError::UnbalancedDelimiter("\\left".to_string()))?;

        let body = self.build_items(&mut body)?;
        Ok(self.delimited(left, right, body))
    }

    /// The delimiter given in the marker itself, or else the next token.
    fn delimiter_or_next(
        &mut self,
        delim: String,
        cursor: &mut Cursor,
        marker: &str,
    ) -> Result<String> {
        if !delim.is_empty() {
            return Ok(delim);
        }
        skip_trivia(cursor);
        let text = match cursor.pop_front() {
            Some(Pending::Chars(text)) => text,
            Some(Pending::Element(elem)) => element_text(&elem),
            None => return Err(TreeBuildError::MissingArgument(marker.to_string())),
        };
        let text = text.trim();
        let delim = extract_delimiter_from_text(text);
        if delim.is_empty() {
            return Err(TreeBuildError::MissingArgument(marker.to_string()));
        }
        let rest = &text[delim.len()..];
        if !rest.is_empty() {
            cursor.push_front(Pending::Chars(rest.to_string()));
        }
        Ok(delim.to_string())
    }

    /// A delimited node, reclassified as a matrix when it only wraps a plain
    /// `matrix` environment in a matching bracket pair.
    fn delimited(&mut self, left: String, right: String, body: Vec<NodeIndex>) -> NodeIndex {
        if let (Some(matrix_type), [only]) = (bracket_style(&left, &right), body.as_slice()) {
            if let NodeKind::Array {
                environment,
                columns: None,
                rows,
            } = self.arena.kind(*only)
            {
                if environment == "matrix" {
                    let rows = rows.clone();
                    return self.arena.alloc(NodeKind::Matrix { matrix_type, rows });
                }
            }
        }
        self.arena.alloc(NodeKind::Delimited { left, right, body })
    }
}

/// Bracket style of a delimiter pair that has a matrix environment.
fn bracket_style(left: &str, right: &str) -> Option<MatrixType> {
    match (left, right) {
        ("(", ")") => Some(MatrixType::Paren),
        ("[", "]") => Some(MatrixType::Bracket),
        ("\\{", "\\}") | ("\\lbrace", "\\rbrace") => Some(MatrixType::Brace),
        ("|", "|") | ("\\vert", "\\vert") | ("\\lvert", "\\rvert") => Some(MatrixType::Bar),
        ("\\|", "\\|") | ("\\Vert", "\\Vert") | ("\\lVert", "\\rVert") => {
            Some(MatrixType::DoubleBar)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_styles() {
        assert_eq!(bracket_style("(", ")"), Some(MatrixType::Paren));
        assert_eq!(bracket_style("\\|", "\\|"), Some(MatrixType::DoubleBar));
        assert_eq!(bracket_style("\\lvert", "\\rvert"), Some(MatrixType::Bar));
        assert_eq!(bracket_style("(", "]"), None);
        assert_eq!(bracket_style(".", "|"), None);
    }
}

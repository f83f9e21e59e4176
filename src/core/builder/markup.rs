//! Commands: control words (`\frac`, `\color`, `\alpha`, ...) and control
//! symbols (`\,`, `\{`, `\\`).

use augtex_ir::{NodeIndex, NodeKind};
use log::trace;
use mitex_parser::syntax::{SyntaxElement, SyntaxKind};
use phf::{phf_map, phf_set, Map, Set};

use super::context::TreeBuilder;
use super::utils::{
    children, command_name, element_text, lr_side, next_raw_arg, push_front_all, skip_trivia,
    Cursor, Pending,
};
use crate::utils::error::TreeBuildError;
use crate::utils::warnings::BuildWarning;

type Result<T> = std::result::Result<T, TreeBuildError>;

// =============================================================================
// Command tables
// =============================================================================

const FRACTION_COMMANDS: Set<&str> = phf_set!(
    "\\frac", "\\dfrac", "\\tfrac", "\\cfrac", "\\binom", "\\dbinom", "\\tbinom",
);

const TEXT_COMMANDS: Set<&str> = phf_set!(
    "\\text",
    "\\textrm",
    "\\textit",
    "\\textbf",
    "\\textsf",
    "\\texttt",
    "\\textnormal",
    "\\mbox",
    "\\hbox",
);

const FONT_COMMANDS: Set<&str> = phf_set!(
    "\\mathbf",
    "\\mathrm",
    "\\mathit",
    "\\mathsf",
    "\\mathtt",
    "\\mathcal",
    "\\mathbb",
    "\\mathfrak",
    "\\mathscr",
    "\\mathnormal",
    "\\boldsymbol",
    "\\bm",
    "\\operatorname",
);

const ACCENT_COMMANDS: Set<&str> = phf_set!(
    "\\hat",
    "\\widehat",
    "\\tilde",
    "\\widetilde",
    "\\bar",
    "\\overline",
    "\\underline",
    "\\vec",
    "\\dot",
    "\\ddot",
    "\\dddot",
    "\\acute",
    "\\grave",
    "\\breve",
    "\\check",
    "\\mathring",
    "\\overrightarrow",
    "\\overleftarrow",
    "\\overleftrightarrow",
    "\\underrightarrow",
    "\\underleftarrow",
    "\\underleftrightarrow",
);

const BRACE_COMMANDS: Set<&str> = phf_set!(
    "\\overbrace",
    "\\underbrace",
    "\\overbracket",
    "\\underbracket",
);

const BOX_COMMANDS: Set<&str> = phf_set!("\\boxed", "\\fbox", "\\framebox");

const STRIKETHROUGH_COMMANDS: Set<&str> = phf_set!("\\cancel", "\\bcancel", "\\xcancel", "\\sout");

/// Commands that attach an id, class or style to exactly one node and are
/// otherwise transparent.
const ID_WRAPPERS: Set<&str> = phf_set!(
    "\\cssId",
    "\\htmlId",
    "\\htmlClass",
    "\\class",
    "\\htmlStyle",
    "\\htmlData",
);

const SPACING_COMMANDS: Set<&str> = phf_set!(
    "\\quad",
    "\\qquad",
    "\\enspace",
    "\\thinspace",
    "\\medspace",
    "\\thickspace",
    "\\negthinspace",
    "\\negmedspace",
    "\\negthickspace",
);

const SPACING_SYMBOLS: Set<&str> = phf_set!("\\,", "\\:", "\\;", "\\!", "\\>");

/// Control words accepted as symbols even when the parser spec lacks them.
const EXTRA_SYMBOLS: Set<&str> = phf_set!(
    "\\displaystyle",
    "\\textstyle",
    "\\scriptstyle",
    "\\scriptscriptstyle",
    "\\limits",
    "\\nolimits",
    "\\middle",
    "\\lvert",
    "\\rvert",
    "\\lVert",
    "\\rVert",
    "\\lbrace",
    "\\rbrace",
);

/// Internal `\@`-prefixed names produced by some renderers' macro expansion.
const INTERNAL_COMMANDS: Map<&str, &str> = phf_map! {
    "\\@not" => "\\not",
    "\\@ne" => "\\neq",
    "\\@neq" => "\\neq",
    "\\@cdots" => "\\cdots",
    "\\@ldots" => "\\ldots",
    "\\@vdots" => "\\vdots",
    "\\@ddots" => "\\ddots",
};

/// Map an internal `\@name` to its public spelling.
pub(super) fn remap_internal(name: &str) -> String {
    if let Some(public) = INTERNAL_COMMANDS.get(name) {
        return public.to_string();
    }
    match name.strip_prefix("\\@") {
        Some(rest) => format!("\\{}", rest),
        None => name.to_string(),
    }
}

impl TreeBuilder {
    /// Whether `name` (with backslash) is a control word this builder accepts.
    fn is_known_command(&self, name: &str) -> bool {
        let base = name.trim_start_matches('\\');
        self.spec.get(base).is_some() || EXTRA_SYMBOLS.contains(name)
    }

    /// Build a control word. Its argument clauses go to the front of the
    /// cursor, so arguments are read the same way whether the parser
    /// attached them to the command or left them as siblings.
    pub(super) fn command(
        &mut self,
        elem: SyntaxElement,
        cursor: &mut Cursor,
    ) -> Result<NodeIndex> {
        let Some(raw_name) = command_name(&elem) else {
            return Err(TreeBuildError::Parse(element_text(&elem)));
        };

        if lr_side(&elem).is_some() {
            return self.left_right(&elem, cursor);
        }

        let args: Vec<SyntaxElement> = children(&elem)
            .into_iter()
            .filter(|c| c.kind() == SyntaxKind::ClauseArgument)
            .collect();
        push_front_all(cursor, args);

        let name = remap_internal(&raw_name);
        let name = name.as_str();
        trace!("command {}", name);

        if FRACTION_COMMANDS.contains(name) {
            let numerator = self.required_arg(cursor, name)?;
            let denominator = self.required_arg(cursor, name)?;
            return Ok(self.arena.alloc(NodeKind::Fraction {
                command: name.to_string(),
                numerator,
                denominator,
            }));
        }

        match name {
            "\\sqrt" => {
                let index = match self.optional_arg(cursor)? {
                    Some(index) if !index.is_empty() => Some(self.group(index)),
                    _ => None,
                };
                let body = self.required_arg(cursor, name)?;
                return Ok(self.arena.alloc(NodeKind::Root { index, body }));
            }
            "\\color" => {
                let color = next_raw_arg(cursor)
                    .ok_or_else(|| TreeBuildError::MissingArgument(name.to_string()))?;
                // The switch colors everything up to the end of the enclosing group
                let body = self.build_items(cursor)?;
                return Ok(self.arena.alloc(NodeKind::Color {
                    color: color.trim().to_string(),
                    body,
                }));
            }
            "\\textcolor" => {
                let color = next_raw_arg(cursor)
                    .ok_or_else(|| TreeBuildError::MissingArgument(name.to_string()))?;
                let body = self
                    .next_arg_list(cursor)?
                    .ok_or_else(|| TreeBuildError::MissingArgument(name.to_string()))?;
                return Ok(self.arena.alloc(NodeKind::Color {
                    color: color.trim().to_string(),
                    body,
                }));
            }
            "\\\\" => {
                return Err(TreeBuildError::Unsupported(
                    "'\\\\' outside of an environment".to_string(),
                ))
            }
            _ => {}
        }

        if TEXT_COMMANDS.contains(name) {
            let text = next_raw_arg(cursor)
                .ok_or_else(|| TreeBuildError::MissingArgument(name.to_string()))?;
            let body = text.chars().map(|c| self.symbol(c.to_string())).collect();
            return Ok(self.arena.alloc(NodeKind::Text {
                command: name.to_string(),
                body,
            }));
        }

        if ID_WRAPPERS.contains(name) {
            next_raw_arg(cursor).ok_or_else(|| TreeBuildError::MissingArgument(name.to_string()))?;
            let body = self
                .next_arg_list(cursor)?
                .ok_or_else(|| TreeBuildError::MissingArgument(name.to_string()))?;
            return match body.as_slice() {
                [only] => Ok(*only),
                _ => Err(TreeBuildError::IdWrapperArity {
                    command: name.to_string(),
                    found: body.len(),
                }),
            };
        }

        let wrap: Option<fn(String, NodeIndex) -> NodeKind> = if FONT_COMMANDS.contains(name) {
            Some(|command: String, body: NodeIndex| NodeKind::Font { command, body })
        } else if ACCENT_COMMANDS.contains(name) {
            Some(|command: String, body: NodeIndex| NodeKind::Accent { command, body })
        } else if BRACE_COMMANDS.contains(name) {
            Some(|command: String, body: NodeIndex| NodeKind::Brace { command, body })
        } else if BOX_COMMANDS.contains(name) {
            Some(|command: String, body: NodeIndex| NodeKind::Box { command, body })
        } else if STRIKETHROUGH_COMMANDS.contains(name) {
            Some(|command: String, body: NodeIndex| NodeKind::Strikethrough { command, body })
        } else {
            None
        };
        if let Some(wrap) = wrap {
            let body = self.required_arg(cursor, name)?;
            return Ok(self.arena.alloc(wrap(name.to_string(), body)));
        }

        if SPACING_COMMANDS.contains(name) {
            return Ok(self.space(name));
        }

        if !self.is_known_command(name) {
            if !self.options.non_strict {
                return Err(TreeBuildError::UnknownCommand(name.to_string()));
            }
            self.warn(BuildWarning::unknown_command(name));
        }
        Ok(self.symbol(name))
    }

    /// Build a control symbol such as `\,` or `\{`.
    pub(super) fn command_sym(
        &mut self,
        elem: &SyntaxElement,
        cursor: &mut Cursor,
    ) -> Result<NodeIndex> {
        let text = element_text(elem);
        let text = text.trim_end();

        if SPACING_SYMBOLS.contains(text) {
            return Ok(self.space(text));
        }
        if text == "\\ " || text == "\\" {
            return Ok(self.space("\\ "));
        }
        if text == "\\\\" {
            return Err(TreeBuildError::Unsupported(
                "'\\\\' outside of an environment".to_string(),
            ));
        }
        if text == "\\@" {
            skip_trivia(cursor);
            if let Some(Pending::Element(word)) = cursor.front() {
                if word.kind() == SyntaxKind::TokenWord {
                    let name = format!("\\@{}", element_text(word));
                    cursor.pop_front();
                    return Ok(self.symbol(remap_internal(&name)));
                }
            }
        }
        Ok(self.symbol(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_names_are_remapped() {
        assert_eq!(remap_internal("\\@not"), "\\not");
        assert_eq!(remap_internal("\\@ne"), "\\neq");
        assert_eq!(remap_internal("\\@foo"), "\\foo");
        assert_eq!(remap_internal("\\alpha"), "\\alpha");
    }

    #[test]
    fn tables_do_not_overlap() {
        for name in FONT_COMMANDS.iter() {
            assert!(!ACCENT_COMMANDS.contains(name));
            assert!(!TEXT_COMMANDS.contains(name));
        }
        for name in ID_WRAPPERS.iter() {
            assert!(!EXTRA_SYMBOLS.contains(name));
        }
    }
}

//! Integration tests for building, serializing and rendering formula trees

use std::collections::HashSet;

use augtex::{
    build_formula, check_latex, formulas_equal, is_valid_latex, render_and_annotate,
    render_formula, AugmentedFormula, BuildOptions, LatexMode, MatrixType, NodeKind, NodeTag,
    RenderBackend, RenderPreconditionError, ScriptSlot, ToLatex, TreeBuildError, TreeBuilder,
    WarningKind,
};
use pretty_assertions::assert_eq;

fn build(latex: &str) -> AugmentedFormula {
    build_formula(latex, &BuildOptions::default()).unwrap()
}

fn no_id(latex: &str) -> String {
    build(latex).latex(LatexMode::NoId)
}

// ============================================================================
// Builder
// ============================================================================

mod builder {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_words_split_into_symbols() {
        let formula = build("ab+1");
        let texts: Vec<&str> = formula
            .roots()
            .filter_map(|node| node.kind().symbol_text())
            .collect();
        assert_eq!(texts, vec!["a", "b", "+", "1"]);
    }

    #[test]
    fn test_structural_ids() {
        let formula = build("x_i + \\frac{a}{b}");
        let ids: Vec<&str> = formula.ids().collect();
        assert_eq!(
            ids,
            vec!["0", "0.base", "0.sub", "1", "2", "2.numer", "2.denom"]
        );
    }

    #[test]
    fn test_id_prefix() {
        let options = BuildOptions::default().with_id_prefix("eq");
        let formula = build_formula("a+b", &options).unwrap();
        let ids: Vec<&str> = formula.ids().collect();
        assert_eq!(ids, vec!["eq.0", "eq.1", "eq.2"]);
    }

    #[test]
    fn test_ids_unique() {
        let formula = build(concat!(
            "\\sum_{i=1}^{n} \\frac{x_i^2}{\\sqrt[3]{y}} + ",
            "\\begin{pmatrix} a & b \\\\ c & d \\end{pmatrix}",
        ));
        let ids: HashSet<&str> = formula.ids().collect();
        assert_eq!(ids.len(), formula.len());
    }

    #[test]
    fn test_back_references() {
        let formula = build("a+b");
        let plus = formula.get("1").unwrap();
        assert_eq!(plus.left_sibling().map(|n| n.id()), Some("0"));
        assert_eq!(plus.right_sibling().map(|n| n.id()), Some("2"));
        assert!(plus.parent().is_none());

        let formula = build("x_i");
        let sub = formula.get("0.sub").unwrap();
        assert_eq!(sub.parent().map(|n| n.id()), Some("0"));
        assert!(sub.left_sibling().is_none());
        assert!(sub.is_in_script());
    }

    #[test]
    fn test_script_word_argument_takes_first_char() {
        let formula = build("x_ij");
        let tags: Vec<NodeTag> = formula.roots().map(|n| n.tag()).collect();
        assert_eq!(tags, vec![NodeTag::Script, NodeTag::Symbol]);
        assert_eq!(formula.latex(LatexMode::NoId), "x_{i}j");
    }

    #[test]
    fn test_sub_and_sup_share_a_script() {
        let formula = build("x_i^2");
        assert_eq!(formula.root_indices().len(), 1);
        assert_eq!(formula.latex(LatexMode::NoId), "x_{i}^{2}");
    }

    #[test]
    fn test_single_child_group_collapses() {
        let formula = build("{x}");
        assert_eq!(formula.roots().next().map(|n| n.tag()), Some(NodeTag::Symbol));

        let formula = build("{}");
        assert_eq!(formula.roots().next().map(|n| n.tag()), Some(NodeTag::Group));
    }

    #[test]
    fn test_color_group_keeps_braces() {
        let formula = build("{\\color{red} x}");
        let root = formula.roots().next().unwrap();
        assert_eq!(root.tag(), NodeTag::Group);
        let color = root.children().next().unwrap();
        assert!(matches!(color.kind(), NodeKind::Color { color, .. } if color == "red"));
        assert_eq!(formula.latex(LatexMode::NoId), "{\\textcolor{red}{x}}");
    }

    #[test]
    fn test_matrix_reclassification() {
        let formula = build("\\left(\\begin{matrix} a & b \\\\ c & d \\end{matrix}\\right)");
        let root = formula.roots().next().unwrap();
        match root.kind() {
            NodeKind::Matrix { matrix_type, rows } => {
                assert_eq!(*matrix_type, MatrixType::Paren);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].len(), 2);
            }
            other => panic!("expected a matrix, got {:?}", other),
        }
        assert_eq!(
            formula.latex(LatexMode::NoId),
            "\\begin{pmatrix}a & b \\\\ c & d\\end{pmatrix}"
        );
    }

    #[test]
    fn test_delimited_stays_delimited() {
        let formula = build("\\left( a + b \\right]");
        let root = formula.roots().next().unwrap();
        assert_eq!(root.tag(), NodeTag::Delimited);
        assert_eq!(formula.latex(LatexMode::NoId), "\\left(a+b\\right]");
    }

    #[test]
    fn test_trailing_row_break_is_dropped() {
        let formula = build("\\begin{bmatrix} 1 & 0 \\\\ 0 & 1 \\\\ \\end{bmatrix}");
        match formula.roots().next().unwrap().kind() {
            NodeKind::Matrix { matrix_type, rows } => {
                assert_eq!(*matrix_type, MatrixType::Bracket);
                assert_eq!(rows.len(), 2);
            }
            other => panic!("expected a matrix, got {:?}", other),
        };
    }

    #[test]
    fn test_unknown_command_warns_in_non_strict_mode() {
        let mut builder = TreeBuilder::new();
        let report = builder.build_with_report("\\notacommand x").unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.warnings[0].kind, WarningKind::UnknownCommand);
        assert_eq!(report.warnings[0].name, "\\notacommand");
        assert_eq!(report.output.latex(LatexMode::NoId), "\\notacommand x");
    }

    #[test]
    fn test_id_wrapper_is_transparent() {
        assert_eq!(no_id("\\cssId{foo}{x}+y"), "x+y");
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_mode_rejects_unknown_command() {
        assert!(!is_valid_latex("\\notacommand"));
        assert_eq!(
            check_latex("\\notacommand"),
            Err(TreeBuildError::UnknownCommand("\\notacommand".to_string()))
        );
        assert!(is_valid_latex("\\alpha + \\frac{1}{2}"));
    }

    #[test]
    fn test_double_subscript() {
        let err = build_formula("x_1_2", &BuildOptions::default()).unwrap_err();
        assert_eq!(err, TreeBuildError::DoubleScript(ScriptSlot::Subscript));
        assert!(err.to_string().starts_with("failed to build formula tree"));
    }

    #[test]
    fn test_id_wrapper_arity() {
        let err = build_formula("\\cssId{a}{xy}", &BuildOptions::default()).unwrap_err();
        assert_eq!(
            err,
            TreeBuildError::IdWrapperArity {
                command: "\\cssId".to_string(),
                found: 2,
            }
        );
    }

    #[test]
    fn test_stray_alignment_outside_environment() {
        assert!(build_formula("a & b", &BuildOptions::default()).is_err());
    }

    #[test]
    fn test_missing_script_argument() {
        assert!(build_formula("x^", &BuildOptions::default()).is_err());
    }
}

// ============================================================================
// Round trip
// ============================================================================

mod round_trip {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_id_latex_rebuilds_to_an_equal_tree() {
        let inputs = [
            "x^2 + y_i",
            "\\frac{a+1}{b}",
            "\\sqrt[3]{x}",
            "\\alpha x",
            "\\left( a + b \\right)",
            "\\begin{pmatrix} a & b \\\\ c & d \\end{pmatrix}",
            "\\hat{x} + \\mathbf{v}",
            "\\textcolor{red}{x+1}",
            "{x^2}^3",
        ];
        for input in inputs {
            let first = build(input);
            let latex = first.latex(LatexMode::NoId);
            let second = build(&latex);
            assert!(
                formulas_equal(&first, &second),
                "'{}' serialized as '{}' did not round-trip",
                input,
                latex
            );
        }
    }

    #[test]
    fn test_forms() {
        assert_eq!(no_id("\\frac{a}{b}"), "\\frac{a}{b}");
        assert_eq!(no_id("\\sqrt[n]{x}"), "\\sqrt[n]{x}");
        assert_eq!(no_id("\\alpha x"), "\\alpha x");
        assert_eq!(no_id("{x^2}^3"), "{x^{2}}^{3}");
    }

    #[test]
    fn test_render_ranges_cover_their_nodes() {
        let formula = build("x_i + \\frac{a}{b}");
        let rendered = formula.to_latex(LatexMode::Render, 0);
        for node in formula.iter() {
            let slice = rendered.slice(node.id()).unwrap();
            assert!(slice.starts_with(&format!("\\cssId{{{}}}{{", node.id())));
            assert!(slice.ends_with('}'));
        }
        let order: Vec<&str> = rendered.ranges.keys().map(String::as_str).collect();
        let ids: Vec<&str> = formula.ids().collect();
        assert_eq!(order, ids);
    }
}

// ============================================================================
// Render entry point
// ============================================================================

mod render {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Echo {
        ready: bool,
    }

    impl RenderBackend for Echo {
        fn is_initialized(&self) -> bool {
            self.ready
        }

        fn typeset(&self, latex: &str) -> String {
            format!("<math>{}</math>", latex)
        }
    }

    #[test]
    fn test_render_requires_initialized_backend() {
        let formula = build("a+b");
        let result = render_formula(&formula, &Echo { ready: false });
        assert_eq!(result.unwrap_err(), RenderPreconditionError);
    }

    #[test]
    fn test_render_hands_render_mode_latex_to_backend() {
        let formula = build("a");
        let rendered = render_formula(&formula, &Echo { ready: true }).unwrap();
        assert_eq!(rendered.latex.latex, "\\cssId{0}{a}");
        assert_eq!(rendered.output, "<math>\\cssId{0}{a}</math>");
    }

    #[test]
    fn test_render_and_annotate_stamps_display_ids() {
        let mut formula = build("a+b");
        render_and_annotate(&mut formula, &Echo { ready: true }).unwrap();
        let css: Vec<Option<&str>> = formula.iter().map(|n| n.css_id()).collect();
        assert_eq!(css, vec![Some("0"), Some("1"), Some("2")]);
    }
}

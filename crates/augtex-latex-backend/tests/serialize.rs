use augtex_ir::{AugmentedFormula, FormulaBuilder, MatrixType, NodeIndex, NodeKind};
use augtex_latex_backend::{
    formulas_equal, LatexMode, RangeStyle, StyledRange, ToLatex, ToStyledRanges,
};
use pretty_assertions::assert_eq;

fn sym(b: &mut FormulaBuilder, text: &str) -> NodeIndex {
    b.alloc(NodeKind::symbol(text))
}

/// `x_{i}+\frac{a}{b}`
fn script_and_fraction() -> AugmentedFormula {
    let mut b = FormulaBuilder::new();
    let x = sym(&mut b, "x");
    let i = sym(&mut b, "i");
    let script = b.alloc(NodeKind::Script {
        base: x,
        sub: Some(i),
        sup: None,
    });
    let plus = sym(&mut b, "+");
    let a = sym(&mut b, "a");
    let d = sym(&mut b, "b");
    let frac = b.alloc(NodeKind::Fraction {
        command: "\\frac".to_string(),
        numerator: a,
        denominator: d,
    });
    b.finish(vec![script, plus, frac], "")
}

/// `x_{i}+` with the script wrapped in a variable.
fn grouped_script() -> AugmentedFormula {
    let mut b = FormulaBuilder::new();
    let x = sym(&mut b, "x");
    let i = sym(&mut b, "i");
    let script = b.alloc(NodeKind::Script {
        base: x,
        sub: Some(i),
        sup: None,
    });
    let var = b.alloc(NodeKind::Variable {
        body: script,
        latex: "x_{i}".to_string(),
        symbol: "x_i".to_string(),
    });
    let plus = sym(&mut b, "+");
    b.finish(vec![var, plus], "")
}

fn grid(b: &mut FormulaBuilder) -> Vec<Vec<Vec<NodeIndex>>> {
    let a = sym(b, "a");
    let bb = sym(b, "b");
    let c = sym(b, "c");
    let d = sym(b, "d");
    vec![vec![vec![a], vec![bb]], vec![vec![c], vec![d]]]
}

mod modes {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_id_is_plain_latex() {
        let f = script_and_fraction();
        assert_eq!(f.latex(LatexMode::NoId), "x_{i}+\\frac{a}{b}");
    }

    #[test]
    fn render_wraps_every_node() {
        let f = script_and_fraction();
        assert_eq!(
            f.latex(LatexMode::Render),
            "\\cssId{0}{\\cssId{0.base}{x}_{\\cssId{0.sub}{i}}}\\cssId{1}{+}\
             \\cssId{2}{\\frac{\\cssId{2.numer}{a}}{\\cssId{2.denom}{b}}}"
        );
    }

    #[test]
    fn variable_is_transparent_without_ids() {
        let f = grouped_script();
        assert_eq!(f.latex(LatexMode::NoId), "x_{i}+");
        assert!(formulas_equal(&f, &{
            let mut b = FormulaBuilder::new();
            let x = sym(&mut b, "x");
            let i = sym(&mut b, "i");
            let script = b.alloc(NodeKind::Script {
                base: x,
                sub: Some(i),
                sup: None,
            });
            let plus = sym(&mut b, "+");
            b.finish(vec![script, plus], "")
        }));
    }

    #[test]
    fn variable_carries_class_when_rendered() {
        let f = grouped_script();
        let var = f.get("0").expect("variable");
        assert_eq!(
            var.latex(LatexMode::Render),
            concat!(
                "\\cssId{0}{\\htmlClass{variable}{\\cssId{0.body}{",
                "\\cssId{0.body.base}{x}_{\\cssId{0.body.sub}{i}}}}}",
            )
        );
        assert_eq!(var.latex(LatexMode::ContentOnly), "x_{i}");
    }

    #[test]
    fn content_only_drops_decoration_but_keeps_structure() {
        let mut b = FormulaBuilder::new();
        let x = sym(&mut b, "x");
        let boxed = b.alloc(NodeKind::Box {
            command: "\\boxed".to_string(),
            body: x,
        });
        let a = sym(&mut b, "a");
        let hat = b.alloc(NodeKind::Accent {
            command: "\\hat".to_string(),
            body: a,
        });
        let f = b.finish(vec![boxed, hat], "");
        assert_eq!(f.latex(LatexMode::NoId), "\\boxed{x}\\hat{a}");
        let boxed = f.get("0").expect("box");
        assert_eq!(boxed.latex(LatexMode::ContentOnly), "x");
        let hat = f.get("1").expect("accent");
        assert_eq!(hat.latex(LatexMode::ContentOnly), "\\hat{a}");
    }
}

mod forms {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn control_word_gets_a_separating_space() {
        let mut b = FormulaBuilder::new();
        let alpha = sym(&mut b, "\\alpha");
        let x = sym(&mut b, "x");
        let f = b.finish(vec![alpha, x], "");
        let out = f.to_latex(LatexMode::NoId, 0);
        assert_eq!(out.latex, "\\alpha x");
        assert_eq!(out.slice("1"), Some("x"));
    }

    #[test]
    fn synthetic_group_has_no_braces_but_arguments_do() {
        let mut b = FormulaBuilder::new();
        let a = sym(&mut b, "a");
        let bb = sym(&mut b, "b");
        let run = b.alloc(NodeKind::Group {
            body: vec![a, bb],
            synthetic: true,
        });
        let c = sym(&mut b, "c");
        let frac = b.alloc(NodeKind::Fraction {
            command: "\\frac".to_string(),
            numerator: run,
            denominator: c,
        });
        let f = b.finish(vec![frac], "");
        assert_eq!(f.latex(LatexMode::NoId), "\\frac{ab}{c}");
    }

    #[test]
    fn root_with_index() {
        let mut b = FormulaBuilder::new();
        let n = sym(&mut b, "n");
        let x = sym(&mut b, "x");
        let root = b.alloc(NodeKind::Root {
            index: Some(n),
            body: x,
        });
        let f = b.finish(vec![root], "");
        assert_eq!(f.latex(LatexMode::NoId), "\\sqrt[n]{x}");
    }

    #[test]
    fn color_and_text() {
        let mut b = FormulaBuilder::new();
        let a = sym(&mut b, "a");
        let color = b.alloc(NodeKind::Color {
            color: "red".to_string(),
            body: vec![a],
        });
        let chars: Vec<_> = "if".chars().map(|c| sym(&mut b, &c.to_string())).collect();
        let text = b.alloc(NodeKind::Text {
            command: "\\text".to_string(),
            body: chars,
        });
        let f = b.finish(vec![color, text], "");
        assert_eq!(f.latex(LatexMode::NoId), "\\textcolor{red}{a}\\text{if}");
    }

    #[test]
    fn delimited_array_and_matrix() {
        let mut b = FormulaBuilder::new();
        let a = sym(&mut b, "a");
        let paren = b.alloc(NodeKind::Delimited {
            left: "(".to_string(),
            right: ")".to_string(),
            body: vec![a],
        });
        let rows = grid(&mut b);
        let array = b.alloc(NodeKind::Array {
            environment: "array".to_string(),
            columns: Some("cc".to_string()),
            rows,
        });
        let rows = grid(&mut b);
        let matrix = b.alloc(NodeKind::Matrix {
            matrix_type: MatrixType::Paren,
            rows,
        });
        let f = b.finish(vec![paren, array, matrix], "");
        let ids = f.get("1.1.1.0").map(|n| n.id());
        assert_eq!(ids, Some("1.1.1.0"));
        assert_eq!(
            f.latex(LatexMode::NoId),
            "\\left(a\\right)\
             \\begin{array}{cc}a & b \\\\ c & d\\end{array}\
             \\begin{pmatrix}a & b \\\\ c & d\\end{pmatrix}"
        );
    }
}

mod ranges {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_range_is_a_non_empty_slice_in_pre_order() {
        let f = script_and_fraction();
        for mode in [LatexMode::Render, LatexMode::NoId] {
            let out = f.to_latex(mode, 0);
            assert_eq!(out.ranges.len(), f.len());
            let mut last_start = 0;
            for (id, range) in &out.ranges {
                let slice = out.latex.get(range.clone()).expect("range in bounds");
                assert!(!slice.is_empty(), "{} is empty", id);
                assert!(range.start >= last_start, "{} out of order", id);
                last_start = range.start;
            }
        }
    }

    #[test]
    fn node_slices_match_their_own_serialization() {
        let f = script_and_fraction();
        let out = f.to_latex(LatexMode::NoId, 0);
        for node in f.iter() {
            assert_eq!(out.slice(node.id()), Some(node.latex(LatexMode::NoId).as_str()));
        }
        let render = f.to_latex(LatexMode::Render, 0);
        assert_eq!(render.slice("1"), Some("\\cssId{1}{+}"));
    }

    #[test]
    fn offset_shifts_everything() {
        let f = script_and_fraction();
        let base = f.to_latex(LatexMode::NoId, 0);
        let shifted = f.to_latex(LatexMode::NoId, 10);
        for (id, range) in &base.ranges {
            assert_eq!(shifted.ranges[id], (range.start + 10)..(range.end + 10));
        }
    }
}

mod styled {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decorated() -> AugmentedFormula {
        let mut b = FormulaBuilder::new();
        let a = sym(&mut b, "a");
        let color = b.alloc(NodeKind::Color {
            color: "red".to_string(),
            body: vec![a],
        });
        let plus = sym(&mut b, "+");
        let y = sym(&mut b, "y");
        let var = b.alloc(NodeKind::Variable {
            body: y,
            latex: "y".to_string(),
            symbol: "y".to_string(),
        });
        b.finish(vec![color, plus, var], "")
    }

    #[test]
    fn ranges_decompose_the_plain_latex() {
        let f = decorated();
        let ranges = f.to_styled_ranges();
        let joined: String = ranges.iter().map(StyledRange::text).collect();
        assert_eq!(joined, f.latex(LatexMode::NoId));

        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].range(), 0..18);
        assert_eq!(ranges[1].text(), "+");
        match &ranges[2] {
            StyledRange::Styled {
                text,
                style,
                children,
                ..
            } => {
                assert_eq!(text, "y");
                assert_eq!(
                    style,
                    &RangeStyle::Variable {
                        tooltip: "y".to_string()
                    }
                );
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected a styled range, got {:?}", other),
        }
    }

    #[test]
    fn plain_formula_is_one_plain_range() {
        let f = script_and_fraction();
        let ranges = f.to_styled_ranges();
        assert_eq!(ranges.len(), 1);
        assert!(matches!(ranges[0], StyledRange::Plain { .. }));
    }

    #[test]
    fn styles_serialize_as_tagged_json() {
        let style = RangeStyle::Color {
            color: "red".to_string(),
        };
        let json = serde_json::to_string(&style).expect("serialize");
        assert_eq!(json, r#"{"kind":"color","color":"red"}"#);
    }
}

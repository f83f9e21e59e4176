//! Integration tests for variable grouping and expression lookup

use augtex::{
    build_formula, build_formula_with_variables, find_expression, find_expression_anywhere,
    formulas_equal, group_variables, AugmentedFormula, BuildOptions, LatexMode, NodeKind, NodeRef,
    NodeTag, RangeStyle, StyledRange, ToLatex, ToStyledRanges, VariablePattern,
};
use pretty_assertions::assert_eq;

fn build(latex: &str) -> AugmentedFormula {
    build_formula(latex, &BuildOptions::default()).unwrap()
}

fn grouped(latex: &str, variables: &[&str]) -> AugmentedFormula {
    build_formula_with_variables(latex, variables, &BuildOptions::default()).unwrap()
}

fn variable_symbol(node: NodeRef<'_>) -> Option<&str> {
    match node.kind() {
        NodeKind::Variable { symbol, .. } => Some(symbol),
        _ => None,
    }
}

// ============================================================================
// Grouping
// ============================================================================

mod grouping {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_symbol_variable() {
        let formula = grouped("x + y", &["x"]);
        let roots: Vec<NodeRef<'_>> = formula.roots().collect();
        assert_eq!(roots.len(), 3);
        assert_eq!(variable_symbol(roots[0]), Some("x"));
        assert_eq!(roots[1].tag(), NodeTag::Symbol);
        assert_eq!(roots[2].tag(), NodeTag::Symbol);
    }

    #[test]
    fn test_longer_pattern_wins() {
        let formula = grouped("x_i + x", &["x", "x_i"]);
        let roots: Vec<NodeRef<'_>> = formula.roots().collect();
        assert_eq!(roots.len(), 3);

        assert_eq!(variable_symbol(roots[0]), Some("x_i"));
        let body = roots[0].children().next().unwrap();
        assert_eq!(body.tag(), NodeTag::Script);
        // The base of the grouped script is not grouped again
        assert!(body.descendants().iter().all(|n| !n.is_variable()));

        assert_eq!(variable_symbol(roots[2]), Some("x"));
    }

    #[test]
    fn test_multi_node_pattern_gets_synthetic_group() {
        let formula = grouped("ab + c", &["ab"]);
        let root = formula.roots().next().unwrap();
        assert_eq!(variable_symbol(root), Some("ab"));
        let body = root.children().next().unwrap();
        assert!(matches!(body.kind(), NodeKind::Group { synthetic: true, .. }));
        assert_eq!(formula.latex(LatexMode::NoId), "ab+c");
    }

    #[test]
    fn test_variable_in_slot() {
        let formula = grouped("\\frac{x}{2}", &["x"]);
        let numer = formula.roots().next().unwrap().children().next().unwrap();
        assert_eq!(variable_symbol(numer), Some("x"));
    }

    #[test]
    fn test_grouping_is_transparent_in_no_id_latex() {
        let plain = build("x_i^2 + \\frac{x_i}{y}");
        let formula = grouped("x_i^2 + \\frac{x_i}{y}", &["x_i", "y"]);
        assert!(formulas_equal(&plain, &formula));

        // a grouped scripted base keeps its braces
        let plain = build("{x_i}^2");
        let formula = grouped("{x_i}^2", &["x_i"]);
        assert_eq!(formula.latex(LatexMode::NoId), "{x_{i}}^{2}");
        assert!(formulas_equal(&plain, &formula));

        // a grouped braced argument is not braced twice
        let plain = build("\\frac{ab}{c}");
        let formula = grouped("\\frac{ab}{c}", &["{ab}"]);
        assert_eq!(formula.latex(LatexMode::NoId), "\\frac{ab}{c}");
        assert!(formulas_equal(&plain, &formula));
    }

    #[test]
    fn test_no_match_leaves_tree_unchanged() {
        let formula = build("a + \\frac{b}{c}");
        let patterns = VariablePattern::parse_all(&["z"]);
        let result = group_variables(&formula, &patterns);
        assert!(formulas_equal(&formula, &result));
        let before: Vec<&str> = formula.ids().collect();
        let after: Vec<&str> = result.ids().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_binder_is_not_grouped_but_its_value_is() {
        let formula = grouped("x_{i=1}", &["i"]);
        let script = formula.roots().next().unwrap();
        let sub = formula.get(&format!("{}.sub", script.id())).unwrap();
        let items: Vec<NodeRef<'_>> = sub.children().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].kind().symbol_text(), Some("i"));
        assert_eq!(items[1].kind().symbol_text(), Some("="));
        assert_eq!(variable_symbol(items[2]), Some("i"));
        assert_eq!(items[2].children().next().unwrap().kind().symbol_text(), Some("1"));
    }

    #[test]
    fn test_top_level_equality_is_grouped() {
        let formula = grouped("i = 1", &["i"]);
        let roots: Vec<NodeRef<'_>> = formula.roots().collect();
        assert_eq!(variable_symbol(roots[0]), Some("i"));
        assert_eq!(roots[2].tag(), NodeTag::Symbol);
    }

    #[test]
    fn test_synthesized_ids_are_deterministic() {
        let first = grouped("ab + ab", &["ab"]);
        let second = grouped("ab + ab", &["ab"]);
        let first_ids: Vec<&str> = first.ids().collect();
        let second_ids: Vec<&str> = second.ids().collect();
        assert_eq!(first_ids, second_ids);
        assert!(first_ids.contains(&"v0"));
    }

    #[test]
    fn test_variable_styled_range() {
        let formula = grouped("x_i+1", &["x_i"]);
        let ranges = formula.to_styled_ranges();
        let text: String = ranges.iter().map(StyledRange::text).collect();
        assert_eq!(text, formula.latex(LatexMode::NoId));
        match &ranges[0] {
            StyledRange::Styled { text, style, .. } => {
                assert_eq!(text, "x_{i}");
                assert_eq!(
                    style,
                    &RangeStyle::Variable {
                        tooltip: "x_i".to_string()
                    }
                );
            }
            other => panic!("expected a styled range, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_render_decoration() {
        let formula = grouped("x", &["x"]);
        let id = formula.roots().next().unwrap().id().to_string();
        assert_eq!(
            formula.latex(LatexMode::Render),
            format!("\\cssId{{{}}}{{\\htmlClass{{variable}}{{\\cssId{{0}}{{x}}}}}}", id)
        );
    }
}

// ============================================================================
// Lookup
// ============================================================================

mod lookup {
    use super::*;
    use pretty_assertions::assert_eq;

    fn annotated(latex: &str, variables: &[&str]) -> AugmentedFormula {
        let mut formula = grouped(latex, variables);
        formula.annotate_with(|node| Some(format!("css-{}", node.id())));
        formula
    }

    #[test]
    fn test_finds_top_level_expression() {
        let formula = annotated("\\sum_{i=1}^{n} x_i", &[]);
        let found = find_expression(&formula, "x_i", &[] as &[&str]).unwrap();
        assert_eq!(found.node_ids, vec!["1".to_string()]);
        assert_eq!(
            found.css_ids,
            vec![
                "css-1".to_string(),
                "css-1.base".to_string(),
                "css-1.sub".to_string()
            ]
        );
    }

    #[test]
    fn test_missing_expression() {
        let formula = annotated("\\sum_{i=1}^{n} x_i", &[]);
        assert!(find_expression(&formula, "z_1", &[] as &[&str]).is_none());
        assert!(find_expression(&formula, "", &[] as &[&str]).is_none());
    }

    #[test]
    fn test_equals_inside_subscript_is_not_top_level() {
        let formula = annotated("\\sum_{i=1}^{n} x_i", &[]);
        assert!(find_expression(&formula, "=", &[] as &[&str]).is_none());
        let nested = find_expression_anywhere(&formula, "=", &[] as &[&str]).unwrap();
        assert_eq!(nested.css_ids, vec!["css-0.sub.1".to_string()]);
    }

    #[test]
    fn test_unannotated_formula_has_no_match() {
        let formula = build("a + b");
        assert!(find_expression(&formula, "a", &[] as &[&str]).is_none());
    }

    #[test]
    fn test_lookup_with_grouped_variables() {
        let formula = annotated("x_i + y", &["x_i"]);
        let found = find_expression(&formula, "x_i + y", &["x_i"]).unwrap();
        assert_eq!(found.nodes.len(), 3);
        assert!(found.css_ids.len() > 3);
    }

    #[test]
    fn test_match_serializes_ids_only() {
        let formula = annotated("a+b", &[]);
        let found = find_expression(&formula, "+b", &[] as &[&str]).unwrap();
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "node_ids": ["1", "2"],
                "css_ids": ["css-1", "css-2"],
            })
        );
    }
}

use std::ops::Range;

use crate::{Cell, NodeArena, NodeIndex, NodeKind};

/// Structural match between two nodes, possibly from different arenas.
///
/// Nodes of different variants never match. Same-variant nodes match when
/// their scalar fields are equal and their children match pairwise in order.
/// Ids and display ids are ignored.
pub fn nodes_match<A, B>(a: &A, ai: NodeIndex, b: &B, bi: NodeIndex) -> bool
where
    A: NodeArena + ?Sized,
    B: NodeArena + ?Sized,
{
    use NodeKind::*;

    let slot = |x: NodeIndex, y: NodeIndex| nodes_match(a, x, b, y);
    let optional = |x: &Option<NodeIndex>, y: &Option<NodeIndex>| match (x, y) {
        (Some(x), Some(y)) => nodes_match(a, *x, b, *y),
        (None, None) => true,
        _ => false,
    };

    match (a.node_kind(ai), b.node_kind(bi)) {
        (Symbol { text: x }, Symbol { text: y }) | (Space { text: x }, Space { text: y }) => {
            x == y
        }
        (Group { body: x, .. }, Group { body: y, .. }) => sequences_match(a, x, b, y),
        (
            Fraction {
                command: c1,
                numerator: n1,
                denominator: d1,
            },
            Fraction {
                command: c2,
                numerator: n2,
                denominator: d2,
            },
        ) => c1 == c2 && slot(*n1, *n2) && slot(*d1, *d2),
        (
            Script {
                base: b1,
                sub: sub1,
                sup: sup1,
            },
            Script {
                base: b2,
                sub: sub2,
                sup: sup2,
            },
        ) => slot(*b1, *b2) && optional(sub1, sub2) && optional(sup1, sup2),
        (
            Root {
                index: i1,
                body: b1,
            },
            Root {
                index: i2,
                body: b2,
            },
        ) => optional(i1, i2) && slot(*b1, *b2),
        (Color { color: c1, body: x }, Color { color: c2, body: y })
        | (Text { command: c1, body: x }, Text { command: c2, body: y }) => {
            c1 == c2 && sequences_match(a, x, b, y)
        }
        (Font { command: c1, body: x }, Font { command: c2, body: y })
        | (Accent { command: c1, body: x }, Accent { command: c2, body: y })
        | (Brace { command: c1, body: x }, Brace { command: c2, body: y })
        | (Box { command: c1, body: x }, Box { command: c2, body: y })
        | (Strikethrough { command: c1, body: x }, Strikethrough { command: c2, body: y }) => {
            c1 == c2 && slot(*x, *y)
        }
        (
            Delimited {
                left: l1,
                right: r1,
                body: x,
            },
            Delimited {
                left: l2,
                right: r2,
                body: y,
            },
        ) => l1 == l2 && r1 == r2 && sequences_match(a, x, b, y),
        (
            Array {
                environment: e1,
                columns: c1,
                rows: x,
            },
            Array {
                environment: e2,
                columns: c2,
                rows: y,
            },
        ) => e1 == e2 && c1 == c2 && grids_match(a, x, b, y),
        (
            Matrix {
                matrix_type: t1,
                rows: x,
            },
            Matrix {
                matrix_type: t2,
                rows: y,
            },
        ) => t1 == t2 && grids_match(a, x, b, y),
        (
            Variable {
                body: x, latex: l1, ..
            },
            Variable {
                body: y, latex: l2, ..
            },
        ) => l1 == l2 && slot(*x, *y),
        _ => false,
    }
}

/// Pairwise match of two node lists of equal length.
pub fn sequences_match<A, B>(a: &A, xs: &[NodeIndex], b: &B, ys: &[NodeIndex]) -> bool
where
    A: NodeArena + ?Sized,
    B: NodeArena + ?Sized,
{
    xs.len() == ys.len()
        && xs
            .iter()
            .zip(ys)
            .all(|(&x, &y)| nodes_match(a, x, b, y))
}

fn grids_match<A, B>(a: &A, xs: &[Vec<Cell>], b: &B, ys: &[Vec<Cell>]) -> bool
where
    A: NodeArena + ?Sized,
    B: NodeArena + ?Sized,
{
    xs.len() == ys.len()
        && xs.iter().zip(ys).all(|(row_x, row_y)| {
            row_x.len() == row_y.len()
                && row_x
                    .iter()
                    .zip(row_y)
                    .all(|(cx, cy)| sequences_match(a, cx, b, cy))
        })
}

/// Non-overlapping runs of `items` that structurally equal `pattern`,
/// scanning left to right.
pub fn find_matching_subsequences<A, B>(
    haystack: &A,
    items: &[NodeIndex],
    needle: &B,
    pattern: &[NodeIndex],
) -> Vec<Range<usize>>
where
    A: NodeArena + ?Sized,
    B: NodeArena + ?Sized,
{
    let mut found = Vec::new();
    if pattern.is_empty() {
        return found;
    }

    let mut start = 0;
    while start + pattern.len() <= items.len() {
        let end = start + pattern.len();
        if sequences_match(haystack, &items[start..end], needle, pattern) {
            found.push(start..end);
            start = end;
        } else {
            start += 1;
        }
    }
    found
}

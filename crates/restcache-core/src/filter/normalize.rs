use crate::filter::{FilterNode, FilterOptions, value::render};

///
/// Normalize parsed filters into a canonical, deterministic form.
///
/// Normalization guarantees:
/// - Comparisons outside `exclusive_paths` are dropped (groups are kept,
///   even when they end up empty or singleton)
/// - Siblings are deterministically ordered at every level
/// - Equal comparisons are kept side by side (no de-duplication)
///
/// This is used to ensure:
/// - stable query keys regardless of filter application order
/// - predictable test behavior
///
#[must_use]
pub(crate) fn normalize(nodes: Vec<FilterNode>, options: &FilterOptions) -> Vec<FilterNode> {
    let mut out: Vec<FilterNode> = nodes
        .into_iter()
        .filter_map(|node| normalize_node(node, options))
        .collect();

    out.sort_by_cached_key(sort_key);
    out
}

fn normalize_node(node: FilterNode, options: &FilterOptions) -> Option<FilterNode> {
    match node {
        FilterNode::Comparison(cmp) => options
            .includes(&cmp.path)
            .then_some(FilterNode::Comparison(cmp)),
        FilterNode::Group { kind, children } => Some(FilterNode::Group {
            kind,
            children: normalize(children, options),
        }),
    }
}

///
/// Generate a deterministic key for a filter node.
///
/// This key is used **only for sorting**, not for display. Comparisons sort
/// before groups; comparisons order by path, then operator, negation, and
/// rendered value; groups order by kind, then by their children.
///
fn sort_key(node: &FilterNode) -> Vec<u8> {
    let mut out = Vec::new();
    encode_node_key(&mut out, node);
    out
}

const NODE_COMPARISON: u8 = 0x01;
const NODE_GROUP: u8 = 0x02;

// Segments are NUL-terminated rather than length-prefixed so that byte order
// matches lexical order; paths and operators never contain NUL.
fn encode_node_key(out: &mut Vec<u8>, node: &FilterNode) {
    match node {
        FilterNode::Comparison(cmp) => {
            out.push(NODE_COMPARISON);
            push_segment(out, &cmp.path);
            push_segment(out, cmp.operator.as_str());
            out.push(u8::from(cmp.negate));
            push_segment(out, &render(&cmp.value));
        }
        FilterNode::Group { kind, children } => {
            out.push(NODE_GROUP);
            push_segment(out, kind.as_str());
            for child in children {
                encode_node_key(out, child);
            }
            out.push(0x00);
        }
    }
}

fn push_segment(out: &mut Vec<u8>, segment: &str) {
    out.extend_from_slice(segment.as_bytes());
    out.push(0x00);
}

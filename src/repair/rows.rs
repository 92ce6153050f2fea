//! Incomplete row removal
//!
//! When truncation stops inside a table the last row usually has fewer
//! cells than the others. The table's column count is estimated as the most
//! common cell count, and trailing rows that disagree with it are dropped.

use super::fragment::{Fragment, NodeId, ROOT};
use tracing::debug;

const ROW_GROUPS: &[&str] = &["thead", "tbody", "tfoot"];

/// Drop trailing rows whose cell count differs from the table's usual one
///
/// Only acts when the text was truncated inside a table; otherwise the text
/// is returned unchanged. Only the last table that is not nested inside
/// another table is repaired.
pub fn complete_rows(text: String, truncated: bool, truncated_at_table: bool) -> (String, bool) {
    if !(truncated && truncated_at_table) {
        return (text, truncated);
    }

    let repaired = {
        let mut fragment = Fragment::parse(&text);
        if remove_incomplete_rows(&mut fragment) {
            Some(fragment.serialize())
        } else {
            None
        }
    };

    (repaired.unwrap_or(text), truncated)
}

/// Returns whether any row was removed
fn remove_incomplete_rows(fragment: &mut Fragment<'_>) -> bool {
    let Some(table) = last_outer_table(fragment) else {
        return false;
    };

    let rows = table_rows(fragment, table);
    if rows.is_empty() {
        return false;
    }

    let cell_counts: Vec<usize> = rows
        .iter()
        .map(|&(_, row)| cell_count(fragment, row))
        .collect();
    let Some(columns) = most_common(&cell_counts) else {
        return false;
    };

    let mut removed = 0;
    for (&(parent, row), &cells) in rows.iter().zip(&cell_counts).rev() {
        if cells == columns {
            break;
        }
        fragment.remove_child(parent, row);
        removed += 1;
    }

    if removed > 0 {
        debug!(removed, columns, "Removed incomplete table rows");
    }
    removed > 0
}

/// The last `table` element that has no `table` ancestor
fn last_outer_table(fragment: &Fragment<'_>) -> Option<NodeId> {
    fragment
        .descendants(ROOT)
        .into_iter()
        .filter(|&id| fragment.element_name(id) == Some("table"))
        .filter(|&id| !has_table_ancestor(fragment, id))
        .last()
}

fn has_table_ancestor(fragment: &Fragment<'_>, id: NodeId) -> bool {
    let mut current = fragment.node(id).and_then(|node| node.parent);
    while let Some(ancestor) = current {
        if fragment.element_name(ancestor) == Some("table") {
            return true;
        }
        current = fragment.node(ancestor).and_then(|node| node.parent);
    }
    false
}

/// Rows of `table` with the node each row hangs off, in document order.
/// Rows of nested tables are not included.
fn table_rows(fragment: &Fragment<'_>, table: NodeId) -> Vec<(NodeId, NodeId)> {
    let mut rows = Vec::new();
    for &child in fragment.children(table) {
        match fragment.element_name(child) {
            Some("tr") => rows.push((table, child)),
            Some(group) if ROW_GROUPS.contains(&group) => {
                rows.extend(
                    fragment
                        .child_elements(child, "tr")
                        .into_iter()
                        .map(|row| (child, row)),
                );
            }
            _ => {}
        }
    }
    rows
}

fn cell_count(fragment: &Fragment<'_>, row: NodeId) -> usize {
    fragment
        .children(row)
        .iter()
        .filter(|&&cell| matches!(fragment.element_name(cell), Some("td" | "th")))
        .count()
}

/// Most frequent value; ties go to the value seen first
fn most_common(values: &[usize]) -> Option<usize> {
    let mut frequencies: Vec<(usize, usize)> = Vec::new();
    for &value in values {
        match frequencies.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => frequencies.push((value, 1)),
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (value, count) in frequencies {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

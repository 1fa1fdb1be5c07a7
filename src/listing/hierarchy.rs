use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Hospital, Identified, Territory};

/// Children that may hang under a parent row.
pub trait Parented {
    fn parent_id(&self) -> Option<i64>;
}

impl Parented for Hospital {
    fn parent_id(&self) -> Option<i64> {
        self.hospital_system_id
    }
}

impl Parented for Territory {
    fn parent_id(&self) -> Option<i64> {
        self.rep_team_id
    }
}

/// One rendered row of a parent/child listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyRow<P, C> {
    Parent { row: P, child_count: usize },
    Child { parent_id: i64, row: C },
    Separator { label: String },
    Independent { row: C },
}

/// Interleave parents with their children, then list independents.
///
/// Parents keep their input order (callers pass them sorted by name) and
/// each is followed by its children in input order. A separator is
/// emitted only when some child sits under a live parent and some child
/// does not. Children whose parent is not in `parents` (inactive or
/// missing) are listed as independent.
pub fn order_hierarchy<P, C>(parents: Vec<P>, children: Vec<C>, separator_label: &str) -> Vec<HierarchyRow<P, C>>
where
    P: Identified,
    C: Parented,
{
    let live: HashSet<i64> = parents.iter().map(|p| p.id()).collect();
    let mut attached: Vec<C> = Vec::new();
    let mut independent: Vec<C> = Vec::new();
    for child in children {
        match child.parent_id() {
            Some(pid) if live.contains(&pid) => attached.push(child),
            _ => independent.push(child),
        }
    }

    let has_attached = !attached.is_empty();
    let mut rows = Vec::with_capacity(parents.len() + attached.len() + independent.len() + 1);

    for parent in parents {
        let pid = parent.id();
        let (mine, rest): (Vec<C>, Vec<C>) = attached
            .into_iter()
            .partition(|c| c.parent_id() == Some(pid));
        attached = rest;
        rows.push(HierarchyRow::Parent { row: parent, child_count: mine.len() });
        rows.extend(mine.into_iter().map(|row| HierarchyRow::Child { parent_id: pid, row }));
    }

    if has_attached && !independent.is_empty() {
        rows.push(HierarchyRow::Separator { label: separator_label.to_string() });
    }
    rows.extend(independent.into_iter().map(|row| HierarchyRow::Independent { row }));
    rows
}

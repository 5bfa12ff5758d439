// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::model::{Jtbd, JtbdId, Workspace};

/// One row of the flattened JTBD forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JtbdTreeEntry<'a> {
    pub depth: usize,
    pub jtbd: &'a Jtbd,
}

fn sibling_order(jtbds: &mut [&Jtbd]) {
    jtbds.sort_by_key(|jtbd| (Reverse(jtbd.priority.rank()), jtbd.title.to_lowercase(), jtbd.jtbd_id.clone()));
}

/// Jobs without a parent, or whose parent no longer exists.
pub fn roots(workspace: &Workspace) -> Vec<&Jtbd> {
    let mut out = workspace
        .jtbds()
        .values()
        .filter(|jtbd| match &jtbd.parent_id {
            None => true,
            Some(parent_id) => !workspace.jtbds().contains_key(parent_id),
        })
        .collect::<Vec<_>>();
    sibling_order(&mut out);
    out
}

/// Direct children, highest priority first.
pub fn children<'a>(workspace: &'a Workspace, jtbd_id: &JtbdId) -> Vec<&'a Jtbd> {
    let mut out = workspace
        .jtbds()
        .values()
        .filter(|jtbd| jtbd.parent_id.as_ref() == Some(jtbd_id))
        .collect::<Vec<_>>();
    sibling_order(&mut out);
    out
}

/// Ancestor ids from the direct parent up to the root.
pub fn ancestors(workspace: &Workspace, jtbd_id: &JtbdId) -> Vec<JtbdId> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    seen.insert(jtbd_id.clone());
    let mut cursor = workspace.jtbds().get(jtbd_id).and_then(|jtbd| jtbd.parent_id.clone());
    while let Some(parent_id) = cursor {
        if !seen.insert(parent_id.clone()) {
            break;
        }
        cursor = workspace.jtbds().get(&parent_id).and_then(|jtbd| jtbd.parent_id.clone());
        if workspace.jtbds().contains_key(&parent_id) {
            out.push(parent_id);
        }
    }
    out
}

/// Every job below `jtbd_id`, pre-order.
pub fn descendants<'a>(workspace: &'a Workspace, jtbd_id: &JtbdId) -> Vec<&'a Jtbd> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    seen.insert(jtbd_id.clone());
    collect_descendants(workspace, jtbd_id, &mut seen, &mut |_, jtbd| out.push(jtbd), 0);
    out
}

fn collect_descendants<'a>(
    workspace: &'a Workspace,
    jtbd_id: &JtbdId,
    seen: &mut BTreeSet<JtbdId>,
    visit: &mut dyn FnMut(usize, &'a Jtbd),
    depth: usize,
) {
    for child in children(workspace, jtbd_id) {
        if !seen.insert(child.jtbd_id.clone()) {
            continue;
        }
        visit(depth + 1, child);
        collect_descendants(workspace, &child.jtbd_id, seen, visit, depth + 1);
    }
}

/// The whole forest flattened depth-first with depths (roots at 0).
pub fn flatten_tree(workspace: &Workspace) -> Vec<JtbdTreeEntry<'_>> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    for root in roots(workspace) {
        if !seen.insert(root.jtbd_id.clone()) {
            continue;
        }
        out.push(JtbdTreeEntry { depth: 0, jtbd: root });
        collect_descendants(
            workspace,
            &root.jtbd_id,
            &mut seen,
            &mut |depth, jtbd| out.push(JtbdTreeEntry { depth, jtbd }),
            0,
        );
    }
    out
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Indented outlines for interview guides and the JTBD forest.

use crate::model::{Guide, OutlineItem, Workspace};
use crate::query::jtbd::flatten_tree;

/// Guide name, then blocks (`▸`) and questions (`-`) indented two spaces per level.
pub fn render_guide_outline(guide: &Guide) -> String {
    let mut out = format!("{} [{}]\n", guide.name, guide.guide_id);
    let outline = guide.flatten();
    if outline.is_empty() {
        out.push_str("(empty guide)\n");
        return out;
    }

    for entry in outline {
        let indent = "  ".repeat(entry.depth);
        let line = match entry.item {
            OutlineItem::Block(block) => format!("{indent}▸ {} [{}]\n", block.name, block.block_id),
            OutlineItem::Question(question) => {
                format!("{indent}- {} [{}]\n", question.text, question.question_id)
            }
        };
        out.push_str(&line);
    }
    out
}

/// JTBD forest with tree connectors; roots are unindented.
pub fn render_jtbd_tree(workspace: &Workspace) -> String {
    let entries = flatten_tree(workspace);
    if entries.is_empty() {
        return "(no jobs to be done)\n".to_owned();
    }

    // An entry is last when no later sibling follows before the parent's subtree ends.
    let mut is_last = vec![false; entries.len()];
    let mut seen = Vec::<bool>::new();
    for (idx, entry) in entries.iter().enumerate().rev() {
        seen.resize(entry.depth + 1, false);
        is_last[idx] = !seen[entry.depth];
        seen[entry.depth] = true;
    }

    let mut out = String::new();
    let mut ancestors_last = Vec::<bool>::new();
    for (entry, last) in entries.iter().zip(is_last) {
        ancestors_last.truncate(entry.depth);
        let mut line = String::new();
        for &ancestor_last in ancestors_last.iter().skip(1) {
            line.push_str(if ancestor_last { "   " } else { "│  " });
        }
        if entry.depth > 0 {
            line.push_str(if last { "└─ " } else { "├─ " });
        }

        let jtbd = entry.jtbd;
        line.push_str(&format!("{} [{}] {}", jtbd.title, jtbd.jtbd_id, jtbd.priority.as_str()));
        if let Some(category) = &jtbd.category {
            line.push_str(&format!(" · {category}"));
        }
        out.push_str(&line);
        out.push('\n');
        ancestors_last.push(last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{demo_workspace, GuideId};

    #[test]
    fn guide_outline_indents_blocks_and_questions() {
        let workspace = demo_workspace();
        let guide = workspace.guides().values().next().expect("demo guide");
        let text = render_guide_outline(guide);
        let expected = "\
Buyer interview [g:1]
▸ Warm-up [b:1]
  - Tell me about your role. [q:1]
▸ Supplier selection [b:2]
  - Walk me through the last purchase. [q:2]
  - Who else is involved? [q:3]
  ▸ Criteria [b:3]
    - What matters most when comparing offers? [q:4]
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_guide_is_marked() {
        let guide = Guide::new(GuideId::new("g:9").unwrap(), "Draft");
        assert_eq!(render_guide_outline(&guide), "Draft [g:9]\n(empty guide)\n");
    }

    #[test]
    fn jtbd_tree_uses_connectors() {
        let workspace = demo_workspace();
        let expected = "\
Choose a reliable supplier [j:1] high · procurement
├─ Compare offers quickly [j:2] critical · procurement
│  └─ Normalize quotes to one currency [j:4] low
└─ Verify delivery track record [j:3] medium
Get a new hire productive [j:5] medium · onboarding
";
        assert_eq!(render_jtbd_tree(&workspace), expected);
    }
}

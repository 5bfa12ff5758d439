// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use crate::model::GuideId;

fn bid(value: &str) -> BlockId {
    BlockId::new(value).expect("block id")
}

fn qid(value: &str) -> QuestionId {
    QuestionId::new(value).expect("question id")
}

/// b:1 [q:1]
/// b:2 [q:2, q:3]
///   b:3 [q:4]
fn sample_guide() -> Guide {
    let mut guide = Guide::new(GuideId::new("g:1").unwrap(), "Buyer interview");
    let mut warmup = GuideBlock::new(bid("b:1"), "Warm-up");
    warmup.questions.push(Question::new(qid("q:1"), "Role?"));
    let mut selection = GuideBlock::new(bid("b:2"), "Selection");
    selection.questions.push(Question::new(qid("q:2"), "Last purchase?"));
    selection.questions.push(Question::new(qid("q:3"), "Who decides?"));
    let mut criteria = GuideBlock::new(bid("b:3"), "Criteria");
    criteria.questions.push(Question::new(qid("q:4"), "What matters?"));
    selection.sub_blocks.push(criteria);
    guide.blocks = vec![warmup, selection];
    guide
}

fn root_ids(guide: &Guide) -> Vec<&str> {
    guide.blocks.iter().map(|block| block.block_id.as_str()).collect()
}

fn question_ids(block: &GuideBlock) -> Vec<&str> {
    block.questions.iter().map(|question| question.question_id.as_str()).collect()
}

#[test]
fn add_block_at_index_and_under_parent() {
    let mut guide = sample_guide();
    apply_guide_op(
        &mut guide,
        &GuideOp::AddBlock { parent_id: None, block_id: bid("b:4"), name: "Wrap-up".into(), index: Some(0) },
    )
    .unwrap();
    assert_eq!(root_ids(&guide), vec!["b:4", "b:1", "b:2"]);

    apply_guide_op(
        &mut guide,
        &GuideOp::AddBlock {
            parent_id: Some(bid("b:3")),
            block_id: bid("b:5"),
            name: "  Deep dive ".into(),
            index: Some(99),
        },
    )
    .unwrap();
    let deep = guide.find_block(&bid("b:5")).expect("added block");
    assert_eq!(deep.name, "Deep dive");
    assert_eq!(guide.block_path(&bid("b:5")), Some(vec![bid("b:2"), bid("b:3")]));
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut guide = sample_guide();
    let err = apply_guide_op(
        &mut guide,
        &GuideOp::AddBlock { parent_id: None, block_id: bid("b:3"), name: "Again".into(), index: None },
    )
    .unwrap_err();
    assert_eq!(err, GuideError::DuplicateBlock(bid("b:3")));

    let err = apply_guide_op(
        &mut guide,
        &GuideOp::AddQuestion { block_id: bid("b:1"), question_id: qid("q:4"), text: "Dup".into(), index: None },
    )
    .unwrap_err();
    assert_eq!(err, GuideError::DuplicateQuestion(qid("q:4")));
}

#[test]
fn reorder_question_within_block() {
    let mut guide = sample_guide();
    apply_guide_op(
        &mut guide,
        &GuideOp::MoveQuestion { question_id: qid("q:3"), to_block_id: bid("b:2"), index: Some(0) },
    )
    .unwrap();
    let selection = guide.find_block(&bid("b:2")).unwrap();
    assert_eq!(question_ids(selection), vec!["q:3", "q:2"]);
}

#[test]
fn move_question_across_levels() {
    let mut guide = sample_guide();
    apply_guide_op(
        &mut guide,
        &GuideOp::MoveQuestion { question_id: qid("q:4"), to_block_id: bid("b:1"), index: None },
    )
    .unwrap();
    assert_eq!(question_ids(guide.find_block(&bid("b:1")).unwrap()), vec!["q:1", "q:4"]);
    assert!(guide.find_block(&bid("b:3")).unwrap().questions.is_empty());
    assert_eq!(guide.question_count(), 4);
}

#[test]
fn move_block_to_root_and_back_into_sibling() {
    let mut guide = sample_guide();
    apply_guide_op(
        &mut guide,
        &GuideOp::MoveBlock { block_id: bid("b:3"), new_parent_id: None, index: Some(1) },
    )
    .unwrap();
    assert_eq!(root_ids(&guide), vec!["b:1", "b:3", "b:2"]);
    assert!(guide.find_block(&bid("b:2")).unwrap().sub_blocks.is_empty());

    apply_guide_op(
        &mut guide,
        &GuideOp::MoveBlock { block_id: bid("b:2"), new_parent_id: Some(bid("b:1")), index: None },
    )
    .unwrap();
    assert_eq!(root_ids(&guide), vec!["b:1", "b:3"]);
    assert_eq!(guide.block_path(&bid("b:2")), Some(vec![bid("b:1")]));
    assert_eq!(guide.block_count(), 3);
}

#[test]
fn move_block_into_own_subtree_is_rejected() {
    let mut guide = sample_guide();
    let before = guide.clone();
    let err = apply_guide_op(
        &mut guide,
        &GuideOp::MoveBlock { block_id: bid("b:2"), new_parent_id: Some(bid("b:3")), index: None },
    )
    .unwrap_err();
    assert_eq!(err, GuideError::MoveIntoOwnSubtree { block_id: bid("b:2"), target_id: bid("b:3") });

    let err = apply_guide_op(
        &mut guide,
        &GuideOp::MoveBlock { block_id: bid("b:2"), new_parent_id: Some(bid("b:2")), index: None },
    )
    .unwrap_err();
    assert!(matches!(err, GuideError::MoveIntoOwnSubtree { .. }));
    assert_eq!(guide, before);
}

#[test]
fn remove_block_drops_subtree() {
    let mut guide = sample_guide();
    apply_guide_op(&mut guide, &GuideOp::RemoveBlock { block_id: bid("b:2") }).unwrap();
    assert_eq!(root_ids(&guide), vec!["b:1"]);
    assert!(guide.find_block(&bid("b:3")).is_none());
    assert!(guide.find_question(&qid("q:4")).is_none());
}

#[test]
fn batch_is_atomic() {
    let mut guide = sample_guide();
    let before = guide.clone();
    let err = apply_guide_ops(
        &mut guide,
        &[
            GuideOp::RenameBlock { block_id: bid("b:1"), name: "Intro".into() },
            GuideOp::RemoveQuestion { question_id: qid("q:missing") },
        ],
    )
    .unwrap_err();
    assert_eq!(err, GuideError::QuestionNotFound(qid("q:missing")));
    assert_eq!(guide, before);
}

#[test]
fn blank_text_is_rejected() {
    let mut guide = sample_guide();
    let err = apply_guide_op(
        &mut guide,
        &GuideOp::UpdateQuestion { question_id: qid("q:1"), text: "   ".into() },
    )
    .unwrap_err();
    assert_eq!(err, GuideError::EmptyText { what: "question text" });
}

#[test]
fn flatten_is_preorder_with_depth() {
    let guide = sample_guide();
    let outline = guide
        .flatten()
        .into_iter()
        .map(|entry| match entry.item {
            crate::model::OutlineItem::Block(block) => format!("{}B{}", entry.depth, block.block_id),
            crate::model::OutlineItem::Question(question) => {
                format!("{}Q{}", entry.depth, question.question_id)
            }
        })
        .collect::<Vec<_>>();
    assert_eq!(outline, vec!["0Bb:1", "1Qq:1", "0Bb:2", "1Qq:2", "1Qq:3", "1Bb:3", "2Qq:4"]);
}

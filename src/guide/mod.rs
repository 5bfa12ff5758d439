// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Hierarchical guide editor.
//!
//! Guides are outlines of named blocks; each block owns ordered questions and ordered sub-blocks.
//! Blocks and questions can be reordered within their list or moved across levels (the
//! drag-and-drop operations of the editor). Every op either applies fully or leaves the guide
//! untouched.

use thiserror::Error;

use crate::model::{BlockId, Guide, GuideBlock, Question, QuestionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideOp {
    AddBlock {
        parent_id: Option<BlockId>,
        block_id: BlockId,
        name: String,
        index: Option<usize>,
    },
    RenameBlock {
        block_id: BlockId,
        name: String,
    },
    RemoveBlock {
        block_id: BlockId,
    },
    /// Moves a block (with its subtree) under `new_parent_id` (`None` = top level).
    MoveBlock {
        block_id: BlockId,
        new_parent_id: Option<BlockId>,
        index: Option<usize>,
    },
    AddQuestion {
        block_id: BlockId,
        question_id: QuestionId,
        text: String,
        index: Option<usize>,
    },
    UpdateQuestion {
        question_id: QuestionId,
        text: String,
    },
    RemoveQuestion {
        question_id: QuestionId,
    },
    /// Moves a question into `to_block_id` (which may be its current block).
    MoveQuestion {
        question_id: QuestionId,
        to_block_id: BlockId,
        index: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuideError {
    #[error("block not found (id={0})")]
    BlockNotFound(BlockId),
    #[error("question not found (id={0})")]
    QuestionNotFound(QuestionId),
    #[error("block already exists (id={0})")]
    DuplicateBlock(BlockId),
    #[error("question already exists (id={0})")]
    DuplicateQuestion(QuestionId),
    #[error("cannot move block {block_id} into itself or its descendant {target_id}")]
    MoveIntoOwnSubtree { block_id: BlockId, target_id: BlockId },
    #[error("{what} must not be empty")]
    EmptyText { what: &'static str },
}

/// Applies one editor op to `guide`.
pub fn apply_guide_op(guide: &mut Guide, op: &GuideOp) -> Result<(), GuideError> {
    match op {
        GuideOp::AddBlock { parent_id, block_id, name, index } => {
            let name = required_text("block name", name)?;
            if guide.contains_block_id(block_id.as_str()) {
                return Err(GuideError::DuplicateBlock(block_id.clone()));
            }
            let siblings = sibling_list_mut(&mut guide.blocks, parent_id.as_ref())?;
            insert_clamped(siblings, *index, GuideBlock::new(block_id.clone(), name));
            Ok(())
        }
        GuideOp::RenameBlock { block_id, name } => {
            let name = required_text("block name", name)?;
            let block = find_block_mut(&mut guide.blocks, block_id)
                .ok_or_else(|| GuideError::BlockNotFound(block_id.clone()))?;
            block.name = name;
            Ok(())
        }
        GuideOp::RemoveBlock { block_id } => {
            take_block(&mut guide.blocks, block_id)
                .map(|_| ())
                .ok_or_else(|| GuideError::BlockNotFound(block_id.clone()))
        }
        GuideOp::MoveBlock { block_id, new_parent_id, index } => {
            let Some(moving) = guide.find_block(block_id) else {
                return Err(GuideError::BlockNotFound(block_id.clone()));
            };
            if let Some(target_id) = new_parent_id {
                if target_id == block_id || moving.contains_descendant(target_id) {
                    return Err(GuideError::MoveIntoOwnSubtree {
                        block_id: block_id.clone(),
                        target_id: target_id.clone(),
                    });
                }
                if guide.find_block(target_id).is_none() {
                    return Err(GuideError::BlockNotFound(target_id.clone()));
                }
            }

            let block = take_block(&mut guide.blocks, block_id)
                .ok_or_else(|| GuideError::BlockNotFound(block_id.clone()))?;
            let siblings = sibling_list_mut(&mut guide.blocks, new_parent_id.as_ref())?;
            insert_clamped(siblings, *index, block);
            Ok(())
        }
        GuideOp::AddQuestion { block_id, question_id, text, index } => {
            let text = required_text("question text", text)?;
            if guide.contains_question_id(question_id.as_str()) {
                return Err(GuideError::DuplicateQuestion(question_id.clone()));
            }
            let block = find_block_mut(&mut guide.blocks, block_id)
                .ok_or_else(|| GuideError::BlockNotFound(block_id.clone()))?;
            insert_clamped(&mut block.questions, *index, Question::new(question_id.clone(), text));
            Ok(())
        }
        GuideOp::UpdateQuestion { question_id, text } => {
            let text = required_text("question text", text)?;
            let question = find_question_mut(&mut guide.blocks, question_id)
                .ok_or_else(|| GuideError::QuestionNotFound(question_id.clone()))?;
            question.text = text;
            Ok(())
        }
        GuideOp::RemoveQuestion { question_id } => take_question(&mut guide.blocks, question_id)
            .map(|_| ())
            .ok_or_else(|| GuideError::QuestionNotFound(question_id.clone())),
        GuideOp::MoveQuestion { question_id, to_block_id, index } => {
            if guide.find_question_owner(question_id).is_none() {
                return Err(GuideError::QuestionNotFound(question_id.clone()));
            }
            if guide.find_block(to_block_id).is_none() {
                return Err(GuideError::BlockNotFound(to_block_id.clone()));
            }
            let question = take_question(&mut guide.blocks, question_id)
                .ok_or_else(|| GuideError::QuestionNotFound(question_id.clone()))?;
            let block = find_block_mut(&mut guide.blocks, to_block_id)
                .ok_or_else(|| GuideError::BlockNotFound(to_block_id.clone()))?;
            insert_clamped(&mut block.questions, *index, question);
            Ok(())
        }
    }
}

/// Applies a batch of ops atomically: on error the guide is left unchanged.
pub fn apply_guide_ops(guide: &mut Guide, ops: &[GuideOp]) -> Result<(), GuideError> {
    let mut candidate = guide.clone();
    for op in ops {
        apply_guide_op(&mut candidate, op)?;
    }
    *guide = candidate;
    Ok(())
}

fn required_text(what: &'static str, value: &str) -> Result<String, GuideError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GuideError::EmptyText { what });
    }
    Ok(trimmed.to_owned())
}

fn insert_clamped<T>(list: &mut Vec<T>, index: Option<usize>, item: T) {
    let index = index.unwrap_or(list.len()).min(list.len());
    list.insert(index, item);
}

fn sibling_list_mut<'a>(
    roots: &'a mut Vec<GuideBlock>,
    parent_id: Option<&BlockId>,
) -> Result<&'a mut Vec<GuideBlock>, GuideError> {
    match parent_id {
        None => Ok(roots),
        Some(parent_id) => find_block_mut(roots, parent_id)
            .map(|parent| &mut parent.sub_blocks)
            .ok_or_else(|| GuideError::BlockNotFound(parent_id.clone())),
    }
}

fn find_block_mut<'a>(
    blocks: &'a mut [GuideBlock],
    block_id: &BlockId,
) -> Option<&'a mut GuideBlock> {
    for block in blocks.iter_mut() {
        if &block.block_id == block_id {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.sub_blocks, block_id) {
            return Some(found);
        }
    }
    None
}

fn find_question_mut<'a>(
    blocks: &'a mut [GuideBlock],
    question_id: &QuestionId,
) -> Option<&'a mut Question> {
    for block in blocks.iter_mut() {
        if let Some(position) =
            block.questions.iter().position(|question| &question.question_id == question_id)
        {
            return block.questions.get_mut(position);
        }
        if let Some(found) = find_question_mut(&mut block.sub_blocks, question_id) {
            return Some(found);
        }
    }
    None
}

fn take_block(blocks: &mut Vec<GuideBlock>, block_id: &BlockId) -> Option<GuideBlock> {
    if let Some(position) = blocks.iter().position(|block| &block.block_id == block_id) {
        return Some(blocks.remove(position));
    }
    blocks.iter_mut().find_map(|block| take_block(&mut block.sub_blocks, block_id))
}

fn take_question(blocks: &mut [GuideBlock], question_id: &QuestionId) -> Option<Question> {
    for block in blocks.iter_mut() {
        if let Some(position) =
            block.questions.iter().position(|question| &question.question_id == question_id)
        {
            return Some(block.questions.remove(position));
        }
        if let Some(found) = take_question(&mut block.sub_blocks, question_id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{BlockId, GuideId, QuestionId, ResearchId};
use super::validate::{require_text, ValidationError};

/// An interview guide: an ordered outline of named blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Guide {
    pub guide_id: GuideId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<ResearchId>,
    #[serde(default)]
    pub blocks: Vec<GuideBlock>,
}

/// A named block holding ordered questions and nested sub-blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GuideBlock {
    pub block_id: BlockId,
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub sub_blocks: Vec<GuideBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub question_id: QuestionId,
    pub text: String,
}

impl Guide {
    pub fn new(guide_id: GuideId, name: impl Into<String>) -> Self {
        Self { guide_id, name: name.into(), research_id: None, blocks: Vec::new() }
    }

    /// Trims the guide name, block names and question texts throughout the tree.
    pub fn normalize(&mut self) {
        fn walk(blocks: &mut [GuideBlock]) {
            for block in blocks {
                block.name = block.name.trim().to_owned();
                for question in &mut block.questions {
                    question.text = question.text.trim().to_owned();
                }
                walk(&mut block.sub_blocks);
            }
        }
        self.name = self.name.trim().to_owned();
        walk(&mut self.blocks);
    }

    /// Checks the whole tree: a named guide, named blocks, non-blank questions, and block and
    /// question ids unique across every level.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        let mut block_ids = HashSet::new();
        let mut question_ids = HashSet::new();
        for entry in self.flatten() {
            match entry.item {
                OutlineItem::Block(block) => {
                    if !block_ids.insert(block.block_id.as_str()) {
                        return Err(ValidationError::Invalid {
                            field: "blocks",
                            reason: format!("duplicate block id {}", block.block_id),
                        });
                    }
                    if block.name.trim().is_empty() {
                        return Err(ValidationError::Invalid {
                            field: "blocks",
                            reason: format!("block {} has no name", block.block_id),
                        });
                    }
                }
                OutlineItem::Question(question) => {
                    if !question_ids.insert(question.question_id.as_str()) {
                        return Err(ValidationError::Invalid {
                            field: "questions",
                            reason: format!("duplicate question id {}", question.question_id),
                        });
                    }
                    if question.text.trim().is_empty() {
                        return Err(ValidationError::Invalid {
                            field: "questions",
                            reason: format!("question {} has no text", question.question_id),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn find_block(&self, block_id: &BlockId) -> Option<&GuideBlock> {
        find_block_in(&self.blocks, block_id)
    }

    /// Returns the block that directly owns `question_id`.
    pub fn find_question_owner(&self, question_id: &QuestionId) -> Option<&GuideBlock> {
        find_question_owner_in(&self.blocks, question_id)
    }

    pub fn find_question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.find_question_owner(question_id)?
            .questions
            .iter()
            .find(|question| &question.question_id == question_id)
    }

    /// Ancestor ids from the root down to (and excluding) `block_id`.
    ///
    /// Returns `None` if the block does not exist.
    pub fn block_path(&self, block_id: &BlockId) -> Option<Vec<BlockId>> {
        let mut path = Vec::new();
        if block_path_in(&self.blocks, block_id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    pub fn block_count(&self) -> usize {
        fn count(blocks: &[GuideBlock]) -> usize {
            blocks.iter().map(|block| 1 + count(&block.sub_blocks)).sum()
        }
        count(&self.blocks)
    }

    pub fn question_count(&self) -> usize {
        fn count(blocks: &[GuideBlock]) -> usize {
            blocks.iter().map(|block| block.questions.len() + count(&block.sub_blocks)).sum()
        }
        count(&self.blocks)
    }

    pub fn contains_block_id(&self, block_id: &str) -> bool {
        self.flatten().iter().any(|entry| match entry.item {
            OutlineItem::Block(block) => block.block_id.as_str() == block_id,
            OutlineItem::Question(_) => false,
        })
    }

    pub fn contains_question_id(&self, question_id: &str) -> bool {
        self.flatten().iter().any(|entry| match entry.item {
            OutlineItem::Question(question) => question.question_id.as_str() == question_id,
            OutlineItem::Block(_) => false,
        })
    }

    /// Depth-first, pre-order outline: each block is followed by its questions, then its
    /// sub-blocks.
    pub fn flatten(&self) -> Vec<OutlineEntry<'_>> {
        let mut out = Vec::new();
        flatten_into(&self.blocks, 0, &mut out);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineItem<'a> {
    Block(&'a GuideBlock),
    Question(&'a Question),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineEntry<'a> {
    pub depth: usize,
    pub item: OutlineItem<'a>,
}

impl GuideBlock {
    pub fn new(block_id: BlockId, name: impl Into<String>) -> Self {
        Self { block_id, name: name.into(), questions: Vec::new(), sub_blocks: Vec::new() }
    }

    pub fn contains_descendant(&self, block_id: &BlockId) -> bool {
        self.sub_blocks
            .iter()
            .any(|child| &child.block_id == block_id || child.contains_descendant(block_id))
    }
}

impl Question {
    pub fn new(question_id: QuestionId, text: impl Into<String>) -> Self {
        Self { question_id, text: text.into() }
    }
}

fn find_block_in<'a>(blocks: &'a [GuideBlock], block_id: &BlockId) -> Option<&'a GuideBlock> {
    for block in blocks {
        if &block.block_id == block_id {
            return Some(block);
        }
        if let Some(found) = find_block_in(&block.sub_blocks, block_id) {
            return Some(found);
        }
    }
    None
}

fn find_question_owner_in<'a>(
    blocks: &'a [GuideBlock],
    question_id: &QuestionId,
) -> Option<&'a GuideBlock> {
    for block in blocks {
        if block.questions.iter().any(|question| &question.question_id == question_id) {
            return Some(block);
        }
        if let Some(found) = find_question_owner_in(&block.sub_blocks, question_id) {
            return Some(found);
        }
    }
    None
}

fn block_path_in(blocks: &[GuideBlock], block_id: &BlockId, path: &mut Vec<BlockId>) -> bool {
    for block in blocks {
        if &block.block_id == block_id {
            return true;
        }
        path.push(block.block_id.clone());
        if block_path_in(&block.sub_blocks, block_id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn flatten_into<'a>(blocks: &'a [GuideBlock], depth: usize, out: &mut Vec<OutlineEntry<'a>>) {
    for block in blocks {
        out.push(OutlineEntry { depth, item: OutlineItem::Block(block) });
        for question in &block.questions {
            out.push(OutlineEntry { depth: depth + 1, item: OutlineItem::Question(question) });
        }
        flatten_into(&block.sub_blocks, depth + 1, out);
    }
}

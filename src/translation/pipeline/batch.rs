//! 批次管理模块
//!
//! 把收集到的文本位置按固定大小切分成批次，并放入有序队列，
//! 由单个工作者逐个取出处理。每个批次对应一次翻译请求。

use std::collections::VecDeque;

use crate::translation::pipeline::collector::TextUnit;

/// 一次翻译请求对应的文本位置组
#[derive(Debug, Clone)]
pub struct TranslationBatch {
    /// 批次序号，从0开始
    pub index: usize,
    /// 按文档顺序排列的文本位置
    pub units: Vec<TextUnit>,
}

impl TranslationBatch {
    pub fn new(index: usize, units: Vec<TextUnit>) -> Self {
        Self { index, units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 去除首尾空白后的非空文本，保持文档顺序
    pub fn texts(&self) -> Vec<String> {
        self.units
            .iter()
            .map(|unit| unit.trimmed())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 构造请求负载，没有可翻译文本时返回 `None`
    pub fn payload(&self, separator: &str) -> Option<String> {
        let texts = self.texts();
        if texts.is_empty() {
            return None;
        }

        if texts.iter().any(|text| text.contains(separator)) {
            tracing::warn!(
                "批次 {} 中的文本包含分隔符，译文可能无法正确对应",
                self.index
            );
        }

        Some(texts.join(separator))
    }

    /// 构造批次摘要
    pub fn summary(&self) -> String {
        let chars: usize = self.units.iter().map(|u| u.trimmed().chars().count()).sum();
        format!("Batch {}: {} units, {} chars", self.index, self.len(), chars)
    }
}

/// 按响应分隔符拆分译文
pub fn split_response(translated: &str, separator: &str) -> Vec<String> {
    translated.split(separator).map(str::to_string).collect()
}

/// 按固定大小切分批次，只有最后一个批次可能较小
pub fn create_batches(units: Vec<TextUnit>, batch_size: usize) -> Vec<TranslationBatch> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(units.len().div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size);

    for unit in units {
        current.push(unit);
        if current.len() == batch_size {
            let index = batches.len();
            batches.push(TranslationBatch::new(index, std::mem::take(&mut current)));
        }
    }

    if !current.is_empty() {
        let index = batches.len();
        batches.push(TranslationBatch::new(index, current));
    }

    batches
}

/// 有序批次队列
#[derive(Debug, Default)]
pub struct BatchQueue {
    queue: VecDeque<TranslationBatch>,
    total: usize,
}

impl BatchQueue {
    pub fn new(units: Vec<TextUnit>, batch_size: usize) -> Self {
        let queue: VecDeque<TranslationBatch> = create_batches(units, batch_size).into();
        let total = queue.len();
        Self { queue, total }
    }

    /// 取出下一个批次
    pub fn next_batch(&mut self) -> Option<TranslationBatch> {
        self.queue.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

//! 翻译引擎核心实现
//!
//! 引擎负责一次完整的翻译过程：
//!
//! 1. 在发出任何请求之前，一次性收集文档中所有可翻译的文本位置
//! 2. 按固定大小切分批次并放入有序队列
//! 3. 逐个批次发送翻译请求，同一时刻最多只有一个请求在途
//! 4. 按位置把译文应用到DOM中
//!
//! 单个批次失败只影响该批次：失败的批次不产生任何标记，后续批次照常处理。
//! 每次发送请求和修改DOM之前都会检查 [`PassToken`]，过期的过程立即停止。

use markup5ever_rcdom::{Handle, RcDom};
use serde::{Deserialize, Serialize};

use crate::parsers::html::get_body_or_document;
use crate::translation::config::TranslationConfig;
use crate::translation::core::client::Translator;
use crate::translation::marks::{apply_translations, restore_marks, RestorationLedger};
use crate::translation::pipeline::{
    split_response, BatchQueue, CollectorConfig, TextCollector, TextUnit, TranslationBatch,
};
use crate::translation::toggle::PassToken;

/// 引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 每个批次的文本位置数
    pub batch_size: usize,
    /// 批次内文本之间的分隔符
    pub separator: String,
    /// 标记元素的类名
    pub marker_class: String,
    /// 父元素为这些标签时跳过
    pub skip_elements: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

impl From<&TranslationConfig> for EngineConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            separator: config.separator.clone(),
            marker_class: config.marker_class.clone(),
            skip_elements: CollectorConfig::default().skip_elements,
        }
    }
}

/// 单个批次的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 服务返回的译文片段，按位置对应批次中的文本
    Translated(Vec<String>),
    /// 请求失败，携带批次原文；不会应用到DOM
    Fallback(Vec<String>),
}

impl BatchOutcome {
    pub fn is_translated(&self) -> bool {
        matches!(self, BatchOutcome::Translated(_))
    }
}

/// 一次翻译或还原过程的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub units_collected: usize,
    pub batches_total: usize,
    pub batches_translated: usize,
    pub batches_failed: usize,
    pub batches_skipped: usize,
    pub nodes_marked: usize,
    pub nodes_restored: usize,
    pub cancelled: bool,
}

/// 翻译引擎
pub struct TranslationEngine<T: Translator> {
    translator: T,
    config: EngineConfig,
}

impl<T: Translator> TranslationEngine<T> {
    pub fn new(translator: T, config: EngineConfig) -> Self {
        Self { translator, config }
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 收集 `root` 下所有可翻译的文本位置
    pub fn collect(&self, root: &Handle) -> Vec<TextUnit> {
        let mut collector = TextCollector::new(CollectorConfig {
            skip_elements: self.config.skip_elements.clone(),
            marker_class: self.config.marker_class.clone(),
        });
        collector.collect_text_units(root)
    }

    /// 发送一个批次
    ///
    /// 批次中没有可翻译文本时返回 `None`，不发送请求。
    /// 所有错误都在这里吸收并记录，结果为 [`BatchOutcome::Fallback`]。
    pub async fn dispatch_batch(&self, batch: &TranslationBatch) -> Option<BatchOutcome> {
        let payload = batch.payload(&self.config.separator)?;
        tracing::debug!("发送 {}", batch.summary());

        match self.translator.translate(&payload).await {
            Ok(translated) => {
                let segments = split_response(&translated, &self.config.separator);
                if segments.len() != batch.len() {
                    tracing::warn!(
                        batch = batch.index,
                        "译文片段数 {} 与批次文本数 {} 不一致，多余部分忽略",
                        segments.len(),
                        batch.len()
                    );
                }
                Some(BatchOutcome::Translated(segments))
            }
            Err(e) => {
                tracing::warn!(
                    batch = batch.index,
                    kind = %e.category(),
                    "批次翻译失败，保留原文: {}",
                    e
                );
                Some(BatchOutcome::Fallback(batch.texts()))
            }
        }
    }

    /// 翻译整个文档
    ///
    /// 文本位置在第一个请求之前收集完毕；批次按文档顺序逐个处理。
    pub async fn translate_document(
        &self,
        dom: &RcDom,
        ledger: &mut RestorationLedger,
        token: &PassToken,
    ) -> PassReport {
        let root = get_body_or_document(dom);
        let units = self.collect(&root);
        ledger.reserve_existing(&dom.document, &self.config.marker_class);

        let mut report = PassReport {
            units_collected: units.len(),
            ..PassReport::default()
        };

        let mut queue = BatchQueue::new(units, self.config.batch_size);
        report.batches_total = queue.total();
        tracing::info!(
            "开始翻译: {} 个文本位置，{} 个批次",
            report.units_collected,
            report.batches_total
        );

        while let Some(batch) = queue.next_batch() {
            if !token.is_current() {
                report.cancelled = true;
                break;
            }

            let outcome = match self.dispatch_batch(&batch).await {
                Some(outcome) => outcome,
                None => {
                    report.batches_skipped += 1;
                    continue;
                }
            };

            match outcome {
                BatchOutcome::Translated(segments) => {
                    if !token.is_current() {
                        report.cancelled = true;
                        break;
                    }
                    report.nodes_marked += apply_translations(
                        dom,
                        &batch.units,
                        &segments,
                        &self.config.marker_class,
                        ledger,
                    );
                    report.batches_translated += 1;
                }
                BatchOutcome::Fallback(_) => report.batches_failed += 1,
            }
        }

        if report.cancelled {
            tracing::info!(
                "翻译过程已取消，剩余 {} 个批次未处理",
                queue.remaining() + 1
            );
        } else {
            tracing::info!(
                "翻译完成: 成功 {} 个批次，失败 {} 个，标记 {} 个节点",
                report.batches_translated,
                report.batches_failed,
                report.nodes_marked
            );
        }

        report
    }

    /// 还原文档中的所有标记
    pub fn restore_document(&self, dom: &RcDom, ledger: &mut RestorationLedger) -> PassReport {
        let restored = restore_marks(&dom.document, &self.config.marker_class, ledger);
        tracing::info!("已还原 {} 个标记", restored);

        PassReport {
            nodes_restored: restored,
            ..PassReport::default()
        }
    }
}

//! 文本收集器模块
//!
//! 从DOM中按文档顺序收集可翻译的文本节点。收集过程不修改DOM，
//! 并且在任何网络请求开始之前一次性完成。

use markup5ever_rcdom::Handle;

use crate::parsers::html::{get_node_name, get_text_content, has_class, TextNodes};
use crate::translation::config::constants;

/// 文档中的一个文本位置
#[derive(Debug, Clone)]
pub struct TextUnit {
    /// 文本节点
    pub node: Handle,
    /// 直接父节点
    pub parent: Option<Handle>,
    /// 原始文本（未去除首尾空白）
    pub original: String,
}

impl TextUnit {
    /// 去除首尾空白后的文本
    pub fn trimmed(&self) -> &str {
        self.original.trim()
    }
}

/// 文本收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 父元素为这些标签时跳过
    pub skip_elements: Vec<String>,
    /// 已翻译标记元素的类名，其中的文本不再收集
    pub marker_class: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            skip_elements: constants::SKIP_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            marker_class: constants::DEFAULT_MARKER_CLASS.to_string(),
        }
    }
}

/// 收集统计信息
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub nodes_skipped: usize,
    pub units_collected: usize,
}

/// DOM文本收集器
pub struct TextCollector {
    config: CollectorConfig,
    stats: CollectionStats,
}

impl TextCollector {
    /// 创建新的文本收集器
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            stats: CollectionStats::default(),
        }
    }

    /// 收集 `root` 下所有可翻译的文本位置
    pub fn collect_text_units(&mut self, root: &Handle) -> Vec<TextUnit> {
        let mut stats = CollectionStats::default();
        let mut units = Vec::new();

        for (node, parent) in TextNodes::new(root) {
            let original = match get_text_content(&node) {
                Some(original) => original,
                None => continue,
            };
            stats.nodes_visited += 1;

            if !self.is_eligible(&original, parent.as_ref()) {
                stats.nodes_skipped += 1;
                continue;
            }

            units.push(TextUnit {
                node,
                parent,
                original,
            });
        }

        stats.units_collected = units.len();
        tracing::debug!(
            "文本收集完成: 访问 {} 个文本节点，跳过 {} 个，收集 {} 个",
            stats.nodes_visited,
            stats.nodes_skipped,
            stats.units_collected
        );
        self.stats = stats;

        units
    }

    /// 获取最近一次收集的统计信息
    pub fn get_stats(&self) -> &CollectionStats {
        &self.stats
    }

    fn is_eligible(&self, text: &str, parent: Option<&Handle>) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let parent = match parent {
            Some(parent) => parent,
            None => return true,
        };

        if let Some(tag_name) = get_node_name(parent) {
            if self
                .config
                .skip_elements
                .iter()
                .any(|skip| skip.eq_ignore_ascii_case(tag_name))
            {
                return false;
            }
        }

        !has_class(parent, &self.config.marker_class)
    }
}

impl Default for TextCollector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

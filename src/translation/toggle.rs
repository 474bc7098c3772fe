//! 翻译开关
//!
//! 开关信号的格式与页面脚本保持一致：
//!
//! ```json
//! { "action": "TOGGLE_TRANSLATION", "enabled": true }
//! ```
//!
//! 每次状态切换都会推进 [`PassGeneration`]，正在进行的翻译过程持有的
//! [`PassToken`] 随即失效，在下一次请求或DOM修改之前停止。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use markup5ever_rcdom::RcDom;
use serde::{Deserialize, Serialize};

use crate::translation::core::{PassReport, TranslationEngine, Translator};
use crate::translation::marks::RestorationLedger;

/// 开关状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    #[default]
    Disabled,
    Enabled,
}

impl ToggleState {
    pub fn is_enabled(self) -> bool {
        self == ToggleState::Enabled
    }
}

impl From<bool> for ToggleState {
    fn from(enabled: bool) -> Self {
        if enabled {
            ToggleState::Enabled
        } else {
            ToggleState::Disabled
        }
    }
}

impl std::fmt::Display for ToggleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToggleState::Disabled => write!(f, "disabled"),
            ToggleState::Enabled => write!(f, "enabled"),
        }
    }
}

/// 开关信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ToggleSignal {
    #[serde(rename = "TOGGLE_TRANSLATION")]
    ToggleTranslation { enabled: bool },
}

impl ToggleSignal {
    pub fn new(enabled: bool) -> Self {
        ToggleSignal::ToggleTranslation { enabled }
    }

    /// 信号要求的目标状态
    pub fn target_state(&self) -> ToggleState {
        match self {
            ToggleSignal::ToggleTranslation { enabled } => ToggleState::from(*enabled),
        }
    }
}

/// 翻译过程代数
///
/// 克隆共享同一个计数器，可以从其他线程推进。
#[derive(Debug, Clone, Default)]
pub struct PassGeneration(Arc<AtomicU64>);

impl PassGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进代数，使所有已发出的令牌失效
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 开始新的过程并返回它的令牌
    pub fn begin(&self) -> PassToken {
        let value = self.advance();
        PassToken {
            generation: Arc::clone(&self.0),
            value,
        }
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// 单个翻译过程持有的令牌
#[derive(Debug, Clone)]
pub struct PassToken {
    generation: Arc<AtomicU64>,
    value: u64,
}

impl PassToken {
    /// 过程是否仍然有效
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.value
    }
}

/// 开关切换结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub previous: ToggleState,
    pub state: ToggleState,
    pub changed: bool,
    pub report: PassReport,
}

/// 一个页面的翻译会话
///
/// 会话独占文档、原文记录和开关状态。
pub struct PageSession<T: Translator> {
    dom: RcDom,
    engine: TranslationEngine<T>,
    ledger: RestorationLedger,
    state: ToggleState,
    generation: PassGeneration,
}

impl<T: Translator> PageSession<T> {
    pub fn new(dom: RcDom, engine: TranslationEngine<T>) -> Self {
        Self::with_generation(dom, engine, PassGeneration::new())
    }

    /// 使用外部共享的代数计数器
    pub fn with_generation(
        dom: RcDom,
        engine: TranslationEngine<T>,
        generation: PassGeneration,
    ) -> Self {
        Self {
            dom,
            engine,
            ledger: RestorationLedger::new(),
            state: ToggleState::Disabled,
            generation,
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    pub fn into_dom(self) -> RcDom {
        self.dom
    }

    pub fn generation(&self) -> &PassGeneration {
        &self.generation
    }

    pub fn ledger(&self) -> &RestorationLedger {
        &self.ledger
    }

    /// 处理开关信号；目标状态与当前状态相同时不做任何事
    pub async fn handle_signal(&mut self, signal: ToggleSignal) -> ToggleOutcome {
        let previous = self.state;
        let target = signal.target_state();

        if target == previous {
            tracing::debug!("翻译已处于 {} 状态，忽略信号", previous);
            return ToggleOutcome {
                previous,
                state: previous,
                changed: false,
                report: PassReport::default(),
            };
        }

        let report = match target {
            ToggleState::Enabled => self.enable().await,
            ToggleState::Disabled => self.disable(),
        };

        ToggleOutcome {
            previous,
            state: self.state,
            changed: true,
            report,
        }
    }

    /// 开启翻译并执行一次翻译过程
    pub async fn enable(&mut self) -> PassReport {
        self.state = ToggleState::Enabled;
        let token = self.generation.begin();
        self.engine
            .translate_document(&self.dom, &mut self.ledger, &token)
            .await
    }

    /// 关闭翻译，取消进行中的过程并还原所有标记
    pub fn disable(&mut self) -> PassReport {
        self.state = ToggleState::Disabled;
        self.generation.advance();
        self.engine.restore_document(&self.dom, &mut self.ledger)
    }
}

//! 页面工作线程
//!
//! DOM 句柄不能跨线程传递，因此文档和翻译会话都留在一个专用线程上，
//! 该线程运行单线程 tokio 运行时，通过 `mpsc` 接收命令、通过 `oneshot` 回复。

use tokio::sync::{mpsc, oneshot};

use crate::core::PageDocument;
use crate::parsers::html::serialize_document;
use crate::translation::{
    EngineConfig, HttpTranslator, PageSession, PassGeneration, ToggleOutcome, ToggleSignal,
    ToggleState, TranslationConfig, TranslationEngine, TranslationError, TranslationResult,
};

const COMMAND_BUFFER: usize = 16;

/// 发往页面工作线程的命令
#[derive(Debug)]
pub enum PageCommand {
    /// 处理开关信号
    Toggle {
        signal: ToggleSignal,
        reply: oneshot::Sender<ToggleOutcome>,
    },
    /// 以 UTF-8 序列化当前文档
    Snapshot {
        reply: oneshot::Sender<TranslationResult<Vec<u8>>>,
    },
    /// 查询会话的开关状态
    State { reply: oneshot::Sender<ToggleState> },
}

/// 启动页面工作线程
///
/// 文档在工作线程上解析；解析失败时返回错误，线程随即退出。
pub async fn spawn_page_worker(
    document: Vec<u8>,
    encoding: Option<String>,
    config: TranslationConfig,
    generation: PassGeneration,
) -> TranslationResult<mpsc::Sender<PageCommand>> {
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    let (ready_tx, ready_rx) = oneshot::channel();

    std::thread::Builder::new()
        .name("page-worker".to_string())
        .spawn(move || run_worker(document, encoding, config, generation, receiver, ready_tx))?;

    ready_rx
        .await
        .map_err(|_| TranslationError::StateError("页面工作线程启动失败".to_string()))??;

    Ok(sender)
}

fn run_worker(
    document: Vec<u8>,
    encoding: Option<String>,
    config: TranslationConfig,
    generation: PassGeneration,
    mut receiver: mpsc::Receiver<PageCommand>,
    ready: oneshot::Sender<TranslationResult<()>>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = ready.send(Err(e.into()));
            return;
        }
    };

    runtime.block_on(async move {
        let session = PageDocument::parse(&document, encoding.as_deref()).and_then(|page| {
            let translator = HttpTranslator::new(&config)?;
            tracing::info!("翻译服务地址: {}", translator.api_url());
            let engine = TranslationEngine::new(translator, EngineConfig::from(&config));
            Ok(PageSession::with_generation(page.dom, engine, generation))
        });

        let mut session = match session {
            Ok(session) => {
                let _ = ready.send(Ok(()));
                session
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        while let Some(command) = receiver.recv().await {
            match command {
                PageCommand::Toggle { signal, reply } => {
                    let outcome = session.handle_signal(signal).await;
                    let _ = reply.send(outcome);
                }
                PageCommand::Snapshot { reply } => {
                    let _ = reply.send(serialize_document(session.dom(), "utf-8"));
                }
                PageCommand::State { reply } => {
                    let _ = reply.send(session.state());
                }
            }
        }

        tracing::debug!("页面工作线程退出");
    });
}

//! 文档级处理
//!
//! 负责字节层面的输入输出：确定文档编码、解析、交给翻译会话处理、再按原编码序列化。

use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;

use crate::parsers::html::{get_charset, html_to_dom, serialize_document};
use crate::translation::{
    EngineConfig, PageSession, PassReport, RestorationLedger, ToggleSignal, TranslationEngine,
    TranslationResult, Translator,
};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 已解析的文档及其编码
pub struct PageDocument {
    pub dom: RcDom,
    pub encoding: String,
}

impl PageDocument {
    /// 解析文档
    ///
    /// 未指定编码时先按 UTF-8 解析，若文档声明了可识别的字符集则按声明的字符集重新解析
    pub fn parse(input_data: &[u8], input_encoding: Option<&str>) -> TranslationResult<Self> {
        if let Some(encoding) = input_encoding {
            return Ok(Self {
                dom: html_to_dom(input_data, encoding)?,
                encoding: encoding.to_string(),
            });
        }

        let mut document_encoding = "utf-8".to_string();
        let mut dom = html_to_dom(input_data, &document_encoding)?;

        if let Some(html_charset) = get_charset(&dom.document) {
            if let Some(charset) = Encoding::for_label_no_replacement(html_charset.as_bytes()) {
                if charset != encoding_rs::UTF_8 {
                    tracing::debug!("文档声明字符集 {}，重新解析", charset.name());
                    document_encoding = charset.name().to_string();
                    dom = html_to_dom(input_data, &document_encoding)?;
                }
            }
        }

        Ok(Self {
            dom,
            encoding: document_encoding,
        })
    }

    /// 按文档编码序列化
    pub fn to_bytes(&self) -> TranslationResult<Vec<u8>> {
        serialize_document(&self.dom, &self.encoding)
    }
}

/// 翻译一个HTML文档，返回序列化结果和过程统计
pub async fn translate_html<T: Translator>(
    input_data: &[u8],
    input_encoding: Option<&str>,
    translator: T,
    config: EngineConfig,
) -> TranslationResult<(Vec<u8>, PassReport)> {
    let PageDocument { dom, encoding } = PageDocument::parse(input_data, input_encoding)?;

    let mut session = PageSession::new(dom, TranslationEngine::new(translator, config));
    let outcome = session.handle_signal(ToggleSignal::new(true)).await;

    let output = serialize_document(session.dom(), &encoding)?;
    Ok((output, outcome.report))
}

/// 还原HTML文档中的所有翻译标记，返回序列化结果和还原数量
///
/// 原文取自标记元素的 `data-original` 属性
pub fn restore_html(
    input_data: &[u8],
    input_encoding: Option<&str>,
    marker_class: &str,
) -> TranslationResult<(Vec<u8>, usize)> {
    let document = PageDocument::parse(input_data, input_encoding)?;
    let mut ledger = RestorationLedger::new();

    let restored =
        crate::translation::restore_marks(&document.dom.document, marker_class, &mut ledger);
    tracing::info!("已还原 {} 个标记", restored);

    Ok((document.to_bytes()?, restored))
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

/// Prints an info message to stderr
pub fn print_info_message(msg: &str) {
    eprintln!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::constants::DEFAULT_MARKER_CLASS;

    #[test]
    fn test_declared_charset_is_used() {
        let mut html = b"<html><head><meta charset=\"windows-1252\"></head><body><p>caf".to_vec();
        html.push(0xE9);
        html.extend_from_slice(b"</p></body></html>");

        let document = PageDocument::parse(&html, None).unwrap();
        assert_eq!(document.encoding, "windows-1252");

        let output = document.to_bytes().unwrap();
        assert!(output.contains(&0xE9));
    }

    #[test]
    fn test_restore_html_from_attributes() {
        let html = "<html><head></head><body><p><span class=\"hindi-translation\" data-original=\"Hello\">नमस्ते</span></p></body></html>";

        let (output, restored) = restore_html(html.as_bytes(), None, DEFAULT_MARKER_CLASS).unwrap();
        assert_eq!(restored, 1);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "<html><head></head><body><p>Hello</p></body></html>"
        );
    }
}

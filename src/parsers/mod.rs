//! # 解析器模块
//!
//! HTML文档解析、DOM操作与序列化。
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、文本节点遍历

pub mod html;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, serialize_document, TextNodes};

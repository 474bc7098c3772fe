//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（解析、查找、替换节点、属性读写）
//! - `metadata`: 文档元数据（字符集）
//! - `serializer`: 序列化功能
//! - `walker`: 文本节点遍历

pub mod dom;
pub mod metadata;
pub mod serializer;
pub mod walker;

pub use dom::{
    append_child, create_element_with_text, create_text_node, find_nodes, find_nodes_by_class,
    get_body_or_document, get_node_attr, get_node_name, get_parent_node, get_text_content,
    has_class, html_to_dom, replace_node, set_node_attr,
};
pub use metadata::get_charset;
pub use serializer::serialize_document;
pub use walker::TextNodes;

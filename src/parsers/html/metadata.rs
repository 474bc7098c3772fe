//! HTML 元数据
//!
//! 从 `<meta>` 标签中读取文档声明的字符集

use markup5ever_rcdom::Handle;

use super::dom::{find_nodes, get_node_attr};

/// 获取文档声明的字符集
///
/// 支持 `<meta charset="...">` 和
/// `<meta http-equiv="content-type" content="text/html; charset=...">` 两种格式
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, vec!["html", "head", "meta"]).iter() {
        if let Some(charset) = get_node_attr(meta_node, "charset") {
            return Some(charset.trim().to_string());
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                return charset_from_content_type(&content);
            }
        }
    }

    None
}

/// 从 Content-Type 值中提取 charset 参数
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

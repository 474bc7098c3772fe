//! 文本节点遍历器
//!
//! 以文档顺序（深度优先、先序）惰性地产出根节点下的所有文本节点。
//! 遍历使用显式栈，不受递归深度限制；迭代器只能消费一次。
//!
//! ```rust
//! use page_translator::parsers::html::{html_to_dom, TextNodes};
//!
//! let dom = html_to_dom(b"<p>Hello <b>World</b></p>", "utf-8").unwrap();
//! let texts: Vec<String> = TextNodes::new(&dom.document)
//!     .filter_map(|(node, _)| page_translator::parsers::html::get_text_content(&node))
//!     .collect();
//! assert_eq!(texts, vec!["Hello ", "World"]);
//! ```

use markup5ever_rcdom::{Handle, NodeData};

/// 文本节点迭代器，产出 `(文本节点, 父节点)`
pub struct TextNodes {
    stack: Vec<(Handle, Option<Handle>)>,
}

impl TextNodes {
    /// 从 `root` 开始遍历，`root` 本身也参与判断
    pub fn new(root: &Handle) -> Self {
        Self {
            stack: vec![(root.clone(), None)],
        }
    }
}

impl Iterator for TextNodes {
    type Item = (Handle, Option<Handle>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, parent)) = self.stack.pop() {
            if let NodeData::Text { .. } = node.data {
                return Some((node, parent));
            }

            // Push in reverse so the first child is visited first
            for child in node.children.borrow().iter().rev() {
                self.stack.push((child.clone(), Some(node.clone())));
            }
        }

        None
    }
}

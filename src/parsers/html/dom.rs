use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::translation::error::{TranslationError, TranslationResult};

/// 将 HTML 字节转换为 DOM
///
/// `document_encoding` 为空或无法识别时按 UTF-8 处理
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> TranslationResult<RcDom> {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| TranslationError::ParseError(format!("HTML解析失败: {}", e)))
}

/// 查找指定路径的DOM节点
///
/// 遍历使用显式栈，结果按文档顺序排列
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    assert!(!node_names.is_empty());

    let mut found_nodes = Vec::new();
    let last = node_names.len() - 1;
    let mut stack = vec![(node.clone(), 0)];

    while let Some((node, depth)) = stack.pop() {
        let matches = get_node_name(&node) == Some(node_names[depth]);

        if depth == last {
            if matches {
                found_nodes.push(node.clone());
            }
        } else if matches {
            stack.push((node, depth + 1));
            continue;
        }

        for child_node in node.children.borrow().iter().rev() {
            stack.push((child_node.clone(), depth));
        }
    }

    found_nodes
}

/// 查找 class 列表中包含 `class_name` 的所有元素
pub fn find_nodes_by_class(node: &Handle, class_name: &str) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let mut stack = vec![node.clone()];

    while let Some(node) = stack.pop() {
        if has_class(&node, class_name) {
            found_nodes.push(node.clone());
        }

        for child_node in node.children.borrow().iter().rev() {
            stack.push(child_node.clone());
        }
    }

    found_nodes
}

/// 检查元素的 class 属性是否包含指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 获取文档的 BODY 元素，不存在时返回文档根节点
///
/// 只检查 `document > html > body` 这一条路径
pub fn get_body_or_document(dom: &RcDom) -> Handle {
    child_element(&dom.document, "html")
        .and_then(|html| child_element(&html, "body"))
        .unwrap_or_else(|| dom.document.clone())
}

/// 第一个名为 `tag_name` 的直接子元素
fn child_element(parent: &Handle, tag_name: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| get_node_name(child) == Some(tag_name))
        .cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// 读取后会把弱引用放回去，不会破坏树结构
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 获取文本节点的内容
pub fn get_text_content(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 创建文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 创建带属性和单个文本子节点的元素
pub fn create_element_with_text(
    dom: &RcDom,
    tag_name: &str,
    attrs: &[(&str, &str)],
    text: &str,
) -> Handle {
    let element = create_element(
        dom,
        QualName::new(None, ns!(html), LocalName::from(tag_name)),
        attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: format_tendril!("{}", value),
            })
            .collect(),
    );

    append_child(&element, create_text_node(text));

    element
}

/// 追加子节点并设置父引用
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 在父节点中用 `new_node` 原位替换 `old_node`
///
/// 返回 `false` 表示 `old_node` 已经脱离文档（没有父节点或不在父节点的子列表中）
pub fn replace_node(old_node: &Handle, new_node: Handle) -> bool {
    let parent = match get_parent_node(old_node) {
        Some(parent) => parent,
        None => return false,
    };

    let mut children = parent.children.borrow_mut();
    let position = match children.iter().position(|c| Rc::ptr_eq(c, old_node)) {
        Some(position) => position,
        None => return false,
    };

    new_node.parent.set(Some(Rc::downgrade(&parent)));
    children[position] = new_node;
    old_node.parent.set(None);

    true
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

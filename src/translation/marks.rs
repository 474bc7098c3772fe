//! 翻译标记与还原
//!
//! 译文通过标记元素替换原文本节点：
//!
//! ```text
//! <span class="hindi-translation" data-translation-id="3" data-original="Hello">नमस्ते</span>
//! ```
//!
//! 原文首先记录在 [`RestorationLedger`] 中（以标记编号为键，并绑定到创建的标记元素），
//! 同时写入 `data-original` 属性，使序列化后的文档在另一个进程中也能还原。
//! 文档中已有的标记编号不会被重复分配。

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, Node, RcDom};

use crate::parsers::html::{
    create_element_with_text, create_text_node, find_nodes_by_class, get_node_attr, replace_node,
};
use crate::translation::config::constants;
use crate::translation::pipeline::collector::TextUnit;

#[derive(Debug)]
struct LedgerEntry {
    original: String,
    element: Weak<Node>,
}

/// 标记编号到原文的映射
#[derive(Debug, Default)]
pub struct RestorationLedger {
    entries: HashMap<u64, LedgerEntry>,
    next_id: u64,
}

impl RestorationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 跳过 `root` 下已有标记使用的编号
    pub fn reserve_existing(&mut self, root: &Handle, marker_class: &str) {
        let highest = find_nodes_by_class(root, marker_class)
            .iter()
            .filter_map(|element| get_node_attr(element, constants::MARK_ID_ATTR))
            .filter_map(|id| id.parse::<u64>().ok())
            .max();

        if let Some(highest) = highest {
            self.next_id = self.next_id.max(highest.saturating_add(1));
        }
    }

    /// 分配新的标记编号
    pub fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 记录标记元素及其原文
    pub fn record(&mut self, id: u64, original: &str, element: &Handle) {
        self.entries.insert(
            id,
            LedgerEntry {
                original: original.to_string(),
                element: Rc::downgrade(element),
            },
        );
    }

    /// 取出并删除 `element` 对应的原文
    ///
    /// 编号相同但不是本记录创建的元素不会命中
    pub fn take(&mut self, id: u64, element: &Handle) -> Option<String> {
        let owned = self
            .entries
            .get(&id)
            .and_then(|entry| entry.element.upgrade())
            .is_some_and(|recorded| Rc::ptr_eq(&recorded, element));

        if owned {
            self.entries.remove(&id).map(|entry| entry.original)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 把一组译文应用到对应的文本位置上，返回创建的标记数
///
/// 第 i 个译文对应第 i 个文本位置；译文为空或缺失的位置保持不变。
pub fn apply_translations(
    dom: &RcDom,
    units: &[TextUnit],
    translations: &[String],
    marker_class: &str,
    ledger: &mut RestorationLedger,
) -> usize {
    let mut marked = 0;

    for (index, unit) in units.iter().enumerate() {
        let translated = match translations.get(index) {
            Some(translated) if !translated.is_empty() => translated,
            _ => continue,
        };

        let id = ledger.allocate();
        let id_value = id.to_string();
        let span = create_element_with_text(
            dom,
            constants::MARKER_TAG,
            &[
                ("class", marker_class),
                (constants::MARK_ID_ATTR, id_value.as_str()),
                (constants::ORIGINAL_ATTR, unit.original.as_str()),
            ],
            translated,
        );

        if replace_node(&unit.node, span.clone()) {
            ledger.record(id, &unit.original, &span);
            marked += 1;
        } else {
            // Node was detached from the document since collection
            tracing::debug!("文本节点已脱离文档，跳过: {:?}", unit.trimmed());
        }
    }

    marked
}

/// 把 `root` 下所有标记元素还原为原文本节点，返回还原的数量
///
/// 原文优先取自 `ledger`，其次取 `data-original` 属性；两者都没有的标记保持不变。
pub fn restore_marks(root: &Handle, marker_class: &str, ledger: &mut RestorationLedger) -> usize {
    let mut restored = 0;

    for element in find_nodes_by_class(root, marker_class) {
        let from_ledger = get_node_attr(&element, constants::MARK_ID_ATTR)
            .and_then(|id| id.parse::<u64>().ok())
            .and_then(|id| ledger.take(id, &element));

        let original =
            match from_ledger.or_else(|| get_node_attr(&element, constants::ORIGINAL_ATTR)) {
                Some(original) => original,
                None => {
                    tracing::warn!("标记元素缺少原文，无法还原");
                    continue;
                }
            };

        if replace_node(&element, create_text_node(&original)) {
            restored += 1;
        }
    }

    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{get_body_or_document, html_to_dom, serialize_document};
    use crate::translation::pipeline::collector::TextCollector;

    const MARKER: &str = constants::DEFAULT_MARKER_CLASS;

    fn body_html(dom: &RcDom) -> String {
        let html = String::from_utf8(serialize_document(dom, "utf-8").unwrap()).unwrap();
        let start = html.find("<body>").unwrap() + "<body>".len();
        let end = html.find("</body>").unwrap();
        html[start..end].to_string()
    }

    #[test]
    fn test_apply_and_restore_round_trip() {
        let dom = html_to_dom(b"<body><p> Hello </p><p>World</p></body>", "utf-8").unwrap();
        let units = TextCollector::default().collect_text_units(&get_body_or_document(&dom));
        let mut ledger = RestorationLedger::new();

        let marked = apply_translations(
            &dom,
            &units,
            &["Namaste".to_string(), "Duniya".to_string()],
            MARKER,
            &mut ledger,
        );
        assert_eq!(marked, 2);
        assert_eq!(ledger.len(), 2);
        assert_eq!(
            body_html(&dom),
            "<p><span class=\"hindi-translation\" data-translation-id=\"0\" data-original=\" Hello \">Namaste</span></p>\
             <p><span class=\"hindi-translation\" data-translation-id=\"1\" data-original=\"World\">Duniya</span></p>"
        );

        let restored = restore_marks(&dom.document, MARKER, &mut ledger);
        assert_eq!(restored, 2);
        assert!(ledger.is_empty());
        assert_eq!(body_html(&dom), "<p> Hello </p><p>World</p>");
    }

    #[test]
    fn test_empty_translation_leaves_node() {
        let dom = html_to_dom(b"<body><p>Hello</p><p>World</p></body>", "utf-8").unwrap();
        let units = TextCollector::default().collect_text_units(&dom.document);
        let mut ledger = RestorationLedger::new();

        let marked = apply_translations(
            &dom,
            &units,
            &[String::new(), "Duniya".to_string()],
            MARKER,
            &mut ledger,
        );

        assert_eq!(marked, 1);
        assert!(body_html(&dom).starts_with("<p>Hello</p>"));
    }

    #[test]
    fn test_missing_tail_translations_leave_nodes() {
        let dom = html_to_dom(b"<body><p>a</p><p>b</p><p>c</p></body>", "utf-8").unwrap();
        let units = TextCollector::default().collect_text_units(&dom.document);
        let mut ledger = RestorationLedger::new();

        let marked = apply_translations(&dom, &units, &["A".to_string()], MARKER, &mut ledger);

        assert_eq!(marked, 1);
        assert!(body_html(&dom).ends_with("<p>b</p><p>c</p>"));
    }

    #[test]
    fn test_restore_from_attribute_without_ledger() {
        let dom = html_to_dom(
            "<body><p><span class=\"hindi-translation\" data-translation-id=\"7\" data-original=\"Hello\">नमस्ते</span></p></body>"
                .as_bytes(),
            "utf-8",
        )
        .unwrap();
        let mut ledger = RestorationLedger::new();

        assert_eq!(restore_marks(&dom.document, MARKER, &mut ledger), 1);
        assert_eq!(body_html(&dom), "<p>Hello</p>");
    }

    #[test]
    fn test_ledger_takes_precedence_over_attribute() {
        let dom = html_to_dom(b"<body><p>Hello</p></body>", "utf-8").unwrap();
        let units = TextCollector::default().collect_text_units(&dom.document);
        let mut ledger = RestorationLedger::new();
        apply_translations(&dom, &units, &["Namaste".to_string()], MARKER, &mut ledger);

        // Tamper with the DOM copy; the ledger still holds the real original
        let span = find_nodes_by_class(&dom.document, MARKER)[0].clone();
        crate::parsers::html::set_node_attr(
            &span,
            constants::ORIGINAL_ATTR,
            Some("tampered".to_string()),
        );

        restore_marks(&dom.document, MARKER, &mut ledger);
        assert_eq!(body_html(&dom), "<p>Hello</p>");
    }

    #[test]
    fn test_ledger_ignores_foreign_mark_with_same_id() {
        let dom = html_to_dom(
            "<body><p><span class=\"hindi-translation\" data-translation-id=\"0\" data-original=\"Old\">पुराना</span></p><p>Hello</p></body>"
                .as_bytes(),
            "utf-8",
        )
        .unwrap();
        let units = TextCollector::default().collect_text_units(&dom.document);
        assert_eq!(units.len(), 1);

        // Without reserving, the new mark reuses id 0
        let mut ledger = RestorationLedger::new();
        apply_translations(&dom, &units, &["Namaste".to_string()], MARKER, &mut ledger);

        assert_eq!(restore_marks(&dom.document, MARKER, &mut ledger), 2);
        assert_eq!(body_html(&dom), "<p>Old</p><p>Hello</p>");
    }

    #[test]
    fn test_reserve_existing_skips_used_ids() {
        let dom = html_to_dom(
            b"<body><span class=\"hindi-translation\" data-translation-id=\"4\" data-original=\"a\">A</span>\
              <span class=\"hindi-translation\" data-translation-id=\"x\" data-original=\"b\">B</span></body>",
            "utf-8",
        )
        .unwrap();
        let mut ledger = RestorationLedger::new();

        ledger.reserve_existing(&dom.document, MARKER);
        assert_eq!(ledger.allocate(), 5);

        // Reserving never moves the counter backwards
        ledger.reserve_existing(&dom.document, MARKER);
        assert_eq!(ledger.allocate(), 6);
    }

    #[test]
    fn test_restore_is_idempotent() {
        let dom = html_to_dom(b"<body><p>Hello</p></body>", "utf-8").unwrap();
        let units = TextCollector::default().collect_text_units(&dom.document);
        let mut ledger = RestorationLedger::new();
        apply_translations(&dom, &units, &["Namaste".to_string()], MARKER, &mut ledger);

        assert_eq!(restore_marks(&dom.document, MARKER, &mut ledger), 1);
        let once = body_html(&dom);
        assert_eq!(restore_marks(&dom.document, MARKER, &mut ledger), 0);
        assert_eq!(body_html(&dom), once);
    }

    #[test]
    fn test_mark_without_original_is_left_alone() {
        let dom = html_to_dom(
            b"<body><span class=\"hindi-translation\">orphan</span></body>",
            "utf-8",
        )
        .unwrap();
        let mut ledger = RestorationLedger::new();

        assert_eq!(restore_marks(&dom.document, MARKER, &mut ledger), 0);
        assert!(body_html(&dom).contains("orphan"));
    }
}

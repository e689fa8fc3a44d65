//! ListReconstructor: markdown list items → block-model list items.
//!
//! # The Mapping
//!
//! Each markdown list item holds block children. Paragraph children (and any
//! other text-bearing node) become the item's `content`, joined with `<br>`
//! when there is more than one. A nested list child becomes the item's
//! `items`, reconstructed recursively. When the nested list's style differs
//! from the parent's, the item records it in `style` so the writer can switch
//! bullets at that level.
//!
//! Task items carry their checkbox state into `meta.checked`.
//!
//! An item with no content and no children is dropped. An item with only a
//! nested list is kept with empty content so the nested items survive.

use super::inline::{node_markup, render_inlines};
use crate::document::{ListItem, ListItemMeta, ListStyle};
use crate::ir::{MdList, MdListItem, MdNode};

/// Block-model style of a parsed list.
///
/// A list is a checklist only when every item is a task item.
pub fn list_style(list: &MdList) -> ListStyle {
    if !list.items.is_empty() && list.items.iter().all(|item| item.checked.is_some()) {
        ListStyle::Checklist
    } else if list.ordered {
        ListStyle::Ordered
    } else {
        ListStyle::Unordered
    }
}

/// Reconstruct the items of `list` into block-model list items.
pub fn reconstruct_list(list: &MdList) -> Vec<ListItem> {
    reconstruct_items(&list.items, list_style(list))
}

/// Reconstruct `items`, which belong to a list rendered in `style`.
pub fn reconstruct_items(items: &[MdListItem], style: ListStyle) -> Vec<ListItem> {
    items
        .iter()
        .filter_map(|item| reconstruct_item(item, style))
        .collect()
}

fn reconstruct_item(item: &MdListItem, parent_style: ListStyle) -> Option<ListItem> {
    let mut content = Vec::new();
    let mut nested = Vec::new();
    let mut nested_style = None;

    for child in &item.children {
        match child {
            MdNode::Paragraph { children } => content.push(render_inlines(children)),
            MdNode::List(list) => {
                let style = list_style(list);
                nested_style.get_or_insert(style);
                nested.extend(reconstruct_items(&list.items, style));
            }
            other => {
                log::debug!("flattening {} inside a list item", other.kind());
                content.push(node_markup(other));
            }
        }
    }

    let content = content
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("<br>");

    if content.trim().is_empty() && nested.is_empty() {
        return None;
    }

    Some(ListItem {
        content,
        meta: ListItemMeta {
            checked: item.checked,
        },
        items: nested,
        style: nested_style.filter(|style| *style != parent_style),
    })
}

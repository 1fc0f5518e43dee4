//! Render-ready view models. Nothing here mutates state; the page redraws
//! from these whenever the cart signals a change.

use menu_adapters::{ItemId, MenuItem, Priority};
use serde::Serialize;

use super::cart::SelectionCart;
use super::catalog::Catalog;
use super::category_index::CategoryEntry;
use super::filter::ViewState;
use super::notice::{MessageKey, Notice, Notices};
use super::order_submitter::OrderForm;
use super::table::TableContext;
use crate::config::{DisplayTables, PriorityBadge};

pub const PLACEHOLDER_IMAGE_PATH: &str = "/placeholder.svg";

pub const PLACEHOLDER_SVG: &str = r##"<svg width="300" height="200" viewBox="0 0 300 200" fill="none" xmlns="http://www.w3.org/2000/svg">
<rect width="300" height="200" fill="#F3F4F6"/>
<rect x="125" y="75" width="50" height="50" fill="#9B9B9B" rx="4"/>
<rect x="140" y="90" width="20" height="20" fill="white" rx="2"/>
<text x="150" y="145" text-anchor="middle" fill="#6B7280" font-family="Arial" font-size="14">No Image</text>
</svg>"##;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuCard {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub category: String,
    pub category_name: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<PriorityBadge>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub category: String,
    pub search: String,
    pub cards: Vec<MenuCard>,
    /// True when there is nothing to show, which the page renders as its
    /// empty state.
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartBadge {
    pub item_count: u32,
    pub show_order_button: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TableSection {
    Pinned { table_number: u32 },
    Selector { options: Vec<u32>, selected: Option<u32> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub item_id: ItemId,
    pub name: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub total: f64,
    pub item_count: u32,
    pub badge: CartBadge,
    pub table: TableSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// An order is awaiting the backend; the page disables its submit action.
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNav {
    pub entries: Vec<CategoryEntry>,
}

fn image_or_placeholder(item: &MenuItem) -> String {
    item.image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(PLACEHOLDER_IMAGE_PATH)
        .to_string()
}

pub fn menu_card(item: &MenuItem, tables: &DisplayTables, selected: bool) -> MenuCard {
    MenuCard {
        id: item.id,
        name: item.name.clone(),
        price: item.price,
        image_url: image_or_placeholder(item),
        category: item.category_key(),
        category_name: tables.category_name(&item.category),
        priority: item.priority,
        badge: tables.badge(item.priority).cloned(),
        selected,
    }
}

pub fn menu_view(
    catalog: &Catalog,
    view: &ViewState,
    cart: &SelectionCart,
    tables: &DisplayTables,
    notices: &Notices,
) -> MenuView {
    let cards: Vec<MenuCard> = view
        .project(catalog.items())
        .into_iter()
        .map(|item| menu_card(item, tables, cart.contains(item.id)))
        .collect();

    MenuView {
        category: view.category.clone(),
        search: view.search.clone(),
        empty: cards.is_empty(),
        cards,
        notice: catalog
            .load_failed()
            .then(|| notices.error(MessageKey::CatalogLoadFailed)),
    }
}

pub fn cart_badge(cart: &SelectionCart) -> CartBadge {
    CartBadge {
        item_count: cart.item_count(),
        show_order_button: !cart.is_empty(),
    }
}

pub fn table_section(table: &TableContext, form: &OrderForm) -> TableSection {
    match table.auto_detected() {
        Some(table_number) => TableSection::Pinned { table_number },
        None => TableSection::Selector {
            options: table.selector_options().collect(),
            selected: form.table_number,
        },
    }
}

pub fn order_summary(cart: &SelectionCart, table: &TableContext, form: &OrderForm) -> OrderSummary {
    OrderSummary {
        lines: cart
            .lines()
            .iter()
            .map(|line| SummaryLine {
                item_id: line.item.id,
                name: line.item.name.clone(),
                image_url: image_or_placeholder(&line.item),
                price: line.item.price,
                quantity: line.quantity,
                line_total: line.line_total(),
            })
            .collect(),
        total: cart.total(),
        item_count: cart.item_count(),
        badge: cart_badge(cart),
        table: table_section(table, form),
        customer_name: form.customer_name(),
        submitting: false,
    }
}

pub fn category_nav(catalog: &Catalog) -> CategoryNav {
    CategoryNav {
        entries: catalog.categories().entries().to_vec(),
    }
}

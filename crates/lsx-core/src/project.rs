//! Projection of raw catalog items into flat rows
//!
//! One raw nested `Item` record goes in, one flat [`Row`] comes out. The
//! raw record is consumed transiently; rows are immutable afterwards and
//! projection is idempotent (same record + same lookup maps = byte-identical
//! row).

use crate::fields::{FieldDescriptor, ValueType};
use crate::json::{normalize_to_list, text};
use crate::lookup::LookupMaps;
use serde_json::Value;

/// Flat rowKey -> value mapping for one exported item
///
/// Keys are always a subset of the catalog's row keys plus `itemID`, in
/// schema order (`serde_json` is built with `preserve_order`).
pub type Row = serde_json::Map<String, Value>;

/// Delimiter between image URLs in an attachment-list value
///
/// Splitting on the same delimiter round-trips the original URL list.
pub const IMAGE_URL_DELIMITER: &str = " | ";

/// Display strings for the boolean-like tax flag
pub const TAX_YES: &str = "Yes";
pub const TAX_NO: &str = "No";

/// Number of subcategory slots; deeper category paths are truncated
pub const SUBCATEGORY_SLOTS: usize = 9;

/// Project one raw item into a flat row for the given schema
///
/// `itemID` is always present. Numeric-typed fields whose non-empty value
/// does not parse as a number are omitted entirely - never emitted as zero
/// or as invalid text.
pub fn project(item: &Value, maps: &LookupMaps, fields: &[&'static FieldDescriptor]) -> Row {
    let mut row = Row::new();
    row.insert(
        "itemID".to_string(),
        Value::String(text(item, "itemID")),
    );

    for descriptor in fields {
        if descriptor.row_key == "itemID" {
            continue;
        }
        let value = row_value(item, maps, descriptor.row_key);
        if descriptor.value_type == ValueType::Number
            && !value.is_empty()
            && value.parse::<f64>().is_err()
        {
            continue;
        }
        row.insert(descriptor.row_key.to_string(), Value::String(value));
    }

    row
}

fn row_value(item: &Value, maps: &LookupMaps, row_key: &str) -> String {
    match row_key {
        "name" => text(item, "description"),
        "cost" => text(item, "defaultCost"),
        "price" => default_price(item),
        "msrp" => msrp(item),
        "vendor_name" => {
            let vendor_id = text(item, "defaultVendorID");
            maps.vendors.get(&vendor_id).cloned().unwrap_or_default()
        },
        "systemSku" | "customSku" | "upc" | "ean" | "manufacturerSku" => text(item, row_key),
        "year" => {
            let year = text(item, "modelYear");
            if year == "0" {
                String::new()
            } else {
                year
            }
        },
        "tax" => {
            if tax_flag(item) {
                TAX_YES.to_string()
            } else {
                TAX_NO.to_string()
            }
        },
        "brand" => {
            let manufacturer_id = text(item, "manufacturerID");
            maps.manufacturers
                .get(&manufacturer_id)
                .cloned()
                .unwrap_or_default()
        },
        "department" => {
            let department_id = text(item, "departmentID");
            maps.departments
                .get(&department_id)
                .cloned()
                .unwrap_or_default()
        },
        "averageCost" => average_cost(item),
        "note" => first_note(item),
        "category" => category_slot(item, maps, 0),
        "image_urls" => image_urls(item).join(IMAGE_URL_DELIMITER),
        "weight" | "length" | "width" | "height" => text(&ecommerce(item), row_key),
        key if key.starts_with("subcategory_") => {
            match key["subcategory_".len()..].parse::<usize>() {
                Ok(slot) if (1..=SUBCATEGORY_SLOTS).contains(&slot) => {
                    category_slot(item, maps, slot)
                },
                _ => String::new(),
            }
        },
        _ => String::new(),
    }
}

/// Position `slot` of the item's category path; missing positions are ""
fn category_slot(item: &Value, maps: &LookupMaps, slot: usize) -> String {
    let category_id = text(item, "categoryID");
    maps.category_paths
        .get(&category_id)
        .and_then(|path| path.get(slot))
        .cloned()
        .unwrap_or_default()
}

/// Default retail price from `Prices.ItemPrice`
///
/// The entry whose `useType` is "Default" wins; with no such entry the
/// first one is used.
fn default_price(item: &Value) -> String {
    let prices = price_entries(item);
    for price in &prices {
        if text(price, "useType") == "Default" {
            return text(price, "amount");
        }
    }
    prices.first().map(|p| text(p, "amount")).unwrap_or_default()
}

/// MSRP from `Prices.ItemPrice` (`useType` "MSRP"); "" when absent
fn msrp(item: &Value) -> String {
    price_entries(item)
        .iter()
        .find(|price| text(price, "useType") == "MSRP")
        .map(|price| text(price, "amount"))
        .unwrap_or_default()
}

fn price_entries(item: &Value) -> Vec<Value> {
    normalize_to_list(item.get("Prices").and_then(|p| p.get("ItemPrice")))
}

/// Average cost from `ItemShops.ItemShop`
///
/// Shop id 0 is the all-shops aggregate record; with no such record the
/// first shop entry is used.
fn average_cost(item: &Value) -> String {
    let shops = normalize_to_list(item.get("ItemShops").and_then(|s| s.get("ItemShop")));
    for shop in &shops {
        if text(shop, "shopID") == "0" {
            return text(shop, "averageCost");
        }
    }
    shops
        .first()
        .map(|shop| text(shop, "averageCost"))
        .unwrap_or_default()
}

/// First non-empty note text from the `Note` relation
fn first_note(item: &Value) -> String {
    let container = item.get("Note");
    let mut entries = normalize_to_list(container.and_then(|c| c.get("Note")));
    if entries.is_empty() {
        entries = normalize_to_list(container);
    }
    entries
        .iter()
        .map(|entry| text(entry, "note"))
        .find(|note| !note.is_empty())
        .unwrap_or_default()
}

/// The `ItemECommerce` relation entry, or Null when absent
///
/// Sometimes the relation arrives as the entry itself, sometimes wrapped in
/// another object or list.
fn ecommerce(item: &Value) -> Value {
    let container = item
        .get("ItemECommerce")
        .or_else(|| item.get("itemECommerce"));
    let Some(container) = container else {
        return Value::Null;
    };

    if container.get("itemECommerceID").is_some() {
        return container.clone();
    }

    let nested = container
        .get("ItemECommerce")
        .or_else(|| container.get("itemECommerce"));
    normalize_to_list(nested)
        .into_iter()
        .next()
        .unwrap_or(Value::Null)
}

/// Resolve each image entry to a URL, preserving source order
///
/// Lightspeed serves images as `baseImageURL` + `publicID`; a plain `url`
/// field is the fallback shape.
pub fn image_urls(item: &Value) -> Vec<String> {
    let container = item.get("Image").or_else(|| item.get("Images"));
    let entries = match container {
        Some(Value::Object(object)) => {
            let inner = object.get("Image").or_else(|| object.get("ImageMatrix"));
            normalize_to_list(inner)
        },
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut urls = Vec::new();
    for entry in &entries {
        let base = text(entry, "baseImageURL");
        let public_id = text(entry, "publicID");
        if !base.is_empty() && !public_id.is_empty() {
            urls.push(format!("{}/{}", base.trim_end_matches('/'), public_id));
        } else {
            let url = text(entry, "url");
            if !url.is_empty() {
                urls.push(url);
            }
        }
    }
    urls
}

fn tax_flag(item: &Value) -> bool {
    match item.get("tax") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

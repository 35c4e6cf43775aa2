//! Static registry of exportable fields
//!
//! The single source of truth for field-id validity: selection, projection,
//! and destination schema building all take descriptors from [`resolve`]
//! and never validate ids themselves.

use crate::lookup::LookupKind;

/// Destination value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Single line of text
    Text,
    /// Numeric value; unparseable source text is omitted from rows
    Number,
    /// Ordered list of attachment URLs, joined with [`crate::project::IMAGE_URL_DELIMITER`]
    AttachmentList,
}

/// One exportable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Selection key, unique in the catalog
    pub id: &'static str,
    /// Destination column name
    pub display_name: &'static str,
    /// Destination value type
    pub value_type: ValueType,
    /// Key of this field's value in a projected row
    pub row_key: &'static str,
}

/// Item relations that must be explicitly requested from the source API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Images,
    ItemShops,
    Note,
    ItemEcommerce,
}

impl Relation {
    /// Wire name for the `load_relations` parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Images => "Images",
            Relation::ItemShops => "ItemShops",
            Relation::Note => "Note",
            Relation::ItemEcommerce => "ItemECommerce",
        }
    }
}

/// Fields exported when the caller selects nothing valid
pub const DEFAULT_FIELD_IDS: &[&str] = &["name", "cost", "price", "vendor_name", "image"];

const fn field(
    id: &'static str,
    display_name: &'static str,
    value_type: ValueType,
    row_key: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        display_name,
        value_type,
        row_key,
    }
}

/// Every exportable field, in catalog order
pub const AVAILABLE_FIELDS: &[FieldDescriptor] = &[
    field("name", "Name", ValueType::Text, "name"),
    field("cost", "Cost", ValueType::Number, "cost"),
    field("price", "Price", ValueType::Number, "price"),
    field("vendor_name", "Vendor Name", ValueType::Text, "vendor_name"),
    field("image", "Image", ValueType::AttachmentList, "image_urls"),
    field("itemID", "Item ID", ValueType::Text, "itemID"),
    field("systemSku", "System SKU", ValueType::Text, "systemSku"),
    field("customSku", "Custom SKU", ValueType::Text, "customSku"),
    field("upc", "UPC", ValueType::Text, "upc"),
    field("ean", "EAN", ValueType::Text, "ean"),
    field(
        "manufacturerSku",
        "Manufacture SKU",
        ValueType::Text,
        "manufacturerSku",
    ),
    field("year", "Year", ValueType::Text, "year"),
    field("tax", "Tax", ValueType::Text, "tax"),
    field("brand", "Brand", ValueType::Text, "brand"),
    field("department", "Department", ValueType::Text, "department"),
    field("msrp", "MSRP", ValueType::Number, "msrp"),
    field("averageCost", "Average Cost", ValueType::Number, "averageCost"),
    field("note", "Note", ValueType::Text, "note"),
    field("category", "Category", ValueType::Text, "category"),
    field("subcategory_1", "Subcategory 1", ValueType::Text, "subcategory_1"),
    field("subcategory_2", "Subcategory 2", ValueType::Text, "subcategory_2"),
    field("subcategory_3", "Subcategory 3", ValueType::Text, "subcategory_3"),
    field("subcategory_4", "Subcategory 4", ValueType::Text, "subcategory_4"),
    field("subcategory_5", "Subcategory 5", ValueType::Text, "subcategory_5"),
    field("subcategory_6", "Subcategory 6", ValueType::Text, "subcategory_6"),
    field("subcategory_7", "Subcategory 7", ValueType::Text, "subcategory_7"),
    field("subcategory_8", "Subcategory 8", ValueType::Text, "subcategory_8"),
    field("subcategory_9", "Subcategory 9", ValueType::Text, "subcategory_9"),
    field("weight", "Weight", ValueType::Number, "weight"),
    field("length", "Length", ValueType::Number, "length"),
    field("width", "Width", ValueType::Number, "width"),
    field("height", "Height", ValueType::Number, "height"),
];

/// The full catalog, in order
pub fn available_fields() -> &'static [FieldDescriptor] {
    AVAILABLE_FIELDS
}

/// Look up one field by id (case-insensitive)
pub fn find(id: &str) -> Option<&'static FieldDescriptor> {
    AVAILABLE_FIELDS
        .iter()
        .find(|f| f.id.eq_ignore_ascii_case(id.trim()))
}

/// Resolve a field-id selection to an ordered schema
///
/// Ids not in the catalog are silently dropped. If dropping empties the
/// selection, the default selection is substituted - an export schema is
/// never empty.
pub fn resolve(ids: &[&str]) -> Vec<&'static FieldDescriptor> {
    let resolved: Vec<&'static FieldDescriptor> = ids.iter().filter_map(|id| find(id)).collect();
    if resolved.is_empty() {
        DEFAULT_FIELD_IDS
            .iter()
            .filter_map(|id| find(id))
            .collect()
    } else {
        resolved
    }
}

/// Item relations the given schema needs loaded
pub fn relations_required(fields: &[&'static FieldDescriptor]) -> Vec<Relation> {
    let mut relations = Vec::new();
    for descriptor in fields {
        let relation = match descriptor.id {
            "image" => Some(Relation::Images),
            "averageCost" => Some(Relation::ItemShops),
            "note" => Some(Relation::Note),
            "weight" | "length" | "width" | "height" => Some(Relation::ItemEcommerce),
            _ => None,
        };
        if let Some(relation) = relation {
            if !relations.contains(&relation) {
                relations.push(relation);
            }
        }
    }
    relations
}

/// Lookup tables the given schema needs built
pub fn lookups_required(fields: &[&'static FieldDescriptor]) -> Vec<LookupKind> {
    let mut lookups = Vec::new();
    for descriptor in fields {
        let kind = match descriptor.id {
            "vendor_name" => Some(LookupKind::Vendor),
            "brand" => Some(LookupKind::Manufacturer),
            "department" => Some(LookupKind::Department),
            id if id == "category" || id.starts_with("subcategory_") => Some(LookupKind::Category),
            _ => None,
        };
        if let Some(kind) = kind {
            if !lookups.contains(&kind) {
                lookups.push(kind);
            }
        }
    }
    lookups
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in AVAILABLE_FIELDS.iter().enumerate() {
            for b in &AVAILABLE_FIELDS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.row_key, b.row_key);
            }
        }
    }

    #[test]
    fn test_resolve_preserves_order_and_drops_unknown() {
        let fields = resolve(&["price", "bogus", "name"]);
        let ids: Vec<&str> = fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["price", "name"]);
    }

    #[test]
    fn test_resolve_empty_selection_uses_defaults() {
        let fields = resolve(&[]);
        let ids: Vec<&str> = fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, DEFAULT_FIELD_IDS);
    }

    #[test]
    fn test_resolve_all_invalid_uses_defaults() {
        let fields = resolve(&["nope", "nada", ""]);
        let ids: Vec<&str> = fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, DEFAULT_FIELD_IDS);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let fields = resolve(&["ITEMID", "averagecost"]);
        let ids: Vec<&str> = fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["itemID", "averageCost"]);
    }

    #[test]
    fn test_relations_required() {
        let fields = resolve(&["image", "averageCost", "note", "weight", "height", "name"]);
        let relations = relations_required(&fields);
        assert_eq!(
            relations,
            vec![
                Relation::Images,
                Relation::ItemShops,
                Relation::Note,
                Relation::ItemEcommerce
            ]
        );

        let none = relations_required(&resolve(&["name", "upc"]));
        assert!(none.is_empty());
    }

    #[test]
    fn test_lookups_required() {
        let fields = resolve(&["vendor_name", "subcategory_3", "brand", "department"]);
        let lookups = lookups_required(&fields);
        assert_eq!(
            lookups,
            vec![
                LookupKind::Vendor,
                LookupKind::Category,
                LookupKind::Manufacturer,
                LookupKind::Department
            ]
        );

        let category_only = lookups_required(&resolve(&["category"]));
        assert_eq!(category_only, vec![LookupKind::Category]);
    }
}

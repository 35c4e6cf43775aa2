//! `lsx fields` - show the exportable field catalog

use crate::error::Result;
use lsx_core::fields::{available_fields, ValueType, DEFAULT_FIELD_IDS};

pub async fn run() -> Result<()> {
    println!("Exportable fields (pass ids via --fields or AIRTABLE_FIELDS):");
    println!("  {:<18} {:<18} {:<12} default", "id", "display name", "type");
    for descriptor in available_fields() {
        let type_name = match descriptor.value_type {
            ValueType::Text => "text",
            ValueType::Number => "number",
            ValueType::AttachmentList => "attachments",
        };
        let default_marker = if DEFAULT_FIELD_IDS.contains(&descriptor.id) {
            "*"
        } else {
            ""
        };
        println!(
            "  {:<18} {:<18} {:<12} {}",
            descriptor.id, descriptor.display_name, type_name, default_marker
        );
    }
    println!("Fields marked * are exported when no selection is given.");
    Ok(())
}

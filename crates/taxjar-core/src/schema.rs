//! Static declaration of the `transactions` stream.
//!
//! Records are not validated against this schema here; downstream loaders
//! use it to type the columns they create.

use serde_json::{json, Map, Value};

pub const STREAM_NAME: &str = "transactions";

pub const KEY_PROPERTIES: &[&str] = &["transaction_id"];

const STRING: &str = "string";
const INTEGER: &str = "integer";

const TRANSACTION_FIELDS: &[(&str, &str)] = &[
    ("transaction_id", STRING),
    ("transaction_date", STRING),
    ("amount", STRING),
    ("sales_tax", STRING),
    ("from_country", STRING),
    ("to_country", STRING),
    ("user_id", INTEGER),
    ("transaction_reference_id", STRING),
    ("to_zip", STRING),
    ("to_street", STRING),
    ("to_state", STRING),
    ("to_city", STRING),
    ("shipping", STRING),
    ("from_zip", STRING),
    ("from_street", STRING),
    ("from_state", STRING),
    ("from_city", STRING),
    ("exemption_type", STRING),
    ("customer_id", STRING),
    ("provider", STRING),
];

const LINE_ITEM_FIELDS: &[(&str, &str)] = &[
    ("unit_price", STRING),
    ("sales_tax", STRING),
    ("quantity", INTEGER),
    ("product_tax_code", STRING),
    ("product_identifier", STRING),
    ("id", INTEGER),
    ("discount", STRING),
    ("description", STRING),
];

/// JSON schema of one transaction record. Every property is nullable.
pub fn transactions_schema() -> Value {
    let mut properties = nullable_properties(TRANSACTION_FIELDS);
    properties.insert(
        String::from("line_items"),
        json!({
            "type": ["array", "null"],
            "items": {
                "type": ["object", "null"],
                "properties": Value::Object(nullable_properties(LINE_ITEM_FIELDS)),
            },
        }),
    );

    json!({
        "type": "object",
        "properties": Value::Object(properties),
    })
}

/// Discovery catalog listing the single stream this tap provides.
pub fn catalog() -> Value {
    json!({
        "streams": [{
            "tap_stream_id": STREAM_NAME,
            "stream": STREAM_NAME,
            "key_properties": KEY_PROPERTIES,
            "replication_method": "FULL_TABLE",
            "schema": transactions_schema(),
        }]
    })
}

fn nullable_properties(fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, kind)| ((*name).to_owned(), json!({ "type": [kind, "null"] })))
        .collect()
}

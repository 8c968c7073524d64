//! Attribute patch encoding and JSON deep merge.

use saturn_api_models::{AttributeOperation, Attributes};
use serde_json::Value;

/// Translate a flat attribute document into patch operations.
///
/// Lists become a removal of the whole attribute followed by one append per
/// element; every other value becomes a single add-or-update. Output follows
/// the document's key order.
#[must_use]
pub fn attribute_update_ops(attributes: &Attributes) -> Vec<AttributeOperation> {
    attributes
        .iter()
        .flat_map(|(name, value)| match value {
            Value::Array(members) => std::iter::once(AttributeOperation::RemoveAttribute {
                attribute_name: name.clone(),
            })
            .chain(
                members
                    .iter()
                    .map(|member| AttributeOperation::AddListMember {
                        attribute_list_name: name.clone(),
                        new_member: member.clone(),
                    }),
            )
            .collect::<Vec<_>>(),
            other => vec![AttributeOperation::AddUpdateAttribute {
                attribute_name: name.clone(),
                add_update_attribute: other.clone(),
            }],
        })
        .collect()
}

/// Removal operations for each named attribute.
#[must_use]
pub fn attribute_removal_ops<S: AsRef<str>>(names: &[S]) -> Vec<AttributeOperation> {
    names
        .iter()
        .map(|name| AttributeOperation::RemoveAttribute {
            attribute_name: name.as_ref().to_string(),
        })
        .collect()
}

/// Recursively merge `source` into `target`.
///
/// Objects merge key by key and arrays merge index by index; any other source
/// value replaces the target value.
pub fn merge_json(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (index, value) in source.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => merge_json(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}

//! Schema generation from the field catalog.
//!
//! Schemas are value-independent: they describe the declared structure of a
//! settings type regardless of what was supplied at construction. Generated
//! schemas are cached per type after the first successful generation.

use std::{
    any::TypeId,
    collections::HashMap,
    sync::{LazyLock, RwLock},
};

use serde_json::{json, Map, Value};

use crate::{
    error::SettingsError,
    metadata::{self, CoercionKind, FieldMetadata, SettingsMetadata},
    Settings,
};

/// Cache of generated schemas, keyed by settings type identity.
static SCHEMAS: LazyLock<RwLock<HashMap<TypeId, &'static Value>>> =
    LazyLock::new(RwLock::default);

/// Returns the schema descriptor for `T`, generating and caching it on first use.
pub(crate) fn schema_of<T: Settings>() -> Result<&'static Value, SettingsError> {
    let id = TypeId::of::<T>();
    {
        let cache = SCHEMAS.read().expect("schema cache poisoned");
        if let Some(schema) = cache.get(&id) {
            return Ok(schema);
        }
    }
    let meta = metadata::register::<T>();
    let schema = describe(meta, &mut Vec::new())?;
    let mut cache = SCHEMAS.write().expect("schema cache poisoned");
    Ok(*cache
        .entry(id)
        .or_insert_with(|| Box::leak(Box::new(schema))))
}

/// Recursively describes a catalog as a `{"type", "properties", "required"}`
/// object. `stack` tracks the descent path for cycle detection.
fn describe(
    meta: &'static SettingsMetadata,
    stack: &mut Vec<&'static str>,
) -> Result<Value, SettingsError> {
    if stack.contains(&meta.ty) {
        return Err(SettingsError::Definition {
            ty: meta.ty,
            message: format!(
                "cyclic nested settings graph: {} -> {}",
                stack.join(" -> "),
                meta.ty
            ),
        });
    }
    stack.push(meta.ty);
    let properties = describe_fields(meta, stack);
    stack.pop();
    let properties = properties?;

    let required: Vec<Value> = meta
        .required_fields()
        .map(|name| Value::String(name.to_owned()))
        .collect();
    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

fn describe_fields(
    meta: &'static SettingsMetadata,
    stack: &mut Vec<&'static str>,
) -> Result<Map<String, Value>, SettingsError> {
    let mut properties = Map::new();
    for field in &meta.fields {
        properties.insert(field.name.to_owned(), field_descriptor(field, stack)?);
    }
    Ok(properties)
}

fn field_descriptor(
    field: &FieldMetadata,
    stack: &mut Vec<&'static str>,
) -> Result<Value, SettingsError> {
    let mut descriptor = match field.kind {
        CoercionKind::Bool => json!({ "type": "boolean" }),
        CoercionKind::Integer => json!({ "type": "integer" }),
        CoercionKind::Float => json!({ "type": "number" }),
        CoercionKind::Sequence => json!({ "type": "array" }),
        CoercionKind::Mapping => json!({ "type": "object" }),
        CoercionKind::Nested(meta) => describe(meta(), stack)?,
        CoercionKind::Raw => json!({ "type": "string" }),
    };
    if field.is_optional {
        make_nullable(&mut descriptor);
    }
    Ok(descriptor)
}

/// Rewrites `"type": "x"` into `"type": ["x", "null"]`.
fn make_nullable(descriptor: &mut Value) {
    if let Some(ty) = descriptor.get_mut("type")
        && let Value::String(base) = ty
    {
        *ty = json!([base, "null"]);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use assert_matches::assert_matches;

    use crate::metadata::FieldMetadata;

    use super::*;

    fn leaf_meta() -> &'static SettingsMetadata {
        static META: LazyLock<SettingsMetadata> = LazyLock::new(|| {
            SettingsMetadata::builder("Leaf")
                .field(FieldMetadata::new("a", CoercionKind::Integer))
                .field(FieldMetadata::new("b", CoercionKind::Raw).with_default("x"))
                .field(FieldMetadata::new("c", CoercionKind::Float).optional().with_default(Value::Null))
                .build()
        });
        &META
    }

    fn tree_meta() -> &'static SettingsMetadata {
        static META: LazyLock<SettingsMetadata> = LazyLock::new(|| {
            SettingsMetadata::builder("Tree")
                .field(FieldMetadata::new("name", CoercionKind::Raw))
                .field(FieldMetadata::new("leaf", CoercionKind::Nested(leaf_meta)))
                .build()
        });
        &META
    }

    // Two catalogs referencing each other through their `Nested` kinds.
    fn cycle_a() -> &'static SettingsMetadata {
        static META: LazyLock<SettingsMetadata> = LazyLock::new(|| {
            SettingsMetadata::builder("CycleA")
                .field(FieldMetadata::new("b", CoercionKind::Nested(cycle_b)))
                .build()
        });
        &META
    }

    fn cycle_b() -> &'static SettingsMetadata {
        static META: LazyLock<SettingsMetadata> = LazyLock::new(|| {
            SettingsMetadata::builder("CycleB")
                .field(FieldMetadata::new("a", CoercionKind::Nested(cycle_a)))
                .build()
        });
        &META
    }

    #[test]
    fn schema_shape_and_required_list() {
        let schema = describe(leaf_meta(), &mut Vec::new()).unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["a"], json!({ "type": "integer" }));
        assert_eq!(schema["properties"]["b"], json!({ "type": "string" }));
        assert_eq!(
            schema["properties"]["c"],
            json!({ "type": ["number", "null"] })
        );
        assert_eq!(schema["required"], json!(["a"]));
    }

    #[test]
    fn schema_recurses_into_nested_catalogs() {
        let schema = describe(tree_meta(), &mut Vec::new()).unwrap();
        assert_eq!(schema["required"], json!(["name", "leaf"]));
        let nested = &schema["properties"]["leaf"];
        assert_eq!(nested["type"], "object");
        assert_eq!(nested["required"], json!(["a"]));
    }

    #[test]
    fn cyclic_graphs_are_definition_errors() {
        let err = describe(cycle_a(), &mut Vec::new()).unwrap_err();
        assert_matches!(err, SettingsError::Definition { ty: "CycleA", .. });
        assert!(err.to_string().contains("cyclic"), "{err}");
    }
}

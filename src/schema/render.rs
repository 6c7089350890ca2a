//! Canonical SDL rendering of an introspected schema.
//!
//! Output is deterministic for a given type system: types are sorted by
//! name, internal `__*` types and built-in scalars are skipped, and blocks
//! are joined with blank lines. Rendering an already-rendered schema's
//! introspection yields the same text.

use super::introspection::{FieldDef, InputValue, SchemaModel, TypeDef, TypeRef};

const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// Render an introspected schema as SDL text.
pub fn render_sdl(schema: &SchemaModel) -> String {
    let mut blocks = Vec::new();

    if let Some(block) = render_schema_block(schema) {
        blocks.push(block);
    }

    let mut types: Vec<&TypeDef> = schema
        .types
        .iter()
        .filter(|t| match t.name.as_deref() {
            Some(name) => !name.starts_with("__") && !BUILTIN_SCALARS.contains(&name),
            None => false,
        })
        .collect();
    types.sort_by_key(|t| t.name.clone());

    for ty in types {
        if let Some(block) = render_type(ty) {
            blocks.push(block);
        }
    }

    blocks.join("\n\n")
}

/// Emit an explicit `schema { ... }` block only when a root type deviates
/// from its conventional name.
fn render_schema_block(schema: &SchemaModel) -> Option<String> {
    let query = schema.query_type.as_ref().map(|t| t.name.as_str());
    let mutation = schema.mutation_type.as_ref().map(|t| t.name.as_str());

    let query_default = query.map_or(true, |n| n == "Query");
    let mutation_default = mutation.map_or(true, |n| n == "Mutation");
    if query_default && mutation_default {
        return None;
    }

    let mut lines = vec!["schema {".to_string()];
    if let Some(name) = query {
        lines.push(format!("  query: {}", name));
    }
    if let Some(name) = mutation {
        lines.push(format!("  mutation: {}", name));
    }
    lines.push("}".to_string());
    Some(lines.join("\n"))
}

fn render_type(ty: &TypeDef) -> Option<String> {
    let name = ty.name.as_deref()?;

    match ty.kind.as_str() {
        "OBJECT" => Some(render_fields_block("type", name, ty.fields.as_deref())),
        "INTERFACE" => Some(render_fields_block("interface", name, ty.fields.as_deref())),
        "INPUT_OBJECT" => Some(render_input_block(name, ty.input_fields.as_deref())),
        "ENUM" => Some(render_enum_block(name, ty)),
        "UNION" => Some(render_union_block(name, ty)),
        "SCALAR" => Some(format!("scalar {}", name)),
        _ => None,
    }
}

fn render_fields_block(keyword: &str, name: &str, fields: Option<&[FieldDef]>) -> String {
    let mut lines = vec![format!("{} {} {{", keyword, name)];
    for field in fields.unwrap_or(&[]) {
        lines.push(format!(
            "  {}{}: {}",
            field.name,
            render_args(&field.args),
            render_type_ref(&field.ty)
        ));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn render_input_block(name: &str, fields: Option<&[InputValue]>) -> String {
    let mut lines = vec![format!("input {} {{", name)];
    for field in fields.unwrap_or(&[]) {
        lines.push(format!(
            "  {}: {}{}",
            field.name,
            render_type_ref(&field.ty),
            render_default(&field.default_value)
        ));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn render_enum_block(name: &str, ty: &TypeDef) -> String {
    let mut lines = vec![format!("enum {} {{", name)];
    for value in ty.enum_values.as_deref().unwrap_or(&[]) {
        lines.push(format!("  {}", value.name));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn render_union_block(name: &str, ty: &TypeDef) -> String {
    let members: Vec<&str> = ty
        .possible_types
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|t| t.name.as_deref())
        .collect();
    format!("union {} = {}", name, members.join(" | "))
}

fn render_args(args: &[InputValue]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = args
        .iter()
        .map(|a| {
            format!(
                "{}: {}{}",
                a.name,
                render_type_ref(&a.ty),
                render_default(&a.default_value)
            )
        })
        .collect();
    format!("({})", rendered.join(", "))
}

fn render_default(default: &Option<String>) -> String {
    match default {
        Some(value) => format!(" = {}", value),
        None => String::new(),
    }
}

/// Render a type reference, unwrapping `NON_NULL` to `T!` and `LIST` to
/// `[T]`.
fn render_type_ref(ty: &TypeRef) -> String {
    match ty.kind.as_str() {
        "NON_NULL" => match &ty.of_type {
            Some(inner) => format!("{}!", render_type_ref(inner)),
            None => String::new(),
        },
        "LIST" => match &ty.of_type {
            Some(inner) => format!("[{}]", render_type_ref(inner)),
            None => String::new(),
        },
        _ => ty.name.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> SchemaModel {
        let body = json!({
            "queryType": {"name": "Query"},
            "mutationType": null,
            "types": [
                {
                    "kind": "OBJECT",
                    "name": "Query",
                    "description": null,
                    "fields": [
                        {
                            "name": "movies",
                            "args": [
                                {
                                    "name": "options",
                                    "type": {"kind": "INPUT_OBJECT", "name": "MovieOptions", "ofType": null},
                                    "defaultValue": null
                                }
                            ],
                            "type": {
                                "kind": "NON_NULL",
                                "name": null,
                                "ofType": {
                                    "kind": "LIST",
                                    "name": null,
                                    "ofType": {
                                        "kind": "NON_NULL",
                                        "name": null,
                                        "ofType": {"kind": "OBJECT", "name": "Movie", "ofType": null}
                                    }
                                }
                            }
                        }
                    ],
                    "inputFields": null,
                    "enumValues": null,
                    "possibleTypes": null
                },
                {
                    "kind": "OBJECT",
                    "name": "Movie",
                    "description": null,
                    "fields": [
                        {
                            "name": "title",
                            "args": [],
                            "type": {"kind": "NON_NULL", "name": null, "ofType": {"kind": "SCALAR", "name": "String", "ofType": null}}
                        }
                    ],
                    "inputFields": null,
                    "enumValues": null,
                    "possibleTypes": null
                },
                {
                    "kind": "ENUM",
                    "name": "SortDirection",
                    "description": null,
                    "fields": null,
                    "inputFields": null,
                    "enumValues": [{"name": "ASC"}, {"name": "DESC"}],
                    "possibleTypes": null
                },
                {
                    "kind": "SCALAR",
                    "name": "String",
                    "description": null,
                    "fields": null,
                    "inputFields": null,
                    "enumValues": null,
                    "possibleTypes": null
                },
                {
                    "kind": "OBJECT",
                    "name": "__Type",
                    "description": null,
                    "fields": [],
                    "inputFields": null,
                    "enumValues": null,
                    "possibleTypes": null
                }
            ]
        });
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_render_skips_builtins_and_sorts() {
        let sdl = render_sdl(&sample_schema());

        assert!(!sdl.contains("scalar String"));
        assert!(!sdl.contains("__Type"));
        // No schema block when root names are conventional.
        assert!(!sdl.contains("schema {"));

        // Sorted: Movie before Query before SortDirection.
        let movie = sdl.find("type Movie").unwrap();
        let query = sdl.find("type Query").unwrap();
        let sort = sdl.find("enum SortDirection").unwrap();
        assert!(movie < query && query < sort);
    }

    #[test]
    fn test_render_wrapped_type_refs() {
        let sdl = render_sdl(&sample_schema());
        assert!(sdl.contains("movies(options: MovieOptions): [Movie!]!"));
        assert!(sdl.contains("title: String!"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let schema = sample_schema();
        assert_eq!(render_sdl(&schema), render_sdl(&schema));
    }

    #[test]
    fn test_schema_block_for_nonstandard_roots() {
        let body = json!({
            "queryType": {"name": "RootQuery"},
            "mutationType": null,
            "types": []
        });
        let schema: SchemaModel = serde_json::from_value(body).unwrap();
        let sdl = render_sdl(&schema);
        assert!(sdl.starts_with("schema {"));
        assert!(sdl.contains("query: RootQuery"));
    }
}

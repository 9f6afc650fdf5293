//! LuaLS annotation stubs (`---@meta` files) for editor completion.

use crate::error::Result;
use crate::model::*;
use crate::render::Renderer;

pub struct LuaRenderer;

impl Renderer for LuaRenderer {
    fn render(&self, _name: &str, part: &ApiCollection) -> Result<String> {
        let mut lines: Vec<String> = vec!["---@meta _".to_string(), String::new()];

        let mut declared: Vec<&str> = Vec::new();
        for function in &part.functions {
            if function.ns != GLOBAL_NAMESPACE && !declared.contains(&function.ns.as_str()) {
                declared.push(&function.ns);
                lines.push(format!("{} = {{}}", function.ns));
                lines.push(String::new());
            }
            render_function(&mut lines, function);
        }

        let mut enums_declared = false;
        let mut constants_declared = false;
        for table in &part.tables {
            match table.kind {
                TableKind::Structure => render_class(&mut lines, table),
                TableKind::Enum => {
                    if !enums_declared {
                        lines.push("Enum = {}".to_string());
                        lines.push(String::new());
                        enums_declared = true;
                    }
                    render_values(&mut lines, table, Some("---@enum"));
                }
                TableKind::Constants => {
                    if !constants_declared {
                        lines.push("Constants = {}".to_string());
                        lines.push(String::new());
                        constants_declared = true;
                    }
                    render_values(&mut lines, table, None);
                }
            }
        }

        if !part.events.is_empty() {
            render_event_alias(&mut lines, &part.events);
        }

        Ok(lines.join("\n"))
    }

    fn file_extension(&self) -> &str {
        "lua"
    }
}

/// Documentation types as LuaLS understands them.
fn lua_type(sig: &VariableSignature) -> String {
    if let Some(mixin) = &sig.mixin {
        return mixin.clone();
    }
    match sig.ty.as_str() {
        "bool" => "boolean",
        "cstring" => "string",
        "luaIndex" | "size" | "time_t" | "fileID" | "uiUnit" => "number",
        "table" | "unknown" => "any",
        other => other,
    }
    .to_string()
}

fn description_lines(lines: &mut Vec<String>, description: Option<&str>) {
    if let Some(desc) = description.filter(|d| !d.is_empty()) {
        for line in desc.lines() {
            lines.push(format!("--- {}", line.trim()));
        }
    }
}

fn with_description(head: String, description: &str) -> String {
    if description.is_empty() {
        head
    } else {
        format!("{} {}", head, description)
    }
}

fn render_function(lines: &mut Vec<String>, function: &ApiFunction) {
    description_lines(lines, function.description.as_deref());
    for param in &function.parameters {
        let optional = if param.nilable { "?" } else { "" };
        lines.push(with_description(
            format!("---@param {}{} {}", param.name, optional, lua_type(param)),
            &param.description,
        ));
    }
    for ret in &function.returns {
        let optional = if ret.nilable { "?" } else { "" };
        lines.push(with_description(
            format!("---@return {}{} {}", lua_type(ret), optional, ret.name),
            &ret.description,
        ));
    }
    let params: Vec<&str> = function.parameters.iter().map(|p| p.name.as_str()).collect();
    lines.push(format!(
        "function {}({}) end",
        function.qualified_name(),
        params.join(", ")
    ));
    lines.push(String::new());
}

fn render_class(lines: &mut Vec<String>, table: &ApiTable) {
    description_lines(lines, table.description.as_deref());
    lines.push(format!("---@class {}", table.name));
    for field in &table.fields {
        let optional = if field.nilable { "?" } else { "" };
        lines.push(with_description(
            format!("---@field {}{} {}", field.name, optional, lua_type(field)),
            &field.description,
        ));
    }
    lines.push(String::new());
}

/// `Enum.Name = { ... }` or `Constants.Name = { ... }`.
fn render_values(lines: &mut Vec<String>, table: &ApiTable, annotation: Option<&str>) {
    let owner = match table.kind {
        TableKind::Enum => "Enum",
        _ => "Constants",
    };
    description_lines(lines, table.description.as_deref());
    if let Some(annotation) = annotation {
        lines.push(format!("{} {}.{}", annotation, owner, table.name));
    }
    lines.push(format!("{}.{} = {{", owner, table.name));
    for (index, member) in table.values.iter().enumerate() {
        let value = member
            .value
            .as_ref()
            .map(Literal::to_string)
            .unwrap_or_else(|| index.to_string());
        lines.push(format!("\t{} = {},", member.name, value));
    }
    lines.push("}".to_string());
    lines.push(String::new());
}

fn render_event_alias(lines: &mut Vec<String>, events: &[ApiEvent]) {
    lines.push("---@alias ApiEventName".to_string());
    for event in events {
        let payload: Vec<String> = event
            .payload
            .iter()
            .map(|p| format!("{}: {}", p.name, lua_type(p)))
            .collect();
        if payload.is_empty() {
            lines.push(format!("---| \"{}\"", event.literal_name));
        } else {
            lines.push(format!("---| \"{}\" # {}", event.literal_name, payload.join(", ")));
        }
    }
    lines.push(String::new());
}

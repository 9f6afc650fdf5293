//! GitHub-flavored markdown reference pages.

use crate::error::Result;
use crate::model::*;
use crate::render::toc;
use crate::render::Renderer;

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, name: &str, part: &ApiCollection) -> Result<String> {
        let mut output = format!("# {}\n\n", name);

        let mut headings: Vec<String> = Vec::new();
        headings.extend(part.functions.iter().map(ApiFunction::qualified_name));
        headings.extend(part.tables.iter().map(|t| t.name.clone()));
        headings.extend(part.events.iter().map(|e| e.literal_name.clone()));

        if !headings.is_empty() {
            output.push_str("## Index\n\n");
            for heading in &headings {
                output.push_str(&toc::render_toc_item(heading));
                output.push('\n');
            }
            output.push('\n');
        }

        for function in &part.functions {
            output.push_str(&render_function(function));
            output.push('\n');
        }
        for table in &part.tables {
            output.push_str(&render_table(table));
            output.push('\n');
        }
        for event in &part.events {
            output.push_str(&render_event(event));
            output.push('\n');
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn header(lines: &mut Vec<String>, heading: &str, version: &Version, description: Option<&str>) {
    lines.push(format!("### {}\n", heading));
    lines.push(format!("_Available in: `{}`_", availability(version)));
    lines.push(String::new());
    if let Some(desc) = description {
        lines.push(desc.to_string());
        lines.push(String::new());
    }
}

fn availability(version: &Version) -> String {
    match version {
        Version::Range(range) if range.is_any() => "all versions".to_string(),
        other => other.to_string(),
    }
}

fn render_function(function: &ApiFunction) -> String {
    let mut lines: Vec<String> = Vec::new();
    header(
        &mut lines,
        &function.qualified_name(),
        &function.version,
        function.description.as_deref(),
    );

    signature_section(&mut lines, "Arguments", &function.parameters);
    if function.parameters.is_empty() {
        lines.push("_Function has no arguments._".to_string());
        lines.push(String::new());
    }
    signature_section(&mut lines, "Returns", &function.returns);

    if !function.events.is_empty() {
        lines.push("#### Events\n".to_string());
        for event in &function.events {
            if event.description.is_empty() {
                lines.push(format!("* `{}`", event.name));
            } else {
                lines.push(format!("* `{}`: {}", event.name, event.description));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_table(table: &ApiTable) -> String {
    let mut lines: Vec<String> = Vec::new();
    header(&mut lines, &table.name, &table.version, table.description.as_deref());

    match table.kind {
        TableKind::Structure => signature_section(&mut lines, "Fields", &table.fields),
        TableKind::Enum | TableKind::Constants => {
            if !table.values.is_empty() {
                lines.push("#### Values\n".to_string());
                for member in &table.values {
                    match &member.value {
                        Some(value) => lines.push(format!("* **{}** = `{}`", member.name, value)),
                        None => lines.push(format!("* **{}**", member.name)),
                    }
                }
                lines.push(String::new());
            }
        }
    }
    signature_section(&mut lines, "Arguments", &table.parameters);

    lines.join("\n")
}

fn render_event(event: &ApiEvent) -> String {
    let mut lines: Vec<String> = Vec::new();
    header(
        &mut lines,
        &event.literal_name,
        &event.version,
        event.description.as_deref(),
    );
    signature_section(&mut lines, "Payload", &event.payload);
    lines.join("\n")
}

fn signature_section(lines: &mut Vec<String>, title: &str, signatures: &[VariableSignature]) {
    if signatures.is_empty() {
        return;
    }
    lines.push(format!("#### {}\n", title));
    for sig in signatures {
        lines.push(render_signature(sig));
    }
    lines.push(String::new());
}

/// `* **name** (`type`, optional): description`
fn render_signature(sig: &VariableSignature) -> String {
    let mut ty = match &sig.mixin {
        Some(mixin) => format!("`{}` ({})", sig.ty, mixin),
        None => format!("`{}`", sig.ty),
    };
    if sig.nilable {
        ty.push_str(", optional");
    }
    if let Some(default) = &sig.default {
        ty.push_str(&format!(", default `{}`", default));
    }
    let mut line = format!("* **{}** ({})", sig.name, ty);
    if !sig.description.is_empty() {
        line.push_str(": ");
        line.push_str(&sig.description);
    }
    line
}

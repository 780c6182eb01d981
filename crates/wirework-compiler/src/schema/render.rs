//! Textual rendering of derived schemas.

use super::registry::{SchemaRegistry, ServiceSchema};

/// Where a rendered schema lives.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output package path, e.g. `rpc` or `gen/rpc`.
    pub output_package: String,
    /// File extension of schema documents, without the dot.
    pub extension: String,
}

impl RenderOptions {
    pub fn new(output_package: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            output_package: output_package.into(),
            extension: extension.into(),
        }
    }

    /// Last segment of the output package path.
    pub fn package_name(&self) -> &str {
        self.output_package
            .rsplit('/')
            .next()
            .unwrap_or(&self.output_package)
    }

    /// `<output package segments>/<Service>.<extension>`, relative to the
    /// target module directory.
    pub fn output_path(&self, service: &str) -> String {
        let mut segments: Vec<&str> = self
            .output_package
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let filename = format!("{}.{}", service, self.extension);
        segments.push(&filename);
        segments.join("/")
    }
}

impl SchemaRegistry {
    /// Renders one service's schema document.
    pub fn render(&self, schema: &ServiceSchema, options: &RenderOptions) -> String {
        let mut output = String::new();

        output.push_str("syntax=\"proto3\";\n");
        output.push_str(&format!("option go_package=\"{}\";\n", options.output_package));
        output.push_str(&format!("package {};\n", options.package_name()));

        for name in &schema.messages {
            let Some(message) = self.message(name) else {
                continue;
            };
            output.push('\n');
            output.push_str(&format!("message {} {{\n", message.name));
            for field in &message.fields {
                output.push_str(&format!(
                    "    {} {} = {};\n",
                    field.wire_type, field.name, field.tag
                ));
            }
            output.push_str("}\n");
        }

        output.push('\n');
        output.push_str(&format!("service {} {{\n", schema.name));
        for method in &schema.methods {
            output.push_str(&format!(
                "    rpc {} ({}) returns ({}) {{}}\n",
                method.name, method.request, method.response
            ));
        }
        output.push_str("}\n");

        output
    }
}

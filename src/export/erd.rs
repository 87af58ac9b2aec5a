//! Entity relationship diagrams in Graphviz DOT format.
//!
//! Each record becomes a node drawn as an HTML-like table with one row per
//! field; each foreign key becomes an edge from the referencing record to the
//! referenced record, labelled with the cardinality on both ends.
//!
//! Rendering DOT to an image shells out to a Graphviz layout engine
//! (`circo` by default), which must be installed and on `PATH`.
//!
//! The embeddable variant gets its links and transparent background from DOT
//! attributes (`URL`, `target`, `bgcolor`), so the SVG Graphviz returns is
//! never parsed. Only the fixed `width`/`height` of the root `<svg>` tag are
//! rewritten to `auto` so the diagram scales with the page.

use super::{DocgenConfig, ExportError, ExportResult};
use crate::models::{Record, Relationship, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info};

static SVG_ROOT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<svg\b[^>]*>").unwrap());

static SIZE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(width|height)="[^"]*""#).unwrap());

/// Everything the diagram is drawn from
#[derive(Debug)]
pub struct ErdContext<'s> {
    pub schema: &'s Schema,
    pub relationships: Vec<Relationship>,
}

/// Exporter for entity relationship diagrams
#[derive(Debug, Clone, Default)]
pub struct ErdExporter {
    config: DocgenConfig,
    /// Wrap record nodes in links (`config.link_pattern`) and draw on a
    /// transparent background
    embed: bool,
}

impl ErdExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DocgenConfig) -> Self {
        Self {
            config,
            embed: false,
        }
    }

    /// Exporter producing a diagram meant to be embedded in the generated site
    pub fn embeddable(config: DocgenConfig) -> Self {
        Self {
            config,
            embed: true,
        }
    }

    pub fn config(&self) -> &DocgenConfig {
        &self.config
    }

    /// Derive the diagram context: the schema and one relationship per
    /// foreign key
    pub fn context<'s>(&self, schema: &'s Schema) -> Result<ErdContext<'s>, ExportError> {
        let relationships = Relationship::derive_all(schema)?;
        Ok(ErdContext {
            schema,
            relationships,
        })
    }

    /// Relationships drawn as edges
    pub fn relationships(&self, schema: &Schema) -> Result<Vec<Relationship>, ExportError> {
        Ok(Relationship::derive_all(schema)?)
    }

    /// Render the schema as DOT source
    pub fn render_dot(&self, schema: &Schema) -> Result<String, ExportError> {
        let context = self.context(schema)?;

        let mut dot = String::new();
        dot.push_str(&format!("digraph {} {{\n", quote(schema.id())));
        if self.embed {
            dot.push_str("  graph [bgcolor=\"transparent\"];\n");
        }
        dot.push_str("  node [shape=plain];\n");
        dot.push_str("  edge [arrowhead=none, arrowtail=none];\n\n");

        for record in context.schema.records() {
            dot.push_str(&self.render_node(record));
        }

        if !context.relationships.is_empty() {
            dot.push('\n');
        }
        for rel in &context.relationships {
            dot.push_str(&format!(
                "  {} -> {} [taillabel=\"{}\", headlabel=\"{}\"];\n",
                quote(&rel.source_record_id),
                quote(&rel.target_record_id),
                rel.source_cardinality,
                rel.target_cardinality
            ));
        }
        dot.push_str("}\n");

        debug!(
            schema = %schema.id(),
            records = schema.records().len(),
            relationships = context.relationships.len(),
            "Rendered ERD"
        );
        Ok(dot)
    }

    /// Render the schema as DOT wrapped in an [`ExportResult`]
    pub fn export(&self, schema: &Schema) -> Result<ExportResult, ExportError> {
        Ok(ExportResult {
            content: self.render_dot(schema)?,
            format: "dot".to_string(),
        })
    }

    /// Render the diagram to an image with the configured layout engine.
    ///
    /// `format` is any Graphviz output format, e.g. `svg` or `png`.
    pub fn render_with_graphviz(&self, schema: &Schema, format: &str) -> Result<Vec<u8>, ExportError> {
        let dot = self.render_dot(schema)?;
        let engine = &self.config.layout_engine;

        let mut child = Command::new(engine)
            .arg(format!("-T{}", format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExportError::RendererError(format!("Failed to run '{}': {}", engine, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(dot.as_bytes())
                .map_err(|e| ExportError::IoError(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ExportError::IoError(e.to_string()))?;
        if !output.status.success() {
            return Err(ExportError::RendererError(format!(
                "'{}' exited with {}: {}",
                engine,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!(engine = %engine, format = %format, bytes = output.stdout.len(), "Rendered ERD image");
        Ok(output.stdout)
    }

    /// Render an SVG that scales with the page it is embedded in
    pub fn render_embeddable_svg(&self, schema: &Schema) -> Result<String, ExportError> {
        let bytes = self.render_with_graphviz(schema, "svg")?;
        let svg = String::from_utf8(bytes)
            .map_err(|e| ExportError::RendererError(format!("SVG is not UTF-8: {}", e)))?;
        Ok(autosize_svg(&svg))
    }

    fn render_node(&self, record: &Record) -> String {
        let color = record
            .options()
            .get("color")
            .and_then(|v| v.as_str())
            .unwrap_or("white");

        let mut node = format!("  {} [", quote(record.id()));
        if self.embed {
            node.push_str(&format!(
                "URL={}, target=\"_top\", ",
                quote(&self.config.record_link(record.id()))
            ));
        }
        node.push_str("label=<\n");
        node.push_str(&format!(
            "    <TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"4\" BGCOLOR=\"{}\">\n",
            escape_html(color)
        ));
        node.push_str(&format!(
            "      <TR><TD COLSPAN=\"3\"><B><FONT POINT-SIZE=\"16\">{}</FONT></B></TD></TR>\n",
            escape_html(record.label())
        ));

        for field in record.fields() {
            let marker = match (field.is_primary_key(), field.has_foreign_keys()) {
                (true, true) => "PK FK",
                (true, false) => "PK",
                (false, true) => "FK",
                (false, false) => "",
            };
            node.push_str(&format!(
                "      <TR><TD>{}</TD><TD ALIGN=\"LEFT\">{}</TD><TD ALIGN=\"LEFT\">{}</TD></TR>\n",
                marker,
                escape_html(field.id()),
                escape_html(field.datatype_id())
            ));
        }

        node.push_str("    </TABLE>\n  >];\n");
        node
    }
}

/// Quote an identifier for DOT
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Replace the fixed root dimensions of a Graphviz SVG with `auto`
pub(crate) fn autosize_svg(svg: &str) -> String {
    match SVG_ROOT_TAG.find(svg) {
        Some(root) => {
            let tag = SIZE_ATTR.replace_all(root.as_str(), "${1}=\"auto\"");
            format!("{}{}{}", &svg[..root.start()], tag, &svg[root.end()..])
        }
        None => svg.to_string(),
    }
}

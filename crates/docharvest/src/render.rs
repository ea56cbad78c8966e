//! Per-document markdown rendering

use crate::convert::html_to_markdown;
use crate::error::ConvertError;
use crate::types::HarvestedDocument;
use tracing::warn;

/// Title used when the document has none
pub const UNTITLED: &str = "Untitled";

/// Anchor title used when an anchor has none
pub const UNKNOWN_ANCHOR: &str = "Unknown";

/// Section labels of a rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub source: &'static str,
    pub file_name: &'static str,
    pub contents: &'static str,
    pub body: &'static str,
}

impl Labels {
    /// English labels
    pub const ENGLISH: Labels = Labels {
        source: "Source",
        file_name: "File name",
        contents: "Table of Contents",
        body: "Content",
    };

    /// Chinese labels, used by the `cn` catalogs
    pub const CHINESE: Labels = Labels {
        source: "来源",
        file_name: "文件名",
        contents: "目录",
        body: "内容",
    };

    /// Labels matching a catalog language code
    pub fn for_language(language: &str) -> Self {
        match language.to_lowercase().as_str() {
            "cn" | "zh" | "zh-cn" | "zh_cn" => Self::CHINESE,
            _ => Self::ENGLISH,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::ENGLISH
    }
}

/// Render a harvested document with the built-in HTML converter
pub fn render_document(doc: &HarvestedDocument, labels: &Labels) -> String {
    render_document_with(doc, labels, html_to_markdown)
}

/// Render a harvested document with a custom HTML converter
///
/// If the converter fails, the raw HTML body is emitted instead.
pub fn render_document_with<C>(doc: &HarvestedDocument, labels: &Labels, convert: C) -> String
where
    C: Fn(&str) -> Result<String, ConvertError>,
{
    let document = &doc.document;
    let mut output = String::new();

    output.push_str(&format!(
        "# {}\n\n",
        document.title.as_deref().unwrap_or(UNTITLED)
    ));

    // Two trailing spaces make a markdown hard line break
    output.push_str(&format!("**{}**: {}  \n", labels.source, doc.task.name));
    if let Some(file_name) = document.file_name.as_deref() {
        output.push_str(&format!("**{}**: {}\n", labels.file_name, file_name));
    }
    output.push('\n');

    if !document.anchors.is_empty() {
        output.push_str(&format!("## {}\n\n", labels.contents));
        for anchor in &document.anchors {
            output.push_str(&format!(
                "- {}\n",
                anchor.title.as_deref().unwrap_or(UNKNOWN_ANCHOR)
            ));
        }
        output.push('\n');
    }

    if let Some(html) = document.body() {
        let body = match convert(html) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!(path = %doc.task.path, error = %e, "HTML conversion failed, keeping raw body");
                html.to_string()
            }
        };
        output.push_str(&format!("## {}\n\n", labels.body));
        output.push_str(&body);
        output.push('\n');
    }

    output
}

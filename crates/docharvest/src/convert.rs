//! HTML to markdown conversion
//!
//! A single-pass converter tuned for documentation bodies: headings,
//! paragraphs, lists, emphasis, code blocks, links, images, tables and
//! blockquotes. Source whitespace outside `<pre>` is collapsed the way a
//! browser would; line structure comes only from block elements.

use crate::error::ConvertError;

/// Elements whose content is dropped entirely
const SKIP_TAGS: &[&str] = &["head", "script", "style", "noscript", "iframe", "svg"];

/// Elements that break lines but carry no markdown syntax
const BLOCK_TAGS: &[&str] = &[
    "div", "section", "article", "main", "header", "footer", "nav", "aside", "figure",
    "figcaption", "dl", "dt", "dd",
];

/// Convert an HTML fragment or document to markdown
///
/// Fails only on structurally broken markup (a tag or comment that never
/// closes); callers decide how to degrade.
pub fn html_to_markdown(html: &str) -> Result<String, ConvertError> {
    let mut writer = MarkdownWriter::default();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if rest.starts_with("<!--") {
            let end = rest[4..]
                .find("-->")
                .ok_or(ConvertError::UnterminatedComment(pos))?;
            pos += 4 + end + 3;
            continue;
        }

        if starts_tag(rest) {
            let end = rest.find('>').ok_or(ConvertError::UnterminatedTag(pos))?;
            writer.tag(&rest[1..end]);
            pos += end + 1;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        if c == '&' {
            if let Some((decoded, len)) = decode_entity(rest) {
                writer.text(decoded);
                pos += len;
                continue;
            }
        }
        writer.text(c);
        pos += c.len_utf8();
    }

    Ok(clean_whitespace(&writer.finish()))
}

fn starts_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

#[derive(Debug, Default)]
struct TableState {
    cells: usize,
    has_header: bool,
    separator_done: bool,
}

#[derive(Debug, Default)]
struct MarkdownWriter {
    output: String,
    skip: Vec<String>,
    lists: Vec<ListKind>,
    links: Vec<Option<String>>,
    quotes: Vec<usize>,
    table: Option<TableState>,
    in_cell: bool,
    in_pre: bool,
    pre_fresh: bool,
}

impl MarkdownWriter {
    fn tag(&mut self, raw: &str) {
        let lower = raw.to_ascii_lowercase();
        let is_closing = lower.starts_with('/');
        let self_closing = raw.ends_with('/');
        let name = lower
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");

        if SKIP_TAGS.contains(&name) {
            if is_closing {
                if let Some(pos) = self.skip.iter().rposition(|t| t == name) {
                    self.skip.truncate(pos);
                }
            } else if !self_closing {
                self.skip.push(name.to_string());
            }
            return;
        }

        if !self.skip.is_empty() {
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_break();
                if !is_closing {
                    let level = usize::from(name.as_bytes()[1] - b'0');
                    self.output.push_str(&"#".repeat(level));
                    self.output.push(' ');
                }
            }
            "p" => {
                if self.lists.is_empty() {
                    self.block_break();
                } else if is_closing {
                    self.line_break();
                }
            }
            "br" => {
                if self.in_pre {
                    self.output.push('\n');
                } else {
                    self.line_break();
                }
            }
            "hr" => {
                self.block_break();
                self.output.push_str("---");
                self.block_break();
            }
            "ul" | "ol" => {
                if is_closing {
                    self.lists.pop();
                    if self.lists.is_empty() {
                        self.block_break();
                    }
                } else {
                    if self.lists.is_empty() {
                        self.block_break();
                    }
                    self.lists.push(if name == "ol" {
                        ListKind::Ordered(0)
                    } else {
                        ListKind::Unordered
                    });
                }
            }
            "li" => {
                if !is_closing {
                    self.line_break();
                    let depth = self.lists.len().saturating_sub(1);
                    self.output.push_str(&"  ".repeat(depth));
                    match self.lists.last_mut() {
                        Some(ListKind::Ordered(n)) => {
                            *n += 1;
                            let marker = format!("{}. ", n);
                            self.output.push_str(&marker);
                        }
                        _ => self.output.push_str("- "),
                    }
                }
            }
            "strong" | "b" => self.output.push_str("**"),
            "em" | "i" => self.output.push('*'),
            "pre" => {
                if is_closing {
                    if !self.output.ends_with('\n') {
                        self.output.push('\n');
                    }
                    self.output.push_str("```");
                    self.in_pre = false;
                    self.block_break();
                } else {
                    self.block_break();
                    self.output.push_str("```\n");
                    self.in_pre = true;
                    self.pre_fresh = true;
                }
            }
            "code" => {
                if !self.in_pre {
                    self.output.push('`');
                } else if !is_closing && self.output.ends_with("```\n") {
                    if let Some(lang) = extract_attribute(raw, "class")
                        .and_then(|class| language_from_class(&class))
                    {
                        self.output.pop();
                        self.output.push_str(&lang);
                        self.output.push('\n');
                    }
                }
            }
            "blockquote" => {
                if is_closing {
                    if let Some(start) = self.quotes.pop() {
                        self.quote_from(start);
                    }
                } else {
                    self.block_break();
                    self.quotes.push(self.output.len());
                }
            }
            "a" => {
                if is_closing {
                    if let Some(Some(href)) = self.links.pop() {
                        self.output.push_str(&format!("]({})", href));
                    }
                } else if !self_closing {
                    let href = extract_attribute(raw, "href")
                        .filter(|href| !href.is_empty() && !href.starts_with('#'));
                    if href.is_some() {
                        self.output.push('[');
                    }
                    self.links.push(href);
                }
            }
            "img" => {
                if let Some(src) = extract_attribute(raw, "src") {
                    let alt = extract_attribute(raw, "alt").unwrap_or_default();
                    self.output.push_str(&format!("![{}]({})", alt, src));
                }
            }
            "table" => {
                self.in_cell = false;
                self.block_break();
                self.table = if is_closing {
                    None
                } else {
                    Some(TableState::default())
                };
            }
            "tr" => self.table_row(is_closing),
            "td" | "th" => {
                if let Some(table) = self.table.as_mut() {
                    if is_closing {
                        trim_trailing_spaces(&mut self.output);
                        self.output.push_str(" |");
                        self.in_cell = false;
                    } else {
                        table.cells += 1;
                        table.has_header |= name == "th";
                        self.output.push(' ');
                        self.in_cell = true;
                    }
                }
            }
            _ if BLOCK_TAGS.contains(&name) => self.line_break(),
            _ => {}
        }
    }

    fn text(&mut self, c: char) {
        if !self.skip.is_empty() {
            return;
        }

        if self.in_pre {
            // A newline directly after <pre> is not content
            if std::mem::take(&mut self.pre_fresh) && c == '\n' {
                return;
            }
            self.output.push(c);
        } else if c.is_whitespace() && c != '\u{a0}' {
            if !self.output.is_empty() && !self.output.ends_with(|c: char| c == ' ' || c == '\n') {
                self.output.push(' ');
            }
        } else {
            self.output.push(if c == '\u{a0}' { ' ' } else { c });
        }
    }

    fn table_row(&mut self, is_closing: bool) {
        let Some(table) = self.table.as_mut() else {
            return;
        };

        if is_closing {
            if table.has_header && !table.separator_done {
                let cells = table.cells.max(1);
                table.separator_done = true;
                self.output.push_str("\n|");
                self.output.push_str(&" --- |".repeat(cells));
            }
        } else {
            table.cells = 0;
            table.has_header = false;
            trim_trailing_spaces(&mut self.output);
            if !self.output.is_empty() && !self.output.ends_with('\n') {
                self.output.push('\n');
            }
            self.output.push('|');
        }
    }

    /// End the current line
    fn line_break(&mut self) {
        if self.in_cell {
            self.text(' ');
            return;
        }
        trim_trailing_spaces(&mut self.output);
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    /// Leave one blank line before the next block
    fn block_break(&mut self) {
        if self.in_cell {
            self.text(' ');
            return;
        }
        trim_trailing_spaces(&mut self.output);
        if self.output.is_empty() {
            return;
        }
        while !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    /// Prefix everything written since `start` with a quote marker
    fn quote_from(&mut self, start: usize) {
        let quoted: String = self.output[start..]
            .trim()
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.output.truncate(start);
        self.output.push_str(&quoted);
        self.block_break();
    }

    fn finish(mut self) -> String {
        while let Some(start) = self.quotes.pop() {
            self.quote_from(start);
        }
        if self.in_pre {
            if !self.output.ends_with('\n') {
                self.output.push('\n');
            }
            self.output.push_str("```");
        }
        self.output
    }
}

fn trim_trailing_spaces(s: &mut String) {
    while s.ends_with(' ') {
        s.pop();
    }
}

fn language_from_class(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Extract attribute value from tag
fn extract_attribute(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!("{}=", attr);
    // ASCII folding keeps byte offsets aligned with `tag`
    let tag_lower = tag.to_ascii_lowercase();

    let mut search_from = 0;
    while let Some(found) = tag_lower[search_from..].find(&pattern) {
        let start = search_from + found;
        search_from = start + pattern.len();

        // Must be a whole attribute name, e.g. not `data-src=` for `src`
        let preceded_ok = tag_lower[..start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !preceded_ok {
            continue;
        }

        let rest = tag[start + pattern.len()..].trim_start();
        if let Some(rest) = rest.strip_prefix('"') {
            return rest.find('"').map(|end| decode_text(&rest[..end]));
        } else if let Some(rest) = rest.strip_prefix('\'') {
            return rest.find('\'').map(|end| decode_text(&rest[..end]));
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '>')
                .unwrap_or(rest.len());
            return Some(decode_text(rest[..end].trim_end_matches('/')));
        }
    }
    None
}

fn decode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while pos < s.len() {
        let rest = &s[pos..];
        if let Some((decoded, len)) = decode_entity(rest) {
            out.push(decoded);
            pos += len;
        } else if let Some(c) = rest.chars().next() {
            out.push(c);
            pos += c.len_utf8();
        } else {
            break;
        }
    }
    out
}

/// Decode an HTML entity at the start of `s`
///
/// Returns the character and the number of bytes consumed, or `None` when
/// `s` does not start with a known entity.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix('&')?;
    let end = body.find(';').filter(|&end| end > 0 && end <= 10)?;
    let entity = &body[..end];

    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };

    Some((decoded, end + 2))
}

/// Trim line ends and keep at most one blank line, leaving code fences as-is
pub fn clean_whitespace(s: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in s.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            blank_run = 0;
            lines.push(line.trim());
            continue;
        }
        if in_fence {
            lines.push(line);
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

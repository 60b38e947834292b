//! Markup screens: HTML fragments fetched at load time and shown as text.

use include_dir::{include_dir, Dir};
use once_cell::sync::Lazy;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph, Widget, Wrap},
};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

use super::{LoadError, Screen};
use crate::tui::Theme;

static BUNDLED_SCREENS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/screens");

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("valid tag pattern"));

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

/// Where markup fragments are fetched from
#[derive(Clone)]
pub enum MarkupStore {
    /// Fragments compiled into the binary
    Embedded(&'static Dir<'static>),

    /// `<root>/<identifier>/content.html` on disk
    Directory(PathBuf),

    /// `<base>/<identifier>/content.html` over HTTP
    Remote { client: reqwest::Client, base: reqwest::Url },
}

impl MarkupStore {
    pub fn embedded() -> Self {
        MarkupStore::Embedded(&BUNDLED_SCREENS)
    }

    pub fn directory(root: impl Into<PathBuf>) -> Self {
        MarkupStore::Directory(root.into())
    }

    pub fn remote(base: &str) -> anyhow::Result<Self> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = reqwest::Url::parse(&base)?;
        Ok(MarkupStore::Remote {
            client: reqwest::Client::new(),
            base,
        })
    }

    /// Pick a store from a configured location: URL or directory
    pub fn from_location(location: &str) -> anyhow::Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::remote(location)
        } else {
            Ok(Self::directory(location))
        }
    }

    fn fragment_path(identifier: &str) -> String {
        format!("{}/content.html", identifier)
    }

    pub async fn fetch(&self, identifier: &str) -> Result<String, LoadError> {
        let path = Self::fragment_path(identifier);
        match self {
            MarkupStore::Embedded(dir) => dir
                .get_file(&path)
                .and_then(|file| file.contents_utf8())
                .map(str::to_string)
                .ok_or(LoadError::MarkupNotFound),

            MarkupStore::Directory(root) => {
                let full = root.join(&path);
                log::debug!("Reading markup from {:?}", full);
                tokio::fs::read_to_string(&full).await.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => LoadError::MarkupNotFound,
                    _ => LoadError::Io(e.to_string()),
                })
            }

            MarkupStore::Remote { client, base } => {
                let url = base
                    .join(&path)
                    .map_err(|e| LoadError::Network(e.to_string()))?;
                log::debug!("Fetching markup from {}", url);
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| LoadError::Network(e.to_string()))?;
                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(LoadError::MarkupNotFound);
                }
                if !status.is_success() {
                    return Err(LoadError::Http(status.as_u16()));
                }
                response
                    .text()
                    .await
                    .map_err(|e| LoadError::Network(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// A parsed document fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupFragment {
    identifier: String,
    blocks: Arc<Vec<TextBlock>>,
}

impl MarkupFragment {
    /// Reduce an HTML fragment to headings, paragraphs and list items
    pub fn parse(identifier: &str, html: &str) -> Self {
        let html = COMMENT.replace_all(html, "");
        let mut blocks = Vec::new();
        let mut text = String::new();
        let mut kind = BlockKind::Paragraph;
        let mut skipping = false;
        let mut last = 0;

        for caps in TAG.captures_iter(&html) {
            let Some(tag) = caps.get(0) else { continue };
            if !skipping {
                text.push_str(&html[last..tag.start()]);
            }
            last = tag.end();

            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let name = caps.get(2).map(|m| m.as_str().to_ascii_lowercase()).unwrap_or_default();

            match name.as_str() {
                "script" | "style" => skipping = !closing,
                "br" => text.push('\n'),
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    flush(&mut blocks, &mut text, kind);
                    kind = if closing { BlockKind::Paragraph } else { BlockKind::Heading };
                }
                "li" => {
                    flush(&mut blocks, &mut text, kind);
                    kind = if closing { BlockKind::Paragraph } else { BlockKind::Item };
                }
                "p" | "div" | "section" | "article" | "header" | "footer" | "ul" | "ol" => {
                    flush(&mut blocks, &mut text, kind);
                }
                _ => {}
            }
        }
        if !skipping {
            text.push_str(&html[last..]);
        }
        flush(&mut blocks, &mut text, kind);

        Self {
            identifier: identifier.to_string(),
            blocks: Arc::new(blocks),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }
}

fn flush(blocks: &mut Vec<TextBlock>, text: &mut String, kind: BlockKind) {
    let decoded = decode_entities(text);
    let cleaned = decoded
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if !cleaned.is_empty() {
        blocks.push(TextBlock { kind, text: cleaned });
    }
    text.clear();
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&mdash;", "\u{2014}")
        .replace("&times;", "\u{00d7}")
        .replace("&larr;", "\u{2190}")
        .replace("&rarr;", "\u{2192}")
        .replace("&amp;", "&")
}

/// Screen that shows a markup fragment; scrolls with PageUp/PageDown
pub struct MarkupScreen {
    fragment: MarkupFragment,
    scroll: u16,
}

impl MarkupScreen {
    pub fn new(fragment: MarkupFragment) -> Self {
        Self { fragment, scroll: 0 }
    }

    fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for block in self.fragment.blocks() {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            for text in block.text.lines() {
                let line = match block.kind {
                    BlockKind::Heading => {
                        Line::from(Span::styled(text.to_string(), Style::default().fg(theme.lavender).bold()))
                    }
                    BlockKind::Item => Line::from(vec![
                        Span::styled("\u{2022} ", Style::default().fg(theme.peach)),
                        Span::styled(text.to_string(), Style::default().fg(theme.text)),
                    ]),
                    BlockKind::Paragraph => {
                        Line::from(Span::styled(text.to_string(), Style::default().fg(theme.subtext1)))
                    }
                };
                lines.push(line);
            }
        }
        lines
    }
}

impl Screen for MarkupScreen {
    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        Paragraph::new(self.lines(theme))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .scroll((self.scroll, 0))
            .block(Block::default().padding(Padding::new(2, 2, 1, 1)))
            .render(area, buf);
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        use crossterm::event::KeyCode;
        match key.code {
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(5);
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(5);
                true
            }
            KeyCode::Home => {
                self.scroll = 0;
                true
            }
            _ => false,
        }
    }
}

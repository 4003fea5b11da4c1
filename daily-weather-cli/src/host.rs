//! Note hosts for the command line.
//!
//! [`ConsoleHost`] prints the report as a Markdown outline. [`OutlineFile`]
//! edits a Markdown outline on disk, treating each line as a block addressed
//! by its 1-based line number.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use daily_weather_core::{BlockId, Notice, NoteHost, RenderNode, Trigger};

const INDENT: &str = "  ";

/// Append `node` to `out` as outline bullets under `indent`.
fn write_outline(out: &mut Vec<String>, indent: &str, node: &RenderNode) {
    let mut lines = node.text.lines();
    if let Some(first) = lines.next() {
        out.push(format!("{indent}- {first}"));
    }
    for rest in lines {
        out.push(format!("{indent}{INDENT}{rest}"));
    }

    let child_indent = format!("{indent}{INDENT}");
    for child in &node.children {
        write_outline(out, &child_indent, child);
    }
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::Error(msg) => eprintln!("error: {msg}"),
        Notice::Info(msg) => eprintln!("{msg}"),
    }
}

pub struct ConsoleHost {
    query: Option<String>,
}

impl ConsoleHost {
    pub fn new(query: Option<String>) -> Self {
        Self { query }
    }

    pub fn trigger() -> Trigger {
        Trigger {
            block: BlockId("console".into()),
        }
    }
}

#[async_trait]
impl NoteHost for ConsoleHost {
    async fn first_line(&self, _: &BlockId) -> anyhow::Result<Option<String>> {
        Ok(self
            .query
            .as_deref()
            .and_then(|q| q.lines().next())
            .map(str::to_string))
    }

    async fn insert_nodes(&self, _: &BlockId, nodes: &[RenderNode]) -> anyhow::Result<()> {
        let mut out = Vec::new();
        for node in nodes {
            write_outline(&mut out, "", node);
        }
        println!("{}", out.join("\n"));
        Ok(())
    }

    async fn update_block(&self, _: &BlockId, text: &str) -> anyhow::Result<()> {
        let mut out = Vec::new();
        write_outline(&mut out, "", &RenderNode::leaf(text));
        println!("{}", out.join("\n"));
        Ok(())
    }

    async fn remove_block(&self, _: &BlockId) -> anyhow::Result<()> {
        Ok(())
    }

    async fn notify(&self, notice: Notice) {
        print_notice(&notice);
    }
}

/// A Markdown outline loaded into memory; call [`OutlineFile::save`] to write
/// it back.
pub struct OutlineFile {
    path: PathBuf,
    lines: Mutex<Vec<String>>,
}

impl OutlineFile {
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read outline file: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            lines: Mutex::new(contents.lines().map(str::to_string).collect()),
        })
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        let mut contents = self.lock()?.join("\n");
        contents.push('\n');

        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write outline file: {}", self.path.display()))
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Vec<String>>> {
        self.lines
            .lock()
            .map_err(|_| anyhow!("Outline state is poisoned"))
    }

    /// Index into `lines` for a block id, checked against the current length.
    fn index(block: &BlockId, len: usize) -> anyhow::Result<usize> {
        let line: usize = block
            .0
            .parse()
            .with_context(|| format!("Block id '{}' is not a line number", block.0))?;

        if line == 0 || line > len {
            anyhow::bail!("Line {line} is outside the outline (1..={len})");
        }
        Ok(line - 1)
    }
}

/// Split a line into its indentation and the block text without the bullet.
fn split_bullet(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let text = trimmed
        .strip_prefix(['-', '*'])
        .filter(|rest| rest.is_empty() || rest.starts_with(' '))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .unwrap_or(trimmed);
    (indent, text)
}

#[async_trait]
impl NoteHost for OutlineFile {
    async fn first_line(&self, block: &BlockId) -> anyhow::Result<Option<String>> {
        let lines = self.lock()?;
        let idx = Self::index(block, lines.len())?;
        let (_, text) = split_bullet(&lines[idx]);

        Ok((!text.trim().is_empty()).then(|| text.to_string()))
    }

    async fn insert_nodes(&self, block: &BlockId, nodes: &[RenderNode]) -> anyhow::Result<()> {
        let mut lines = self.lock()?;
        let idx = Self::index(block, lines.len())?;
        let indent = split_bullet(&lines[idx]).0.to_string();

        let mut out = Vec::new();
        for node in nodes {
            write_outline(&mut out, &indent, node);
        }
        lines.splice(idx + 1..idx + 1, out);
        Ok(())
    }

    async fn update_block(&self, block: &BlockId, text: &str) -> anyhow::Result<()> {
        let mut lines = self.lock()?;
        let idx = Self::index(block, lines.len())?;
        let indent = split_bullet(&lines[idx]).0.to_string();

        let mut out = Vec::new();
        write_outline(&mut out, &indent, &RenderNode::leaf(text));
        lines.splice(idx..=idx, out);
        Ok(())
    }

    async fn remove_block(&self, block: &BlockId) -> anyhow::Result<()> {
        let mut lines = self.lock()?;
        let idx = Self::index(block, lines.len())?;
        lines.remove(idx);
        Ok(())
    }

    async fn notify(&self, notice: Notice) {
        print_notice(&notice);
    }
}

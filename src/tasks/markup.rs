// src/tasks/markup.rs

//! HTML whitespace collapsing.
//!
//! The document is split into tags and the text between them. Runs of
//! whitespace in text become a single space; whitespace touching a
//! block-level tag or the document edges disappears. Tags, comments and
//! the bodies of `<pre>`, `<textarea>`, `<script>` and `<style>` are copied
//! verbatim, so attribute values keep their spacing.

use regex::Regex;
use tracing::debug;

use crate::discover::discover;
use crate::errors::{Result, SitepipeError};
use crate::reload::ReloadEvent;
use crate::tasks::{TaskContext, TaskReport};
use crate::types::TaskKind;

/// Raw-text elements, comments, then ordinary tags with quoted attributes.
const MARKUP: &str = concat!(
    r"(?is)<pre\b.*?</pre\s*>|<textarea\b.*?</textarea\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>",
    r"|<!--.*?-->",
    r#"|<[!/?]?[a-z][^>"']*(?:(?:"[^"]*"|'[^']*')[^>"']*)*>"#,
);

const BLOCK_TAG: &str = r"(?i)^</?(?:!doctype|address|article|aside|blockquote|body|br|dd|div|dl|dt|fieldset|figcaption|figure|footer|form|h[1-6]|head|header|hr|html|li|link|main|meta|nav|ol|p|section|table|tbody|td|tfoot|th|thead|title|tr|ul)\b";

/// Compiled patterns for one task run.
#[derive(Debug, Clone)]
pub struct WhitespaceCollapser {
    markup: Regex,
    runs: Regex,
    block_tag: Regex,
}

impl WhitespaceCollapser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| SitepipeError::Other(anyhow::anyhow!(e)))
        };
        Ok(Self {
            markup: compile(MARKUP)?,
            runs: compile(r"\s+")?,
            block_tag: compile(BLOCK_TAG)?,
        })
    }

    pub fn collapse(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        // The start of the document trims like a block tag.
        let mut after_block = true;

        for tag in self.markup.find_iter(html) {
            let is_block = self.block_tag.is_match(tag.as_str());
            self.push_text(&mut out, &html[last..tag.start()], after_block, is_block);
            out.push_str(tag.as_str());
            after_block = is_block;
            last = tag.end();
        }
        self.push_text(&mut out, &html[last..], after_block, true);

        out
    }

    fn push_text(&self, out: &mut String, text: &str, after_block: bool, before_block: bool) {
        let single = self.runs.replace_all(text, " ");
        let mut text: &str = &single;
        if after_block {
            text = text.trim_start();
        }
        if before_block {
            text = text.trim_end();
        }
        out.push_str(text);
    }
}

pub fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let cfg = &ctx.config.markup;
    let out_dir = ctx.resolve(&cfg.out);
    let collapser = WhitespaceCollapser::new()?;

    let mut report = TaskReport::default();

    for source in discover(ctx.fs.as_ref(), &ctx.root, &cfg.input)? {
        let target = out_dir.join(&source.rel);

        let written = ctx.fs.read_to_string(&source.path).and_then(|html| {
            let html = if cfg.collapse_whitespace {
                collapser.collapse(&html)
            } else {
                html
            };
            ctx.fs.write(&target, html.as_bytes())
        });

        match written {
            Ok(()) => {
                debug!(?target, "wrote markup");
                report.processed += 1;
            }
            Err(err) => ctx.record_failure(TaskKind::Markup, &mut report, err.into())?,
        }
    }

    if report.processed > 0 {
        ctx.reload.send(ReloadEvent::Reload);
    }
    Ok(report)
}

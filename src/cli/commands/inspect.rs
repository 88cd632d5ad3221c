//! docsearch inspect - Summarise an index file

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_formatted};
use crate::error::{DsError, Result};
use crate::index::{IndexBuilder, SearchIndex, TitleMap, TokenizerPolicy, codec};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Index file (searchindex.js or JSON)
    pub index: PathBuf,

    /// Omit the title tree
    #[arg(long)]
    pub no_tree: bool,
}

#[derive(Debug, Serialize)]
pub struct TierCounts {
    pub title: usize,
    pub lead: usize,
    pub body: usize,
}

#[derive(Debug, Serialize)]
pub struct TitleNode {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TitleNode>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    /// SHA-256 of the file contents
    pub sha256: String,
    pub bytes: usize,
    pub env_version: u32,
    pub documents: usize,
    pub terms: usize,
    pub postings: TierCounts,
    pub objects: usize,
    pub object_types: Vec<String>,
    pub tokenizer: TokenizerPolicy,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tree: Vec<TitleNode>,
}

pub fn run(ctx: &AppContext, args: &InspectArgs) -> Result<()> {
    let raw = std::fs::read(&args.index)?;
    let builder = IndexBuilder::from_config(&ctx.config)?;
    let index = decode_raw(&raw, &builder)?;
    let report = build_report(args, &raw, &index);

    emit_formatted(&report, ctx.output_format, human, |r| {
        vec![format!(
            "{}\t{}\t{}\t{}\t{}",
            r.sha256, r.env_version, r.documents, r.terms, r.objects
        )]
    })
}

/// Decode the exact bytes that are digested.
fn decode_raw(raw: &[u8], builder: &IndexBuilder) -> Result<SearchIndex> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| DsError::Format(format!("index is not valid UTF-8: {e}")))?;
    codec::decode(text, builder.env_version(), builder.tokenizer())
}

fn build_report(args: &InspectArgs, raw: &[u8], index: &SearchIndex) -> InspectReport {
    let [title, lead, body] = index.terms().tier_counts();
    InspectReport {
        path: args.index.clone(),
        sha256: hex::encode(Sha256::digest(raw)),
        bytes: raw.len(),
        env_version: index.env_version(),
        documents: index.documents().len(),
        terms: index.terms().len(),
        postings: TierCounts { title, lead, body },
        objects: index.objects().len(),
        object_types: index.objects().types().iter().map(|t| t.tag()).collect(),
        tokenizer: index.tokenizer().policy().clone(),
        tree: if args.no_tree {
            Vec::new()
        } else {
            title_tree(index.titles())
        },
    }
}

fn title_tree(titles: &TitleMap) -> Vec<TitleNode> {
    fn node(titles: &TitleMap, key: &str) -> TitleNode {
        TitleNode {
            path: key.to_string(),
            title: titles.get(key).unwrap_or_default().to_string(),
            children: titles
                .children(key)
                .into_iter()
                .map(|child| node(titles, child))
                .collect(),
        }
    }
    titles.roots().into_iter().map(|root| node(titles, root)).collect()
}

fn human(report: &InspectReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout
        .title(&report.path.display().to_string())
        .kv("sha256", &report.sha256)
        .kv("size", &format!("{} bytes", report.bytes))
        .kv("envversion", &report.env_version.to_string())
        .kv("documents", &report.documents.to_string())
        .kv("terms", &report.terms.to_string())
        .kv(
            "postings",
            &format!(
                "title {} / lead {} / body {}",
                report.postings.title, report.postings.lead, report.postings.body
            ),
        )
        .kv("objects", &report.objects.to_string())
        .kv("object types", &report.object_types.join(", "))
        .kv(
            "tokenizer",
            &format!(
                "stemmer={} stopwords={} max_len={}",
                report.tokenizer.stemmer,
                report.tokenizer.stopwords.len(),
                report.tokenizer.max_token_len
            ),
        );

    if !report.tree.is_empty() {
        layout.blank().section("Titles");
        for root in &report.tree {
            push_node(&mut layout, root, 0);
        }
    }
    layout
}

fn push_node(layout: &mut HumanLayout, node: &TitleNode, depth: usize) {
    let label = if node.title.is_empty() {
        node.path.clone()
    } else {
        format!("{} ({})", node.title, node.path)
    };
    layout.push_line(format!("{}- {label}", "  ".repeat(depth)));
    for child in &node.children {
        push_node(layout, child, depth + 1);
    }
}

//! docsearch search - Full-text search over an index
//!
//! Words are combined with the configured mode (or by default); a word
//! prefixed with `-` removes every document containing it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_formatted};
use crate::error::Result;
use crate::index::{Corpus, IndexBuilder, LoadOutcome, load_or_rebuild};
use crate::search::{CombineMode, QueryEngine, QueryOptions, Resolver, TierWeights};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Index file (searchindex.js or JSON)
    pub index: PathBuf,

    /// Query words; prefix a word with '-' to exclude it (quote multi-word queries)
    #[arg(allow_hyphen_values = true)]
    pub query: String,

    /// Combine words with and|or (default from config)
    #[arg(long, value_enum)]
    pub mode: Option<CombineMode>,

    /// Maximum number of results
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Only documents whose path starts with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Drop results scoring below this
    #[arg(long)]
    pub min_score: Option<u32>,

    /// Also match index terms that contain a query word
    #[arg(long)]
    pub partial: bool,

    /// Rebuild the index from this corpus when it is missing or stale
    #[arg(long)]
    pub corpus: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SearchRow {
    pub rank: usize,
    pub doc: u32,
    pub score: u32,
    pub path: String,
    pub title: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub mode: CombineMode,
    pub terms: Vec<String>,
    pub excluded: Vec<String>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuilt: Option<String>,
    pub results: Vec<SearchRow>,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let (index, rebuilt) = match &args.corpus {
        Some(corpus_path) => {
            let builder = IndexBuilder::from_config(&ctx.config)?;
            let (index, outcome) = load_or_rebuild(
                &args.index,
                &builder,
                ctx.config.index.wrap_js,
                || Corpus::from_path(corpus_path, &ctx.config.build.extensions),
            )?;
            let rebuilt = match outcome {
                LoadOutcome::Loaded => None,
                LoadOutcome::Rebuilt { reason } => Some(reason),
            };
            (Arc::new(index), rebuilt)
        }
        None => (super::load_index(ctx, &args.index)?, None),
    };

    let mut options = QueryOptions::from_config(&ctx.config.search);
    if let Some(mode) = args.mode {
        options = options.with_mode(mode);
    }
    if args.partial && options.partial.is_none() {
        options = options.with_partial(TierWeights {
            title: ctx.config.search.partial_title_weight,
            lead: ctx.config.search.partial_lead_weight,
            body: ctx.config.search.partial_body_weight,
        });
    }
    if let Some(limit) = args.limit {
        options.filters = options.filters.with_limit(limit);
    }
    if let Some(prefix) = &args.prefix {
        options.filters = options.filters.with_path_prefix(prefix.clone());
    }
    if let Some(min_score) = args.min_score {
        options.filters = options.filters.with_min_score(min_score);
    }
    let mode = options.mode;

    let query = args.query.clone();
    let engine = QueryEngine::new(Arc::clone(&index), options);
    let results = engine.search(&query)?;
    let resolver = Resolver::new(index, ctx.config.index.link_suffix.clone());

    let report = SearchReport {
        query,
        mode,
        terms: results.query().terms.clone(),
        excluded: results.query().excluded.clone(),
        count: results.len(),
        rebuilt,
        results: results
            .iter()
            .enumerate()
            .map(|(i, hit)| SearchRow {
                rank: i + 1,
                doc: hit.doc,
                score: hit.score,
                path: hit.path.to_string(),
                title: hit.title.to_string(),
                link: resolver.link(hit.path, None),
            })
            .collect(),
    };

    emit_formatted(&report, ctx.output_format, human, |r| {
        r.results
            .iter()
            .map(|row| format!("{}\t{}\t{}\t{}", row.score, row.doc, row.path, row.title))
            .collect()
    })
}

fn human(report: &SearchReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!(
        "{} result(s) for \"{}\"",
        report.count, report.query
    ));
    if let Some(reason) = &report.rebuilt {
        layout.push_line(format!("{} index rebuilt: {reason}", "!".yellow()));
        layout.blank();
    }
    if report.results.is_empty() {
        layout.push_line("No matching documents.".dimmed().to_string());
        return layout;
    }
    for row in &report.results {
        let title = if row.title.is_empty() {
            row.path.as_str()
        } else {
            row.title.as_str()
        };
        layout.push_line(format!(
            "{:>3}. {} {}",
            row.rank,
            title.bold(),
            format!("[{}]", row.score).dimmed()
        ));
        layout.push_line(format!("     {}", row.link.cyan()));
    }
    layout
}

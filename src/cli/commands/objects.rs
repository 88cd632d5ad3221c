//! docsearch objects - Search documented objects by name

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_formatted};
use crate::error::Result;
use crate::search::{ObjectHit, QueryEngine, QueryOptions, Resolver};

#[derive(Args, Debug)]
pub struct ObjectsArgs {
    /// Index file (searchindex.js or JSON)
    pub index: PathBuf,

    /// Name fragments, matched case-insensitively; '-' excludes (quote multi-word queries)
    #[arg(allow_hyphen_values = true)]
    pub query: String,

    /// Maximum number of results
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Only objects documented under this path prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ObjectRow {
    #[serde(flatten)]
    pub hit: ObjectHit,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct ObjectsReport {
    pub query: String,
    pub count: usize,
    pub results: Vec<ObjectRow>,
}

pub fn run(ctx: &AppContext, args: &ObjectsArgs) -> Result<()> {
    let index = super::load_index(ctx, &args.index)?;

    let mut options = QueryOptions::from_config(&ctx.config.search);
    if let Some(limit) = args.limit {
        options.filters = options.filters.with_limit(limit);
    }
    if let Some(prefix) = &args.prefix {
        options.filters = options.filters.with_path_prefix(prefix.clone());
    }

    let query = args.query.clone();
    let hits = QueryEngine::new(Arc::clone(&index), options).search_objects(&query)?;
    let resolver = Resolver::new(index, ctx.config.index.link_suffix.clone());

    let results: Vec<ObjectRow> = hits
        .into_iter()
        .map(|hit| ObjectRow {
            link: resolver.link(&hit.path, hit.anchor.as_deref()),
            hit,
        })
        .collect();
    let report = ObjectsReport {
        query,
        count: results.len(),
        results,
    };

    emit_formatted(&report, ctx.output_format, human, |r| {
        r.results
            .iter()
            .map(|row| format!("{}\t{}\t{}\t{}", row.hit.score, row.hit.name, row.hit.label, row.link))
            .collect()
    })
}

fn human(report: &ObjectsReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!(
        "{} object(s) matching \"{}\"",
        report.count, report.query
    ));
    if report.results.is_empty() {
        layout.push_line("No matching objects.".dimmed().to_string());
        return layout;
    }
    for row in &report.results {
        layout.push_line(format!(
            "{} {} {}",
            row.hit.name.bold(),
            format!("({})", row.hit.label).dimmed(),
            format!("[{}]", row.hit.score).dimmed()
        ));
        layout.push_line(format!("    {} {}", row.hit.title, row.link.cyan()));
    }
    layout
}

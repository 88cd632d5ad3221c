//! docsearch build - Build a search index from a corpus

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_formatted};
use crate::cli::progress::spinner;
use crate::error::Result;
use crate::index::{Corpus, IndexBuilder, SearchIndex, write_index};

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Corpus file (.json, .yaml) or directory of .md/.rst/.txt pages
    pub corpus: PathBuf,

    /// Output path (default: index.output from config, under the project root)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write bare JSON instead of wrapping it in Search.setIndex(...)
    #[arg(long)]
    pub raw_json: bool,
}

#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub output: PathBuf,
    pub env_version: u32,
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
    pub objects: usize,
    pub object_types: usize,
    pub wrapped: bool,
}

impl BuildReport {
    fn new(output: PathBuf, index: &SearchIndex, wrapped: bool) -> Self {
        Self {
            output,
            env_version: index.env_version(),
            documents: index.documents().len(),
            terms: index.terms().len(),
            postings: index.terms().posting_count(),
            objects: index.objects().len(),
            object_types: index.objects().types().len(),
            wrapped,
        }
    }
}

pub fn run(ctx: &AppContext, args: &BuildArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.project_path(&ctx.config.index.output));
    let wrapped = ctx.config.index.wrap_js && !args.raw_json;

    let pb = spinner(
        format!("Loading corpus from {}", args.corpus.display()),
        ctx.interactive(),
    );
    let built = (|| {
        let builder = IndexBuilder::from_config(&ctx.config)?;
        let corpus = Corpus::from_path(&args.corpus, &ctx.config.build.extensions)?;
        pb.set_message(format!("Indexing {} documents", corpus.documents.len()));
        let index = builder.build(&corpus)?;
        pb.set_message(format!("Writing {}", output.display()));
        write_index(&output, &index, wrapped)?;
        Ok::<_, crate::error::DsError>(index)
    })();
    pb.finish_and_clear();
    let index = built?;

    let report = BuildReport::new(output, &index, wrapped);
    if ctx.quiet && !ctx.output_format.is_machine_readable() {
        return Ok(());
    }
    emit_formatted(&report, ctx.output_format, human, |r| {
        vec![format!(
            "{}\t{}\t{}\t{}",
            r.output.display(),
            r.documents,
            r.terms,
            r.objects
        )]
    })
}

fn human(report: &BuildReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout
        .title(&format!("{} Built {}", "✓".green(), report.output.display()))
        .kv("envversion", &report.env_version.to_string())
        .kv("documents", &report.documents.to_string())
        .kv("terms", &report.terms.to_string())
        .kv("postings", &report.postings.to_string())
        .kv(
            "objects",
            &format!("{} ({} types)", report.objects, report.object_types),
        )
        .kv(
            "format",
            if report.wrapped { "Search.setIndex(...)" } else { "JSON" },
        );
    layout
}

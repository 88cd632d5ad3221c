//! docsearch resolve - Look up a document or object

use std::path::PathBuf;

use clap::{ArgGroup, Args};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_formatted};
use crate::error::Result;
use crate::search::{ResolvedDocument, ResolvedObject, Resolver};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["doc", "path", "object"])))]
pub struct ResolveArgs {
    /// Index file (searchindex.js or JSON)
    pub index: PathBuf,

    /// Document id
    #[arg(long)]
    pub doc: Option<u32>,

    /// Document path, without extension
    #[arg(long)]
    pub path: Option<String>,

    /// Fully-qualified object name
    #[arg(long)]
    pub object: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolved {
    Document(ResolvedDocument),
    Object(ResolvedObject),
}

pub fn run(ctx: &AppContext, args: &ResolveArgs) -> Result<()> {
    let index = super::load_index(ctx, &args.index)?;
    let resolver = Resolver::new(index, ctx.config.index.link_suffix.clone());

    let resolved = if let Some(name) = &args.object {
        Resolved::Object(resolver.resolve_object(name)?)
    } else if let Some(path) = &args.path {
        Resolved::Document(resolver.resolve_path(path)?)
    } else {
        Resolved::Document(resolver.resolve_document(args.doc.unwrap_or_default())?)
    };

    emit_formatted(&resolved, ctx.output_format, human, |r| match r {
        Resolved::Document(doc) => vec![format!("{}\t{}\t{}", doc.doc, doc.title, doc.link)],
        Resolved::Object(obj) => vec![format!("{}\t{}\t{}\t{}", obj.name, obj.label, obj.title, obj.link)],
    })
}

fn human(resolved: &Resolved) -> HumanLayout {
    let mut layout = HumanLayout::new();
    match resolved {
        Resolved::Document(doc) => {
            layout
                .title(if doc.title.is_empty() { "(untitled)" } else { doc.title.as_str() })
                .kv("document", &doc.doc.to_string())
                .kv("path", &doc.path)
                .kv("link", &doc.link);
        }
        Resolved::Object(obj) => {
            layout
                .title(&obj.name)
                .kv("category", &obj.label)
                .kv("document", &format!("{} ({})", obj.title, obj.doc))
                .kv("link", &obj.link);
        }
    }
    layout
}

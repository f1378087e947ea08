mod args;
mod files;
mod logmask;
mod logsev;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use md5::{Digest, Md5};

use args::Args;
use logmask::LogMask;
use toks_index::{Index, QuerySelect};

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let mask = match &args.log_mask {
        Some(s) => LogMask::parse(s),
        None => LogMask::default_mask(),
    };
    logsev::init(mask, args.show_severity);

    match run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            log::info!("Redirecting output to {}", path.display());
            Box::new(
                std::fs::File::create(path)
                    .with_context(|| format!("cannot open {} for write", path.display()))?,
            )
        }
        None => Box::new(std::io::stdout()),
    };

    let mut keywords = toks_core::KeywordTable::new();
    for type_file in &args.type_files {
        let added = files::load_type_file(type_file, &mut keywords)?;
        log::info!("Loaded {added} type name(s) from {}", type_file.display());
    }

    let forced_lang = match &args.language {
        Some(tag) => {
            let lang = toks_core::from_tag(tag);
            if lang.is_none() {
                log::warn!("Ignoring unknown language: {tag}");
                None
            } else {
                Some(lang)
            }
        }
        None => None,
    };

    let mut sources = args.files.clone();
    if let Some(list) = &args.file_list {
        sources.extend(files::read_source_list(list)?);
    }

    if sources.is_empty() && args.identifier.is_none() {
        Args::command().print_help()?;
        return Ok(());
    }

    let mut index = Index::open(&args.index)
        .with_context(|| format!("cannot use index {}", args.index.display()))?;

    if !sources.is_empty() {
        index.prune_missing()?;

        let mut error_count = 0u32;
        for source in &sources {
            if let Err(e) =
                do_source_file(&mut index, &keywords, forced_lang, source, args.dump, &mut out)
            {
                log::error!("{source}: {e:#}");
                error_count += 1;
            }
        }
        if error_count > 0 {
            log::warn!("{error_count} file(s) could not be indexed");
        }
    }

    if let Some(identifier) = &args.identifier {
        let select = if args.refs || args.defs || args.decls {
            QuerySelect {
                refs: args.refs,
                defs: args.defs,
                decls: args.decls,
            }
        } else {
            QuerySelect {
                refs: true,
                defs: true,
                decls: true,
            }
        };
        for hit in index.query(identifier, select)? {
            writeln!(
                out,
                "{}:{}:{} {} {} {} {}",
                hit.file,
                hit.line,
                hit.col,
                hit.scope,
                hit.kind.name(),
                hit.sub_kind.name(),
                hit.identifier
            )?;
        }
    }

    Ok(())
}

/// Analyze one source file and write its entries to the index. Skips
/// the pipeline entirely when the stored digest still matches.
fn do_source_file(
    index: &mut Index,
    keywords: &toks_core::KeywordTable,
    forced_lang: Option<toks_core::LangFlags>,
    filename: &str,
    dump: bool,
    out: &mut Box<dyn Write>,
) -> Result<()> {
    let lang = forced_lang.unwrap_or_else(|| toks_core::from_filename(filename));

    let raw = std::fs::read(Path::new(filename))
        .with_context(|| format!("cannot read {filename}"))?;
    let data = toks_core::decode(&raw)?;

    let digest: String = Md5::digest(&raw)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    let Some(filerow) = index.prepare_for_file(&digest, filename)? else {
        return Ok(());
    };

    log::info!(
        "Parsing: {filename} as language {}",
        toks_core::lang_to_string(lang)
    );

    let state = toks_core::analyze(&data, lang, keywords)?;

    if dump {
        toks_core::dump_tokens(&state, out)?;
    }

    let mut session = index.file_session(filerow);
    toks_core::output(&state, &mut session)
        .map_err(|e| anyhow::anyhow!("index write failed: {e}"))?;

    Ok(())
}

//! invex command line driver
//!
//! Two entry points: `index` builds the full index set for a corpus laid
//! out as `<data_dir>/<block>/<doc>.txt`, `search` answers a conjunctive
//! query against a finished build, printing matching document names one
//! per line.

use anyhow::{bail, Context};
use invex::{BsbiIndexer, Codec, IndexManifest, Searcher};
use std::env;
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("--help") | Some("-h") => print_help(),
        Some("--version") | Some("-v") => println!("invex v{}", VERSION),
        Some("index") => cmd_index(&args[1..])?,
        Some("search") => cmd_search(&args[1..])?,
        Some(other) => {
            print_help();
            bail!("unknown command: {}", other);
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        r#"invex v{} - blocked inverted index engine

Usage:
  invex-cli index  <data_dir> <output_dir> [--codec standard|vbyte|bic]
  invex-cli search <output_dir> <query...> [--codec standard|vbyte|bic]
  invex-cli --version
  invex-cli --help

The corpus is laid out as <data_dir>/<block>/<doc>.txt, one sub-directory
per block. Indexing writes the merged index, its id maps and a manifest
into <output_dir>; search prints matching document names one per line.

The codec given to search must match the one used at indexing time
(default: vbyte)."#,
        VERSION
    );
}

/// Strip `--codec NAME` out of the argument list, wherever it appears.
fn split_codec(args: &[String]) -> anyhow::Result<(Vec<&str>, Codec)> {
    let mut rest = Vec::new();
    let mut codec = Codec::VByte;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        if arg == "--codec" {
            let name = it.next().context("--codec needs a value")?;
            codec = Codec::parse(name)?;
        } else {
            rest.push(arg.as_str());
        }
    }
    Ok((rest, codec))
}

fn cmd_index(args: &[String]) -> anyhow::Result<()> {
    let (rest, codec) = split_codec(args)?;
    let &[data_dir, output_dir] = rest.as_slice() else {
        bail!("usage: invex-cli index <data_dir> <output_dir> [--codec standard|vbyte|bic]");
    };

    let mut indexer = BsbiIndexer::new(PathBuf::from(data_dir), PathBuf::from(output_dir), codec);
    let manifest = indexer
        .index()
        .with_context(|| format!("indexing {}", data_dir))?;
    println!(
        "indexed {} blocks, {} documents, {} terms ({} codec)",
        manifest.blocks, manifest.documents, manifest.terms, manifest.codec
    );
    Ok(())
}

fn cmd_search(args: &[String]) -> anyhow::Result<()> {
    let (rest, codec) = split_codec(args)?;
    let Some((&output_dir, query_parts)) = rest.split_first() else {
        bail!("usage: invex-cli search <output_dir> <query...> [--codec standard|vbyte|bic]");
    };
    if query_parts.is_empty() {
        bail!("empty query");
    }
    let output_dir = PathBuf::from(output_dir);

    // fail fast when the build manifest records a different codec
    if IndexManifest::exists(&output_dir) {
        let manifest = IndexManifest::load(&output_dir)?;
        if Codec::parse(&manifest.codec)? != codec {
            bail!(
                "index was built with the {} codec, not {}",
                manifest.codec,
                codec.name()
            );
        }
    }

    let query = query_parts.join(" ");
    let searcher = Searcher::new(output_dir, codec);
    for name in searcher
        .retrieve(&query)
        .with_context(|| format!("query \"{}\"", query))?
    {
        println!("{}", name);
    }
    Ok(())
}

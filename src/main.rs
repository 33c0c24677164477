//! classdoc CLI. Two modes:
//!
//! - **stdin mode**: `classdoc < Logger.php` scans one source buffer and
//!   writes the documentation model of every contained class to stdout.
//! - **file mode**: `classdoc -o docs/model src/**/*.php` scans all inputs
//!   into one registry (so cross-file inheritance resolves) and writes one
//!   JSON document per class.

use anyhow::{Context, Result};
use clap::Parser;
use classdoc::{AtlasIndex, ClassDocAssembler, ClassRegistry};
use serde_json::json;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "classdoc",
    about = "Extract structured API documentation models from PHP class definitions"
)]
struct Cli {
    /// Input files (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given, unless --class is)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Only emit the document for this class (fully qualified name)
    #[arg(short = 'c', long = "class")]
    class: Option<String>,

    /// Reference index JSON used for methods without a docblock summary
    #[arg(long)]
    atlas: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let atlas = match cli.atlas.as_deref() {
        Some(path) => AtlasIndex::from_json_file(path)
            .with_context(|| format!("failed to load atlas index: {}", path.display()))?,
        None => AtlasIndex::new(),
    };

    if cli.files.is_empty() {
        return stdin_mode(&cli, &atlas);
    }

    file_mode(&cli, &atlas)
}

/// stdin mode: scan one buffer, write the model JSON to stdout.
fn stdin_mode(cli: &Cli, atlas: &AtlasIndex) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let mut registry = ClassRegistry::new();
    classdoc::scan_source(&input, &mut registry);

    let output = match cli.class.as_deref() {
        Some(name) => {
            let assembler = ClassDocAssembler::new(registry.handle(name)?, atlas);
            serde_json::to_string_pretty(&class_document(&assembler))?
        }
        None => {
            let mut documents = serde_json::Map::new();
            for name in registry.class_names() {
                let assembler = ClassDocAssembler::new(registry.handle(name)?, atlas);
                documents.insert(name.to_string(), class_document(&assembler));
            }
            serde_json::to_string_pretty(&serde_json::Value::Object(documents))?
        }
    };

    println!("{}", output);
    Ok(())
}

/// file mode: scan every input into one registry, then write per-class
/// documents to the output directory (or a single document to stdout when
/// --class is given without --output).
fn file_mode(cli: &Cli, atlas: &AtlasIndex) -> Result<()> {
    let input_files = expand_globs(&cli.files)?;

    let mut registry = ClassRegistry::new();
    for path in &input_files {
        if let Err(e) = classdoc::scan_path(path, &mut registry) {
            eprintln!("warning: skipping {}: {}", path.display(), e);
        }
    }

    if let Some(name) = cli.class.as_deref() {
        let assembler = ClassDocAssembler::new(registry.handle(name)?, atlas);
        let document = serde_json::to_string_pretty(&class_document(&assembler))?;
        match cli.output.as_deref() {
            Some(dir) => write_document(dir, name, &document)?,
            None => println!("{}", document),
        }
        return Ok(());
    }

    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    for name in registry.class_names() {
        let assembler = ClassDocAssembler::new(registry.handle(name)?, atlas);
        let document = serde_json::to_string_pretty(&class_document(&assembler))?;
        write_document(output_dir, name, &document)?;
    }

    Ok(())
}

/// The full per-class document: the assembler's queries under the field
/// names downstream consumers rely on.
fn class_document(assembler: &ClassDocAssembler) -> serde_json::Value {
    json!({
        "name": assembler.class_name(),
        "description": assembler.class_description(),
        "parent": assembler.parent_class_name(),
        "interfaces": assembler.interfaces(),
        "methods": assembler.methods_details(),
        "inheritedMethods": assembler.inherited_methods(),
        "constants": assembler.constants_details(),
        "inheritedConstants": assembler.inherited_constants(),
    })
}

fn write_document(dir: &Path, class_name: &str, document: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    let out_path = dir.join(format!("{}.json", output_file_stem(class_name)));
    fs::write(&out_path, format!("{}\n", document))
        .with_context(|| format!("failed to write {}", out_path.display()))
}

/// File extensions recognized as PHP source files.
const SUPPORTED_EXTENSIONS: &[&str] = &["php", "inc"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
                        if SUPPORTED_EXTENSIONS.contains(&ext) {
                            files.push(p);
                        }
                    }
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

/// Derive the output file stem from a fully qualified class name.
/// `App\Models\Logger` becomes `App.Models.Logger`.
fn output_file_stem(class_name: &str) -> String {
    class_name.trim_start_matches('\\').replace('\\', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_for_global_class() {
        assert_eq!(output_file_stem("Logger"), "Logger");
    }

    #[test]
    fn stem_for_namespaced_class() {
        assert_eq!(output_file_stem("App\\Models\\Logger"), "App.Models.Logger");
        assert_eq!(output_file_stem("\\App\\Logger"), "App.Logger");
    }
}

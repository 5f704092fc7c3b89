//! # rowcast-cli
//!
//! Command-line interface for importing spreadsheet tables as typed records.

mod manifest;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use manifest::Manifest;
use rowcast_core::{
    import_book, import_book_collecting, is_importable_path, schema_from_sheet, AssetCatalog,
    AssetDefinition, ImportResult, TypeRegistry,
};
use rowcast_sheet::a1_notation::column_letters;
use rowcast_sheet::{Book, CsvOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// rowcast - import spreadsheet tables as typed records
#[derive(Parser)]
#[command(name = "rowcast")]
#[command(author, version, about = "Import spreadsheet tables as typed records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Import workbooks and write one JSON file per asset
    Import(ImportArgs),
    /// Print the schema read from each sheet's header rows
    Schema {
        /// Workbook or CSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Args)]
struct ImportArgs {
    /// Workbook or CSV files, or directories containing them
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Import manifest (YAML) declaring types, records and assets
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Directory the JSON output is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Report every failing row and keep importing
    #[arg(short, long)]
    keep_going: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match cli.command {
        Command::Import(args) => run_import(&args),
        Command::Schema { file } => run_schema(&file),
    }
}

/// Run the import command.
fn run_import(args: &ImportArgs) -> Result<()> {
    let (registry, catalog) = match &args.manifest {
        Some(path) => {
            let manifest = Manifest::load(path)?;
            let registry = manifest.registry()?;
            let catalog = manifest.catalog(&registry)?;
            (registry, Some(catalog))
        }
        None => (TypeRegistry::new(), None),
    };

    let mut failed = 0usize;
    for path in collect_files(&args.files)? {
        match import_file(&path, &registry, catalog.as_ref(), args) {
            Ok(true) => {}
            Ok(false) => failed += 1,
            Err(e) if args.keep_going => {
                eprintln!("{} {e:#}", "Error:".red().bold());
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if failed > 0 {
        bail!("{failed} file(s) failed to import");
    }
    Ok(())
}

/// Expand directories into the importable files they contain, sorted by name.
fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory: {}", input.display()))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.retain(|path| path.is_file() && is_importable_path(path));
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Import one file. Returns `Ok(false)` when rows failed under `--keep-going`.
fn import_file(
    path: &Path,
    registry: &TypeRegistry,
    catalog: Option<&AssetCatalog>,
    args: &ImportArgs,
) -> Result<bool> {
    if !is_importable_path(path) {
        tracing::warn!(path = %path.display(), "not a workbook, skipped");
        return Ok(true);
    }

    let Some(catalog) = catalog else {
        let book = load_book(path)?;
        let asset = AssetDefinition::for_book(&book);
        return finish_import(path, &book, &asset, registry, args);
    };
    let Some(asset) = catalog.resolve(path) else {
        tracing::info!(path = %path.display(), "no asset for workbook, skipped");
        return Ok(true);
    };

    let book = load_book(path)?;
    finish_import(path, &book, asset, registry, args)
}

fn finish_import(
    path: &Path,
    book: &Book,
    asset: &AssetDefinition,
    registry: &TypeRegistry,
    args: &ImportArgs,
) -> Result<bool> {
    let result = if args.keep_going {
        import_book_collecting(book, asset, registry)
    } else {
        import_book(book, asset, registry)
    }
    .with_context(|| format!("Failed to import {}", path.display()))?;

    for err in &result.errors {
        eprintln!("{} {err}", "Error:".red().bold());
    }

    let out = write_output(&result, asset, args)?;
    println!(
        "{} {} -> {} ({} records)",
        "Imported".green().bold(),
        path.display(),
        out.display(),
        result.record_count()
    );
    Ok(result.is_ok())
}

fn load_book(path: &Path) -> Result<Book> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let book = match extension.as_deref() {
        Some("csv") => Book::from_csv(path),
        Some("tsv") => Book::from_csv_with_options(path, CsvOptions::tsv()),
        _ => Book::from_excel(path),
    };
    book.with_context(|| format!("Failed to read workbook: {}", path.display()))
}

/// Write `<asset>.json` under the output directory and return its path.
fn write_output(
    result: &ImportResult,
    asset: &AssetDefinition,
    args: &ImportArgs,
) -> Result<PathBuf> {
    let dir = match &asset.output {
        Some(output) => args.out_dir.join(output),
        None => args.out_dir.clone(),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let json = result.to_json();
    let mut content = if args.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    content.push('\n');

    let path = dir.join(format!("{}.json", asset.name));
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(path)
}

/// Run the schema command.
fn run_schema(path: &Path) -> Result<()> {
    let book = load_book(path)?;

    for (name, sheet) in book.sheets() {
        println!("{}", name.cyan().bold());
        match schema_from_sheet(sheet) {
            Some(fields) => {
                for field in fields {
                    print!(
                        "  {:>3}  {}: {}",
                        column_letters(field.column),
                        field.name,
                        field.declared_type.yellow()
                    );
                    if field.comment.is_empty() {
                        println!();
                    } else {
                        println!("  {}", format!("// {}", field.comment).dimmed());
                    }
                }
            }
            None => println!("  {}", "(no schema)".dimmed()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn import_args(files: Vec<PathBuf>, out_dir: &Path) -> ImportArgs {
        ImportArgs {
            files,
            manifest: None,
            out_dir: out_dir.to_path_buf(),
            keep_going: false,
            pretty: false,
        }
    }

    // ========================================================================
    // CLI argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parse_import() {
        let cli = Cli::parse_from([
            "rowcast", "import", "Items.xlsx", "Monsters.xlsx", "-m", "rowcast.yaml", "--pretty",
        ]);
        let Command::Import(args) = cli.command else {
            panic!("expected import command");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.manifest, Some(PathBuf::from("rowcast.yaml")));
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert!(args.pretty);
        assert!(!args.keep_going);
    }

    #[test]
    fn test_cli_parse_schema() {
        let cli = Cli::parse_from(["rowcast", "schema", "Items.xlsx", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Schema { file } if file == Path::new("Items.xlsx")));
    }

    #[test]
    fn test_cli_import_requires_files() {
        assert!(Cli::try_parse_from(["rowcast", "import"]).is_err());
    }

    // ========================================================================
    // Import tests
    // ========================================================================

    #[test]
    fn test_import_csv_without_manifest() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("weapons.csv");
        std::fs::write(&input, "id,name\nint,string\n\n1,Axe\n#2,Old\n3,Bow\n").unwrap();

        let out = dir.path().join("out");
        run_import(&import_args(vec![input], &out)).unwrap();

        let content = std::fs::read_to_string(out.join("weapons.json")).unwrap();
        assert_eq!(
            content,
            "{\"weapons\":[{\"id\":1,\"name\":\"Axe\"},{\"id\":3,\"name\":\"Bow\"}]}\n"
        );
    }

    #[test]
    fn test_import_with_manifest_and_keep_going() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("ItemTable.csv"),
            "id,kind\nint,Kind\n\n1,Sword\n2,Spoon\n3,Shield\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("~$ItemTable.csv"), "locked").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let manifest = dir.path().join("rowcast.yaml");
        std::fs::write(
            &manifest,
            "enums:\n  Kind: [Sword, Shield]\nrecords:\n  Item: { id: int, kind: Kind }\n\
             assets:\n  - name: Items\n    excel_name: ItemTable\n    output: data\n    sheets:\n      ItemTable: Item\n",
        )
        .unwrap();

        let out = dir.path().join("out");
        let mut args = import_args(vec![dir.path().to_path_buf()], &out);
        args.manifest = Some(manifest);

        assert!(run_import(&args).is_err());
        assert!(!out.join("data/Items.json").exists());

        args.keep_going = true;
        let err = run_import(&args).unwrap_err();
        assert_eq!(err.to_string(), "1 file(s) failed to import");

        let content = std::fs::read_to_string(out.join("data/Items.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ItemTable": [{"id": 1, "kind": "Sword"}, {"id": 3, "kind": "Shield"}]
            })
        );
    }

    #[test]
    fn test_collect_files_filters_directories() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.xlsx"), "").unwrap();
        std::fs::write(dir.path().join("a.csv"), "").unwrap();
        std::fs::write(dir.path().join("~$b.xlsx"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.xlsx"]);
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Amalthea: Image Tagging
//!
//! Command-line front end for browsing the working image folder and editing
//! sidecar tag files.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use amalthea::collection::{canonical_image_path, Lookup};
use amalthea::config::AppConfig;
use amalthea::tags::TagSet;
use amalthea::{AmaltheaError, FileFailure, Result, Session};

/// Amalthea CLI - Image Tagging
#[derive(Parser, Debug)]
#[command(name = "amalthea")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Tag images with sidecar text files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "amalthea.json", global = true)]
    config: PathBuf,

    /// Working image folder (overrides config)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Images(ImageCommands),

    /// Initialize a new Amalthea project
    Init {
        /// Directory to initialize (default: current)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Commands that operate on the working folder
#[derive(Subcommand, Debug)]
enum ImageCommands {
    /// List images in the working folder with their tags
    List,

    /// Show one image: position, dimensions and tags
    Show {
        /// Image file name or path (default: first image)
        image: Option<PathBuf>,
    },

    /// Print the image after the given one (wraps around)
    Next {
        image: PathBuf,
    },

    /// Print the image before the given one (wraps around)
    Prev {
        image: PathBuf,
    },

    /// Replace the tags of an image
    Tag {
        /// Image file name or path
        image: PathBuf,

        /// Tags separated by commas or spaces (omit to store no tags)
        tags: Option<String>,
    },

    /// Delete the tag file of an image
    Untag {
        image: PathBuf,
    },

    /// Add a tag to every image in the working folder
    TagAll {
        tag: String,
    },

    /// Add a tag to every image in another folder
    TagFolder {
        folder: PathBuf,
        tag: String,
    },

    /// Copy images and tag files from a folder into the working folder
    Import {
        folder: PathBuf,
    },

    /// Copy the working images and tags into <FOLDER>/dataset
    Export {
        folder: PathBuf,

        /// Clear the working folder after a successful export
        #[arg(long)]
        clear: bool,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Delete every file in the working folder except the placeholder
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "amalthea.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(dir) = &cli.dir {
        config.working_dir = dir.clone();
    }

    let json = cli.format == "json";

    match cli.command {
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        Some(Commands::Init { path, force }) => run_init(path, force),
        Some(Commands::Images(command)) => run_command(Session::open(config), command, json),
        None => run_command(Session::open(config), ImageCommands::List, json),
    }
}

/// Run a command against the working folder
fn run_command(mut session: Session, command: ImageCommands, json: bool) -> Result<()> {
    match command {
        ImageCommands::List => run_list(&session, json),
        ImageCommands::Show { image } => {
            if let Some(image) = image {
                select_image(&mut session, &image)?;
            }
            run_show(&session, json)
        }
        ImageCommands::Next { image } => {
            let target = resolve_image(&session, &image);
            print_neighbour(session.collection().next(&target), json)
        }
        ImageCommands::Prev { image } => {
            let target = resolve_image(&session, &image);
            print_neighbour(session.collection().previous(&target), json)
        }
        ImageCommands::Tag { image, tags } => {
            select_image(&mut session, &image)?;
            session.save_current_tags(tags.as_deref())?;
            if !json {
                println!("{}", session.status());
            }
            Ok(())
        }
        ImageCommands::Untag { image } => {
            select_image(&mut session, &image)?;
            session.delete_current_tags()?;
            Ok(())
        }
        ImageCommands::TagAll { tag } => {
            let report = session.apply_tag_to_all(&tag)?;
            print_failures(&report.failures);
            emit(&report, json, || {
                println!(
                    "Tagged {} images with '{}' ({} already had it)",
                    report.tagged, tag.trim(), report.already_tagged
                );
            })
        }
        ImageCommands::TagFolder { folder, tag } => {
            let report = session.apply_tag_to_folder(&tag, &folder)?;
            print_failures(&report.failures);
            emit(&report, json, || {
                println!(
                    "Tagged {} images in {} with '{}' ({} already had it)",
                    report.tagged, folder.display(), tag.trim(), report.already_tagged
                );
            })
        }
        ImageCommands::Import { folder } => {
            let report = session.import_folder(&folder)?;
            print_failures(&report.failures);
            for skipped in &report.skipped {
                warn!("Skipped existing image: {}", skipped.display());
            }
            emit(&report, json, || {
                println!(
                    "Imported {} images and {} tag files",
                    report.images_imported, report.tags_imported
                );
            })
        }
        ImageCommands::Export { folder, clear, force } => {
            if session.collection().is_empty() {
                return Err(AmaltheaError::NoImages);
            }
            let clear = clear
                && (force || confirm(&format!(
                    "Clear {} after export?",
                    session.working_dir().display()
                ))?);

            let outcome = session.export_dataset(&folder, clear)?;
            print_failures(&outcome.export.failures);
            emit(&outcome, json, || {
                println!(
                    "Exported {} images and {} tag files to {}",
                    outcome.export.images_exported,
                    outcome.export.tags_exported,
                    outcome.export.dataset_dir.display()
                );
                if let Some(cleared) = &outcome.cleared {
                    println!("Cleared {} files from the working folder", cleared.deleted);
                }
            })
        }
        ImageCommands::Clear { force } => {
            if !force && !confirm(&format!("Delete all files in {}?", session.working_dir().display()))? {
                eprintln!("Clear cancelled");
                return Ok(());
            }
            let report = session.clear_working_folder()?;
            print_failures(&report.failures);
            emit(&report, json, || {
                println!("Deleted {} files", report.deleted);
            })
        }
    }
}

/// Map a user-supplied image argument onto the working folder.
///
/// Accepts either a path as listed or a bare file name inside the working folder.
/// Turn a CLI image argument into the collection's absolute form.
/// Bare names are looked up in the working folder first.
fn resolve_image(session: &Session, image: &Path) -> PathBuf {
    let collection = session.collection();
    if let Lookup::Found(index) = collection.locate(&session.working_dir().join(image)) {
        if let Some(path) = collection.get(index) {
            return path.to_path_buf();
        }
    }
    canonical_image_path(image).unwrap_or_else(|| image.to_path_buf())
}

fn select_image(session: &mut Session, image: &Path) -> Result<()> {
    let target = resolve_image(session, image);
    match session.select(&target) {
        Lookup::Found(_) => Ok(()),
        Lookup::NotFound => Err(AmaltheaError::NotInCollection(image.to_path_buf())),
    }
}

#[derive(Serialize)]
struct ImageEntry<'a> {
    path: &'a Path,
    tags: Vec<&'a str>,
}

fn run_list(session: &Session, json: bool) -> Result<()> {
    let store = session.store();
    let images: Vec<(&Path, TagSet)> = session
        .collection()
        .images()
        .iter()
        .map(|p| (p.as_path(), TagSet::parse(&store.load(p))))
        .collect();

    if json {
        let entries: Vec<ImageEntry> = images
            .iter()
            .map(|(path, tags)| ImageEntry { path: *path, tags: tags.iter().collect() })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if images.is_empty() {
        println!("{}", session.status());
        return Ok(());
    }

    for (path, tags) in &images {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if tags.is_empty() {
            println!("{}", name);
        } else {
            println!("{}: {}", name, tags);
        }
    }
    println!("\n{} images in {}", images.len(), session.working_dir().display());
    Ok(())
}

fn run_show(session: &Session, json: bool) -> Result<()> {
    let Some(path) = session.current() else {
        println!("{}", session.status());
        return Ok(());
    };
    let tags = session.current_tags().unwrap_or_default();

    let dimensions = match session.current_preview() {
        Ok(preview) => Some(preview.original_size()),
        Err(e) => {
            warn!("Cannot display image {}: {}", path.display(), e);
            None
        }
    };

    if json {
        let value = serde_json::json!({
            "path": path,
            "position": session.current_index().map(|i| i + 1),
            "total": session.collection().len(),
            "width": dimensions.map(|d| d.0),
            "height": dimensions.map(|d| d.1),
            "tags": tags,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", path.file_name().unwrap_or_default().to_string_lossy());
    println!("  {}", session.status());
    if let Some((width, height)) = dimensions {
        println!("  Size: {}x{}", width, height);
    }
    println!("  Tags: {}", tags);
    Ok(())
}

fn print_neighbour(path: Option<&Path>, json: bool) -> Result<()> {
    match (path, json) {
        (Some(p), true) => println!("{}", serde_json::to_string(&p)?),
        (None, true) => println!("null"),
        (Some(p), false) => println!("{}", p.display()),
        (None, false) => println!("No images found in the images directory"),
    }
    Ok(())
}

fn print_failures(failures: &[FileFailure]) {
    for failure in failures {
        eprintln!("  Failed: {} ({})", failure.path.display(), failure.reason);
    }
}

/// Print a report as JSON, or run the text printer
fn emit<T: Serialize>(report: &T, json: bool, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        text();
    }
    Ok(())
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" is a no
fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Working folder: {}", config.working_dir.display());
            println!("  Reserved file: {}", config.reserved_file);
            println!("  Preview box: {}x{}", config.preview.max_width, config.preview.max_height);
            println!("  Export folder name: {}", config.export.subdir);
        }
    }

    Ok(())
}

/// Initialize a new Amalthea project
fn run_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("amalthea.json");

    if config_path.exists() && !force {
        return Err(AmaltheaError::Config(
            "amalthea.json already exists. Use --force to overwrite".to_string()
        ));
    }

    let config = AppConfig::default();

    // Create the working folder with its placeholder so it survives version control
    let images_dir = target.join(&config.working_dir);
    std::fs::create_dir_all(&images_dir)?;
    let placeholder = images_dir.join(&config.reserved_file);
    if !placeholder.exists() {
        std::fs::write(&placeholder, "")?;
    }

    config.save(&config_path)?;
    info!("Initialized project in {:?}", target);

    println!("Amalthea initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - amalthea.json");
    println!("  - {}/{}", config.working_dir.display(), config.reserved_file);
    println!("\nNext steps:");
    println!("  1. Copy images in: amalthea import <folder>");
    println!("  2. Tag them: amalthea tag <image> \"cat, pet\"");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["amalthea"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
        assert_eq!(cli.format, "text");
    }

    #[test]
    fn test_cli_tag_command() {
        let cli = Cli::try_parse_from([
            "amalthea", "tag", "photo.jpg", "cat, pet", "--dir", "/tmp/images"
        ]).unwrap();

        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/images")));
        match cli.command {
            Some(Commands::Images(ImageCommands::Tag { image, tags })) => {
                assert_eq!(image, PathBuf::from("photo.jpg"));
                assert_eq!(tags.as_deref(), Some("cat, pet"));
            }
            _ => panic!("Expected Tag command"),
        }
    }

    #[test]
    fn test_cli_tag_without_tags() {
        let cli = Cli::try_parse_from(["amalthea", "tag", "photo.jpg"]).unwrap();
        match cli.command {
            Some(Commands::Images(ImageCommands::Tag { tags, .. })) => assert!(tags.is_none()),
            _ => panic!("Expected Tag command"),
        }
    }

    #[test]
    fn test_cli_export_command() {
        let cli = Cli::try_parse_from([
            "amalthea", "export", "/tmp/out", "--clear", "--format", "json"
        ]).unwrap();

        assert_eq!(cli.format, "json");
        match cli.command {
            Some(Commands::Images(ImageCommands::Export { folder, clear, force })) => {
                assert_eq!(folder, PathBuf::from("/tmp/out"));
                assert!(clear);
                assert!(!force);
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_tag_folder_command() {
        let cli = Cli::try_parse_from(["amalthea", "tag-folder", "/data/more", "nature"]).unwrap();
        match cli.command {
            Some(Commands::Images(ImageCommands::TagFolder { folder, tag })) => {
                assert_eq!(folder, PathBuf::from("/data/more"));
                assert_eq!(tag, "nature");
            }
            _ => panic!("Expected TagFolder command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["amalthea", "list", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_resolve_image_accepts_bare_name() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("images");
        std::fs::create_dir(&work).unwrap();
        std::fs::write(work.join("a.png"), b"A").unwrap();

        let config = AppConfig { working_dir: work.clone(), ..AppConfig::default() };
        let mut session = Session::open(config);

        let absolute = session.working_dir().join("a.png");
        assert_eq!(resolve_image(&session, Path::new("a.png")), absolute);
        assert_eq!(resolve_image(&session, &work.join(".").join("a.png")), absolute);
        assert!(select_image(&mut session, Path::new("a.png")).is_ok());
        assert!(matches!(
            select_image(&mut session, Path::new("b.png")),
            Err(AmaltheaError::NotInCollection(_))
        ));
    }
}

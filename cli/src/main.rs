//! unodt CLI - ODT to reStructuredText conversion tool
//!
//! A command-line tool for converting OpenDocument Text files to reStructuredText.

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unodt::{parse_file, render, RenderOptions, Unodt};

/// ODT documents to reStructuredText
#[derive(Parser)]
#[command(
    name = "unodt",
    author = "iyulab",
    version,
    about = "Convert ODT documents to reStructuredText",
    long_about = "unodt - OpenDocument Text to reStructuredText converter.\n\n\
                  Pictures are copied into an image folder next to the output and \n\
                  matched by content, so re-running a conversion reuses them.\n\n\
                  Usage:\n  \
                  unodt <file>              Convert to <file>.rst\n  \
                  unodt <file> <output>     Convert to the given file\n  \
                  unodt rst <file>          Print reStructuredText to stdout"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (for default conversion)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output file path (default: input with .rst extension)
    #[arg(global = false)]
    output: Option<PathBuf>,

    #[command(flatten)]
    convert: ConvertArgs,

    /// Log progress details (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Conversion flags shared by the default command and `convert`
#[derive(Args, Clone)]
struct ConvertArgs {
    /// Image folder, relative to the output file
    #[arg(long, default_value = unodt::DEFAULT_IMAGE_DIR)]
    images: String,

    /// Do not copy pictures; keep package image paths
    #[arg(long)]
    no_images: bool,

    #[command(flatten)]
    render: RenderArgs,
}

/// Rendering flags
#[derive(Args, Clone)]
struct RenderArgs {
    /// Skip malformed tables instead of failing
    #[arg(long)]
    lenient: bool,

    /// Write paragraph and title debug markers
    #[arg(long)]
    debug_markers: bool,

    /// Keep each paragraph on a single line
    #[arg(long)]
    no_sentence_split: bool,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let mut options = RenderOptions::default();
        if self.lenient {
            options = options.lenient();
        }
        if self.debug_markers {
            options = options.with_debug_markers();
        }
        if self.no_sentence_split {
            options = options.without_sentence_split();
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document (default command)
    Convert {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: input with .rst extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Render a document without copying pictures
    Rst {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: RenderArgs,
    },

    /// Dump the document node tree as JSON
    Tree {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show document information and metadata
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Extract the pictures of a document
    Extract {
        /// Input file path
        input: PathBuf,

        /// Output directory for pictures
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = log_level(verbose);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Default log filter for the number of `-v` flags. `RUST_LOG` overrides it.
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        // Handle default command (unodt <file> [output])
        return match cli.input {
            Some(input) => run_convert(&input, cli.output.as_deref(), &cli.convert),
            None => {
                use clap::CommandFactory;
                Cli::command().print_help()?;
                Ok(())
            }
        };
    };

    match command {
        Commands::Convert {
            input,
            output,
            args,
        } => {
            run_convert(&input, output.as_deref(), &args)?;
        }

        Commands::Rst {
            input,
            output,
            args,
        } => {
            let pb = create_spinner("Parsing document...");

            let doc = parse_file(&input)?;
            pb.set_message("Rendering to reStructuredText...");

            let rst = render::render_rst(&doc, &args.options())?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &rst)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to reStructuredText: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Tree {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Parsing document...");

            let doc = parse_file(&input)?;
            pb.set_message("Rendering to JSON...");

            let json = if compact {
                serde_json::to_string(&doc)?
            } else {
                doc.raw_content()
            };

            pb.finish_and_clear();
            write_output(output.as_deref(), &json)?;

            if let Some(path) = output {
                println!("{} Wrote node tree: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing document...");

            let format = unodt::detect_format_from_path(&input)?;
            let doc = parse_file(&input)?;

            pb.finish_and_clear();

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Format".bold(), format);
            println!("{}: {}", "Pictures".bold(), doc.pictures.len());

            if let Some(ref title) = doc.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = doc.metadata.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref generator) = doc.metadata.generator {
                println!("{}: {}", "Generator".bold(), generator);
            }

            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Headings".bold(), doc.heading_count());
            println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
            println!("{}: {}", "Tables".bold(), doc.table_count());
        }

        Commands::Extract { input, output } => {
            let pb = create_spinner("Extracting pictures...");

            let doc = parse_file(&input)?;

            fs::create_dir_all(&output)?;

            let mut count = 0;
            for picture in doc.pictures.values() {
                fs::write(output.join(picture.file_name()), &picture.data)?;
                count += 1;
            }

            pb.finish_and_clear();

            if count > 0 {
                println!(
                    "{} Extracted {} pictures to {}",
                    "✓".green().bold(),
                    count,
                    output.display()
                );
            } else {
                println!("{} No pictures found in document", "!".yellow().bold());
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run the default convert command - writes the .rst file and its pictures
fn run_convert(
    input: &Path,
    output: Option<&Path>,
    args: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Parsing document...");

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => unodt::default_output_path(input),
    };

    log::info!("input: {}", input.display());
    log::info!("output: {}", output_path.display());
    log::info!("images: {}", args.images);

    let parsed = Unodt::new()
        .with_render_options(args.render.options())
        .with_images(!args.no_images)
        .with_image_dir(args.images.clone())
        .parse(input)?;

    pb.set_message("Writing reStructuredText...");
    let pictures = parsed.write_to(&output_path)?;

    pb.finish_and_clear();

    // Print summary
    println!("{}", "Conversion Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("  {} {}", "✓".green(), output_path.display());
    if !pictures.is_empty() {
        println!("  {} {}/ ({} pictures)", "✓".green(), args.images, pictures.len());
    }

    let doc = parsed.document();
    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Headings".bold(), doc.heading_count());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.table_count());

    Ok(())
}

fn print_version() {
    println!("{} {}", "unodt".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("OpenDocument Text to reStructuredText conversion");
    println!();
    println!("Supported formats: ODT, Flat ODT (.fodt)");
    println!("Repository: https://github.com/iyulab/unodt");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", content)?;
        }
    }
    Ok(())
}

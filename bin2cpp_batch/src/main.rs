use bin2cpp::EncodeOptions;
use bin2cpp_batch::{embed_files, EmbedOptions, EmbedOutcome};
use clap::Parser;
use log::error;

/// Generate a C++ header for each shader file to embed the shader source in the executable.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// The folder containing the shader files.
    /// Headers are written to the parent of this folder.
    #[arg(default_value = "src/graphics/shaders/glsl")]
    input_folder: String,

    /// The glob pattern for files to embed. Can be specified multiple times.
    #[arg(long = "pattern", default_value = "*.glsl")]
    patterns: Vec<String>,

    /// The namespaces for each array. Use "" for the global namespace.
    #[arg(long, default_value = "graphics::shader")]
    namespace: String,

    /// The extension for generated headers.
    #[arg(long, default_value = "hpp")]
    extension: String,

    /// Also embed files in subfolders of the input folder.
    #[arg(long)]
    recursive: bool,

    /// Declare arrays without the byte count like "basic[]".
    #[arg(long)]
    no_array_size: bool,

    /// Write headers even if they are already up to date.
    #[arg(long)]
    force: bool,

    /// Log each generated header in addition to warnings and errors.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init()?;

    let start = std::time::Instant::now();

    let options = EmbedOptions {
        namespace: cli.namespace,
        extension: cli.extension,
        recursive: cli.recursive,
        force: cli.force,
        encode: EncodeOptions {
            include_array_size: !cli.no_array_size,
        },
    };
    let report = embed_files(&cli.input_folder, cli.patterns.as_slice(), &options)?;

    for (path, e) in report.failures() {
        error!("Error embedding {path:?}: {e}");
    }

    println!(
        "Embedded {} files ({} written, {} unchanged, {} empty) in {:?}",
        report.files.len(),
        report.count(EmbedOutcome::Written),
        report.count(EmbedOutcome::Unchanged),
        report.count(EmbedOutcome::SkippedEmpty),
        start.elapsed()
    );

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("failed to embed {failed} of {} files", report.files.len());
    }

    Ok(())
}

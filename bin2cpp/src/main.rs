use std::io::Write;

use anyhow::Context;
use bin2cpp::{encode, read_source, EncodeOptions, Provenance, QualifiedName};
use clap::Parser;
use log::{info, warn};

/// Generate a C++ header declaring the bytes of a file as a static array.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// The file to embed like "src/graphics/shaders/glsl/basic.glsl".
    input: String,

    /// The array name and its namespaces like "graphics::shader::basic".
    name: String,

    /// The output header file. Prints to stdout if not specified.
    #[arg(short, long)]
    output: Option<String>,

    /// Declare the array without the byte count like "basic[]".
    #[arg(long)]
    no_array_size: bool,

    /// Record the command line in the header comment instead of the input path.
    #[arg(long)]
    echo_invocation: bool,

    /// Log progress in addition to warnings and errors.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never end up in the generated header.
    simple_logger::SimpleLogger::new()
        .with_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init()?;

    let name =
        QualifiedName::parse(&cli.name).with_context(|| format!("invalid name {:?}", cli.name))?;

    // Read everything up front to avoid writing a partial header.
    let bytes = read_source(&cli.input)?;

    let provenance = if cli.echo_invocation {
        Provenance::invocation(std::env::args_os())
    } else {
        Provenance::source(&cli.input)
    };
    let options = EncodeOptions {
        include_array_size: !cli.no_array_size,
    };

    let Some(text) = encode(&bytes, &name, &provenance, options) else {
        warn!("Skipped {:?} since it contains no bytes", cli.input);
        return Ok(());
    };

    match cli.output {
        Some(output) => {
            std::fs::write(&output, text).with_context(|| format!("error writing {output:?}"))?;
            info!("Wrote {name} to {output:?}");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

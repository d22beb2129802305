use anyhow::{Context, Result};
use charting::encode::decode_data_uri;
use charting::{ChartTools, OutputFormat, RenderOptions, ToolName, ToolResponse};
use clap::Parser;
use serde_json::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "charting")]
#[command(about = "Render bar, line, histogram and pie charts from JSON or CSV data", long_about = None)]
struct Args {
    /// Tool to call (create_bar_chart, create_line_chart, create_histogram, create_pie_chart)
    tool: ToolName,

    /// Tool arguments as a JSON object (e.g. '{"data": {"A": 10, "B": 20}}'); read from stdin when omitted
    #[arg(long)]
    args: Option<String>,

    /// JSON file with render options ({"width": 800, "height": 600, "type": "png"})
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// png or svg
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Print the whole response as JSON
    #[arg(long)]
    json: bool,

    /// Write the decoded image bytes instead of the data URI
    #[arg(long, conflicts_with = "json")]
    raw: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let options = render_options(&args)?;

    let raw_arguments = match &args.args {
        Some(text) => text.clone(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read tool arguments from stdin")?;
            buffer
        }
    };
    let arguments: Value =
        serde_json::from_str(&raw_arguments).context("Tool arguments are not valid JSON")?;

    let response = ChartTools::new(options).call(args.tool, arguments);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.json {
        let json = serde_json::to_string(&response).context("Failed to serialize response")?;
        writeln!(handle, "{}", json).context("Failed to write response")?;
    } else {
        match &response {
            ToolResponse::Image { data_uri, warnings } => {
                for warning in warnings {
                    eprintln!("warning: {}", warning);
                }
                if args.raw {
                    let (_, bytes) = decode_data_uri(data_uri)?;
                    handle
                        .write_all(&bytes)
                        .context("Failed to write image to stdout")?;
                } else {
                    writeln!(handle, "{}", data_uri).context("Failed to write data URI")?;
                }
            }
            ToolResponse::Error { message } => eprintln!("{}", message),
        }
    }
    handle.flush().context("Failed to flush stdout")?;

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

/// Config file first, then individual flags on top.
fn render_options(args: &Args) -> Result<RenderOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid render options in {}", path.display()))?
        }
        None => RenderOptions::default(),
    };

    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if let Some(format) = args.format {
        options.format = format;
    }
    Ok(options)
}

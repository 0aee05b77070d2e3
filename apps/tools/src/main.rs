use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use qr_core::{DirectorySink, FormController, QrcodeEncoder};
use shared::{
    domain::{DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, DEFAULT_SIZE_PIXELS},
    ErrorCorrectionLevel, FormState,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qr-tools", about = "Render QR codes from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode text and write qr.png into the output directory.
    Render {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Print the image as a data:image/png;base64 URL instead of writing a file.
        #[arg(long)]
        data_url: bool,
    },
    /// Print the encoder options the form would produce, as JSON.
    Options {
        #[command(flatten)]
        form: FormArgs,
    },
}

#[derive(Args, Debug)]
struct FormArgs {
    #[arg(long)]
    text: String,
    /// Edge length in pixels; clamped to 128..=1024.
    #[arg(long, default_value_t = DEFAULT_SIZE_PIXELS.to_string())]
    size: String,
    #[arg(long, default_value = "M", value_parser = parse_level)]
    ecc: ErrorCorrectionLevel,
    #[arg(long, default_value = DEFAULT_FOREGROUND)]
    fg: String,
    #[arg(long, default_value = DEFAULT_BACKGROUND)]
    bg: String,
}

impl FormArgs {
    fn into_form(self) -> FormState {
        FormState {
            text: self.text,
            size_input: self.size,
            error_correction: self.ecc,
            foreground: self.fg,
            background: self.bg,
        }
    }
}

fn parse_level(raw: &str) -> Result<ErrorCorrectionLevel, String> {
    ErrorCorrectionLevel::parse(raw)
        .ok_or_else(|| format!("unknown level '{raw}', use L, M, Q or H"))
}

async fn generate(form: FormState) -> Result<FormController> {
    let mut controller = FormController::new(form);
    controller
        .generate(&QrcodeEncoder)
        .await
        .map_err(|err| anyhow!("{}: {err}", controller.status().text))?;
    Ok(controller)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            form,
            out,
            data_url,
        } => {
            let mut controller = generate(form.into_form()).await?;
            if data_url {
                let result = controller
                    .result()
                    .context("generation finished without an image")?;
                println!("{}", result.data_url());
                return Ok(());
            }

            let mut sink = DirectorySink::new(&out);
            controller
                .download_current(&mut sink)
                .with_context(|| format!("writing into {}", out.display()))?;
            println!("{}", controller.status().text);
        }
        Command::Options { form } => {
            let mut controller = FormController::new(form.into_form());
            let options = controller.read_options();
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}

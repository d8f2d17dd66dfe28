// UI layer: one prompt for the image path, then upload, analyze and print.
// Console lines go through a `Write` so the flow can run against a buffer.

use crate::api::FalClient;
use crate::config::Config;
use crate::description::{Description, Highlights};
use crate::Error;
use anyhow::Result;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Where the flow stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    FileNotFound,
    UploadFailed,
    AnalysisFailed,
    Described(Description),
}

/// Interactive entry point: banner, path prompt, then `analyze_selfie`
/// against stdout.
pub fn session(api: &FalClient, config: &Config) -> Result<Outcome> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "FAL AI Selfie Analyzer\n----------------------")?;
    out.flush()?;

    let path: String = Input::new()
        .with_prompt("Enter the path to your selfie image (e.g., selfie.jpg)")
        .allow_empty(true)
        .interact_text()?;

    let outcome = analyze_selfie(api, &config.api_key, &path, &mut out)?;
    if config.show_highlights {
        if let Outcome::Described(Description::Text(text)) = &outcome {
            print_highlights(&Highlights::extract(text), &mut out)?;
        }
    }
    Ok(outcome)
}

/// Check the path, upload the file, analyze it and print each step.
/// Failures are reported on `out` and end the flow early; the returned
/// error only covers writing to `out`.
pub fn analyze_selfie<W: Write>(
    api: &FalClient,
    api_key: &str,
    raw_path: &str,
    out: &mut W,
) -> Result<Outcome> {
    let raw_path = raw_path.trim();
    let path = Path::new(raw_path);
    if !path.is_file() {
        writeln!(out, "File not found: {}", raw_path)?;
        return Ok(Outcome::FileNotFound);
    }

    writeln!(out, "Uploading image to FAL...")?;
    let spinner = start_spinner("Uploading...");
    let uploaded = api.upload_image(path);
    spinner.finish_and_clear();

    let image_url = match uploaded {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "upload failed");
            writeln!(out, "Failed to upload image: {}", failure_detail(&e))?;
            print_hint(&e, out)?;
            return Ok(Outcome::UploadFailed);
        }
    };
    writeln!(out, "Image uploaded. URL: {}", image_url)?;

    writeln!(out, "\nAnalyzing image with FAL AI Bagel model...")?;
    let spinner = start_spinner("Analyzing...");
    let analyzed = api.analyze_image(&image_url, api_key);
    spinner.finish_and_clear();

    match analyzed {
        Ok(description) => {
            writeln!(out, "\nDescription:")?;
            writeln!(out, "{}", description)?;
            Ok(Outcome::Described(description))
        }
        Err(e) => {
            warn!(error = %e, "analysis failed");
            writeln!(out, "Failed to analyze image: {}", failure_detail(&e))?;
            print_hint(&e, out)?;
            Ok(Outcome::AnalysisFailed)
        }
    }
}

/// One line per failure kind.
fn failure_detail(err: &Error) -> String {
    match err {
        Error::File { path, source } => format!("cannot read {} ({})", path.display(), source),
        Error::Network(e) => format!("network error: {}", e),
        Error::Status { status, body } if body.is_empty() => format!("server returned {}", status),
        Error::Status { status, body } => format!("server returned {}: {}", status, body),
        Error::Decode(msg) => format!("unexpected response: {}", msg),
        Error::MissingField(field) => format!("response did not include \"{}\"", field),
        other => other.to_string(),
    }
}

fn print_hint<W: Write>(err: &Error, out: &mut W) -> io::Result<()> {
    if err.is_auth_rejection() {
        writeln!(out, "Check that FAL_KEY holds a valid API key.")?;
    }
    Ok(())
}

fn print_highlights<W: Write>(highlights: &Highlights, out: &mut W) -> io::Result<()> {
    if highlights.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nHighlights:")?;
    if !highlights.features.is_empty() {
        writeln!(out, "  Features: {}", highlights.features.join(", "))?;
    }
    if let Some(hair) = &highlights.hair {
        writeln!(out, "  Hair: {}", hair)?;
    }
    if let Some(skin) = &highlights.skin {
        writeln!(out, "  Skin: {}", skin)?;
    }
    for rec in &highlights.recommendations {
        writeln!(out, "  - {}", rec)?;
    }
    Ok(())
}

/// Spinner on stderr; indicatif hides it when stderr is not a terminal.
fn start_spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

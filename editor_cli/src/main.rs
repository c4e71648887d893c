//! mdpad - Render a Markdown file to sanitized HTML.
//!
//! Usage: mdpad [--theme github|github-dark] [--config PATH] [--fragment] INPUT [OUTPUT]

use mdpad_core::{EditorSettings, EditorState, RenderPipeline, ThemeKind};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str =
    "Usage: mdpad [--theme github|github-dark] [--config PATH] [--fragment] INPUT [OUTPUT]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Options {
    theme: Option<ThemeKind>,
    config: Option<PathBuf>,
    fragment: bool,
    input: PathBuf,
    output: Option<PathBuf>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options, String> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--theme" => {
                let name = args.next().ok_or("--theme needs a value")?;
                let theme =
                    ThemeKind::from_name(&name).ok_or_else(|| format!("unknown theme '{}'", name))?;
                options.theme = Some(theme);
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a value")?;
                options.config = Some(PathBuf::from(path));
            }
            "--fragment" => options.fragment = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{}'", flag)),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    options.input = positional.next().ok_or("missing INPUT")?;
    options.output = positional.next();
    if positional.next().is_some() {
        return Err("too many arguments".to_string());
    }
    Ok(options)
}

fn run(options: &Options) -> io::Result<()> {
    let mut settings = match &options.config {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            EditorSettings::load(path)?
        }
        None => EditorSettings::default(),
    };
    if let Some(theme) = options.theme {
        settings.theme = theme;
    }

    let markdown = fs::read_to_string(&options.input)?;
    let state = EditorState::with_content(settings, &markdown);

    let mut pipeline = RenderPipeline::new();
    let html = if options.fragment {
        pipeline.render(state.content())
    } else {
        pipeline.render_document(state.content(), state.settings())
    };

    match &options.output {
        Some(path) => {
            fs::write(path, html)?;
            log::info!("Wrote {}", path.display());
        }
        None => io::stdout().lock().write_all(html.as_bytes())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("mdpad: {}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    log::info!("Rendering {}", options.input.display());
    if let Err(e) = run(&options) {
        log::error!("Failed to render '{}': {}", options.input.display(), e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full() {
        let options = parse_args(args(&[
            "--theme", "github-dark", "--fragment", "--config", "s.json", "in.md", "out.html",
        ]))
        .unwrap();

        assert_eq!(options.theme, Some(ThemeKind::GithubDark));
        assert!(options.fragment);
        assert_eq!(options.config, Some(PathBuf::from("s.json")));
        assert_eq!(options.input, PathBuf::from("in.md"));
        assert_eq!(options.output, Some(PathBuf::from("out.html")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--bogus", "in.md"])).is_err());
        assert!(parse_args(args(&["--theme", "solarized", "in.md"])).is_err());
        assert!(parse_args(args(&["a", "b", "c"])).is_err());
    }

    #[test]
    fn test_run_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        let output = dir.path().join("doc.html");
        fs::write(&input, "# Hello\n\n<script>x()</script>").unwrap();

        let options = Options {
            input,
            output: Some(output.clone()),
            ..Options::default()
        };
        run(&options).unwrap();

        let html = fs::read_to_string(output).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_run_missing_input() {
        let options = Options {
            input: PathBuf::from("/definitely/not/here.md"),
            ..Options::default()
        };
        assert_eq!(run(&options).unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}

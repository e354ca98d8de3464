use std::path::PathBuf;

use cypress_xray::config;
use cypress_xray::conversion::converter::ConversionOptions;
use cypress_xray::conversion::{self, converter::ConversionRecord};
use cypress_xray::status::to_vendor_status;
use cypress_xray::{Error, Result};

const USAGE: &str = "Usage: cypress-xray convert <results.json> \
                     [--project-key KEY] [--project-root DIR] [--out DIR]";

struct ConvertArgs {
    results: PathBuf,
    project_key: Option<String>,
    project_root: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn parse_convert_args(args: &[String]) -> Result<ConvertArgs> {
    let mut results = None;
    let mut project_key = None;
    let mut project_root = None;
    let mut out = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| Error::ValidationError(format!("{} requires a value", flag)))
        };
        match arg.as_str() {
            "--project-key" => project_key = Some(value("--project-key")?),
            "--project-root" => project_root = Some(PathBuf::from(value("--project-root")?)),
            "--out" => out = Some(PathBuf::from(value("--out")?)),
            other if results.is_none() && !other.starts_with("--") => {
                results = Some(PathBuf::from(other))
            }
            other => {
                return Err(Error::ValidationError(format!(
                    "unexpected argument '{}'",
                    other
                )))
            }
        }
    }

    Ok(ConvertArgs {
        results: results.ok_or_else(|| Error::ValidationError("missing results file".to_string()))?,
        project_key,
        project_root,
        out,
    })
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let settings = config::resolve(args.project_root.as_deref());
    let project_key = args
        .project_key
        .or(settings.project_key.clone())
        .ok_or_else(|| {
            Error::ValidationError("no project key configured (jira.projectKey)".to_string())
        })?;
    if !config::is_valid_project_key(&project_key) {
        return Err(Error::ValidationError(format!("invalid project key '{}'", project_key)));
    }

    let json = std::fs::read_to_string(&args.results)?;
    let converter = conversion::converter_from_json(&project_key, &json)?;
    let options = ConversionOptions {
        only_last_attempt: settings.upload_last_attempt,
    };

    let mut output = conversion::convert(converter.as_ref(), &options);
    if !settings.upload_screenshots {
        output.screenshots.clear();
        output.non_attributable.clear();
    }

    for key in conversion::native_issue_keys(converter.as_ref(), &project_key) {
        tracing::debug!("Native test issue: {}", key);
    }

    for record in &output.conversions {
        if let ConversionRecord::Success(c) = record {
            let vendor = to_vendor_status(c.status, settings.cloud, Some(&settings.status));
            eprintln!(
                "{} {} ({})",
                c.issue_key.as_deref().unwrap_or("-"),
                c.title,
                vendor
            );
        }
    }

    match args.out {
        Some(dir) => {
            let path = cypress_xray::output::write_report(&dir, &output)?;
            println!("{}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("convert") => {
            let parsed = match parse_convert_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(e) => {
                    eprintln!("{}\n{}", e, USAGE);
                    std::process::exit(1);
                }
            };
            run_convert(parsed)
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

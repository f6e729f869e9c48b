use clap::{Arg, ArgAction, ArgMatches, Command};
use mergetag::mt::{MockMode, MockTranslator, ProtectionMap, TranslationPipeline};
use mergetag::{CatalogBuilder, Config, Protector, TemplateFields, render, restore, scan, validate};
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::io::Read;
use tracing::debug;

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Input file, or - for stdin")
        .default_value("-")
        .index(1)
}

fn cli() -> Command {
    Command::new("mergetag")
        .version("0.1.0")
        .about("Detect, protect, restore, validate and render email merge tags")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON configuration file (token style, catalog descriptions)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log processing details to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("scan")
                .about("List every merge tag occurrence as JSON")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("catalog")
                .about("Build the merge tag catalog of a template's fields")
                .arg(
                    Arg::new("fields")
                        .help("JSON object of template fields (code, text, subject, ...), or -")
                        .default_value("-")
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("protect")
                .about("Replace merge tags with anchor tokens; prints text and token map as JSON")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("restore")
                .about("Put merge tags back into translated text")
                .arg(input_arg())
                .arg(
                    Arg::new("map")
                        .long("map")
                        .short('m')
                        .help("Token map file written by `protect` (the map or the whole output)")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Compare merge tags of an original and a translated text; exits 1 when they differ")
                .arg(
                    Arg::new("original")
                        .help("Original text file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("translated")
                        .help("Translated text file, or - for stdin")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Fill merge tags with values")
                .arg(input_arg())
                .arg(
                    Arg::new("vars")
                        .long("vars")
                        .help("JSON object of merge variable values")
                        .required(true),
                )
                .arg(
                    Arg::new("globals")
                        .long("globals")
                        .help("JSON object of global variable values"),
                ),
        )
        .subcommand(
            Command::new("translate")
                .about("Run protect, translate, restore and validate with the mock translator")
                .arg(input_arg())
                .arg(
                    Arg::new("target-locale")
                        .long("target")
                        .short('t')
                        .help("Target language code (e.g., fr, es, de)")
                        .required(true),
                )
                .arg(
                    Arg::new("source-locale")
                        .long("source")
                        .short('s')
                        .help("Source language code (default: en)")
                        .default_value("en"),
                )
                .arg(
                    Arg::new("mock")
                        .long("mock")
                        .help("Mock mode: suffix, reorder, pad, noop, strip:<text>")
                        .default_value("suffix"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the full outcome as JSON instead of the restored text")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn arg<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str, Box<dyn Error>> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument: {}", id).into())
}

fn read_input(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Read a JSON object of values. Non-string values use their JSON spelling; null is empty.
fn read_vars(path: &str) -> Result<HashMap<String, String>, Box<dyn Error>> {
    let values: HashMap<String, Value> = serde_json::from_str(&read_input(path)?)?;
    Ok(values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

/// Accept either a bare token map or the full `protect` output.
fn read_map(path: &str) -> Result<ProtectionMap, Box<dyn Error>> {
    let value: Value = serde_json::from_str(&read_input(path)?)?;
    let map = match value {
        Value::Object(mut object) if object.contains_key("protectedText") => {
            object.remove("map").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(map)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();

    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    debug!(?config, "loaded configuration");

    match matches.subcommand() {
        Some(("scan", sub)) => {
            let text = read_input(arg(sub, "input")?)?;
            println!("{}", serde_json::to_string_pretty(&scan(&text))?);
        }
        Some(("catalog", sub)) => {
            let fields: TemplateFields = serde_json::from_str(&read_input(arg(sub, "fields")?)?)?;
            let catalog = CatalogBuilder::new(&config).build(&fields);
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Some(("protect", sub)) => {
            let text = read_input(arg(sub, "input")?)?;
            let protected = Protector::new(&config).protect(&text);
            println!("{}", serde_json::to_string_pretty(&protected)?);
        }
        Some(("restore", sub)) => {
            let text = read_input(arg(sub, "input")?)?;
            let map = read_map(arg(sub, "map")?)?;
            print!("{}", restore(&text, &map));
        }
        Some(("validate", sub)) => {
            let original = read_input(arg(sub, "original")?)?;
            let translated = read_input(arg(sub, "translated")?)?;
            let result = validate(&original, &translated);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid {
                std::process::exit(1);
            }
        }
        Some(("render", sub)) => {
            let text = read_input(arg(sub, "input")?)?;
            let merge_vars = read_vars(arg(sub, "vars")?)?;
            let global_vars = match sub.get_one::<String>("globals") {
                Some(path) => Some(read_vars(path)?),
                None => None,
            };
            print!("{}", render(&text, &merge_vars, global_vars.as_ref()));
        }
        Some(("translate", sub)) => {
            let text = read_input(arg(sub, "input")?)?;
            let mode_name = arg(sub, "mock")?;
            let mode = MockMode::parse(mode_name)
                .ok_or_else(|| format!("unknown mock mode: {}", mode_name))?;
            let pipeline = TranslationPipeline::with_config(MockTranslator::new(mode), &config)?;
            let outcome = pipeline
                .translate(&text, arg(sub, "source-locale")?, arg(sub, "target-locale")?)
                .await?;

            if sub.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                for warning in outcome
                    .recovery_warnings
                    .iter()
                    .chain(&outcome.validation.warnings)
                {
                    eprintln!("warning: {}", warning);
                }
                print!("{}", outcome.restored);
            }
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}

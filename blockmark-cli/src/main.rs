// Command-line interface for blockmark
//
// This binary converts between block-editor JSON documents and markdown, and
// lets you inspect what the markdown importer sees.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension,
// while being overwrittable by an explicit --from flag. A path of "-" reads stdin (and then --from
// is required).
// Usage:
//  blockmark <input> --to <format> [--from <format>] [--output <file>]          - Convert (default)
//  blockmark convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above
//  blockmark inspect <path> [<transform>]      - Execute a transform (defaults to "ir-treeviz")
//  blockmark --list-formats                    - List formats and transforms
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// Keys that map onto configuration (escape, parser, max-depth, pretty, stamp-time) override the loaded
// config; the rest are passed to the target format.
// Example:
//  blockmark notes.md --to json --extra-pretty false
//
// Logging goes to stderr. Set BLOCKMARK_LOG (e.g. "debug") to see more than warnings.

mod transforms;

use blockmark_babel::formats::json::{JsonFormat, JsonOptions};
use blockmark_babel::formats::markdown::parser::ImportOptions;
use blockmark_babel::formats::markdown::serializer::ExportOptions;
use blockmark_babel::formats::markdown::MarkdownFormat;
use blockmark_babel::{FormatRegistry, ParserChoice};
use blockmark_config::{BlockmarkConfig, Loader, LOCAL_CONFIG_FILE};
use clap::{Arg, ArgAction, Command, ValueHint};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BLOCKMARK_LOG";
const STDIN_PATH: &str = "-";

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key_opt {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("blockmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between block-editor documents and markdown")
        .long_about(
            "blockmark converts block-editor JSON documents to CommonMark markdown and back.\n\n\
            Commands:\n  \
            - convert: Transform between document formats (json, markdown)\n  \
            - inspect: View how markdown is parsed before it becomes blocks\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            blockmark doc.json --to markdown            # Convert to markdown (stdout)\n  \
            blockmark notes.md --to json -o doc.json    # Markdown to a JSON file\n  \
            cat notes.md | blockmark - --from markdown --to json\n  \
            blockmark inspect notes.md                  # View the parsed tree",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and inspect transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a blockmark.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect how markdown is parsed")
                .long_about(
                    "View the intermediate markdown tree and the blocks built from it.\n\n\
                    Transforms (stage-format):\n  \
                    - ir-treeviz:   Parsed tree as a tree visualization (default)\n  \
                    - ir-json:      Parsed tree as JSON\n  \
                    - blocks-json:  Imported blocks as JSON\n\n\
                    Extra Parameters:\n  \
                    --extra-ast-full      Also list inline nodes and table rows\n  \
                    --extra-parser <p>    Inspect with a specific parser (auto, comrak, lines)\n\n\
                    Examples:\n  \
                    blockmark inspect notes.md                          # Tree visualization\n  \
                    blockmark inspect notes.md ir-json                  # JSON tree\n  \
                    blockmark inspect notes.md --extra-parser lines     # Line parser's view",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the markdown file ('-' for stdin)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply (stage-format). Defaults to 'ir-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between formats.\n\n\
                    Supported formats:\n  \
                    - json:     Block-editor JSON (.json)\n  \
                    - markdown: CommonMark with GFM tables and task lists (.md, .markdown)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    blockmark convert doc.json --to markdown       # JSON to markdown (stdout)\n  \
                    blockmark convert notes.md --to json -o d.json # Markdown to a JSON file\n  \
                    blockmark doc.json --to markdown               # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path ('-' for stdin)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Also installs the `log` bridge, so library records land here.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading path (or "-") means the convert subcommand was left out
            if cleaned_args.len() > 1
                && (!cleaned_args[1].starts_with('-') || cleaned_args[1] == STDIN_PATH)
                && cleaned_args[1] != "inspect"
                && cleaned_args[1] != "convert"
                && cleaned_args[1] != "help"
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&config);
        return;
    }

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                exit_with("path is required");
            };
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(path, transform, &extra_params, &config);
        }
        Some(("convert", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                exit_with("input is required");
            };
            let Some(to) = sub_matches.get_one::<String>("to") else {
                exit_with("--to is required");
            };

            let registry = build_registry(&config);
            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => match registry.detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                },
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output, &extra_params, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn read_input(path: &str) -> String {
    if path == STDIN_PATH {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .unwrap_or_else(|e| {
                eprintln!("Error reading stdin: {e}");
                std::process::exit(1);
            });
        return source;
    }
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn markdown_format(config: &BlockmarkConfig) -> MarkdownFormat {
    MarkdownFormat::new(
        &ImportOptions::from(&config.markdown),
        ExportOptions::from(&config.serialize),
    )
}

fn build_registry(config: &BlockmarkConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    registry.register(markdown_format(config));
    registry.register(JsonFormat::new(JsonOptions::from(&config.json)));
    registry
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    transform: &str,
    extra_params: &HashMap<String, String>,
    config: &BlockmarkConfig,
) {
    let source = read_input(path);
    let markdown = markdown_format(config);
    tracing::debug!(parser = markdown.parser_name(), transform, "inspecting");

    let output = transforms::execute_transform(&source, transform, &markdown, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &BlockmarkConfig,
) {
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_input(input);
    tracing::debug!(from, to, bytes = source.len(), "converting");

    let mut doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    if from != "json" {
        doc.version = config.json.version.clone();
    }
    if to == "json" && config.json.stamp_time {
        doc.time = Some(serde_json::Value::from(now_millis()));
    }

    let result = registry
        .serialize_with_options(&doc, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result.into_bytes()).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{}", result.into_text()),
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(config: &BlockmarkConfig) {
    println!("Conversion formats:");
    let registry = build_registry(config);
    for format in registry.formats() {
        let extensions = format.file_extensions().join(", ");
        println!(
            "  {:<10} {} ({extensions})",
            format.name(),
            format.description()
        );
    }

    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn load_cli_config(explicit_path: Option<&str>) -> BlockmarkConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut BlockmarkConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["escape", "escape-text"]) {
        config.serialize.escape_text = parse_bool_arg("escape", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["pretty"]) {
        config.json.pretty = parse_bool_arg("pretty", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["stamp-time"]) {
        config.json.stamp_time = parse_bool_arg("stamp-time", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["parser"]) {
        config.markdown.parser = raw.parse::<ParserChoice>().unwrap_or_else(|e| {
            eprintln!("Invalid value for --extra-parser: {e}");
            std::process::exit(1);
        });
    }
    if let Some(raw) = take_override(extra_params, &["max-depth", "max-nesting-depth"]) {
        config.markdown.max_nesting_depth = raw.parse::<usize>().unwrap_or_else(|_| {
            eprintln!("Invalid value '{raw}' for --extra-max-depth (expected a positive number)");
            std::process::exit(1);
        });
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

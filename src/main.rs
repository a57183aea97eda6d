//! emmet-bridge - run Emmet editor commands against a file
//!
//! Prints one result per line on stdout; logs go to stderr.

use std::env;
use std::path::PathBuf;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use emmet_bridge::context::{self, EditorContext};
use emmet_bridge::matcher::Direction;
use emmet_bridge::syntax::{ScopeView, SyntaxKind};
use emmet_bridge::{
    balance_for, css_section, evaluate_math, extract_abbreviation, select_item, text, Document,
    Error, MathOptions, Result, SyntaxRegistry,
};

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        // Bad input under the cursor is distinguishable from usage errors
        process::exit(if e.is_malformed() { 2 } else { 1 });
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("emmet_bridge=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Context,
    Extract,
    BalanceIn,
    BalanceOut,
    NextItem,
    PrevItem,
    Section,
    Math,
}

impl Command {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "context" => Some(Command::Context),
            "extract" => Some(Command::Extract),
            "balance-in" => Some(Command::BalanceIn),
            "balance-out" => Some(Command::BalanceOut),
            "next-item" => Some(Command::NextItem),
            "prev-item" => Some(Command::PrevItem),
            "section" => Some(Command::Section),
            "math" => Some(Command::Math),
            _ => None,
        }
    }
}

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    file: PathBuf,
    position: String,
    syntax: Option<String>,
    properties: bool,
}

/// What the command line asks for
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Help,
    Version,
    Run(Args),
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut positional = Vec::new();
    let mut syntax = None;
    let mut properties = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Invocation::Help),
            "--version" | "-V" => return Ok(Invocation::Version),
            "--syntax" => {
                let name = iter
                    .next()
                    .ok_or_else(|| Error::Message("--syntax needs a value".to_string()))?;
                syntax = Some(name.clone());
            }
            "--properties" => properties = true,
            s if s.starts_with('-') && s.len() > 1 => {
                return Err(Error::Message(format!("unknown option: {}", s)));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let [command, file, position] = <[String; 3]>::try_from(positional).map_err(|_| {
        Error::Message("expected <COMMAND> <FILE> <POSITION> (see --help)".to_string())
    })?;
    let command = Command::parse(&command)
        .ok_or_else(|| Error::Message(format!("unknown command: {}", command)))?;

    Ok(Invocation::Run(Args {
        command,
        file: PathBuf::from(file),
        position,
        syntax,
        properties,
    }))
}

/// Byte offset from `OFFSET` or `LINE:COLUMN` (1-based line, 0-based column)
fn parse_position(code: &str, position: &str) -> Result<usize> {
    let invalid = || Error::Message(format!("invalid position: {}", position));

    match position.split_once(':') {
        Some((line, col)) => {
            let line: usize = line.parse().map_err(|_| invalid())?;
            let col: usize = col.parse().map_err(|_| invalid())?;
            if line == 0 {
                return Err(invalid());
            }
            text::offset_at(code, line - 1, col).ok_or_else(invalid)
        }
        None => position.parse().map_err(|_| invalid()),
    }
}

/// `LINE:COLUMN` for a byte offset, in the form `parse_position` accepts
fn format_position(code: &str, pos: usize) -> String {
    let (line, col) = text::position_of(code, pos);
    format!("{}:{}", line + 1, col)
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let args = match parse_args(&args)? {
        Invocation::Help => {
            print_usage();
            return Ok(());
        }
        Invocation::Version => {
            print_version();
            return Ok(());
        }
        Invocation::Run(args) => args,
    };

    let registry = SyntaxRegistry::with_defaults();
    let doc = match &args.syntax {
        Some(name) => {
            let text = std::fs::read_to_string(&args.file)?;
            if registry.get(name).is_none() {
                return Err(Error::Message(format!("unknown syntax: {}", name)));
            }
            Document::with_syntax_name(text, name, &registry)
        }
        None => Document::open(&args.file, &registry)?,
    };
    let pos = parse_position(doc.text(), &args.position)?;
    debug!("{:?} at {} in {}", args.command, pos, args.file.display());

    for line in execute(&doc, &args, pos)? {
        println!("{}", line);
    }
    Ok(())
}

/// Run a command, returning output lines
fn execute(doc: &Document, args: &Args, pos: usize) -> Result<Vec<String>> {
    let code = doc.text();
    let mut out = Vec::new();

    match args.command {
        Command::Context => {
            let ctx = context::resolve(doc, pos, true);
            out.push(format!("syntax: {}", ctx.syntax));
            out.push(format!("type: {}", ctx.kind.name()));
            out.push(format!("inline: {}", ctx.inline));
            if ctx.jsx {
                out.push("jsx: true".to_string());
            }
            if ctx.xml {
                out.push("xml: true".to_string());
            }
            match &ctx.context {
                Some(EditorContext::Tag(tag)) => {
                    out.push(format!("tag: {} {}", tag.name, tag.open));
                    for (name, value) in &tag.attributes {
                        match value {
                            Some(value) => out.push(format!("  {}={}", name, value)),
                            None => out.push(format!("  {}", name)),
                        }
                    }
                }
                Some(EditorContext::Property(prop)) => {
                    out.push(format!("property: {}", prop.name));
                }
                None => {}
            }
        }
        Command::Extract => match extract_abbreviation(doc, pos, None)? {
            Some((found, _)) => {
                out.push(found.abbreviation.clone());
                out.push(format!(
                    "start: {} location: {} end: {}",
                    found.start, found.location, found.end
                ));
                out.push(format!("at: {}", format_position(code, found.start)));
            }
            None => out.push("no abbreviation".to_string()),
        },
        Command::BalanceIn | Command::BalanceOut => {
            let direction = if args.command == Command::BalanceIn {
                Direction::Inward
            } else {
                Direction::Outward
            };
            // Embedded CSS is balanced as part of its host document
            let kind = doc.syntax().kind;
            for span in balance_for(kind, doc.syntax().xml, code, pos, direction) {
                out.push(span.to_string());
            }
        }
        Command::NextItem | Command::PrevItem => {
            let is_css = doc.syntax().kind == SyntaxKind::Stylesheet;
            let is_previous = args.command == Command::PrevItem;
            if let Some(model) = select_item(code, pos, is_css, is_previous) {
                out.push(model.span().to_string());
                out.extend(
                    model
                        .ranges
                        .iter()
                        .map(|r| format!("  {} {}", r, r.slice(code))),
                );
            }
        }
        Command::Section => {
            if let Some(section) = css_section(code, pos, args.properties) {
                out.push(section.span.to_string());
                for prop in section.properties.iter().flatten() {
                    out.push(format!(
                        "  {}: {}",
                        prop.name.slice(code),
                        prop.value.slice(code)
                    ));
                }
            }
        }
        Command::Math => {
            if let Some(result) = evaluate_math(code, pos, MathOptions::default()) {
                out.push(result.snippet);
                out.push(format!("{}..{}", result.start, result.end));
            }
        }
    }

    Ok(out)
}

fn print_usage() {
    println!(
        "emmet-bridge {} - Emmet editor commands for a file",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Usage: emmet-bridge <COMMAND> <FILE> <POSITION> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  context        Syntax and enclosing tag or CSS property");
    println!("  extract        Abbreviation ending at the position");
    println!("  balance-in     Spans to shrink the selection through");
    println!("  balance-out    Spans to grow the selection through");
    println!("  next-item      Next tag or CSS item");
    println!("  prev-item      Previous tag or CSS item");
    println!("  section        CSS rule around the position");
    println!("  math           Evaluate the expression ending at the position");
    println!();
    println!("POSITION is a byte offset or LINE:COLUMN (line from 1, column from 0)");
    println!();
    println!("Options:");
    println!("  --syntax NAME  Syntax to use instead of detecting by extension");
    println!("  --properties   List declarations for `section`");
    println!("  -h, --help     Show this help message");
    println!("  -V, --version  Show version information");
    println!();
    println!("Set RUST_LOG=emmet_bridge=debug for diagnostics");
}

fn print_version() {
    println!("emmet-bridge {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn run_args(args: &[&str]) -> Args {
        match parse_args(&strings(args)).unwrap() {
            Invocation::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_args() {
        let args = run_args(&["extract", "a.html", "12", "--syntax", "xml"]);
        assert_eq!(args.command, Command::Extract);
        assert_eq!(args.file, PathBuf::from("a.html"));
        assert_eq!(args.position, "12");
        assert_eq!(args.syntax.as_deref(), Some("xml"));
        assert!(!args.properties);

        let args = run_args(&["section", "--properties", "a.css", "3:4"]);
        assert!(args.properties);
        assert_eq!(args.position, "3:4");
    }

    #[test]
    fn test_parse_args_flags() {
        assert_eq!(parse_args(&strings(&["-h"])).unwrap(), Invocation::Help);
        assert_eq!(
            parse_args(&strings(&["math", "--version"])).unwrap(),
            Invocation::Version
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&strings(&["extract", "a.html"])).is_err());
        assert!(parse_args(&strings(&["explode", "a.html", "1"])).is_err());
        assert!(parse_args(&strings(&["extract", "a.html", "1", "--syntax"])).is_err());
        assert!(parse_args(&strings(&["extract", "a.html", "1", "--bogus"])).is_err());
    }

    #[test]
    fn test_parse_position() {
        let text = "ab\ncdef\n";
        assert_eq!(parse_position(text, "5").unwrap(), 5);
        assert_eq!(parse_position(text, "2:1").unwrap(), 4);
        assert_eq!(parse_position(text, "1:0").unwrap(), 0);
        assert!(parse_position(text, "0:1").is_err());
        assert!(parse_position(text, "9:0").is_err());
        assert!(parse_position(text, "x").is_err());
    }

    #[test]
    fn test_format_position_reads_back() {
        let text = "ab\ncdef\n";
        assert_eq!(format_position(text, 4), "2:1");
        assert_eq!(parse_position(text, &format_position(text, 4)).unwrap(), 4);
        assert_eq!(format_position(text, 0), "1:0");
    }

    fn exec(code: &str, syntax: &str, command: Command, pos: usize) -> Vec<String> {
        let doc = Document::with_syntax_name(code, syntax, &SyntaxRegistry::with_defaults());
        let args = Args {
            command,
            file: PathBuf::from("test"),
            position: pos.to_string(),
            syntax: Some(syntax.to_string()),
            properties: true,
        };
        execute(&doc, &args, pos).unwrap()
    }

    #[test]
    fn test_execute_extract_and_math() {
        assert_eq!(
            exec("ul>li*3", "html", Command::Extract, 7),
            vec!["ul>li*3", "start: 0 location: 0 end: 7", "at: 1:0"]
        );
        assert_eq!(exec("hello ", "html", Command::Extract, 6), vec!["no abbreviation"]);
        assert_eq!(exec("w: 2/3", "css", Command::Math, 6), vec!["0.6667", "3..6"]);
    }

    #[test]
    fn test_execute_context_and_section() {
        let code = "a { color: red; }";
        let pos = code.find("red").unwrap();
        assert_eq!(
            exec(code, "css", Command::Context, pos),
            vec!["syntax: css", "type: stylesheet", "inline: false", "property: color"]
        );
        assert_eq!(
            exec(code, "css", Command::Section, pos),
            vec!["0..17", "  color: red"]
        );
    }

    #[test]
    fn test_execute_balance_and_items() {
        let code = "<p class=\"a\">x</p>";
        assert_eq!(
            exec(code, "html", Command::BalanceOut, 13),
            vec!["13..14", "0..18"]
        );
        assert_eq!(
            exec(code, "html", Command::NextItem, 0),
            vec!["0..13", "  1..2 p", "  3..12 class=\"a\"", "  10..11 a"]
        );
    }
}

//! fscore CLI - Tool for inspecting parameter archives.

use std::env;
use std::path::Path;
use std::process;

use fscore::archive::{chunk_name, format_version, IArchive, CID_LOAD_CURVE, CID_PARAM};
use fscore::param::{decode_param, ParamValue, Parameter};
use fscore::Result;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Verbosity selected on the command line.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Normal,
    Debug,
    Trace,
}

impl Verbosity {
    fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    // RUST_LOG wins over the flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fscore={}", verbosity.filter())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity = Verbosity::Normal;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Verbosity::Debug,
            "-vv" | "--trace" => verbosity = Verbosity::Trace,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            _ => filtered_args.push(arg),
        }
    }
    init_logging(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        // Info command - header and chunk tree
        "info" | "i" => {
            let Some(file) = filtered_args.get(1) else {
                usage_error("fscore info <file>");
            };
            cmd_info(file)
        }

        // Params command - decode parameters without a schema
        "params" | "p" => {
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            let Some(file) = filtered_args[1..]
                .iter()
                .find(|&&s| s != "--json" && s != "-j")
            else {
                usage_error("fscore params [--json] <file>");
            };
            cmd_params(file, json_mode)
        }

        "version" | "--version" | "-V" => {
            print_version();
            Ok(())
        }

        // Help
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Error: missing file argument");
    eprintln!("Usage: {}", usage);
    process::exit(1);
}

fn print_version() {
    println!(
        "fscore {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("FSCORE_BUILD_DATE"),
        env!("FSCORE_BUILD_TIME")
    );
}

fn print_help() {
    println!("fscore - parameter archive toolkit");
    println!();
    println!("USAGE:");
    println!("    fscore [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show archive version and chunk tree");
    println!("    p, params <file> [--json]     Decode stored parameters");
    println!("    version                       Show version and build date");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose                 Debug logging");
    println!("    -vv, --trace                  Trace logging (every chunk)");
    println!("    -q, --quiet                   Errors only");
    println!();
    println!("EXAMPLES:");
    println!("    fscore info model.fsa");
    println!("    fscore params model.fsa --json > params.json");
}

// ============================================================================
// info
// ============================================================================

fn cmd_info(path: &str) -> Result<()> {
    let mut ar = IArchive::open(path)?;
    info!(path, "opened archive");

    println!("File:    {}", path);
    println!(
        "Version: {}{}",
        format_version(ar.version()),
        if ar.is_legacy() { " (legacy)" } else { "" }
    );
    println!();

    let mut stats = TreeStats::default();
    print_chunks(&mut ar, 0, &mut stats)?;

    println!();
    println!("Chunks:     {}", stats.chunks);
    println!("Parameters: {}", stats.params);
    println!("Max depth:  {}", stats.max_depth);
    Ok(())
}

#[derive(Default)]
struct TreeStats {
    chunks: usize,
    params: usize,
    max_depth: usize,
}

/// Chunks whose payload is a list of child chunks.
fn is_container(id: u32) -> bool {
    matches!(id, CID_PARAM | CID_LOAD_CURVE)
}

fn print_chunks(ar: &mut IArchive, depth: usize, stats: &mut TreeStats) -> Result<()> {
    while let Some(id) = ar.open_chunk()? {
        let size = ar.chunk_size().unwrap_or(0);
        stats.chunks += 1;
        stats.max_depth = stats.max_depth.max(depth + 1);
        if id == CID_PARAM {
            stats.params += 1;
        }

        let name = chunk_name(id).unwrap_or("?");
        println!("{}0x{:04x} {:<16} {} bytes", "  ".repeat(depth), id, name, size);

        if is_container(id) {
            print_chunks(ar, depth + 1, stats)?;
        }
        ar.close_chunk()?;
    }
    Ok(())
}

// ============================================================================
// params
// ============================================================================

fn cmd_params(path: &str, json_mode: bool) -> Result<()> {
    let mut ar = IArchive::open(path)?;
    let mut params = Vec::new();
    while let Some(id) = ar.open_chunk()? {
        if id == CID_PARAM {
            params.push(decode_param(&mut ar)?);
        } else {
            debug!(id, "skip top-level chunk");
        }
        ar.close_chunk()?;
    }
    info!(count = params.len(), "decoded parameters");

    if json_mode {
        let list: Vec<serde_json::Value> = params.iter().map(param_json).collect();
        let doc = serde_json::json!({
            "file": path,
            "version": format_version(ar.version()),
            "legacy": ar.is_legacy(),
            "params": list,
        });
        match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("{}", s),
            Err(e) => return Err(fscore::Error::other(e.to_string())),
        }
        return Ok(());
    }

    println!("{:>4}  {:<8}  {:<24}  CURVE", "ID", "TYPE", "VALUE");
    for p in &params {
        let curve = match p.load_curve() {
            Some(lc) => format!("{} points", lc.len()),
            None => "-".to_string(),
        };
        println!(
            "{:>4}  {:<8}  {:<24}  {}",
            p.id(),
            p.param_type().to_string(),
            p.value().to_string(),
            curve
        );
    }
    Ok(())
}

fn value_json(v: &ParamValue) -> serde_json::Value {
    match v {
        ParamValue::Int(n) | ParamValue::Choice(n) => serde_json::json!(n),
        ParamValue::Float(x) => serde_json::json!(x),
        ParamValue::Bool(b) => serde_json::json!(b),
        ParamValue::Vec3(r) => serde_json::json!([r.x, r.y, r.z]),
        ParamValue::String(s) | ParamValue::Math(s) => serde_json::json!(s),
    }
}

fn param_json(p: &Parameter) -> serde_json::Value {
    let curve = p.load_curve().map(|lc| {
        let points: Vec<[f64; 2]> = lc.points().iter().map(|pt| [pt.time, pt.value]).collect();
        serde_json::json!({
            "interpolation": format!("{:?}", lc.interpolation).to_lowercase(),
            "extend": format!("{:?}", lc.extend).to_lowercase(),
            "points": points,
        })
    });
    serde_json::json!({
        "id": p.id(),
        "type": p.param_type().to_string(),
        "value": value_json(p.value()),
        "curve": curve,
    })
}

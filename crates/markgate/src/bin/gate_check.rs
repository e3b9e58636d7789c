use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;

use markgate::Checker;

fn main() -> Result<()> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!("Usage: cargo run -p markgate --bin gate_check <html-file> [--json] [--markup]");
        bail!("missing <html-file>");
    }

    let input = PathBuf::from(args.remove(0));
    if !input.exists() {
        bail!("input file not found: {}", input.display());
    }

    let mut as_json = false;
    let mut as_markup = false;
    for arg in &args {
        match arg.as_str() {
            "--json" => as_json = true,
            "--markup" => as_markup = true,
            other => bail!("unknown flag: {}", other),
        }
    }

    let checker = Checker::default();
    match checker.check_file(&input) {
        Ok(document) => {
            if as_json {
                println!("{}", document.to_json()?);
            } else if as_markup {
                println!("{}", document.to_markup());
            } else {
                println!("safe: {}", input.display());
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("unsafe: {err:#}");
            std::process::exit(1);
        }
    }
}

//! memopt CLI
//!
//! Static memory reuse planning for serialized dataflow graphs.

use memoptc::{init_tracing, run_plan, CliError, PlanOptions};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "plan" => {
            let result = PlanOptions::parse(&args[2..]).and_then(|options| run_plan(&options));
            match result {
                Ok(output) => print!("{output}"),
                Err(err @ CliError::Usage(_)) => {
                    eprintln!("error: {err}");
                    eprintln!("Usage: memopt plan <graph.bin> [--sort=ts|dfs] [--session=<id>] [--disable]");
                    std::process::exit(1);
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("memopt {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("memopt (static memory reuse planner)");
    println!();
    println!("Usage: memopt <command> [options]");
    println!();
    println!("Commands:");
    println!("  plan <graph.bin>     Plan storage sharing for a serialized graph");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Plan options:");
    println!("  --sort=<ts|dfs>     Traversal order (default: ts, or $MEMOPT_SORT)");
    println!("  --session=<id>      Session id the plan is published under (default: 0)");
    println!("  --disable           Skip memory optimization");
    println!();
    println!("Set RUST_LOG=memopt_plan=debug to trace planning.");
}

//! Command-line interface for dupkeys
//! This binary finds and removes duplicate keys in JSON localization files.
//!
//! Usage:
//!   dupkeys scan `<root>` [--match `<mode>`] [--policy `<policy>`]   - Report duplicates, write nothing
//!   dupkeys clean `<root>` [--yes] [--timestamped-backup]        - Backup, rewrite, validate, persist
//!
//! `<root>` is either a locales directory (scanned for `<lang>/translation.json`)
//! or a single JSON file.

use clap::{Arg, ArgAction, Command};
use dupkeys::discover;
use dupkeys::process::{process_batch, DepthFilter, ProcessOptions, RunMode};
use dupkeys::{BatchReport, KeepPolicy, MatchMode};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn main() {
    let matches = Command::new("dupkeys")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for cleaning duplicate keys out of JSON localization files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(shared_args(
            Command::new("scan").about("Report duplicate keys without writing anything"),
        ))
        .subcommand(
            shared_args(
                Command::new("clean")
                    .about("Remove duplicate keys: backup, rewrite, validate, persist"),
            )
            .arg(
                Arg::new("yes")
                    .long("yes")
                    .short('y')
                    .help("Skip the confirmation prompt")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("timestamped-backup")
                    .long("timestamped-backup")
                    .help("Suffix backup files with a timestamp")
                    .action(ArgAction::SetTrue),
            ),
        )
        .get_matches();

    let exit = match matches.subcommand() {
        Some(("scan", sub)) => run(sub, RunMode::DryRun),
        Some(("clean", sub)) => run(sub, RunMode::Commit),
        _ => unreachable!(),
    };
    std::process::exit(exit);
}

fn shared_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("root")
            .help("Locales directory or a single JSON file")
            .required(true)
            .index(1),
    )
    .arg(
        Arg::new("file-name")
            .long("file-name")
            .help("File name looked up inside each language directory")
            .default_value(discover::DEFAULT_FILE_NAME),
    )
    .arg(
        Arg::new("depth")
            .long("depth")
            .help("Nesting depth to scan: a number, or 'all' (1 = top level)")
            .default_value("1"),
    )
    .arg(
        Arg::new("match")
            .long("match")
            .help("Duplicate predicate: 'name', 'content' or 'sibling-content'")
            .default_value("content"),
    )
    .arg(
        Arg::new("policy")
            .long("policy")
            .help("Keep strategy: 'first' or 'shortest-path'")
            .default_value("first"),
    )
    .arg(
        Arg::new("format")
            .long("format")
            .short('f')
            .help("Output format: 'text' or 'json'")
            .default_value("text"),
    )
}

fn run(matches: &clap::ArgMatches, mode: RunMode) -> i32 {
    let root = PathBuf::from(matches.get_one::<String>("root").unwrap());
    let file_name = matches.get_one::<String>("file-name").unwrap();
    let format = matches.get_one::<String>("format").unwrap();

    let opts = match build_options(matches, mode) {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 2;
        }
    };

    let files = match discover::work_list(&root, file_name) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error reading {}: {}", root.display(), e);
            return 1;
        }
    };
    if files.is_empty() {
        eprintln!("No {} files found under {}", file_name, root.display());
        return 1;
    }

    if mode == RunMode::Commit && !matches.get_flag("yes") {
        // Dry-run pass first so the user sees what a commit would do
        let preview = process_batch(&files, &ProcessOptions {
            mode: RunMode::DryRun,
            ..opts.clone()
        });
        println!("{}", preview);
        let planned: usize = preview.files.iter().map(|r| r.planned_removals()).sum();
        if planned == 0 {
            println!("Nothing to remove.");
            return if preview.all_succeeded() { 0 } else { 1 };
        }
        if !confirm(&format!(
            "Remove {} duplicate span(s) across {} file(s)?",
            planned,
            files.len()
        )) {
            println!("Cancelled.");
            return 0;
        }
    }

    let batch = process_batch(&files, &opts);
    print_report(&batch, format);
    if batch.all_succeeded() {
        0
    } else {
        1
    }
}

fn build_options(matches: &clap::ArgMatches, mode: RunMode) -> Result<ProcessOptions, String> {
    let depth_arg = matches.get_one::<String>("depth").unwrap();
    let depth = if depth_arg == "all" {
        DepthFilter::All
    } else {
        let depth: usize = depth_arg
            .parse()
            .map_err(|_| format!("invalid depth '{}'", depth_arg))?;
        if depth == 0 {
            return Err("depth starts at 1 (the top level of the outer object)".to_string());
        }
        DepthFilter::At(depth)
    };

    let match_arg = matches.get_one::<String>("match").unwrap();
    let match_mode = MatchMode::from_name(match_arg)
        .ok_or_else(|| format!("invalid match mode '{}'", match_arg))?;

    let policy_arg = matches.get_one::<String>("policy").unwrap();
    let keep_policy = KeepPolicy::from_name(policy_arg)
        .ok_or_else(|| format!("invalid keep policy '{}'", policy_arg))?;

    // Shortest-path keeps need spans from every depth to mean anything
    let depth = if keep_policy == KeepPolicy::ShortestPath {
        DepthFilter::All
    } else {
        depth
    };

    let timestamped_backup = matches
        .try_get_one::<bool>("timestamped-backup")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false);

    Ok(ProcessOptions {
        depth,
        match_mode,
        keep_policy,
        mode,
        timestamped_backup,
    })
}

fn print_report(batch: &BatchReport, format: &str) {
    if format == "json" {
        match serde_json::to_string_pretty(batch) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing report: {}", e),
        }
    } else {
        println!("{}", batch);
    }
}

fn confirm(question: &str) -> bool {
    print!("{} (y/N): ", question);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

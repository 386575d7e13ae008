//! balance-engine CLI
//!
//! Compute group balances from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Balances for a group file
//! balance-engine balances --input group.json
//!
//! # Netted view, as JSON
//! balance-engine balances --input group.json --net --format json
//!
//! # Generate a random group for testing
//! balance-engine generate --members 6 --expenses 40
//! ```
//!
//! Set `RUST_LOG=debug` to trace the accumulation.

use balance_engine::balance::compute_balances;
use balance_engine::balance::policy::{LedgerPolicy, OverpaymentPolicy};
use balance_engine::core::expense::Expense;
use balance_engine::core::member::Member;
use balance_engine::core::settlement::Settlement;
use balance_engine::simulation::group_generator::{generate_random_group, GroupConfig};
use log::info;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"balance-engine — shared-expense balances and pairwise debts

USAGE:
    balance-engine <COMMAND> [OPTIONS]

COMMANDS:
    balances    Compute per-member balances for a group file
    generate    Generate a random group file (for testing)
    help        Show this message

OPTIONS (balances):
    --input <FILE>          Path to JSON group file
    --format <FORMAT>       Output format: text (default) or json
    --net                   Collapse each pair's debts into one direction
    --overpayment <POLICY>  allow-negative (default), clamp or net-reverse

OPTIONS (generate):
    --members <N>       Number of members (default: 5)
    --expenses <N>      Number of expenses (default: 20)
    --settlements <N>   Number of settlements (default: 5)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    balance-engine balances --input group.json
    balance-engine balances --input group.json --net --format json
    balance-engine balances --input group.json --overpayment clamp
    balance-engine generate --members 8 --expenses 60 --output test.json"#
    );
}

/// JSON schema for an input group.
#[derive(serde::Deserialize)]
struct GroupFile {
    members: Vec<Member>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    settlements: Vec<Settlement>,
    #[serde(default)]
    policy: Option<LedgerPolicy>,
}

fn load_group(path: &str) -> GroupFile {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "members": [ {{ "id": "u1", "name": "Ana" }}, {{ "id": "u2", "name": "Ben" }} ],
  "expenses": [
    {{ "paidByUserId": "u1", "splits": [ {{ "userId": "u2", "amount": "12.50" }} ] }}
  ],
  "settlements": [
    {{ "paidByUserId": "u2", "receivedByUserId": "u1", "amount": "5" }}
  ]
}}"#
        );
        process::exit(1);
    })
}

fn next_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn next_number(args: &[String], i: usize, flag: &str) -> usize {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{} requires a number", flag);
            process::exit(1);
        })
}

fn cmd_balances(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut net = None;
    let mut overpayment = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(next_value(args, i, "--input", "a file path"));
            }
            "--format" => {
                i += 1;
                format = next_value(args, i, "--format", "'text' or 'json'");
            }
            "--net" => net = Some(true),
            "--overpayment" => {
                i += 1;
                let raw = next_value(args, i, "--overpayment", "a policy name");
                overpayment = Some(raw.parse::<OverpaymentPolicy>().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let group = load_group(&path);

    // command-line flags override the policy stored in the file
    let mut policy = group.policy.unwrap_or_default();
    if let Some(overpayment) = overpayment {
        policy.overpayment = overpayment;
    }
    if let Some(net) = net {
        policy.net_pairs = net;
    }
    info!(
        "loaded {} members, {} expenses, {} settlements from {}",
        group.members.len(),
        group.expenses.len(),
        group.settlements.len(),
        path
    );

    let result = compute_balances(&group.members, &group.expenses, &group.settlements, &policy)
        .unwrap_or_else(|e| {
            eprintln!("Error computing balances: {}", e);
            process::exit(2);
        });

    if format == "json" {
        let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            eprintln!("Error encoding result: {}", e);
            process::exit(1);
        });
        println!("{}", json);
    } else {
        println!("{}", result);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                config.member_count = next_number(args, i, "--members");
            }
            "--expenses" => {
                i += 1;
                config.expense_count = next_number(args, i, "--expenses");
            }
            "--settlements" => {
                i += 1;
                config.settlement_count = next_number(args, i, "--settlements");
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let group = generate_random_group(&config);
    let json = serde_json::to_string_pretty(&group).unwrap_or_else(|e| {
        eprintln!("Error encoding group: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses and {} settlements across {} members → {}",
            group.expenses.len(),
            group.settlements.len(),
            group.members.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}

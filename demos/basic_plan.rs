//! Basic Plan Example
//!
//! Demonstrates how to use the CFS Engine to schedule a simple month.
//!
//! Run with: `cargo run --example basic_plan`

use rust_decimal_macros::dec;

use cfs_engine::{
    cents_to_string, run_cfs, Action, BillInput, DepositInput, PlanInput,
};

fn main() {
    println!("=== CFS Engine Basic Plan Example ===\n");

    // Describe the month
    let input = PlanInput {
        start_balance: dec!(100.00),
        target_end: dec!(200.00),
        band: dec!(50.00),
        rent_guard: dec!(800.00),
        deposits: vec![DepositInput {
            day: 15,
            amount: dec!(500.00),
        }],
        bills: vec![
            BillInput {
                day: 5,
                name: "Phone".to_string(),
                amount: dec!(75.00),
            },
            BillInput {
                day: 30,
                name: "Rent".to_string(),
                amount: dec!(800.00),
            },
        ],
        actions: None,
        manual_adjustments: vec![],
        metadata: serde_json::Map::new(),
    };

    println!("Plan Input:");
    println!("  Start Balance: ${}", input.start_balance);
    println!("  Target End: ${} +/- ${}", input.target_end, input.band);
    println!("  Rent Guard: ${}", input.rent_guard);
    println!("  Deposits: {}", input.deposits.len());
    println!("  Bills: {}", input.bills.len());
    println!();

    // Run the solve
    println!("Running CFS Engine...");
    match run_cfs(input) {
        Ok(output) => {
            println!("\n=== Schedule ===\n");

            let schedule = &output.schedule;
            println!(
                "Objective: {} workdays, {} back-to-back, {} cents off target",
                schedule.objective.workdays,
                schedule.objective.b2b,
                schedule.objective.abs_diff_cents
            );
            println!(
                "Final Closing: ${}",
                cents_to_string(schedule.final_closing_cents)
            );
            println!("Solver: {}", schedule.solver.name);
            println!();

            println!("Work days:");
            for (i, action) in schedule.actions.iter().enumerate() {
                if *action == Action::Work {
                    println!("  - day {}", i + 1);
                }
            }
            println!();

            println!("Ledger:");
            for row in &schedule.ledger {
                println!(
                    "  day {:>2}: open {:>9}  +dep {:>9}  {:<5} -bills {:>9}  close {:>9}",
                    row.day,
                    cents_to_string(row.opening_cents),
                    cents_to_string(row.deposits_cents),
                    row.action.to_string(),
                    cents_to_string(row.bills_cents),
                    cents_to_string(row.closing_cents),
                );
            }
            println!();

            println!("Validation:");
            for check in &output.validation.checks {
                println!(
                    "  [{}] {}: {}",
                    if check.pass { "ok" } else { "FAIL" },
                    check.name,
                    check.detail
                );
            }
        }
        Err(e) => {
            eprintln!("Solve failed: {e}");
            std::process::exit(1);
        }
    }
}

//! Interactive decompression planner.
//!
//! Prompts for a bottom profile, breathing gases and gradient factors,
//! then prints the computed schedule and per-gas consumption.
//!
//! Run with: `cargo run --bin planner`

use std::io::{self, Write};

use diveplan::dive::Dive;
use diveplan::dive_step::DiveStep;
use diveplan::gas::Gas;
use diveplan::zhl16c::ZhL16cGf;
use diveplan::{BOT_PPO2, DECO_PPO2, LAST_STOP, SAMPLE_RATE};

/// Reads a line and parses it, empty input meaning "keep the default".
/// Returns `None` on unparseable input so the caller can re-prompt.
fn read_f64(default: f64) -> Option<f64> {
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let line = line.trim();
    if line.is_empty() {
        return Some(default);
    }
    line.parse().ok()
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    loop {
        print!("{prompt} [{default}]: ");
        io::stdout().flush().expect("stdout");
        match read_f64(default) {
            Some(value) => return value,
            None => println!("not a number, try again"),
        }
    }
}

/// Parses gases entered as comma-separated `o2[/he]` percentages,
/// e.g. `21, 50, 21/35, 100`.
fn prompt_gases() -> Vec<Gas> {
    loop {
        print!("Enter gases as o2[/he] percentages (default: 21): ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();

        let input = input.trim();
        if input.is_empty() {
            return vec![Gas::air()];
        }

        let mut gases = Vec::new();
        let mut ok = true;
        for part in input.split(',') {
            let mut fractions = part.trim().split('/');
            let o2 = fractions.next().and_then(|s| s.trim().parse::<f64>().ok());
            let he = match fractions.next() {
                Some(s) => s.trim().parse::<f64>().ok(),
                None => Some(0.0),
            };
            match (o2, he) {
                (Some(o2), Some(he)) => match Gas::new(o2 / 100.0, he / 100.0) {
                    Ok(gas) => gases.push(gas),
                    Err(e) => {
                        println!("Invalid gas '{}': {}", part.trim(), e);
                        ok = false;
                        break;
                    }
                },
                _ => {
                    println!("Could not parse gas '{}'.", part.trim());
                    ok = false;
                    break;
                }
            }
        }
        if ok && !gases.is_empty() {
            return gases;
        }
    }
}

fn main() {
    println!("=== Dive Planner ({}) ===\n", ZhL16cGf::NAME);

    let depth = prompt_f64("Bottom depth in meters", 40.0);
    let time = prompt_f64("Runtime to end of bottom leg in minutes", 20.0);
    let gases = prompt_gases();
    let gf_low = prompt_f64("Gradient factor low (0-100)", 100.0) as u8;
    let gf_high = prompt_f64("Gradient factor high (0-100)", 100.0) as u8;

    let bottom_gas = gases[0].clone();
    if let Ok(bottom_mix) = Gas::best_mix(depth, 30.0, BOT_PPO2) {
        if !gases.contains(&bottom_mix) {
            println!(
                "Hint: {} would keep ppO2 at {} and narcosis at 30m-air level at {}m.",
                bottom_mix, BOT_PPO2, depth
            );
        }
    }
    if let Ok(deco_mix) = Gas::best_mix(LAST_STOP, LAST_STOP, DECO_PPO2) {
        if !gases.contains(&deco_mix) {
            println!(
                "Hint: {} would reach ppO2 {} at the {}m stop.",
                deco_mix, DECO_PPO2, LAST_STOP
            );
        }
    }

    let steps = match DiveStep::new(time, depth, depth, bottom_gas) {
        Ok(step) => vec![step],
        Err(e) => {
            eprintln!("Invalid profile: {}", e);
            return;
        }
    };

    let mut dive = match Dive::new(
        steps,
        gases,
        ZhL16cGf::NAME,
        (gf_low, gf_high),
        SAMPLE_RATE,
    ) {
        Ok(dive) => dive,
        Err(e) => {
            eprintln!("Could not create dive: {}", e);
            return;
        }
    };

    if let Err(e) = dive.plan() {
        eprintln!("Planning failed: {}", e);
        return;
    }

    println!(
        "\n{} GF {}/{}\n",
        dive.model().name(),
        gf_low,
        gf_high
    );
    println!("{:>3} {:>6} {:>6} {:>8}  gas", "", "depth", "time", "runtime");
    for row in dive.report() {
        println!(
            "{:>3} {:>5}m {:>3}min {:>5}min  {}",
            row.symbol, row.depth, row.time, row.runtime, row.gas
        );
    }

    println!("\nGas consumption (surface-equivalent liters):");
    for gas in dive.gas_plan().gases() {
        println!("  {:<10} {:.0} L", format!("{}", gas), gas.consumption());
    }
}

//! Parse throughput across input sizes, measured against yaml-rust2.
//!
//! The line parser is expected to scale linearly with input size. If the
//! time per line grows as the input grows, something is rescanning.
//!
//! Run with: cargo bench --bench parse_throughput

use shma_yaml::parse_one;
use std::time::{Duration, Instant};
use yaml_rust2::YamlLoader;

const ROUNDS: u32 = 20;

/// Generate a flat block sequence of N string items
fn generate_flat_sequence(n: usize) -> String {
    let mut yaml = String::new();
    for i in 0..n {
        yaml.push_str(&format!("- \"item_{}\"\n", i));
    }
    yaml
}

/// Generate a flat mapping with N key-value pairs
fn generate_flat_mapping(n: usize) -> String {
    let mut yaml = String::new();
    for i in 0..n {
        yaml.push_str(&format!("key_{}: \"value_{}\"\n", i, i));
    }
    yaml
}

/// Generate a top-level mapping with N services, each a small nested structure
fn generate_services(n: usize) -> String {
    let mut yaml = String::from("services:\n");
    for i in 0..n {
        yaml.push_str(&format!(
            "  - name: service_{}\n    replicas: {}\n    enabled: true\n    ports: [80, 443]\n    command: |\n      run --id {}\n      wait\n",
            i, i % 5, i
        ));
    }
    yaml
}

fn time(rounds: u32, mut f: impl FnMut()) -> Duration {
    let start = Instant::now();
    for _ in 0..rounds {
        f();
    }
    start.elapsed() / rounds
}

fn bench(name: &str, generator: impl Fn(usize) -> String, sizes: &[usize]) {
    println!("\n{}", "=".repeat(70));
    println!("Throughput: {}", name);
    println!("{}", "=".repeat(70));
    println!(
        "{:>6} {:>8} {:>14} {:>14} {:>10}",
        "Size", "Lines", "shma-yaml", "yaml-rust2", "ns/line"
    );
    println!("{}", "-".repeat(70));

    let mut per_line = Vec::new();

    for &size in sizes {
        let content = generator(size);
        let lines = content.lines().count().max(1);

        if let Err(err) = parse_one(&content) {
            println!("{:>6} failed to parse: {}", size, err);
            continue;
        }

        let ours = time(ROUNDS, || {
            let _ = parse_one(&content);
        });
        let reference = time(ROUNDS, || {
            let _ = YamlLoader::load_from_str(&content);
        });
        let ns = ours.as_nanos() as f64 / lines as f64;

        println!(
            "{:>6} {:>8} {:>14?} {:>14?} {:>10.1}",
            size, lines, ours, reference, ns
        );
        per_line.push(ns);
    }

    if let (Some(first), Some(last)) = (per_line.first(), per_line.last()) {
        let change = (last - first) / first * 100.0;
        println!("\n  Time per line: {:.1}ns -> {:.1}ns ({:+.1}%)", first, last, change);
    }
}

fn main() {
    println!("Parse Throughput: shma-yaml");
    println!("=============================================================");

    bench(
        "Flat Sequence",
        generate_flat_sequence,
        &[10, 100, 1000, 5000],
    );
    bench("Flat Mapping", generate_flat_mapping, &[10, 100, 1000, 5000]);
    bench("Services", generate_services, &[5, 50, 200, 500]);
}

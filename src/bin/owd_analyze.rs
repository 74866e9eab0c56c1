//! Analyze Simple-8b packing efficiency across synthetic workloads.
//!
//! Generates integer streams with controllable shapes (constant runs,
//! small deltas, trailing-zero heavy, sparse with gaps), encodes them and
//! reports word counts, bits per value and the selector distribution.

use clap::{Parser, ValueEnum};
use octoword::{decode, Encoder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "owd-analyze")]
#[command(about = "Analyze Simple-8b packing efficiency on synthetic workloads")]
struct Args {
    /// Workload shape to generate
    #[arg(short, long, value_enum, default_value = "mixed")]
    workload: Workload,

    /// Number of values to generate
    #[arg(short, long, default_value = "100000")]
    count: usize,

    /// RNG seed (runs are reproducible)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Fraction of missing values, per mille
    #[arg(short, long, default_value = "0")]
    missing: u32,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum Workload {
    /// One value repeated throughout
    Constant,
    /// Uniform values below 2^8
    Small,
    /// Uniform values below 2^40
    Wide,
    /// Small payloads shifted left by 8-60 bits
    TrailingZeros,
    /// A blend of all of the above in bursts
    Mixed,
}

#[derive(Default, Serialize)]
struct Report {
    values: usize,
    missing: usize,
    words: usize,
    bytes: usize,
    bits_per_value: f64,
    compression_ratio: f64,
    /// Words by kind: plain, extended selector 7, extended selector 8, run
    plain_words: usize,
    extended7_words: usize,
    extended8_words: usize,
    rle_words: usize,
}

impl Report {
    fn print_text(&self) {
        println!("{}", "=".repeat(60));
        println!("SIMPLE-8B PACKING REPORT");
        println!("{}", "=".repeat(60));
        println!();
        println!("Values:            {} ({} missing)", self.values, self.missing);
        println!("Words:             {}", self.words);
        println!("Encoded bytes:     {}", self.bytes);
        println!("Bits per value:    {:.3}", self.bits_per_value);
        println!("Compression ratio: {:.1}x vs raw u64", self.compression_ratio);
        println!();
        println!("Word kinds:");
        println!("  plain:       {}", self.plain_words);
        println!("  extended-7:  {}", self.extended7_words);
        println!("  extended-8:  {}", self.extended8_words);
        println!("  run-length:  {}", self.rle_words);
    }
}

fn generate(args: &Args) -> Vec<Option<u64>> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    (0..args.count)
        .map(|i| {
            if args.missing > 0 && rng.gen_range(0..1000u32) < args.missing {
                return None;
            }
            let value = match args.workload {
                Workload::Constant => 7,
                Workload::Small => rng.gen_range(0..256),
                Workload::Wide => rng.gen_range(0..1u64 << 40),
                Workload::TrailingZeros => {
                    let payload = rng.gen_range(1..32u64);
                    payload << rng.gen_range(8..60)
                }
                Workload::Mixed => match i / 500 % 4 {
                    0 => 7,
                    1 => rng.gen_range(0..256),
                    2 => rng.gen_range(0..1u64 << 40),
                    _ => rng.gen_range(1..32u64) << rng.gen_range(8..60),
                },
            };
            Some(value)
        })
        .collect()
}

fn analyze(entries: &[Option<u64>]) -> Report {
    let mut words = Vec::new();
    {
        let mut enc = Encoder::new(|w: u64| words.push(w));
        for entry in entries {
            match entry {
                None => enc.skip(),
                // The generator never produces unstorable values.
                Some(v) => enc.append(*v).expect("generated value out of range"),
            }
        }
        enc.flush();
    }

    let mut report = Report {
        values: entries.len(),
        missing: entries.iter().filter(|e| e.is_none()).count(),
        words: words.len(),
        bytes: words.len() * 8,
        ..Report::default()
    };
    for word in &words {
        let selector = word & 0xF;
        let extension = (word >> 4) & 0xF;
        match selector {
            15 => report.rle_words += 1,
            7 if extension != 0 => report.extended7_words += 1,
            8 if extension != 0 => report.extended8_words += 1,
            _ => report.plain_words += 1,
        }
    }
    if !entries.is_empty() {
        report.bits_per_value = (report.bytes * 8) as f64 / entries.len() as f64;
        report.compression_ratio = (entries.len() * 8) as f64 / report.bytes.max(1) as f64;
    }
    report
}

fn main() {
    let args = Args::parse();
    let entries = generate(&args);
    let report = analyze(&entries);

    // Sanity check the chain end to end before reporting on it.
    let bytes: Vec<u8> = {
        let mut bytes = Vec::new();
        let mut enc = Encoder::new(|w: u64| bytes.extend_from_slice(&w.to_ne_bytes()));
        for entry in &entries {
            match entry {
                None => enc.skip(),
                Some(v) => enc.append(*v).expect("generated value out of range"),
            }
        }
        enc.flush();
        drop(enc);
        bytes
    };
    assert_eq!(decode::<u64>(&bytes), entries, "roundtrip broke");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        report.print_text();
    }
}

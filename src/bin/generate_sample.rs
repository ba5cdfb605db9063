use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Age brackets written after the `All ages` column.
const BRACKETS: [&str; 20] = [
    "0", "1-4", "5-9", "10-14", "15-19", "20-24", "25-29", "30-34", "35-39", "40-44", "45-49",
    "50-54", "55-59", "60-64", "65-69", "70-74", "75-79", "80-84", "85-89", "90+",
];

const COUNTRIES: [(&str, f64); 10] = [
    ("United States of America", 3_000_000.0),
    ("Japan", 1_200_000.0),
    ("Germany", 800_000.0),
    ("France", 650_000.0),
    ("Brazil", 2_000_000.0),
    ("Canada", 370_000.0),
    ("Australia", 250_000.0),
    ("Mexico", 1_200_000.0),
    ("Sweden", 100_000.0),
    ("Chile", 180_000.0),
];

const YEARS: std::ops::RangeInclusive<i32> = 1990..=2020;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform jitter factor in `[1 - spread, 1 + spread]`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }
}

/// Annual deaths per 1000 people for bracket `i`: high in infancy, low in
/// childhood, then rising roughly exponentially with age.
fn base_rate(i: usize, female: bool) -> f64 {
    let rate = match i {
        0 => 6.0,
        1 => 0.3,
        _ => 0.12 * (0.088 * 5.0 * (i as f64 - 1.0)).exp(),
    };
    if female {
        rate * 0.75
    } else {
        rate
    }
}

/// Relative population share of bracket `i` (wider brackets hold more people).
fn population_share(i: usize) -> f64 {
    let width = match i {
        0 => 1.0,
        1 => 4.0,
        _ => 5.0,
    };
    width * (1.0 - 0.035 * i as f64).max(0.05)
}

struct Rows {
    deaths: Vec<Vec<String>>,
    population: Vec<Vec<String>>,
    rate: Vec<Vec<String>>,
}

fn fmt(v: f64) -> String {
    format!("{v:.0}")
}

fn generate(rng: &mut SimpleRng) -> Rows {
    let mut rows = Rows {
        deaths: Vec::new(),
        population: Vec::new(),
        rate: Vec::new(),
    };

    for &(country, size) in &COUNTRIES {
        for year in YEARS {
            // Mortality falls slowly over the period.
            let improvement = 1.0 - 0.01 * (year - YEARS.start()) as f64;
            let growth = 1.0 + 0.008 * (year - YEARS.start()) as f64;

            let mut by_sex = Vec::new();
            for female in [false, true] {
                let pop: Vec<f64> = (0..BRACKETS.len())
                    .map(|i| (size * growth * population_share(i) * rng.jitter(0.03)).round())
                    .collect();
                let deaths: Vec<f64> = pop
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        (p * base_rate(i, female) * improvement * rng.jitter(0.08) / 1000.0)
                            .round()
                    })
                    .collect();
                let unknown = (rng.next_f64() * 5.0).floor();
                by_sex.push((pop, deaths, unknown));
            }

            let (m_pop, m_deaths, m_unknown) = &by_sex[0];
            let (f_pop, f_deaths, f_unknown) = &by_sex[1];
            let all_pop: Vec<f64> = m_pop.iter().zip(f_pop).map(|(a, b)| a + b).collect();
            let all_deaths: Vec<f64> = m_deaths.iter().zip(f_deaths).map(|(a, b)| a + b).collect();
            let all_unknown = m_unknown + f_unknown;

            let sexes: [(&str, &[f64], &[f64], f64); 3] = [
                ("Male", m_pop.as_slice(), m_deaths.as_slice(), *m_unknown),
                ("Female", f_pop.as_slice(), f_deaths.as_slice(), *f_unknown),
                ("All", all_pop.as_slice(), all_deaths.as_slice(), all_unknown),
            ];

            for (sex, pop, deaths, unknown) in sexes {
                let key = vec![country.to_string(), sex.to_string(), year.to_string()];
                let pop_total: f64 = pop.iter().sum();
                let death_total: f64 = deaths.iter().sum::<f64>() + unknown;

                let mut d = key.clone();
                d.push(fmt(death_total));
                d.extend(deaths.iter().map(|v| fmt(*v)));
                d.push(fmt(unknown));
                rows.deaths.push(d);

                // Population and rate have no "Unknown" figure.
                let mut p = key.clone();
                p.push(fmt(pop_total));
                p.extend(pop.iter().map(|v| fmt(*v)));
                p.push(String::new());
                rows.population.push(p);

                let mut r = key;
                r.push(format!("{:.4}", death_total / pop_total * 1000.0));
                r.extend(
                    deaths
                        .iter()
                        .zip(pop)
                        .map(|(d, p)| format!("{:.4}", d / p * 1000.0)),
                );
                r.push(String::new());
                rows.rate.push(r);
            }
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["Country", "Sex", "Year", "All ages"];
    header.extend(BRACKETS);
    header.push("Unknown");
    writer.write_record(&header)?;

    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let files = [
        ("who_all_cause_deaths.csv", &rows.deaths),
        ("who_population.csv", &rows.population),
        ("who_ac_deaths_per_1000.csv", &rows.rate),
    ];
    for (name, data) in files {
        let path = out_dir.join(name);
        write_csv(&path, data)?;
        println!("Wrote {} rows to {}", data.len(), path.display());
    }
    Ok(())
}

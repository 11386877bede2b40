//! Writes a synthetic heart failure cohort as CSV and Parquet, with the
//! column layout the explorer expects.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const PATIENTS: usize = 299;
const CSV_PATH: &str = "heart_failure_clinical_records_dataset_cleaned.csv";
const PARQUET_PATH: &str = "heart_failure_clinical_records_dataset_cleaned.parquet";

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn flag(&mut self, p: f64) -> i64 {
        i64::from(self.next_f64() < p)
    }
}

/// One synthetic patient.
struct Patient {
    age: i64,
    anaemia: i64,
    creatinine_phosphokinase: i64,
    diabetes: i64,
    ejection_fraction: i64,
    high_blood_pressure: i64,
    platelets: f64,
    serum_creatinine: f64,
    serum_sodium: i64,
    sex_label: &'static str,
    smoking: i64,
    time: i64,
    death_label: &'static str,
}

fn generate_patient(rng: &mut SimpleRng) -> Patient {
    let age = rng.gauss(61.0, 12.0).clamp(40.0, 95.0).round() as i64;
    let ejection_fraction = rng.gauss(38.0, 12.0).clamp(14.0, 80.0).round() as i64;
    let serum_creatinine = (rng.gauss(1.4, 0.9).clamp(0.5, 9.4) * 100.0).round() / 100.0;
    let male = rng.next_f64() < 0.65;

    // Low ejection fraction, high creatinine and age raise the risk.
    let risk = 0.15
        + 0.012 * (40 - ejection_fraction).max(0) as f64
        + 0.10 * (serum_creatinine - 1.2).max(0.0)
        + 0.006 * (age - 60).max(0) as f64;
    let died = rng.next_f64() < risk.min(0.95);
    let time = if died {
        rng.gauss(70.0, 50.0).clamp(4.0, 285.0)
    } else {
        rng.gauss(160.0, 65.0).clamp(4.0, 285.0)
    };

    Patient {
        age,
        anaemia: rng.flag(0.43),
        creatinine_phosphokinase: rng.gauss(580.0, 400.0).clamp(23.0, 7861.0).round() as i64,
        diabetes: rng.flag(0.42),
        ejection_fraction,
        high_blood_pressure: rng.flag(0.35),
        platelets: (rng.gauss(263_000.0, 97_000.0).clamp(25_100.0, 850_000.0) / 10.0).round() * 10.0,
        serum_creatinine,
        serum_sodium: rng.gauss(136.6, 4.4).clamp(113.0, 148.0).round() as i64,
        sex_label: if male { "Male" } else { "Female" },
        smoking: if male { rng.flag(0.47) } else { rng.flag(0.04) },
        time: time.round() as i64,
        death_label: if died { "Died" } else { "Survived" },
    }
}

const COLUMNS: [&str; 13] = [
    "age",
    "anaemia",
    "creatinine_phosphokinase",
    "diabetes",
    "ejection_fraction",
    "high_blood_pressure",
    "platelets",
    "serum_creatinine",
    "serum_sodium",
    "sex_label",
    "smoking",
    "time",
    "death_label",
];

fn write_csv(patients: &[Patient]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV file")?;
    writer.write_record(COLUMNS).context("writing CSV header")?;
    for p in patients {
        writer
            .write_record([
                p.age.to_string(),
                p.anaemia.to_string(),
                p.creatinine_phosphokinase.to_string(),
                p.diabetes.to_string(),
                p.ejection_fraction.to_string(),
                p.high_blood_pressure.to_string(),
                p.platelets.to_string(),
                p.serum_creatinine.to_string(),
                p.serum_sodium.to_string(),
                p.sex_label.to_string(),
                p.smoking.to_string(),
                p.time.to_string(),
                p.death_label.to_string(),
            ])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(patients: &[Patient]) -> Result<()> {
    fn ints(patients: &[Patient], f: impl Fn(&Patient) -> i64) -> ArrayRef {
        Arc::new(Int64Array::from(patients.iter().map(f).collect::<Vec<_>>()))
    }
    fn floats(patients: &[Patient], f: impl Fn(&Patient) -> f64) -> ArrayRef {
        Arc::new(Float64Array::from(patients.iter().map(f).collect::<Vec<_>>()))
    }
    fn strings(patients: &[Patient], f: impl Fn(&Patient) -> &'static str) -> ArrayRef {
        Arc::new(StringArray::from(patients.iter().map(f).collect::<Vec<_>>()))
    }

    let columns: Vec<ArrayRef> = vec![
        ints(patients, |p| p.age),
        ints(patients, |p| p.anaemia),
        ints(patients, |p| p.creatinine_phosphokinase),
        ints(patients, |p| p.diabetes),
        ints(patients, |p| p.ejection_fraction),
        ints(patients, |p| p.high_blood_pressure),
        floats(patients, |p| p.platelets),
        floats(patients, |p| p.serum_creatinine),
        ints(patients, |p| p.serum_sodium),
        strings(patients, |p| p.sex_label),
        ints(patients, |p| p.smoking),
        ints(patients, |p| p.time),
        strings(patients, |p| p.death_label),
    ];

    let fields: Vec<Field> = COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let patients: Vec<Patient> = (0..PATIENTS).map(|_| generate_patient(&mut rng)).collect();

    write_csv(&patients)?;
    write_parquet(&patients)?;

    let died = patients.iter().filter(|p| p.death_label == "Died").count();
    println!(
        "Wrote {PATIENTS} patients ({died} died) to {CSV_PATH} and {PARQUET_PATH}"
    );
    Ok(())
}

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const OUTPUT_PATH: &str = "sample_series.parquet";

fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn logistic(t: f64, midpoint: f64, width: f64) -> f64 {
    1.0 / (1.0 + (-(t - midpoint) / width).exp())
}

/// Deterministic noise source (xoshiro256**) with a Box–Muller normal draw.
struct NoiseSource {
    state: [u64; 4],
}

impl NoiseSource {
    fn new(seed: u64) -> Self {
        let mut x = seed;
        let state = std::array::from_fn(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            x
        });
        NoiseSource { state }
    }

    fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;
        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
        result
    }

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, std_dev: f64) -> f64 {
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

/// One spectrum at temperature `t`: a band at 1650 that grows early, a band
/// at 1550 that follows later, and a constant band at 1450.
fn spectrum_at(wavenumbers: &[f64], t: f64, noise: &mut NoiseSource) -> Vec<f64> {
    let leading = logistic(t, 40.0, 6.0);
    let lagging = logistic(t, 60.0, 6.0);
    wavenumbers
        .iter()
        .map(|&wn| {
            0.8 * leading * gaussian(wn, 1650.0, 12.0)
                + 0.6 * lagging * gaussian(wn, 1550.0, 15.0)
                + 0.4 * gaussian(wn, 1450.0, 10.0)
                + noise.normal(0.002)
        })
        .collect()
}

fn float_lists(rows: &[Vec<f64>]) -> arrow::array::ListArray {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for row in rows {
        builder.values().append_slice(row);
        builder.append(true);
    }
    builder.finish()
}

fn main() -> Result<()> {
    env_logger::init();
    let mut noise = NoiseSource::new(7);

    // 1400 → 1700 cm⁻¹, step 2
    let wavenumbers: Vec<f64> = (0..151).map(|i| 1400.0 + i as f64 * 2.0).collect();
    let temperatures: Vec<f64> = (0..21).map(|i| 20.0 + i as f64 * 3.0).collect();

    let xs: Vec<Vec<f64>> = temperatures.iter().map(|_| wavenumbers.clone()).collect();
    let ys: Vec<Vec<f64>> = temperatures
        .iter()
        .map(|&t| spectrum_at(&wavenumbers, t, &mut noise))
        .collect();
    let samples: Vec<String> = (0..temperatures.len()).map(|i| format!("run_{i:02}")).collect();

    let item = Arc::new(Field::new("item", DataType::Float64, true));
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::List(item.clone()), false),
        Field::new("y", DataType::List(item), false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("sample", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(float_lists(&xs)),
            Arc::new(float_lists(&ys)),
            Arc::new(Float64Array::from(temperatures.clone())),
            Arc::new(StringArray::from(samples)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(OUTPUT_PATH).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    log::info!(
        "Wrote {} spectra ({} wavenumbers each) to {OUTPUT_PATH}",
        temperatures.len(),
        wavenumbers.len()
    );
    Ok(())
}

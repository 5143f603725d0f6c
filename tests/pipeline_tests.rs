use std::path::Path;

use approx::assert_abs_diff_eq;
use rusty_2dcos::config::{OutputFormat, RunConfig};
use rusty_2dcos::cos::{self, Matrix};
use rusty_2dcos::data::prepare::Reference;
use rusty_2dcos::state::AnalysisState;

/// Three axis points: the first grows linearly, the second follows one step
/// later, the third stays flat.
fn write_measurements(dir: &Path) {
    let leading = [0.0, 1.0, 2.0, 3.0, 4.0];
    let lagging = [0.0, 0.0, 1.0, 2.0, 3.0];
    for step in 0..5 {
        let body = format!(
            "# step {step}\n1000\t{}\n1002\t{}\n1004\t0.5\n",
            leading[step], lagging[step]
        );
        std::fs::write(dir.join(format!("m{step}.txt")), body).unwrap();
    }
}

#[test]
fn measurement_directory_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_measurements(input.path());

    let config = RunConfig {
        input: input.path().to_path_buf(),
        output_dir: output.path().join("maps"),
        ..RunConfig::default()
    };
    let analysis = AnalysisState::run(&config).unwrap();

    assert_eq!(analysis.sample_indices, vec![0, 1, 2, 3, 4]);
    assert_eq!(analysis.prepared.axis, vec![1000.0, 1002.0, 1004.0]);
    assert_eq!(analysis.prepared.matrix.width(), 5);

    let phi = &analysis.spectra.synchronous;
    let psi = &analysis.spectra.asynchronous;
    assert_eq!((phi.width(), phi.height()), (3, 3));
    for (value, x, y) in phi.iter() {
        assert_eq!(value, phi.get(y, x).unwrap());
    }
    for (value, x, y) in psi.iter() {
        assert_abs_diff_eq!(value, -psi.get(y, x).unwrap(), epsilon = 1e-12);
    }

    // The flat band is removed by mean-centring.
    assert_abs_diff_eq!(phi.get(2, 2).unwrap(), 0.0, epsilon = 1e-12);
    // Leading and lagging bands change together and out of step.
    assert!(phi.get(1, 0).unwrap() > 0.0);
    assert!(psi.get(1, 0).unwrap().abs() > 1e-3);

    let written = analysis.export(&config).unwrap();
    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }
    let sync_csv = std::fs::read_to_string(output.path().join("maps/synchronous.csv")).unwrap();
    assert!(sync_csv.starts_with(",1000,1002,1004\n"));
}

#[test]
fn json_series_with_selection_and_ordering() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let path = input.path().join("series.json");
    std::fs::write(
        &path,
        r#"[
            {"x": [1, 2], "y": [3.0, 1.0], "temperature": 30, "sample": "A"},
            {"x": [1, 2], "y": [9.0, 9.0], "temperature": 10, "sample": "B"},
            {"x": [1, 2], "y": [1.0, 2.0], "temperature": 10, "sample": "A"},
            {"x": [1, 2], "y": [2.0, 4.0], "temperature": 20, "sample": "A"}
        ]"#,
    )
    .unwrap();

    let config = RunConfig {
        input: path,
        select: vec!["sample=A".to_string()],
        order_by: Some("temperature".to_string()),
        reference: Reference::None,
        output_dir: output.path().to_path_buf(),
        format: OutputFormat::Json,
        extrema: false,
        ..RunConfig::default()
    };
    let analysis = AnalysisState::run(&config).unwrap();
    assert_eq!(analysis.sample_indices, vec![2, 3, 0]);

    let expected_data =
        Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 1.0]]).unwrap();
    assert_eq!(analysis.prepared.matrix, expected_data);
    assert_eq!(
        analysis.spectra.synchronous,
        cos::synchronous(&expected_data).unwrap()
    );

    let written = analysis.export(&config).unwrap();
    assert_eq!(written.len(), 2);
    assert!(output.path().join("asynchronous.json").exists());
    assert!(!output.path().join("extrema.json").exists());
}

#[test]
fn single_selected_spectrum_cannot_be_correlated() {
    let input = tempfile::tempdir().unwrap();
    let path = input.path().join("series.csv");
    std::fs::write(&path, "sample,x,y\nA,1;2,0.1;0.2\nB,1;2,0.3;0.4\n").unwrap();

    let config = RunConfig {
        input: path,
        select: vec!["sample=B".to_string()],
        ..RunConfig::default()
    };
    let err = AnalysisState::run(&config).err().expect("one sample must fail");
    let cause = err
        .chain()
        .find_map(|e| e.downcast_ref::<cos::CosError>())
        .expect("core error in chain");
    assert!(matches!(cause, cos::CosError::Argument(_)));
}

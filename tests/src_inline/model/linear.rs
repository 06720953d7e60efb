use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use super::*;

fn fixture_model() -> SparseLinearModel {
    SparseLinearModel::from_parts(8, vec![1, 3, 6], vec![0.5, -2.0, 1.0], 0.25).unwrap()
}

#[test]
fn test_zero_vector_scores_exactly_the_intercept() {
    let model = fixture_model();
    let x = SparseVector::zeros(8);
    assert_eq!(model.decision_score(&x).unwrap(), 0.25);
}

#[test]
fn test_known_dot_product() {
    let model = fixture_model();
    let x = SparseVector::from_entries(8, vec![(1, 2.0), (6, 1.0)]);
    // 0.25 + 2.0 * 0.5 + 1.0 * 1.0
    assert_eq!(model.decision_score(&x).unwrap(), 2.25);
}

#[test]
fn test_columns_without_coefficients_contribute_nothing() {
    let model = fixture_model();
    let x = SparseVector::from_entries(8, vec![(0, 100.0), (2, -7.0)]);
    assert_eq!(model.decision_score(&x).unwrap(), 0.25);
}

#[test]
fn test_dimension_mismatch_is_an_error() {
    let model = fixture_model();
    let x = SparseVector::zeros(4);
    let err = model.decision_score(&x).unwrap_err();
    assert_eq!(
        err,
        DimensionMismatchError {
            expected: 8,
            actual: 4
        }
    );
}

#[test]
fn test_predict_is_sign_of_score() {
    let positive = SparseLinearModel::from_parts(4, vec![], vec![], 0.5).unwrap();
    let negative = SparseLinearModel::from_parts(4, vec![], vec![], -0.5).unwrap();
    let zero = SparseLinearModel::from_parts(4, vec![], vec![], 0.0).unwrap();
    let xs = vec![SparseVector::zeros(4)];
    assert_eq!(positive.predict(&xs).unwrap(), vec![1]);
    assert_eq!(negative.predict(&xs).unwrap(), vec![0]);
    // Strictly greater than zero, matching the reference predictor.
    assert_eq!(zero.predict(&xs).unwrap(), vec![0]);
}

#[test]
fn test_predict_proba_is_sigmoid_of_score() {
    let model = SparseLinearModel::from_parts(4, vec![], vec![], 0.0).unwrap();
    let xs = vec![SparseVector::zeros(4)];
    assert_eq!(model.predict_proba(&xs).unwrap(), vec![0.5]);

    let model = SparseLinearModel::from_parts(4, vec![], vec![], 2.0).unwrap();
    let p = model.predict_proba(&xs).unwrap()[0];
    assert!((p - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-15);
}

#[test]
fn test_from_parts_rejects_unsorted_indices() {
    let err = SparseLinearModel::from_parts(8, vec![3, 1], vec![1.0, 1.0], 0.0).unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(_)));
}

#[test]
fn test_from_parts_rejects_out_of_bounds_index() {
    let err = SparseLinearModel::from_parts(8, vec![8], vec![1.0], 0.0).unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(_)));
}

#[test]
fn test_from_parts_rejects_length_mismatch() {
    let err = SparseLinearModel::from_parts(8, vec![1, 2], vec![1.0], 0.0).unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(_)));
}

#[test]
fn test_bytes_round_trip() {
    let model = fixture_model();
    let loaded = SparseLinearModel::from_bytes(&model.to_bytes()).unwrap();
    assert_eq!(loaded.dim(), model.dim());
    assert_eq!(loaded.nnz(), model.nnz());
    assert_eq!(loaded.intercept(), model.intercept());
    let x = SparseVector::from_entries(8, vec![(3, 1.0)]);
    assert_eq!(
        loaded.decision_score(&x).unwrap(),
        model.decision_score(&x).unwrap()
    );
}

#[test]
fn test_file_round_trip_mmap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.rctw");
    std::fs::write(&path, fixture_model().to_bytes()).unwrap();
    let loaded = SparseLinearModel::load(&path).unwrap();
    assert_eq!(loaded.dim(), 8);
    assert_eq!(loaded.intercept(), 0.25);
}

#[test]
fn test_file_round_trip_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.rctw.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(&fixture_model().to_bytes()).unwrap();
    encoder.finish().unwrap();
    let loaded = SparseLinearModel::load(&path).unwrap();
    assert_eq!(loaded.dim(), 8);
    assert_eq!(loaded.nnz(), 3);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SparseLinearModel::load(std::path::Path::new("/nonexistent/weights.rctw"))
        .unwrap_err();
    assert!(matches!(err, ModelLoadError::Io(_)));
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut bytes = fixture_model().to_bytes();
    bytes[0] = b'X';
    let err = SparseLinearModel::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(_)));
}

#[test]
fn test_truncated_resource_is_rejected() {
    let bytes = fixture_model().to_bytes();
    let err = SparseLinearModel::from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(_)));
}

#[test]
fn test_corrupt_header_fails_crc_check() {
    let mut bytes = fixture_model().to_bytes();
    // Flip a bit inside the dim field without touching the stored CRC.
    bytes[16] ^= 0x01;
    let err = SparseLinearModel::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(_)));
}

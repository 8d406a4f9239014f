//! `.fvecs` / `.ivecs` reading and writing against real files.

use std::io::{Cursor, Write};

use tempfile::{tempdir, NamedTempFile};
use vecprep::benchmark::{
    read_fvecs, read_ivecs, write_fvecs, write_ivecs, Dataset, FvecsReader, IvecsReader,
};
use vecprep::PrepError;

/// Route `debug!`/`trace!` from the loaders to the test output when
/// `RUST_LOG` is set.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fvecs_record(values: &[f32]) -> Vec<u8> {
    let mut bytes = (values.len() as i32).to_le_bytes().to_vec();
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn ivecs_record(values: &[i32]) -> Vec<u8> {
    let mut bytes = (values.len() as i32).to_le_bytes().to_vec();
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn temp_file_with(bytes: &[u8]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn reads_two_fvecs_records_of_different_lengths() {
    let mut bytes = fvecs_record(&[1.0, 2.0, 3.0, 4.0]);
    bytes.extend(fvecs_record(&[5.0, 6.0]));
    let f = temp_file_with(&bytes);

    let vectors = read_fvecs(f.path()).unwrap();
    assert_eq!(vectors, vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0]]);
}

#[test]
fn empty_file_has_no_records() {
    let f = temp_file_with(&[]);
    assert!(read_fvecs(f.path()).unwrap().is_empty());
    assert!(read_ivecs(f.path()).unwrap().is_empty());
}

#[test]
fn reads_ivecs_neighbor_lists() {
    let mut bytes = ivecs_record(&[7, 3, 0]);
    bytes.extend(ivecs_record(&[42]));
    let f = temp_file_with(&bytes);

    assert_eq!(read_ivecs(f.path()).unwrap(), vec![vec![7, 3, 0], vec![42]]);
}

#[test]
fn negative_ivecs_id_is_corrupt() {
    let f = temp_file_with(&ivecs_record(&[1, -5]));
    assert!(matches!(read_ivecs(f.path()), Err(PrepError::CorruptData(_))));
}

#[test]
fn truncated_payload_fails_after_valid_records() {
    let mut bytes = fvecs_record(&[1.0, 2.0]);
    bytes.extend(fvecs_record(&[3.0, 4.0, 5.0]));
    bytes.truncate(bytes.len() - 2);

    let mut reader = FvecsReader::new(Cursor::new(bytes.clone()));
    assert_eq!(reader.next().unwrap().unwrap(), vec![1.0, 2.0]);
    assert!(matches!(reader.next(), Some(Err(PrepError::CorruptData(_)))));
    assert!(reader.next().is_none());
    assert_eq!(reader.records_read(), 1);

    let f = temp_file_with(&bytes);
    assert!(matches!(read_fvecs(f.path()), Err(PrepError::CorruptData(_))));
}

#[test]
fn truncated_header_is_corrupt() {
    let mut bytes = fvecs_record(&[1.0]);
    bytes.extend_from_slice(&[2, 0]);

    let mut reader = FvecsReader::new(Cursor::new(bytes));
    assert!(reader.next().unwrap().is_ok());
    assert!(matches!(reader.next(), Some(Err(PrepError::CorruptData(_)))));
}

#[test]
fn non_positive_count_is_corrupt() {
    for count in [0i32, -3] {
        let bytes = count.to_le_bytes().to_vec();
        let mut reader = IvecsReader::new(Cursor::new(bytes));
        assert!(
            matches!(reader.read_record(), Err(PrepError::CorruptData(_))),
            "count {count} accepted"
        );
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.fvecs");
    assert!(matches!(read_fvecs(&missing), Err(PrepError::Io(_))));
}

#[test]
fn written_files_read_back() {
    init_tracing();
    let dir = tempdir().unwrap();
    let fpath = dir.path().join("base.fvecs");
    let ipath = dir.path().join("gt.ivecs");

    let vectors = vec![vec![0.5_f32, -1.25, 3.0], vec![9.0, 8.0, 7.0]];
    let lists = vec![vec![1_u32, 0], vec![0, 1]];
    write_fvecs(&fpath, &vectors).unwrap();
    write_ivecs(&ipath, &lists).unwrap();

    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 2 * (4 + 3 * 4));
    assert_eq!(read_fvecs(&fpath).unwrap(), vectors);
    assert_eq!(read_ivecs(&ipath).unwrap(), lists);
}

#[test]
fn writing_rejects_unreadable_records() {
    let dir = tempdir().unwrap();
    let empty: Vec<Vec<f32>> = vec![vec![]];
    assert!(matches!(
        write_fvecs(dir.path().join("e.fvecs"), &empty),
        Err(PrepError::InvalidParameter(_))
    ));
    assert!(matches!(
        write_ivecs(dir.path().join("big.ivecs"), &[vec![u32::MAX]]),
        Err(PrepError::InvalidParameter(_))
    ));
}

#[test]
fn dataset_load_from_files() {
    init_tracing();
    let dir = tempdir().unwrap();
    let base = dir.path().join("sift_base.fvecs");
    let query = dir.path().join("sift_query.fvecs");
    let gt = dir.path().join("sift_groundtruth.ivecs");

    let base_vectors = vec![vec![0.0_f32, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]];
    let queries = vec![vec![0.9_f32, 0.1]];
    write_fvecs(&base, &base_vectors).unwrap();
    write_fvecs(&query, &queries).unwrap();
    write_ivecs(&gt, &[vec![1_u32, 0]]).unwrap();

    let ds = Dataset::load(&base, &query, Some(gt.as_path())).unwrap();
    assert_eq!(ds.n_base(), 3);
    assert_eq!(ds.n_queries(), 1);
    assert_eq!(ds.dimension, 2);
    assert_eq!(ds.ground_truth, Some(vec![vec![1, 0]]));

    let computed = Dataset::load(&base, &query, None)
        .unwrap()
        .with_computed_ground_truth(2);
    assert_eq!(computed.ground_truth, Some(vec![vec![1, 0]]));
}

#[test]
fn dataset_load_rejects_mixed_dimensions() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("b.fvecs");
    let query = dir.path().join("q.fvecs");
    write_fvecs(&base, &[vec![1.0_f32, 2.0]]).unwrap();
    write_fvecs(&query, &[vec![1.0_f32, 2.0, 3.0]]).unwrap();

    assert!(matches!(
        Dataset::load(&base, &query, None),
        Err(PrepError::DimensionMismatch { expected: 2, actual: 3 })
    ));
}

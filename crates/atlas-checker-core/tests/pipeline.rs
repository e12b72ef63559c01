//! End-to-end pipeline tests driving the full scan over real trees.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use atlas_checker_core::discovery::LABEL_DIR_NAME;
use atlas_checker_core::{AtlasChecker, Config, Diagnostic, Error};
use tempfile::tempdir;
use tiff::encoder::{colortype, TiffEncoder};

fn write_catalog(dir: &Path, ids: &[i64]) -> PathBuf {
    let path = dir.join("atlas_info.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "id,name").unwrap();
    for id in ids {
        writeln!(file, "{},structure_{}", id, id).unwrap();
    }
    path
}

fn write_label_image(dir: &Path, name: &str, samples: &[u16]) {
    let mut encoder = TiffEncoder::new(File::create(dir.join(name)).unwrap()).unwrap();
    encoder
        .write_image::<colortype::Gray16>(samples.len() as u32, 1, samples)
        .unwrap();
}

fn label_dir(root: &Path, sample: &str) -> PathBuf {
    let dir = root.join(sample).join(LABEL_DIR_NAME);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn report_key(dir: &Path) -> String {
    dir.canonicalize().unwrap().to_string_lossy().into_owned()
}

#[test]
fn test_missing_ids_reported_per_directory() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1, 2, 3]);
    let labels = label_dir(root.path(), "subject_01");
    write_label_image(&labels, "plane_0.tif", &[1, 2, 5, 7]);

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 2,
    })
    .unwrap();
    let outcome = checker.run(root.path()).unwrap();

    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report.entries[&report_key(&labels)], vec![5, 7]);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_nested_directories_are_independent() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1, 2, 3]);
    let first = label_dir(root.path(), "subject_01");
    let second = label_dir(root.path(), "subject_01/followup");
    write_label_image(&first, "plane_0.tif", &[1, 10]);
    write_label_image(&second, "plane_0.tif", &[2, 20]);

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 0,
    })
    .unwrap();
    let outcome = checker.run(root.path()).unwrap();

    assert_eq!(outcome.report.len(), 2);
    assert_eq!(outcome.report.entries[&report_key(&first)], vec![10]);
    assert_eq!(outcome.report.entries[&report_key(&second)], vec![20]);
}

#[test]
fn test_corrupt_file_does_not_abort_directory_or_run() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1, 2, 3]);
    let labels = label_dir(root.path(), "subject_01");
    write_label_image(&labels, "plane_0.tif", &[1, 2]);
    write_label_image(&labels, "plane_1.tif", &[3, 9]);
    write_label_image(&labels, "plane_2.tif", &[2, 3]);
    let mut corrupt = File::create(labels.join("plane_3.tif")).unwrap();
    corrupt.write_all(b"garbage bytes").unwrap();

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 1,
    })
    .unwrap();
    let outcome = checker.run(root.path()).unwrap();

    // The three decodable planes still contribute
    assert_eq!(outcome.report.entries[&report_key(&labels)], vec![9]);
    assert_eq!(outcome.diagnostics.len(), 1);
    match &outcome.diagnostics[0] {
        Diagnostic::FileFailed { path, .. } => {
            assert_eq!(path.file_name().unwrap(), "plane_3.tif")
        }
        other => panic!("unexpected diagnostic: {:?}", other),
    }
}

#[test]
fn test_directory_without_images_reports_empty_set() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1]);
    let labels = label_dir(root.path(), "subject_01");

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 1,
    })
    .unwrap();
    let outcome = checker.run(root.path()).unwrap();

    assert_eq!(outcome.report.entries[&report_key(&labels)], Vec::<i64>::new());
}

#[test]
fn test_repeated_runs_are_identical() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1, 2]);
    let first = label_dir(root.path(), "b_subject");
    let second = label_dir(root.path(), "a_subject");
    write_label_image(&first, "plane_0.tif", &[4, 1]);
    write_label_image(&second, "plane_0.tif", &[8, 2]);

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 4,
    })
    .unwrap();
    let one = checker.run(root.path()).unwrap();
    let two = checker.run(root.path()).unwrap();

    assert_eq!(one.report, two.report);
    assert_eq!(
        serde_json::to_string(&one.report).unwrap(),
        serde_json::to_string(&two.report).unwrap()
    );
}

#[test]
fn test_missing_catalog_aborts_before_scanning() {
    let root = tempdir().unwrap();
    label_dir(root.path(), "subject_01");

    let result = AtlasChecker::new(&Config {
        csv_path: root.path().join("no_such_catalog.csv"),
        threads: 1,
    });

    assert!(matches!(result, Err(Error::CatalogNotFound(_))));
}

#[test]
fn test_unparsable_catalog_aborts_before_scanning() {
    let root = tempdir().unwrap();
    let csv_path = root.path().join("atlas_info.csv");
    fs::write(&csv_path, "id,name\n1,ok\nbroken,bad\n").unwrap();

    let result = AtlasChecker::new(&Config {
        csv_path,
        threads: 1,
    });

    assert!(matches!(result, Err(Error::CatalogParse { .. })));
}

#[test]
fn test_invalid_root_is_fatal() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1]);

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 1,
    })
    .unwrap();
    let result = checker.run(Path::new("/path/that/does/not/exist"));

    assert!(matches!(result, Err(Error::InvalidRootPath(_))));
}

#[test]
fn test_tree_without_label_directories_yields_empty_report() {
    let root = tempdir().unwrap();
    let csv_path = write_catalog(root.path(), &[1]);
    fs::create_dir_all(root.path().join("subject_01/other_data")).unwrap();

    let checker = AtlasChecker::new(&Config {
        csv_path,
        threads: 1,
    })
    .unwrap();
    let outcome = checker.run(root.path()).unwrap();

    assert!(outcome.report.is_empty());
    assert!(outcome.diagnostics.is_empty());
}

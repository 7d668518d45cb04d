//! End-to-end tests: fixture document through extraction, batch runner and
//! the delimited table files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use mojxml_flatten::{
    flatten_document, run_batch, BatchOptions, CancelToken, DirectorySource, MemorySink,
    RecordSink, Stage, Table, TsvSink,
};

const LABEL: &str = "202404";

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn write_zip(path: &Path, entry: &str, content: &str) {
    let mut writer = zip::ZipWriter::new(fs::File::create(path).unwrap());
    writer
        .start_file(entry, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap();
}

fn rows(table: &[&[&str]]) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}

fn tagged(document_id: &str, table: &[&[&str]]) -> Vec<Vec<String>> {
    rows(table)
        .into_iter()
        .map(|row| {
            let mut tagged = vec![LABEL.to_string(), document_id.to_string()];
            tagged.extend(row);
            tagged
        })
        .collect()
}

fn flatten_fixture(sink: &MemorySink) {
    let xml = load_fixture("sample.xml");
    let doc = roxmltree::Document::parse(&xml).expect("Failed to parse fixture");
    let records = flatten_document(&doc, "sample.xml", LABEL).expect("Failed to flatten");
    for batch in records.batches() {
        sink.write_batch(&batch).unwrap();
    }
}

#[test]
fn test_document_info() {
    let sink = MemorySink::new();
    flatten_fixture(&sink);

    assert_eq!(
        sink.rows(Table::DocumentInfo),
        tagged(
            "sample.xml",
            &[&[
                "函館市",
                "01202",
                "本町二丁目",
                "公共座標11系",
                "1.0",
                "変換",
                "TKY2JGD",
                "1.3.79",
                "2.1.2",
            ]]
        )
    );
}

#[test]
fn test_points_resolve_through_point_map() {
    let sink = MemorySink::new();
    flatten_fixture(&sink);

    assert_eq!(
        sink.rows(Table::ReferencePoints),
        tagged(
            "sample.xml",
            &[&["T-105", "P9", "公共基準点", "金属標", "-40600.00", "12400.00"]]
        )
    );
    assert_eq!(
        sink.rows(Table::BoundaryPoints),
        tagged(
            "sample.xml",
            &[
                &["101", "P1", "-40500.10", "12300.20"],
                &["102", "P2", "-40500.10", "12320.20"],
                &["103", "P3", "-40520.10", "12320.20"],
                &["104", "P4", "-40520.10", "12300.20"],
            ]
        )
    );
}

#[test]
fn test_curve_vertices_and_surface_edges() {
    let sink = MemorySink::new();
    flatten_fixture(&sink);

    assert_eq!(
        sink.rows(Table::CurveVertices),
        tagged(
            "sample.xml",
            &[
                &["C1", "1", "", "", "P1"],
                &["C1", "2", "", "", "P2"],
                &["C2", "1", "", "", "P2"],
                &["C2", "2", "-40510.10", "12320.20", ""],
                &["C2", "3", "", "", "P3"],
                &["C3", "1", "", "", "P3"],
                &["C3", "2", "", "", "P4"],
                &["C4", "1", "", "", "P4"],
                &["C4", "2", "", "", "P1"],
            ]
        )
    );
    assert_eq!(
        sink.rows(Table::SurfaceEdges),
        tagged(
            "sample.xml",
            &[
                &["S1", "1", "C1"],
                &["S1", "2", "C2"],
                &["S1", "3", "C3"],
                &["S1", "4", "C4"],
            ]
        )
    );
}

#[test]
fn test_lines_parcels_and_sheets() {
    let sink = MemorySink::new();
    flatten_fixture(&sink);

    assert_eq!(
        sink.rows(Table::BoundaryLines),
        tagged(
            "sample.xml",
            &[
                &["C1", "筆界線", "筆界線"],
                &["C2", "筆界線", "筆界線"],
                &["C3", "筆界線", "筆界線"],
                &["C4", "大字界", "仮行政界線"],
            ]
        )
    );
    assert_eq!(
        sink.rows(Table::Parcels),
        tagged(
            "sample.xml",
            &[&[
                "H000000001",
                "001",
                "002",
                "0000",
                "00",
                "本町",
                "二丁目",
                "",
                "",
                "12-3",
                "S1",
                "甲二",
                "測量成果",
            ]]
        )
    );
    assert_eq!(
        sink.rows(Table::MapSheets),
        tagged(
            "sample.xml",
            &[&[
                "07-2",
                "-40700.00",
                "12200.00",
                "-40400.00",
                "12200.00",
                "-40700.00",
                "12600.00",
                "-40400.00",
                "12600.00",
                "500",
                "false",
                "地図",
                "地図",
                "ポリエステル・フィルム",
                "1998",
                "3",
                "31",
                "",
                "",
                "",
            ]]
        )
    );
    assert_eq!(
        sink.rows(Table::MapSheetParcelRefs),
        tagged("sample.xml", &[&["07-2", "H000000001"]])
    );
}

#[test]
fn test_directory_batch_to_tsv() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let sample = load_fixture("sample.xml");

    write_zip(&input.path().join("01202-0001.zip"), "01202-0001.xml", &sample);
    fs::write(input.path().join("01202-0002.xml"), &sample).unwrap();
    let broken = sample.replace(r#"<形状 idref="P9"/>"#, r#"<形状 idref="P404"/>"#);
    write_zip(&input.path().join("01202-0003.zip"), "01202-0003.xml", &broken);

    let source = DirectorySource::new(input.path()).unwrap();
    let sink = TsvSink::create(output.path(), LABEL).unwrap();
    let options = BatchOptions {
        batch_label: LABEL.to_string(),
        workers: 2,
    };

    let report = run_batch(&source, &sink, &options, &CancelToken::new()).unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].document_id, "01202-0003.zip");
    assert_eq!(report.failed[0].stage, Stage::ReferencePoints);
    assert_eq!(report.rows[&Table::CurveVertices], 18);

    let text = fs::read_to_string(output.path().join("202404_14surface_edges.tsv")).unwrap();
    let mut lines: Vec<_> = text.lines().collect();
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "202404\t01202-0001.zip\tS1\t1\tC1",
            "202404\t01202-0001.zip\tS1\t2\tC2",
            "202404\t01202-0001.zip\tS1\t3\tC3",
            "202404\t01202-0001.zip\tS1\t4\tC4",
            "202404\t01202-0002.xml\tS1\t1\tC1",
            "202404\t01202-0002.xml\tS1\t2\tC2",
            "202404\t01202-0002.xml\tS1\t3\tC3",
            "202404\t01202-0002.xml\tS1\t4\tC4",
        ]
    );

    // Rows of one document stay contiguous within a table.
    let documents: Vec<_> = text
        .lines()
        .map(|line| line.split('\t').nth(1).unwrap())
        .collect();
    let switches = documents.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(switches, 1);
}

#[test]
fn test_flatten_twice_is_identical() {
    let first = MemorySink::new();
    let second = MemorySink::new();
    flatten_fixture(&first);
    flatten_fixture(&second);

    for table in Table::ALL {
        assert_eq!(first.rows(table), second.rows(table), "{table}");
    }
}

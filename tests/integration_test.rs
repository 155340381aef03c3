//! Integration Tests for skillradar
//!
//! 回答ワークブックの読み取りから、チャートワークブック生成・PDF置き換え・
//! リンク一覧更新・通知までを、ローカルドライブ上で通しで検証します。

use rust_xlsxwriter::*;
use skillradar::{
    FileIndex, FileKind, LinksIndex, LocalDrive, Notification, Notifier, PdfExportOptions,
    PdfExporter, Profile, ResponseWorkbook, RowSelection, RunnerBuilder, StoredFile,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    pub const HEADER: [&str; 8] = [
        "タイムスタンプ",
        "会社名",
        "氏名",
        "設計[1]:要件定義",
        "設計[1]:基本設計",
        "実装[2]:コーディング",
        "実装[2]:レビュー",
        "テスト[3]:単体テスト",
    ];

    /// 回答3件と設定シートを持つ回答ワークブック
    pub fn generate_responses() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let responses = workbook.add_worksheet();
        responses.set_name("フォームの回答 1")?;
        for (col, title) in HEADER.iter().enumerate() {
            responses.write_string(0, col as u16, *title)?;
        }
        let answers: [(&str, &str, &str, [f64; 5]); 2] = [
            ("2024/04/01 10:00:00", "ACME", "山田", [3.0, 4.0, 5.0, 2.0, 1.0]),
            ("2024/04/02 11:30:00", "Initech", "佐藤", [1.0, 2.0, 3.0, 4.0, 5.0]),
        ];
        for (i, (timestamp, organization, person, scores)) in answers.iter().enumerate() {
            let row = i as u32 + 1;
            responses.write_string(row, 0, *timestamp)?;
            responses.write_string(row, 1, *organization)?;
            responses.write_string(row, 2, *person)?;
            for (j, score) in scores.iter().enumerate() {
                responses.write_number(row, 3 + j as u16, *score)?;
            }
        }
        // タイムスタンプのみの行
        responses.write_string(3, 0, "2024/04/03 09:00:00")?;

        let variables = workbook.add_worksheet();
        variables.set_name("変数")?;
        variables.write_string(0, 0, "フォルダ ID")?;
        variables.write_string(0, 1, "skills")?;

        let editors = workbook.add_worksheet();
        editors.set_name("編集者")?;
        editors.write_string(0, 0, "lead@example.com")?;
        editors.write_string(1, 0, "メールアドレス")?;

        Ok(workbook.save_to_buffer()?)
    }
}

/// エクスポートしたファイルIDを記録するPDFエクスポーター
#[derive(Clone, Default)]
struct RecordingExporter {
    exported: Rc<RefCell<Vec<String>>>,
}

impl PdfExporter for RecordingExporter {
    fn export(&self, file: &StoredFile, _options: &PdfExportOptions) -> skillradar::Result<Vec<u8>> {
        self.exported.borrow_mut().push(file.id.clone());
        Ok(format!("%PDF-1.4 {}", file.id).into_bytes())
    }
}

/// 送信内容を記録する通知
#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Rc<RefCell<Vec<Notification>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> skillradar::Result<()> {
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }
}

fn open_responses() -> ResponseWorkbook {
    let bytes = fixtures::generate_responses().unwrap();
    ResponseWorkbook::from_reader(bytes.as_slice()).unwrap()
}

fn pdf_count(root: &Path) -> usize {
    let drive = LocalDrive::open(root).unwrap();
    ["ACME 山田.pdf", "Initech 佐藤.pdf"]
        .iter()
        .map(|name| drive.search(name, FileKind::Pdf).unwrap().len())
        .sum()
}

#[test]
fn test_read_responses_workbook() {
    let mut responses = open_responses();

    let header = responses.header().unwrap();
    assert_eq!(header.len(), 256);
    assert_eq!(header[3], "設計[1]:要件定義");
    assert_eq!(header[8], "");

    let records = responses.records(&RowSelection::All).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0][..4], ["2024/04/01 10:00:00", "ACME", "山田", "3"]);
    assert_eq!(records[2], vec!["2024/04/03 09:00:00".to_string()]);

    let settings = responses.settings().unwrap();
    assert_eq!(settings.folder_id.as_deref(), Some("skills"));
    assert_eq!(settings.editors, vec!["lead@example.com".to_string()]);
}

#[test]
fn test_charts_menu_run_creates_one_workbook_per_respondent() {
    let dir = tempfile::tempdir().unwrap();
    let drive_root = dir.path().join("drive");
    let links_path = dir.path().join("links.xlsx");
    let mut responses = open_responses();
    let header = responses.header().unwrap();
    let records = responses.records(&RowSelection::All).unwrap();
    let settings = responses.settings().unwrap();

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Shared)
        .with_settings(&settings)
        .with_drive(LocalDrive::open(&drive_root).unwrap())
        .with_links_path(&links_path)
        .build()
        .unwrap();
    let report = runner.process(&header, &records).unwrap();

    // タイムスタンプのみの行は生成しない
    let names: Vec<_> = report.artifacts.iter().map(|a| a.name.clone()).collect();
    assert_eq!(names, vec!["ACME 山田", "Initech 佐藤"]);
    assert!(drive_root.join("skills").join("ACME 山田.xlsx").is_file());
    assert!(drive_root.join("skills").join("Initech 佐藤.xlsx").is_file());

    let drive = LocalDrive::open(&drive_root).unwrap();
    let sharing = drive.sharing(&skillradar::Folder::new("skills")).unwrap();
    assert_eq!(
        sharing.get("ACME 山田.xlsx"),
        Some(&vec!["lead@example.com".to_string()])
    );

    let links = LinksIndex::new(&links_path).load().unwrap();
    let texts: Vec<_> = links.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["ACME 山田", "Initech 佐藤"]);
    assert_eq!(links[0].url, report.artifacts[0].file.url);
}

#[test]
fn test_chart_workbook_contains_pivoted_answers() {
    let dir = tempfile::tempdir().unwrap();
    let drive_root = dir.path().join("drive");
    let mut responses = open_responses();
    let header = responses.header().unwrap();
    let records = responses.records(&RowSelection::Rows(vec![2])).unwrap();

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Shared)
        .with_folder("skills")
        .with_drive(LocalDrive::open(&drive_root).unwrap())
        .build()
        .unwrap();
    runner.process(&header, &records).unwrap();

    use calamine::{open_workbook_auto, Data, Reader};
    let mut workbook =
        open_workbook_auto(drive_root.join("skills").join("ACME 山田.xlsx")).unwrap();
    let range = workbook.worksheet_range("回答").unwrap();
    assert_eq!(
        range.get_value((0, 0)),
        Some(&Data::String("タイムスタンプ".to_string()))
    );
    assert_eq!(
        range.get_value((3, 0)),
        Some(&Data::String("要件定義".to_string()))
    );
    assert_eq!(range.get_value((3, 1)), Some(&Data::Float(3.0)));
    assert_eq!(
        range.get_value((7, 0)),
        Some(&Data::String("単体テスト".to_string()))
    );
}

#[test]
fn test_rerun_replaces_workbook_pdf_and_link() {
    let dir = tempfile::tempdir().unwrap();
    let drive_root = dir.path().join("drive");
    let links_path = dir.path().join("links.xlsx");
    let exporter = RecordingExporter::default();
    let mut responses = open_responses();
    let header = responses.header().unwrap();
    let records = responses
        .records(&RowSelection::parse("2-3").unwrap())
        .unwrap();

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Filed)
        .with_folder("skills")
        .with_drive(LocalDrive::open(&drive_root).unwrap())
        .with_pdf_exporter(exporter.clone())
        .with_links_path(&links_path)
        .build()
        .unwrap();

    let first = runner.process(&header, &records).unwrap();
    let second = runner.process(&header, &records).unwrap();

    assert_eq!(first.pdf_urls.len(), 2);
    assert_eq!(second.pdf_urls.len(), 2);
    assert_eq!(exporter.exported.borrow().len(), 4);
    assert_eq!(second.artifacts[0].superseded.len(), 1);

    // 名前ごとに有効なスプレッドシート・PDFは1つ
    let drive = LocalDrive::open(&drive_root).unwrap();
    assert_eq!(
        drive.search("ACME 山田", FileKind::Spreadsheet).unwrap().len(),
        1
    );
    assert_eq!(pdf_count(&drive_root), 2);

    // リンク一覧も名前ごとに1行
    let links = LinksIndex::new(&links_path).load().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links, second.links);
}

#[test]
fn test_links_index_keeps_unrelated_rows() {
    let dir = tempfile::tempdir().unwrap();
    let links_path = dir.path().join("links.xlsx");
    LinksIndex::new(&links_path)
        .save(&[skillradar::Link::new("Globex 鈴木", "https://example.com/globex")])
        .unwrap();

    let mut responses = open_responses();
    let header = responses.header().unwrap();
    let records = responses.records(&RowSelection::Rows(vec![3])).unwrap();

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Shared)
        .with_folder("skills")
        .with_drive(LocalDrive::open(dir.path().join("drive")).unwrap())
        .with_links_path(&links_path)
        .build()
        .unwrap();
    runner.process(&header, &records).unwrap();
    runner.process(&header, &records).unwrap();

    let texts: Vec<_> = LinksIndex::new(&links_path)
        .load()
        .unwrap()
        .into_iter()
        .map(|l| l.text)
        .collect();
    assert_eq!(texts, vec!["Globex 鈴木", "Initech 佐藤"]);
}

#[test]
fn test_submit_notifies_with_pdf_link() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let mut responses = open_responses();
    let header = responses.header().unwrap();
    let values = responses
        .records(&RowSelection::Rows(vec![2]))
        .unwrap()
        .remove(0);

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Notify)
        .with_folder("skills")
        .with_drive(LocalDrive::open(dir.path()).unwrap())
        .with_pdf_exporter(RecordingExporter::default())
        .with_notifier(notifier.clone())
        .build()
        .unwrap();
    let report = runner.submit(&header, &values).unwrap();

    assert!(report.notified);
    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].organization, "ACME");
    assert_eq!(sent[0].person, "山田");
    let pdf_url = sent[0].pdf_url.clone().unwrap();
    assert!(pdf_url.ends_with(".pdf"));
    assert!(sent[0].message().contains("|PDFをダウンロード>"));
}

#[test]
fn test_shared_profile_never_exports_or_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = RecordingExporter::default();
    let notifier = RecordingNotifier::default();
    let mut responses = open_responses();
    let header = responses.header().unwrap();
    let values = responses
        .records(&RowSelection::Rows(vec![2]))
        .unwrap()
        .remove(0);

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Shared)
        .with_folder("skills")
        .with_drive(LocalDrive::open(dir.path()).unwrap())
        .with_pdf_exporter(exporter.clone())
        .with_notifier(notifier.clone())
        .build()
        .unwrap();
    let report = runner.submit(&header, &values).unwrap();

    assert_eq!(report.artifacts.len(), 1);
    assert!(report.pdf_urls.is_empty());
    assert!(!report.notified);
    assert!(exporter.exported.borrow().is_empty());
    assert!(notifier.sent.borrow().is_empty());
}

#[test]
fn test_names_differing_only_in_reserved_chars_keep_separate_workbooks() {
    let dir = tempfile::tempdir().unwrap();
    let drive_root = dir.path().join("drive");
    let links_path = dir.path().join("links.xlsx");
    let header: Vec<String> = ["日時", "会社", "氏名", "設計[1]:要件定義"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let record = |organization: &str, score: &str| -> Vec<String> {
        vec![
            "t".to_string(),
            organization.to_string(),
            "山田".to_string(),
            score.to_string(),
        ]
    };

    let mut runner = RunnerBuilder::new()
        .with_profile(Profile::Shared)
        .with_folder("skills")
        .with_drive(LocalDrive::open(&drive_root).unwrap())
        .with_links_path(&links_path)
        .build()
        .unwrap();
    let first = runner.process(&header, &[record("A/B", "3")]).unwrap();
    let second = runner.process(&header, &[record("A_B", "4")]).unwrap();

    // 別名の回答者のスプレッドシートは置き換えない
    assert!(second.artifacts[0].superseded.is_empty());
    let drive = LocalDrive::open(&drive_root).unwrap();
    assert_eq!(
        drive.search("A/B 山田", FileKind::Spreadsheet).unwrap(),
        vec![first.artifacts[0].file.clone()]
    );
    assert_eq!(
        drive.search("A_B 山田", FileKind::Spreadsheet).unwrap(),
        vec![second.artifacts[0].file.clone()]
    );
    assert_ne!(first.artifacts[0].file.url, second.artifacts[0].file.url);

    let links = LinksIndex::new(&links_path).load().unwrap();
    let texts: Vec<_> = links.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["A/B 山田", "A_B 山田"]);
    assert_ne!(links[0].url, links[1].url);
}

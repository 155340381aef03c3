//! skillradar - Radar-chart workbooks from skill-assessment survey responses
//!
//! This crate reads skill-check survey responses from a workbook, groups the
//! scored items into categories declared in the header (`Category[n]:Item`),
//! and produces one chart workbook per respondent: the answers pivoted into a
//! two-column table plus one radar chart per category.
//!
//! Re-running with the same input replaces the previous workbook of the same
//! name, keeps a links index of `HYPERLINK` formulas in sync, and optionally
//! exports a PDF and posts a Slack notification.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use skillradar::{LocalDrive, Profile, ResponseWorkbook, RowSelection, RunnerBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Read the header row and every response
//!     let mut responses = ResponseWorkbook::open("responses.xlsx")?;
//!     let header = responses.header()?;
//!     let records = responses.records(&RowSelection::All)?;
//!
//!     // Store chart workbooks under ./drive/skills and share them with editors
//!     let mut runner = RunnerBuilder::new()
//!         .with_profile(Profile::Shared)
//!         .with_folder("skills")
//!         .with_editors(responses.editors()?)
//!         .with_drive(LocalDrive::open("drive")?)
//!         .with_links_path("drive/links.xlsx")
//!         .build()?;
//!
//!     let report = runner.process(&header, &records)?;
//!     for artifact in &report.artifacts {
//!         println!("{} -> {}", artifact.name, artifact.file.url);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # PDF Export and Notification
//!
//! `HttpPdfExporter`はファイルIDをエクスポートエンドポイントに渡すため、ファイルIDを
//! 参照できるドライブと組み合わせます。`LocalDrive`と組み合わせた場合は`build()`が
//! `SkillRadarError::Config`を返すので、ローカルでは独自の`PdfExporter`を使います。
//!
//! ```rust,no_run
//! use skillradar::{
//!     LocalDrive, PdfExportOptions, PdfExporter, Profile, RunnerBuilder, SlackNotifier, StoredFile,
//! };
//! use std::path::PathBuf;
//! use std::process::Command;
//!
//! /// LibreOfficeでローカルのワークブックをPDFに変換する
//! struct SofficeExporter {
//!     drive_root: PathBuf,
//! }
//!
//! impl PdfExporter for SofficeExporter {
//!     fn export(&self, file: &StoredFile, _options: &PdfExportOptions) -> skillradar::Result<Vec<u8>> {
//!         let source = self.drive_root.join(&file.id);
//!         let out_dir = std::env::temp_dir();
//!         Command::new("soffice")
//!             .args(["--headless", "--convert-to", "pdf", "--outdir"])
//!             .arg(&out_dir)
//!             .arg(&source)
//!             .status()?;
//!         let pdf = source.with_extension("pdf");
//!         Ok(std::fs::read(out_dir.join(pdf.file_name().unwrap_or_default()))?)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let drive = LocalDrive::open("drive")?;
//!     let exporter = SofficeExporter {
//!         drive_root: drive.root().to_path_buf(),
//!     };
//!     let mut runner = RunnerBuilder::new()
//!         .with_profile(Profile::Notify)
//!         .with_folder("skills")
//!         .with_drive(drive)
//!         .with_pdf_exporter(exporter)
//!         .with_notifier(SlackNotifier::new("https://hooks.slack.com/services/T000/B000/XXX"))
//!         .build()?;
//!
//!     // One submitted form row: timestamp, organization, person, answers...
//!     let header: Vec<String> = ["日時", "会社", "氏名", "設計[1]:要件定義"]
//!         .iter().map(|s| s.to_string()).collect();
//!     let values: Vec<String> = ["2024/04/01 10:00:00", "ACME", "山田", "4"]
//!         .iter().map(|s| s.to_string()).collect();
//!     runner.submit(&header, &values)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Header Parsing Only
//!
//! ```rust
//! use skillradar::parse_header;
//!
//! let header: Vec<String> = ["日時", "会社", "氏名", "X[1]:a", "X[1]:b", "Y[2]:c"]
//!     .iter().map(|s| s.to_string()).collect();
//! let parsed = parse_header(&header);
//!
//! assert_eq!(parsed.labels, vec!["日時", "会社", "氏名", "a", "b", "c"]);
//! assert_eq!(parsed.categories.get("X").map(|c| (c.offset, c.count)), Some((4, 2)));
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod header;
mod host;
mod links;
mod parser;
mod projector;
mod record;
mod security;
mod settings;
mod types;

// 公開API
pub use api::{
    HorizontalAlignment, Margins, PageScale, PaperSize, PdfExportOptions, Profile, RowSelection,
    VerticalAlignment,
};
pub use builder::{RunReport, Runner, RunnerBuilder};
pub use error::{Result, SkillRadarError};
pub use header::{parse_header, Category, CategoryMap, ParsedHeader, FIXED_COLUMNS, HEADER_WIDTH};
pub use host::{
    ChartLayout, ChartRenderer, DocumentStore, Drive, FileIndex, HttpPdfExporter, LocalDrive,
    Notification, Notifier, PdfExporter, SlackNotifier, XlsxChartRenderer, ANSWER_SHEET,
    DEFAULT_EXPORT_BASE_URL,
};
pub use links::{reconcile, Link, LinksIndex};
pub use parser::ResponseWorkbook;
pub use projector::{CreatedArtifact, Projector};
pub use record::{AnswerRow, AnswerSheet, DEFAULT_MAX_NAME_LEN};
pub use security::{sanitize_file_name, validate_folder_id};
pub use settings::{
    Settings, Variables, EDITORS_SHEET, FOLDER_ID_KEY, LINKS_SHEET, SLACK_WEBHOOK_KEY,
    VARIABLES_SHEET,
};
pub use types::{FileKind, Folder, StoredFile};

//! Builder Module
//!
//! Fluent Builder APIを提供し、`Runner`インスタンスを段階的に構築する。
//!
//! `Runner`はメニューからの一括実行（`process`）とフォーム送信時の実行（`submit`）の
//! 2つの入口を持ち、どちらも同じ流れで処理します。
//!
//! 1. ヘッダを解析する
//! 2. レコードごとにチャート付きスプレッドシートを生成する（同名の旧版はゴミ箱へ）
//! 3. PDFをエクスポートする（プロファイルによる）
//! 4. リンク一覧を更新する
//! 5. 通知する（`submit`かつプロファイルによる）

use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::api::{PdfExportOptions, Profile};
use crate::error::{Result, SkillRadarError};
use crate::header::parse_header;
use crate::host::{
    ChartRenderer, DocumentStore, Drive, FileIndex, Notification, Notifier, PdfExporter,
    XlsxChartRenderer,
};
use crate::links::{reconcile, Link, LinksIndex};
use crate::projector::{CreatedArtifact, Projector};
use crate::record::DEFAULT_MAX_NAME_LEN;
use crate::settings::Settings;
use crate::types::FileKind;

/// 実行設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct RunConfig {
    /// プロファイル
    pub profile: Profile,

    /// 保存先フォルダID
    pub folder_id: String,

    /// 編集権限を付与するメンバー
    pub editors: Vec<String>,

    /// 生成物名の最大文字数
    pub max_name_len: usize,

    /// リンク一覧ワークブックのパス（Noneの場合は更新しない）
    pub links_path: Option<PathBuf>,

    /// PDFエクスポート設定
    pub export_options: PdfExportOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            folder_id: String::new(),
            editors: Vec::new(),
            max_name_len: DEFAULT_MAX_NAME_LEN,
            links_path: None,
            export_options: PdfExportOptions::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Runner`インスタンスを段階的に構築するためのビルダーです。
/// ドライブと保存先フォルダ以外の設定にはデフォルト値があります。
///
/// # 使用例
///
/// ```rust,no_run
/// use skillradar::{LocalDrive, Profile, RunnerBuilder};
///
/// # fn main() -> Result<(), skillradar::SkillRadarError> {
/// let runner = RunnerBuilder::new()
///     .with_profile(Profile::Shared)
///     .with_folder("skills")
///     .with_editors(vec!["lead@example.com".to_string()])
///     .with_drive(LocalDrive::open("drive")?)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct RunnerBuilder {
    /// 内部設定（構築中）
    config: RunConfig,
    drive: Option<Box<dyn Drive>>,
    renderer: Option<Box<dyn ChartRenderer>>,
    pdf_exporter: Option<Box<dyn PdfExporter>>,
    notifier: Option<Box<dyn Notifier>>,
}

impl fmt::Debug for RunnerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerBuilder")
            .field("config", &self.config)
            .field("drive", &self.drive.is_some())
            .field("renderer", &self.renderer.is_some())
            .field("pdf_exporter", &self.pdf_exporter.is_some())
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

impl Default for RunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - プロファイル: `Profile::Filed`
    /// - 生成物名の最大文字数: 100
    /// - チャート描画: `XlsxChartRenderer`（印刷設定はPDFエクスポート設定に合わせる）
    /// - PDFエクスポート設定: A4縦・幅に合わせる
    /// - リンク一覧: 更新しない
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            drive: None,
            renderer: None,
            pdf_exporter: None,
            notifier: None,
        }
    }

    /// プロファイルを指定する
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.config.profile = profile;
        self
    }

    /// 保存先フォルダIDを指定する
    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.config.folder_id = folder_id.into();
        self
    }

    /// 編集権限を付与するメンバーを指定する（`Profile::Shared`で使用）
    pub fn with_editors(mut self, editors: Vec<String>) -> Self {
        self.config.editors = editors;
        self
    }

    /// 設定シートの内容を反映する
    ///
    /// フォルダIDが設定されている場合はそれを使い、編集者は置き換えます。
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        if let Some(folder_id) = &settings.folder_id {
            self.config.folder_id = folder_id.clone();
        }
        self.config.editors = settings.editors.clone();
        self
    }

    /// 生成物名の最大文字数を指定する
    ///
    /// # 制約
    ///
    /// * 0は指定できない（`build()`時に`SkillRadarError::Config`を返す）
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.config.max_name_len = max_name_len;
        self
    }

    /// 生成物の保存先を指定する
    pub fn with_drive(mut self, drive: impl Drive + 'static) -> Self {
        self.drive = Some(Box::new(drive));
        self
    }

    /// チャートの描画方式を指定する
    pub fn with_renderer(mut self, renderer: impl ChartRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// PDFのエクスポート方式を指定する
    pub fn with_pdf_exporter(mut self, exporter: impl PdfExporter + 'static) -> Self {
        self.pdf_exporter = Some(Box::new(exporter));
        self
    }

    /// 通知方式を指定する
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// リンク一覧ワークブックのパスを指定する
    pub fn with_links_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.links_path = Some(path.into());
        self
    }

    /// PDFエクスポート設定を指定する
    pub fn with_export_options(mut self, options: PdfExportOptions) -> Self {
        self.config.export_options = options;
        self
    }

    /// 設定を検証し、`Runner`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SkillRadarError::Config(String)`: 設定の検証に失敗した場合
    ///   * フォルダIDが空
    ///   * 生成物名の最大文字数が0
    ///   * ドライブが未指定
    ///   * PDFを出力するプロファイルでエクスポート方式が未指定
    ///   * PDFを出力するプロファイルで、リモートのエクスポート方式とローカルのドライブを組み合わせた
    ///   * 通知するプロファイルで通知方式が未指定
    pub fn build(self) -> Result<Runner> {
        let config = self.config;

        // 1. 設定値の検証
        if config.folder_id.trim().is_empty() {
            return Err(SkillRadarError::Config(
                "folder id must not be empty".to_string(),
            ));
        }
        if config.max_name_len == 0 {
            return Err(SkillRadarError::Config(
                "max name length must be greater than 0".to_string(),
            ));
        }

        // 2. 外部サービスの検証
        let drive = self
            .drive
            .ok_or_else(|| SkillRadarError::Config("no drive configured".to_string()))?;
        if config.profile.exports_pdf() && self.pdf_exporter.is_none() {
            return Err(SkillRadarError::Config(format!(
                "profile {:?} exports PDFs but no exporter is configured",
                config.profile
            )));
        }
        if let Some(exporter) = &self.pdf_exporter {
            if config.profile.exports_pdf() && exporter.requires_hosted_file() && drive.is_local() {
                return Err(SkillRadarError::Config(format!(
                    "profile {:?} exports PDFs through a remote endpoint, which cannot read files on a local drive",
                    config.profile
                )));
            }
        }
        if config.profile.notifies() && self.notifier.is_none() {
            return Err(SkillRadarError::Config(format!(
                "profile {:?} sends notifications but no notifier is configured",
                config.profile
            )));
        }
        if config.profile.shares_with_editors() && config.editors.is_empty() {
            warn!("profile Shared has no editors; artifacts will not be shared with anyone");
        }

        // 3. Runnerインスタンス生成
        let renderer = self.renderer.unwrap_or_else(|| -> Box<dyn ChartRenderer> {
            Box::new(XlsxChartRenderer::new().with_print_options(config.export_options.clone()))
        });
        Ok(Runner {
            config,
            drive,
            renderer,
            pdf_exporter: self.pdf_exporter,
            notifier: self.notifier,
        })
    }
}

/// 1回の実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 生成したスプレッドシート（入力順）
    pub artifacts: Vec<CreatedArtifact>,

    /// エクスポートしたPDFのURL（生成順）
    pub pdf_urls: Vec<String>,

    /// 更新後のリンク一覧
    pub links: Vec<Link>,

    /// 通知を送信したか
    pub notified: bool,
}

/// 処理のファサード
///
/// `RunnerBuilder`で構築された設定に基づいて、回答レコードから生成物を作成します。
/// 処理は逐次的に行い、最初に失敗した操作のエラーで中断します（ロールバックなし）。
///
/// # 使用例
///
/// ```rust,no_run
/// use skillradar::{LocalDrive, Profile, ResponseWorkbook, RowSelection, RunnerBuilder};
///
/// # fn main() -> Result<(), skillradar::SkillRadarError> {
/// let mut responses = ResponseWorkbook::open("responses.xlsx")?;
/// let header = responses.header()?;
/// let records = responses.records(&RowSelection::parse("2-5").map_err(skillradar::SkillRadarError::Config)?)?;
///
/// let mut runner = RunnerBuilder::new()
///     .with_profile(Profile::Shared)
///     .with_folder("skills")
///     .with_drive(LocalDrive::open("drive")?)
///     .with_links_path("drive/links.xlsx")
///     .build()?;
/// let report = runner.process(&header, &records)?;
/// println!("{} chart sheets", report.artifacts.len());
/// # Ok(())
/// # }
/// ```
pub struct Runner {
    /// 実行設定
    config: RunConfig,
    drive: Box<dyn Drive>,
    renderer: Box<dyn ChartRenderer>,
    pdf_exporter: Option<Box<dyn PdfExporter>>,
    notifier: Option<Box<dyn Notifier>>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// プロファイル
    pub fn profile(&self) -> Profile {
        self.config.profile
    }

    /// 選択されたレコードをまとめて処理する（メニューからの実行）
    ///
    /// # 引数
    ///
    /// * `header` - 回答シートの1行目
    /// * `records` - 処理するレコード（入力順に処理）
    ///
    /// # 戻り値
    ///
    /// 何も生成しなかった場合は空の`RunReport`を返し、リンク一覧も更新しません。
    pub fn process(&mut self, header: &[String], records: &[Vec<String>]) -> Result<RunReport> {
        // 1. ヘッダ解析
        let parsed = parse_header(header);
        debug!(
            labels = parsed.labels.len(),
            categories = parsed.categories.len(),
            "header parsed"
        );

        // 2. スプレッドシート生成
        let mut artifacts = Vec::new();
        {
            let mut projector = Projector::new(self.drive.as_mut(), self.renderer.as_ref())
                .with_max_name_len(self.config.max_name_len);
            if self.config.profile.shares_with_editors() {
                projector = projector.with_editors(&self.config.editors);
            }
            for (index, record) in records.iter().enumerate() {
                debug!(index, cells = record.len(), "record");
                match projector.create(&self.config.folder_id, &parsed, record)? {
                    Some(artifact) => artifacts.push(artifact),
                    None => warn!(index, "skipped record without answers"),
                }
            }
        }

        if artifacts.is_empty() {
            info!("no chart sheets created");
            return Ok(RunReport::default());
        }

        // 3. PDFエクスポート
        let pdf_urls = if self.config.profile.exports_pdf() {
            self.export_pdfs(&artifacts)?
        } else {
            Vec::new()
        };

        // 4. リンク一覧の更新
        let links = match &self.config.links_path {
            Some(path) => {
                let index = LinksIndex::new(path);
                let links = reconcile(index.load()?, &artifacts);
                index.save(&links)?;
                info!(path = %path.display(), rows = links.len(), "links index updated");
                links
            }
            None => Vec::new(),
        };

        Ok(RunReport {
            artifacts,
            pdf_urls,
            links,
            notified: false,
        })
    }

    /// フォームから送信された1件を処理する（送信時の実行）
    ///
    /// 生成後、通知するプロファイルであれば会社名（2列目）・氏名（3列目）と
    /// 最初のPDFのURLを通知します。
    pub fn submit(&mut self, header: &[String], values: &[String]) -> Result<RunReport> {
        let mut report = self.process(header, &[values.to_vec()])?;

        if !self.config.profile.notifies() || report.artifacts.is_empty() {
            return Ok(report);
        }
        let notifier = self.notifier.as_deref().ok_or_else(|| {
            SkillRadarError::Config("no notifier configured".to_string())
        })?;

        let notification = Notification {
            organization: values.get(1).cloned().unwrap_or_default(),
            person: values.get(2).cloned().unwrap_or_default(),
            pdf_url: report.pdf_urls.first().cloned(),
        };
        notifier.notify(&notification)?;
        info!(
            organization = %notification.organization,
            person = %notification.person,
            "notification sent"
        );
        report.notified = true;
        Ok(report)
    }

    /// 生成物ごとに同名の旧PDFをゴミ箱に移動し、新しいPDFを保存する
    fn export_pdfs(&mut self, artifacts: &[CreatedArtifact]) -> Result<Vec<String>> {
        let exporter = self.pdf_exporter.as_deref().ok_or_else(|| {
            SkillRadarError::Config("no PDF exporter configured".to_string())
        })?;

        let mut urls = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let pdf_name = format!("{}.pdf", artifact.name);
            for old in self.drive.search(&pdf_name, FileKind::Pdf)? {
                self.drive.trash(&old)?;
            }

            let bytes = exporter.export(&artifact.file, &self.config.export_options)?;
            let folder = self.drive.ensure_folder(&self.config.folder_id)?;
            let pdf = self.drive.save(&folder, &pdf_name, FileKind::Pdf, &bytes)?;
            info!(name = %pdf_name, bytes = bytes.len(), "exported pdf");
            urls.push(pdf.url);
        }
        Ok(urls)
    }
}

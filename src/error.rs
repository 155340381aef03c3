//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// skillradarクレート全体で使用するエラー型
///
/// 回答ワークブックの読み込み、チャートワークブックの生成、PDFエクスポート、
/// 通知送信の途中で発生するすべてのエラーを統一的に扱うために使用されます。
/// どのエラーも実行全体を中断させます（部分的な復旧やリトライは行いません）。
///
/// # 使用例
///
/// ```rust,no_run
/// use skillradar::{ResponseWorkbook, SkillRadarError};
///
/// fn read_header(path: &str) -> Result<Vec<String>, SkillRadarError> {
///     let mut workbook = ResponseWorkbook::open(path)?;
///     workbook.header()
/// }
/// ```
#[derive(Error, Debug)]
pub enum SkillRadarError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 回答ワークブックの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// チャートワークブック・リンク一覧の書き込み中に発生したエラー
    #[error("Failed to write Excel file: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// HTTP通信（PDFエクスポート、Webhook）の失敗
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// HTTPステータスが成功以外だった場合
    #[error("HTTP {status} from {url}")]
    Http {
        /// レスポンスのステータスコード
        status: u16,
        /// リクエスト先URL
        url: String,
    },

    /// URLの組み立てに失敗したエラー
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSONのシリアライズ・デシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `RunnerBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use skillradar::{RunnerBuilder, SkillRadarError};
    ///
    /// match RunnerBuilder::new().build() {
    ///     Err(SkillRadarError::Config(msg)) => println!("設定エラー: {}", msg),
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 必要なシートが見つからない
    #[error("Sheet not found: '{0}'")]
    MissingSheet(String),

    /// 変数シートに必要なキーの行がない
    #[error("Variable '{key}' not found in sheet '{sheet}'")]
    MissingVariable {
        /// 変数シート名
        sheet: String,
        /// 見つからなかったキー
        key: String,
    },

    /// 会社名・氏名の列まで回答が埋まっていないレコード
    #[error("Record has {found} answered cells; organization and person are required")]
    IncompleteRecord {
        /// 空セルで打ち切られるまでのセル数
        found: usize,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限超過や、フォルダ IDにパストラバーサルが
    /// 含まれる場合などに発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

/// クレート共通のResult型
pub type Result<T> = std::result::Result<T, SkillRadarError>;

//! Host Module
//!
//! 生成物の保存・検索・チャート描画・PDFエクスポート・通知といった外部プラットフォーム
//! 依存の操作を、トレイトとして抽象化するモジュール。
//! ヘッダ解析やレコード展開などの純粋な処理は、これらの具体実装に依存しません。

mod chart;
mod export;
mod local;
mod slack;
#[cfg(test)]
mod testing;

use crate::api::PdfExportOptions;
use crate::error::Result;
use crate::header::CategoryMap;
use crate::record::AnswerSheet;
use crate::types::{FileKind, Folder, StoredFile};

pub use chart::{ChartLayout, XlsxChartRenderer, ANSWER_SHEET};
pub use export::{HttpPdfExporter, DEFAULT_EXPORT_BASE_URL};
pub use local::LocalDrive;
pub use slack::{Notification, SlackNotifier};

/// 名前によるファイル検索とゴミ箱への移動
pub trait FileIndex {
    /// ゴミ箱にない、名前と種別が完全一致するファイルを検索する
    fn search(&self, name: &str, kind: FileKind) -> Result<Vec<StoredFile>>;

    /// ファイルをゴミ箱に移動する
    fn trash(&mut self, file: &StoredFile) -> Result<()>;
}

/// 生成物の保存と共有
pub trait DocumentStore {
    /// フォルダを取得する（存在しなければ作成する）
    fn ensure_folder(&mut self, id: &str) -> Result<Folder>;

    /// フォルダにファイルを保存する
    fn save(
        &mut self,
        folder: &Folder,
        name: &str,
        kind: FileKind,
        bytes: &[u8],
    ) -> Result<StoredFile>;

    /// ファイルの編集権限を付与する
    fn share(&mut self, file: &StoredFile, editors: &[String]) -> Result<()>;

    /// ファイルIDがローカルのパスで、外部サービスからは参照できない場合は`true`
    fn is_local(&self) -> bool {
        false
    }
}

/// 検索・保存の両方ができるストア
pub trait Drive: FileIndex + DocumentStore {}

impl<T: FileIndex + DocumentStore> Drive for T {}

/// 回答表とレーダーチャートを1つのワークブックに描画する
pub trait ChartRenderer {
    /// ワークブックのバイト列を生成する
    fn render(&self, sheet: &AnswerSheet, categories: &CategoryMap) -> Result<Vec<u8>>;
}

/// 保存済みのワークブックをPDFとしてエクスポートする
pub trait PdfExporter {
    /// PDFのバイト列を取得する
    fn export(&self, file: &StoredFile, options: &PdfExportOptions) -> Result<Vec<u8>>;

    /// ファイルIDを外部サービスに渡してエクスポートする場合は`true`
    ///
    /// ローカルのドライブとは組み合わせられません。
    fn requires_hosted_file(&self) -> bool {
        false
    }
}

/// 回答者の入力完了を通知する
pub trait Notifier {
    /// 通知を送信する
    fn notify(&self, notification: &Notification) -> Result<()>;
}

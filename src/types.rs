//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// 生成物（アーティファクト）のファイル種別
///
/// ローカルドライブの表示名の対応表にシリアライズされます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    /// レーダーチャート入りのワークブック
    Spreadsheet,

    /// ワークブックからエクスポートしたPDF
    Pdf,
}

impl FileKind {
    /// ファイル拡張子（ドットなし）
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Spreadsheet => "xlsx",
            FileKind::Pdf => "pdf",
        }
    }
}

/// 生成物を格納するフォルダ
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Folder {
    /// フォルダ ID（ストア内で一意）
    pub id: String,
}

impl Folder {
    /// 新しいフォルダ参照を生成
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// ストアに保存済みのファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// ストア内のファイル ID
    pub id: String,

    /// 表示名（拡張子を含まない。PDFの場合は`.pdf`を含む）
    pub name: String,

    /// ファイル種別
    pub kind: FileKind,

    /// ファイルを開くためのURL
    pub url: String,
}

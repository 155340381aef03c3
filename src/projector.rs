//! Projector Module
//!
//! 1件の回答レコードから、回答表とレーダーチャートを持つスプレッドシートを1つ生成する。
//!
//! 同じ名前のスプレッドシートがすでに存在する場合は、すべてゴミ箱に移動してから
//! 新しく作成します。これにより、同じ入力で何度実行しても有効な生成物は名前ごとに1つです。

use tracing::{debug, info};

use crate::error::Result;
use crate::header::ParsedHeader;
use crate::host::{ChartRenderer, DocumentStore, Drive, FileIndex};
use crate::links::Link;
use crate::record::{AnswerSheet, DEFAULT_MAX_NAME_LEN};
use crate::types::{FileKind, Folder, StoredFile};

/// 生成したスプレッドシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedArtifact {
    /// 生成物の名前（`"会社名 氏名"`）
    pub name: String,
    /// 保存したファイル
    pub file: StoredFile,
    /// 置き換えた（ゴミ箱に移動した）同名のスプレッドシート
    pub superseded: Vec<Link>,
}

impl CreatedArtifact {
    /// リンク一覧に追加する行
    pub fn link(&self) -> Link {
        Link::new(self.name.clone(), self.file.url.clone())
    }
}

/// レコードをチャート付きスプレッドシートに変換する
pub struct Projector<'a> {
    drive: &'a mut dyn Drive,
    renderer: &'a dyn ChartRenderer,
    editors: Option<&'a [String]>,
    max_name_len: usize,
}

impl<'a> Projector<'a> {
    /// ドライブと描画方式を指定して生成
    pub fn new(drive: &'a mut dyn Drive, renderer: &'a dyn ChartRenderer) -> Self {
        Self {
            drive,
            renderer,
            editors: None,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }

    /// 生成したスプレッドシートを`editors`と共有する
    pub fn with_editors(mut self, editors: &'a [String]) -> Self {
        self.editors = Some(editors);
        self
    }

    /// 生成物名の最大文字数を指定する
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// レコード1件分のスプレッドシートを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(CreatedArtifact))` - 生成したスプレッドシート
    /// * `Ok(None)` - タイムスタンプのみのレコードで、何も生成しなかった場合
    ///
    /// # 発生し得るエラー
    ///
    /// * `SkillRadarError::IncompleteRecord` - 会社名・氏名が揃っていない場合
    /// * ドライブ・描画のエラーはそのまま返します
    pub fn create(
        &mut self,
        folder_id: &str,
        header: &ParsedHeader,
        record: &[String],
    ) -> Result<Option<CreatedArtifact>> {
        let Some(sheet) = AnswerSheet::pivot(header, record) else {
            debug!("record has no answers");
            return Ok(None);
        };
        let name = sheet.artifact_name(self.max_name_len)?;

        let superseded = self.supersede(&name)?;

        let bytes = self.renderer.render(&sheet, &header.categories)?;
        let folder: Folder = self.drive.ensure_folder(folder_id)?;
        let file = self.drive.save(&folder, &name, FileKind::Spreadsheet, &bytes)?;

        if let Some(editors) = self.editors {
            self.drive.share(&file, editors)?;
            debug!(name = %name, editors = editors.len(), "shared");
        }

        info!(
            name = %name,
            rows = sheet.len(),
            charts = header.categories.len(),
            replaced = superseded.len(),
            "created chart sheet"
        );
        Ok(Some(CreatedArtifact {
            name,
            file,
            superseded,
        }))
    }

    /// 同名のスプレッドシートをすべてゴミ箱に移動し、そのリンクを返す
    fn supersede(&mut self, name: &str) -> Result<Vec<Link>> {
        let existing = self.drive.search(name, FileKind::Spreadsheet)?;
        let mut superseded = Vec::with_capacity(existing.len());
        for file in existing {
            self.drive.trash(&file)?;
            superseded.push(Link::new(file.name.clone(), file.url.clone()));
        }
        Ok(superseded)
    }
}

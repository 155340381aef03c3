//! Settings Module
//!
//! 回答ワークブックの「変数」シート・「編集者」シートから読み取る設定値。
//! 読み取った値は`Settings`としてまとめ、実行時に明示的に渡します。

use crate::error::{Result, SkillRadarError};

/// 変数シート名
pub const VARIABLES_SHEET: &str = "変数";

/// 編集者シート名
pub const EDITORS_SHEET: &str = "編集者";

/// リンク一覧シート名
pub const LINKS_SHEET: &str = "リンク";

/// 変数シートのキー: 生成物を保存するフォルダ ID
pub const FOLDER_ID_KEY: &str = "フォルダ ID";

/// 変数シートのキー: SlackのWebhook URL
pub const SLACK_WEBHOOK_KEY: &str = "Slack ウェブフック";

/// 変数シートのキーと値の組
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<(String, String)>,
}

impl Variables {
    /// キーと値の組から生成
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// キーに一致する最初の行の値
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// キーに一致する行の値（なければ`MissingVariable`）
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| SkillRadarError::MissingVariable {
            sheet: VARIABLES_SHEET.to_string(),
            key: key.to_string(),
        })
    }
}

/// 実行時の設定値
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// 生成物を保存するフォルダ ID
    pub folder_id: Option<String>,

    /// 通知先のWebhook URL
    pub slack_webhook: Option<String>,

    /// 編集権限を付与するメールアドレス
    pub editors: Vec<String>,
}

impl Settings {
    /// 変数シートの値と編集者一覧から生成
    pub fn from_sheets(variables: &Variables, editors: Vec<String>) -> Self {
        let non_empty = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            folder_id: variables.get(FOLDER_ID_KEY).and_then(non_empty),
            slack_webhook: variables.get(SLACK_WEBHOOK_KEY).and_then(non_empty),
            editors,
        }
    }
}

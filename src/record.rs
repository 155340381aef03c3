//! Record Module
//!
//! 1人分の回答レコードを、チャート用の縦2列の表（ラベル・値）に並べ替える。
//! レーダーチャートはデータが縦に並んでいないと正しく描けないため、
//! ヘッダと同じ並びの横1行を縦方向に展開します。

use crate::error::{Result, SkillRadarError};
use crate::header::ParsedHeader;

/// 生成物名の最大文字数
pub const DEFAULT_MAX_NAME_LEN: usize = 100;

/// チャート表の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    /// 整形済みヘッダのラベル
    pub label: String,

    /// 回答値（入力そのまま）
    pub value: String,
}

impl AnswerRow {
    /// 数値として解釈できる場合はその値
    ///
    /// チャートの系列には数値が必要なため、書き込み時に使用します。
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// 縦2列に展開した回答表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    rows: Vec<AnswerRow>,
}

impl AnswerSheet {
    /// レコードを展開する
    ///
    /// # 戻り値
    ///
    /// * `Some(AnswerSheet)` - 展開した表（最初の空セルの手前まで）
    /// * `None` - レコードが1セル（タイムスタンプのみ）で回答がない場合
    pub fn pivot(header: &ParsedHeader, record: &[String]) -> Option<Self> {
        if record.len() == 1 {
            return None;
        }

        let rows = record
            .iter()
            .take_while(|value| !value.is_empty())
            .enumerate()
            .map(|(index, value)| AnswerRow {
                label: header.label(index).to_string(),
                value: value.clone(),
            })
            .collect();

        Some(Self { rows })
    }

    /// 展開済みの行
    pub fn rows(&self) -> &[AnswerRow] {
        &self.rows
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 行が1つもないか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 会社名（2行目の値）
    pub fn organization(&self) -> Option<&str> {
        self.rows.get(1).map(|row| row.value.as_str())
    }

    /// 氏名（3行目の値）
    pub fn person(&self) -> Option<&str> {
        self.rows.get(2).map(|row| row.value.as_str())
    }

    /// 生成物の名前（`"会社名 氏名"`）を`max_len`文字までに切り詰めて返す
    ///
    /// # 戻り値
    ///
    /// * `Err(SkillRadarError::IncompleteRecord)` - 会社名・氏名まで回答がない場合
    pub fn artifact_name(&self, max_len: usize) -> Result<String> {
        match (self.organization(), self.person()) {
            (Some(organization), Some(person)) => Ok(truncate_chars(
                &format!("{} {}", organization, person),
                max_len,
            )),
            _ => Err(SkillRadarError::IncompleteRecord {
                found: self.rows.len(),
            }),
        }
    }
}

/// 先頭から`max_len`文字（`char`単位）を取り出す
fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}

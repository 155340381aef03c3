//! Response Workbook Module
//!
//! calamineを使用して、フォームの回答ワークブックからヘッダ・回答レコード・
//! 設定シートを読み取ります。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

use crate::api::RowSelection;
use crate::error::{Result, SkillRadarError};
use crate::formatter::cell_text;
use crate::header::HEADER_WIDTH;
use crate::security::SecurityConfig;
use crate::settings::{Settings, Variables, EDITORS_SHEET, VARIABLES_SHEET};

/// 回答ワークブック
///
/// 1枚目のシートが回答シートで、1行目がヘッダ、2行目以降が回答です。
pub struct ResponseWorkbook {
    /// calamineのワークブック（XLSX/XLS/ODSを自動判別）
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for ResponseWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWorkbook")
            .field("sheets", &self.workbook.sheet_names())
            .finish()
    }
}

impl ResponseWorkbook {
    /// ファイルパスからワークブックを開く
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// リーダーからワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(ResponseWorkbook)` - 読み込みに成功した場合
    /// * `Err(SkillRadarError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(SkillRadarError::Parse)` - ワークブックとして解析できない場合
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let security_config = SecurityConfig::default();

        // セキュリティ: 上限+1バイトまでしか読まない
        let mut buffer = Vec::new();
        let bytes_read = reader
            .by_ref()
            .take(security_config.max_input_file_size + 1)
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > security_config.max_input_file_size {
            return Err(SkillRadarError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes",
                security_config.max_input_file_size
            )));
        }

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 回答シート（1枚目）のヘッダ行を`HEADER_WIDTH`列分読み取る
    pub fn header(&mut self) -> Result<Vec<String>> {
        let range = self.responses_range()?;
        Ok(read_row(&range, 0, HEADER_WIDTH as u32))
    }

    /// 選択された行の回答を読み取る
    ///
    /// 末尾の空セルは取り除きます（タイムスタンプだけの行は1セルになる）。
    /// 使用範囲外の行と空行は読み飛ばします。
    pub fn records(&mut self, selection: &RowSelection) -> Result<Vec<Vec<String>>> {
        let range = self.responses_range()?;
        let Some((last_row, last_col)) = range.end() else {
            return Ok(Vec::new());
        };
        let width = last_col + 1;
        // シート行番号（1始まり）→ 0始まりの行インデックス
        let rows: Vec<u32> = match selection {
            RowSelection::All => (1..=last_row).collect(),
            RowSelection::Range { start, end } => {
                // 使用範囲の最終行（シート行番号）より先は読まない
                let end = (*end).min(last_row + 1);
                (*start..=end).map(|r| r.saturating_sub(1)).collect()
            }
            RowSelection::Rows(rows) => rows.iter().map(|r| r.saturating_sub(1)).collect(),
        };

        let mut records = Vec::new();
        for row in rows {
            if row == 0 || row > last_row {
                debug!(row = row + 1, "row outside the response range, skipped");
                continue;
            }
            let mut record = read_row(&range, row, width);
            while record.last().is_some_and(|cell| cell.is_empty()) {
                record.pop();
            }
            if record.is_empty() {
                debug!(row = row + 1, "blank row, skipped");
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// 変数シートのキーと値を読み取る
    pub fn variables(&mut self) -> Result<Variables> {
        let range = self.sheet_range(VARIABLES_SHEET)?;
        let entries = range
            .rows()
            .filter_map(|row| {
                let key = row.first().map(cell_text)?;
                let value = row.get(1).map(cell_text).unwrap_or_default();
                Some((key, value))
            })
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Ok(Variables::new(entries))
    }

    /// 編集者シートA列のメールアドレスを読み取る
    pub fn editors(&mut self) -> Result<Vec<String>> {
        let range = self.sheet_range(EDITORS_SHEET)?;
        Ok(range
            .rows()
            .filter_map(|row| row.first().map(cell_text))
            .map(|address| address.trim().to_string())
            .filter(|address| address.contains('@'))
            .collect())
    }

    /// 変数シートと（あれば）編集者シートから設定値を組み立てる
    pub fn settings(&mut self) -> Result<Settings> {
        let variables = self.variables()?;
        let editors = if self.has_sheet(EDITORS_SHEET) {
            self.editors()?
        } else {
            Vec::new()
        };
        Ok(Settings::from_sheets(&variables, editors))
    }

    /// シートが存在するか
    pub fn has_sheet(&self, name: &str) -> bool {
        self.workbook.sheet_names().iter().any(|n| n == name)
    }

    fn responses_range(&mut self) -> Result<Range<Data>> {
        let first = self
            .workbook
            .sheet_names()
            .into_iter()
            .next()
            .ok_or_else(|| SkillRadarError::MissingSheet("(responses)".to_string()))?;
        Ok(self.workbook.worksheet_range(&first)?)
    }

    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>> {
        if !self.has_sheet(name) {
            return Err(SkillRadarError::MissingSheet(name.to_string()));
        }
        Ok(self.workbook.worksheet_range(name)?)
    }
}

/// 0始まりの行`row`を、A列から`width`列分の文字列として読み取る
///
/// calamineの範囲はA1から始まるとは限らないため、絶対座標で取得します。
fn read_row(range: &Range<Data>, row: u32, width: u32) -> Vec<String> {
    (0..width)
        .map(|col| range.get_value((row, col)).map(cell_text).unwrap_or_default())
        .collect()
}

//! Links Index Module
//!
//! 生成したスプレッドシートへのリンク一覧（`HYPERLINK`数式の列）を管理するモジュール。
//!
//! 実行のたびに既存の行を読み込み、今回置き換えたスプレッドシートと同じ表示名の行を
//! 取り除いてから新しいリンクを追加し、シート全体を書き直します。
//! 表示名の一致だけで判定する後勝ちのマージです。
//!
//! ```text
//! A列: =HYPERLINK("url","表示名")  （数式の文字列が255文字を超える場合はセルのハイパーリンク）
//! B列: url                          （非表示）
//! ```

use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::{Color, Format, FormatUnderline, Formula, Url, Workbook};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::projector::CreatedArtifact;
use crate::settings::LINKS_SHEET;

const HYPERLINK: &str = "HYPERLINK(";

/// 数式中の文字列リテラルの最大文字数
const FORMULA_STRING_LIMIT: usize = 255;

/// セルのハイパーリンクにできるURLの接頭辞
const LINKABLE_SCHEMES: [&str; 6] = ["http://", "https://", "ftp://", "ftps://", "mailto:", "file://"];

/// 表示名とURLの組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// 表示名（生成物の名前）
    pub text: String,
    /// リンク先URL
    pub url: String,
}

impl Link {
    /// 新しいリンクを生成
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// `HYPERLINK("url","text")`形式の数式（先頭の`=`なし）
    ///
    /// 文字列中の`"`は`""`にエスケープします。
    pub fn to_formula(&self) -> String {
        format!(
            "HYPERLINK(\"{}\",\"{}\")",
            self.url.replace('"', "\"\""),
            self.text.replace('"', "\"\"")
        )
    }

    /// `HYPERLINK`数式からリンクを取り出す
    ///
    /// 先頭の`=`はあってもなくてもよい。形式が違う場合は`None`。
    pub fn parse_formula(formula: &str) -> Option<Self> {
        let formula = formula.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula).trim_start();
        let name = formula.get(..HYPERLINK.len())?;
        if !name.eq_ignore_ascii_case(HYPERLINK) {
            return None;
        }
        let rest = &formula[HYPERLINK.len()..];

        let (url, rest) = parse_quoted(rest.trim_start())?;
        let rest = rest.trim_start().strip_prefix(',')?;
        let (text, rest) = parse_quoted(rest.trim_start())?;
        if rest.trim() != ")" {
            return None;
        }
        Some(Self { text, url })
    }

    /// `to_formula`の文字列リテラルがExcelの上限に収まるか
    pub fn fits_formula(&self) -> bool {
        [&self.url, &self.text]
            .iter()
            .all(|s| s.replace('"', "\"\"").chars().count() <= FORMULA_STRING_LIMIT)
    }

    /// 空行（表示名が空、またはURLが空・`null`）か
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() || self.url.is_empty() || self.url == "null"
    }
}

/// `"..."`形式の文字列を読み取り、残りを返す（`""`は`"`として扱う）
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let mut chars = s.strip_prefix('"')?.char_indices().peekable();
    let body = &s[1..];
    let mut value = String::new();
    while let Some((index, c)) = chars.next() {
        if c != '"' {
            value.push(c);
            continue;
        }
        if let Some((_, '"')) = chars.peek() {
            chars.next();
            value.push('"');
            continue;
        }
        return Some((value, &body[index + 1..]));
    }
    None
}

/// 既存のリンク一覧に今回の生成結果を反映する
///
/// 1. 空行を取り除く
/// 2. 生成物ごとに、置き換えたスプレッドシートと同じ表示名の行を取り除く
/// 3. 新しいリンクを末尾に追加する
pub fn reconcile(existing: Vec<Link>, created: &[CreatedArtifact]) -> Vec<Link> {
    let mut rows: Vec<Link> = existing.into_iter().filter(|link| !link.is_blank()).collect();

    for artifact in created {
        if !artifact.superseded.is_empty() {
            rows.retain(|row| !artifact.superseded.iter().any(|old| old.text == row.text));
        }
        rows.push(artifact.link());
    }

    rows
}

/// リンク一覧ワークブック
#[derive(Debug, Clone)]
pub struct LinksIndex {
    path: PathBuf,
}

impl LinksIndex {
    /// 保存先パスを指定して生成
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 保存先パス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// リンク一覧を読み込む
    ///
    /// A列の`HYPERLINK`数式を優先し、数式でない行はA列の値とB列のURLから読み取ります。
    /// ファイルやシートがない場合は空の一覧を返します。
    pub fn load(&self) -> Result<Vec<Link>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "links index not found");
            return Ok(Vec::new());
        }

        let mut workbook = open_workbook_auto(&self.path)?;
        if !workbook.sheet_names().iter().any(|name| name == LINKS_SHEET) {
            return Ok(Vec::new());
        }
        let values = workbook.worksheet_range(LINKS_SHEET)?;
        let formulas = workbook.worksheet_formula(LINKS_SHEET)?;
        let Some(last_row) = [values.end(), formulas.end()]
            .into_iter()
            .flatten()
            .map(|(row, _)| row)
            .max()
        else {
            return Ok(Vec::new());
        };

        Ok((0..=last_row)
            .filter_map(|row| {
                formulas
                    .get_value((row, 0))
                    .and_then(|formula| Link::parse_formula(formula))
                    .or_else(|| {
                        let text = values.get_value((row, 0))?.to_string();
                        let url = values.get_value((row, 1))?.to_string();
                        Some(Link::new(text, url))
                    })
            })
            .collect())
    }

    /// リンク一覧でシート全体を書き直す
    pub fn save(&self, links: &[Link]) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(LINKS_SHEET)?;
        worksheet.set_column_width(0, 48.0)?;
        worksheet.set_column_hidden(1)?;

        let link_format = Format::new()
            .set_font_color(Color::RGB(0x1155CC))
            .set_underline(FormatUnderline::Single);
        for (row, link) in links.iter().enumerate() {
            let row = row as u32;
            if link.fits_formula() {
                let formula = Formula::new(link.to_formula()).set_result(link.text.as_str());
                worksheet.write_formula_with_format(row, 0, formula, &link_format)?;
            } else if LINKABLE_SCHEMES.iter().any(|scheme| link.url.starts_with(scheme)) {
                let url = Url::new(link.url.as_str()).set_text(link.text.as_str());
                worksheet.write_url_with_format(row, 0, url, &link_format)?;
            } else {
                worksheet.write_string_with_format(row, 0, link.text.as_str(), &link_format)?;
            }
            worksheet.write_string(row, 1, link.url.as_str())?;
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        workbook.save(&self.path)?;
        debug!(path = %self.path.display(), rows = links.len(), "links index saved");
        Ok(())
    }
}

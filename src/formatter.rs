//! Formatter Module
//!
//! calamineのセル値を、回答レコード・ヘッダとして扱う文字列に変換するモジュール。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// タイムスタンプの出力形式（フォームの回答シートと同じ並び）
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// セル値を文字列に変換する
///
/// * 文字列: そのまま
/// * 整数・整数値の小数: 小数点なし（`3.0` → `"3"`）
/// * 論理値: `TRUE` / `FALSE`
/// * 日時: `%Y/%m/%d %H:%M:%S`（1900年システム）
/// * 空セル: 空文字列
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_datetime(serial)
                .map(|datetime| datetime.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_else(|| format_number(serial))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
        Data::Empty => String::new(),
    }
}

/// 数値を文字列化する（整数値は小数点なし）
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Excelのシリアル値を日時に変換する（1900年システム）
///
/// エポック1899-12-30起算。Excelの1900年うるう年バグのため、1900年3月より前の
/// 日付は1日ずれますが、回答のタイムスタンプでは問題になりません。
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor() as i64;
    let seconds = ((serial - serial.floor()) * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

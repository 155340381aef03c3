//! Parser Module
//!
//! calamineを使用した回答ワークブックの読み取り。
//! セルはすべて表示用のテキストに変換してから返します。

mod workbook;

pub use workbook::ResponseWorkbook;

//! Header Module
//!
//! 回答シートのヘッダ行を解析し、スキルカテゴリごとのまとまりに分類するモジュール。
//!
//! ヘッダの先頭3列（タイムスタンプ・会社名・氏名）はそのまま残し、4列目以降の
//! `カテゴリ[番号]:サブカテゴリ`形式のセルからサブカテゴリ名を取り出します。
//! 空セルまたは形式に合わないセルが現れた時点で、それ以降のセルはすべて
//! 解析対象外になります（読み飛ばしではなく打ち切り）。

/// ヘッダ先頭の固定列の数（タイムスタンプ・会社名・氏名）
pub const FIXED_COLUMNS: usize = 3;

/// 回答シートから読み取るヘッダの列数
pub const HEADER_WIDTH: usize = 256;

/// スキルカテゴリの位置情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// サブカテゴリが始まる行番号（1始まり）
    pub offset: u32,

    /// サブカテゴリの数
    pub count: u32,
}

/// カテゴリ名から位置情報への対応表（出現順を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<(String, Category)>,
}

impl CategoryMap {
    /// 空の対応表を生成
    pub fn new() -> Self {
        Self::default()
    }

    /// カテゴリ名で検索
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, category)| category)
    }

    /// カテゴリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// カテゴリが1つもないか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 出現順に走査
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.entries
            .iter()
            .map(|(name, category)| (name.as_str(), category))
    }

    /// 1項目を記録する
    ///
    /// 最初の出現で`offset`が確定し、以降の出現では`count`だけが増えます。
    fn record(&mut self, name: &str, row: u32) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, category)) => category.count += 1,
            None => self.entries.push((
                name.to_string(),
                Category {
                    offset: row,
                    count: 1,
                },
            )),
        }
    }
}

/// 解析済みのヘッダ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeader {
    /// 整形後のヘッダ（固定列はそのまま、以降はサブカテゴリ名）
    pub labels: Vec<String>,

    /// スキルカテゴリ一覧
    pub categories: CategoryMap,
}

impl ParsedHeader {
    /// 指定位置のラベル（解析範囲外なら空文字列）
    pub fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or("")
    }
}

/// ヘッダ行を解析する
///
/// # 引数
///
/// * `header` - 回答シートの1行目（末尾に空セルを含んでよい）
///
/// # 戻り値
///
/// 整形後のヘッダとカテゴリ一覧
///
/// # 使用例
///
/// ```rust
/// use skillradar::parse_header;
///
/// let header: Vec<String> = ["日時", "会社", "氏名", "設計[1]:要件定義", "設計[1]:基本設計", ""]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let parsed = parse_header(&header);
/// assert_eq!(parsed.labels, vec!["日時", "会社", "氏名", "要件定義", "基本設計"]);
/// assert_eq!(parsed.categories.get("設計").map(|c| (c.offset, c.count)), Some((4, 2)));
/// ```
pub fn parse_header(header: &[String]) -> ParsedHeader {
    let mut parsed = ParsedHeader::default();

    for (index, cell) in header.iter().enumerate() {
        if index < FIXED_COLUMNS {
            parsed.labels.push(cell.clone());
            continue;
        }
        if cell.is_empty() {
            break;
        }
        let Some((category, sub_category)) = split_item(cell) else {
            break;
        };
        parsed.labels.push(sub_category);
        parsed.categories.record(&category, index as u32 + 1);
    }

    parsed
}

/// `カテゴリ[番号]:サブカテゴリ`を分解する
///
/// 空の断片を取り除いてからトリムするため、空白だけの断片は空文字列として
/// 数に含まれます。ちょうど3つにならなければ`None`。
fn split_item(cell: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = cell
        .split(['[', ']', ':'])
        .filter(|s| !s.is_empty())
        .map(str::trim)
        .collect();

    match tokens.as_slice() {
        [category, _, sub_category] => Some((category.to_string(), sub_category.to_string())),
        _ => None,
    }
}

//! Public API Types
//!
//! 公開APIで使用する列挙型・設定型を定義するモジュール。

/// 生成物の扱い方（プロファイル）
///
/// スプレッドシートの共有方法と、PDF出力・通知の有無の組み合わせです。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Profile {
    /// 編集者シートに登録されたメンバーへ編集権限を付与する（PDFなし）
    Shared,

    /// 指定フォルダに保存し、PDFもエクスポートする（デフォルト）
    #[default]
    Filed,

    /// `Filed`に加えて、フォーム送信時にWebhookへ通知する
    Notify,
}

impl Profile {
    /// 編集権限を付与するか
    pub fn shares_with_editors(&self) -> bool {
        matches!(self, Profile::Shared)
    }

    /// PDFをエクスポートするか
    pub fn exports_pdf(&self) -> bool {
        matches!(self, Profile::Filed | Profile::Notify)
    }

    /// フォーム送信時に通知するか
    pub fn notifies(&self) -> bool {
        matches!(self, Profile::Notify)
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared" => Ok(Profile::Shared),
            "filed" => Ok(Profile::Filed),
            "notify" => Ok(Profile::Notify),
            other => Err(format!(
                "unknown profile '{}' (expected shared, filed or notify)",
                other
            )),
        }
    }
}

/// 処理対象の行の選択方式
///
/// 行番号はシート上の行番号（1始まり、1行目はヘッダ）です。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RowSelection {
    /// ヘッダ以降のすべての行
    All,

    /// 連続した範囲（両端を含む）
    ///
    /// 例: `RowSelection::Range { start: 2, end: 5 }` は2〜5行目
    Range { start: u32, end: u32 },

    /// 個別に指定した行
    ///
    /// 例: `RowSelection::Rows(vec![2, 4, 7])`
    Rows(Vec<u32>),
}

/// シートの最終行（Excelの上限）
const MAX_SHEET_ROW: u32 = 1_048_576;

impl RowSelection {
    /// `"2-5,8"`のような行指定文字列を解析する
    ///
    /// 単独の範囲は`Range`、それ以外は`Rows`に展開されます。
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("all") {
            return Ok(RowSelection::All);
        }

        let parse_row = |s: &str| -> Result<u32, String> {
            let row = s
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid row number: '{}'", s.trim()))?;
            if !(2..=MAX_SHEET_ROW).contains(&row) {
                return Err(format!("row {} is the header or out of range", row));
            }
            Ok(row)
        };

        let mut rows = Vec::new();
        let parts: Vec<&str> = input.split(',').collect();
        for part in &parts {
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = (parse_row(start)?, parse_row(end)?);
                if start > end {
                    return Err(format!("invalid row range: {} > {}", start, end));
                }
                if parts.len() == 1 {
                    return Ok(RowSelection::Range { start, end });
                }
                rows.extend(start..=end);
            } else {
                rows.push(parse_row(part)?);
            }
        }
        Ok(RowSelection::Rows(rows))
    }
}

/// 用紙サイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PaperSize {
    A4,
    Letter,
}

impl PaperSize {
    /// エクスポートURLのパラメータ値
    pub fn as_param(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::Letter => "letter",
        }
    }

    /// Excelの用紙サイズ番号
    pub fn excel_code(&self) -> u8 {
        match self {
            PaperSize::A4 => 9,
            PaperSize::Letter => 1,
        }
    }
}

/// 拡大縮小方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageScale {
    /// 標準（100%）
    Normal,
    /// 幅に合わせる
    FitWidth,
    /// 高さに合わせる
    FitHeight,
    /// ページに合わせる
    FitPage,
}

impl PageScale {
    /// エクスポートURLの`scale`パラメータ値
    pub fn as_param(&self) -> &'static str {
        match self {
            PageScale::Normal => "1",
            PageScale::FitWidth => "2",
            PageScale::FitHeight => "3",
            PageScale::FitPage => "4",
        }
    }
}

/// 水平方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

impl HorizontalAlignment {
    pub fn as_param(&self) -> &'static str {
        match self {
            HorizontalAlignment::Left => "LEFT",
            HorizontalAlignment::Center => "CENTER",
            HorizontalAlignment::Right => "RIGHT",
        }
    }
}

/// 垂直方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlignment {
    pub fn as_param(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "TOP",
            VerticalAlignment::Middle => "MIDDLE",
            VerticalAlignment::Bottom => "BOTTOM",
        }
    }
}

/// 余白（インチ）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// PDFエクスポートの設定
///
/// エクスポートURLのパラメータと、チャートワークブックの印刷設定の両方に
/// 使用されます。デフォルト値はA4縦・幅に合わせる・グリッド線なしです。
#[derive(Debug, Clone, PartialEq)]
pub struct PdfExportOptions {
    /// 用紙サイズ
    pub paper_size: PaperSize,
    /// 縦向きか（`false`で横向き）
    pub portrait: bool,
    /// 拡大縮小方式
    pub scale: PageScale,
    /// ページ幅を用紙に合わせるか
    pub fit_width: bool,
    /// 余白
    pub margins: Margins,
    /// 水平方向の位置
    pub horizontal_alignment: HorizontalAlignment,
    /// 垂直方向の位置
    pub vertical_alignment: VerticalAlignment,
    /// スプレッドシート名を表示するか
    pub print_title: bool,
    /// シート名を表示するか
    pub sheet_names: bool,
    /// グリッド線を表示するか
    pub gridlines: bool,
    /// 固定行を表示するか
    pub frozen_rows: bool,
    /// 固定列を表示するか
    pub frozen_columns: bool,
}

impl Default for PdfExportOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            portrait: true,
            scale: PageScale::FitWidth,
            fit_width: true,
            margins: Margins {
                top: 0.40,
                right: 0.50,
                bottom: 0.40,
                left: 0.50,
            },
            horizontal_alignment: HorizontalAlignment::Center,
            vertical_alignment: VerticalAlignment::Top,
            print_title: false,
            sheet_names: false,
            gridlines: false,
            frozen_rows: false,
            frozen_columns: false,
        }
    }
}

impl PdfExportOptions {
    /// エクスポートURLのクエリパラメータ（順序固定）
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let margin = |v: f64| format!("{:.2}", v);
        vec![
            ("exportFormat", "pdf".to_string()),
            ("format", "pdf".to_string()),
            ("size", self.paper_size.as_param().to_string()),
            ("portrait", self.portrait.to_string()),
            ("scale", self.scale.as_param().to_string()),
            ("fitw", self.fit_width.to_string()),
            ("top_margin", margin(self.margins.top)),
            ("right_margin", margin(self.margins.right)),
            ("bottom_margin", margin(self.margins.bottom)),
            ("left_margin", margin(self.margins.left)),
            (
                "horizontal_alignment",
                self.horizontal_alignment.as_param().to_string(),
            ),
            (
                "vertical_alignment",
                self.vertical_alignment.as_param().to_string(),
            ),
            ("printtitle", self.print_title.to_string()),
            ("sheetnames", self.sheet_names.to_string()),
            ("gridlines", self.gridlines.to_string()),
            ("fzr", self.frozen_rows.to_string()),
            ("fzc", self.frozen_columns.to_string()),
        ]
    }
}

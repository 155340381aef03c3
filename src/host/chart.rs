//! Chart Renderer Module
//!
//! `rust_xlsxwriter`で回答表とレーダーチャートを1枚のシートに描画する。

use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};

use super::ChartRenderer;
use crate::api::{HorizontalAlignment, PageScale, PdfExportOptions, VerticalAlignment};
use crate::error::Result;
use crate::header::CategoryMap;
use crate::record::AnswerSheet;

/// 回答表を書き込むシート名
pub const ANSWER_SHEET: &str = "回答";

/// レーダーチャートの配置
///
/// 行・列は1始まり。チャートはC列に縦に並べ、`charts_per_page`個ごとに
/// `page_gap`行の余白と改ページを挟みます。余白と改ページは先頭から`max_page_gaps`か所まで。
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// 最初のチャートを置く行
    pub first_row: u32,
    /// チャートを置く列
    pub column: u16,
    /// チャート1つあたりの行数
    pub spacing: u32,
    /// 1ページに収めるチャート数（0で改ページなし）
    pub charts_per_page: u32,
    /// ページの境目に挟む空行数
    pub page_gap: u32,
    /// 余白と改ページを挟む最大か所数（デフォルト: 2。58行目と115行目）
    pub max_page_gaps: u32,
    /// 値軸の最小値
    pub min_value: f64,
    /// 値軸の最大値
    pub max_value: f64,
    /// チャートの幅（ピクセル）
    pub width: u32,
    /// チャートの高さ（ピクセル）
    pub height: u32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            first_row: 4,
            column: 3,
            spacing: 18,
            charts_per_page: 3,
            page_gap: 3,
            max_page_gaps: 2,
            min_value: 0.0,
            max_value: 5.0,
            width: 480,
            height: 340,
        }
    }
}

impl ChartLayout {
    /// `index`番目（0始まり）のチャートを置く行（1始まり）
    pub fn anchor_row(&self, index: u32) -> u32 {
        let pages = if self.charts_per_page == 0 {
            0
        } else {
            (index / self.charts_per_page).min(self.max_page_gaps)
        };
        self.first_row + self.spacing * index + self.page_gap * pages
    }

    /// `chart_count`個のチャートを並べたときの改ページ位置（0始まりの行、その行の上で改ページ）
    pub fn page_breaks(&self, chart_count: u32) -> Vec<u32> {
        if self.charts_per_page == 0 {
            return Vec::new();
        }
        (1..chart_count)
            .filter(|index| index % self.charts_per_page == 0)
            .take(self.max_page_gaps as usize)
            .map(|index| self.anchor_row(index) - 1 - self.page_gap)
            .collect()
    }
}

/// `rust_xlsxwriter`によるチャート描画
#[derive(Debug, Clone, Default)]
pub struct XlsxChartRenderer {
    layout: ChartLayout,
    print: PdfExportOptions,
}

impl XlsxChartRenderer {
    /// デフォルトの配置・印刷設定で生成
    pub fn new() -> Self {
        Self::default()
    }

    /// チャートの配置を指定する
    pub fn with_layout(mut self, layout: ChartLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 印刷設定（PDFエクスポートと同じ値）を指定する
    pub fn with_print_options(mut self, print: PdfExportOptions) -> Self {
        self.print = print;
        self
    }

    fn write_table(&self, worksheet: &mut Worksheet, sheet: &AnswerSheet) -> Result<()> {
        for (row, answer) in sheet.rows().iter().enumerate() {
            let row = row as u32;
            if !answer.label.is_empty() {
                worksheet.write_string(row, 0, &answer.label)?;
            }
            match answer.numeric_value() {
                Some(value) => worksheet.write_number(row, 1, value)?,
                None => worksheet.write_string(row, 1, &answer.value)?,
            };
        }
        worksheet.set_column_width(0, 28.0)?;
        Ok(())
    }

    fn radar_chart(&self, name: &str, offset: u32, count: u32) -> Chart {
        // カテゴリの行範囲（0始まり）
        let first = offset - 1;
        let last = first + count.max(1) - 1;

        let mut chart = Chart::new(ChartType::Radar);
        chart
            .add_series()
            .set_categories((ANSWER_SHEET, first, 0, last, 0))
            .set_values((ANSWER_SHEET, first, 1, last, 1));
        chart.title().set_name(name);
        chart.legend().set_hidden();
        chart
            .y_axis()
            .set_min(self.layout.min_value)
            .set_max(self.layout.max_value);
        chart.set_width(self.layout.width).set_height(self.layout.height);
        chart
    }

    fn apply_print_setup(&self, worksheet: &mut Worksheet, chart_count: u32) -> Result<()> {
        let print = &self.print;
        worksheet.set_paper_size(print.paper_size.excel_code());
        if print.portrait {
            worksheet.set_portrait();
        } else {
            worksheet.set_landscape();
        }
        let margins = print.margins;
        worksheet.set_margins(margins.left, margins.right, margins.top, margins.bottom, 0.3, 0.3);
        match print.scale {
            PageScale::FitPage => {
                worksheet.set_print_fit_to_pages(1, 1);
            }
            PageScale::FitHeight => {
                worksheet.set_print_fit_to_pages(0, 1);
            }
            PageScale::FitWidth => {
                worksheet.set_print_fit_to_pages(1, 0);
            }
            PageScale::Normal if print.fit_width => {
                worksheet.set_print_fit_to_pages(1, 0);
            }
            PageScale::Normal => {}
        }
        worksheet.set_print_center_horizontally(matches!(
            print.horizontal_alignment,
            HorizontalAlignment::Center
        ));
        worksheet.set_print_center_vertically(matches!(
            print.vertical_alignment,
            VerticalAlignment::Middle
        ));
        worksheet.set_print_gridlines(print.gridlines);
        worksheet.set_print_headings(false);
        worksheet.set_screen_gridlines(print.gridlines);

        let breaks = self.layout.page_breaks(chart_count);
        if !breaks.is_empty() {
            worksheet.set_page_breaks(&breaks)?;
        }
        Ok(())
    }
}

impl ChartRenderer for XlsxChartRenderer {
    fn render(&self, sheet: &AnswerSheet, categories: &CategoryMap) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(ANSWER_SHEET)?;

        self.write_table(worksheet, sheet)?;

        for (index, (name, category)) in categories.iter().enumerate() {
            let chart = self.radar_chart(name, category.offset, category.count);
            let row = self.layout.anchor_row(index as u32) - 1;
            worksheet.insert_chart(row, self.layout.column - 1, &chart)?;
        }

        self.apply_print_setup(worksheet, categories.len() as u32)?;

        Ok(workbook.save_to_buffer()?)
    }
}

//! PDF Export Module
//!
//! スプレッドシートのエクスポートURLにパラメータを付けてGETし、PDFを取得する。
//!
//! ```text
//! {base_url}/{file id}/export?gid=0&exportFormat=pdf&format=pdf&size=A4&portrait=true&...
//! Authorization: Bearer {token}
//! ```

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use super::PdfExporter;
use crate::api::PdfExportOptions;
use crate::error::{Result, SkillRadarError};
use crate::types::StoredFile;

/// Googleスプレッドシートのエクスポートエンドポイント
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// エクスポートURL経由でPDFを取得する
#[derive(Debug, Clone)]
pub struct HttpPdfExporter {
    client: Client,
    base_url: String,
    token: Option<String>,
    gid: u32,
}

impl HttpPdfExporter {
    /// エクスポートエンドポイントを指定して生成
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: None,
            gid: 0,
        }
    }

    /// Bearerトークンを指定する
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// エクスポートするシートのIDを指定する（デフォルト: 0）
    pub fn with_gid(mut self, gid: u32) -> Self {
        self.gid = gid;
        self
    }

    /// エクスポートURLを組み立てる
    pub fn export_url(&self, file: &StoredFile, options: &PdfExportOptions) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))?;
        url.path_segments_mut()
            .map_err(|_| {
                SkillRadarError::Config(format!("export base URL cannot be a base: {}", self.base_url))
            })?
            .push(&file.id)
            .push("export");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("gid", &self.gid.to_string());
            for (key, value) in options.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        Ok(url)
    }
}

impl Default for HttpPdfExporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_BASE_URL)
    }
}

impl PdfExporter for HttpPdfExporter {
    fn export(&self, file: &StoredFile, options: &PdfExportOptions) -> Result<Vec<u8>> {
        let url = self.export_url(file, options)?;
        debug!(%url, "export pdf");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillRadarError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    fn requires_hosted_file(&self) -> bool {
        true
    }
}

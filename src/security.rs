//! Security Module
//!
//! 入力ファイルサイズの制限と、回答内容から作るファイル名・フォルダ IDの検証を提供します。
//! 生成物の名前は回答者の入力（会社名・氏名）から作られるため、そのまま
//! パスに使うとパストラバーサルが起こり得ます。

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 104_857_600, // 100MB
        }
    }
}

/// ファイル名として使えない文字
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// 表示名をファイル名として安全な形に変換する
///
/// パス区切り文字・予約文字・制御文字は`_`に置き換え、先頭のドットも`_`にします。
/// 空になった場合は`_`を返します。
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.starts_with('.') {
        sanitized.replace_range(0..1, "_");
    }
    if sanitized.trim().is_empty() {
        return "_".to_string();
    }
    sanitized
}

/// フォルダ IDの検証
///
/// # 戻り値
///
/// * `Ok(())` - 安全なフォルダ IDの場合
/// * `Err(String)` - 空、絶対パス、`..`、区切り文字を含む場合
pub fn validate_folder_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("Empty folder id is not allowed".to_string());
    }

    if id.starts_with('/') || id.contains(':') {
        return Err(format!("Absolute path is not allowed: {}", id));
    }

    if id.contains("..") {
        return Err(format!("Path traversal detected: {}", id));
    }

    if id.contains('/') || id.contains('\\') {
        return Err(format!("Path separator in folder id is not allowed: {}", id));
    }

    if id.starts_with('.') {
        return Err(format!("Hidden folder is not allowed: {}", id));
    }

    Ok(())
}

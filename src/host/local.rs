//! Local Drive Module
//!
//! ローカルファイルシステム上のディレクトリを、生成物のストアとして扱う実装。
//!
//! ```text
//! <root>/
//!   <folder>/
//!     ACME 山田.xlsx
//!     ACME 山田.pdf
//!     A_B 山田.xlsx       // 表示名 "A/B 山田"
//!     A_B 山田 (2).xlsx   // 表示名 "A_B 山田"
//!     .names.json        // ファイル名 → 表示名・種別
//!     .sharing.json      // ファイル名 → 編集者
//!   .trash/
//!     20240401100000123-ACME 山田.xlsx
//! ```
//!
//! 表示名はファイル名として使えない文字を置き換えて保存するため、異なる表示名が
//! 同じファイル名になることがあります。検索は`.names.json`に記録した表示名との
//! 完全一致で行い、ファイル名が衝突した場合は` (2)`などの連番を付けます。

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use super::{DocumentStore, FileIndex};
use crate::error::{Result, SkillRadarError};
use crate::security::{sanitize_file_name, validate_folder_id};
use crate::types::{FileKind, Folder, StoredFile};

/// ゴミ箱ディレクトリ名
const TRASH_DIR: &str = ".trash";

/// 共有設定ファイル名
const SHARING_FILE: &str = ".sharing.json";

/// 表示名の対応表のファイル名
const NAMES_FILE: &str = ".names.json";

/// 保存したファイルの表示名と種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NameEntry {
    name: String,
    kind: FileKind,
}

/// フォルダ内のファイル名 → 表示名の対応表
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct NameManifest {
    entries: BTreeMap<String, NameEntry>,
}

impl NameManifest {
    fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(NAMES_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn save(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(NAMES_FILE), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 表示名と種別が一致するファイル名
    fn files_named<'a>(&'a self, name: &'a str, kind: FileKind) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(_, entry)| entry.name == name && entry.kind == kind)
            .map(|(file_name, _)| file_name.as_str())
    }

    /// 新しい表示名に、使われていないファイル名を割り当てる
    fn allocate(&self, dir: &Path, name: &str, kind: FileKind) -> String {
        let suffix = format!(".{}", kind.extension());
        let base = LocalDrive::file_name(name, kind);
        let stem = base.strip_suffix(&suffix).unwrap_or(&base).to_string();

        let mut candidate = base;
        let mut n = 2;
        while self.entries.contains_key(&candidate) || dir.join(&candidate).exists() {
            candidate = format!("{} ({}){}", stem, n, suffix);
            n += 1;
        }
        candidate
    }
}

/// ローカルディレクトリをストアとして扱う
#[derive(Debug, Clone)]
pub struct LocalDrive {
    root: PathBuf,
}

impl LocalDrive {
    /// ルートディレクトリを開く（存在しなければ作成する）
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        let root = fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    /// ルートディレクトリ
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// フォルダ内の共有設定（ファイル名 → 編集者）
    pub fn sharing(&self, folder: &Folder) -> Result<BTreeMap<String, Vec<String>>> {
        let path = self.root.join(&folder.id).join(SHARING_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 表示名と種別からディスク上のファイル名を決める
    ///
    /// 表示名がすでに拡張子で終わっている場合（`"ACME 山田.pdf"`）は付け足しません。
    fn file_name(name: &str, kind: FileKind) -> String {
        let sanitized = sanitize_file_name(name);
        let suffix = format!(".{}", kind.extension());
        if sanitized.ends_with(&suffix) {
            sanitized
        } else {
            sanitized + &suffix
        }
    }

    fn stored_file(&self, path: &Path, name: &str, kind: FileKind) -> Result<StoredFile> {
        let id = path
            .strip_prefix(&self.root)
            .map_err(|_| SkillRadarError::Config(format!("{} is outside the drive", path.display())))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = Url::from_file_path(path)
            .map_err(|_| SkillRadarError::Config(format!("not an absolute path: {}", path.display())))?;
        Ok(StoredFile {
            id,
            name: name.to_string(),
            kind,
            url: url.to_string(),
        })
    }

    fn folder_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() && !entry.file_name().to_string_lossy().starts_with('.') {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

impl FileIndex for LocalDrive {
    fn search(&self, name: &str, kind: FileKind) -> Result<Vec<StoredFile>> {
        let mut found = Vec::new();
        for dir in self.folder_dirs()? {
            let manifest = NameManifest::load(&dir)?;
            for file_name in manifest.files_named(name, kind) {
                let path = dir.join(file_name);
                if path.is_file() {
                    found.push(self.stored_file(&path, name, kind)?);
                }
            }
        }
        Ok(found)
    }

    fn trash(&mut self, file: &StoredFile) -> Result<()> {
        let source = self.root.join(&file.id);
        let (Some(dir), Some(file_name)) = (source.parent(), source.file_name()) else {
            return Err(SkillRadarError::Config(format!("invalid file id: {}", file.id)));
        };
        let file_name = file_name.to_string_lossy().into_owned();

        let trash_dir = self.root.join(TRASH_DIR);
        fs::create_dir_all(&trash_dir)?;
        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f").to_string();
        let mut target = trash_dir.join(format!("{}-{}", stamp, file_name));
        let mut n = 1;
        while target.exists() {
            target = trash_dir.join(format!("{}-{}-{}", stamp, n, file_name));
            n += 1;
        }
        debug!(from = %source.display(), to = %target.display(), "trash");
        fs::rename(&source, target)?;

        let mut manifest = NameManifest::load(dir)?;
        if manifest.entries.remove(&file_name).is_some() {
            manifest.save(dir)?;
        }
        Ok(())
    }
}

impl DocumentStore for LocalDrive {
    fn ensure_folder(&mut self, id: &str) -> Result<Folder> {
        validate_folder_id(id).map_err(SkillRadarError::SecurityViolation)?;
        let path = self.root.join(id);
        if !path.is_dir() {
            debug!(folder = id, "create folder");
            fs::create_dir_all(&path)?;
        }
        Ok(Folder::new(id))
    }

    fn save(
        &mut self,
        folder: &Folder,
        name: &str,
        kind: FileKind,
        bytes: &[u8],
    ) -> Result<StoredFile> {
        let dir = self.root.join(&folder.id);
        let mut manifest = NameManifest::load(&dir)?;
        let file_name = match manifest.files_named(name, kind).next() {
            Some(existing) => existing.to_string(),
            None => manifest.allocate(&dir, name, kind),
        };

        let path = dir.join(&file_name);
        fs::write(&path, bytes)?;
        manifest.entries.insert(
            file_name,
            NameEntry {
                name: name.to_string(),
                kind,
            },
        );
        manifest.save(&dir)?;
        self.stored_file(&path, name, kind)
    }

    fn share(&mut self, file: &StoredFile, editors: &[String]) -> Result<()> {
        let path = self.root.join(&file.id);
        let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(SkillRadarError::Config(format!("invalid file id: {}", file.id)));
        };

        let sharing_path = dir.join(SHARING_FILE);
        let mut sharing: BTreeMap<String, Vec<String>> = if sharing_path.exists() {
            serde_json::from_str(&fs::read_to_string(&sharing_path)?)?
        } else {
            BTreeMap::new()
        };
        sharing.insert(file_name.to_string_lossy().into_owned(), editors.to_vec());
        fs::write(sharing_path, serde_json::to_string_pretty(&sharing)?)?;
        Ok(())
    }

    fn is_local(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();

        let stored = drive
            .save(&folder, "ACME 山田", FileKind::Spreadsheet, b"xlsx")
            .unwrap();
        assert_eq!(stored.id, "skills/ACME 山田.xlsx");
        assert!(stored.url.starts_with("file://"));

        let found = drive.search("ACME 山田", FileKind::Spreadsheet).unwrap();
        assert_eq!(found, vec![stored]);
        assert!(drive.search("ACME 山田", FileKind::Pdf).unwrap().is_empty());
        assert!(drive.search("ACME", FileKind::Spreadsheet).unwrap().is_empty());
    }

    #[test]
    fn test_pdf_name_keeps_single_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();

        let stored = drive
            .save(&folder, "ACME 山田.pdf", FileKind::Pdf, b"%PDF")
            .unwrap();
        assert_eq!(stored.id, "skills/ACME 山田.pdf");
        assert_eq!(drive.search("ACME 山田.pdf", FileKind::Pdf).unwrap().len(), 1);
    }

    #[test]
    fn test_trash_hides_file_from_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();
        let stored = drive
            .save(&folder, "ACME 山田", FileKind::Spreadsheet, b"xlsx")
            .unwrap();

        drive.trash(&stored).unwrap();

        assert!(drive.search("ACME 山田", FileKind::Spreadsheet).unwrap().is_empty());
        let trashed: Vec<_> = fs::read_dir(dir.path().join(TRASH_DIR)).unwrap().collect();
        assert_eq!(trashed.len(), 1);
    }

    #[test]
    fn test_names_with_same_sanitized_form_stay_separate() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();

        let slash = drive
            .save(&folder, "A/B 山田", FileKind::Spreadsheet, b"1")
            .unwrap();
        let underscore = drive
            .save(&folder, "A_B 山田", FileKind::Spreadsheet, b"2")
            .unwrap();

        assert_eq!(slash.id, "skills/A_B 山田.xlsx");
        assert_eq!(underscore.id, "skills/A_B 山田 (2).xlsx");
        assert_eq!(
            drive.search("A/B 山田", FileKind::Spreadsheet).unwrap(),
            vec![slash.clone()]
        );
        assert_eq!(
            drive.search("A_B 山田", FileKind::Spreadsheet).unwrap(),
            vec![underscore.clone()]
        );

        // 片方をゴミ箱に移しても、もう片方は残る
        drive.trash(&underscore).unwrap();
        assert!(drive.search("A_B 山田", FileKind::Spreadsheet).unwrap().is_empty());
        assert_eq!(
            drive.search("A/B 山田", FileKind::Spreadsheet).unwrap(),
            vec![slash]
        );
        assert_eq!(fs::read(dir.path().join("skills").join("A_B 山田.xlsx")).unwrap(), b"1");
    }

    #[test]
    fn test_save_same_name_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();

        drive.save(&folder, "A/B", FileKind::Spreadsheet, b"1").unwrap();
        let second = drive.save(&folder, "A/B", FileKind::Spreadsheet, b"2").unwrap();

        assert_eq!(second.id, "skills/A_B.xlsx");
        assert_eq!(drive.search("A/B", FileKind::Spreadsheet).unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_trash_keeps_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();

        for i in 0..5u8 {
            let stored = drive
                .save(&folder, "ACME 山田", FileKind::Spreadsheet, &[i])
                .unwrap();
            drive.trash(&stored).unwrap();
        }

        let mut contents: Vec<Vec<u8>> = fs::read_dir(dir.path().join(TRASH_DIR))
            .unwrap()
            .map(|entry| fs::read(entry.unwrap().path()).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn test_search_spans_folders() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let a = drive.ensure_folder("a").unwrap();
        let b = drive.ensure_folder("b").unwrap();
        drive.save(&a, "X", FileKind::Spreadsheet, b"1").unwrap();
        drive.save(&b, "X", FileKind::Spreadsheet, b"2").unwrap();

        assert_eq!(drive.search("X", FileKind::Spreadsheet).unwrap().len(), 2);
    }

    #[test]
    fn test_ensure_folder_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        assert!(matches!(
            drive.ensure_folder("../outside"),
            Err(SkillRadarError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_share_records_editors() {
        let dir = tempfile::tempdir().unwrap();
        let mut drive = LocalDrive::open(dir.path()).unwrap();
        let folder = drive.ensure_folder("skills").unwrap();
        let stored = drive
            .save(&folder, "ACME 山田", FileKind::Spreadsheet, b"xlsx")
            .unwrap();

        let editors = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        drive.share(&stored, &editors).unwrap();

        let sharing = drive.sharing(&folder).unwrap();
        assert_eq!(sharing.get("ACME 山田.xlsx"), Some(&editors));
    }
}

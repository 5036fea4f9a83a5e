//! JSON backup of the whole album collection

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::album::Album;
use crate::Result;

/// `albums_backup_<ISO 8601 with ':' and '.' replaced by '-'>.json`
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("albums_backup_{}.json", stamp)
}

/// Write `albums` (ids included) as a pretty-printed JSON array
///
/// Creates `dir` if needed and returns the path of the new file.
pub fn write_backup(albums: &[Album], dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(now));
    let json = serde_json::to_string_pretty(albums)?;
    std::fs::write(&path, json)?;
    info!("Backed up {} albums to {}", albums.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::AlbumRecord;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_has_no_colons_or_dots_in_stamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap()
            + chrono::Duration::milliseconds(789);
        assert_eq!(
            backup_file_name(now),
            "albums_backup_2024-03-01T12-34-56-789Z.json"
        );
    }

    #[test]
    fn test_write_backup_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("backups");
        let albums = vec![Album::new(
            "id-1",
            AlbumRecord {
                name: "Trip".to_string(),
                category: "A".to_string(),
                ..Default::default()
            },
        )];

        let path = write_backup(&albums, &dir, Utc::now()).unwrap();
        assert!(path.starts_with(&dir));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {"));
        let back: Vec<Album> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, albums);
    }
}

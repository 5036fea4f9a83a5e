//! Fallback album list
//!
//! An empty store is treated as "not yet configured" rather than
//! "intentionally empty": readers get this list instead of an empty page.

use std::borrow::Cow;

use crate::album::{Album, AlbumRecord};

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    name: &str,
    category: &str,
    participants: &str,
    dates: (&str, &str),
    link: &str,
    thumbnail: Option<&str>,
    videos: [Option<&str>; 3],
) -> Album {
    let [v1, v2, v3] = videos;
    Album::new(
        id,
        AlbumRecord {
            name: name.to_string(),
            category: category.to_string(),
            participants: participants.to_string(),
            start_date: Some(dates.0.to_string()),
            end_date: Some(dates.1.to_string()),
            link: Some(link.to_string()).filter(|l| !l.is_empty()),
            thumbnail: thumbnail.map(str::to_string),
            video_link1: v1.map(str::to_string),
            video_link2: v2.map(str::to_string),
            video_link3: v3.map(str::to_string),
        },
    )
}

/// The built-in seed albums
pub fn seed_albums() -> Vec<Album> {
    vec![
        seed(
            "2024-1",
            "20240324探訪柴山秘境(二)",
            "國內旅遊, 爬山",
            "羅家1人, 陽家2人",
            ("2024/03/24", "2024/03/24"),
            "https://photos.app.goo.gl/78jEZ78wrAksqNdE9",
            None,
            [None, None, None],
        ),
        seed(
            "2024-2",
            "20240316茶友會溪頭之旅",
            "國內旅遊, 爬山",
            "凌家2人, 曾家2人, 羅家2人, 邱家2人, 陽家2人",
            ("2024/03/16", "2024/03/17"),
            "https://photos.app.goo.gl/g5vn39MwwF38KgFz5",
            Some("https://lh3.googleusercontent.com/pw/AP1GczMv6DOSnQBnHB8Vedy2Z1h5Pzj4Ko8dl8I0Rnd3_D0vtxn8aV3GjlP3abZ8_8nJZCnvagE2qrl3F2XHF_2tsuUMNt1_pE84Zyr7tIuQzSdqs6QJYEdrhADKC_cthGnU8KvlRxPbTNAptrNnuMnTZk84Pw=w3120-h1756-s-no-gm?authuser=1"),
            [Some("https://youtu.be/vqHRaOmixWY"), None, None],
        ),
        seed(
            "2024-3",
            "20240302探訪柴山秘境",
            "國內旅遊, 爬山",
            "羅家1人, 陽家2人",
            ("2024/03/02", "2024/03/02"),
            "",
            None,
            [None, None, None],
        ),
        seed(
            "2023-1",
            "20230819-22茶友會花東之旅",
            "國內旅遊",
            "凌家2人, 曾家2人, 羅家2人, 邱家2人, 陽家2人, 黃家2人",
            ("2023/08/19", "2023/08/22"),
            "https://reurl.cc/g4zYp7",
            None,
            [
                Some("https://youtu.be/tatq-kxEtVI"),
                Some("https://youtu.be/MXtNm3vcBq8"),
                None,
            ],
        ),
        seed(
            "2023-2",
            "20231129碧潭新店溪河岸單車遊",
            "單車, 國內旅遊",
            "羅家2人, 邱家2人",
            ("2023/11/29", "2023/11/29"),
            "https://reurl.cc/zlW577",
            None,
            [Some("https://youtu.be/0Yv44QQDXQ8"), None, None],
        ),
        seed(
            "old-1",
            "2008年寒假之旅相簿",
            "旅遊",
            "羅家4人, 邱家4人, 陽家3人",
            ("2008/01/18", "2008/01/24"),
            "https://reurl.cc/2zZMDr",
            None,
            [None, None, None],
        ),
    ]
}

/// What readers should see for a given store snapshot
///
/// Returns the snapshot itself unless it is empty, in which case the seed
/// list is substituted. The flag tells whether the seed list was used.
pub fn visible_albums(snapshot: &[Album]) -> (Cow<'_, [Album]>, bool) {
    if snapshot.is_empty() {
        (Cow::Owned(seed_albums()), true)
    } else {
        (Cow::Borrowed(snapshot), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_unique() {
        let albums = seed_albums();
        let ids: HashSet<_> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), albums.len());
    }

    #[test]
    fn test_empty_snapshot_falls_back_to_seed() {
        let (albums, seeded) = visible_albums(&[]);
        assert!(seeded);
        assert_eq!(albums.len(), seed_albums().len());
    }

    #[test]
    fn test_non_empty_snapshot_is_used_as_is() {
        let snapshot = vec![Album::new("x", AlbumRecord::default())];
        let (albums, seeded) = visible_albums(&snapshot);
        assert!(!seeded);
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, "x");
    }
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use melora::model::{DeviceId, HistoryRecord};
use melora::palette::PaletteColors;
use melora::stats;
use time::{Duration, OffsetDateTime, UtcOffset};

const TITLES: [&str; 4] = ["Hello", "Halo", "hello", ""];
const GENRES: [Option<&str>; 4] = [Some("Pop"), Some("Rock"), Some(""), None];

fuzz_target!(|data: &[u8]| {
    let records: Vec<HistoryRecord> = data
        .chunks(2)
        .enumerate()
        .map(|(idx, chunk)| {
            let byte = chunk[0];
            let minutes = chunk.get(1).copied().unwrap_or_default();
            HistoryRecord {
                id: idx.to_string(),
                device_id: DeviceId::new("fuzz"),
                title: TITLES[usize::from(byte % 4)].to_string(),
                artist: String::from("Artist"),
                album: None,
                release_date: None,
                genre: GENRES[usize::from((byte >> 2) % 4)].map(str::to_string),
                album_art_url: None,
                lyrics: None,
                preview_url: None,
                song_url: None,
                created_at: OffsetDateTime::UNIX_EPOCH + Duration::minutes(i64::from(minutes)),
            }
        })
        .collect();

    let summary = stats::summarize(&records, &mut PaletteColors::default(), UtcOffset::UTC);
    assert_eq!(summary.search_count, records.len());
    assert_eq!(summary.genre_total(), records.len() as u64);
    assert_eq!(summary.most_recent.is_none(), records.is_empty());

    let latest = records.iter().map(|record| record.created_at).max();
    assert_eq!(summary.most_recent.map(|record| record.created_at), latest);
});

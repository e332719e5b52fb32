use crate::model::HistoryRecord;
use anyhow::{Context, Result};
use urlencoding::encode;

pub const LYRICS_NOT_FOUND: &str = "Lyrics not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink {
    pub label: &'static str,
    pub url: String,
}

pub fn youtube_search_url(title: &str, artist: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        encode(&format!("{title} {artist}"))
    )
}

pub fn telegram_bot_url(title: &str, artist: &str) -> String {
    format!(
        "https://t.me/vkmusic_bot?start={}",
        encode(&format!("{title} {artist}"))
    )
}

pub fn tubidy_search_url(title: &str, artist: &str) -> String {
    format!(
        "https://tubidy.ws/search/{}-{}",
        encode(title),
        encode(artist)
    )
}

/// iTunes album search; spaces become `+` before percent-encoding.
pub fn itunes_album_search_url(artist: &str, album: &str) -> String {
    format!(
        "https://itunes.apple.com/search?term={}+{}&entity=album",
        encode(&artist.replace(' ', "+")),
        encode(&album.replace(' ', "+"))
    )
}

/// iTunes returns 100px artwork; the same path serves 1000px.
pub fn hd_artwork_url(artwork_url: &str) -> String {
    artwork_url.replace("100x100", "1000x1000")
}

pub fn lyrics_lookup_url(artist: &str, title: &str) -> Option<String> {
    if artist.trim().is_empty() || title.trim().is_empty() {
        return None;
    }
    Some(format!(
        "https://api.lyrics.ovh/v1/{}/{}",
        encode(artist),
        encode(title)
    ))
}

/// Where to look when the record carries no lyrics.
pub fn lyrics_lookup_hint(record: &HistoryRecord) -> Option<String> {
    match record.lyrics.as_deref() {
        Some(lyrics) if !lyrics.trim().is_empty() => None,
        _ => lyrics_lookup_url(&record.artist, &record.title),
    }
}

pub fn lyrics_or_placeholder(record: &HistoryRecord) -> &str {
    match record.lyrics.as_deref() {
        Some(lyrics) if !lyrics.trim().is_empty() => lyrics,
        _ => LYRICS_NOT_FOUND,
    }
}

pub fn share_text(record: &HistoryRecord) -> String {
    format!("{}\n {}", record.title, record.artist)
}

pub fn record_links(record: &HistoryRecord) -> Vec<ExternalLink> {
    let mut links = Vec::with_capacity(4);
    if let Some(song_url) = record.song_url.as_deref().filter(|url| !url.is_empty()) {
        links.push(ExternalLink {
            label: "Apple Music",
            url: song_url.to_string(),
        });
    }
    links.push(ExternalLink {
        label: "YouTube",
        url: youtube_search_url(&record.title, &record.artist),
    });
    links.push(ExternalLink {
        label: "Telegram",
        url: telegram_bot_url(&record.title, &record.artist),
    });
    links.push(ExternalLink {
        label: "Tubidy",
        url: tubidy_search_url(&record.title, &record.artist),
    });
    links
}

/// Album art for the detail view: the stored URL, else the iTunes search that
/// would find it.
pub fn album_art_source(record: &HistoryRecord) -> Option<String> {
    if let Some(url) = record.album_art_url.as_deref().filter(|url| !url.is_empty()) {
        return Some(hd_artwork_url(url));
    }
    let album = record.album.as_deref().filter(|album| !album.is_empty())?;
    Some(itunes_album_search_url(&record.artist, album))
}

pub fn open_link(link: &ExternalLink) -> Result<()> {
    open::that(&link.url).with_context(|| format!("failed to open {}", link.url))?;
    log::info!("opened {} link", link.label);
    Ok(())
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to copy to clipboard")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceId;
    use time::macros::datetime;

    fn song() -> HistoryRecord {
        HistoryRecord {
            id: String::from("1"),
            device_id: DeviceId::new("phone"),
            title: String::from("Blinding Lights"),
            artist: String::from("The Weeknd"),
            album: Some(String::from("After Hours")),
            release_date: Some(String::from("2020-03-20")),
            genre: Some(String::from("Pop")),
            album_art_url: None,
            lyrics: None,
            preview_url: None,
            song_url: None,
            created_at: datetime!(2024-06-15 12:00 UTC),
        }
    }

    #[test]
    fn search_urls_encode_title_and_artist() {
        assert_eq!(
            youtube_search_url("Blinding Lights", "The Weeknd"),
            "https://www.youtube.com/results?search_query=Blinding%20Lights%20The%20Weeknd"
        );
        assert_eq!(
            telegram_bot_url("A&B", "C"),
            "https://t.me/vkmusic_bot?start=A%26B%20C"
        );
        assert_eq!(
            tubidy_search_url("Blinding Lights", "The Weeknd"),
            "https://tubidy.ws/search/Blinding%20Lights-The%20Weeknd"
        );
    }

    #[test]
    fn itunes_search_replaces_spaces_before_encoding() {
        assert_eq!(
            itunes_album_search_url("The Weeknd", "After Hours"),
            "https://itunes.apple.com/search?term=The%2BWeeknd+After%2BHours&entity=album"
        );
    }

    #[test]
    fn artwork_is_upscaled() {
        assert_eq!(
            hd_artwork_url("https://is1.mzstatic.com/image/a/100x100bb.jpg"),
            "https://is1.mzstatic.com/image/a/1000x1000bb.jpg"
        );
    }

    #[test]
    fn lyrics_lookup_needs_artist_and_title() {
        assert_eq!(
            lyrics_lookup_url("Adele", "Hello").as_deref(),
            Some("https://api.lyrics.ovh/v1/Adele/Hello")
        );
        assert!(lyrics_lookup_url("", "Hello").is_none());
        assert_eq!(
            lyrics_lookup_url("AC/DC", "Back in Black").as_deref(),
            Some("https://api.lyrics.ovh/v1/AC%2FDC/Back%20in%20Black")
        );
    }

    #[test]
    fn lookup_hint_only_without_lyrics() {
        let mut record = song();
        assert_eq!(
            lyrics_lookup_hint(&record).as_deref(),
            Some("https://api.lyrics.ovh/v1/The%20Weeknd/Blinding%20Lights")
        );
        record.lyrics = Some(String::from("I said, ooh"));
        assert!(lyrics_lookup_hint(&record).is_none());
    }

    #[test]
    fn missing_lyrics_show_placeholder() {
        let mut record = song();
        assert_eq!(lyrics_or_placeholder(&record), "Lyrics not found");
        record.lyrics = Some(String::from("I said, ooh"));
        assert_eq!(lyrics_or_placeholder(&record), "I said, ooh");
    }

    #[test]
    fn share_text_puts_artist_on_second_line() {
        assert_eq!(share_text(&song()), "Blinding Lights\n The Weeknd");
    }

    #[test]
    fn apple_music_link_only_when_song_url_present() {
        let mut record = song();
        assert_eq!(record_links(&record).len(), 3);
        record.song_url = Some(String::from("https://music.apple.com/song/1"));
        let links = record_links(&record);
        assert_eq!(links[0].label, "Apple Music");
        assert_eq!(links.len(), 4);
    }

    #[test]
    fn album_art_prefers_stored_url() {
        let mut record = song();
        assert!(
            album_art_source(&record)
                .is_some_and(|url| url.starts_with("https://itunes.apple.com/search"))
        );
        record.album_art_url = Some(String::from("https://x/100x100.jpg"));
        assert_eq!(
            album_art_source(&record).as_deref(),
            Some("https://x/1000x1000.jpg")
        );
        record.album_art_url = None;
        record.album = None;
        assert!(album_art_source(&record).is_none());
    }
}

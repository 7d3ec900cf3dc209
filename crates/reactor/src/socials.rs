//! Social-link extraction.

use crate::event::SocialEntry;

/// Named link slots derived from a player's socials list.
///
/// When a service appears multiple times, the last occurrence in source
/// order wins. Entries with an empty link are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub twitch: Option<String>,
    pub youtube: Option<String>,
    pub beat_saver: Option<String>,
}

impl SocialLinks {
    /// Map a socials list onto the named slots.
    pub fn from_entries(entries: &[SocialEntry]) -> Self {
        let mut links = Self::default();
        for entry in entries {
            if entry.link.is_empty() {
                continue;
            }
            let slot = match entry.service.as_str() {
                "Twitter" => &mut links.twitter,
                "Twitch" => &mut links.twitch,
                "YouTube" => &mut links.youtube,
                "BeatSaver" => &mut links.beat_saver,
                _ => continue,
            };
            *slot = Some(entry.link.clone());
        }
        links
    }
}

/// Resolve a platform username as the last path segment of a profile link.
///
/// Trailing slashes are trimmed first, so `https://twitch.tv/foo/` and
/// `https://twitch.tv/foo` both yield `foo`. Returns `None` when no
/// non-empty segment remains.
pub fn username_from_link(link: &str) -> Option<&str> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// User settings record, owned by the popup and read by the filter
use serde::{Deserialize, Serialize};

/// Flags controlling which filter behaviors are active.
///
/// Wire names are kept verbatim, misspellings included, so records written
/// by earlier releases still decode. Flags missing from a stored record take
/// their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub prevent_shorts: bool,
    pub remove_shorts_from_search: bool,
    pub remove_shorts_from_site: bool,
    pub remove_shorts_playback: bool,

    pub shorts_options_disabled: bool,

    #[serde(rename = "removeAdsFromReccomendations")]
    pub remove_ads_from_recommendations: bool,
    pub remove_new_channels_from_search: bool,
    pub remove_latest_posts_from_search: bool,
    #[serde(rename = "removeLastestVideosFromSearch")]
    pub remove_latest_videos_from_search: bool,
    pub remove_previously_watched_from_search: bool,
    pub remove_for_you_from_search: bool,
    pub remove_people_also_watched_from_search: bool,
    pub remove_from_related_searches: bool,
    pub remove_people_also_search_for: bool,
    pub remove_featured_banners: bool,
}

impl Default for Settings {
    // Section removal on by default; anything that changes navigation is opt-in.
    fn default() -> Self {
        Settings {
            prevent_shorts: false,
            remove_shorts_from_search: true,
            remove_shorts_from_site: false,
            remove_shorts_playback: false,

            shorts_options_disabled: false,

            remove_ads_from_recommendations: true,
            remove_new_channels_from_search: true,
            remove_latest_posts_from_search: true,
            remove_latest_videos_from_search: true,
            remove_previously_watched_from_search: true,
            remove_for_you_from_search: true,
            remove_people_also_watched_from_search: true,
            remove_from_related_searches: true,
            remove_people_also_search_for: true,
            remove_featured_banners: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_enables_removals_only() {
        let settings = Settings::default();

        assert!(settings.remove_shorts_from_search);
        assert!(settings.remove_ads_from_recommendations);
        assert!(settings.remove_new_channels_from_search);
        assert!(!settings.prevent_shorts);
        assert!(!settings.remove_shorts_playback);
    }

    #[test]
    fn test_wire_names_are_verbatim() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 15);
        assert!(object.contains_key("removeAdsFromReccomendations"));
        assert!(object.contains_key("removeLastestVideosFromSearch"));
        assert!(object.contains_key("removePeopleAlsoSearchFor"));
        assert!(object.contains_key("shortsOptionsDisabled"));
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let settings: Settings = serde_json::from_value(json!({
            "removeShortsFromSearch": false,
            "preventShorts": true
        }))
        .unwrap();

        assert!(!settings.remove_shorts_from_search);
        assert!(settings.prevent_shorts);
        assert!(settings.remove_ads_from_recommendations);
    }
}

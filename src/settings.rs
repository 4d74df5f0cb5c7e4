use serde::Deserialize;

/// Mapping policy shared by all mappers of an [`App`](crate::App).
///
/// Deserializable so it can be embedded in a host's configuration file;
/// missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    /// Rebuild a page from its URL when the referenced instance is gone,
    /// instead of failing with [`MapError::PageExpired`](crate::MapError).
    pub recreate_mounted_pages_after_expiry: bool,
    /// Compare fixed mount segments case sensitively.
    pub case_sensitive: bool,
    /// First segment of generic bookmarkable URLs.
    pub namespace: String,
    /// Second segment of generic bookmarkable URLs.
    pub bookmarkable_identifier: String,
    /// Let a mount of the home page class also claim the empty URL.
    pub redirect_from_home_page: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            recreate_mounted_pages_after_expiry: true,
            case_sensitive: true,
            namespace: "wicket".to_owned(),
            bookmarkable_identifier: "bookmarkable".to_owned(),
            redirect_from_home_page: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_use_defaults() {
        let settings: MapperSettings =
            serde_json::from_str(r#"{ "recreate_mounted_pages_after_expiry": false }"#).unwrap();

        assert_eq!(
            settings,
            MapperSettings {
                recreate_mounted_pages_after_expiry: false,
                ..MapperSettings::default()
            }
        );
    }

    #[test]
    fn namespace_is_configurable() {
        let settings: MapperSettings =
            serde_json::from_str(r#"{ "namespace": "app", "case_sensitive": false }"#).unwrap();

        assert_eq!(settings.namespace, "app");
        assert!(!settings.case_sensitive);
        assert_eq!(settings.bookmarkable_identifier, "bookmarkable");
    }
}

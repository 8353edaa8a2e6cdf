//! Internationalization (i18n) module
//!
//! Picks the interface language from the system locale. Supports English
//! and Chinese Simplified; log messages remain in English.

/// Locales shipped in `locales/`
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];

/// Map a system locale tag such as `zh-Hans-CN` or `en_US.UTF-8` to a
/// supported locale
pub fn resolve_locale(tag: &str) -> &'static str {
    let tag = tag.to_lowercase();
    if tag.starts_with("zh") {
        "zh-CN"
    } else {
        "en"
    }
}

/// Detect the system locale and make it the active translation locale
pub fn init_locale() {
    let locale = sys_locale::get_locale()
        .or_else(|| std::env::var("LANG").ok())
        .map(|tag| resolve_locale(&tag))
        .unwrap_or("en");
    rust_i18n::set_locale(locale);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale("zh-CN"), "zh-CN");
        assert_eq!(resolve_locale("zh-Hans-CN"), "zh-CN");
        assert_eq!(resolve_locale("zh_TW.UTF-8"), "zh-CN");
        assert_eq!(resolve_locale("en_US.UTF-8"), "en");
        assert_eq!(resolve_locale("de-DE"), "en");
        assert!(SUPPORTED_LOCALES.contains(&resolve_locale("fr")));
    }
}

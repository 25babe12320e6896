//! Coarse device classification from the `User-Agent` header.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Desktop,
    Phone,
    Tablet,
    Bot,
    Tv,
    Car,
}

impl Device {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Phone => "phone",
            Self::Tablet => "tablet",
            Self::Bot => "bot",
            Self::Tv => "tv",
            Self::Car => "car",
        }
    }

    /// Classify a user agent. Empty or unrecognized agents are desktops.
    pub fn classify(user_agent: &str) -> Self {
        if user_agent.trim().is_empty() {
            return Self::Desktop;
        }

        // More specific families first
        let rules = [
            (&BOT, Self::Bot),
            (&CAR, Self::Car),
            (&TV, Self::Tv),
            (&TABLET, Self::Tablet),
            (&PHONE, Self::Phone),
            (&ANDROID, Self::Tablet),
        ];
        rules
            .iter()
            .find(|(re, _)| re.is_match(user_agent))
            .map_or(Self::Desktop, |(_, device)| *device)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn pattern(src: &str) -> Regex {
    RegexBuilder::new(src)
        .case_insensitive(true)
        .build()
        .unwrap()
}

static BOT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"bot\b|crawl|spider|slurp|mediapartners|facebookexternalhit|embedly|curl/|wget/|sitemapgenerator|headlesschrome|lighthouse")
});
static CAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"tesla|qtcarbrowser|carplay|android auto"));
static TV: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"smart-?tv|googletv|appletv|hbbtv|netcast|roku|crkey|bravia|\baft[bstm]\b|tizen.*tv|web0?s.*tv|xbox|playstation")
});
static TABLET: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"ipad|tablet|kindle|silk/|playbook|nexus (7|9|10)\b"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"mobi|iphone|ipod|windows phone|blackberry|bb10|opera mini")
});
/// Android without a `Mobile` token, checked after phones.
static ANDROID: LazyLock<Regex> = LazyLock::new(|| pattern(r"android"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let cases = [
            ("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36", Device::Desktop),
            ("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148", Device::Phone),
            ("Mozilla/5.0 (Linux; Android 14; Pixel 8) Chrome/120.0 Mobile Safari/537.36", Device::Phone),
            ("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Safari/604.1", Device::Tablet),
            ("Mozilla/5.0 (Linux; Android 13; SM-X700) Chrome/120.0 Safari/537.36", Device::Tablet),
            ("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)", Device::Bot),
            ("Node/SitemapGenerator", Device::Bot),
            ("curl/8.4.0", Device::Bot),
            ("Mozilla/5.0 (SMART-TV; Linux; Tizen 6.0) SamsungBrowser/4.0 TV Safari", Device::Tv),
            ("Roku/DVP-12.0 (12.0.0.4182)", Device::Tv),
            ("Mozilla/5.0 (X11; Linux) AppleWebKit/537.36 Chrome/79.0 Safari/537.36 Tesla/2023.44", Device::Car),
            ("", Device::Desktop),
        ];
        for (ua, expected) in cases {
            assert_eq!(Device::classify(ua), expected, "{ua}");
        }
    }

    #[test]
    fn test_rules_compile_and_ignore_case() {
        for rule in [&*BOT, &*CAR, &*TV, &*TABLET, &*PHONE, &*ANDROID] {
            assert!(!rule.as_str().is_empty());
        }
        assert_eq!(Device::classify("GOOGLEBOT/2.1"), Device::Bot);
        assert_eq!(Device::classify("MOZILLA/5.0 (IPHONE) MOBILE"), Device::Phone);
    }

    #[test]
    fn test_display() {
        assert_eq!(Device::Tablet.to_string(), "tablet");
    }
}

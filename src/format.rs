//! The closed set of target formats a user can pick.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target raster format for the re-encoded download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Webp,
    Jpeg,
}

/// A format token outside `{png, webp, jpeg}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown target format '{0}': expected png, webp or jpeg")]
pub struct UnknownFormat(pub String);

impl TargetFormat {
    /// Every selectable format, in dropdown order.
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Png, TargetFormat::Webp, TargetFormat::Jpeg];

    /// Lowercase token, also used as the download's extension.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
            TargetFormat::Jpeg => "jpeg",
        }
    }

    /// Dropdown label.
    pub fn label(self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Webp => "WEBP",
            TargetFormat::Jpeg => "JPEG",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Webp => "image/webp",
            TargetFormat::Jpeg => "image/jpeg",
        }
    }

    /// The matching `image` crate format, used when checking outputs.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            TargetFormat::Png => image::ImageFormat::Png,
            TargetFormat::Webp => image::ImageFormat::WebP,
            TargetFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }

    /// Download name: always `<stem>.<format>`, the source name is discarded.
    pub fn file_name(self, stem: &str) -> String {
        // don't use Path::with_extension: a stem containing dots would be cut
        let mut name = stem.to_string();
        name.push('.');
        name.push_str(self.as_str());
        name
    }

    /// Parse a dropdown value. The empty string is the placeholder and
    /// means "unset".
    pub fn parse_selection(value: &str) -> Result<Option<TargetFormat>, UnknownFormat> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "webp" => Ok(TargetFormat::Webp),
            "jpeg" => Ok(TargetFormat::Jpeg),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_fixed_stem() {
        assert_eq!(TargetFormat::Webp.file_name("img"), "img.webp");
        assert_eq!(TargetFormat::Jpeg.file_name("img"), "img.jpeg");
        assert_eq!(TargetFormat::Png.file_name("v1.2"), "v1.2.png");
    }

    #[test]
    fn parse_tokens() {
        assert_eq!("png".parse::<TargetFormat>(), Ok(TargetFormat::Png));
        assert_eq!("WEBP".parse::<TargetFormat>(), Ok(TargetFormat::Webp));
        assert_eq!(" jpeg ".parse::<TargetFormat>(), Ok(TargetFormat::Jpeg));
        // only the three listed tokens are accepted
        assert!("jpg".parse::<TargetFormat>().is_err());
        assert!("gif".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn empty_selection_is_unset() {
        assert_eq!(TargetFormat::parse_selection(""), Ok(None));
        assert_eq!(
            TargetFormat::parse_selection("png"),
            Ok(Some(TargetFormat::Png))
        );
        assert!(TargetFormat::parse_selection("tiff").is_err());
    }

    #[test]
    fn serde_uses_lowercase_tokens() {
        let json = serde_json::to_string(&TargetFormat::Webp).unwrap();
        assert_eq!(json, "\"webp\"");
        let back: TargetFormat = serde_json::from_str("\"jpeg\"").unwrap();
        assert_eq!(back, TargetFormat::Jpeg);
    }
}

//! Parsing for CMS image asset identifiers.
//!
//! The content store references uploaded images by an asset id of the form
//! `image-<assetId>-<width>x<height>`, optionally followed by the original
//! file extension (`image-abc123-1600x900-jpg`). Anything else is not an
//! image reference and parses to `None`.

/// Result of parsing `image-abc123-1600x900-jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub asset_id: String,
    pub width: u32,
    pub height: u32,
    /// Original file extension, if the identifier carries one.
    pub extension: Option<String>,
}

/// Parse an image identifier.
///
/// - `"image-abc123-800x600"` → asset_id="abc123", 800x600, no extension
/// - `"image-abc123-800x600-png"` → same, extension="png"
/// - `"foo-bar-baz"` → `None`
/// - `"image-abc123-800"` → `None` (no dimensions)
/// - `"image-abc123-0x600"` → `None` (zero dimension)
pub fn parse_image_ref(id: &str) -> Option<ImageRef> {
    let rest = id.strip_prefix("image-")?;
    let mut parts = rest.split('-');

    let asset_id = parts.next().filter(|s| is_asset_id(s))?;
    let (width, height) = parse_dimensions(parts.next()?)?;
    let extension = match parts.next() {
        Some(ext) if is_extension(ext) => Some(ext.to_string()),
        Some(_) => return None,
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    Some(ImageRef {
        asset_id: asset_id.to_string(),
        width,
        height,
        extension,
    })
}

fn is_asset_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_extension(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn parse_dimensions(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once('x')?;
    if !is_digits(w) || !is_digits(h) {
        return None;
    }
    let width = w.parse::<u32>().ok().filter(|&n| n > 0)?;
    let height = h.parse::<u32>().ok().filter(|&n| n > 0)?;
    Some((width, height))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier() {
        let r = parse_image_ref("image-abc123-800x600").unwrap();
        assert_eq!(r.asset_id, "abc123");
        assert_eq!((r.width, r.height), (800, 600));
        assert_eq!(r.extension, None);
    }

    #[test]
    fn identifier_with_extension() {
        let r = parse_image_ref("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg").unwrap();
        assert_eq!(r.asset_id, "Tb9Ew8CXIwaY6R1kjMvI0uRR");
        assert_eq!((r.width, r.height), (2000, 3000));
        assert_eq!(r.extension.as_deref(), Some("jpg"));
    }

    #[test]
    fn unrelated_string_is_none() {
        assert_eq!(parse_image_ref("foo-bar-baz"), None);
        assert_eq!(parse_image_ref(""), None);
        assert_eq!(parse_image_ref("image-"), None);
    }

    #[test]
    fn file_reference_is_none() {
        assert_eq!(parse_image_ref("file-abc123-pdf"), None);
    }

    #[test]
    fn missing_or_malformed_dimensions() {
        assert_eq!(parse_image_ref("image-abc123"), None);
        assert_eq!(parse_image_ref("image-abc123-800"), None);
        assert_eq!(parse_image_ref("image-abc123-800x"), None);
        assert_eq!(parse_image_ref("image-abc123-x600"), None);
        assert_eq!(parse_image_ref("image-abc123-80ax600"), None);
        assert_eq!(parse_image_ref("image-abc123-+800x600"), None);
    }

    #[test]
    fn zero_dimension_is_none() {
        assert_eq!(parse_image_ref("image-abc123-0x600"), None);
        assert_eq!(parse_image_ref("image-abc123-800x0"), None);
    }

    #[test]
    fn trailing_segments_rejected() {
        assert_eq!(parse_image_ref("image-abc123-800x600-jpg-extra"), None);
        assert_eq!(parse_image_ref("image-abc123-800x600-"), None);
    }

    #[test]
    fn non_alphanumeric_asset_id_rejected() {
        assert_eq!(parse_image_ref("image-ab_c-800x600"), None);
    }
}

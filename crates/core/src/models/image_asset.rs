use serde::{Deserialize, Serialize};

/// A user-selected file as handed over by the UI shell.
///
/// The declared MIME type is whatever the picker reported; it may be empty
/// or wrong. Intrinsic pixel dimensions are not known until the bytes are
/// probed or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Original file name (e.g., "burger.png")
    pub file_name: String,

    /// Declared MIME type (e.g., "image/png"). Empty when unknown.
    pub mime_type: String,

    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// True when the declared type is in the `image/` family.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Pixel width × height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }

    #[must_use]
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    /// width / height. Zero height yields 0.0 rather than infinity.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encoded output format chosen from the input's MIME family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

impl OutputFormat {
    /// Map a declared MIME type to the format we re-encode into.
    /// Anything we cannot encode (webp, heic, bare "image/") becomes JPEG.
    #[must_use]
    pub fn for_mime(mime_type: &str) -> Self {
        let subtype = mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match subtype.as_str() {
            "image/png" => OutputFormat::Png,
            "image/gif" => OutputFormat::Gif,
            "image/bmp" | "image/x-ms-bmp" => OutputFormat::Bmp,
            _ => OutputFormat::Jpeg,
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Bmp => "image/bmp",
        }
    }

    /// File extension including the leading dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => ".jpg",
            OutputFormat::Png => ".png",
            OutputFormat::Gif => ".gif",
            OutputFormat::Bmp => ".bmp",
        }
    }
}

/// An image ready for upload.
///
/// `dimensions` is `None` when the input was passed through untouched
/// (non-image MIME type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub dimensions: Option<Dimensions>,
}

impl NormalizedImage {
    /// Wrap an asset that needs no processing.
    pub fn passthrough(asset: ImageAsset) -> Self {
        Self {
            file_name: asset.file_name,
            mime_type: asset.mime_type,
            bytes: asset.bytes,
            dimensions: None,
        }
    }

    #[must_use]
    pub fn was_reencoded(&self) -> bool {
        self.dimensions.is_some()
    }
}

//! HTML fragments and the home page.

/// Display width of the small presentation, in pixels.
pub const SMALL_WIDTH_PX: u32 = 260;

/// Display width of the big presentation, in pixels.
pub const BIG_WIDTH_PX: u32 = 575;

/// Default `<h1>` of the home page.
pub const DEFAULT_PAGE_TITLE: &str = "Liquor Images";

const MISSING_FRAGMENT: &str = r#"<h2 style="font-family: Roboto,Helvetica Neue,Arial,sans-serif;text-align: center; color: white;font-size: 15px;font-weight: 400;">No image to show</h2>"#;

/// Presentation size of an image fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Big,
}

impl ImageSize {
    pub fn width_px(self) -> u32 {
        match self {
            ImageSize::Small => SMALL_WIDTH_PX,
            ImageSize::Big => BIG_WIDTH_PX,
        }
    }
}

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Path of the download route for an image.
///
/// Both names are percent-encoded as single path segments, so a name
/// containing `/` or `?` cannot change the route it points at.
pub fn download_path(bucket: &str, image: &str) -> String {
    format!(
        "/download_image/{}/{}",
        urlencoding::encode(bucket),
        urlencoding::encode(image)
    )
}

/// Renders the gateway's HTML.
#[derive(Debug, Clone)]
pub struct PresentationRenderer {
    page_title: String,
}

impl Default for PresentationRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_TITLE)
    }
}

impl PresentationRenderer {
    pub fn new(page_title: impl Into<String>) -> Self {
        Self {
            page_title: page_title.into(),
        }
    }

    /// Fragment shown when a bucket has no recorded image.
    pub fn render_missing(&self) -> String {
        MISSING_FRAGMENT.to_string()
    }

    /// `<img>` fragment pointing at the download route.
    pub fn render_image(&self, size: ImageSize, bucket: &str, image: &str) -> String {
        format!(
            r#"<img src="{}" style="width:{}px;">"#,
            html_escape(&download_path(bucket, image)),
            size.width_px()
        )
    }

    /// Full page embedding the three bucket fragments.
    ///
    /// Fragments are inserted as-is; they must come from this renderer.
    pub fn render_home(&self, uploaded: &str, processed: &str, anonymized: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body>

<h1>{title}</h1>
<h2>Last Uploaded Image</h2>
{uploaded}
<h2>Last Processed Image</h2>
{processed}
<h2>Last Anonymized Image</h2>
{anonymized}
</body>
</html>
"#,
            title = html_escape(&self.page_title),
        )
    }
}

//! Data structures and types for LiveSitter
//!
//! Contains the shared models used across the application organized by domain:
//! - **Geometry**: pixel points, extents and the container clamp rule
//! - **Overlays**: caption and logo layers drawn above the video
//! - **Wire**: element shapes exchanged with the overlay backend
//! - **Edits**: direct field edits coming from the settings form

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Font size used when a stored caption carries none
pub const DEFAULT_FONT_SIZE: f64 = 22.0;

/// Opacity of freshly created overlays
pub const DEFAULT_OPACITY: f64 = 0.8;

/// Glyph width as a fraction of the font size (rough, not real metrics)
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Line height as a multiple of the font size
const LINE_HEIGHT_RATIO: f64 = 1.2;

// =============================================================================
// Geometry
// =============================================================================

/// A position in container pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`
    pub fn offset_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `1280x500`)
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        let width: f64 = w.trim().parse().ok()?;
        let height: f64 = h.trim().parse().ok()?;
        if width < 0.0 || height < 0.0 {
            return None;
        }
        Some(Self::new(width, height))
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Clamp a candidate top-left so that an element of `element` size stays
/// inside `container`.
///
/// When the element is larger than the container on an axis, that axis is
/// pinned to 0.
pub fn clamp_position(candidate: Point, element: Extent, container: Extent) -> Point {
    let max_x = container.width - element.width;
    let max_y = container.height - element.height;
    Point {
        x: candidate.x.min(max_x).max(0.0),
        y: candidate.y.min(max_y).max(0.0),
    }
}

// =============================================================================
// Overlay Models
// =============================================================================

/// Text caption drawn over the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionOverlay {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    /// Not range-checked; whatever the user typed is kept
    pub opacity: f64,
}

impl Default for CaptionOverlay {
    fn default() -> Self {
        Self {
            text: "Live".to_string(),
            x: 100.0,
            y: 50.0,
            font_size: DEFAULT_FONT_SIZE,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl CaptionOverlay {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Approximate bounding box: `chars × size × 0.6` by `size × 1.2`
    pub fn footprint(&self) -> Extent {
        Self::footprint_for(&self.text, self.font_size)
    }

    fn footprint_for(text: &str, font_size: f64) -> Extent {
        let chars = text.chars().count() as f64;
        Extent::new(
            chars * font_size * GLYPH_WIDTH_RATIO,
            font_size * LINE_HEIGHT_RATIO,
        )
    }
}

/// Image logo drawn over the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoOverlay {
    pub image_url: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
}

impl Default for LogoOverlay {
    fn default() -> Self {
        Self {
            image_url: String::new(),
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 100.0,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl LogoOverlay {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn footprint(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// A logo without an image is neither drawn nor draggable
    pub fn is_visible(&self) -> bool {
        !self.image_url.is_empty()
    }
}

/// The overlay model: exactly one caption and one logo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlaySet {
    pub caption: CaptionOverlay,
    pub logo: LogoOverlay,
}

impl OverlaySet {
    pub fn new(caption: CaptionOverlay, logo: LogoOverlay) -> Self {
        Self { caption, logo }
    }

    /// Clamp both elements into `container`
    pub fn clamp_into(&mut self, container: Extent) {
        let caption =
            clamp_position(self.caption.position(), self.caption.footprint(), container);
        self.caption.set_position(caption);
        let logo = clamp_position(self.logo.position(), self.logo.footprint(), container);
        self.logo.set_position(logo);
    }

    /// Encode as the two wire elements, caption first
    pub fn to_elements(&self) -> [OverlayElement; 2] {
        [
            OverlayElement::Text {
                context: self.caption.text.clone(),
                position: self.caption.position(),
                font_size: Some(self.caption.font_size),
                opacity: self.caption.opacity,
            },
            OverlayElement::Logo {
                content: self.logo.image_url.clone(),
                position: self.logo.position(),
                size: self.logo.footprint(),
                opacity: self.logo.opacity,
            },
        ]
    }

    /// Decode a stored element list.
    ///
    /// The list must hold exactly one `Text` and one `Logo`, in any order.
    pub fn from_elements(elements: Vec<OverlayElement>) -> Result<Self, MalformedRecord> {
        let found = elements.len();
        if found != 2 {
            return Err(MalformedRecord { found });
        }

        let mut caption = None;
        let mut logo = None;
        for element in elements {
            match element {
                OverlayElement::Text {
                    context,
                    position,
                    font_size,
                    opacity,
                } if caption.is_none() => {
                    caption = Some(CaptionOverlay {
                        text: context,
                        x: position.x,
                        y: position.y,
                        font_size: font_size.unwrap_or(DEFAULT_FONT_SIZE),
                        opacity,
                    });
                }
                OverlayElement::Logo {
                    content,
                    position,
                    size,
                    opacity,
                } if logo.is_none() => {
                    logo = Some(LogoOverlay {
                        image_url: content,
                        x: position.x,
                        y: position.y,
                        width: size.width,
                        height: size.height,
                        opacity,
                    });
                }
                _ => return Err(MalformedRecord { found }),
            }
        }

        match (caption, logo) {
            (Some(caption), Some(logo)) => Ok(Self { caption, logo }),
            _ => Err(MalformedRecord { found }),
        }
    }
}

/// A stored element list that is not exactly one caption plus one logo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected one Text and one Logo element, found {found} elements")]
pub struct MalformedRecord {
    pub found: usize,
}

/// Persisted overlay record, keyed by user on the backend
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayRecord {
    pub rtsp_url: String,
    pub hls_url: String,
    pub overlays: OverlaySet,
}

// =============================================================================
// Wire Models
// =============================================================================

/// One overlay element as exchanged with the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OverlayElement {
    Text {
        context: String,
        position: Point,
        #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        opacity: f64,
    },
    Logo {
        content: String,
        position: Point,
        size: Extent,
        opacity: f64,
    },
}

// =============================================================================
// Field Edits
// =============================================================================

/// Editable fields of the overlay settings form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayField {
    CaptionText,
    CaptionX,
    CaptionY,
    CaptionFontSize,
    CaptionOpacity,
    LogoUrl,
    LogoX,
    LogoY,
    LogoWidth,
    LogoHeight,
    LogoOpacity,
}

impl OverlayField {
    /// All fields in form order
    pub const ALL: [OverlayField; 11] = [
        OverlayField::CaptionText,
        OverlayField::CaptionX,
        OverlayField::CaptionY,
        OverlayField::CaptionFontSize,
        OverlayField::CaptionOpacity,
        OverlayField::LogoUrl,
        OverlayField::LogoX,
        OverlayField::LogoY,
        OverlayField::LogoWidth,
        OverlayField::LogoHeight,
        OverlayField::LogoOpacity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OverlayField::CaptionText => "Text",
            OverlayField::CaptionX | OverlayField::LogoX => "X",
            OverlayField::CaptionY | OverlayField::LogoY => "Y",
            OverlayField::CaptionFontSize => "Font Size",
            OverlayField::CaptionOpacity | OverlayField::LogoOpacity => "Opacity",
            OverlayField::LogoUrl => "Logo Url",
            OverlayField::LogoWidth => "Width",
            OverlayField::LogoHeight => "Height",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, OverlayField::CaptionText | OverlayField::LogoUrl)
    }

    pub fn is_caption(&self) -> bool {
        matches!(
            self,
            OverlayField::CaptionText
                | OverlayField::CaptionX
                | OverlayField::CaptionY
                | OverlayField::CaptionFontSize
                | OverlayField::CaptionOpacity
        )
    }
}

/// Rejected field edit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

impl OverlaySet {
    /// Current value of a field, formatted for the edit buffer
    pub fn field_value(&self, field: OverlayField) -> String {
        match field {
            OverlayField::CaptionText => self.caption.text.clone(),
            OverlayField::CaptionX => format_number(self.caption.x),
            OverlayField::CaptionY => format_number(self.caption.y),
            OverlayField::CaptionFontSize => format_number(self.caption.font_size),
            OverlayField::CaptionOpacity => format_number(self.caption.opacity),
            OverlayField::LogoUrl => self.logo.image_url.clone(),
            OverlayField::LogoX => format_number(self.logo.x),
            OverlayField::LogoY => format_number(self.logo.y),
            OverlayField::LogoWidth => format_number(self.logo.width),
            OverlayField::LogoHeight => format_number(self.logo.height),
            OverlayField::LogoOpacity => format_number(self.logo.opacity),
        }
    }

    /// Apply a raw form value to one field.
    ///
    /// X/Y edits clamp only their own axis. Size edits re-clamp both axes with
    /// the new footprint. Opacity is stored as typed. Without a container the
    /// position is stored unclamped.
    pub fn apply_field(
        &mut self,
        field: OverlayField,
        raw: &str,
        container: Option<Extent>,
    ) -> Result<(), FieldError> {
        if !field.is_numeric() {
            match field {
                OverlayField::CaptionText => self.caption.text = raw.to_string(),
                _ => self.logo.image_url = raw.to_string(),
            }
            return Ok(());
        }

        // inf and NaN parse but cannot be stored as JSON numbers
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FieldError::NotANumber {
                field: field.label(),
                value: raw.to_string(),
            })?;

        let clamp = |candidate: Point, element: Extent| match container {
            Some(c) => clamp_position(candidate, element, c),
            None => candidate,
        };

        match field {
            OverlayField::CaptionX => {
                let p = clamp(Point::new(value, self.caption.y), self.caption.footprint());
                self.caption.x = p.x;
            }
            OverlayField::CaptionY => {
                let p = clamp(Point::new(self.caption.x, value), self.caption.footprint());
                self.caption.y = p.y;
            }
            OverlayField::CaptionFontSize => {
                self.caption.font_size = value;
                let p = clamp(self.caption.position(), self.caption.footprint());
                self.caption.set_position(p);
            }
            OverlayField::CaptionOpacity => self.caption.opacity = value,
            OverlayField::LogoX => {
                let p = clamp(Point::new(value, self.logo.y), self.logo.footprint());
                self.logo.x = p.x;
            }
            OverlayField::LogoY => {
                let p = clamp(Point::new(self.logo.x, value), self.logo.footprint());
                self.logo.y = p.y;
            }
            OverlayField::LogoWidth => {
                self.logo.width = value;
                let p = clamp(self.logo.position(), self.logo.footprint());
                self.logo.set_position(p);
            }
            OverlayField::LogoHeight => {
                self.logo.height = value;
                let p = clamp(self.logo.position(), self.logo.footprint());
                self.logo.set_position(p);
            }
            OverlayField::LogoOpacity => self.logo.opacity = value,
            OverlayField::CaptionText | OverlayField::LogoUrl => {}
        }
        Ok(())
    }
}

/// Format a number without a trailing `.0` for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Print attributes handed to a [`DocumentProvider`](crate::DocumentProvider)
//! during the layout phase.
//!
//! Dimensions are expressed in mils (thousandths of an inch), the unit the
//! provider protocol uses throughout.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Mils per millimetre.
const MILS_PER_MM: f32 = 39.3701;

/// A named paper size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSize {
    pub id: Cow<'static, str>,
    pub label: Cow<'static, str>,
    pub width_mils: u32,
    pub height_mils: u32,
}

impl MediaSize {
    pub const ISO_A3: MediaSize = MediaSize::named("ISO_A3", "A3", 11690, 16540);
    pub const ISO_A4: MediaSize = MediaSize::named("ISO_A4", "A4", 8270, 11690);
    pub const ISO_A5: MediaSize = MediaSize::named("ISO_A5", "A5", 5830, 8270);
    pub const NA_LETTER: MediaSize = MediaSize::named("NA_LETTER", "Letter", 8500, 11000);
    pub const NA_LEGAL: MediaSize = MediaSize::named("NA_LEGAL", "Legal", 8500, 14000);

    const fn named(id: &'static str, label: &'static str, width_mils: u32, height_mils: u32) -> Self {
        Self {
            id: Cow::Borrowed(id),
            label: Cow::Borrowed(label),
            width_mils,
            height_mils,
        }
    }

    /// Creates a custom media size.
    pub fn custom(id: impl Into<String>, label: impl Into<String>, width_mils: u32, height_mils: u32) -> Self {
        Self {
            id: Cow::Owned(id.into()),
            label: Cow::Owned(label.into()),
            width_mils,
            height_mils,
        }
    }

    /// Looks up one of the predefined sizes by id (`"ISO_A4"`) or label (`"A4"`),
    /// ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::ISO_A3,
            Self::ISO_A4,
            Self::ISO_A5,
            Self::NA_LETTER,
            Self::NA_LEGAL,
        ]
        .into_iter()
        .find(|size| size.id.eq_ignore_ascii_case(name) || size.label.eq_ignore_ascii_case(name))
    }

    pub fn is_portrait(&self) -> bool {
        self.width_mils <= self.height_mils
    }

    /// Returns this size with the long edge horizontal.
    pub fn as_landscape(&self) -> Self {
        if self.is_portrait() && self.width_mils != self.height_mils {
            self.swapped()
        } else {
            self.clone()
        }
    }

    /// Returns this size with the long edge vertical.
    pub fn as_portrait(&self) -> Self {
        if self.is_portrait() { self.clone() } else { self.swapped() }
    }

    fn swapped(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            width_mils: self.height_mils,
            height_mils: self.width_mils,
        }
    }
}

impl Default for MediaSize {
    fn default() -> Self {
        Self::ISO_A4
    }
}

/// Page margins in mils.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margins {
    pub left_mils: u32,
    pub top_mils: u32,
    pub right_mils: u32,
    pub bottom_mils: u32,
}

impl Margins {
    pub const NO_MARGINS: Margins = Margins {
        left_mils: 0,
        top_mils: 0,
        right_mils: 0,
        bottom_mils: 0,
    };

    pub fn new(left_mils: u32, top_mils: u32, right_mils: u32, bottom_mils: u32) -> Self {
        Self { left_mils, top_mils, right_mils, bottom_mils }
    }

    /// Converts millimetre margins to mils, truncating toward zero.
    /// Negative inputs clamp to zero.
    pub fn from_millimeters(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let to_mils = |mm: f32| (mm * MILS_PER_MM) as u32;
        Self::new(to_mils(left), to_mils(top), to_mils(right), to_mils(bottom))
    }
}

/// Output resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: Cow<'static, str>,
    pub label: Cow<'static, str>,
    pub horizontal_dpi: u32,
    pub vertical_dpi: u32,
}

impl Resolution {
    /// A square resolution suitable for PDF output.
    pub fn pdf(dpi: u32) -> Self {
        Self {
            id: Cow::Borrowed("pdf"),
            label: Cow::Borrowed("pdf"),
            horizontal_dpi: dpi,
            vertical_dpi: dpi,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::pdf(600)
    }
}

/// The render options passed through to the provider's layout phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintAttributes {
    pub media_size: MediaSize,
    pub resolution: Resolution,
    pub min_margins: Margins,
}

impl PrintAttributes {
    pub fn new(media_size: MediaSize, resolution: Resolution, min_margins: Margins) -> Self {
        Self { media_size, resolution, min_margins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_swaps_portrait_dimensions() {
        let landscape = MediaSize::ISO_A4.as_landscape();
        assert_eq!(landscape.width_mils, 11690);
        assert_eq!(landscape.height_mils, 8270);
        assert!(!landscape.is_portrait());
        assert_eq!(landscape.id, "ISO_A4");
    }

    #[test]
    fn test_landscape_is_idempotent() {
        let once = MediaSize::NA_LETTER.as_landscape();
        assert_eq!(once.as_landscape(), once);
        assert_eq!(once.as_portrait(), MediaSize::NA_LETTER);
    }

    #[test]
    fn test_square_media_stays_put() {
        let square = MediaSize::custom("SQ", "Square", 5000, 5000);
        assert_eq!(square.as_landscape(), square);
        assert!(square.is_portrait());
    }

    #[test]
    fn test_margins_from_millimeters_truncates() {
        let margins = Margins::from_millimeters(10.0, 0.0, 2.0, 1.0);
        assert_eq!(margins.left_mils, 393);
        assert_eq!(margins.top_mils, 0);
        assert_eq!(margins.right_mils, 78);
        assert_eq!(margins.bottom_mils, 39);
    }

    #[test]
    fn test_negative_margins_clamp_to_zero() {
        let margins = Margins::from_millimeters(-5.0, -1.0, 0.0, 0.0);
        assert_eq!(margins, Margins::NO_MARGINS);
    }

    #[test]
    fn test_media_size_lookup() {
        assert_eq!(MediaSize::from_name("a4"), Some(MediaSize::ISO_A4));
        assert_eq!(MediaSize::from_name("NA_LETTER"), Some(MediaSize::NA_LETTER));
        assert_eq!(MediaSize::from_name("tabloid"), None);
    }

    #[test]
    fn test_attributes_deserialize_with_defaults() {
        let attrs: PrintAttributes = serde_json::from_str(
            r#"{ "resolution": { "id": "pdf", "label": "pdf", "horizontalDpi": 300, "verticalDpi": 300 } }"#,
        )
        .unwrap();
        assert_eq!(attrs.media_size, MediaSize::ISO_A4);
        assert_eq!(attrs.resolution, Resolution::pdf(300));
        assert_eq!(attrs.min_margins, Margins::NO_MARGINS);
    }
}

//! Displayed dimensions and the orientation classifier.
//!
//! Classification is a pure function of [`Dimensions`]: it never touches the
//! file system, so it can be tested without any media fixtures.

use std::fmt;

/// Width and height of a file as it is displayed, after any rotation recorded
/// by the capture device has been applied. Both sides are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Returns `None` when either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions with width and height exchanged.
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Displayed aspect of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Square,
    Portrait,
    Landscape,
}

impl Orientation {
    /// All orientations, in folder listing order.
    pub const ALL: [Orientation; 3] = [
        Orientation::Square,
        Orientation::Portrait,
        Orientation::Landscape,
    ];

    /// Classifies displayed dimensions.
    ///
    /// Equal sides are always `Square`, however large the image; there is no
    /// near-square tolerance.
    ///
    /// # Examples
    ///
    /// ```
    /// use orisort::orientation::{Dimensions, Orientation};
    ///
    /// let dims = Dimensions::new(3000, 4000).unwrap();
    /// assert_eq!(Orientation::classify(dims), Orientation::Portrait);
    /// assert_eq!(Orientation::classify(dims.swapped()), Orientation::Landscape);
    /// ```
    pub fn classify(dimensions: Dimensions) -> Self {
        let (w, h) = (dimensions.width(), dimensions.height());
        if w == h {
            Orientation::Square
        } else if h > w {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Folder name prefix for this orientation.
    pub fn label(&self) -> &'static str {
        match self {
            Orientation::Square => "Square",
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(Dimensions::new(0, 10).is_none());
        assert!(Dimensions::new(10, 0).is_none());
        assert!(Dimensions::new(0, 0).is_none());
    }

    #[test]
    fn test_equal_sides_are_square() {
        for side in [1, 2, 999, 4000, u32::MAX] {
            assert_eq!(Orientation::classify(dims(side, side)), Orientation::Square);
        }
    }

    #[test]
    fn test_taller_is_portrait() {
        for (w, h) in [(1, 2), (3000, 4000), (1080, 1920), (4000, 4001)] {
            assert_eq!(Orientation::classify(dims(w, h)), Orientation::Portrait);
        }
    }

    #[test]
    fn test_wider_is_landscape() {
        for (w, h) in [(2, 1), (4000, 3000), (1920, 1080), (4001, 4000)] {
            assert_eq!(Orientation::classify(dims(w, h)), Orientation::Landscape);
        }
    }

    #[test]
    fn test_near_square_is_not_square() {
        // 2% wider than tall still counts as landscape
        assert_eq!(Orientation::classify(dims(1020, 1000)), Orientation::Landscape);
    }

    #[test]
    fn test_swapped() {
        let d = dims(4000, 3000).swapped();
        assert_eq!((d.width(), d.height()), (3000, 4000));
        assert_eq!(d.to_string(), "3000x4000");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Orientation::Square.label(), "Square");
        assert_eq!(Orientation::Portrait.to_string(), "Portrait");
        assert_eq!(Orientation::Landscape.label(), "Landscape");
    }
}

//! Sentinel-bearing lengths, sizes and requirements used during measurement.
//!
//! A [`MeasureLength`] is either unspecified or a concrete non-negative length. What
//! “unspecified” means depends on where it’s used: as a maximum it reads as unbounded, as a
//! minimum it reads as zero, and as a preferred size it means “no preference.”

use crate::rect::Size;
use core::fmt;

/// A length that may be left unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MeasureLength {
    #[default]
    Unspecified,
    Length(f64),
}

impl MeasureLength {
    /// Creates a specified length.
    ///
    /// # Panics
    /// Panics if the length is negative or NaN.
    pub fn new(length: f64) -> MeasureLength {
        assert!(length >= 0., "measure length must be non-negative, got {}", length);
        MeasureLength::Length(length)
    }

    pub fn is_specified(self) -> bool {
        matches!(self, MeasureLength::Length(_))
    }

    /// Returns the length, or the given value if unspecified.
    pub fn length_or(self, value: f64) -> f64 {
        match self {
            MeasureLength::Length(length) => length,
            MeasureLength::Unspecified => value,
        }
    }

    /// Reads an unspecified length as unbounded.
    pub fn length_or_max(self) -> f64 {
        self.length_or(f64::INFINITY)
    }

    /// Reads an unspecified length as zero.
    pub fn length_or_zero(self) -> f64 {
        self.length_or(0.)
    }

    /// Returns self if specified, otherwise `other`.
    pub fn or(self, other: MeasureLength) -> MeasureLength {
        if self.is_specified() {
            self
        } else {
            other
        }
    }

    /// Returns `other` if it is specified, otherwise self.
    pub fn override_by(self, other: MeasureLength) -> MeasureLength {
        other.or(self)
    }

    /// The smaller of two lengths; an unspecified side yields the other side.
    pub fn min(self, other: MeasureLength) -> MeasureLength {
        match (self, other) {
            (MeasureLength::Length(a), MeasureLength::Length(b)) => MeasureLength::Length(a.min(b)),
            (MeasureLength::Unspecified, other) => other,
            (this, MeasureLength::Unspecified) => this,
        }
    }

    /// The larger of two lengths; an unspecified side yields the other side.
    pub fn max(self, other: MeasureLength) -> MeasureLength {
        match (self, other) {
            (MeasureLength::Length(a), MeasureLength::Length(b)) => MeasureLength::Length(a.max(b)),
            (MeasureLength::Unspecified, other) => other,
            (this, MeasureLength::Unspecified) => this,
        }
    }

    /// Adds to a specified length; unspecified stays unspecified.
    pub fn plus(self, length: f64) -> MeasureLength {
        match self {
            MeasureLength::Length(l) => MeasureLength::Length((l + length).max(0.)),
            MeasureLength::Unspecified => MeasureLength::Unspecified,
        }
    }

    /// Subtracts from a specified length, never going below zero.
    pub fn minus(self, length: f64) -> MeasureLength {
        match self {
            MeasureLength::Length(l) => MeasureLength::Length((l - length).max(0.)),
            MeasureLength::Unspecified => MeasureLength::Unspecified,
        }
    }
}

impl From<f64> for MeasureLength {
    fn from(length: f64) -> Self {
        MeasureLength::new(length)
    }
}

impl fmt::Display for MeasureLength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeasureLength::Length(length) => write!(f, "{}", length),
            MeasureLength::Unspecified => write!(f, "UNSPECIFIED"),
        }
    }
}

/// A pair of measure lengths.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasureSize {
    pub width: MeasureLength,
    pub height: MeasureLength,
}

impl MeasureSize {
    pub fn new(width: MeasureLength, height: MeasureLength) -> MeasureSize {
        MeasureSize { width, height }
    }

    pub fn unspecified() -> MeasureSize {
        MeasureSize::default()
    }

    /// Unspecified components read as unbounded.
    pub fn size_or_max(&self) -> Size {
        Size::new(self.width.length_or_max(), self.height.length_or_max())
    }

    /// Unspecified components read as zero.
    pub fn size_or_zero(&self) -> Size {
        Size::new(self.width.length_or_zero(), self.height.length_or_zero())
    }

    pub fn or(&self, other: MeasureSize) -> MeasureSize {
        MeasureSize::new(self.width.or(other.width), self.height.or(other.height))
    }

    pub fn override_by(&self, other: MeasureSize) -> MeasureSize {
        MeasureSize::new(
            self.width.override_by(other.width),
            self.height.override_by(other.height),
        )
    }

    pub fn min(&self, other: MeasureSize) -> MeasureSize {
        MeasureSize::new(self.width.min(other.width), self.height.min(other.height))
    }

    pub fn max(&self, other: MeasureSize) -> MeasureSize {
        MeasureSize::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub fn plus(&self, size: Size) -> MeasureSize {
        MeasureSize::new(self.width.plus(size.x), self.height.plus(size.y))
    }

    pub fn minus(&self, size: Size) -> MeasureSize {
        MeasureSize::new(self.width.minus(size.x), self.height.minus(size.y))
    }
}

impl From<Size> for MeasureSize {
    fn from(size: Size) -> Self {
        MeasureSize::new(size.x.max(0.).into(), size.y.max(0.).into())
    }
}

impl fmt::Display for MeasureSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.width, self.height)
    }
}

/// Error returned when constructing an invalid [`MeasureRequirement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureError {
    /// The maximum width is smaller than the minimum width.
    WidthRange { max: f64, min: f64 },
    /// The maximum height is smaller than the minimum height.
    HeightRange { max: f64, min: f64 },
}

impl fmt::Display for MeasureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeasureError::WidthRange { max, min } => {
                write!(f, "max width {} is smaller than min width {}", max, min)
            }
            MeasureError::HeightRange { max, min } => {
                write!(f, "max height {} is smaller than min height {}", max, min)
            }
        }
    }
}

impl std::error::Error for MeasureError {}

/// Size constraints passed down during measurement.
///
/// Invariant: wherever both are specified, `max >= min` component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasureRequirement {
    pub max: MeasureSize,
    pub min: MeasureSize,
    pub suggest: MeasureSize,
}

impl MeasureRequirement {
    /// Creates a requirement; the suggested size is coerced into the range.
    ///
    /// # Panics
    /// Panics if max is smaller than min. Use [`MeasureRequirement::try_new`] to handle this.
    pub fn new(max: MeasureSize, min: MeasureSize, suggest: MeasureSize) -> MeasureRequirement {
        match MeasureRequirement::try_new(max, min, suggest) {
            Ok(requirement) => requirement,
            Err(err) => panic!("invalid measure requirement: {}", err),
        }
    }

    pub fn try_new(
        max: MeasureSize,
        min: MeasureSize,
        suggest: MeasureSize,
    ) -> Result<MeasureRequirement, MeasureError> {
        if max.width.length_or_max() < min.width.length_or_zero() {
            return Err(MeasureError::WidthRange {
                max: max.width.length_or_max(),
                min: min.width.length_or_zero(),
            });
        }
        if max.height.length_or_max() < min.height.length_or_zero() {
            return Err(MeasureError::HeightRange {
                max: max.height.length_or_max(),
                min: min.height.length_or_zero(),
            });
        }

        let mut requirement = MeasureRequirement {
            max,
            min,
            suggest: MeasureSize::unspecified(),
        };
        requirement.suggest = requirement.coerce_measure(suggest);
        Ok(requirement)
    }

    /// No constraints at all.
    pub fn unbounded() -> MeasureRequirement {
        MeasureRequirement::default()
    }

    /// Only an upper bound.
    pub fn at_most(max: MeasureSize) -> MeasureRequirement {
        MeasureRequirement::new(max, MeasureSize::unspecified(), MeasureSize::unspecified())
    }

    /// Forces exactly the given size.
    pub fn exact(size: Size) -> MeasureRequirement {
        let size = MeasureSize::from(size);
        MeasureRequirement::new(size, size, MeasureSize::unspecified())
    }

    /// Returns true if the size lies within the bounds.
    pub fn satisfies(&self, size: Size) -> bool {
        self.max.width.length_or_max() >= size.x
            && self.max.height.length_or_max() >= size.y
            && self.min.width.length_or_zero() <= size.x
            && self.min.height.length_or_zero() <= size.y
    }

    /// `max.min(min.max(size))`, never negative.
    pub fn coerce(&self, size: Size) -> Size {
        Size::new(
            coerce_length(size.x, self.min.width, self.max.width),
            coerce_length(size.y, self.min.height, self.max.height),
        )
    }

    /// Coerces the specified components of a measure size; unspecified ones stay unspecified.
    pub fn coerce_measure(&self, size: MeasureSize) -> MeasureSize {
        let coerce = |length: MeasureLength, min: MeasureLength, max: MeasureLength| match length
        {
            MeasureLength::Length(l) => MeasureLength::Length(coerce_length(l, min, max)),
            MeasureLength::Unspecified => MeasureLength::Unspecified,
        };
        MeasureSize::new(
            coerce(size.width, self.min.width, self.max.width),
            coerce(size.height, self.min.height, self.max.height),
        )
    }

    /// Grows the size up to the suggested size, then coerces it.
    pub fn expand_to_suggest_and_coerce(&self, size: Size) -> Size {
        self.coerce(Size::new(
            size.x.max(self.suggest.width.length_or_zero()),
            size.y.max(self.suggest.height.length_or_zero()),
        ))
    }

    /// Subtracts a size from all three bounds.
    pub fn minus(&self, size: Size) -> MeasureRequirement {
        MeasureRequirement {
            max: self.max.minus(size),
            min: self.min.minus(size),
            suggest: self.suggest.minus(size),
        }
    }

    /// Narrows this requirement by another one.
    ///
    /// The result’s suggested size is the other’s one where it specifies one. If the bounds
    /// conflict, the minimum gives way to the maximum.
    pub fn merge(&self, other: &MeasureRequirement) -> MeasureRequirement {
        let mut merged = MeasureRequirement {
            max: self.max.min(other.max),
            min: self.min.max(other.min),
            suggest: self.suggest.override_by(other.suggest),
        };

        if merged.min.width.length_or_zero() > merged.max.width.length_or_max() {
            log::warn!(
                target: "perch::measure",
                "merged requirement has min width {} above max width {}; using max",
                merged.min.width,
                merged.max.width
            );
            merged.min.width = merged.max.width;
        }
        if merged.min.height.length_or_zero() > merged.max.height.length_or_max() {
            log::warn!(
                target: "perch::measure",
                "merged requirement has min height {} above max height {}; using max",
                merged.min.height,
                merged.max.height
            );
            merged.min.height = merged.max.height;
        }
        merged.suggest = merged.coerce_measure(merged.suggest);
        merged
    }
}

impl fmt::Display for MeasureRequirement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(min: {}, max: {}, suggest: {})",
            self.min, self.max, self.suggest
        )
    }
}

fn coerce_length(length: f64, min: MeasureLength, max: MeasureLength) -> f64 {
    length
        .max(min.length_or_zero())
        .min(max.length_or_max())
        .max(0.)
}

use std::fmt;

/// How strongly the evidence supports a suggested grid size.
///
/// Ordered from weakest to strongest, so `Confidence::High > Confidence::Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(label)
    }
}

/// A suggested row/column split, with a label and a human-readable reason.
///
/// # Example
/// ```
/// use gridslice::{Confidence, GridSuggestion};
///
/// let suggestion = GridSuggestion::new(3, 4, Confidence::High, "16:9 landscape image");
/// assert_eq!(suggestion.cell_count(), 12);
/// assert_eq!(suggestion.to_string(), "3×4 (high): 16:9 landscape image");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSuggestion {
    pub rows: u32,
    pub cols: u32,
    pub confidence: Confidence,
    pub reason: String,
}

impl GridSuggestion {
    /// Creates a suggestion. Zero counts are raised to 1.
    pub fn new(rows: u32, cols: u32, confidence: Confidence, reason: impl Into<String>) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            confidence,
            reason: reason.into(),
        }
    }

    /// Number of cells in the suggested grid.
    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Keeps whichever suggestion has the higher confidence, `self` on a tie.
    ///
    /// ```
    /// use gridslice::{Confidence, GridSuggestion};
    ///
    /// let detected = GridSuggestion::new(5, 5, Confidence::High, "detected");
    /// let guessed = GridSuggestion::new(3, 4, Confidence::Low, "guessed");
    /// assert_eq!(guessed.prefer(detected.clone()), detected);
    /// ```
    pub fn prefer(self, other: GridSuggestion) -> GridSuggestion {
        if other.confidence > self.confidence {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for GridSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}×{} ({}): {}",
            self.rows, self.cols, self.confidence, self.reason
        )
    }
}

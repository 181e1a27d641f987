//! Terminal histogram of focal-length usage.

use crate::core::analysis::FocalLengthTable;

/// Renders a [`FocalLengthTable`] as horizontal bars:
///
/// ```text
///     24mm █████████░░░░░░░░░░░    12  (30.0%)
///     50mm ████████████████████    27  (67.5%)
/// ```
pub struct HistogramRenderer {
    /// Characters in the longest bar
    width: usize,
}

impl HistogramRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    /// One line per focal length, ascending. Bars scale to the most used
    /// focal length; any non-zero count gets at least one block.
    pub fn render(&self, table: &FocalLengthTable) -> String {
        if table.is_empty() {
            return "No focal length data.\n".to_string();
        }

        let max = table.max_count();
        let total = table.total();
        let label_width = table
            .iter()
            .map(|(fl, _)| fl.to_string().len())
            .max()
            .unwrap_or(0);
        let count_width = max.to_string().len();

        let mut output = String::new();
        for (focal_length, count) in table.iter() {
            let filled = self.bar_length(count, max);
            output.push_str(&format!(
                "  {:>label$} {}{}  {:>count$}  ({:.1}%)\n",
                focal_length.to_string(),
                "█".repeat(filled),
                "░".repeat(self.width - filled),
                count,
                count as f64 / total as f64 * 100.0,
                label = label_width,
                count = count_width,
            ));
        }
        output
    }

    fn bar_length(&self, count: usize, max: usize) -> usize {
        if count == 0 || max == 0 {
            return 0;
        }
        let scaled = (count as f64 / max as f64 * self.width as f64).round() as usize;
        scaled.clamp(1, self.width)
    }
}

impl Default for HistogramRenderer {
    fn default() -> Self {
        Self::new(40)
    }
}

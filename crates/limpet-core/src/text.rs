use crate::RenderConfig;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, config: &RenderConfig) -> TextMetrics;
}

/// Column-count based measurement; stable across platforms and fonts.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer;

impl DeterministicTextMeasurer {
    pub fn normalized_text_lines(text: &str) -> Vec<&str> {
        let out = text.split('\n').collect::<Vec<_>>();
        if out.is_empty() {
            return vec![""];
        }
        out
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, config: &RenderConfig) -> TextMetrics {
        if text.is_empty() {
            return TextMetrics {
                width: 0.0,
                height: 0.0,
                line_count: 0,
            };
        }
        let lines = Self::normalized_text_lines(text);
        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: config.ems(columns as f64 * config.char_width),
            height: config.ems(lines.len() as f64 * config.line_height),
            line_count: lines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_display_columns_of_the_longest_line() {
        let cfg = RenderConfig::default();
        let m = DeterministicTextMeasurer.measure("ab\nabcd", &cfg);
        assert_eq!(m.line_count, 2);
        assert!((m.width - 4.0 * 0.6 * 13.0).abs() < 1e-9);
        assert!((m.height - 2.0 * 1.2 * 13.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_has_no_extent() {
        let m = DeterministicTextMeasurer.measure("", &RenderConfig::default());
        assert_eq!(m.width, 0.0);
        assert_eq!(m.line_count, 0);
    }
}

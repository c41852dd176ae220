//! Static font metrics for the card face font (Helvetica-Bold, PDF base-14).
//!
//! Character widths are in em units (relative to font size), taken from the Adobe
//! AFM for Helvetica-Bold. Base-14 fonts are not embedded, so the viewer's metrics
//! match these and centering is exact for the WinAnsi range.
//! The table covers ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use crate::render::PageSettings;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Helvetica-Bold cap height, in em.
pub const CAP_HEIGHT_EM: f64 = 0.718;

/// Fallback width for characters outside the table.
const AVERAGE_CHAR_WIDTH: f64 = 0.611;

/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [f64; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0      1      2      3      4      5      6      7      8      9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
    // {      |      }      ~
    0.389, 0.280, 0.389, 0.584,
];

/// Measures the rendered width of a string in em units.
///
/// Non-ASCII characters fall back to the average width.
pub fn measure_str(s: &str) -> f64 {
    s.chars()
        .map(|c| {
            let code = c as usize;
            if (32..=126).contains(&code) {
                HELVETICA_BOLD_WIDTHS[code - 32]
            } else {
                AVERAGE_CHAR_WIDTH
            }
        })
        .sum()
}

/// Greedy word-wrap at `max_width_em`. A single word wider than the limit keeps
/// a line of its own rather than being split.
pub fn wrap_lines(text: &str, max_width_em: f64) -> Vec<String> {
    let space_w = measure_str(" ");
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f64;

    for word in text.split_whitespace() {
        let word_w = measure_str(word);
        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width_em {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The word on a card after fitting: chosen size and wrapped lines.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub font_size_pt: f64,
    pub line_height_mm: f64,
    pub lines: Vec<String>,
}

impl FittedText {
    pub fn font_size_mm(&self) -> f64 {
        self.font_size_pt * MM_PER_PT
    }

    pub fn block_height_mm(&self) -> f64 {
        self.lines.len() as f64 * self.line_height_mm
    }
}

/// Wraps `text` into a `width_mm` × `height_mm` card face, shrinking the font in 2pt
/// steps from `settings.font_size_pt` until every line fits horizontally and the
/// block fits vertically, or the minimum size is reached.
pub fn fit_text(text: &str, width_mm: f64, height_mm: f64, settings: &PageSettings) -> FittedText {
    let inner_w = (width_mm - 2.0 * settings.text_padding_mm).max(0.0);
    let inner_h = (height_mm - 2.0 * settings.text_padding_mm).max(0.0);

    let mut size = settings.font_size_pt;
    loop {
        let font_mm = size * MM_PER_PT;
        let line_height_mm = settings.line_height_mm * size / settings.font_size_pt;
        let lines = wrap_lines(text, inner_w / font_mm);
        let widest = lines
            .iter()
            .map(|l| measure_str(l) * font_mm)
            .fold(0.0_f64, f64::max);
        let fits = widest <= inner_w && lines.len() as f64 * line_height_mm <= inner_h;

        if fits || size <= settings.min_font_size_pt {
            return FittedText {
                font_size_pt: size,
                line_height_mm,
                lines,
            };
        }
        size = (size - 2.0).max(settings.min_font_size_pt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PageSettings {
        PageSettings::default()
    }

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_uppercase_word() {
        // C + A + T = 0.722 + 0.722 + 0.611
        assert!((measure_str("CAT") - 2.055).abs() < 1e-9);
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        assert!((measure_str("É") - AVERAGE_CHAR_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_lines("ICE CREAM", 100.0), vec!["ICE CREAM"]);
    }

    #[test]
    fn test_wrap_breaks_at_word_boundaries() {
        let lines = wrap_lines("AAA BBB CCC", measure_str("AAA BBB") + 0.01);
        assert_eq!(lines, vec!["AAA BBB", "CCC"]);
    }

    #[test]
    fn test_wrap_never_splits_a_long_word() {
        let lines = wrap_lines("SUPERCALIFRAGILISTIC", 1.0);
        assert_eq!(lines, vec!["SUPERCALIFRAGILISTIC"]);
    }

    #[test]
    fn test_short_word_keeps_preferred_size() {
        let fitted = fit_text("CAT", 89.0, 58.0, &settings());
        assert_eq!(fitted.font_size_pt, 30.0);
        assert_eq!(fitted.lines, vec!["CAT"]);
        assert!((fitted.line_height_mm - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_word_shrinks_but_not_below_minimum() {
        let word = "W".repeat(50);
        let fitted = fit_text(&word, 89.0, 58.0, &settings());
        assert_eq!(fitted.font_size_pt, settings().min_font_size_pt);
    }

    #[test]
    fn test_medium_word_shrinks_until_it_fits() {
        let fitted = fit_text("HIPPOPOTAMUS", 89.0, 58.0, &settings());
        assert!(fitted.font_size_pt < 30.0);
        assert!(fitted.font_size_pt >= settings().min_font_size_pt);
        let width = measure_str("HIPPOPOTAMUS") * fitted.font_size_mm();
        assert!(width <= 89.0 - 2.0 * settings().text_padding_mm);
    }
}

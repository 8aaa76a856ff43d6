//! Wrapped, styled text paragraphs.
//!
//! Text is broken greedily into lines that fit the available width. Every
//! line advances by the style's leading and the first baseline sits one font
//! size below the top of the paragraph. Justified lines stretch their spaces
//! with `Tw`; the last line and lines ended by `<br/>` stay left aligned.

use super::markup::{parse_markup, Inline};
use super::{Color, Flowable};
use crate::writer::{encode_win_ansi, Base14Font, ContentStreamBuilder};

/// Tolerance for width comparisons.
const EPSILON: f32 = 1e-3;

/// Horizontal alignment of paragraph lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Flush left
    #[default]
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
    /// Stretched to both edges except the last line
    Justify,
}

/// Paragraph style.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyle {
    /// Font size in points
    pub font_size: f32,
    /// Distance between baselines
    pub leading: f32,
    /// Line alignment
    pub alignment: TextAlign,
    /// Fill color of the text
    pub text_color: Color,
    /// Indent applied to every line
    pub left_indent: f32,
    /// Space above the paragraph in a frame
    pub space_before: f32,
    /// Space below the paragraph in a frame
    pub space_after: f32,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            leading: 12.0,
            alignment: TextAlign::Left,
            text_color: Color::black(),
            left_indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
        }
    }
}

impl ParagraphStyle {
    /// Set font size and leading.
    pub fn with_size(mut self, font_size: f32, leading: f32) -> Self {
        self.font_size = font_size;
        self.leading = leading;
        self
    }

    /// Set line alignment.
    pub fn with_alignment(mut self, alignment: TextAlign) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set text color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    /// Set the left indent.
    pub fn with_left_indent(mut self, indent: f32) -> Self {
        self.left_indent = indent;
        self
    }

    /// Set space before and after.
    pub fn with_spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }
}

/// A run of text in one font.
#[derive(Debug, Clone, PartialEq)]
struct Run {
    font: Base14Font,
    underline: bool,
    text: Vec<u8>,
    width: f32,
}

/// Appends to `runs`, merging with the last run when the style matches.
fn push_run(runs: &mut Vec<Run>, run: Run) {
    match runs.last_mut() {
        Some(last) if last.font == run.font && last.underline == run.underline => {
            last.text.extend_from_slice(&run.text);
            last.width += run.width;
        },
        _ => runs.push(run),
    }
}

#[derive(Debug, Clone, Default)]
struct Word {
    runs: Vec<Run>,
    width: f32,
}

impl Word {
    fn push(&mut self, font: Base14Font, underline: bool, text: &str, size: f32) {
        if text.is_empty() {
            return;
        }
        let encoded = encode_win_ansi(text);
        let width = font.encoded_width(&encoded, size);
        self.width += width;
        push_run(
            &mut self.runs,
            Run {
                font,
                underline,
                text: encoded,
                width,
            },
        );
    }
}

#[derive(Debug, Clone)]
enum Token {
    Word(Word),
    Break,
}

fn tokenize(inlines: &[Inline], size: f32) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = Word::default();

    let flush = |tokens: &mut Vec<Token>, word: &mut Word| {
        if !word.runs.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for inline in inlines {
        match inline {
            Inline::LineBreak => {
                flush(&mut tokens, &mut word);
                tokens.push(Token::Break);
            },
            Inline::Text(style, text) => {
                let font = Base14Font::select(style.bold, style.italic);
                let mut piece = String::new();
                for ch in text.chars() {
                    if ch.is_ascii_whitespace() {
                        word.push(font, style.underline, &piece, size);
                        piece.clear();
                        flush(&mut tokens, &mut word);
                    } else {
                        piece.push(ch);
                    }
                }
                word.push(font, style.underline, &piece, size);
            },
        }
    }
    flush(&mut tokens, &mut word);
    tokens
}

/// A laid-out line.
#[derive(Debug, Clone, Default)]
struct Line {
    runs: Vec<Run>,
    width: f32,
    spaces: usize,
    forced_break: bool,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Append a word; the separating space takes the style of the word.
    fn add(&mut self, word: &Word, space_width: f32) {
        if let (false, Some(first)) = (self.is_empty(), word.runs.first()) {
            push_run(
                &mut self.runs,
                Run {
                    font: first.font,
                    underline: first.underline,
                    text: vec![b' '],
                    width: space_width,
                },
            );
            self.width += space_width;
            self.spaces += 1;
        }
        for run in &word.runs {
            push_run(&mut self.runs, run.clone());
        }
        self.width += word.width;
    }
}

/// A paragraph of marked-up text.
#[derive(Debug, Clone)]
pub struct Paragraph {
    style: ParagraphStyle,
    tokens: Vec<Token>,
    lines: Vec<Line>,
    text_width: f32,
}

impl Paragraph {
    /// Create a paragraph from markup (see [`super::parse_markup`]).
    pub fn new(markup: &str, style: ParagraphStyle) -> Self {
        let tokens = tokenize(&parse_markup(markup), style.font_size);
        Self {
            style,
            tokens,
            lines: Vec::new(),
            text_width: 0.0,
        }
    }

    /// The paragraph style.
    pub fn style(&self) -> &ParagraphStyle {
        &self.style
    }

    /// Number of lines from the last `wrap`.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line texts from the last `wrap`, decoded for inspection.
    pub fn line_texts(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| {
                line.runs
                    .iter()
                    .flat_map(|run| run.text.iter().map(|&b| b as char))
                    .collect()
            })
            .collect()
    }

    /// Height of the wrapped paragraph.
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.style.leading
    }

    /// Baseline of the first line relative to the paragraph top.
    pub fn first_baseline_offset(&self) -> f32 {
        self.style.font_size
    }

    fn break_lines(&mut self, text_width: f32) {
        let space_width = Base14Font::Helvetica.code_width(b' ') as f32 * self.style.font_size / 1000.0;
        let mut lines = Vec::new();
        let mut current = Line::default();

        for token in &self.tokens {
            match token {
                Token::Word(word) => {
                    if !current.is_empty()
                        && current.width + space_width + word.width > text_width + EPSILON
                    {
                        lines.push(std::mem::take(&mut current));
                    }
                    current.add(word, space_width);
                },
                Token::Break => {
                    current.forced_break = true;
                    lines.push(std::mem::take(&mut current));
                },
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }

        self.lines = lines;
        self.text_width = text_width;
    }
}

impl Flowable for Paragraph {
    fn wrap(&mut self, avail_width: f32, _avail_height: f32) -> (f32, f32) {
        self.break_lines((avail_width - self.style.left_indent).max(0.0));
        (avail_width, self.height())
    }

    fn draw(&self, canvas: &mut ContentStreamBuilder, x: f32, y: f32) {
        if self.lines.is_empty() {
            return;
        }

        let size = self.style.font_size;
        let top = y + self.height();
        let mut word_spacing = 0.0;
        let mut underlines = Vec::new();

        canvas.fill_color(self.style.text_color).begin_text();
        for (index, line) in self.lines.iter().enumerate() {
            let baseline = top - size - index as f32 * self.style.leading;
            let is_last = index + 1 == self.lines.len();
            let slack = self.text_width - line.width;

            let (offset, spacing) = match self.style.alignment {
                TextAlign::Left => (0.0, 0.0),
                TextAlign::Center => (slack / 2.0, 0.0),
                TextAlign::Right => (slack, 0.0),
                TextAlign::Justify if !is_last && !line.forced_break && line.spaces > 0 => {
                    (0.0, slack / line.spaces as f32)
                },
                TextAlign::Justify => (0.0, 0.0),
            };

            if spacing != word_spacing {
                canvas.set_word_spacing(spacing);
                word_spacing = spacing;
            }

            let mut cursor = x + self.style.left_indent + offset;
            canvas.set_text_position(cursor, baseline);
            for run in &line.runs {
                canvas.set_font(run.font, size).show_text(run.text.clone());
                let spaces = run.text.iter().filter(|&&b| b == b' ').count();
                let advance = run.width + spacing * spaces as f32;
                if run.underline {
                    underlines.push((cursor, baseline, advance));
                }
                cursor += advance;
            }
        }
        if word_spacing != 0.0 {
            canvas.set_word_spacing(0.0);
        }
        canvas.end_text();

        if !underlines.is_empty() {
            canvas
                .stroke_color(self.style.text_color)
                .set_line_width(size / 20.0);
            for (start, baseline, width) in underlines {
                let underline_y = baseline - 0.125 * size;
                canvas
                    .move_to(start, underline_y)
                    .line_to(start + width, underline_y)
                    .stroke();
            }
        }
    }

    fn space_before(&self) -> f32 {
        self.style.space_before
    }

    fn space_after(&self) -> f32 {
        self.style.space_after
    }
}

//! Fixed colours, sizes and geometry helpers of the deck theme.

/// English Metric Units per inch.
const EMU_PER_INCH: f64 = 914_400.0;

pub const SLIDE_WIDTH_IN: f64 = 10.0;
pub const SLIDE_HEIGHT_IN: f64 = 7.5;

pub const CHARCOAL: &str = "333333";
pub const RED: &str = "D60036";
pub const WHITE: &str = "FFFFFF";
pub const BODY_TEXT: &str = "333333";
pub const CITATION: &str = "999999";

/// Convert inches to EMU.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Position and size of a shape, in inches.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// `<a:xfrm>` element for this frame.
    pub fn xfrm(&self) -> String {
        format!(
            "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
            emu(self.left),
            emu(self.top),
            emu(self.width),
            emu(self.height)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

impl Align {
    pub fn as_attr(&self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Right => "r",
        }
    }
}

/// Run formatting for a text box.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size_pt: u32,
    pub bold: bool,
    pub color: &'static str,
    pub align: Align,
}

impl TextStyle {
    pub const fn new(size_pt: u32, color: &'static str) -> Self {
        Self {
            size_pt,
            bold: false,
            color,
            align: Align::Left,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }
}

//! # svgass ass
//!
//! Writes converted shapes as ASS vector drawings.
//!
//! A drawing is a paint override block followed by drawing commands in
//! drawing mode:
//!
//! ```text
//! {\1c&H0000FF&\1a&H00&\3c&H000000&\3a&HFF&\bord1}{\shad0\an7\p1}m 0 0 l 10 0 10 10{\p0}
//! ```
//!
//! How shapes are grouped is decided by [`BatchMode`]: `layout` keeps the
//! whole document in one drawing (positions stay correct, every shape takes
//! the first shape's paint), `colors` starts a new drawing for every shape
//! (each keeps its paint, but ASS lays the drawings out one after another).

use std::io::Write;
use svgass_common::{BatchMode, ConvertConfig};
use svgass_draw::{DrawResult, Emitter, Paint};
use svgass_geom::Vector;
use tracing::trace;

const DRAWING_ON: &str = r"{\shad0\an7\p1}";
const DRAWING_OFF: &str = r"{\p0}";

/// Format `value` with `precision` fractional digits, then strip trailing
/// zeros and a dangling point. Negative zero prints as `0`.
pub fn format_number(value: f64, precision: usize) -> String {
    let mut text = format!("{:.*}", precision, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

/// Paint override block for one shape.
pub fn paint_block(paint: &Paint, precision: usize) -> String {
    format!(
        r"{{\1c&H{:06X}&\1a&H{:02X}&\3c&H{:06X}&\3a&H{:02X}&\bord{}}}",
        paint.fill.color_or_black().to_bgr(),
        paint.fill.alpha(),
        paint.stroke.color_or_black().to_bgr(),
        paint.stroke.alpha(),
        format_number(paint.stroke_width, precision),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move,
    Line,
    Bezier,
}

impl Command {
    fn letter(self) -> char {
        match self {
            Command::Move => 'm',
            Command::Line => 'l',
            Command::Bezier => 'b',
        }
    }
}

/// [`Emitter`] producing ASS drawing text.
pub struct AssWriter<W: Write> {
    out: W,
    precision: usize,
    batch: BatchMode,
    /// Inside `{\p1}` ... `{\p0}`.
    drawing: bool,
    /// Shapes seen in the current document.
    shapes: usize,
    last: Option<Command>,
}

impl<W: Write> AssWriter<W> {
    pub fn new(out: W, precision: u8, batch: BatchMode) -> Self {
        Self {
            out,
            precision: usize::from(precision),
            batch,
            drawing: false,
            shapes: 0,
            last: None,
        }
    }

    pub fn from_config(out: W, config: &ConvertConfig) -> Self {
        Self::new(out, config.precision, config.batch_mode)
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn start_drawing(&mut self) -> DrawResult<()> {
        if !self.drawing {
            self.out.write_all(DRAWING_ON.as_bytes())?;
            self.drawing = true;
            self.last = None;
        }
        Ok(())
    }

    fn stop_drawing(&mut self) -> DrawResult<()> {
        if self.drawing {
            self.out.write_all(DRAWING_OFF.as_bytes())?;
            self.drawing = false;
        }
        Ok(())
    }

    /// Write a command letter unless it repeats a line command.
    fn command(&mut self, command: Command) -> DrawResult<()> {
        self.start_drawing()?;
        let repeat = command == Command::Line && self.last == Some(Command::Line);
        if !repeat {
            if self.last.is_some() {
                self.out.write_all(b" ")?;
            }
            write!(self.out, "{}", command.letter())?;
        }
        self.last = Some(command);
        Ok(())
    }

    fn point(&mut self, p: Vector) -> DrawResult<()> {
        write!(
            self.out,
            " {} {}",
            format_number(p.x, self.precision),
            format_number(p.y, self.precision)
        )?;
        Ok(())
    }
}

impl<W: Write> Emitter for AssWriter<W> {
    fn begin_document(&mut self) -> DrawResult<()> {
        self.shapes = 0;
        self.drawing = false;
        self.last = None;
        Ok(())
    }

    fn begin_shape(&mut self, paint: &Paint) -> DrawResult<()> {
        let fresh = match self.batch {
            BatchMode::Colors => true,
            BatchMode::Layout => self.shapes == 0,
        };
        if fresh {
            let block = paint_block(paint, self.precision);
            trace!(%block, "paint");
            self.out.write_all(block.as_bytes())?;
            self.start_drawing()?;
        }
        self.shapes += 1;
        Ok(())
    }

    fn move_to(&mut self, to: Vector) -> DrawResult<()> {
        self.command(Command::Move)?;
        self.point(to)
    }

    fn line_to(&mut self, to: Vector) -> DrawResult<()> {
        self.command(Command::Line)?;
        self.point(to)
    }

    fn cubic_to(&mut self, c1: Vector, c2: Vector, to: Vector) -> DrawResult<()> {
        self.command(Command::Bezier)?;
        self.point(c1)?;
        self.point(c2)?;
        self.point(to)
    }

    fn end_shape(&mut self) -> DrawResult<()> {
        if self.batch == BatchMode::Colors {
            self.stop_drawing()?;
        }
        Ok(())
    }

    fn end_document(&mut self) -> DrawResult<()> {
        self.stop_drawing()?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgass_draw::{Color, PaintChannel};

    fn v(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    fn written(writer: AssWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0, 1), "1");
        assert_eq!(format_number(1.24, 1), "1.2");
        assert_eq!(format_number(1.26, 1), "1.3");
        assert_eq!(format_number(10.0, 3), "10");
        assert_eq!(format_number(0.4, 0), "0");
        assert_eq!(format_number(-0.01, 1), "0");
        assert_eq!(format_number(-0.0, 2), "0");
        assert_eq!(format_number(-2.5, 2), "-2.5");
        assert_eq!(format_number(100.0, 0), "100");
        assert_eq!(format_number(0.123456, 5), "0.12346");
    }

    #[test]
    fn test_paint_block() {
        let paint = Paint {
            fill: PaintChannel {
                color: Some(Color::from_rgb(0x11, 0x22, 0x33)),
                opacity: 0.5,
            },
            stroke: PaintChannel::none(),
            stroke_width: 1.5,
        };
        assert_eq!(
            paint_block(&paint, 1),
            r"{\1c&H332211&\1a&H80&\3c&H000000&\3a&HFF&\bord1.5}"
        );
    }

    #[test]
    fn test_line_commands_share_a_letter() {
        let mut w = AssWriter::new(Vec::new(), 1, BatchMode::Layout);
        w.begin_document().unwrap();
        w.begin_shape(&Paint::default()).unwrap();
        w.move_to(v(0.0, 0.0)).unwrap();
        w.line_to(v(10.0, 0.0)).unwrap();
        w.line_to(v(10.0, 10.5)).unwrap();
        w.cubic_to(v(1.0, 2.0), v(3.0, 4.0), v(5.0, 6.0)).unwrap();
        w.line_to(v(0.0, 0.0)).unwrap();
        w.end_shape().unwrap();
        w.end_document().unwrap();

        assert_eq!(
            written(w),
            concat!(
                r"{\1c&H000000&\1a&H00&\3c&H000000&\3a&HFF&\bord1}",
                r"{\shad0\an7\p1}m 0 0 l 10 0 10 10.5 b 1 2 3 4 5 6 l 0 0{\p0}",
                "\n"
            )
        );
    }

    #[test]
    fn test_layout_mode_keeps_one_drawing() {
        let mut red = Paint::default();
        red.fill = PaintChannel::solid(Color::from_rgb(255, 0, 0));

        let mut w = AssWriter::new(Vec::new(), 0, BatchMode::Layout);
        w.begin_document().unwrap();
        w.begin_shape(&red).unwrap();
        w.move_to(v(1.0, 1.0)).unwrap();
        w.end_shape().unwrap();
        w.begin_shape(&Paint::default()).unwrap();
        w.move_to(v(2.0, 2.0)).unwrap();
        w.line_to(v(3.0, 3.0)).unwrap();
        w.end_shape().unwrap();
        w.end_document().unwrap();

        let text = written(w);
        assert_eq!(text.matches(r"\p1").count(), 1);
        assert!(text.starts_with(r"{\1c&H0000FF&"));
        assert!(text.ends_with("m 1 1 m 2 2 l 3 3{\\p0}\n"));
    }

    #[test]
    fn test_colors_mode_draws_each_shape() {
        let mut w = AssWriter::new(Vec::new(), 1, BatchMode::Colors);
        w.begin_document().unwrap();
        for _ in 0..2 {
            w.begin_shape(&Paint::default()).unwrap();
            w.move_to(v(0.0, 0.0)).unwrap();
            w.line_to(v(1.0, 0.0)).unwrap();
            w.end_shape().unwrap();
        }
        w.end_document().unwrap();

        let shape = r"{\1c&H000000&\1a&H00&\3c&H000000&\3a&HFF&\bord1}{\shad0\an7\p1}m 0 0 l 1 0{\p0}";
        assert_eq!(written(w), format!("{}{}\n", shape, shape));
    }

    #[test]
    fn test_empty_document_is_a_blank_line() {
        let mut w = AssWriter::new(Vec::new(), 1, BatchMode::Layout);
        w.begin_document().unwrap();
        w.end_document().unwrap();
        assert_eq!(written(w), "\n");
    }
}

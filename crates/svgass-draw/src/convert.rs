//! Document traversal.
//!
//! [`Converter`] is the scanner's event sink. It owns the context stack for
//! one document, interprets attributes on every element it enters and hands
//! the outline of each drawable element to an [`Emitter`].

use crate::context::{ContextStack, RenderContext};
use crate::emit::Emitter;
use crate::error::{DrawError, DrawResult};
use crate::number::leading_number;
use crate::path::interpret_path;
use crate::shapes::{self, Outline, Tolerance};
use crate::style::apply_paint;
use crate::transform::parse_transform;
use serde::Serialize;
use svgass_common::ConvertConfig;
use svgass_geom::Vector;
use svgass_markup::{Event, EventKind, EventSink, Node, NodeKind, ScanStats};
use tracing::{debug, trace, warn};

/// Elements whose subtree is never drawn.
const NON_RENDERING: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "symbol",
    "pattern",
    "marker",
    "linearGradient",
    "radialGradient",
    "text",
    "style",
    "title",
    "desc",
    "metadata",
];

/// Counters collected while converting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    /// Shapes handed to the emitter.
    pub shapes: usize,
    /// Primitives handed to the emitter.
    pub primitives: usize,
    /// Paths cut short by a syntax error.
    pub path_errors: usize,
    /// Nesting problems seen by the traversal (nested or excess `svg`,
    /// closes with nothing to pop).
    pub structural_warnings: usize,
    /// Anomalies recovered by the scanner.
    pub scan_anomalies: usize,
    /// Elements whose drawing was suppressed, counting each suppressed
    /// subtree once.
    pub skipped_elements: usize,
}

/// Event sink that turns one document into emitter calls.
pub struct Converter<'e, E: Emitter + ?Sized> {
    stack: ContextStack,
    /// Stack depth at which each open `<svg>` element was entered.
    svg_marks: Vec<usize>,
    scale: f64,
    tolerance: Tolerance,
    emitter: &'e mut E,
    report: ConvertReport,
}

impl<'e, E: Emitter + ?Sized> Converter<'e, E> {
    pub fn new(config: &ConvertConfig, emitter: &'e mut E) -> Self {
        Self {
            stack: ContextStack::new(RenderContext::new(config.origin)),
            svg_marks: Vec::new(),
            scale: config.scale,
            tolerance: Tolerance::from(config),
            emitter,
            report: ConvertReport::default(),
        }
    }

    pub fn report(&self) -> &ConvertReport {
        &self.report
    }

    /// Finish with the scanner's counters folded into the report.
    pub fn finish(mut self, stats: ScanStats) -> ConvertReport {
        self.report.scan_anomalies = stats.anomalies;
        self.report
    }

    fn open(&mut self, node: &Node<'_>) -> DrawResult<()> {
        if node.is("svg") {
            if !self.svg_marks.is_empty() {
                warn!(offset = node.offset, "nested <svg> element");
                self.report.structural_warnings += 1;
            }
            self.svg_marks.push(self.stack.depth());
        } else if self.svg_marks.is_empty() {
            trace!(element = %node.name, "outside <svg>, ignored");
            return Ok(());
        }

        self.stack.push()?;
        debug!(element = %node.name, depth = self.stack.depth(), "enter");

        let ctx = self.stack.current_mut();
        let was_rendered = ctx.rendered;
        if NON_RENDERING.iter().any(|name| node.is(name))
            || node.attr("display").is_some_and(|v| v.trim().eq_ignore_ascii_case("none"))
        {
            ctx.rendered = false;
        }
        if let Some(list) = node.attr("transform") {
            ctx.transform = ctx.transform.multiply(&parse_transform(list));
        }
        apply_paint(&mut ctx.paint, node);
        let ctx = ctx.clone();

        let hidden = node
            .attr("visibility")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("hidden"));
        if was_rendered && (!ctx.rendered || hidden) {
            debug!(element = %node.name, "drawing suppressed");
            self.report.skipped_elements += 1;
            return Ok(());
        }
        if !ctx.rendered {
            return Ok(());
        }

        self.draw(node, &ctx)
    }

    fn close(&mut self, node: &Node<'_>) {
        let Some(&mark) = self.svg_marks.last() else {
            if node.is("svg") {
                warn!(offset = node.offset, "excess </svg>");
                self.report.structural_warnings += 1;
            }
            return;
        };

        if node.is("svg") {
            // children left open inside the <svg> end with it
            let unclosed = self.stack.unwind_to(mark).saturating_sub(1);
            if unclosed > 0 {
                warn!(offset = node.offset, unclosed, "</svg> with open child elements");
                self.report.structural_warnings += 1;
            }
            self.svg_marks.pop();
            debug!(depth = self.stack.depth(), "leave svg");
            return;
        }

        // the innermost <svg> context is only restored by its own close
        if self.stack.depth() <= mark + 1 {
            warn!(element = %node.name, offset = node.offset, "close tag with no open element");
            self.report.structural_warnings += 1;
            return;
        }
        match self.stack.pop() {
            Ok(_) => debug!(element = %node.name, depth = self.stack.depth(), "leave"),
            Err(err) => {
                warn!(element = %node.name, offset = node.offset, "{}", err);
                self.report.structural_warnings += 1;
            }
        }
    }

    /// Build the element's outline and emit it if it has any geometry.
    fn draw(&mut self, node: &Node<'_>, ctx: &RenderContext) -> DrawResult<()> {
        let tol = &self.tolerance;
        let mut out = Outline::for_context(ctx, self.scale);
        let num = |name: &str| node.attr(name).and_then(leading_number).unwrap_or(0.0);
        let opt = |name: &str| node.attr(name).and_then(leading_number);

        let name = node.name.to_ascii_lowercase();
        let drawn = match name.as_str() {
            "line" => shapes::line(
                &mut out,
                Vector::new(num("x1"), num("y1")),
                Vector::new(num("x2"), num("y2")),
            ),
            "rect" => shapes::rect(
                &mut out,
                Vector::new(num("x"), num("y")),
                Vector::new(num("width"), num("height")),
                opt("rx"),
                opt("ry"),
                tol,
            ),
            "circle" => {
                let r = num("r");
                shapes::ellipse(&mut out, Vector::new(num("cx"), num("cy")), Vector::new(r, r), tol)
            }
            "ellipse" => shapes::ellipse(
                &mut out,
                Vector::new(num("cx"), num("cy")),
                Vector::new(num("rx"), num("ry")),
                tol,
            ),
            "polyline" | "polygon" => {
                let d = shapes::points_to_path(node.attr("points").unwrap_or(""), name == "polygon");
                interpret_path(&d, &mut out, tol).map(drop)
            }
            "path" => interpret_path(node.attr("d").unwrap_or(""), &mut out, tol).map(drop),
            _ => return Ok(()),
        };

        match drawn {
            Err(err) if err.is_fatal() => return Err(err),
            Err(err @ DrawError::PathSyntax { .. }) => {
                warn!(element = %node.name, offset = node.offset, "{}", err);
                self.report.path_errors += 1;
            }
            Err(err) => warn!(element = %node.name, "{}", err),
            Ok(()) => {}
        }

        self.emit(&out, ctx)
    }

    fn emit(&mut self, out: &Outline, ctx: &RenderContext) -> DrawResult<()> {
        if out.is_empty() {
            return Ok(());
        }

        let mut paint = ctx.paint;
        paint.stroke_width *= self.scale;
        self.emitter.begin_shape(&paint)?;
        for primitive in out.primitives() {
            trace!(?primitive, "emit");
            self.emitter.primitive(primitive)?;
        }
        self.emitter.end_shape()?;

        self.report.shapes += 1;
        self.report.primitives += out.len();
        Ok(())
    }
}

impl<E: Emitter + ?Sized> EventSink for Converter<'_, E> {
    type Error = DrawError;

    fn event(&mut self, event: Event<'_>) -> DrawResult<()> {
        let node = &event.node;
        match (event.kind, node.kind) {
            (EventKind::Open, NodeKind::Parent | NodeKind::SelfClosing) => self.open(node),
            (EventKind::Close, NodeKind::End | NodeKind::SelfClosing) => {
                self.close(node);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Convert one document, reporting every shape to `emitter`.
///
/// Recoverable problems are logged and counted in the returned report;
/// only [`DrawError::ResourceExhausted`] and [`DrawError::Io`] abort.
pub fn convert<E: Emitter + ?Sized>(
    input: &str,
    config: &ConvertConfig,
    emitter: &mut E,
) -> DrawResult<ConvertReport> {
    emitter.begin_document()?;
    let mut converter = Converter::new(config, emitter);
    let stats = svgass_markup::scan(input, &mut converter)?;
    let report = converter.finish(stats);
    emitter.end_document()?;

    debug!(
        shapes = report.shapes,
        primitives = report.primitives,
        warnings = report.structural_warnings + report.path_errors + report.scan_anomalies,
        "document converted"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Primitive, RecordingEmitter};

    fn run(input: &str) -> (ConvertReport, RecordingEmitter) {
        run_with(input, &ConvertConfig::default())
    }

    fn run_with(input: &str, config: &ConvertConfig) -> (ConvertReport, RecordingEmitter) {
        let mut rec = RecordingEmitter::new();
        let report = convert(input, config, &mut rec).unwrap();
        (report, rec)
    }

    #[test]
    fn test_elements_outside_svg_are_ignored() {
        let (report, rec) = run(r#"<rect width="5" height="5"/><svg></svg><line x2="3"/>"#);
        assert_eq!(report.shapes, 0);
        assert!(rec.shapes.is_empty());
        assert_eq!(rec.documents, 1);
    }

    #[test]
    fn test_group_transform_and_paint_inherit() {
        let input = r#"<svg><g transform="translate(10,0)" fill="red">
            <line x1="0" y1="0" x2="1" y2="0"/>
        </g><line x1="0" y1="0" x2="1" y2="0"/></svg>"#;
        let (report, rec) = run(input);
        assert_eq!(report.shapes, 2);
        assert_eq!(rec.shapes[0].primitives[0].end(), Vector::new(10.0, 0.0));
        assert_eq!(rec.shapes[0].paint.fill.color.unwrap().r, 255);
        // sibling after the group sees neither override
        assert_eq!(rec.shapes[1].primitives[0].end(), Vector::ZERO);
        assert_eq!(rec.shapes[1].paint.fill.color.unwrap().r, 0);
    }

    #[test]
    fn test_scale_and_origin() {
        let config = ConvertConfig {
            scale: 2.0,
            origin: Vector::new(1.0, 1.0),
            ..ConvertConfig::default()
        };
        let (_, rec) = run_with(r#"<svg><line x1="0" y1="0" x2="2" y2="0" stroke-width="3"/></svg>"#, &config);
        assert_eq!(
            rec.shapes[0].primitives,
            vec![
                Primitive::MoveTo { to: Vector::new(2.0, 2.0) },
                Primitive::LineTo { to: Vector::new(6.0, 2.0) },
            ]
        );
        assert_eq!(rec.shapes[0].paint.stroke_width, 6.0);
    }

    #[test]
    fn test_structural_warnings() {
        let (report, _) = run("</svg><svg><svg></svg></svg>");
        // excess </svg> before any <svg>, then a nested <svg>
        assert_eq!(report.structural_warnings, 2);
        assert!(report.scan_anomalies >= 1);
    }

    #[test]
    fn test_unbalanced_svg_does_not_leak_into_sibling() {
        let input = r#"<svg transform="translate(100,0)" fill="red"><g></svg><svg><line x2="1"/></svg>"#;
        let (report, rec) = run(input);
        assert_eq!(
            rec.shapes[0].primitives,
            vec![
                Primitive::MoveTo { to: Vector::ZERO },
                Primitive::LineTo { to: Vector::new(1.0, 0.0) },
            ]
        );
        assert_eq!(rec.shapes[0].paint.fill.color.unwrap().r, 0);
        assert_eq!(report.structural_warnings, 1);
    }

    #[test]
    fn test_stray_close_keeps_svg_context() {
        let input = r#"<svg><svg transform="translate(5,0)"></g><line x2="1"/></svg></svg>"#;
        let (report, rec) = run(input);
        assert_eq!(rec.shapes[0].primitives[0].end(), Vector::new(5.0, 0.0));
        // nested <svg> plus the stray </g>
        assert_eq!(report.structural_warnings, 2);
    }

    #[test]
    fn test_suppressed_subtrees() {
        let input = r#"<svg>
            <defs><rect width="5" height="5"/></defs>
            <g display="none"><rect width="5" height="5"/><rect width="5" height="5"/></g>
            <rect width="5" height="5" visibility="hidden"/>
            <g visibility="hidden"><rect width="1" height="1"/></g>
            <rect width="5" height="5"/>
        </svg>"#;
        let (report, rec) = run(input);
        assert_eq!(report.skipped_elements, 4);
        assert_eq!(report.shapes, 2);
        assert_eq!(rec.shapes.len(), 2);
    }

    #[test]
    fn test_path_error_keeps_prefix_and_continues() {
        let input = r#"<svg><path d="M0 0 L5 0 ?"/><path d="M1 1 L2 2"/></svg>"#;
        let (report, rec) = run(input);
        assert_eq!(report.path_errors, 1);
        assert_eq!(report.shapes, 2);
        assert_eq!(rec.shapes[0].primitives.len(), 2);
        assert_eq!(report.primitives, 4);
    }

    #[test]
    fn test_empty_geometry_is_not_emitted() {
        let (report, rec) = run(r#"<svg><circle r="0"/><path d="M3 3"/><polygon points=""/></svg>"#);
        assert_eq!(report.shapes, 0);
        assert!(rec.shapes.is_empty());
    }

    #[test]
    fn test_polygon_and_polyline() {
        let (_, rec) = run(r#"<svg><polygon points="0,0 4,0 4,4"/><polyline points="1 1 2 2 3"/></svg>"#);
        assert_eq!(rec.shapes[0].primitives.len(), 3);
        assert_eq!(
            rec.shapes[1].primitives,
            vec![
                Primitive::MoveTo { to: Vector::new(1.0, 1.0) },
                Primitive::LineTo { to: Vector::new(2.0, 2.0) },
            ]
        );
    }

    #[test]
    fn test_report_serializes() {
        let (report, _) = run(r#"<svg><rect width="1" height="1"/></svg>"#);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["shapes"], 1);
        assert_eq!(json["primitives"], 4);
    }
}

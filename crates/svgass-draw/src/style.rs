//! Presentation attribute and `style` interpreter.

use crate::color::color_of;
use crate::context::{Paint, PaintChannel};
use crate::number::leading_number;
use svgass_markup::Node;
use tracing::debug;

/// Paint properties, in the order presentation attributes are read.
const PAINT_PROPERTIES: [&str; 5] = ["fill", "stroke", "fill-opacity", "stroke-opacity", "stroke-width"];

/// Apply an element's paint properties on top of the inherited `paint`.
///
/// Presentation attributes are read first, then the inline `style`
/// declarations, so the inline form wins for a property set both ways.
pub fn apply_paint(paint: &mut Paint, node: &Node<'_>) {
    for name in PAINT_PROPERTIES {
        if let Some(value) = node.attr(name) {
            set_property(paint, name, value);
        }
    }
    if let Some(style) = node.attr("style") {
        apply_style(paint, style);
    }
}

/// Apply `name: value;` declarations from a `style` attribute.
pub fn apply_style(paint: &mut Paint, style: &str) {
    for (name, value) in declarations(style) {
        if !set_property(paint, name, value) {
            debug!(property = name, "style: ignored");
        }
    }
}

/// Split `style` text into trimmed `(name, value)` pairs.
pub fn declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let (name, value) = (name.trim(), value.trim());
        (!name.is_empty() && !value.is_empty()).then_some((name, value))
    })
}

/// Set one property; returns whether it was a paint property.
fn set_property(paint: &mut Paint, name: &str, value: &str) -> bool {
    match name.to_ascii_lowercase().as_str() {
        "fill" => set_color(&mut paint.fill, value),
        "stroke" => set_color(&mut paint.stroke, value),
        "fill-opacity" => set_opacity(&mut paint.fill, value),
        "stroke-opacity" => set_opacity(&mut paint.stroke, value),
        "stroke-width" => {
            if let Some(width) = leading_number(value) {
                paint.stroke_width = width;
            }
        }
        _ => return false,
    }
    true
}

fn set_color(channel: &mut PaintChannel, value: &str) {
    channel.color = if value.trim().eq_ignore_ascii_case("none") {
        None
    } else {
        Some(color_of(value))
    };
}

fn set_opacity(channel: &mut PaintChannel, value: &str) {
    if let Some(opacity) = leading_number(value) {
        channel.opacity = opacity;
    }
}

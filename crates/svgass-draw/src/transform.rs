//! `transform` attribute interpreter.

use crate::number::number_list;
use svgass_geom::Transform2D;
use tracing::{debug, warn};

/// Parse a transform list into one matrix.
///
/// Functions compose left to right, so the first listed function is the
/// outermost and is applied last to local points. Angles are in degrees and
/// function names match case-insensitively. A token that is not a
/// well-formed function call is skipped and parsing resumes at the next
/// function name.
pub fn parse_transform(list: &str) -> Transform2D {
    let mut result = Transform2D::identity();
    let mut rest = list;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if name_len == 0 {
            // not a function name: skip one character and look again
            let skip = rest.chars().next().map_or(1, char::len_utf8);
            rest = &rest[skip..];
            continue;
        }

        let name = &rest[..name_len];
        let after_name = rest[name_len..].trim_start();
        let Some(args_text) = after_name.strip_prefix('(') else {
            warn!(token = name, "transform: expected '(' after function name");
            rest = &rest[name_len..];
            continue;
        };
        let Some(close) = args_text.find(')') else {
            warn!(function = name, "transform: unterminated argument list");
            break;
        };

        let args = number_list(&args_text[..close]);
        rest = &args_text[close + 1..];

        match transform_function(name, &args) {
            Some(matrix) => {
                debug!(function = name, ?args, "transform");
                result = result.multiply(&matrix);
            }
            None => warn!(function = name, ?args, "transform: skipped unrecognized call"),
        }
    }

    result
}

/// Matrix for one function call, `None` for an unknown name or bad arity.
fn transform_function(name: &str, args: &[f64]) -> Option<Transform2D> {
    let identity = Transform2D::identity();
    let matrix = match (name.to_ascii_lowercase().as_str(), args) {
        ("translate", &[tx]) => identity.translate(tx, 0.0),
        ("translate", &[tx, ty]) => identity.translate(tx, ty),
        ("scale", &[s]) => identity.scale(s, s),
        ("scale", &[sx, sy]) => identity.scale(sx, sy),
        ("rotate", &[angle]) => identity.rotate(angle.to_radians()),
        ("rotate", &[angle, cx, cy]) => identity.rotate_around(angle.to_radians(), cx, cy),
        ("skewx", &[angle]) => identity.skew_x(angle.to_radians()),
        ("skewy", &[angle]) => identity.skew_y(angle.to_radians()),
        ("matrix", &[a, b, c, d, e, f]) => Transform2D::new(a, b, c, d, e, f),
        _ => return None,
    };
    Some(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgass_geom::Vector;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_translate_then_unit_scale() {
        let t = parse_transform("translate(3,-4) scale(1)");
        assert_eq!(t.apply(Vector::new(1.0, 1.0)), Vector::new(4.0, -3.0));
    }

    #[test]
    fn test_left_to_right_composition() {
        let t = parse_transform("scale(2) translate(10,0)");
        assert_eq!(t.apply(Vector::ZERO), Vector::new(20.0, 0.0));
    }

    #[test]
    fn test_rotate_in_degrees() {
        let t = parse_transform("rotate(90,0,0)");
        assert!(t.apply(Vector::new(1.0, 0.0)).approx_eq(Vector::new(0.0, 1.0), EPS));

        let t = parse_transform("rotate(180 5 5)");
        assert!(t.apply(Vector::new(5.0, 5.0)).approx_eq(Vector::new(5.0, 5.0), EPS));
        assert!(t.apply(Vector::new(6.0, 5.0)).approx_eq(Vector::new(4.0, 5.0), EPS));
    }

    #[test]
    fn test_matrix_and_case_insensitivity() {
        let t = parse_transform("MATRIX(1 0 0 1 7 8)");
        assert_eq!(t, Transform2D::new(1.0, 0.0, 0.0, 1.0, 7.0, 8.0));

        let t = parse_transform("skewx(45)");
        assert!(t.approx_eq(&Transform2D::identity().skew_x(std::f64::consts::FRAC_PI_4), EPS));
    }

    #[test]
    fn test_unparseable_tokens_are_skipped() {
        let t = parse_transform("translate(1) bogus(2) ;; matrix(1,2) 42 translate(0 5)");
        assert_eq!(t.apply(Vector::ZERO), Vector::new(1.0, 5.0));
    }

    #[test]
    fn test_name_without_arguments_is_skipped() {
        let t = parse_transform("rotate translate(2,2)");
        assert_eq!(t.apply(Vector::ZERO), Vector::new(2.0, 2.0));
    }

    #[test]
    fn test_empty_list_is_identity() {
        assert!(parse_transform("").is_identity());
        assert!(parse_transform("   ").is_identity());
    }

    #[test]
    fn test_unterminated_call_keeps_prefix() {
        let t = parse_transform("translate(4,0) scale(2");
        assert_eq!(t.apply(Vector::ZERO), Vector::new(4.0, 0.0));
    }
}

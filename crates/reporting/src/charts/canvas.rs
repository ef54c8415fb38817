use std::fmt::{self, Write};

use super::color::Color;

/// Fill + stroke style for rectangles, polygons and circles.
#[derive(Debug, Clone, Default)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Default::default()
        }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub anchor: TextAnchor,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: super::color::BLACK,
            anchor: TextAnchor::Start,
            bold: false,
        }
    }
}

#[derive(Debug, Clone)]
enum SvgElement {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        style: Style,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
        width: f64,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        style: Style,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
        rotate: Option<f64>,
    },
}

/// Retained-mode SVG canvas. Coordinates in points; every number is written
/// with fixed precision so identical input renders identical bytes.
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    elements: Vec<SvgElement>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.elements.push(SvgElement::Rect {
            x,
            y,
            w,
            h,
            style: style.clone(),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color, width: f64) {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], color: Color, width: f64) {
        self.elements.push(SvgElement::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        self.elements.push(SvgElement::Polygon {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.elements.push(SvgElement::Circle {
            cx,
            cy,
            r,
            style: style.clone(),
        });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: None,
        });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    pub fn finish_svg(&self) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(16 * 1024);
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        )?;
        writeln!(
            out,
            r#"<rect width="{}" height="{}" fill="white" />"#,
            self.width, self.height
        )?;
        for elem in &self.elements {
            render_element(&mut out, elem)?;
        }
        out.push_str("</svg>\n");
        Ok(out)
    }
}

fn render_element(out: &mut String, elem: &SvgElement) -> fmt::Result {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#)?;
            write_style_attrs(out, style)?;
            out.push_str(" />\n");
        }
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            writeln!(
                out,
                r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="{width:.2}" />"#
            )?;
        }
        SvgElement::Polyline {
            points,
            color,
            width,
        } => {
            out.push_str(r#"<polyline points=""#);
            write_points(out, points)?;
            writeln!(
                out,
                r#"" fill="none" stroke="{color}" stroke-width="{width:.2}" />"#
            )?;
        }
        SvgElement::Polygon { points, style } => {
            out.push_str(r#"<polygon points=""#);
            write_points(out, points)?;
            out.push('"');
            write_style_attrs(out, style)?;
            out.push_str(" />\n");
        }
        SvgElement::Circle { cx, cy, r, style } => {
            write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#)?;
            write_style_attrs(out, style)?;
            out.push_str(" />\n");
        }
        SvgElement::Text {
            x,
            y,
            content,
            style,
            rotate,
        } => {
            write!(out, r#"<text x="{x:.2}" y="{y:.2}""#)?;
            write!(
                out,
                r#" font-family="sans-serif" font-size="{:.1}" fill="{}" text-anchor="{}""#,
                style.size,
                style.color,
                style.anchor.as_str()
            )?;
            if style.bold {
                out.push_str(r#" font-weight="bold""#);
            }
            if let Some(angle) = rotate {
                write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#)?;
            }
            out.push('>');
            escape_xml(out, content);
            out.push_str("</text>\n");
        }
    }
    Ok(())
}

fn write_points(out: &mut String, points: &[(f64, f64)]) -> fmt::Result {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{x:.2},{y:.2}")?;
    }
    Ok(())
}

fn write_style_attrs(out: &mut String, style: &Style) -> fmt::Result {
    match &style.fill {
        Some(fill) => write!(out, r#" fill="{fill}""#)?,
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        write!(
            out,
            r#" stroke="{stroke}" stroke-width="{:.2}""#,
            style.stroke_width
        )?;
    }
    Ok(())
}

fn escape_xml(out: &mut String, content: &str) {
    for ch in content.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::color::Color;

    #[test]
    fn test_finish_svg_uses_fixed_precision() {
        let mut canvas = Canvas::new(100.0, 50.0);
        canvas.rect(1.0 / 3.0, 2.0, 10.0, 5.0, &Style::filled(Color::rgb(1, 2, 3)));
        let svg = canvas.finish_svg().unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"x="0.33""#));
        assert!(svg.contains(r##"fill="#010203""##));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut canvas = Canvas::new(10.0, 10.0);
        canvas.text(0.0, 0.0, "Books & <Toys>", &TextStyle::default());
        let svg = canvas.finish_svg().unwrap();
        assert!(svg.contains("Books &amp; &lt;Toys&gt;"));
    }
}

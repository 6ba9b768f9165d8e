//! # SVG Document Traversal
//!
//! Walks an SVG tree depth-first and turns every visible `<path>` into curves.
//!
//! Inherited state (visibility, opacity, fill and the composed transform) travels
//! down the walk as an immutable [`RenderContext`] passed by value; no element
//! ever mutates its parent's context.
//!
//! Rules:
//! - `display:none` and `<defs>` skip the element and its whole subtree.
//! - `visibility:hidden|collapse` hides an element and its descendants until a
//!   descendant sets `visibility:visible`.
//! - `opacity:0` hides the element and its subtree.
//! - With `draw_hidden` every path is drawn regardless of the above (except
//!   `display:none`).
//! - An element's own transform applies first, then its ancestors'.
//! - Fill is inherited from the nearest ancestor that sets one; `inherit`
//!   defers to the ancestor.
//! - A closed path with a fill other than `none` is also reported as an [`Area`].

use crate::curve::{Area, Curve};
use crate::path_parser::parse_path;
use crate::style::{has_style, is_cut_color, style_property, DEFAULT_FILL};
use crate::transform_parser::parse_transform;
use lasertrace_core::{Error, Result, Transform, Warning};
use roxmltree::{Document, Node};
use std::path::Path as StdPath;
use tracing::{debug, info, warn};

/// Document-level conversion options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentOptions {
    /// Draw elements hidden through visibility or opacity
    pub draw_hidden: bool,
    /// Flip the y axis so the origin is the bottom-left corner of the canvas
    pub transform_origin: bool,
    /// Canvas height used for the flip; defaults to the root `height` attribute
    pub canvas_height: Option<f64>,
}

/// State inherited from ancestors during the walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext<'a> {
    pub visible: bool,
    pub opaque: bool,
    /// Composed ancestor transform; `None` means identity
    pub transform: Option<Transform>,
    /// Nearest fill set on the element or an ancestor
    pub fill: Option<&'a str>,
}

impl Default for RenderContext<'_> {
    fn default() -> Self {
        Self {
            visible: true,
            opaque: true,
            transform: None,
            fill: None,
        }
    }
}

impl<'a> RenderContext<'a> {
    /// Context for a child carrying its own transform, applied before ours.
    pub fn compose(&self, own: Transform) -> Option<Transform> {
        Some(match self.transform {
            Some(inherited) => own.then(&inherited),
            None => own,
        })
    }

    pub fn is_drawn(&self, draw_hidden: bool) -> bool {
        draw_hidden || (self.visible && self.opaque)
    }

    /// Effective fill for an element whose own fill is `own`.
    pub fn inherit_fill(&self, own: Option<&'a str>) -> Option<&'a str> {
        own.filter(|value| value.trim() != "inherit").or(self.fill)
    }
}

/// Curves, filled areas and warnings extracted from a document
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub curves: Vec<Curve>,
    pub areas: Vec<Area>,
    pub warnings: Vec<Warning>,
}

impl ParsedDocument {
    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Parses an SVG file.
pub fn parse_file<P: AsRef<StdPath>>(path: P, options: &DocumentOptions) -> Result<ParsedDocument> {
    let path = path.as_ref();
    info!("Parsing SVG file {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_string(&content, options)
}

/// Parses SVG markup.
pub fn parse_string(svg: &str, options: &DocumentOptions) -> Result<ParsedDocument> {
    let document = Document::parse(svg).map_err(|e| Error::Document {
        reason: e.to_string(),
    })?;
    let root = document.root_element();

    let mut context = RenderContext::default();
    context.fill = context.inherit_fill(style_property(&root, "fill"));
    if options.transform_origin {
        let height = match options.canvas_height {
            Some(height) => height,
            None => root_height(&root)?,
        };
        context.transform =
            Some(Transform::scale(1.0, -1.0).then(&Transform::translation(0.0, height)));
    }

    let mut parsed = ParsedDocument::default();
    walk(root, context, options, &mut parsed);

    info!(
        curves = parsed.curves.len(),
        areas = parsed.areas.len(),
        warnings = parsed.warnings.len(),
        "Parsed SVG document"
    );
    Ok(parsed)
}

/// Reads the root `height`, ignoring a trailing unit such as `mm` or `px`.
fn root_height(root: &Node<'_, '_>) -> Result<f64> {
    let raw = root.attribute("height").ok_or_else(|| Error::Document {
        reason: "root element has no height; set a canvas height to flip the origin".to_string(),
    })?;
    let number = raw
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%')
        .trim();
    number.parse::<f64>().map_err(|_| Error::Document {
        reason: format!("cannot read canvas height '{raw}'"),
    })
}

fn element_name(node: &Node<'_, '_>) -> String {
    node.attribute("id")
        .map(str::to_string)
        .unwrap_or_else(|| node.tag_name().name().to_string())
}

fn is_transparent(node: &Node<'_, '_>) -> bool {
    style_property(node, "opacity")
        .and_then(|value| value.parse::<f64>().ok())
        .is_some_and(|opacity| opacity <= 0.0)
}

fn walk<'a>(
    parent: Node<'a, '_>,
    context: RenderContext<'a>,
    options: &DocumentOptions,
    out: &mut ParsedDocument,
) {
    for node in parent.children().filter(Node::is_element) {
        let tag = node.tag_name().name();
        if tag == "defs" || has_style(&node, "display", "none") {
            debug!("Skipping {} and its children", element_name(&node));
            continue;
        }

        let transform = match node.attribute("transform") {
            Some(value) => match parse_transform(value) {
                Ok(own) => context.compose(own),
                Err(e) => {
                    out.warn(Warning::SkippedElement {
                        element: element_name(&node),
                        reason: e.to_string(),
                    });
                    continue;
                }
            },
            None => context.transform,
        };

        let hidden = has_style(&node, "visibility", "hidden")
            || has_style(&node, "visibility", "collapse");
        let visible =
            (context.visible && !hidden) || has_style(&node, "visibility", "visible");
        let child = RenderContext {
            visible,
            opaque: context.opaque && !is_transparent(&node),
            transform,
            fill: context.inherit_fill(style_property(&node, "fill")),
        };

        if tag == "path" && child.is_drawn(options.draw_hidden) {
            draw_path(&node, &child, out);
        }

        walk(node, child, options, out);
    }
}

fn draw_path(node: &Node<'_, '_>, context: &RenderContext<'_>, out: &mut ParsedDocument) {
    let Some(data) = node.attribute("d") else {
        out.warn(Warning::SkippedElement {
            element: element_name(node),
            reason: "path has no data".to_string(),
        });
        return;
    };

    let fill = context.fill.unwrap_or(DEFAULT_FILL).trim();
    let cut = is_cut_color(fill);

    match parse_path(data, context.transform.as_ref(), cut) {
        Ok(path) => {
            debug!(
                element = %element_name(node),
                curves = path.len(),
                cut,
                "Interpreted path"
            );
            out.curves.extend(path.curves.iter().copied());
            if path.closed && fill != "none" {
                out.areas.push(Area {
                    path,
                    color: fill.to_string(),
                });
            }
        }
        Err(e) => out.warn(Warning::SkippedElement {
            element: element_name(node),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasertrace_core::Vector;

    fn svg(body: &str) -> String {
        format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50mm">{body}</svg>"#)
    }

    #[test]
    fn test_group_transform_is_inherited() {
        let doc = parse_string(
            &svg(r#"<g transform="translate(10 0)"><path d="M0 0 L1 0"/></g>"#),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.curves.len(), 1);
        assert_eq!(doc.curves[0].start(), Vector::new(10.0, 0.0));
    }

    #[test]
    fn test_own_transform_applies_before_ancestor() {
        let doc = parse_string(
            &svg(r#"<g transform="scale(2)"><path transform="translate(5 0)" d="M0 0 L1 0"/></g>"#),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.curves[0].start(), Vector::new(10.0, 0.0));
    }

    #[test]
    fn test_transform_origin_flips_y() {
        let options = DocumentOptions {
            transform_origin: true,
            ..Default::default()
        };
        let doc = parse_string(&svg(r#"<path d="M0 0 L0 10"/>"#), &options).unwrap();
        assert_eq!(doc.curves[0].start(), Vector::new(0.0, 50.0));
        assert_eq!(doc.curves[0].end(), Vector::new(0.0, 40.0));
    }

    #[test]
    fn test_transform_origin_requires_height() {
        let options = DocumentOptions {
            transform_origin: true,
            ..Default::default()
        };
        let err = parse_string(r#"<svg><path d="M0 0 L1 1"/></svg>"#, &options).unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn test_red_fill_is_cut() {
        let doc = parse_string(
            &svg(r##"<path style="fill:#ff0000" d="M0 0 L1 0"/><path d="M0 0 L2 0"/>"##),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert!(doc.curves[0].cut());
        assert!(!doc.curves[1].cut());
    }

    #[test]
    fn test_fill_is_inherited_from_group() {
        let doc = parse_string(
            &svg(concat!(
                r##"<g style="fill:#ff0000">"##,
                r##"<path d="M0 0 L1 0"/>"##,
                r##"<path fill="inherit" d="M0 1 H4 V4 Z"/>"##,
                r##"<path fill="#000000" d="M0 2 L1 2"/>"##,
                "</g>",
            )),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert!(doc.curves[0].cut());
        assert!(doc.curves[1].cut());
        assert!(!doc.curves.last().unwrap().cut());
        assert_eq!(doc.areas.len(), 1);
        assert_eq!(doc.areas[0].color, "#ff0000");
    }

    #[test]
    fn test_own_fill_overrides_inherited() {
        let context = RenderContext {
            fill: Some("red"),
            ..Default::default()
        };
        assert_eq!(context.inherit_fill(Some("blue")), Some("blue"));
        assert_eq!(context.inherit_fill(Some("inherit")), Some("red"));
        assert_eq!(context.inherit_fill(None), Some("red"));
        assert_eq!(RenderContext::default().inherit_fill(None), None);
    }

    #[test]
    fn test_malformed_path_is_skipped_with_warning() {
        let doc = parse_string(
            &svg(r#"<path id="bad" d="M0 0 X1 1"/><path d="M0 0 L1 0"/>"#),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.curves.len(), 1);
        assert_eq!(doc.warnings.len(), 1);
        assert!(matches!(
            &doc.warnings[0],
            Warning::SkippedElement { element, .. } if element == "bad"
        ));
    }

    #[test]
    fn test_invalid_document() {
        let err = parse_string("<svg><path", &DocumentOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }
}

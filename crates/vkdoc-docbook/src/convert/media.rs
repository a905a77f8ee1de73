//! Figures and media objects

use vkdoc_core::Node;

use super::Converter;
use crate::element::{Element, ElementKind};
use crate::{ConvertError, Result};

impl Converter {
    /// Convert a figure or media object to an image.
    ///
    /// Images without a file reference or text alternative are malformed
    /// and abort the document instead of disappearing silently.
    pub(super) fn convert_image(&mut self, element: &Element) -> Result<Vec<Node>> {
        let url = element
            .find_descendant(&ElementKind::ImageData)
            .and_then(|data| data.attr("fileref"))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| malformed(element, "no imagedata fileref"))?;

        let alt = image_alt(element).ok_or_else(|| malformed(element, "no text alternative"))?;

        let title = match element.kind {
            ElementKind::Figure | ElementKind::InformalFigure => element
                .find_child(&ElementKind::Title)
                .map(|title| title.text_content().trim().to_string())
                .filter(|title| !title.is_empty()),
            _ => None,
        };

        let mut out = Vec::new();
        if let Some(id) = element.id() {
            out.push(Node::anchor(id));
        }
        out.push(Node::Image {
            url: url.to_string(),
            alt,
            title,
        });
        Ok(out)
    }
}

/// `textobject/phrase`, falling back to an `alt` element
fn image_alt(element: &Element) -> Option<String> {
    let from_text_object = element
        .find_descendant(&ElementKind::TextObject)
        .and_then(|text| text.find_child(&ElementKind::Phrase))
        .map(Element::text_content);

    from_text_object
        .or_else(|| {
            element
                .find_descendant(&ElementKind::Alt)
                .map(Element::text_content)
        })
        .map(|alt| alt.trim().to_string())
}

fn malformed(element: &Element, reason: &str) -> ConvertError {
    ConvertError::MalformedElement {
        element: element.name().to_string(),
        reason: reason.to_string(),
    }
}

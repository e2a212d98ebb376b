use super::{RenderId, RenderObject, RenderTree};
use crate::backend::{Painter, TextLayout};
use crate::color::Color;
use crate::measure::{MeasureRequirement, MeasureSize};
use crate::rect::Size;
use core::any::Any;

/// A leaf that shows a text layout.
#[derive(Debug)]
pub struct TextObject {
    layout: Box<dyn TextLayout>,
    brush: Color,
}

impl TextObject {
    pub fn new(layout: Box<dyn TextLayout>, brush: Color) -> TextObject {
        TextObject { layout, brush }
    }

    pub fn text(&self) -> &str {
        self.layout.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.layout.set_text(text.into());
    }

    pub fn brush(&self) -> Color {
        self.brush
    }

    pub fn set_brush(&mut self, brush: Color) {
        self.brush = brush;
    }
}

impl RenderObject for TextObject {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn measure_content(
        &mut self,
        _: &mut RenderTree,
        _: RenderId,
        requirement: &MeasureRequirement,
        preferred: MeasureSize,
    ) -> Size {
        let wrap_width = preferred
            .width
            .length_or(requirement.max.width.length_or_max());
        let text_size = self.layout.measure(wrap_width);

        Size::new(
            text_size
                .x
                .max(preferred.width.length_or_zero())
                .max(requirement.min.width.length_or_zero())
                .min(requirement.max.width.length_or_max()),
            text_size
                .y
                .max(preferred.height.length_or_zero())
                .max(requirement.min.height.length_or_zero())
                .min(requirement.max.height.length_or_max()),
        )
    }

    fn draw_content(&self, tree: &RenderTree, id: RenderId, painter: &mut dyn Painter) {
        painter.draw_text(tree.content_rect(id).origin, &*self.layout, self.brush);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::FixedTextLayout;
    use crate::measure::MeasureLength;

    #[test]
    fn wraps_at_max_width() {
        let mut tree = RenderTree::new();
        // 10 units per character, 12 per line
        let text = tree.insert(Box::new(TextObject::new(
            Box::new(FixedTextLayout::new("hello world", 10., 12.)),
            Color::BLACK,
        )));

        let size = tree.measure(text, &MeasureRequirement::unbounded(), MeasureSize::unspecified());
        assert_eq!(size, Size::new(110., 12.));

        let size = tree.measure(
            text,
            &MeasureRequirement::at_most(MeasureSize::new(
                MeasureLength::new(60.),
                MeasureLength::Unspecified,
            )),
            MeasureSize::unspecified(),
        );
        assert_eq!(size, Size::new(60., 24.));
    }

    #[test]
    fn set_text_remeasures() {
        let mut tree = RenderTree::new();
        let text = tree.insert(Box::new(TextObject::new(
            Box::new(FixedTextLayout::new("ab", 10., 12.)),
            Color::BLACK,
        )));
        tree.measure(text, &MeasureRequirement::unbounded(), MeasureSize::unspecified());
        tree.update_object::<TextObject, _>(text, |t| t.set_text("abcd"));
        let size = tree.measure(text, &MeasureRequirement::unbounded(), MeasureSize::unspecified());
        assert_eq!(size.x, 40.);
        assert_eq!(tree.object_as::<TextObject>(text).map(|t| t.text()), Some("abcd"));
    }
}

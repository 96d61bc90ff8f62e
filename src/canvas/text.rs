//! Text properties and annotations.
//!
//! The live text attributes sit in the drawing state, so they follow
//! push/pop like every other attribute. The canvas also keeps a
//! [`TextProperties`] record, created by the first text setter; every setter
//! rewrites it from the drawing state so the two never diverge.

use super::Canvas;
use crate::color::Color;
use crate::drawing::{Alignment, Shape, TextProperties};
use crate::error::{CanvasError, Result};
use crate::imaging::ImageEngine;

impl<E: ImageEngine> Canvas<E> {
    /// A text properties record: the current settings when `read_default`
    /// is true, otherwise an empty one.
    pub fn new_text_properties(&self, read_default: bool) -> Result<TextProperties> {
        let res = self.resources()?;
        if read_default {
            Ok(res.drawing.state().text.clone())
        } else {
            Ok(TextProperties::empty())
        }
    }

    /// Apply every field of `props`.
    ///
    /// An empty font name or a non-positive size leaves that field as it
    /// was, the same as [`Canvas::set_font`].
    pub fn set_text_properties(&mut self, props: &TextProperties) -> Result<()> {
        self.update_text(|text| apply_properties(text, props))
    }

    /// A copy of the stored record, `None` until a text setter ran.
    pub fn text_properties(&self) -> Result<Option<TextProperties>> {
        self.resources()?;
        Ok(self.text.clone())
    }

    fn update_text(&mut self, change: impl FnOnce(&mut TextProperties)) -> Result<()> {
        let res = self.resources.as_mut().ok_or(CanvasError::Destroyed)?;
        let text = &mut res.drawing.state_mut().text;
        change(text);
        self.text = Some(text.clone());
        Ok(())
    }

    fn current_text(&self) -> Result<&TextProperties> {
        Ok(&self.resources()?.drawing.state().text)
    }

    pub fn set_font_name(&mut self, font: &str) -> Result<()> {
        self.update_text(|text| text.font = font.to_string())
    }

    pub fn font_name(&self) -> Result<String> {
        Ok(self.current_text()?.font.clone())
    }

    pub fn set_font_family(&mut self, family: &str) -> Result<()> {
        self.update_text(|text| text.family = family.to_string())
    }

    pub fn font_family(&self) -> Result<String> {
        Ok(self.current_text()?.family.clone())
    }

    pub fn set_font_size(&mut self, size: f64) -> Result<()> {
        self.update_text(|text| text.size = size)
    }

    pub fn font_size(&self) -> Result<f64> {
        Ok(self.current_text()?.size)
    }

    /// CSS-style weight, 100 (thin) to 900 (black).
    pub fn set_font_weight(&mut self, weight: u32) -> Result<()> {
        self.update_text(|text| text.weight = weight)
    }

    pub fn font_weight(&self) -> Result<u32> {
        Ok(self.current_text()?.weight)
    }

    /// Set font name and size together. An empty name keeps the current
    /// font; a size `<= 0` keeps the current size.
    pub fn set_font(&mut self, font: &str, size: f64) -> Result<()> {
        self.update_text(|text| set_font_fields(text, font, size))
    }

    pub fn font(&self) -> Result<(String, f64)> {
        let text = self.current_text()?;
        Ok((text.font.clone(), text.size))
    }

    pub fn set_text_alignment(&mut self, alignment: Alignment) -> Result<()> {
        self.update_text(|text| text.alignment = alignment)
    }

    pub fn text_alignment(&self) -> Result<Alignment> {
        Ok(self.current_text()?.alignment)
    }

    pub fn set_text_antialias(&mut self, antialias: bool) -> Result<()> {
        self.update_text(|text| text.antialias = antialias)
    }

    pub fn text_antialias(&self) -> Result<bool> {
        Ok(self.current_text()?.antialias)
    }

    /// Extra spacing between glyphs, in pixels.
    pub fn set_text_kerning(&mut self, kerning: f64) -> Result<()> {
        self.update_text(|text| text.kerning = kerning)
    }

    pub fn text_kerning(&self) -> Result<f64> {
        Ok(self.current_text()?.kerning)
    }

    /// Color of the box painted behind annotations; `"none"` disables it.
    pub fn set_text_under_color(&mut self, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        self.update_text(|text| text.under_color = color)
    }

    pub fn text_under_color(&self) -> Result<Color> {
        Ok(self.current_text()?.under_color)
    }

    /// Queue `text` with its baseline anchored at `(x, y)` relative to the
    /// current origin, filled with the fill color.
    pub fn annotate(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.emit(Shape::Text {
            text: text.to_string(),
            x,
            y,
        })
    }

    /// Annotate with `props` applied for this one call; the previous text
    /// settings and record are restored afterwards.
    pub fn annotate_with_properties(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        props: &TextProperties,
    ) -> Result<()> {
        let saved_record = self.text.clone();
        let saved_state = self.current_text()?.clone();

        self.set_text_properties(props)?;
        let annotated = self.annotate(text, x, y);

        let res = self.resources_mut()?;
        res.drawing.state_mut().text = saved_state;
        self.text = saved_record;
        annotated
    }
}

fn set_font_fields(text: &mut TextProperties, font: &str, size: f64) {
    if !font.is_empty() {
        text.font = font.to_string();
    }
    if size > 0.0 {
        text.size = size;
    }
}

fn apply_properties(text: &mut TextProperties, props: &TextProperties) {
    text.family = props.family.clone();
    set_font_fields(text, &props.font, props.size);
    text.weight = props.weight;
    text.alignment = props.alignment;
    text.antialias = props.antialias;
    text.kerning = props.kerning;
    text.under_color = props.under_color;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockEngine;

    fn canvas() -> Canvas<MockEngine> {
        Canvas::with_engine(MockEngine::new())
    }

    #[test]
    fn record_is_absent_until_first_setter() {
        let mut canvas = canvas();
        assert_eq!(canvas.text_properties().unwrap(), None);
        canvas.set_font_size(30.0).unwrap();

        let record = canvas.text_properties().unwrap().unwrap();
        assert_eq!(record.size, 30.0);
        assert_eq!(canvas.font_size().unwrap(), 30.0);
    }

    #[test]
    fn new_text_properties_reads_defaults_or_is_empty() {
        let mut canvas = canvas();
        canvas.set_font_family("DejaVu Sans").unwrap();

        let current = canvas.new_text_properties(true).unwrap();
        assert_eq!(current.family, "DejaVu Sans");
        assert_eq!(current.size, 12.0);

        let empty = canvas.new_text_properties(false).unwrap();
        assert_eq!(empty, TextProperties::empty());
    }

    #[test]
    fn set_font_skips_empty_name_and_non_positive_size() {
        let mut canvas = canvas();
        canvas.set_font("Serif", 20.0).unwrap();
        canvas.set_font("", 0.0).unwrap();
        assert_eq!(canvas.font().unwrap(), ("Serif".to_string(), 20.0));

        canvas.set_font("Mono", -3.0).unwrap();
        assert_eq!(canvas.font().unwrap(), ("Mono".to_string(), 20.0));
    }

    #[test]
    fn set_text_properties_keeps_record_and_state_in_sync() {
        let mut canvas = canvas();
        canvas.set_font("Serif", 18.0).unwrap();

        let mut props = TextProperties::empty();
        props.family = "Sans".into();
        props.weight = 700;
        props.alignment = Alignment::Center;
        props.kerning = 2.0;
        canvas.set_text_properties(&props).unwrap();

        let record = canvas.text_properties().unwrap().unwrap();
        assert_eq!(record.font, "Serif");
        assert_eq!(record.size, 18.0);
        assert_eq!(record.family, "Sans");
        assert_eq!(record.weight, 700);
        assert!(!record.antialias);
        assert_eq!(&record, canvas.current_text().unwrap());
        assert_eq!(canvas.text_alignment().unwrap(), Alignment::Center);
        assert_eq!(canvas.text_kerning().unwrap(), 2.0);
    }

    #[test]
    fn annotate_with_properties_restores_previous_settings() {
        let mut canvas = canvas();
        canvas.set_font("Serif", 14.0).unwrap();
        let before = canvas.text_properties().unwrap();

        let mut props = canvas.new_text_properties(true).unwrap();
        props.size = 40.0;
        props.weight = 900;
        canvas.annotate_with_properties("hello", 5.0, 10.0, &props).unwrap();

        assert_eq!(canvas.text_properties().unwrap(), before);
        assert_eq!(canvas.font_size().unwrap(), 14.0);

        let pending = canvas.resources().unwrap().drawing.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].state.text.size, 40.0);
        assert_eq!(pending[0].state.text.weight, 900);
        assert_eq!(
            pending[0].shape,
            Shape::Text {
                text: "hello".into(),
                x: 5.0,
                y: 10.0
            }
        );
    }

    #[test]
    fn pop_drawing_restores_text_record() {
        let mut canvas = canvas();
        canvas.set_font_size(10.0).unwrap();
        canvas.push_drawing().unwrap();
        canvas.set_font_size(50.0).unwrap();
        canvas.pop_drawing().unwrap();

        assert_eq!(canvas.font_size().unwrap(), 10.0);
        assert_eq!(canvas.text_properties().unwrap().unwrap().size, 10.0);
    }

    #[test]
    fn under_color_parses_strings() {
        let mut canvas = canvas();
        canvas.set_text_under_color("#000000").unwrap();
        assert_eq!(canvas.text_under_color().unwrap(), Color::BLACK);
        assert!(canvas.set_text_under_color("nope").is_err());
        assert_eq!(canvas.text_under_color().unwrap(), Color::BLACK);
    }
}

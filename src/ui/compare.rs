/// Before/after comparison slider
///
/// The restored image fills the background; the original is drawn on top,
/// clipped to the left of a draggable divider.
use iced::alignment;
use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, event, Event, Frame, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::state::data::{ImageFile, RestorationResult};

/// Divider position a fresh comparison starts at
pub const DEFAULT_POSITION: f32 = 50.0;

const DIVIDER_WIDTH: f32 = 4.0;
const HANDLE_RADIUS: f32 = 16.0;
const LETTERBOX: Color = Color::from_rgb(0.06, 0.09, 0.16);

/// Convert a pointer offset from the left edge into a percentage of `width`
///
/// Always within [0, 100]; offsets left of the edge give 0 and past the
/// right edge give 100.
pub fn position_for_offset(offset_x: f32, width: f32) -> f32 {
    if !width.is_finite() || width <= 0.0 || offset_x.is_nan() {
        return 0.0;
    }
    let x = offset_x.clamp(0.0, width);
    (x / width * 100.0).clamp(0.0, 100.0)
}

/// Largest rectangle with the image's aspect ratio centered in `container`
///
/// Both layers are drawn into this one rectangle so they line up exactly.
pub fn fit_contain(container: Size, dimensions: Option<(u32, u32)>) -> Rectangle {
    let full = Rectangle::new(Point::ORIGIN, container);

    let Some((width, height)) = dimensions else {
        return full;
    };
    if width == 0 || height == 0 || container.width <= 0.0 || container.height <= 0.0 {
        return full;
    }

    let scale = (container.width / width as f32).min(container.height / height as f32);
    let fitted = Size::new(width as f32 * scale, height as f32 * scale);

    Rectangle::new(
        Point::new(
            (container.width - fitted.width) / 2.0,
            (container.height - fitted.height) / 2.0,
        ),
        fitted,
    )
}

/// Drag state for the divider, owned by the canvas widget
///
/// It lives in the widget tree, so it starts over at 50% each time a
/// comparison is mounted and is dropped with the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    position: f32,
    dragging: bool,
}

impl Default for SliderState {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            dragging: false,
        }
    }
}

impl SliderState {
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self) {
        self.dragging = true;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// Move the divider if a drag is in progress. Returns true if it moved.
    pub fn drag_to(&mut self, offset_x: f32, width: f32) -> bool {
        if !self.dragging {
            return false;
        }
        let position = position_for_offset(offset_x, width);
        let moved = position != self.position;
        self.position = position;
        moved
    }
}

/// Canvas program drawing the two layers and the divider
#[derive(Debug, Clone)]
pub struct Comparison {
    original: Handle,
    restored: Handle,
    /// Intrinsic size used to fit both layers
    dimensions: Option<(u32, u32)>,
}

impl Comparison {
    pub fn new(original: &ImageFile, restored: &RestorationResult) -> Self {
        Self {
            original: original.handle.clone(),
            restored: restored.handle.clone(),
            dimensions: original.dimensions.or(restored.dimensions),
        }
    }

    fn draw_label(frame: &mut Frame, text: &str, top_left: Point, background: Color) {
        frame.fill_rectangle(top_left, Size::new(72.0, 24.0), background);
        frame.fill_text(canvas::Text {
            content: text.to_string(),
            position: Point::new(top_left.x + 36.0, top_left.y + 12.0),
            color: Color::WHITE,
            size: 13.0.into(),
            horizontal_alignment: alignment::Horizontal::Center,
            vertical_alignment: alignment::Vertical::Center,
            ..canvas::Text::default()
        });
    }
}

impl<Message> Program<Message> for Comparison {
    type State = SliderState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let size = bounds.size();
        let image_rect = fit_contain(size, self.dimensions);
        let divider_x = size.width * state.position / 100.0;

        // Restored image: full-size background
        frame.fill_rectangle(Point::ORIGIN, size, LETTERBOX);
        frame.draw_image(image_rect, canvas::Image::new(self.restored.clone()));
        Self::draw_label(
            &mut frame,
            "Restored",
            Point::new(size.width - 84.0, 12.0),
            Color::from_rgba(0.15, 0.39, 0.92, 0.8),
        );

        // Original image: same rectangle, clipped to the left of the divider
        let clip = Rectangle::new(Point::ORIGIN, Size::new(divider_x, size.height));
        frame.with_clip(clip, |frame| {
            frame.fill_rectangle(Point::ORIGIN, size, LETTERBOX);
            frame.draw_image(image_rect, canvas::Image::new(self.original.clone()));
            Self::draw_label(
                frame,
                "Original",
                Point::new(12.0, 12.0),
                Color::from_rgba(0.0, 0.0, 0.0, 0.6),
            );
        });

        // Divider line and grab handle
        frame.fill_rectangle(
            Point::new(divider_x - DIVIDER_WIDTH / 2.0, 0.0),
            Size::new(DIVIDER_WIDTH, size.height),
            Color::WHITE,
        );

        let center = Point::new(divider_x, size.height / 2.0);
        frame.fill(&Path::circle(center, HANDLE_RADIUS), Color::WHITE);

        let arrows = Path::new(|p| {
            p.move_to(Point::new(center.x + 4.0, center.y - 5.0));
            p.line_to(Point::new(center.x + 9.0, center.y));
            p.line_to(Point::new(center.x + 4.0, center.y + 5.0));
            p.move_to(Point::new(center.x - 4.0, center.y - 5.0));
            p.line_to(Point::new(center.x - 9.0, center.y));
            p.line_to(Point::new(center.x - 4.0, center.y + 5.0));
        });
        frame.stroke(
            &arrows,
            Stroke::default()
                .with_color(Color::from_rgb(0.06, 0.09, 0.16))
                .with_width(2.0),
        );

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (event::Status, Option<Message>) {
        match event {
            // Press inside the viewer starts a drag
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if cursor.position_in(bounds).is_some() {
                    state.press();
                    return (event::Status::Captured, None);
                }
            }
            Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                if bounds.contains(position) {
                    state.press();
                    return (event::Status::Captured, None);
                }
            }

            Event::Mouse(mouse::Event::CursorMoved { position })
            | Event::Touch(touch::Event::FingerMoved { position, .. }) => {
                if state.is_dragging() {
                    state.drag_to(position.x - bounds.x, bounds.width);
                    return (event::Status::Captured, None);
                }
            }

            // Releases are seen window-wide, so a drag ending outside the
            // viewer still stops tracking
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
            | Event::Touch(touch::Event::FingerLifted { .. })
            | Event::Touch(touch::Event::FingerLost { .. }) => {
                if state.is_dragging() {
                    state.release();
                    return (event::Status::Captured, None);
                }
            }

            _ => {}
        }

        (event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging() || cursor.is_over(bounds) {
            mouse::Interaction::ResizingHorizontally
        } else {
            mouse::Interaction::default()
        }
    }
}

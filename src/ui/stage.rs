//! Video stage: the surface overlays are positioned on
//!
//! The stream itself plays in an external window; the stage is its stand-in
//! inside the terminal. Overlay coordinates are pixels, so every cell maps to
//! a fixed pixel block and pointer cells map back to pixel points.

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use super::Theme;
use crate::app::App;
use crate::drag::DragTarget;
use crate::models::{Extent, OverlaySet, Point};

/// Pixel width of one terminal cell
pub const CELL_WIDTH_PX: f64 = 8.0;
/// Pixel height of one terminal cell
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Cell/pixel mapping for the stage's inner area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageGeometry {
    area: Rect,
}

impl StageGeometry {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Container size in pixels
    pub fn container(&self) -> Extent {
        Extent::new(
            f64::from(self.area.width) * CELL_WIDTH_PX,
            f64::from(self.area.height) * CELL_HEIGHT_PX,
        )
    }

    /// Pixel point of a terminal cell, relative to the stage origin.
    ///
    /// Cells outside the stage give points outside the container.
    pub fn to_point(&self, column: u16, row: u16) -> Point {
        Point::new(
            (f64::from(column) - f64::from(self.area.x)) * CELL_WIDTH_PX,
            (f64::from(row) - f64::from(self.area.y)) * CELL_HEIGHT_PX,
        )
    }

    /// Cells covered by an element, clipped to the stage
    pub fn cells_for(&self, position: Point, extent: Extent) -> Option<Rect> {
        let col = (position.x / CELL_WIDTH_PX).floor();
        let row = (position.y / CELL_HEIGHT_PX).floor();
        let width = (extent.width / CELL_WIDTH_PX).ceil().max(1.0);
        let height = (extent.height / CELL_HEIGHT_PX).ceil().max(1.0);

        let (x0, y0) = (f64::from(self.area.x), f64::from(self.area.y));
        let left = (x0 + col).max(x0);
        let top = (y0 + row).max(y0);
        let right = (x0 + col + width).min(f64::from(self.area.right()));
        let bottom = (y0 + row + height).min(f64::from(self.area.bottom()));
        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    pub fn caption_cells(&self, overlays: &OverlaySet) -> Option<Rect> {
        self.cells_for(overlays.caption.position(), overlays.caption.footprint())
    }

    /// None while the logo has no image
    pub fn logo_cells(&self, overlays: &OverlaySet) -> Option<Rect> {
        if !overlays.logo.is_visible() {
            return None;
        }
        self.cells_for(overlays.logo.position(), overlays.logo.footprint())
    }

    /// Element under a cell; the logo is drawn last so it wins overlaps
    pub fn hit_test(&self, overlays: &OverlaySet, column: u16, row: u16) -> Option<DragTarget> {
        let at = Position::new(column, row);
        if self.logo_cells(overlays).is_some_and(|r| r.contains(at)) {
            return Some(DragTarget::Logo);
        }
        if self.caption_cells(overlays).is_some_and(|r| r.contains(at)) {
            return Some(DragTarget::Caption);
        }
        None
    }
}

/// Render the stage block with placeholder and overlays
pub fn render_stage(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.form.endpoint.is_some() {
        Span::styled(" ● LIVE ", Theme::success())
    } else {
        Span::styled(" STAGE ", Theme::title())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(title)
        .style(Theme::stage());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let placeholder = if app.form.loading {
        Span::styled("⟳ Starting stream...", Theme::loading())
    } else if app.form.endpoint.is_some() {
        Span::styled("▶ playing in external player", Theme::dimmed())
    } else {
        Span::styled("No stream. Press i to enter an RTSP URL", Theme::dimmed())
    };
    let middle = Rect {
        y: inner.y + inner.height / 2,
        height: inner.height.min(1),
        ..inner
    };
    frame.render_widget(
        Paragraph::new(Line::from(placeholder)).alignment(Alignment::Center),
        middle,
    );

    if app.form.endpoint.is_none() {
        return;
    }

    let stage = StageGeometry::new(inner);
    let overlays = &app.editor.overlays;
    let dragging = app.drag.target();

    if let Some(cells) = stage.caption_cells(overlays) {
        let style = Theme::caption(
            overlays.caption.opacity,
            dragging == Some(DragTarget::Caption),
        );
        frame.render_widget(
            Paragraph::new(overlays.caption.text.as_str()).style(style),
            cells,
        );
    }

    if let Some(cells) = stage.logo_cells(overlays) {
        let style = Theme::logo(overlays.logo.opacity, dragging == Some(DragTarget::Logo));
        let body = Paragraph::new(overlays.logo.image_url.as_str())
            .style(style)
            .wrap(Wrap { trim: true });
        if cells.width >= 3 && cells.height >= 3 {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Plain)
                .border_style(style)
                .title("logo");
            frame.render_widget(body.block(block), cells);
        } else {
            frame.render_widget(body, cells);
        }
    }
}

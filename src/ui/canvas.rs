// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and annotation.
//!
//! This module draws the open image with its shapes and turns pointer
//! gestures into selections, clicks and overlay edits in image
//! coordinates.

use crate::app::Tool;
use crate::models::box_edit::{OverlayRect, RectEdit};
use crate::models::label::Rgb;
use crate::models::polygon::CANCEL_POINT;
use crate::models::shape::{Point, Selection, Shape, ShapeKind};
use crate::session::AnnotatorSession;
use crate::util::geometry::ViewTransform;

/// Screen distance within which a press grabs an overlay corner.
const CORNER_GRAB_RADIUS: f64 = 8.0;

/// Minimum image-space spacing between recorded lasso points.
const LASSO_SPACING: f64 = 1.0;

/// Pointer gesture in progress on the canvas.
#[derive(Debug, Clone, Default)]
pub enum CanvasDrag {
    #[default]
    Idle,
    Range {
        start: Point,
        current: Point,
    },
    Lasso {
        points: Vec<Point>,
    },
    Corner {
        overlay: usize,
        moves_x0: bool,
        moves_y0: bool,
    },
    Move {
        overlay: usize,
        grab: Point,
        rect: OverlayRect,
    },
}

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Select(Selection),
    Click(Point),
    Finish,
    OverlayEdit(usize, RectEdit),
}

/// Display the main canvas area and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    session: &AnnotatorSession,
    image_texture: &Option<egui::TextureHandle>,
    current_tool: Tool,
    display_height: u32,
    drag: &mut CanvasDrag,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(anchor)) = (image_texture, session.annotations().anchor()) else {
            show_welcome(ui, session.image_id().is_some());
            return;
        };

        let area = ui.available_rect_before_wrap();
        let view = ViewTransform::fit(
            (anchor.width, anchor.height),
            (f64::from(area.width()), f64::from(area.height())),
            (f64::from(area.min.x), f64::from(area.min.y)),
            display_height,
        );
        let image_rect = egui::Rect::from_min_max(
            to_pos(&view, &Point::new(0.0, 0.0)),
            to_pos(
                &view,
                &Point::new(f64::from(anchor.width), f64::from(anchor.height)),
            ),
        );

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
        let pointer = response
            .interact_pointer_pos()
            .map(|p| view.to_image(f64::from(p.x), f64::from(p.y)));
        let press_origin = ui
            .input(|i| i.pointer.press_origin())
            .map(|p| view.to_image(f64::from(p.x), f64::from(p.y)));

        action = if session.is_editing() {
            handle_overlay(&response, pointer, press_origin, &view, &session.overlay(), drag)
        } else {
            match current_tool {
                Tool::Box => handle_range(&response, pointer, press_origin, drag),
                Tool::Lasso => handle_lasso(&response, pointer, press_origin, drag),
                Tool::Click => handle_clicks(&response, pointer),
            }
        };

        let painter = ui.painter().with_clip_rect(image_rect);
        for shape in session.annotations().shapes() {
            draw_shape(&painter, shape, &view);
        }
        draw_drag_preview(&painter, drag, &view);
        for rect in &session.overlay() {
            draw_overlay_rect(&painter, rect, &view);
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("Current tool: {:?}", current_tool));
        ui.separator();
        ui.label(format!("Mode: {:?}", session.lasso_mode()));
        ui.separator();
        if session.is_editing() {
            ui.label("Editing boxes");
        } else if session.is_drawing() {
            ui.label("Drawing");
        } else {
            ui.label("Ready");
        }
        ui.separator();
        ui.label(format!("{} shapes", session.annotations().len()));
    });

    action
}

fn handle_range(
    response: &egui::Response,
    pointer: Option<Point>,
    press_origin: Option<Point>,
    drag: &mut CanvasDrag,
) -> CanvasAction {
    if response.drag_started() {
        if let Some(start) = press_origin.or(pointer) {
            *drag = CanvasDrag::Range {
                start,
                current: start,
            };
        }
    }
    if response.dragged() {
        if let (CanvasDrag::Range { current, .. }, Some(p)) = (&mut *drag, pointer) {
            *current = p;
        }
    }
    if response.drag_stopped() {
        if let CanvasDrag::Range { start, current } = std::mem::take(drag) {
            let end = pointer.unwrap_or(current);
            return CanvasAction::Select(Selection::Range {
                x: [start.x, end.x],
                y: [start.y, end.y],
            });
        }
    }
    CanvasAction::None
}

fn handle_lasso(
    response: &egui::Response,
    pointer: Option<Point>,
    press_origin: Option<Point>,
    drag: &mut CanvasDrag,
) -> CanvasAction {
    if response.drag_started() {
        if let Some(start) = press_origin.or(pointer) {
            *drag = CanvasDrag::Lasso {
                points: vec![start],
            };
        }
    }
    if response.dragged() {
        if let (CanvasDrag::Lasso { points }, Some(p)) = (&mut *drag, pointer) {
            let far_enough = points
                .last()
                .map_or(true, |last| last.distance(&p) >= LASSO_SPACING);
            if far_enough {
                points.push(p);
            }
        }
    }
    if response.drag_stopped() {
        if let CanvasDrag::Lasso { points } = std::mem::take(drag) {
            if points.len() >= 2 {
                return CanvasAction::Select(Selection::Lasso {
                    x: points.iter().map(|p| p.x).collect(),
                    y: points.iter().map(|p| p.y).collect(),
                });
            }
        }
    }
    CanvasAction::None
}

fn handle_clicks(response: &egui::Response, pointer: Option<Point>) -> CanvasAction {
    if response.secondary_clicked() {
        return CanvasAction::Click(CANCEL_POINT);
    }
    if response.double_clicked() {
        return CanvasAction::Finish;
    }
    if response.clicked() {
        if let Some(p) = pointer {
            return CanvasAction::Click(p);
        }
    }
    CanvasAction::None
}

fn handle_overlay(
    response: &egui::Response,
    pointer: Option<Point>,
    press_origin: Option<Point>,
    view: &ViewTransform,
    overlay: &[OverlayRect],
    drag: &mut CanvasDrag,
) -> CanvasAction {
    if response.drag_started() {
        if let Some(origin) = press_origin.or(pointer) {
            *drag = grab_overlay(origin, view, overlay);
        }
    }

    if response.dragged() {
        if let Some(p) = pointer {
            match drag {
                CanvasDrag::Corner {
                    overlay,
                    moves_x0,
                    moves_y0,
                } => {
                    let edit = RectEdit {
                        x0: moves_x0.then_some(p.x),
                        x1: (!*moves_x0).then_some(p.x),
                        y0: moves_y0.then_some(p.y),
                        y1: (!*moves_y0).then_some(p.y),
                    };
                    return CanvasAction::OverlayEdit(*overlay, edit);
                }
                CanvasDrag::Move {
                    overlay,
                    grab,
                    rect,
                } => {
                    let (dx, dy) = (p.x - grab.x, p.y - grab.y);
                    let edit = RectEdit::corners(
                        rect.x0 + dx,
                        rect.y0 + dy,
                        rect.x1 + dx,
                        rect.y1 + dy,
                    );
                    return CanvasAction::OverlayEdit(*overlay, edit);
                }
                _ => {}
            }
        }
    }

    if response.drag_stopped() {
        *drag = CanvasDrag::Idle;
    }
    CanvasAction::None
}

/// Pick the overlay corner or rectangle under a press.
fn grab_overlay(origin: Point, view: &ViewTransform, overlay: &[OverlayRect]) -> CanvasDrag {
    let radius = CORNER_GRAB_RADIUS / view.scale;
    for (index, rect) in overlay.iter().enumerate() {
        let corners = [
            (rect.x0, rect.y0, true, true),
            (rect.x1, rect.y0, false, true),
            (rect.x1, rect.y1, false, false),
            (rect.x0, rect.y1, true, false),
        ];
        for (x, y, moves_x0, moves_y0) in corners {
            if origin.distance(&Point::new(x, y)) <= radius {
                return CanvasDrag::Corner {
                    overlay: index,
                    moves_x0,
                    moves_y0,
                };
            }
        }
    }

    overlay
        .iter()
        .enumerate()
        .find(|(_, r)| {
            (r.x0.min(r.x1)..=r.x0.max(r.x1)).contains(&origin.x)
                && (r.y0.min(r.y1)..=r.y0.max(r.y1)).contains(&origin.y)
        })
        .map_or(CanvasDrag::Idle, |(index, rect)| CanvasDrag::Move {
            overlay: index,
            grab: origin,
            rect: *rect,
        })
}

fn to_pos(view: &ViewTransform, point: &Point) -> egui::Pos2 {
    let (x, y) = view.to_screen(point);
    egui::pos2(x as f32, y as f32)
}

fn color32(color: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(color.0, color.1, color.2)
}

/// Draw a shape on the canvas.
fn draw_shape(painter: &egui::Painter, shape: &Shape, view: &ViewTransform) {
    if !shape.is_shown() || shape.points.is_empty() {
        return;
    }
    let color = color32(shape.label.color);
    let screen_points: Vec<egui::Pos2> = shape.points.iter().map(|p| to_pos(view, p)).collect();

    if shape.kind == ShapeKind::Model {
        for point in &screen_points {
            painter.circle_filled(*point, 4.0, color);
        }
        return;
    }

    // Closed kinds already repeat their first point, so consecutive pairs suffice.
    for pair in screen_points.windows(2) {
        painter.line_segment([pair[0], pair[1]], egui::Stroke::new(2.0, color));
    }

    if shape.kind != ShapeKind::Box {
        for point in &screen_points {
            painter.circle_filled(*point, 3.0, color);
            painter.circle_stroke(*point, 3.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }
    }
}

fn draw_drag_preview(painter: &egui::Painter, drag: &CanvasDrag, view: &ViewTransform) {
    let stroke = egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE);
    match drag {
        CanvasDrag::Range { start, current } => {
            let rect = egui::Rect::from_two_pos(to_pos(view, start), to_pos(view, current));
            painter.rect_stroke(rect, 0.0, stroke);
        }
        CanvasDrag::Lasso { points } => {
            let screen: Vec<egui::Pos2> = points.iter().map(|p| to_pos(view, p)).collect();
            painter.add(egui::Shape::line(screen, stroke));
        }
        _ => {}
    }
}

fn draw_overlay_rect(painter: &egui::Painter, rect: &OverlayRect, view: &ViewTransform) {
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x0, rect.y0),
    ];
    let screen: Vec<egui::Pos2> = corners.iter().map(|p| to_pos(view, p)).collect();
    let stroke = egui::Stroke::new(2.0, egui::Color32::WHITE);

    if rect.dashed {
        painter.extend(egui::Shape::dashed_line(&screen, stroke, 6.0, 4.0));
    } else {
        painter.add(egui::Shape::line(screen.clone(), stroke));
    }
    for corner in &screen[..4] {
        painter.circle_filled(*corner, 4.0, egui::Color32::WHITE);
    }
}

fn show_welcome(ui: &mut egui::Ui, image_selected: bool) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Annotator")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            let hint = if image_selected {
                "The selected image could not be displayed"
            } else {
                "Select an image from the list to begin annotating"
            };
            ui.label(egui::RichText::new(hint).color(egui::Color32::from_gray(180)));
        });
    });
}

use anyhow::Context as _;
use eframe::{
    egui::{self, Align2, Color32, FontFamily, FontId, Key, Modifiers, RichText, Sense, TextureHandle, Ui},
    epaint::Shadow,
    App, CreationContext, Frame,
};
use image::RgbaImage;
use rfd::FileDialog;
use std::{fs, path::Path, path::PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, error, info};

use crate::background::{self, Background};
use crate::canvas::CanvasState;
use crate::export;
use crate::geometry::{fit_contain, Point};
use crate::lengths::{self, LengthReport};
use crate::model::{ConnectionId, ElementType, IconId};
use crate::params::{BulbInterface, ParamForm, SensorInterface, SensorKind, SwitchInterface};
use crate::scale::ScaleCalibrator;
use crate::settings::{AppSettings, PDF_RENDER_WIDTH};

const VERTEX_RADIUS: f32 = 4.0;
const HIT_TOLERANCE: f32 = 6.0;
const GRID_STEP: f32 = 36.0;

#[derive(Debug, Clone, PartialEq)]
enum DragTarget {
    Icon { id: IconId, grab: (f32, f32) },
    Vertex { connection: ConnectionId, index: usize },
}

pub struct WireplanApp {
    canvas: CanvasState,
    calibrator: ScaleCalibrator,
    settings: AppSettings,
    settings_path: Option<PathBuf>,
    status: String,
    show_params: bool,
    show_settings: bool,
    dragging_palette: Option<ElementType>,
    drag_target: Option<DragTarget>,
    param_form: Option<(IconId, ParamForm)>,
    param_error: Option<String>,
    distance_input: String,
    scale_error: Option<String>,
    report: Option<LengthReport>,
    alert: Option<String>,
    background: Option<Background>,
    background_texture: Option<TextureHandle>,
    canvas_size: egui::Vec2,
}

impl WireplanApp {
    pub fn new(cc: &CreationContext<'_>, settings: AppSettings) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            canvas: CanvasState::new(),
            calibrator: ScaleCalibrator::new(),
            settings,
            settings_path: AppSettings::default_path(),
            status: "Ready".to_string(),
            show_params: false,
            show_settings: false,
            dragging_palette: None,
            drag_target: None,
            param_form: None,
            param_error: None,
            distance_input: String::new(),
            scale_error: None,
            report: None,
            alert: None,
            background: None,
            background_texture: None,
            canvas_size: egui::Vec2::ZERO,
        }
    }

    fn accent(&self) -> Color32 {
        let [r, g, b, a] = self.settings.accent_color;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    fn surface_panel() -> egui::Frame {
        egui::Frame::default()
            .fill(Color32::from_rgba_unmultiplied(18, 23, 34, 236))
            .stroke(egui::Stroke::new(
                1.0,
                Color32::from_rgba_unmultiplied(255, 255, 255, 20),
            ))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(14.0))
            .outer_margin(egui::Margin::same(2.0))
            .shadow(Shadow {
                offset: egui::vec2(0.0, 6.0),
                blur: 24.0,
                spread: 0.0,
                color: Color32::from_rgba_unmultiplied(0, 0, 0, 130),
            })
    }

    fn card_frame() -> egui::Frame {
        egui::Frame::default()
            .fill(Color32::from_rgba_unmultiplied(255, 255, 255, 7))
            .stroke(egui::Stroke::new(
                1.0,
                Color32::from_rgba_unmultiplied(255, 255, 255, 20),
            ))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0))
    }

    fn to_color(rgba: [u8; 4]) -> Color32 {
        let [r, g, b, a] = rgba;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    fn sidebar(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Elements").strong().size(16.0));
        ui.label(RichText::new("Drag onto the plan").color(Color32::from_gray(160)));
        ui.add_space(4.0);
        for element in ElementType::iter() {
            let button = egui::Button::new(
                RichText::new(format!("{}  {}", element.icon(), element.label())).size(15.0),
            )
            .fill(Color32::from_rgba_unmultiplied(28, 36, 49, 230))
            .sense(Sense::click_and_drag());
            let resp = ui.add_sized([ui.available_width(), 30.0], button);
            if resp.drag_started() {
                self.dragging_palette = Some(element);
            } else if resp.clicked() {
                let center = Point::new(self.canvas_size.x / 2.0, self.canvas_size.y / 2.0);
                self.place_icon(element, center);
            }
        }

        ui.separator();
        ui.label(RichText::new("Tools").strong().size(16.0));
        let params_label = if self.show_params { "Hide params" } else { "Show params" };
        if ui.button(params_label).clicked() {
            self.show_params = !self.show_params;
        }
        if ui.button("Cable length").clicked() {
            self.calculate_lengths();
        }
        if ui.button("Upload schema").clicked() {
            self.pick_background();
        }
        let scale_label = if self.calibrator.is_active() { "Cancel scale" } else { "Set scale" };
        if ui.button(scale_label).clicked() {
            self.calibrator.toggle_mode();
            self.status = if self.calibrator.is_active() {
                "Click or drag along a known distance".to_string()
            } else {
                "Scale mode cancelled".to_string()
            };
        }
        if ui.button("Download schema").clicked() {
            self.download_image();
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.canvas.can_undo(), egui::Button::new("↶ Undo"))
                .clicked()
            {
                self.undo();
            }
            if ui
                .add_enabled(self.canvas.can_redo(), egui::Button::new("↷ Redo"))
                .clicked()
            {
                self.redo();
            }
        });
        if ui.button("Clear canvas").clicked() {
            self.canvas.clear();
            self.drag_target = None;
            self.status = "Canvas cleared".to_string();
        }
        if ui.button("Settings").clicked() {
            self.show_settings = true;
        }

        ui.add_space(8.0);
        Self::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            match self.calibrator.pixels_per_meter() {
                Some(ppm) => ui.monospace(format!("Scale: {ppm:.2} px/m")),
                None => ui.monospace("Scale: not set"),
            };
            ui.monospace(format!("Icons: {}", self.canvas.icons().len()));
            ui.monospace(format!("Cables: {}", self.canvas.connections().len()));
            if let Some(bg) = &self.background {
                ui.monospace(format!("Plan: {}", bg.source_name));
            }
            if let Some(first) = self.canvas.pending_endpoint() {
                ui.colored_label(self.accent(), format!("Connecting from {first}"));
            }
        });
    }

    fn place_icon(&mut self, element: ElementType, position: Point) {
        let id = self.canvas.place_icon(element, position);
        self.param_form = Some((id, ParamForm::new(element)));
        self.param_error = None;
        self.status = format!("Placed {}", element.label());
    }

    fn undo(&mut self) {
        if self.canvas.undo() {
            self.drag_target = None;
            self.status = "Undo applied".to_string();
        }
    }

    fn redo(&mut self) {
        if self.canvas.redo() {
            self.drag_target = None;
            self.status = "Redo applied".to_string();
        }
    }

    fn calculate_lengths(&mut self) {
        let report = lengths::aggregate(&self.canvas, self.calibrator.scale().as_ref());
        info!(groups = report.groups.len(), "computed cable lengths");
        self.report = Some(report);
    }

    fn pick_background(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Schema", &["pdf", "png", "jpg", "jpeg", "bmp"])
            .pick_file()
        else {
            return;
        };
        match self.read_background(&path) {
            Ok(bg) => {
                self.status = format!("Loaded {}", bg.source_name);
                self.background = Some(bg);
                self.background_texture = None;
            }
            Err(err) => {
                error!("{err:#}");
                self.status = format!("{err:#}");
            }
        }
    }

    fn read_background(&self, path: &Path) -> anyhow::Result<Background> {
        let bytes = fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
        let bg = background::load_background(
            &background::display_name(path),
            bytes,
            self.settings.pdf_render_width,
            self.settings.pdfium_library.as_deref(),
        )?;
        Ok(bg)
    }

    fn refresh_background_texture(&mut self, ctx: &egui::Context) {
        let Some(bg) = &self.background else {
            self.background_texture = None;
            return;
        };
        let size = [bg.image.width() as usize, bg.image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, bg.image.as_raw());
        self.background_texture = Some(ctx.load_texture(
            "schema_background",
            color_image,
            egui::TextureOptions::LINEAR,
        ));
    }

    fn render_export(&self) -> anyhow::Result<RgbaImage> {
        let size = (
            self.canvas_size.x.round().max(0.0) as u32,
            self.canvas_size.y.round().max(0.0) as u32,
        );
        let image = export::render_scene(
            &self.canvas,
            self.calibrator.scale().as_ref(),
            self.background.as_ref().map(|bg| &bg.image),
            size,
            &export::ExportStyle {
                show_params: self.show_params,
                ..self.settings.export_style()
            },
        )?;
        Ok(image)
    }

    fn download_image(&mut self) {
        let image = match self.render_export() {
            Ok(image) => image,
            Err(err) => {
                error!("Error generating image: {err:#}");
                self.alert = Some("Error: Unable to generate the image.".to_string());
                return;
            }
        };
        let Some(path) = FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(&self.settings.export_file_name)
            .save_file()
        else {
            return;
        };
        match export::export_png(&path, &image) {
            Ok(()) => self.status = format!("Exported {}", path.display()),
            Err(err) => {
                error!("Error saving image: {err}");
                self.alert = Some("Error: Unable to generate the image.".to_string());
            }
        }
    }

    fn save_report_csv(&mut self, report: &LengthReport) {
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("cable-lengths.csv")
            .save_file()
        else {
            return;
        };
        let result = fs::File::create(&path)
            .with_context(|| format!("unable to create {}", path.display()))
            .and_then(|file| report.write_csv(file).context("unable to write CSV"));
        match result {
            Ok(()) => self.status = format!("Saved {}", path.display()),
            Err(err) => {
                error!("{err:#}");
                self.status = format!("CSV export failed: {err:#}");
            }
        }
    }

    fn canvas_view(&mut self, ui: &mut Ui) {
        let desired = ui.available_size();
        let (resp, painter) = ui.allocate_painter(desired, Sense::click_and_drag());
        let rect = resp.rect;
        self.canvas_size = rect.size();
        if self.background_texture.is_none() && self.background.is_some() {
            self.refresh_background_texture(ui.ctx());
        }

        let origin = rect.left_top();
        let to_screen = |p: Point| egui::pos2(origin.x + p.x, origin.y + p.y);
        let to_local = |p: egui::Pos2| Point::new(p.x - origin.x, p.y - origin.y);

        painter.rect_filled(rect, 10.0, Color32::from_rgba_unmultiplied(255, 255, 255, 16));
        painter.rect_stroke(rect, 10.0, egui::Stroke::new(1.0, self.accent()));

        if let Some(texture) = &self.background_texture {
            let [w, h] = texture.size();
            let (w, h) = fit_contain(w as f32, h as f32, rect.width(), rect.height());
            painter.image(
                texture.id(),
                egui::Rect::from_min_size(origin, egui::vec2(w, h)),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        if self.settings.show_grid {
            let stroke = egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 16));
            let mut x = rect.left();
            while x < rect.right() {
                painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], stroke);
                x += GRID_STEP;
            }
            let mut y = rect.top();
            while y < rect.bottom() {
                painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);
                y += GRID_STEP;
            }
        }

        self.paint_scene(&painter, &to_screen);

        if self.calibrator.is_active() || self.calibrator.dialog_open() {
            self.handle_scale_input(ui, &resp, &to_local);
        } else {
            self.handle_canvas_input(ui, &resp, &to_local);
        }

        if let Some((a, b)) = self.calibrator.preview_line() {
            painter.line_segment([to_screen(a), to_screen(b)], egui::Stroke::new(1.0, Color32::RED));
        }

        if let Some(kind) = self.dragging_palette {
            if let Some(pointer) = ui.ctx().pointer_latest_pos() {
                let ghost = ui.ctx().layer_painter(egui::LayerId::new(
                    egui::Order::Tooltip,
                    egui::Id::new("palette_ghost"),
                ));
                let size = self.settings.icon_size;
                ghost.rect_filled(
                    egui::Rect::from_center_size(pointer, egui::vec2(size, size)),
                    4.0,
                    Self::to_color(kind.color()).gamma_multiply(0.6),
                );
            }
            if ui.input(|i| i.pointer.any_released()) {
                self.dragging_palette = None;
                if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
                    if rect.contains(pos) {
                        self.place_icon(kind, to_local(pos));
                    }
                }
            }
        }
    }

    fn paint_scene(&self, painter: &egui::Painter, to_screen: &impl Fn(Point) -> egui::Pos2) {
        let cable = egui::Stroke::new(2.0, Color32::from_rgb(20, 20, 20));
        let halo = egui::Stroke::new(4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 90));

        if let Some(scale) = self.calibrator.scale() {
            painter.line_segment(
                [to_screen(scale.a), to_screen(scale.b)],
                egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 60, 60, 120)),
            );
        }

        for conn in self.canvas.connections() {
            let Some(points) = self.canvas.polyline(conn) else {
                continue;
            };
            let screen: Vec<egui::Pos2> = points.into_iter().map(to_screen).collect();
            painter.add(egui::Shape::line(screen.clone(), halo));
            painter.add(egui::Shape::line(screen, cable));
            for vertex in &conn.vertices {
                painter.circle(
                    to_screen(*vertex),
                    VERTEX_RADIUS,
                    Color32::RED,
                    egui::Stroke::new(1.0, Color32::BLACK),
                );
            }
        }

        let size = self.settings.icon_size;
        for icon in self.canvas.icons() {
            let center = to_screen(icon.position);
            let icon_rect = egui::Rect::from_center_size(center, egui::vec2(size, size));
            painter.rect_filled(icon_rect, 4.0, Self::to_color(icon.element.color()));
            let selected = self.canvas.pending_endpoint() == Some(&icon.id);
            let outline = if selected {
                egui::Stroke::new(2.5, self.accent())
            } else {
                egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(0, 0, 0, 180))
            };
            painter.rect_stroke(icon_rect, 4.0, outline);
            painter.text(
                center,
                Align2::CENTER_CENTER,
                icon.element.icon(),
                FontId::new(size * 0.55, FontFamily::Proportional),
                Color32::WHITE,
            );
            if let Some(name) = icon.name() {
                painter.text(
                    icon_rect.center_bottom() + egui::vec2(0.0, 2.0),
                    Align2::CENTER_TOP,
                    name,
                    FontId::new(11.0, FontFamily::Proportional),
                    Color32::from_gray(230),
                );
            }

            if self.show_params {
                if let Some(params) = &icon.params {
                    let text = params
                        .entries()
                        .into_iter()
                        .map(|(key, value)| format!("{key}: {value}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    let galley = painter.layout_no_wrap(text, FontId::monospace(11.0), Color32::BLACK);
                    let pos = icon_rect.right_top() + egui::vec2(6.0, 0.0);
                    let bg = egui::Rect::from_min_size(pos, galley.size()).expand(4.0);
                    painter.rect_filled(bg, 4.0, Color32::WHITE);
                    painter.rect_stroke(bg, 4.0, egui::Stroke::new(1.0, Color32::BLACK));
                    painter.galley(pos, galley, Color32::BLACK);
                }
            }
        }
    }

    fn handle_scale_input(&mut self, ui: &Ui, resp: &egui::Response, to_local: &impl Fn(egui::Pos2) -> Point) {
        if resp.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }
        let was_open = self.calibrator.dialog_open();
        let pointer = resp.interact_pointer_pos();
        if resp.drag_started() {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                self.calibrator.press(to_local(origin));
            }
        }
        if let Some(hover) = ui.input(|i| i.pointer.hover_pos()) {
            self.calibrator.motion(to_local(hover));
        }
        if resp.drag_stopped() {
            if let Some(pos) = pointer {
                self.calibrator.release(to_local(pos));
            }
        } else if resp.clicked() {
            if let Some(pos) = pointer {
                self.calibrator.click(to_local(pos));
            }
        }
        if !was_open && self.calibrator.dialog_open() {
            self.distance_input.clear();
            self.scale_error = None;
        }
    }

    fn handle_canvas_input(&mut self, ui: &Ui, resp: &egui::Response, to_local: &impl Fn(egui::Pos2) -> Point) {
        let size = self.settings.icon_size;
        let pointer = resp.interact_pointer_pos().map(to_local);

        if resp.drag_started() {
            let origin = ui.input(|i| i.pointer.press_origin()).map(to_local);
            self.drag_target = origin.and_then(|p| self.pick_drag_target(p));
            if self.drag_target.is_some() {
                self.canvas.begin_drag();
            }
        }
        if resp.dragged() {
            if let (Some(target), Some(p)) = (&self.drag_target, pointer) {
                let result = match target {
                    DragTarget::Icon { id, grab } => self.canvas.move_icon(id, p.offset(-grab.0, -grab.1)),
                    DragTarget::Vertex { connection, index } => self.canvas.move_vertex(*connection, *index, p),
                };
                if let Err(err) = result {
                    debug!("drag target vanished: {err}");
                    self.drag_target = None;
                }
            }
        }
        if resp.drag_stopped() {
            self.drag_target = None;
        }

        let Some(p) = pointer else {
            return;
        };
        let hit_icon = self.canvas.hit_icon(p, size).cloned();

        // egui flags any two quick clicks as a double click, even across icons.
        let repeat_on_icon = hit_icon.as_ref().is_some_and(|id| self.canvas.is_repeat_click(id));
        if resp.double_clicked() && (repeat_on_icon || hit_icon.is_none()) {
            if let Some(id) = &hit_icon {
                self.canvas.clear_selection();
                self.open_param_editor(id);
            } else if self.canvas.hit_vertex(p, HIT_TOLERANCE).is_none() {
                if let Some(conn) = self.canvas.hit_connection(p, HIT_TOLERANCE) {
                    if let Err(err) = self.canvas.insert_vertex(conn, p) {
                        debug!("{err}");
                    }
                }
            }
        } else if resp.clicked() {
            if let Some(id) = &hit_icon {
                if self.canvas.click_icon(id).is_some() {
                    self.status = "Cable added".to_string();
                }
            }
        }

        if resp.secondary_clicked() {
            let outcome = if let Some(id) = hit_icon {
                self.canvas.delete_icon(&id).map(|n| format!("Deleted {id} and {n} cable(s)"))
            } else if let Some((conn, index)) = self.canvas.hit_vertex(p, HIT_TOLERANCE) {
                self.canvas.delete_vertex(conn, index).map(|_| "Bend removed".to_string())
            } else if let Some(conn) = self.canvas.hit_connection(p, HIT_TOLERANCE) {
                self.canvas.delete_connection(conn).map(|_| "Cable removed".to_string())
            } else {
                return;
            };
            match outcome {
                Ok(status) => self.status = status,
                Err(err) => debug!("{err}"),
            }
        }
    }

    fn pick_drag_target(&self, p: Point) -> Option<DragTarget> {
        if let Some(id) = self.canvas.hit_icon(p, self.settings.icon_size) {
            let icon = self.canvas.icon(id)?;
            return Some(DragTarget::Icon {
                id: id.clone(),
                grab: (p.x - icon.position.x, p.y - icon.position.y),
            });
        }
        self.canvas
            .hit_vertex(p, HIT_TOLERANCE)
            .map(|(connection, index)| DragTarget::Vertex { connection, index })
    }

    fn open_param_editor(&mut self, id: &IconId) {
        let Some(icon) = self.canvas.icon(id) else {
            return;
        };
        let form = icon
            .params
            .as_ref()
            .map(ParamForm::from_params)
            .unwrap_or_else(|| ParamForm::new(icon.element));
        if self.canvas.edit_params(id).is_ok() {
            self.param_form = Some((id.clone(), form));
            self.param_error = None;
        }
    }

    fn param_dialog(&mut self, ctx: &egui::Context) {
        let Some(awaiting) = self.canvas.awaiting_params().cloned() else {
            self.param_form = None;
            return;
        };
        let (id, mut form) = match self.param_form.take() {
            Some((id, form)) if id == awaiting => (id, form),
            _ => {
                let element = self.canvas.icon(&awaiting).map(|icon| icon.element);
                let Some(element) = element else {
                    self.canvas.dismiss_params();
                    return;
                };
                (awaiting, ParamForm::new(element))
            }
        };

        let mut open = true;
        let mut commit = false;
        egui::Window::new(format!("{} parameters", form.element.label()))
            .id(egui::Id::new("param_dialog"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Grid::new("param_grid").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                    Self::param_fields(ui, &mut form);
                });
                if let Some(err) = &self.param_error {
                    ui.colored_label(Color32::from_rgb(221, 113, 113), err);
                }
                ui.separator();
                if ui.button("Close").clicked() {
                    commit = true;
                }
            });

        if commit {
            match form.validate() {
                Ok(params) => {
                    if let Err(err) = self.canvas.commit_params(&id, params) {
                        debug!("{err}");
                    }
                    self.param_error = None;
                    return;
                }
                Err(err) => self.param_error = Some(err.to_string()),
            }
        }
        if open {
            self.param_form = Some((id, form));
        } else {
            self.canvas.dismiss_params();
            self.param_error = None;
        }
    }

    fn param_fields(ui: &mut Ui, form: &mut ParamForm) {
        ui.label("Name");
        ui.text_edit_singleline(&mut form.name);
        ui.end_row();

        match form.element {
            ElementType::Bulb => {
                ui.label("Power, A");
                ui.text_edit_singleline(&mut form.power);
                ui.end_row();
                ui.label("Voltage, V");
                ui.text_edit_singleline(&mut form.voltage);
                ui.end_row();
                ui.label("Control interface");
                enum_combo(ui, "bulb_interface", &mut form.bulb_interface, BulbInterface::label);
                ui.end_row();
            }
            ElementType::Sensor => {
                ui.label("Type");
                enum_combo(ui, "sensor_kind", &mut form.sensor_kind, SensorKind::label);
                ui.end_row();
                ui.label("Supply");
                ui.text_edit_singleline(&mut form.supply);
                ui.end_row();
                ui.label("Control interface");
                enum_combo(ui, "sensor_interface", &mut form.sensor_interface, SensorInterface::label);
                ui.end_row();
            }
            ElementType::Switch => {
                ui.label("Control interface");
                enum_combo(ui, "switch_interface", &mut form.switch_interface, SwitchInterface::label);
                ui.end_row();
            }
            ElementType::MainPanel => {}
        }

        ui.label("Cable drop, m");
        ui.text_edit_singleline(&mut form.cable);
        ui.end_row();
        ui.label("Group");
        ui.text_edit_singleline(&mut form.group);
        ui.end_row();
    }

    fn scale_dialog(&mut self, ctx: &egui::Context) {
        if !self.calibrator.dialog_open() {
            return;
        }
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Set the scale")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Distance in m:");
                    let edit = ui.text_edit_singleline(&mut self.distance_input);
                    if edit.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                        submit = true;
                    }
                    edit.request_focus();
                });
                if let Some(err) = &self.scale_error {
                    ui.colored_label(Color32::from_rgb(221, 113, 113), err);
                }
                if ui.button("Set scale").clicked() {
                    submit = true;
                }
            });

        if submit {
            let parsed = self.distance_input.trim().replace(',', ".").parse::<f32>();
            match parsed {
                Ok(meters) => match self.calibrator.confirm(meters) {
                    Ok(ppm) => {
                        self.status = format!("Scale set: {ppm:.2} px/m");
                        self.scale_error = None;
                    }
                    Err(err) => self.scale_error = Some(err.to_string()),
                },
                Err(_) => self.scale_error = Some("Enter the distance in meters".to_string()),
            }
        }
        if !open {
            self.calibrator.dismiss_dialog();
            self.scale_error = None;
        }
    }

    fn report_dialog(&mut self, ctx: &egui::Context) {
        let Some(report) = self.report.clone() else {
            return;
        };
        let mut open = true;
        let mut save_csv = false;
        let mut close = false;
        egui::Window::new("Cable length")
            .open(&mut open)
            .collapsible(false)
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.monospace(report.to_string());
                if !report.is_empty() {
                    ui.separator();
                    ui.monospace(format!("Total: {:.2} {}", report.total(), report.unit.suffix()));
                }
                ui.horizontal(|ui| {
                    if ui.add_enabled(!report.is_empty(), egui::Button::new("Save CSV")).clicked() {
                        save_csv = true;
                    }
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });
        if save_csv {
            self.save_report_csv(&report);
        }
        if close || !open {
            self.report = None;
        }
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.alert.clone() {
            let mut dismissed = false;
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.alert = None;
            }
        }

        if self.show_settings {
            let mut save = false;
            egui::Window::new("Settings")
                .open(&mut self.show_settings)
                .show(ctx, |ui| {
                    ui.label("Accent Color");
                    ui.color_edit_button_srgba_unmultiplied(&mut self.settings.accent_color);
                    ui.add(egui::Slider::new(&mut self.settings.ui_scale, 0.8..=1.5).text("UI Scale"));
                    ui.add(egui::Slider::new(&mut self.settings.icon_size, 16.0..=96.0).text("Icon size"));
                    ui.checkbox(&mut self.settings.show_grid, "Show grid");
                    ui.horizontal(|ui| {
                        ui.label("PDF render width");
                        ui.add(egui::DragValue::new(&mut self.settings.pdf_render_width).range(PDF_RENDER_WIDTH));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Export file name");
                        ui.text_edit_singleline(&mut self.settings.export_file_name);
                    });
                    ui.separator();
                    if ui.button("Save settings").clicked() {
                        save = true;
                    }
                });
            if save {
                self.save_settings();
            }
        }
    }

    fn save_settings(&mut self) {
        let Some(path) = self.settings_path.clone() else {
            self.status = "No configuration directory available".to_string();
            return;
        };
        match self.settings.save_to(&path) {
            Ok(()) => self.status = format!("Saved settings to {}", path.display()),
            Err(err) => {
                error!("{err}");
                self.status = err.to_string();
            }
        }
    }

    fn shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let redo = ctx.input_mut(|i| {
            i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                || i.consume_key(Modifiers::COMMAND, Key::Y)
        });
        if redo {
            self.redo();
        } else if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::Z)) {
            self.undo();
        }
        if ctx.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Escape)) {
            self.canvas.clear_selection();
            if self.calibrator.is_active() {
                self.calibrator.cancel();
                self.status = "Scale mode cancelled".to_string();
            }
        }
    }
}

fn enum_combo<T>(ui: &mut Ui, id: &str, value: &mut T, label: fn(T) -> &'static str)
where
    T: Copy + PartialEq + IntoEnumIterator,
{
    egui::ComboBox::from_id_source(id)
        .selected_text(label(*value))
        .show_ui(ui, |ui| {
            for option in T::iter() {
                ui.selectable_value(value, option, label(option));
            }
        });
}

impl App for WireplanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        style.visuals.window_fill = Color32::from_rgb(18, 23, 34);
        style.visuals.panel_fill = Color32::from_rgb(10, 13, 21);
        style.visuals.override_text_color = Some(Color32::from_rgb(226, 233, 242));
        style.visuals.widgets.hovered.bg_fill = Color32::from_rgba_unmultiplied(
            self.accent().r(),
            self.accent().g(),
            self.accent().b(),
            120,
        );
        style.visuals.widgets.active.bg_fill = self.accent();
        style.visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(
            self.accent().r(),
            self.accent().g(),
            self.accent().b(),
            128,
        );
        ctx.set_style(style);

        self.shortcuts(ctx);

        egui::TopBottomPanel::bottom("status")
            .frame(Self::surface_panel())
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(self.status.as_str());
                    for element in ElementType::iter() {
                        let count = self
                            .canvas
                            .icons()
                            .iter()
                            .filter(|icon| icon.element == element)
                            .count();
                        ui.label(format!("{} {}", element.icon(), count));
                    }
                });
            });

        egui::SidePanel::left("palette")
            .resizable(true)
            .default_width(220.0)
            .frame(Self::surface_panel())
            .show(ctx, |ui| self.sidebar(ui));

        egui::CentralPanel::default()
            .frame(Self::surface_panel().inner_margin(egui::Margin::same(18.0)))
            .show(ctx, |ui| self.canvas_view(ui));

        self.param_dialog(ctx);
        self.scale_dialog(ctx);
        self.report_dialog(ctx);
        self.dialogs(ctx);
    }
}

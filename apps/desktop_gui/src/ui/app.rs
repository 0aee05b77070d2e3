use std::{fs, time::Duration, time::Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use qr_core::{
    Completion, ControllerPhase, Debouncer, DownloadSink, EncodeError, FormController,
    PreviewImage, SaveOutcome,
};
use shared::{
    domain::{parse_hex_color, Rgba8},
    ErrorCorrectionLevel, FormError, GenerationId, StatusSeverity,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const STATUS_INFO_COLOR: egui::Color32 = egui::Color32::from_rgb(0xa9, 0xaf, 0xc3);
const STATUS_OK_COLOR: egui::Color32 = egui::Color32::from_rgb(0xa7, 0xf3, 0xd0);
const STATUS_ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x6b, 0x6b);
const IDLE_REPAINT: Duration = Duration::from_millis(250);
const PENDING_REPAINT: Duration = Duration::from_millis(30);

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Capacity => "Capacity",
        UiErrorCategory::InvalidOption => "Invalid option",
        UiErrorCategory::Runtime => "Runtime",
        UiErrorCategory::Io => "File system",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

fn status_color(severity: StatusSeverity) -> egui::Color32 {
    match severity {
        StatusSeverity::Info => STATUS_INFO_COLOR,
        StatusSeverity::Ok => STATUS_OK_COLOR,
        StatusSeverity::Error => STATUS_ERROR_COLOR,
    }
}

fn color32(rgba: Rgba8) -> egui::Color32 {
    let [r, g, b, a] = rgba.0;
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

struct PreviewTexture {
    generation: GenerationId,
    texture: TextureHandle,
}

/// Saves through the native "Save as" dialog.
struct FileDialogSink;

impl DownloadSink for FileDialogSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> anyhow::Result<SaveOutcome> {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter("PNG image", &["png"])
            .save_file()
        else {
            return Ok(SaveOutcome::Cancelled);
        };
        fs::write(&path, png)
            .map_err(|err| anyhow::anyhow!("failed to write '{}': {err}", path.display()))?;
        Ok(SaveOutcome::Saved {
            location: Some(path),
        })
    }
}

pub struct QrStudioApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    controller: FormController,
    preview_texture: Option<PreviewTexture>,
    diagnostics: Option<UiError>,
    worker_note: String,
}

impl QrStudioApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &Settings,
    ) -> Self {
        let controller = FormController::with_debouncer(
            settings.initial_form(),
            Debouncer::new(settings.debounce_delay()),
        );
        let mut app = Self {
            cmd_tx,
            ui_rx,
            controller,
            preview_texture: None,
            diagnostics: None,
            worker_note: "Encoder starting...".to_string(),
        };
        // Show an example code right away.
        app.generate();
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.worker_note = message;
                }
                UiEvent::Encoded { id, outcome } => {
                    match self.controller.complete_generate(id, outcome) {
                        Completion::Applied => self.diagnostics = None,
                        Completion::Failed(reason) => {
                            self.diagnostics =
                                Some(UiError::from_message(UiErrorContext::Generate, reason));
                        }
                        Completion::Stale => {}
                    }
                }
                UiEvent::Error(err) => {
                    tracing::error!(context = ?err.context(), "{}", err.message());
                    self.worker_note = format!("{}: {}", err_label(err.category()), err.message());
                    self.diagnostics = Some(err);
                }
            }
        }
    }

    fn generate(&mut self) {
        let ticket = match self.controller.begin_generate() {
            Ok(ticket) => ticket,
            Err(err) => {
                tracing::debug!("generation refused: {err}");
                return;
            }
        };

        let id = ticket.id;
        let cmd = BackendCommand::Encode {
            id,
            text: ticket.text,
            options: ticket.options,
        };
        if let Err(reason) = dispatch_backend_command(&self.cmd_tx, cmd) {
            if let Completion::Failed(reason) = self
                .controller
                .complete_generate(id, Err(EncodeError::Worker(reason)))
            {
                self.diagnostics = Some(UiError::from_message(UiErrorContext::Generate, reason));
            }
        }
    }

    fn download(&mut self) {
        if let Err(err) = self.controller.download_current(&mut FileDialogSink) {
            if let FormError::SaveFailed(reason) = &err {
                self.diagnostics = Some(UiError::from_message(
                    UiErrorContext::Download,
                    reason.clone(),
                ));
            }
        }
    }

    fn clear(&mut self) {
        self.controller.clear();
        self.preview_texture = None;
        self.diagnostics = None;
    }

    fn tick_auto_generate(&mut self, now: Instant) {
        if self.controller.take_due_auto_generate(now) {
            self.generate();
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        let mut edited = false;

        ui.label("Text or URL");
        let form = self.controller.form_mut();
        edited |= ui
            .add(
                egui::TextEdit::multiline(&mut form.text)
                    .hint_text("https://example.com")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            )
            .changed();

        ui.add_space(6.0);
        egui::Grid::new("qr_options_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Size (px)");
                edited |= ui
                    .add(egui::TextEdit::singleline(&mut form.size_input).desired_width(80.0))
                    .changed();
                ui.end_row();

                ui.label("Error correction");
                let before = form.error_correction;
                egui::ComboBox::from_id_salt("error_correction_combo")
                    .selected_text(form.error_correction.description())
                    .show_ui(ui, |ui| {
                        for level in ErrorCorrectionLevel::ALL {
                            ui.selectable_value(
                                &mut form.error_correction,
                                level,
                                level.description(),
                            );
                        }
                    });
                edited |= before != form.error_correction;
                ui.end_row();

                ui.label("Foreground");
                edited |= color_field(ui, &mut form.foreground, [0, 0, 0]);
                ui.end_row();

                ui.label("Background");
                edited |= color_field(ui, &mut form.background, [255, 255, 255]);
                ui.end_row();
            });

        if edited {
            self.controller.schedule_auto_generate(now);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Generate").clicked() {
                self.generate();
            }
            if ui.button("Download PNG").clicked() {
                self.download();
            }
            if ui.button("Clear").clicked() {
                self.clear();
            }
        });

        ui.add_space(6.0);
        let status = self.controller.status();
        ui.label(egui::RichText::new(&status.text).color(status_color(status.severity)));
    }

    fn show_diagnostics(&mut self, ui: &mut egui::Ui) {
        let Some(err) = self.diagnostics.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{}: {}", err_label(err.category()), err.hint()))
                            .color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.diagnostics = None;
                        }
                    });
                });
                ui.collapsing("Details", |ui| {
                    ui.monospace(err.message());
                });
            });
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        let Some(preview) = self.controller.preview().cloned() else {
            let placeholder = match self.controller.phase() {
                ControllerPhase::Pending => "Generating...",
                _ => "No QR code yet",
            };
            ui.centered_and_justified(|ui| {
                ui.weak(placeholder);
            });
            return;
        };

        let texture = match self.preview_texture_for(ui.ctx(), &preview) {
            Ok(texture) => texture,
            Err(reason) => {
                ui.colored_label(STATUS_ERROR_COLOR, format!("Preview unavailable: {reason}"));
                return;
            }
        };

        let edge = preview.edge as f32;
        let background = parse_hex_color(&preview.background)
            .map(color32)
            .unwrap_or(egui::Color32::WHITE);
        egui::ScrollArea::both().show(ui, |ui| {
            egui::Frame::NONE
                .fill(background)
                .corner_radius(preview.corner_radius)
                .show(ui, |ui| {
                    ui.add(
                        egui::Image::new(&texture)
                            .fit_to_exact_size(egui::vec2(edge, edge))
                            .corner_radius(preview.corner_radius),
                    )
                    .on_hover_text("QR code");
                });
        });
    }

    fn preview_texture_for(
        &mut self,
        ctx: &egui::Context,
        preview: &PreviewImage,
    ) -> Result<TextureHandle, String> {
        if let Some(cached) = &self.preview_texture {
            if cached.generation == preview.generation {
                return Ok(cached.texture.clone());
            }
        }

        let color_image = decode_preview_image(&preview.png)?;
        let texture = ctx.load_texture(
            format!("qr-preview:{}", preview.generation.0),
            color_image,
            egui::TextureOptions::NEAREST,
        );
        self.preview_texture = Some(PreviewTexture {
            generation: preview.generation,
            texture: texture.clone(),
        });
        Ok(texture)
    }

    fn repaint_after(&self, now: Instant) -> Duration {
        let mut delay = if self.controller.phase() == ControllerPhase::Pending {
            PENDING_REPAINT
        } else {
            IDLE_REPAINT
        };
        if let Some(remaining) = self.controller.auto_generate_remaining(now) {
            delay = delay.min(remaining);
        }
        delay
    }
}

/// Color picker plus the hex value it maps to. Returns `true` when edited.
fn color_field(ui: &mut egui::Ui, hex: &mut String, fallback: [u8; 3]) -> bool {
    let mut rgb = parse_hex_color(hex).map(Rgba8::rgb).unwrap_or(fallback);
    let mut changed = false;
    ui.horizontal(|ui| {
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            *hex = Rgba8([rgb[0], rgb[1], rgb[2], 0xff]).to_hex();
            changed = true;
        }
        ui.monospace(hex.as_str());
    });
    changed
}

fn decode_preview_image(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

impl eframe::App for QrStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_ui_events();
        self.tick_auto_generate(now);

        egui::TopBottomPanel::bottom("worker_status").show(ctx, |ui| {
            ui.weak(&self.worker_note);
        });

        egui::SidePanel::left("qr_form_panel")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("QR code generator");
                ui.add_space(8.0);
                self.show_form(ui);
                ui.add_space(8.0);
                self.show_diagnostics(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_preview(ui);
        });

        ctx.request_repaint_after(self.repaint_after(now));
    }
}

impl Drop for QrStudioApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use qr_core::EncodedImage;

    fn encoded(width: u32) -> EncodedImage {
        let image = image::RgbaImage::from_pixel(width, width, image::Rgba([0, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("png");
        EncodedImage {
            png: out.into_inner(),
            width,
            modules: 21,
        }
    }

    #[test]
    fn bootstrap_queues_initial_generation() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (_ui_tx, ui_rx) = bounded(4);
        let app = QrStudioApp::bootstrap(cmd_tx, ui_rx, &Settings::default());

        match cmd_rx.try_recv() {
            Ok(BackendCommand::Encode { text, options, .. }) => {
                assert_eq!(text, "https://github.com/");
                assert_eq!(options.width, 256);
            }
            _ => panic!("expected an encode command"),
        }
        assert_eq!(app.controller.phase(), ControllerPhase::Pending);
    }

    #[test]
    fn applies_worker_results_and_ignores_stale_ones() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(4);
        let mut app = QrStudioApp::bootstrap(cmd_tx, ui_rx, &Settings::default());
        let first = app.controller.latest_generation();
        app.generate();
        let second = app.controller.latest_generation();
        assert_eq!(cmd_rx.len(), 2);

        ui_tx
            .send(UiEvent::Encoded {
                id: second,
                outcome: Ok(encoded(256)),
            })
            .expect("send");
        ui_tx
            .send(UiEvent::Encoded {
                id: first,
                outcome: Err(EncodeError::Symbol("late".to_string())),
            })
            .expect("send");
        app.process_ui_events();

        assert_eq!(app.controller.phase(), ControllerPhase::Ready);
        assert_eq!(app.controller.result().expect("result").generation, second);
        assert!(app.diagnostics.is_none());
    }

    #[test]
    fn encoder_failure_records_diagnostics() {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(4);
        let mut app = QrStudioApp::bootstrap(cmd_tx, ui_rx, &Settings::default());
        let id = app.controller.latest_generation();

        ui_tx
            .send(UiEvent::Encoded {
                id,
                outcome: Err(EncodeError::DataTooLong {
                    level: "H".to_string(),
                }),
            })
            .expect("send");
        app.process_ui_events();

        let diagnostics = app.diagnostics.as_ref().expect("diagnostics");
        assert_eq!(diagnostics.category(), UiErrorCategory::Capacity);
        assert_eq!(app.controller.status().severity, StatusSeverity::Error);
    }

    #[test]
    fn disconnected_worker_fails_generation() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (_ui_tx, ui_rx) = bounded(4);
        drop(cmd_rx);
        let app = QrStudioApp::bootstrap(cmd_tx, ui_rx, &Settings::default());

        assert_eq!(app.controller.phase(), ControllerPhase::Failed);
        assert_eq!(
            app.diagnostics.as_ref().expect("diagnostics").category(),
            UiErrorCategory::Runtime
        );
    }

    #[test]
    fn clear_drops_preview_state() {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(4);
        let mut app = QrStudioApp::bootstrap(cmd_tx, ui_rx, &Settings::default());
        let id = app.controller.latest_generation();
        ui_tx
            .send(UiEvent::Encoded {
                id,
                outcome: Ok(encoded(128)),
            })
            .expect("send");
        app.process_ui_events();
        assert!(app.controller.preview().is_some());

        app.clear();

        assert!(app.controller.preview().is_none());
        assert!(app.preview_texture.is_none());
        assert_eq!(app.controller.form().text, "");
        assert_eq!(app.controller.status().severity, StatusSeverity::Info);
    }

    #[test]
    fn download_without_result_reports_status() {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let (_ui_tx, ui_rx) = bounded(4);
        let mut app = QrStudioApp::bootstrap(cmd_tx, ui_rx, &Settings::default());
        app.clear();

        app.download();

        assert_eq!(app.controller.status().severity, StatusSeverity::Error);
        assert_eq!(
            app.controller.status().text,
            "Generate a QR code before downloading."
        );
        assert!(app.diagnostics.is_none());
    }

    #[test]
    fn decodes_png_into_color_image() {
        let image = decode_preview_image(&encoded(130).png).expect("decode");
        assert_eq!(image.size, [130, 130]);
    }
}

use chrono::{Local, Utc};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::activity::{default_export_name, ActivityLevel};
use crate::state::AppState;

fn level_color(level: ActivityLevel) -> Color32 {
    match level {
        ActivityLevel::Info => Color32::LIGHT_BLUE,
        ActivityLevel::Warn => Color32::YELLOW,
        ActivityLevel::Error => Color32::LIGHT_RED,
    }
}

/// Session activity, newest first, with export and clear actions.
pub fn activity_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Activity");
        ui.label(RichText::new(format!("{} entries", state.activity.len())).weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.activity.clear();
            }
            if ui
                .add_enabled(!state.activity.is_empty(), egui::Button::new("Export…").small())
                .clicked()
            {
                save_activity_dialog(state);
            }
        });
    });

    ScrollArea::vertical()
        .id_salt("activity_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for entry in state.activity.entries() {
                ui.horizontal(|ui: &mut Ui| {
                    let local = entry.created_at.with_timezone(&Local);
                    ui.label(RichText::new(local.format("%H:%M:%S").to_string()).monospace().weak());
                    ui.label(
                        RichText::new(entry.level.label())
                            .monospace()
                            .color(level_color(entry.level)),
                    );
                    ui.label(&entry.message);
                });
            }
        });
}

pub fn save_activity_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export activity log")
        .set_file_name(default_export_name(Utc::now().date_naive()))
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_activity_to(&path) {
            state.report_error("Failed to export activity log", &e);
        }
    }
}

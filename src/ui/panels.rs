use chrono::Utc;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::format_file_size;
use crate::report::default_report_name;
use crate::state::AppState;
use crate::ui::{activity, plot, tables};

// ---------------------------------------------------------------------------
// Left side panel – session files
// ---------------------------------------------------------------------------

/// Render the list of files loaded this session.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    if ui.button("Open…").clicked() {
        open_file_dialog(state);
    }
    ui.separator();

    if state.files.is_empty() {
        ui.label("No files loaded.");
        return;
    }

    let mut reopen = None;
    let mut remove = None;
    ScrollArea::vertical()
        .id_salt("file_list")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, file) in state.files.iter().enumerate() {
                let active = state.active_file == Some(idx);
                ui.horizontal(|ui: &mut Ui| {
                    if ui.selectable_label(active, &file.name).clicked() && !active {
                        reopen = Some(idx);
                    }
                    if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                        remove = Some(idx);
                    }
                });
                ui.label(
                    RichText::new(format!(
                        "{} • {} rows • {}",
                        format_file_size(file.size_bytes),
                        file.row_count,
                        file.loaded_at.format("%Y-%m-%d %H:%M")
                    ))
                    .small()
                    .weak(),
                );
                ui.add_space(4.0);
            }
        });

    if let Some(idx) = reopen {
        let path = state.files[idx].path.clone();
        if let Err(e) = state.open_path(&path) {
            state.report_error("Failed to load file", &e);
        }
    }
    if let Some(idx) = remove {
        state.remove_file(idx);
    }
}

// ---------------------------------------------------------------------------
// Central panel – analytics
// ---------------------------------------------------------------------------

pub fn analytics_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV, JSON or Parquet file to start  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .id_salt("analytics")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            tables::summary_cards(ui, state);
            ui.add_space(8.0);
            tables::view_controls(ui, state);
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Statistical Analysis").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| tables::statistics_panel(ui, state));

            egui::CollapsingHeader::new(RichText::new("Correlation Matrix").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| tables::correlation_panel(ui, state));

            egui::CollapsingHeader::new(RichText::new("Chart").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    plot::chart_controls(ui, state);
                    plot::data_chart(ui, state);
                });

            ui.separator();
            tables::data_preview(ui, state);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Export Report…"))
                .clicked()
            {
                save_report_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.activity.is_empty(), egui::Button::new("Export Activity Log…"))
                .clicked()
            {
                activity::save_activity_dialog(state);
                ui.close_menu();
            }
            if ui.add_enabled(has_data, egui::Button::new("Close Dataset")).clicked() {
                state.active_file = None;
                state.clear_dataset();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                state.analysis.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_path(&path) {
            state.report_error("Failed to load file", &e);
        }
    }
}

pub fn save_report_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export analytics report")
        .set_file_name(default_report_name(Utc::now().timestamp_millis()))
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_report_to(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => state.report_error("Failed to export report", &e),
        }
    }
}

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::correlation_color;
use crate::data::filter::SortDirection;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

/// Total rows / columns / numeric columns / filtered rows.
pub fn summary_cards(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let cards = [
        ("Total Rows", ds.len()),
        ("Columns", ds.columns.len()),
        ("Numeric", state.analysis.numeric_columns.len()),
        ("Filtered", state.analysis.view.len()),
    ];
    ui.columns(cards.len(), |cols| {
        for (ui, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(value.to_string()).size(22.0).strong());
                    ui.label(RichText::new(label).small().weak());
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Search / sort controls
// ---------------------------------------------------------------------------

pub fn view_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(columns) = state.dataset.as_ref().map(|ds| ds.columns.clone()) else {
        return;
    };

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Filter");
        let mut text = state.filter_text.clone();
        let edit = egui::TextEdit::singleline(&mut text).hint_text("Search all columns...");
        if ui.add(edit).changed() {
            state.set_filter_text(text);
        }

        ui.separator();
        ui.label("Sort by");
        let current = state.sort_column.clone();
        let direction = state.sort_direction;
        egui::ComboBox::from_id_salt("sort_column")
            .selected_text(current.as_deref().unwrap_or("None"))
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(current.is_none(), "None").clicked() {
                    state.set_sort(None, direction);
                }
                for col in &columns {
                    if ui
                        .selectable_label(current.as_ref() == Some(col), col)
                        .clicked()
                    {
                        state.set_sort(Some(col.clone()), direction);
                    }
                }
            });

        egui::ComboBox::from_id_salt("sort_direction")
            .selected_text(direction.label())
            .show_ui(ui, |ui: &mut Ui| {
                for dir in [SortDirection::Asc, SortDirection::Desc] {
                    if ui.selectable_label(direction == dir, dir.label()).clicked() {
                        state.set_sort(current.clone(), dir);
                    }
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub fn statistics_panel(ui: &mut Ui, state: &mut AppState) {
    if state.analysis.numeric_columns.is_empty() {
        ui.label(RichText::new("No numeric columns in this dataset.").weak());
        return;
    }

    let current = state.selected_column.clone();
    egui::ComboBox::from_id_salt("stats_column")
        .selected_text(current.as_deref().unwrap_or("Select numeric column"))
        .show_ui(ui, |ui: &mut Ui| {
            for col in state.analysis.numeric_columns.clone() {
                if ui
                    .selectable_label(current.as_ref() == Some(&col), &col)
                    .clicked()
                {
                    state.select_column(Some(col));
                }
            }
        });

    let (Some(column), Some(summary)) = (&state.selected_column, &state.analysis.summary) else {
        return;
    };
    ui.label(RichText::new(format!("Statistics for {column}")).strong());
    egui::Grid::new("stats_grid")
        .num_columns(8)
        .spacing([16.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (i, (label, value)) in summary.display_rows().into_iter().enumerate() {
                ui.label(RichText::new(format!("{label}:")).weak());
                ui.label(value);
                if i % 4 == 3 {
                    ui.end_row();
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

pub fn correlation_panel(ui: &mut Ui, state: &AppState) {
    let Some(matrix) = &state.analysis.correlation else {
        ui.label(RichText::new("Correlation needs at least two numeric columns.").weak());
        return;
    };
    egui::ScrollArea::horizontal()
        .id_salt("correlation_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("correlation_grid")
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    ui.strong("Column");
                    for col in matrix.columns() {
                        ui.strong(col);
                    }
                    ui.end_row();

                    for row_name in matrix.columns() {
                        ui.strong(row_name);
                        for col in matrix.columns() {
                            let r = matrix.get(row_name, col).unwrap_or_default();
                            ui.label(RichText::new(format!("{r:.2}")).color(correlation_color(r)));
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Data preview
// ---------------------------------------------------------------------------

/// Cut `s` to `max` characters, appending "..." when something was dropped.
pub fn truncate_cell(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_string(),
    }
}

pub fn data_preview(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    if ds.is_empty() {
        ui.label(RichText::new("This file has no rows.").weak());
        return;
    }
    let view = &state.analysis.view;
    let columns: Vec<&String> = ds.columns.iter().take(state.config.preview_columns).collect();
    let limit = state.config.preview_rows;
    let truncate = state.config.cell_truncate;

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Data Preview");
        ui.label(RichText::new(format!("{} rows", view.len())).color(Color32::LIGHT_BLUE));
    });

    ui.push_id("preview_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(260.0)
            .columns(Column::auto().at_least(60.0), columns.len())
            .header(20.0, |mut header| {
                for col in &columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.as_str());
                    });
                }
            })
            .body(|mut body| {
                for row in state.view_rows().take(limit) {
                    body.row(18.0, |mut table_row| {
                        for col in &columns {
                            table_row.col(|ui: &mut Ui| {
                                let text = row
                                    .get(col)
                                    .map(|v| v.to_string())
                                    .unwrap_or_default();
                                ui.label(truncate_cell(&text, truncate));
                            });
                        }
                    });
                }
            });
    });

    if view.len() > limit {
        ui.label(
            RichText::new(format!("Showing {limit} of {} filtered rows", view.len())).weak(),
        );
    }
}

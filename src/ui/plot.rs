use chrono::Utc;
use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ChartTheme;
use crate::data::series::ChartKind;
use crate::state::AppState;
use crate::ui::snapshot::{crop, default_chart_name, save_png};

/// Screen rect of the last drawn chart, kept in egui memory for cropping.
fn chart_rect_id() -> egui::Id {
    egui::Id::new("data_chart_rect")
}

// ---------------------------------------------------------------------------
// Chart controls
// ---------------------------------------------------------------------------

/// Chart type, plotted columns, row window and display toggles.
pub fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        let current = state.chart.kind;
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(current.label())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in ChartKind::ALL {
                    if ui.selectable_label(current == kind, kind.label()).clicked() {
                        state.set_chart_kind(kind);
                    }
                }
            });

        let theme = state.chart.theme;
        egui::ComboBox::from_id_salt("chart_theme")
            .selected_text(theme.label())
            .show_ui(ui, |ui: &mut Ui| {
                for option in ChartTheme::ALL {
                    ui.selectable_value(&mut state.chart.theme, option, option.label());
                }
            });

        ui.separator();
        ui.checkbox(&mut state.chart.show_grid, "Grid");
        ui.checkbox(&mut state.chart.show_legend, "Legend");

        ui.separator();
        let can_export = !state.analysis.chart.series.is_empty();
        if ui
            .add_enabled(can_export, egui::Button::new("Export PNG…"))
            .clicked()
        {
            request_chart_export(ui.ctx(), state);
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Columns:");
        for col in state.analysis.numeric_columns.clone() {
            let selected = state.chart.columns.contains(&col);
            if ui.selectable_label(selected, &col).clicked() {
                state.toggle_chart_column(&col);
            }
        }
    });

    let n_rows = state.dataset.as_ref().map_or(0, |ds| ds.len());
    let [mut start, mut end] = state.chart.row_window;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Rows");
        let a = ui.add(egui::DragValue::new(&mut start).range(0..=n_rows));
        ui.label("to");
        let b = ui.add(egui::DragValue::new(&mut end).range(0..=n_rows));
        if a.changed() || b.changed() {
            state.set_row_window(start, end);
        }
    });
}

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Render the chart for the current [`ChartData`](crate::data::series::ChartData).
pub fn data_chart(ui: &mut Ui, state: &AppState) {
    let data = &state.analysis.chart;
    if data.series.is_empty() {
        ui.label(RichText::new("Select at least one numeric column to plot.").weak());
        return;
    }

    let colors = state.chart.theme.palette(data.series.len());
    let labels = data.labels.clone();
    let kind = state.chart.kind;

    let mut plot = Plot::new("data_chart")
        .height(280.0)
        .show_grid(state.chart.show_grid)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        });
    if state.chart.show_legend {
        plot = plot.legend(Legend::default());
    }

    let n_series = data.series.len() as f64;
    let response = plot.show(ui, |plot_ui| {
        for (s_idx, (series, &color)) in data.series.iter().zip(&colors).enumerate() {
            let xy = || -> PlotPoints {
                series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [i as f64, v])
                    .collect()
            };
            match kind {
                ChartKind::Line => {
                    plot_ui.line(Line::new(xy()).name(&series.column).color(color).width(2.0));
                }
                ChartKind::Area => {
                    plot_ui.line(
                        Line::new(xy())
                            .name(&series.column)
                            .color(color)
                            .fill(0.0),
                    );
                }
                ChartKind::Scatter => {
                    plot_ui.points(
                        Points::new(xy())
                            .name(&series.column)
                            .color(color)
                            .radius(4.0),
                    );
                }
                ChartKind::Bar => {
                    // Side-by-side bars within each row slot.
                    let width = 0.8 / n_series;
                    let offset = -0.4 + width * (s_idx as f64 + 0.5);
                    let bars = series
                        .values
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| Bar::new(i as f64 + offset, v).width(width))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(&series.column).color(color));
                }
            }
        }
    });
    let rect = response.response.rect;
    ui.ctx().data_mut(|d| d.insert_temp(chart_rect_id(), rect));

    ui.label(
        RichText::new(format!(
            "Showing rows {}..{} of {}",
            state.chart.row_window[0],
            state.chart.row_window[0] + data.labels.len(),
            state.dataset.as_ref().map_or(0, |ds| ds.len())
        ))
        .weak(),
    );
}

// ---------------------------------------------------------------------------
// PNG export
// ---------------------------------------------------------------------------

/// Ask for a destination, then request a screenshot of the next frame.
fn request_chart_export(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .set_file_name(default_chart_name(Utc::now().timestamp_millis()))
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        state.pending_chart_export = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }
}

/// Write the chart area of a delivered screenshot to the pending path.
pub fn handle_screenshot(ctx: &egui::Context, state: &mut AppState) {
    let image = ctx.input(|i| {
        i.raw.events.iter().find_map(|e| match e {
            egui::Event::Screenshot { image, .. } => Some(image.clone()),
            _ => None,
        })
    });
    let Some(image) = image else {
        return;
    };
    let Some(path) = state.pending_chart_export.take() else {
        return;
    };

    let rect = ctx.data(|d| d.get_temp::<egui::Rect>(chart_rect_id()));
    let chart = crop(&image, rect, ctx.pixels_per_point());
    match save_png(&path, &chart) {
        Ok(()) => state
            .activity
            .info(format!("Exported chart to {}", path.display())),
        Err(e) => state.report_error("Failed to export chart", &e),
    }
}

use eframe::egui;

use crate::state::AppState;
use crate::ui::{activity, panels, plot, tasks};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataDeckApp {
    pub state: AppState,
}

impl DataDeckApp {
    pub fn new(mut state: AppState) -> Self {
        state.load_tasks();
        Self { state }
    }
}

impl eframe::App for DataDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Dropped files load like File → Open.
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .next()
        });
        if let Some(path) = dropped {
            if let Err(e) = self.state.open_path(&path) {
                self.state.report_error("Failed to load dropped file", &e);
            }
        }
        plot::handle_screenshot(ctx, &mut self.state);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: activity log ----
        egui::TopBottomPanel::bottom("activity_panel")
            .default_height(140.0)
            .resizable(true)
            .show(ctx, |ui| {
                activity::activity_panel(ui, &mut self.state);
            });

        // ---- Left side panel: session files ----
        egui::SidePanel::left("file_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: tasks ----
        egui::SidePanel::right("task_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                tasks::task_panel(ui, &mut self.state);
            });

        // ---- Central panel: analytics ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::analytics_panel(ui, &mut self.state);
        });
    }
}

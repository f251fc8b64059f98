use chrono::Local;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Task panel
// ---------------------------------------------------------------------------

/// Render the task list with its entry form.
pub fn task_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Tasks");
    ui.label(
        RichText::new(format!(
            "{} pending, {} total",
            state.tasks.pending_count(),
            state.tasks.len()
        ))
        .weak(),
    );
    ui.separator();

    let submitted = ui
        .add(egui::TextEdit::singleline(&mut state.task_draft).hint_text("New task..."))
        .lost_focus()
        && ui.input(|i| i.key_pressed(egui::Key::Enter));
    ui.add(
        egui::TextEdit::multiline(&mut state.task_description)
            .hint_text("Description (optional)")
            .desired_rows(2),
    );

    let today = Local::now().date_naive();
    ui.horizontal(|ui: &mut Ui| {
        let mut has_due = state.task_due.is_some();
        if ui.checkbox(&mut has_due, "Due").changed() {
            state.task_due = has_due.then_some(today);
        }
        if let Some(due) = state.task_due.as_mut() {
            ui.add(DatePickerButton::new(due).id_salt("task_due"));
        }
    });

    if ui.button("Add task").clicked() || submitted {
        state.submit_task_draft();
    }
    ui.separator();

    if state.tasks.is_empty() {
        ui.label(RichText::new("No tasks yet.").weak());
        return;
    }

    // Collect ids first; the closures below mutate the list.
    let ids: Vec<u64> = state.tasks.list().iter().map(|t| t.id).collect();
    let mut toggled = None;
    let mut deleted = None;

    ScrollArea::vertical()
        .id_salt("task_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for id in ids {
                let Ok(task) = state.tasks.get(id) else {
                    continue;
                };
                ui.horizontal(|ui: &mut Ui| {
                    let mut done = task.completed;
                    if ui.checkbox(&mut done, "").changed() {
                        toggled = Some(id);
                    }
                    let mut title = RichText::new(&task.title);
                    if task.completed {
                        title = title.strikethrough().weak();
                    } else if task.is_overdue(today) {
                        title = title.color(Color32::LIGHT_RED);
                    }
                    ui.label(title);
                    if let Some(due) = task.due_at {
                        ui.label(RichText::new(due.format("%Y-%m-%d").to_string()).small().weak());
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
                        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                            deleted = Some(id);
                        }
                    });
                });
                if let Some(description) = &task.description {
                    ui.indent(("task_description", id), |ui: &mut Ui| {
                        ui.label(RichText::new(description).small().weak());
                    });
                }
            }
        });

    if let Some(id) = toggled {
        state.toggle_task(id);
    }
    if let Some(id) = deleted {
        state.delete_task(id);
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::activity::ActivityLog;
use crate::color::ChartTheme;
use crate::config::DashboardConfig;
use crate::data::filter::{filter_indices, filter_rows, sort_indices, sort_rows, SortDirection};
use crate::data::loader::{load_file, LoadedFile};
use crate::data::model::{Dataset, Record};
use crate::data::series::{chart_data, ChartData, ChartKind};
use crate::report::{export_report, write_report, AnalyticsReport};
use crate::stats::{
    correlation_matrix, numeric_columns, summarize, CorrelationMatrix, StatisticsSummary,
};
use crate::tasks::{TaskList, TaskResult};

// ---------------------------------------------------------------------------
// Derived analysis
// ---------------------------------------------------------------------------

/// Everything computed from the inputs. Rebuilt wholesale by
/// [`AppState::recompute`]; never patched in place.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub numeric_columns: Vec<String>,
    /// Indices of the filtered, then sorted, rows for the preview and the
    /// report sample.
    pub view: Vec<usize>,
    pub summary: Option<StatisticsSummary>,
    pub correlation: Option<CorrelationMatrix>,
    pub chart: ChartData,
}

/// Chart inputs chosen in the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub kind: ChartKind,
    pub theme: ChartTheme,
    pub columns: Vec<String>,
    pub row_window: [usize; 2],
    pub show_grid: bool,
    pub show_legend: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Statistics, correlation and the chart describe the whole dataset; the
/// search text and sort order only shape `analysis.view`.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Files loaded this session, most recent last.
    pub files: Vec<LoadedFile>,
    pub active_file: Option<usize>,

    pub filter_text: String,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,

    /// Numeric column summarised in the statistics panel.
    pub selected_column: Option<String>,

    pub chart: ChartSettings,
    /// Where the next chart screenshot should be written.
    pub pending_chart_export: Option<PathBuf>,

    pub analysis: Analysis,

    pub tasks: TaskList,
    /// Draft of the task being typed in the task panel.
    pub task_draft: String,
    pub task_description: String,
    pub task_due: Option<NaiveDate>,

    pub activity: ActivityLog,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let chart = ChartSettings {
            kind: config.chart.kind,
            theme: config.chart.theme,
            columns: Vec::new(),
            row_window: config.chart.row_window,
            show_grid: config.chart.show_grid,
            show_legend: config.chart.show_legend,
        };
        let activity = ActivityLog::new(config.activity_limit);
        Self {
            config,
            dataset: None,
            files: Vec::new(),
            active_file: None,
            filter_text: String::new(),
            sort_column: None,
            sort_direction: SortDirection::Asc,
            selected_column: None,
            chart,
            pending_chart_export: None,
            analysis: Analysis::default(),
            tasks: TaskList::default(),
            task_draft: String::new(),
            task_description: String::new(),
            task_due: None,
            activity,
            status_message: None,
        }
    }

    /// Log a failed action, record it in the activity log and show it.
    pub fn report_error(&mut self, what: &str, e: &anyhow::Error) {
        self.activity.error(format!("{what}: {e:#}"));
        self.status_message = Some(format!("Error: {e:#}"));
    }

    // -- dataset lifecycle --

    /// Load `path`, record it in the file list and make it current.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let dataset = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        let info = LoadedFile::describe(path, &dataset)?;

        self.activity.info(format!(
            "Loaded {} ({} rows, {} columns)",
            info.name,
            dataset.len(),
            dataset.columns.len()
        ));
        match self.files.iter().position(|f| f.path == info.path) {
            Some(idx) => {
                self.files[idx] = info;
                self.active_file = Some(idx);
            }
            None => {
                self.files.push(info);
                self.active_file = Some(self.files.len() - 1);
            }
        }
        self.set_dataset(dataset);
        Ok(())
    }

    /// Forget a file from the session list; clears the view if it was active.
    pub fn remove_file(&mut self, idx: usize) {
        if idx >= self.files.len() {
            return;
        }
        let removed = self.files.remove(idx);
        self.activity.info(format!("Removed {} from the session", removed.name));
        match self.active_file {
            Some(active) if active == idx => {
                self.active_file = None;
                self.clear_dataset();
            }
            Some(active) if active > idx => self.active_file = Some(active - 1),
            _ => {}
        }
    }

    /// Ingest a newly loaded dataset and reset per-dataset selections.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let numeric = numeric_columns(&dataset);
        self.selected_column = numeric.first().cloned();
        self.chart.columns = numeric
            .iter()
            .take(self.config.chart.max_series)
            .cloned()
            .collect();
        if self
            .sort_column
            .as_ref()
            .is_some_and(|c| !dataset.columns.contains(c))
        {
            self.sort_column = None;
        }

        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    pub fn clear_dataset(&mut self) {
        self.dataset = None;
        self.selected_column = None;
        self.chart.columns.clear();
        self.sort_column = None;
        self.recompute();
    }

    // -- input setters; each one re-derives what depends on it --

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.refresh_view();
    }

    pub fn set_sort(&mut self, column: Option<String>, direction: SortDirection) {
        self.sort_column = column;
        self.sort_direction = direction;
        self.refresh_view();
    }

    pub fn select_column(&mut self, column: Option<String>) {
        self.selected_column = column;
        self.recompute();
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart.kind = kind;
    }

    /// Add or remove a plotted column, keeping at most `max_series`.
    pub fn toggle_chart_column(&mut self, column: &str) {
        if let Some(pos) = self.chart.columns.iter().position(|c| c == column) {
            self.chart.columns.remove(pos);
        } else if self.chart.columns.len() < self.config.chart.max_series {
            self.chart.columns.push(column.to_string());
        } else {
            let message = format!(
                "At most {} columns can be plotted",
                self.config.chart.max_series
            );
            self.activity.warn(message.clone());
            self.status_message = Some(message);
            return;
        }
        self.recompute();
    }

    pub fn set_row_window(&mut self, start: usize, end: usize) {
        self.chart.row_window = [start.min(end), end.max(start)];
        self.recompute();
    }

    /// Rebuild [`Analysis`] from the current inputs.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.analysis = Analysis::default();
            return;
        };

        let numeric = numeric_columns(dataset);
        let summary = self
            .selected_column
            .as_deref()
            .and_then(|col| summarize(dataset, col));
        let correlation =
            correlation_matrix(dataset, &numeric, self.config.correlation_alignment);
        let chart = chart_data(dataset, &self.chart.columns, self.chart.row_window);

        log::debug!(
            "Recomputed analysis: {} numeric columns over {} rows",
            numeric.len(),
            dataset.len()
        );
        self.analysis = Analysis {
            numeric_columns: numeric,
            view: Vec::new(),
            summary,
            correlation,
            chart,
        };
        self.refresh_view();
    }

    /// Rebuild only `analysis.view`; search and sort affect nothing else.
    pub fn refresh_view(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.analysis.view.clear();
            return;
        };
        let mut view = filter_indices(dataset, &self.filter_text);
        if let Some(col) = &self.sort_column {
            sort_indices(dataset, &mut view, col, self.sort_direction);
        }
        log::debug!("{} of {} rows visible", view.len(), dataset.len());
        self.analysis.view = view;
    }

    /// The rows of the current view, in view order.
    pub fn view_rows(&self) -> impl Iterator<Item = &Record> {
        let rows = self.dataset.as_ref().map_or(&[][..], |ds| &ds.rows[..]);
        self.analysis.view.iter().filter_map(move |&i| rows.get(i))
    }

    // -- export --

    pub fn build_report(&self) -> Option<AnalyticsReport> {
        let dataset = self.dataset.as_ref()?;
        let filtered = filter_rows(dataset, &self.filter_text);
        let filtered = match &self.sort_column {
            Some(col) => sort_rows(&filtered, col, self.sort_direction),
            None => filtered,
        };
        Some(export_report(
            dataset,
            &filtered,
            self.analysis.summary.as_ref(),
            self.analysis.correlation.as_ref(),
            self.config.report_sample_limit,
        ))
    }

    pub fn export_report_to(&mut self, path: &Path) -> Result<()> {
        let report = self
            .build_report()
            .context("no dataset loaded, nothing to export")?;
        write_report(path, &report)?;
        self.activity
            .info(format!("Exported analytics report to {}", path.display()));
        Ok(())
    }

    pub fn export_activity_to(&mut self, path: &Path) -> Result<()> {
        self.activity.write_json(path)?;
        self.activity
            .info(format!("Exported activity log to {}", path.display()));
        Ok(())
    }

    // -- tasks --

    pub fn load_tasks(&mut self) {
        match TaskList::load(&self.config.tasks_file) {
            Ok(list) => self.tasks = list,
            Err(e) => {
                self.activity.error(format!("Failed to load tasks: {e}"));
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Apply a task mutation and persist the list; errors go to the status
    /// line and the activity log.
    pub fn with_tasks<T>(&mut self, op: impl FnOnce(&mut TaskList) -> TaskResult<T>) -> Option<T> {
        let result = op(&mut self.tasks)
            .and_then(|value| self.tasks.save(&self.config.tasks_file).map(|()| value));
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.activity.error(format!("Task update failed: {e}"));
                self.status_message = Some(format!("Error: {e}"));
                None
            }
        }
    }

    /// Create a task from the current draft.
    pub fn submit_task_draft(&mut self) {
        let title = self.task_draft.clone();
        let description = Some(self.task_description.clone());
        let due = self.task_due;
        if let Some(title) =
            self.with_tasks(|tasks| tasks.create(&title, description, due).map(|t| t.title.clone()))
        {
            self.activity.info(format!("Created task \"{title}\""));
            self.task_draft.clear();
            self.task_description.clear();
            self.task_due = None;
        }
    }

    pub fn toggle_task(&mut self, id: u64) {
        if let Some((title, done)) =
            self.with_tasks(|tasks| tasks.toggle(id).map(|t| (t.title.clone(), t.completed)))
        {
            let verb = if done { "completed" } else { "reopened" };
            self.activity.info(format!("Task \"{title}\" {verb}"));
        }
    }

    pub fn delete_task(&mut self, id: u64) {
        if let Some(task) = self.with_tasks(|tasks| tasks.delete(id)) {
            self.activity.info(format!("Deleted task \"{}\"", task.title));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityLevel;
    use crate::data::model::text_record;
    use crate::stats::Alignment;

    fn sales() -> Dataset {
        Dataset::from_records(vec![
            text_record(&[("region", "north"), ("units", "10"), ("price", "2"), ("cost", "1")]),
            text_record(&[("region", "South"), ("units", "20"), ("price", "4"), ("cost", "2")]),
            text_record(&[("region", "north"), ("units", "30"), ("price", "6"), ("cost", "x")]),
        ])
    }

    #[test]
    fn loading_a_dataset_derives_everything() {
        let mut state = AppState::default();
        state.set_dataset(sales());
        assert_eq!(state.analysis.numeric_columns, vec!["units", "price", "cost"]);
        assert_eq!(state.selected_column.as_deref(), Some("units"));
        assert_eq!(state.analysis.summary.unwrap().mean, 20.0);
        assert_eq!(state.chart.columns.len(), 3);
        assert_eq!(state.analysis.chart.series[2].values, vec![1.0, 2.0, 0.0]);
        let corr = state.analysis.correlation.as_ref().unwrap();
        assert!((corr.get("units", "price").unwrap() - 1.0).abs() < 1e-9);
        // pairwise alignment by default: cost is aligned with units on rows 1-2
        assert!((corr.get("units", "cost").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn filter_and_sort_only_shape_the_view() {
        let mut state = AppState::default();
        state.set_dataset(sales());
        state.set_filter_text("NORTH");
        assert_eq!(state.analysis.view.len(), 2);
        assert_eq!(state.analysis.summary.unwrap().count, 3);

        state.set_sort(Some("units".into()), SortDirection::Desc);
        let units: Vec<_> = state
            .view_rows()
            .map(|r| r.number("units").unwrap())
            .collect();
        assert_eq!(units, vec![30.0, 10.0]);
        assert_eq!(state.analysis.view, vec![2, 0]);

        state.set_filter_text("");
        assert_eq!(state.analysis.view, vec![2, 1, 0]);
    }

    #[test]
    fn view_changes_leave_derived_statistics_alone() {
        let mut state = AppState::default();
        state.set_dataset(sales());
        let before = state.analysis.clone();

        state.set_filter_text("south");
        state.set_sort(Some("price".into()), SortDirection::Desc);
        assert_eq!(state.analysis.view, vec![1]);
        assert_eq!(state.analysis.summary, before.summary);
        assert_eq!(state.analysis.correlation, before.correlation);
        assert_eq!(state.analysis.chart, before.chart);

        // a full recompute keeps the current search and sort
        state.select_column(Some("price".into()));
        assert_eq!(state.analysis.view, vec![1]);
        assert_eq!(state.analysis.summary.unwrap().max, 6.0);
    }

    #[test]
    fn report_sample_follows_the_view() {
        let mut state = AppState::default();
        state.set_dataset(sales());
        state.set_filter_text("north");
        state.set_sort(Some("units".into()), SortDirection::Desc);
        let report = state.build_report().unwrap();
        assert_eq!(report.summary.total_rows, 3);
        assert_eq!(report.summary.filtered_rows, 2);
        assert_eq!(report.data[0].number("units"), Some(30.0));
    }

    #[test]
    fn column_selection_and_alignment_policy() {
        let mut config = DashboardConfig::default();
        config.correlation_alignment = Alignment::Independent;
        let mut state = AppState::new(config);
        state.set_dataset(sales());

        state.select_column(Some("region".into()));
        assert!(state.analysis.summary.is_none());
        state.select_column(Some("cost".into()));
        assert_eq!(state.analysis.summary.unwrap().count, 2);

        let corr = state.analysis.correlation.as_ref().unwrap();
        assert_eq!(corr.get("units", "cost"), Some(0.0));
    }

    #[test]
    fn chart_columns_are_capped() {
        let mut config = DashboardConfig::default();
        config.chart.max_series = 2;
        let mut state = AppState::new(config);
        state.set_dataset(sales());
        assert_eq!(state.chart.columns, vec!["units", "price"]);

        state.toggle_chart_column("cost");
        assert_eq!(state.chart.columns.len(), 2);
        assert!(state.status_message.is_some());

        state.toggle_chart_column("units");
        state.toggle_chart_column("cost");
        assert_eq!(state.chart.columns, vec!["price", "cost"]);
        assert_eq!(state.analysis.chart.series.len(), 2);

        state.set_row_window(2, 1);
        assert_eq!(state.chart.row_window, [1, 2]);
        assert_eq!(state.analysis.chart.labels, vec!["Row 1"]);
    }

    #[test]
    fn empty_state_has_no_report() {
        let mut state = AppState::default();
        assert!(state.build_report().is_none());
        state.set_dataset(Dataset::default());
        let report = state.build_report().unwrap();
        assert_eq!(report.summary.total_rows, 0);
        assert!(report.statistics.is_none());
        assert!(report.correlation_matrix.is_none());
    }

    #[test]
    fn open_export_and_remove_files() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        std::fs::write(&csv, "region,units\nnorth,1\nsouth,3\n").unwrap();

        let mut state = AppState::default();
        state.open_path(&csv).unwrap();
        state.open_path(&csv).unwrap();
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.active_file, Some(0));
        assert_eq!(state.analysis.summary.unwrap().sum, 4.0);

        let out = dir.path().join("report.json");
        state.export_report_to(&out).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(v["summary"]["totalRows"], 2);
        assert_eq!(v["statistics"]["sum"], 4.0);

        let err = state.open_path(&dir.path().join("missing.csv")).unwrap_err();
        state.report_error("Failed to load file", &err);
        assert!(state.status_message.is_some());
        let latest = state.activity.entries().next().unwrap();
        assert_eq!(latest.level, ActivityLevel::Error);
        assert!(latest.message.starts_with("Failed to load file"));

        state.remove_file(0);
        assert!(state.dataset.is_none());
        assert!(state.files.is_empty());
        assert!(state.analysis.view.is_empty());
        assert!(state.export_report_to(&out).is_err());

        let messages: Vec<_> = state.activity.entries().map(|e| e.message.clone()).collect();
        assert!(messages.iter().any(|m| m.starts_with("Loaded sales.csv (2 rows")));
        assert!(messages.iter().any(|m| m.starts_with("Exported analytics report")));
        assert!(messages.iter().any(|m| m.starts_with("Removed sales.csv")));

        let log_path = dir.path().join("activity.json");
        state.export_activity_to(&log_path).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&log_path).unwrap()).unwrap();
        assert_eq!(v["logs"].as_array().unwrap().len(), messages.len());
    }

    #[test]
    fn task_draft_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DashboardConfig::default();
        config.tasks_file = dir.path().join("tasks.json");
        let mut state = AppState::new(config.clone());

        state.task_draft = "   ".into();
        state.submit_task_draft();
        assert!(state.tasks.is_empty());
        assert!(state.status_message.is_some());

        state.task_draft = "Check outliers".into();
        state.submit_task_draft();
        assert!(state.task_draft.is_empty());

        let mut reloaded = AppState::new(config);
        reloaded.load_tasks();
        assert_eq!(reloaded.tasks.list()[0].title, "Check outliers");
        assert_eq!(reloaded.tasks.list()[0].description, None);
    }

    #[test]
    fn task_description_is_saved_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DashboardConfig::default();
        config.tasks_file = dir.path().join("tasks.json");
        let mut state = AppState::new(config);

        state.task_draft = "Review Q3".into();
        state.task_description = "compare against the Q2 export".into();
        state.submit_task_draft();
        assert!(state.task_description.is_empty());
        let task = state.tasks.list()[0].clone();
        assert_eq!(task.description.as_deref(), Some("compare against the Q2 export"));

        state.toggle_task(task.id);
        assert!(state.tasks.get(task.id).unwrap().completed);
        state.delete_task(task.id);
        assert!(state.tasks.is_empty());

        state.toggle_task(task.id);
        assert!(state.status_message.is_some());
        let levels: Vec<_> = state.activity.entries().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![
                ActivityLevel::Error,
                ActivityLevel::Info,
                ActivityLevel::Info,
                ActivityLevel::Info
            ]
        );
    }
}

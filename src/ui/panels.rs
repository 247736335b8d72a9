use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use customer_dashboard::data::loader;
use customer_dashboard::data::model::FilterColumn;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns: Vec<_> = FilterColumn::ALL
        .iter()
        .map(|col| (*col, dataset.categories(*col).to_vec()))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, all_values) in &columns {
                let n_selected = state.selection.get(col).map_or(0, |s| s.len());
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", col.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(*col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(*col);
                            }
                        });

                        for val in all_values {
                            let mut text = RichText::new(val.to_string());
                            let swatch = match col {
                                FilterColumn::Gender => state.gender_colors.as_ref(),
                                FilterColumn::ProductCategory => state.category_colors.as_ref(),
                                FilterColumn::City => None,
                            };
                            if let Some(cm) = swatch {
                                text = text.color(cm.color_for(val));
                            }

                            let mut checked = state.is_selected(*col, val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(*col, val);
                            }
                        }
                    });
            }
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
        });

        ui.separator();

        if let (Some(ds), Some(report)) = (&state.dataset, state.report()) {
            ui.label(format!(
                "{} purchases loaded, {} visible",
                ds.len(),
                report.visible_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, &path);
    }
}

/// Load `path` and swap it in, or leave the current dataset and report the error.
pub fn load_into(state: &mut AppState, path: &Path) {
    match loader::load_file(path) {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

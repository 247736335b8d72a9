use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use customer_dashboard::aggregate::{
    AggregateResult, CategoryTotal, CorrelationMatrix, GroupCount, Histogram, Scorecard,
};
use customer_dashboard::data::model::CellValue;

use crate::color::{heat_color, heat_text_color, ColorMap};
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(report) = state.report() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Customer Dashboard");

            ui.add_space(8.0);
            ui.strong("Product Sales Scorecards");
            with_data(ui, &report.scorecards, scorecards);
            ui.separator();

            ui.strong("Distribution of Purchase Amount");
            with_data(ui, &report.purchase_histogram, histogram);

            ui.strong("Purchase Count by Product Category and Gender");
            with_data(ui, &report.gender_category_counts, |ui, counts| {
                grouped_counts(ui, "gender_category", counts, state.gender_colors.as_ref());
            });

            ui.strong("Top-Selling Product Category Per Gender");
            with_data(ui, &report.top_category_per_gender, |ui, picks| {
                picked_bars(ui, "top_category_gender", picks, state.category_colors.as_ref());
            });

            ui.strong("Total Sales by Product Category");
            with_data(ui, &report.ranked_category_totals, |ui, totals| {
                ranked_totals(ui, totals, state.category_colors.as_ref());
            });

            ui.strong("Top Purchasing Age By Gender");
            with_data(ui, &report.top_age_per_gender, |ui, picks| {
                picked_bars(ui, "top_age_gender", picks, None);
            });

            ui.strong("Top-Selling Product Category Per City");
            with_data(ui, &report.top_category_per_city, |ui, picks| {
                picked_bars(ui, "top_category_city", picks, state.category_colors.as_ref());
            });

            ui.strong("Least-Selling Product Category Per City");
            with_data(ui, &report.least_category_per_city, |ui, picks| {
                picked_bars(ui, "least_category_city", picks, state.category_colors.as_ref());
            });

            ui.separator();
            ui.strong("Correlation Heatmap");
            with_data(ui, &report.correlation, heatmap);
        });
}

/// Draw `result` with `draw`, or a "No data" note for the empty sentinel.
fn with_data<T>(ui: &mut Ui, result: &AggregateResult<T>, draw: impl FnOnce(&mut Ui, &T)) {
    match result {
        AggregateResult::Ready(value) => draw(ui, value),
        AggregateResult::NoData => {
            ui.label(RichText::new("No data for the current filters").italics().weak());
        }
    }
    ui.add_space(12.0);
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn scorecards(ui: &mut Ui, cards: &Vec<Scorecard>) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for card in cards {
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(card.category.to_string());
                    ui.label(RichText::new(&card.display).size(22.0).strong());
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, hist: &Histogram) {
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .zip(&hist.edges)
        .map(|(&count, &lo)| {
            Bar::new(lo + width / 2.0, count as f64)
                .width(width)
                .name(format!("{lo:.2} – {:.2}", lo + width))
        })
        .collect();

    Plot::new("purchase_histogram")
        .height(PLOT_HEIGHT)
        .x_axis_label("Purchase Amount")
        .y_axis_label("Frequency")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(135, 206, 235)));
            if let Some(curve) = &hist.density {
                let points: PlotPoints = curve.iter().copied().collect();
                plot_ui.line(Line::new(points).color(Color32::from_rgb(30, 110, 170)).width(2.0));
            }
        });
}

/// Grouped bars: one series per group (hue), categories along x.
fn grouped_counts(ui: &mut Ui, id: &str, counts: &[GroupCount], hue: Option<&ColorMap>) {
    let keys = distinct(counts.iter().map(|c| &c.key));
    let groups = distinct(counts.iter().map(|c| &c.group));
    let slot = 0.8 / groups.len().max(1) as f64;

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Purchase Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (g_idx, group) in groups.iter().enumerate() {
                let bars: Vec<Bar> = counts
                    .iter()
                    .filter(|c| c.group == **group)
                    .filter_map(|c| {
                        let k_idx = keys.iter().position(|k| *k == &c.key)?;
                        let x = k_idx as f64 - 0.4 + slot * (g_idx as f64 + 0.5);
                        Some(Bar::new(x, c.count as f64).width(slot).name(c.key.to_string()))
                    })
                    .collect();
                let mut chart = BarChart::new(bars).name(group.to_string());
                if let Some(cm) = hue {
                    chart = chart.color(cm.color_for(group));
                }
                plot_ui.bar_chart(chart);
            }
        });
    axis_caption(ui, &keys);
}

/// One bar per group, coloured by the picked key.
fn picked_bars(ui: &mut Ui, id: &str, picks: &[GroupCount], hue: Option<&ColorMap>) {
    let groups: Vec<&CellValue> = picks.iter().map(|p| &p.group).collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Purchase Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (idx, pick) in picks.iter().enumerate() {
                let bar = Bar::new(idx as f64, pick.count as f64)
                    .width(0.6)
                    .name(format!("{}: {}", pick.group, pick.key));
                let mut chart = BarChart::new(vec![bar]).name(pick.key.to_string());
                if let Some(cm) = hue {
                    chart = chart.color(cm.color_for(&pick.key));
                }
                plot_ui.bar_chart(chart);
            }
        });
    axis_caption(ui, &groups);
}

fn ranked_totals(ui: &mut Ui, totals: &Vec<CategoryTotal>, hue: Option<&ColorMap>) {
    let n = totals.len();
    Plot::new("ranked_totals")
        .height(PLOT_HEIGHT)
        .x_axis_label("Purchase Amount")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // Largest on top.
            for (rank, total) in totals.iter().enumerate() {
                let mut bar = Bar::new((n - 1 - rank) as f64, total.total)
                    .width(0.6)
                    .name(total.category.to_string());
                if let Some(cm) = hue {
                    bar = bar.fill(cm.color_for(&total.category));
                }
                plot_ui.bar_chart(BarChart::new(vec![bar]).horizontal());
            }
        });
    let order: Vec<&CellValue> = totals.iter().map(|t| &t.category).collect();
    axis_caption(ui, &order);
}

/// Label the integer positions of a categorical axis.
fn axis_caption(ui: &mut Ui, labels: &[&CellValue]) {
    let caption = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{i}: {label}"))
        .collect::<Vec<_>>()
        .join("   ");
    ui.label(RichText::new(caption).small().weak());
}

fn distinct<'a>(values: impl Iterator<Item = &'a CellValue>) -> Vec<&'a CellValue> {
    let mut out: Vec<&CellValue> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out.sort();
    out
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let cell = egui::vec2(72.0, 28.0);

    egui::Grid::new("correlation_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &matrix.columns {
                ui.label(RichText::new(col).small());
            }
            ui.end_row();

            for (row_name, row) in matrix.columns.iter().zip(&matrix.values) {
                ui.label(RichText::new(row_name).small());
                for value in row {
                    let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                    let (fill, text, text_color) = match value {
                        Some(r) => (heat_color(*r), format!("{r:.2}"), heat_text_color(*r)),
                        None => (Color32::from_gray(200), "n/a".to_string(), Color32::DARK_GRAY),
                    };
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, fill);
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::monospace(12.0),
                        text_color,
                    );
                    if value.is_none() {
                        response.on_hover_text("Undefined: too few values or no variance");
                    }
                }
                ui.end_row();
            }
        });
}

// ============================================================
// Layer 6 — Curve Plotter
// ============================================================
// Renders a training history as two side-by-side line charts
// into an SVG file:
//
//   ┌──────────────────────────┬──────────────────────────┐
//   │ accuracy / val_accuracy  │ loss / val_loss          │
//   │ over epochs              │ over epochs              │
//   └──────────────────────────┴──────────────────────────┘
//
// Pure presentation: the only side effect is the file.

use anyhow::{bail, Context, Result};
use plotters::{coord::Shift, prelude::*};
use std::{fs, ops::Range, path::Path};

use crate::infra::metrics::{Series, TrainingHistory};

const WIDTH:  u32 = 1200;
const HEIGHT: u32 = 500;

pub fn plot_history(history: &TrainingHistory, path: &Path, title: &str) -> Result<()> {
    if history.is_empty() {
        bail!("cannot plot an empty training history");
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create plot directory '{}'", parent.display()))?;
    }

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", 22))?;
    let (left, right) = root.split_horizontally(WIDTH / 2);

    draw_panel(
        &left,
        "Training and validation accuracy",
        history,
        Series::TrainAccuracy,
        Series::ValAccuracy,
    )?;
    draw_panel(
        &right,
        "Training and validation loss",
        history,
        Series::TrainLoss,
        Series::ValLoss,
    )?;

    root.present()
        .with_context(|| format!("Cannot write plot '{}'", path.display()))?;
    tracing::info!("Training curves written to '{}'", path.display());
    Ok(())
}

fn draw_panel(
    area:     &DrawingArea<SVGBackend<'_>, Shift>,
    caption:  &str,
    history:  &TrainingHistory,
    training: Series,
    validation: Series,
) -> Result<()> {
    let train_points = history.series(training);
    let valid_points = history.series(validation);

    let last_epoch = history.len().max(2) as f64;
    let y_range = value_range(train_points.iter().chain(&valid_points).map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 18))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(1f64..last_epoch, y_range)?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc(training.label())
        .draw()?;

    chart
        .draw_series(LineSeries::new(train_points, &BLUE))?
        .label(training.label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(valid_points, &RED))?
        .label(validation.label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Min..max of the values with a small margin; never an empty range.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.01);
    (lo - pad)..(hi + pad)
}

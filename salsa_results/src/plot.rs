use std::cmp::Ordering;
use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::{
    BitMapBackend, ChartBuilder, IntoDrawingArea, IntoFont, LineSeries, PathElement, BLACK, BLUE,
    GREEN, RED, WHITE,
};
use plotters::style::{Color, RGBColor};

use crate::error::ResultsError;
use crate::state_log::{StateLog, StateRecord};
use crate::{STATE_LOG, TRUTH_LOG};

const SERIES_COLORS: [RGBColor; 3] = [RED, GREEN, BLUE];

#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Overlay the ground truth log (only simulations write one).
    pub plot_truth: bool,
    /// Where the images go. A relative path is taken relative to the output directory.
    pub output_dir: PathBuf,
    pub export_csv: bool,
    pub size: (u32, u32),
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            plot_truth: false,
            output_dir: PathBuf::from("plots"),
            export_csv: true,
            size: (1200, 900),
        }
    }
}

struct Series<'a> {
    label: &'a str,
    values: Vec<f64>,
}

/// # Explanation
/// Reads the state log the estimator wrote below `directory/prefix` and renders it. With `plot_truth` the
/// ground truth log in `directory` is drawn as a black line behind every estimate (a missing truth
/// log is only a warning).
///
/// # Returns
/// Returns the files that were written.
pub fn plot_results(
    directory: impl AsRef<Path>,
    prefix: impl AsRef<Path>,
    options: &PlotOptions,
) -> Result<Vec<PathBuf>, ResultsError> {
    let directory = directory.as_ref();
    let estimate = StateLog::read(directory.join(prefix).join(STATE_LOG))?;

    let truth = if options.plot_truth {
        match StateLog::read(directory.join(TRUTH_LOG)) {
            Ok(truth) => Some(truth),
            Err(ResultsError::MissingLog(path)) => {
                log::warn!("No ground truth at {}, plotting the estimate only.", path.display());
                None
            }
            Err(e) => return Err(e),
        }
    } else {
        None
    };

    let output_dir = if options.output_dir.is_absolute() {
        options.output_dir.clone()
    } else {
        directory.join(&options.output_dir)
    };
    std::fs::create_dir_all(&output_dir).map_err(|source| ResultsError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let mut written = Vec::new();

    if options.export_csv {
        let csv_path = output_dir.join("State.csv");
        estimate.write_csv(&csv_path)?;
        written.push(csv_path);
    }

    let figures: [(&str, &str, fn(&StateLog) -> Vec<Series<'static>>); 4] = [
        ("position.png", "Position [m]", position_series),
        ("velocity.png", "Velocity [m/s]", velocity_series),
        ("attitude.png", "Attitude [rad]", attitude_series),
        ("clock_bias.png", "Clock bias", clock_bias_series),
    ];
    for (filename, caption, series) in figures {
        let path = output_dir.join(filename);
        let truth_series = truth.as_ref().map(|truth| (truth.times(), series(truth)));
        plot_time_series(
            &path,
            caption,
            options.size,
            &estimate.times(),
            &series(&estimate),
            truth_series.as_ref(),
        )
        .map_err(|e| ResultsError::Plot(format!("{}: {}", path.display(), e)))?;
        written.push(path);
    }

    let path = output_dir.join("trajectory.png");
    plot_trajectory(&path, options.size, &estimate, truth.as_ref())
        .map_err(|e| ResultsError::Plot(format!("{}: {}", path.display(), e)))?;
    written.push(path);

    log::info!(
        "Plotted {} states into {}.",
        estimate.len(),
        output_dir.display()
    );
    Ok(written)
}

fn position_series(log: &StateLog) -> Vec<Series<'static>> {
    vector_series(log, ["x", "y", "z"], |record| {
        [record.p.x, record.p.y, record.p.z]
    })
}

fn velocity_series(log: &StateLog) -> Vec<Series<'static>> {
    vector_series(log, ["vx", "vy", "vz"], |record| {
        [record.v.x, record.v.y, record.v.z]
    })
}

fn attitude_series(log: &StateLog) -> Vec<Series<'static>> {
    vector_series(log, ["roll", "pitch", "yaw"], |record| {
        let (roll, pitch, yaw) = record.euler_angles();
        [roll, pitch, yaw]
    })
}

fn clock_bias_series(log: &StateLog) -> Vec<Series<'static>> {
    let tau = |index: usize| -> Vec<f64> { log.records().iter().map(|r| r.tau[index]).collect() };
    vec![
        Series {
            label: "tau",
            values: tau(0),
        },
        Series {
            label: "tau dot",
            values: tau(1),
        },
    ]
}

fn vector_series(
    log: &StateLog,
    labels: [&'static str; 3],
    components: impl Fn(&StateRecord) -> [f64; 3],
) -> Vec<Series<'static>> {
    let values: Vec<[f64; 3]> = log.records().iter().map(components).collect();
    labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| Series {
            label,
            values: values.iter().map(|v| v[index]).collect(),
        })
        .collect()
}

/// Every series gets its own panel, stacked vertically, with time on the x axis.
fn plot_time_series(
    path: &Path,
    caption: &str,
    size: (u32, u32),
    times: &[f64],
    series: &[Series],
    truth: Option<&(Vec<f64>, Vec<Series>)>,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(caption, ("sans-serif", 30).into_font())?;
    let panels = root.split_evenly((series.len().max(1), 1));

    let (t_min, t_max) = padded_range(times.iter().copied());

    for (index, (panel, s)) in panels.iter().zip(series).enumerate() {
        let truth_values = truth.and_then(|(t, truth_series)| {
            truth_series
                .get(index)
                .map(|ts| (t.as_slice(), ts.values.as_slice()))
        });
        let all_values = s
            .values
            .iter()
            .chain(truth_values.iter().flat_map(|(_, v)| v.iter()))
            .copied();
        let (y_min, y_max) = padded_range(all_values);

        let mut chart = ChartBuilder::on(panel)
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(t_min..t_max, y_min..y_max)?;
        chart.configure_mesh().y_desc(s.label).draw()?;

        if let Some((t, values)) = truth_values {
            chart
                .draw_series(LineSeries::new(
                    t.iter().copied().zip(values.iter().copied()),
                    &BLACK,
                ))?
                .label("truth")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
        }

        let color = SERIES_COLORS[index % SERIES_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                times.iter().copied().zip(s.values.iter().copied()),
                &color,
            ))?
            .label(s.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Top down view (north over east) with equal axis scaling.
fn plot_trajectory(
    path: &Path,
    size: (u32, u32),
    estimate: &StateLog,
    truth: Option<&StateLog>,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let north_east = |log: &StateLog| -> Vec<(f64, f64)> {
        log.records().iter().map(|r| (r.p.y, r.p.x)).collect()
    };
    let estimate_points = north_east(estimate);
    let truth_points = truth.map(north_east).unwrap_or_default();

    let all_points = || estimate_points.iter().chain(truth_points.iter());
    let (x_min, x_max) = padded_range(all_points().map(|(x, _)| *x));
    let (y_min, y_max) = padded_range(all_points().map(|(_, y)| *y));
    let diff = (x_max - x_min).max(y_max - y_min);
    let x_avg = (x_min + x_max) / 2.0;
    let y_avg = (y_min + y_max) / 2.0;

    let mut chart = ChartBuilder::on(&root)
        .caption("Trajectory", ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_avg - diff / 2.0)..(x_avg + diff / 2.0),
            (y_avg - diff / 2.0)..(y_avg + diff / 2.0),
        )?;
    chart
        .configure_mesh()
        .x_desc("East [m]")
        .y_desc("North [m]")
        .draw()?;

    if !truth_points.is_empty() {
        chart
            .draw_series(LineSeries::new(truth_points.iter().copied(), &BLACK))?
            .label("truth")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
    }
    chart
        .draw_series(LineSeries::new(estimate_points.iter().copied(), &RED))?
        .label("estimate")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// # Explanation
/// Min and max of the finite values, widened by 5 percent. An empty or constant input gets a range
/// around the value so that plotters never sees an empty range.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let finite: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    let min = finite.iter().copied().min_by(cmp_f64);
    let max = finite.iter().copied().max_by(cmp_f64);

    match (min, max) {
        (Some(min), Some(max)) if max > min => {
            let pad = 0.05 * (max - min);
            (min - pad, max + pad)
        }
        (Some(value), Some(_)) => (value - 1.0, value + 1.0),
        _ => (-1.0, 1.0),
    }
}

fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

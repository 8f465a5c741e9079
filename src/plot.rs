use std::path::Path;

use plotters::prelude::*;

use crate::{
    error::{Error, Result},
    logger::VectorLog,
    region::Regions,
    types::Float,
    util::max_abs,
};

pub(crate) fn plot_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Value range of the data, widened when the data is flat so that the axis
/// is never degenerate
pub fn padded_range(data: &[Float]) -> (Float, Float) {
    let min_y = data.iter().cloned().fold(Float::INFINITY, Float::min);
    let max_y = data.iter().cloned().fold(Float::NEG_INFINITY, Float::max);
    if !min_y.is_finite() || !max_y.is_finite() {
        return (-1., 1.);
    }
    let span = max_y - min_y;
    if span < 1e-9 {
        let pad = (0.1 * max_abs(&[min_y, max_y])).max(1e-3);
        (min_y - pad, max_y + pad)
    } else {
        (min_y - 0.05 * span, max_y + 0.05 * span)
    }
}

/// (rows, columns) of a grid with 3 columns holding n panels
pub fn grid_shape(n: usize) -> (usize, usize) {
    let cols = n.clamp(1, 3);
    (n.div_ceil(cols).max(1), cols)
}

/// Draw the ball/floor safety and target regions as rectangles
pub fn plot_regions(regions: &Regions, path: &Path) -> Result<()> {
    let lim = regions.axis_limit();

    let root = BitMapBackend::new(path, (640, 640)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-lim..lim, -lim..lim)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("x (m)")
        .y_desc("z (m)")
        .draw()
        .map_err(plot_err)?;

    // ball regions dashed, floor regions solid
    let rects = [
        (regions.safety.ball_rect(), MAGENTA.mix(1.0), true, "ball safety region"),
        (regions.safety.floor_rect(), GREEN.mix(0.5), false, "floor safety region"),
        (regions.target.ball_rect(), BLUE.mix(1.0), true, "ball target region"),
        (regions.target.floor_rect(), RED.mix(0.5), false, "floor target region"),
    ];
    for (((x, y), w, h), color, dashed, label) in rects {
        let style = color.stroke_width(2);
        let outline = vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)];
        let anno = if dashed {
            chart.draw_series(DashedLineSeries::new(outline, 6, 4, style))
        } else {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x, y), (x + w, y + h)],
                style,
            )))
        };
        anno.map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    log::info!("saved regions to {}", path.display());
    Ok(())
}

/// Plot a single series sampled every dt seconds
pub fn plot(data: &[Float], final_time: Float, dt: Float, name: &str) -> Result<()> {
    let (min_y, max_y) = padded_range(data);
    let path = format!("{}.png", name);

    // Create a plotting area
    let root = BitMapBackend::new(&path, (640, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    // Configure the chart
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} vs. Time plot", name), ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..final_time, min_y..max_y)
        .map_err(plot_err)?;

    chart.configure_mesh().draw().map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            data.iter().enumerate().map(|(i, y)| (i as Float * dt, *y)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Plot a trajectory in the plane
pub fn plot_trajectory(xs: &[Float], ys: &[Float], name: &str) -> Result<()> {
    let (min_x, max_x) = padded_range(xs);
    let (min_y, max_y) = padded_range(ys);
    let path = format!("{}.png", name);

    let root = BitMapBackend::new(&path, (640, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(name, ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(min_x..max_x, min_y..max_y)
        .map_err(plot_err)?;

    chart.configure_mesh().draw().map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(
            xs.iter().cloned().zip(ys.iter().cloned()),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Plot the selected rows of a vector log against time, one panel per row
pub fn plot_state_log(log: &VectorLog, rows: &[usize], path: &Path) -> Result<()> {
    for &i in rows {
        if i >= log.size() {
            return Err(Error::DimensionMismatch {
                what: "plotted state index",
                expected: log.size(),
                got: i,
            });
        }
    }
    let times = log.sample_times();
    let t_end = times.last().cloned().unwrap_or(1.).max(1e-9);
    let (n_rows, n_cols) = grid_shape(rows.len());

    let root = BitMapBackend::new(path, (400 * n_cols as u32, 300 * n_rows as u32))
        .into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    for (area, &i) in root.split_evenly((n_rows, n_cols)).iter().zip(rows.iter()) {
        let data = log.row(i);
        let (min_y, max_y) = padded_range(&data);
        let mut chart = ChartBuilder::on(area)
            .caption(format!("State #{}", i), ("sans-serif", 16))
            .margin(5)
            .x_label_area_size(25)
            .y_label_area_size(45)
            .build_cartesian_2d(0.0..t_end, min_y..max_y)
            .map_err(plot_err)?;
        chart.configure_mesh().draw().map_err(plot_err)?;
        chart
            .draw_series(LineSeries::new(
                times.iter().cloned().zip(data.iter().cloned()),
                &BLUE,
            ))
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    log::info!("saved {} state panels to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod plot_tests {
    use crate::{assert_close, params::BounceParams};

    use super::*;

    #[test]
    fn range_of_varying_data() {
        let (lo, hi) = padded_range(&[0., 1., 2.]);
        assert_close!(lo, -0.1, 1e-12);
        assert_close!(hi, 2.1, 1e-12);
    }

    #[test]
    fn range_of_flat_data() {
        let (lo, hi) = padded_range(&[5., 5.]);
        assert!(lo < 5. && hi > 5.);
        let (lo, hi) = padded_range(&[0.]);
        assert_close!(lo, -1e-3, 1e-12);
        assert_close!(hi, 1e-3, 1e-12);
        assert_eq!(padded_range(&[]), (-1., 1.));
    }

    #[test]
    fn grid_layout() {
        assert_eq!(grid_shape(6), (2, 3));
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(4), (2, 3));
        assert_eq!(grid_shape(0), (1, 1));
    }

    #[test]
    fn rejects_out_of_range_row() {
        let log = VectorLog::new(2);
        let path = std::env::temp_dir().join("contact_explore_bad_rows.png");
        assert!(matches!(
            plot_state_log(&log, &[5], &path),
            Err(Error::DimensionMismatch { got: 5, .. })
        ));
    }

    #[test]
    fn writes_region_png() {
        // Arrange
        let regions = Regions::from_params(&BounceParams::default());
        let path = std::env::temp_dir().join("contact_explore_regions.png");
        let _ = std::fs::remove_file(&path);

        // Act
        plot_regions(&regions, &path).unwrap();

        // Assert
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn writes_state_log_png() {
        let mut log = VectorLog::new(2);
        for k in 0..10 {
            let t = k as Float * 0.1;
            log.record(t, &na::dvector![t, -t]).unwrap();
        }
        let path = std::env::temp_dir().join("contact_explore_state_log.png");
        let _ = std::fs::remove_file(&path);

        plot_state_log(&log, &[0, 1], &path).unwrap();

        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }
}

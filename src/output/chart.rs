use crate::binder::surface::ChartSpec;

const BAR: char = '█';

pub fn render_bar_chart(spec: &ChartSpec, width: usize) -> String {
    let max = spec
        .series
        .iter()
        .flat_map(|series| series.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let label_width = spec
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0);
    let tagged = spec.series.len() > 1;
    let series_width = spec
        .series
        .iter()
        .map(|series| series.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![spec.title.clone()];
    for (idx, label) in spec.labels.iter().enumerate() {
        for series in &spec.series {
            let value = series.values.get(idx).copied().unwrap_or(0.0);
            let cells = bar_cells(value, max, width);
            let bar: String = std::iter::repeat(BAR).take(cells).collect();
            let line = if tagged {
                format!(
                    "{label:<label_width$} {:<series_width$} {bar} {value}",
                    series.label
                )
            } else {
                format!("{label:<label_width$} {bar} {value}")
            };
            lines.push(line.trim_end().to_string());
        }
    }
    lines.join("\n")
}

fn bar_cells(value: f64, max: f64, width: usize) -> usize {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).round() as usize
}

use std::path::Path;

use geofig_config::OutputFormat;
use geofig_core::figure::Figure;
use geofig_io::{UnparseOptions, to_json_value, unparse_with};

/// 按所选格式渲染单个图形，返回值以换行结尾。
pub fn render(
    figure: &Figure,
    source: &Path,
    format: OutputFormat,
    options: &UnparseOptions,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Unparse => Ok(unparse_with(figure, options)),
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(&to_json_value(figure))?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Summary => Ok(summary(figure, source)),
    }
}

fn summary(figure: &Figure, source: &Path) -> String {
    let segments = figure.segments();
    let total_length: f64 = segments.all_edges().map(|segment| segment.length()).sum();

    let mut lines = vec![
        format!("Figure: {}", source.display()),
        format!("  Description: {}", figure.description()),
        format!("  Points: {}", figure.points().len()),
        format!("  Segments: {}", segments.edge_count()),
        format!("  Total length: {total_length:.2}"),
    ];
    if let Some(bounds) = figure.bounds() {
        let (min, max) = (bounds.min(), bounds.max());
        lines.push(format!(
            "  Bounds: ({:.2}, {:.2}) - ({:.2}, {:.2})",
            min.x(),
            min.y(),
            max.x(),
            max.y()
        ));
    }
    let isolated: Vec<&str> = figure
        .points()
        .all()
        .filter(|point| !segments.tracks(point.name()))
        .map(|point| point.name())
        .collect();
    if !isolated.is_empty() {
        lines.push(format!("  Isolated: {}", isolated.join(", ")));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use geofig_core::figure::{AdjacencySpec, FigureBuilder, PointSpec};

    use super::*;

    fn sample() -> Figure {
        FigureBuilder::new()
            .build(
                "sample",
                [
                    PointSpec::new("A", 0.0, 0.0),
                    PointSpec::new("B", 3.0, 4.0),
                    PointSpec::new("Z", -1.0, 2.0),
                ],
                [AdjacencySpec::new("A", ["B"])],
            )
            .unwrap()
    }

    #[test]
    fn summary_reports_counts_and_bounds() {
        let text = render(
            &sample(),
            Path::new("sample.json"),
            OutputFormat::Summary,
            &UnparseOptions::default(),
        )
        .unwrap();
        assert!(text.contains("Figure: sample.json"));
        assert!(text.contains("  Points: 3\n"));
        assert!(text.contains("  Segments: 1\n"));
        assert!(text.contains("  Total length: 5.00\n"));
        assert!(text.contains("  Bounds: (-1.00, 0.00) - (3.00, 4.00)\n"));
        assert!(text.contains("  Isolated: Z\n"));
    }

    #[test]
    fn json_output_is_parseable() {
        let text = render(
            &sample(),
            Path::new("sample.json"),
            OutputFormat::Json,
            &UnparseOptions::default(),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Figure"]["Description"], "sample");
        assert_eq!(value["Figure"]["Segments"], serde_json::json!([{ "A": ["B"] }]));
    }
}

use geofig_core::figure::{Figure, Point};

/// 文本转储选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnparseOptions {
    pub indent: usize,
}

impl Default for UnparseOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// 生成可读的图形转储（接近 JSON 但并非合法 JSON），用于调试与测试对照。
pub fn unparse(figure: &Figure) -> String {
    unparse_with(figure, &UnparseOptions::default())
}

pub fn unparse_with(figure: &Figure, options: &UnparseOptions) -> String {
    let mut out = Dump::new(options.indent);

    out.line(0, "Figure");
    out.line(0, "{");
    out.line(1, format!("Description : {}", figure.description()));

    out.line(1, "Points:");
    out.line(1, "{");
    for point in figure.points() {
        out.line(2, format!("Point({})({:?}, {:?})", point.name(), point.x(), point.y()));
    }
    out.line(1, "}");

    // 每条无向边只在名称较小的端点下出现一次
    out.line(1, "Segments:");
    out.line(1, "{");
    let segments = figure.segments();
    for point in sorted_by_name(figure) {
        let Ok(neighbors) = segments.neighbors(point) else {
            continue;
        };
        let mut forward: Vec<&str> = neighbors
            .iter()
            .map(|neighbor| neighbor.name())
            .filter(|name| *name > point.name())
            .collect();
        if forward.is_empty() {
            continue;
        }
        forward.sort_unstable();
        out.line(2, format!("{} : {}", point.name(), forward.join(" ")));
    }
    out.line(1, "}");

    out.line(0, "}");
    out.finish()
}

fn sorted_by_name(figure: &Figure) -> Vec<&Point> {
    let mut points: Vec<&Point> = figure.points().all().collect();
    points.sort_by(|a, b| a.name().cmp(b.name()));
    points
}

struct Dump {
    buffer: String,
    indent: usize,
}

impl Dump {
    fn new(indent: usize) -> Self {
        Self {
            buffer: String::new(),
            indent,
        }
    }

    fn line(&mut self, level: usize, text: impl AsRef<str>) {
        for _ in 0..level * self.indent {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}

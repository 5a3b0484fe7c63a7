pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum FigureError {
        #[error("point `{0}` is declared more than once")]
        DuplicateName(String),
        #[error("point `{0}` is not declared")]
        UnknownPoint(String),
        #[error("segment connects point `{0}` to itself")]
        SelfLoop(String),
    }
}

pub mod geometry {
    use glam::DVec2;

    /// 二维坐标，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    /// 轴对齐边界框，用于估算图形范围。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }
    }
}

pub mod figure {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::hash::{Hash, Hasher};

    use tracing::debug;

    use crate::errors::FigureError;
    use crate::geometry::{Bounds2D, Point2};

    /// 命名点。名称区分大小写，是点的唯一身份；坐标相同并不意味着是同一个点。
    #[derive(Debug, Clone)]
    pub struct Point {
        name: String,
        position: Point2,
    }

    impl Point {
        pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
            Self {
                name: name.into(),
                position: Point2::new(x, y),
            }
        }

        #[inline]
        pub fn name(&self) -> &str {
            &self.name
        }

        #[inline]
        pub fn x(&self) -> f64 {
            self.position.x()
        }

        #[inline]
        pub fn y(&self) -> f64 {
            self.position.y()
        }

        #[inline]
        pub fn position(&self) -> Point2 {
            self.position
        }
    }

    impl PartialEq for Point {
        fn eq(&self, other: &Self) -> bool {
            self.name == other.name
        }
    }

    impl Eq for Point {}

    impl Hash for Point {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.name.hash(state);
        }
    }

    /// 无向线段。端点按名称排序保存，因此 `AB` 与 `BA` 是同一条线段。
    #[derive(Debug, Clone)]
    pub struct Segment {
        first: Point,
        second: Point,
    }

    impl Segment {
        pub fn new(a: Point, b: Point) -> Result<Self, FigureError> {
            if a == b {
                return Err(FigureError::SelfLoop(a.name));
            }
            Ok(Self::canonical(a, b))
        }

        fn canonical(a: Point, b: Point) -> Self {
            if a.name <= b.name {
                Self {
                    first: a,
                    second: b,
                }
            } else {
                Self {
                    first: b,
                    second: a,
                }
            }
        }

        #[inline]
        pub fn first(&self) -> &Point {
            &self.first
        }

        #[inline]
        pub fn second(&self) -> &Point {
            &self.second
        }

        #[inline]
        pub fn endpoints(&self) -> (&Point, &Point) {
            (&self.first, &self.second)
        }

        #[inline]
        pub fn length(&self) -> f64 {
            self.first.position.distance(self.second.position)
        }
    }

    impl PartialEq for Segment {
        fn eq(&self, other: &Self) -> bool {
            self.first == other.first && self.second == other.second
        }
    }

    impl Eq for Segment {}

    impl Hash for Segment {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.first.hash(state);
            self.second.hash(state);
        }
    }

    /// 点数据库：名称到点的映射，保留插入顺序以便输出稳定。
    #[derive(Debug, Clone, Default)]
    pub struct PointRegistry {
        points: Vec<Point>,
        index: HashMap<String, usize>,
    }

    impl PointRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        /// 插入新点。名称重复时返回错误，且注册表保持调用前的状态。
        pub fn add(&mut self, point: Point) -> Result<(), FigureError> {
            if self.index.contains_key(point.name()) {
                return Err(FigureError::DuplicateName(point.name));
            }
            self.index.insert(point.name.clone(), self.points.len());
            self.points.push(point);
            Ok(())
        }

        pub fn get(&self, name: &str) -> Result<&Point, FigureError> {
            self.find(name)
                .ok_or_else(|| FigureError::UnknownPoint(name.to_string()))
        }

        #[inline]
        pub fn find(&self, name: &str) -> Option<&Point> {
            self.index.get(name).map(|&slot| &self.points[slot])
        }

        #[inline]
        pub fn contains(&self, name: &str) -> bool {
            self.index.contains_key(name)
        }

        /// 按插入顺序遍历全部点。
        #[inline]
        pub fn all(&self) -> std::slice::Iter<'_, Point> {
            self.points.iter()
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.points.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.points.is_empty()
        }
    }

    impl<'a> IntoIterator for &'a PointRegistry {
        type Item = &'a Point;
        type IntoIter = std::slice::Iter<'a, Point>;

        fn into_iter(self) -> Self::IntoIter {
            self.all()
        }
    }

    /// 线段数据库：以点名为键的邻接表，始终保持对称。
    ///
    /// 端点一律通过 [`PointRegistry`] 按名称解析，图自身不会创造新点。
    #[derive(Debug, Clone, Default)]
    pub struct SegmentGraph {
        nodes: BTreeMap<String, Point>,
        adjacency: BTreeMap<String, BTreeSet<String>>,
    }

    impl SegmentGraph {
        pub fn new() -> Self {
            Self::default()
        }

        /// 连接注册表中的两个点。重复连接（任意方向）不会产生新边，返回值表示是否新增了边。
        ///
        /// 任一名称未登记时返回 `UnknownPoint`，图保持调用前的状态。
        pub fn connect(
            &mut self,
            registry: &PointRegistry,
            a: &str,
            b: &str,
        ) -> Result<bool, FigureError> {
            let a = registry.get(a)?;
            let b = registry.get(b)?;
            if a == b {
                return Err(FigureError::SelfLoop(a.name.clone()));
            }
            self.track(a);
            self.track(b);
            let inserted = self
                .adjacency
                .entry(a.name.clone())
                .or_default()
                .insert(b.name.clone());
            self.adjacency
                .entry(b.name.clone())
                .or_default()
                .insert(a.name.clone());
            Ok(inserted)
        }

        fn track(&mut self, point: &Point) {
            if !self.nodes.contains_key(point.name()) {
                self.nodes.insert(point.name.clone(), point.clone());
            }
        }

        /// 图中是否记录了该点（即至少参与过一条边）。
        #[inline]
        pub fn tracks(&self, name: &str) -> bool {
            self.adjacency.contains_key(name)
        }

        pub fn neighbors(&self, point: &Point) -> Result<Vec<&Point>, FigureError> {
            let names = self
                .adjacency
                .get(point.name())
                .ok_or_else(|| FigureError::UnknownPoint(point.name.clone()))?;
            Ok(names
                .iter()
                .filter_map(|name| self.nodes.get(name))
                .collect())
        }

        /// 每条无向边只产出一次，首端点为名称较小者。
        pub fn all_edges(&self) -> impl Iterator<Item = Segment> + '_ {
            self.adjacency.iter().flat_map(move |(from, targets)| {
                targets
                    .iter()
                    .filter(move |to| *to > from)
                    .filter_map(move |to| {
                        let first = self.nodes.get(from)?;
                        let second = self.nodes.get(to)?;
                        Some(Segment::canonical(first.clone(), second.clone()))
                    })
            })
        }

        pub fn contains_edge(&self, a: &str, b: &str) -> bool {
            self.adjacency
                .get(a)
                .is_some_and(|targets| targets.contains(b))
        }

        #[inline]
        pub fn edge_count(&self) -> usize {
            self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.adjacency.is_empty()
        }
    }

    /// 完整的几何图形：描述、点数据库与线段数据库。构建后不可修改。
    #[derive(Debug, Clone)]
    pub struct Figure {
        description: String,
        points: PointRegistry,
        segments: SegmentGraph,
    }

    impl Figure {
        #[inline]
        pub fn description(&self) -> &str {
            &self.description
        }

        #[inline]
        pub fn points(&self) -> &PointRegistry {
            &self.points
        }

        #[inline]
        pub fn segments(&self) -> &SegmentGraph {
            &self.segments
        }

        /// 按名称查询邻接点；已声明但没有任何线段的点返回空列表。
        pub fn neighbors(&self, name: &str) -> Result<Vec<&Point>, FigureError> {
            let point = self.points.get(name)?;
            if self.segments.tracks(point.name()) {
                self.segments.neighbors(point)
            } else {
                Ok(Vec::new())
            }
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for point in &self.points {
                bounds.include_point(point.position());
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct PointSpec {
        pub name: String,
        pub x: f64,
        pub y: f64,
    }

    impl PointSpec {
        pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
            Self {
                name: name.into(),
                x,
                y,
            }
        }
    }

    /// 邻接表中的一项：起点名称及其连接的点名称。
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AdjacencySpec {
        pub from: String,
        pub to: Vec<String>,
    }

    impl AdjacencySpec {
        pub fn new<I, S>(from: impl Into<String>, to: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                from: from.into(),
                to: to.into_iter().map(Into::into).collect(),
            }
        }
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub struct FigureBuilder;

    impl FigureBuilder {
        pub fn new() -> Self {
            Self
        }

        /// 先按顺序登记全部点，再逐项连接邻接表。
        ///
        /// 任一步失败都会放弃整个构建，不会返回部分填充的图形。
        pub fn build<P, A>(
            &self,
            description: impl Into<String>,
            points: P,
            adjacency: A,
        ) -> Result<Figure, FigureError>
        where
            P: IntoIterator<Item = PointSpec>,
            A: IntoIterator<Item = AdjacencySpec>,
        {
            let mut registry = PointRegistry::new();
            for spec in points {
                registry.add(Point::new(spec.name, spec.x, spec.y))?;
            }

            let mut graph = SegmentGraph::new();
            for entry in adjacency {
                registry.get(&entry.from)?;
                for to_name in &entry.to {
                    graph.connect(&registry, &entry.from, to_name)?;
                }
            }

            let figure = Figure {
                description: description.into(),
                points: registry,
                segments: graph,
            };
            debug!(
                points = figure.points.len(),
                segments = figure.segments.edge_count(),
                "已构建几何图形"
            );
            Ok(figure)
        }
    }

}

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点（文档单位，通常为毫米），内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        /// 欧氏距离。
        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn is_finite(self) -> bool {
            self.0.is_finite()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    impl From<(f64, f64)> for Point2 {
        fn from((x, y): (f64, f64)) -> Self {
            Self::new(x, y)
        }
    }

    /// 二维向量，用于拖拽位移等相对量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn scale(self, factor: f64) -> Self {
            Self(self.0 * factor)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于估算图形/文档范围。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

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

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
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

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }
}

/// 文档单位与显示单位之间的线性换算。
pub mod units {
    use crate::geometry::Point2;

    /// A4 纸张在 96 DPI 下每毫米对应的像素数。
    pub const DEFAULT_DISPLAY_SCALE: f64 = 3.78;

    #[inline]
    pub fn document_to_display(value: f64, scale: f64) -> f64 {
        value * scale
    }

    #[inline]
    pub fn display_to_document(value: f64, scale: f64) -> f64 {
        value / scale
    }

    #[inline]
    pub fn point_to_display(point: Point2, scale: f64) -> Point2 {
        Point2::new(
            document_to_display(point.x(), scale),
            document_to_display(point.y(), scale),
        )
    }

    #[inline]
    pub fn point_to_document(point: Point2, scale: f64) -> Point2 {
        Point2::new(
            display_to_document(point.x(), scale),
            display_to_document(point.y(), scale),
        )
    }

}

/// 无状态几何查询：栅格吸附、点在多边形内、点到线段距离与图形命中测试。
///
/// 所有函数都是纯函数，可在任意调用点重入。
pub mod query {
    use crate::document::{Document, Shape, ShapeKind};
    use crate::geometry::Point2;

    /// 将点吸附到最近的栅格交点。关闭吸附或栅格尺寸非正时原样返回。
    ///
    /// 每个坐标按 `round(v / g) * g` 取整，`round` 为远离零的四舍五入。
    pub fn snap_to_grid(point: Point2, grid_size: f64, enabled: bool) -> Point2 {
        if !enabled || !grid_size.is_finite() || grid_size <= 0.0 {
            return point;
        }
        let snap = |value: f64| (value / grid_size).round() * grid_size;
        Point2::new(snap(point.x()), snap(point.y()))
    }

    /// 偶奇射线法判断点是否落在闭合环内。
    ///
    /// 少于 3 个顶点的环不包含任何点。边界上的点遵循半开约定：
    /// 左边与下边（坐标较小一侧）算作内部，右边与上边算作外部。
    /// 首尾重复的闭合环与不重复的环结果一致。
    pub fn point_in_polygon(point: Point2, ring: &[Point2]) -> bool {
        if ring.len() < 3 {
            return false;
        }
        let (px, py) = (point.x(), point.y());
        let mut inside = false;
        let mut previous = ring[ring.len() - 1];
        for &current in ring {
            let (xi, yi) = (current.x(), current.y());
            let (xj, yj) = (previous.x(), previous.y());
            if (yi > py) != (yj > py) {
                let crossing_x = (xj - xi) * (py - yi) / (yj - yi) + xi;
                if px < crossing_x {
                    inside = !inside;
                }
            }
            previous = current;
        }
        inside
    }

    /// 点到线段的最短距离，投影参数被限制在 `[0, 1]`。
    /// 线段退化为点时返回到该点的距离。
    pub fn distance_to_segment(point: Point2, a: Point2, b: Point2) -> f64 {
        let p = point.as_vec2();
        let start = a.as_vec2();
        let direction = b.as_vec2() - start;
        let length_squared = direction.length_squared();
        if length_squared == 0.0 {
            return point.distance(a);
        }
        let t = ((p - start).dot(direction) / length_squared).clamp(0.0, 1.0);
        p.distance(start + direction * t)
    }

    pub fn point_near_polyline(point: Point2, polyline: &[Point2], tolerance: f64) -> bool {
        polyline
            .windows(2)
            .any(|segment| distance_to_segment(point, segment[0], segment[1]) <= tolerance)
    }

    /// 根据图形种类分派命中测试：多边形判断内部，折线判断容差范围。
    pub fn hit_test(point: Point2, shape: &Shape, tolerance: f64) -> bool {
        match shape.kind {
            ShapeKind::Polygon => point_in_polygon(point, &shape.points),
            ShapeKind::Polyline => point_near_polyline(point, &shape.points, tolerance),
        }
    }

    /// 返回命中点的最上层图形（即最后绘制的那个）。
    pub fn shape_at(document: &Document, point: Point2, tolerance: f64) -> Option<&Shape> {
        document
            .shapes()
            .rev()
            .find(|shape| hit_test(point, shape, tolerance))
    }

    /// 由对角两点推导矩形的四个顶点，按绘制顺序排列。
    pub fn rectangle_from_corners(a: Point2, b: Point2) -> [Point2; 4] {
        [a, Point2::new(b.x(), a.y()), b, Point2::new(a.x(), b.y())]
    }

}

pub mod document {
    use std::collections::{BTreeSet, HashSet};
    use std::fmt;
    use std::hash::{Hash, Hasher};

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Bounds2D, Point2, Vector2};
    use crate::templates::{self, Template};
    use crate::units;

    /// 图形标识，文档内唯一，创建后不可变。
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ShapeId(String);

    impl ShapeId {
        #[inline]
        pub fn new(raw: impl Into<String>) -> Self {
            Self(raw.into())
        }

        #[inline]
        pub fn as_str(&self) -> &str {
            &self.0
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    impl fmt::Display for ShapeId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<&str> for ShapeId {
        fn from(value: &str) -> Self {
            Self::new(value)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ShapeKind {
        Polyline,
        Polygon,
    }

    impl ShapeKind {
        /// 该种类合法所需的最少顶点数。
        #[inline]
        pub fn min_points(self) -> usize {
            match self {
                ShapeKind::Polyline => 2,
                ShapeKind::Polygon => 3,
            }
        }

        #[inline]
        pub fn as_str(self) -> &'static str {
            match self {
                ShapeKind::Polyline => "polyline",
                ShapeKind::Polygon => "polygon",
            }
        }
    }

    impl fmt::Display for ShapeKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// 语义角色标签（开放集合），决定图例分组与默认样式。
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Role(String);

    impl Role {
        pub const HOUSE_FRONT: &'static str = "houseFront";
        pub const BOUNDARY: &'static str = "boundary";
        pub const GATE: &'static str = "gate";
        pub const PATHWAY: &'static str = "pathway";
        pub const DRIVEWAY: &'static str = "driveway";
        pub const WALKWAY: &'static str = "walkway";
        pub const PATIO: &'static str = "patio";
        pub const GARDEN_BED: &'static str = "gardenBed";
        pub const BUILDING: &'static str = "building";
        pub const PROPERTY_LINE: &'static str = "propertyLine";
        pub const DRAWN: &'static str = "drawn";

        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self(name.into())
        }

        #[inline]
        pub fn as_str(&self) -> &str {
            &self.0
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// 角色对应的默认样式，未知角色使用通用样式。
        pub fn default_style(&self) -> Style {
            match self.as_str() {
                Self::HOUSE_FRONT => Style::new("#e74c3c", 0.5, "#f8f9fa"),
                Self::BOUNDARY => Style::new("#8e44ad", 0.8, "none"),
                Self::GATE => Style::new("#f39c12", 0.5, "none"),
                Self::PATHWAY | Self::WALKWAY => Style::new("#95a5a6", 0.6, "#f8f9fa"),
                Self::DRIVEWAY => Style::new("#7f8c8d", 1.0, "#ecf0f1"),
                Self::PATIO => Style::new("#34495e", 0.8, "#ecf0f1"),
                Self::GARDEN_BED => Style::new("#27ae60", 0.5, "#d5f4e6"),
                Self::BUILDING => Style::new("#e74c3c", 0.8, "none"),
                Self::PROPERTY_LINE => Style::new("#95a5a6", 0.3, "none").with_dash("3,3"),
                _ => Style::default(),
            }
        }
    }

    impl fmt::Display for Role {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<&str> for Role {
        fn from(value: &str) -> Self {
            Self::new(value)
        }
    }

    impl From<String> for Role {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl PartialEq<str> for Role {
        fn eq(&self, other: &str) -> bool {
            self.0 == other
        }
    }

    impl PartialEq<&str> for Role {
        fn eq(&self, other: &&str) -> bool {
            self.0 == *other
        }
    }

    /// 开口类型。未识别的字符串保留在 `Other` 中，以便无损往返。
    ///
    /// 比较与哈希按 [`OpeningKind::as_str`] 进行，`Other("door")` 与 `Door` 视为相同。
    #[derive(Debug, Clone, Default)]
    pub enum OpeningKind {
        #[default]
        Door,
        Window,
        Gate,
        Other(String),
    }

    impl OpeningKind {
        pub fn parse(value: &str) -> Self {
            match value {
                "door" => OpeningKind::Door,
                "window" => OpeningKind::Window,
                "gate" => OpeningKind::Gate,
                other => OpeningKind::Other(other.to_string()),
            }
        }

        pub fn as_str(&self) -> &str {
            match self {
                OpeningKind::Door => "door",
                OpeningKind::Window => "window",
                OpeningKind::Gate => "gate",
                OpeningKind::Other(value) => value,
            }
        }

        /// 把写成 `Other` 的已知类型归一为对应变体。
        pub fn normalized(self) -> Self {
            match self {
                OpeningKind::Other(value) => OpeningKind::parse(&value),
                known => known,
            }
        }
    }

    impl PartialEq for OpeningKind {
        fn eq(&self, other: &Self) -> bool {
            self.as_str() == other.as_str()
        }
    }

    impl Eq for OpeningKind {}

    impl Hash for OpeningKind {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.as_str().hash(state);
        }
    }

    /// 叠加在图形上的门/窗/大门标记，仅作描述，不参与命中测试。
    #[derive(Debug, Clone, PartialEq)]
    pub struct Opening {
        pub start: Point2,
        pub end: Point2,
        pub kind: OpeningKind,
    }

    impl Opening {
        #[inline]
        pub fn new(start: Point2, end: Point2, kind: OpeningKind) -> Self {
            Self {
                start,
                end,
                kind: kind.normalized(),
            }
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.start.distance(self.end)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Style {
        pub stroke: String,
        /// 线宽，文档单位。
        pub stroke_width: f64,
        pub fill: String,
        pub dash: Option<String>,
    }

    impl Style {
        pub fn new(stroke: impl Into<String>, stroke_width: f64, fill: impl Into<String>) -> Self {
            Self {
                stroke: stroke.into(),
                stroke_width,
                fill: fill.into(),
                dash: None,
            }
        }

        pub fn with_dash(mut self, dash: impl Into<String>) -> Self {
            self.dash = Some(dash.into());
            self
        }
    }

    impl Default for Style {
        fn default() -> Self {
            Self::new("#2c3e50", 0.5, "none")
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Shape {
        id: ShapeId,
        pub kind: ShapeKind,
        pub role: Role,
        pub points: Vec<Point2>,
        pub openings: Vec<Opening>,
        pub style: Style,
    }

    impl Shape {
        pub(crate) fn from_record_parts(
            id: impl Into<ShapeId>,
            kind: ShapeKind,
            role: Role,
            points: Vec<Point2>,
            openings: Vec<Opening>,
            style: Style,
        ) -> Self {
            Self {
                id: id.into(),
                kind,
                role,
                points,
                openings,
                style,
            }
        }

        #[inline]
        pub fn id(&self) -> &ShapeId {
            &self.id
        }

        /// 顶点数是否满足种类要求。
        #[inline]
        pub fn has_enough_points(&self) -> bool {
            self.points.len() >= self.kind.min_points()
        }

        /// 返回整体平移后的顶点，不修改自身。
        pub fn translated_points(&self, offset: Vector2) -> Vec<Point2> {
            self.points.iter().map(|p| p.translate(offset)).collect()
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for point in &self.points {
                bounds.include_point(*point);
            }
            if bounds.is_empty() {
                None
            } else {
                Some(bounds)
            }
        }
    }

    /// `add_shape` 的输入：`id`、`style` 可省略，由文档补齐。
    #[derive(Debug, Clone, PartialEq)]
    pub struct ShapeDraft {
        pub id: Option<ShapeId>,
        pub kind: ShapeKind,
        pub role: Role,
        pub points: Vec<Point2>,
        pub openings: Vec<Opening>,
        pub style: Option<Style>,
    }

    impl ShapeDraft {
        pub fn new(
            kind: ShapeKind,
            role: impl Into<Role>,
            points: impl IntoIterator<Item = Point2>,
        ) -> Self {
            Self {
                id: None,
                kind,
                role: role.into(),
                points: points.into_iter().collect(),
                openings: Vec::new(),
                style: None,
            }
        }

        #[inline]
        pub fn polygon(role: impl Into<Role>, points: impl IntoIterator<Item = Point2>) -> Self {
            Self::new(ShapeKind::Polygon, role, points)
        }

        #[inline]
        pub fn polyline(role: impl Into<Role>, points: impl IntoIterator<Item = Point2>) -> Self {
            Self::new(ShapeKind::Polyline, role, points)
        }

        pub fn with_id(mut self, id: impl Into<ShapeId>) -> Self {
            self.id = Some(id.into());
            self
        }

        pub fn with_openings(mut self, openings: impl IntoIterator<Item = Opening>) -> Self {
            self.openings = openings.into_iter().collect();
            self
        }

        pub fn with_style(mut self, style: Style) -> Self {
            self.style = Some(style);
            self
        }
    }

    impl From<String> for ShapeId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    /// 部分更新：仅合并为 `Some` 的字段，`id` 不可更改。
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ShapeUpdate {
        pub kind: Option<ShapeKind>,
        pub role: Option<Role>,
        pub points: Option<Vec<Point2>>,
        pub openings: Option<Vec<Opening>>,
        pub style: Option<Style>,
    }

    impl ShapeUpdate {
        pub fn points(points: impl IntoIterator<Item = Point2>) -> Self {
            Self {
                points: Some(points.into_iter().collect()),
                ..Self::default()
            }
        }

        pub fn with_role(mut self, role: impl Into<Role>) -> Self {
            self.role = Some(role.into());
            self
        }

        pub fn with_kind(mut self, kind: ShapeKind) -> Self {
            self.kind = Some(kind);
            self
        }

        pub fn with_openings(mut self, openings: impl IntoIterator<Item = Opening>) -> Self {
            self.openings = Some(openings.into_iter().collect());
            self
        }

        pub fn with_style(mut self, style: Style) -> Self {
            self.style = Some(style);
            self
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.kind.is_none()
                && self.role.is_none()
                && self.points.is_none()
                && self.openings.is_none()
                && self.style.is_none()
        }

        fn apply_to(self, shape: &mut Shape) {
            if let Some(kind) = self.kind {
                shape.kind = kind;
            }
            if let Some(role) = self.role {
                shape.role = role;
            }
            if let Some(points) = self.points {
                shape.points = points;
            }
            if let Some(openings) = self.openings {
                shape.openings = openings;
            }
            if let Some(style) = self.style {
                shape.style = style;
            }
        }
    }

    /// 绘图页面的物理尺寸。
    #[derive(Debug, Clone, PartialEq)]
    pub struct Page {
        pub width: f64,
        pub height: f64,
        pub unit: String,
    }

    impl Page {
        pub fn new(width: f64, height: f64, unit: impl Into<String>) -> Self {
            Self {
                width,
                height,
                unit: unit.into(),
            }
        }

        #[inline]
        pub fn has_valid_dimensions(&self) -> bool {
            self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
        }

        /// 以给定显示比例生成 SVG `viewBox` 字符串。
        pub fn view_box(&self, scale: f64) -> String {
            format!(
                "0 0 {} {}",
                units::document_to_display(self.width, scale),
                units::document_to_display(self.height, scale)
            )
        }
    }

    impl Default for Page {
        fn default() -> Self {
            Self::new(210.0, 297.0, "mm")
        }
    }

    /// 模板选择状态。`available` 固定为内置目录。
    #[derive(Debug, Clone, PartialEq)]
    pub struct TemplateSelection {
        pub selected: Option<String>,
        pub available: BTreeSet<String>,
    }

    impl TemplateSelection {
        #[inline]
        pub fn is_available(&self, id: &str) -> bool {
            self.available.contains(id)
        }
    }

    impl Default for TemplateSelection {
        fn default() -> Self {
            Self {
                selected: None,
                available: templates::catalog().map(|t| t.id.to_string()).collect(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct ValidationReport {
        pub is_valid: bool,
        pub errors: Vec<String>,
    }

    /// 图例条目：同一角色的图形数量与代表样式（取首个图形）。
    #[derive(Debug, Clone, PartialEq)]
    pub struct LegendEntry {
        pub role: Role,
        pub count: usize,
        pub style: Style,
    }

    /// 蓝图文档：聚合根，独占所有图形。
    ///
    /// 所有修改都通过 `add_shape` / `update_shape` / `remove_shape` 等具名操作完成，
    /// 对外只暴露只读引用，避免多个界面持有同一图形的可变别名。
    #[derive(Debug, Clone)]
    pub struct Document {
        page: Page,
        template: TemplateSelection,
        shapes: Vec<Shape>,
        next_shape_seq: u64,
    }

    impl Document {
        pub fn new() -> Self {
            Self::with_page(Page::default())
        }

        pub fn with_page(page: Page) -> Self {
            Self {
                page,
                template: TemplateSelection::default(),
                shapes: Vec::new(),
                next_shape_seq: 0,
            }
        }

        pub(crate) fn from_parts(
            page: Page,
            template: TemplateSelection,
            shapes: Vec<Shape>,
        ) -> Self {
            let next_shape_seq = shapes.len() as u64;
            Self {
                page,
                template,
                shapes,
                next_shape_seq,
            }
        }

        #[inline]
        pub fn page(&self) -> &Page {
            &self.page
        }

        #[inline]
        pub fn set_page(&mut self, page: Page) {
            self.page = page;
        }

        #[inline]
        pub fn template(&self) -> &TemplateSelection {
            &self.template
        }

        /// 仅记录所选模板，不增删任何图形；替换图形请使用 [`Document::apply_template`]。
        pub fn set_template(&mut self, template_id: impl Into<String>) {
            self.template.selected = Some(template_id.into());
        }

        pub fn clear_template(&mut self) {
            self.template.selected = None;
        }

        #[inline]
        pub fn shapes(&self) -> impl DoubleEndedIterator<Item = &Shape> + ExactSizeIterator {
            self.shapes.iter()
        }

        #[inline]
        pub fn shape_count(&self) -> usize {
            self.shapes.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.shapes.is_empty()
        }

        #[inline]
        pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
            self.shapes.iter().find(|shape| &shape.id == id)
        }

        #[inline]
        pub fn contains(&self, id: &ShapeId) -> bool {
            self.shape(id).is_some()
        }

        pub fn shapes_by_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Shape> + 'a {
            self.shapes.iter().filter(move |shape| shape.role == role)
        }

        /// 追加图形并返回存储后的引用。
        ///
        /// 缺失、为空或与现有图形冲突的 `id` 会被重新生成；未给出样式时使用角色默认样式。
        /// 此处不做校验，绘制过程中的临时非法图形由 [`Document::validate`] 负责发现。
        pub fn add_shape(&mut self, draft: ShapeDraft) -> &Shape {
            let id = match draft.id {
                Some(id) if !id.is_empty() && !self.contains(&id) => id,
                _ => self.next_id(),
            };
            let style = draft.style.unwrap_or_else(|| draft.role.default_style());
            let index = self.shapes.len();
            self.shapes.push(Shape {
                id,
                kind: draft.kind,
                role: draft.role,
                points: draft.points,
                openings: draft.openings,
                style,
            });
            &self.shapes[index]
        }

        /// 合并部分更新；`id` 不存在时返回 `None`。
        pub fn update_shape(&mut self, id: &ShapeId, update: ShapeUpdate) -> Option<&Shape> {
            let shape = self.shapes.iter_mut().find(|shape| &shape.id == id)?;
            update.apply_to(shape);
            Some(&*shape)
        }

        /// 移除首个匹配的图形；不存在时什么也不做。
        pub fn remove_shape(&mut self, id: &ShapeId) -> Option<Shape> {
            let index = self.shapes.iter().position(|shape| &shape.id == id)?;
            Some(self.shapes.remove(index))
        }

        /// 移除某角色的全部图形，返回移除数量。
        pub fn clear_role(&mut self, role: &str) -> usize {
            let before = self.shapes.len();
            self.shapes.retain(|shape| shape.role != role);
            before - self.shapes.len()
        }

        /// 按模板替换同角色图形：先清除模板角色下的所有图形，再加入模板几何。
        /// 不修改模板选择状态。
        pub fn apply_template(&mut self, template: &Template) -> &Shape {
            self.clear_role(template.role());
            self.add_shape(template.to_draft())
        }

        pub fn validate(&self) -> ValidationReport {
            let mut errors = Vec::new();

            if !self.page.has_valid_dimensions() {
                errors.push(format!(
                    "invalid page dimensions: {} x {} {}",
                    self.page.width, self.page.height, self.page.unit
                ));
            }

            if let Some(selected) = &self.template.selected {
                if !self.template.is_available(selected) {
                    errors.push(format!("template '{selected}' is not available"));
                }
            }

            let mut seen: HashSet<&ShapeId> = HashSet::new();
            for (index, shape) in self.shapes.iter().enumerate() {
                if shape.id.is_empty() {
                    errors.push(format!("shape {index} is missing an id"));
                } else if !seen.insert(&shape.id) {
                    errors.push(format!("shape {index} reuses id '{}'", shape.id));
                }
                if shape.role.is_empty() {
                    errors.push(format!("shape {index} is missing a role"));
                }
                if !shape.has_enough_points() {
                    errors.push(format!(
                        "shape {index} is a {} with {} point(s), needs at least {}",
                        shape.kind,
                        shape.points.len(),
                        shape.kind.min_points()
                    ));
                }
                if shape.points.iter().any(|p| !p.is_finite()) {
                    errors.push(format!("shape {index} has non-finite coordinates"));
                }
            }

            ValidationReport {
                is_valid: errors.is_empty(),
                errors,
            }
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            let mut has = false;
            for shape in &self.shapes {
                if let Some(shape_bounds) = shape.bounds() {
                    bounds.include_bounds(&shape_bounds);
                    has = true;
                }
            }
            if has { Some(bounds) } else { None }
        }

        /// 按角色首次出现的顺序分组。
        pub fn legend(&self) -> Vec<LegendEntry> {
            let mut entries: Vec<LegendEntry> = Vec::new();
            for shape in &self.shapes {
                match entries.iter_mut().find(|entry| entry.role == shape.role) {
                    Some(entry) => entry.count += 1,
                    None => entries.push(LegendEntry {
                        role: shape.role.clone(),
                        count: 1,
                        style: shape.style.clone(),
                    }),
                }
            }
            entries
        }

        fn next_id(&mut self) -> ShapeId {
            loop {
                self.next_shape_seq += 1;
                let candidate = ShapeId(format!("shape-{}", self.next_shape_seq));
                if !self.contains(&candidate) {
                    return candidate;
                }
            }
        }
    }

    impl Default for Document {
        fn default() -> Self {
            Self::new()
        }
    }

    /// 比较文档内容；内部的 id 计数器不参与比较。
    impl PartialEq for Document {
        fn eq(&self, other: &Self) -> bool {
            self.page == other.page && self.template == other.template && self.shapes == other.shapes
        }
    }

}

/// 内置房屋正面模板与围墙配置目录。
pub mod templates {
    use crate::document::{Opening, OpeningKind, Role, ShapeDraft};
    use crate::geometry::Point2;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TemplateFamily {
        HouseFront,
        WallConfiguration,
    }

    impl TemplateFamily {
        /// 该类模板生成图形所用的角色。
        #[inline]
        pub fn role(self) -> &'static str {
            match self {
                TemplateFamily::HouseFront => Role::HOUSE_FRONT,
                TemplateFamily::WallConfiguration => Role::BOUNDARY,
            }
        }

        #[inline]
        fn opening_kind(self) -> OpeningKind {
            match self {
                TemplateFamily::HouseFront => OpeningKind::Door,
                TemplateFamily::WallConfiguration => OpeningKind::Gate,
            }
        }
    }

    type Segment = ((f64, f64), (f64, f64));

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Template {
        pub id: &'static str,
        pub name: &'static str,
        pub description: &'static str,
        pub family: TemplateFamily,
        pub outline: &'static [(f64, f64)],
        pub openings: &'static [Segment],
    }

    impl Template {
        #[inline]
        pub fn role(&self) -> &'static str {
            self.family.role()
        }

        /// 生成可直接交给 `Document::add_shape` 的多边形草稿。
        pub fn to_draft(&self) -> ShapeDraft {
            let kind = self.family.opening_kind();
            ShapeDraft::polygon(self.role(), self.outline.iter().copied().map(Point2::from))
                .with_openings(self.openings.iter().map(|&(start, end)| {
                    Opening::new(Point2::from(start), Point2::from(end), kind.clone())
                }))
        }
    }

    const fn house(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        outline: &'static [(f64, f64)],
        openings: &'static [Segment],
    ) -> Template {
        Template {
            id,
            name,
            description,
            family: TemplateFamily::HouseFront,
            outline,
            openings,
        }
    }

    const fn walls(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        outline: &'static [(f64, f64)],
        openings: &'static [Segment],
    ) -> Template {
        Template {
            id,
            name,
            description,
            family: TemplateFamily::WallConfiguration,
            outline,
            openings,
        }
    }

    const RECTANGLE: &[(f64, f64)] = &[(20.0, 20.0), (120.0, 20.0), (120.0, 80.0), (20.0, 80.0)];
    const CENTER_DOOR: &[Segment] = &[((50.0, 20.0), (70.0, 20.0))];

    pub const HOUSE_FRONTS: &[Template] = &[
        house(
            "rectangular-simple",
            "Simple Rectangular",
            "Clean, straightforward design",
            RECTANGLE,
            CENTER_DOOR,
        ),
        house(
            "rectangular-with-porch",
            "With Porch",
            "Classic front porch",
            RECTANGLE,
            CENTER_DOOR,
        ),
        house(
            "l-shaped",
            "L-Shaped",
            "Modern L-shaped layout",
            &[
                (20.0, 20.0),
                (100.0, 20.0),
                (100.0, 60.0),
                (60.0, 60.0),
                (60.0, 80.0),
                (20.0, 80.0),
            ],
            &[((40.0, 20.0), (60.0, 20.0))],
        ),
        house(
            "u-shaped",
            "U-Shaped",
            "Courtyard style",
            &[
                (20.0, 20.0),
                (120.0, 20.0),
                (120.0, 40.0),
                (100.0, 40.0),
                (100.0, 60.0),
                (120.0, 60.0),
                (120.0, 80.0),
                (20.0, 80.0),
            ],
            CENTER_DOOR,
        ),
        house(
            "split-level",
            "Split Level",
            "Multi-level design",
            &[
                (20.0, 20.0),
                (120.0, 20.0),
                (120.0, 50.0),
                (100.0, 50.0),
                (100.0, 80.0),
                (20.0, 80.0),
            ],
            CENTER_DOOR,
        ),
        house(
            "colonial",
            "Colonial",
            "Traditional colonial style",
            RECTANGLE,
            &[((45.0, 20.0), (75.0, 20.0))],
        ),
        house(
            "ranch",
            "Ranch",
            "Single-story ranch",
            &[(20.0, 20.0), (140.0, 20.0), (140.0, 60.0), (20.0, 60.0)],
            &[((60.0, 20.0), (80.0, 20.0))],
        ),
        house(
            "modern-minimal",
            "Modern Minimal",
            "Clean lines, simple form",
            &[(20.0, 20.0), (120.0, 20.0), (120.0, 70.0), (20.0, 70.0)],
            CENTER_DOOR,
        ),
        house(
            "cottage-style",
            "Cottage",
            "Cozy cottage charm",
            &[(20.0, 20.0), (110.0, 20.0), (110.0, 75.0), (20.0, 75.0)],
            &[((45.0, 20.0), (65.0, 20.0))],
        ),
        house(
            "victorian",
            "Victorian",
            "Ornate Victorian style",
            &[(20.0, 20.0), (120.0, 20.0), (120.0, 85.0), (20.0, 85.0)],
            CENTER_DOOR,
        ),
    ];

    const PERIMETER: &[(f64, f64)] = &[(10.0, 10.0), (190.0, 10.0), (190.0, 287.0), (10.0, 287.0)];

    pub const WALL_CONFIGURATIONS: &[Template] = &[
        walls(
            "all-sides",
            "All Sides with Gate",
            "Walls on all sides except for a gate entrance",
            PERIMETER,
            &[((90.0, 10.0), (110.0, 10.0))],
        ),
        walls(
            "two-sides",
            "Two Sides Open",
            "Walls on two sides, front and back open",
            &[(10.0, 10.0), (190.0, 10.0), (190.0, 50.0), (10.0, 50.0)],
            &[],
        ),
        walls(
            "no-walls",
            "No Boundary Walls",
            "Property boundary line only",
            PERIMETER,
            &[],
        ),
    ];

    /// 依次遍历房屋模板与围墙配置。
    pub fn catalog() -> impl Iterator<Item = &'static Template> {
        HOUSE_FRONTS.iter().chain(WALL_CONFIGURATIONS.iter())
    }

    pub fn find(id: &str) -> Option<&'static Template> {
        catalog().find(|template| template.id == id)
    }

}

/// 与持久化、导出协作方交换的纯记录格式。
pub mod transport {
    use serde::{Deserialize, Serialize};

    use crate::document::{
        Document, Opening, OpeningKind, Page, Role, Shape, ShapeKind, Style, TemplateSelection,
    };
    use crate::geometry::Point2;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DocumentRecord {
        pub page: PageRecord,
        #[serde(default)]
        pub template: TemplateRecord,
        #[serde(default)]
        pub shapes: Vec<ShapeRecord>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PageRecord {
        pub width: f64,
        pub height: f64,
        pub unit: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct TemplateRecord {
        #[serde(default)]
        pub selected: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ShapeRecord {
        pub id: String,
        pub kind: ShapeKind,
        pub role: String,
        pub points: Vec<PointRecord>,
        #[serde(default)]
        pub openings: Vec<OpeningRecord>,
        #[serde(default)]
        pub style: StyleRecord,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct PointRecord {
        pub x: f64,
        pub y: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OpeningRecord {
        pub start: PointRecord,
        pub end: PointRecord,
        #[serde(rename = "type", default = "OpeningRecord::default_kind")]
        pub kind: String,
    }

    impl OpeningRecord {
        fn default_kind() -> String {
            OpeningKind::default().as_str().to_string()
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StyleRecord {
        pub stroke: String,
        pub stroke_width: f64,
        pub fill: String,
        #[serde(default)]
        pub dash: Option<String>,
    }

    impl Default for StyleRecord {
        fn default() -> Self {
            StyleRecord::from(&Style::default())
        }
    }

    impl From<Point2> for PointRecord {
        fn from(point: Point2) -> Self {
            Self {
                x: point.x(),
                y: point.y(),
            }
        }
    }

    impl From<PointRecord> for Point2 {
        fn from(record: PointRecord) -> Self {
            Point2::new(record.x, record.y)
        }
    }

    impl From<&Style> for StyleRecord {
        fn from(style: &Style) -> Self {
            Self {
                stroke: style.stroke.clone(),
                stroke_width: style.stroke_width,
                fill: style.fill.clone(),
                dash: style.dash.clone(),
            }
        }
    }

    impl From<StyleRecord> for Style {
        fn from(record: StyleRecord) -> Self {
            Style {
                stroke: record.stroke,
                stroke_width: record.stroke_width,
                fill: record.fill,
                dash: record.dash,
            }
        }
    }

    impl From<&Opening> for OpeningRecord {
        fn from(opening: &Opening) -> Self {
            Self {
                start: opening.start.into(),
                end: opening.end.into(),
                kind: opening.kind.as_str().to_string(),
            }
        }
    }

    impl From<OpeningRecord> for Opening {
        fn from(record: OpeningRecord) -> Self {
            Opening::new(
                record.start.into(),
                record.end.into(),
                OpeningKind::parse(&record.kind),
            )
        }
    }

    impl From<&Shape> for ShapeRecord {
        fn from(shape: &Shape) -> Self {
            Self {
                id: shape.id().as_str().to_string(),
                kind: shape.kind,
                role: shape.role.as_str().to_string(),
                points: shape.points.iter().copied().map(PointRecord::from).collect(),
                openings: shape.openings.iter().map(OpeningRecord::from).collect(),
                style: StyleRecord::from(&shape.style),
            }
        }
    }

    impl Document {
        /// 深拷贝为传输记录。
        pub fn to_transport(&self) -> DocumentRecord {
            let page = self.page();
            DocumentRecord {
                page: PageRecord {
                    width: page.width,
                    height: page.height,
                    unit: page.unit.clone(),
                },
                template: TemplateRecord {
                    selected: self.template().selected.clone(),
                },
                shapes: self.shapes().map(ShapeRecord::from).collect(),
            }
        }

        /// 从传输记录重建文档。记录原样接收（包括重复或为空的 id），
        /// 问题留给 [`Document::validate`] 报告。
        pub fn from_transport(record: DocumentRecord) -> Self {
            let page = Page::new(record.page.width, record.page.height, record.page.unit);
            let template = TemplateSelection {
                selected: record.template.selected,
                ..TemplateSelection::default()
            };
            let shapes = record
                .shapes
                .into_iter()
                .map(|shape| {
                    Shape::from_record_parts(
                        shape.id,
                        shape.kind,
                        Role::from(shape.role),
                        shape.points.into_iter().map(Point2::from).collect(),
                        shape.openings.into_iter().map(Opening::from).collect(),
                        Style::from(shape.style),
                    )
                })
                .collect();
            Document::from_parts(page, template, shapes)
        }
    }

}

//! 指针驱动的编辑状态机：工具选择、绘制、选中与拖拽。
//!
//! 所有事件坐标均为显示单位，经由 [`Scene`] 的视口换算为文档单位。
//! 图形只在明确的完成事件上提交到文档：多点工具为双击，两点工具为第二次按下。

use std::mem;

use florify_core::document::{Role, ShapeDraft, ShapeId, ShapeKind, ShapeUpdate, Style};
use florify_core::geometry::{Point2, Vector2};
use florify_core::query;
use tracing::{debug, warn};

use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointMode {
    /// 逐次点击累积顶点，双击完成。
    MultiPoint,
    /// 两次点击确定起点与终点。
    TwoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Polygon,
    Polyline,
    Pathway,
    Driveway,
    GardenBed,
    Building,
    Boundary,
    PropertyLine,
    Rectangle,
}

impl Tool {
    pub const ALL: [Tool; 10] = [
        Tool::Select,
        Tool::Polygon,
        Tool::Polyline,
        Tool::Pathway,
        Tool::Driveway,
        Tool::GardenBed,
        Tool::Building,
        Tool::Boundary,
        Tool::PropertyLine,
        Tool::Rectangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Polygon => "polygon",
            Tool::Polyline => "polyline",
            Tool::Pathway => "pathway",
            Tool::Driveway => "driveway",
            Tool::GardenBed => "garden-bed",
            Tool::Building => "building",
            Tool::Boundary => "boundary",
            Tool::PropertyLine => "property-line",
            Tool::Rectangle => "rectangle",
        }
    }

    pub fn parse(name: &str) -> Option<Tool> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// 选择工具不产生图形，返回 `None`。
    pub fn point_mode(self) -> Option<PointMode> {
        match self {
            Tool::Select => None,
            Tool::PropertyLine | Tool::Rectangle => Some(PointMode::TwoPoint),
            _ => Some(PointMode::MultiPoint),
        }
    }

    pub fn kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Select => None,
            Tool::Polygon | Tool::GardenBed | Tool::Building | Tool::Rectangle => {
                Some(ShapeKind::Polygon)
            }
            Tool::Polyline
            | Tool::Pathway
            | Tool::Driveway
            | Tool::Boundary
            | Tool::PropertyLine => Some(ShapeKind::Polyline),
        }
    }

    pub fn role(self) -> Option<&'static str> {
        match self {
            Tool::Select => None,
            Tool::Polygon | Tool::Polyline | Tool::Rectangle => Some(Role::DRAWN),
            Tool::Pathway => Some(Role::PATHWAY),
            Tool::Driveway => Some(Role::DRIVEWAY),
            Tool::GardenBed => Some(Role::GARDEN_BED),
            Tool::Building => Some(Role::BUILDING),
            Tool::Boundary => Some(Role::BOUNDARY),
            Tool::PropertyLine => Some(Role::PROPERTY_LINE),
        }
    }

    /// 工具自带的样式；`None` 表示沿用角色默认样式。
    pub fn style(self) -> Option<Style> {
        match self {
            Tool::Polygon | Tool::Rectangle => Some(Style::new("#2c3e50", 0.5, "#f8f9fa")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub grid_size: f64,
    pub snap_to_grid: bool,
    /// 折线命中容差，文档单位。
    pub hit_tolerance: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            snap_to_grid: true,
            hit_tolerance: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    DrawingMultiPoint {
        points: Vec<Point2>,
    },
    DrawingTwoPoint {
        start: Point2,
    },
    Dragging {
        shape: ShapeId,
        /// 按下时的显示坐标。
        origin: Point2,
        original: Vec<Point2>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
}

/// 编辑事件，坐标为显示单位。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    PointerDown(Point2),
    PointerMove(Point2),
    PointerUp(Point2),
    DoubleClick(Point2),
    Key(Key),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Nothing,
    Selected(ShapeId),
    SelectionCleared,
    DrawingStarted,
    PointAdded,
    Committed(ShapeId),
    Discarded,
    Moved(ShapeId),
    DragFinished(ShapeId),
    DragCancelled(ShapeId),
    Removed(ShapeId),
}

#[derive(Debug, Default)]
pub struct Editor {
    tool: Tool,
    state: EditState,
    settings: EditorSettings,
    cursor: Option<Point2>,
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[inline]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// 切换工具，放弃进行中的绘制或拖拽。
    pub fn set_tool(&mut self, scene: &mut Scene, tool: Tool) -> EditOutcome {
        let outcome = self.cancel(scene);
        self.tool = tool;
        debug!(tool = tool.name(), "切换编辑工具");
        outcome
    }

    #[inline]
    pub fn state(&self) -> &EditState {
        &self.state
    }

    #[inline]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    /// 最近一次指针位置（文档单位，未吸附）。
    #[inline]
    pub fn cursor(&self) -> Option<Point2> {
        self.cursor
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, EditState::Idle)
    }

    /// 当前正在绘制的顶点，供界面预览。
    pub fn in_progress_points(&self) -> &[Point2] {
        match &self.state {
            EditState::DrawingMultiPoint { points } => points,
            EditState::DrawingTwoPoint { start } => std::slice::from_ref(start),
            EditState::Idle | EditState::Dragging { .. } => &[],
        }
    }

    pub fn handle(&mut self, scene: &mut Scene, event: EditorEvent) -> EditOutcome {
        match event {
            EditorEvent::PointerDown(position) => self.pointer_down(scene, position),
            EditorEvent::PointerMove(position) => self.pointer_move(scene, position),
            EditorEvent::PointerUp(_) => self.pointer_up(),
            EditorEvent::DoubleClick(position) => self.double_click(scene, position),
            EditorEvent::Key(Key::Escape) => self.escape(scene),
            EditorEvent::Key(Key::Delete) => self.delete(scene),
        }
    }

    fn pointer_down(&mut self, scene: &mut Scene, display: Point2) -> EditOutcome {
        match mem::take(&mut self.state) {
            EditState::Idle => self.begin(scene, display),
            EditState::DrawingMultiPoint { mut points } => {
                let point = self.drawing_point(scene, display);
                let added = push_distinct(&mut points, point);
                self.state = EditState::DrawingMultiPoint { points };
                if added {
                    EditOutcome::PointAdded
                } else {
                    EditOutcome::Nothing
                }
            }
            EditState::DrawingTwoPoint { start } => {
                let end = self.drawing_point(scene, display);
                if end == start {
                    // 终点与起点重合，继续等待第二个点
                    self.state = EditState::DrawingTwoPoint { start };
                    return EditOutcome::Nothing;
                }
                let points = match self.tool {
                    Tool::Rectangle => query::rectangle_from_corners(start, end).to_vec(),
                    _ => vec![start, end],
                };
                self.commit(scene, points)
            }
            dragging @ EditState::Dragging { .. } => {
                self.state = dragging;
                EditOutcome::Nothing
            }
        }
    }

    fn begin(&mut self, scene: &mut Scene, display: Point2) -> EditOutcome {
        match self.tool.point_mode() {
            None => {
                let point = scene.to_document(display);
                let hit = scene
                    .shape_at(point, self.settings.hit_tolerance)
                    .map(|shape| (shape.id().clone(), shape.points.clone()));
                let Some((id, original)) = hit else {
                    scene.clear_selection();
                    return EditOutcome::SelectionCleared;
                };
                if let Err(err) = scene.select(&id) {
                    warn!(error = %err, "命中的图形无法选中");
                    return EditOutcome::Nothing;
                }
                debug!(id = %id, "开始拖拽");
                self.state = EditState::Dragging {
                    shape: id.clone(),
                    origin: display,
                    original,
                };
                EditOutcome::Selected(id)
            }
            Some(PointMode::MultiPoint) => {
                let point = self.drawing_point(scene, display);
                self.state = EditState::DrawingMultiPoint {
                    points: vec![point],
                };
                EditOutcome::DrawingStarted
            }
            Some(PointMode::TwoPoint) => {
                let start = self.drawing_point(scene, display);
                self.state = EditState::DrawingTwoPoint { start };
                EditOutcome::DrawingStarted
            }
        }
    }

    fn pointer_move(&mut self, scene: &mut Scene, display: Point2) -> EditOutcome {
        self.cursor = Some(scene.to_document(display));
        let EditState::Dragging {
            shape,
            origin,
            original,
        } = &self.state
        else {
            return EditOutcome::Nothing;
        };

        // 以按下点为基准的累计位移，避免逐帧误差叠加。
        let delta = scene.delta_to_document(Vector2::from_points(*origin, display));
        let moved: Vec<Point2> = original.iter().map(|p| p.translate(delta)).collect();
        let id = shape.clone();
        if scene
            .document_mut()
            .update_shape(&id, ShapeUpdate::points(moved))
            .is_none()
        {
            warn!(id = %id, "拖拽中的图形已不存在");
            self.state = EditState::Idle;
            return EditOutcome::Nothing;
        }
        EditOutcome::Moved(id)
    }

    fn pointer_up(&mut self) -> EditOutcome {
        match mem::take(&mut self.state) {
            EditState::Dragging { shape, .. } => {
                debug!(id = %shape, "结束拖拽");
                EditOutcome::DragFinished(shape)
            }
            other => {
                self.state = other;
                EditOutcome::Nothing
            }
        }
    }

    fn double_click(&mut self, scene: &mut Scene, display: Point2) -> EditOutcome {
        match mem::take(&mut self.state) {
            EditState::DrawingMultiPoint { mut points } => {
                let point = self.drawing_point(scene, display);
                push_distinct(&mut points, point);
                self.commit(scene, points)
            }
            other => {
                self.state = other;
                EditOutcome::Nothing
            }
        }
    }

    fn escape(&mut self, scene: &mut Scene) -> EditOutcome {
        if self.is_idle() {
            return if scene.clear_selection() {
                EditOutcome::SelectionCleared
            } else {
                EditOutcome::Nothing
            };
        }
        self.cancel(scene)
    }

    fn delete(&mut self, scene: &mut Scene) -> EditOutcome {
        if !self.is_idle() {
            return EditOutcome::Nothing;
        }
        match scene.delete_selection() {
            Some(shape) => EditOutcome::Removed(shape.id().clone()),
            None => EditOutcome::Nothing,
        }
    }

    /// 放弃进行中的操作；拖拽会恢复原始顶点。
    fn cancel(&mut self, scene: &mut Scene) -> EditOutcome {
        match mem::take(&mut self.state) {
            EditState::Idle => EditOutcome::Nothing,
            EditState::DrawingMultiPoint { .. } | EditState::DrawingTwoPoint { .. } => {
                debug!("放弃绘制");
                EditOutcome::Discarded
            }
            EditState::Dragging {
                shape, original, ..
            } => {
                scene
                    .document_mut()
                    .update_shape(&shape, ShapeUpdate::points(original));
                debug!(id = %shape, "取消拖拽，已恢复原位");
                EditOutcome::DragCancelled(shape)
            }
        }
    }

    /// 顶点数达到种类下限时提交为新图形，否则静默丢弃。
    fn commit(&mut self, scene: &mut Scene, points: Vec<Point2>) -> EditOutcome {
        self.state = EditState::Idle;
        let (Some(kind), Some(role)) = (self.tool.kind(), self.tool.role()) else {
            return EditOutcome::Discarded;
        };
        if points.len() < kind.min_points() {
            debug!(
                tool = self.tool.name(),
                points = points.len(),
                "顶点不足，放弃提交"
            );
            return EditOutcome::Discarded;
        }
        let mut draft = ShapeDraft::new(kind, role, points);
        if let Some(style) = self.tool.style() {
            draft = draft.with_style(style);
        }
        let shape = scene.document_mut().add_shape(draft);
        debug!(
            id = %shape.id(),
            kind = %shape.kind,
            role = %shape.role,
            points = shape.points.len(),
            "已提交新图形"
        );
        EditOutcome::Committed(shape.id().clone())
    }

    fn drawing_point(&self, scene: &Scene, display: Point2) -> Point2 {
        query::snap_to_grid(
            scene.to_document(display),
            self.settings.grid_size,
            self.settings.snap_to_grid,
        )
    }
}

/// 追加顶点，与上一个顶点重合时忽略。
fn push_distinct(points: &mut Vec<Point2>, point: Point2) -> bool {
    if points.last() == Some(&point) {
        return false;
    }
    points.push(point);
    true
}

#[cfg(test)]
mod tests {
    use florify_core::document::ShapeDraft;

    use super::*;

    fn unscaled() -> (Scene, Editor) {
        let scene = Scene::with_display_scale(1.0);
        let editor = Editor::new(EditorSettings {
            snap_to_grid: false,
            ..EditorSettings::default()
        });
        (scene, editor)
    }

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn draw_polygon_commits_on_double_click() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Polygon);

        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0))),
            EditOutcome::DrawingStarted
        );
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 10.0)));
        assert_eq!(editor.in_progress_points().len(), 3);

        let outcome = editor.handle(&mut scene, EditorEvent::DoubleClick(p(0.0, 10.0)));
        let EditOutcome::Committed(id) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert!(editor.is_idle());
        assert_eq!(scene.document().shape_count(), 1);
        let shape = scene.shape(&id).expect("committed shape");
        assert_eq!(shape.kind, ShapeKind::Polygon);
        assert_eq!(
            shape.points,
            vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]
        );
    }

    #[test]
    fn too_few_points_commit_nothing() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Polygon);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 0.0)));
        // 浏览器的双击紧跟在同一位置的按下之后
        let outcome = editor.handle(&mut scene, EditorEvent::DoubleClick(p(10.0, 0.0)));
        assert_eq!(outcome, EditOutcome::Discarded);
        assert!(editor.is_idle());
        assert!(scene.document().is_empty());
    }

    #[test]
    fn polyline_needs_two_points() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Pathway);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        let outcome = editor.handle(&mut scene, EditorEvent::DoubleClick(p(0.0, 0.0)));
        assert_eq!(outcome, EditOutcome::Discarded);

        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        let outcome = editor.handle(&mut scene, EditorEvent::DoubleClick(p(30.0, 0.0)));
        let EditOutcome::Committed(id) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        let shape = scene.shape(&id).expect("pathway");
        assert_eq!(shape.role, Role::PATHWAY);
        assert_eq!(shape.kind, ShapeKind::Polyline);
        assert_eq!(shape.style, Role::new(Role::PATHWAY).default_style());
    }

    #[test]
    fn duplicate_clicks_are_not_accumulated() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::GardenBed);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0))),
            EditOutcome::Nothing
        );
        assert_eq!(editor.in_progress_points(), &[p(0.0, 0.0)]);
    }

    #[test]
    fn two_point_tool_commits_on_second_press() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::PropertyLine);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        assert!(matches!(editor.state(), EditState::DrawingTwoPoint { .. }));
        // 抬起不结束两点绘制
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerUp(p(0.0, 0.0))),
            EditOutcome::Nothing
        );

        let outcome = editor.handle(&mut scene, EditorEvent::PointerDown(p(210.0, 0.0)));
        let EditOutcome::Committed(id) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        let shape = scene.shape(&id).expect("property line");
        assert_eq!(shape.points, vec![p(0.0, 0.0), p(210.0, 0.0)]);
        assert_eq!(shape.role, Role::PROPERTY_LINE);
        assert_eq!(shape.style.dash.as_deref(), Some("3,3"));
        assert!(editor.is_idle());
    }

    #[test]
    fn two_point_tool_ignores_press_on_start_point() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Rectangle);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 10.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 10.0))),
            EditOutcome::Nothing
        );
        assert_eq!(editor.state(), &EditState::DrawingTwoPoint { start: p(10.0, 10.0) });
        assert!(scene.document().is_empty());

        let outcome = editor.handle(&mut scene, EditorEvent::PointerDown(p(20.0, 30.0)));
        assert!(matches!(outcome, EditOutcome::Committed(_)));
        assert_eq!(scene.document().shape_count(), 1);
    }

    #[test]
    fn snapped_second_press_onto_start_keeps_drawing() {
        let mut scene = Scene::with_display_scale(1.0);
        let mut editor = Editor::new(EditorSettings::default());
        editor.set_tool(&mut scene, Tool::PropertyLine);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        // 吸附后落在同一栅格点
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(3.0, -2.0))),
            EditOutcome::Nothing
        );
        assert!(matches!(editor.state(), EditState::DrawingTwoPoint { .. }));
        assert!(scene.document().is_empty());
    }

    #[test]
    fn rectangle_tool_produces_four_point_polygon() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Rectangle);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 10.0)));
        let outcome = editor.handle(&mut scene, EditorEvent::PointerDown(p(40.0, 30.0)));
        let EditOutcome::Committed(id) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        let shape = scene.shape(&id).expect("rectangle");
        assert_eq!(shape.kind, ShapeKind::Polygon);
        assert_eq!(
            shape.points,
            vec![p(10.0, 10.0), p(40.0, 10.0), p(40.0, 30.0), p(10.0, 30.0)]
        );
        assert_eq!(shape.style.fill, "#f8f9fa");
    }

    #[test]
    fn drawing_points_snap_to_grid() {
        let mut scene = Scene::with_display_scale(1.0);
        let mut editor = Editor::new(EditorSettings::default());
        editor.set_tool(&mut scene, Tool::Polyline);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(3.0, 4.0)));
        editor.handle(&mut scene, EditorEvent::PointerDown(p(26.0, 14.9)));
        assert_eq!(editor.in_progress_points(), &[p(0.0, 0.0), p(30.0, 10.0)]);
    }

    #[test]
    fn display_positions_are_converted_to_document_units() {
        let mut scene = Scene::new();
        let mut editor = Editor::new(EditorSettings {
            snap_to_grid: false,
            ..EditorSettings::default()
        });
        editor.set_tool(&mut scene, Tool::PropertyLine);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerDown(p(37.8, 75.6)));
        let shape = scene.document().shapes().next().expect("line");
        assert!((shape.points[1].x() - 10.0).abs() < 1e-9);
        assert!((shape.points[1].y() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn drag_translates_only_the_dragged_shape() {
        let (mut scene, mut editor) = unscaled();
        let dragged = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 0.0), p(10.0, 0.0)]))
            .id()
            .clone();
        let bystander = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(
                Role::PATHWAY,
                [p(100.0, 100.0), p(120.0, 100.0)],
            ))
            .id()
            .clone();

        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(5.0, 0.0))),
            EditOutcome::Selected(dragged.clone())
        );
        editor.handle(&mut scene, EditorEvent::PointerMove(p(6.0, 1.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerMove(p(8.0, 4.0))),
            EditOutcome::Moved(dragged.clone())
        );
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerUp(p(8.0, 4.0))),
            EditOutcome::DragFinished(dragged.clone())
        );

        let moved = scene.shape(&dragged).expect("dragged");
        assert_eq!(moved.points, vec![p(3.0, 4.0), p(13.0, 4.0)]);
        let untouched = scene.shape(&bystander).expect("bystander");
        assert_eq!(untouched.points, vec![p(100.0, 100.0), p(120.0, 100.0)]);
        assert_eq!(scene.document().shape_count(), 2);
        assert!(scene.is_selected(&dragged));
        assert!(editor.is_idle());
    }

    #[test]
    fn drag_delta_is_scaled_and_not_snapped() {
        let mut scene = Scene::with_display_scale(2.0);
        let mut editor = Editor::new(EditorSettings::default());
        let id = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 0.0), p(10.0, 0.0)]))
            .id()
            .clone();

        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerMove(p(16.0, 8.0)));
        editor.handle(&mut scene, EditorEvent::PointerUp(p(16.0, 8.0)));
        assert_eq!(
            scene.shape(&id).map(|s| s.points.clone()),
            Some(vec![p(3.0, 4.0), p(13.0, 4.0)])
        );
    }

    #[test]
    fn escape_during_drag_restores_points() {
        let (mut scene, mut editor) = unscaled();
        let id = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 0.0), p(10.0, 0.0)]))
            .id()
            .clone();
        editor.handle(&mut scene, EditorEvent::PointerDown(p(5.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerMove(p(50.0, 50.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Escape)),
            EditOutcome::DragCancelled(id.clone())
        );
        assert_eq!(
            scene.shape(&id).map(|s| s.points.clone()),
            Some(vec![p(0.0, 0.0), p(10.0, 0.0)])
        );
    }

    #[test]
    fn clicking_empty_canvas_clears_selection() {
        let (mut scene, mut editor) = unscaled();
        let id = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 0.0), p(10.0, 0.0)]))
            .id()
            .clone();
        scene.select(&id).unwrap();
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(100.0, 100.0))),
            EditOutcome::SelectionCleared
        );
        assert!(editor.is_idle());
        assert!(scene.selection().is_none());
    }

    #[test]
    fn escape_discards_drawing() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Boundary);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 0.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Escape)),
            EditOutcome::Discarded
        );
        assert!(editor.is_idle());
        assert!(editor.in_progress_points().is_empty());
        assert!(scene.document().is_empty());
    }

    #[test]
    fn escape_discards_two_point_drawing() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::PropertyLine);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Escape)),
            EditOutcome::Discarded
        );
        assert!(editor.is_idle());
        assert!(editor.in_progress_points().is_empty());

        // 下一次按下重新开始，而不是提交
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerDown(p(50.0, 0.0))),
            EditOutcome::DrawingStarted
        );
        assert!(scene.document().is_empty());
    }

    #[test]
    fn delete_is_ignored_while_drawing() {
        let (mut scene, mut editor) = unscaled();
        let selected = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 50.0), p(10.0, 50.0)]))
            .id()
            .clone();
        scene.select(&selected).unwrap();

        editor.set_tool(&mut scene, Tool::Polygon);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerDown(p(10.0, 0.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Delete)),
            EditOutcome::Nothing
        );
        assert_eq!(editor.in_progress_points().len(), 2);
        assert!(scene.shape(&selected).is_some());
        assert!(scene.is_selected(&selected));

        editor.set_tool(&mut scene, Tool::PropertyLine);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Delete)),
            EditOutcome::Nothing
        );
        assert!(matches!(editor.state(), EditState::DrawingTwoPoint { .. }));
        assert!(scene.shape(&selected).is_some());
    }

    #[test]
    fn delete_is_ignored_while_dragging() {
        let (mut scene, mut editor) = unscaled();
        let id = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 0.0), p(10.0, 0.0)]))
            .id()
            .clone();
        editor.handle(&mut scene, EditorEvent::PointerDown(p(5.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerMove(p(5.0, 5.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Delete)),
            EditOutcome::Nothing
        );
        assert!(matches!(editor.state(), EditState::Dragging { .. }));
        assert!(scene.shape(&id).is_some());

        assert_eq!(
            editor.handle(&mut scene, EditorEvent::PointerUp(p(5.0, 5.0))),
            EditOutcome::DragFinished(id.clone())
        );
        assert_eq!(
            scene.shape(&id).map(|s| s.points.clone()),
            Some(vec![p(0.0, 5.0), p(10.0, 5.0)])
        );
    }

    #[test]
    fn delete_removes_selected_shape_only() {
        let (mut scene, mut editor) = unscaled();
        let keep = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 50.0), p(10.0, 50.0)]))
            .id()
            .clone();
        let target = scene
            .document_mut()
            .add_shape(ShapeDraft::polyline(Role::PATHWAY, [p(0.0, 0.0), p(10.0, 0.0)]))
            .id()
            .clone();

        // 没有选中时无效果
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Delete)),
            EditOutcome::Nothing
        );
        assert_eq!(scene.document().shape_count(), 2);

        editor.handle(&mut scene, EditorEvent::PointerDown(p(5.0, 0.0)));
        editor.handle(&mut scene, EditorEvent::PointerUp(p(5.0, 0.0)));
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::Key(Key::Delete)),
            EditOutcome::Removed(target.clone())
        );
        assert!(scene.shape(&target).is_none());
        assert!(scene.shape(&keep).is_some());
        assert!(scene.selection().is_none());
    }

    #[test]
    fn switching_tools_cancels_drawing() {
        let (mut scene, mut editor) = unscaled();
        editor.set_tool(&mut scene, Tool::Polygon);
        editor.handle(&mut scene, EditorEvent::PointerDown(p(0.0, 0.0)));
        assert_eq!(
            editor.set_tool(&mut scene, Tool::Select),
            EditOutcome::Discarded
        );
        assert!(editor.is_idle());
        assert_eq!(editor.tool(), Tool::Select);
    }

    #[test]
    fn double_click_while_idle_is_ignored() {
        let (mut scene, mut editor) = unscaled();
        assert_eq!(
            editor.handle(&mut scene, EditorEvent::DoubleClick(p(1.0, 1.0))),
            EditOutcome::Nothing
        );
        assert!(scene.document().is_empty());
    }

    #[test]
    fn tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::parse(tool.name()), Some(tool));
            assert_eq!(tool.kind().is_some(), tool.role().is_some());
        }
        assert_eq!(Tool::parse("lasso"), None);
    }
}

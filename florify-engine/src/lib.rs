pub mod command;
pub mod editor;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum EngineError {
        #[error("shape with id {0} not found")]
        ShapeNotFound(String),
        #[error("unknown template {0}")]
        UnknownTemplate(String),
    }
}

pub mod scene {
    use florify_core::document::{Document, Role, Shape, ShapeDraft, ShapeId};
    use florify_core::geometry::{Bounds2D, Point2, Vector2};
    use florify_core::query;
    use florify_core::templates;
    use florify_core::units::{self, DEFAULT_DISPLAY_SCALE};

    use tracing::{debug, warn};

    use crate::errors::EngineError;

    const DEFAULT_ZOOM: f64 = 1.0;
    const MIN_ZOOM: f64 = 0.05;
    const MAX_ZOOM: f64 = 50.0;

    /// 视口状态：显示坐标原点对应的文档坐标，以及缩放倍数。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ViewportState {
        pub origin: Point2,
        pub zoom: f64,
    }

    impl ViewportState {
        #[inline]
        fn clamp_zoom(value: f64) -> f64 {
            value.clamp(MIN_ZOOM, MAX_ZOOM)
        }
    }

    impl Default for ViewportState {
        fn default() -> Self {
            Self {
                origin: Point2::new(0.0, 0.0),
                zoom: DEFAULT_ZOOM,
            }
        }
    }

    /// 引擎层负责维护 `Document` 和运行时状态（选中图形、视口、画布尺寸）。
    #[derive(Debug)]
    pub struct Scene {
        document: Document,
        selection: Option<ShapeId>,
        viewport: ViewportState,
        base_scale: f64,
        canvas_size: Vector2,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DemoShapes {
        /// 模板不可用时为 `None`。
        pub house: Option<ShapeId>,
        pub boundary: Option<ShapeId>,
        pub pathway: ShapeId,
        pub garden_bed: ShapeId,
    }

    impl Scene {
        pub fn new() -> Self {
            Self::with_display_scale(DEFAULT_DISPLAY_SCALE)
        }

        /// 指定每个文档单位对应的显示单位数（缩放为 1 时）。非正值回退到默认比例。
        pub fn with_display_scale(base_scale: f64) -> Self {
            let base_scale = if base_scale.is_finite() && base_scale > 0.0 {
                base_scale
            } else {
                DEFAULT_DISPLAY_SCALE
            };
            let document = Document::new();
            let canvas_size = page_canvas_size(&document, base_scale);
            Self {
                document,
                selection: None,
                viewport: ViewportState::default(),
                base_scale,
                canvas_size,
            }
        }

        /// 使用现有文档初始化场景。
        pub fn with_document(document: Document) -> Self {
            let mut scene = Self::new();
            scene.load_document(document);
            scene
        }

        /// 清空文档、选中与视口。
        pub fn reset(&mut self) {
            self.load_document(Document::with_page(self.document.page().clone()));
        }

        /// 替换当前文档并重置运行时状态。
        pub fn load_document(&mut self, document: Document) {
            self.document = document;
            self.selection = None;
            self.viewport = ViewportState::default();
            self.canvas_size = page_canvas_size(&self.document, self.base_scale);
        }

        #[inline]
        pub fn document(&self) -> &Document {
            &self.document
        }

        #[inline]
        pub fn document_mut(&mut self) -> &mut Document {
            &mut self.document
        }

        pub fn into_document(self) -> Document {
            self.document
        }

        #[inline]
        pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
            self.document.shape(id)
        }

        #[inline]
        pub fn selection(&self) -> Option<&ShapeId> {
            self.selection.as_ref()
        }

        #[inline]
        pub fn selected_shape(&self) -> Option<&Shape> {
            self.selection.as_ref().and_then(|id| self.document.shape(id))
        }

        #[inline]
        pub fn is_selected(&self, id: &ShapeId) -> bool {
            self.selection.as_ref() == Some(id)
        }

        /// 选中指定图形，替换之前的选中。图形不存在时返回错误。
        pub fn select(&mut self, id: &ShapeId) -> Result<(), EngineError> {
            if !self.document.contains(id) {
                return Err(EngineError::ShapeNotFound(id.to_string()));
            }
            self.selection = Some(id.clone());
            Ok(())
        }

        /// 清空选中，返回之前是否有选中图形。
        #[inline]
        pub fn clear_selection(&mut self) -> bool {
            self.selection.take().is_some()
        }

        /// 删除当前选中图形并清空选中；无选中时什么也不做。
        pub fn delete_selection(&mut self) -> Option<Shape> {
            let id = self.selection.take()?;
            let removed = self.document.remove_shape(&id);
            if let Some(shape) = &removed {
                debug!(id = %shape.id(), role = %shape.role, "已删除选中图形");
            }
            removed
        }

        /// 命中测试，参数为文档坐标。
        pub fn shape_at(&self, point: Point2, tolerance: f64) -> Option<&Shape> {
            query::shape_at(&self.document, point, tolerance)
        }

        /// 记录模板选择并以模板几何替换同角色图形。
        pub fn apply_template(&mut self, template_id: &str) -> Result<ShapeId, EngineError> {
            let template = templates::find(template_id)
                .ok_or_else(|| EngineError::UnknownTemplate(template_id.to_string()))?;
            self.document.set_template(template.id);
            let id = self.document.apply_template(template).id().clone();
            self.drop_stale_selection();
            debug!(template = template.id, id = %id, "已应用模板");
            Ok(id)
        }

        /// 移除某角色的全部图形，返回移除数量。
        pub fn clear_role(&mut self, role: &str) -> usize {
            let removed = self.document.clear_role(role);
            self.drop_stale_selection();
            removed
        }

        pub fn selection_bounds(&self) -> Option<Bounds2D> {
            self.selected_shape().and_then(Shape::bounds)
        }

        #[inline]
        pub fn viewport(&self) -> ViewportState {
            self.viewport
        }

        #[inline]
        pub fn reset_viewport(&mut self) {
            self.viewport = ViewportState::default();
        }

        /// 平移视口，位移以文档单位给出。
        pub fn pan_viewport(&mut self, delta: Vector2) {
            self.viewport.origin = self.viewport.origin.translate(delta);
        }

        /// 设置缩放倍数（自动限制在合法范围内）。
        pub fn set_viewport_zoom(&mut self, zoom: f64) {
            if zoom.is_finite() {
                self.viewport.zoom = ViewportState::clamp_zoom(zoom);
            }
        }

        pub fn scale_viewport_zoom(&mut self, factor: f64) {
            self.set_viewport_zoom(self.viewport.zoom * factor);
        }

        #[inline]
        pub fn canvas_size(&self) -> Vector2 {
            self.canvas_size
        }

        /// 设置画布的显示尺寸，用于居中计算。
        pub fn set_canvas_size(&mut self, width: f64, height: f64) {
            self.canvas_size = Vector2::new(width, height);
        }

        /// 当前每个文档单位对应的显示单位数。
        #[inline]
        pub fn display_scale(&self) -> f64 {
            self.base_scale * self.viewport.zoom
        }

        /// 显示坐标 → 文档坐标。
        pub fn to_document(&self, display: Point2) -> Point2 {
            let offset = units::point_to_document(display, self.display_scale());
            self.viewport.origin.translate(Vector2::from(offset.as_vec2()))
        }

        /// 文档坐标 → 显示坐标。
        pub fn to_display(&self, point: Point2) -> Point2 {
            let relative = self.viewport.origin.vector_to(point);
            units::point_to_display(Point2::from_vec(relative.as_vec2()), self.display_scale())
        }

        /// 显示单位下的相对位移换算为文档单位。
        pub fn delta_to_document(&self, delta: Vector2) -> Vector2 {
            let scale = self.display_scale();
            Vector2::new(
                units::display_to_document(delta.x(), scale),
                units::display_to_document(delta.y(), scale),
            )
        }

        /// 让选中图形居中于画布；无选中时退化到整个文档范围。
        pub fn focus_on_selection(&mut self) {
            let target = self.selection_bounds().or_else(|| self.document.bounds());
            if let Some(bounds) = target {
                let half_canvas = self.delta_to_document(self.canvas_size.scale(0.5));
                let center = bounds.center();
                self.viewport.origin = Point2::new(
                    center.x() - half_canvas.x(),
                    center.y() - half_canvas.y(),
                );
            }
        }

        /// 为 CLI / 快速验证填充一组示例图形。
        pub fn populate_demo(&mut self) -> DemoShapes {
            self.clear_selection();

            let boundary = self.apply_demo_template("all-sides");
            let house = self.apply_demo_template("rectangular-simple");
            let pathway = self
                .document
                .add_shape(ShapeDraft::polyline(
                    Role::PATHWAY,
                    [
                        Point2::new(100.0, 10.0),
                        Point2::new(100.0, 50.0),
                        Point2::new(60.0, 80.0),
                    ],
                ))
                .id()
                .clone();
            let garden_bed = self
                .document
                .add_shape(ShapeDraft::polygon(
                    Role::GARDEN_BED,
                    [
                        Point2::new(30.0, 120.0),
                        Point2::new(90.0, 120.0),
                        Point2::new(90.0, 170.0),
                        Point2::new(30.0, 170.0),
                    ],
                ))
                .id()
                .clone();

            let ids = DemoShapes {
                house,
                boundary,
                pathway,
                garden_bed,
            };

            debug!(
                house = ?ids.house,
                boundary = ?ids.boundary,
                pathway = %ids.pathway,
                garden_bed = %ids.garden_bed,
                "已创建演示图形"
            );

            ids
        }

        fn apply_demo_template(&mut self, template_id: &str) -> Option<ShapeId> {
            match self.apply_template(template_id) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(template = template_id, error = %err, "演示模板不可用，跳过");
                    None
                }
            }
        }

        fn drop_stale_selection(&mut self) {
            let stale = self
                .selection
                .as_ref()
                .is_some_and(|id| !self.document.contains(id));
            if stale {
                self.selection = None;
            }
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

    fn page_canvas_size(document: &Document, scale: f64) -> Vector2 {
        let page = document.page();
        Vector2::new(
            units::document_to_display(page.width, scale),
            units::document_to_display(page.height, scale),
        )
    }

    #[cfg(test)]
    mod tests {
        use florify_core::document::{Page, Role};

        use super::*;

        #[test]
        fn demo_population_creates_shapes() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            assert_eq!(scene.document().shape_count(), 4);
            let house = ids.house.expect("house template");
            let boundary = ids.boundary.expect("boundary template");
            assert_eq!(
                scene.shape(&house).map(|s| s.role.clone()),
                Some(Role::new(Role::HOUSE_FRONT))
            );
            assert_eq!(
                scene.shape(&boundary).map(|s| s.role.clone()),
                Some(Role::new(Role::BOUNDARY))
            );
            assert!(scene.shape(&ids.garden_bed).is_some());
            assert_eq!(
                scene.document().template().selected.as_deref(),
                Some("rectangular-simple")
            );
            assert!(scene.document().validate().is_valid);
        }

        #[test]
        fn selection_operations_work() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();

            assert!(scene.selection().is_none());
            scene.select(&ids.garden_bed).expect("select bed");
            assert!(scene.is_selected(&ids.garden_bed));
            assert_eq!(
                scene.selected_shape().map(|s| s.role.clone()),
                Some(Role::new(Role::GARDEN_BED))
            );

            // single selection: selecting another shape replaces it
            scene.select(&ids.pathway).expect("select path");
            assert!(!scene.is_selected(&ids.garden_bed));

            assert!(scene.clear_selection());
            assert!(!scene.clear_selection());

            let err = scene.select(&ShapeId::new("missing")).unwrap_err();
            assert_eq!(err, EngineError::ShapeNotFound("missing".into()));
        }

        #[test]
        fn delete_selection_removes_only_selected() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            assert!(scene.delete_selection().is_none());
            assert_eq!(scene.document().shape_count(), 4);

            scene.select(&ids.pathway).unwrap();
            let removed = scene.delete_selection().expect("removed");
            assert_eq!(removed.id(), &ids.pathway);
            assert!(scene.selection().is_none());
            assert_eq!(scene.document().shape_count(), 3);
        }

        #[test]
        fn applying_template_drops_replaced_selection() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            let house = ids.house.expect("house template");
            scene.select(&house).unwrap();

            let new_house = scene.apply_template("l-shaped").expect("apply");
            assert_ne!(new_house, house);
            assert!(scene.selection().is_none());
            assert_eq!(scene.document().shapes_by_role(Role::HOUSE_FRONT).count(), 1);

            let err = scene.apply_template("castle").unwrap_err();
            assert!(matches!(err, EngineError::UnknownTemplate(_)));
        }

        #[test]
        fn display_conversion_round_trips() {
            let mut scene = Scene::with_display_scale(2.0);
            scene.pan_viewport(Vector2::new(10.0, -5.0));
            scene.set_viewport_zoom(2.0);
            assert!((scene.display_scale() - 4.0).abs() < f64::EPSILON);

            let doc = scene.to_document(Point2::new(40.0, 20.0));
            assert!((doc.x() - 20.0).abs() < 1e-9);
            assert!((doc.y() - 0.0).abs() < 1e-9);

            let back = scene.to_display(doc);
            assert!((back.x() - 40.0).abs() < 1e-9);
            assert!((back.y() - 20.0).abs() < 1e-9);

            let delta = scene.delta_to_document(Vector2::new(12.0, 8.0));
            assert_eq!(delta, Vector2::new(3.0, 2.0));
        }

        #[test]
        fn viewport_zoom_is_clamped() {
            let mut scene = Scene::new();
            scene.set_viewport_zoom(0.0001);
            assert!((scene.viewport().zoom - MIN_ZOOM).abs() < f64::EPSILON);
            scene.set_viewport_zoom(10_000.0);
            assert!((scene.viewport().zoom - MAX_ZOOM).abs() < f64::EPSILON);
            scene.set_viewport_zoom(2.0);
            scene.scale_viewport_zoom(0.5);
            assert!((scene.viewport().zoom - 1.0).abs() < f64::EPSILON);
            scene.set_viewport_zoom(f64::NAN);
            assert!((scene.viewport().zoom - 1.0).abs() < f64::EPSILON);
            scene.reset_viewport();
            assert_eq!(scene.viewport(), ViewportState::default());
        }

        #[test]
        fn focus_centers_selection_on_canvas() {
            let mut scene = Scene::with_display_scale(1.0);
            scene.set_canvas_size(100.0, 50.0);
            let ids = scene.populate_demo();
            scene.select(&ids.garden_bed).unwrap();

            scene.focus_on_selection();
            let center_on_screen = scene.to_display(Point2::new(60.0, 145.0));
            assert!((center_on_screen.x() - 50.0).abs() < 1e-9);
            assert!((center_on_screen.y() - 25.0).abs() < 1e-9);
        }

        #[test]
        fn load_document_resets_state() {
            let mut scene = Scene::new();
            let ids = scene.populate_demo();
            scene.select(&ids.garden_bed).unwrap();
            scene.set_viewport_zoom(3.0);

            let mut document = Document::with_page(Page::new(100.0, 100.0, "mm"));
            document.add_shape(ShapeDraft::polygon(
                Role::PATIO,
                [
                    Point2::new(0.0, 0.0),
                    Point2::new(1.0, 0.0),
                    Point2::new(1.0, 1.0),
                ],
            ));
            scene.load_document(document);

            assert!(scene.selection().is_none());
            assert_eq!(scene.document().shape_count(), 1);
            assert_eq!(scene.viewport(), ViewportState::default());
            let expected = DEFAULT_DISPLAY_SCALE * 100.0;
            assert!((scene.canvas_size().x() - expected).abs() < 1e-9);

            scene.reset();
            assert!(scene.document().is_empty());
            assert_eq!(scene.document().page().width, 100.0);
        }
    }
}

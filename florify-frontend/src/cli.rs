use std::path::PathBuf;

use florify_config::AppConfig;
use florify_core::document::{Shape, ShapeId, ShapeKind};
use florify_core::geometry::Point2;
use florify_engine::command::{CommandBus, CommandContext, CommandRequest, CommandResponse};
use florify_engine::editor::{EditOutcome, Editor, EditorEvent, Tool};
use florify_engine::scene::Scene;
use florify_io::{DocumentSaver, JsonFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{DocumentSource, LoadedScene, editor_settings, load_scene};

/// CLI 运行参数。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// 脚本化编辑会话的结果。
#[derive(Debug, Default)]
pub struct SessionReport {
    pub outcomes: Vec<EditOutcome>,
    pub committed: Vec<ShapeId>,
    pub dragged: Option<ShapeId>,
}

/// 简易 CLI 演示：加载蓝图或构建内置示例，执行一段脚本化编辑，打印概览并按需保存。
pub fn run_demo(config: &AppConfig, options: &CliOptions) -> Result<(), FrontendError> {
    let loaded = load_scene(config, options.input.as_deref())?;
    let LoadedScene {
        mut scene,
        source,
        demo_shapes,
    } = loaded;

    let mut editor = Editor::new(editor_settings(&config.editor));
    let report = run_scripted_session(&mut scene, &mut editor);
    info!(
        events = report.outcomes.len(),
        committed = report.committed.len(),
        "脚本化编辑会话完成"
    );

    let command_bus = CommandBus::new();
    let mut context = CommandContext { scene: &mut scene };
    let responses: Vec<(&str, CommandResponse)> = ["focus_selection", "validate"]
        .into_iter()
        .map(|name| {
            let response = command_bus.dispatch(&CommandRequest::new(name), &mut context);
            if !response.success {
                warn!(command = name, message = ?response.message, "CLI 命令执行失败");
            }
            (name, response)
        })
        .collect();

    println!("Florify 花园蓝图 CLI 演示");
    match &source {
        DocumentSource::Json(path) => println!("已从 JSON 加载蓝图：{}", path.display()),
        DocumentSource::Demo => {
            if let Some(ids) = &demo_shapes {
                println!("已构建内置示例图形：");
                println!("  - 房屋正面 ID = {}", optional_id(ids.house.as_ref()));
                println!("  - 围墙 ID = {}", optional_id(ids.boundary.as_ref()));
                println!("  - 小路 ID = {}", ids.pathway);
                println!("  - 花坛 ID = {}", ids.garden_bed);
            }
        }
    }
    println!(
        "支持的命令: {}",
        command_bus.available_commands().join(", ")
    );
    print_session(&report);
    for (name, response) in &responses {
        println!(
            "命令 {name}: {} {}",
            if response.success { "成功" } else { "失败" },
            response.message.as_deref().unwrap_or("")
        );
    }
    print_scene(context.scene);

    if let Some(path) = &options.output {
        JsonFacade::new()
            .save(context.scene.document(), path)
            .map_err(|source| FrontendError::Save {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "蓝图已保存");
        println!("蓝图已保存到 {}", path.display());
    }
    Ok(())
}

/// 以显示坐标驱动编辑器：绘制一个花坛与一条地界线，再把花坛拖动 (10, 5) 个文档单位。
pub fn run_scripted_session(scene: &mut Scene, editor: &mut Editor) -> SessionReport {
    let mut report = SessionReport::default();
    let mut feed = |scene: &mut Scene, editor: &mut Editor, event: EditorEvent| {
        let outcome = editor.handle(scene, event);
        match &outcome {
            EditOutcome::Committed(id) => report.committed.push(id.clone()),
            EditOutcome::DragFinished(id) => report.dragged = Some(id.clone()),
            _ => {}
        }
        report.outcomes.push(outcome);
    };

    editor.set_tool(scene, Tool::GardenBed);
    let corners = [(130.0, 120.0), (180.0, 120.0), (180.0, 170.0), (130.0, 170.0)];
    for (x, y) in corners {
        let at = display_at(scene, x, y);
        feed(scene, editor, EditorEvent::PointerDown(at));
    }
    let at = display_at(scene, 130.0, 170.0);
    feed(scene, editor, EditorEvent::DoubleClick(at));

    editor.set_tool(scene, Tool::PropertyLine);
    let page_width = scene.document().page().width;
    for x in [0.0, page_width] {
        let at = display_at(scene, x, 290.0);
        feed(scene, editor, EditorEvent::PointerDown(at));
    }

    editor.set_tool(scene, Tool::Select);
    let grab = display_at(scene, 155.0, 145.0);
    let drop = display_at(scene, 165.0, 150.0);
    feed(scene, editor, EditorEvent::PointerDown(grab));
    feed(scene, editor, EditorEvent::PointerMove(drop));
    feed(scene, editor, EditorEvent::PointerUp(drop));

    report
}

fn display_at(scene: &Scene, x: f64, y: f64) -> Point2 {
    scene.to_display(Point2::new(x, y))
}

fn optional_id(id: Option<&ShapeId>) -> String {
    id.map_or_else(|| "(未生成)".to_string(), ShapeId::to_string)
}

fn print_session(report: &SessionReport) {
    println!("编辑会话：");
    for outcome in &report.outcomes {
        println!("  - {outcome:?}");
    }
    if let Some(id) = &report.dragged {
        println!("拖拽完成的图形：{id}");
    }
}

fn print_scene(scene: &Scene) {
    let document = scene.document();
    let page = document.page();
    let viewport = scene.viewport();

    println!(
        "页面 {} x {} {}，viewBox=\"{}\"",
        page.width,
        page.height,
        page.unit,
        page.view_box(scene.display_scale())
    );
    match &document.template().selected {
        Some(id) => println!("当前模板：{id}"),
        None => println!("当前未选择模板。"),
    }
    match scene.selection() {
        Some(id) => println!("当前选中图形：{id}"),
        None => println!("当前尚未选中任何图形。"),
    }
    println!(
        "视口原点=({:.2}, {:.2}), 缩放={:.3}",
        viewport.origin.x(),
        viewport.origin.y(),
        viewport.zoom
    );

    println!("图例：");
    for entry in document.legend() {
        println!(
            "  - {} x{} (描边 {}, 线宽 {}, 填充 {})",
            entry.role, entry.count, entry.style.stroke, entry.style.stroke_width, entry.style.fill
        );
    }

    println!("当前文档图形（共 {} 个）：", document.shape_count());
    for shape in document.shapes() {
        println!("  - {}", describe_shape(shape));
    }

    let report = document.validate();
    if report.is_valid {
        println!("文档校验通过。");
    } else {
        println!("文档校验发现 {} 个问题：", report.errors.len());
        for error in &report.errors {
            println!("  - {error}");
        }
    }
}

fn describe_shape(shape: &Shape) -> String {
    let coords: Vec<String> = shape
        .points
        .iter()
        .map(|p| format!("({:.2}, {:.2})", p.x(), p.y()))
        .collect();
    let mut line = format!(
        "{} #{}, 角色={}, 顶点数={}, 顶点={}",
        match shape.kind {
            ShapeKind::Polygon => "多边形",
            ShapeKind::Polyline => "折线",
        },
        shape.id(),
        shape.role,
        shape.points.len(),
        coords.join(" -> ")
    );
    if !shape.openings.is_empty() {
        let openings: Vec<&str> = shape.openings.iter().map(|o| o.kind.as_str()).collect();
        line.push_str(&format!(", 开口=[{}]", openings.join(", ")));
    }
    if let Some(dash) = &shape.style.dash {
        line.push_str(&format!(", 虚线={dash}"));
    }
    line
}
